/// Sound engine: procedural 8-bit style sound effects via rodio.
///
/// All sounds are generated as in-memory WAV buffers at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Compile with `--no-default-features` or without "sound" feature
/// to disable audio entirely (the stub SoundEngine does nothing).

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;

    /// Pre-generated WAV buffers for each sound effect.
    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_munch: Arc<Vec<u8>>,
        sfx_power: Arc<Vec<u8>>,
        sfx_fruit: Arc<Vec<u8>>,
        sfx_ghost: Arc<Vec<u8>>,
        sfx_die: Arc<Vec<u8>>,
        sfx_extra: Arc<Vec<u8>>,
        sfx_intro: Arc<Vec<u8>>,
        sfx_clear: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;

            // ── Generate all sound buffers ──
            let sfx_munch = Arc::new(make_wav(&gen_munch()));
            let sfx_power = Arc::new(make_wav(&gen_power()));
            let sfx_fruit = Arc::new(make_wav(&gen_fruit()));
            let sfx_ghost = Arc::new(make_wav(&gen_ghost()));
            let sfx_die = Arc::new(make_wav(&gen_die()));
            let sfx_extra = Arc::new(make_wav(&gen_extra_life()));
            let sfx_intro = Arc::new(make_wav(&gen_intro()));
            let sfx_clear = Arc::new(make_wav(&gen_clear()));

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_munch,
                sfx_power,
                sfx_fruit,
                sfx_ghost,
                sfx_die,
                sfx_extra,
                sfx_intro,
                sfx_clear,
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }

        pub fn play_munch(&self) { self.play(&self.sfx_munch); }
        pub fn play_power(&self) { self.play(&self.sfx_power); }
        pub fn play_fruit(&self) { self.play(&self.sfx_fruit); }
        pub fn play_ghost(&self) { self.play(&self.sfx_ghost); }
        pub fn play_die(&self) { self.play(&self.sfx_die); }
        pub fn play_extra_life(&self) { self.play(&self.sfx_extra); }
        pub fn play_intro(&self) { self.play(&self.sfx_intro); }
        pub fn play_clear(&self) { self.play(&self.sfx_clear); }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators — all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    /// Pellet munch: a short "waka" chirp that dips then rises
    fn gen_munch() -> Vec<f32> {
        let duration = 0.07;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                // V-shaped pitch sweep: 520Hz → 260Hz → 520Hz
                let freq = 260.0 + 260.0 * (2.0 * t - 1.0).abs();
                let ti = i as f32 / SAMPLE_RATE as f32;
                let env = (1.0 - t).powf(0.4);
                let wave = (ti * freq * 2.0 * std::f32::consts::PI).sin() * 0.7
                    + (ti * freq * 3.0 * 2.0 * std::f32::consts::PI).sin() * 0.3;
                wave * env * 0.22
            })
            .collect()
    }

    /// Power pellet: pulsing low siren ramp
    fn gen_power() -> Vec<f32> {
        let duration = 0.35;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let ti = i as f32 / SAMPLE_RATE as f32;
                // Rising base with an 8Hz tremolo
                let freq = 140.0 + t * 220.0;
                let trem = 0.6 + 0.4 * (ti * 8.0 * 2.0 * std::f32::consts::PI).sin();
                let env = (1.0 - t).powf(0.5);
                (ti * freq * 2.0 * std::f32::consts::PI).sin() * trem * env * 0.3
            })
            .collect()
    }

    /// Fruit pickup: quick ascending arpeggio D6→F#6→A6
    fn gen_fruit() -> Vec<f32> {
        let notes = [1175.0_f32, 1480.0, 1760.0];
        let note_dur = 0.05;
        let mut samples = Vec::new();
        for &freq in &notes {
            let n = (SAMPLE_RATE as f32 * note_dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                let wave = (t * freq * 2.0 * std::f32::consts::PI).sin() * 0.7
                    + (t * freq * 2.0 * 2.0 * std::f32::consts::PI).sin() * 0.3;
                samples.push(wave * env * 0.25);
            }
        }
        samples
    }

    /// Ghost eaten: fast upward glissando
    fn gen_ghost() -> Vec<f32> {
        let duration = 0.3;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let ti = i as f32 / SAMPLE_RATE as f32;
                let freq = 300.0 + t * t * 1400.0; // accelerating rise
                let env = 1.0 - t * 0.6;
                let wave = (ti * freq * 2.0 * std::f32::consts::PI).sin() * 0.6
                    + (ti * freq * 2.0 * 2.0 * std::f32::consts::PI).sin() * 0.4;
                wave * env * 0.28
            })
            .collect()
    }

    /// Death: long warbling descent ending in two low thumps
    fn gen_die() -> Vec<f32> {
        let duration = 0.9;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut samples: Vec<f32> = (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let ti = i as f32 / SAMPLE_RATE as f32;
                let freq = 700.0 - t * 550.0;
                let warble = 1.0 + 0.04 * (ti * 12.0 * 2.0 * std::f32::consts::PI).sin();
                let env = 1.0 - t * 0.4;
                (ti * freq * warble * 2.0 * std::f32::consts::PI).sin() * env * 0.28
            })
            .collect();
        for _ in 0..2 {
            let thump = (SAMPLE_RATE as f32 * 0.08) as usize;
            for i in 0..thump {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - i as f32 / thump as f32;
                samples.push((t * 90.0 * 2.0 * std::f32::consts::PI).sin() * env * 0.35);
            }
            samples.extend(std::iter::repeat(0.0).take(thump / 2));
        }
        samples
    }

    /// Extra life: bright repeating two-note chime
    fn gen_extra_life() -> Vec<f32> {
        let pairs = [(1047.0_f32, 0.07), (1568.0, 0.07), (1047.0, 0.07), (1568.0, 0.14)];
        let mut samples = Vec::new();
        for &(freq, dur) in &pairs {
            let n = (SAMPLE_RATE as f32 * dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                let wave = (t * freq * 2.0 * std::f32::consts::PI).sin() * 0.7
                    + (t * freq * 2.0 * 2.0 * std::f32::consts::PI).sin() * 0.3;
                samples.push(wave * env * 0.3);
            }
        }
        samples
    }

    /// Round start jingle: short bouncy melody
    fn gen_intro() -> Vec<f32> {
        let notes = [
            (494.0_f32, 0.12),
            (988.0, 0.12),
            (740.0, 0.12),
            (622.0, 0.12),
            (988.0, 0.09),
            (740.0, 0.16),
            (622.0, 0.24),
        ];
        let mut samples = Vec::new();
        for &(freq, dur) in &notes {
            let n = (SAMPLE_RATE as f32 * dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.5;
                let wave = (t * freq * 2.0 * std::f32::consts::PI).sin() * 0.6
                    + (t * freq * 2.0 * 2.0 * std::f32::consts::PI).sin() * 0.25
                    + (t * freq * 3.0 * 2.0 * std::f32::consts::PI).sin() * 0.15;
                samples.push(wave * env * 0.28);
            }
            // short gap between notes
            samples.extend(std::iter::repeat(0.0).take((SAMPLE_RATE as f32 * 0.02) as usize));
        }
        samples
    }

    /// Board cleared: ascending fanfare with sustained top note
    fn gen_clear() -> Vec<f32> {
        let notes = [587.0_f32, 740.0, 880.0, 1175.0]; // D5→F#5→A5→D6
        let note_dur = 0.1;
        let mut samples = Vec::new();
        for &freq in &notes {
            let n = (SAMPLE_RATE as f32 * note_dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.3;
                let wave = (t * freq * 2.0 * std::f32::consts::PI).sin() * 0.6
                    + (t * freq * 2.0 * 2.0 * std::f32::consts::PI).sin() * 0.3
                    + (t * freq * 3.0 * 2.0 * std::f32::consts::PI).sin() * 0.1;
                samples.push(wave * env * 0.3);
            }
        }
        // Sustain the last note
        let last_freq = 1175.0_f32;
        let n = (SAMPLE_RATE as f32 * 0.3) as usize;
        for i in 0..n {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = 1.0 - (i as f32 / n as f32);
            let wave = (t * last_freq * 2.0 * std::f32::consts::PI).sin();
            samples.push(wave * env * 0.3);
        }
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder — wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2; // 16-bit = 2 bytes per sample
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        // RIFF header
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        // fmt chunk
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
        buf.extend_from_slice(&1u16.to_le_bytes());  // PCM format
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        // data chunk
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let clamped = s.max(-1.0).min(1.0);
            let val = (clamped * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }
}

// ════════════════════════════════════════════════════════════
//  Public API — compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_munch(&self) {}
    pub fn play_power(&self) {}
    pub fn play_fruit(&self) {}
    pub fn play_ghost(&self) {}
    pub fn play_die(&self) {}
    pub fn play_extra_life(&self) {}
    pub fn play_intro(&self) {}
    pub fn play_clear(&self) {}
}
