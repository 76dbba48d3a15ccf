/// Keyframe clock: quantizes movement speed into an integer number of
/// render frames per tile ("field").
///
/// Given a fixed render frame rate and a requested fields-per-second,
/// the tile is subdivided into `frames_per_field` equal sub-steps by
/// floor division. The floor is deliberate: it biases toward FEWER
/// frames per tile, so the achieved speed is always >= the requested
/// one, as long as the request fits in the frame rate. Requests faster
/// than the frame rate clamp to one frame per tile and run frame-rate
/// capped, like the <= 0 case clamps at the other end.
/// `sync_frame_count()` reports how often a render-only frame has to
/// be inserted to pay that speed surplus back.
///
/// All sub-tile positions an actor can occupy are multiples of
/// `1/frames_per_field` within a tile; `align` snaps onto that grid and
/// `center_value` pins a coordinate to the lane center. With an odd
/// subdivision there is a single unambiguous center sub-step; with an
/// even one the exact half is walked across in one frame. Both are
/// legal.
///
/// Every epsilon comparison in the crate goes through `CENTER_EPS` so
/// there is exactly one tolerance policy to test.

use super::dir::Dir;

/// Single float tolerance for center / alignment / tile-entry tests.
pub const CENTER_EPS: f64 = 1e-6;

/// Cap applied when the requested speed is degenerate (<= 0): the
/// subdivision stays finite and positive, the actor just never gets
/// anywhere.
pub const MAX_FRAMES_PER_FIELD: u32 = 1_000_000;

#[derive(Clone, Copy, Debug)]
pub struct Keyframe {
    frame_rate: u32,
    requested: f64,
    frames_per_field: u32,
    /// Tile fraction moved per frame: `1 / frames_per_field`.
    step: f64,
    /// Lane-center offset within a tile: `floor(fpf / 2) * step`.
    center: f64,
}

impl Keyframe {
    pub fn new(frame_rate: u32, requested_fields_per_second: f64) -> Self {
        let frames_per_field = if requested_fields_per_second <= 0.0 {
            MAX_FRAMES_PER_FIELD
        } else {
            ((frame_rate as f64 / requested_fields_per_second).floor() as u32)
                .clamp(1, MAX_FRAMES_PER_FIELD)
        };
        let step = 1.0 / frames_per_field as f64;
        Keyframe {
            frame_rate,
            requested: requested_fields_per_second,
            frames_per_field,
            step,
            center: (frames_per_field / 2) as f64 * step,
        }
    }

    pub fn frames_per_field(&self) -> u32 {
        self.frames_per_field
    }

    /// Tile fraction covered by one frame.
    pub fn step_size(&self) -> f64 {
        self.step
    }

    /// Lane-center offset within a tile, in [0, 1).
    pub fn center(&self) -> f64 {
        self.center
    }

    /// Speed actually achieved; >= requested because of the floor bias.
    pub fn actual_fields_per_second(&self) -> f64 {
        self.frame_rate as f64 / self.frames_per_field as f64
    }

    /// Snap an offset to the nearest valid sub-step, preserving the
    /// integer (tile) part.
    pub fn align(&self, value: f64) -> f64 {
        let tile = value.floor();
        let frac = value - tile;
        let k = ((frac / self.step).round() as u32).min(self.frames_per_field - 1);
        tile + k as f64 * self.step
    }

    /// Replace the fractional part with the lane-center offset,
    /// preserving the integer (tile) part.
    pub fn center_value(&self, value: f64) -> f64 {
        value.floor() + self.center
    }

    fn frac_is(&self, value: f64, target: f64) -> bool {
        (value - value.floor() - target).abs() < CENTER_EPS
    }

    /// Is the position exactly (within tolerance) at the lane center on
    /// both axes?
    pub fn is_center(&self, x: f64, y: f64) -> bool {
        self.frac_is(x, self.center) && self.frac_is(y, self.center)
    }

    /// Center test restricted to the axis of travel.
    pub fn is_center_axis(&self, dir: Dir, x: f64, y: f64) -> bool {
        let v = if dir.is_horizontal() { x } else { y };
        self.frac_is(v, self.center)
    }

    /// True on the single frame where stepping in `dir` has just
    /// crossed into a new tile (its pre-center zone). Gates one-shot
    /// per-tile effects.
    pub fn entered_tile(&self, dir: Dir, x: f64, y: f64) -> bool {
        let v = if dir.is_horizontal() { x } else { y };
        let (dx, dy) = dir.delta();
        if dx + dy > 0 {
            // Moving right/down: the boundary itself belongs to the new tile.
            self.frac_is(v, 0.0) || self.frac_is(v, 1.0)
        } else {
            // Moving left/up: first sub-step inside the new tile.
            self.frac_is(v, 1.0 - self.step)
        }
    }

    /// Every how many frames a render-only (no simulation) frame must
    /// be inserted so the achieved speed averages out to the requested
    /// one. None when the achieved speed is not faster than requested.
    pub fn sync_frame_count(&self) -> Option<u32> {
        let actual = self.actual_fields_per_second();
        if self.requested <= 0.0 || actual <= self.requested + CENTER_EPS {
            return None;
        }
        Some(((actual / (actual - self.requested)).round() as u32).max(2))
    }

    /// Milliseconds between inserted render-only frames.
    pub fn sync_delay_ms(&self) -> Option<u64> {
        self.sync_frame_count()
            .map(|n| (n as u64 * 1000) / self.frame_rate as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_is_deterministic() {
        let a = Keyframe::new(60, 8.5);
        let b = Keyframe::new(60, 8.5);
        assert_eq!(a.frames_per_field(), b.frames_per_field());
        assert_eq!(a.center(), b.center());
    }

    #[test]
    fn floor_bias_never_slower_than_requested() {
        // Only holds while the request fits in the frame rate; faster
        // requests clamp to one frame per tile.
        for fps in [30u32, 50, 60, 75] {
            for req in [1.0, 2.5, 7.0, 8.0, 9.47, 11.0, 29.0] {
                let kf = Keyframe::new(fps, req);
                assert!(
                    kf.actual_fields_per_second() + CENTER_EPS >= req,
                    "fps={fps} req={req} actual={}",
                    kf.actual_fields_per_second()
                );
            }
        }
    }

    #[test]
    fn subdivision_examples() {
        assert_eq!(Keyframe::new(60, 7.5).frames_per_field(), 8);
        assert_eq!(Keyframe::new(60, 8.0).frames_per_field(), 7);
        assert_eq!(Keyframe::new(60, 9.0).frames_per_field(), 6);
        // Requested above the frame rate clamps to one frame per tile.
        assert_eq!(Keyframe::new(60, 120.0).frames_per_field(), 1);
    }

    #[test]
    fn degenerate_speed_clamps() {
        let kf = Keyframe::new(60, 0.0);
        assert_eq!(kf.frames_per_field(), MAX_FRAMES_PER_FIELD);
        assert!(kf.step_size() > 0.0);
        assert!(kf.sync_frame_count().is_none());
        let kf = Keyframe::new(60, -3.0);
        assert_eq!(kf.frames_per_field(), MAX_FRAMES_PER_FIELD);
    }

    #[test]
    fn center_parity() {
        // Even subdivision: exact half.
        let kf = Keyframe::new(64, 8.0); // fpf = 8
        assert_eq!(kf.center(), 0.5);
        // Odd subdivision: truncated half.
        let kf = Keyframe::new(63, 9.0); // fpf = 7
        assert!((kf.center() - 3.0 / 7.0).abs() < CENTER_EPS);
    }

    #[test]
    fn align_is_idempotent() {
        let kf = Keyframe::new(60, 8.0); // fpf = 7
        let mut v = 0.0;
        while v < 1.0 {
            let once = kf.align(v);
            assert!((kf.align(once) - once).abs() < CENTER_EPS, "v={v}");
            v += 0.013;
        }
    }

    #[test]
    fn align_preserves_tile() {
        let kf = Keyframe::new(60, 7.5); // fpf = 8
        assert_eq!(kf.align(4.99), 4.0 + 7.0 / 8.0);
        assert_eq!(kf.align(4.0), 4.0);
        // Negative coordinates snap within their own tile too.
        assert_eq!(kf.align(-1.2), -1.25);
    }

    #[test]
    fn center_value_fraction_is_constant() {
        let kf = Keyframe::new(60, 8.0);
        for v in [0.0, 0.1, 0.99, 5.3, 17.75] {
            let c = kf.center_value(v);
            assert!((c - c.floor() - kf.center()).abs() < CENTER_EPS);
            assert_eq!(c.floor(), v.floor());
        }
    }

    #[test]
    fn entered_tile_once_per_crossing_rightward() {
        let kf = Keyframe::new(64, 8.0); // fpf = 8
        let mut x = 1.0 + kf.center();
        let mut entries = 0;
        for _ in 0..8 {
            x += kf.step_size();
            if kf.entered_tile(Dir::Right, x, 0.0) {
                entries += 1;
            }
        }
        assert_eq!(entries, 1);
    }

    #[test]
    fn entered_tile_once_per_crossing_leftward() {
        let kf = Keyframe::new(64, 8.0);
        let mut x = 5.0 + kf.center();
        let mut entries = 0;
        for _ in 0..8 {
            x -= kf.step_size();
            if kf.entered_tile(Dir::Left, x, 0.0) {
                entries += 1;
            }
        }
        assert_eq!(entries, 1);
    }

    #[test]
    fn sync_frames_compensate_surplus() {
        // 60 / 8 → fpf 7 → actual 8.571..., surplus over 8.0.
        let kf = Keyframe::new(60, 8.0);
        let n = kf.sync_frame_count().unwrap();
        // actual / (actual - requested) = 8.571 / 0.571 ≈ 15.
        assert_eq!(n, 15);
        assert_eq!(kf.sync_delay_ms(), Some(250));

        // Exact division: no surplus, no sync frames.
        assert!(Keyframe::new(60, 7.5).sync_frame_count().is_none());
    }
}
