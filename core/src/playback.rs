//! Frame addressing and playback-rate derivation

/// Bucket key for media without frames, or overlays without a frame number
pub const SENTINEL_FRAME: i64 = -1;

/// 1-based frame number at playback position `seconds`
pub fn frame_for_time(seconds: f64, fps: f64) -> i64 {
    if !seconds.is_finite() || seconds < 0.0 || fps <= 0.0 {
        return 1;
    }
    ((seconds * fps).floor() as i64).saturating_add(1)
}

/// 1-based frame number for an image sequence / gallery index
pub fn frame_for_index(index: usize) -> i64 {
    index as i64 + 1
}

/// Playback rate for time-based media.
///
/// An explicit rate always wins. Otherwise the rate is derived once as
/// `bucket_count / duration` as soon as both are known, and never revisited;
/// until then the default applies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRate {
    explicit: Option<f64>,
    default: f64,
    derived: Option<f64>,
}

impl FrameRate {
    pub fn new(explicit: Option<f64>, default: f64) -> Self {
        Self {
            explicit: explicit.filter(|fps| *fps > 0.0),
            default,
            derived: None,
        }
    }

    /// Try to derive the rate. Returns the rate now in effect.
    pub fn resolve(&mut self, bucket_count: Option<usize>, duration: Option<f64>) -> f64 {
        if self.explicit.is_none() && self.derived.is_none() {
            if let (Some(count), Some(duration)) = (bucket_count, duration) {
                if count > 0 && duration.is_finite() && duration > 0.0 {
                    let fps = count as f64 / duration;
                    tracing::debug!(count, duration, fps, "derived playback rate");
                    self.derived = Some(fps);
                }
            }
        }
        self.get()
    }

    pub fn get(&self) -> f64 {
        self.explicit.or(self.derived).unwrap_or(self.default)
    }

    pub fn is_derived(&self) -> bool {
        self.derived.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_for_time() {
        assert_eq!(frame_for_time(0.0, 30.0), 1);
        assert_eq!(frame_for_time(1.0, 30.0), 31);
        assert_eq!(frame_for_time(0.999, 30.0), 30);
        assert_eq!(frame_for_time(f64::NAN, 30.0), 1);
    }

    #[test]
    fn test_frame_for_huge_time_saturates() {
        assert_eq!(frame_for_time(1e300, 30.0), i64::MAX);
        assert_eq!(frame_for_time(f64::MAX, f64::MAX), i64::MAX);
    }

    #[test]
    fn test_explicit_rate_wins() {
        let mut rate = FrameRate::new(Some(24.0), 30.0);
        assert_eq!(rate.resolve(Some(100), Some(2.0)), 24.0);
        assert!(!rate.is_derived());
    }

    #[test]
    fn test_derived_once() {
        let mut rate = FrameRate::new(None, 30.0);
        assert_eq!(rate.resolve(Some(50), None), 30.0);
        assert_eq!(rate.resolve(Some(50), Some(2.0)), 25.0);
        // Not revisited when inputs change
        assert_eq!(rate.resolve(Some(100), Some(2.0)), 25.0);
    }

    #[test]
    fn test_default_when_nothing_known() {
        let mut rate = FrameRate::new(None, 30.0);
        assert_eq!(rate.resolve(None, None), 30.0);
        assert_eq!(rate.resolve(Some(0), Some(10.0)), 30.0);
    }
}
