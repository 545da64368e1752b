// crates/speedshift-core/src/helpers/time.rs
//
// Shared time-formatting utilities used by the transport bar.

/// Format a position in seconds as `MM:SS:FF` (minutes, seconds, frames at
/// 30 fps).
///
/// ```
/// use speedshift_core::helpers::time::format_time;
/// assert_eq!(format_time(0.0),    "00:00:00");
/// assert_eq!(format_time(61.5),   "01:01:15");
/// assert_eq!(format_time(3599.0), "59:59:00");
/// ```
pub fn format_time(s: f64) -> String {
    let m  = (s / 60.0) as u32;
    let sc = (s % 60.0) as u32;
    let fr = ((s * 30.0) as u32) % 30;
    format!("{m:02}:{sc:02}:{fr:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_all_zeros() {
        assert_eq!(format_time(0.0), "00:00:00");
    }

    #[test]
    fn fractional_seconds_become_frames() {
        // 0.5 s at 30 fps = frame 15.
        assert_eq!(format_time(61.5), "01:01:15");
    }

    #[test]
    fn minutes_keep_counting_past_the_hour() {
        assert_eq!(format_time(3725.0), "62:05:00");
    }
}
