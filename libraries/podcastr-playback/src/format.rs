//! Display formatting for durations and progress

/// Format whole seconds as `minutes:seconds`
///
/// Seconds are zero-padded, minutes are not and keep counting past an hour.
///
/// ```
/// use podcastr_playback::format_duration;
///
/// assert_eq!(format_duration(65), "1:05");
/// assert_eq!(format_duration(10), "0:10");
/// ```
pub fn format_duration(total_seconds: u32) -> String {
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}
