/// Format seconds as HH:MM:SS, truncating the fractional part
pub fn format_hms(secs: f64) -> String {
    let total = if secs.is_finite() && secs > 0.0 {
        secs as u64
    } else {
        0
    };
    let (minutes, seconds) = (total / 60, total % 60);
    let (hours, minutes) = (minutes / 60, minutes % 60);
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Sum of durations, ignoring anything negative
pub fn total_secs<I: IntoIterator<Item = f64>>(durations: I) -> f64 {
    durations.into_iter().filter(|d| *d > 0.0).sum()
}
