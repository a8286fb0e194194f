use chrono::Local;

/// Utility function to get the current date in a human-readable format,
/// e.g. "Saturday, May 6, 2023".
pub fn current_date() -> String {
    let today = Local::now();
    format!(
        "{}, {} {}, {}",
        today.format("%A"),
        today.format("%B"),
        today.format("%-d"),
        today.format("%Y")
    )
}
