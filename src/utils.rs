use crate::error::DurationParseError;
use once_cell::sync::Lazy;
use regex::Regex;

// Compiled regexes for duration parsing
static DURATION_HMS_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+):(\d{1,2}):(\d{1,2})$").unwrap());
static DURATION_MS_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+):(\d{1,2})$").unwrap());
static DURATION_UNITS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(\d+)\s*h)?\s*(?:(\d+)\s*m)?\s*(?:(\d+)\s*s)?$").unwrap()
});

/// Format seconds as `MM:SS`, or `HH:MM:SS` once there are hours.
///
/// Hours are not wrapped at 24. With `show_millis`, a two-digit
/// centisecond suffix is appended (`MM:SS.cc`). Negative and non-finite
/// inputs render as zero.
pub fn format_time(seconds: f64, show_millis: bool) -> String {
    let seconds = if seconds.is_finite() {
        seconds.max(0.0)
    } else {
        0.0
    };

    let hours = (seconds / 3600.0).floor() as u64;
    let minutes = ((seconds % 3600.0) / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    let centis = ((seconds % 1.0) * 100.0).floor() as u64;

    let mut result = if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    };
    if show_millis {
        result.push_str(&format!(".{:02}", centis));
    }
    result
}

/// Parse a duration typed into a timer widget, in seconds.
///
/// Supported formats:
/// - Pure number: "90" or "90.5" (seconds)
/// - Hours:minutes:seconds: "1:05:00"
/// - Minutes:seconds: "2:30"
/// - Units: "1h 5m", "2m30s", "45s"
///
/// # Examples
/// ```
/// use dashboard_timers::utils::parse_duration;
/// assert_eq!(parse_duration("2:30"), Ok(150.0));
/// assert_eq!(parse_duration("2m30s"), Ok(150.0));
/// assert_eq!(parse_duration("1:00:00"), Ok(3600.0));
/// assert_eq!(parse_duration("150"), Ok(150.0));
/// ```
pub fn parse_duration(input: &str) -> Result<f64, DurationParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DurationParseError::EmptyInput);
    }

    if let Ok(secs) = trimmed.parse::<f64>() {
        if secs.is_finite() && secs >= 0.0 {
            return Ok(secs);
        }
    }

    if let Some(captures) = DURATION_HMS_REGEX.captures(trimmed) {
        let hours = parse_component(&captures[1])?;
        let minutes = parse_component(&captures[2])?;
        let seconds = parse_component(&captures[3])?;
        if minutes > 59 {
            return Err(DurationParseError::InvalidMinutes(minutes));
        }
        if seconds > 59 {
            return Err(DurationParseError::InvalidSeconds(seconds));
        }
        return Ok(f64::from(hours) * 3600.0 + f64::from(minutes) * 60.0 + f64::from(seconds));
    }

    if let Some(captures) = DURATION_MS_REGEX.captures(trimmed) {
        let minutes = parse_component(&captures[1])?;
        let seconds = parse_component(&captures[2])?;
        if seconds > 59 {
            return Err(DurationParseError::InvalidSeconds(seconds));
        }
        return Ok(f64::from(minutes) * 60.0 + f64::from(seconds));
    }

    if let Some(captures) = DURATION_UNITS_REGEX.captures(trimmed) {
        let mut total = 0.0;
        let mut matched = false;
        for (idx, scale) in [(1, 3600.0), (2, 60.0), (3, 1.0)] {
            if let Some(m) = captures.get(idx) {
                total += f64::from(parse_component(m.as_str())?) * scale;
                matched = true;
            }
        }
        if matched {
            return Ok(total);
        }
    }

    Err(DurationParseError::InvalidFormat(
        "Use: 90, 2:30, 1:05:00, or 1h 5m 30s".to_string(),
    ))
}

fn parse_component(digits: &str) -> Result<u32, DurationParseError> {
    digits
        .parse()
        .map_err(|_| DurationParseError::InvalidFormat(format!("'{}' is too large", digits)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        zero = { 0.0, false, "00:00" },
        one_hour_one_min_one_sec = { 3661.0, false, "01:01:01" },
        under_a_minute = { 59.0, false, "00:59" },
        exact_minutes = { 600.0, false, "10:00" },
        hours_not_wrapped = { 100.0 * 3600.0, false, "100:00:00" },
        fractional_dropped = { 61.9, false, "01:01" },
        with_centis = { 59.5, true, "00:59.50" },
        zero_with_centis = { 0.0, true, "00:00.00" },
        hours_with_centis = { 3600.25, true, "01:00:00.25" },
        negative_is_zero = { -4.0, false, "00:00" },
        nan_is_zero = { f64::NAN, true, "00:00.00" },
    )]
    fn test_format_time(seconds: f64, show_millis: bool, expected: &str) {
        assert_eq!(format_time(seconds, show_millis), expected);
    }

    #[parameterized(
        plain_seconds = { "90", 90.0 },
        fractional_seconds = { "12.5", 12.5 },
        padded = { "  45 ", 45.0 },
        minutes_seconds = { "2:30", 150.0 },
        long_minutes = { "90:00", 5400.0 },
        hours_minutes_seconds = { "1:05:07", 3907.0 },
        units_full = { "1h 5m 30s", 3930.0 },
        units_compact = { "2m30s", 150.0 },
        units_hours_only = { "2h", 7200.0 },
        units_seconds_only = { "45s", 45.0 },
    )]
    fn test_parse_duration(input: &str, expected: f64) {
        assert_eq!(parse_duration(input), Ok(expected));
    }

    #[parameterized(
        empty = { "", DurationParseError::EmptyInput },
        blank = { "   ", DurationParseError::EmptyInput },
        bad_seconds = { "2:75", DurationParseError::InvalidSeconds(75) },
        bad_minutes = { "1:60:00", DurationParseError::InvalidMinutes(60) },
        bad_hms_seconds = { "1:00:60", DurationParseError::InvalidSeconds(60) },
    )]
    fn test_parse_duration_errors(input: &str, expected: DurationParseError) {
        assert_eq!(parse_duration(input), Err(expected));
    }

    #[parameterized(
        word = { "soon" },
        negative = { "-5" },
        unit_without_number = { "h" },
        trailing_colon = { "5:" },
    )]
    fn test_parse_duration_rejects_garbage(input: &str) {
        assert!(matches!(
            parse_duration(input),
            Err(DurationParseError::InvalidFormat(_))
        ));
    }
}
