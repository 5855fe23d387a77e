use std::time::Duration;

use crate::errors::DurationError;

const HOUR: u64 = 60 * 60;

/// Parse a rule bound such as `4d`, `5w`, `6y`, `12h` or `90m`.
///
/// `d`, `w` and `y` take an integer count of days, weeks or 365-day years.
/// Anything else is handed to the `humantime` grammar.
pub fn parse_extended_duration(input: &str) -> Result<Duration, DurationError> {
    let trimmed = input.trim();

    let unit = match trimmed.chars().last() {
        Some('d') => Some(24 * HOUR),
        Some('w') => Some(7 * 24 * HOUR),
        Some('y') => Some(365 * 24 * HOUR),
        _ => None,
    };

    if let Some(seconds_per_unit) = unit {
        let number = &trimmed[..trimmed.len() - 1];
        let count: u64 = number
            .trim()
            .parse()
            .map_err(|source| DurationError::Number {
                input: input.to_string(),
                source,
            })?;
        let seconds = count
            .checked_mul(seconds_per_unit)
            .ok_or_else(|| DurationError::Format {
                input: input.to_string(),
                reason: "duration overflows".to_string(),
            })?;
        return Ok(Duration::from_secs(seconds));
    }

    humantime::parse_duration(trimmed).map_err(|err| DurationError::Format {
        input: input.to_string(),
        reason: err.to_string(),
    })
}
