//! Cycle/day offset arithmetic.
//!
//! Schedule positions are symbolic: (cycle N, day M), both 1-based. This
//! module converts a position into a concrete calendar date relative to a
//! patient's start date. Pure calendar addition, no timezone involved.

use chrono::{Days, NaiveDate};

/// Resolve a 1-based (cycle, day) position to a calendar date.
///
/// The offset is `(cycle - 1) * cycle_duration_days + (day - 1)` days after
/// `start`. Returns `None` when `cycle`, `day`, or `cycle_duration_days` is
/// zero: out-of-range positions are skipped, never clamped, since clamping
/// would fabricate an appointment on the wrong day.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use cts_core::offset::resolve_date;
///
/// let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
///
/// // Cycle 1 day 1 is the start date itself.
/// assert_eq!(resolve_date(start, 1, 1, 21), Some(start));
///
/// // Cycle 2 day 5 of 21-day cycles: 21 + 4 days after start.
/// assert_eq!(
///     resolve_date(start, 2, 5, 21),
///     NaiveDate::from_ymd_opt(2025, 1, 26)
/// );
///
/// // Degenerate positions are skipped.
/// assert_eq!(resolve_date(start, 0, 1, 21), None);
/// ```
pub fn resolve_date(
    start: NaiveDate,
    cycle: u32,
    day: u32,
    cycle_duration_days: u32,
) -> Option<NaiveDate> {
    if cycle < 1 || day < 1 || cycle_duration_days < 1 {
        return None;
    }
    let offset = u64::from(cycle - 1) * u64::from(cycle_duration_days) + u64::from(day - 1);
    start.checked_add_days(Days::new(offset))
}

/// Parse a day token from template authoring into a 1-based day number.
///
/// Accepts plain integers (`"3"`) and prefixed forms (`"d3"`, `"D3"`,
/// `"day 3"`). Non-numeric or zero tokens yield `None` and are dropped by
/// the expander rather than treated as day 0 or day 1.
pub fn parse_day_token(token: &str) -> Option<u32> {
    let lower = token.trim().to_ascii_lowercase();
    let digits = lower
        .strip_prefix("day")
        .or_else(|| lower.strip_prefix('d'))
        .map(str::trim_start)
        .unwrap_or(&lower);
    match digits.parse::<u32>() {
        Ok(day) if day >= 1 => Some(day),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn first_cycle_first_day_is_start() {
        let start = date(2025, 1, 1);
        assert_eq!(resolve_date(start, 1, 1, 28), Some(start));
    }

    #[test]
    fn cycle_two_day_five_of_21_day_cycles() {
        // 2025-01-01 + (21 + 4) = 2025-01-26
        assert_eq!(
            resolve_date(date(2025, 1, 1), 2, 5, 21),
            Some(date(2025, 1, 26))
        );
    }

    #[test]
    fn crosses_month_and_year_boundaries() {
        assert_eq!(
            resolve_date(date(2024, 12, 20), 1, 15, 28),
            Some(date(2025, 1, 3))
        );
    }

    #[test]
    fn degenerate_positions_are_skipped_not_clamped() {
        let start = date(2025, 1, 1);
        assert_eq!(resolve_date(start, 0, 1, 21), None);
        assert_eq!(resolve_date(start, 1, 0, 21), None);
        assert_eq!(resolve_date(start, 1, 1, 0), None);
    }

    #[test]
    fn idempotent_for_identical_inputs() {
        let start = date(2025, 3, 10);
        assert_eq!(
            resolve_date(start, 4, 7, 14),
            resolve_date(start, 4, 7, 14)
        );
    }

    #[test]
    fn day_tokens() {
        assert_eq!(parse_day_token("3"), Some(3));
        assert_eq!(parse_day_token("d3"), Some(3));
        assert_eq!(parse_day_token("D15"), Some(15));
        assert_eq!(parse_day_token("day 8"), Some(8));
        assert_eq!(parse_day_token(" d1 "), Some(1));
        assert_eq!(parse_day_token("d0"), None);
        assert_eq!(parse_day_token("dose"), None);
        assert_eq!(parse_day_token(""), None);
        assert_eq!(parse_day_token("baseline"), None);
    }
}
