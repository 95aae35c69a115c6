//! Calendar-aware age arithmetic.
//!
//! Ages are derived, never stored from input: the registry recomputes them
//! from the birth date whenever the birth date is written. The arithmetic is
//! anniversary-based rather than day-count division, so a year is only
//! counted once the birth month and day have been reached in the reference
//! year.

use chrono::{Datelike, NaiveDate};

/// Whole years elapsed between `birth_date` and `reference_date`.
///
/// The count increments exactly at the anniversary of `birth_date`. A
/// February 29th birth rolls over on March 1st in non-leap years. Returns 0
/// when `reference_date` precedes `birth_date`.
pub fn years_elapsed(birth_date: NaiveDate, reference_date: NaiveDate) -> u32 {
    let mut years = reference_date.year() - birth_date.year();
    if (reference_date.month(), reference_date.day()) < (birth_date.month(), birth_date.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

/// Whole months elapsed beyond the last full year, in `[0, 11]`.
///
/// Day-of-month aware: a month is only counted once the birth day has been
/// reached in the reference month.
pub fn months_elapsed_mod_12(birth_date: NaiveDate, reference_date: NaiveDate) -> u32 {
    let mut months = (reference_date.year() - birth_date.year()) * 12
        + reference_date.month() as i32
        - birth_date.month() as i32;
    if reference_date.day() < birth_date.day() {
        months -= 1;
    }
    months.max(0).rem_euclid(12) as u32
}

/// Renders a detailed age as `"{years}a {months}m"`, e.g. `"3a 7m"`.
pub fn detailed_age(birth_date: NaiveDate, reference_date: NaiveDate) -> String {
    format!(
        "{}a {}m",
        years_elapsed(birth_date, reference_date),
        months_elapsed_mod_12(birth_date, reference_date)
    )
}
