use chrono::{Datelike, NaiveDate, Utc};

use crate::models::profile::WorkExperienceRow;

/// Sums work-history durations into total years, one decimal place.
///
/// Open-ended entries (`is_current`, or no end date stored) run to the
/// evaluation date. Overlapping intervals are summed, not merged: an
/// applicant holding two jobs at once accrues both.
pub fn total_years(experiences: &[WorkExperienceRow]) -> f64 {
    total_years_at(experiences, Utc::now().naive_utc().date())
}

/// Same computation against an explicit evaluation date.
pub fn total_years_at(experiences: &[WorkExperienceRow], today: NaiveDate) -> f64 {
    if experiences.is_empty() {
        return 0.0;
    }

    let mut total_months: i64 = 0;
    for exp in experiences {
        let end = if exp.is_current {
            today
        } else {
            exp.end_date.unwrap_or(today)
        };
        total_months += months_between(exp.start_date, end);
    }

    // Round half-up on the tenths digit.
    (total_months as f64 / 12.0 * 10.0).round() / 10.0
}

/// Whole-month difference, day-of-month ignored. Clamped to 0 so an
/// interval whose start lands after its effective end cannot go negative.
fn months_between(start: NaiveDate, end: NaiveDate) -> i64 {
    let months =
        (end.year() as i64 - start.year() as i64) * 12 + (end.month() as i64 - start.month() as i64);
    months.max(0)
}
