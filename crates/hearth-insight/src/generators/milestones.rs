//! Milestone detection: upcoming birthdays.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use hearth_core::types::{Insight, InsightType, Severity};

use crate::context::InsightContext;
use crate::error::InsightError;

use super::new_insight;

/// Days ahead scanned for birthdays.
const BIRTHDAY_WINDOW_DAYS: i64 = 30;

/// Surface member birthdays coming up within the window.
pub fn milestones(
    ctx: &InsightContext,
    family_id: &str,
    now: DateTime<Utc>,
) -> Result<Vec<Insight>, InsightError> {
    let today = now.date_naive();
    let horizon = today + Duration::days(BIRTHDAY_WINDOW_DAYS);
    let members = ctx.family.list_members(family_id)?;

    let mut insights = Vec::new();
    for member in &members {
        let Some(birth_date) = member.birth_date else {
            continue;
        };
        let Some(next_birthday) = next_occurrence(birth_date, today) else {
            continue;
        };
        if next_birthday > horizon {
            continue;
        }
        let turning = next_birthday.year() - birth_date.year();
        let days_until = (next_birthday - today).num_days();
        insights.push(new_insight(
            family_id,
            InsightType::Milestone,
            format!("{} turns {} soon", member.name, turning),
            format!(
                "{}'s birthday is in {} day(s) ({}).",
                member.name, days_until, next_birthday
            ),
            Severity::Low,
            0.9,
            vec![member.id.to_string()],
            vec![
                "Plan a celebration".to_string(),
                "Pick out a present".to_string(),
            ],
            now,
        ));
    }

    Ok(insights)
}

/// The next occurrence of a birth date on or after `today`.
///
/// February 29 birthdays fall back to February 28 in non-leap years.
fn next_occurrence(birth_date: NaiveDate, today: NaiveDate) -> Option<NaiveDate> {
    let in_year = |year: i32| {
        NaiveDate::from_ymd_opt(year, birth_date.month(), birth_date.day())
            .or_else(|| NaiveDate::from_ymd_opt(year, 2, 28))
    };
    let this_year = in_year(today.year())?;
    if this_year >= today {
        Some(this_year)
    } else {
        in_year(today.year() + 1)
    }
}
