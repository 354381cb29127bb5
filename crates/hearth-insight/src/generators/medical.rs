//! Medical reminders from stored medical documents.

use chrono::{DateTime, Duration, Utc};

use hearth_core::types::{DocumentType, Insight, InsightType, MemberRole, Severity};

use crate::context::InsightContext;
use crate::error::InsightError;

use super::new_insight;

/// Days ahead scanned for upcoming medical dates.
const UPCOMING_WINDOW_DAYS: i64 = 14;
/// Days since the last medical document before a checkup nudge.
const CHECKUP_GAP_DAYS: i64 = 365;

/// Remind about upcoming medical dates, and nudge for a checkup when no
/// medical document has been seen in a year.
pub fn medical_reminders(
    ctx: &InsightContext,
    family_id: &str,
    now: DateTime<Utc>,
) -> Result<Vec<Insight>, InsightError> {
    let today = now.date_naive();
    let docs = ctx.documents.find_by_type(family_id, DocumentType::Medical)?;

    let mut insights = Vec::new();

    // Upcoming appointments: medical documents dated in the near future.
    for doc in &docs {
        let Some(date) = doc.doc_date else { continue };
        if date < today || date > today + Duration::days(UPCOMING_WINDOW_DAYS) {
            continue;
        }
        let days_until = (date - today).num_days();
        insights.push(new_insight(
            family_id,
            InsightType::MedicalReminder,
            format!("Upcoming: {}", doc.title),
            format!("{} is in {} day(s) ({}).", doc.title, days_until, date),
            Severity::High,
            0.9,
            vec![doc.id.to_string()],
            vec![
                "Confirm the appointment".to_string(),
                "Arrange transport and coverage".to_string(),
            ],
            now,
        ));
    }

    // Checkup gap: no medical document within the past year.
    let members = ctx.family.list_members(family_id)?;
    let children: Vec<_> = members
        .iter()
        .filter(|m| m.role == MemberRole::Child)
        .collect();
    if !children.is_empty() {
        let gap_start = today - Duration::days(CHECKUP_GAP_DAYS);
        let recent_medical = docs
            .iter()
            .any(|d| d.doc_date.is_some_and(|date| date >= gap_start && date <= today));
        if !recent_medical {
            insights.push(new_insight(
                family_id,
                InsightType::MedicalReminder,
                "Annual checkups may be due".to_string(),
                "No medical record in the past year; the children may be due for checkups."
                    .to_string(),
                Severity::Medium,
                0.75,
                children.iter().map(|c| c.id.to_string()).collect(),
                vec!["Call the pediatrician to schedule checkups".to_string()],
                now,
            ));
        }
    }

    Ok(insights)
}
