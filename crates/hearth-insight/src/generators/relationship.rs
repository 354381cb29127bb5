//! Relationship health and whole-family time.

use chrono::{DateTime, Duration, Utc};

use hearth_core::types::{FamilyEvent, FamilyMember, Insight, InsightType, MemberRole, Severity};

use crate::context::InsightContext;
use crate::error::InsightError;

use super::new_insight;

/// Days without a shared guardian event before flagging.
const COUPLE_WINDOW_DAYS: i64 = 30;
/// Days without a whole-family event before flagging.
const FAMILY_WINDOW_DAYS: i64 = 21;
/// Minimum attendees for an event to count as whole-family time.
const FAMILY_EVENT_MIN_ATTENDEES: usize = 3;

/// Flag when the guardians have had no shared event recently.
pub fn relationship_health(
    ctx: &InsightContext,
    family_id: &str,
    now: DateTime<Utc>,
) -> Result<Vec<Insight>, InsightError> {
    let members = ctx.family.list_members(family_id)?;
    let guardians: Vec<&FamilyMember> =
        members.iter().filter(|m| m.role.is_guardian()).collect();
    if guardians.len() < 2 {
        return Ok(vec![]);
    }

    let today = now.date_naive();
    let window_start = today - Duration::days(COUPLE_WINDOW_DAYS);
    let events = ctx.family.list_events(family_id)?;

    let shared_recent = events.iter().any(|event| {
        event.event_date >= window_start
            && event.event_date <= today
            && guardians
                .iter()
                .filter(|g| event.attendee_ids.contains(&g.id))
                .count()
                >= 2
    });

    if shared_recent {
        return Ok(vec![]);
    }

    Ok(vec![new_insight(
        family_id,
        InsightType::RelationshipHealth,
        "No shared time for the adults lately".to_string(),
        format!(
            "The guardians have had no shared event in the last {} days.",
            COUPLE_WINDOW_DAYS
        ),
        Severity::Medium,
        0.7,
        guardians.iter().map(|g| g.id.to_string()).collect(),
        vec![
            "Put a shared evening on the calendar".to_string(),
            "Arrange childcare if needed".to_string(),
        ],
        now,
    )])
}

/// Flag when no recent event brought most of the family together.
pub fn family_time(
    ctx: &InsightContext,
    family_id: &str,
    now: DateTime<Utc>,
) -> Result<Vec<Insight>, InsightError> {
    let members = ctx.family.list_members(family_id)?;
    let has_guardian = members.iter().any(|m| m.role.is_guardian());
    let has_child = members.iter().any(|m| m.role == MemberRole::Child);
    if !has_guardian || !has_child {
        return Ok(vec![]);
    }

    let today = now.date_naive();
    let window_start = today - Duration::days(FAMILY_WINDOW_DAYS);
    let events = ctx.family.list_events(family_id)?;

    let whole_family_recent = events
        .iter()
        .any(|event| is_family_event(event, &members) && event.event_date >= window_start && event.event_date <= today);

    if whole_family_recent {
        return Ok(vec![]);
    }

    Ok(vec![new_insight(
        family_id,
        InsightType::FamilyTime,
        "Time for a family activity".to_string(),
        format!(
            "No event brought the family together in the last {} days.",
            FAMILY_WINDOW_DAYS
        ),
        Severity::Medium,
        0.7,
        members.iter().map(|m| m.id.to_string()).collect(),
        vec!["Plan something everyone can join this weekend".to_string()],
        now,
    )])
}

/// An event counts as family time when it has enough attendees and spans a
/// guardian and a child.
fn is_family_event(event: &FamilyEvent, members: &[FamilyMember]) -> bool {
    if event.attendee_ids.len() < FAMILY_EVENT_MIN_ATTENDEES {
        return false;
    }
    let attending = |role_check: fn(&FamilyMember) -> bool| {
        members
            .iter()
            .any(|m| role_check(m) && event.attendee_ids.contains(&m.id))
    };
    attending(|m| m.role.is_guardian()) && attending(|m| m.role == MemberRole::Child)
}
