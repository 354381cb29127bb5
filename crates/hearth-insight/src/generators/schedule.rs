//! Scheduling conflicts and event preparation.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use uuid::Uuid;

use hearth_core::types::{FamilyEvent, Insight, InsightType, Severity};

use crate::context::InsightContext;
use crate::error::InsightError;

use super::new_insight;

/// Event count on one day that raises a busy-day conflict to high severity.
const HIGH_SEVERITY_EVENT_COUNT: usize = 4;

/// Days ahead scanned for events that need preparation.
const PREPARATION_WINDOW_DAYS: i64 = 7;

/// Event categories that imply a preparation checklist.
const PREP_CATEGORIES: &[&str] = &["birthday", "trip", "performance", "holiday"];

/// Flag members with two or more events on the same day; exact start-time
/// collisions are reported separately as stricter time conflicts.
pub fn scheduling_conflict(
    ctx: &InsightContext,
    family_id: &str,
    now: DateTime<Utc>,
) -> Result<Vec<Insight>, InsightError> {
    let members = ctx.family.list_members(family_id)?;
    let names: HashMap<Uuid, &str> = members.iter().map(|m| (m.id, m.name.as_str())).collect();
    let events = ctx.family.list_events(family_id)?;

    // Bucket events per (member, date).
    let mut buckets: HashMap<(Uuid, NaiveDate), Vec<&FamilyEvent>> = HashMap::new();
    for event in &events {
        for attendee in &event.attendee_ids {
            buckets.entry((*attendee, event.event_date)).or_default().push(event);
        }
    }

    let mut insights = Vec::new();
    for ((member_id, date), day_events) in buckets {
        if day_events.len() < 2 {
            continue;
        }
        let name = names.get(&member_id).copied().unwrap_or("a family member");
        let mut entities: Vec<String> = vec![member_id.to_string()];
        entities.extend(day_events.iter().map(|e| e.id.to_string()));

        // Stricter check: two events starting at the same time of day.
        let time_collision = day_events.iter().enumerate().any(|(i, a)| {
            day_events.iter().skip(i + 1).any(|b| {
                a.event_time.is_some() && a.event_time == b.event_time
            })
        });

        if time_collision {
            insights.push(new_insight(
                family_id,
                InsightType::SchedulingConflict,
                format!("Time conflict for {} on {}", name, date),
                format!(
                    "{} has two events starting at the same time on {}.",
                    name, date
                ),
                Severity::High,
                0.95,
                entities.clone(),
                vec!["Reschedule or delegate one of the events".to_string()],
                now,
            ));
            continue;
        }

        let severity = if day_events.len() >= HIGH_SEVERITY_EVENT_COUNT {
            Severity::High
        } else {
            Severity::Medium
        };
        insights.push(new_insight(
            family_id,
            InsightType::SchedulingConflict,
            format!("Busy day for {} on {}", name, date),
            format!("{} has {} events on {}.", name, day_events.len(), date),
            severity,
            0.8,
            entities,
            vec!["Check transitions between events".to_string()],
            now,
        ));
    }

    Ok(insights)
}

/// Surface upcoming events whose category implies preparation work.
pub fn event_preparation(
    ctx: &InsightContext,
    family_id: &str,
    now: DateTime<Utc>,
) -> Result<Vec<Insight>, InsightError> {
    let today = now.date_naive();
    let horizon = today + Duration::days(PREPARATION_WINDOW_DAYS);
    let events = ctx.family.list_events(family_id)?;

    let mut insights = Vec::new();
    for event in events {
        if event.event_date < today || event.event_date > horizon {
            continue;
        }
        if !PREP_CATEGORIES.contains(&event.category.as_str()) {
            continue;
        }
        let days_until = (event.event_date - today).num_days();
        insights.push(new_insight(
            family_id,
            InsightType::EventPreparation,
            format!("Prepare for {}", event.title),
            format!(
                "{} is in {} day(s) ({}).",
                event.title, days_until, event.event_date
            ),
            Severity::Medium,
            0.8,
            vec![event.id.to_string()],
            vec![
                "Confirm who is attending".to_string(),
                "Make a shopping or packing list".to_string(),
                "Arrange transport".to_string(),
            ],
            now,
        ));
    }

    Ok(insights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use hearth_core::types::MemberRole;

    use crate::generators::fixtures::{context, event, member};

    #[test]
    fn test_time_conflict_is_high_severity() {
        let (_db, ctx) = context();
        let ada = member("fam-1", "Ada", MemberRole::Child);
        ctx.family.save_member(&ada).unwrap();

        let date = NaiveDate::from_ymd_opt(2026, 8, 12).unwrap();
        let time = NaiveTime::from_hms_opt(16, 0, 0);
        ctx.family
            .save_event(&event("fam-1", "Soccer", date, time, vec![ada.id]))
            .unwrap();
        ctx.family
            .save_event(&event("fam-1", "Piano", date, time, vec![ada.id]))
            .unwrap();

        let insights = scheduling_conflict(&ctx, "fam-1", Utc::now()).unwrap();
        assert_eq!(insights.len(), 1);
        assert!(insights[0].title.starts_with("Time conflict for Ada"));
        assert_eq!(insights[0].severity, Severity::High);
        assert!((insights[0].confidence - 0.95).abs() < f32::EPSILON);
        // The member and both events are linked.
        assert_eq!(insights[0].entities.len(), 3);
    }

    #[test]
    fn test_busy_day_severity_scales_with_count() {
        let (_db, ctx) = context();
        let ada = member("fam-1", "Ada", MemberRole::Child);
        ctx.family.save_member(&ada).unwrap();

        let date = NaiveDate::from_ymd_opt(2026, 8, 12).unwrap();
        for (i, hour) in [9u32, 11, 14, 16].iter().enumerate() {
            ctx.family
                .save_event(&event(
                    "fam-1",
                    &format!("Event {}", i),
                    date,
                    NaiveTime::from_hms_opt(*hour, 0, 0),
                    vec![ada.id],
                ))
                .unwrap();
        }

        let insights = scheduling_conflict(&ctx, "fam-1", Utc::now()).unwrap();
        assert_eq!(insights.len(), 1);
        assert!(insights[0].title.starts_with("Busy day"));
        assert_eq!(insights[0].severity, Severity::High);
        assert!((insights[0].confidence - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_two_events_different_times_is_medium() {
        let (_db, ctx) = context();
        let ada = member("fam-1", "Ada", MemberRole::Child);
        ctx.family.save_member(&ada).unwrap();

        let date = NaiveDate::from_ymd_opt(2026, 8, 12).unwrap();
        ctx.family
            .save_event(&event("fam-1", "Soccer", date, NaiveTime::from_hms_opt(9, 0, 0), vec![ada.id]))
            .unwrap();
        ctx.family
            .save_event(&event("fam-1", "Piano", date, NaiveTime::from_hms_opt(15, 0, 0), vec![ada.id]))
            .unwrap();

        let insights = scheduling_conflict(&ctx, "fam-1", Utc::now()).unwrap();
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].severity, Severity::Medium);
    }

    #[test]
    fn test_single_event_no_conflict() {
        let (_db, ctx) = context();
        let ada = member("fam-1", "Ada", MemberRole::Child);
        ctx.family.save_member(&ada).unwrap();
        ctx.family
            .save_event(&event(
                "fam-1",
                "Soccer",
                NaiveDate::from_ymd_opt(2026, 8, 12).unwrap(),
                None,
                vec![ada.id],
            ))
            .unwrap();
        assert!(scheduling_conflict(&ctx, "fam-1", Utc::now())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_event_preparation_window_and_category() {
        let (_db, ctx) = context();
        let now = Utc::now();
        let today = now.date_naive();

        let mut birthday = event(
            "fam-1",
            "Ada's birthday party",
            today + Duration::days(3),
            None,
            vec![],
        );
        birthday.category = "birthday".to_string();
        ctx.family.save_event(&birthday).unwrap();

        // Outside the window.
        let mut trip = event("fam-1", "Lake trip", today + Duration::days(20), None, vec![]);
        trip.category = "trip".to_string();
        ctx.family.save_event(&trip).unwrap();

        // In the window, but a category with no prep.
        ctx.family
            .save_event(&event("fam-1", "Soccer", today + Duration::days(2), None, vec![]))
            .unwrap();

        let insights = event_preparation(&ctx, "fam-1", now).unwrap();
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].title, "Prepare for Ada's birthday party");
        assert_eq!(insights[0].insight_type, InsightType::EventPreparation);
        assert!(insights[0].actionable);
        assert!(insights[0].action_items.len() >= 2);
    }
}
