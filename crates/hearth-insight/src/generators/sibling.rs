//! Sibling dynamics mined from graph edges and survey signals.
//!
//! Three edge patterns (teaching relationships, shared interests,
//! complementary-skill pairs) plus survey-sourced signal nodes, each mapped
//! to its own insight template with tailored action items.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use hearth_core::types::{Insight, InsightType, MemberRole, Severity};
use hearth_storage::GraphEdgeRow;

use crate::context::InsightContext;
use crate::error::InsightError;

use super::new_insight;

/// Edge type for stored sibling influence relationships.
const SIBLING_INFLUENCE_EDGE: &str = "sibling_influence";
/// Edge type for stored shared-interest relationships.
const SHARED_INTEREST_EDGE: &str = "shared_interest";
/// Node type for survey-sourced sibling signals.
const SURVEY_SIGNAL_NODE: &str = "survey_signal";

/// Mine sibling relationship patterns. Requires at least two children.
pub fn sibling_dynamics(
    ctx: &InsightContext,
    family_id: &str,
    now: DateTime<Utc>,
) -> Result<Vec<Insight>, InsightError> {
    let members = ctx.family.list_members(family_id)?;
    let children: Vec<_> = members
        .iter()
        .filter(|m| m.role == MemberRole::Child)
        .collect();
    if children.len() < 2 {
        return Ok(vec![]);
    }

    let names: HashMap<String, &str> = members
        .iter()
        .map(|m| (m.id.to_string(), m.name.as_str()))
        .collect();

    let mut insights = Vec::new();

    let influence = ctx.graph.edges_of_type(family_id, SIBLING_INFLUENCE_EDGE)?;

    // Teaching relationships: influence_type = "teacher" with non-empty domains.
    let teaching: Vec<&GraphEdgeRow> = influence
        .iter()
        .filter(|e| {
            e.properties["influence_type"] == "teacher"
                && e.properties["domains"]
                    .as_array()
                    .is_some_and(|d| !d.is_empty())
        })
        .collect();

    for edge in &teaching {
        // Dangling member references are skipped, not fatal.
        let (Some(teacher), Some(learner)) =
            (names.get(&edge.source_id), names.get(&edge.target_id))
        else {
            continue;
        };
        let domains = edge.properties["domains"]
            .as_array()
            .map(|d| {
                d.iter()
                    .filter_map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();
        insights.push(new_insight(
            family_id,
            InsightType::SiblingDynamics,
            format!("{} is teaching {}", teacher, learner),
            format!("{} has been showing {} {}.", teacher, learner, domains),
            Severity::Low,
            0.85,
            vec![edge.source_id.clone(), edge.target_id.clone()],
            vec![
                format!("Give {} and {} time for it this week", teacher, learner),
                format!("Ask {} what they learned", learner),
            ],
            now,
        ));
    }

    // Complementary skills: teaching edges in both directions between a pair.
    let mut seen_pairs: HashSet<(String, String)> = HashSet::new();
    for edge in &teaching {
        let reverse = teaching.iter().any(|other| {
            other.source_id == edge.target_id && other.target_id == edge.source_id
        });
        if !reverse {
            continue;
        }
        let key = ordered_pair(&edge.source_id, &edge.target_id);
        if !seen_pairs.insert(key) {
            continue;
        }
        let (Some(a), Some(b)) = (names.get(&edge.source_id), names.get(&edge.target_id)) else {
            continue;
        };
        insights.push(new_insight(
            family_id,
            InsightType::SiblingDynamics,
            format!("{} and {} teach each other", a, b),
            format!(
                "{} and {} each have skills the other is learning from.",
                a, b
            ),
            Severity::Low,
            0.8,
            vec![edge.source_id.clone(), edge.target_id.clone()],
            vec![format!("Plan a project {} and {} can build together", a, b)],
            now,
        ));
    }

    // Shared interests.
    for edge in ctx.graph.edges_of_type(family_id, SHARED_INTEREST_EDGE)? {
        let interests = edge.properties["interests"]
            .as_array()
            .map(|d| {
                d.iter()
                    .filter_map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();
        if interests.is_empty() {
            continue;
        }
        let (Some(a), Some(b)) = (names.get(&edge.source_id), names.get(&edge.target_id)) else {
            continue;
        };
        insights.push(new_insight(
            family_id,
            InsightType::SiblingDynamics,
            format!("{} and {} share interests", a, b),
            format!("{} and {} are both into {}.", a, b, interests),
            Severity::Low,
            0.75,
            vec![edge.source_id.clone(), edge.target_id.clone()],
            vec![format!("Find an activity around {} for both", interests)],
            now,
        ));
    }

    // Survey-sourced signals.
    for node in ctx.graph.nodes_of_type(family_id, SURVEY_SIGNAL_NODE)? {
        let Some(signal) = node.properties["signal"].as_str() else {
            continue;
        };
        let subject = node.properties["subject_id"]
            .as_str()
            .and_then(|id| names.get(id).copied())
            .unwrap_or("a sibling");
        let detail = node.properties["detail"].as_str().unwrap_or("");
        let subject_entities: Vec<String> = node.properties["subject_id"]
            .as_str()
            .map(|s| vec![s.to_string()])
            .unwrap_or_default();

        let insight = match signal {
            "talent_spotted" => Some((
                format!("A talent was spotted in {}", subject),
                format!("A sibling noticed a talent: {}.", detail),
                0.9,
                vec![format!("Encourage {} to pursue it", subject)],
            )),
            "activity_suggested" => Some((
                format!("Activity suggested for {}", subject),
                format!("A sibling suggested an activity: {}.", detail),
                0.7,
                vec!["Look into the suggested activity".to_string()],
            )),
            "skill_learned" => Some((
                format!("{} learned something new", subject),
                format!("{} picked up a new skill: {}.", subject, detail),
                0.8,
                vec![format!("Have {} show the family", subject)],
            )),
            "help_recognized" => Some((
                format!("{} was a big help", subject),
                format!("A sibling recognized {}'s help: {}.", subject, detail),
                0.75,
                vec![format!("Thank {} for helping out", subject)],
            )),
            "challenge_issued" => Some((
                format!("A challenge for {}", subject),
                format!("A sibling issued a friendly challenge: {}.", detail),
                0.65,
                vec!["Set up the challenge with clear rules".to_string()],
            )),
            _ => None,
        };

        if let Some((title, description, confidence, action_items)) = insight {
            insights.push(new_insight(
                family_id,
                InsightType::SiblingDynamics,
                title,
                description,
                Severity::Low,
                confidence,
                subject_entities,
                action_items,
                now,
            ));
        }
    }

    Ok(insights)
}

fn ordered_pair(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    use crate::generators::fixtures::{context, member};

    fn two_children(ctx: &InsightContext) -> (Uuid, Uuid) {
        let ada = member("fam-1", "Ada", MemberRole::Child);
        let ben = member("fam-1", "Ben", MemberRole::Child);
        ctx.family.save_member(&ada).unwrap();
        ctx.family.save_member(&ben).unwrap();
        (ada.id, ben.id)
    }

    #[test]
    fn test_requires_two_children() {
        let (_db, ctx) = context();
        let ada = member("fam-1", "Ada", MemberRole::Child);
        ctx.family.save_member(&ada).unwrap();
        ctx.graph
            .upsert_edge(
                "fam-1",
                SIBLING_INFLUENCE_EDGE,
                "e-1",
                ("person", &ada.id.to_string()),
                ("person", "missing"),
                &json!({"influence_type": "teacher", "domains": ["chess"]}),
            )
            .unwrap();
        assert!(sibling_dynamics(&ctx, "fam-1", Utc::now()).unwrap().is_empty());
    }

    #[test]
    fn test_teaching_relationship() {
        let (_db, ctx) = context();
        let (ada, ben) = two_children(&ctx);
        ctx.graph
            .upsert_edge(
                "fam-1",
                SIBLING_INFLUENCE_EDGE,
                "e-1",
                ("person", &ada.to_string()),
                ("person", &ben.to_string()),
                &json!({"influence_type": "teacher", "domains": ["chess", "origami"]}),
            )
            .unwrap();

        let insights = sibling_dynamics(&ctx, "fam-1", Utc::now()).unwrap();
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].title, "Ada is teaching Ben");
        assert!(insights[0].description.contains("chess"));
        assert!((insights[0].confidence - 0.85).abs() < f32::EPSILON);
        assert_eq!(insights[0].entities.len(), 2);
    }

    #[test]
    fn test_teaching_requires_domains() {
        let (_db, ctx) = context();
        let (ada, ben) = two_children(&ctx);
        ctx.graph
            .upsert_edge(
                "fam-1",
                SIBLING_INFLUENCE_EDGE,
                "e-1",
                ("person", &ada.to_string()),
                ("person", &ben.to_string()),
                &json!({"influence_type": "teacher", "domains": []}),
            )
            .unwrap();
        assert!(sibling_dynamics(&ctx, "fam-1", Utc::now()).unwrap().is_empty());
    }

    #[test]
    fn test_complementary_pair_from_bidirectional_teaching() {
        let (_db, ctx) = context();
        let (ada, ben) = two_children(&ctx);
        ctx.graph
            .upsert_edge(
                "fam-1",
                SIBLING_INFLUENCE_EDGE,
                "e-1",
                ("person", &ada.to_string()),
                ("person", &ben.to_string()),
                &json!({"influence_type": "teacher", "domains": ["chess"]}),
            )
            .unwrap();
        ctx.graph
            .upsert_edge(
                "fam-1",
                SIBLING_INFLUENCE_EDGE,
                "e-2",
                ("person", &ben.to_string()),
                ("person", &ada.to_string()),
                &json!({"influence_type": "teacher", "domains": ["drawing"]}),
            )
            .unwrap();

        let insights = sibling_dynamics(&ctx, "fam-1", Utc::now()).unwrap();
        // Two teaching insights plus exactly one complementary-pair insight.
        let complementary: Vec<_> = insights
            .iter()
            .filter(|i| i.title.contains("teach each other"))
            .collect();
        assert_eq!(complementary.len(), 1);
        assert!((complementary[0].confidence - 0.8).abs() < f32::EPSILON);
        assert_eq!(insights.len(), 3);
    }

    #[test]
    fn test_shared_interest() {
        let (_db, ctx) = context();
        let (ada, ben) = two_children(&ctx);
        ctx.graph
            .upsert_edge(
                "fam-1",
                SHARED_INTEREST_EDGE,
                "e-1",
                ("person", &ada.to_string()),
                ("person", &ben.to_string()),
                &json!({"interests": ["lego", "space"]}),
            )
            .unwrap();

        let insights = sibling_dynamics(&ctx, "fam-1", Utc::now()).unwrap();
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].title, "Ada and Ben share interests");
        assert!((insights[0].confidence - 0.75).abs() < f32::EPSILON);
    }

    #[test]
    fn test_survey_signals_each_have_templates() {
        let (_db, ctx) = context();
        let (ada, _ben) = two_children(&ctx);

        let signals = [
            ("talent_spotted", 0.9f32),
            ("activity_suggested", 0.7),
            ("skill_learned", 0.8),
            ("help_recognized", 0.75),
            ("challenge_issued", 0.65),
        ];
        for (i, (signal, _)) in signals.iter().enumerate() {
            ctx.graph
                .upsert_node(
                    "fam-1",
                    SURVEY_SIGNAL_NODE,
                    &format!("s-{}", i),
                    signal,
                    &json!({
                        "signal": signal,
                        "subject_id": ada.to_string(),
                        "detail": "observed during the week",
                    }),
                )
                .unwrap();
        }

        let insights = sibling_dynamics(&ctx, "fam-1", Utc::now()).unwrap();
        assert_eq!(insights.len(), 5);
        for (_, confidence) in signals {
            assert!(
                insights
                    .iter()
                    .any(|i| (i.confidence - confidence).abs() < f32::EPSILON),
                "missing insight with confidence {}",
                confidence
            );
        }
        assert!(insights.iter().all(|i| i.actionable));
    }

    #[test]
    fn test_dangling_member_reference_skipped() {
        let (_db, ctx) = context();
        let (ada, _ben) = two_children(&ctx);
        ctx.graph
            .upsert_edge(
                "fam-1",
                SIBLING_INFLUENCE_EDGE,
                "e-1",
                ("person", &ada.to_string()),
                ("person", &Uuid::new_v4().to_string()),
                &json!({"influence_type": "teacher", "domains": ["chess"]}),
            )
            .unwrap();
        // The edge points at an unknown member; it is skipped, not an error.
        assert!(sibling_dynamics(&ctx, "fam-1", Utc::now()).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_signal_ignored() {
        let (_db, ctx) = context();
        let (ada, _ben) = two_children(&ctx);
        ctx.graph
            .upsert_node(
                "fam-1",
                SURVEY_SIGNAL_NODE,
                "s-1",
                "mystery",
                &json!({"signal": "mystery", "subject_id": ada.to_string()}),
            )
            .unwrap();
        assert!(sibling_dynamics(&ctx, "fam-1", Utc::now()).unwrap().is_empty());
    }
}
