//! Type-branched entity extraction from analyzed fields.
//!
//! Each document type maps its well-known structured fields to typed
//! entities. Unmapped document types fall through to the generic branch.

use hearth_core::types::{DocumentType, Entity, EntityCategory};

use crate::types::ExtractionResult;

/// Confidence assigned to entities from structured analyzer fields.
const STRUCTURED_CONFIDENCE: f32 = 0.9;

/// Map the analyzed fields to typed entities for the given document type.
pub fn extract_entities(doc_type: DocumentType, result: &ExtractionResult) -> Vec<Entity> {
    let mut entities = Vec::new();

    match doc_type {
        DocumentType::Medical => {
            push_opt(&mut entities, "patient", EntityCategory::Person, &result.patient_name);
            push_opt(&mut entities, "provider", EntityCategory::Person, &result.provider_name);
            push_opt(&mut entities, "diagnosis", EntityCategory::Medical, &result.diagnosis);
            for med in &result.medications {
                entities.push(Entity::new(
                    "medication",
                    med,
                    EntityCategory::Medical,
                    STRUCTURED_CONFIDENCE,
                ));
            }
        }
        DocumentType::School => {
            push_opt(&mut entities, "student", EntityCategory::Person, &result.student_name);
            push_opt(&mut entities, "school", EntityCategory::Organization, &result.school_name);
            push_opt(&mut entities, "teacher", EntityCategory::Person, &result.teacher_name);
            push_opt(&mut entities, "grade", EntityCategory::Concept, &result.grade);
        }
        DocumentType::Activity => {
            push_opt(&mut entities, "activity", EntityCategory::Concept, &result.activity_name);
            push_opt(&mut entities, "instructor", EntityCategory::Person, &result.instructor_name);
            for participant in &result.participants {
                entities.push(Entity::new(
                    "participant",
                    participant,
                    EntityCategory::Person,
                    STRUCTURED_CONFIDENCE,
                ));
            }
        }
        DocumentType::Family => {
            push_opt(&mut entities, "occasion", EntityCategory::Concept, &result.occasion);
            for person in &result.people {
                entities.push(Entity::new(
                    "person",
                    person,
                    EntityCategory::Person,
                    STRUCTURED_CONFIDENCE,
                ));
            }
        }
        DocumentType::Email => {
            push_opt(&mut entities, "sender", EntityCategory::Person, &result.sender);
            for recipient in &result.recipients {
                entities.push(Entity::new(
                    "recipient",
                    recipient,
                    EntityCategory::Person,
                    STRUCTURED_CONFIDENCE,
                ));
            }
            push_opt(&mut entities, "subject", EntityCategory::Concept, &result.subject);
        }
        DocumentType::Generic => {
            for person in &result.people {
                entities.push(Entity::new(
                    "person",
                    person,
                    EntityCategory::Person,
                    STRUCTURED_CONFIDENCE,
                ));
            }
            for org in &result.organizations {
                entities.push(Entity::new(
                    "organization",
                    org,
                    EntityCategory::Organization,
                    STRUCTURED_CONFIDENCE,
                ));
            }
            for concept in &result.concepts {
                entities.push(Entity::new(
                    "concept",
                    concept,
                    EntityCategory::Concept,
                    STRUCTURED_CONFIDENCE,
                ));
            }
            for date in &result.dates {
                entities.push(Entity::new(
                    "date",
                    date,
                    EntityCategory::Temporal,
                    STRUCTURED_CONFIDENCE,
                ));
            }
        }
    }

    // Shared fields present on every branch.
    push_opt(&mut entities, "date", EntityCategory::Temporal, &result.date);
    push_opt(&mut entities, "location", EntityCategory::Place, &result.location);

    entities
}

fn push_opt(
    entities: &mut Vec<Entity>,
    entity_type: &str,
    category: EntityCategory,
    value: &Option<String>,
) {
    if let Some(v) = value {
        if !v.trim().is_empty() {
            entities.push(Entity::new(
                entity_type,
                v.trim(),
                category,
                STRUCTURED_CONFIDENCE,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_medical_branch() {
        let result = ExtractionResult {
            patient_name: Some("Sam".to_string()),
            provider_name: Some("Dr. Lee".to_string()),
            diagnosis: Some("flu".to_string()),
            ..Default::default()
        };
        let entities = extract_entities(DocumentType::Medical, &result);
        assert_eq!(entities.len(), 3);
        assert_eq!(entities[0].entity_type, "patient");
        assert_eq!(entities[0].value, "Sam");
        assert_eq!(entities[0].category, EntityCategory::Person);
        assert_eq!(entities[1].entity_type, "provider");
        assert_eq!(entities[2].entity_type, "diagnosis");
        assert_eq!(entities[2].category, EntityCategory::Medical);
    }

    #[test]
    fn test_medical_medications_one_entity_each() {
        let result = ExtractionResult {
            patient_name: Some("Sam".to_string()),
            medications: vec!["Amoxicillin".to_string(), "Ibuprofen".to_string()],
            ..Default::default()
        };
        let entities = extract_entities(DocumentType::Medical, &result);
        let meds: Vec<_> = entities
            .iter()
            .filter(|e| e.entity_type == "medication")
            .collect();
        assert_eq!(meds.len(), 2);
        assert!(meds.iter().all(|e| e.category == EntityCategory::Medical));
    }

    #[test]
    fn test_school_branch() {
        let result = ExtractionResult {
            student_name: Some("Ada".to_string()),
            school_name: Some("Lincoln Elementary".to_string()),
            teacher_name: Some("Ms. Park".to_string()),
            grade: Some("3rd".to_string()),
            ..Default::default()
        };
        let entities = extract_entities(DocumentType::School, &result);
        assert_eq!(entities.len(), 4);
        let school = entities.iter().find(|e| e.entity_type == "school").unwrap();
        assert_eq!(school.category, EntityCategory::Organization);
    }

    #[test]
    fn test_generic_branch() {
        let result = ExtractionResult {
            people: vec!["Alice".to_string()],
            organizations: vec!["Rec Center".to_string()],
            concepts: vec!["registration".to_string()],
            dates: vec!["2026-09-01".to_string()],
            ..Default::default()
        };
        let entities = extract_entities(DocumentType::Generic, &result);
        assert_eq!(entities.len(), 4);
        let date = entities.iter().find(|e| e.entity_type == "date").unwrap();
        assert_eq!(date.category, EntityCategory::Temporal);
    }

    #[test]
    fn test_shared_date_and_location_on_all_branches() {
        let result = ExtractionResult {
            patient_name: Some("Sam".to_string()),
            date: Some("2026-03-14".to_string()),
            location: Some("Clinic A".to_string()),
            ..Default::default()
        };
        let entities = extract_entities(DocumentType::Medical, &result);
        assert_eq!(entities.len(), 3);
        assert!(entities
            .iter()
            .any(|e| e.entity_type == "date" && e.category == EntityCategory::Temporal));
        assert!(entities
            .iter()
            .any(|e| e.entity_type == "location" && e.category == EntityCategory::Place));
    }

    #[test]
    fn test_blank_fields_skipped() {
        let result = ExtractionResult {
            patient_name: Some("   ".to_string()),
            ..Default::default()
        };
        let entities = extract_entities(DocumentType::Medical, &result);
        assert!(entities.is_empty());
    }

    #[test]
    fn test_email_branch() {
        let result = ExtractionResult {
            sender: Some("Coach Kim".to_string()),
            recipients: vec!["Dana".to_string(), "Lee".to_string()],
            subject: Some("Practice moved".to_string()),
            ..Default::default()
        };
        let entities = extract_entities(DocumentType::Email, &result);
        assert_eq!(entities.len(), 4);
        assert_eq!(
            entities
                .iter()
                .filter(|e| e.entity_type == "recipient")
                .count(),
            2
        );
    }
}
