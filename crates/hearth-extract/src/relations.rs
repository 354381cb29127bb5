//! Type-branched relationship templates and the unconditional linking passes.
//!
//! Templates connect every entity of type A to every entity of type B
//! present (cross-product, intentionally permissive). Two passes then run
//! unconditionally: temporal linking ("occurs_on") and contextual linking
//! ("related_to"). Both check existing relationships in either direction
//! before adding, so re-running them never duplicates edges.

use tracing::warn;

use hearth_core::types::{DocumentType, Entity, EntityCategory, Relationship};

/// Upper bound on pairs generated per pass per document. The cross-product
/// is unbounded in principle; this keeps pathological documents from
/// exploding the edge count.
const MAX_PAIRS_PER_PASS: usize = 64;

const TEMPLATE_CONFIDENCE: f32 = 0.9;
const TEMPORAL_CONFIDENCE: f32 = 0.8;
const CONTEXTUAL_CONFIDENCE: f32 = 0.6;

/// A semantic edge template: connect every `source_type` entity to every
/// `target_type` entity. Tuple layout: (source type, target type, rel type,
/// label).
type EdgeTemplate = (&'static str, &'static str, &'static str, &'static str);

const MEDICAL_TEMPLATES: &[EdgeTemplate] = &[
    ("patient", "provider", "treated_by", "treated by"),
    ("patient", "diagnosis", "diagnosed_with", "diagnosed with"),
    ("patient", "medication", "prescribed", "prescribed"),
];

const SCHOOL_TEMPLATES: &[EdgeTemplate] = &[
    ("student", "school", "attends", "attends"),
    ("student", "teacher", "taught_by", "taught by"),
];

const ACTIVITY_TEMPLATES: &[EdgeTemplate] = &[
    ("participant", "activity", "participates_in", "participates in"),
    ("activity", "instructor", "led_by", "led by"),
];

const FAMILY_TEMPLATES: &[EdgeTemplate] =
    &[("person", "occasion", "participates_in", "participates in")];

const EMAIL_TEMPLATES: &[EdgeTemplate] = &[("sender", "recipient", "sent_to", "sent to")];

const GENERIC_TEMPLATES: &[EdgeTemplate] =
    &[("person", "organization", "affiliated_with", "affiliated with")];

fn templates_for(doc_type: DocumentType) -> &'static [EdgeTemplate] {
    match doc_type {
        DocumentType::Medical => MEDICAL_TEMPLATES,
        DocumentType::School => SCHOOL_TEMPLATES,
        DocumentType::Activity => ACTIVITY_TEMPLATES,
        DocumentType::Family => FAMILY_TEMPLATES,
        DocumentType::Email => EMAIL_TEMPLATES,
        DocumentType::Generic => GENERIC_TEMPLATES,
    }
}

/// Build the full relationship set for an entity batch: type-specific
/// templates, then temporal linking, then contextual linking.
pub fn build_relationships(doc_type: DocumentType, entities: &[Entity]) -> Vec<Relationship> {
    let mut relationships = Vec::new();
    apply_templates(doc_type, entities, &mut relationships);
    link_temporal(entities, &mut relationships);
    link_contextual(entities, &mut relationships);
    relationships
}

/// Apply the document type's edge templates (cross-product per template).
fn apply_templates(
    doc_type: DocumentType,
    entities: &[Entity],
    relationships: &mut Vec<Relationship>,
) {
    let mut added = 0usize;
    for (source_type, target_type, rel_type, label) in templates_for(doc_type) {
        for source in entities.iter().filter(|e| e.entity_type == *source_type) {
            for target in entities.iter().filter(|e| e.entity_type == *target_type) {
                if added >= MAX_PAIRS_PER_PASS {
                    warn!(
                        "Template pass hit the {} pair cap; remaining pairs skipped",
                        MAX_PAIRS_PER_PASS
                    );
                    return;
                }
                let mut rel = Relationship::new(source.id, target.id, rel_type, label);
                rel.confidence = TEMPLATE_CONFIDENCE;
                relationships.push(rel);
                added += 1;
            }
        }
    }
}

/// Connect every non-temporal entity to every temporal entity with an
/// "occurs_on" edge, unless any relationship already links the pair.
pub fn link_temporal(entities: &[Entity], relationships: &mut Vec<Relationship>) {
    let mut added = 0usize;
    let temporal: Vec<&Entity> = entities
        .iter()
        .filter(|e| e.category == EntityCategory::Temporal)
        .collect();

    for entity in entities.iter().filter(|e| e.category != EntityCategory::Temporal) {
        for date in &temporal {
            if relationships.iter().any(|r| r.connects(entity.id, date.id)) {
                continue;
            }
            if added >= MAX_PAIRS_PER_PASS {
                warn!(
                    "Temporal pass hit the {} pair cap; remaining pairs skipped",
                    MAX_PAIRS_PER_PASS
                );
                return;
            }
            let mut rel = Relationship::new(entity.id, date.id, "temporal", "occurs_on");
            rel.confidence = TEMPORAL_CONFIDENCE;
            relationships.push(rel);
            added += 1;
        }
    }
}

/// Pairwise connect entities sharing a category with a "related_to" edge,
/// unless any relationship already links the pair.
pub fn link_contextual(entities: &[Entity], relationships: &mut Vec<Relationship>) {
    let mut added = 0usize;
    for (i, a) in entities.iter().enumerate() {
        for b in entities.iter().skip(i + 1) {
            if a.category != b.category {
                continue;
            }
            if relationships.iter().any(|r| r.connects(a.id, b.id)) {
                continue;
            }
            if added >= MAX_PAIRS_PER_PASS {
                warn!(
                    "Contextual pass hit the {} pair cap; remaining pairs skipped",
                    MAX_PAIRS_PER_PASS
                );
                return;
            }
            let mut rel = Relationship::new(a.id, b.id, "contextual", "related_to");
            rel.confidence = CONTEXTUAL_CONFIDENCE;
            relationships.push(rel);
            added += 1;
        }
    }
}
