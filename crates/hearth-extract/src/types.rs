use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The analyzed-field bundle produced by upstream document analysis.
///
/// Which fields are populated depends on the analyzer; the extractor
/// branches on `document_type` and maps whatever is present. Free `text`
/// additionally feeds the pattern-based contact pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionResult {
    /// Document type tag; falls back to the document's own type when absent.
    pub document_type: Option<String>,
    pub title: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,

    // Medical fields.
    pub patient_name: Option<String>,
    pub provider_name: Option<String>,
    pub diagnosis: Option<String>,
    pub medications: Vec<String>,

    // School fields.
    pub student_name: Option<String>,
    pub school_name: Option<String>,
    pub teacher_name: Option<String>,
    pub grade: Option<String>,

    // Activity fields.
    pub activity_name: Option<String>,
    pub instructor_name: Option<String>,
    pub participants: Vec<String>,

    // Family fields.
    pub occasion: Option<String>,

    // Email fields.
    pub sender: Option<String>,
    pub recipients: Vec<String>,
    pub subject: Option<String>,

    // Generic fields.
    pub people: Vec<String>,
    pub organizations: Vec<String>,
    pub concepts: Vec<String>,
    pub dates: Vec<String>,

    /// Raw text content for the contact pattern pass.
    pub text: Option<String>,
}

impl ExtractionResult {
    /// True when any structured field or free text is present.
    pub fn has_analysis(&self) -> bool {
        self.title.is_some()
            || self.date.is_some()
            || self.location.is_some()
            || self.patient_name.is_some()
            || self.provider_name.is_some()
            || self.diagnosis.is_some()
            || !self.medications.is_empty()
            || self.student_name.is_some()
            || self.school_name.is_some()
            || self.teacher_name.is_some()
            || self.grade.is_some()
            || self.activity_name.is_some()
            || self.instructor_name.is_some()
            || !self.participants.is_empty()
            || self.occasion.is_some()
            || self.sender.is_some()
            || !self.recipients.is_empty()
            || self.subject.is_some()
            || !self.people.is_empty()
            || !self.organizations.is_empty()
            || !self.concepts.is_empty()
            || !self.dates.is_empty()
            || self.text.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

/// Outcome of an extraction or merge operation.
///
/// Insufficient input is reported as a failed outcome, not an error: the
/// pipeline fails soft on missing analysis payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    pub success: bool,
    pub graph_id: Option<Uuid>,
    pub entity_count: usize,
    pub relationship_count: usize,
    pub error: Option<String>,
}

impl ExtractionOutcome {
    pub fn success(graph_id: Uuid, entity_count: usize, relationship_count: usize) -> Self {
        Self {
            success: true,
            graph_id: Some(graph_id),
            entity_count,
            relationship_count,
            error: None,
        }
    }

    pub fn failure(error: &str) -> Self {
        Self {
            success: false,
            graph_id: None,
            entity_count: 0,
            relationship_count: 0,
            error: Some(error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_result_has_no_analysis() {
        let result = ExtractionResult::default();
        assert!(!result.has_analysis());
    }

    #[test]
    fn test_whitespace_text_has_no_analysis() {
        let result = ExtractionResult {
            text: Some("   \n".to_string()),
            ..Default::default()
        };
        assert!(!result.has_analysis());
    }

    #[test]
    fn test_any_field_counts_as_analysis() {
        let result = ExtractionResult {
            patient_name: Some("Sam".to_string()),
            ..Default::default()
        };
        assert!(result.has_analysis());

        let result = ExtractionResult {
            medications: vec!["Amoxicillin".to_string()],
            ..Default::default()
        };
        assert!(result.has_analysis());

        let result = ExtractionResult {
            text: Some("free text only".to_string()),
            ..Default::default()
        };
        assert!(result.has_analysis());
    }

    #[test]
    fn test_outcome_constructors() {
        let id = Uuid::new_v4();
        let ok = ExtractionOutcome::success(id, 3, 2);
        assert!(ok.success);
        assert_eq!(ok.graph_id, Some(id));
        assert_eq!(ok.entity_count, 3);
        assert!(ok.error.is_none());

        let failed = ExtractionOutcome::failure("no usable analysis payload");
        assert!(!failed.success);
        assert!(failed.graph_id.is_none());
        assert_eq!(failed.entity_count, 0);
        assert_eq!(
            failed.error.as_deref(),
            Some("no usable analysis payload")
        );
    }

    #[test]
    fn test_result_deserializes_with_missing_fields() {
        let json = r#"{"document_type": "medical", "patient_name": "Sam"}"#;
        let result: ExtractionResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.patient_name.as_deref(), Some("Sam"));
        assert!(result.medications.is_empty());
        assert!(result.text.is_none());
    }
}
