use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// Broad category of an extracted entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    Person,
    Place,
    Temporal,
    Medical,
    Concept,
    Object,
    Organization,
    Contact,
    Web,
    Document,
    Task,
}

impl EntityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Place => "place",
            Self::Temporal => "temporal",
            Self::Medical => "medical",
            Self::Concept => "concept",
            Self::Object => "object",
            Self::Organization => "organization",
            Self::Contact => "contact",
            Self::Web => "web",
            Self::Document => "document",
            Self::Task => "task",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "person" => Some(Self::Person),
            "place" => Some(Self::Place),
            "temporal" => Some(Self::Temporal),
            "medical" => Some(Self::Medical),
            "concept" => Some(Self::Concept),
            "object" => Some(Self::Object),
            "organization" => Some(Self::Organization),
            "contact" => Some(Self::Contact),
            "web" => Some(Self::Web),
            "document" => Some(Self::Document),
            "task" => Some(Self::Task),
            _ => None,
        }
    }
}

/// Document type tag that drives extraction branching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Medical,
    School,
    Activity,
    Family,
    Email,
    Generic,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Medical => "medical",
            Self::School => "school",
            Self::Activity => "activity",
            Self::Family => "family",
            Self::Email => "email",
            Self::Generic => "generic",
        }
    }

    /// Parse a document type tag. Unknown tags fall through to `Generic`.
    pub fn from_tag(s: &str) -> Self {
        match s {
            "medical" => Self::Medical,
            "school" => Self::School,
            "activity" => Self::Activity,
            "family" => Self::Family,
            "email" => Self::Email,
            _ => Self::Generic,
        }
    }
}

/// Severity of an insight or suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    /// Map severity to the urgency of a derived notification.
    pub fn urgency(&self) -> Urgency {
        match self {
            Self::High => Urgency::Urgent,
            Self::Medium => Urgency::Important,
            Self::Low => Urgency::Normal,
        }
    }
}

/// Urgency of a notification projected from an insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Normal,
    Important,
    Urgent,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Important => "important",
            Self::Urgent => "urgent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "normal" => Some(Self::Normal),
            "important" => Some(Self::Important),
            "urgent" => Some(Self::Urgent),
            _ => None,
        }
    }
}

/// The ten kinds of insight the generators can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightType {
    WorkloadImbalance,
    SchedulingConflict,
    OverdueTask,
    SiblingDynamics,
    RelationshipHealth,
    MedicalReminder,
    Milestone,
    FamilyTime,
    TaskStreak,
    EventPreparation,
}

impl InsightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WorkloadImbalance => "workload_imbalance",
            Self::SchedulingConflict => "scheduling_conflict",
            Self::OverdueTask => "overdue_task",
            Self::SiblingDynamics => "sibling_dynamics",
            Self::RelationshipHealth => "relationship_health",
            Self::MedicalReminder => "medical_reminder",
            Self::Milestone => "milestone",
            Self::FamilyTime => "family_time",
            Self::TaskStreak => "task_streak",
            Self::EventPreparation => "event_preparation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "workload_imbalance" => Some(Self::WorkloadImbalance),
            "scheduling_conflict" => Some(Self::SchedulingConflict),
            "overdue_task" => Some(Self::OverdueTask),
            "sibling_dynamics" => Some(Self::SiblingDynamics),
            "relationship_health" => Some(Self::RelationshipHealth),
            "medical_reminder" => Some(Self::MedicalReminder),
            "milestone" => Some(Self::Milestone),
            "family_time" => Some(Self::FamilyTime),
            "task_streak" => Some(Self::TaskStreak),
            "event_preparation" => Some(Self::EventPreparation),
            _ => None,
        }
    }
}

/// Insight lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightStatus {
    Active,
    Dismissed,
}

impl InsightStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Dismissed => "dismissed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "dismissed" => Some(Self::Dismissed),
            _ => None,
        }
    }
}

/// Qualitative confidence attached to a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    VeryHigh,
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VeryHigh => "very_high",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "very_high" => Some(Self::VeryHigh),
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

/// The ten kinds of suggestion the engine can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionType {
    TaskOptimization,
    WorkloadBalance,
    RelationshipEnhancement,
    ChildDevelopment,
    FamilyActivity,
    ScheduleOptimization,
    HealthWellness,
    EducationalOpportunity,
    FinancialOptimization,
    SiblingDynamics,
}

impl SuggestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaskOptimization => "task_optimization",
            Self::WorkloadBalance => "workload_balance",
            Self::RelationshipEnhancement => "relationship_enhancement",
            Self::ChildDevelopment => "child_development",
            Self::FamilyActivity => "family_activity",
            Self::ScheduleOptimization => "schedule_optimization",
            Self::HealthWellness => "health_wellness",
            Self::EducationalOpportunity => "educational_opportunity",
            Self::FinancialOptimization => "financial_optimization",
            Self::SiblingDynamics => "sibling_dynamics",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "task_optimization" => Some(Self::TaskOptimization),
            "workload_balance" => Some(Self::WorkloadBalance),
            "relationship_enhancement" => Some(Self::RelationshipEnhancement),
            "child_development" => Some(Self::ChildDevelopment),
            "family_activity" => Some(Self::FamilyActivity),
            "schedule_optimization" => Some(Self::ScheduleOptimization),
            "health_wellness" => Some(Self::HealthWellness),
            "educational_opportunity" => Some(Self::EducationalOpportunity),
            "financial_optimization" => Some(Self::FinancialOptimization),
            "sibling_dynamics" => Some(Self::SiblingDynamics),
            _ => None,
        }
    }
}

/// Suggestion lifecycle state. Terminal once it leaves `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionStatus {
    Active,
    Implemented,
    Dismissed,
}

impl SuggestionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Implemented => "implemented",
            Self::Dismissed => "dismissed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "implemented" => Some(Self::Implemented),
            "dismissed" => Some(Self::Dismissed),
            _ => None,
        }
    }
}

/// Role of a family member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Parent,
    Guardian,
    Child,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parent => "parent",
            Self::Guardian => "guardian",
            Self::Child => "child",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "parent" => Some(Self::Parent),
            "guardian" => Some(Self::Guardian),
            "child" => Some(Self::Child),
            _ => None,
        }
    }

    /// Parents and guardians both count as guardians for workload analysis.
    pub fn is_guardian(&self) -> bool {
        matches!(self, Self::Parent | Self::Guardian)
    }
}

/// Family task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Open,
    Completed,
}

impl TaskState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(Self::Open),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

// =============================================================================
// Graph types
// =============================================================================

/// A typed, named fact extracted from a document.
///
/// Immutable once created except through deduplication-merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: Uuid,
    pub entity_type: String,
    pub value: String,
    pub category: EntityCategory,
    pub confidence: f32,
    pub created_at: DateTime<Utc>,
}

impl Entity {
    pub fn new(entity_type: &str, value: &str, category: EntityCategory, confidence: f32) -> Self {
        Self {
            id: Uuid::new_v4(),
            entity_type: entity_type.to_string(),
            value: value.to_string(),
            category,
            confidence,
            created_at: Utc::now(),
        }
    }
}

/// A directed, typed, labeled edge between two entities.
///
/// Duplicate semantic edges between the same pair are allowed; readers must
/// tolerate dangling endpoints (skip, don't crash).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    pub id: Uuid,
    pub source_id: Uuid,
    pub target_id: Uuid,
    pub rel_type: String,
    pub label: String,
    pub confidence: f32,
    pub created_at: DateTime<Utc>,
}

impl Relationship {
    pub fn new(source_id: Uuid, target_id: Uuid, rel_type: &str, label: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_id,
            target_id,
            rel_type: rel_type.to_string(),
            label: label.to_string(),
            confidence: 1.0,
            created_at: Utc::now(),
        }
    }

    /// True when this edge connects the given pair in either direction.
    pub fn connects(&self, a: Uuid, b: Uuid) -> bool {
        (self.source_id == a && self.target_id == b)
            || (self.source_id == b && self.target_id == a)
    }
}

/// The entity/relationship set derived from one or more documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeGraph {
    pub id: Uuid,
    pub family_id: String,
    pub document_ids: Vec<Uuid>,
    pub entities: Vec<Entity>,
    pub relationships: Vec<Relationship>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_merged: bool,
}

// =============================================================================
// Insight and suggestion types
// =============================================================================

/// A completed action item on an insight or suggestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionCompletion {
    pub action_index: usize,
    pub user_id: String,
    pub completed_at: DateTime<Utc>,
}

/// A system-generated, severity-ranked observation about family data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub id: Uuid,
    pub family_id: String,
    pub insight_type: InsightType,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    /// Ids of the entities that triggered this insight (member ids, event
    /// ids, graph entity ids), used for downstream linking.
    pub entities: Vec<String>,
    pub actionable: bool,
    pub action_items: Vec<String>,
    pub confidence: f32,
    pub generated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub status: InsightStatus,
    pub seen_by: Vec<String>,
    pub actions_completed: Vec<ActionCompletion>,
}

/// An actionable, relevance-ranked recommendation with a feedback lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: Uuid,
    pub family_id: String,
    pub suggestion_type: SuggestionType,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub entities: Vec<String>,
    pub actionable: bool,
    pub action_items: Vec<String>,
    pub confidence: f32,
    pub relevance_score: f64,
    pub confidence_level: ConfidenceLevel,
    pub generated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub status: SuggestionStatus,
    pub seen_by: Vec<String>,
    pub feedback_count: u32,
    pub implemented_count: u32,
    pub implemented_by: Vec<String>,
    pub dismissal_reason: Option<String>,
}

/// Append-only feedback record for a suggestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionFeedback {
    pub id: Uuid,
    pub suggestion_id: Uuid,
    pub family_id: String,
    pub user_id: String,
    /// 1 to 5 stars.
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A notification projected from an actionable insight.
///
/// One-way projection: later changes to the insight do not flow back here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub family_id: String,
    pub title: String,
    pub body: String,
    pub urgency: Urgency,
    pub action_items: Vec<String>,
    pub source_insight_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Family records
// =============================================================================

/// A member of a family, the unit insights and suggestions are scoped to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyMember {
    pub id: Uuid,
    pub family_id: String,
    pub name: String,
    pub role: MemberRole,
    pub birth_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// A household task assigned to a member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyTask {
    pub id: Uuid,
    pub family_id: String,
    pub title: String,
    pub task_type: String,
    pub assignee_id: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
    pub status: TaskState,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A calendar event with attendees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyEvent {
    pub id: Uuid,
    pub family_id: String,
    pub title: String,
    pub category: String,
    pub event_date: NaiveDate,
    pub event_time: Option<NaiveTime>,
    pub attendee_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// What a recurring schedule generates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleKind {
    Insights,
    Suggestions,
}

impl ScheduleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insights => "insights",
            Self::Suggestions => "suggestions",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "insights" => Some(Self::Insights),
            "suggestions" => Some(Self::Suggestions),
            _ => None,
        }
    }
}

/// How often a schedule fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleFrequency {
    Hourly,
    Daily,
    Weekly,
}

impl ScheduleFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "hourly" => Some(Self::Hourly),
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            _ => None,
        }
    }

    /// The interval between runs.
    pub fn interval(&self) -> chrono::Duration {
        match self {
            Self::Hourly => chrono::Duration::hours(1),
            Self::Daily => chrono::Duration::days(1),
            Self::Weekly => chrono::Duration::weeks(1),
        }
    }
}

/// A durable recurring generation schedule.
///
/// Rows survive process restarts; a stateless runner picks up due rows,
/// executes them, and advances `next_run`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub id: Uuid,
    pub family_id: String,
    pub kind: ScheduleKind,
    pub frequency: ScheduleFrequency,
    pub next_run: DateTime<Utc>,
    pub enabled: bool,
    pub last_run: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A stored family document with duplicate-detection bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub family_id: String,
    pub title: String,
    pub doc_type: DocumentType,
    pub category: Option<String>,
    pub source: Option<String>,
    pub author: Option<String>,
    pub file_type: Option<String>,
    pub language: Option<String>,
    pub tags: Vec<String>,
    /// Raw text content, used for content similarity.
    pub content: Option<String>,
    pub doc_date: Option<NaiveDate>,
    pub has_graph: bool,
    pub graph_id: Option<Uuid>,
    pub is_duplicate: bool,
    pub original_document_id: Option<Uuid>,
    pub duplicate_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}
