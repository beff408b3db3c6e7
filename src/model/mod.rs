//! Canonical data model shared by every stage of the drift engine.
//!
//! All types are `Serialize`/`Deserialize` so findings and requirement items
//! can be sent over JSON-RPC or embedded in reports unchanged. Nodes and
//! documents are immutable once a normalizer has produced them; requirement
//! items are only ever dropped (staleness filter), never edited in place.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ─── Platform ─────────────────────────────────────────────────────────────────

/// Origin surface of a capture or node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Spec,
    Design,
    Web,
    Android,
    Ios,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Spec => "spec",
            Platform::Design => "design",
            Platform::Web => "web",
            Platform::Android => "android",
            Platform::Ios => "ios",
        }
    }

    /// True for captured UI surfaces (everything except the spec itself).
    pub fn is_capture(&self) -> bool {
        !matches!(self, Platform::Spec)
    }
}

// ─── Canonical node / document ───────────────────────────────────────────────

/// Rectangle bounds copied verbatim from a capture when present.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// One UI element in platform-neutral form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalNode {
    pub platform: Platform,
    /// Unique within the owning document.
    pub id: String,
    /// Role or tag (`"text"`, `"button"`, `"android.widget.TextView"`, …).
    pub role: Option<String>,
    /// Accessible name / content description / identifier.
    pub name: Option<String>,
    /// Visible text content.
    pub text: Option<String>,
    /// Selector or structural path within the capture.
    pub selector: Option<String>,
    pub visible: bool,
    pub bounds: Option<Rect>,
    /// Free-form per-platform leftovers (diagnostic only).
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    /// Stable cross-platform identifier, when the capture carries one.
    pub selector_key: Option<String>,
}

impl CanonicalNode {
    /// Bare node with everything optional unset. Normalizers fill in fields.
    pub fn new(platform: Platform, id: impl Into<String>) -> Self {
        Self {
            platform,
            id: id.into(),
            role: None,
            name: None,
            text: None,
            selector: None,
            visible: true,
            bounds: None,
            metadata: HashMap::new(),
            selector_key: None,
        }
    }
}

/// One captured artifact: an ordered, read-only node sequence.
///
/// Node order is insertion order and is never reordered — downstream matching
/// relies on it for deterministic tie-breaks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalDocument {
    pub platform: Platform,
    pub source_id: String,
    /// RFC 3339 capture timestamp.
    pub captured_at: String,
    pub nodes: Vec<CanonicalNode>,
}

impl CanonicalDocument {
    pub fn new(platform: Platform, source_id: impl Into<String>, nodes: Vec<CanonicalNode>) -> Self {
        Self {
            platform,
            source_id: source_id.into(),
            captured_at: chrono::Utc::now().to_rfc3339(),
            nodes,
        }
    }

    /// The total-function failure value: normalization that could not parse
    /// its payload yields an empty document, never an error.
    pub fn empty(platform: Platform, source_id: impl Into<String>) -> Self {
        Self::new(platform, source_id, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// ─── Requirement item ─────────────────────────────────────────────────────────

/// What kind of expectation a requirement expresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequirementKind {
    Text,
    Control,
    Policy,
    State,
}

impl RequirementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequirementKind::Text => "text",
            RequirementKind::Control => "control",
            RequirementKind::Policy => "policy",
            RequirementKind::State => "state",
        }
    }
}

/// Explicit visibility expectation on a STATE requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityRequirement {
    Show,
    Hide,
}

/// Provenance markers attached by the extractor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemProvenance {
    /// Where the item came from: `"table"`, `"text"`, `"rescan"`.
    pub source: Option<String>,
    pub row: Option<usize>,
    pub column: Option<usize>,
    /// Update date parsed from the item's own row/line, for staleness checks.
    pub update_date: Option<chrono::NaiveDate>,
    /// True when the item was mined from a structured table.
    #[serde(default)]
    pub table_sourced: bool,
}

/// One atomic expectation extracted from the specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementItem {
    pub id: String,
    pub kind: RequirementKind,
    pub selector: Option<String>,
    pub text: Option<String>,
    pub visibility: Option<VisibilityRequirement>,
    /// Structured conditions ("when logged out", …), free text.
    #[serde(default)]
    pub conditions: Vec<String>,
    /// When present, the item is handled exclusively by key-based rules.
    pub selector_key: Option<String>,
    /// Heading trail the item was found under.
    #[serde(default)]
    pub section_path: Vec<String>,
    /// Intent / expected value, when the spec states one.
    pub expected: Option<String>,
    #[serde(default)]
    pub provenance: ItemProvenance,
}

impl RequirementItem {
    pub fn text_item(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: RequirementKind::Text,
            selector: None,
            text: Some(text.into()),
            visibility: None,
            conditions: Vec::new(),
            selector_key: None,
            section_path: Vec::new(),
            expected: None,
            provenance: ItemProvenance::default(),
        }
    }
}

// ─── Finding ──────────────────────────────────────────────────────────────────

/// Finding severity. Ordinal: `Info` lowest, `Critical` highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warn,
    Minor,
    Major,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Minor => "minor",
            Severity::Major => "major",
            Severity::Critical => "critical",
        }
    }
}

/// Coarse classification of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffType {
    Missing,
    Extra,
    Changed,
    Mismatch,
    Unmapped,
}

impl DiffType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiffType::Missing => "missing",
            DiffType::Extra => "extra",
            DiffType::Changed => "changed",
            DiffType::Mismatch => "mismatch",
            DiffType::Unmapped => "unmapped",
        }
    }
}

/// Remediation the engine recommends for a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    SpecUpdate,
    DesignUpdate,
    IgnoreNoise,
}

/// Why a rule decided what it decided. Every finding names its producing rule
/// here so decisions stay traceable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub rule: String,
    pub reason: String,
    pub explanation: Option<String>,
}

/// One reported discrepancy between the spec and a captured UI surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub id: String,
    pub severity: Severity,
    /// `"MISSING_ELEMENT"`, `"TEXT_MISMATCH"`, `"VISIBILITY"`, `"POLICY"`, …
    pub category: String,
    pub description: String,
    #[serde(default)]
    pub evidence: HashMap<String, serde_json::Value>,
    pub requirement_id: Option<String>,
    pub selector_key: Option<String>,
    pub diff_type: Option<DiffType>,
    pub decision: Option<Decision>,
    pub recommended_action: Option<RecommendedAction>,
}

impl Finding {
    /// New finding with a fresh UUID and all optional fields unset.
    pub fn new(severity: Severity, category: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            severity,
            category: category.into(),
            description: description.into(),
            evidence: HashMap::new(),
            requirement_id: None,
            selector_key: None,
            diff_type: None,
            decision: None,
            recommended_action: None,
        }
    }
}
