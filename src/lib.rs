//! uidrift — spec-drift detection for UI surfaces.
//!
//! Compares what a specification document says a screen should show against
//! what design exports, DOM snapshots, and mobile view-hierarchy dumps
//! actually contain, and reports the differences as severity-ranked findings.
//!
//! The pipeline has four stages:
//!
//! 1. **Normalize** — every capture format collapses into the same
//!    [`model::CanonicalDocument`] shape ([`normalize`]).
//! 2. **Extract** — the spec document is mined into
//!    [`model::RequirementItem`]s ([`extract`]).
//! 3. **Diff** — a fixed-order rule pipeline matches items to nodes and
//!    emits [`model::Finding`]s ([`rules`], [`matching`]).
//! 4. **Refine** — an optional external scorer merges or re-ranks findings
//!    ([`refine`]).
//!
//! [`engine::DriftEngine`] wires the stages together for callers that want
//! one entry point.

pub mod engine;
pub mod extract;
pub mod matching;
pub mod model;
pub mod normalize;
pub mod refine;
pub mod rules;
pub mod selector_key;

pub use engine::{CaptureSet, DriftEngine, DriftReport};
pub use extract::RequirementExtractor;
pub use model::{CanonicalDocument, CanonicalNode, Finding, Platform, RequirementItem, Severity};
pub use refine::FindingRefiner;
