// Version selection and the per-site update passes.
//
// - policy: segment lock and selection mode
// - selection: candidate filter and upgrade selector
// - eligibility: reactor and include/exclude checks
// - linkage: which dependencies a property drives
// - context: report, applied changes and skip diagnostics
// - handlers: one pass per kind of site
pub mod context;
pub mod eligibility;
pub mod handlers;
pub mod linkage;
pub mod policy;
pub mod selection;

pub use context::{DiagnosticLevel, UpdateReport};
pub use eligibility::{ArtifactFilter, EligibilityFilter, ReactorMembership};
pub use linkage::{LinkageResolver, PropertyFilter, PropertyLink};
pub use policy::{SegmentLock, Selection, UpdatePolicy};
