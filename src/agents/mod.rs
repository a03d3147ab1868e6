pub mod dependency_updater;
pub mod project_scanner;

pub mod update;
pub use update::UpdateReport;

pub use dependency_updater::{DependencyUpdater, PropertyOptions, UpdatePlan};
pub use project_scanner::{ProjectInfo, ProjectScannerAgent};
