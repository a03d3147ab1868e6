pub mod editor;
pub mod model;
pub mod xml;

pub use editor::PomDocument;
pub use model::{DependencySection, DependencySite, PomModel, PropertyDeclaration, Site};
