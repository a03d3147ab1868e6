pub mod range;
pub mod repository;
pub mod snapshot;
pub mod version;

pub use range::VersionRange;
pub use repository::{MavenRepository, RemoteRepository};
pub use version::{Segment, Version};
