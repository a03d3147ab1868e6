use crate::error::Result;
use crate::maven::{MavenRepository, RemoteRepository};
use crate::repository::{CachingClient, ProgressClient, RepositoryClient};
use std::sync::Arc;

pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Maven catalog over `repositories`, memoized per run. The spinner sits below
    /// the cache so only real network lookups are counted.
    pub fn create_maven(
        repositories: Vec<RemoteRepository>,
        show_progress: bool,
    ) -> Result<Arc<dyn RepositoryClient>> {
        let maven: Arc<dyn RepositoryClient> =
            Arc::new(MavenRepository::with_repositories(repositories)?);
        let progress: Arc<dyn RepositoryClient> =
            Arc::new(ProgressClient::new(maven, show_progress));
        Ok(Arc::new(CachingClient::new(progress)))
    }
}
