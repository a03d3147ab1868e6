use crate::error::Result;
use crate::repository::{Coordinate, RepositoryClient};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Remembers each coordinate's version list for the lifetime of one run, so a
/// coordinate that appears at several sites is only fetched once.
pub struct CachingClient {
    inner: Arc<dyn RepositoryClient>,
    cache: Mutex<HashMap<String, Vec<String>>>,
}

impl CachingClient {
    pub fn new(inner: Arc<dyn RepositoryClient>) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }
}

impl RepositoryClient for CachingClient {
    fn fetch_available_versions(&self, coordinate: &Coordinate) -> Result<Vec<String>> {
        let key = coordinate.key();
        if let Some(hit) = self
            .cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&key)
        {
            return Ok(hit.clone());
        }

        // failures are not cached; the run aborts on them anyway
        let versions = self.inner.fetch_available_versions(coordinate)?;
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key, versions.clone());
        Ok(versions)
    }
}
