use crate::error::Result;
use crate::repository::{Coordinate, RepositoryClient};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

/// Shows a spinner naming the coordinate whose versions are being fetched.
pub struct ProgressClient {
    inner: Arc<dyn RepositoryClient>,
    spinner: ProgressBar,
}

impl ProgressClient {
    pub fn new(inner: Arc<dyn RepositoryClient>, visible: bool) -> Self {
        let spinner = ProgressBar::new_spinner();
        if !visible {
            spinner.set_draw_target(ProgressDrawTarget::hidden());
        }
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("  {spinner} {pos} fetched {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(120));
        Self { inner, spinner }
    }
}

impl RepositoryClient for ProgressClient {
    fn fetch_available_versions(&self, coordinate: &Coordinate) -> Result<Vec<String>> {
        self.spinner.set_message(format!("Fetching {}", coordinate.key()));
        let result = self.inner.fetch_available_versions(coordinate);
        self.spinner.inc(1);
        result
    }
}

impl Drop for ProgressClient {
    fn drop(&mut self) {
        self.spinner.finish_and_clear();
    }
}
