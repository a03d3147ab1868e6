use crate::error::{PomupError, Result};
use crate::repository::{Coordinate, RepositoryClient};
use quick_xml::de::from_str;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

pub const DEFAULT_MAVEN_CENTRAL: &str = "https://repo1.maven.org/maven2";
const MAX_METADATA_BYTES: usize = 10 * 1024 * 1024;

/// A remote Maven repository declared in the POM or the project configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRepository {
    pub id: String,
    pub url: String,
}

impl RemoteRepository {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }

    pub fn central() -> Self {
        Self::new("central", DEFAULT_MAVEN_CENTRAL)
    }
}

/// Maven repository client
pub struct MavenRepository {
    client: Client,
    repositories: Vec<RemoteRepository>,
}

impl MavenRepository {
    pub fn with_repositories(repositories: Vec<RemoteRepository>) -> Result<Self> {
        let client = Self::build_client()?;
        let repositories = if repositories.is_empty() {
            vec![RemoteRepository::central()]
        } else {
            repositories
        };

        let repositories = Self::ensure_valid_repositories(repositories)?;

        Ok(Self {
            client,
            repositories,
        })
    }

    /// Every version any configured repository knows for `group:artifact`, in the
    /// order the repositories list them. A repository answering 404 simply does not
    /// host the artifact; any other failure aborts the lookup.
    pub fn fetch_available_versions(&self, group: &str, artifact: &str) -> Result<Vec<String>> {
        let mut versions: Vec<String> = Vec::new();

        for repo in &self.repositories {
            let Some(found) = self.fetch_all_versions_from_repository(&repo.url, group, artifact)?
            else {
                continue;
            };
            for version in found {
                if !versions.contains(&version) {
                    versions.push(version);
                }
            }
        }

        if std::env::var("POMUP_VERBOSE").is_ok() {
            eprintln!(
                "[VERBOSE] {} version(s) known for {}:{}",
                versions.len(),
                group,
                artifact
            );
        }

        Ok(versions)
    }

    fn fetch_all_versions_from_repository(
        &self,
        repo_url: &str,
        group: &str,
        artifact: &str,
    ) -> Result<Option<Vec<String>>> {
        let metadata_url = Self::metadata_url(repo_url, group, artifact);
        let catalog_error = |reason: String| PomupError::Catalog {
            coordinate: format!("{group}:{artifact}"),
            reason,
        };

        if std::env::var("POMUP_VERBOSE").is_ok() {
            eprintln!("[VERBOSE] Fetching: {}", metadata_url);
        }

        let response = self
            .client
            .get(&metadata_url)
            .send()
            .map_err(|e| catalog_error(format!("request to {metadata_url} failed: {e}")))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND | StatusCode::GONE => {
                if std::env::var("POMUP_VERBOSE").is_ok() {
                    eprintln!("[VERBOSE] Not hosted: {}", metadata_url);
                }
                return Ok(None);
            }
            status => {
                return Err(catalog_error(format!("HTTP {status} from {metadata_url}")));
            }
        }

        let text = response
            .text()
            .map_err(|e| catalog_error(format!("failed to read {metadata_url}: {e}")))?;

        if text.len() > MAX_METADATA_BYTES {
            return Err(catalog_error(
                "Maven metadata response exceeded 10MB limit".to_string(),
            ));
        }

        parse_metadata_versions(&text).map(Some).map_err(catalog_error)
    }

    fn metadata_url(repo_url: &str, group: &str, artifact: &str) -> String {
        format!(
            "{}/{}/{}/maven-metadata.xml",
            repo_url.trim_end_matches('/'),
            group.replace('.', "/"),
            artifact
        )
    }

    fn build_client() -> Result<Client> {
        Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!("pomup/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PomupError::Io(std::io::Error::other(e)))
    }

    fn ensure_valid_repositories(
        repositories: Vec<RemoteRepository>,
    ) -> Result<Vec<RemoteRepository>> {
        for repo in &repositories {
            Self::validate_repository_url(&repo.url)?;
        }
        Ok(repositories)
    }

    fn validate_repository_url(url: &str) -> Result<()> {
        let parsed = Url::parse(url)
            .map_err(|_| PomupError::ProjectValidation(format!("Invalid repository URL: {url}")))?;

        match parsed.scheme() {
            "https" | "http" => {}
            scheme => {
                return Err(PomupError::ProjectValidation(format!(
                    "Unsupported repository scheme: {scheme}"
                )));
            }
        }

        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(PomupError::ProjectValidation(format!(
                "Repository URL has no host: {url}"
            )));
        }

        Ok(())
    }
}

impl RepositoryClient for MavenRepository {
    fn fetch_available_versions(&self, coordinate: &Coordinate) -> Result<Vec<String>> {
        MavenRepository::fetch_available_versions(self, &coordinate.group, &coordinate.artifact)
    }
}

#[derive(Debug, Deserialize)]
struct MavenMetadata {
    #[serde(default)]
    versioning: Option<Versioning>,
}

#[derive(Debug, Deserialize)]
struct Versioning {
    #[serde(default)]
    versions: Option<Versions>,
}

#[derive(Debug, Deserialize)]
struct Versions {
    #[serde(default)]
    version: Vec<String>,
}

/// Extract `<versioning><versions><version>` entries from a `maven-metadata.xml` body.
fn parse_metadata_versions(text: &str) -> std::result::Result<Vec<String>, String> {
    let metadata: MavenMetadata =
        from_str(text).map_err(|e| format!("Failed to parse Maven metadata: {}", e))?;

    Ok(metadata
        .versioning
        .and_then(|v| v.versions)
        .map(|v| v.version.into_iter().map(|s| s.trim().to_string()).collect())
        .unwrap_or_default())
}
