use crate::agents::update::ReactorMembership;
use crate::error::Result;
use crate::pom::PomModel;
use crate::repository::Coordinate;
use crate::utils::PathValidator;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// ProjectScannerAgent validates the project and discovers its reactor
pub struct ProjectScannerAgent {
    project_path: PathBuf,
}

impl ProjectScannerAgent {
    pub fn new<P: AsRef<Path>>(project_path: P) -> Self {
        Self {
            project_path: project_path.as_ref().to_path_buf(),
        }
    }

    /// Locate the POM (`pom_file` overrides `pom.xml`) and walk its modules.
    pub fn validate(&self, pom_file: Option<&Path>) -> Result<ProjectInfo> {
        let project_path = PathValidator::validate_project_path(&self.project_path)?;
        let pom_path = PathValidator::resolve_pom(&project_path, pom_file)?;

        let model = PomModel::parse(&fs::read_to_string(&pom_path)?)?;
        let mut reactor = ReactorProjects::default();
        let mut visited = HashSet::new();
        reactor.collect(&pom_path, &model, &mut visited)?;

        Ok(ProjectInfo {
            project_path,
            pom_path,
            model,
            reactor,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ProjectInfo {
    pub project_path: PathBuf,
    pub pom_path: PathBuf,
    pub model: PomModel,
    pub reactor: ReactorProjects,
}

/// `groupId:artifactId` of every project built by this reactor, root included.
#[derive(Debug, Clone, Default)]
pub struct ReactorProjects {
    members: BTreeSet<String>,
}

impl ReactorProjects {
    fn collect(
        &mut self,
        pom_path: &Path,
        model: &PomModel,
        visited: &mut HashSet<PathBuf>,
    ) -> Result<()> {
        if !visited.insert(pom_path.to_path_buf()) {
            return Ok(());
        }

        if let (Some(group), Some(artifact)) = (model.effective_group_id(), &model.artifact_id) {
            self.members.insert(format!(
                "{}:{}",
                model.interpolate(group, None),
                model.interpolate(artifact, None)
            ));
        }

        let base = pom_path.parent().unwrap_or(Path::new("."));
        for module in &model.modules {
            let Some(module_pom) = Self::module_pom(&base.join(module)) else {
                if std::env::var("POMUP_VERBOSE").is_ok() {
                    eprintln!("[VERBOSE] Module '{}' has no POM, ignoring", module);
                }
                continue;
            };
            let module_model = PomModel::parse(&fs::read_to_string(&module_pom)?)?;
            self.collect(&module_pom, &module_model, visited)?;
        }
        Ok(())
    }

    /// `dir/pom.xml` for a directory module, the file itself for an explicit POM.
    fn module_pom(path: &Path) -> Option<PathBuf> {
        let candidate = if path.is_dir() {
            path.join("pom.xml")
        } else {
            path.to_path_buf()
        };
        candidate
            .is_file()
            .then(|| candidate.canonicalize().ok())
            .flatten()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(String::as_str)
    }
}

impl ReactorMembership for ReactorProjects {
    fn is_internally_produced(&self, coordinate: &Coordinate) -> bool {
        self.members.contains(&coordinate.key())
    }
}
