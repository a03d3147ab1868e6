use crate::agents::update::handlers::{DependencyHandler, ParentHandler, PropertyHandler};
use crate::agents::update::{
    EligibilityFilter, LinkageResolver, PropertyFilter, PropertyLink, SegmentLock, UpdatePolicy,
    UpdateReport,
};
use crate::error::Result;
use crate::maven::RemoteRepository;
use crate::pom::{DependencySection, PomDocument};
use crate::repository::{RepositoryClient, RepositoryFactory};
use std::sync::Arc;

/// How properties are selected and linked for a run.
#[derive(Debug, Clone)]
pub struct PropertyOptions {
    pub filter: PropertyFilter,
    pub links: Vec<PropertyLink>,
    pub auto_link: bool,
}

impl Default for PropertyOptions {
    fn default() -> Self {
        Self {
            filter: PropertyFilter::default(),
            links: Vec::new(),
            auto_link: true,
        }
    }
}

/// Which sites one run visits and under which policy.
#[derive(Debug, Clone)]
pub struct UpdatePlan {
    pub policy: UpdatePolicy,
    pub dependency_management: bool,
    pub dependencies: bool,
    pub properties: Option<PropertyOptions>,
    pub parent: bool,
}

impl UpdatePlan {
    /// `use-latest-versions`: literal dependency versions, as far as the lock allows.
    pub fn latest_versions(lock: SegmentLock, include_snapshots: bool) -> Self {
        Self {
            policy: UpdatePolicy::latest(lock, include_snapshots),
            dependency_management: true,
            dependencies: true,
            properties: None,
            parent: false,
        }
    }

    /// `use-next-versions`: literal dependency versions, one step forward.
    pub fn next_versions(include_snapshots: bool) -> Self {
        Self {
            policy: UpdatePolicy::next(include_snapshots),
            ..Self::latest_versions(SegmentLock::None, include_snapshots)
        }
    }

    /// `update-properties`: property groups, and the parent when asked to.
    pub fn properties(policy: UpdatePolicy, options: PropertyOptions, parent: bool) -> Self {
        Self {
            policy,
            dependency_management: false,
            dependencies: false,
            properties: Some(options),
            parent,
        }
    }
}

/// DependencyUpdater runs the update passes over one POM.
pub struct DependencyUpdater {
    client: Arc<dyn RepositoryClient>,
    eligibility: EligibilityFilter,
}

impl DependencyUpdater {
    pub fn with_repositories(
        repositories: Vec<RemoteRepository>,
        eligibility: EligibilityFilter,
        show_progress: bool,
    ) -> Result<Self> {
        Ok(Self::new(
            RepositoryFactory::create_maven(repositories, show_progress)?,
            eligibility,
        ))
    }

    pub fn new(client: Arc<dyn RepositoryClient>, eligibility: EligibilityFilter) -> Self {
        Self {
            client,
            eligibility,
        }
    }

    /// Visit dependency management, dependencies, properties and the parent in
    /// that order, patching `doc` as changes are accepted. Sites come from the
    /// document as it is when the run starts.
    pub fn run(&self, doc: &mut PomDocument, plan: &UpdatePlan) -> Result<UpdateReport> {
        let model = doc.model()?;
        let client = self.client.as_ref();
        let mut report = UpdateReport::new();

        let dependencies = DependencyHandler::new(client, &self.eligibility, plan.policy);
        if plan.dependency_management {
            report.merge(dependencies.update(
                doc,
                model.dependencies_in(DependencySection::DependencyManagement),
            )?);
        }
        if plan.dependencies {
            report.merge(
                dependencies.update(doc, model.dependencies_in(DependencySection::Dependencies))?,
            );
        }

        if let Some(options) = &plan.properties {
            let linkage =
                LinkageResolver::new(options.links.clone(), options.auto_link).resolve(&model);
            let handler =
                PropertyHandler::new(client, &self.eligibility, &options.filter, plan.policy);
            report.merge(handler.update(doc, &linkage)?);
        }

        if plan.parent {
            let handler = ParentHandler::new(client, &self.eligibility, plan.policy);
            report.merge(handler.update(doc, model.parent.as_ref())?);
        }

        Ok(report)
    }
}
