use crate::agents::update::{
    ArtifactFilter, DiagnosticLevel, EligibilityFilter, PropertyFilter, PropertyLink, SegmentLock,
    Selection, UpdatePolicy,
};
use crate::agents::{
    DependencyUpdater, ProjectInfo, ProjectScannerAgent, PropertyOptions, UpdatePlan, UpdateReport,
};
use crate::cli::{CommonArgs, PropertyArgs, SegmentArgs};
use crate::config::ProjectConfig;
use crate::error::Result;
use crate::pom::PomDocument;
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;

/// The three update goals the CLI exposes.
#[derive(Debug, Clone)]
pub enum Goal {
    LatestVersions {
        segments: SegmentArgs,
    },
    NextVersions {
        snapshots_only: bool,
        process_properties: bool,
        process_parent: bool,
        properties: PropertyArgs,
    },
    Properties {
        next: bool,
        snapshots_only: bool,
        process_parent: bool,
        segments: SegmentArgs,
        properties: PropertyArgs,
    },
}

impl Goal {
    fn title(&self) -> &'static str {
        match self {
            Goal::LatestVersions { .. } => "Updating dependencies to their latest versions...",
            Goal::NextVersions { .. } => "Updating dependencies to their next versions...",
            Goal::Properties { .. } => "Updating version properties...",
        }
    }
}

/// Execute an update goal against the project's POM
pub fn execute_update<P: AsRef<Path>>(
    project_path: P,
    pom_file: Option<&Path>,
    goal: Goal,
    common: &CommonArgs,
) -> Result<()> {
    let project_path = project_path.as_ref();
    let quiet = common.json;
    let say = |line: String| {
        if !quiet {
            println!("{}", line);
        }
    };

    say(goal.title().cyan().bold().to_string());

    // Step 1: Validate project structure
    say(format!("\n{}", "1. Validating project structure...".yellow()));
    let scanner = ProjectScannerAgent::new(project_path);
    let project_info = scanner.validate(pom_file)?;
    say(format!(
        "{} {}",
        "✓ Found".green(),
        project_info.pom_path.display().to_string().dimmed()
    ));
    say(format!(
        "   Reactor has {} project(s)",
        project_info.reactor.len()
    ));
    if std::env::var("POMUP_VERBOSE").is_ok() {
        for member in project_info.reactor.iter() {
            eprintln!("[VERBOSE] Reactor member: {}", member);
        }
    }

    // Step 2: Load configuration
    say(format!("\n{}", "2. Reading configuration...".yellow()));
    let (config, config_path) =
        ProjectConfig::discover(&project_info.project_path, common.config.as_deref())?;
    match &config_path {
        Some(path) => say(format!("   Using {}", path.display().to_string().bright_cyan())),
        None => say("   No pomup.toml found, using defaults".dimmed().to_string()),
    }

    let repositories = config.repositories_with(&project_info.model.repositories);
    say(format!("   Found {} repositories:", repositories.len()));
    for repo in &repositories {
        say(format!("   • {} ({})", repo.id.bright_cyan(), repo.url.dimmed()));
    }

    let eligibility = build_eligibility(&config, common, &project_info)?;
    let plan = build_plan(goal, &config, common)?;

    // Step 3: Update
    say(format!("\n{}", "3. Checking for updates...".yellow()));
    let updater = DependencyUpdater::with_repositories(repositories, eligibility, !quiet)?;
    let mut doc = PomDocument::load(&project_info.pom_path)?;
    let report = updater.run(&mut doc, &plan)?;
    // clears the spinner
    drop(updater);
    say("✓ Check completed".green().to_string());

    // Step 4: Write back
    match write_back(&doc, common)? {
        WriteBack::Unchanged => {}
        WriteBack::DryRun => say(format!("\n{}", "4. Dry run, POM left untouched".yellow())),
        WriteBack::Written { backup } => {
            say(format!("\n{}", "4. POM written".yellow()));
            if backup {
                say(format!(
                    "   {}",
                    "Original saved as pom.xml.versionsBackup".dimmed()
                ));
            }
        }
    }

    if quiet {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_update_report(&report);
    println!("\n{}", "✨ Update process completed successfully!".green().bold());
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum WriteBack {
    Unchanged,
    DryRun,
    Written { backup: bool },
}

fn write_back(doc: &PomDocument, common: &CommonArgs) -> Result<WriteBack> {
    if !doc.is_modified() {
        return Ok(WriteBack::Unchanged);
    }
    if common.dry_run {
        return Ok(WriteBack::DryRun);
    }
    let backup = !common.no_backup;
    doc.save(backup)?;
    Ok(WriteBack::Written { backup })
}

fn build_eligibility(
    config: &ProjectConfig,
    common: &CommonArgs,
    project_info: &ProjectInfo,
) -> Result<EligibilityFilter> {
    // command line lists replace the configured ones
    let includes = if common.includes.is_empty() {
        &config.includes
    } else {
        &common.includes
    };
    let excludes = if common.excludes.is_empty() {
        &config.excludes
    } else {
        &common.excludes
    };
    let exclude_reactor = !common.no_exclude_reactor && config.exclude_reactor.unwrap_or(true);

    Ok(EligibilityFilter::new(
        exclude_reactor,
        Arc::new(project_info.reactor.clone()),
        ArtifactFilter::new(includes, excludes)?,
    ))
}

fn build_plan(goal: Goal, config: &ProjectConfig, common: &CommonArgs) -> Result<UpdatePlan> {
    let mut plan = match goal {
        Goal::LatestVersions { segments } => {
            UpdatePlan::latest_versions(lock(&segments), common.allow_snapshots)
        }
        Goal::NextVersions {
            snapshots_only,
            process_properties,
            process_parent,
            properties,
        } => {
            let mut plan = UpdatePlan::next_versions(common.allow_snapshots);
            plan.policy = plan.policy.snapshots_only(snapshots_only);
            if process_properties {
                plan.properties = Some(property_options(&properties, config)?);
            }
            plan.parent = process_parent;
            plan
        }
        Goal::Properties {
            next,
            snapshots_only,
            process_parent,
            segments,
            properties,
        } => {
            let policy = UpdatePolicy {
                lock: lock(&segments),
                include_snapshots: common.allow_snapshots,
                snapshots_only,
                selection: if next { Selection::Next } else { Selection::Latest },
            };
            UpdatePlan::properties(policy, property_options(&properties, config)?, process_parent)
        }
    };

    plan.dependencies &= !common.skip_dependencies;
    plan.dependency_management &= !common.skip_dependency_management;
    Ok(plan)
}

fn lock(segments: &SegmentArgs) -> SegmentLock {
    SegmentLock::from_switches(
        segments.allow_major_updates,
        segments.allow_minor_updates,
        segments.allow_incremental_updates,
    )
}

fn property_options(args: &PropertyArgs, config: &ProjectConfig) -> Result<PropertyOptions> {
    Ok(PropertyOptions {
        filter: PropertyFilter::new(&args.include_properties, &args.exclude_properties)?,
        links: config
            .properties
            .iter()
            .map(PropertyLink::from_config)
            .collect::<Result<Vec<_>>>()?,
        auto_link: !args.no_auto_link,
    })
}

fn print_update_report(report: &UpdateReport) {
    let verbose = std::env::var("POMUP_VERBOSE").is_ok();

    if report.is_empty() {
        println!("\n{}", "No updates were found".yellow());
    } else {
        println!("\n{}", "Update Summary:".cyan().bold());
        println!(
            "{}",
            format!("Total updates: {}", report.total_updates()).green()
        );
        for change in &report.changes {
            println!(
                "  • {} {} → {}",
                change.site.to_string().white().bold(),
                change.old_value.red(),
                change.new_value.green()
            );
        }
    }

    let level = if verbose {
        DiagnosticLevel::Debug
    } else {
        DiagnosticLevel::Info
    };
    let skipped: Vec<_> = report.diagnostics_at(level).collect();
    if !skipped.is_empty() {
        println!("\n{}", "Skipped:".cyan());
        for diagnostic in skipped {
            let line = format!("  • {}: {}", diagnostic.site, diagnostic.reason);
            match diagnostic.level {
                DiagnosticLevel::Info => println!("{}", line),
                DiagnosticLevel::Debug => println!("{}", line.dimmed()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PropertyLinkConfig;
    use crate::pom::Site;
    use crate::repository::Coordinate;
    use std::fs;
    use tempfile::tempdir;

    fn segments(major: bool, minor: bool, incremental: bool) -> SegmentArgs {
        SegmentArgs {
            allow_major_updates: major,
            allow_minor_updates: minor,
            allow_incremental_updates: incremental,
        }
    }

    #[test]
    fn next_versions_plan_follows_flags() {
        let common = CommonArgs {
            skip_dependency_management: true,
            allow_snapshots: true,
            ..Default::default()
        };
        let goal = Goal::NextVersions {
            snapshots_only: true,
            process_properties: true,
            process_parent: true,
            properties: PropertyArgs::default(),
        };
        let plan = build_plan(goal, &ProjectConfig::default(), &common).unwrap();

        assert_eq!(plan.policy.selection, Selection::Next);
        assert!(plan.policy.snapshots_only && plan.policy.include_snapshots);
        assert!(plan.dependencies && !plan.dependency_management);
        assert!(plan.properties.is_some() && plan.parent);
    }

    #[test]
    fn property_plan_carries_lock_and_links() {
        let config = ProjectConfig {
            properties: vec![PropertyLinkConfig {
                name: "jackson.version".to_string(),
                dependencies: vec!["com.fasterxml.jackson.core:*".to_string()],
            }],
            ..Default::default()
        };
        let goal = Goal::Properties {
            next: false,
            snapshots_only: false,
            process_parent: false,
            segments: segments(true, false, true),
            properties: PropertyArgs {
                no_auto_link: true,
                ..Default::default()
            },
        };
        let plan = build_plan(goal, &config, &CommonArgs::default()).unwrap();

        assert_eq!(plan.policy.lock, SegmentLock::Minor);
        assert_eq!(plan.policy.selection, Selection::Latest);
        let options = plan.properties.unwrap();
        assert!(!options.auto_link);
        assert_eq!(options.links[0].name, "jackson.version");
        assert!(!plan.dependencies && !plan.parent);
    }

    #[test]
    fn latest_plan_uses_segment_switches() {
        let goal = Goal::LatestVersions {
            segments: segments(false, true, true),
        };
        let plan = build_plan(goal, &ProjectConfig::default(), &CommonArgs::default()).unwrap();
        assert_eq!(plan.policy.lock, SegmentLock::Major);
        assert!(plan.properties.is_none());
    }

    const PARENT_POM: &str = r#"<project>
  <parent>
    <groupId>org.example</groupId>
    <artifactId>parent</artifactId>
    <version>1</version>
  </parent>
</project>
"#;

    fn edited(dir: &Path) -> PomDocument {
        let path = dir.join("pom.xml");
        fs::write(&path, PARENT_POM).unwrap();
        let mut doc = PomDocument::load(&path).unwrap();
        let site = Site::Parent {
            coordinate: Coordinate::new("org.example", "parent"),
        };
        assert!(doc.apply(&site, "1", "2").unwrap());
        doc
    }

    #[test]
    fn dry_run_never_writes() {
        let dir = tempdir().unwrap();
        let doc = edited(dir.path());
        let common = CommonArgs {
            dry_run: true,
            ..Default::default()
        };

        assert_eq!(write_back(&doc, &common).unwrap(), WriteBack::DryRun);
        assert_eq!(fs::read_to_string(dir.path().join("pom.xml")).unwrap(), PARENT_POM);
        assert!(!dir.path().join("pom.xml.versionsBackup").exists());
    }

    #[test]
    fn write_back_honours_backup_switch() {
        let dir = tempdir().unwrap();
        let doc = edited(dir.path());
        let common = CommonArgs {
            no_backup: true,
            ..Default::default()
        };
        assert_eq!(
            write_back(&doc, &common).unwrap(),
            WriteBack::Written { backup: false }
        );
        let written = fs::read_to_string(dir.path().join("pom.xml")).unwrap();
        assert!(written.contains("<version>2</version>"));
        assert!(!dir.path().join("pom.xml.versionsBackup").exists());

        let doc = edited(dir.path());
        assert_eq!(
            write_back(&doc, &CommonArgs::default()).unwrap(),
            WriteBack::Written { backup: true }
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("pom.xml.versionsBackup")).unwrap(),
            PARENT_POM
        );
    }

    #[test]
    fn unmodified_document_is_left_alone() {
        let doc = PomDocument::from_text(PARENT_POM);
        let common = CommonArgs::default();
        assert_eq!(write_back(&doc, &common).unwrap(), WriteBack::Unchanged);
    }
}
