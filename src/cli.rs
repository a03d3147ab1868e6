use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "pomup",
    about = "Maven POM updater: moves dependency, property and parent versions forward",
    version,
    author
)]
pub struct Cli {
    /// Path to the project directory (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    pub path: String,

    /// POM file to update, relative to the project directory (defaults to pom.xml)
    #[arg(short = 'f', long = "file", global = true, value_name = "POM")]
    pub file: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replace dependency versions with the latest eligible release
    UseLatestVersions {
        #[command(flatten)]
        segments: SegmentArgs,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Replace dependency versions with the next eligible version
    UseNextVersions {
        /// Only touch sites whose current version is a snapshot
        #[arg(long)]
        process_snapshots_only: bool,

        /// Also update properties that supply dependency versions
        #[arg(long)]
        process_properties: bool,

        /// Also update the parent reference
        #[arg(long)]
        process_parent: bool,

        #[command(flatten)]
        properties: PropertyArgs,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Update properties that supply dependency versions
    UpdateProperties {
        /// Select the next eligible version instead of the latest
        #[arg(long)]
        next: bool,

        /// Also update the parent reference
        #[arg(long)]
        process_parent: bool,

        /// Only touch properties whose current value is a snapshot
        #[arg(long)]
        process_snapshots_only: bool,

        #[command(flatten)]
        segments: SegmentArgs,

        #[command(flatten)]
        properties: PropertyArgs,

        #[command(flatten)]
        common: CommonArgs,
    },
}

/// Which version segments an update may change.
#[derive(Args, Debug, Clone)]
pub struct SegmentArgs {
    /// Allow changes to the major version segment
    #[arg(long, value_name = "BOOL", default_value_t = true, action = ArgAction::Set)]
    pub allow_major_updates: bool,

    /// Allow changes to the minor version segment
    #[arg(long, value_name = "BOOL", default_value_t = true, action = ArgAction::Set)]
    pub allow_minor_updates: bool,

    /// Allow changes to the incremental version segment
    #[arg(long, value_name = "BOOL", default_value_t = true, action = ArgAction::Set)]
    pub allow_incremental_updates: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct PropertyArgs {
    /// Only process these properties (comma separated, `*` allowed)
    #[arg(long, value_delimiter = ',', value_name = "NAMES")]
    pub include_properties: Vec<String>,

    /// Never process these properties (comma separated, `*` allowed)
    #[arg(long, value_delimiter = ',', value_name = "NAMES")]
    pub exclude_properties: Vec<String>,

    /// Only process properties linked explicitly in pomup.toml
    #[arg(long)]
    pub no_auto_link: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Consider snapshot versions as update candidates
    #[arg(long)]
    pub allow_snapshots: bool,

    /// Only update matching artifacts (groupId[:artifactId[:type[:classifier]]], comma separated)
    #[arg(long, value_delimiter = ',', value_name = "PATTERNS")]
    pub includes: Vec<String>,

    /// Never update matching artifacts (groupId[:artifactId[:type[:classifier]]], comma separated)
    #[arg(long, value_delimiter = ',', value_name = "PATTERNS")]
    pub excludes: Vec<String>,

    /// Also update artifacts built by this reactor
    #[arg(long)]
    pub no_exclude_reactor: bool,

    /// Leave the <dependencies> section alone
    #[arg(long)]
    pub skip_dependencies: bool,

    /// Leave the <dependencyManagement> section alone
    #[arg(long)]
    pub skip_dependency_management: bool,

    /// Report what would change without writing the POM
    #[arg(long)]
    pub dry_run: bool,

    /// Do not write pom.xml.versionsBackup before saving
    #[arg(long)]
    pub no_backup: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Configuration file (defaults to pomup.toml in the project directory)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_switches_take_values() {
        let cli = Cli::try_parse_from([
            "pomup",
            "use-latest-versions",
            "--allow-major-updates",
            "false",
            "--includes",
            "org.apache.*,junit",
        ])
        .unwrap();

        let Commands::UseLatestVersions { segments, common } = cli.command else {
            panic!("wrong command");
        };
        assert!(!segments.allow_major_updates);
        assert!(segments.allow_minor_updates);
        assert_eq!(common.includes, vec!["org.apache.*", "junit"]);
        assert_eq!(cli.path, ".");
    }

    #[test]
    fn global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "pomup",
            "-p",
            "demo",
            "update-properties",
            "--next",
            "-f",
            "module/pom.xml",
            "-v",
            "--include-properties",
            "jackson.version",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.file, Some(PathBuf::from("module/pom.xml")));
        let Commands::UpdateProperties { next, properties, .. } = cli.command else {
            panic!("wrong command");
        };
        assert!(next);
        assert_eq!(properties.include_properties, vec!["jackson.version"]);
    }

    #[test]
    fn rejects_non_boolean_switch() {
        assert!(
            Cli::try_parse_from(["pomup", "use-latest-versions", "--allow-minor-updates", "maybe"])
                .is_err()
        );
    }
}
