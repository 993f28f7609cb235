//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the dtrack binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::export::ExportOptions;

/// Dependency-Track command-line interface.
#[derive(Parser, Debug)]
#[command(name = "dtrack", about = "Dependency-Track API CLI", version)]
pub struct Cli {
    /// YAML file with `baseurl`, `token` and `verify`. Falls back to
    /// DT_API_KEY / DT_API_URL when omitted.
    #[arg(short = 'c', long, global = true, env = "DT_CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    /// Output results as JSON instead of a table.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Log more (repeat for trace output).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Export every project's dependencies as CSV.
    Report(ReportArgs),

    /// Get a single entity by uuid.
    Get {
        /// The type of entity to get.
        entity: Entity,

        /// The entity uuid.
        uuid: String,
    },

    /// List entities.
    List {
        /// The type of entity to list.
        entity: Entity,

        /// Project uuid (required for components and services).
        #[arg(long)]
        project: Option<String>,

        /// Free-text search forwarded as `searchText`.
        #[arg(long)]
        search: Option<String>,
    },

    /// Resolve a project by name and version.
    Lookup {
        #[arg(long)]
        name: String,

        #[arg(long)]
        version: Option<String>,
    },

    /// Upload a CycloneDX BOM.
    Upload(UploadArgs),

    /// Delete an entity by uuid.
    Delete {
        /// The type of entity to delete.
        entity: Entity,

        /// The entity uuid.
        uuid: String,
    },
}

/// Arguments of the `report` command.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ReportArgs {
    /// Only consider `vcs` references containing this text.
    #[arg(short = 'd', long, default_value = "")]
    pub vcs_domain: String,

    /// Dependencies in internal groups are recursively resolved as
    /// Dependency-Track projects. E.g. -i org.example -i io.github
    #[arg(short, long = "internal-groups")]
    pub internal_groups: Vec<String>,

    /// Output file.
    #[arg(short, long)]
    pub output_file: PathBuf,

    /// Filter project names.
    #[arg(short, long, default_value = "")]
    pub filter: String,

    /// Add to every project a component referencing the project purl.
    #[arg(long)]
    pub add_self_dependency: bool,
}

impl From<&ReportArgs> for ExportOptions {
    fn from(args: &ReportArgs) -> Self {
        Self {
            vcs_domain: args.vcs_domain.clone(),
            internal_groups: args.internal_groups.clone(),
            filter: args.filter.clone(),
            add_self_dependency: args.add_self_dependency,
        }
    }
}

/// Arguments of the `upload` command.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct UploadArgs {
    /// CycloneDX BOM file.
    pub bom: PathBuf,

    /// Target project uuid.
    #[arg(long, conflicts_with_all = ["project_name", "project_version"])]
    pub project: Option<String>,

    /// Target project name.
    #[arg(long, requires = "project_version")]
    pub project_name: Option<String>,

    /// Target project version.
    #[arg(long, requires = "project_name")]
    pub project_version: Option<String>,

    /// Create the named project if it does not exist.
    #[arg(long)]
    pub auto_create: bool,
}

/// Entity types that can be operated on.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entity {
    /// A Dependency-Track project.
    #[value(alias = "projects")]
    Project,
    /// A component of a project.
    #[value(alias = "components")]
    Component,
    /// A service of a project.
    #[value(alias = "services")]
    Service,
}
