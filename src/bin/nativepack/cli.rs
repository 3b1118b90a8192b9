//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use nativepack::util::config::TargetConfig;

/// nativepack - default and validate native application packaging configuration
#[derive(Parser)]
#[command(name = "nativepack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Default and validate Nativepack.toml for a target
    Check(CheckArgs),

    /// Show what a target supports
    Capabilities(CapabilitiesArgs),

    /// Create a Nativepack.toml in a directory
    Init(InitArgs),
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Target selection flags shared by `check` and `capabilities`.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Target OS (windows, linux, osx)
    #[arg(long)]
    pub os: Option<String>,

    /// Toolchain edition (evaluation, standard, professional, enterprise, embedded, ...)
    #[arg(long)]
    pub edition: Option<String>,

    /// Toolchain version, e.g. 15.3
    #[arg(long = "toolchain-version", value_name = "VERSION")]
    pub toolchain_version: Option<String>,

    /// Treat the target as cross-compiled
    #[arg(long)]
    pub cross: bool,
}

impl TargetArgs {
    /// The flags as a config layer; unset flags leave the file values alone.
    pub fn to_target_config(&self) -> TargetConfig {
        TargetConfig {
            os: self.os.clone(),
            edition: self.edition.clone(),
            version: self.toolchain_version.clone(),
            cross_compile: self.cross.then_some(true),
        }
    }
}

#[derive(Args)]
pub struct CheckArgs {
    /// Project directory or manifest path (defaults to current directory)
    pub path: Option<PathBuf>,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Never profile on this machine
    #[arg(long, env = "NATIVEPACK_NO_LOCAL_PROFILING")]
    pub no_local_profiling: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct CapabilitiesArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct InitArgs {
    /// Project name (defaults to directory name)
    #[arg(long)]
    pub name: Option<String>,

    /// Application kind (plain, windows-service, tomcat, spring-boot, dynamic-library)
    #[arg(long, default_value = "plain")]
    pub kind: String,

    /// Directory to initialize (defaults to current directory)
    pub path: Option<PathBuf>,
}
