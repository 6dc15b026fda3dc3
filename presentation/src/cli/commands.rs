//! CLI command definitions

use clap::builder::RangedU64ValueParser;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for investigation results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Only the Markdown report
    Report,
    /// Report followed by summary metrics
    Full,
    /// JSON output
    Json,
}

/// CLI arguments for sherlock
#[derive(Parser, Debug)]
#[command(name = "sherlock")]
#[command(author, version, about = "SRE incident investigation with a swarm of specialist agents")]
#[command(long_about = r#"
Sherlock investigates an incident with three specialist agents that hand
control to each other until one of them can answer:

  diagnostic_agent      Kubernetes cluster and workload state (K8sGPT or EKS MCP)
  observability_agent   CloudWatch metrics, alarms and logs
  persistence_agent     DynamoDB tables, capacity and throttling

Each agent works through its own MCP tool server. All servers are started
before the investigation begins and stopped when it ends.

Configuration files are loaded from (in priority order):
1. SHERLOCK_* environment variables (e.g. SHERLOCK_SWARM__MAX_HANDOFFS=4)
2. --config <path>     Explicit config file
3. ./sherlock.toml     Project-level config
4. ~/.config/sherlock/config.toml   Global config

Example:
  sherlock "Why is the checkout service returning 500s since 14:00?"
  sherlock -a eks-mcp -o full "Pods in payments keep restarting"
  sherlock --serve --log-file /tmp/sherlock.log
"#)]
pub struct Cli {
    /// The incident to investigate (not required in server mode)
    pub query: Option<String>,

    /// Diagnostic backend: k8sgpt or eks-mcp
    #[arg(short = 'a', long = "diagnostic-agent", value_name = "BACKEND")]
    pub diagnostic_agent: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "report")]
    pub output: OutputFormat,

    /// Maximum number of hand-offs between agents
    #[arg(long, value_name = "N", value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub max_handoffs: Option<usize>,

    /// Abort the investigation after this many seconds
    #[arg(long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Record the investigation span in the trace file
    #[arg(long)]
    pub trace: bool,

    /// Serve the investigation as an MCP tool on stdin/stdout
    #[arg(long)]
    pub serve: bool,

    /// Write logs to this file (required for logs in server mode)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
