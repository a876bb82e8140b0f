use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug, Default)]
#[command(name = "gerrit-batch")]
#[command(version)]
#[command(about = "Batch status, submit and reviewer operations on Gerrit changes")]
pub struct Cli {
    /// Change numbers or inclusive ranges (e.g. 1234 or 1200-1210)
    #[arg(value_name = "CHANGES")]
    pub changes: Vec<String>,

    /// Print status messages while running
    #[arg(short, long, help_heading = "Logging options")]
    pub verbose: bool,

    /// Gerrit URL
    #[arg(short, long, value_name = "URL", help_heading = "Gerrit options")]
    pub review_url: Option<String>,

    /// Gerrit username
    #[arg(short, long, value_name = "USERNAME", help_heading = "Gerrit options")]
    pub username: Option<String>,

    /// Gerrit HTTP password
    #[arg(short, long, value_name = "PASSWORD", help_heading = "Gerrit options")]
    pub password: Option<String>,

    /// HTTP authentication scheme used by the server
    #[arg(long, value_enum, help_heading = "Gerrit options")]
    pub auth_scheme: Option<AuthSchemeArg>,

    /// Config file (defaults to ~/.gerrit.cfg)
    #[arg(short, long, value_name = "PATH", help_heading = "Gerrit options")]
    pub config: Option<PathBuf>,

    /// Rebase, label and submit the changes
    #[arg(short, long, conflicts_with = "add_reviewers", help_heading = "Changes options")]
    pub submit: bool,

    /// Add comma-separated reviewers to the changes
    #[arg(short, long, value_name = "REVIEWERS", help_heading = "Changes options")]
    pub add_reviewers: Option<String>,

    /// Include every change with this topic
    #[arg(short, long, value_name = "TOPIC", help_heading = "Changes options")]
    pub topic: Option<String>,

    /// Comma-separated changes to leave out
    #[arg(short, long, value_name = "EXCLUDE", help_heading = "Changes options")]
    pub exclude: Option<String>,

    /// Labels to vote on when submitting
    #[arg(long, value_name = "LABEL,LABEL", help_heading = "Label options")]
    pub labels: Option<String>,

    /// Votes for the labels, in the same order
    #[arg(long, value_name = "RANGE,RANGE", allow_hyphen_values = true, help_heading = "Label options")]
    pub labels_ranges: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum AuthSchemeArg {
    Basic,
    Digest,
}
