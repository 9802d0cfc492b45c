use clap::{Parser, Subcommand};

/// ac-sheet: track Area Chair papers and review activity in a spreadsheet
#[derive(Parser, Debug, Clone)]
#[command(name = "ac-sheet", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<CliCommand>,

    /// Path to config file (default: .ac-sheet/config.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Conference profile to use (e.g. ICLR2026)
    #[arg(long)]
    pub conference: Option<String>,

    /// Title of the target spreadsheet
    #[arg(long)]
    pub sheet_title: Option<String>,

    /// Tab within the spreadsheet
    #[arg(long)]
    pub worksheet: Option<String>,

    /// Path to the service-account JSON key
    #[arg(long)]
    pub credentials: Option<String>,

    /// Clear the sheet and rewrite it instead of updating rows in place
    #[arg(long)]
    pub initialize: bool,

    /// Number of per-reviewer rating columns
    #[arg(long)]
    pub reviewer_slots: Option<usize>,

    /// Fetch and aggregate, print the rows, but leave the spreadsheet alone
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommand {
    /// List the supported conference profiles
    Conferences,
}
