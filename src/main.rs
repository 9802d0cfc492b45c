use std::path::Path;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ac_sheet::cli::{Cli, CliCommand};
use ac_sheet::config::Config;
use ac_sheet::error::Result;
use ac_sheet::pipeline::Pipeline;
use ac_sheet::platform::openreview::{OpenReviewPlatform, resolve_credentials};
use ac_sheet::profiles;
use ac_sheet::sheet::google::GoogleSheet;
use ac_sheet::sheet::memory::MemorySheet;
use ac_sheet::sheet::row_text;

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .init();
}

fn main() {
    let cli = Cli::parse();

    if let Some(CliCommand::Conferences) = cli.command {
        for name in profiles::KNOWN {
            println!("{name}");
        }
        return;
    }

    init_logging();
    dotenvy::dotenv().ok();

    info!("ac-sheet starting");

    if let Err(e) = run(&cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::load(cli)?;
    info!(?config, "config loaded");

    let profile = profiles::lookup(&config.conference)?;
    let credentials = resolve_credentials()?;
    let platform = OpenReviewPlatform::login(&config.api_base_url, &credentials)?;
    info!(conference = config.conference, "logged in");

    let dry_run = config.dry_run;
    let sheet_title = config.sheet_title.clone();
    let worksheet = config.worksheet.clone();
    let credentials_path = config.credentials_path.clone();
    let pipeline = Pipeline::new(platform, profile, config);

    if dry_run {
        let mut sheet = MemorySheet::default();
        let report = pipeline.run(&mut sheet)?;
        for row in sheet.rows() {
            info!(row = row_text(row).join(" | "), "dry run");
        }
        info!(rows = report.appended, "dry run complete, spreadsheet untouched");
        return Ok(());
    }

    let mut sheet = GoogleSheet::open(Path::new(&credentials_path), &sheet_title, &worksheet)?;
    pipeline.run(&mut sheet)?;
    Ok(())
}
