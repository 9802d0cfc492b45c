use std::path::Path;

use serde::Deserialize;

use crate::cli::Cli;
use crate::error::{Error, Result};
use crate::platform::openreview::DEFAULT_API_URL;
use crate::profiles;

pub const DEFAULT_CONFIG_PATH: &str = ".ac-sheet/config.toml";
pub const CREDENTIALS_ENV: &str = "GSHEET_CREDENTIALS_PATH";

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub conference: Option<String>,
    pub sheet_title: Option<String>,
    pub worksheet: Option<String>,
    pub credentials_path: Option<String>,
    pub initialize: Option<bool>,
    pub reviewer_slots: Option<usize>,
    pub api_base_url: Option<String>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub conference: String,
    pub sheet_title: String,
    pub worksheet: String,
    pub credentials_path: String,
    pub initialize: bool,
    pub reviewer_slots: usize,
    pub api_base_url: String,
    pub page_size: usize,
    pub dry_run: bool,
}

impl Config {
    /// Read the config file (if any), fill gaps from the environment, then
    /// apply CLI overrides.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path = Path::new(cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH));
        let mut file_config = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            parse_config(&content)?
        } else if cli.config.is_some() {
            return Err(Error::ConfigNotFound(config_path.to_path_buf()));
        } else {
            ConfigFile::default()
        };

        if file_config.credentials_path.is_none() {
            file_config.credentials_path = std::env::var(CREDENTIALS_ENV).ok();
        }

        let config = merge(file_config, cli);
        profiles::lookup(&config.conference)?;
        Ok(config)
    }
}

pub fn parse_config(content: &str) -> Result<ConfigFile> {
    let config: ConfigFile = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &ConfigFile) -> Result<()> {
    if let Some(ref conference) = config.conference
        && profiles::lookup(conference).is_err()
    {
        return Err(Error::ConfigValidation(format!(
            "unknown conference: {conference} (expected: {})",
            profiles::KNOWN.join(", ")
        )));
    }
    if config.reviewer_slots == Some(0) {
        return Err(Error::ConfigValidation(
            "reviewer_slots must be > 0".to_string(),
        ));
    }
    if config.page_size == Some(0) {
        return Err(Error::ConfigValidation("page_size must be > 0".to_string()));
    }
    if let Some(ref worksheet) = config.worksheet
        && worksheet.trim().is_empty()
    {
        return Err(Error::ConfigValidation(
            "worksheet must not be empty".to_string(),
        ));
    }
    Ok(())
}

pub fn merge(file: ConfigFile, cli: &Cli) -> Config {
    let conference = cli
        .conference
        .clone()
        .or(file.conference)
        .unwrap_or_else(|| "ICLR2026".to_string());
    let sheet_title = cli
        .sheet_title
        .clone()
        .or(file.sheet_title)
        .unwrap_or_else(|| format!("{conference} AC DB"));

    Config {
        sheet_title,
        worksheet: cli
            .worksheet
            .clone()
            .or(file.worksheet)
            .unwrap_or_else(|| "Sheet1".to_string()),
        credentials_path: cli
            .credentials
            .clone()
            .or(file.credentials_path)
            .unwrap_or_else(|| "service-account.json".to_string()),
        initialize: cli.initialize || file.initialize.unwrap_or(false),
        reviewer_slots: cli.reviewer_slots.or(file.reviewer_slots).unwrap_or(5),
        api_base_url: file
            .api_base_url
            .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        page_size: file.page_size.unwrap_or(1000),
        dry_run: cli.dry_run,
        conference,
    }
}
