use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    ConfigValidation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown conference: {name} (expected: {known})")]
    UnknownConference { name: String, known: String },

    #[error("credential error: {0}")]
    Credentials(String),

    #[error("you are not an area chair for {conference}")]
    NotAreaChair { conference: String },

    #[error("review platform error: {0}")]
    Platform(String),

    #[error("spreadsheet error: {0}")]
    Sheet(String),

    #[error("sheet columns do not match: expected [{expected}], found [{found}]")]
    SchemaMismatch { expected: String, found: String },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Status and body for HTTP errors, transport message otherwise.
pub(crate) fn describe(err: ureq::Error) -> String {
    match err {
        ureq::Error::Status(code, response) => {
            let body = response.into_string().unwrap_or_default();
            format!("status {code}: {body}")
        }
        ureq::Error::Transport(t) => t.to_string(),
    }
}
