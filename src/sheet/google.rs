use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Error, Result, describe};

use super::{SheetRow, SheetStore};

const SHEETS_API_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const SCOPES: &str =
    "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive.readonly";
const JWT_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";
const TOKEN_LIFETIME_SECS: u64 = 3600;

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The fields we need from a service-account JSON key file.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccountKey {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Credentials(format!(
                "cannot read service account key {}: {e}",
                path.display()
            ))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            Error::Credentials(format!(
                "invalid service account key {}: {e}",
                path.display()
            ))
        })
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

/// Exchange a signed JWT for an OAuth2 access token.
fn fetch_access_token(key: &ServiceAccountKey) -> Result<String> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let claims = Claims {
        iss: &key.client_email,
        scope: SCOPES,
        aud: &key.token_uri,
        iat: now,
        exp: now + TOKEN_LIFETIME_SECS,
    };

    let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| Error::Credentials(format!("invalid service account private key: {e}")))?;
    let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &signing_key)
        .map_err(|e| Error::Credentials(format!("failed to sign token request: {e}")))?;

    let response = ureq::post(&key.token_uri)
        .send_form(&[("grant_type", JWT_GRANT_TYPE), ("assertion", assertion.as_str())])
        .map_err(|e| Error::Credentials(format!("Google token request failed: {}", describe(e))))?;

    #[derive(Deserialize)]
    struct TokenResponse {
        access_token: String,
    }
    let token: TokenResponse = response
        .into_json()
        .map_err(|e| Error::Credentials(format!("failed to parse Google token response: {e}")))?;
    Ok(token.access_token)
}

// ---------------------------------------------------------------------------
// Client abstraction (for testability)
// ---------------------------------------------------------------------------

pub trait SheetsApi {
    fn request(
        &self,
        method: &str,
        url: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value>;
}

struct DefaultSheetsApi {
    token: String,
}

impl SheetsApi for DefaultSheetsApi {
    fn request(
        &self,
        method: &str,
        url: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let mut request =
            ureq::request(method, url).set("Authorization", &format!("Bearer {}", self.token));
        for (key, value) in query {
            request = request.query(key, value);
        }

        let result = match body {
            Some(body) => request.send_json(body),
            None => request.call(),
        };
        let response = result
            .map_err(|e| Error::Sheet(format!("{method} {url} failed: {}", describe(e))))?;

        response
            .into_json()
            .map_err(|e| Error::Sheet(format!("failed to parse Google response: {e}")))
    }
}

// ---------------------------------------------------------------------------
// GoogleSheet
// ---------------------------------------------------------------------------

/// One tab of a Google spreadsheet.
pub struct GoogleSheet {
    api: Box<dyn SheetsApi>,
    spreadsheet_id: String,
    worksheet: String,
}

impl GoogleSheet {
    /// Authenticate with the service-account key and open the spreadsheet
    /// with the given title.
    pub fn open(key_path: &Path, title: &str, worksheet: &str) -> Result<Self> {
        let key = ServiceAccountKey::load(key_path)?;
        let token = fetch_access_token(&key)?;
        info!(account = key.client_email, "authenticated with Google");
        Self::open_with_api(Box::new(DefaultSheetsApi { token }), title, worksheet)
    }

    pub fn open_with_api(api: Box<dyn SheetsApi>, title: &str, worksheet: &str) -> Result<Self> {
        let spreadsheet_id = find_spreadsheet_id(api.as_ref(), title)?;
        info!(title, worksheet, "opened spreadsheet");
        Ok(Self {
            api,
            spreadsheet_id,
            worksheet: worksheet.to_string(),
        })
    }

    /// `'Tab Name'` or `'Tab Name'!<cell>`.
    fn range(&self, cell: Option<&str>) -> String {
        let tab = format!("'{}'", self.worksheet.replace('\'', "''"));
        match cell {
            Some(cell) => format!("{tab}!{cell}"),
            None => tab,
        }
    }

    fn values_url(&self, range: &str, action: &str) -> String {
        format!(
            "{SHEETS_API_URL}/{}/values/{}{action}",
            self.spreadsheet_id,
            urlencoding::encode(range)
        )
    }
}

fn find_spreadsheet_id(api: &dyn SheetsApi, title: &str) -> Result<String> {
    let escaped = title.replace('\\', "\\\\").replace('\'', "\\'");
    let query = [
        (
            "q",
            format!("name = '{escaped}' and mimeType = '{SPREADSHEET_MIME}' and trashed = false"),
        ),
        ("fields", "files(id,name)".to_string()),
        ("supportsAllDrives", "true".to_string()),
        ("includeItemsFromAllDrives", "true".to_string()),
    ];
    let data = api.request("GET", DRIVE_FILES_URL, &query, None)?;

    #[derive(Deserialize)]
    struct FileNode {
        id: String,
    }
    #[derive(Deserialize)]
    struct FileList {
        #[serde(default)]
        files: Vec<FileNode>,
    }

    let files: FileList = serde_json::from_value(data)
        .map_err(|e| Error::Sheet(format!("failed to parse Drive file list: {e}")))?;
    files.files.into_iter().next().map(|f| f.id).ok_or_else(|| {
        Error::Sheet(format!(
            "spreadsheet '{title}' not found or not shared with the service account"
        ))
    })
}

impl SheetStore for GoogleSheet {
    /// Cells come back unformatted, so numbers and booleans keep their type.
    fn read_all_rows(&self) -> Result<Vec<SheetRow>> {
        let query = [("valueRenderOption", "UNFORMATTED_VALUE".to_string())];
        let data = self
            .api
            .request("GET", &self.values_url(&self.range(None), ""), &query, None)?;
        let rows = data
            .get("values")
            .and_then(Value::as_array)
            .map(|rows| {
                rows.iter()
                    .map(|row| row.as_array().cloned().unwrap_or_default())
                    .collect()
            })
            .unwrap_or_default();
        Ok(rows)
    }

    fn clear(&mut self) -> Result<()> {
        let url = self.values_url(&self.range(None), ":clear");
        self.api
            .request("POST", &url, &[], Some(&serde_json::json!({})))?;
        Ok(())
    }

    fn append_row(&mut self, after: usize, row: &[Value]) -> Result<()> {
        self.append_rows(after, &[row.to_vec()])
    }

    /// Anchored on the row right after `after`. An `A1` anchor would let the
    /// API pick the first gap in the table instead.
    fn append_rows(&mut self, after: usize, rows: &[SheetRow]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let url = self.values_url(&self.range(Some(&format!("A{}", after + 1))), ":append");
        let query = [
            ("valueInputOption", "RAW".to_string()),
            ("insertDataOption", "INSERT_ROWS".to_string()),
        ];
        let body = serde_json::json!({ "majorDimension": "ROWS", "values": rows });
        self.api.request("POST", &url, &query, Some(&body))?;
        debug!(count = rows.len(), after, "appended rows");
        Ok(())
    }

    fn update_row(&mut self, index: usize, row: &[Value]) -> Result<()> {
        let range = self.range(Some(&format!("A{}", index + 1)));
        let url = self.values_url(&range, "");
        let query = [("valueInputOption", "RAW".to_string())];
        let body = serde_json::json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": [row],
        });
        self.api.request("PUT", &url, &query, Some(&body))?;
        Ok(())
    }
}
