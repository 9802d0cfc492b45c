use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result, describe};

use super::{Group, Note, NoteEdit, NoteQuery, ReviewPlatform};

pub const DEFAULT_API_URL: &str = "https://api2.openreview.net";
const USERNAME_ENV: &str = "OPENREVIEW_USERNAME";
const PASSWORD_ENV: &str = "OPENREVIEW_PASSWORD";

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Read the login from `OPENREVIEW_USERNAME` / `OPENREVIEW_PASSWORD`.
pub fn resolve_credentials() -> Result<Credentials> {
    let read = |name: &str| {
        std::env::var(name)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| Error::Credentials(format!("${name} is not set")))
    };
    Ok(Credentials {
        username: read(USERNAME_ENV)?,
        password: read(PASSWORD_ENV)?,
    })
}

// ---------------------------------------------------------------------------
// Client abstraction (for testability)
// ---------------------------------------------------------------------------

pub trait OpenReviewApi {
    fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Value>;
}

struct DefaultOpenReviewApi {
    base_url: String,
    token: String,
}

impl DefaultOpenReviewApi {
    fn login(base_url: &str, credentials: &Credentials) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let body = serde_json::json!({
            "id": credentials.username,
            "password": credentials.password,
        });

        let response = ureq::post(&format!("{base_url}/login"))
            .send_json(&body)
            .map_err(|e| Error::Credentials(format!("OpenReview login failed: {}", describe(e))))?;

        #[derive(Deserialize)]
        struct LoginResponse {
            token: String,
        }
        let login: LoginResponse = response.into_json().map_err(|e| {
            Error::Credentials(format!("failed to parse OpenReview login response: {e}"))
        })?;

        debug!(user = credentials.username, "logged in to OpenReview");
        Ok(Self {
            base_url,
            token: login.token,
        })
    }
}

impl OpenReviewApi for DefaultOpenReviewApi {
    fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Value> {
        let mut request = ureq::get(&format!("{}{path}", self.base_url))
            .set("Authorization", &format!("Bearer {}", self.token));
        for (key, value) in params {
            request = request.query(key, value);
        }

        let response = request.call().map_err(|e| {
            Error::Platform(format!("OpenReview request {path} failed: {}", describe(e)))
        })?;

        response
            .into_json()
            .map_err(|e| Error::Platform(format!("failed to parse OpenReview response: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ProfileNode {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ProfileList {
    #[serde(default)]
    profiles: Vec<ProfileNode>,
}

#[derive(Debug, Deserialize)]
struct GroupNode {
    id: String,
    #[serde(default)]
    members: Vec<String>,
    #[serde(default)]
    cdate: Option<i64>,
    #[serde(default)]
    tcdate: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct GroupList {
    #[serde(default)]
    groups: Vec<GroupNode>,
}

#[derive(Debug, Deserialize)]
struct NoteList {
    #[serde(default)]
    notes: Vec<Note>,
}

#[derive(Debug, Deserialize)]
struct EditList {
    #[serde(default)]
    edits: Vec<NoteEdit>,
}

fn parse<T: for<'de> Deserialize<'de>>(data: Value, what: &str) -> Result<T> {
    serde_json::from_value(data)
        .map_err(|e| Error::Platform(format!("failed to parse OpenReview {what}: {e}")))
}

// ---------------------------------------------------------------------------
// OpenReviewPlatform
// ---------------------------------------------------------------------------

pub struct OpenReviewPlatform {
    api: Box<dyn OpenReviewApi>,
}

impl OpenReviewPlatform {
    pub fn login(base_url: &str, credentials: &Credentials) -> Result<Self> {
        let api = DefaultOpenReviewApi::login(base_url, credentials)?;
        Ok(Self { api: Box::new(api) })
    }

    pub fn with_api(api: Box<dyn OpenReviewApi>) -> Self {
        Self { api }
    }

    fn groups(&self, params: &[(&str, String)]) -> Result<Vec<GroupNode>> {
        let data = self.api.get("/groups", params)?;
        Ok(parse::<GroupList>(data, "groups")?.groups)
    }
}

impl ReviewPlatform for OpenReviewPlatform {
    fn profile_id(&self) -> Result<String> {
        let data = self.api.get("/profiles", &[])?;
        let profiles: ProfileList = parse(data, "profile")?;
        profiles
            .profiles
            .into_iter()
            .next()
            .map(|p| p.id)
            .ok_or_else(|| Error::Platform("no profile for the logged-in user".to_string()))
    }

    fn group_members(&self, group_id: &str) -> Result<Vec<String>> {
        let groups = self.groups(&[("id", group_id.to_string())])?;
        Ok(groups
            .into_iter()
            .find(|g| g.id == group_id)
            .map(|g| g.members)
            .unwrap_or_default())
    }

    fn member_groups(&self, member: &str) -> Result<Vec<String>> {
        let groups = self.groups(&[("member", member.to_string())])?;
        Ok(groups.into_iter().map(|g| g.id).collect())
    }

    fn groups_with_prefix(&self, prefix: &str) -> Result<Vec<Group>> {
        let groups = self.groups(&[("prefix", prefix.to_string())])?;
        Ok(groups
            .into_iter()
            .filter(|g| g.id.starts_with(prefix))
            .map(|g| Group {
                cdate: g.cdate.or(g.tcdate),
                id: g.id,
            })
            .collect())
    }

    fn notes(&self, query: &NoteQuery, offset: usize, limit: usize) -> Result<Vec<Note>> {
        let mut params = query.params();
        params.push(("offset", offset.to_string()));
        params.push(("limit", limit.to_string()));
        let data = self.api.get("/notes", &params)?;
        let notes = parse::<NoteList>(data, "notes")?.notes;
        debug!(?query, offset, count = notes.len(), "fetched notes page");
        Ok(notes)
    }

    fn note_edits(&self, note_id: &str, offset: usize, limit: usize) -> Result<Vec<NoteEdit>> {
        let params = [
            ("note.id", note_id.to_string()),
            ("sort", "tcdate:asc".to_string()),
            ("offset", offset.to_string()),
            ("limit", limit.to_string()),
        ];
        let data = self.api.get("/notes/edits", &params)?;
        Ok(parse::<EditList>(data, "note edits")?.edits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct MockOpenReviewApi {
        responses: RefCell<Vec<Result<Value>>>,
        requests: RefCell<Vec<(String, Vec<(String, String)>)>>,
    }

    impl MockOpenReviewApi {
        fn new(responses: Vec<Result<Value>>) -> Self {
            Self {
                responses: RefCell::new(responses),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl OpenReviewApi for Rc<MockOpenReviewApi> {
        fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Value> {
            self.requests.borrow_mut().push((
                path.to_string(),
                params
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
            ));
            let mut responses = self.responses.borrow_mut();
            if responses.is_empty() {
                Err(Error::Platform("no more mock responses".to_string()))
            } else {
                responses.remove(0)
            }
        }
    }

    fn platform(responses: Vec<Result<Value>>) -> (Rc<MockOpenReviewApi>, OpenReviewPlatform) {
        let api = Rc::new(MockOpenReviewApi::new(responses));
        (api.clone(), OpenReviewPlatform::with_api(Box::new(api)))
    }

    #[test]
    fn test_profile_id() {
        let (_, p) = platform(vec![Ok(serde_json::json!({
            "profiles": [{ "id": "~Ada_Lovelace1" }]
        }))]);
        assert_eq!(p.profile_id().unwrap(), "~Ada_Lovelace1");
    }

    #[test]
    fn test_profile_id_missing() {
        let (_, p) = platform(vec![Ok(serde_json::json!({ "profiles": [] }))]);
        let err = p.profile_id().unwrap_err();
        assert!(err.to_string().contains("no profile"));
    }

    #[test]
    fn test_group_members_unknown_group_is_empty() {
        let (_, p) = platform(vec![Ok(serde_json::json!({ "groups": [] }))]);
        assert!(p.group_members("V/Area_Chairs").unwrap().is_empty());
    }

    #[test]
    fn test_group_members() {
        let (api, p) = platform(vec![Ok(serde_json::json!({
            "groups": [{ "id": "V/Area_Chairs", "members": ["~A1", "~B1"] }]
        }))]);
        assert_eq!(p.group_members("V/Area_Chairs").unwrap(), vec!["~A1", "~B1"]);
        let requests = api.requests.borrow();
        assert_eq!(requests[0].0, "/groups");
        assert_eq!(requests[0].1, vec![("id".to_string(), "V/Area_Chairs".to_string())]);
    }

    #[test]
    fn test_groups_with_prefix_filters_strays() {
        let (_, p) = platform(vec![Ok(serde_json::json!({
            "groups": [
                { "id": "V/Submission3/Reviewer_b", "cdate": 200 },
                { "id": "V/Submission3/Reviewer_a", "tcdate": 100 },
                { "id": "V/Submission3/Reviewers", "cdate": 50 }
            ]
        }))]);
        let groups = p.groups_with_prefix("V/Submission3/Reviewer_").unwrap();
        assert_eq!(
            groups,
            vec![
                Group {
                    id: "V/Submission3/Reviewer_b".to_string(),
                    cdate: Some(200),
                },
                Group {
                    id: "V/Submission3/Reviewer_a".to_string(),
                    cdate: Some(100),
                },
            ]
        );
    }

    #[test]
    fn test_notes_sends_paging_params() {
        let (api, p) = platform(vec![Ok(serde_json::json!({
            "notes": [{ "id": "n1", "forum": "f1" }],
            "count": 1
        }))]);
        let notes = p
            .notes(&NoteQuery::Forum("f1".to_string()), 1000, 500)
            .unwrap();
        assert_eq!(notes.len(), 1);
        let requests = api.requests.borrow();
        assert!(requests[0].1.contains(&("offset".to_string(), "1000".to_string())));
        assert!(requests[0].1.contains(&("limit".to_string(), "500".to_string())));
        assert!(requests[0].1.contains(&("forum".to_string(), "f1".to_string())));
    }

    #[test]
    fn test_note_edits() {
        let (api, p) = platform(vec![Ok(serde_json::json!({
            "edits": [
                { "id": "e1", "tcdate": 10, "note": { "id": "r1", "content": { "rating": { "value": 3 } } } },
                { "id": "e2", "tcdate": 20, "note": { "id": "r1", "content": { "rating": { "value": 5 } } } }
            ]
        }))]);
        let edits = p.note_edits("r1", 0, 100).unwrap();
        assert_eq!(edits.len(), 2);
        assert_eq!(edits[1].note.field_value("rating"), Some(&serde_json::json!(5)));
        assert_eq!(api.requests.borrow()[0].0, "/notes/edits");
    }

    #[test]
    fn test_malformed_response_is_platform_error() {
        let (_, p) = platform(vec![Ok(serde_json::json!({ "notes": "nope" }))]);
        let err = p.notes(&NoteQuery::Forum("f".to_string()), 0, 10).unwrap_err();
        assert!(matches!(err, Error::Platform(_)));
    }

    #[test]
    fn test_errors_propagate() {
        let (_, p) = platform(vec![Err(Error::Platform("connection refused".to_string()))]);
        let err = p.member_groups("~A1").unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials {
            username: "ac@example.org".to_string(),
            password: "hunter2".to_string(),
        };
        let shown = format!("{creds:?}");
        assert!(shown.contains("ac@example.org"));
        assert!(!shown.contains("hunter2"));
    }

    #[test]
    #[serial]
    fn test_resolve_credentials_from_env() {
        unsafe {
            std::env::set_var(USERNAME_ENV, "ac@example.org");
            std::env::set_var(PASSWORD_ENV, "secret");
        }
        let creds = resolve_credentials().unwrap();
        assert_eq!(creds.username, "ac@example.org");
        assert_eq!(creds.password, "secret");
        unsafe {
            std::env::remove_var(USERNAME_ENV);
            std::env::remove_var(PASSWORD_ENV);
        }
    }

    #[test]
    #[serial]
    fn test_resolve_credentials_missing() {
        unsafe {
            std::env::remove_var(USERNAME_ENV);
            std::env::remove_var(PASSWORD_ENV);
        }
        let err = resolve_credentials().unwrap_err();
        assert!(matches!(err, Error::Credentials(_)));
        assert!(err.to_string().contains(USERNAME_ENV));
    }
}
