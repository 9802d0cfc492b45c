pub mod openreview;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::Result;

/// A platform-native note. Submissions, reviews, comments and letters all
/// share this shape; only their invitations and content differ.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Note {
    pub id: String,
    #[serde(default)]
    pub number: Option<u64>,
    #[serde(default)]
    pub forum: String,
    #[serde(default)]
    pub invitations: Vec<String>,
    #[serde(default)]
    pub content: Map<String, Value>,
    #[serde(default)]
    pub writers: Vec<String>,
    #[serde(default)]
    pub readers: Vec<String>,
    #[serde(default)]
    pub signatures: Vec<String>,
    #[serde(default)]
    pub tcdate: Option<i64>,
}

impl Note {
    /// `content[field].value`, if present.
    pub fn field_value(&self, field: &str) -> Option<&Value> {
        self.content.get(field).and_then(|f| f.get("value"))
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.content.contains_key(field)
    }

    pub fn title(&self) -> Option<&str> {
        self.field_value("title").and_then(Value::as_str)
    }

    pub fn forum_id(&self) -> &str {
        if self.forum.is_empty() {
            &self.id
        } else {
            &self.forum
        }
    }

    pub fn has_invitation_suffix(&self, suffix: &str) -> bool {
        self.invitations.iter().any(|inv| inv.ends_with(suffix))
    }

    /// True when any writer's last path segment starts with `role`
    /// (e.g. `.../Submission12/Reviewer_abcd` for `Reviewer`).
    pub fn written_by(&self, role: &str) -> bool {
        self.writers.iter().any(|w| last_segment(w).starts_with(role))
    }

    pub fn readable_by(&self, role: &str) -> bool {
        self.readers.iter().any(|r| last_segment(r).starts_with(role))
    }

    pub fn signature(&self) -> Option<&str> {
        self.signatures.first().map(String::as_str)
    }
}

fn last_segment(id: &str) -> &str {
    id.rsplit('/').next().unwrap_or(id)
}

/// One revision of a note. `note.content` carries only the fields touched by
/// that revision.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct NoteEdit {
    pub id: String,
    #[serde(default)]
    pub tcdate: Option<i64>,
    #[serde(default)]
    pub note: Note,
}

/// A platform group with its creation time (ms since epoch, when known).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Group {
    pub id: String,
    pub cdate: Option<i64>,
}

/// Which notes a paged `notes` call should return.
#[derive(Debug, Clone, PartialEq)]
pub enum NoteQuery {
    /// Every note posted under an invitation.
    Invitation(String),
    /// The note with the given number under an invitation.
    Numbered { invitation: String, number: u64 },
    /// Every note in a forum, the submission itself included.
    Forum(String),
}

impl NoteQuery {
    pub fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            NoteQuery::Invitation(invitation) => vec![
                ("invitation", invitation.clone()),
                ("details", "replicated".to_string()),
            ],
            NoteQuery::Numbered { invitation, number } => vec![
                ("invitation", invitation.clone()),
                ("details", "replicated".to_string()),
                ("number", number.to_string()),
            ],
            NoteQuery::Forum(forum) => vec![("forum", forum.clone())],
        }
    }
}

/// Read-only view of the review platform. Every listing call returns a
/// single page; callers drive pagination through [`collect_pages`].
pub trait ReviewPlatform {
    /// Profile id of the authenticated identity.
    fn profile_id(&self) -> Result<String>;

    /// Members of the group with the given id. Empty if the group is unknown.
    fn group_members(&self, group_id: &str) -> Result<Vec<String>>;

    /// Ids of every group the member belongs to.
    fn member_groups(&self, member: &str) -> Result<Vec<String>>;

    /// Every group whose id starts with `prefix`.
    fn groups_with_prefix(&self, prefix: &str) -> Result<Vec<Group>>;

    fn notes(&self, query: &NoteQuery, offset: usize, limit: usize) -> Result<Vec<Note>>;

    /// Revisions of a note, oldest first.
    fn note_edits(&self, note_id: &str, offset: usize, limit: usize) -> Result<Vec<NoteEdit>>;
}

impl<P: ReviewPlatform + ?Sized> ReviewPlatform for &P {
    fn profile_id(&self) -> Result<String> {
        (**self).profile_id()
    }

    fn group_members(&self, group_id: &str) -> Result<Vec<String>> {
        (**self).group_members(group_id)
    }

    fn member_groups(&self, member: &str) -> Result<Vec<String>> {
        (**self).member_groups(member)
    }

    fn groups_with_prefix(&self, prefix: &str) -> Result<Vec<Group>> {
        (**self).groups_with_prefix(prefix)
    }

    fn notes(&self, query: &NoteQuery, offset: usize, limit: usize) -> Result<Vec<Note>> {
        (**self).notes(query, offset, limit)
    }

    fn note_edits(&self, note_id: &str, offset: usize, limit: usize) -> Result<Vec<NoteEdit>> {
        (**self).note_edits(note_id, offset, limit)
    }
}

/// Keep requesting pages until one comes back empty. The platform may cap a
/// page below `page_size`, so a short page does not mean the end.
pub fn collect_pages<T, F>(page_size: usize, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(usize, usize) -> Result<Vec<T>>,
{
    let page_size = page_size.max(1);
    let mut items = Vec::new();
    let mut offset = 0;
    loop {
        let page = fetch(offset, page_size)?;
        if page.is_empty() {
            break;
        }
        offset += page.len();
        items.extend(page);
    }
    Ok(items)
}
