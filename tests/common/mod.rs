#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;

use ac_sheet::aggregate::PaperRecord;
use ac_sheet::error::Result;
use ac_sheet::platform::{Group, Note, NoteEdit, NoteQuery, ReviewPlatform};
use serde_json::{Value, json};

pub const USER: &str = "~Area_Chair1";

/// In-memory review platform. Listings are served a page at a time from
/// plain vectors; every call is recorded.
#[derive(Default)]
pub struct FakePlatform {
    pub ac_members: Vec<String>,
    pub groups: Vec<String>,
    pub reviewer_groups: Vec<Group>,
    pub submissions: Vec<Note>,
    pub forums: HashMap<String, Vec<Note>>,
    pub edits: HashMap<String, Vec<NoteEdit>>,
    pub calls: RefCell<Vec<String>>,
}

impl FakePlatform {
    /// A platform where `USER` is an area chair of `venue` holding `groups`.
    pub fn chairing(groups: &[String]) -> Self {
        Self {
            ac_members: vec![USER.to_string()],
            groups: groups.to_vec(),
            ..Default::default()
        }
    }

    pub fn add_paper(&mut self, paper: Note, discussion: Vec<Note>) {
        let mut forum = vec![paper.clone()];
        forum.extend(discussion);
        self.forums.insert(paper.id.clone(), forum);
        self.submissions.push(paper);
    }

    pub fn calls_matching(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

fn page<T: Clone>(items: &[T], offset: usize, limit: usize) -> Vec<T> {
    items.iter().skip(offset).take(limit).cloned().collect()
}

impl ReviewPlatform for FakePlatform {
    fn profile_id(&self) -> Result<String> {
        self.record("profile".to_string());
        Ok(USER.to_string())
    }

    fn group_members(&self, group_id: &str) -> Result<Vec<String>> {
        self.record(format!("members {group_id}"));
        if group_id.ends_with("/Area_Chairs") {
            Ok(self.ac_members.clone())
        } else {
            Ok(Vec::new())
        }
    }

    fn member_groups(&self, member: &str) -> Result<Vec<String>> {
        self.record(format!("groups {member}"));
        Ok(self.groups.clone())
    }

    fn groups_with_prefix(&self, prefix: &str) -> Result<Vec<Group>> {
        self.record(format!("prefix {prefix}"));
        Ok(self
            .reviewer_groups
            .iter()
            .filter(|g| g.id.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn notes(&self, query: &NoteQuery, offset: usize, limit: usize) -> Result<Vec<Note>> {
        let found: Vec<Note> = match query {
            NoteQuery::Invitation(_) => {
                self.record(format!("submissions {offset}"));
                page(&self.submissions, offset, limit)
            }
            NoteQuery::Numbered { number, .. } => {
                self.record(format!("numbered {number}"));
                let matching: Vec<Note> = self
                    .submissions
                    .iter()
                    .filter(|n| n.number == Some(*number))
                    .cloned()
                    .collect();
                page(&matching, offset, limit)
            }
            NoteQuery::Forum(forum) => {
                self.record(format!("forum {forum} {offset}"));
                page(
                    self.forums.get(forum).map_or(&[][..], Vec::as_slice),
                    offset,
                    limit,
                )
            }
        };
        Ok(found)
    }

    fn note_edits(&self, note_id: &str, offset: usize, limit: usize) -> Result<Vec<NoteEdit>> {
        self.record(format!("edits {note_id} {offset}"));
        Ok(page(
            self.edits.get(note_id).map_or(&[][..], Vec::as_slice),
            offset,
            limit,
        ))
    }
}

/// Reviewer group `Reviewer_{anon}` of a paper, created at `cdate`.
pub fn reviewer_group(venue: &str, number: u64, anon: &str, cdate: i64) -> Group {
    Group {
        id: format!("{venue}/Submission{number}/Reviewer_{anon}"),
        cdate: Some(cdate),
    }
}

/// Serves at most `cap` notes per page whatever limit is asked for.
pub struct CappedPlatform {
    pub inner: FakePlatform,
    pub cap: usize,
}

impl ReviewPlatform for CappedPlatform {
    fn profile_id(&self) -> Result<String> {
        self.inner.profile_id()
    }

    fn group_members(&self, group_id: &str) -> Result<Vec<String>> {
        self.inner.group_members(group_id)
    }

    fn member_groups(&self, member: &str) -> Result<Vec<String>> {
        self.inner.member_groups(member)
    }

    fn groups_with_prefix(&self, prefix: &str) -> Result<Vec<Group>> {
        self.inner.groups_with_prefix(prefix)
    }

    fn notes(&self, query: &NoteQuery, offset: usize, limit: usize) -> Result<Vec<Note>> {
        self.inner.notes(query, offset, limit.min(self.cap))
    }

    fn note_edits(&self, note_id: &str, offset: usize, limit: usize) -> Result<Vec<NoteEdit>> {
        self.inner.note_edits(note_id, offset, limit.min(self.cap))
    }
}

pub fn field(mut note: Note, name: &str, value: Value) -> Note {
    note.content.insert(name.to_string(), json!({ "value": value }));
    note
}

/// A submission numbered `number` readable by its AC pool.
pub fn submission(venue: &str, number: u64, title: &str) -> Note {
    let id = format!("paper{number}");
    let note = Note {
        id: id.clone(),
        number: Some(number),
        forum: id,
        readers: vec![format!("{venue}/Submission{number}/Area_Chairs")],
        ..Default::default()
    };
    field(note, "title", json!(title))
}

/// An official review signed by the reviewer `Reviewer_{anon}`.
pub fn review(venue: &str, number: u64, anon: &str, rating: Value) -> Note {
    let signer = format!("{venue}/Submission{number}/Reviewer_{anon}");
    let note = Note {
        id: format!("review-{number}-{anon}"),
        forum: format!("paper{number}"),
        invitations: vec![format!("{venue}/Submission{number}/-/Official_Review")],
        writers: vec![signer.clone()],
        signatures: vec![signer],
        ..Default::default()
    };
    field(note, "rating", rating)
}

/// A discussion note posted under `{venue}/Submission{number}/-/{kind}`.
pub fn posted(venue: &str, number: u64, id: &str, kind: &str, writer: &str, readers: &[&str]) -> Note {
    let prefix = format!("{venue}/Submission{number}");
    Note {
        id: id.to_string(),
        forum: format!("paper{number}"),
        invitations: vec![format!("{prefix}/-/{kind}")],
        writers: vec![format!("{prefix}/{writer}")],
        signatures: vec![format!("{prefix}/{writer}")],
        readers: readers.iter().map(|r| format!("{prefix}/{r}")).collect(),
        ..Default::default()
    }
}

pub fn edit(id: &str, tcdate: i64, rating: Value) -> NoteEdit {
    NoteEdit {
        id: id.to_string(),
        tcdate: Some(tcdate),
        note: field(Note::default(), "rating", rating),
    }
}

pub fn record(number: u64, title: &str, ratings: &[Option<f64>]) -> PaperRecord {
    PaperRecord {
        title: title.to_string(),
        number,
        url: format!("https://openreview.net/forum?id=paper{number}"),
        reviewer_count: ratings.len(),
        initial_ratings: ratings.to_vec(),
        avg_initial: ac_sheet::aggregate::mean(ratings),
        final_ratings: ratings.to_vec(),
        avg_final: ac_sheet::aggregate::mean(ratings),
        ..Default::default()
    }
}
