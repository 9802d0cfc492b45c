use serde_json::Value;

use crate::platform::Note;

/// A note in forum `f1` posted under the given invitations.
pub fn make_note(id: &str, invitations: &[&str]) -> Note {
    Note {
        id: id.to_string(),
        forum: "f1".to_string(),
        invitations: invitations.iter().map(|i| i.to_string()).collect(),
        ..Default::default()
    }
}

/// Set `content[field] = { "value": value }`.
pub fn with_field(mut note: Note, field: &str, value: Value) -> Note {
    note.content
        .insert(field.to_string(), serde_json::json!({ "value": value }));
    note
}

/// A submission note with a title, numbered `number`, whose forum is its own id.
pub fn make_paper(number: u64, title: &str) -> Note {
    let id = format!("paper{number}");
    let mut paper = with_field(make_note(&id, &[]), "title", Value::from(title));
    paper.forum = id;
    paper.number = Some(number);
    paper
}
