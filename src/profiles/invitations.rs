//! Invitation-suffix classification shared by venues that post every note
//! type under its own invitation (`.../-/Official_Review`, `.../-/Rebuttal`).

use crate::platform::Note;

use super::NoteCategory;

fn is_review(note: &Note) -> bool {
    note.has_invitation_suffix("Official_Review")
}

fn is_official_comment(note: &Note) -> bool {
    note.has_invitation_suffix("Official_Comment")
}

/// Reviewer-authored comment the authors can read.
fn is_reviewer_author_exchange(note: &Note) -> bool {
    note.written_by("Reviewer") && note.readable_by("Author")
}

fn is_ac_letter(note: &Note) -> bool {
    note.has_invitation_suffix("Author_AC_Confidential_Comment")
}

pub fn classify(note: &Note, category: NoteCategory) -> bool {
    match category {
        NoteCategory::Review => is_review(note),
        NoteCategory::FinalJustification => is_review(note) && note.has_field("final_justification"),
        NoteCategory::Rebuttal => note.has_invitation_suffix("Rebuttal"),
        NoteCategory::RebuttalAcknowledgement => {
            note.has_invitation_suffix("Mandatory_Acknowledgement")
        }
        NoteCategory::DiscussionComment => {
            is_official_comment(note) && is_reviewer_author_exchange(note)
        }
        NoteCategory::OtherComment => {
            is_official_comment(note) && !is_reviewer_author_exchange(note)
        }
        NoteCategory::AcLetterAuthor => is_ac_letter(note) && note.written_by("Author"),
        NoteCategory::AcLetterAc => is_ac_letter(note) && note.written_by("Area_Chair"),
    }
}
