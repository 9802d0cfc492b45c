use crate::platform::Note;

use super::{ConferenceProfile, NoteCategory, RatingStage, field_rating};

/// ICCV 2025. Notes are told apart by their content fields, and the final
/// recommendation is a separate field on the review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Iccv2025;

fn is_rebuttal(note: &Note) -> bool {
    note.has_field("pdf") && !note.has_field("abstract")
}

impl ConferenceProfile for Iccv2025 {
    fn name(&self) -> &'static str {
        "ICCV2025"
    }

    fn venue_id(&self) -> &'static str {
        "thecvf.com/ICCV/2025/Conference"
    }

    fn rating(&self, review: &Note, stage: RatingStage) -> Option<f64> {
        match stage {
            RatingStage::Initial => field_rating(review, "preliminary_recommendation"),
            RatingStage::Final => field_rating(review, "final_recommendation"),
        }
    }

    fn classify(&self, note: &Note, category: NoteCategory) -> bool {
        match category {
            NoteCategory::Review => note.has_field("preliminary_recommendation"),
            NoteCategory::DiscussionComment => note.has_field("comment"),
            NoteCategory::Rebuttal => is_rebuttal(note),
            NoteCategory::AcLetterAuthor => {
                is_rebuttal(note) && note.field_value("confidential_comments_to_AC").is_some()
            }
            _ => false,
        }
    }
}
