use crate::platform::Note;

use super::{ConferenceProfile, NoteCategory, RatingStage, field_rating};

/// ICML 2025. Notes are keyed by a characteristic content field; there is
/// no final rating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Icml2025;

impl ConferenceProfile for Icml2025 {
    fn name(&self) -> &'static str {
        "ICML2025"
    }

    fn venue_id(&self) -> &'static str {
        "ICML.cc/2025/Conference"
    }

    fn rating(&self, review: &Note, stage: RatingStage) -> Option<f64> {
        match stage {
            RatingStage::Initial => field_rating(review, "overall_recommendation"),
            RatingStage::Final => None,
        }
    }

    fn classify(&self, note: &Note, category: NoteCategory) -> bool {
        let key = match category {
            NoteCategory::Review => "summary",
            NoteCategory::DiscussionComment => "comment",
            NoteCategory::RebuttalAcknowledgement => "acknowledgement",
            NoteCategory::Rebuttal => "rebuttal",
            _ => return false,
        };
        note.has_field(key)
    }
}
