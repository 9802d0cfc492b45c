use crate::platform::Note;

use super::{ConferenceProfile, NoteCategory, RatingStage, field_rating, invitations};

/// NeurIPS 2025. Reviews carry a single `rating` that reviewers revise
/// during discussion; the initial value comes from the review's edit history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NeurIps2025;

impl ConferenceProfile for NeurIps2025 {
    fn name(&self) -> &'static str {
        "NeurIPS2025"
    }

    fn venue_id(&self) -> &'static str {
        "NeurIPS.cc/2025/Conference"
    }

    fn rating(&self, review: &Note, _stage: RatingStage) -> Option<f64> {
        field_rating(review, "rating")
    }

    fn tracks_rating_history(&self) -> bool {
        true
    }

    fn classify(&self, note: &Note, category: NoteCategory) -> bool {
        invitations::classify(note, category)
    }
}
