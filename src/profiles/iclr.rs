use crate::platform::Note;

use super::{ConferenceProfile, NoteCategory, RatingStage, field_rating, invitations};

/// ICLR 2026. Ratings are edited in place, so the initial value is read
/// from the oldest revision of each review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Iclr2026;

impl ConferenceProfile for Iclr2026 {
    fn name(&self) -> &'static str {
        "ICLR2026"
    }

    fn venue_id(&self) -> &'static str {
        "ICLR.cc/2026/Conference"
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
