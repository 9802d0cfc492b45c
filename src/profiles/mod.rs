//! Per-conference knowledge of how papers, ratings and discussion notes are
//! encoded on the review platform.
//!
//! Adding a conference means adding one profile type and one [`AnyProfile`]
//! variant; nothing outside this module needs to change.

pub mod iccv;
pub mod iclr;
pub mod icml;
pub mod invitations;
pub mod neurips;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::platform::Note;

/// Discussion note categories that get their own count column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NoteCategory {
    Review,
    FinalJustification,
    Rebuttal,
    RebuttalAcknowledgement,
    DiscussionComment,
    OtherComment,
    AcLetterAuthor,
    AcLetterAc,
}

impl NoteCategory {
    pub const ALL: [NoteCategory; 8] = [
        NoteCategory::Review,
        NoteCategory::FinalJustification,
        NoteCategory::Rebuttal,
        NoteCategory::RebuttalAcknowledgement,
        NoteCategory::DiscussionComment,
        NoteCategory::OtherComment,
        NoteCategory::AcLetterAuthor,
        NoteCategory::AcLetterAc,
    ];

    pub fn key(self) -> &'static str {
        match self {
            NoteCategory::Review => "review",
            NoteCategory::FinalJustification => "final_justification",
            NoteCategory::Rebuttal => "rebuttal",
            NoteCategory::RebuttalAcknowledgement => "rebuttal_acknowledgement",
            NoteCategory::DiscussionComment => "discussion_comment",
            NoteCategory::OtherComment => "other_comment",
            NoteCategory::AcLetterAuthor => "ac_letter_author",
            NoteCategory::AcLetterAc => "ac_letter_ac",
        }
    }

    pub fn is_comment(self) -> bool {
        matches!(
            self,
            NoteCategory::DiscussionComment | NoteCategory::OtherComment
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingStage {
    Initial,
    Final,
}

pub trait ConferenceProfile {
    /// Short name used in configuration, e.g. `ICLR2026`.
    fn name(&self) -> &'static str;

    /// Venue id on the platform, e.g. `ICLR.cc/2026/Conference`.
    fn venue_id(&self) -> &'static str;

    /// Stable paper number for a submission note.
    fn paper_number(&self, paper: &Note) -> Option<u64> {
        paper.number
    }

    /// Numeric rating carried by a review note. `None` when the field is
    /// missing or malformed.
    fn rating(&self, review: &Note, stage: RatingStage) -> Option<f64>;

    /// True when initial ratings come from the oldest revision of a review
    /// rather than from a separate field.
    fn tracks_rating_history(&self) -> bool {
        false
    }

    /// Whether `note` belongs to `category`. Categories are tested
    /// independently, so one note may land in several.
    fn classify(&self, note: &Note, category: NoteCategory) -> bool;

    fn is_withdrawal(&self, note: &Note) -> bool {
        note.has_invitation_suffix("/-/Withdrawal")
    }

    fn categories(&self, note: &Note) -> Vec<NoteCategory> {
        NoteCategory::ALL
            .into_iter()
            .filter(|c| self.classify(note, *c))
            .collect()
    }

    fn submission_invitation(&self) -> String {
        format!("{}/-/Submission", self.venue_id())
    }
}

/// Parse a rating value: a JSON number, or a string whose leading token is
/// a number (`"6"`, `"3: Borderline accept"`).
pub fn parse_rating(value: &Value) -> Option<f64> {
    let rating = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.split(':').next()?.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    rating.is_finite().then_some(rating)
}

/// `content[field].value` parsed with [`parse_rating`].
pub fn field_rating(note: &Note, field: &str) -> Option<f64> {
    note.field_value(field).and_then(parse_rating)
}

pub const KNOWN: [&str; 4] = ["ICLR2026", "NeurIPS2025", "ICCV2025", "ICML2025"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnyProfile {
    Iclr2026(iclr::Iclr2026),
    NeurIps2025(neurips::NeurIps2025),
    Iccv2025(iccv::Iccv2025),
    Icml2025(icml::Icml2025),
}

/// Resolve a conference name (case-insensitive) to its profile.
pub fn lookup(name: &str) -> Result<AnyProfile> {
    let profile = match name.trim().to_ascii_lowercase().as_str() {
        "iclr2026" => AnyProfile::Iclr2026(iclr::Iclr2026),
        "neurips2025" => AnyProfile::NeurIps2025(neurips::NeurIps2025),
        "iccv2025" => AnyProfile::Iccv2025(iccv::Iccv2025),
        "icml2025" => AnyProfile::Icml2025(icml::Icml2025),
        _ => {
            return Err(Error::UnknownConference {
                name: name.to_string(),
                known: KNOWN.join(", "),
            });
        }
    };
    Ok(profile)
}

impl ConferenceProfile for AnyProfile {
    fn name(&self) -> &'static str {
        match self {
            AnyProfile::Iclr2026(p) => p.name(),
            AnyProfile::NeurIps2025(p) => p.name(),
            AnyProfile::Iccv2025(p) => p.name(),
            AnyProfile::Icml2025(p) => p.name(),
        }
    }

    fn venue_id(&self) -> &'static str {
        match self {
            AnyProfile::Iclr2026(p) => p.venue_id(),
            AnyProfile::NeurIps2025(p) => p.venue_id(),
            AnyProfile::Iccv2025(p) => p.venue_id(),
            AnyProfile::Icml2025(p) => p.venue_id(),
        }
    }

    fn paper_number(&self, paper: &Note) -> Option<u64> {
        match self {
            AnyProfile::Iclr2026(p) => p.paper_number(paper),
            AnyProfile::NeurIps2025(p) => p.paper_number(paper),
            AnyProfile::Iccv2025(p) => p.paper_number(paper),
            AnyProfile::Icml2025(p) => p.paper_number(paper),
        }
    }

    fn rating(&self, review: &Note, stage: RatingStage) -> Option<f64> {
        match self {
            AnyProfile::Iclr2026(p) => p.rating(review, stage),
            AnyProfile::NeurIps2025(p) => p.rating(review, stage),
            AnyProfile::Iccv2025(p) => p.rating(review, stage),
            AnyProfile::Icml2025(p) => p.rating(review, stage),
        }
    }

    fn tracks_rating_history(&self) -> bool {
        match self {
            AnyProfile::Iclr2026(p) => p.tracks_rating_history(),
            AnyProfile::NeurIps2025(p) => p.tracks_rating_history(),
            AnyProfile::Iccv2025(p) => p.tracks_rating_history(),
            AnyProfile::Icml2025(p) => p.tracks_rating_history(),
        }
    }

    fn classify(&self, note: &Note, category: NoteCategory) -> bool {
        match self {
            AnyProfile::Iclr2026(p) => p.classify(note, category),
            AnyProfile::NeurIps2025(p) => p.classify(note, category),
            AnyProfile::Iccv2025(p) => p.classify(note, category),
            AnyProfile::Icml2025(p) => p.classify(note, category),
        }
    }

    fn is_withdrawal(&self, note: &Note) -> bool {
        match self {
            AnyProfile::Iclr2026(p) => p.is_withdrawal(note),
            AnyProfile::NeurIps2025(p) => p.is_withdrawal(note),
            AnyProfile::Iccv2025(p) => p.is_withdrawal(note),
            AnyProfile::Icml2025(p) => p.is_withdrawal(note),
        }
    }
}
