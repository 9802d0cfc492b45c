use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;
use tracing::{debug, warn};

use crate::fetcher::AssignedPaper;
use crate::platform::{Note, NoteEdit};
use crate::profiles::{ConferenceProfile, NoteCategory, RatingStage};

pub const FORUM_URL: &str = "https://openreview.net/forum?id=";

/// Per-category note counts. Categories nobody matched read as 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteCounts {
    by_category: BTreeMap<NoteCategory, usize>,
    /// Notes that matched no category at all.
    pub others: usize,
}

impl NoteCounts {
    pub fn get(&self, category: NoteCategory) -> usize {
        self.by_category.get(&category).copied().unwrap_or(0)
    }

    fn add(&mut self, category: NoteCategory) {
        *self.by_category.entry(category).or_insert(0) += 1;
    }
}

/// One output row, keyed by paper number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaperRecord {
    pub title: String,
    pub number: u64,
    pub url: String,
    pub withdrawn: bool,
    pub reviewer_count: usize,
    /// One entry per reviewer, in assignment order.
    pub initial_ratings: Vec<Option<f64>>,
    pub avg_initial: Option<f64>,
    pub final_ratings: Vec<Option<f64>>,
    pub avg_final: Option<f64>,
    pub counts: NoteCounts,
    /// Distinct reviewers who posted at least one comment.
    pub reviewer_participation: usize,
}

/// Mean of the present values; `None` when there are none.
pub fn mean(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f64>() / present.len() as f64)
    }
}

/// Build the record for one paper. Never fails: anything unreadable
/// degrades to absent or zero and is logged.
pub fn aggregate<C: ConferenceProfile>(assigned: &AssignedPaper, profile: &C) -> PaperRecord {
    let number = assigned.number;
    let paper = &assigned.paper;

    let mut counts = NoteCounts::default();
    let mut reviews: Vec<&Note> = Vec::new();
    let mut commenters: BTreeSet<&str> = BTreeSet::new();
    let mut withdrawn = venue_marks_withdrawn(paper);

    for note in &assigned.notes {
        let categories = profile.categories(note);
        if categories.is_empty() {
            debug!(paper = number, note = note.id, "note matched no category");
            counts.others += 1;
        }
        for &category in &categories {
            counts.add(category);
        }
        if categories.contains(&NoteCategory::Review) {
            reviews.push(note);
        }
        if categories.iter().any(|c| c.is_comment())
            && let Some(signature) = note.signature()
            && is_reviewer_signature(signature)
        {
            commenters.insert(signature);
        }
        if profile.is_withdrawal(note) {
            withdrawn = true;
        }
    }

    let slots = order_reviews(&assigned.reviewers, &reviews, number);

    let mut initial_ratings = Vec::with_capacity(slots.len());
    let mut final_ratings = Vec::with_capacity(slots.len());
    for slot in &slots {
        let Some(review) = slot else {
            initial_ratings.push(None);
            final_ratings.push(None);
            continue;
        };
        let edits = assigned.review_edits.get(&review.id);
        let initial = initial_rating(profile, review, edits);
        if initial.is_none() {
            warn!(paper = number, review = review.id, "review has no readable rating");
        }
        initial_ratings.push(initial);
        final_ratings.push(profile.rating(review, RatingStage::Final));
    }

    let title = match paper.title() {
        Some(t) => t.to_string(),
        None => {
            warn!(paper = number, "submission has no title");
            String::new()
        }
    };

    PaperRecord {
        title,
        number,
        url: format!("{FORUM_URL}{}", paper.forum_id()),
        withdrawn,
        reviewer_count: slots.len(),
        avg_initial: mean(&initial_ratings),
        initial_ratings,
        avg_final: mean(&final_ratings),
        final_ratings,
        counts,
        reviewer_participation: commenters.len(),
    }
}

pub fn aggregate_all<C: ConferenceProfile>(papers: &[AssignedPaper], profile: &C) -> Vec<PaperRecord> {
    papers.iter().map(|p| aggregate(p, profile)).collect()
}

fn venue_marks_withdrawn(paper: &Note) -> bool {
    paper
        .field_value("venue")
        .and_then(Value::as_str)
        .is_some_and(|v| v.contains("Withdrawn"))
}

fn is_reviewer_signature(signature: &str) -> bool {
    signature
        .rsplit('/')
        .next()
        .is_some_and(|s| s.starts_with("Reviewer"))
}

/// Place each review in its reviewer's slot. Slots follow the assignment
/// order, so a reviewer keeps the same column as reviews and late reviewers
/// arrive; reviews from signers outside that list follow in signature order.
fn order_reviews<'a>(reviewers: &[String], reviews: &[&'a Note], paper: u64) -> Vec<Option<&'a Note>> {
    if reviewers.is_empty() && !reviews.is_empty() {
        warn!(paper, "no reviewer assignments, ordering reviews by signature");
    }

    let mut by_signer: BTreeMap<&str, &'a Note> = BTreeMap::new();
    let mut unsigned: Vec<&'a Note> = Vec::new();
    for &review in reviews {
        match review.signature() {
            Some(signer) => {
                by_signer.entry(signer).or_insert(review);
            }
            None => unsigned.push(review),
        }
    }
    unsigned.sort_by(|a, b| a.id.cmp(&b.id));

    let mut slots: Vec<Option<&'a Note>> = reviewers
        .iter()
        .map(|r| by_signer.remove(r.as_str()))
        .collect();
    slots.extend(by_signer.into_values().map(Some));
    slots.extend(unsigned.into_iter().map(Some));
    slots
}

/// Oldest revision carrying a rating when the profile tracks history,
/// otherwise the rating on the current note.
fn initial_rating<C: ConferenceProfile>(
    profile: &C,
    review: &Note,
    edits: Option<&Vec<NoteEdit>>,
) -> Option<f64> {
    if profile.tracks_rating_history()
        && let Some(first) = edits
            .into_iter()
            .flatten()
            .find_map(|e| profile.rating(&e.note, RatingStage::Initial))
    {
        return Some(first);
    }
    profile.rating(review, RatingStage::Initial)
}
