use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::platform::{Group, Note, NoteEdit, NoteQuery, ReviewPlatform, collect_pages};
use crate::profiles::{ConferenceProfile, NoteCategory};

/// `<venue>/Submission<N>/Area_Chair_<code>`: a direct AC assignment.
static SPECIFIC_AC_GROUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/Submission(\d+)/Area_Chair_[^/]+$").expect("static regex is valid")
});

/// `<venue>/Submission<N>/Area_Chairs`: the per-paper AC pool.
static POOL_AC_GROUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/Submission(\d+)/Area_Chairs$").expect("static regex is valid")
});

/// A submission assigned to the user, with everything needed to aggregate it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignedPaper {
    pub number: u64,
    pub paper: Note,
    /// Forum replies; the submission note itself is excluded.
    pub notes: Vec<Note>,
    /// Anonymised reviewer group ids in assignment order: creation time, then
    /// id. A reviewer added later lands after everyone already assigned.
    pub reviewers: Vec<String>,
    /// Revisions of each review note keyed by note id, oldest first. Only
    /// populated for profiles that track rating history.
    pub review_edits: HashMap<String, Vec<NoteEdit>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    /// Paper numbers taken from `Area_Chair_<code>` groups.
    Specific(BTreeSet<u64>),
    /// Per-paper pool groups (`Submission<N>/Area_Chairs`) the user is in.
    Pool(Vec<String>),
}

/// Work out which papers the user chairs from their group memberships.
/// Direct assignment groups win; pool groups are the fallback.
pub fn resolve_assignment(venue_id: &str, groups: &[String]) -> Assignment {
    let mut specific = BTreeSet::new();
    let mut pool = Vec::new();

    for group in groups.iter().filter(|g| g.starts_with(venue_id)) {
        if let Some(caps) = SPECIFIC_AC_GROUP.captures(group) {
            if let Ok(number) = caps[1].parse::<u64>() {
                specific.insert(number);
            }
        } else if POOL_AC_GROUP.is_match(group) {
            pool.push(group.clone());
        }
    }

    if specific.is_empty() {
        Assignment::Pool(pool)
    } else {
        Assignment::Specific(specific)
    }
}

/// Fail with `NotAreaChair` unless the logged-in user is in the venue's AC
/// group. Returns the user's profile id.
pub fn ensure_area_chair<P: ReviewPlatform>(platform: &P, venue_id: &str) -> Result<String> {
    let not_ac = || Error::NotAreaChair {
        conference: venue_id.to_string(),
    };

    let members = platform.group_members(&format!("{venue_id}/Area_Chairs"))?;
    if members.is_empty() {
        warn!(venue = venue_id, "no area chair information published");
        return Err(not_ac());
    }

    let user = platform.profile_id()?;
    if !members.contains(&user) {
        return Err(not_ac());
    }
    Ok(user)
}

/// Fetch every paper the user chairs together with its discussion.
pub fn fetch_assigned_papers<P, C>(
    platform: &P,
    profile: &C,
    page_size: usize,
) -> Result<Vec<AssignedPaper>>
where
    P: ReviewPlatform,
    C: ConferenceProfile,
{
    let venue = profile.venue_id();
    info!(venue, "checking area chair role");
    let user = ensure_area_chair(platform, venue)?;

    let groups = platform.member_groups(&user)?;
    let ac_groups: Vec<String> = groups
        .into_iter()
        .filter(|g| g.contains("Area_Chair"))
        .collect();
    info!(count = ac_groups.len(), "found area chair groups");

    let submissions = match resolve_assignment(venue, &ac_groups) {
        Assignment::Specific(numbers) => {
            info!(?numbers, "using direct assignments");
            fetch_numbered(platform, profile, &numbers, page_size)?
        }
        Assignment::Pool(pool) => {
            info!(pool_groups = pool.len(), "no direct assignments, scanning submissions");
            fetch_pooled(platform, profile, &pool, page_size)?
        }
    };

    let mut papers = Vec::with_capacity(submissions.len());
    for paper in submissions {
        let Some(number) = profile.paper_number(&paper) else {
            warn!(id = paper.id, "submission has no paper number, skipping");
            continue;
        };
        info!(paper = number, "fetching discussion");
        papers.push(fetch_discussion(platform, profile, paper, number, page_size)?);
    }

    info!(count = papers.len(), "fetched assigned papers");
    Ok(papers)
}

fn fetch_numbered<P, C>(
    platform: &P,
    profile: &C,
    numbers: &BTreeSet<u64>,
    page_size: usize,
) -> Result<Vec<Note>>
where
    P: ReviewPlatform,
    C: ConferenceProfile,
{
    let invitation = profile.submission_invitation();
    let mut submissions = Vec::new();
    for &number in numbers {
        let query = NoteQuery::Numbered {
            invitation: invitation.clone(),
            number,
        };
        let found = platform.notes(&query, 0, page_size)?;
        if found.is_empty() {
            warn!(paper = number, "assigned paper not found");
        }
        submissions.extend(found);
    }
    Ok(submissions)
}

fn fetch_pooled<P, C>(
    platform: &P,
    profile: &C,
    pool: &[String],
    page_size: usize,
) -> Result<Vec<Note>>
where
    P: ReviewPlatform,
    C: ConferenceProfile,
{
    if pool.is_empty() {
        return Ok(Vec::new());
    }

    let query = NoteQuery::Invitation(profile.submission_invitation());
    let all = collect_pages(page_size, |offset, limit| {
        platform.notes(&query, offset, limit)
    })?;
    info!(count = all.len(), "scanned submissions");

    let venue = profile.venue_id();
    let assigned = all
        .into_iter()
        .filter(|paper| {
            let Some(number) = paper.number else {
                return false;
            };
            let pool_id = format!("{venue}/Submission{number}/Area_Chairs");
            let matched = paper.readers.contains(&pool_id) && pool.contains(&pool_id);
            if !matched {
                debug!(paper = number, "not assigned");
            }
            matched
        })
        .collect();
    Ok(assigned)
}

/// Order reviewer groups by creation time, then id; duplicates keep their
/// earliest entry.
pub fn assignment_order(mut groups: Vec<Group>) -> Vec<String> {
    groups.sort_by(|a, b| (a.cdate, &a.id).cmp(&(b.cdate, &b.id)));
    let mut seen = HashSet::new();
    groups
        .into_iter()
        .filter(|g| seen.insert(g.id.clone()))
        .map(|g| g.id)
        .collect()
}

fn fetch_discussion<P, C>(
    platform: &P,
    profile: &C,
    paper: Note,
    number: u64,
    page_size: usize,
) -> Result<AssignedPaper>
where
    P: ReviewPlatform,
    C: ConferenceProfile,
{
    let forum = NoteQuery::Forum(paper.forum_id().to_string());
    let mut notes = collect_pages(page_size, |offset, limit| {
        platform.notes(&forum, offset, limit)
    })?;
    notes.retain(|n| n.id != paper.id);

    let prefix = format!("{}/Submission{number}/Reviewer_", profile.venue_id());
    let reviewers = assignment_order(platform.groups_with_prefix(&prefix)?);

    let mut review_edits = HashMap::new();
    if profile.tracks_rating_history() {
        for review in notes
            .iter()
            .filter(|n| profile.classify(n, NoteCategory::Review))
        {
            let mut edits = collect_pages(page_size, |offset, limit| {
                platform.note_edits(&review.id, offset, limit)
            })?;
            edits.sort_by_key(|e| e.tcdate.unwrap_or(i64::MAX));
            review_edits.insert(review.id.clone(), edits);
        }
    }

    debug!(
        paper = number,
        notes = notes.len(),
        reviewers = reviewers.len(),
        "fetched discussion"
    );
    Ok(AssignedPaper {
        number,
        paper,
        notes,
        reviewers,
        review_edits,
    })
}
