//! Personal relevance scoring and the final ordering.
//!
//! ```text
//! relevance = min(1, confidence
//!                    + 0.30 alumni match
//!                    + 0.25 ex-colleague match
//!                    + 0.20 * matched_skills / requested_skills
//!                    + 0.15 department match
//!                    + 0.10 location match
//!                    + 0.05 * source_quality)
//! ```
//!
//! Every factor that contributes appends a reason such as `alumni_match:MIT`
//! or `skills_match:2/4`.

use std::cmp::Ordering;

use crate::text::{contains_phrase, normalize};
use crate::types::{clamp_unit, PersonRecord, SearchContext};

/// Bonus for a shared school.
pub const ALUMNI_BONUS: f64 = 0.3;
/// Bonus for a shared past employer.
pub const EX_COLLEAGUE_BONUS: f64 = 0.25;
/// Bonus when every requested skill matches.
pub const SKILLS_BONUS: f64 = 0.2;
/// Bonus for a department match.
pub const DEPARTMENT_BONUS: f64 = 0.15;
/// Bonus for a location match.
pub const LOCATION_BONUS: f64 = 0.1;
/// Bonus at source quality 1.0.
pub const SOURCE_QUALITY_BONUS: f64 = 0.05;

/// A requester-side term: as given (for reasons) and normalised (for matching).
#[derive(Debug, Clone)]
struct Term {
    label: String,
    needle: String,
}

impl Term {
    fn new(raw: &str) -> Option<Self> {
        let label = raw.trim();
        let needle = normalize(label);
        (!needle.is_empty()).then(|| Self {
            label: label.to_owned(),
            needle,
        })
    }
}

fn terms<S: AsRef<str>>(raw: &[S]) -> Vec<Term> {
    raw.iter().filter_map(|s| Term::new(s.as_ref())).collect()
}

/// Scores people against one requester context.
#[derive(Debug, Clone)]
pub struct Ranker {
    schools: Vec<Term>,
    employers: Vec<Term>,
    skills: Vec<Term>,
    department: Option<Term>,
    location: Option<Term>,
}

impl Ranker {
    /// Precompute match terms from the requester's schools, employers, skills,
    /// department and location.
    pub fn new(ctx: &SearchContext) -> Self {
        Self {
            schools: terms(&ctx.requester_schools),
            employers: terms(&ctx.requester_past_employers),
            skills: terms(&ctx.all_skills()),
            department: ctx.department.as_deref().and_then(Term::new),
            // "San Francisco, CA" matches on the city.
            location: ctx
                .location
                .as_deref()
                .and_then(|l| l.split(',').next())
                .and_then(Term::new),
        }
    }

    /// Compute `relevance` and `match_reasons` for one person.
    pub fn score(&self, person: &mut PersonRecord) {
        let background = person.background_text();
        let mut reasons = Vec::new();
        let mut score = clamp_unit(person.confidence);

        if let Some(school) = self
            .schools
            .iter()
            .find(|t| contains_phrase(&background, &t.needle))
        {
            score += ALUMNI_BONUS;
            reasons.push(format!("alumni_match:{}", school.label));
        }

        if let Some(employer) = self
            .employers
            .iter()
            .find(|t| contains_phrase(&background, &t.needle))
        {
            score += EX_COLLEAGUE_BONUS;
            reasons.push(format!("ex_colleague_match:{}", employer.label));
        }

        if !self.skills.is_empty() {
            let matched = self
                .skills
                .iter()
                .filter(|t| contains_phrase(&background, &t.needle))
                .count();
            if matched > 0 {
                let total = self.skills.len();
                score += SKILLS_BONUS * matched as f64 / total as f64;
                reasons.push(format!("skills_match:{matched}/{total}"));
            }
        }

        if let Some(department) = &self.department {
            let needle = department.needle.as_str();
            let own = person.department.as_deref().map(normalize);
            let matched = own.as_deref().is_some_and(|d| {
                !d.is_empty() && (d.contains(needle) || needle.contains(d))
            }) || contains_phrase(&background, needle);
            if matched {
                score += DEPARTMENT_BONUS;
                reasons.push(format!("department_match:{}", department.label));
            }
        }

        if let Some(location) = &self.location {
            if contains_phrase(&background, &location.needle) {
                score += LOCATION_BONUS;
                reasons.push(format!("location_match:{}", location.label));
            }
        }

        let quality = clamp_unit(person.source_quality);
        if quality > 0.0 {
            score += SOURCE_QUALITY_BONUS * quality;
            reasons.push(format!("source_quality:{quality:.2}"));
        }

        person.relevance = clamp_unit(score);
        person.match_reasons = reasons;
    }

    /// Score every person and sort into output order.
    pub fn rank(&self, people: &mut [PersonRecord]) {
        for person in people.iter_mut() {
            self.score(person);
        }
        sort_people(people);
    }
}

/// Output order: category, then relevance, then presence of a profile URL,
/// then source quality. Ties fall back to the dedup key so the order is total.
pub fn sort_people(people: &mut [PersonRecord]) {
    people.sort_by(compare_people);
}

fn compare_people(a: &PersonRecord, b: &PersonRecord) -> Ordering {
    b.category
        .cmp(&a.category)
        .then_with(|| b.relevance.total_cmp(&a.relevance))
        .then_with(|| b.has_profile_url().cmp(&a.has_profile_url()))
        .then_with(|| b.source_quality.total_cmp(&a.source_quality))
        .then_with(|| a.key.cmp(&b.key))
}
