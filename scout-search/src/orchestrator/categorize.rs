//! Role categorisation over normalised titles.
//!
//! Ordered classification, earliest match wins:
//! recruiter → manager → senior (only for non-senior targets) → peer → unknown.

use strsim::jaro_winkler;

use crate::tables::KeywordTable;
use crate::text::{contains_any_keyword, contains_phrase, normalize, phrase_positions};
use crate::types::{Category, PersonRecord};

/// Classifies titles relative to one target title.
#[derive(Debug, Clone)]
pub struct Categorizer<'a> {
    keywords: &'a KeywordTable,
    target_core: String,
    target_is_senior: bool,
}

impl<'a> Categorizer<'a> {
    /// Prepare a categorizer for the requester's target title.
    pub fn new(target_title: &str, keywords: &'a KeywordTable) -> Self {
        let target = normalize(target_title);
        Self {
            keywords,
            target_is_senior: contains_any_keyword(&target, &keywords.senior),
            target_core: core_title(&target, keywords),
        }
    }

    /// Category of one title.
    pub fn categorize(&self, title: Option<&str>) -> Category {
        let Some(title) = title.map(normalize).filter(|t| !t.is_empty()) else {
            return Category::Unknown;
        };
        let kw = self.keywords;

        if contains_any_keyword(&title, &kw.recruiter) {
            Category::Recruiter
        } else if contains_any_keyword(&title, &kw.manager) {
            Category::Manager
        } else if !self.target_is_senior && contains_any_keyword(&title, &kw.senior) {
            Category::Senior
        } else if self.is_peer(&title) {
            Category::Peer
        } else {
            Category::Unknown
        }
    }

    /// Set the category of every person.
    pub fn apply(&self, people: &mut [PersonRecord]) {
        for person in people {
            person.category = self.categorize(person.title.as_deref());
        }
    }

    fn is_peer(&self, title: &str) -> bool {
        let core = core_title(title, self.keywords);
        let target = &self.target_core;
        if core.is_empty() || target.is_empty() {
            return false;
        }
        core == *target
            || contains_phrase(&core, target)
            || contains_phrase(target, &core)
            || jaro_winkler(&core, target) >= self.keywords.peer_threshold
    }
}

/// Title with seniority qualifiers removed and synonyms mapped to their
/// canonical form.
fn core_title(title: &str, keywords: &KeywordTable) -> String {
    let mut core = title.to_owned();
    for qualifier in &keywords.seniority_qualifiers {
        core = replace_phrase(&core, qualifier, " ");
    }
    let mut core = normalize(core.trim_matches(|c: char| !c.is_alphanumeric()));

    for group in &keywords.title_synonyms {
        let Some(canonical) = group.first() else {
            continue;
        };
        let mut aliases: Vec<&String> = group.iter().collect();
        aliases.sort_by_key(|a| std::cmp::Reverse(a.len()));
        if let Some(alias) = aliases.into_iter().find(|a| contains_phrase(&core, a)) {
            core = replace_phrase(&core, alias, canonical);
        }
    }
    normalize(&core)
}

/// Replace every non-overlapping whole-phrase occurrence of `needle`.
fn replace_phrase(text: &str, needle: &str, with: &str) -> String {
    let needle = needle.trim();
    let positions = phrase_positions(text, needle);
    if positions.is_empty() {
        return text.to_owned();
    }
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for at in positions {
        if at < last {
            continue;
        }
        out.push_str(&text[last..at]);
        out.push_str(with);
        last = at + needle.len();
    }
    out.push_str(&text[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categorize(target: &str, title: &str) -> Category {
        let keywords = KeywordTable::default();
        Categorizer::new(target, &keywords).categorize(Some(title))
    }

    #[test]
    fn recruiter_wins_over_manager() {
        assert_eq!(
            categorize("AI Engineer", "Talent Acquisition Manager"),
            Category::Recruiter
        );
        assert_eq!(categorize("AI Engineer", "Technical Recruiter"), Category::Recruiter);
    }

    #[test]
    fn manager_keywords() {
        assert_eq!(categorize("AI Engineer", "Director of ML"), Category::Manager);
        assert_eq!(categorize("AI Engineer", "Head of AI"), Category::Manager);
        assert_eq!(categorize("AI Engineer", "VP, Engineering"), Category::Manager);
        assert_eq!(categorize("AI Engineer", "Engineering Managers"), Category::Manager);
    }

    #[test]
    fn keywords_need_word_boundaries() {
        // "hr" inside "three", "vp" inside "mvp".
        assert_eq!(categorize("Data Engineer", "MVP builder"), Category::Unknown);
        assert_eq!(categorize("Data Engineer", "Three-time founder"), Category::Manager);
    }

    #[test]
    fn senior_only_for_junior_targets() {
        assert_eq!(
            categorize("Software Engineer", "Staff Software Engineer"),
            Category::Senior
        );
        assert_eq!(
            categorize("Senior Software Engineer", "Staff Software Engineer"),
            Category::Peer
        );
    }

    #[test]
    fn peer_through_synonyms() {
        assert_eq!(categorize("AI Engineer", "Machine Learning Engineer"), Category::Peer);
        assert_eq!(categorize("ML Engineer", "Applied AI Engineer II"), Category::Peer);
        assert_eq!(categorize("Software Engineer", "Software Developer"), Category::Peer);
    }

    #[test]
    fn peer_through_similarity() {
        assert_eq!(categorize("Data Engineer", "Data Engineering"), Category::Peer);
    }

    #[test]
    fn unrelated_titles_are_unknown() {
        assert_eq!(categorize("AI Engineer", "Account Executive"), Category::Unknown);
        let keywords = KeywordTable::default();
        assert_eq!(
            Categorizer::new("AI Engineer", &keywords).categorize(None),
            Category::Unknown
        );
        assert_eq!(
            Categorizer::new("AI Engineer", &keywords).categorize(Some("  ")),
            Category::Unknown
        );
    }

    #[test]
    fn core_title_strips_qualifiers_and_maps_synonyms() {
        let keywords = KeywordTable::default();
        assert_eq!(core_title("senior ml engineer ii", &keywords), "ai engineer");
        assert_eq!(core_title("jr. software developer", &keywords), "software engineer");
    }

    #[test]
    fn padded_or_overlapping_entries_are_replaced_safely() {
        assert_eq!(replace_phrase("data engineer x", " x ", " "), "data engineer  ");
        assert_eq!(replace_phrase("a a a", "a a", "b"), "b a");

        let mut keywords = KeywordTable::default();
        keywords.seniority_qualifiers.push(" x ".into());
        let c = Categorizer::new("Data Engineer", &keywords);
        assert_eq!(c.categorize(Some("Data Engineer x")), Category::Peer);
    }

    #[test]
    fn extended_keywords_apply_without_code_changes() {
        let mut keywords = KeywordTable::default();
        keywords.recruiter.push("headhunter".into());
        let c = Categorizer::new("AI Engineer", &keywords);
        assert_eq!(c.categorize(Some("Headhunter")), Category::Recruiter);
    }
}
