//! Role keyword sets used by the categorizer.

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::text::normalize;

/// Externalised keyword data for role classification.
///
/// All entries are lowercase phrases matched on word boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordTable {
    /// Titles that mark a recruiter or talent partner.
    pub recruiter: Vec<String>,
    /// Titles that mark management or leadership.
    pub manager: Vec<String>,
    /// Titles that mark an individual contributor above the target level.
    pub senior: Vec<String>,
    /// Qualifiers removed from both titles before the peer comparison.
    pub seniority_qualifiers: Vec<String>,
    /// Groups of interchangeable title phrases. The first entry of each group
    /// is the canonical form.
    pub title_synonyms: Vec<Vec<String>>,
    /// Jaro-Winkler similarity at or above which two stripped titles are peers.
    pub peer_threshold: f64,
}

impl Default for KeywordTable {
    fn default() -> Self {
        fn owned(words: &[&str]) -> Vec<String> {
            words.iter().map(|w| (*w).to_owned()).collect()
        }

        Self {
            recruiter: owned(&[
                "recruiter",
                "recruiting",
                "talent",
                "talent acquisition",
                "sourcer",
                "hr",
                "human resources",
                "people operations",
                "people partner",
                "hiring",
            ]),
            manager: owned(&[
                "manager",
                "director",
                "head of",
                "vp",
                "vice president",
                "chief",
                "ceo",
                "cto",
                "cfo",
                "coo",
                "president",
                "founder",
                "co-founder",
                "lead",
            ]),
            senior: owned(&[
                "senior",
                "sr",
                "staff",
                "principal",
                "architect",
                "distinguished",
                "fellow",
            ]),
            seniority_qualifiers: owned(&[
                "senior",
                "sr",
                "staff",
                "principal",
                "distinguished",
                "junior",
                "jr",
                "associate",
                "entry level",
                "i",
                "ii",
                "iii",
                "iv",
            ]),
            title_synonyms: vec![
                owned(&[
                    "ai engineer",
                    "ml engineer",
                    "machine learning engineer",
                    "artificial intelligence engineer",
                    "applied ai engineer",
                    "applied ml engineer",
                    "applied scientist",
                ]),
                owned(&[
                    "software engineer",
                    "software developer",
                    "swe",
                    "developer",
                    "programmer",
                ]),
                owned(&["data scientist", "ml scientist", "research scientist"]),
                owned(&["data engineer", "analytics engineer"]),
                owned(&["product manager", "pm"]),
                owned(&[
                    "devops engineer",
                    "site reliability engineer",
                    "sre",
                    "platform engineer",
                ]),
                owned(&["frontend engineer", "front end engineer", "front-end engineer"]),
                owned(&["backend engineer", "back end engineer", "back-end engineer"]),
            ],
            peer_threshold: 0.88,
        }
    }
}

impl KeywordTable {
    /// Parse a table from TOML. Missing sections keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Table`] if the TOML is malformed or the peer
    /// threshold is outside `[0, 1]`.
    pub fn from_toml_str(content: &str) -> Result<Self, SearchError> {
        let table: Self = toml::from_str(content)
            .map_err(|e| SearchError::Table(format!("keyword table: {e}")))?;
        table.validate()?;
        Ok(table.normalized())
    }

    /// Lowercase and whitespace-collapse every entry, dropping blanks and
    /// empty synonym groups.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        fn clean(words: &mut Vec<String>) {
            *words = words
                .iter()
                .map(|w| normalize(w))
                .filter(|w| !w.is_empty())
                .collect();
        }

        clean(&mut self.recruiter);
        clean(&mut self.manager);
        clean(&mut self.senior);
        clean(&mut self.seniority_qualifiers);
        for group in &mut self.title_synonyms {
            clean(group);
        }
        self.title_synonyms.retain(|group| !group.is_empty());
        self
    }

    /// Checks that the peer threshold is a valid similarity.
    pub fn validate(&self) -> Result<(), SearchError> {
        if !(0.0..=1.0).contains(&self.peer_threshold) {
            return Err(SearchError::Table(
                "keyword table: peer_threshold must be in [0, 1]".into(),
            ));
        }
        Ok(())
    }

    /// Add every keyword and synonym group from `other` that is not already
    /// present. The threshold is taken from `other`.
    pub fn merge(&mut self, other: KeywordTable) {
        fn extend(into: &mut Vec<String>, from: Vec<String>) {
            for word in from {
                let word = normalize(&word);
                if !word.is_empty() && !into.contains(&word) {
                    into.push(word);
                }
            }
        }

        let other = other.normalized();
        extend(&mut self.recruiter, other.recruiter);
        extend(&mut self.manager, other.manager);
        extend(&mut self.senior, other.senior);
        extend(&mut self.seniority_qualifiers, other.seniority_qualifiers);
        for group in other.title_synonyms {
            if !self.title_synonyms.contains(&group) {
                self.title_synonyms.push(group);
            }
        }
        self.peer_threshold = other.peer_threshold;
    }

    /// Canonical form of a title phrase: the first entry of the synonym group
    /// that contains it, or the phrase itself.
    pub fn canonical_title<'a>(&'a self, title: &'a str) -> &'a str {
        self.title_synonyms
            .iter()
            .find(|group| group.iter().any(|t| t == title))
            .and_then(|group| group.first())
            .map_or(title, String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_core_roles() {
        let table = KeywordTable::default();
        assert!(table.recruiter.contains(&"talent acquisition".to_owned()));
        assert!(table.manager.contains(&"head of".to_owned()));
        assert!(table.senior.contains(&"principal".to_owned()));
        assert!(table.validate().is_ok());
    }

    #[test]
    fn canonical_title_maps_synonyms() {
        let table = KeywordTable::default();
        assert_eq!(table.canonical_title("ml engineer"), "ai engineer");
        assert_eq!(table.canonical_title("swe"), "software engineer");
        assert_eq!(table.canonical_title("chef"), "chef");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let table = KeywordTable::from_toml_str(r#"recruiter = ["headhunter"]"#).expect("parse");
        assert_eq!(table.recruiter, vec!["headhunter".to_owned()]);
        assert!(!table.manager.is_empty());
    }

    #[test]
    fn merge_appends_new_keywords() {
        let mut table = KeywordTable::default();
        let extra = KeywordTable {
            recruiter: vec!["Headhunter".into(), "recruiter".into()],
            title_synonyms: vec![vec!["llm engineer".into(), "genai engineer".into()]],
            peer_threshold: 0.9,
            ..KeywordTable::default()
        };
        table.merge(extra);

        assert_eq!(
            table.recruiter.iter().filter(|k| k.as_str() == "recruiter").count(),
            1
        );
        assert!(table.recruiter.contains(&"headhunter".to_owned()));
        assert_eq!(table.canonical_title("genai engineer"), "llm engineer");
        assert!((table.peer_threshold - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn loaded_entries_are_normalised() {
        let table = KeywordTable::from_toml_str(
            r#"
            seniority_qualifiers = [" x ", "  ", "Lead   Dev"]
            title_synonyms = [[" Data  Engineer", "ETL Engineer "], [" "]]
            "#,
        )
        .expect("parse");
        assert_eq!(table.seniority_qualifiers, ["x", "lead dev"]);
        assert_eq!(table.title_synonyms, [vec!["data engineer", "etl engineer"]]);
    }

    #[test]
    fn out_of_range_threshold_rejected() {
        let err = KeywordTable::from_toml_str("peer_threshold = 1.5").unwrap_err();
        assert!(err.to_string().contains("peer_threshold"));
    }
}
