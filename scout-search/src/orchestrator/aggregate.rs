//! Cross-provider deduplication and merge.
//!
//! Candidates are grouped by canonical profile URL when they have one, and by
//! normalised `(name, company)` otherwise. A URL-less candidate joins a URL
//! group when exactly one such group contains the same `(name, company)`, so
//! a name-only hit from one provider and a profile hit from another become
//! one person.
//!
//! Every field merge is a commutative, associative choice (set union, max,
//! or a fixed total order over values), and grouping looks at the whole batch
//! at once, so the output does not depend on provider completion order.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::text::normalize;
use crate::types::{
    clamp_unit, CandidateRecord, Category, ContactInfo, DedupKey, PersonRecord, SourceId,
};

use super::url_normalize::canonical_profile_url;

/// Confidence added when two or more distinct sources agree on a person.
pub const CORROBORATION_BOOST: f64 = 0.2;

/// Quality weight assumed for a source with no registered descriptor.
pub const DEFAULT_SOURCE_WEIGHT: f64 = 0.5;

/// Source id → quality weight.
pub type SourceWeights = HashMap<SourceId, f64>;

/// Merge state for one group of candidates.
#[derive(Debug, Clone)]
struct Draft {
    name: String,
    title: Option<String>,
    company: String,
    email: Option<String>,
    phone: Option<String>,
    location: Option<String>,
    department: Option<String>,
    skills: BTreeMap<String, String>,
    sources: BTreeSet<SourceId>,
    snippets: BTreeSet<String>,
    source_quality: f64,
    base_confidence: f64,
}

impl Draft {
    fn from_candidate(c: CandidateRecord, weights: &SourceWeights) -> Self {
        let weight = weights
            .get(&c.source)
            .copied()
            .unwrap_or(DEFAULT_SOURCE_WEIGHT);
        let mut skills = BTreeMap::new();
        for skill in c.skills {
            insert_skill(&mut skills, skill);
        }
        let snippet = c.snippet.trim().to_owned();
        Self {
            name: c.name.trim().to_owned(),
            title: non_blank(c.title),
            company: c.company.trim().to_owned(),
            email: non_blank(c.contact.email),
            phone: non_blank(c.contact.phone),
            location: non_blank(c.location),
            department: non_blank(c.department),
            skills,
            sources: BTreeSet::from([c.source]),
            snippets: if snippet.is_empty() {
                BTreeSet::new()
            } else {
                BTreeSet::from([snippet])
            },
            source_quality: clamp_unit(weight),
            base_confidence: clamp_unit(c.confidence),
        }
    }

    fn absorb(&mut self, other: Draft) {
        self.name = pick_text(std::mem::take(&mut self.name), other.name);
        self.company = pick_text(std::mem::take(&mut self.company), other.company);
        self.title = pick_field(self.title.take(), other.title);
        self.email = pick_field(self.email.take(), other.email);
        self.phone = pick_field(self.phone.take(), other.phone);
        self.location = pick_field(self.location.take(), other.location);
        self.department = pick_field(self.department.take(), other.department);
        for (_, skill) in other.skills {
            insert_skill(&mut self.skills, skill);
        }
        self.sources.extend(other.sources);
        self.snippets.extend(other.snippets);
        self.source_quality = self.source_quality.max(other.source_quality);
        self.base_confidence = self.base_confidence.max(other.base_confidence);
    }

    fn finish(self, key: DedupKey) -> PersonRecord {
        let boost = if self.sources.len() >= 2 {
            CORROBORATION_BOOST
        } else {
            0.0
        };
        let profile_url = match &key {
            DedupKey::Profile(url) => Some(url.clone()),
            DedupKey::NameCompany(..) => None,
        };
        PersonRecord {
            key,
            name: self.name,
            title: self.title,
            company: self.company,
            profile_url,
            contact: ContactInfo {
                email: self.email,
                phone: self.phone,
            },
            location: self.location,
            department: self.department,
            skills: self.skills.into_values().collect(),
            sources: self.sources,
            snippets: self.snippets.into_iter().collect(),
            source_quality: self.source_quality,
            confidence: clamp_unit(self.base_confidence + boost),
            domain_corroborated: false,
            category: Category::Unknown,
            relevance: 0.0,
            match_reasons: Vec::new(),
        }
    }
}

/// Skills are keyed case-insensitively; the spelling kept is the
/// lexicographically smallest one seen.
fn insert_skill(skills: &mut BTreeMap<String, String>, skill: String) {
    let skill = skill.trim().to_owned();
    if skill.is_empty() {
        return;
    }
    let key = skill.to_lowercase();
    match skills.get_mut(&key) {
        Some(existing) if skill < *existing => *existing = skill,
        Some(_) => {}
        None => {
            skills.insert(key, skill);
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Total order over text values: longer wins, then lexicographically smaller.
fn pick_text(a: String, b: String) -> String {
    use std::cmp::Ordering;
    match a.chars().count().cmp(&b.chars().count()) {
        Ordering::Greater => a,
        Ordering::Less => b,
        Ordering::Equal => a.min(b),
    }
}

/// Prefer a present value; between two present values use [`pick_text`].
fn pick_field(a: Option<String>, b: Option<String>) -> Option<String> {
    match (a, b) {
        (Some(a), Some(b)) => Some(pick_text(a, b)),
        (a, b) => a.or(b),
    }
}

/// Normalised `(name, company)` key of a candidate.
pub fn name_key(name: &str, company: &str) -> (String, String) {
    (normalize(name), normalize(company))
}

/// Deduplicate and merge candidates from every provider.
///
/// Output is sorted by dedup key and has no two records sharing a key.
pub fn aggregate(candidates: Vec<CandidateRecord>, weights: &SourceWeights) -> Vec<PersonRecord> {
    let mut by_url: BTreeMap<String, Vec<CandidateRecord>> = BTreeMap::new();
    let mut url_less: Vec<CandidateRecord> = Vec::new();

    for candidate in candidates {
        if candidate.name.trim().is_empty() {
            continue;
        }
        match candidate
            .profile_url
            .as_deref()
            .and_then(canonical_profile_url)
        {
            Some(url) => by_url.entry(url).or_default().push(candidate),
            None => url_less.push(candidate),
        }
    }

    // (name, company) → URL groups containing it.
    let mut url_groups_by_name: HashMap<(String, String), BTreeSet<String>> = HashMap::new();
    for (url, members) in &by_url {
        for m in members {
            url_groups_by_name
                .entry(name_key(&m.name, &m.company))
                .or_default()
                .insert(url.clone());
        }
    }

    let mut by_name: BTreeMap<(String, String), Vec<CandidateRecord>> = BTreeMap::new();
    let mut attached: Vec<(String, CandidateRecord)> = Vec::new();
    for candidate in url_less {
        let key = name_key(&candidate.name, &candidate.company);
        match url_groups_by_name.get(&key) {
            Some(urls) if urls.len() == 1 => {
                if let Some(url) = urls.iter().next() {
                    attached.push((url.clone(), candidate));
                }
            }
            _ => by_name.entry(key).or_default().push(candidate),
        }
    }
    for (url, candidate) in attached {
        by_url.entry(url).or_default().push(candidate);
    }

    let groups = by_url
        .into_iter()
        .map(|(url, members)| (DedupKey::Profile(url), members))
        .chain(
            by_name
                .into_iter()
                .map(|((name, company), members)| (DedupKey::NameCompany(name, company), members)),
        );

    let mut people: Vec<PersonRecord> = groups
        .filter_map(|(key, members)| {
            members
                .into_iter()
                .map(|c| Draft::from_candidate(c, weights))
                .reduce(|mut acc, d| {
                    acc.absorb(d);
                    acc
                })
                .map(|draft| draft.finish(key))
        })
        .collect();
    people.sort_by(|a, b| a.key.cmp(&b.key));

    tracing::debug!(people = people.len(), "aggregated candidates");
    people
}
