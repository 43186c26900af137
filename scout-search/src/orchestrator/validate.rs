//! Employment validation: a rule chain that removes false positives.
//!
//! Each rule returns reject, accept-with-confidence-delta, or no opinion.
//! Rules run in a fixed order and the first rejection short-circuits. The
//! validator is a pure function of the person, the search context, and the
//! company and keyword tables; it performs no I/O.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::tables::{CompanyTable, KeywordTable};
use crate::text::{contains_any_keyword, contains_phrase, normalize, phrase_positions, tokens};
use crate::types::{clamp_unit, PersonRecord, SearchContext};

/// Confidence added when the company domain appears in a person's data.
pub const DOMAIN_BOOST: f64 = 0.3;

/// How far (in bytes) after a past-employment marker a company mention
/// still counts as "near".
const PAST_MARKER_WINDOW: usize = 50;

/// Phrases that mark a past role.
const PAST_MARKERS: &[&str] = &[
    "former",
    "formerly",
    "ex-",
    "ex ",
    "previously at",
    "previously",
    "alumni of",
    "alumnus of",
    "alumna of",
    "retired from",
    "worked at",
    "was at",
    "used to work",
];

/// Markers directly followed by the employer they refer to.
const EMPLOYER_MARKERS: &[&str] = &[
    "ex-",
    "ex ",
    "previously at",
    "alumni of",
    "alumnus of",
    "alumna of",
    "retired from",
    "worked at",
    "was at",
];

/// Characters that end the clause a past-employment marker applies to.
const CLAUSE_SEPARATORS: [char; 4] = [',', '|', ';', '·'];

/// Title phrases that mark a job seeker or a generic profile.
const SPAM_INDICATORS: &[&str] = &[
    "freelancer",
    "freelance",
    "consultant",
    "available for hire",
    "seeking opportunities",
    "seeking new opportunities",
    "open to work",
    "looking for",
    "independent contractor",
    "self-employed",
    "job seeker",
];

/// Spam indicators needed to reject.
const SPAM_THRESHOLD: usize = 2;

/// Words after `at` that do not name an employer.
const NON_EMPLOYER_WORDS: &[&str] = &[
    "scale", "the", "a", "an", "large", "home", "work", "night", "speed", "heart", "all", "any",
    "least", "intersection", "startups",
];

/// Which rule rejected a person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionRule {
    /// Text near the company mention says the role is in the past.
    PastEmployment,
    /// The full name is a single token equal to the company name.
    NameEqualsCompany,
    /// The person works at an unrelated organisation sharing the company's name.
    NeighbourCompany,
    /// Neither a profile URL nor a descriptive title.
    MissingSignal,
    /// The title names a different current employer.
    EmployerMismatch,
    /// The title carries several job-seeking or generic-profile indicators.
    Spam,
}

impl RejectionRule {
    /// Returns the machine-readable rule name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PastEmployment => "past_employment",
            Self::NameEqualsCompany => "name_equals_company",
            Self::NeighbourCompany => "neighbour_company",
            Self::MissingSignal => "missing_signal",
            Self::EmployerMismatch => "employer_mismatch",
            Self::Spam => "spam",
        }
    }
}

/// A recorded rejection.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    /// Rule that fired.
    pub rule: RejectionRule,
    /// Human-readable detail.
    pub reason: String,
}

/// Result of one rule.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
    /// Drop the person.
    Reject(Rejection),
    /// Keep evaluating; add the delta to confidence.
    Accept(f64),
    /// Keep evaluating.
    NoOpinion,
}

/// Result of the whole chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Every rule passed.
    Accepted {
        /// Sum of accept deltas.
        confidence_delta: f64,
        /// Whether the domain corroboration rule fired.
        domain_corroborated: bool,
    },
    /// A rule rejected the person.
    Rejected(Rejection),
}

/// The rules in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    PastEmployment,
    DomainCorroboration,
    NameEqualsCompany,
    AmbiguityGuard,
    MissingSignal,
    EmployerMismatch,
    Spam,
}

const CHAIN: [Rule; 7] = [
    Rule::PastEmployment,
    Rule::DomainCorroboration,
    Rule::NameEqualsCompany,
    Rule::AmbiguityGuard,
    Rule::MissingSignal,
    Rule::EmployerMismatch,
    Rule::Spam,
];

/// Facts about one person gathered once before the chain runs.
struct Evidence {
    title: String,
    /// Title, company-as-found, and snippets, lowercased.
    texts: Vec<String>,
    corroborated: bool,
}

/// Employment validator for one search.
#[derive(Debug, Clone)]
pub struct Validator {
    company_names: Vec<String>,
    domain: Option<String>,
    neighbours: Vec<String>,
    /// Recruiter and manager keywords; a short title matching one still
    /// counts as descriptive.
    role_keywords: Vec<String>,
}

impl Validator {
    /// Prepare a validator for the context's company.
    pub fn new(ctx: &SearchContext, companies: &CompanyTable) -> Self {
        let company_names = companies.names_for(&ctx.company, &ctx.company_aliases);
        let neighbours = companies
            .neighbours_for(&ctx.company)
            .iter()
            .map(|n| normalize(n))
            // A neighbour that is just the company's own name would reject everyone.
            .filter(|n| !company_names.contains(n))
            .collect();
        Self {
            company_names,
            domain: companies.resolve_domain(ctx),
            neighbours,
            role_keywords: role_keywords(&KeywordTable::default()),
        }
    }

    /// Use `keywords` to recognise short role titles such as "CTO".
    #[must_use]
    pub fn with_keywords(mut self, keywords: &KeywordTable) -> Self {
        self.role_keywords = role_keywords(keywords);
        self
    }

    /// Run the rule chain on one person.
    pub fn validate(&self, person: &PersonRecord) -> Verdict {
        let mut evidence = Evidence {
            title: person.title.as_deref().map(normalize).unwrap_or_default(),
            texts: Vec::new(),
            corroborated: false,
        };
        if !evidence.title.is_empty() {
            evidence.texts.push(evidence.title.clone());
        }
        evidence.texts.push(normalize(&person.company));
        evidence
            .texts
            .extend(person.snippets.iter().map(|s| normalize(s)));

        let mut delta = 0.0;
        for rule in CHAIN {
            match self.check(rule, person, &evidence) {
                RuleOutcome::Reject(rejection) => return Verdict::Rejected(rejection),
                RuleOutcome::Accept(d) => {
                    delta += d;
                    if rule == Rule::DomainCorroboration {
                        evidence.corroborated = true;
                    }
                }
                RuleOutcome::NoOpinion => {}
            }
        }
        Verdict::Accepted {
            confidence_delta: delta,
            domain_corroborated: evidence.corroborated,
        }
    }

    /// Validate every person, applying confidence deltas to survivors.
    ///
    /// Returns the survivors in input order and rejection counts per rule.
    pub fn apply(
        &self,
        people: Vec<PersonRecord>,
    ) -> (Vec<PersonRecord>, BTreeMap<RejectionRule, usize>) {
        let mut kept = Vec::with_capacity(people.len());
        let mut rejections = BTreeMap::new();
        for mut person in people {
            match self.validate(&person) {
                Verdict::Accepted {
                    confidence_delta,
                    domain_corroborated,
                } => {
                    person.confidence = clamp_unit(person.confidence + confidence_delta);
                    person.domain_corroborated = domain_corroborated;
                    kept.push(person);
                }
                Verdict::Rejected(rejection) => {
                    tracing::trace!(
                        name = %person.name,
                        rule = rejection.rule.name(),
                        reason = %rejection.reason,
                        "candidate rejected"
                    );
                    *rejections.entry(rejection.rule).or_insert(0) += 1;
                }
            }
        }
        (kept, rejections)
    }

    fn check(&self, rule: Rule, person: &PersonRecord, ev: &Evidence) -> RuleOutcome {
        match rule {
            Rule::PastEmployment => self.past_employment(ev),
            Rule::DomainCorroboration => self.domain_corroboration(person, ev),
            Rule::NameEqualsCompany => self.name_equals_company(person),
            Rule::AmbiguityGuard => self.ambiguity_guard(ev),
            Rule::MissingSignal => self.missing_signal(person, ev),
            Rule::EmployerMismatch => self.employer_mismatch(ev),
            Rule::Spam => spam(ev),
        }
    }

    fn missing_signal(&self, person: &PersonRecord, ev: &Evidence) -> RuleOutcome {
        if person.name.trim().chars().count() < 2 {
            return reject(RejectionRule::MissingSignal, "name too short".into());
        }
        let descriptive = ev.title.chars().count() > 3
            || contains_any_keyword(&ev.title, &self.role_keywords);
        if !person.has_profile_url() && !descriptive {
            return reject(
                RejectionRule::MissingSignal,
                "no profile URL and no descriptive title".into(),
            );
        }
        RuleOutcome::NoOpinion
    }

    fn past_employment(&self, ev: &Evidence) -> RuleOutcome {
        // A title that opens with a marker is a past role unless the marker
        // belongs to another employer and the target follows as the current one.
        if let Some(marker) = PAST_MARKERS.iter().find(|m| {
            marker_positions(&ev.title, m).first() == Some(&0)
                && self.past_mention(&ev.title, 0, m) != Some(false)
        }) {
            return reject(
                RejectionRule::PastEmployment,
                format!("title starts with \"{}\"", marker.trim()),
            );
        }

        for text in &ev.texts {
            for marker in PAST_MARKERS {
                for at in marker_positions(text, marker) {
                    if self.past_mention(text, at, marker) == Some(true) {
                        return reject(
                            RejectionRule::PastEmployment,
                            format!("\"{}\" near company mention", marker.trim()),
                        );
                    }
                }
            }
        }
        RuleOutcome::NoOpinion
    }

    /// Looks for the target company in the clause a marker at `at` opens.
    ///
    /// `Some(true)`: a mention the marker refers to. `Some(false)`: the
    /// company is mentioned but another employer sits between it and the
    /// marker. `None`: no mention within the clause.
    fn past_mention(&self, text: &str, at: usize, marker: &str) -> Option<bool> {
        let from = at + marker.len();
        let clause = &text[from..clause_end(text, from)];
        let mut mentioned = false;
        for name in &self.company_names {
            for pos in phrase_positions(clause, name) {
                if marker.len() + pos > PAST_MARKER_WINDOW {
                    continue;
                }
                if !names_other_employer(marker, &clause[..pos]) {
                    return Some(true);
                }
                mentioned = true;
            }
        }
        mentioned.then_some(false)
    }

    fn domain_corroboration(&self, person: &PersonRecord, ev: &Evidence) -> RuleOutcome {
        let Some(domain) = &self.domain else {
            return RuleOutcome::NoOpinion;
        };
        let in_text = ev.texts.iter().any(|t| contains_phrase(t, domain));
        let in_url = person
            .profile_url
            .as_deref()
            .is_some_and(|u| contains_phrase(&u.to_lowercase(), domain));
        let in_email = person.contact.email.as_deref().is_some_and(|e| {
            e.rsplit_once('@').is_some_and(|(_, host)| {
                let host = host.to_lowercase();
                host == *domain || host.ends_with(&format!(".{domain}"))
            })
        });
        if in_text || in_url || in_email {
            RuleOutcome::Accept(DOMAIN_BOOST)
        } else {
            RuleOutcome::NoOpinion
        }
    }

    fn name_equals_company(&self, person: &PersonRecord) -> RuleOutcome {
        let name = normalize(&person.name);
        if name.split_whitespace().count() == 1 && self.company_names.contains(&name) {
            return reject(
                RejectionRule::NameEqualsCompany,
                format!("name \"{name}\" is the company name"),
            );
        }
        RuleOutcome::NoOpinion
    }

    fn ambiguity_guard(&self, ev: &Evidence) -> RuleOutcome {
        if ev.corroborated {
            return RuleOutcome::NoOpinion;
        }
        for neighbour in &self.neighbours {
            if ev.texts.iter().any(|t| contains_phrase(t, neighbour)) {
                return reject(
                    RejectionRule::NeighbourCompany,
                    format!("mentions unrelated \"{neighbour}\""),
                );
            }
        }
        RuleOutcome::NoOpinion
    }

    fn employer_mismatch(&self, ev: &Evidence) -> RuleOutcome {
        if ev.title.is_empty() || self.mentions_company(&ev.title) {
            return RuleOutcome::NoOpinion;
        }
        let mut starts: Vec<usize> = phrase_positions(&ev.title, "at")
            .into_iter()
            .map(|p| p + 2)
            .collect();
        starts.extend(ev.title.match_indices('@').map(|(p, _)| p + 1));

        for start in starts {
            let employer = employer_after(&ev.title[start..]);
            if employer.chars().count() > 3 {
                return reject(
                    RejectionRule::EmployerMismatch,
                    format!("title names another employer \"{employer}\""),
                );
            }
        }
        RuleOutcome::NoOpinion
    }

    fn mentions_company(&self, text: &str) -> bool {
        self.company_names.iter().any(|name| contains_phrase(text, name))
    }
}

/// End of the clause starting at `from`: the next separator or `now`.
fn clause_end(text: &str, from: usize) -> usize {
    let rest = &text[from..];
    let separator = rest.find(CLAUSE_SEPARATORS);
    let now = phrase_positions(rest, "now").first().copied();
    from + separator.into_iter().chain(now).min().unwrap_or(rest.len())
}

/// Whether the words between a marker and a company mention name a
/// different organisation.
fn names_other_employer(marker: &str, between: &str) -> bool {
    if EMPLOYER_MARKERS.contains(&marker) {
        return !between.trim().is_empty();
    }
    let mut starts: Vec<usize> = phrase_positions(between, "at")
        .into_iter()
        .map(|p| p + 2)
        .collect();
    starts.extend(between.match_indices('@').map(|(p, _)| p + 1));
    starts.into_iter().any(|s| !between[s..].trim().is_empty())
}

fn reject(rule: RejectionRule, reason: String) -> RuleOutcome {
    RuleOutcome::Reject(Rejection { rule, reason })
}

/// Positions of a past-employment marker. Markers ending in punctuation or
/// a space only need a word boundary before them.
fn marker_positions(text: &str, marker: &str) -> Vec<usize> {
    let open_ended = marker.ends_with(['-', ' ']);
    if !open_ended {
        return phrase_positions(text, marker);
    }
    text.match_indices(marker)
        .map(|(p, _)| p)
        .filter(|&p| {
            text[..p]
                .chars()
                .next_back()
                .is_none_or(|c| !c.is_alphanumeric())
        })
        .collect()
}

/// The employer phrase after an `at`/`@` marker: words up to the next
/// separator, at most four, ignoring phrases that do not name an employer.
fn employer_after(rest: &str) -> String {
    let phrase = rest
        .split(['|', ',', '(', '·', ';', '/', '-', '–'])
        .next()
        .unwrap_or_default();
    let words: Vec<String> = tokens(phrase).into_iter().take(4).collect();
    match words.first() {
        Some(first) if !NON_EMPLOYER_WORDS.contains(&first.as_str()) => words.join(" "),
        _ => String::new(),
    }
}

fn role_keywords(keywords: &KeywordTable) -> Vec<String> {
    keywords
        .recruiter
        .iter()
        .chain(&keywords.manager)
        .map(|k| normalize(k))
        .filter(|k| !k.is_empty())
        .collect()
}

fn spam(ev: &Evidence) -> RuleOutcome {
    let hits: Vec<&str> = SPAM_INDICATORS
        .iter()
        .copied()
        .filter(|indicator| contains_any_keyword(&ev.title, &[*indicator]))
        .collect();
    if hits.len() >= SPAM_THRESHOLD {
        return reject(RejectionRule::Spam, format!("indicators: {}", hits.join(", ")));
    }
    RuleOutcome::NoOpinion
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, DedupKey, SourceId};
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn person(name: &str, title: Option<&str>, company: &str) -> PersonRecord {
        PersonRecord {
            key: DedupKey::NameCompany(name.to_lowercase(), company.to_lowercase()),
            name: name.into(),
            title: title.map(Into::into),
            company: company.into(),
            profile_url: Some(format!(
                "https://linkedin.com/in/{}",
                name.to_lowercase().replace(' ', "-")
            )),
            contact: Default::default(),
            location: None,
            department: None,
            skills: vec![],
            sources: BTreeSet::from([SourceId::new("duckduckgo")]),
            snippets: vec![],
            source_quality: 0.7,
            confidence: 0.5,
            domain_corroborated: false,
            category: Category::Unknown,
            relevance: 0.0,
            match_reasons: vec![],
        }
    }

    fn root_validator() -> Validator {
        let ctx = SearchContext::new("Root", "AI Engineer").with_domain("root.io");
        Validator::new(&ctx, &CompanyTable::builtin())
    }

    fn stripe_validator() -> Validator {
        Validator::new(
            &SearchContext::new("Stripe", "Software Engineer"),
            &CompanyTable::builtin(),
        )
    }

    fn rejected_by(verdict: Verdict) -> Option<RejectionRule> {
        match verdict {
            Verdict::Rejected(r) => Some(r.rule),
            Verdict::Accepted { .. } => None,
        }
    }

    proptest! {
        #[test]
        fn validated_confidence_stays_in_unit_range(
            confidence in prop::num::f64::ANY,
            snippet in prop::sample::select(vec![
                "",
                "AI Engineer at Root, root.io",
                "Contact jane@root.io",
                "Former engineer at Root",
            ]),
        ) {
            let mut p = person("Jane Doe", Some("AI Engineer"), "Root");
            p.confidence = confidence;
            p.snippets = vec![snippet.to_owned()];
            let (kept, _) = root_validator().apply(vec![p]);
            for person in kept {
                prop_assert!((0.0..=1.0).contains(&person.confidence));
            }
        }
    }

    #[test]
    fn neighbour_company_without_domain_is_rejected() {
        let p = person("Jane Doe", Some("AI Engineer at Root Insurance"), "Root");
        assert_eq!(
            rejected_by(root_validator().validate(&p)),
            Some(RejectionRule::NeighbourCompany)
        );
    }

    #[test]
    fn domain_in_context_boosts_confidence() {
        let mut p = person("Jane Doe", Some("AI Engineer"), "Root");
        p.snippets = vec!["root.io | AI Engineer building evaluation tooling".into()];
        match root_validator().validate(&p) {
            Verdict::Accepted {
                confidence_delta,
                domain_corroborated,
            } => {
                assert!(confidence_delta >= DOMAIN_BOOST - f64::EPSILON);
                assert!(domain_corroborated);
            }
            Verdict::Rejected(r) => panic!("unexpected rejection: {r:?}"),
        }
    }

    #[test]
    fn domain_overrides_neighbour_mention() {
        let mut p = person("Jane Doe", Some("AI Engineer at Root"), "Root");
        p.snippets = vec!["Left Root Insurance in 2021, now at root.io".into()];
        assert!(rejected_by(root_validator().validate(&p)).is_none());
    }

    #[test]
    fn domain_in_email_corroborates() {
        let mut p = person("Jane Doe", Some("AI Engineer"), "Root");
        p.contact.email = Some("jane@eng.root.io".into());
        assert!(matches!(
            root_validator().validate(&p),
            Verdict::Accepted {
                domain_corroborated: true,
                ..
            }
        ));
    }

    #[test]
    fn lookalike_domain_does_not_corroborate() {
        let mut p = person("Jane Doe", Some("AI Engineer"), "Root");
        p.snippets = vec!["Team page: myroot.io".into()];
        assert!(matches!(
            root_validator().validate(&p),
            Verdict::Accepted {
                domain_corroborated: false,
                ..
            }
        ));
    }

    #[test]
    fn multi_token_name_containing_company_is_accepted() {
        let p = person("Root Thompson", Some("AI Engineer"), "Root");
        assert!(rejected_by(root_validator().validate(&p)).is_none());
    }

    #[test]
    fn single_token_name_equal_to_company_is_rejected() {
        let p = person("Root", Some("AI Engineer"), "Root");
        assert_eq!(
            rejected_by(root_validator().validate(&p)),
            Some(RejectionRule::NameEqualsCompany)
        );
    }

    #[test]
    fn past_employment_markers() {
        let v = stripe_validator();
        for title in [
            "Former Software Engineer at Stripe",
            "Ex-Stripe engineer",
            "Previously at Stripe, now building",
            "Retired",
        ] {
            let p = person("Jane Doe", Some(title), "Stripe");
            let rule = rejected_by(v.validate(&p));
            // "Retired" alone is not a marker.
            if title == "Retired" {
                assert!(rule.is_none(), "{title}");
            } else {
                assert_eq!(rule, Some(RejectionRule::PastEmployment), "{title}");
            }
        }
    }

    #[test]
    fn past_marker_after_company_is_not_past_employment() {
        let p = person(
            "Jane Doe",
            Some("Software Engineer at Stripe, formerly Google"),
            "Stripe",
        );
        assert!(rejected_by(stripe_validator().validate(&p)).is_none());
    }

    #[test]
    fn past_marker_in_snippet_near_alias() {
        let v = Validator::new(&SearchContext::new("Meta", "ML Engineer"), &CompanyTable::builtin());
        let mut p = person("Jane Doe", Some("ML Engineer"), "Meta");
        p.snippets = vec!["Worked at Facebook on ranking".into()];
        assert_eq!(rejected_by(v.validate(&p)), Some(RejectionRule::PastEmployment));
    }

    #[test]
    fn marker_for_another_employer_keeps_current_role() {
        let v = stripe_validator();
        let mut p = person("Jane Doe", Some("Staff Engineer at Stripe"), "Stripe");
        p.snippets = vec!["Previously at Google, now building payments at Stripe".into()];
        assert!(rejected_by(v.validate(&p)).is_none());

        p.snippets = vec!["Previously at Google then joined Stripe".into()];
        assert!(rejected_by(v.validate(&p)).is_none());

        p.snippets = vec!["Formerly engineer at Google | Stripe since 2022".into()];
        assert!(rejected_by(v.validate(&p)).is_none());

        let ex = person("Jane Doe", Some("Ex-Google engineer at Stripe"), "Stripe");
        assert!(rejected_by(v.validate(&ex)).is_none());
    }

    #[test]
    fn marker_for_the_target_still_rejects() {
        let v = stripe_validator();
        let mut p = person("Jane Doe", Some("Staff Engineer"), "Stripe");
        p.snippets = vec!["Worked at Stripe for four years, now at Google".into()];
        assert_eq!(rejected_by(v.validate(&p)), Some(RejectionRule::PastEmployment));

        p.snippets = vec!["Formerly a payments engineer at Stripe".into()];
        assert_eq!(rejected_by(v.validate(&p)), Some(RejectionRule::PastEmployment));
    }

    #[test]
    fn extra_word_is_not_a_marker() {
        // "ex" must be followed by a hyphen or space; "expert" is not a marker.
        let p = person("Jane Doe", Some("Payments expert, Stripe"), "Stripe");
        assert!(rejected_by(stripe_validator().validate(&p)).is_none());
    }

    #[test]
    fn missing_signal_requires_url_or_title() {
        let mut p = person("Jane Doe", Some("SE"), "Stripe");
        p.profile_url = None;
        assert_eq!(
            rejected_by(stripe_validator().validate(&p)),
            Some(RejectionRule::MissingSignal)
        );

        p.profile_url = Some("https://linkedin.com/in/jane".into());
        assert!(rejected_by(stripe_validator().validate(&p)).is_none());
    }

    #[test]
    fn short_role_titles_are_descriptive() {
        for title in ["CTO", "VP", "HR"] {
            let mut p = person("Jane Doe", Some(title), "Stripe");
            p.profile_url = None;
            assert!(rejected_by(stripe_validator().validate(&p)).is_none(), "{title}");
        }

        let mut keywords = KeywordTable::default();
        keywords.manager.push("sre".into());
        let mut p = person("Jane Doe", Some("SRE"), "Stripe");
        p.profile_url = None;
        assert_eq!(
            rejected_by(stripe_validator().validate(&p)),
            Some(RejectionRule::MissingSignal)
        );
        assert!(rejected_by(stripe_validator().with_keywords(&keywords).validate(&p)).is_none());
    }

    #[test]
    fn other_current_employer_is_rejected() {
        let p = person("Jane Doe", Some("Software Engineer at Microsoft"), "Stripe");
        assert_eq!(
            rejected_by(stripe_validator().validate(&p)),
            Some(RejectionRule::EmployerMismatch)
        );

        let p = person("Jane Doe", Some("Software Engineer @ Stripe"), "Stripe");
        assert!(rejected_by(stripe_validator().validate(&p)).is_none());
    }

    #[test]
    fn at_scale_is_not_an_employer() {
        let p = person("Jane Doe", Some("Building payments at scale"), "Stripe");
        assert!(rejected_by(stripe_validator().validate(&p)).is_none());
    }

    #[test]
    fn data_does_not_match_at() {
        let p = person("Jane Doe", Some("Data Scientist"), "Stripe");
        assert!(rejected_by(stripe_validator().validate(&p)).is_none());
    }

    #[test]
    fn spam_needs_two_indicators() {
        let v = stripe_validator();
        let one = person("Jane Doe", Some("Consultant"), "Stripe");
        assert!(rejected_by(v.validate(&one)).is_none());

        let two = person("Jane Doe", Some("Freelancer | Open to work"), "Stripe");
        assert_eq!(rejected_by(v.validate(&two)), Some(RejectionRule::Spam));
    }

    #[test]
    fn first_rejection_wins() {
        // Past employment fires before the name guard.
        let p = person("Stripe", Some("Former engineer at Stripe"), "Stripe");
        assert_eq!(
            rejected_by(stripe_validator().validate(&p)),
            Some(RejectionRule::PastEmployment)
        );
    }

    #[test]
    fn missing_domain_degrades_to_no_boost() {
        let v = Validator::new(
            &SearchContext::new("Unknown Startup", "Engineer"),
            &CompanyTable::builtin(),
        );
        let p = person("Jane Doe", Some("Engineer"), "Unknown Startup");
        assert_eq!(
            v.validate(&p),
            Verdict::Accepted {
                confidence_delta: 0.0,
                domain_corroborated: false
            }
        );
    }

    #[test]
    fn apply_counts_rejections_and_boosts_survivors() {
        let mut corroborated = person("Ana Ruiz", Some("AI Engineer"), "Root");
        corroborated.snippets = vec!["root.io".into()];
        let people = vec![
            person("Jane Doe", Some("AI Engineer at Root Insurance"), "Root"),
            person("Sam Lee", Some("Ex-Root engineer"), "Root"),
            person("Kim Park", Some("Former recruiter"), "Root"),
            corroborated,
        ];
        let (kept, rejections) = root_validator().apply(people);

        assert_eq!(kept.len(), 1);
        assert!((kept[0].confidence - 0.8).abs() < 1e-9);
        assert!(kept[0].domain_corroborated);
        assert_eq!(rejections.get(&RejectionRule::NeighbourCompany), Some(&1));
        assert_eq!(rejections.get(&RejectionRule::PastEmployment), Some(&2));
    }
}
