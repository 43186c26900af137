//! Query planning: turns a [`SearchContext`] into an ordered list of query
//! variants.
//!
//! Planning is a pure function with no I/O. Variants are emitted strongest
//! disambiguator first, so a provider that only has quota for one query
//! uses the best one.

use serde::{Deserialize, Serialize};

use crate::tables::CompanyTable;
use crate::types::SearchContext;

/// Upper bound on the number of variants produced for one context.
pub const MAX_VARIANTS: usize = 5;

/// Skills folded into the title-and-skills variant.
const MAX_QUERY_SKILLS: usize = 3;

/// What a query variant is built around, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    /// Company domain qualifier.
    Domain,
    /// Title plus required skills.
    TitleSkills,
    /// Title plus one of the requester's schools.
    Alumni,
    /// Title plus department.
    Department,
    /// Bare company and title.
    Fallback,
}

/// One planned query.
///
/// `text` is a ready-to-send web search string. The structured fields let
/// API-backed providers build their own request instead of parsing `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryVariant {
    /// What the variant is built around.
    pub kind: QueryKind,
    /// Search string.
    pub text: String,
    /// Company name as the requester wrote it.
    pub company: String,
    /// Target job title.
    pub title: String,
    /// Resolved company domain, if any.
    pub domain: Option<String>,
}

/// Plan query variants for a context.
///
/// For companies the table marks as ambiguous every variant carries a
/// qualifier: the domain when one is known, else `"works at <Company>"`.
/// Identical texts are removed keeping the first occurrence.
pub fn plan_queries(ctx: &SearchContext, companies: &CompanyTable) -> Vec<QueryVariant> {
    let company = ctx.company.trim();
    let title = ctx.job_title.trim();
    let domain = companies.resolve_domain(ctx);
    let ambiguous = companies.is_ambiguous(company);

    let qualifier = if ambiguous {
        Some(match &domain {
            Some(d) => format!("\"{d}\""),
            None => format!("\"works at {company}\""),
        })
    } else {
        None
    };

    let base = format!("\"{company}\" {title}");
    let mut drafts: Vec<(QueryKind, String)> = Vec::with_capacity(MAX_VARIANTS);

    if let Some(d) = &domain {
        drafts.push((QueryKind::Domain, format!("\"{company}\" \"{d}\" {title}")));
    }

    let skills: Vec<&str> = ctx
        .required_skills
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .take(MAX_QUERY_SKILLS)
        .collect();
    if !skills.is_empty() {
        drafts.push((QueryKind::TitleSkills, format!("{base} {}", skills.join(" "))));
    }

    if let Some(school) = ctx.requester_schools.iter().map(|s| s.trim()).find(|s| !s.is_empty()) {
        drafts.push((QueryKind::Alumni, format!("{base} \"{school}\"")));
    }

    if let Some(department) = ctx.department.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        drafts.push((QueryKind::Department, format!("{base} {department}")));
    }

    drafts.push((QueryKind::Fallback, base));

    let mut variants: Vec<QueryVariant> = Vec::with_capacity(MAX_VARIANTS);
    for (kind, mut text) in drafts {
        if let Some(q) = &qualifier {
            if !text.contains(q.as_str()) {
                text.push(' ');
                text.push_str(q);
            }
        }
        if variants.iter().any(|v| v.text == text) {
            continue;
        }
        variants.push(QueryVariant {
            kind,
            text,
            company: company.to_owned(),
            title: title.to_owned(),
            domain: domain.clone(),
        });
        if variants.len() == MAX_VARIANTS {
            break;
        }
    }

    tracing::trace!(count = variants.len(), ambiguous, "planned query variants");
    variants
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(variants: &[QueryVariant]) -> Vec<QueryKind> {
        variants.iter().map(|v| v.kind).collect()
    }

    #[test]
    fn full_context_yields_all_kinds_in_priority_order() {
        let ctx = SearchContext::new("Stripe", "Backend Engineer")
            .with_required_skills(["Rust", "Go", "Kafka", "gRPC"])
            .with_schools(["MIT"])
            .with_department("Payments");
        let variants = plan_queries(&ctx, &CompanyTable::builtin());

        assert_eq!(
            kinds(&variants),
            vec![
                QueryKind::Domain,
                QueryKind::TitleSkills,
                QueryKind::Alumni,
                QueryKind::Department,
                QueryKind::Fallback,
            ]
        );
        assert_eq!(variants[0].text, "\"Stripe\" \"stripe.com\" Backend Engineer");
        // Only the first three skills are used.
        assert_eq!(variants[1].text, "\"Stripe\" Backend Engineer Rust Go Kafka");
        assert_eq!(variants[2].text, "\"Stripe\" Backend Engineer \"MIT\"");
        assert_eq!(variants[4].text, "\"Stripe\" Backend Engineer");
    }

    #[test]
    fn never_more_than_max_variants() {
        let ctx = SearchContext::new("Stripe", "Engineer")
            .with_required_skills(["Rust"])
            .with_schools(["MIT", "CMU"])
            .with_department("Infra");
        assert!(plan_queries(&ctx, &CompanyTable::builtin()).len() <= MAX_VARIANTS);
    }

    #[test]
    fn minimal_context_yields_fallback_only() {
        let ctx = SearchContext::new("Unknown Startup", "Engineer");
        let variants = plan_queries(&ctx, &CompanyTable::builtin());
        assert_eq!(kinds(&variants), vec![QueryKind::Fallback]);
        assert!(variants[0].domain.is_none());
    }

    #[test]
    fn ambiguous_company_with_domain_qualifies_every_variant() {
        let ctx = SearchContext::new("Root", "AI Engineer")
            .with_domain("root.io")
            .with_required_skills(["PyTorch"]);
        let variants = plan_queries(&ctx, &CompanyTable::builtin());
        assert!(variants.len() >= 2);
        for v in &variants {
            assert!(v.text.contains("\"root.io\""), "unqualified: {}", v.text);
        }
    }

    #[test]
    fn ambiguous_company_without_domain_uses_identity_token() {
        let mut table = CompanyTable::builtin();
        table.domains.remove("root");
        let ctx = SearchContext::new("Root", "AI Engineer");
        let variants = plan_queries(&ctx, &table);
        assert_eq!(variants.len(), 1);
        assert!(variants[0].text.contains("\"works at Root\""));
    }

    #[test]
    fn duplicate_texts_are_removed() {
        // An empty department must not produce a variant identical to the fallback.
        let ctx = SearchContext::new("Unknown Startup", "Engineer").with_department("  ");
        let variants = plan_queries(&ctx, &CompanyTable::builtin());
        assert_eq!(variants.len(), 1);
    }

    #[test]
    fn planning_is_deterministic() {
        let ctx = SearchContext::new("Meta", "ML Engineer")
            .with_required_skills(["PyTorch"])
            .with_schools(["Stanford"]);
        let table = CompanyTable::builtin();
        assert_eq!(plan_queries(&ctx, &table), plan_queries(&ctx, &table));
    }
}
