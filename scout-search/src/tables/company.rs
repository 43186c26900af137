//! Company identity data: aliases, known domains, ambiguous names, and
//! false-positive neighbour organisations.
//!
//! The table is plain data. The planner and the validator read it, nothing
//! writes to it during a search, and callers grow coverage by merging a TOML
//! file over [`CompanyTable::builtin()`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::SearchError;
use crate::text::{normalize, normalize_domain};
use crate::types::SearchContext;

/// Corporate suffixes removed during name normalisation.
const CORPORATE_SUFFIXES: &[&str] = &[
    "inc",
    "corp",
    "corporation",
    "llc",
    "ltd",
    "limited",
    "co",
    "company",
    "technologies",
    "holdings",
    "group",
    "international",
];

/// Data-driven company identity table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyTable {
    /// Canonical company name → other names it is known by.
    pub aliases: BTreeMap<String, Vec<String>>,
    /// Company name (canonical or alias) → web domain.
    pub domains: BTreeMap<String, String>,
    /// Common-word company names that need a qualifier in every query.
    pub ambiguous: BTreeSet<String>,
    /// Company name → unrelated organisations that share its name.
    pub neighbours: BTreeMap<String, Vec<String>>,
}

impl CompanyTable {
    /// The built-in table.
    pub fn builtin() -> Self {
        let aliases = [
            ("meta", &["facebook", "meta platforms"][..]),
            ("google", &["alphabet", "google llc"]),
            ("amazon", &["aws", "amazon web services"]),
            ("microsoft", &["msft", "microsoft corporation"]),
            ("twitter", &["x corp"]),
            ("block", &["square inc"]),
            ("jp morgan", &["jpmorgan", "j.p. morgan", "jpmorgan chase"]),
            ("goldman sachs", &["goldman"]),
            ("doordash", &["door dash"]),
            ("airbnb", &["air bnb"]),
            ("databricks", &["data bricks"]),
            ("palantir", &["palantir technologies"]),
        ];
        let domains = [
            ("google", "google.com"),
            ("meta", "meta.com"),
            ("amazon", "amazon.com"),
            ("apple", "apple.com"),
            ("microsoft", "microsoft.com"),
            ("netflix", "netflix.com"),
            ("uber", "uber.com"),
            ("lyft", "lyft.com"),
            ("airbnb", "airbnb.com"),
            ("stripe", "stripe.com"),
            ("block", "block.xyz"),
            ("twitter", "twitter.com"),
            ("linkedin", "linkedin.com"),
            ("salesforce", "salesforce.com"),
            ("nvidia", "nvidia.com"),
            ("databricks", "databricks.com"),
            ("snowflake", "snowflake.com"),
            ("palantir", "palantir.com"),
            ("datadog", "datadoghq.com"),
            ("mongodb", "mongodb.com"),
            ("confluent", "confluent.io"),
            ("openai", "openai.com"),
            ("anthropic", "anthropic.com"),
            ("hugging face", "huggingface.co"),
            ("cohere", "cohere.ai"),
            ("coinbase", "coinbase.com"),
            ("robinhood", "robinhood.com"),
            ("plaid", "plaid.com"),
            ("notion", "notion.so"),
            ("figma", "figma.com"),
            ("root", "root.io"),
            ("root insurance", "joinroot.com"),
            ("lattice", "lattice.com"),
            ("vanta", "vanta.com"),
        ];
        let ambiguous = [
            "root", "branch", "leaf", "seed", "bloom", "grow", "meta", "data", "labs", "alpha",
            "beta", "delta", "gamma", "sigma", "first", "one", "next", "new", "modern", "spark",
            "bolt", "flash", "swift", "rapid", "blue", "red", "green", "north", "peak", "summit",
            "apex", "core", "base", "prime", "link", "bridge", "wave", "pulse", "flow", "stream",
            "notion", "square", "box", "lattice", "plaid", "block",
        ];
        let neighbours = [
            ("root", &["root insurance", "joinroot", "root inc insurance"][..]),
            ("notion", &["notion capital"]),
            ("square", &["square enix", "squarespace"]),
            ("delta", &["delta air lines", "delta dental", "delta faucet"]),
            ("block", &["h&r block"]),
            ("apple", &["apple bank", "applebee's"]),
            ("lattice", &["lattice semiconductor"]),
            ("meta", &["metamask", "meta financial"]),
            ("spark", &["spark networks"]),
        ];

        Self {
            aliases: aliases
                .iter()
                .map(|(k, v)| ((*k).to_owned(), v.iter().map(|a| (*a).to_owned()).collect()))
                .collect(),
            domains: domains
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
            ambiguous: ambiguous.iter().map(|s| (*s).to_owned()).collect(),
            neighbours: neighbours
                .iter()
                .map(|(k, v)| ((*k).to_owned(), v.iter().map(|n| (*n).to_owned()).collect()))
                .collect(),
        }
    }

    /// Parse a table from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Table`] if the TOML is malformed.
    pub fn from_toml_str(content: &str) -> Result<Self, SearchError> {
        toml::from_str(content).map_err(|e| SearchError::Table(format!("company table: {e}")))
    }

    /// Merge `other` into `self`. Entries in `other` extend existing lists and
    /// override single-valued entries (domains).
    pub fn merge(&mut self, other: CompanyTable) {
        for (company, aliases) in other.aliases {
            let entry = self.aliases.entry(normalize(&company)).or_default();
            for alias in aliases {
                let alias = normalize(&alias);
                if !entry.contains(&alias) {
                    entry.push(alias);
                }
            }
        }
        for (company, domain) in other.domains {
            self.domains.insert(normalize(&company), normalize_domain(&domain));
        }
        self.ambiguous
            .extend(other.ambiguous.iter().map(|name| normalize(name)));
        for (company, names) in other.neighbours {
            let entry = self.neighbours.entry(normalize(&company)).or_default();
            for name in names {
                let name = normalize(&name);
                if !entry.contains(&name) {
                    entry.push(name);
                }
            }
        }
    }

    /// Canonical, normalised form of a company name.
    ///
    /// Strips corporate suffixes and maps known aliases to their canonical
    /// name: `"Facebook, Inc."` → `"meta"`.
    pub fn canonical_name(&self, company: &str) -> String {
        let cleaned = strip_suffixes(company);
        if self.aliases.contains_key(&cleaned) {
            return cleaned;
        }
        self.aliases
            .iter()
            .find(|(_, aliases)| aliases.iter().any(|a| normalize(a) == cleaned))
            .map_or(cleaned, |(canonical, _)| canonical.clone())
    }

    /// Every lowercased name the company may appear under: the input, the
    /// canonical name, table aliases, and `extra` aliases supplied by the caller.
    pub fn names_for(&self, company: &str, extra: &[String]) -> Vec<String> {
        let canonical = self.canonical_name(company);
        let mut names: Vec<String> = Vec::new();
        let mut push = |name: String| {
            if !name.is_empty() && !names.contains(&name) {
                names.push(name);
            }
        };
        push(normalize(company));
        push(strip_suffixes(company));
        push(canonical.clone());
        if let Some(aliases) = self.aliases.get(&canonical) {
            for alias in aliases {
                push(normalize(alias));
            }
        }
        for alias in extra {
            push(normalize(alias));
        }
        names
    }

    /// Known domain for a company name, if the table has one.
    pub fn known_domain(&self, company: &str) -> Option<&str> {
        let cleaned = strip_suffixes(company);
        self.domains
            .get(&cleaned)
            .or_else(|| self.domains.get(&self.canonical_name(company)))
            .map(String::as_str)
    }

    /// The domain to use for a search: the context's own domain, else the
    /// table's known domain. Always normalised.
    pub fn resolve_domain(&self, ctx: &SearchContext) -> Option<String> {
        ctx.domain
            .as_deref()
            .map(normalize_domain)
            .filter(|d| !d.is_empty())
            .or_else(|| self.known_domain(&ctx.company).map(normalize_domain))
    }

    /// Whether the company name is a common word that needs a qualifier.
    ///
    /// Companies with neighbour entries are ambiguous by definition.
    pub fn is_ambiguous(&self, company: &str) -> bool {
        let cleaned = strip_suffixes(company);
        self.ambiguous.contains(&cleaned) || self.neighbours.contains_key(&cleaned)
    }

    /// Unrelated organisations that share the company's name.
    pub fn neighbours_for(&self, company: &str) -> &[String] {
        let cleaned = strip_suffixes(company);
        self.neighbours
            .get(&cleaned)
            .or_else(|| self.neighbours.get(&self.canonical_name(company)))
            .map_or(&[], Vec::as_slice)
    }
}

/// Lowercase a company name, drop punctuation around words, and strip
/// trailing corporate suffixes.
pub fn strip_suffixes(company: &str) -> String {
    let mut words: Vec<String> = company
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| c == ',' || c == '.').to_lowercase())
        .filter(|w| !w.is_empty())
        .collect();
    while words.len() > 1
        && words
            .last()
            .is_some_and(|w| CORPORATE_SUFFIXES.contains(&w.as_str()))
    {
        words.pop();
    }
    words.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_corporate_suffixes() {
        assert_eq!(strip_suffixes("Stripe, Inc."), "stripe");
        assert_eq!(strip_suffixes("Palantir Technologies"), "palantir");
        assert_eq!(strip_suffixes("Acme Holdings Group"), "acme");
        // A lone suffix word is kept.
        assert_eq!(strip_suffixes("Company"), "company");
    }

    #[test]
    fn canonical_name_resolves_aliases() {
        let table = CompanyTable::builtin();
        assert_eq!(table.canonical_name("Facebook"), "meta");
        assert_eq!(table.canonical_name("Meta Platforms, Inc."), "meta");
        assert_eq!(table.canonical_name("Unknown Startup"), "unknown startup");
    }

    #[test]
    fn names_for_includes_aliases_and_extras() {
        let table = CompanyTable::builtin();
        let names = table.names_for("Meta", &["FB Reality Labs".into()]);
        assert!(names.contains(&"meta".to_owned()));
        assert!(names.contains(&"facebook".to_owned()));
        assert!(names.contains(&"fb reality labs".to_owned()));
    }

    #[test]
    fn resolve_domain_prefers_context() {
        let table = CompanyTable::builtin();
        let ctx = SearchContext::new("Root", "AI Engineer").with_domain("https://www.Root.io/");
        assert_eq!(table.resolve_domain(&ctx).as_deref(), Some("root.io"));

        let ctx = SearchContext::new("Stripe", "Engineer");
        assert_eq!(table.resolve_domain(&ctx).as_deref(), Some("stripe.com"));

        let ctx = SearchContext::new("Nobody Corp", "Engineer");
        assert!(table.resolve_domain(&ctx).is_none());
    }

    #[test]
    fn common_words_are_ambiguous() {
        let table = CompanyTable::builtin();
        assert!(table.is_ambiguous("Root"));
        assert!(table.is_ambiguous("Root Inc"));
        assert!(!table.is_ambiguous("Databricks"));
    }

    #[test]
    fn neighbours_for_root() {
        let table = CompanyTable::builtin();
        let neighbours = table.neighbours_for("Root");
        assert!(neighbours.contains(&"root insurance".to_owned()));
        assert!(table.neighbours_for("Databricks").is_empty());
    }

    #[test]
    fn merge_extends_without_duplicates() {
        let mut table = CompanyTable::builtin();
        let extra = CompanyTable::from_toml_str(
            r#"
            ambiguous = ["Acme"]
            [domains]
            acme = "https://acme.dev/"
            [neighbours]
            root = ["Root Insurance", "Root Beer Co"]
            "#,
        )
        .expect("parse");
        table.merge(extra);

        assert!(table.is_ambiguous("acme"));
        assert_eq!(table.known_domain("Acme"), Some("acme.dev"));
        let root = table.neighbours_for("root");
        assert_eq!(
            root.iter().filter(|n| n.as_str() == "root insurance").count(),
            1
        );
        assert!(root.contains(&"root beer co".to_owned()));
    }

    #[test]
    fn malformed_toml_is_a_table_error() {
        let err = CompanyTable::from_toml_str("aliases = 3").unwrap_err();
        assert!(err.to_string().contains("company table"));
    }
}
