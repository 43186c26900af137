//! Profile URL canonicalisation for deduplication.
//!
//! Two providers that found the same profile rarely spell its URL the same
//! way: `http` vs `https`, country subdomains (`uk.linkedin.com`), `www.`,
//! trailing slashes, tracking parameters. The canonical form makes them
//! compare equal.

use url::Url;

/// Tracking query parameters stripped from non-LinkedIn URLs.
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "ref",
    "trk",
    "originalsubdomain",
];

/// Canonicalise a profile URL. Returns `None` for blank or unparseable input.
///
/// 1. Add `https://` when the scheme is missing.
/// 2. Lowercase the host and drop `www.`; every LinkedIn subdomain maps to
///    `linkedin.com` and the scheme becomes `https`.
/// 3. LinkedIn paths are lowercased and lose their query entirely; other
///    URLs lose tracking parameters and keep the rest sorted.
/// 4. Remove default ports, the fragment, and a trailing slash.
///
/// # Examples
///
/// ```
/// use scout_search::orchestrator::url_normalize::canonical_profile_url;
///
/// let a = canonical_profile_url("http://uk.linkedin.com/in/Jane-Doe/?trk=public");
/// let b = canonical_profile_url("linkedin.com/in/jane-doe");
/// assert_eq!(a, b);
/// assert_eq!(a.as_deref(), Some("https://linkedin.com/in/jane-doe"));
/// ```
pub fn canonical_profile_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    };
    let mut parsed = Url::parse(&with_scheme).ok()?;
    if !matches!(parsed.scheme(), "http" | "https")
        || !parsed.username().is_empty()
        || parsed.password().is_some()
    {
        return None;
    }

    let host = parsed.host_str()?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host).to_owned();
    let is_linkedin = host == "linkedin.com" || host.ends_with(".linkedin.com");

    parsed.set_fragment(None);
    if is_default_port(&parsed) {
        let _ = parsed.set_port(None);
    }

    if is_linkedin {
        parsed.set_host(Some("linkedin.com")).ok()?;
        parsed.set_scheme("https").ok()?;
        parsed.set_query(None);
        let path = parsed.path().to_lowercase();
        parsed.set_path(&path);
    } else {
        parsed.set_host(Some(&host)).ok()?;
        let mut params: Vec<(String, String)> = parsed
            .query_pairs()
            .filter(|(key, _)| !TRACKING_PARAMS.contains(&key.to_lowercase().as_str()))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        params.sort();
        if params.is_empty() {
            parsed.set_query(None);
        } else {
            let qs = params
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("&");
            parsed.set_query(Some(&qs));
        }
    }

    let path = parsed.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        parsed.set_path(path.trim_end_matches('/'));
    }

    let mut out = parsed.to_string();
    // `Url` always serialises a bare host with a root slash.
    if parsed.path() == "/" && parsed.query().is_none() && out.ends_with('/') {
        out.pop();
    }
    Some(out)
}

/// Returns `true` if the URL uses the default port for its scheme.
fn is_default_port(url: &Url) -> bool {
    matches!(
        (url.scheme(), url.port()),
        ("http", Some(80)) | ("https", Some(443))
    )
}
