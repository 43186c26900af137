//! Text normalisation and whole-phrase matching.
//!
//! Every keyword check in the pipeline goes through [`contains_phrase`] so
//! that `"hr"` never matches inside `"three"` and `"vp"` never matches inside
//! `"mvp"`.

/// Lowercase, collapse whitespace, and trim.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Split lowercased text into alphanumeric tokens (`'+'`, `'#'` and `'.'`
/// inside a token are kept so `c++`, `c#` and `node.js` survive).
pub fn tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#' || c == '.'))
        .map(|t| t.trim_matches('.'))
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Byte offsets of every whole-phrase occurrence of `needle` in `haystack`.
///
/// Both arguments must already be lowercased. A match is whole when the
/// characters on either side are not alphanumeric (or are the string ends).
pub fn phrase_positions(haystack: &str, needle: &str) -> Vec<usize> {
    let needle = needle.trim();
    if needle.is_empty() {
        return Vec::new();
    }
    let mut positions = Vec::new();
    let mut start = 0;
    while let Some(found) = haystack[start..].find(needle) {
        let at = start + found;
        let end = at + needle.len();
        let before_ok = haystack[..at]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphanumeric());
        if before_ok && after_ok {
            positions.push(at);
        }
        start = at + haystack[at..].chars().next().map_or(1, char::len_utf8);
    }
    positions
}

/// Returns `true` if `needle` occurs in `haystack` as a whole phrase.
///
/// Both arguments must already be lowercased.
pub fn contains_phrase(haystack: &str, needle: &str) -> bool {
    !phrase_positions(haystack, needle).is_empty()
}

/// Returns `true` if any keyword occurs as a whole phrase, also accepting a
/// trailing plural `s` on the keyword (`recruiters`, `directors`).
pub fn contains_any_keyword<S: AsRef<str>>(haystack: &str, keywords: &[S]) -> bool {
    keywords.iter().any(|kw| {
        let kw = kw.as_ref();
        contains_phrase(haystack, kw) || contains_phrase(haystack, &format!("{kw}s"))
    })
}

/// Strip scheme, `www.`, path, and port from a domain or URL, and lowercase it.
pub fn normalize_domain(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();
    let without_scheme = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
        .unwrap_or(&lower);
    let host = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    let host = host.split(':').next().unwrap_or_default();
    host.strip_prefix("www.").unwrap_or(host).to_owned()
}
