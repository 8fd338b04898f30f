// src/checker/normalize.rs
// =============================================================================
// Turns a raw extracted link into the canonical URL we probe and dedupe on.
//
// Rules, in order:
// 1. Excluded schemes (mailto:, tel:, ...) are rejected before parsing
// 2. The string must parse as an absolute URL
// 3. Only http:// and https:// are fetchable
// 4. The fragment (#section) is stripped
// 5. Excluded domains (social networks, messaging, maps) are rejected
//
// No network access happens here, so the same input always gives the same
// answer.
// =============================================================================

use crate::config::ExclusionList;
use url::Url;

/// What the normalizer decided about one raw link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    /// A fetchable URL with its fragment removed
    Link(Url),
    /// On the exclusion list (scheme or domain)
    Excluded,
    /// Not an absolute http(s) URL
    Unsupported,
}

impl Normalized {
    pub fn into_link(self) -> Option<Url> {
        match self {
            Normalized::Link(url) => Some(url),
            _ => None,
        }
    }
}

pub fn normalize_link(raw: &str, exclusions: &ExclusionList) -> Normalized {
    let raw = raw.trim();

    if exclusions.excludes_scheme(raw) {
        return Normalized::Excluded;
    }

    let mut url = match Url::parse(raw) {
        Ok(url) => url,
        Err(_) => return Normalized::Unsupported,
    };

    if url.scheme() != "http" && url.scheme() != "https" {
        return Normalized::Unsupported;
    }

    url.set_fragment(None);

    if exclusions.excludes_domain(&url) {
        return Normalized::Excluded;
    }

    Normalized::Link(url)
}

/// True if both URLs point at the same host (case-insensitive)
pub fn same_host(a: &Url, b: &Url) -> bool {
    match (a.host_str(), b.host_str()) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(raw: &str) -> Normalized {
        normalize_link(raw, &ExclusionList::default())
    }

    #[test]
    fn test_fragment_variants_normalize_equal() {
        let a = normalize("https://example.com/docs#install");
        let b = normalize("https://example.com/docs#usage");
        let c = normalize("https://example.com/docs");
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(
            a.into_link().unwrap().as_str(),
            "https://example.com/docs"
        );
    }

    #[test]
    fn test_query_is_kept() {
        let link = normalize("https://example.com/search?q=rust#top").into_link().unwrap();
        assert_eq!(link.as_str(), "https://example.com/search?q=rust");
    }

    #[test]
    fn test_excluded_schemes() {
        assert_eq!(normalize("mailto:team@example.com"), Normalized::Excluded);
        assert_eq!(normalize("tel:+15551234"), Normalized::Excluded);
    }

    #[test]
    fn test_excluded_domains() {
        assert_eq!(normalize("https://facebook.com/x"), Normalized::Excluded);
        assert_eq!(normalize("https://www.instagram.com/acme#feed"), Normalized::Excluded);
    }

    #[test]
    fn test_unsupported_inputs() {
        assert_eq!(normalize("/relative/path"), Normalized::Unsupported);
        assert_eq!(normalize("ftp://files.example.com/a.zip"), Normalized::Unsupported);
        assert_eq!(normalize("http://"), Normalized::Unsupported);
    }

    #[test]
    fn test_deterministic() {
        let raw = "https://Example.com/a/../b#x";
        assert_eq!(normalize(raw), normalize(raw));
        assert_eq!(normalize(raw).into_link().unwrap().as_str(), "https://example.com/b");
    }

    #[test]
    fn test_same_host() {
        let root = Url::parse("https://ex.com/").unwrap();
        assert!(same_host(&root, &Url::parse("https://EX.com/a").unwrap()));
        assert!(!same_host(&root, &Url::parse("https://www.ex.com/a").unwrap()));
        assert!(!same_host(&root, &Url::parse("https://other.com/").unwrap()));
    }
}
