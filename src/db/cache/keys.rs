use std::fmt::Display;

use crate::models::{MediaType, SearchQuery, TitleRef};

const SEARCH_KEY_PREFIX: &str = "search:v1";
const PROVIDERS_KEY_PREFIX: &str = "providers:v1";

/// Placeholder written for absent optional components
const ABSENT: &str = "-";

/// Which TTL applies to a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlClass {
    Search,
    Providers,
}

/// Cache key for upstream data.
///
/// The `Display` impl is the canonical key string: text is trimmed and case-folded,
/// absent fields become `-`, and free text is escaped so it cannot forge a delimiter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Search {
        query: String,
        page: u32,
        include_adult: bool,
        language: Option<String>,
        region: Option<String>,
        media_type: MediaType,
    },
    Providers(TitleRef),
}

impl CacheKey {
    pub fn search(query: &SearchQuery) -> Self {
        CacheKey::Search {
            query: query.query.clone(),
            page: query.page,
            include_adult: query.include_adult,
            language: query.language.clone(),
            region: query.region.clone(),
            media_type: query.media_type,
        }
    }

    pub fn providers(title: TitleRef) -> Self {
        CacheKey::Providers(title)
    }

    pub fn ttl_class(&self) -> TtlClass {
        match self {
            CacheKey::Search { .. } => TtlClass::Search,
            CacheKey::Providers(_) => TtlClass::Providers,
        }
    }
}

/// Escapes the characters used as key delimiters
fn escape(component: &str) -> String {
    component
        .replace('%', "%25")
        .replace(':', "%3A")
        .replace('=', "%3D")
}

fn optional(component: Option<&str>, fold: fn(&str) -> String) -> String {
    match component.map(str::trim).filter(|c| !c.is_empty()) {
        Some(c) => escape(&fold(c)),
        None => ABSENT.to_string(),
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Search {
                query,
                page,
                include_adult,
                language,
                region,
                media_type,
            } => write!(
                f,
                "{}:q={}:p={}:adult={}:lang={}:region={}:type={}",
                SEARCH_KEY_PREFIX,
                escape(&query.trim().to_lowercase()),
                page,
                include_adult,
                optional(language.as_deref(), str::to_lowercase),
                optional(region.as_deref(), str::to_uppercase),
                media_type,
            ),
            CacheKey::Providers(title) => write!(
                f,
                "{}:type={}:id={}",
                PROVIDERS_KEY_PREFIX, title.media_type, title.id
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search(query: &str, language: Option<&str>, region: Option<&str>) -> CacheKey {
        CacheKey::search(&SearchQuery {
            query: query.to_string(),
            page: 1,
            include_adult: false,
            language: language.map(str::to_string),
            region: region.map(str::to_string),
            media_type: MediaType::Movie,
        })
    }

    #[test]
    fn test_search_key_format() {
        let key = search("Inception", Some("en-US"), Some("us"));
        assert_eq!(
            key.to_string(),
            "search:v1:q=inception:p=1:adult=false:lang=en-us:region=US:type=movie"
        );
    }

    #[test]
    fn test_search_key_ignores_case_and_whitespace() {
        let a = search("  The Matrix ", Some(" EN "), Some("gb "));
        let b = search("the matrix", Some("en"), Some("GB"));
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn test_search_key_absent_fields_use_placeholder() {
        let absent = search("dune", None, None);
        let blank = search("dune", Some("  "), Some(""));
        assert_eq!(
            absent.to_string(),
            "search:v1:q=dune:p=1:adult=false:lang=-:region=-:type=movie"
        );
        assert_eq!(absent.to_string(), blank.to_string());
    }

    #[test]
    fn test_search_key_escapes_delimiters() {
        let forged = search("a:p=2", None, None);
        let plain = search("a", None, None);
        assert_ne!(forged.to_string(), plain.to_string());
        assert!(forged.to_string().starts_with("search:v1:q=a%3Ap%3D2:p=1:"));
    }

    #[test]
    fn test_providers_key_format() {
        let key = CacheKey::providers(TitleRef::parse(550, "Movie").unwrap());
        assert_eq!(key.to_string(), "providers:v1:type=movie:id=550");

        let key = CacheKey::providers(TitleRef::parse(1399, " tv ").unwrap());
        assert_eq!(key.to_string(), "providers:v1:type=tv:id=1399");
    }

    #[test]
    fn test_ttl_class() {
        assert_eq!(search("x", None, None).ttl_class(), TtlClass::Search);
        let key = CacheKey::providers(TitleRef::parse(1, "tv").unwrap());
        assert_eq!(key.ttl_class(), TtlClass::Providers);
    }
}
