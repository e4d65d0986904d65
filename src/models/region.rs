use serde::Serialize;
use std::fmt::Display;

/// Region used when no valid region can be resolved
pub const FALLBACK_REGION: &str = "US";

/// Two-letter uppercase region code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Region(String);

impl Region {
    /// Applies the fallback chain: explicit request value, stored user region,
    /// server default, then [`FALLBACK_REGION`].
    ///
    /// The first non-blank candidate wins. If it is not exactly two ASCII letters the
    /// result is the fallback, even when a later candidate would have been valid.
    pub fn resolve(explicit: Option<&str>, stored: Option<&str>, server_default: Option<&str>) -> Self {
        let candidate = [explicit, stored, server_default]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|r| !r.is_empty())
            .unwrap_or(FALLBACK_REGION)
            .to_uppercase();

        if candidate.len() == 2 && candidate.chars().all(|c| c.is_ascii_alphabetic()) {
            Self(candidate)
        } else {
            Self(FALLBACK_REGION.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_region_wins() {
        let region = Region::resolve(Some("de"), Some("GB"), Some("FR"));
        assert_eq!(region.as_str(), "DE");
    }

    #[test]
    fn test_stored_user_region_used_without_query() {
        let region = Region::resolve(None, Some("GB"), None);
        assert_eq!(region.as_str(), "GB");
    }

    #[test]
    fn test_blank_explicit_falls_through() {
        let region = Region::resolve(Some("   "), Some("gb"), None);
        assert_eq!(region.as_str(), "GB");
    }

    #[test]
    fn test_server_default_used_last() {
        let region = Region::resolve(None, None, Some("ca"));
        assert_eq!(region.as_str(), "CA");
    }

    #[test]
    fn test_no_sources_uses_fallback() {
        let region = Region::resolve(None, None, None);
        assert_eq!(region.as_str(), FALLBACK_REGION);
    }

    #[test]
    fn test_three_characters_uses_fallback() {
        let region = Region::resolve(Some("USA"), Some("GB"), None);
        assert_eq!(region.as_str(), FALLBACK_REGION);
    }

    #[test]
    fn test_non_letters_use_fallback() {
        assert_eq!(Region::resolve(Some("1A"), None, None).as_str(), FALLBACK_REGION);
        assert_eq!(Region::resolve(Some("é"), None, None).as_str(), FALLBACK_REGION);
    }
}
