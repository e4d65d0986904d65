//! Maps free-text provider names from the upstream catalogue to stable service codes.

use crate::models::streaming_service::{
    APPLE_TV, APPLE_TV_PLUS, DISNEY_PLUS, HULU, MAX, NETFLIX, PARAMOUNT_PLUS, PEACOCK,
    PRIME_VIDEO,
};

/// Canonical lookup form of a provider name.
///
/// Symbols are spelled out before punctuation is stripped, so "Apple TV+" and
/// "Apple TV" stay distinct.
pub fn normalize_provider_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .replace('+', "plus")
        .replace('&', "and")
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// Service code for a provider display name, if it is one we track
pub fn map_provider_name(name: &str) -> Option<&'static str> {
    lookup_alias(&normalize_provider_name(name))
}

fn lookup_alias(normalized: &str) -> Option<&'static str> {
    let code = match normalized {
        "netflix" | "netflixbasicwithads" | "netflixkids" => NETFLIX,
        "primevideo" | "amazonprimevideo" | "amazonvideo" | "amazonprimevideowithads" => {
            PRIME_VIDEO
        }
        "hulu" => HULU,
        "disneyplus" | "disney" => DISNEY_PLUS,
        // Renamed from HBO Max
        "max" | "hbomax" => MAX,
        "appletvplus" => APPLE_TV_PLUS,
        "appletv" | "appleitunes" | "itunes" => APPLE_TV,
        "paramountplus"
        | "paramountpluspremium"
        | "paramountplusessential"
        | "paramountpluswithshowtime" => PARAMOUNT_PLUS,
        "peacock" | "peacockpremium" | "peacockpremiumplus" => PEACOCK,
        _ => return None,
    };
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_and_whitespace_insensitive() {
        assert_eq!(map_provider_name("NETFLIX"), Some(NETFLIX));
        assert_eq!(map_provider_name("netflix"), Some(NETFLIX));
        assert_eq!(map_provider_name(" Netflix "), Some(NETFLIX));
    }

    #[test]
    fn test_plus_is_spelled_out_before_stripping() {
        assert_eq!(normalize_provider_name("Disney+"), "disneyplus");
        assert_eq!(map_provider_name("Disney+"), Some(DISNEY_PLUS));
        assert_eq!(map_provider_name("Disney Plus"), Some(DISNEY_PLUS));
    }

    #[test]
    fn test_plus_distinguishes_services() {
        assert_eq!(map_provider_name("Apple TV+"), Some(APPLE_TV_PLUS));
        assert_eq!(map_provider_name("Apple TV"), Some(APPLE_TV));
        assert_ne!(map_provider_name("Apple TV+"), map_provider_name("Apple TV"));
    }

    #[test]
    fn test_ampersand_is_spelled_out() {
        assert_eq!(normalize_provider_name("AMC+ & Friends"), "amcplusandfriends");
    }

    #[test]
    fn test_aliases_converge() {
        assert_eq!(map_provider_name("HBO Max"), Some(MAX));
        assert_eq!(map_provider_name("Max"), Some(MAX));
        assert_eq!(map_provider_name("Amazon Prime Video"), Some(PRIME_VIDEO));
        assert_eq!(map_provider_name("Prime Video"), Some(PRIME_VIDEO));
        assert_eq!(map_provider_name("Paramount Plus"), Some(PARAMOUNT_PLUS));
        assert_eq!(map_provider_name("Paramount+"), Some(PARAMOUNT_PLUS));
        assert_eq!(map_provider_name("Netflix basic with Ads"), Some(NETFLIX));
    }

    #[test]
    fn test_punctuation_is_stripped() {
        assert_eq!(normalize_provider_name("  Peacock-Premium! "), "peacockpremium");
        assert_eq!(map_provider_name("Peacock Premium"), Some(PEACOCK));
    }

    #[test]
    fn test_unknown_names_are_not_found() {
        assert_eq!(map_provider_name("Crunchyroll"), None);
        assert_eq!(map_provider_name(""), None);
        assert_eq!(map_provider_name("+"), None);
    }
}
