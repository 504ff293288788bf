//! Fixed country name → region code table.
//!
//! Names are matched case-insensitively after trimming. Common alternate
//! spellings reported by geolocation providers map to the same code. The
//! first entry for a code is its display name.

const COUNTRIES: &[(&str, &str)] = &[
    ("United States", "US"),
    ("United States of America", "US"),
    ("USA", "US"),
    ("United Kingdom", "GB"),
    ("UK", "GB"),
    ("Great Britain", "GB"),
    ("Canada", "CA"),
    ("Australia", "AU"),
    ("New Zealand", "NZ"),
    ("Ireland", "IE"),
    ("Germany", "DE"),
    ("France", "FR"),
    ("Spain", "ES"),
    ("Italy", "IT"),
    ("Portugal", "PT"),
    ("Netherlands", "NL"),
    ("The Netherlands", "NL"),
    ("Belgium", "BE"),
    ("Switzerland", "CH"),
    ("Austria", "AT"),
    ("Sweden", "SE"),
    ("Norway", "NO"),
    ("Denmark", "DK"),
    ("Finland", "FI"),
    ("Iceland", "IS"),
    ("Poland", "PL"),
    ("Czech Republic", "CZ"),
    ("Czechia", "CZ"),
    ("Hungary", "HU"),
    ("Romania", "RO"),
    ("Greece", "GR"),
    ("Turkey", "TR"),
    ("Türkiye", "TR"),
    ("Ukraine", "UA"),
    ("Russia", "RU"),
    ("Russian Federation", "RU"),
    ("Israel", "IL"),
    ("United Arab Emirates", "AE"),
    ("Saudi Arabia", "SA"),
    ("Egypt", "EG"),
    ("Morocco", "MA"),
    ("Nigeria", "NG"),
    ("Ghana", "GH"),
    ("Kenya", "KE"),
    ("South Africa", "ZA"),
    ("Ethiopia", "ET"),
    ("India", "IN"),
    ("Pakistan", "PK"),
    ("Bangladesh", "BD"),
    ("Sri Lanka", "LK"),
    ("China", "CN"),
    ("Hong Kong", "HK"),
    ("Taiwan", "TW"),
    ("Japan", "JP"),
    ("South Korea", "KR"),
    ("Korea, Republic of", "KR"),
    ("Republic of Korea", "KR"),
    ("Singapore", "SG"),
    ("Malaysia", "MY"),
    ("Indonesia", "ID"),
    ("Philippines", "PH"),
    ("Thailand", "TH"),
    ("Vietnam", "VN"),
    ("Viet Nam", "VN"),
    ("Mexico", "MX"),
    ("Brazil", "BR"),
    ("Argentina", "AR"),
    ("Chile", "CL"),
    ("Colombia", "CO"),
    ("Peru", "PE"),
    ("Venezuela", "VE"),
];

/// Region code for a country name, if the country is in the table.
#[must_use]
pub fn region_code_for_country(name: &str) -> Option<&'static str> {
    let name = name.trim().to_lowercase();
    COUNTRIES
        .iter()
        .find(|(country, _)| country.to_lowercase() == name)
        .map(|(_, code)| *code)
}

/// Display name for a region code, if the code is in the table.
#[must_use]
pub fn country_name_for_code(code: &str) -> Option<&'static str> {
    let code = code.trim();
    COUNTRIES
        .iter()
        .find(|(_, c)| c.eq_ignore_ascii_case(code))
        .map(|(country, _)| *country)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_countries() {
        assert_eq!(region_code_for_country("Nigeria"), Some("NG"));
        assert_eq!(region_code_for_country("United States"), Some("US"));
        assert_eq!(region_code_for_country("Japan"), Some("JP"));
    }

    #[test]
    fn mapping_ignores_case_and_whitespace() {
        assert_eq!(region_code_for_country("  nigeria "), Some("NG"));
        assert_eq!(region_code_for_country("UNITED KINGDOM"), Some("GB"));
        assert_eq!(region_code_for_country("türkiye"), Some("TR"));
    }

    #[test]
    fn alternate_spellings_share_a_code() {
        assert_eq!(region_code_for_country("United States of America"), Some("US"));
        assert_eq!(region_code_for_country("Korea, Republic of"), Some("KR"));
        assert_eq!(region_code_for_country("Czechia"), Some("CZ"));
    }

    #[test]
    fn unknown_country_is_none() {
        assert_eq!(region_code_for_country("Atlantis"), None);
        assert_eq!(region_code_for_country(""), None);
    }

    #[test]
    fn mapping_is_deterministic_for_every_entry() {
        for (country, code) in COUNTRIES {
            let first = region_code_for_country(country);
            let second = region_code_for_country(country);
            assert_eq!(first, Some(*code), "{country}");
            assert_eq!(first, second);
        }
    }

    #[test]
    fn every_code_is_two_uppercase_letters() {
        for (_, code) in COUNTRIES {
            assert_eq!(code.len(), 2);
            assert!(code.chars().all(|c| c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn display_name_is_first_entry() {
        assert_eq!(country_name_for_code("US"), Some("United States"));
        assert_eq!(country_name_for_code("ng"), Some("Nigeria"));
        assert_eq!(country_name_for_code("XX"), None);
    }
}
