use regex::Regex;
use std::sync::LazyLock;

static DOI_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"10\.\d{4,9}/\S+$").expect("valid DOI pattern"));

/// 從 DOI 字串或 `https://doi.org/...` 網址中取出 DOI
pub fn parse_doi(input: &str) -> Option<String> {
    DOI_PATTERN
        .find(input.trim())
        .map(|m| m.as_str().to_string())
}

/// 比較用的 DOI 鍵；DOI 不分大小寫
pub fn doi_key(doi: &str) -> String {
    doi.trim().to_lowercase()
}

pub fn doi_url(doi: &str) -> String {
    format!("https://doi.org/{}", doi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_doi() {
        assert_eq!(
            parse_doi("10.48364/ISIMIP.123456").as_deref(),
            Some("10.48364/ISIMIP.123456")
        );
        assert_eq!(
            parse_doi("https://doi.org/10.48364/ISIMIP.123456.2").as_deref(),
            Some("10.48364/ISIMIP.123456.2")
        );
        assert_eq!(
            parse_doi("  doi:10.5194/esd-12-1-2021 ").as_deref(),
            Some("10.5194/esd-12-1-2021")
        );
        assert_eq!(parse_doi("ISIMIP.123456"), None);
        assert_eq!(parse_doi(""), None);
    }

    #[test]
    fn test_doi_key_ignores_case() {
        assert_eq!(doi_key(" 10.48364/ISIMIP.1"), doi_key("10.48364/isimip.1"));
        assert_ne!(doi_key("10.48364/ISIMIP.1"), doi_key("10.48364/ISIMIP.2"));
    }

    #[test]
    fn test_doi_url() {
        assert_eq!(doi_url("10.1/x"), "https://doi.org/10.1/x");
    }
}
