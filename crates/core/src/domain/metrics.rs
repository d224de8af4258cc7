use serde::{Deserialize, Serialize};

use crate::domain::manufacturer::ManufacturerResolver;

const MAX_KEYWORD_CHARS: usize = 20;

/// Advertiser competition for a keyword. More competition means proven
/// commercial value, so it scores as a positive signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Competition {
    Low,
    Medium,
    High,
}

impl Competition {
    /// Monotonic mapping: high = 1.0, medium = 0.5, low = 0.0.
    pub fn signal(self) -> f64 {
        match self {
            Self::High => 1.0,
            Self::Medium => 0.5,
            Self::Low => 0.0,
        }
    }
}

impl std::str::FromStr for Competition {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" | "높음" => Ok(Self::High),
            "medium" | "mid" | "중간" => Ok(Self::Medium),
            "low" | "낮음" => Ok(Self::Low),
            other => Err(format!("unknown competition level `{other}` (expected high|medium|low)")),
        }
    }
}

/// Monthly demand signal for one search keyword.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordMetrics {
    pub monthly_search_volume: u64,
    pub monthly_clicks: u64,
    pub avg_cpc: u64,
    pub competition: Competition,
}

impl KeywordMetrics {
    pub fn has_demand(&self) -> bool {
        self.monthly_clicks > 0
    }
}

/// Search keyword a product's metrics are keyed by.
///
/// Parenthesized model codes are dropped, a leading manufacturer alias is
/// collapsed to its canonical token (`LG전자 LG 트롬` -> `LG트롬`), tokens that
/// mix ASCII letters and digits (model codes, `21kg`) are removed and the rest
/// is joined without spaces and capped at 20 characters.
pub fn search_keyword(name: &str, resolver: &ManufacturerResolver) -> String {
    let stripped = strip_parenthesized(name);
    let mut rest = stripped.trim();
    let mut keyword = String::new();

    if let Some((canonical, matched)) = resolver.canonical_prefix(rest) {
        keyword.push_str(canonical);
        rest = skip_chars(rest, matched).trim_start();

        // "LG전자 LG 트롬" repeats the manufacturer after the company name.
        if let Some((again, matched_again)) = resolver.canonical_prefix(rest) {
            if again == canonical {
                rest = skip_chars(rest, matched_again);
            }
        }
    }

    for token in rest.split_whitespace() {
        if !looks_like_model_code(token) {
            keyword.push_str(token);
        }
    }

    keyword.chars().take(MAX_KEYWORD_CHARS).collect()
}

fn strip_parenthesized(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut depth = 0_usize;
    for ch in input.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => output.push(ch),
            _ => {}
        }
    }
    output
}

fn skip_chars(input: &str, count: usize) -> &str {
    match input.char_indices().nth(count) {
        Some((index, _)) => &input[index..],
        None => "",
    }
}

fn looks_like_model_code(token: &str) -> bool {
    let has_letter = token.chars().any(|ch| ch.is_ascii_alphabetic());
    let has_digit = token.chars().any(|ch| ch.is_ascii_digit());
    has_letter && has_digit && token.chars().count() >= 4
}

#[cfg(test)]
mod tests {
    use super::{search_keyword, Competition};
    use crate::domain::manufacturer::ManufacturerResolver;

    #[test]
    fn keyword_collapses_manufacturer_and_drops_model_codes() {
        let resolver = ManufacturerResolver::default();

        assert_eq!(
            search_keyword("LG전자 LG 트롬 21kg 스테인리스 실버(F21VDSK)", &resolver),
            "LG트롬스테인리스실버"
        );
        assert_eq!(
            search_keyword("삼성전자 비스포크AI콤보 WD80F25CH 화이트(WD80F25CHW)", &resolver),
            "삼성비스포크AI콤보화이트"
        );
    }

    #[test]
    fn keyword_is_capped_at_twenty_characters() {
        let resolver = ManufacturerResolver::default();
        let keyword = search_keyword("아주 긴 이름을 가진 무선 진공 청소기 프리미엄 에디션 한정판", &resolver);

        assert_eq!(keyword.chars().count(), 20);
    }

    #[test]
    fn candidates_with_same_model_family_share_a_keyword() {
        let resolver = ManufacturerResolver::default();

        assert_eq!(
            search_keyword("삼성전자 그랑데 WF21T6000KW", &resolver),
            search_keyword("삼성 그랑데 (WF19T6000KW)", &resolver)
        );
    }

    #[test]
    fn competition_accepts_korean_labels_and_maps_monotonically() {
        assert_eq!("높음".parse::<Competition>(), Ok(Competition::High));
        assert_eq!("중간".parse::<Competition>(), Ok(Competition::Medium));
        assert_eq!("LOW".parse::<Competition>(), Ok(Competition::Low));
        assert!(Competition::High.signal() > Competition::Medium.signal());
        assert!(Competition::Medium.signal() > Competition::Low.signal());
    }
}
