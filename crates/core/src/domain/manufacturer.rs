//! Manufacturer resolution.
//!
//! Discovery sources report a "brand" that is often a product line (비스포크,
//! 트롬, 그랑데) rather than the company that makes it, and the same company
//! appears under several spellings. Diversity checks need one canonical token
//! per company, so names are matched against a prefix alias table first and
//! the reported brand second.

use std::collections::BTreeMap;

const BUILTIN_ALIASES: &[(&str, &[&str])] = &[
    ("삼성", &["삼성전자", "삼성", "samsung electronics", "samsung"]),
    ("LG", &["lg전자", "엘지전자", "엘지", "lg electronics", "lg"]),
    ("로보락", &["로보락", "roborock"]),
    ("다이슨", &["다이슨", "dyson"]),
    ("에코백스", &["에코백스", "ecovacs"]),
    ("드리미", &["드리미", "dreame"]),
    ("샤오미", &["샤오미", "미지아", "xiaomi", "mijia"]),
    ("필립스", &["필립스", "philips"]),
    ("브라운", &["브라운", "braun"]),
    ("파나소닉", &["파나소닉", "panasonic"]),
    ("쿠쿠", &["쿠쿠전자", "쿠쿠홈시스", "쿠쿠", "cuckoo"]),
    ("쿠첸", &["쿠첸", "cuchen"]),
    ("코웨이", &["코웨이", "coway"]),
    ("위닉스", &["위닉스", "winix"]),
    ("SK매직", &["sk매직", "sk magic"]),
    ("신일", &["신일전자", "신일"]),
];

#[derive(Clone, Debug, PartialEq, Eq)]
struct AliasEntry {
    alias: String,
    canonical: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManufacturerResolver {
    // Longest alias first so `삼성전자` wins over `삼성`.
    entries: Vec<AliasEntry>,
}

impl Default for ManufacturerResolver {
    fn default() -> Self {
        Self::with_aliases(&BTreeMap::new())
    }
}

impl ManufacturerResolver {
    /// Built-in table extended with `canonical -> [aliases]` pairs from configuration.
    pub fn with_aliases(extra: &BTreeMap<String, Vec<String>>) -> Self {
        let mut entries = Vec::new();

        for (canonical, aliases) in BUILTIN_ALIASES {
            for alias in *aliases {
                entries.push(AliasEntry {
                    alias: alias.to_lowercase(),
                    canonical: (*canonical).to_string(),
                });
            }
        }

        for (canonical, aliases) in extra {
            let canonical = canonical.trim();
            if canonical.is_empty() {
                continue;
            }
            for alias in aliases.iter().map(String::as_str).chain(std::iter::once(canonical)) {
                let alias = alias.trim().to_lowercase();
                if !alias.is_empty() {
                    entries.push(AliasEntry { alias, canonical: canonical.to_string() });
                }
            }
        }

        entries.sort_by(|left, right| {
            right
                .alias
                .chars()
                .count()
                .cmp(&left.alias.chars().count())
                .then_with(|| left.alias.cmp(&right.alias))
        });
        entries.dedup_by(|later, earlier| later.alias == earlier.alias);

        Self { entries }
    }

    /// Resolve the canonical manufacturer for a product.
    ///
    /// Always returns a value: the canonical token for a known prefix of the
    /// name, else the reported brand (canonicalized when it is a known
    /// alias), else an empty string.
    pub fn resolve(&self, name: &str, reported_brand: &str) -> String {
        if let Some(canonical) = self.match_prefix(name) {
            return canonical.to_string();
        }

        let brand = reported_brand.trim();
        if brand.is_empty() {
            return String::new();
        }

        self.match_prefix(brand).map(str::to_string).unwrap_or_else(|| brand.to_string())
    }

    /// Canonical form of a manufacturer name prefix, if known, with the number
    /// of characters of `text` (after leading whitespace) the alias covered.
    ///
    /// The alias must end at a token boundary: end of text, a non-alphanumeric
    /// character, or a switch between ASCII and Hangul (`LG트롬`). `브라운관` is
    /// not `브라운`.
    pub fn canonical_prefix<'a>(&'a self, text: &str) -> Option<(&'a str, usize)> {
        let text = text.trim_start();
        self.entries.iter().find_map(|entry| {
            match_alias(text, &entry.alias).map(|consumed| (entry.canonical.as_str(), consumed))
        })
    }

    fn match_prefix(&self, text: &str) -> Option<&str> {
        self.canonical_prefix(text).map(|(canonical, _)| canonical)
    }
}

/// Characters of `text` consumed by a case-insensitive match of `alias`.
fn match_alias(text: &str, alias: &str) -> Option<usize> {
    let last = alias.chars().last()?;
    let mut remaining = alias.chars();
    let mut chars = text.chars().peekable();
    let mut consumed = 0;

    while remaining.as_str() != "" {
        let ch = chars.next()?;
        consumed += 1;
        for lowered in ch.to_lowercase() {
            if remaining.next() != Some(lowered) {
                return None;
            }
        }
    }

    match chars.peek() {
        None => Some(consumed),
        Some(next) if !next.is_alphanumeric() || next.is_ascii() != last.is_ascii() => {
            Some(consumed)
        }
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::ManufacturerResolver;

    #[test]
    fn name_prefix_variants_collapse_to_one_token() {
        let resolver = ManufacturerResolver::default();

        assert_eq!(resolver.resolve("삼성전자 비스포크 AI 제트", "비스포크"), "삼성");
        assert_eq!(resolver.resolve("삼성 BESPOKE 큐커", "BESPOKE"), "삼성");
        assert_eq!(resolver.resolve("Samsung Jet 75", ""), "삼성");
        assert_eq!(resolver.resolve("LG전자 LG 트롬 21kg", "트롬"), "LG");
        assert_eq!(resolver.resolve("엘지 코드제로 A9S", "코드제로"), "LG");
    }

    #[test]
    fn falls_back_to_reported_brand_when_name_is_unknown() {
        let resolver = ManufacturerResolver::default();

        assert_eq!(resolver.resolve("S8 MaxV Ultra", "Roborock"), "로보락");
        assert_eq!(resolver.resolve("무명 청소기 X1", "나노테크"), "나노테크");
    }

    #[test]
    fn missing_name_and_brand_resolve_to_empty_string() {
        let resolver = ManufacturerResolver::default();

        assert_eq!(resolver.resolve("모델 X", "   "), "");
    }

    #[test]
    fn configured_aliases_extend_the_builtin_table() {
        let mut extra = BTreeMap::new();
        extra.insert("트위버스".to_string(), vec!["tweeverse".to_string()]);
        let resolver = ManufacturerResolver::with_aliases(&extra);

        assert_eq!(resolver.resolve("Tweeverse T10", ""), "트위버스");
        assert_eq!(resolver.resolve("트위버스 T10", ""), "트위버스");
        assert_eq!(resolver.resolve("삼성전자 제트", ""), "삼성");
    }

    #[test]
    fn canonical_prefix_reports_matched_length() {
        let resolver = ManufacturerResolver::default();

        assert_eq!(resolver.canonical_prefix("삼성전자 그랑데"), Some(("삼성", 4)));
        assert_eq!(resolver.canonical_prefix("그랑데"), None);
        assert_eq!(resolver.canonical_prefix("  SAMSUNG Jet 75"), Some(("삼성", 7)));
    }

    #[test]
    fn alias_must_end_at_a_token_boundary() {
        let resolver = ManufacturerResolver::default();

        assert_eq!(resolver.canonical_prefix("브라운관 TV 수리"), None);
        assert_eq!(resolver.canonical_prefix("브라운 시리즈9 프로"), Some(("브라운", 3)));
        assert_eq!(resolver.canonical_prefix("lge 어댑터"), None);
        assert_eq!(resolver.canonical_prefix("LG트롬 워시타워"), Some(("LG", 2)));
        assert_eq!(resolver.canonical_prefix("다이슨-V15"), Some(("다이슨", 3)));
        assert_eq!(resolver.resolve("브라운관 TV 수리", "수리왕"), "수리왕");
    }
}
