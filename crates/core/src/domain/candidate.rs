use serde::{Deserialize, Serialize};

use crate::domain::manufacturer::ManufacturerResolver;
use crate::errors::DomainError;

/// A product found during discovery. Immutable once constructed.
///
/// Deserialization goes through the validated constructor, so a decoded
/// selection result can never carry an empty name, a non-positive price or
/// a zero rank.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CandidateSnapshot")]
pub struct CandidateProduct {
    name: String,
    brand: String,
    category: String,
    product_code: String,
    price: i64,
    source_rank: u32,
    manufacturer: String,
}

impl CandidateProduct {
    /// Validated construction. `price` is integer KRW and must be positive,
    /// `source_rank` is the 1-based position in discovery results.
    pub fn new(
        name: impl Into<String>,
        brand: impl Into<String>,
        category: impl Into<String>,
        product_code: impl Into<String>,
        price: i64,
        source_rank: u32,
        resolver: &ManufacturerResolver,
    ) -> Result<Self, DomainError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::invalid("candidate", "name", "must not be empty"));
        }
        if price <= 0 {
            return Err(DomainError::invalid(
                format!("candidate `{name}`"),
                "price",
                format!("must be positive, got {price}"),
            ));
        }
        if source_rank == 0 {
            return Err(DomainError::invalid(
                format!("candidate `{name}`"),
                "rank",
                "is 1-based and must be at least 1",
            ));
        }

        let brand = brand.into().trim().to_string();
        let manufacturer = resolver.resolve(&name, &brand);

        Ok(Self {
            name,
            brand,
            category: category.into().trim().to_string(),
            product_code: product_code.into().trim().to_string(),
            price,
            source_rank,
            manufacturer,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn brand(&self) -> &str {
        &self.brand
    }

    pub fn product_code(&self) -> &str {
        &self.product_code
    }

    pub fn price(&self) -> i64 {
        self.price
    }

    pub fn source_rank(&self) -> u32 {
        self.source_rank
    }

    pub fn manufacturer(&self) -> &str {
        &self.manufacturer
    }
}

/// Wire shape of a serialized candidate.
#[derive(Deserialize)]
struct CandidateSnapshot {
    name: String,
    #[serde(default)]
    brand: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    product_code: String,
    price: i64,
    source_rank: u32,
    #[serde(default)]
    manufacturer: Option<String>,
}

impl TryFrom<CandidateSnapshot> for CandidateProduct {
    type Error = DomainError;

    fn try_from(snapshot: CandidateSnapshot) -> Result<Self, Self::Error> {
        let mut candidate = Self::new(
            snapshot.name,
            snapshot.brand,
            snapshot.category,
            snapshot.product_code,
            snapshot.price,
            snapshot.source_rank,
            &ManufacturerResolver::default(),
        )?;
        // A recorded manufacturer may come from configured aliases.
        if let Some(manufacturer) = snapshot.manufacturer {
            candidate.manufacturer = manufacturer.trim().to_string();
        }
        Ok(candidate)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::domain::candidate::CandidateProduct;
    use crate::domain::manufacturer::ManufacturerResolver;
    use crate::errors::DomainError;

    #[test]
    fn construction_resolves_manufacturer_and_trims_fields() {
        let resolver = ManufacturerResolver::default();
        let candidate = CandidateProduct::new(
            "  삼성전자 비스포크 AI 제트 ",
            "비스포크",
            "무선청소기",
            "VS20C",
            899_000,
            1,
            &resolver,
        )
        .expect("valid candidate");

        assert_eq!(candidate.name(), "삼성전자 비스포크 AI 제트");
        assert_eq!(candidate.brand(), "비스포크");
        assert_eq!(candidate.manufacturer(), "삼성");
        assert_eq!(candidate.source_rank(), 1);
    }

    #[test]
    fn rejects_non_positive_price() {
        let resolver = ManufacturerResolver::default();
        let error = CandidateProduct::new("제품", "브랜드", "c", "", 0, 1, &resolver)
            .expect_err("zero price must be rejected");

        assert!(matches!(error, DomainError::InvalidRecord { field: "price", .. }));
    }

    #[test]
    fn rejects_empty_name_and_zero_rank() {
        let resolver = ManufacturerResolver::default();

        assert!(CandidateProduct::new("  ", "b", "c", "", 1_000, 1, &resolver).is_err());
        assert!(CandidateProduct::new("제품", "b", "c", "", 1_000, 0, &resolver).is_err());
    }

    #[test]
    fn decoding_runs_the_same_validation() {
        let zero_rank = r#"{"name": "로보락 S8", "brand": "", "category": "c",
            "product_code": "", "price": 1000, "source_rank": 0, "manufacturer": "로보락"}"#;
        let blank_name = r#"{"name": " ", "price": 1000, "source_rank": 1}"#;
        let negative_price = r#"{"name": "로보락 S8", "price": -5, "source_rank": 1}"#;

        for json in [zero_rank, blank_name, negative_price] {
            assert!(serde_json::from_str::<CandidateProduct>(json).is_err(), "accepted {json}");
        }
    }

    #[test]
    fn decoding_keeps_the_recorded_manufacturer() {
        let mut extra = BTreeMap::new();
        extra.insert("트위버스".to_string(), vec!["tweeverse".to_string()]);
        let resolver = ManufacturerResolver::with_aliases(&extra);
        let candidate =
            CandidateProduct::new("Tweeverse T10", "", "로봇청소기", "T10", 1_200_000, 2, &resolver)
                .expect("valid candidate");

        let json = serde_json::to_string(&candidate).expect("serialize");
        let decoded: CandidateProduct = serde_json::from_str(&json).expect("decode");

        assert_eq!(decoded, candidate);
        assert_eq!(decoded.manufacturer(), "트위버스");
    }
}
