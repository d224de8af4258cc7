//! JSON input records and their validated conversion into domain types.
//!
//! Discovery and enrichment data arrives loosely typed: counts may be text
//! such as `"< 10"`, competition may be Korean, records may omit optional
//! fields. Everything is checked here so the pipeline only sees valid
//! domain values. A candidate without a positive price is set aside with a
//! warning; any other malformed record fails the whole document.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::candidate::CandidateProduct;
use crate::domain::manufacturer::ManufacturerResolver;
use crate::domain::metrics::{search_keyword, Competition, KeywordMetrics};
use crate::domain::tco::{ConsumableItem, CostEvidence, ExcludedProduct, ResaleEvidence};
use crate::errors::{ApplicationError, DomainError};
use crate::selection::{MentionSource, MetricsSource};
use crate::tco::CostSource;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub category: String,
    pub price: i64,
    #[serde(default)]
    pub product_code: String,
    #[serde(alias = "source_rank")]
    pub rank: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum CandidateDocument {
    Pool { category: String, candidates: Vec<CandidateRecord> },
    List(Vec<CandidateRecord>),
}

/// Monthly count reported either as a number or as text (`"< 10"`, `"1,200"`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricCount {
    Whole(u64),
    Fractional(f64),
    Text(String),
}

impl MetricCount {
    pub fn value(&self) -> Option<u64> {
        match self {
            Self::Whole(value) => Some(*value),
            Self::Fractional(value) if value.is_finite() && *value >= 0.0 => {
                Some(value.round() as u64)
            }
            Self::Fractional(_) => None,
            Self::Text(text) => {
                let digits: String = text
                    .chars()
                    .filter(|ch| !matches!(ch, '<' | '>' | ',' | '=' | '~') && !ch.is_whitespace())
                    .collect();
                digits.parse::<u64>().ok()
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeywordMetricsRecord {
    /// Product code, product name or search keyword.
    pub product: String,
    pub monthly_search_volume: MetricCount,
    pub monthly_clicks: MetricCount,
    pub avg_cpc: MetricCount,
    pub competition: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionRecord {
    pub product: String,
    pub mention_count: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumableRecord {
    pub name: String,
    #[serde(default)]
    pub unit_price: i64,
    #[serde(default)]
    pub changes_per_year: u32,
    #[serde(default)]
    pub annual_cost: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResaleRecord {
    #[serde(default)]
    pub value: Option<i64>,
    #[serde(default)]
    pub sample_count: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostRecord {
    pub product: String,
    #[serde(default)]
    pub purchase_price: Option<i64>,
    #[serde(default)]
    pub price_confirmed: bool,
    #[serde(default)]
    pub annual_recurring_cost: Option<i64>,
    #[serde(default)]
    pub consumables: Vec<ConsumableRecord>,
    #[serde(default)]
    pub annual_repair_cost: Option<i64>,
    #[serde(default)]
    pub resale: Option<ResaleRecord>,
    #[serde(default)]
    pub notes: String,
}

/// Validated candidates of one category, plus the ones set aside for
/// having no usable price.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidatePool {
    pub category: String,
    pub candidates: Vec<CandidateProduct>,
    pub excluded: Vec<ExcludedProduct>,
}

impl CandidateRecord {
    pub fn into_candidate(
        self,
        resolver: &ManufacturerResolver,
    ) -> Result<CandidateProduct, DomainError> {
        CandidateProduct::new(
            self.name,
            self.brand,
            self.category,
            self.product_code,
            self.price,
            self.rank,
            resolver,
        )
    }
}

impl KeywordMetricsRecord {
    pub fn into_metrics(self) -> Result<(String, KeywordMetrics), DomainError> {
        let record = format!("keyword metrics `{}`", self.product);
        let count = |value: &MetricCount, field: &'static str| {
            value.value().ok_or_else(|| {
                DomainError::invalid(record.clone(), field, format!("is not a count: {value:?}"))
            })
        };

        let metrics = KeywordMetrics {
            monthly_search_volume: count(&self.monthly_search_volume, "monthly_search_volume")?,
            monthly_clicks: count(&self.monthly_clicks, "monthly_clicks")?,
            avg_cpc: count(&self.avg_cpc, "avg_cpc")?,
            competition: self
                .competition
                .parse::<Competition>()
                .map_err(|message| DomainError::invalid(record.clone(), "competition", message))?,
        };
        Ok((self.product.trim().to_string(), metrics))
    }
}

impl CostRecord {
    pub fn into_evidence(self) -> Result<(String, CostEvidence), DomainError> {
        let record = format!("cost `{}`", self.product);
        let non_negative = |value: Option<i64>, field: &'static str| match value {
            Some(amount) if amount < 0 => {
                Err(DomainError::invalid(record.clone(), field, "must not be negative"))
            }
            _ => Ok(value),
        };

        let purchase_price = non_negative(self.purchase_price, "purchase_price")?;
        let annual_recurring_cost =
            non_negative(self.annual_recurring_cost, "annual_recurring_cost")?;
        let annual_repair_cost = non_negative(self.annual_repair_cost, "annual_repair_cost")?;
        let resale = match self.resale {
            Some(resale) => Some(ResaleEvidence {
                value: non_negative(resale.value, "resale.value")?,
                sample_count: resale.sample_count,
            }),
            None => None,
        };

        let mut consumables = Vec::with_capacity(self.consumables.len());
        for item in self.consumables {
            if item.unit_price < 0 || item.annual_cost < 0 {
                return Err(DomainError::invalid(
                    record.clone(),
                    "consumables",
                    format!("`{}` has a negative price", item.name),
                ));
            }
            consumables.push(ConsumableItem {
                name: item.name,
                unit_price: item.unit_price,
                changes_per_year: item.changes_per_year,
                annual_cost: item.annual_cost,
            });
        }

        Ok((
            self.product.trim().to_string(),
            CostEvidence {
                purchase_price,
                price_confirmed: self.price_confirmed,
                annual_recurring_cost,
                consumables,
                annual_repair_cost,
                resale,
                notes: self.notes,
            },
        ))
    }
}

/// Lookup keyed by product code, product name or search keyword, tried in
/// that order.
#[derive(Clone, Debug)]
struct ProductIndex<T> {
    entries: BTreeMap<String, T>,
    resolver: ManufacturerResolver,
}

impl<T: Clone> ProductIndex<T> {
    fn new(resolver: &ManufacturerResolver) -> Self {
        Self { entries: BTreeMap::new(), resolver: resolver.clone() }
    }

    fn insert(&mut self, key: String, value: T) {
        let keyword = search_keyword(&key, &self.resolver);
        if !keyword.is_empty() {
            self.entries.entry(keyword).or_insert_with(|| value.clone());
        }
        self.entries.insert(key, value);
    }

    fn lookup(&self, candidate: &CandidateProduct) -> Option<&T> {
        let code = candidate.product_code();
        if !code.is_empty() {
            if let Some(value) = self.entries.get(code) {
                return Some(value);
            }
        }
        self.entries
            .get(candidate.name())
            .or_else(|| self.entries.get(&search_keyword(candidate.name(), &self.resolver)))
    }
}

#[derive(Clone, Debug)]
pub struct MetricsTable {
    index: ProductIndex<KeywordMetrics>,
}

impl MetricsTable {
    pub fn new(
        records: Vec<KeywordMetricsRecord>,
        resolver: &ManufacturerResolver,
    ) -> Result<Self, DomainError> {
        let mut index = ProductIndex::new(resolver);
        for record in records {
            let (key, metrics) = record.into_metrics()?;
            index.insert(key, metrics);
        }
        Ok(Self { index })
    }
}

impl MetricsSource for MetricsTable {
    fn metrics_for(&self, candidate: &CandidateProduct) -> Option<KeywordMetrics> {
        self.index.lookup(candidate).copied()
    }
}

#[derive(Clone, Debug)]
pub struct MentionTable {
    index: ProductIndex<u32>,
}

impl MentionTable {
    pub fn new(records: Vec<MentionRecord>, resolver: &ManufacturerResolver) -> Self {
        let mut index = ProductIndex::new(resolver);
        for record in records {
            index.insert(record.product.trim().to_string(), record.mention_count);
        }
        Self { index }
    }
}

impl MentionSource for MentionTable {
    fn mentions_for(&self, candidate: &CandidateProduct) -> u32 {
        self.index.lookup(candidate).copied().unwrap_or(0)
    }
}

#[derive(Clone, Debug)]
pub struct CostTable {
    index: ProductIndex<CostEvidence>,
}

impl CostTable {
    pub fn new(
        records: Vec<CostRecord>,
        resolver: &ManufacturerResolver,
    ) -> Result<Self, DomainError> {
        let mut index = ProductIndex::new(resolver);
        for record in records {
            let (key, evidence) = record.into_evidence()?;
            index.insert(key, evidence);
        }
        Ok(Self { index })
    }
}

impl CostSource for CostTable {
    fn evidence_for(&self, candidate: &CandidateProduct) -> Option<CostEvidence> {
        self.index.lookup(candidate).cloned()
    }
}

/// Decode a JSON document, reporting `source` on failure.
pub fn decode<T: DeserializeOwned>(source: &str, json: &str) -> Result<T, ApplicationError> {
    serde_json::from_str(json).map_err(|error| ApplicationError::Serialization {
        path: source.to_string(),
        message: error.to_string(),
    })
}

/// Candidate pool from either `{category, candidates: [...]}` or a bare array.
/// A bare array takes its category from the first record.
pub fn parse_candidates(
    source: &str,
    json: &str,
    resolver: &ManufacturerResolver,
) -> Result<CandidatePool, ApplicationError> {
    let (category, records) = match decode::<CandidateDocument>(source, json)? {
        CandidateDocument::Pool { category, candidates } => (category, candidates),
        CandidateDocument::List(records) => {
            let category =
                records.first().map(|record| record.category.clone()).unwrap_or_default();
            (category, records)
        }
    };

    let mut candidates = Vec::with_capacity(records.len());
    let mut excluded = Vec::new();
    for record in records {
        if record.price <= 0 {
            let name = record.name.trim().to_string();
            warn!(
                event_name = "selection.candidate.excluded",
                source,
                candidate = name.as_str(),
                price = record.price,
                "candidate without a positive price left out of the pool"
            );
            excluded.push(ExcludedProduct {
                name,
                reason: format!("price must be positive, got {}", record.price),
            });
            continue;
        }
        candidates.push(record.into_candidate(resolver)?);
    }

    Ok(CandidatePool { category: category.trim().to_string(), candidates, excluded })
}

pub fn parse_metrics(
    source: &str,
    json: &str,
    resolver: &ManufacturerResolver,
) -> Result<MetricsTable, ApplicationError> {
    let records: Vec<KeywordMetricsRecord> = decode(source, json)?;
    Ok(MetricsTable::new(records, resolver)?)
}

pub fn parse_mentions(
    source: &str,
    json: &str,
    resolver: &ManufacturerResolver,
) -> Result<MentionTable, ApplicationError> {
    let records: Vec<MentionRecord> = decode(source, json)?;
    Ok(MentionTable::new(records, resolver))
}

pub fn parse_costs(
    source: &str,
    json: &str,
    resolver: &ManufacturerResolver,
) -> Result<CostTable, ApplicationError> {
    let records: Vec<CostRecord> = decode(source, json)?;
    Ok(CostTable::new(records, resolver)?)
}
