pub mod candidate;
pub mod manufacturer;
pub mod metrics;
pub mod selection;
pub mod tco;
pub mod tier;
