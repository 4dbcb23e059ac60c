//! Policy domain model.
//!
//! The canonical record every source normalizes into, plus the parsers and
//! classifiers that fill its derived fields: period window, freshness
//! status, and category labels.

pub mod category;
pub mod expiry;
pub mod extract;
pub mod period;
pub mod record;

pub use category::{Category, ALL_CATEGORIES};
pub use expiry::Expiry;
pub use period::ParsedPeriod;
pub use record::{
    normalize_region_name, policy_id, ApplyChannel, ApplyMethod, Benefit, Eligibility,
    PolicyRecord, PolicyStatus, UserContext, REGION_NATIONAL, REGION_WIDE,
};
