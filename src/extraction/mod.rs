pub mod address;
pub mod convention;
pub mod field;
pub mod normalizer;

pub use address::{AddressResolver, CityPolicy};
pub use convention::{ConventionError, DetailFields, FieldChain, LabelPair, LabelRule, SelectorChain, SiteConvention};
pub use field::FallbackChain;
pub use normalizer::{Fragment, ListingNormalizer};
