use crate::models::{ListingRecord, Platform};
use clap::ValueEnum;
use std::collections::HashSet;

/// What makes two records the same listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DedupMode {
    /// Same URL on the same platform
    #[default]
    PerSource,
    /// Same URL, whatever the platform
    Global,
}

impl DedupMode {
    fn key(&self, record: &ListingRecord) -> (String, Option<Platform>) {
        match self {
            DedupMode::PerSource => (record.url.clone(), Some(record.platform)),
            DedupMode::Global => (record.url.clone(), None),
        }
    }
}

/// Drop later records whose key was already seen; first occurrence order is kept
pub fn dedupe(records: Vec<ListingRecord>, mode: DedupMode) -> Vec<ListingRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|record| seen.insert(mode.key(record)))
        .collect()
}
