use serde::{Deserialize, Serialize};

/// Aggregate garden counters for the stats card and CLI `stats` output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GardenStats {
    pub growing: usize,
    pub harvested: usize,
    pub harvested_this_year: usize,
    /// Sum of bookmarked pages across all plants, growing included.
    pub pages_read: u64,
}
