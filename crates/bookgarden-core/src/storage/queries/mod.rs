mod stats;

pub use stats::GardenStatsQuery;
