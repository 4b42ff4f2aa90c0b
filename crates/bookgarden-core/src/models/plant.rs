use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── PlantStatus ────────────────────────────────────────────

/// Lifecycle state of a plant. Transitions only Growing → Harvested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlantStatus {
    #[default]
    Growing,
    Harvested,
}

impl std::fmt::Display for PlantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Growing => write!(f, "growing"),
            Self::Harvested => write!(f, "harvested"),
        }
    }
}

impl FromStr for PlantStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "growing" => Ok(Self::Growing),
            "harvested" => Ok(Self::Harvested),
            other => Err(format!("unknown plant status: {other}")),
        }
    }
}

// ─── GrowthStage ────────────────────────────────────────────

/// Discrete display bucket derived from the progress ratio.
///
/// `Empty` is a sentinel for "no plant in the pot" — it is never produced
/// by [`GrowthStage::from_progress`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrowthStage {
    Empty,
    Seed,
    Sprout,
    Growing,
    Flowering,
    Mature,
}

impl GrowthStage {
    /// Map a progress ratio in [0, 1] onto a stage.
    ///
    /// Boundaries are inclusive on the lower end: exactly 0.2 is Sprout,
    /// exactly 0.8 is Mature.
    pub fn from_progress(progress: f64) -> Self {
        if progress < 0.2 {
            Self::Seed
        } else if progress < 0.4 {
            Self::Sprout
        } else if progress < 0.6 {
            Self::Growing
        } else if progress < 0.8 {
            Self::Flowering
        } else {
            Self::Mature
        }
    }

    /// Terminal glyph used by the CLI pot display.
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Empty => "○",
            Self::Seed => "·",
            Self::Sprout => "🌱",
            Self::Growing => "🌿",
            Self::Flowering => "🌸",
            Self::Mature => "🌳",
        }
    }
}

impl std::fmt::Display for GrowthStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Empty => "empty",
            Self::Seed => "seed",
            Self::Sprout => "sprout",
            Self::Growing => "growing",
            Self::Flowering => "flowering",
            Self::Mature => "mature",
        };
        write!(f, "{s}")
    }
}

// ─── BookPlant ──────────────────────────────────────────────

/// A book being read, represented as a plant. The single growing plant is
/// the book currently in progress; harvested plants form the garden.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookPlant {
    pub id: Uuid,
    pub title: String,

    #[serde(default)]
    pub author: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,

    /// Fixed at planting time, never mutated afterwards.
    pub total_pages: u32,

    pub current_page: u32,

    pub status: PlantStatus,

    pub planted_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub harvested_at: Option<DateTime<Utc>>,
}

impl BookPlant {
    /// Plant a new book. Title and page count validation happens at the
    /// caller's submission boundary, not here.
    pub fn new(title: impl Into<String>, total_pages: u32) -> Self {
        Self {
            id: Uuid::now_v7(),
            title: title.into(),
            author: String::new(),
            cover_url: None,
            total_pages,
            current_page: 0,
            status: PlantStatus::Growing,
            planted_at: Utc::now(),
            harvested_at: None,
        }
    }

    // ─── Derived values ────────────────────────────────────

    /// Progress ratio in [0, 1]. Zero when total_pages is 0.
    pub fn progress(&self) -> f64 {
        if self.total_pages == 0 {
            return 0.0;
        }
        (f64::from(self.current_page) / f64::from(self.total_pages)).min(1.0)
    }

    /// Whole-percent progress, truncated.
    pub fn progress_percent(&self) -> u8 {
        (self.progress() * 100.0).floor() as u8
    }

    pub fn growth_stage(&self) -> GrowthStage {
        GrowthStage::from_progress(self.progress())
    }

    pub fn is_completed(&self) -> bool {
        self.current_page >= self.total_pages
    }

    pub fn pages_remaining(&self) -> u32 {
        self.total_pages.saturating_sub(self.current_page)
    }

    // ─── Mutations ─────────────────────────────────────────

    /// Move the bookmark. Out-of-range input is silently clamped into
    /// [0, total_pages]. Reaching the last page harvests the plant.
    pub fn update_progress(&mut self, page: i64) {
        self.current_page = page.clamp(0, i64::from(self.total_pages)) as u32;

        if self.is_completed() && self.status == PlantStatus::Growing {
            self.harvest();
        }
    }

    /// Complete the book: mark harvested, stamp the harvest time, and force
    /// the bookmark to the last page. A no-op on an already-harvested plant,
    /// so the harvest timestamp is never overwritten.
    pub fn harvest(&mut self) {
        if self.status == PlantStatus::Harvested {
            return;
        }
        self.status = PlantStatus::Harvested;
        self.harvested_at = Some(Utc::now());
        self.current_page = self.total_pages;
    }
}

// ─── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_plant_is_growing() {
        let plant = BookPlant::new("The Rust Programming Language", 300);
        assert_eq!(plant.title, "The Rust Programming Language");
        assert_eq!(plant.total_pages, 300);
        assert_eq!(plant.current_page, 0);
        assert_eq!(plant.status, PlantStatus::Growing);
        assert!(plant.harvested_at.is_none());
        assert_eq!(plant.growth_stage(), GrowthStage::Seed);
    }

    #[test]
    fn test_progress_and_percent() {
        let mut plant = BookPlant::new("Test", 300);
        plant.update_progress(135);
        assert!((plant.progress() - 0.45).abs() < 1e-9);
        assert_eq!(plant.progress_percent(), 45);
        assert_eq!(plant.growth_stage(), GrowthStage::Growing);
        assert_eq!(plant.status, PlantStatus::Growing);
        assert_eq!(plant.pages_remaining(), 165);
    }

    #[test]
    fn test_progress_percent_truncates() {
        let mut plant = BookPlant::new("Test", 3);
        plant.update_progress(1);
        // 1/3 = 0.333... → 33, not 34
        assert_eq!(plant.progress_percent(), 33);
    }

    #[test]
    fn test_progress_zero_total_pages() {
        let plant = BookPlant {
            total_pages: 0,
            ..BookPlant::new("Degenerate", 1)
        };
        assert_eq!(plant.progress(), 0.0);
        assert_eq!(plant.progress_percent(), 0);
    }

    #[test]
    fn test_stage_mapping_boundaries() {
        assert_eq!(GrowthStage::from_progress(0.0), GrowthStage::Seed);
        assert_eq!(GrowthStage::from_progress(0.19), GrowthStage::Seed);
        assert_eq!(GrowthStage::from_progress(0.2), GrowthStage::Sprout);
        assert_eq!(GrowthStage::from_progress(0.39), GrowthStage::Sprout);
        assert_eq!(GrowthStage::from_progress(0.4), GrowthStage::Growing);
        assert_eq!(GrowthStage::from_progress(0.6), GrowthStage::Flowering);
        assert_eq!(GrowthStage::from_progress(0.79), GrowthStage::Flowering);
        assert_eq!(GrowthStage::from_progress(0.8), GrowthStage::Mature);
        assert_eq!(GrowthStage::from_progress(1.0), GrowthStage::Mature);
    }

    #[test]
    fn test_update_progress_clamps_negative() {
        let mut plant = BookPlant::new("Test", 300);
        plant.update_progress(-5);
        assert_eq!(plant.current_page, 0);
        assert_eq!(plant.status, PlantStatus::Growing);
    }

    #[test]
    fn test_update_progress_clamps_overshoot_and_harvests() {
        let mut plant = BookPlant::new("Test", 300);
        plant.update_progress(9999);
        assert_eq!(plant.current_page, 300);
        assert_eq!(plant.status, PlantStatus::Harvested);
        assert!(plant.harvested_at.is_some());
        assert_eq!(plant.growth_stage(), GrowthStage::Mature);
    }

    #[test]
    fn test_reaching_last_page_harvests() {
        let mut plant = BookPlant::new("Test", 300);
        plant.update_progress(135);
        assert_eq!(plant.status, PlantStatus::Growing);

        plant.update_progress(300);
        assert_eq!(plant.status, PlantStatus::Harvested);
        assert!(plant.harvested_at.is_some());
        assert!(plant.is_completed());
    }

    #[test]
    fn test_harvest_forces_last_page() {
        let mut plant = BookPlant::new("Test", 300);
        plant.update_progress(42);
        plant.harvest();
        assert_eq!(plant.current_page, 300);
        assert_eq!(plant.status, PlantStatus::Harvested);
    }

    #[test]
    fn test_harvest_is_idempotent() {
        let mut plant = BookPlant::new("Test", 300);
        plant.harvest();
        let first = plant.harvested_at;
        assert!(first.is_some());

        plant.harvest();
        assert_eq!(plant.harvested_at, first);
    }

    #[test]
    fn test_status_string_roundtrip() {
        assert_eq!(PlantStatus::from_str("growing").unwrap(), PlantStatus::Growing);
        assert_eq!(PlantStatus::from_str("harvested").unwrap(), PlantStatus::Harvested);
        assert!(PlantStatus::from_str("wilted").is_err());
        assert_eq!(PlantStatus::Harvested.to_string(), "harvested");
    }

    #[test]
    fn test_plant_json_roundtrip() {
        let mut plant = BookPlant::new("Clean Code", 464);
        plant.author = "Robert C. Martin".to_string();
        plant.update_progress(100);

        let json = serde_json::to_string_pretty(&plant).unwrap();
        let restored: BookPlant = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.id, plant.id);
        assert_eq!(restored.title, "Clean Code");
        assert_eq!(restored.author, "Robert C. Martin");
        assert_eq!(restored.current_page, 100);
        assert_eq!(restored.status, PlantStatus::Growing);
    }
}
