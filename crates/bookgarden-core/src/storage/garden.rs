use std::path::Path;

use uuid::Uuid;

use crate::error::{GardenError, Result};
use crate::models::{BookPlant, GardenStats, PlantStatus};
use crate::storage::database::{ConnectionPool, open_database, open_in_memory};
use crate::storage::queries::GardenStatsQuery;
use crate::storage::repositories::{PlantRepository, Repository, SqlitePlantRepository};

/// High-level facade over the plant store. One instance per process is
/// enough; all methods take `&self`.
pub struct Garden {
    pool: ConnectionPool,
}

impl Garden {
    pub fn open(path: &Path) -> Result<Self> {
        let pool = open_database(path)?;
        Ok(Self { pool })
    }

    pub fn open_in_memory() -> Result<Self> {
        let pool = open_in_memory()?;
        Ok(Self { pool })
    }

    // ─── Planting ──────────────────────────────────────────

    /// Persist a plant. Planting a growing book while another is already
    /// growing is rejected — one pot, one book.
    pub fn plant(&self, plant: &BookPlant) -> Result<()> {
        let conn = self.pool.get_connection();
        let repo = SqlitePlantRepository::new(conn);

        if plant.status == PlantStatus::Growing {
            if let Some(existing) = repo.find_growing()? {
                if existing.id != plant.id {
                    return Err(GardenError::AlreadyGrowing(existing.title));
                }
            }
        }

        repo.save(plant)
    }

    pub fn get_plant(&self, id: &str) -> Result<BookPlant> {
        let uuid =
            Uuid::parse_str(id).map_err(|_| GardenError::PlantNotFound(id.to_string()))?;
        let conn = self.pool.get_connection();
        let repo = SqlitePlantRepository::new(conn);
        repo.find_by_id(&uuid)?
            .ok_or_else(|| GardenError::PlantNotFound(id.to_string()))
    }

    /// The book currently being read, if any.
    pub fn current_plant(&self) -> Result<Option<BookPlant>> {
        let conn = self.pool.get_connection();
        let repo = SqlitePlantRepository::new(conn);
        repo.find_growing()
    }

    // ─── Progress ──────────────────────────────────────────

    /// Water the growing plant: move its bookmark to `page` and persist.
    /// Reaching the last page harvests it in the same write.
    pub fn water(&self, page: i64) -> Result<BookPlant> {
        let conn = self.pool.get_connection();
        let repo = SqlitePlantRepository::new(conn);

        let mut plant = repo.find_growing()?.ok_or(GardenError::NoGrowingPlant)?;
        plant.update_progress(page);
        repo.save(&plant)?;
        Ok(plant)
    }

    /// Harvest the growing plant regardless of its bookmark position.
    pub fn harvest(&self) -> Result<BookPlant> {
        let conn = self.pool.get_connection();
        let repo = SqlitePlantRepository::new(conn);

        let mut plant = repo.find_growing()?.ok_or(GardenError::NoGrowingPlant)?;
        plant.harvest();
        repo.save(&plant)?;
        Ok(plant)
    }

    // ─── Garden feed ───────────────────────────────────────

    pub fn list_harvested(&self, limit: usize) -> Result<Vec<BookPlant>> {
        let conn = self.pool.get_connection();
        let repo = SqlitePlantRepository::new(conn);
        repo.list_harvested(limit)
    }

    pub fn list_plants(&self, limit: usize, offset: usize) -> Result<Vec<BookPlant>> {
        let conn = self.pool.get_connection();
        let repo = SqlitePlantRepository::new(conn);
        repo.list(limit, offset)
    }

    pub fn count_plants(&self) -> Result<usize> {
        let conn = self.pool.get_connection();
        let repo = SqlitePlantRepository::new(conn);
        repo.count()
    }

    pub fn stats(&self, year: i32) -> Result<GardenStats> {
        let conn = self.pool.get_connection();
        let query = GardenStatsQuery::new(conn);
        query.get_stats(year)
    }
}

// ─── Tests ──────────────────────────────────────────────────
