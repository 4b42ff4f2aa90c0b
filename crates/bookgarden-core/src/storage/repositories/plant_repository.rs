use std::str::FromStr;
use std::sync::MutexGuard;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use uuid::Uuid;

use crate::error::{GardenError, Result};
use crate::models::{BookPlant, PlantStatus};

use super::Repository;

const PLANT_COLUMNS: &str =
    "id, title, author, cover_url, total_pages, current_page, status, planted_at, harvested_at";

pub trait PlantRepository: Repository<Entity = BookPlant, Id = Uuid> {
    /// The plant currently being read, if any. At most one exists.
    fn find_growing(&self) -> Result<Option<BookPlant>>;

    /// Harvested plants, newest harvest first — the garden feed.
    fn list_harvested(&self, limit: usize) -> Result<Vec<BookPlant>>;

    fn list(&self, limit: usize, offset: usize) -> Result<Vec<BookPlant>>;
    fn count(&self) -> Result<usize>;
    fn count_by_status(&self, status: PlantStatus) -> Result<usize>;
}

pub struct SqlitePlantRepository<'a> {
    conn: MutexGuard<'a, Connection>,
}

impl<'a> SqlitePlantRepository<'a> {
    pub fn new(conn: MutexGuard<'a, Connection>) -> Self {
        Self { conn }
    }

    fn row_to_plant(row: &rusqlite::Row) -> rusqlite::Result<BookPlant> {
        let status_str: String = row.get(6)?;
        let planted_raw: String = row.get(7)?;
        let harvested_raw: Option<String> = row.get(8)?;

        let harvested_at = match harvested_raw {
            Some(raw) => Some(parse_timestamp(8, &raw)?),
            None => None,
        };

        Ok(BookPlant {
            id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
            title: row.get(1)?,
            author: row.get(2)?,
            cover_url: row.get(3)?,
            total_pages: row.get(4)?,
            current_page: row.get(5)?,
            status: PlantStatus::from_str(&status_str).unwrap_or_default(),
            planted_at: parse_timestamp(7, &planted_raw)?,
            harvested_at,
        })
    }
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

impl<'a> Repository for SqlitePlantRepository<'a> {
    type Entity = BookPlant;
    type Id = Uuid;

    fn find_by_id(&self, id: &Self::Id) -> Result<Option<Self::Entity>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {PLANT_COLUMNS} FROM plants WHERE id = ?1"))?;

        match stmt.query_row(params![id.to_string()], Self::row_to_plant) {
            Ok(plant) => Ok(Some(plant)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(GardenError::Database(e)),
        }
    }

    fn save(&self, plant: &Self::Entity) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO plants
                (id, title, author, cover_url, total_pages, current_page,
                 status, planted_at, harvested_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                plant.id.to_string(),
                plant.title,
                plant.author,
                plant.cover_url,
                plant.total_pages,
                plant.current_page,
                plant.status.to_string(),
                plant.planted_at.to_rfc3339(),
                plant.harvested_at.map(|d| d.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    fn delete(&self, id: &Self::Id) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM plants WHERE id = ?1", params![id.to_string()])?;
        Ok(deleted > 0)
    }
}

impl<'a> PlantRepository for SqlitePlantRepository<'a> {
    fn find_growing(&self) -> Result<Option<BookPlant>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PLANT_COLUMNS} FROM plants
             WHERE status = 'growing'
             ORDER BY planted_at DESC LIMIT 1"
        ))?;

        match stmt.query_row([], Self::row_to_plant) {
            Ok(plant) => Ok(Some(plant)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(GardenError::Database(e)),
        }
    }

    fn list_harvested(&self, limit: usize) -> Result<Vec<BookPlant>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PLANT_COLUMNS} FROM plants
             WHERE status = 'harvested'
             ORDER BY harvested_at DESC LIMIT ?1"
        ))?;

        let rows = stmt
            .query_map(params![limit as i64], Self::row_to_plant)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn list(&self, limit: usize, offset: usize) -> Result<Vec<BookPlant>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PLANT_COLUMNS} FROM plants
             ORDER BY planted_at DESC LIMIT ?1 OFFSET ?2"
        ))?;

        let rows = stmt
            .query_map(params![limit as i64, offset as i64], Self::row_to_plant)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM plants", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn count_by_status(&self, status: PlantStatus) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM plants WHERE status = ?1",
            params![status.to_string()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::database::open_in_memory;
    use chrono::TimeZone;

    fn harvested(title: &str, year: i32, month: u32) -> BookPlant {
        let mut plant = BookPlant::new(title, 100);
        plant.harvest();
        plant.harvested_at = Some(Utc.with_ymd_and_hms(year, month, 1, 12, 0, 0).unwrap());
        plant
    }

    #[test]
    fn test_save_and_find_roundtrip() {
        let pool = open_in_memory().unwrap();
        let mut plant = BookPlant::new("Refactoring", 448);
        plant.author = "Martin Fowler".to_string();
        plant.cover_url = Some("https://example.com/cover.jpg".to_string());
        plant.update_progress(120);

        let repo = SqlitePlantRepository::new(pool.get_connection());
        repo.save(&plant).unwrap();

        let found = repo.find_by_id(&plant.id).unwrap().unwrap();
        assert_eq!(found.id, plant.id);
        assert_eq!(found.title, "Refactoring");
        assert_eq!(found.author, "Martin Fowler");
        assert_eq!(found.cover_url.as_deref(), Some("https://example.com/cover.jpg"));
        assert_eq!(found.total_pages, 448);
        assert_eq!(found.current_page, 120);
        assert_eq!(found.status, PlantStatus::Growing);
        assert_eq!(found.planted_at, plant.planted_at);
        assert!(found.harvested_at.is_none());
    }

    #[test]
    fn test_find_by_id_missing_returns_none() {
        let pool = open_in_memory().unwrap();
        let repo = SqlitePlantRepository::new(pool.get_connection());
        assert!(repo.find_by_id(&Uuid::now_v7()).unwrap().is_none());
    }

    #[test]
    fn test_find_growing() {
        let pool = open_in_memory().unwrap();
        let repo = SqlitePlantRepository::new(pool.get_connection());
        assert!(repo.find_growing().unwrap().is_none());

        repo.save(&harvested("Done", 2025, 3)).unwrap();
        let growing = BookPlant::new("In Progress", 200);
        repo.save(&growing).unwrap();

        let found = repo.find_growing().unwrap().unwrap();
        assert_eq!(found.id, growing.id);
    }

    #[test]
    fn test_list_harvested_orders_newest_first() {
        let pool = open_in_memory().unwrap();
        let repo = SqlitePlantRepository::new(pool.get_connection());

        repo.save(&harvested("Oldest", 2024, 1)).unwrap();
        repo.save(&harvested("Newest", 2025, 6)).unwrap();
        repo.save(&harvested("Middle", 2024, 9)).unwrap();

        let garden = repo.list_harvested(10).unwrap();
        let titles: Vec<&str> = garden.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Newest", "Middle", "Oldest"]);
    }

    #[test]
    fn test_count_by_status() {
        let pool = open_in_memory().unwrap();
        let repo = SqlitePlantRepository::new(pool.get_connection());

        repo.save(&BookPlant::new("Growing", 100)).unwrap();
        repo.save(&harvested("Harvested A", 2025, 2)).unwrap();
        repo.save(&harvested("Harvested B", 2025, 4)).unwrap();

        assert_eq!(repo.count().unwrap(), 3);
        assert_eq!(repo.count_by_status(PlantStatus::Growing).unwrap(), 1);
        assert_eq!(repo.count_by_status(PlantStatus::Harvested).unwrap(), 2);
    }

    #[test]
    fn test_delete() {
        let pool = open_in_memory().unwrap();
        let repo = SqlitePlantRepository::new(pool.get_connection());

        let plant = BookPlant::new("Short-lived", 50);
        repo.save(&plant).unwrap();
        assert!(repo.delete(&plant.id).unwrap());
        assert!(!repo.delete(&plant.id).unwrap());
        assert!(repo.find_by_id(&plant.id).unwrap().is_none());
    }
}
