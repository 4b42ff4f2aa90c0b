use std::sync::MutexGuard;

use rusqlite::Connection;

use crate::error::Result;
use crate::models::GardenStats;

pub struct GardenStatsQuery<'a> {
    conn: MutexGuard<'a, Connection>,
}

impl<'a> GardenStatsQuery<'a> {
    pub fn new(conn: MutexGuard<'a, Connection>) -> Self {
        Self { conn }
    }

    pub fn get_stats(&self, year: i32) -> Result<GardenStats> {
        let growing: usize = self.conn.query_row(
            "SELECT COUNT(*) FROM plants WHERE status = 'growing'",
            [],
            |row| row.get::<_, i64>(0).map(|n| n as usize),
        )?;

        let harvested: usize = self.conn.query_row(
            "SELECT COUNT(*) FROM plants WHERE status = 'harvested'",
            [],
            |row| row.get::<_, i64>(0).map(|n| n as usize),
        )?;

        let harvested_this_year = self.count_harvested_in_year(year)?;

        let pages_read: u64 = self.conn.query_row(
            "SELECT COALESCE(SUM(current_page), 0) FROM plants",
            [],
            |row| row.get::<_, i64>(0).map(|n| n as u64),
        )?;

        Ok(GardenStats {
            growing,
            harvested,
            harvested_this_year,
            pages_read,
        })
    }

    /// Harvest count within one calendar year, for goal tracking.
    pub fn count_harvested_in_year(&self, year: i32) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM plants
             WHERE status = 'harvested'
               AND CAST(strftime('%Y', harvested_at) AS INTEGER) = ?1",
            rusqlite::params![year],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
