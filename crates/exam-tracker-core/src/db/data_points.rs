//! Dashboard data-point operations.

use rusqlite::params;

use super::{Database, DbResult};
use crate::models::{seed_data_points, DataPoint, InsertDataPoint};

impl Database {
    /// List all data points in insertion order.
    pub fn list_data_points(&self) -> DbResult<Vec<DataPoint>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, label, value FROM data_points ORDER BY id")?;

        let rows = stmt.query_map([], |row| {
            Ok(DataPoint {
                id: row.get(0)?,
                label: row.get(1)?,
                value: row.get(2)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Insert a data point and return the stored row.
    pub fn create_data_point(&self, input: &InsertDataPoint) -> DbResult<DataPoint> {
        self.conn.execute(
            "INSERT INTO data_points (label, value) VALUES (?1, ?2)",
            params![input.label, input.value],
        )?;

        Ok(DataPoint {
            id: self.conn.last_insert_rowid(),
            label: input.label.clone(),
            value: input.value,
        })
    }

    /// Number of stored data points.
    pub fn count_data_points(&self) -> DbResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM data_points", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Insert the sample months when the table is empty.
    ///
    /// Returns the number of rows inserted.
    pub fn seed_data_points_if_empty(&self) -> DbResult<usize> {
        if self.count_data_points()? > 0 {
            return Ok(0);
        }

        let seed = seed_data_points();
        for point in &seed {
            self.create_data_point(point)?;
        }
        tracing::info!(count = seed.len(), "seeded empty data_points table");
        Ok(seed.len())
    }
}
