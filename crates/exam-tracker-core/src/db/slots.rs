//! Key-value slot operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};

impl Database {
    /// Read the raw payload stored under `key`.
    pub fn get_slot(&self, key: &str) -> DbResult<Option<String>> {
        self.conn
            .query_row("SELECT value FROM kv_slots WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(Into::into)
    }

    /// Replace the payload stored under `key`.
    pub fn put_slot(&self, key: &str, value: &str) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO kv_slots (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_slot() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get_slot("medical_exams_data").unwrap(), None);
    }

    #[test]
    fn test_put_overwrites() {
        let db = Database::open_in_memory().unwrap();
        db.put_slot("k", "[1]").unwrap();
        db.put_slot("k", "[1,2]").unwrap();
        assert_eq!(db.get_slot("k").unwrap(), Some("[1,2]".to_string()));
    }
}
