use crate::db::{Database, KeyValueStore};
use crate::error::Result;
use rusqlite::params;

/// Key the saved location lives under.
pub const ZIP_CODE_KEY: &str = "zip_code";

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT value FROM settings WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM settings WHERE key = ?1", [key])?;
            Ok(())
        })
    }
}

trait OptionalExt<T> {
    fn optional(self) -> rusqlite::Result<Option<T>>;
}

impl<T> OptionalExt<T> for rusqlite::Result<T> {
    fn optional(self) -> rusqlite::Result<Option<T>> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_missing_key_is_none() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get("rules").unwrap(), None);
    }

    #[test]
    fn set_then_get_round_trips() {
        let db = Database::open_in_memory().unwrap();
        db.set(ZIP_CODE_KEY, "02134").unwrap();
        assert_eq!(db.get(ZIP_CODE_KEY).unwrap(), Some("02134".to_string()));
    }

    #[test]
    fn set_overwrites_existing_value() {
        let db = Database::open_in_memory().unwrap();
        db.set(ZIP_CODE_KEY, "02134").unwrap();
        db.set(ZIP_CODE_KEY, "19380").unwrap();
        assert_eq!(db.get(ZIP_CODE_KEY).unwrap(), Some("19380".to_string()));
    }

    #[test]
    fn remove_deletes_the_key() {
        let db = Database::open_in_memory().unwrap();
        db.set(ZIP_CODE_KEY, "02134").unwrap();
        db.remove(ZIP_CODE_KEY).unwrap();
        assert_eq!(db.get(ZIP_CODE_KEY).unwrap(), None);
        // Removing an absent key is not an error
        db.remove(ZIP_CODE_KEY).unwrap();
    }
}
