// ==========================================
// Shift Engine - Place Repository
// ==========================================

use crate::domain::place::Place;
use crate::domain::types::PlaceId;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

/// Manages the place table.
pub struct PlaceRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PlaceRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn find_by_id(&self, id: &PlaceId) -> RepositoryResult<Option<Place>> {
        let conn = self.get_conn()?;
        let place = conn
            .query_row(
                "SELECT place_id, name, capacity FROM place WHERE place_id = ?1",
                params![id.as_str()],
                |row| {
                    Ok(Place {
                        id: PlaceId::new(row.get::<_, String>(0)?),
                        name: row.get(1)?,
                        capacity: row.get::<_, Option<u32>>(2)?,
                    })
                },
            )
            .optional()?;
        Ok(place)
    }

    pub fn insert(&self, place: &Place) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO place (place_id, name, capacity) VALUES (?1, ?2, ?3)",
            params![place.id.as_str(), place.name, place.capacity],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_find() {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        let repo = PlaceRepository::from_connection(Arc::new(Mutex::new(conn)));

        repo.insert(&Place {
            id: PlaceId::new("station"),
            name: "Central Station".to_string(),
            capacity: Some(2),
        })
        .unwrap();

        let found = repo.find_by_id(&PlaceId::new("station")).unwrap().unwrap();
        assert_eq!(found.capacity, Some(2));
        assert!(repo.find_by_id(&PlaceId::new("missing")).unwrap().is_none());
    }
}
