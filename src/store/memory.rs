use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

use axum::async_trait;
use time::{macros::format_description, OffsetDateTime};

use super::{NewUser, RecordStore, TableInfo, UserRecord, UserRow};
use crate::error::RegistryError;

/// In-process `usuarios` table.
///
/// Timestamps are stored as text in the same shape PostgREST returns, so
/// reads go through the same conversion as the real backends.
#[derive(Default)]
pub struct MemoryRecordStore {
    rows: Mutex<Vec<UserRow>>,
    offline: AtomicBool,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<UserRow>) -> Self {
        Self {
            rows: Mutex::new(rows),
            offline: AtomicBool::new(false),
        }
    }

    /// Make every operation behave as if the backend were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.rows.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_online(&self) -> Result<(), RegistryError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RegistryError::unavailable("in-memory backend is offline"));
        }
        Ok(())
    }

    fn sorted(&self) -> Result<Vec<UserRow>, RegistryError> {
        let mut rows = self
            .rows
            .lock()
            .map_err(RegistryError::unavailable)?
            .clone();
        rows.sort_by(|a, b| {
            b.fecha_registro
                .cmp(&a.fecha_registro)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(rows)
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert(&self, user: &NewUser) -> Result<i64, RegistryError> {
        self.ensure_online()?;
        let now = OffsetDateTime::now_utc()
            .format(format_description!(
                "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]"
            ))
            .map_err(RegistryError::rejected)?;

        let mut rows = self.rows.lock().map_err(RegistryError::unavailable)?;
        let id = rows.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        rows.push(UserRow {
            id,
            nombre: user.name.clone(),
            telefono: user.phone.clone(),
            pais: user.country.clone(),
            fecha_registro: Some(now),
        });
        Ok(id)
    }

    async fn list_all(&self) -> Result<Vec<UserRecord>, RegistryError> {
        self.ensure_online()?;
        Ok(self.sorted()?.into_iter().map(UserRecord::from).collect())
    }

    async fn check_connectivity(&self) -> bool {
        self.ensure_online().is_ok()
    }

    async fn table_info(&self) -> Result<TableInfo, RegistryError> {
        self.ensure_online()?;
        let rows = self.sorted()?;
        Ok(TableInfo {
            count: rows.len() as i64,
            sample: rows.into_iter().next().map(UserRecord::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::timestamp::RegisteredAt;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            name: name.into(),
            phone: "+34 600 000 000".into(),
            country: "España".into(),
        }
    }

    fn row(id: i64, at: &str) -> UserRow {
        UserRow {
            id,
            nombre: format!("user-{id}"),
            telefono: "1".into(),
            pais: "Chile".into(),
            fecha_registro: Some(at.into()),
        }
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let store = MemoryRecordStore::new();
        let a = store.insert(&new_user("Ana")).await.unwrap();
        let b = store.insert(&new_user("Bruno")).await.unwrap();
        assert!(b > a);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = MemoryRecordStore::with_rows(vec![
            row(1, "2025-01-01T10:00:00.000001"),
            row(2, "2025-03-01T10:00:00.000001"),
            row(3, "2025-02-01T10:00:00.000001"),
        ]);
        let ids: Vec<i64> = store.list_all().await.unwrap().iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn inserted_record_is_listed_verbatim() {
        let store = MemoryRecordStore::new();
        let id = store.insert(&new_user("  María José ")).await.unwrap();
        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, id);
        assert_eq!(all[0].name, "  María José ");
        assert_eq!(all[0].country, "España");
        assert!(matches!(all[0].registered_at, Some(RegisteredAt::Parsed(_))));
    }

    #[tokio::test]
    async fn offline_store_reports_unavailable() {
        let store = MemoryRecordStore::new();
        store.set_offline(true);
        assert!(!store.check_connectivity().await);
        assert!(matches!(
            store.insert(&new_user("Ana")).await,
            Err(RegistryError::BackendUnavailable(_))
        ));
        assert!(store.list_all().await.is_err());

        store.set_offline(false);
        assert!(store.check_connectivity().await);
    }

    #[tokio::test]
    async fn table_info_counts_rows() {
        let store = MemoryRecordStore::with_rows(vec![
            row(1, "2025-01-01T10:00:00.000001"),
            row(2, "2025-03-01T10:00:00.000001"),
        ]);
        let info = store.table_info().await.unwrap();
        assert_eq!(info.count, 2);
        assert_eq!(info.sample.map(|u| u.id), Some(2));
    }
}
