//! Persistence for product records.
//!
//! Two interchangeable stores share one trait: [`OrmStore`] goes through the
//! sea-orm entity API and [`SqlStore`] issues hand-written parameterized SQL
//! (the embedded SQLite setup). Both expect the `products` table created by
//! the `migration` crate.

mod orm;
mod sql;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sea_orm::{DatabaseConnection, DbErr};
use thiserror::Error;

use crate::config::StorageBackend;
use crate::entities::product;

pub use orm::OrmStore;
pub use sql::SqlStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("insert returned no row")]
    MissingInsertResult,
}

/// A product about to be inserted; `id` is assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub image_filename: String,
    pub name: String,
    pub category: String,
    pub size: String,
    pub price: f64,
    pub is_new_arrival: bool,
    pub created_at: NaiveDateTime,
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn insert(&self, product: NewProduct) -> Result<product::Model, StoreError>;

    async fn get(&self, id: i32) -> Result<Option<product::Model>, StoreError>;

    /// Returns `false` when no row had that id.
    async fn delete(&self, id: i32) -> Result<bool, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;

    async fn count_new_arrivals(&self) -> Result<u64, StoreError>;

    /// Newest first (`created_at` desc, then `id` desc).
    async fn list_recent(&self, limit: Option<u64>) -> Result<Vec<product::Model>, StoreError>;
}

/// Build the store selected by configuration over a shared connection.
pub fn connect_store(backend: StorageBackend, db: DatabaseConnection) -> Arc<dyn ProductStore> {
    match backend {
        StorageBackend::Orm => Arc::new(OrmStore::new(db)),
        StorageBackend::Sql => Arc::new(SqlStore::new(db)),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn sample(name: &str, created_at: NaiveDateTime, is_new_arrival: bool) -> NewProduct {
        NewProduct {
            image_filename: format!("20250101000000000000_{name}.jpg"),
            name: name.to_string(),
            category: "Kurti".to_string(),
            size: "M".to_string(),
            price: 999.0,
            is_new_arrival,
            created_at,
        }
    }

    async fn stores() -> Vec<(&'static str, Arc<dyn ProductStore>)> {
        vec![
            ("orm", connect_store(StorageBackend::Orm, testing::memory_db().await)),
            ("sql", connect_store(StorageBackend::Sql, testing::memory_db().await)),
        ]
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_round_trips() {
        for (label, store) in stores().await {
            let now = Utc::now().naive_utc();
            let created = store.insert(sample("Red Kurti", now, true)).await.unwrap();
            assert!(created.id > 0, "{label}");
            assert_eq!(created.name, "Red Kurti", "{label}");
            assert!(created.is_new_arrival, "{label}");

            let fetched = store.get(created.id).await.unwrap().unwrap();
            assert_eq!(fetched, created, "{label}");
            assert!(store.get(created.id + 100).await.unwrap().is_none(), "{label}");
        }
    }

    #[tokio::test]
    async fn test_list_recent_orders_newest_first() {
        for (label, store) in stores().await {
            let t1 = Utc::now().naive_utc();
            let t2 = t1 + Duration::seconds(1);
            let t3 = t1 + Duration::seconds(2);
            // inserted out of order on purpose
            store.insert(sample("second", t2, false)).await.unwrap();
            store.insert(sample("third", t3, false)).await.unwrap();
            store.insert(sample("first", t1, false)).await.unwrap();

            let names: Vec<String> = store
                .list_recent(None)
                .await
                .unwrap()
                .into_iter()
                .map(|p| p.name)
                .collect();
            assert_eq!(names, vec!["third", "second", "first"], "{label}");

            let limited = store.list_recent(Some(2)).await.unwrap();
            assert_eq!(limited.len(), 2, "{label}");
            assert_eq!(limited[0].name, "third", "{label}");
        }
    }

    #[tokio::test]
    async fn test_equal_timestamps_fall_back_to_id() {
        for (label, store) in stores().await {
            let now = Utc::now().naive_utc();
            let a = store.insert(sample("a", now, false)).await.unwrap();
            let b = store.insert(sample("b", now, false)).await.unwrap();
            let ids: Vec<i32> = store
                .list_recent(None)
                .await
                .unwrap()
                .iter()
                .map(|p| p.id)
                .collect();
            assert_eq!(ids, vec![b.id, a.id], "{label}");
        }
    }

    #[tokio::test]
    async fn test_counts() {
        for (label, store) in stores().await {
            let now = Utc::now().naive_utc();
            store.insert(sample("a", now, true)).await.unwrap();
            store.insert(sample("b", now, false)).await.unwrap();
            store.insert(sample("c", now, true)).await.unwrap();
            assert_eq!(store.count().await.unwrap(), 3, "{label}");
            assert_eq!(store.count_new_arrivals().await.unwrap(), 2, "{label}");
        }
    }

    #[tokio::test]
    async fn test_delete_and_ids_are_not_reused() {
        for (label, store) in stores().await {
            let now = Utc::now().naive_utc();
            let first = store.insert(sample("a", now, false)).await.unwrap();
            assert!(store.delete(first.id).await.unwrap(), "{label}");
            assert!(!store.delete(first.id).await.unwrap(), "{label}");
            assert_eq!(store.count().await.unwrap(), 0, "{label}");

            let second = store.insert(sample("b", now, false)).await.unwrap();
            assert!(second.id > first.id, "{label}");
        }
    }
}
