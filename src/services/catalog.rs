//! Product catalog workflow: validate, store the image, record the row.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use crate::config::CatalogOptions;
use crate::entities::product;
use crate::error::ValidationError;
use crate::services::file_store::{extension_of, FileStore};
use crate::storage::{NewProduct, ProductStore, StoreError};

/// Number of products shown on the dashboard.
pub const RECENT_LIMIT: u64 = 5;

/// Width of the `products.name` column.
pub const MAX_NAME_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StoreError),
    #[error("file store error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub filename: String,
    pub content: Vec<u8>,
}

/// Raw form input for a new product.
#[derive(Debug, Clone, Default)]
pub struct ProductSubmission {
    pub name: String,
    pub category: String,
    pub size: String,
    pub price: String,
    pub is_new_arrival: bool,
    pub image: Option<UploadedImage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Deleted,
    NotFound,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSummary {
    pub total_count: u64,
    pub new_arrival_count: u64,
    pub recent: Vec<product::Model>,
}

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn ProductStore>,
    files: FileStore,
    options: Arc<CatalogOptions>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn ProductStore>, files: FileStore, options: Arc<CatalogOptions>) -> Self {
        Self {
            store,
            files,
            options,
        }
    }

    pub fn options(&self) -> &CatalogOptions {
        &self.options
    }

    pub fn files(&self) -> &FileStore {
        &self.files
    }

    /// Validate a submission, save its image and insert the product.
    ///
    /// The image is written before the row. If the insert fails the image
    /// stays on disk.
    pub async fn submit(&self, submission: ProductSubmission) -> Result<product::Model, CatalogError> {
        let validated = self.validate(submission)?;

        let image_filename = self
            .files
            .save(&validated.image.filename, &validated.image.content)
            .await?;

        let new = NewProduct {
            image_filename: image_filename.clone(),
            name: validated.name,
            category: validated.category,
            size: validated.size,
            price: validated.price,
            is_new_arrival: validated.is_new_arrival,
            created_at: Utc::now().naive_utc(),
        };

        match self.store.insert(new).await {
            Ok(product) => {
                tracing::info!(id = product.id, file = %product.image_filename, "Product added");
                Ok(product)
            }
            Err(e) => {
                tracing::warn!(file = %image_filename, error = %e, "Insert failed, image left on disk");
                Err(e.into())
            }
        }
    }

    /// Delete a product and its image. Unknown ids are a no-op.
    pub async fn remove(&self, id: i32) -> Result<RemoveOutcome, CatalogError> {
        let Some(product) = self.store.get(id).await? else {
            tracing::debug!(id, "Delete requested for unknown product");
            return Ok(RemoveOutcome::NotFound);
        };

        if !self.files.delete(&product.image_filename).await? {
            tracing::warn!(id, file = %product.image_filename, "Image already missing");
        }

        // a concurrent delete may have won the race
        if !self.store.delete(id).await? {
            return Ok(RemoveOutcome::NotFound);
        }

        tracing::info!(id, "Product deleted");
        Ok(RemoveOutcome::Deleted)
    }

    pub async fn list_all(&self) -> Result<Vec<product::Model>, CatalogError> {
        Ok(self.store.list_recent(None).await?)
    }

    pub async fn summary(&self) -> Result<CatalogSummary, CatalogError> {
        Ok(CatalogSummary {
            total_count: self.store.count().await?,
            new_arrival_count: self.store.count_new_arrivals().await?,
            recent: self.store.list_recent(Some(RECENT_LIMIT)).await?,
        })
    }

    fn validate(&self, submission: ProductSubmission) -> Result<ValidSubmission, ValidationError> {
        let name = submission.name.trim();
        let category = submission.category.trim();
        let size = submission.size.trim();
        let price = submission.price.trim();

        let image = submission
            .image
            .filter(|image| !image.filename.trim().is_empty());

        let Some(image) = image else {
            return Err(ValidationError::MissingField);
        };
        if name.is_empty() || category.is_empty() || size.is_empty() || price.is_empty() {
            return Err(ValidationError::MissingField);
        }
        if name.chars().count() > MAX_NAME_CHARS {
            return Err(ValidationError::NameTooLong { max: MAX_NAME_CHARS });
        }

        let allowed = extension_of(&image.filename)
            .is_some_and(|ext| self.options.image_extensions.contains(&ext));
        if !allowed {
            return Err(ValidationError::InvalidImageType);
        }

        if !self.options.categories.iter().any(|c| c == category) {
            return Err(ValidationError::InvalidCategory);
        }
        if !self.options.sizes.iter().any(|s| s == size) {
            return Err(ValidationError::InvalidSize);
        }

        let price = parse_price(price)?;

        Ok(ValidSubmission {
            name: name.to_string(),
            category: category.to_string(),
            size: size.to_string(),
            price,
            is_new_arrival: submission.is_new_arrival,
            image,
        })
    }
}

struct ValidSubmission {
    name: String,
    category: String,
    size: String,
    price: f64,
    is_new_arrival: bool,
    image: UploadedImage,
}

fn parse_price(raw: &str) -> Result<f64, ValidationError> {
    match raw.parse::<f64>() {
        Ok(price) if price.is_finite() && price >= 0.0 => Ok(price),
        _ => Err(ValidationError::InvalidPrice),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageBackend;
    use crate::storage::{connect_store, testing::memory_db};
    use tempfile::TempDir;

    async fn service(backend: StorageBackend) -> (CatalogService, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let files = FileStore::open(dir.path()).await.unwrap();
        let store = connect_store(backend, memory_db().await);
        let service = CatalogService::new(store, files, Arc::new(CatalogOptions::default()));
        (service, dir)
    }

    fn red_kurti() -> ProductSubmission {
        ProductSubmission {
            name: "Red Kurti".to_string(),
            category: "Kurti".to_string(),
            size: "M".to_string(),
            price: "1499.50".to_string(),
            is_new_arrival: true,
            image: Some(UploadedImage {
                filename: "photo.jpg".to_string(),
                content: b"fake jpeg".to_vec(),
            }),
        }
    }

    fn files_in(dir: &TempDir) -> usize {
        std::fs::read_dir(dir.path()).unwrap().count()
    }

    #[tokio::test]
    async fn test_submit_red_kurti() {
        for backend in [StorageBackend::Orm, StorageBackend::Sql] {
            let (catalog, dir) = service(backend).await;
            let before = catalog.summary().await.unwrap();

            let product = catalog.submit(red_kurti()).await.unwrap();
            assert_eq!(product.name, "Red Kurti");
            assert_eq!(product.category, "Kurti");
            assert_eq!(product.size, "M");
            assert!((product.price - 1499.5).abs() < f64::EPSILON);
            assert!(product.is_new_arrival);
            assert_ne!(product.image_filename, "photo.jpg");
            assert!(product.image_filename.ends_with("_photo.jpg"));
            assert!(dir.path().join(&product.image_filename).exists());

            let after = catalog.summary().await.unwrap();
            assert_eq!(after.total_count, before.total_count + 1);
            assert_eq!(after.new_arrival_count, before.new_arrival_count + 1);
            assert_eq!(catalog.list_all().await.unwrap(), vec![product]);
        }
    }

    #[tokio::test]
    async fn test_submit_trims_name_and_price() {
        let (catalog, _dir) = service(StorageBackend::Orm).await;
        let mut submission = red_kurti();
        submission.name = "  Blue Gown ".to_string();
        submission.price = " 0 ".to_string();
        submission.is_new_arrival = false;

        let product = catalog.submit(submission).await.unwrap();
        assert_eq!(product.name, "Blue Gown");
        assert!(product.price.abs() < f64::EPSILON);
        assert!(!product.is_new_arrival);
    }

    #[tokio::test]
    async fn test_missing_fields_are_rejected() {
        let (catalog, dir) = service(StorageBackend::Orm).await;

        let cases: Vec<Box<dyn Fn(&mut ProductSubmission)>> = vec![
            Box::new(|s: &mut ProductSubmission| s.name = "   ".to_string()),
            Box::new(|s: &mut ProductSubmission| s.category.clear()),
            Box::new(|s: &mut ProductSubmission| s.size.clear()),
            Box::new(|s: &mut ProductSubmission| s.price.clear()),
            Box::new(|s: &mut ProductSubmission| s.image = None),
            Box::new(|s: &mut ProductSubmission| {
                if let Some(image) = s.image.as_mut() {
                    image.filename.clear();
                }
            }),
        ];

        for mutate in cases {
            let mut submission = red_kurti();
            mutate(&mut submission);
            let err = catalog.submit(submission).await.unwrap_err();
            assert!(matches!(err, CatalogError::Validation(ValidationError::MissingField)));
        }
        assert_eq!(catalog.summary().await.unwrap().total_count, 0);
        assert_eq!(files_in(&dir), 0);
    }

    #[tokio::test]
    async fn test_image_type_is_checked_case_insensitively() {
        let (catalog, dir) = service(StorageBackend::Sql).await;

        for bad in ["resume.pdf", "script.php.txt", "noextension", ".png"] {
            let mut submission = red_kurti();
            submission.image.as_mut().unwrap().filename = bad.to_string();
            let err = catalog.submit(submission).await.unwrap_err();
            assert!(
                matches!(err, CatalogError::Validation(ValidationError::InvalidImageType)),
                "{bad}"
            );
        }
        assert_eq!(catalog.list_all().await.unwrap().len(), 0);
        assert_eq!(files_in(&dir), 0);

        let mut submission = red_kurti();
        submission.image.as_mut().unwrap().filename = "PHOTO.WEBP".to_string();
        assert!(catalog.submit(submission).await.is_ok());
    }

    #[tokio::test]
    async fn test_enumerated_values_and_price_are_validated() {
        let (catalog, _dir) = service(StorageBackend::Orm).await;

        let mut submission = red_kurti();
        submission.category = "Lehenga".to_string();
        assert!(matches!(
            catalog.submit(submission).await,
            Err(CatalogError::Validation(ValidationError::InvalidCategory))
        ));

        let mut submission = red_kurti();
        submission.size = "XXL".to_string();
        assert!(matches!(
            catalog.submit(submission).await,
            Err(CatalogError::Validation(ValidationError::InvalidSize))
        ));

        for price in ["abc", "-1", "NaN", "inf", "12,50"] {
            let mut submission = red_kurti();
            submission.price = price.to_string();
            assert!(
                matches!(
                    catalog.submit(submission).await,
                    Err(CatalogError::Validation(ValidationError::InvalidPrice))
                ),
                "{price}"
            );
        }
        assert_eq!(catalog.summary().await.unwrap().total_count, 0);
    }

    #[tokio::test]
    async fn test_name_longer_than_column_is_rejected() {
        let (catalog, dir) = service(StorageBackend::Sql).await;

        let mut submission = red_kurti();
        submission.name = "k".repeat(MAX_NAME_CHARS + 1);
        let err = catalog.submit(submission).await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Validation(ValidationError::NameTooLong { max: MAX_NAME_CHARS })
        ));
        assert_eq!(err.to_string(), "Name is too long (max 200 characters)");
        assert_eq!(files_in(&dir), 0);

        // limit counts characters, not bytes
        let mut submission = red_kurti();
        submission.name = "क".repeat(MAX_NAME_CHARS);
        let product = catalog.submit(submission).await.unwrap();
        assert_eq!(product.name.chars().count(), MAX_NAME_CHARS);
    }

    #[tokio::test]
    async fn test_remove_deletes_row_and_file() {
        for backend in [StorageBackend::Orm, StorageBackend::Sql] {
            let (catalog, dir) = service(backend).await;
            let keep = catalog.submit(red_kurti()).await.unwrap();
            let gone = catalog.submit(red_kurti()).await.unwrap();

            assert_eq!(catalog.remove(gone.id).await.unwrap(), RemoveOutcome::Deleted);
            assert!(!dir.path().join(&gone.image_filename).exists());
            assert!(dir.path().join(&keep.image_filename).exists());
            assert_eq!(catalog.list_all().await.unwrap(), vec![keep]);
        }
    }

    #[tokio::test]
    async fn test_remove_unknown_id_is_noop() {
        let (catalog, _dir) = service(StorageBackend::Orm).await;
        catalog.submit(red_kurti()).await.unwrap();

        assert_eq!(catalog.remove(9999).await.unwrap(), RemoveOutcome::NotFound);
        assert_eq!(catalog.summary().await.unwrap().total_count, 1);
    }

    #[tokio::test]
    async fn test_remove_tolerates_missing_file() {
        let (catalog, dir) = service(StorageBackend::Sql).await;
        let product = catalog.submit(red_kurti()).await.unwrap();
        std::fs::remove_file(dir.path().join(&product.image_filename)).unwrap();

        assert_eq!(catalog.remove(product.id).await.unwrap(), RemoveOutcome::Deleted);
        assert!(catalog.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_summary_recent_is_prefix_of_list_all() {
        let (catalog, _dir) = service(StorageBackend::Orm).await;
        for i in 0..7 {
            let mut submission = red_kurti();
            submission.name = format!("Kurti {i}");
            submission.is_new_arrival = i % 2 == 0;
            catalog.submit(submission).await.unwrap();
        }

        let all = catalog.list_all().await.unwrap();
        let summary = catalog.summary().await.unwrap();
        assert_eq!(summary.total_count, 7);
        assert_eq!(summary.new_arrival_count, 4);
        assert_eq!(summary.recent.len(), 5);
        assert_eq!(summary.recent[..], all[..5]);
        assert_eq!(all[0].name, "Kurti 6");
        assert_eq!(all[6].name, "Kurti 0");
    }
}
