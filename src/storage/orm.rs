use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use super::{NewProduct, ProductStore, StoreError};
use crate::entities::product::{self, Entity as Product};

/// Store backed by the sea-orm entity API.
#[derive(Clone)]
pub struct OrmStore {
    db: DatabaseConnection,
}

impl OrmStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductStore for OrmStore {
    async fn insert(&self, new: NewProduct) -> Result<product::Model, StoreError> {
        let product = product::ActiveModel {
            image_filename: Set(new.image_filename),
            name: Set(new.name),
            category: Set(new.category),
            size: Set(new.size),
            price: Set(new.price),
            is_new_arrival: Set(new.is_new_arrival),
            created_at: Set(new.created_at),
            ..Default::default()
        };

        Ok(product.insert(&self.db).await?)
    }

    async fn get(&self, id: i32) -> Result<Option<product::Model>, StoreError> {
        Ok(Product::find_by_id(id).one(&self.db).await?)
    }

    async fn delete(&self, id: i32) -> Result<bool, StoreError> {
        let result = Product::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(Product::find().count(&self.db).await?)
    }

    async fn count_new_arrivals(&self) -> Result<u64, StoreError> {
        Ok(Product::find()
            .filter(product::Column::IsNewArrival.eq(true))
            .count(&self.db)
            .await?)
    }

    async fn list_recent(&self, limit: Option<u64>) -> Result<Vec<product::Model>, StoreError> {
        Ok(Product::find()
            .order_by_desc(product::Column::CreatedAt)
            .order_by_desc(product::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?)
    }
}
