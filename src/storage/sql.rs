use async_trait::async_trait;
use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, QueryResult, Statement, Value,
};

use super::{NewProduct, ProductStore, StoreError};
use crate::entities::product;

const COLUMNS: &str = "id, image_filename, name, category, size, price, is_new_arrival, created_at";

/// Store that talks to the `products` table with hand-written SQL.
///
/// Every statement is parameterized; placeholders follow the connected
/// backend (`$n` on Postgres, `?` elsewhere).
#[derive(Clone)]
pub struct SqlStore {
    db: DatabaseConnection,
}

impl SqlStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn backend(&self) -> DatabaseBackend {
        self.db.get_database_backend()
    }

    fn placeholder(&self, n: usize) -> String {
        match self.backend() {
            DatabaseBackend::Postgres => format!("${n}"),
            _ => "?".to_string(),
        }
    }

    fn statement<I>(&self, sql: String, values: I) -> Statement
    where
        I: IntoIterator<Item = Value>,
    {
        Statement::from_sql_and_values(self.backend(), sql, values)
    }

    async fn scalar_count(&self, stmt: Statement) -> Result<u64, StoreError> {
        let row = self.db.query_one(stmt).await?;
        let count: i64 = match row {
            Some(row) => row.try_get("", "total")?,
            None => 0,
        };
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

fn from_row(row: &QueryResult) -> Result<product::Model, StoreError> {
    Ok(product::Model {
        id: row.try_get("", "id")?,
        image_filename: row.try_get("", "image_filename")?,
        name: row.try_get("", "name")?,
        category: row.try_get("", "category")?,
        size: row.try_get("", "size")?,
        price: row.try_get("", "price")?,
        is_new_arrival: row.try_get("", "is_new_arrival")?,
        created_at: row.try_get("", "created_at")?,
    })
}

#[async_trait]
impl ProductStore for SqlStore {
    async fn insert(&self, new: NewProduct) -> Result<product::Model, StoreError> {
        let params: Vec<String> = (1..=7).map(|n| self.placeholder(n)).collect();
        let sql = format!(
            "INSERT INTO products (image_filename, name, category, size, price, is_new_arrival, created_at) \
             VALUES ({}) RETURNING {COLUMNS}",
            params.join(", ")
        );
        let stmt = self.statement(
            sql,
            [
                new.image_filename.into(),
                new.name.into(),
                new.category.into(),
                new.size.into(),
                new.price.into(),
                new.is_new_arrival.into(),
                new.created_at.into(),
            ],
        );

        let row = self
            .db
            .query_one(stmt)
            .await?
            .ok_or(StoreError::MissingInsertResult)?;
        from_row(&row)
    }

    async fn get(&self, id: i32) -> Result<Option<product::Model>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM products WHERE id = {}", self.placeholder(1));
        let row = self.db.query_one(self.statement(sql, [id.into()])).await?;
        row.as_ref().map(from_row).transpose()
    }

    async fn delete(&self, id: i32) -> Result<bool, StoreError> {
        let sql = format!("DELETE FROM products WHERE id = {}", self.placeholder(1));
        let result = self.db.execute(self.statement(sql, [id.into()])).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let stmt = self.statement(
            "SELECT COUNT(*) AS total FROM products".to_string(),
            Vec::<Value>::new(),
        );
        self.scalar_count(stmt).await
    }

    async fn count_new_arrivals(&self) -> Result<u64, StoreError> {
        let sql = format!(
            "SELECT COUNT(*) AS total FROM products WHERE is_new_arrival = {}",
            self.placeholder(1)
        );
        self.scalar_count(self.statement(sql, [true.into()])).await
    }

    async fn list_recent(&self, limit: Option<u64>) -> Result<Vec<product::Model>, StoreError> {
        let mut sql = format!("SELECT {COLUMNS} FROM products ORDER BY created_at DESC, id DESC");
        let mut values: Vec<Value> = Vec::new();
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {}", self.placeholder(1)));
            values.push(i64::try_from(limit).unwrap_or(i64::MAX).into());
        }

        let rows = self.db.query_all(self.statement(sql, values)).await?;
        rows.iter().map(from_row).collect()
    }
}
