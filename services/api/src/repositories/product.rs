//! Catalog repository

use anyhow::Result;
use shop::{Product, ProductInput};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

const PRODUCT_COLUMNS: &str = "id, name, price, original_price, image_url, category, description, \
     count_in_stock, colors, sizes, created_at, updated_at";

/// Product repository for database operations
#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Whole catalog, newest first
    pub async fn list(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(product_from_row).collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Product>> {
        let row = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(product_from_row))
    }

    /// Insert a product. `input` must already be normalized.
    pub async fn create(&self, input: &ProductInput) -> Result<Product> {
        info!("Creating product {}", input.name);

        let row = sqlx::query(&format!(
            "INSERT INTO products \
             (name, price, original_price, image_url, category, description, count_in_stock, colors, sizes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(input.price)
        .bind(input.original_price)
        .bind(&input.image_url)
        .bind(&input.category)
        .bind(&input.description)
        .bind(input.count_in_stock)
        .bind(&input.colors)
        .bind(&input.sizes)
        .fetch_one(&self.pool)
        .await?;

        Ok(product_from_row(&row))
    }

    /// Replace every editable field, `None` if the product is gone
    pub async fn update(&self, id: Uuid, input: &ProductInput) -> Result<Option<Product>> {
        info!("Updating product {}", id);

        let row = sqlx::query(&format!(
            "UPDATE products SET name = $2, price = $3, original_price = $4, image_url = $5, \
             category = $6, description = $7, count_in_stock = $8, colors = $9, sizes = $10, \
             updated_at = NOW() \
             WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.name)
        .bind(input.price)
        .bind(input.original_price)
        .bind(&input.image_url)
        .bind(&input.category)
        .bind(&input.description)
        .bind(input.count_in_stock)
        .bind(&input.colors)
        .bind(&input.sizes)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(product_from_row))
    }

    /// Returns whether a row was removed
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        info!("Deleting product {}", id);

        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn product_from_row(row: &PgRow) -> Product {
    Product {
        id: row.get("id"),
        name: row.get("name"),
        price: row.get("price"),
        original_price: row.get("original_price"),
        image_url: row.get("image_url"),
        category: row.get("category"),
        description: row.get("description"),
        count_in_stock: row.get("count_in_stock"),
        colors: row.get("colors"),
        sizes: row.get("sizes"),
        created_at: Some(row.get("created_at")),
        updated_at: Some(row.get("updated_at")),
    }
}
