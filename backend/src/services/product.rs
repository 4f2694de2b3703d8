//! Product registry service
//!
//! Current stock, selling price and sale recency per product. Stock is
//! authoritative on the product row; every mutation is a clamped or
//! conditional UPDATE so concurrent writers cannot lose updates.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use shared::{
    classify_stock, validate_movement_quantity, validate_non_negative_amount,
    validate_product_name, MovementType, PaginatedResponse, Pagination, PaginationMeta, Product,
    StockPolicy, StockStatus,
};

use crate::error::{AppError, AppResult};
use crate::services::analytics;

/// Product registry service
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// Database row for a product
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub unit: String,
    pub current_stock: Decimal,
    pub selling_price: Option<Decimal>,
    pub last_sale_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            unit: row.unit,
            current_stock: row.current_stock,
            selling_price: row.selling_price,
            last_sale_date: row.last_sale_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub(crate) const PRODUCT_COLUMNS: &str =
    "id, name, unit, current_stock, selling_price, last_sale_date, created_at, updated_at";

/// Input for registering a product explicitly
#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub unit: Option<String>,
    pub opening_stock: Option<Decimal>,
    pub selling_price: Option<Decimal>,
}

/// Input for updating a product
#[derive(Debug, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub unit: Option<String>,
    pub selling_price: Option<Decimal>,
}

/// Input for a manual stock adjustment
#[derive(Debug, Deserialize)]
pub struct AdjustStockInput {
    /// Signed stock delta; the applied deduction is clamped at zero stock.
    pub delta: Decimal,
    pub notes: Option<String>,
}

/// A product together with its stock health classification
#[derive(Debug, Serialize)]
pub struct ProductWithStatus {
    #[serde(flatten)]
    pub product: Product,
    pub sales_count_30d: i64,
    pub status: StockStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_hint: Option<String>,
}

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Register a product explicitly (products are otherwise created on
    /// first supplier receipt).
    pub async fn create_product(&self, input: CreateProductInput) -> AppResult<Product> {
        validate_product_name(&input.name)
            .map_err(|msg| AppError::validation("name", msg))?;

        let opening_stock = input.opening_stock.unwrap_or(Decimal::ZERO);
        if opening_stock < Decimal::ZERO {
            return Err(AppError::validation(
                "opening_stock",
                "Opening stock cannot be negative",
            ));
        }
        if let Some(price) = input.selling_price {
            validate_non_negative_amount(price)
                .map_err(|msg| AppError::validation("selling_price", msg))?;
        }

        let name = input.name.trim().to_string();

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE LOWER(name) = LOWER($1))",
        )
        .bind(&name)
        .fetch_one(&self.db)
        .await?;

        if exists {
            return Err(AppError::DuplicateEntry("product name".to_string()));
        }

        let unit = input.unit.unwrap_or_else(|| "unit".to_string());

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            INSERT INTO products (name, unit, current_stock, selling_price)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(&name)
        .bind(&unit)
        .bind(opening_stock)
        .bind(input.selling_price)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Get a product by ID
    pub async fn get_product(&self, product_id: Uuid) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(row.into())
    }

    /// Find a product by name, case-insensitively
    pub async fn get_by_name(&self, name: &str) -> AppResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE LOWER(name) = LOWER($1)",
            PRODUCT_COLUMNS
        ))
        .bind(name.trim())
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(|r| r.into()))
    }

    /// List products, paginated, ordered by name
    pub async fn list_products(
        &self,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<Product>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.db)
            .await?;

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products ORDER BY name LIMIT $1 OFFSET $2",
            PRODUCT_COLUMNS
        ))
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: rows.into_iter().map(|r| r.into()).collect(),
            pagination: PaginationMeta::new(&pagination, total as u64),
        })
    }

    /// Update name, unit or selling price
    pub async fn update_product(
        &self,
        product_id: Uuid,
        input: UpdateProductInput,
    ) -> AppResult<Product> {
        let existing = self.get_product(product_id).await?;

        let name = match input.name {
            Some(name) => {
                validate_product_name(&name)
                    .map_err(|msg| AppError::validation("name", msg))?;
                let name = name.trim().to_string();

                let taken = sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS(SELECT 1 FROM products WHERE LOWER(name) = LOWER($1) AND id <> $2)",
                )
                .bind(&name)
                .bind(product_id)
                .fetch_one(&self.db)
                .await?;

                if taken {
                    return Err(AppError::DuplicateEntry("product name".to_string()));
                }
                name
            }
            None => existing.name,
        };

        if let Some(price) = input.selling_price {
            validate_non_negative_amount(price)
                .map_err(|msg| AppError::validation("selling_price", msg))?;
        }

        let unit = input.unit.unwrap_or(existing.unit);
        let selling_price = input.selling_price.or(existing.selling_price);

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            UPDATE products
            SET name = $1, unit = $2, selling_price = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(&name)
        .bind(&unit)
        .bind(selling_price)
        .bind(product_id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Apply a manual stock adjustment, recording an `adjusted` movement.
    pub async fn adjust_stock(
        &self,
        product_id: Uuid,
        input: AdjustStockInput,
    ) -> AppResult<Product> {
        validate_movement_quantity(input.delta)
            .map_err(|msg| AppError::validation("delta", msg))?;

        // Ensure the product exists before opening the transaction
        self.get_product(product_id).await?;

        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            UPDATE products
            SET current_stock = GREATEST(current_stock + $2, 0), updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(product_id)
        .bind(input.delta)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO stock_movements (product_id, movement_type, quantity, notes)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(product_id)
        .bind(MovementType::Adjusted.as_str())
        .bind(input.delta)
        .bind(&input.notes)
        .execute(&mut *tx)
        .await?;

        analytics::invalidate_metrics(&mut *tx, &[product_id]).await?;

        tx.commit().await?;

        Ok(row.into())
    }

    /// Number of non-reversed sales for a product inside the policy window.
    pub async fn sales_count_30d(
        &self,
        product_id: Uuid,
        policy: &StockPolicy,
    ) -> AppResult<i64> {
        let since = Utc::now() - Duration::days(policy.sales_window_days);

        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM sales
            WHERE product_id = $1 AND is_reversed = FALSE AND created_at >= $2
            "#,
        )
        .bind(product_id)
        .bind(since)
        .fetch_one(&self.db)
        .await?;

        Ok(count)
    }

    /// List every product with its stock health classification.
    pub async fn list_with_status(
        &self,
        policy: &StockPolicy,
    ) -> AppResult<Vec<ProductWithStatus>> {
        let since = Utc::now() - Duration::days(policy.sales_window_days);

        let rows = sqlx::query_as::<_, ProductStatusRow>(
            r#"
            SELECT p.id, p.name, p.unit, p.current_stock, p.selling_price,
                   p.last_sale_date, p.created_at, p.updated_at,
                   COALESCE(s.sales_count, 0) AS sales_count_30d
            FROM products p
            LEFT JOIN (
                SELECT product_id, COUNT(*) AS sales_count
                FROM sales
                WHERE is_reversed = FALSE AND created_at >= $1
                GROUP BY product_id
            ) s ON s.product_id = p.id
            ORDER BY p.name
            "#,
        )
        .bind(since)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let status = classify_stock(row.current_stock, row.sales_count_30d, policy);
                ProductWithStatus {
                    product: Product {
                        id: row.id,
                        name: row.name,
                        unit: row.unit,
                        current_stock: row.current_stock,
                        selling_price: row.selling_price,
                        last_sale_date: row.last_sale_date,
                        created_at: row.created_at,
                        updated_at: row.updated_at,
                    },
                    sales_count_30d: row.sales_count_30d,
                    status,
                    status_hint: status.hint().map(|h| h.to_string()),
                }
            })
            .collect())
    }
}

/// Row for the product + sales velocity join
#[derive(Debug, sqlx::FromRow)]
struct ProductStatusRow {
    id: Uuid,
    name: String,
    unit: String,
    current_stock: Decimal,
    selling_price: Option<Decimal>,
    last_sale_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    sales_count_30d: i64,
}
