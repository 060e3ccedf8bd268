//! Order repository
//!
//! Line items, customer info and the shipping address are stored as JSONB
//! documents exactly as submitted, so later catalog edits never reach them.

use anyhow::Result;
use shop::{
    CustomerInfo, LineItem, NewOrderRequest, Order, OrderOwner, PaymentMethod, ShippingAddress,
};
use sqlx::{PgPool, Row, postgres::PgRow, types::Json};
use tracing::info;
use uuid::Uuid;

const ORDER_SELECT: &str = "SELECT o.id, o.user_id, u.name AS user_name, u.email AS user_email, \
     o.customer_info, o.order_items, o.shipping_address, o.payment_method, o.transaction_id, \
     o.total_price, o.is_paid, o.paid_at, o.is_delivered, o.delivered_at, o.created_at, o.updated_at \
     FROM orders o JOIN users u ON u.id = o.user_id";

/// Order repository for database operations
#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store a verified order for `user_id`, unpaid and undelivered
    pub async fn create(&self, user_id: Uuid, request: NewOrderRequest) -> Result<Order> {
        let row = sqlx::query(
            r#"
            INSERT INTO orders
                (user_id, customer_info, order_items, shipping_address, payment_method,
                 transaction_id, total_price)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(Json(&request.customer_info))
        .bind(Json(&request.order_items))
        .bind(Json(&request.shipping_address))
        .bind(request.payment_method.as_str())
        .bind(&request.transaction_id)
        .bind(request.total_price)
        .fetch_one(&self.pool)
        .await?;

        let id: Uuid = row.get("id");
        info!("Created order {} for user {}", id, user_id);

        self.get(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Order {} vanished after insert", id))
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Order>> {
        let row = sqlx::query(&format!("{ORDER_SELECT} WHERE o.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(order_from_row).transpose()
    }

    /// Orders placed by one user, newest first
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Order>> {
        let rows = sqlx::query(&format!(
            "{ORDER_SELECT} WHERE o.user_id = $1 ORDER BY o.created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(order_from_row).collect()
    }

    /// Every order with its owner, newest first
    pub async fn list_all(&self) -> Result<Vec<Order>> {
        let rows = sqlx::query(&format!("{ORDER_SELECT} ORDER BY o.created_at DESC"))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(order_from_row).collect()
    }

    /// Mark delivered and paid in one step, `None` if the order is gone
    pub async fn mark_delivered(&self, id: Uuid) -> Result<Option<Order>> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET is_delivered = TRUE, delivered_at = NOW(),
                is_paid = TRUE, paid_at = COALESCE(paid_at, NOW()),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        info!("Order {} delivered", id);
        self.get(id).await
    }

    /// Returns whether a row was removed
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        info!("Deleting order {}", id);

        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn order_from_row(row: &PgRow) -> Result<Order> {
    let payment_method: String = row.get("payment_method");
    let Json(customer_info): Json<CustomerInfo> = row.try_get("customer_info")?;
    let Json(order_items): Json<Vec<LineItem>> = row.try_get("order_items")?;
    let Json(shipping_address): Json<ShippingAddress> = row.try_get("shipping_address")?;

    Ok(Order {
        id: row.get("id"),
        user: OrderOwner {
            id: row.get("user_id"),
            name: row.get("user_name"),
            email: row.get("user_email"),
        },
        customer_info,
        order_items,
        shipping_address,
        payment_method: payment_method.parse::<PaymentMethod>()?,
        transaction_id: row.get("transaction_id"),
        total_price: row.get("total_price"),
        is_paid: row.get("is_paid"),
        paid_at: row.get("paid_at"),
        is_delivered: row.get("is_delivered"),
        delivered_at: row.get("delivered_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
