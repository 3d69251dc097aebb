//! MongoDB storage backend using the official MongoDB async driver.
//!
//! # Feature flag
//!
//! This module is gated behind the `mongodb_backend` feature flag.
//!
//! # Storage model
//!
//! Orders live in a single `orders` collection. Records are serialized via
//! `serde_json::Value` and converted to BSON, with `id` mapped to `_id`.
//! Timestamps are kept as RFC 3339 strings for readability, plus
//! `createdAtMs` so sorting and day ranges do not depend on string order.

use crate::core::error::{StoreError, StoreResult};
use crate::core::order::{Order, OrderStatus};
use crate::core::store::{OrderStats, OrderStore};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use futures::TryStreamExt;
use mongodb::bson::{Bson, Document, doc};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::ReturnDocument;
use mongodb::{Client, Collection, Database, IndexModel};

const BACKEND: &str = "mongodb";
const COLLECTION: &str = "orders";
const CREATED_AT_MS: &str = "createdAtMs";
const DUPLICATE_KEY: i32 = 11000;

fn unavailable(context: &str, e: impl std::fmt::Display) -> StoreError {
    StoreError::unavailable(BACKEND, format!("{}: {}", context, e))
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == DUPLICATE_KEY
    )
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

/// Order -> BSON, renaming `id` to `_id` and adding `createdAtMs`
fn order_to_document(order: &Order) -> StoreResult<Document> {
    let json = serde_json::to_value(order).map_err(|e| unavailable("Failed to serialize order", e))?;
    let mut doc = match mongodb::bson::to_bson(&json)
        .map_err(|e| unavailable("Failed to convert JSON to BSON", e))?
    {
        Bson::Document(d) => d,
        _ => return Err(unavailable("Failed to convert order", "expected a document")),
    };

    if let Some(id) = doc.remove("id") {
        doc.insert("_id", id);
    }
    doc.insert(CREATED_AT_MS, order.created_at.timestamp_millis());
    Ok(doc)
}

/// BSON -> Order, reversing [`order_to_document`]
fn document_to_order(mut doc: Document) -> StoreResult<Order> {
    if let Some(id) = doc.remove("_id") {
        doc.insert("id", id);
    }
    doc.remove(CREATED_AT_MS);

    let json = Bson::Document(doc).into_relaxed_extjson();
    serde_json::from_value(json).map_err(|e| unavailable("Failed to deserialize order", e))
}

/// `updatedAt` in the same RFC 3339 form the serde conversion writes
fn timestamp_now() -> StoreResult<String> {
    serde_json::to_value(Utc::now())
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .ok_or_else(|| unavailable("Failed to format timestamp", "not a string"))
}

fn not_found(order_id: &str) -> StoreError {
    StoreError::NotFound {
        order_id: order_id.to_string(),
    }
}

// ---------------------------------------------------------------------------
// MongoOrderStore
// ---------------------------------------------------------------------------

/// Order storage backed by MongoDB
///
/// # Example
///
/// ```rust,ignore
/// let store = MongoOrderStore::connect("mongodb://localhost:27017", "cakeShopDB").await?;
/// store.ensure_indexes().await?;
/// ```
#[derive(Clone, Debug)]
pub struct MongoOrderStore {
    database: Database,
}

impl MongoOrderStore {
    /// Create a store over an existing database handle
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Connect, then create the indexes if missing
    pub async fn connect(uri: &str, database: &str) -> StoreResult<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| unavailable("Failed to connect", e))?;
        let store = Self::new(client.database(database));
        store.ensure_indexes().await?;
        Ok(store)
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    fn collection(&self) -> Collection<Document> {
        self.database.collection(COLLECTION)
    }

    /// Create the indexes the query patterns rely on
    ///
    /// The unique index on `orderId` is what turns an id collision into
    /// `StoreError::DuplicateKey`.
    pub async fn ensure_indexes(&self) -> StoreResult<()> {
        use mongodb::options::IndexOptions;

        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "orderId": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
            IndexModel::builder()
                .keys(doc! { "status": 1, CREATED_AT_MS: -1 })
                .build(),
            IndexModel::builder()
                .keys(doc! { "userId": 1, CREATED_AT_MS: -1 })
                .build(),
            IndexModel::builder().keys(doc! { CREATED_AT_MS: -1 }).build(),
        ];

        self.collection()
            .create_indexes(indexes)
            .await
            .map_err(|e| unavailable("Failed to create indexes", e))?;

        Ok(())
    }

    /// Run a filtered query, newest first
    async fn find_sorted(&self, filter: Document) -> StoreResult<Vec<Order>> {
        let cursor = self
            .collection()
            .find(filter)
            .sort(doc! { CREATED_AT_MS: -1, "_id": -1 })
            .await
            .map_err(|e| unavailable("Failed to query orders", e))?;

        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| unavailable("Failed to read orders", e))?;

        docs.into_iter().map(document_to_order).collect()
    }
}

#[async_trait]
impl OrderStore for MongoOrderStore {
    async fn create(&self, order: Order) -> StoreResult<Order> {
        let doc = order_to_document(&order)?;

        match self.collection().insert_one(doc).await {
            Ok(_) => Ok(order),
            Err(e) if is_duplicate_key(&e) => Err(StoreError::DuplicateKey {
                order_id: order.order_id,
            }),
            Err(e) => Err(unavailable("Failed to create order", e)),
        }
    }

    async fn find_by_id(&self, order_id: &str) -> StoreResult<Order> {
        let doc = self
            .collection()
            .find_one(doc! { "orderId": order_id })
            .await
            .map_err(|e| unavailable("Failed to get order", e))?
            .ok_or_else(|| not_found(order_id))?;

        document_to_order(doc)
    }

    async fn find_all(&self) -> StoreResult<Vec<Order>> {
        self.find_sorted(doc! {}).await
    }

    async fn find_by_status(&self, status: OrderStatus) -> StoreResult<Vec<Order>> {
        self.find_sorted(doc! { "status": status.as_str() }).await
    }

    async fn find_by_owner(&self, user_id: &str) -> StoreResult<Vec<Order>> {
        self.find_sorted(doc! { "userId": user_id }).await
    }

    async fn update_status(&self, order_id: &str, status: OrderStatus) -> StoreResult<Order> {
        let now = timestamp_now()?;

        let doc = self
            .collection()
            .find_one_and_update(
                doc! { "orderId": order_id },
                doc! { "$set": { "status": status.as_str(), "updatedAt": now } },
            )
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| unavailable("Failed to update order", e))?
            .ok_or_else(|| not_found(order_id))?;

        document_to_order(doc)
    }

    async fn transition(
        &self,
        order_id: &str,
        expected: OrderStatus,
        status: OrderStatus,
    ) -> StoreResult<Order> {
        let now = timestamp_now()?;

        let updated = self
            .collection()
            .find_one_and_update(
                doc! { "orderId": order_id, "status": expected.as_str() },
                doc! { "$set": { "status": status.as_str(), "updatedAt": now } },
            )
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| unavailable("Failed to update order", e))?;

        match updated {
            Some(doc) => document_to_order(doc),
            // Either gone or moved on; the current record tells which
            None => {
                let current = self.find_by_id(order_id).await?;
                Err(StoreError::StatusConflict {
                    order_id: order_id.to_string(),
                    actual: current.status,
                })
            }
        }
    }

    async fn delete(&self, order_id: &str) -> StoreResult<()> {
        let result = self
            .collection()
            .delete_one(doc! { "orderId": order_id })
            .await
            .map_err(|e| unavailable("Failed to delete order", e))?;

        if result.deleted_count == 0 {
            return Err(not_found(order_id));
        }
        Ok(())
    }

    /// Folded client-side so totals stay in fixed-point decimals
    async fn aggregate_stats(&self, today: NaiveDate) -> StoreResult<OrderStats> {
        let orders = self.find_sorted(doc! {}).await?;
        Ok(OrderStats::from_orders(orders.iter(), today))
    }

    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    async fn ping(&self) -> StoreResult<()> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| unavailable("Ping failed", e))?;
        Ok(())
    }
}
