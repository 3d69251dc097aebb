//! External order identifiers
//!
//! `ORDER-<unix millis>-<6 hex chars>`. The random part only makes collisions
//! unlikely; uniqueness is enforced by the store and the caller retries.

use chrono::Utc;
use uuid::Uuid;

pub const ORDER_ID_PREFIX: &str = "ORDER";

/// Source of external order ids
pub trait OrderIdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Time plus random suffix; takes no lock
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampIdGenerator;

impl OrderIdGenerator for TimestampIdGenerator {
    fn next_id(&self) -> String {
        let random = Uuid::new_v4().simple().to_string();
        format!(
            "{}-{}-{}",
            ORDER_ID_PREFIX,
            Utc::now().timestamp_millis(),
            &random[..6]
        )
    }
}
