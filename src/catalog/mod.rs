//! Read-only cake catalog shown on the storefront
//!
//! The order engine never writes catalog entries; the list is seeded at
//! startup and served as-is.

use axum::Json;
use axum::extract::State;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cake {
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub rating: f32,
    pub flavors: Vec<String>,
    pub sizes: Vec<String>,
    pub is_popular: bool,
    pub is_new: bool,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    cakes: Arc<Vec<Cake>>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::seeded()
    }
}

impl Catalog {
    pub fn new(cakes: Vec<Cake>) -> Self {
        Self {
            cakes: Arc::new(cakes),
        }
    }

    /// The storefront's launch line-up
    pub fn seeded() -> Self {
        let cake = |name: &str,
                    description: &str,
                    cents: i64,
                    category: &str,
                    rating: f32,
                    flavors: &[&str],
                    sizes: &[&str],
                    is_popular: bool,
                    is_new: bool| Cake {
            name: name.to_string(),
            description: description.to_string(),
            price: Decimal::new(cents, 2),
            category: category.to_string(),
            image: None,
            rating,
            flavors: flavors.iter().map(|s| s.to_string()).collect(),
            sizes: sizes.iter().map(|s| s.to_string()).collect(),
            is_popular,
            is_new,
        };

        Self::new(vec![
            cake(
                "Chocolate Dream",
                "Rich dark chocolate cake with creamy chocolate ganache and chocolate shavings",
                4599,
                "Birthday",
                4.8,
                &["Chocolate", "Dark Chocolate"],
                &["Small", "Medium", "Large"],
                true,
                false,
            ),
            cake(
                "Vanilla Elegance",
                "Classic vanilla sponge with buttercream frosting and fresh berries",
                3999,
                "Wedding",
                4.6,
                &["Vanilla", "Buttercream"],
                &["Medium", "Large"],
                true,
                false,
            ),
            cake(
                "Strawberry Bliss",
                "Fresh strawberry cake with cream cheese frosting and strawberry topping",
                4299,
                "Anniversary",
                4.9,
                &["Strawberry", "Cream Cheese"],
                &["Small", "Medium", "Large"],
                true,
                true,
            ),
            cake(
                "Red Velvet Royal",
                "Classic red velvet with cream cheese frosting and edible gold leaf",
                4999,
                "Special",
                4.9,
                &["Red Velvet", "Cream Cheese"],
                &["Medium", "Large"],
                true,
                false,
            ),
            cake(
                "Lemon Sunshine",
                "Zesty lemon cake with lemon curd filling and lemon glaze",
                3799,
                "Spring",
                4.7,
                &["Lemon", "Citrus"],
                &["Small", "Medium"],
                false,
                true,
            ),
            cake(
                "Caramel Delight",
                "Moist caramel cake with salted caramel frosting and toffee pieces",
                4499,
                "Birthday",
                4.8,
                &["Caramel", "Toffee"],
                &["Small", "Medium", "Large"],
                true,
                false,
            ),
        ])
    }

    pub fn cakes(&self) -> &[Cake] {
        &self.cakes
    }
}

/// GET /api/cakes
pub async fn list_cakes(State(catalog): State<Catalog>) -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "count": catalog.cakes().len(),
        "cakes": catalog.cakes(),
    }))
}
