//! Price calculation for custom cake orders
//!
//! Prices are fixed-point decimals. The table is data, so deployments can
//! override any amount through the `pricing` section of the config file.

use crate::core::order::{CakeDesign, DeliveryType};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Layers included in the size price; each extra layer is charged `layer_unit`
pub const BASELINE_LAYERS: u8 = 2;

/// Lookup table driving [`PriceTable::compute_price`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceTable {
    /// Base amount per size tier
    #[serde(with = "decimal_map")]
    pub sizes: HashMap<String, Decimal>,

    /// Used when the size tier is not in `sizes`
    #[serde(with = "rust_decimal::serde::float")]
    pub default_size_price: Decimal,

    /// Surcharge per base flavor (unknown flavors cost nothing extra)
    #[serde(with = "decimal_map")]
    pub bases: HashMap<String, Decimal>,

    /// Surcharge per frosting flavor (unknown flavors cost nothing extra)
    #[serde(with = "decimal_map")]
    pub frostings: HashMap<String, Decimal>,

    #[serde(with = "rust_decimal::serde::float")]
    pub topping_unit: Decimal,

    #[serde(with = "rust_decimal::serde::float")]
    pub layer_unit: Decimal,

    #[serde(with = "rust_decimal::serde::float")]
    pub delivery_surcharge: Decimal,
}

impl Default for PriceTable {
    fn default() -> Self {
        let cents = |c: i64| Decimal::new(c, 2);
        let table = |entries: &[(&str, i64)]| {
            entries
                .iter()
                .map(|(k, c)| (k.to_string(), cents(*c)))
                .collect::<HashMap<_, _>>()
        };

        Self {
            sizes: table(&[
                ("small", 2999),
                ("medium", 3999),
                ("large", 4999),
                ("xl", 6999),
            ]),
            default_size_price: cents(3999),
            bases: table(&[
                ("chocolate", 500),
                ("vanilla", 400),
                ("red-velvet", 600),
                ("carrot", 500),
                ("lemon", 400),
            ]),
            frostings: table(&[
                ("vanilla", 300),
                ("chocolate", 400),
                ("cream-cheese", 400),
                ("strawberry", 300),
                ("matcha", 500),
            ]),
            topping_unit: cents(200),
            layer_unit: cents(300),
            delivery_surcharge: cents(500),
        }
    }
}

impl PriceTable {
    pub fn size_price(&self, size: &str) -> Decimal {
        self.sizes
            .get(size)
            .copied()
            .unwrap_or(self.default_size_price)
    }

    pub fn base_surcharge(&self, base: &str) -> Decimal {
        self.bases.get(base).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn frosting_surcharge(&self, frosting: &str) -> Decimal {
        self.frostings.get(frosting).copied().unwrap_or(Decimal::ZERO)
    }

    /// Total price of a design, rounded to cents
    ///
    /// `size + base + frosting + toppings * topping_unit
    ///  + max(0, layers - 2) * layer_unit + delivery surcharge`
    pub fn compute_price(&self, design: &CakeDesign, delivery: DeliveryType) -> Decimal {
        let extra_layers = design.layers.saturating_sub(BASELINE_LAYERS);

        let mut total = self.size_price(&design.size)
            + self.base_surcharge(&design.base)
            + self.frosting_surcharge(&design.frosting)
            + self.topping_unit * Decimal::from(design.toppings.len())
            + self.layer_unit * Decimal::from(extra_layers);

        if delivery == DeliveryType::Delivery {
            total += self.delivery_surcharge;
        }

        total
            .max(Decimal::ZERO)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

/// Serialize price maps as plain JSON/YAML numbers
mod decimal_map {
    use rust_decimal::Decimal;
    use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::HashMap;

    pub fn serialize<S: Serializer>(
        map: &HashMap<String, Decimal>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let floats: HashMap<&String, f64> = map
            .iter()
            .map(|(k, v)| (k, v.to_f64().unwrap_or_default()))
            .collect();
        floats.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<HashMap<String, Decimal>, D::Error> {
        let floats = HashMap::<String, f64>::deserialize(deserializer)?;
        floats
            .into_iter()
            .map(|(k, v)| {
                Decimal::from_f64(v)
                    .map(|d| (k.to_lowercase(), d.round_dp(2)))
                    .ok_or_else(|| D::Error::custom(format!("invalid price for '{}': {}", k, v)))
            })
            .collect()
    }
}
