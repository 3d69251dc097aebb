//! Checkout request validation
//!
//! [`OrderInput`] is the raw, untrusted request body. Every rule is evaluated
//! independently and all failures are returned together, so a client can fix
//! its whole form in one round trip.

use chrono::NaiveDate;
use serde::Deserialize;

use super::filters::{dedup_identifiers, identifier, trimmed};
use super::validators::{
    date_not_before, email, in_list, max_chars, max_items, phone, required, within_range,
};
use crate::core::error::FieldValidationError;
use crate::core::order::{CakeColors, CakeDesign, DeliveryType, PaymentMethod};

pub const MIN_LAYERS: i64 = 1;
pub const MAX_LAYERS: i64 = 5;
pub const MAX_TOPPINGS: usize = 5;
/// Raw entries accepted before de-duplication
pub const MAX_RAW_TOPPINGS: usize = MAX_TOPPINGS * 4;
pub const MAX_MESSAGE_CHARS: usize = 30;
pub const MAX_INSTRUCTIONS_CHARS: usize = 500;

const DEFAULT_BASE: &str = "chocolate";
const DEFAULT_FROSTING: &str = "vanilla";
const DEFAULT_SIZE: &str = "medium";
const DEFAULT_LAYERS: i64 = 2;

const DELIVERY_TYPES: &[&str] = &["pickup", "delivery"];
const PAYMENT_METHODS: &[&str] = &["cash", "card", "online"];

/// Raw checkout payload
///
/// Every field is optional at the type level so that missing fields become
/// validation reasons rather than deserialization failures. Unknown fields,
/// including any client-supplied `totalPrice`, are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderInput {
    pub customer_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub delivery_date: Option<String>,
    pub delivery_type: Option<String>,
    pub delivery_address: Option<String>,
    pub special_instructions: Option<String>,
    pub payment_method: Option<String>,

    pub base: Option<String>,
    pub frosting: Option<String>,
    pub size: Option<String>,
    pub layers: Option<i64>,
    pub toppings: Option<Vec<String>>,
    pub message: Option<String>,
    pub colors: Option<ColorsInput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ColorsInput {
    pub cake: Option<String>,
    pub frosting: Option<String>,
    pub decorations: Option<String>,
}

/// Normalised checkout payload, ready for pricing and persistence
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedOrder {
    pub customer_name: String,
    pub phone: String,
    pub email: String,
    pub delivery_date: NaiveDate,
    pub delivery_type: DeliveryType,
    pub delivery_address: Option<String>,
    pub special_instructions: Option<String>,
    pub payment_method: PaymentMethod,
    pub design: CakeDesign,
}

/// Collects failures while the rules run
#[derive(Default)]
struct Failures(Vec<FieldValidationError>);

impl Failures {
    fn check<T>(&mut self, field: &str, result: Result<T, String>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(message) => {
                self.0.push(FieldValidationError::new(field, message));
                None
            }
        }
    }
}

/// Validate a checkout request
///
/// `today` is the creation day; delivery dates before it are rejected.
pub fn validate(
    input: &OrderInput,
    today: NaiveDate,
) -> Result<ValidatedOrder, Vec<FieldValidationError>> {
    let mut failures = Failures::default();
    let required = required();

    // Contact details
    let customer_name = trimmed(input.customer_name.as_deref());
    failures.check("customerName", required("customerName", customer_name.as_deref()));

    let phone_number = trimmed(input.phone.as_deref());
    match phone_number.as_deref() {
        Some(p) => {
            failures.check("phone", phone()("phone", p));
        }
        None => {
            failures.check("phone", required("phone", None));
        }
    }

    let email_address = trimmed(input.email.as_deref()).map(|e| e.to_lowercase());
    match email_address.as_deref() {
        Some(e) => {
            failures.check("email", email()("email", e));
        }
        None => {
            failures.check("email", required("email", None));
        }
    }

    // Fulfilment
    let delivery_date = match trimmed(input.delivery_date.as_deref()) {
        Some(d) => failures.check("deliveryDate", date_not_before(today)("deliveryDate", &d)),
        None => {
            failures.check("deliveryDate", required("deliveryDate", None));
            None
        }
    };

    let delivery_type = match identifier(input.delivery_type.as_deref()) {
        Some(t) => failures
            .check("deliveryType", in_list(DELIVERY_TYPES)("deliveryType", &t))
            .and_then(|_| t.parse::<DeliveryType>().ok()),
        None => Some(DeliveryType::default()),
    };

    let delivery_address = trimmed(input.delivery_address.as_deref());
    if delivery_type == Some(DeliveryType::Delivery) && delivery_address.is_none() {
        failures.check::<()>(
            "deliveryAddress",
            Err("deliveryAddress is required for delivery orders".to_string()),
        );
    }

    let special_instructions = trimmed(input.special_instructions.as_deref());
    if let Some(text) = special_instructions.as_deref() {
        failures.check(
            "specialInstructions",
            max_chars(MAX_INSTRUCTIONS_CHARS)("specialInstructions", text),
        );
    }

    let payment_method = match identifier(input.payment_method.as_deref()) {
        Some(m) => failures
            .check("paymentMethod", in_list(PAYMENT_METHODS)("paymentMethod", &m))
            .and_then(|_| m.parse::<PaymentMethod>().ok()),
        None => Some(PaymentMethod::default()),
    };

    // Design
    let layers = input.layers.unwrap_or(DEFAULT_LAYERS);
    let layers = failures
        .check("layers", within_range(MIN_LAYERS, MAX_LAYERS)("layers", layers))
        .map(|_| layers as u8);

    // Oversized arrays are rejected on their raw length, before any normalising
    let raw_toppings = input.toppings.as_deref().unwrap_or_default();
    let toppings = if raw_toppings.len() > MAX_RAW_TOPPINGS {
        failures.check("toppings", max_items(MAX_TOPPINGS)("toppings", raw_toppings.len()));
        Vec::new()
    } else {
        let toppings = dedup_identifiers(raw_toppings, MAX_TOPPINGS + 1);
        failures.check("toppings", max_items(MAX_TOPPINGS)("toppings", toppings.len()));
        toppings
    };

    // The message is kept verbatim apart from surrounding whitespace
    let message = trimmed(input.message.as_deref());
    if let Some(text) = message.as_deref() {
        failures.check("message", max_chars(MAX_MESSAGE_CHARS)("message", text));
    }

    if !failures.0.is_empty() {
        return Err(failures.0);
    }

    // Every rule passed, so every checked value is present
    match (
        customer_name,
        phone_number,
        email_address,
        delivery_date,
        delivery_type,
        payment_method,
        layers,
    ) {
        (
            Some(customer_name),
            Some(phone),
            Some(email),
            Some(delivery_date),
            Some(delivery_type),
            Some(payment_method),
            Some(layers),
        ) => Ok(ValidatedOrder {
            customer_name,
            phone,
            email,
            delivery_date,
            delivery_type,
            delivery_address: match delivery_type {
                DeliveryType::Delivery => delivery_address,
                DeliveryType::Pickup => None,
            },
            special_instructions,
            payment_method,
            design: CakeDesign {
                base: identifier(input.base.as_deref()).unwrap_or_else(|| DEFAULT_BASE.into()),
                frosting: identifier(input.frosting.as_deref())
                    .unwrap_or_else(|| DEFAULT_FROSTING.into()),
                size: identifier(input.size.as_deref()).unwrap_or_else(|| DEFAULT_SIZE.into()),
                layers,
                toppings,
                message,
                colors: colors(input.colors.as_ref()),
            },
        }),
        _ => Err(vec![FieldValidationError::new(
            "order",
            "Order could not be validated",
        )]),
    }
}

fn colors(input: Option<&ColorsInput>) -> CakeColors {
    let defaults = CakeColors::default();
    let Some(input) = input else {
        return defaults;
    };
    CakeColors {
        cake: trimmed(input.cake.as_deref()).unwrap_or(defaults.cake),
        frosting: trimmed(input.frosting.as_deref()).unwrap_or(defaults.frosting),
        decorations: trimmed(input.decorations.as_deref()).unwrap_or(defaults.decorations),
    }
}
