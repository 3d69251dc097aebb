//! Email content for order notifications

use crate::core::order::{DeliveryType, Order, OrderStatus, PaymentMethod};
use crate::notify::OrderNotification;

/// Rendered message, provider-agnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl EmailMessage {
    pub fn render(notification: &OrderNotification, shop_name: &str) -> Self {
        match notification {
            OrderNotification::Placed { order } => confirmation(order, shop_name),
            OrderNotification::StatusChanged { order, previous } => {
                status_update(order, *previous, shop_name)
            }
        }
    }
}

fn long_date(date: chrono::NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

fn status_blurb(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "We have received your order.",
        OrderStatus::Preparing => "Your cake is being prepared by our bakers!",
        OrderStatus::Ready => "Your cake is ready!",
        OrderStatus::Completed => "Thank you for your order. Enjoy your cake!",
        OrderStatus::Cancelled => "Your order has been cancelled. Contact us for assistance.",
    }
}

fn confirmation(order: &Order, shop_name: &str) -> EmailMessage {
    let design = &order.design;
    let mut text = String::new();
    text.push_str(&format!("{} ORDER CONFIRMATION\n\n", shop_name.to_uppercase()));
    text.push_str(&format!("Order ID: {}\n", order.order_id));
    text.push_str(&format!("Customer: {}\n", order.customer_name));
    text.push_str(&format!("Phone: {}\n", order.phone));
    text.push_str(&format!("Status: {}\n\n", order.status));

    text.push_str("YOUR CAKE\n");
    text.push_str(&format!("Base: {}\n", design.base));
    text.push_str(&format!("Frosting: {}\n", design.frosting));
    text.push_str(&format!("Size: {}\n", design.size));
    text.push_str(&format!("Layers: {}\n", design.layers));
    if !design.toppings.is_empty() {
        text.push_str(&format!("Toppings: {}\n", design.toppings.join(", ")));
    }
    if let Some(message) = &design.message {
        text.push_str(&format!("Message: \"{}\"\n", message));
    }

    text.push_str("\nDELIVERY\n");
    text.push_str(&format!("Date: {}\n", long_date(order.delivery_date)));
    text.push_str(match order.delivery_type {
        DeliveryType::Delivery => "Type: Home Delivery\n",
        DeliveryType::Pickup => "Type: Store Pickup\n",
    });
    if let Some(address) = &order.delivery_address {
        text.push_str(&format!("Address: {}\n", address));
    }

    text.push_str("\nPAYMENT\n");
    text.push_str(&format!("Total: ${:.2}\n", order.total_price));
    text.push_str(match order.payment_method {
        PaymentMethod::Cash => "Payment Method: Cash\n",
        PaymentMethod::Card | PaymentMethod::Online => "Payment Method: Card/Online\n",
    });
    text.push_str(&format!(
        "\nThank you for choosing {}! We'll let you know when your cake is ready.\n",
        shop_name
    ));

    let html = format!(
        "<h1>{shop}</h1>\
         <p>Hi {name}, your order <strong>#{id}</strong> is confirmed.</p>\
         <p>{size} {base} cake with {frosting} frosting, {layers} layers.</p>\
         <p>{kind} on {date}</p>\
         <p>Total: <strong>${total:.2}</strong></p>",
        shop = escape(shop_name),
        name = escape(&order.customer_name),
        id = escape(&order.order_id),
        size = escape(&design.size),
        base = escape(&design.base),
        frosting = escape(&design.frosting),
        layers = design.layers,
        kind = match order.delivery_type {
            DeliveryType::Delivery => "Delivery",
            DeliveryType::Pickup => "Pickup",
        },
        date = long_date(order.delivery_date),
        total = order.total_price,
    );

    EmailMessage {
        to: order.email.clone(),
        subject: format!("Your Cake Order #{} is Confirmed!", order.order_id),
        text,
        html,
    }
}

fn status_update(order: &Order, previous: OrderStatus, shop_name: &str) -> EmailMessage {
    let text = format!(
        "Hi {},\n\nYour order {} changed from {} to {}.\n{}\n\n{}\n",
        order.customer_name,
        order.order_id,
        previous,
        order.status,
        status_blurb(order.status),
        shop_name
    );
    let html = format!(
        "<h1>Order Status Updated</h1>\
         <p>Order <strong>#{}</strong></p>\
         <p>Status changed to: <strong>{}</strong></p>\
         <p>{}</p>",
        escape(&order.order_id),
        order.status,
        status_blurb(order.status)
    );

    EmailMessage {
        to: order.email.clone(),
        subject: format!("Order #{} Status Update: {}", order.order_id, order.status),
        text,
        html,
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
