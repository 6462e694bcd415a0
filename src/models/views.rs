//! Read-only projections of products handed to templates.

use crate::config::OrderContact;
use crate::entities::product;

const UPLOADS_PATH: &str = "/uploads";
const WHATSAPP_BASE_URL: &str = "https://wa.me";

/// Product row as shown on the dashboard and management list.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductView {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub size: String,
    pub price: String,
    pub is_new_arrival: bool,
    pub image_url: String,
    pub created_at: String,
}

impl From<&product::Model> for ProductView {
    fn from(product: &product::Model) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            category: product.category.clone(),
            size: product.size.clone(),
            price: format_price(product.price),
            is_new_arrival: product.is_new_arrival,
            image_url: image_url(&product.image_filename),
            created_at: product.created_at.format("%d %b %Y, %H:%M").to_string(),
        }
    }
}

/// Product card on the public shop page.
#[derive(Debug, Clone, PartialEq)]
pub struct ShopProductView {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub size: String,
    pub price: String,
    pub is_new_arrival: bool,
    pub image_url: String,
    pub whatsapp_link: String,
}

impl ShopProductView {
    pub fn new(product: &product::Model, contact: &OrderContact) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            category: product.category.clone(),
            size: product.size.clone(),
            price: format_price(product.price),
            is_new_arrival: product.is_new_arrival,
            image_url: image_url(&product.image_filename),
            whatsapp_link: whatsapp_link(contact, &product.name),
        }
    }
}

pub fn order_message(shop_name: &str, product_name: &str) -> String {
    format!("Hello {shop_name}, I want to order {product_name}")
}

/// `https://wa.me/{number}?text={message}` with the message percent-encoded.
/// `/` stays literal; it is legal in a query string.
pub fn whatsapp_link(contact: &OrderContact, product_name: &str) -> String {
    let message = order_message(&contact.shop_name, product_name);
    format!(
        "{WHATSAPP_BASE_URL}/{}?text={}",
        contact.whatsapp_number,
        urlencoding::encode(&message).replace("%2F", "/")
    )
}

pub fn image_url(image_filename: &str) -> String {
    format!("{UPLOADS_PATH}/{}", urlencoding::encode(image_filename))
}

fn format_price(price: f64) -> String {
    format!("₹{price:.2}")
}
