use std::fmt;

use serde::{Deserialize, Serialize};

use super::json_string;

/// Something bought in an ecommerce order or placed in a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EcommerceItem {
    /// Stock keeping unit
    pub sku: String,
    /// Product name
    #[serde(default)]
    pub name: String,
    /// Product category
    #[serde(default)]
    pub category: String,
    /// Unit price
    #[serde(default)]
    pub price: f64,
    /// Number of units
    #[serde(default)]
    pub quantity: u64,
}

impl EcommerceItem {
    /// Creates an item with empty name and category, zero price and zero
    /// quantity.
    pub fn new(sku: impl Into<String>) -> Self {
        Self { sku: sku.into(), name: String::new(), category: String::new(), price: 0.0, quantity: 0 }
    }

    /// Sets the product name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the product category.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Sets the unit price.
    pub fn price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }

    /// Sets the quantity.
    pub fn quantity(mut self, quantity: u64) -> Self {
        self.quantity = quantity;
        self
    }
}

impl fmt::Display for EcommerceItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{},{},{},{:.6},{}]",
            json_string(&self.sku),
            json_string(&self.name),
            json_string(&self.category),
            self.price,
            self.quantity
        )
    }
}

/// Items of an ecommerce order, rendered as a JSON array of arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EcommerceItems(Vec<EcommerceItem>);

impl EcommerceItems {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an item.
    pub fn item(mut self, item: EcommerceItem) -> Self {
        self.0.push(item);
        self
    }

    /// The contained items.
    pub fn items(&self) -> &[EcommerceItem] {
        &self.0
    }
}

impl From<Vec<EcommerceItem>> for EcommerceItems {
    fn from(items: Vec<EcommerceItem>) -> Self {
        Self(items)
    }
}

impl fmt::Display for EcommerceItems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (index, item) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(f, "{item}")?;
        }
        f.write_str("]")
    }
}
