//! Value types with a fixed wire representation.
//!
//! Each type renders itself through `Display`; the serializer only ever sees
//! the rendered string.

mod country;
mod custom_variables;
mod ecommerce;
pub mod language;
mod resolution;
mod timestamp;
mod unique_id;
mod visitor_id;

pub use country::Country;
pub use custom_variables::{CustomVariable, CustomVariables};
pub use ecommerce::{EcommerceItem, EcommerceItems};
pub use language::{AcceptLanguage, LanguageRange};
pub use resolution::DeviceResolution;
pub use timestamp::UnixTimestamp;
pub use unique_id::UniqueId;
pub use visitor_id::VisitorId;

/// Quotes and escapes a string as a JSON string literal.
fn json_string(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}
