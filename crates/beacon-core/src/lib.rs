//! Core model for the beacon tracker.
//!
//! Holds the [`TrackingAction`] users fill in, the value types with a fixed
//! wire format, the parameter schema, and the [`QuerySerializer`] that turns
//! an action into the query string sent to the analytics server.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod action;
pub mod error;
pub mod parameters;
pub mod query;
pub mod schema;

pub use action::TrackingAction;
pub use error::{ParameterError, Result};
pub use parameters::{
    AcceptLanguage, Country, CustomVariable, CustomVariables, DeviceResolution, EcommerceItem,
    EcommerceItems, LanguageRange, UniqueId, UnixTimestamp, VisitorId,
};
pub use query::{create_query, QuerySerializer};
pub use schema::{ParameterValue, ToParameterValue, TrackingParameter};
