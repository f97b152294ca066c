//! The tracked action: one page view, click, search, event or ecommerce
//! interaction.
//!
//! Every field is optional. Setters consume and return the action so it can
//! be assembled fluently:
//!
//! ```
//! use beacon_core::TrackingAction;
//!
//! let action = TrackingAction::new()
//!     .name("Help / Feedback")
//!     .url("https://example.org/help")
//!     .supports_cookies(true);
//!
//! assert_eq!(action.name.as_deref(), Some("Help / Feedback"));
//! ```

use serde::{Deserialize, Serialize};

use crate::parameters::{
    AcceptLanguage, Country, CustomVariables, DeviceResolution, EcommerceItems, UniqueId,
    UnixTimestamp, VisitorId,
};

macro_rules! tracking_action {
    ($($(#[doc = $doc:literal])* $field:ident: $ty:ty,)*) => {
        /// Describes the action that should be tracked.
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(default, deny_unknown_fields)]
        pub struct TrackingAction {
            $(
                $(#[doc = $doc])*
                pub $field: Option<$ty>,
            )*
        }

        impl TrackingAction {
            $(
                $(#[doc = $doc])*
                pub fn $field(mut self, value: impl Into<$ty>) -> Self {
                    self.$field = Some(value.into());
                    self
                }
            )*
        }
    };
}

tracking_action! {
    /// Id of the tracked website. Only needed when no default is configured.
    site_id: i64,
    /// Title of the action. Slashes create categories, so `Help / Feedback`
    /// records `Feedback` in the `Help` category.
    name: String,
    /// Full URL of the current action.
    url: String,
    /// Unique visitor id.
    visitor_id: VisitorId,
    /// Full HTTP referrer URL.
    referrer_url: String,
    /// Visit scoped custom variables.
    visit_custom_variables: CustomVariables,
    /// Number of visits of this visitor so far.
    visit_count: i64,
    /// Timestamp of this visitor's previous visit.
    previous_visit_timestamp: UnixTimestamp,
    /// Timestamp of this visitor's first visit.
    first_visit_timestamp: UnixTimestamp,
    /// Campaign name, only used for the first page view of a visit.
    campaign_name: String,
    /// Campaign keyword, only used for the first page view of a visit.
    campaign_keyword: String,
    /// Resolution of the visitor's device.
    device_resolution: DeviceResolution,
    /// Current hour, local time.
    hour: i32,
    /// Current minute, local time.
    minute: i32,
    /// Current second, local time.
    second: i32,
    /// Flash plugin present.
    flash_plugin: bool,
    /// Java plugin present.
    java_plugin: bool,
    /// Director plugin present.
    director_plugin: bool,
    /// Quicktime plugin present.
    quicktime_plugin: bool,
    /// RealPlayer plugin present.
    realplayer_plugin: bool,
    /// PDF plugin present.
    pdf_plugin: bool,
    /// Windows Media plugin present.
    windows_media_plugin: bool,
    /// Gears plugin present.
    gears_plugin: bool,
    /// Silverlight plugin present.
    silverlight_plugin: bool,
    /// Client is known to support cookies.
    supports_cookies: bool,
    /// Override for the User-Agent of the visitor.
    user_agent: String,
    /// Override for the Accept-Language of the visitor.
    language: AcceptLanguage,
    /// User id; forces the visit onto this user.
    user_id: String,
    /// Visitor id enforced for this request.
    customer_id: VisitorId,
    /// Forces a new visit for this action.
    new_visit: bool,
    /// Page scoped custom variables.
    page_custom_variables: CustomVariables,
    /// External URL opened by the visitor (outlink).
    link: String,
    /// URL of a downloaded file.
    download: String,
    /// Site search keyword.
    search: String,
    /// Site search category.
    search_category: String,
    /// Number of site search results.
    search_count: i64,
    /// Page view id shared by all requests of one page view.
    page_view_id: UniqueId,
    /// Goal to convert.
    goal_id: String,
    /// Revenue of the goal conversion or order.
    revenue: f64,
    /// Server generation time in milliseconds.
    generation_time: i64,
    /// Charset of the tracked page.
    charset: String,
    /// Marks a request that is not a page view.
    custom_action: bool,
    /// Network time in milliseconds.
    network_time: i64,
    /// Server response time in milliseconds.
    server_time: i64,
    /// Transfer time in milliseconds.
    transfer_time: i64,
    /// DOM processing time in milliseconds.
    dom_processing_time: i64,
    /// DOM completion time in milliseconds.
    dom_completion_time: i64,
    /// Onload time in milliseconds.
    onload_time: i64,
    /// Event category, e.g. `Videos`.
    event_category: String,
    /// Event action, e.g. `Play`.
    event_action: String,
    /// Event name, e.g. a movie title.
    event_name: String,
    /// Numeric event value.
    event_value: f64,
    /// Content name.
    content_name: String,
    /// Content piece, e.g. an image path.
    content_piece: String,
    /// Content target, e.g. a landing page URL.
    content_target: String,
    /// Content interaction, e.g. `click`.
    content_interaction: String,
    /// Unique order id, required when tracking an order.
    ecommerce_id: String,
    /// Items of the order or cart.
    ecommerce_items: EcommerceItems,
    /// Order sub total excluding shipping.
    sub_total: f64,
    /// Order tax amount.
    tax_amount: f64,
    /// Order shipping cost.
    shipping_cost: f64,
    /// Order discount.
    discount: f64,
    /// Timestamp of this customer's previous order.
    ecommerce_timestamp: UnixTimestamp,
    /// 32 character authorization key. Blank values count as absent.
    token_auth: String,
    /// Override for the visitor IP.
    custom_ip: String,
    /// Override for the request time.
    custom_datetime: UnixTimestamp,
    /// Override for the visitor country.
    country: Country,
    /// Override for the visitor region (ISO 3166-2).
    region: String,
    /// Override for the visitor city.
    city: String,
    /// Override for the visitor latitude.
    latitude: f64,
    /// Override for the visitor longitude.
    longitude: f64,
    /// Set to false to bypass the queued tracking handler.
    queued_tracking: bool,
    /// Heartbeat request that only extends the visit.
    ping: bool,
    /// Track requests from bots.
    bots: bool,
}

impl TrackingAction {
    /// Creates an action without any field set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The action's own auth token, unless it is blank.
    pub fn effective_token_auth(&self) -> Option<&str> {
        self.token_auth.as_deref().filter(|token| !token.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_fill_fields() {
        let action = TrackingAction::new().site_id(7).visit_count(2).revenue(12.34).ping(true);

        assert_eq!(action.site_id, Some(7));
        assert_eq!(action.visit_count, Some(2));
        assert_eq!(action.revenue, Some(12.34));
        assert_eq!(action.ping, Some(true));
        assert_eq!(action.url, None);
    }

    #[test]
    fn blank_token_is_not_effective() {
        assert_eq!(TrackingAction::new().token_auth("   ").effective_token_auth(), None);
        assert_eq!(TrackingAction::new().token_auth("abc").effective_token_auth(), Some("abc"));
    }

    #[test]
    fn deserializes_partial_json() {
        let action: TrackingAction =
            serde_json::from_str(r#"{"name":"Home","visitor_id":"6749be5b2c42af00","country":"DE"}"#)
                .unwrap();

        assert_eq!(action.name.as_deref(), Some("Home"));
        assert_eq!(action.visitor_id, Some(VisitorId::from_hash(3_434_343_434_343_434_343)));
        assert_eq!(action.country.map(|c| c.to_string()).as_deref(), Some("de"));
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(serde_json::from_str::<TrackingAction>(r#"{"nmae":"typo"}"#).is_err());
    }
}
