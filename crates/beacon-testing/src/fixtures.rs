//! Tracking action fixtures.

use beacon_core::{
    AcceptLanguage, Country, CustomVariables, DeviceResolution, EcommerceItem, EcommerceItems,
    LanguageRange, TrackingAction, UniqueId, UnixTimestamp, VisitorId,
};
use chrono::{TimeZone, Utc};

/// A valid 32 character auth token.
pub const TEST_TOKEN: &str = "fdf6e8461ea9de33176b222519627f78";

/// Query produced by [`full_action`] with a default site id of 42 and no
/// default token.
pub const FULL_ACTION_QUERY: &str = concat!(
    "rec=1&idsite=42&action_name=Help+%2F+Feedback&url=https%3A%2F%2Fwww.daniel-heid.de%2Fportfolio",
    "&_id=6749be5b2c42af00&urlref=https%3A%2F%2Fwww.daniel-heid.de%2Freferrer",
    "&_cvar=%7B%221%22%3A%5B%22customVariable1Key%22%2C%22customVariable1Value%22%5D",
    "%2C%222%22%3A%5B%22customVariable2Key%22%2C%22customVariable2Value%22%5D%7D",
    "&_idvc=2&_viewts=1660070052&res=1024x768&lang=de%2Cde-de%3Bq%3D0.9%2Cen%3Bq%3D0.8",
    "&pv_id=lbBbxG&revenue=12.34&gt_ms=30000",
    "&ec_items=%5B%5B%22SKU%22%2C%22%22%2C%22%22%2C0.000000%2C0%5D",
    "%2C%5B%22SKU%22%2C%22NAME%22%2C%22CATEGORY%22%2C123.400000%2C0%5D%5D",
    "&token_auth=fdf6e8461ea9de33176b222519627f78&country=de&send_image=0",
);

/// A page view with only a name.
pub fn page_view(name: &str) -> TrackingAction {
    TrackingAction::new().name(name)
}

/// An action that exercises most value formatters.
pub fn full_action() -> TrackingAction {
    TrackingAction::new()
        .name("Help / Feedback")
        .url("https://www.daniel-heid.de/portfolio")
        .visitor_id(VisitorId::from_hash(3_434_343_434_343_434_343))
        .referrer_url("https://www.daniel-heid.de/referrer")
        .visit_custom_variables(
            CustomVariables::new()
                .variable("customVariable1Key", "customVariable1Value")
                .variable("customVariable2Key", "customVariable2Value"),
        )
        .visit_count(2)
        .previous_visit_timestamp(UnixTimestamp::from_datetime(
            Utc.with_ymd_and_hms(2022, 8, 9, 18, 34, 12).single().expect("valid timestamp"),
        ))
        .device_resolution(DeviceResolution::new(1024, 768))
        .language(
            AcceptLanguage::new()
                .range(LanguageRange::new("de"))
                .range(weighted("de-DE", 0.9))
                .range(weighted("en", 0.8)),
        )
        .page_view_id(UniqueId::from_value(999_999_999_999_999_999))
        .revenue(12.34)
        .generation_time(30_000)
        .ecommerce_items(
            EcommerceItems::new()
                .item(EcommerceItem::new("SKU"))
                .item(EcommerceItem::new("SKU").name("NAME").category("CATEGORY").price(123.4)),
        )
        .token_auth(TEST_TOKEN)
        .country(Country::from_code("DE").ok().flatten().expect("valid country code"))
}

fn weighted(range: &str, weight: f64) -> LanguageRange {
    LanguageRange::with_weight(range, weight).expect("weight within 0..=1")
}

#[cfg(test)]
mod tests {
    use beacon_core::QuerySerializer;

    use super::*;

    #[test]
    fn full_action_matches_its_query() {
        let query = QuerySerializer::new(Some(42), None).serialize(&full_action()).unwrap();
        assert_eq!(query, FULL_ACTION_QUERY);
    }

    #[test]
    fn page_view_has_only_a_name() {
        let action = page_view("Home");
        assert_eq!(action, TrackingAction::new().name("Home"));
    }
}
