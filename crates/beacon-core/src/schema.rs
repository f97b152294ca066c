//! The parameter schema: every wire parameter a [`TrackingAction`] can carry,
//! in the order it appears in the query string.
//!
//! Each entry pairs a wire name with an accessor that reads the value off
//! the action and an optional pattern the rendered text must fully match.
//! The serializer walks this table; adding a parameter means adding a field
//! to the action and a row here.

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    action::TrackingAction,
    error::{ParameterError, Result},
    parameters::{
        AcceptLanguage, Country, CustomVariables, DeviceResolution, EcommerceItems, UniqueId,
        UnixTimestamp, VisitorId,
    },
};

/// A parameter value as read from an action, before encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    /// Free text, subject to the parameter's pattern
    Text(String),
    /// Boolean flag, rendered as `1` or `0`
    Flag(bool),
    /// Output of a value formatter or a number
    Formatted(String),
}

impl ParameterValue {
    /// The unencoded wire representation.
    pub fn render(&self) -> String {
        match self {
            Self::Text(text) | Self::Formatted(text) => text.clone(),
            Self::Flag(true) => "1".to_owned(),
            Self::Flag(false) => "0".to_owned(),
        }
    }
}

/// Conversion of an action field into a [`ParameterValue`].
pub trait ToParameterValue {
    /// Converts the field value.
    fn to_parameter_value(&self) -> ParameterValue;
}

impl ToParameterValue for String {
    fn to_parameter_value(&self) -> ParameterValue {
        ParameterValue::Text(self.clone())
    }
}

impl ToParameterValue for bool {
    fn to_parameter_value(&self) -> ParameterValue {
        ParameterValue::Flag(*self)
    }
}

macro_rules! formatted {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ToParameterValue for $ty {
                fn to_parameter_value(&self) -> ParameterValue {
                    ParameterValue::Formatted(self.to_string())
                }
            }
        )*
    };
}

formatted!(
    i32,
    i64,
    f64,
    AcceptLanguage,
    Country,
    CustomVariables,
    DeviceResolution,
    EcommerceItems,
    UniqueId,
    UnixTimestamp,
    VisitorId,
);

type Accessor = fn(&TrackingAction) -> Option<ParameterValue>;

/// One row of the schema.
pub struct TrackingParameter {
    name: &'static str,
    accessor: Accessor,
    pattern: Option<(&'static str, Regex)>,
}

impl TrackingParameter {
    fn new(name: &'static str, accessor: Accessor) -> Self {
        Self { name, accessor, pattern: None }
    }

    fn with_pattern(mut self, pattern: &'static str) -> Self {
        // Anchored so the whole value must match, not just a substring.
        let regex = Regex::new(&format!("^(?:{pattern})$"))
            .unwrap_or_else(|e| panic!("invalid pattern for {}: {e}", self.name));
        self.pattern = Some((pattern, regex));
        self
    }

    /// Wire name of the parameter.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The pattern text values must match, if any.
    pub fn pattern(&self) -> Option<&'static str> {
        self.pattern.as_ref().map(|(raw, _)| *raw)
    }

    /// Reads this parameter off an action.
    pub fn value(&self, action: &TrackingAction) -> Option<ParameterValue> {
        (self.accessor)(action)
    }

    /// Checks a value against the pattern. Only text values are checked.
    pub fn validate(&self, value: &ParameterValue) -> Result<()> {
        match (value, &self.pattern) {
            (ParameterValue::Text(text), Some((raw, regex))) if !regex.is_match(text) => {
                Err(ParameterError::invalid_value(self.name, *raw))
            },
            _ => Ok(()),
        }
    }
}

impl std::fmt::Debug for TrackingParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackingParameter")
            .field("name", &self.name)
            .field("pattern", &self.pattern())
            .finish()
    }
}

macro_rules! parameter {
    ($name:literal => $field:ident) => {
        TrackingParameter::new($name, |action| {
            action.$field.as_ref().map(ToParameterValue::to_parameter_value)
        })
    };
}

static PARAMETERS: LazyLock<Vec<TrackingParameter>> = LazyLock::new(|| {
    vec![
        parameter!("idsite" => site_id),
        parameter!("action_name" => name),
        parameter!("url" => url),
        parameter!("_id" => visitor_id),
        parameter!("urlref" => referrer_url),
        parameter!("_cvar" => visit_custom_variables),
        parameter!("_idvc" => visit_count),
        parameter!("_viewts" => previous_visit_timestamp),
        parameter!("_idts" => first_visit_timestamp),
        parameter!("_rcn" => campaign_name),
        parameter!("_rck" => campaign_keyword),
        parameter!("res" => device_resolution),
        parameter!("h" => hour),
        parameter!("m" => minute),
        parameter!("s" => second),
        parameter!("fla" => flash_plugin),
        parameter!("java" => java_plugin),
        parameter!("dir" => director_plugin),
        parameter!("qt" => quicktime_plugin),
        parameter!("realp" => realplayer_plugin),
        parameter!("pdf" => pdf_plugin),
        parameter!("wma" => windows_media_plugin),
        parameter!("gears" => gears_plugin),
        parameter!("ag" => silverlight_plugin),
        parameter!("cookie" => supports_cookies),
        parameter!("ua" => user_agent),
        parameter!("lang" => language),
        parameter!("uid" => user_id),
        parameter!("cid" => customer_id),
        parameter!("new_visit" => new_visit),
        parameter!("cvar" => page_custom_variables),
        parameter!("link" => link),
        parameter!("download" => download),
        parameter!("search" => search),
        parameter!("search_cat" => search_category),
        parameter!("search_count" => search_count),
        parameter!("pv_id" => page_view_id),
        parameter!("idgoal" => goal_id),
        parameter!("revenue" => revenue),
        parameter!("gt_ms" => generation_time),
        parameter!("cs" => charset),
        parameter!("ca" => custom_action),
        parameter!("pf_net" => network_time),
        parameter!("pf_srv" => server_time),
        parameter!("pf_tfr" => transfer_time),
        parameter!("pf_dm1" => dom_processing_time),
        parameter!("pf_dm2" => dom_completion_time),
        parameter!("pf_onl" => onload_time),
        parameter!("e_c" => event_category),
        parameter!("e_a" => event_action),
        parameter!("e_n" => event_name),
        parameter!("e_v" => event_value),
        parameter!("c_n" => content_name),
        parameter!("c_p" => content_piece),
        parameter!("c_t" => content_target),
        parameter!("c_i" => content_interaction),
        parameter!("ec_id" => ecommerce_id),
        parameter!("ec_items" => ecommerce_items),
        parameter!("ec_st" => sub_total),
        parameter!("ec_tx" => tax_amount),
        parameter!("ec_sh" => shipping_cost),
        parameter!("ec_dt" => discount),
        parameter!("_ects" => ecommerce_timestamp),
        TrackingParameter::new("token_auth", |action| {
            action.effective_token_auth().map(|token| ParameterValue::Text(token.to_owned()))
        })
        .with_pattern("[a-z0-9]{32}"),
        parameter!("cip" => custom_ip),
        parameter!("cdt" => custom_datetime),
        parameter!("country" => country),
        parameter!("region" => region),
        parameter!("city" => city),
        parameter!("lat" => latitude),
        parameter!("long" => longitude),
        parameter!("queuedtracking" => queued_tracking),
        parameter!("ping" => ping),
        parameter!("bots" => bots),
    ]
});

/// All parameters in wire order.
pub fn parameters() -> &'static [TrackingParameter] {
    &PARAMETERS
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn parameter(name: &str) -> &'static TrackingParameter {
        parameters().iter().find(|p| p.name() == name).unwrap()
    }

    #[test]
    fn wire_names_are_unique() {
        let names: HashSet<_> = parameters().iter().map(TrackingParameter::name).collect();
        assert_eq!(names.len(), parameters().len());
    }

    #[test]
    fn site_id_comes_first() {
        assert_eq!(parameters()[0].name(), "idsite");
    }

    #[test]
    fn send_image_is_not_a_schema_entry() {
        assert!(parameters().iter().all(|p| p.name() != "send_image"));
    }

    #[test]
    fn token_pattern_requires_full_match() {
        let token = parameter("token_auth");

        assert!(token.validate(&ParameterValue::Text("a".repeat(32))).is_ok());
        assert!(token.validate(&ParameterValue::Text("a".repeat(33))).is_err());
        assert!(token.validate(&ParameterValue::Text("A".repeat(32))).is_err());
    }

    #[test]
    fn blank_token_is_not_read() {
        let action = TrackingAction::new().token_auth(" ");
        assert_eq!(parameter("token_auth").value(&action), None);
    }

    #[test]
    fn flags_render_as_digits() {
        assert_eq!(ParameterValue::Flag(true).render(), "1");
        assert_eq!(ParameterValue::Flag(false).render(), "0");
    }

    #[test]
    fn event_value_has_its_own_name() {
        let action = TrackingAction::new().event_name("Play").event_value(1.5);

        assert_eq!(parameter("e_n").value(&action), Some(ParameterValue::Text("Play".into())));
        assert_eq!(parameter("e_v").value(&action), Some(ParameterValue::Formatted("1.5".into())));
    }
}
