//! Serializes a [`TrackingAction`] into a tracking query string.
//!
//! The query always starts with `rec=1` and ends with `send_image=0`. In
//! between come the configured defaults the action does not override,
//! followed by every present schema parameter in wire order. Values are
//! form-urlencoded, so spaces become `+`.

use url::form_urlencoded::byte_serialize;

use crate::{action::TrackingAction, error::Result, schema::parameters};

/// Turns actions into query strings, filling in configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuerySerializer {
    default_site_id: Option<i64>,
    default_token_auth: Option<String>,
}

impl QuerySerializer {
    /// Creates a serializer. A blank default token is treated as absent.
    pub fn new(default_site_id: Option<i64>, default_token_auth: Option<String>) -> Self {
        let default_token_auth = default_token_auth.filter(|token| !token.trim().is_empty());
        Self { default_site_id, default_token_auth }
    }

    /// Site id used for actions without one.
    pub fn default_site_id(&self) -> Option<i64> {
        self.default_site_id
    }

    /// Auth token used for actions without one.
    pub fn default_token_auth(&self) -> Option<&str> {
        self.default_token_auth.as_deref()
    }

    /// Builds the query string for `action`.
    ///
    /// Fails when a text value does not match its parameter's pattern;
    /// nothing is partially returned in that case.
    pub fn serialize(&self, action: &TrackingAction) -> Result<String> {
        let mut query = String::from("rec=1");

        if action.site_id.is_none() {
            if let Some(site_id) = self.default_site_id {
                append(&mut query, "idsite", &site_id.to_string());
            }
        }
        if action.effective_token_auth().is_none() {
            if let Some(token) = &self.default_token_auth {
                append(&mut query, "token_auth", token);
            }
        }

        for parameter in parameters() {
            let Some(value) = parameter.value(action) else {
                continue;
            };
            parameter.validate(&value)?;
            append(&mut query, parameter.name(), &value.render());
        }

        query.push_str("&send_image=0");
        Ok(query)
    }
}

/// Serializes `action` with the given defaults.
///
/// Shorthand for [`QuerySerializer::serialize`] when no serializer is kept
/// around.
pub fn create_query(
    action: &TrackingAction,
    default_site_id: Option<i64>,
    default_token_auth: Option<&str>,
) -> Result<String> {
    QuerySerializer::new(default_site_id, default_token_auth.map(str::to_owned)).serialize(action)
}

fn append(query: &mut String, name: &str, value: &str) {
    query.push('&');
    query.push_str(name);
    query.push('=');
    query.extend(byte_serialize(value.as_bytes()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_action_without_defaults() {
        let query = QuerySerializer::default().serialize(&TrackingAction::new()).unwrap();
        assert_eq!(query, "rec=1&send_image=0");
    }

    #[test]
    fn create_query_matches_serializer() {
        let action = TrackingAction::new().name("Home");
        assert_eq!(
            create_query(&action, Some(3), None).unwrap(),
            QuerySerializer::new(Some(3), None).serialize(&action).unwrap()
        );
    }

    #[test]
    fn blank_default_token_is_dropped() {
        let serializer = QuerySerializer::new(None, Some("  ".into()));
        assert_eq!(serializer.default_token_auth(), None);
    }

    #[test]
    fn spaces_encode_as_plus() {
        let query = QuerySerializer::default()
            .serialize(&TrackingAction::new().name("a b/c"))
            .unwrap();
        assert_eq!(query, "rec=1&action_name=a+b%2Fc&send_image=0");
    }
}
