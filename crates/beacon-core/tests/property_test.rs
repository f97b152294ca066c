//! Property tests for query serialization.

use beacon_core::{QuerySerializer, TrackingAction};
use proptest::prelude::*;

fn action_strategy() -> impl Strategy<Value = TrackingAction> {
    (
        proptest::option::of(any::<i64>()),
        proptest::option::of(".{0,40}"),
        proptest::option::of(".{0,40}"),
        proptest::option::of(any::<bool>()),
        proptest::option::of(any::<i64>()),
    )
        .prop_map(|(site_id, name, search, ping, generation_time)| TrackingAction {
            site_id,
            name,
            search,
            ping,
            generation_time,
            ..TrackingAction::default()
        })
}

proptest! {
    #[test]
    fn serialization_is_deterministic(action in action_strategy(), default_site in proptest::option::of(1i64..1000)) {
        let serializer = QuerySerializer::new(default_site, None);
        prop_assert_eq!(serializer.serialize(&action), serializer.serialize(&action));
    }

    #[test]
    fn query_is_framed(action in action_strategy()) {
        let query = QuerySerializer::new(Some(1), None).serialize(&action).unwrap();

        prop_assert!(query.starts_with("rec=1&"));
        prop_assert!(query.ends_with("&send_image=0"));
        prop_assert_eq!(query.matches("idsite=").count(), 1);
    }

    #[test]
    fn values_never_leak_separators(name in ".{0,40}") {
        let query = QuerySerializer::default()
            .serialize(&TrackingAction::new().name(name))
            .unwrap();

        // rec, action_name and send_image
        prop_assert_eq!(query.split('&').count(), 3);
        prop_assert!(query.split('&').all(|pair| pair.matches('=').count() == 1));
    }

    #[test]
    fn site_id_precedes_other_parameters(site_id in any::<i64>(), search in "[a-z]{1,10}") {
        let query = QuerySerializer::default()
            .serialize(&TrackingAction::new().search(search).site_id(site_id))
            .unwrap();

        let site = query.find("idsite=").unwrap();
        let search = query.find("search=").unwrap();
        prop_assert!(site < search);
    }
}
