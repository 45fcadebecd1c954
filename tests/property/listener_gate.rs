// Copyright (c) 2025 - Cowboy AI, Inc.
//! Header gate properties
//!
//! Only a request carrying the exact token reaches the target group;
//! everything else gets the fixed 403.

use proptest::prelude::*;
use rim_infrastructure::domain::listener::TOKEN_HEADER;
use rim_infrastructure::domain::{HttpRequest, Listener, ListenerAction};

const TOKEN: &str = "s3cret-token";

fn listener() -> Listener {
    Listener::header_gated("WebappTg", TOKEN).expect("single rule is valid")
}

fn header_name_casing() -> impl Strategy<Value = String> {
    prop::collection::vec(any::<bool>(), TOKEN_HEADER.len()).prop_map(|upper| {
        TOKEN_HEADER
            .chars()
            .zip(upper)
            .map(|(c, up)| if up { c.to_ascii_uppercase() } else { c.to_ascii_lowercase() })
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_exact_token_forwards(name in header_name_casing()) {
        let listener = listener();
        let request = HttpRequest::new().with_header(name, TOKEN);

        prop_assert!(listener.route(&request).is_forward());
    }

    #[test]
    fn prop_other_values_are_forbidden(value in "\\PC{0,40}") {
        prop_assume!(value != TOKEN);
        let listener = listener();
        let request = HttpRequest::new().with_header(TOKEN_HEADER, value);
        let forbidden = ListenerAction::forbidden();

        prop_assert_eq!(listener.route(&request), &forbidden);
    }

    #[test]
    fn prop_token_under_another_header_is_forbidden(name in "[A-Za-z-]{1,20}") {
        prop_assume!(!name.eq_ignore_ascii_case(TOKEN_HEADER));
        let listener = listener();
        let request = HttpRequest::new().with_header(name, TOKEN);

        prop_assert!(!listener.route(&request).is_forward());
    }

    #[test]
    fn prop_extra_headers_do_not_matter(
        extra in prop::collection::vec(("[a-z]{1,10}", "[a-z0-9]{0,10}"), 0..5),
    ) {
        let listener = listener();
        let mut request = HttpRequest::new();
        for (name, value) in extra {
            request = request.with_header(name, value);
        }

        prop_assert!(!listener.route(&request).is_forward());
        let request = request.with_header(TOKEN_HEADER, TOKEN);
        prop_assert!(listener.route(&request).is_forward());
    }
}
