//! Property-based tests for error module.
//!
//! These check that every error message carries the context a user needs
//! once it has been flattened into a soft-error text item.

use proptest::prelude::*;

use crate::error::Error;

/// Generate valid HTTP status codes (100-599)
fn http_status_strategy() -> impl Strategy<Value = u16> {
    100u16..600u16
}

/// Generate Gemini endpoint URLs for either backend
fn endpoint_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z0-9.-]{3,30}".prop_map(|model| format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            model
        )),
        ("[a-z]{2,6}-[a-z]{3,9}[0-9]", "[a-z][a-z0-9-]{5,20}").prop_map(|(location, project)| {
            format!(
                "https://{0}-aiplatform.googleapis.com/v1/projects/{1}/locations/{0}/publishers/google/models/m:generateContent",
                location, project
            )
        }),
    ]
}

/// Generate error messages
fn message_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 ]{1,100}"
}

proptest! {
    /// API errors include the endpoint, the HTTP status code and the message.
    #[test]
    fn api_error_includes_endpoint_and_status(
        endpoint in endpoint_strategy(),
        status_code in http_status_strategy(),
        message in message_strategy()
    ) {
        let err_string = Error::api(&endpoint, status_code, &message).to_string();

        prop_assert!(
            err_string.contains(&endpoint),
            "API error should include endpoint '{}' in message: {}",
            endpoint,
            err_string
        );
        prop_assert!(
            err_string.contains(&status_code.to_string()),
            "API error should include status code '{}' in message: {}",
            status_code,
            err_string
        );
        prop_assert!(err_string.contains(&message));
    }

    /// Generic failures render exactly their message.
    #[test]
    fn other_error_is_message_verbatim(message in message_strategy()) {
        prop_assert_eq!(Error::other(message.clone()).to_string(), message);
    }

    /// Refusals and malformed replies render exactly their message.
    #[test]
    fn response_errors_are_message_verbatim(message in message_strategy()) {
        prop_assert_eq!(Error::content_refused(message.clone()).to_string(), message.clone());
        prop_assert_eq!(Error::malformed_response(message.clone()).to_string(), message);
    }
}
