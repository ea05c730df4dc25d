//! Confluence webhook endpoint.

use std::fmt;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::de::{Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Serialize};

use crate::http::request::RequestIdExt;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Payload posted by Confluence.
///
/// Member names match case-insensitively and the last matching member wins.
/// `null` leaves the zero value in place and unknown members are ignored; a
/// member of the wrong type is still an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfluenceWebhook {
    pub event: String,
    pub page: Page,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Page {
    pub id: i64,
    pub title: String,
}

fn member_is(key: &str, name: &str) -> bool {
    key.chars().flat_map(char::to_lowercase).eq(name.chars())
}

/// Overwrite `slot` unless the member is `null`.
fn assign<'de, A, T>(map: &mut A, slot: &mut T) -> Result<(), A::Error>
where
    A: MapAccess<'de>,
    T: Deserialize<'de>,
{
    if let Some(value) = map.next_value::<Option<T>>()? {
        *slot = value;
    }
    Ok(())
}

impl<'de> Deserialize<'de> for ConfluenceWebhook {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct WebhookVisitor;

        impl<'de> Visitor<'de> for WebhookVisitor {
            type Value = ConfluenceWebhook;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut webhook = ConfluenceWebhook::default();
                while let Some(key) = map.next_key::<String>()? {
                    if member_is(&key, "event") {
                        assign(&mut map, &mut webhook.event)?;
                    } else if member_is(&key, "page") {
                        assign(&mut map, &mut webhook.page)?;
                    } else {
                        map.next_value::<IgnoredAny>()?;
                    }
                }
                Ok(webhook)
            }
        }

        deserializer.deserialize_map(WebhookVisitor)
    }
}

impl<'de> Deserialize<'de> for Page {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PageVisitor;

        impl<'de> Visitor<'de> for PageVisitor {
            type Value = Page;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a page object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut page = Page::default();
                while let Some(key) = map.next_key::<String>()? {
                    if member_is(&key, "id") {
                        assign(&mut map, &mut page.id)?;
                    } else if member_is(&key, "title") {
                        assign(&mut map, &mut page.title)?;
                    } else {
                        map.next_value::<IgnoredAny>()?;
                    }
                }
                Ok(page)
            }
        }

        deserializer.deserialize_map(PageVisitor)
    }
}

/// Why a webhook body was rejected.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("empty body")]
    Empty,

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode the first JSON value in `body`; trailing bytes are ignored.
///
/// A top-level `null` yields an empty webhook. Anything else that is not an
/// object is rejected.
pub fn decode_webhook(body: &[u8]) -> Result<ConfluenceWebhook, WebhookError> {
    let mut values =
        serde_json::Deserializer::from_slice(body).into_iter::<Option<ConfluenceWebhook>>();
    let webhook = values.next().ok_or(WebhookError::Empty)??;
    Ok(webhook.unwrap_or_default())
}

/// `POST /webhook/confluence`
pub async fn handle_confluence_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let logger = state.logger.with_field("request_id", headers.request_id());

    let webhook = match decode_webhook(&body) {
        Ok(webhook) => webhook,
        Err(e) => {
            crate::warn!(logger: logger, "Rejected webhook payload", "error" => e);
            metrics::record_webhook_rejected("invalid_payload");
            return (StatusCode::BAD_REQUEST, "Invalid payload\n").into_response();
        }
    };

    crate::info!(
        logger: logger,
        "Confluence event received",
        "event" => webhook.event,
        "page_id" => webhook.page.id,
        "page_title" => webhook.page.title
    );
    metrics::record_webhook_event(&webhook.event);

    (StatusCode::OK, "Webhook processed").into_response()
}

/// Any method other than POST on the webhook path.
pub async fn method_not_allowed() -> Response {
    metrics::record_webhook_rejected("method_not_allowed");
    (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed\n").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_payload() {
        let webhook =
            decode_webhook(br#"{"event":"page_created","page":{"id":1,"title":"T"}}"#).unwrap();
        assert_eq!(webhook.event, "page_created");
        assert_eq!(webhook.page, Page { id: 1, title: "T".into() });
    }

    #[test]
    fn missing_and_unknown_members_are_tolerated() {
        let webhook = decode_webhook(br#"{"event":"page_removed","space":"DOC"}"#).unwrap();
        assert_eq!(webhook.event, "page_removed");
        assert_eq!(webhook.page, Page::default());
    }

    #[test]
    fn only_first_value_is_read() {
        let webhook = decode_webhook(br#"{"event":"a"} trailing"#).unwrap();
        assert_eq!(webhook.event, "a");
    }

    #[test]
    fn null_members_keep_zero_values() {
        let webhook = decode_webhook(br#"{"event":"page_removed","page":null}"#).unwrap();
        assert_eq!(webhook.event, "page_removed");
        assert_eq!(webhook.page, Page::default());

        let webhook = decode_webhook(br#"{"event":null,"page":{"id":null,"title":"T"}}"#).unwrap();
        assert_eq!(webhook.event, "");
        assert_eq!(webhook.page, Page { id: 0, title: "T".into() });
    }

    #[test]
    fn null_body_is_an_empty_webhook() {
        assert_eq!(decode_webhook(b"null").unwrap(), ConfluenceWebhook::default());
        assert_eq!(decode_webhook(b" null \n").unwrap(), ConfluenceWebhook::default());
    }

    #[test]
    fn member_names_match_case_insensitively() {
        let webhook =
            decode_webhook(br#"{"EVENT":"page_created","Page":{"ID":9,"Title":"Doc"}}"#).unwrap();
        assert_eq!(webhook.event, "page_created");
        assert_eq!(webhook.page, Page { id: 9, title: "Doc".into() });
    }

    #[test]
    fn last_matching_member_wins() {
        let webhook = decode_webhook(br#"{"event":"first","Event":"second"}"#).unwrap();
        assert_eq!(webhook.event, "second");

        let webhook = decode_webhook(br#"{"event":"kept","EVENT":null}"#).unwrap();
        assert_eq!(webhook.event, "kept");
    }

    #[test]
    fn rejects_malformed_bodies() {
        assert!(matches!(decode_webhook(b""), Err(WebhookError::Empty)));
        assert!(matches!(decode_webhook(b"   "), Err(WebhookError::Empty)));
        assert!(matches!(decode_webhook(b"not json"), Err(WebhookError::Json(_))));
        assert!(matches!(decode_webhook(b"[1,2]"), Err(WebhookError::Json(_))));
        assert!(matches!(decode_webhook(br#""page_created""#), Err(WebhookError::Json(_))));
        assert!(matches!(
            decode_webhook(br#"{"page":{"id":"one"}}"#),
            Err(WebhookError::Json(_))
        ));
        assert!(matches!(decode_webhook(br#"{"event":5}"#), Err(WebhookError::Json(_))));
        assert!(matches!(decode_webhook(br#"{"page":"x"}"#), Err(WebhookError::Json(_))));
    }
}
