//! Inbox service response normalization
//!
//! Converts raw service threads to the canonical `Thread` model.

use log::warn;
use serde_json::Value;
use std::collections::HashSet;

use super::ApiError;
use super::wire::RawThread;
use crate::models::{Thread, ThreadId};

/// Normalize one raw thread. Returns `None` when it carries no usable id.
///
/// `threadId` wins over `id`; the sender address is taken from
/// `fromAddress`, then `from`, then `fromEmail`.
pub fn normalize_thread(raw: RawThread) -> Option<Thread> {
    let id = raw
        .thread_id
        .or(raw.id)
        .map(|id| id.into_string())
        .filter(|id| !id.is_empty())?;

    let from_address = [raw.from_address, raw.from, raw.from_email]
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .unwrap_or_default();

    Some(Thread {
        id: ThreadId::new(id),
        subject: raw.subject,
        preview_text: raw.preview_text.or(raw.snippet),
        from_address,
        from_name: raw.from_name,
        message_id: raw.message_id,
        references: raw.references.map(|r| r.into_vec()).unwrap_or_default(),
    })
}

/// Normalize the `data` field of a list response.
///
/// The payload must be a sequence of objects that each carry an id; anything
/// else fails the whole batch so the caller never applies a partial list.
/// Later duplicates of an id are dropped, keeping server order.
pub fn normalize_threads(data: Option<Value>) -> Result<Vec<Thread>, ApiError> {
    let items = match data {
        Some(Value::Array(items)) => items,
        Some(_) => return Err(ApiError::Malformed("thread list is not an array".into())),
        None => return Err(ApiError::Malformed("thread list missing".into())),
    };

    let mut seen = HashSet::new();
    let mut threads = Vec::with_capacity(items.len());

    for (index, item) in items.into_iter().enumerate() {
        let raw: RawThread = serde_json::from_value(item)
            .map_err(|e| ApiError::Malformed(format!("thread {index}: {e}")))?;
        let thread = normalize_thread(raw)
            .ok_or_else(|| ApiError::Malformed(format!("thread {index} has no id")))?;

        if seen.insert(thread.id.clone()) {
            threads.push(thread);
        } else {
            warn!("Dropping duplicate thread {}", thread.id);
        }
    }

    Ok(threads)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawThread {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_thread_id_preferred_over_id() {
        let t = normalize_thread(raw(json!({"id": 7, "threadId": 42}))).unwrap();
        assert_eq!(t.id.as_str(), "42");

        let t = normalize_thread(raw(json!({"id": "abc"}))).unwrap();
        assert_eq!(t.id.as_str(), "abc");
    }

    #[test]
    fn test_missing_id() {
        assert!(normalize_thread(raw(json!({"subject": "x"}))).is_none());
        assert!(normalize_thread(raw(json!({"threadId": ""}))).is_none());
    }

    #[test]
    fn test_sender_fallbacks() {
        let t = normalize_thread(raw(json!({"id": 1, "fromEmail": "b@example.com"}))).unwrap();
        assert_eq!(t.from_address, "b@example.com");

        let t = normalize_thread(raw(json!({
            "id": 1, "from": "a@example.com", "fromEmail": "b@example.com"
        })))
        .unwrap();
        assert_eq!(t.from_address, "a@example.com");

        let t = normalize_thread(raw(json!({"id": 1}))).unwrap();
        assert_eq!(t.from_address, "");
    }

    #[test]
    fn test_references_shapes() {
        let t = normalize_thread(raw(json!({"id": 1, "references": "abc"}))).unwrap();
        assert_eq!(t.references, vec!["abc".to_string()]);

        let t = normalize_thread(raw(json!({"id": 1, "references": ["a", "b"]}))).unwrap();
        assert_eq!(t.references, vec!["a".to_string(), "b".to_string()]);

        let t = normalize_thread(raw(json!({"id": 1, "references": null}))).unwrap();
        assert!(t.references.is_empty());
    }

    #[test]
    fn test_normalize_threads_keeps_order_and_dedupes() {
        let data = json!([
            {"threadId": "b", "subject": "B"},
            {"threadId": "a", "subject": "A"},
            {"threadId": "b", "subject": "B again"},
        ]);
        let threads = normalize_threads(Some(data)).unwrap();
        let ids: Vec<_> = threads.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(threads[0].subject.as_deref(), Some("B"));
    }

    #[test]
    fn test_normalize_threads_rejects_non_array() {
        assert!(matches!(
            normalize_threads(Some(json!({"threadId": 1}))),
            Err(ApiError::Malformed(_))
        ));
        assert!(matches!(normalize_threads(None), Err(ApiError::Malformed(_))));
        assert!(matches!(
            normalize_threads(Some(json!([{"subject": "no id"}]))),
            Err(ApiError::Malformed(_))
        ));
    }
}
