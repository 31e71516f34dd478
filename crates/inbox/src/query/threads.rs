//! Thread query functions

use crate::models::Thread;

/// Threads whose subject contains `term`, ignoring case.
///
/// Order is preserved and the input is left untouched. Only the empty term
/// returns every thread; whitespace in the term is matched literally.
/// Threads without a subject only match the empty term.
pub fn filter_threads(threads: &[Thread], term: &str) -> Vec<Thread> {
    if term.is_empty() {
        return threads.to_vec();
    }
    let needle = term.to_lowercase();

    threads
        .iter()
        .filter(|t| {
            t.subject
                .as_deref()
                .is_some_and(|s| s.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn threads() -> Vec<Thread> {
        vec![
            Thread::new("t1", Some("Invoice #1".to_string()), "a@example.com"),
            Thread::new("t2", Some("Meeting notes".to_string()), "b@example.com"),
            Thread::new("t3", Some("invoice review".to_string()), "c@example.com"),
            Thread::new("t4", None, "d@example.com"),
        ]
    }

    #[test]
    fn test_filter_case_insensitive_in_order() {
        let all = threads();
        let filtered = filter_threads(&all, "invoice");
        let ids: Vec<_> = filtered.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t3"]);
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn test_filter_upper_case_term() {
        let filtered = filter_threads(&threads(), "MEETING");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id.as_str(), "t2");
    }

    #[test]
    fn test_empty_term_returns_all() {
        let all = threads();
        assert_eq!(filter_threads(&all, ""), all);
    }

    #[test]
    fn test_whitespace_in_term_is_literal() {
        let all = threads();

        assert!(filter_threads(&all, "notes ").is_empty());
        assert!(filter_threads(&all, " invoice #").is_empty());

        let spaced: Vec<_> = filter_threads(&all, " ")
            .into_iter()
            .map(|t| t.id.as_str().to_string())
            .collect();
        assert_eq!(spaced, vec!["t1", "t2", "t3"]);
    }

    #[test]
    fn test_no_match() {
        assert!(filter_threads(&threads(), "zzz").is_empty());
    }
}
