//! Reconciliation of the in-memory bookmark list.
//!
//! Two paths mutate the collection for the same logical change: the local
//! confirmation of a create/delete and the inbound feed event. No ordering
//! is guaranteed between them, so every mutation here is idempotent keyed
//! on `id`; whichever path fires second becomes a no-op.

use crate::feed::ChangeEvent;
use crate::models::Bookmark;

/// Inserts `record` at the head unless an entry with the same id is already
/// present. Returns whether the list changed.
pub(crate) fn prepend_unique(list: &mut Vec<Bookmark>, record: Bookmark) -> bool {
    if list.iter().any(|b| b.id == record.id) {
        return false;
    }
    list.insert(0, record);
    true
}

/// Removes the entry with `id` if present. Absent ids are a no-op.
pub(crate) fn remove_by_id(list: &mut Vec<Bookmark>, id: &str) -> bool {
    let before = list.len();
    list.retain(|b| b.id != id);
    list.len() != before
}

pub(crate) fn apply_change_event(list: &mut Vec<Bookmark>, event: ChangeEvent) {
    match event {
        ChangeEvent::Insert(record) => {
            prepend_unique(list, record);
        }
        ChangeEvent::Delete { id } => {
            remove_by_id(list, &id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bookmark(id: &str, title: &str) -> Bookmark {
        Bookmark {
            id: id.to_string(),
            url: "https://example.com".to_string(),
            title: title.to_string(),
            owner_id: "u1".to_string(),
            created_at: "2026-03-05T12:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn insert_lands_at_head() {
        let mut list = vec![bookmark("b-1", "older")];
        assert!(prepend_unique(&mut list, bookmark("b-2", "newer")));
        assert_eq!(list[0].id, "b-2");
        assert_eq!(list[1].id, "b-1");
    }

    #[test]
    fn create_confirmation_then_feed_insert_keeps_one_entry() {
        let mut list = vec![];

        // Local confirmation wins the race...
        assert!(prepend_unique(&mut list, bookmark("b-1", "Example")));
        // ...then the feed echoes the same insert.
        apply_change_event(&mut list, ChangeEvent::Insert(bookmark("b-1", "Example")));

        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, "b-1");
    }

    #[test]
    fn feed_insert_then_confirmation_keeps_one_entry() {
        let mut list = vec![];

        apply_change_event(&mut list, ChangeEvent::Insert(bookmark("b-1", "Example")));
        assert!(!prepend_unique(&mut list, bookmark("b-1", "Example")));

        assert_eq!(list.len(), 1);
    }

    #[test]
    fn delete_confirmation_then_feed_delete_is_clean() {
        let mut list = vec![bookmark("b-1", "Example"), bookmark("b-2", "Other")];

        assert!(remove_by_id(&mut list, "b-1"));
        apply_change_event(
            &mut list,
            ChangeEvent::Delete {
                id: "b-1".to_string(),
            },
        );

        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, "b-2");
    }

    #[test]
    fn remove_missing_id_is_noop() {
        let mut list = vec![bookmark("b-1", "Example")];
        assert!(!remove_by_id(&mut list, "nope"));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn create_then_delete_roundtrip() {
        // Fresh identity: empty listing, one create, one delete.
        let mut list: Vec<Bookmark> = vec![];

        let created = bookmark("b-1", "Example");
        assert!(prepend_unique(&mut list, created.clone()));
        assert_eq!(list, vec![created]);

        assert!(remove_by_id(&mut list, "b-1"));
        assert!(list.is_empty());
    }

    #[test]
    fn interleaved_sequences_hold_each_id_once() {
        let mut list = vec![];

        prepend_unique(&mut list, bookmark("b-1", "one"));
        apply_change_event(&mut list, ChangeEvent::Insert(bookmark("b-2", "two")));
        apply_change_event(&mut list, ChangeEvent::Insert(bookmark("b-1", "one")));
        prepend_unique(&mut list, bookmark("b-2", "two"));
        apply_change_event(
            &mut list,
            ChangeEvent::Delete {
                id: "b-1".to_string(),
            },
        );
        remove_by_id(&mut list, "b-1");

        let ids: Vec<&str> = list.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["b-2"]);
    }
}
