//! Rank invariants for the ordering maintainer.
//!
//! After any completed insert, move-to-top, or reorder commit, the
//! `display_order` values within a scope must be exactly `{0..count-1}`.
//! Scopes that lost a member to a folder move are allowed to keep a gap.

use snipboard_core::{CaptureOutcome, Memo, MemoStore, Scope};

fn assert_dense(memos: &[Memo]) {
    let mut orders: Vec<i64> = memos.iter().map(|m| m.display_order).collect();
    orders.sort_unstable();
    let expected: Vec<i64> = (0..memos.len() as i64).collect();
    assert_eq!(orders, expected, "ranks must be dense 0..n-1");
}

#[test]
fn history_ranks_stay_dense_across_inserts() {
    let store = MemoStore::open_in_memory().unwrap();
    for i in 0..10 {
        store.capture_text(&format!("entry {i}")).unwrap();
        assert_dense(&store.history().unwrap());
    }
}

#[test]
fn template_ranks_stay_dense_per_folder() {
    let store = MemoStore::open_in_memory().unwrap();
    for i in 0..5 {
        store.add_template(&format!("work {i}"), Some("Work")).unwrap();
        store.add_template(&format!("loose {i}"), None).unwrap();
    }
    assert_dense(&store.templates_in(Some("Work")).unwrap());
    assert_dense(&store.templates_in(None).unwrap());
}

#[test]
fn move_to_top_keeps_ranks_dense_and_refreshes_timestamp() {
    let store = MemoStore::open_in_memory().unwrap();
    store.capture_text("hello").unwrap();
    store.capture_text("world").unwrap();
    store.capture_text("again").unwrap();
    let before = store
        .history()
        .unwrap()
        .into_iter()
        .find(|m| m.content == "hello")
        .unwrap();

    let outcome = store.capture_text("hello").unwrap();
    assert_eq!(outcome, CaptureOutcome::MovedToTop(before.id));

    let history = store.history().unwrap();
    assert_dense(&history);
    // Exactly one "hello", at the top, with a refreshed timestamp.
    assert_eq!(history.iter().filter(|m| m.content == "hello").count(), 1);
    assert_eq!(history[0].content, "hello");
    assert_eq!(history[0].display_order, 0);
    assert!(history[0].created_at >= before.created_at);
    // Everything else shifted by one.
    assert_eq!(history[1].content, "again");
    assert_eq!(history[2].content, "world");
}

#[test]
fn recapture_of_mid_rank_entry_keeps_ranks_dense() {
    let store = MemoStore::open_in_memory().unwrap();
    store.capture_text("A").unwrap();
    store.capture_text("B").unwrap();
    store.capture_text("C").unwrap();
    // Current order: C(0), B(1), A(2). Promote the middle record.
    let outcome = store.capture_text("B").unwrap();
    assert!(matches!(outcome, CaptureOutcome::MovedToTop(_)));

    let history = store.history().unwrap();
    assert_dense(&history);
    let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["B", "C", "A"]);
    // The record that was already below the promoted one keeps its rank.
    assert_eq!(history[2].display_order, 2);
}

#[test]
fn drag_c_to_top_yields_c_a_b() {
    let store = MemoStore::open_in_memory().unwrap();
    // Build history A(0), B(1), C(2): capture in reverse so A ends on top.
    store.capture_text("C").unwrap();
    store.capture_text("B").unwrap();
    store.capture_text("A").unwrap();
    let history = store.history().unwrap();
    let id_of = |content: &str| history.iter().find(|m| m.content == content).unwrap().id;
    assert_eq!(history[0].content, "A");

    // User drags C to the top and commits.
    store
        .reorder(&Scope::History, &[id_of("C"), id_of("A"), id_of("B")])
        .unwrap();

    let after = store.history().unwrap();
    assert_dense(&after);
    let contents: Vec<&str> = after.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["C", "A", "B"]);
}

#[test]
fn reorder_ignores_ids_outside_the_scope() {
    let store = MemoStore::open_in_memory().unwrap();
    store.capture_text("a").unwrap();
    store.capture_text("b").unwrap();
    let tmpl = store.add_template("not history", None).unwrap();
    let history = store.history().unwrap();

    store
        .reorder(&Scope::History, &[history[1].id, tmpl, history[0].id])
        .unwrap();

    let after = store.history().unwrap();
    assert_dense(&after);
    assert_eq!(after[0].content, "a");
    // Template untouched.
    assert_eq!(store.memo(tmpl).unwrap().unwrap().display_order, 0);
}

#[test]
fn batch_insert_preserves_relative_order() {
    let store = MemoStore::open_in_memory().unwrap();
    store.add_template("existing", Some("F")).unwrap();
    let batch = vec!["one".to_string(), "two".to_string(), "three".to_string()];
    let outcome = store.add_templates(&batch, Some("F")).unwrap();
    assert_eq!(outcome.added, 3);
    assert_eq!(outcome.skipped, 0);

    let templates = store.templates_in(Some("F")).unwrap();
    assert_dense(&templates);
    // display_order strictly increases as list position increases.
    for pair in templates.windows(2) {
        assert!(pair[0].display_order < pair[1].display_order);
    }
    // Equivalent to capturing one, two, three one at a time.
    let contents: Vec<&str> = templates.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["three", "two", "one", "existing"]);
}

#[test]
fn moving_a_template_out_leaves_a_tolerated_gap() {
    let store = MemoStore::open_in_memory().unwrap();
    store.add_template("a", Some("Src")).unwrap();
    store.add_template("b", Some("Src")).unwrap();
    store.add_template("c", Some("Src")).unwrap();
    let middle = store
        .templates_in(Some("Src"))
        .unwrap()
        .into_iter()
        .find(|m| m.content == "b")
        .unwrap();

    let outcome = store.move_templates(&[middle.id], Some("Dst")).unwrap();
    assert_eq!(outcome.moved, 1);

    // Source is not renumbered: a gap remains, but listing order is intact.
    let source = store.templates_in(Some("Src")).unwrap();
    let orders: Vec<i64> = source.iter().map(|m| m.display_order).collect();
    assert_eq!(orders, vec![0, 2]);
    let contents: Vec<&str> = source.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["c", "a"]);

    // Inserting into the gapped scope still puts the new record on top.
    store.add_template("d", Some("Src")).unwrap();
    let source = store.templates_in(Some("Src")).unwrap();
    assert_eq!(source[0].content, "d");
    assert_eq!(source[0].display_order, 0);
}

#[test]
fn interleaved_structural_changes_settle_dense() {
    let store = MemoStore::open_in_memory().unwrap();
    for i in 0..6 {
        store.capture_text(&format!("e{i}")).unwrap();
    }
    let ids: Vec<i64> = store.history().unwrap().iter().map(|m| m.id).collect();
    // Reorder, delete, insert, promote.
    let reversed: Vec<i64> = ids.iter().rev().copied().collect();
    store.reorder(&Scope::History, &reversed).unwrap();
    store.delete_memo(ids[2]).unwrap();
    store.capture_text("fresh").unwrap();
    store.capture_text("e0").unwrap();
    // Delete leaves a gap; a later full reorder commit restores density.
    let current: Vec<i64> = store.history().unwrap().iter().map(|m| m.id).collect();
    store.reorder(&Scope::History, &current).unwrap();
    assert_dense(&store.history().unwrap());
}
