//! Folder lifecycle and mixed-selection flows through the public API.

use snipboard_core::{MemoStore, Selection, StoreError, TemplateListEntry};

fn folder_names(store: &MemoStore) -> Vec<String> {
    store.folders().unwrap()
}

#[test]
fn rename_rewrites_exactly_the_members() {
    let store = MemoStore::open_in_memory().unwrap();
    store.add_template("a", Some("Work")).unwrap();
    store.add_template("b", Some("Work")).unwrap();
    store.add_template("c", Some("Workshop")).unwrap();
    store.add_template("loose", None).unwrap();

    let updated = store.rename_folder("Work", "Office").unwrap();
    assert_eq!(updated, 2);

    assert_eq!(folder_names(&store), vec!["Office", "Workshop"]);
    assert_eq!(store.templates_in(Some("Office")).unwrap().len(), 2);
    assert_eq!(store.templates_in(Some("Workshop")).unwrap().len(), 1);
    assert_eq!(store.templates_in(None).unwrap().len(), 1);
}

#[test]
fn rename_to_blank_is_rejected() {
    let store = MemoStore::open_in_memory().unwrap();
    store.add_template("a", Some("Work")).unwrap();
    assert!(matches!(
        store.rename_folder("Work", "   "),
        Err(StoreError::EmptyContent)
    ));
    assert_eq!(folder_names(&store), vec!["Work"]);
}

#[test]
fn rename_into_existing_folder_merges() {
    let store = MemoStore::open_in_memory().unwrap();
    store.add_template("a", Some("Old")).unwrap();
    store.add_template("b", Some("New")).unwrap();
    store.rename_folder("Old", "New").unwrap();
    assert_eq!(folder_names(&store), vec!["New"]);
    assert_eq!(store.templates_in(Some("New")).unwrap().len(), 2);
}

#[test]
fn delete_folder_cascades_to_members_only() {
    let store = MemoStore::open_in_memory().unwrap();
    store.add_template("a", Some("Gone")).unwrap();
    store.add_template("b", Some("Gone")).unwrap();
    store.add_template("kept", Some("Stays")).unwrap();
    store.capture_text("history entry").unwrap();

    let deleted = store.delete_folder("Gone").unwrap();
    assert_eq!(deleted, 2);
    assert_eq!(folder_names(&store), vec!["Stays"]);
    assert_eq!(store.history().unwrap().len(), 1);
}

#[test]
fn mixed_selection_deletes_folders_and_templates_atomically() {
    let store = MemoStore::open_in_memory().unwrap();
    store.add_template("a", Some("Work")).unwrap();
    store.add_template("b", Some("Work")).unwrap();
    let loose = store.add_template("loose", None).unwrap();
    store.add_template("kept", None).unwrap();

    let deleted = store
        .delete_selection(&[
            Selection::Folder("Work".to_owned()),
            Selection::Template(loose),
            // Already-gone ids are tolerated.
            Selection::Template(9999),
        ])
        .unwrap();
    assert_eq!(deleted, 3);

    let listing = store.folder_listing().unwrap();
    assert_eq!(listing.len(), 1);
    assert!(matches!(
        &listing[0],
        TemplateListEntry::Template(m) if m.content == "kept"
    ));
}

#[test]
fn duplicate_rejection_leaves_counts_unchanged() {
    let store = MemoStore::open_in_memory().unwrap();
    store.add_template("Thanks!", Some("Work")).unwrap();
    let before = store.templates_in(Some("Work")).unwrap();

    assert!(store.add_template("Thanks!", Some("Work")).is_err());

    let after = store.templates_in(Some("Work")).unwrap();
    assert_eq!(after.len(), before.len());
    assert_eq!(after[0].display_order, before[0].display_order);
}

#[test]
fn batch_skips_blanks_and_existing_duplicates() {
    let store = MemoStore::open_in_memory().unwrap();
    store.add_template("already here", Some("Work")).unwrap();

    let batch = vec![
        "new one".to_owned(),
        "   ".to_owned(),
        "already here".to_owned(),
        "new two".to_owned(),
    ];
    let outcome = store.add_templates(&batch, Some("Work")).unwrap();
    assert_eq!(outcome.added, 2);
    assert_eq!(outcome.skipped, 2);
    assert_eq!(store.templates_in(Some("Work")).unwrap().len(), 3);
}

#[test]
fn move_skips_destination_duplicates() {
    let store = MemoStore::open_in_memory().unwrap();
    let dup = store.add_template("shared", Some("Src")).unwrap();
    let uniq = store.add_template("only here", Some("Src")).unwrap();
    store.add_template("shared", Some("Dst")).unwrap();

    let outcome = store.move_templates(&[dup, uniq], Some("Dst")).unwrap();
    assert_eq!(outcome.moved, 1);
    assert_eq!(outcome.skipped, 1);

    let src: Vec<String> = store
        .templates_in(Some("Src"))
        .unwrap()
        .into_iter()
        .map(|m| m.content)
        .collect();
    assert_eq!(src, vec!["shared"]);
    assert_eq!(store.templates_in(Some("Dst")).unwrap().len(), 2);
}

#[test]
fn moving_the_whole_folder_makes_it_disappear() {
    let store = MemoStore::open_in_memory().unwrap();
    let a = store.add_template("a", Some("Temp")).unwrap();
    let b = store.add_template("b", Some("Temp")).unwrap();

    store.move_templates(&[a, b], None).unwrap();

    // Folders exist only through their members.
    assert!(folder_names(&store).is_empty());
    assert_eq!(store.templates_in(None).unwrap().len(), 2);
}

#[test]
fn settings_persist_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("memos.db");
    {
        let store = MemoStore::open(&path).unwrap();
        store.settings().set_allow_duplicate_history(true).unwrap();
        store.settings().set_max_lines(5).unwrap();
        store.capture_text("same").unwrap();
        store.capture_text("same").unwrap();
    }
    let store = MemoStore::open(&path).unwrap();
    assert!(store.settings().allow_duplicate_history());
    assert_eq!(store.settings().max_lines(), 5);
    assert_eq!(store.history().unwrap().len(), 2);
}
