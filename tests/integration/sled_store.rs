use super::support::toolbar_snapshot;
use bookmark_sorter::service::{SortOptions, SortService};
use bookmark_sorter::store::{BookmarkStore, CreateDetails, SledBookmarkStore};
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
async fn sorted_order_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store");

    {
        let store = Arc::new(SledBookmarkStore::open(&path).unwrap());
        store.replace_with_snapshot(&toolbar_snapshot()).unwrap();
        let service = SortService::new(store.clone(), SortOptions::default());
        let report = service.sort_store("title").await.unwrap();
        assert!(report.reconcile.is_complete());
        store.flush().unwrap();
    }

    let store = SledBookmarkStore::open(&path).unwrap();
    let tree = store.get_tree().await.unwrap();
    let inner: Vec<&str> = tree.children()[0]
        .children()
        .iter()
        .map(|c| c.title.as_str())
        .collect();
    assert_eq!(inner, vec!["Alpha", "Zed"]);
    assert_eq!(store.len(), 5);
}

#[tokio::test]
async fn assigned_identities_do_not_repeat_after_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store");

    let first = {
        let store = SledBookmarkStore::open(&path).unwrap();
        store.replace_with_snapshot(&toolbar_snapshot()).unwrap();
        let created = store
            .create(CreateDetails {
                parent_id: "4".to_string(),
                index: 0,
                title: "Docs".to_string(),
                url: Some("https://docs.example".to_string()),
            })
            .await
            .unwrap();
        store.flush().unwrap();
        created.id
    };

    let store = SledBookmarkStore::open(&path).unwrap();
    let second = store
        .create(CreateDetails {
            parent_id: "4".to_string(),
            index: 0,
            title: "More docs".to_string(),
            url: Some("https://more.example".to_string()),
        })
        .await
        .unwrap();
    assert_ne!(first, second.id);
    assert!(store.get(&first).await.unwrap().is_some());
    assert_eq!(store.len(), 7);
}
