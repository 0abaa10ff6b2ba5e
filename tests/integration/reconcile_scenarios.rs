use super::support::toolbar_snapshot;
use async_trait::async_trait;
use bookmark_sorter::error::StoreError;
use bookmark_sorter::service::{SortOptions, SortService};
use bookmark_sorter::store::{
    BookmarkStore, CreateDetails, Destination, MemoryBookmarkStore, StoreOperation, StoredNode,
};
use bookmark_sorter::tree::BookmarkNode;
use std::sync::Arc;

/// Rejects moves of one identity, delegates everything else.
struct FailingStore {
    inner: MemoryBookmarkStore,
    reject_move_of: String,
}

#[async_trait]
impl BookmarkStore for FailingStore {
    async fn get_tree(&self) -> Result<BookmarkNode, StoreError> {
        self.inner.get_tree().await
    }

    async fn get(&self, id: &str) -> Result<Option<StoredNode>, StoreError> {
        self.inner.get(id).await
    }

    async fn move_node(
        &self,
        id: &str,
        destination: Destination,
    ) -> Result<StoredNode, StoreError> {
        if id == self.reject_move_of {
            return Err(StoreError::InvalidOperation(format!("{} is locked", id)));
        }
        self.inner.move_node(id, destination).await
    }

    async fn create(&self, details: CreateDetails) -> Result<StoredNode, StoreError> {
        self.inner.create(details).await
    }
}

fn titles(node: &BookmarkNode) -> Vec<&str> {
    node.children().iter().map(|c| c.title.as_str()).collect()
}

#[tokio::test]
async fn sorting_into_empty_store_creates_everything() {
    let store = Arc::new(MemoryBookmarkStore::new());
    let service = SortService::new(store.clone(), SortOptions::default());

    let report = service
        .apply_sorted_order(&toolbar_snapshot(), "title")
        .await
        .unwrap();
    assert!(report.reconcile.is_complete());
    assert_eq!(report.reconcile.summary.created, 4);
    assert_eq!(report.reconcile.summary.moved, 0);
    assert!(report.warnings.is_empty());

    let creates: Vec<(String, usize, String)> = store
        .operations()
        .into_iter()
        .filter_map(|op| match op {
            StoreOperation::Create {
                parent_id,
                index,
                title,
                ..
            } => Some((parent_id, index, title)),
            StoreOperation::Move { .. } => None,
        })
        .collect();
    let top: Vec<&(String, usize, String)> = creates.iter().filter(|c| c.0 == "0").collect();
    assert_eq!(top.len(), 2);
    assert_eq!((top[0].1, top[0].2.as_str()), (0, "Bookmarks bar"));
    assert_eq!((top[1].1, top[1].2.as_str()), (1, "Other"));
    let inner: Vec<&str> = creates
        .iter()
        .filter(|c| c.0 != "0")
        .map(|c| c.2.as_str())
        .collect();
    assert_eq!(inner, vec!["Alpha", "Zed"]);

    let tree = store.get_tree().await.unwrap();
    assert_eq!(titles(&tree), vec!["Bookmarks bar", "Other"]);
    assert_eq!(titles(&tree.children()[0]), vec!["Alpha", "Zed"]);
    assert_eq!(tree.node_count(), 5);
}

#[tokio::test]
async fn sorting_existing_store_only_moves() {
    let store = Arc::new(MemoryBookmarkStore::from_snapshot(&toolbar_snapshot()).unwrap());
    let service = SortService::new(store.clone(), SortOptions::default());

    let report = service.sort_store("dateAdded").await.unwrap();
    assert!(report.reconcile.is_complete());
    assert_eq!(report.reconcile.summary.moved, 4);
    assert_eq!(report.reconcile.summary.created, 0);
    assert!(store
        .operations()
        .iter()
        .all(|op| matches!(op, StoreOperation::Move { .. })));

    let tree = store.get_tree().await.unwrap();
    assert_eq!(tree.node_count(), 5);
    assert_eq!(titles(&tree), vec!["Bookmarks bar", "Other"]);
    assert_eq!(titles(&tree.children()[0]), vec!["Zed", "Alpha"]);
}

#[tokio::test]
async fn sorting_twice_is_stable() {
    let store = Arc::new(MemoryBookmarkStore::from_snapshot(&toolbar_snapshot()).unwrap());
    let service = SortService::new(store.clone(), SortOptions::default());

    service.sort_store("titleOrder").await.unwrap();
    let first = store.get_tree().await.unwrap();
    service.sort_store("titleOrder").await.unwrap();
    let second = store.get_tree().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(titles(&second.children()[0]), vec!["Zed", "Alpha"]);
}

#[tokio::test]
async fn rejected_folder_move_does_not_block_siblings() {
    let store = Arc::new(FailingStore {
        inner: MemoryBookmarkStore::from_snapshot(&toolbar_snapshot()).unwrap(),
        reject_move_of: "1".to_string(),
    });
    let service = SortService::new(store.clone(), SortOptions::default());

    let report = service
        .apply_sorted_order(&toolbar_snapshot(), "title")
        .await
        .unwrap();
    assert!(!report.reconcile.is_complete());
    assert_eq!(report.reconcile.summary.failed, 1);
    assert_eq!(report.reconcile.summary.moved, 3);
    let failures = report.reconcile.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].id, "1");

    let tree = store.get_tree().await.unwrap();
    assert_eq!(titles(&tree.children()[0]), vec!["Alpha", "Zed"]);
}

#[tokio::test]
async fn import_adds_missing_nodes_without_duplicates() {
    let store = Arc::new(MemoryBookmarkStore::from_snapshot(&toolbar_snapshot()).unwrap());
    let service = SortService::new(store.clone(), SortOptions::default());

    let mut extended = toolbar_snapshot();
    if let bookmark_sorter::tree::NodeKind::Folder { children } = &mut extended.kind {
        children.push(BookmarkNode::bookmark("9", "Docs", "https://docs.example"));
    }
    extended.link_children();

    let report = service.import_snapshot(&extended).await.unwrap();
    assert!(report.is_complete());
    assert_eq!(report.summary.created, 1);
    assert_eq!(report.summary.moved, 4);

    let tree = store.get_tree().await.unwrap();
    assert_eq!(tree.node_count(), 6);
    assert_eq!(titles(&tree), vec!["Bookmarks bar", "Other", "Docs"]);
}
