use super::support::{build_root, shape_strategy};
use bookmark_sorter::service::{plan, SortOptions};
use bookmark_sorter::sort::{collation_key, pin_anchor, sort_records, SortPolicy};
use bookmark_sorter::tree::{flatten, BookmarkNode, FlatRecord};
use proptest::prelude::*;

fn ids(records: &[FlatRecord]) -> Vec<String> {
    records.iter().map(|r| r.id.clone()).collect()
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn sort_is_a_permutation(top in prop::collection::vec(shape_strategy(), 0..5)) {
        let records = flatten(&build_root(&top));
        for policy in SortPolicy::ALL {
            let mut sorted = ids(&sort_records(&records, policy));
            let mut original = ids(&records);
            sorted.sort();
            original.sort();
            prop_assert_eq!(sorted, original);
        }
    }

    #[test]
    fn date_added_orders_are_monotonic(top in prop::collection::vec(shape_strategy(), 0..5)) {
        let records = flatten(&build_root(&top));
        let newest: Vec<i64> = sort_records(&records, SortPolicy::DateAdded)
            .iter()
            .map(|r| r.date_added.unwrap_or(0))
            .collect();
        let oldest: Vec<i64> = sort_records(&records, SortPolicy::DateAddedOrder)
            .iter()
            .map(|r| r.date_added.unwrap_or(0))
            .collect();
        prop_assert!(newest.windows(2).all(|w| w[0] >= w[1]));
        prop_assert!(oldest.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn title_orders_are_inverse(top in prop::collection::vec(shape_strategy(), 0..5)) {
        let records = flatten(&build_root(&top));
        let ascending: Vec<(String, String)> = sort_records(&records, SortPolicy::Title)
            .iter()
            .map(|r| (collation_key(&r.title), r.title.clone()))
            .collect();
        let mut descending: Vec<(String, String)> = sort_records(&records, SortPolicy::TitleOrder)
            .iter()
            .map(|r| (collation_key(&r.title), r.title.clone()))
            .collect();
        descending.reverse();
        prop_assert_eq!(ascending, descending);
    }

    #[test]
    fn pinned_anchor_always_leads(
        top in prop::collection::vec(shape_strategy(), 0..5),
        policy_index in 0usize..4,
    ) {
        let mut root = build_root(&top);
        if let bookmark_sorter::tree::NodeKind::Folder { children } = &mut root.kind {
            children.push(BookmarkNode::folder("anchor", "Bookmarks bar", Vec::new()));
        }
        root.link_children();

        let mut sorted = sort_records(&flatten(&root), SortPolicy::ALL[policy_index]);
        let before: Vec<String> = ids(&sorted)
            .into_iter()
            .filter(|id| id != "anchor")
            .collect();
        pin_anchor(&mut sorted, "Bookmarks bar").unwrap();
        prop_assert_eq!(sorted[0].title.as_str(), "Bookmarks bar");
        let after: Vec<String> = ids(&sorted[1..])
            .into_iter()
            .filter(|id| id != "anchor")
            .collect();
        prop_assert_eq!(before, after);
    }
}

#[test]
fn missing_timestamp_sorts_as_oldest() {
    let root = BookmarkNode::folder(
        "0",
        "",
        vec![
            BookmarkNode::bookmark("1", "dated", "https://a.example").with_date_added(5),
            BookmarkNode::bookmark("2", "undated", "https://b.example"),
        ],
    )
    .with_date_added(1);
    let sorted = sort_records(&flatten(&root), SortPolicy::DateAddedOrder);
    assert_eq!(ids(&sorted), vec!["2", "0", "1"]);
}

#[test]
fn title_sort_ignores_case_and_accents() {
    let root = BookmarkNode::folder(
        "0",
        "",
        vec![
            BookmarkNode::bookmark("1", "zeta", "https://z.example"),
            BookmarkNode::bookmark("2", "Éclair", "https://e.example"),
            BookmarkNode::bookmark("3", "apple", "https://a.example"),
            BookmarkNode::bookmark("4", "Banana", "https://b.example"),
        ],
    );
    let plan = plan(&root, SortPolicy::Title, &SortOptions::default()).unwrap();
    let titles: Vec<&str> = plan.nodes.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(titles, vec!["apple", "Banana", "Éclair", "zeta"]);
    assert_eq!(plan.warnings.len(), 1);
}

#[test]
fn folders_keep_sorted_children() {
    let root = super::support::toolbar_snapshot();
    let plan = plan(&root, SortPolicy::Title, &SortOptions::default()).unwrap();
    let top: Vec<&str> = plan.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(top, vec!["1", "4"]);
    let inner: Vec<&str> = plan.nodes[0].children.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(inner, vec!["Alpha", "Zed"]);
}
