use super::support::{build_root, shape_strategy};
use bookmark_sorter::tree::{
    flatten, reconstruct, snapshot_from_json, snapshot_to_json, BookmarkNode, ReconstructedNode,
};
use proptest::prelude::*;

fn assert_same_shape(original: &BookmarkNode, rebuilt: &ReconstructedNode) {
    assert_eq!(original.id, rebuilt.id);
    assert_eq!(original.title, rebuilt.title);
    assert_eq!(original.url(), rebuilt.url.as_deref());
    assert_eq!(original.date_added, rebuilt.date_added);
    assert_eq!(original.children().len(), rebuilt.children.len());
    for (a, b) in original.children().iter().zip(&rebuilt.children) {
        assert_same_shape(a, b);
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn flatten_then_reconstruct_preserves_tree(
        top in prop::collection::vec(shape_strategy(), 0..5)
    ) {
        let root = build_root(&top);
        let records = flatten(&root);
        prop_assert_eq!(records.len(), root.node_count());

        let rebuilt = reconstruct(&records);
        prop_assert_eq!(rebuilt.len(), root.children().len());
        for (a, b) in root.children().iter().zip(&rebuilt) {
            assert_same_shape(a, b);
        }
    }

    #[test]
    fn json_snapshot_round_trips(top in prop::collection::vec(shape_strategy(), 0..4)) {
        let root = build_root(&top);
        let json = snapshot_to_json(&root).unwrap();
        let parsed = snapshot_from_json(&json).unwrap();
        prop_assert_eq!(parsed, root);
    }
}

#[test]
fn flatten_is_pre_order_with_root_first() {
    let root = BookmarkNode::folder(
        "0",
        "",
        vec![
            BookmarkNode::folder(
                "1",
                "a",
                vec![BookmarkNode::bookmark("2", "b", "https://b.example")],
            ),
            BookmarkNode::bookmark("3", "c", "https://c.example"),
        ],
    );
    let ids: Vec<String> = flatten(&root).into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec!["0", "1", "2", "3"]);
}
