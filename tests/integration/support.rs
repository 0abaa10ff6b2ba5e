use bookmark_sorter::tree::BookmarkNode;
use proptest::prelude::*;

/// Tree shape without identities; ids are assigned in pre-order when built.
#[derive(Debug, Clone)]
pub enum Shape {
    Leaf { title: String, date_added: Option<i64> },
    Folder {
        title: String,
        date_added: Option<i64>,
        children: Vec<Shape>,
    },
}

pub fn shape_strategy() -> impl Strategy<Value = Shape> {
    let title = "[A-Za-zÀ-ÿ ]{0,8}";
    let date = proptest::option::of(0i64..10_000);
    let leaf = (title, date.clone())
        .prop_map(|(title, date_added)| Shape::Leaf { title, date_added });
    leaf.prop_recursive(4, 48, 6, move |inner| {
        (title, date.clone(), prop::collection::vec(inner, 0..6)).prop_map(
            |(title, date_added, children)| Shape::Folder {
                title,
                date_added,
                children,
            },
        )
    })
}

/// Root folder "0" holding the given top-level shapes.
pub fn build_root(top: &[Shape]) -> BookmarkNode {
    let mut next = 1u64;
    let children = top.iter().map(|shape| build(shape, &mut next)).collect();
    BookmarkNode::folder("0", "", children)
}

fn build(shape: &Shape, next: &mut u64) -> BookmarkNode {
    let id = next.to_string();
    *next += 1;
    let node = match shape {
        Shape::Leaf { title, .. } => {
            BookmarkNode::bookmark(id.clone(), title.clone(), format!("https://{}.example", id))
        }
        Shape::Folder {
            title, children, ..
        } => {
            let children = children.iter().map(|child| build(child, next)).collect();
            BookmarkNode::folder(id, title.clone(), children)
        }
    };
    match shape {
        Shape::Leaf {
            date_added: Some(date),
            ..
        }
        | Shape::Folder {
            date_added: Some(date),
            ..
        } => node.with_date_added(*date),
        _ => node,
    }
}

/// The toolbar/"other" layout used by the scenario tests.
pub fn toolbar_snapshot() -> BookmarkNode {
    BookmarkNode::folder(
        "0",
        "",
        vec![
            BookmarkNode::folder(
                "1",
                "Bookmarks bar",
                vec![
                    BookmarkNode::bookmark("2", "Zed", "https://zed.example").with_date_added(200),
                    BookmarkNode::bookmark("3", "Alpha", "https://alpha.example")
                        .with_date_added(100),
                ],
            )
            .with_date_added(10),
            BookmarkNode::folder("4", "Other", Vec::new()).with_date_added(50),
        ],
    )
}
