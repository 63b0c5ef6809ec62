use super::*;

enum Tree {
    Leaf(u64),
    Node(Box<Tree>),
}

fn nest(depth: u64) -> Tree {
    let mut tree = Tree::Leaf(depth);
    for _ in 0..depth {
        tree = Tree::Node(Box::new(tree));
    }
    tree
}

fn depth_of(tree: &Tree) -> u64 {
    ensure_sufficient_stack(|| match tree {
        Tree::Leaf(_) => 0,
        Tree::Node(inner) => depth_of(inner) + 1,
    })
}

fn leaf_of(tree: &Tree) -> u64 {
    ensure_sufficient_stack(|| match tree {
        Tree::Leaf(v) => *v,
        Tree::Node(inner) => leaf_of(inner),
    })
}

#[test]
fn test_shallow_tree() {
    assert_eq!(depth_of(&nest(10)), 10);
}

#[test]
fn test_deep_tree_does_not_overflow() {
    let tree = nest(100_000);
    assert_eq!(depth_of(&tree), 100_000);
    assert_eq!(leaf_of(&tree), 100_000);

    // Dropping a deep Box chain recurses too.
    let mut tree = tree;
    while let Tree::Node(inner) = tree {
        tree = *inner;
    }
}

#[test]
fn test_passes_result_through() {
    let result: Result<i32, &str> = ensure_sufficient_stack(|| Err("boom"));
    assert_eq!(result, Err("boom"));
}
