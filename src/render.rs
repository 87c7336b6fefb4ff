//! ASCII tree rendering for list hierarchies.

use crate::models::{ItemNode, ListTree};

/// Shown in place of an item with empty content.
const EMPTY_CONTENT: &str = "(empty)";

/// Render one list as ASCII art.
///
/// Example output:
/// ```text
/// Groceries
/// ├── Dairy
/// │   ├── Milk
/// │   └── Butter
/// └── Bread
/// ```
pub fn render_tree(tree: &ListTree) -> String {
    let mut output = String::new();
    output.push_str(&tree.title);
    output.push('\n');
    render_children(&mut output, &tree.items);
    output
}

/// Render several lists separated by blank lines.
pub fn render_forest(trees: &[ListTree]) -> String {
    trees
        .iter()
        .map(render_tree)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_children(output: &mut String, nodes: &[ItemNode]) {
    // Popped in display order: (node, prefix, is last sibling).
    let mut pending: Vec<(&ItemNode, String, bool)> = sibling_entries(nodes, "").collect();
    pending.reverse();

    while let Some((node, prefix, is_last)) = pending.pop() {
        let branch = if is_last { "└── " } else { "├── " };
        let content = if node.content.is_empty() {
            EMPTY_CONTENT
        } else {
            node.content.as_str()
        };

        output.push_str(&prefix);
        output.push_str(branch);
        output.push_str(content);
        output.push('\n');

        let continuation = if is_last { "    " } else { "│   " };
        let child_prefix = format!("{}{}", prefix, continuation);
        let first_child = pending.len();
        pending.extend(sibling_entries(&node.sub_items, &child_prefix));
        pending[first_child..].reverse();
    }
}

fn sibling_entries<'a>(
    nodes: &'a [ItemNode],
    prefix: &str,
) -> impl Iterator<Item = (&'a ItemNode, String, bool)> + 'a {
    let last = nodes.len().saturating_sub(1);
    let prefix = prefix.to_string();
    nodes
        .iter()
        .enumerate()
        .map(move |(i, node)| (node, prefix.clone(), i == last))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ItemId, ListId};

    fn node(content: &str, sub_items: Vec<ItemNode>) -> ItemNode {
        ItemNode {
            id: ItemId::generate(),
            content: content.to_string(),
            sub_items,
        }
    }

    fn tree(title: &str, items: Vec<ItemNode>) -> ListTree {
        ListTree {
            id: ListId::generate(),
            title: title.to_string(),
            items,
        }
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(render_tree(&tree("Groceries", vec![])), "Groceries\n");
    }

    #[test]
    fn test_nested_items() {
        let output = render_tree(&tree(
            "Groceries",
            vec![
                node(
                    "Dairy",
                    vec![node("Milk", vec![]), node("Butter", vec![])],
                ),
                node("Bread", vec![]),
            ],
        ));
        assert_eq!(
            output,
            "Groceries\n├── Dairy\n│   ├── Milk\n│   └── Butter\n└── Bread\n"
        );
    }

    #[test]
    fn test_last_branch_indents_with_spaces() {
        let output = render_tree(&tree(
            "Chores",
            vec![node("Kitchen", vec![node("", vec![node("Sink", vec![])])])],
        ));
        assert_eq!(
            output,
            "Chores\n└── Kitchen\n    └── (empty)\n        └── Sink\n"
        );
    }

    #[test]
    fn test_deep_chain_renders_every_level() {
        let mut chain = node("level 999", vec![]);
        for depth in (0..999).rev() {
            chain = node(&format!("level {depth}"), vec![chain]);
        }

        let output = render_tree(&tree("Deep", vec![chain]));
        let lines: Vec<_> = output.lines().collect();

        assert_eq!(lines.len(), 1001);
        assert_eq!(lines[1], "└── level 0");
        assert!(lines[1000].ends_with("└── level 999"));
        assert_eq!(lines[1000].chars().count(), 999 * 4 + "└── level 999".chars().count());
    }

    #[test]
    fn test_forest_separates_lists() {
        let output = render_forest(&[tree("A", vec![]), tree("B", vec![])]);
        assert_eq!(output, "A\n\nB\n");
    }
}
