//! Pass 2: default values from the form's initial data document.

use crate::types::FieldTable;
use crate::xml::direct_text;
use roxmltree::{Document, Node};
use tracing::warn;

pub(super) fn apply_defaults(data: &Document, root_element: &str, table: &mut FieldTable) {
    let Some(root) = find_root(data, root_element) else {
        warn!(root_element, "default data has no root element instance");
        return;
    };
    let namespace = root.tag_name().namespace();

    for node in root.descendants().skip(1).filter(Node::is_element) {
        if node.tag_name().namespace() != namespace {
            continue;
        }
        let Some(field) = table.fields.get_mut(node.tag_name().name()) else {
            continue;
        };
        // Repeating elements: the first non-empty occurrence is the default.
        if field.default.is_some() {
            continue;
        }
        let text = direct_text(node);
        if !text.is_empty() {
            field.default = Some(text);
        }
    }
}

fn find_root<'a, 'input>(data: &'a Document<'input>, root_element: &str) -> Option<Node<'a, 'input>> {
    let root = data.root_element();
    if root.tag_name().name() == root_element {
        return Some(root);
    }
    root.descendants()
        .find(|n| n.is_element() && n.tag_name().name() == root_element)
}
