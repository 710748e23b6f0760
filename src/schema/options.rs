//! Pass 3: option sets of single-value choice controls in the primary view.
//!
//! Drop-downs and list boxes are `<select>` elements whose `<option>`s carry
//! literal values; selection state is rendered by an `xsl:if` inside each
//! option, which must not leak into the label:
//!
//! ```xml
//! <select xd:xctname="DropDown" xd:binding="my:department">
//!   <option value="sales"><xsl:if test="my:department=&quot;sales&quot;">
//!     <xsl:attribute name="selected">selected</xsl:attribute></xsl:if>Sales</option>
//! </select>
//! ```
//!
//! Option buttons are one `<input>` per choice. Their label is whatever the
//! designer typed next to the button, so it is read from the containing
//! block with the input left out.

use super::record;
use crate::naming::binding_field;
use crate::types::{FieldDescriptor, FieldKind, FieldTable, OptionSet, SchemaInconsistency};
use crate::xml::{surrounding_label, text_excluding, trim_label, xd_attribute};
use roxmltree::{Document, Node};
use tracing::debug;

pub(super) fn collect_view_options(view: &Document, table: &mut FieldTable) {
    for node in view.descendants().filter(Node::is_element) {
        match node.tag_name().name() {
            "select" => collect_select(node, table),
            "input" if is_option_button(node) => collect_radio(node, table),
            _ => {}
        }
    }
}

fn is_option_button(node: Node) -> bool {
    node.attribute("type")
        .is_some_and(|t| t.eq_ignore_ascii_case("radio"))
        || xd_attribute(node, "xctname").is_some_and(|t| t.eq_ignore_ascii_case("OptionButton"))
}

fn is_list_box(node: Node) -> bool {
    xd_attribute(node, "xctname").is_some_and(|t| t.eq_ignore_ascii_case("ListBox"))
}

fn bound_field<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    xd_attribute(node, "binding").and_then(binding_field)
}

/// The descriptor a control is bound to, or `None` (recorded) when the
/// schema does not declare it.
fn bound_descriptor<'t>(
    table: &'t mut FieldTable,
    field: &str,
    control: &'static str,
) -> Option<&'t mut FieldDescriptor> {
    if !table.contains(field) {
        record(
            table,
            SchemaInconsistency::UnknownBinding {
                control,
                field: field.to_string(),
            },
        );
        return None;
    }
    table.fields.get_mut(field)
}

fn collect_select(node: Node, table: &mut FieldTable) {
    let Some(field) = bound_field(node) else {
        debug!("skipping unbound select");
        return;
    };
    let multiple = is_list_box(node);

    let mut options = OptionSet::new();
    for option in node
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "option")
    {
        // Data-driven entries build their value with xsl:attribute.
        let Some(value) = option.attribute("value") else {
            debug!(field, "skipping option without a literal value");
            continue;
        };
        let text = text_excluding(option, None);
        options.insert(value.to_string(), trim_label(&text).to_string());
    }

    let Some(descriptor) = bound_descriptor(table, field, "select") else {
        return;
    };
    match &mut descriptor.kind {
        FieldKind::Select {
            multiple: existing_multiple,
            options: existing,
        } => {
            *existing_multiple |= multiple;
            existing.extend(options);
        }
        kind => *kind = FieldKind::Select { multiple, options },
    }
}

fn collect_radio(node: Node, table: &mut FieldTable) {
    let Some(field) = bound_field(node) else {
        debug!("skipping unbound option button");
        return;
    };
    let Some(value) = xd_attribute(node, "onValue") else {
        debug!(field, "skipping option button without an on value");
        return;
    };
    let label = surrounding_label(node).unwrap_or_else(|| value.to_string());

    let Some(descriptor) = bound_descriptor(table, field, "radio") else {
        return;
    };
    match &mut descriptor.kind {
        FieldKind::Radio { options } => {
            options.insert(value.to_string(), label);
        }
        kind => {
            let mut options = OptionSet::new();
            options.insert(value.to_string(), label);
            *kind = FieldKind::Radio { options };
        }
    }
}
