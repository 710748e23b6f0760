//! Markup helpers shared by the manifest reader, the schema passes and the
//! renderer.
//!
//! Documents are parsed with `roxmltree`, which gives a read-only tree.
//! Wherever a label has to be read "without" some part of the markup (an
//! `xsl:if` inside an `<option>`, the `<input>` inside its label block) the
//! text is collected while skipping that subtree; the tree itself is never
//! edited.

use roxmltree::{Document, Node, NodeId, ParsingOptions};

/// InfoPath manifest (`.xsf`) namespace.
pub const XSF_NS: &str = "http://schemas.microsoft.com/office/infopath/2003/solutionDefinition";
/// InfoPath designer attributes (`xd:binding`, `xd:xctname`, `xd:onValue`).
pub const XD_NS: &str = "http://schemas.microsoft.com/office/infopath/2003";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";
pub const XSL_NS: &str = "http://www.w3.org/1999/XSL/Transform";

/// Elements treated as the "containing block" of a control when looking for
/// its hand-written label.
const BLOCK_ELEMENTS: &[&str] = &["div", "p", "td", "th", "li", "label"];

/// Decode archive member bytes as UTF-8 text, dropping a byte order mark.
pub fn decode(bytes: &[u8]) -> Result<&str, std::str::Utf8Error> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    std::str::from_utf8(bytes)
}

/// Parse a document. InfoPath files occasionally carry a DOCTYPE, so DTDs
/// are allowed.
pub fn parse(text: &str) -> Result<Document<'_>, roxmltree::Error> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Document::parse_with_options(text, options)
}

/// Characters stripped from both ends of extracted labels.
///
/// Besides ASCII whitespace and control characters this covers U+00A0
/// (non-breaking space) and U+00C2 (`Â`), which is what the first byte of a
/// UTF-8 non-breaking space turns into when the designer re-encodes a view
/// as Latin-1. Both show up around hand-typed labels.
fn is_label_padding(c: char) -> bool {
    c.is_ascii_whitespace() || c.is_ascii_control() || c == '\u{a0}' || c == '\u{c2}'
}

/// Trim a label with the extended padding set.
pub fn trim_label(text: &str) -> &str {
    text.trim_matches(is_label_padding)
}

/// Whether `node` is an XSLT instruction (`xsl:if`, `xsl:attribute`, …).
///
/// `xsl:text` is excluded: its content is literal output.
pub fn is_xsl_instruction(node: Node) -> bool {
    node.is_element()
        && node.tag_name().namespace() == Some(XSL_NS)
        && node.tag_name().name() != "text"
}

/// Concatenate the text below `node`, skipping XSL instructions and the
/// subtree rooted at `exclude`.
pub fn text_excluding(node: Node, exclude: Option<NodeId>) -> String {
    let mut out = String::new();
    collect_text(node, exclude, &mut out);
    out
}

fn collect_text(node: Node, exclude: Option<NodeId>, out: &mut String) {
    for child in node.children() {
        if Some(child.id()) == exclude {
            continue;
        }
        if child.is_text() {
            out.push_str(child.text().unwrap_or_default());
        } else if child.is_element() && !is_xsl_instruction(child) {
            collect_text(child, exclude, out);
        }
    }
}

/// The nearest ancestor that is a block element, or the parent element when
/// there is none.
pub fn containing_block<'a, 'input>(node: Node<'a, 'input>) -> Option<Node<'a, 'input>> {
    node.ancestors()
        .skip(1)
        .filter(Node::is_element)
        .find(|n| BLOCK_ELEMENTS.contains(&n.tag_name().name()))
        .or_else(|| node.parent_element())
}

/// The label written around a control: the text of its containing block
/// without the control itself, trimmed. `None` when nothing is left.
pub fn surrounding_label(control: Node) -> Option<String> {
    let block = containing_block(control)?;
    let text = text_excluding(block, Some(control.id()));
    let label = trim_label(&text);
    if label.is_empty() {
        None
    } else {
        Some(label.to_string())
    }
}

/// The direct text content of an element (child text nodes only).
pub fn direct_text(node: Node) -> String {
    node.children()
        .filter(Node::is_text)
        .filter_map(|n| n.text())
        .collect()
}

/// Read an `xd:` attribute.
pub fn xd_attribute<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attribute((XD_NS, name))
}
