//! Pass 1: one scalar field per typed schema declaration.

use crate::naming::{is_valid_field_name, local_name};
use crate::types::{FieldDescriptor, FieldTable};
use crate::xml::XSD_NS;
use roxmltree::Document;
use tracing::{debug, warn};

/// InfoPath's "cannot be blank" text type, declared in every form schema as
/// a `minLength="1"` restriction of `xsd:string`.
pub const REQUIRED_STRING: &str = "requiredString";

pub(super) fn declare_fields(schema: &Document, root_element: &str, table: &mut FieldTable) {
    for decl in schema
        .descendants()
        .filter(|n| n.has_tag_name((XSD_NS, "element")))
    {
        let (Some(name), Some(declared)) = (decl.attribute("name"), decl.attribute("type")) else {
            continue;
        };
        if name == root_element || declared.trim().is_empty() {
            continue;
        }
        if !is_valid_field_name(name) {
            warn!(field = name, "skipping declaration with an invalid field name");
            continue;
        }
        if table.contains(name) {
            debug!(field = name, "duplicate declaration, keeping the first");
            continue;
        }
        let (base_type, required) = classify_type(declared);
        table.fields.insert(
            name.to_string(),
            FieldDescriptor::scalar(name, base_type, required),
        );
    }
}

/// Declared type → (base type, required).
fn classify_type(declared: &str) -> (&str, bool) {
    match local_name(declared.trim()) {
        REQUIRED_STRING => ("string", true),
        base => (base, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml;

    fn declare(schema: &str) -> FieldTable {
        let doc = xml::parse(schema).unwrap();
        let mut table = FieldTable::default();
        declare_fields(&doc, "myFields", &mut table);
        table
    }

    const OPEN: &str = r#"<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:my="urn:test">"#;

    #[test]
    fn typed_declarations_become_fields() {
        let table = declare(&format!(
            r#"{OPEN}
            <xsd:element name="myFields" type="my:rootType"/>
            <xsd:element name="amount" type="xsd:decimal"/>
            <xsd:element name="when" type="xsd:date"/>
            </xsd:schema>"#
        ));
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["amount", "when"]);
        assert_eq!(table.get("amount").unwrap().base_type, "decimal");
        assert!(!table.get("when").unwrap().required);
    }

    #[test]
    fn required_string_sentinel() {
        let table = declare(&format!(
            r#"{OPEN}<xsd:element name="comment" type="my:requiredString"/></xsd:schema>"#
        ));
        let comment = table.get("comment").unwrap();
        assert_eq!(comment.base_type, "string");
        assert!(comment.required);
    }

    #[test]
    fn untyped_and_empty_typed_declarations_are_excluded() {
        let table = declare(&format!(
            r#"{OPEN}
            <xsd:element name="group"><xsd:complexType/></xsd:element>
            <xsd:element name="blank" type=""/>
            <xsd:element ref="my:group"/>
            </xsd:schema>"#
        ));
        assert!(table.is_empty());
    }

    #[test]
    fn invalid_names_are_skipped() {
        let table = declare(&format!(
            r#"{OPEN}
            <xsd:element name="9lives" type="xsd:string"/>
            <xsd:element name="ok" type="xsd:string"/>
            </xsd:schema>"#
        ));
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["ok"]);
    }

    #[test]
    fn first_declaration_wins() {
        let table = declare(&format!(
            r#"{OPEN}
            <xsd:element name="twice" type="xsd:string"/>
            <xsd:element name="twice" type="xsd:boolean"/>
            </xsd:schema>"#
        ));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("twice").unwrap().base_type, "string");
    }
}
