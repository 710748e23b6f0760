//! Pass 4: fold boolean members of schema groups into checkbox groups.
//!
//! InfoPath has no multi-valued checkbox field. A designer who wants "pick
//! any of" adds a group with one boolean per choice, and often a trailing
//! string for "other":
//!
//! ```xml
//! <xsd:element name="feedback">
//!   <xsd:complexType><xsd:sequence>
//!     <xsd:element ref="my:feedback_good"/>
//!     <xsd:element ref="my:feedback_bad"/>
//!     <xsd:element ref="my:feedback_other"/>
//!   </xsd:sequence></xsd:complexType>
//! </xsd:element>
//! ```
//!
//! The fold is all-or-nothing. Every direct member must be
//! `<group>_<key>` typed boolean, or exactly `<group>_other` typed string.
//! Anything else leaves the group alone and its members stay ordinary fields.
//!
//! A group whose only member is the string `<group>_other` also stays
//! unfolded, even though that member qualifies: a checkbox group with no
//! checkboxes is just a text field, so at least one boolean is required.

use super::record;
use crate::config::SchemaConfig;
use crate::naming::{binding_matches, is_valid_field_name, local_name};
use crate::types::{FieldDescriptor, FieldKind, FieldTable, OptionSet, OtherOption, SchemaInconsistency};
use crate::xml::{XSD_NS, surrounding_label, xd_attribute};
use roxmltree::{Document, Node, NodeId};
use std::collections::HashSet;
use tracing::debug;

/// A classified direct member of a group.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Member {
    Choice { member: String, key: String },
    Other { member: String },
}

impl Member {
    fn name(&self) -> &str {
        match self {
            Member::Choice { member, .. } | Member::Other { member } => member,
        }
    }
}

pub(super) fn fold_checkbox_groups(
    schema: &Document,
    view: &Document,
    root_element: &str,
    config: &SchemaConfig,
    table: &mut FieldTable,
) {
    let groups: Vec<(&str, Node)> = schema
        .descendants()
        .filter(|n| n.has_tag_name((XSD_NS, "element")))
        .filter_map(|decl| {
            let name = decl.attribute("name")?;
            let complex = decl
                .children()
                .find(|c| c.has_tag_name((XSD_NS, "complexType")))?;
            Some((name, complex))
        })
        .filter(|(name, _)| *name != root_element)
        .collect();
    let group_names: HashSet<&str> = groups.iter().map(|(name, _)| *name).collect();

    for (group, complex) in groups {
        if !is_valid_field_name(group) {
            continue;
        }
        if table.contains(group) {
            debug!(group, "group name already used by a field, not folding");
            continue;
        }
        let references = member_references(complex);
        let Some(members) = classify_members(group, &references, &group_names, table) else {
            continue;
        };
        fold(group, &members, view, config, table);
    }
}

/// Local names of the element particles owned directly by `complex`.
/// Particles of nested anonymous types belong to the nested group.
fn member_references<'a>(complex: Node<'a, '_>) -> Vec<&'a str> {
    complex
        .descendants()
        .skip(1)
        .filter(|n| n.has_tag_name((XSD_NS, "element")))
        .filter(|n| owning_complex_type(*n) == Some(complex.id()))
        .filter_map(|n| n.attribute("ref").or_else(|| n.attribute("name")))
        .map(local_name)
        .collect()
}

fn owning_complex_type(node: Node) -> Option<NodeId> {
    node.ancestors()
        .skip(1)
        .find(|a| a.has_tag_name((XSD_NS, "complexType")))
        .map(|a| a.id())
}

/// Apply the folding predicate. `None` means the group does not qualify.
fn classify_members(
    group: &str,
    references: &[&str],
    group_names: &HashSet<&str>,
    table: &mut FieldTable,
) -> Option<Vec<Member>> {
    if references.is_empty() {
        return None;
    }
    let prefix = format!("{group}_");
    let other_name = format!("{group}_other");

    let mut members = Vec::with_capacity(references.len());
    let mut qualifies = true;
    for &reference in references {
        let Some(field) = table.get(reference) else {
            // Nested groups are untyped and never in the table; they just
            // disqualify the parent.
            if !group_names.contains(reference) {
                record(
                    table,
                    SchemaInconsistency::UnknownGroupMember {
                        group: group.to_string(),
                        member: reference.to_string(),
                    },
                );
            }
            qualifies = false;
            continue;
        };
        match classify_member(field, &prefix, &other_name) {
            Some(member) => members.push(member),
            None => {
                debug!(group, member = reference, "member does not fit a checkbox group");
                qualifies = false;
            }
        }
    }

    let has_choice = members.iter().any(|m| matches!(m, Member::Choice { .. }));
    (qualifies && has_choice).then_some(members)
}

/// A boolean `<group>_<key>` is always a choice, even when the key is
/// `other`. Only a string-typed `<group>_other` is the free-text member.
fn classify_member(field: &FieldDescriptor, prefix: &str, other_name: &str) -> Option<Member> {
    match field.base_type.as_str() {
        "boolean" => {
            let key = field.name.strip_prefix(prefix)?;
            (!key.is_empty()).then(|| Member::Choice {
                member: field.name.clone(),
                key: key.to_string(),
            })
        }
        "string" if field.name == other_name => Some(Member::Other {
            member: field.name.clone(),
        }),
        _ => None,
    }
}

fn fold(
    group: &str,
    members: &[Member],
    view: &Document,
    config: &SchemaConfig,
    table: &mut FieldTable,
) {
    let mut options = OptionSet::new();
    let mut other = None;
    for member in members {
        match member {
            Member::Choice { member, key } => {
                let label = view_label(view, group, member).unwrap_or_else(|| key.clone());
                options.insert(key.clone(), label);
            }
            Member::Other { member } => {
                other = Some(OtherOption {
                    label: view_label(view, group, member),
                });
            }
        }
    }

    let Some(position) = members
        .iter()
        .filter_map(|m| table.fields.get_index_of(m.name()))
        .min()
    else {
        return;
    };
    for member in members {
        table.fields.shift_remove(member.name());
    }

    debug!(group, options = options.len(), other = other.is_some(), "folded checkbox group");
    let descriptor = FieldDescriptor {
        kind: FieldKind::CheckboxGroup {
            options,
            other,
            as_select: config.treat_grouped_checkboxes_as_selects,
        },
        ..FieldDescriptor::scalar(group, "string", false)
    };
    table.fields.shift_insert(position, group.to_string(), descriptor);
}

/// Label text around the first view control bound to `member`, either as
/// `<group>/<member>` or as `<member>` alone.
fn view_label(view: &Document, group: &str, member: &str) -> Option<String> {
    view.descendants()
        .filter(Node::is_element)
        .find(|n| {
            xd_attribute(*n, "binding")
                .is_some_and(|binding| binding_matches(binding, Some(group), member))
        })
        .and_then(surrounding_label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OptionType;
    use crate::xml;

    const SCHEMA_OPEN: &str = r#"<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:my="urn:test">"#;

    const VIEW: &str = r#"<xsl:stylesheet version="1.0"
        xmlns:xsl="http://www.w3.org/1999/XSL/Transform"
        xmlns:xd="http://schemas.microsoft.com/office/infopath/2003"
        xmlns:my="urn:test"><xsl:template match="my:myFields"><html><body>
          <div><input type="checkbox" xd:binding="my:feedback/my:feedback_good" xd:onValue="true"/>&#160;Good</div>
          <div><input type="checkbox" xd:binding="my:feedback_bad" xd:onValue="true"/>Bad</div>
          <div>Something else: <span xd:xctname="PlainText" xd:binding="my:feedback/my:feedback_other"><xsl:value-of select="my:feedback/my:feedback_other"/></span></div>
        </body></html></xsl:template></xsl:stylesheet>"#;

    fn run(declarations: &str, fields: &[(&str, &str)], config: &SchemaConfig) -> FieldTable {
        let schema_text = format!("{SCHEMA_OPEN}{declarations}</xsd:schema>");
        let schema = xml::parse(&schema_text).unwrap();
        let view = xml::parse(VIEW).unwrap();
        let mut table = FieldTable::default();
        for (name, base_type) in fields {
            table
                .fields
                .insert(name.to_string(), FieldDescriptor::scalar(*name, *base_type, false));
        }
        fold_checkbox_groups(&schema, &view, "myFields", config, &mut table);
        table
    }

    fn feedback_group(members: &[&str]) -> String {
        let refs: String = members
            .iter()
            .map(|m| format!(r#"<xsd:element ref="my:{m}" minOccurs="0"/>"#))
            .collect();
        format!(
            r#"<xsd:element name="feedback"><xsd:complexType><xsd:sequence>{refs}</xsd:sequence></xsd:complexType></xsd:element>"#
        )
    }

    const FEEDBACK_FIELDS: &[(&str, &str)] = &[
        ("name", "string"),
        ("feedback_good", "boolean"),
        ("feedback_bad", "boolean"),
        ("feedback_other", "string"),
        ("after", "string"),
    ];

    #[test]
    fn folds_qualifying_group_in_place() {
        let table = run(
            &feedback_group(&["feedback_good", "feedback_bad", "feedback_other"]),
            FEEDBACK_FIELDS,
            &SchemaConfig::default(),
        );
        assert_eq!(
            table.names().collect::<Vec<_>>(),
            vec!["name", "feedback", "after"]
        );
        let feedback = table.get("feedback").unwrap();
        assert_eq!(feedback.option_type(), Some(OptionType::Checkbox));
        assert_eq!(feedback.base_type, "string");
        assert!(!feedback.required);
        assert_eq!(feedback.default, None);
        let options: Vec<(&str, &str)> = feedback
            .options()
            .unwrap()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(options, vec![("good", "Good"), ("bad", "Bad")]);
        assert_eq!(
            feedback.other().and_then(|o| o.label.as_deref()),
            Some("Something else:")
        );
    }

    #[test]
    fn group_without_other_member() {
        let table = run(
            &feedback_group(&["feedback_good", "feedback_bad"]),
            &FEEDBACK_FIELDS[..3],
            &SchemaConfig::default(),
        );
        let feedback = table.get("feedback").unwrap();
        assert_eq!(feedback.other(), None);
        assert_eq!(feedback.member_names(), vec!["feedback_good", "feedback_bad"]);
    }

    #[test]
    fn one_disqualified_member_blocks_the_fold() {
        let table = run(
            &feedback_group(&["feedback_good", "feedback_bad", "feedback_other"]),
            &[
                ("feedback_good", "boolean"),
                ("feedback_bad", "string"),
                ("feedback_other", "string"),
            ],
            &SchemaConfig::default(),
        );
        assert!(!table.contains("feedback"));
        assert_eq!(table.len(), 3);
        assert!(table.inconsistencies().is_empty());
    }

    #[test]
    fn boolean_other_member_is_an_ordinary_choice() {
        let table = run(
            &feedback_group(&["feedback_good", "feedback_other"]),
            &[("feedback_good", "boolean"), ("feedback_other", "boolean")],
            &SchemaConfig::default(),
        );
        let feedback = table.get("feedback").unwrap();
        let keys: Vec<&str> = feedback.options().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["good", "other"]);
        assert_eq!(feedback.other(), None);
        assert!(!table.contains("feedback_other"));
    }

    #[test]
    fn other_alone_does_not_qualify() {
        let table = run(
            &feedback_group(&["feedback_other"]),
            &[("feedback_other", "string")],
            &SchemaConfig::default(),
        );
        assert!(!table.contains("feedback"));
        assert!(table.contains("feedback_other"));
    }

    #[test]
    fn undeclared_member_is_recorded_and_blocks_the_fold() {
        let table = run(
            &feedback_group(&["feedback_good", "feedback_missing"]),
            &[("feedback_good", "boolean")],
            &SchemaConfig::default(),
        );
        assert!(table.contains("feedback_good"));
        assert_eq!(
            table.inconsistencies(),
            &[SchemaInconsistency::UnknownGroupMember {
                group: "feedback".to_string(),
                member: "feedback_missing".to_string(),
            }]
        );
    }

    #[test]
    fn nested_group_members_belong_to_the_nested_group() {
        let declarations = r#"
            <xsd:element name="outer"><xsd:complexType><xsd:sequence>
              <xsd:element ref="my:outer_yes"/>
              <xsd:element name="inner"><xsd:complexType><xsd:sequence>
                <xsd:element ref="my:inner_a"/>
              </xsd:sequence></xsd:complexType></xsd:element>
            </xsd:sequence></xsd:complexType></xsd:element>"#;
        let table = run(
            declarations,
            &[("outer_yes", "boolean"), ("inner_a", "boolean")],
            &SchemaConfig::default(),
        );
        // `inner` qualifies on its own; `outer` holds a group and does not.
        assert!(table.contains("inner"));
        assert!(!table.contains("outer"));
        assert!(table.contains("outer_yes"));
        assert!(table.inconsistencies().is_empty());
    }

    #[test]
    fn labels_fall_back_to_option_key() {
        let declarations = r#"<xsd:element name="extras"><xsd:complexType><xsd:sequence>
              <xsd:element ref="my:extras_parking"/><xsd:element ref="my:extras_other"/>
            </xsd:sequence></xsd:complexType></xsd:element>"#;
        let table = run(
            declarations,
            &[("extras_parking", "boolean"), ("extras_other", "string")],
            &SchemaConfig::default(),
        );
        let extras = table.get("extras").unwrap();
        assert_eq!(
            extras.options().unwrap().get("parking").map(String::as_str),
            Some("parking")
        );
        assert_eq!(extras.other(), Some(&OtherOption { label: None }));
    }

    #[test]
    fn root_element_is_never_folded() {
        let declarations = r#"<xsd:element name="myFields"><xsd:complexType><xsd:sequence>
              <xsd:element ref="my:myFields_flag"/>
            </xsd:sequence></xsd:complexType></xsd:element>"#;
        let table = run(
            declarations,
            &[("myFields_flag", "boolean")],
            &SchemaConfig::default(),
        );
        assert!(table.contains("myFields_flag"));
        assert!(!table.contains("myFields"));
    }

    #[test]
    fn as_select_flag_is_carried() {
        let config = SchemaConfig {
            treat_grouped_checkboxes_as_selects: true,
        };
        let table = run(
            &feedback_group(&["feedback_good", "feedback_bad"]),
            &FEEDBACK_FIELDS[..3],
            &config,
        );
        assert_eq!(
            table.get("feedback").unwrap().option_type(),
            Some(OptionType::Multiselect)
        );
    }
}
