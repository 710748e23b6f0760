//! Field-table inference.
//!
//! A form describes its fields three times, in three unrelated documents:
//!
//! | Document | Contributes |
//! |---|---|
//! | schema (`myschema.xsd`) | names, types, required-ness, group structure |
//! | default data (`template.xml`) | default values |
//! | primary view stylesheet | option sets and their hand-written labels |
//!
//! The documents share nothing but field names, so inference is a series of
//! passes over one table, each correlating one document by name:
//!
//! ```text
//! 1. structure   schema  →  one scalar field per typed declaration
//! 2. defaults    data    →  default values
//! 3. options     view    →  select / multiselect / radio option sets
//! 4. groups      schema  →  boolean members folded into checkbox groups
//!                + view     (labels)
//! ```
//!
//! The order matters: pass 4 decides what to fold from the types pass 1
//! recorded, and pass 3 must not see fields that pass 4 removes.
//!
//! Bindings that name undeclared fields are not errors. They are recorded as
//! [`SchemaInconsistency`] values on the table, logged, and skipped.

mod defaults;
mod groups;
mod options;
mod structure;

use crate::archive::{Archive, ArchiveError};
use crate::config::SchemaConfig;
use crate::manifest::Manifest;
use crate::types::{FieldTable, SchemaInconsistency};
use crate::xml;
use roxmltree::Document;
use thiserror::Error;
use tracing::{debug, warn};

pub use structure::REQUIRED_STRING;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error("{archive}: {member} is not valid UTF-8")]
    Encoding { archive: String, member: String },
    #[error("{archive}: {member} is malformed: {source}")]
    Malformed {
        archive: String,
        member: String,
        #[source]
        source: roxmltree::Error,
    },
}

/// Read the schema, default data and primary view from `archive` and infer
/// the field table.
///
/// Every call re-reads and re-parses the three members.
pub fn read_schema(
    archive: &mut dyn Archive,
    manifest: &Manifest,
    config: &SchemaConfig,
) -> Result<FieldTable, SchemaError> {
    let view = manifest.primary_view();
    debug!(view = %view.name, stylesheet = %view.stylesheet, "inferring fields");

    let schema_text = read_text(archive, &manifest.schema_member)?;
    let data_text = read_text(archive, &manifest.template_member)?;
    let view_text = read_text(archive, &view.stylesheet)?;

    let label = archive.label();
    let schema = parse_member(&schema_text, label, &manifest.schema_member)?;
    let data = parse_member(&data_text, label, &manifest.template_member)?;
    let view = parse_member(&view_text, label, &view.stylesheet)?;

    Ok(infer(&schema, &data, &view, &manifest.root_element, config))
}

/// Run the four passes over already-parsed documents.
pub fn infer(
    schema: &Document,
    data: &Document,
    view: &Document,
    root_element: &str,
    config: &SchemaConfig,
) -> FieldTable {
    let mut table = FieldTable::default();
    structure::declare_fields(schema, root_element, &mut table);
    defaults::apply_defaults(data, root_element, &mut table);
    options::collect_view_options(view, &mut table);
    groups::fold_checkbox_groups(schema, view, root_element, config, &mut table);
    table
}

fn read_text(archive: &mut dyn Archive, member: &str) -> Result<String, SchemaError> {
    let bytes = archive.read_member(member)?;
    xml::decode(&bytes)
        .map(str::to_string)
        .map_err(|_| SchemaError::Encoding {
            archive: archive.label().to_string(),
            member: member.to_string(),
        })
}

fn parse_member<'input>(
    text: &'input str,
    archive: &str,
    member: &str,
) -> Result<Document<'input>, SchemaError> {
    xml::parse(text).map_err(|source| SchemaError::Malformed {
        archive: archive.to_string(),
        member: member.to_string(),
        source,
    })
}

/// Log and keep an inconsistency, once.
fn record(table: &mut FieldTable, issue: SchemaInconsistency) {
    if table.inconsistencies.contains(&issue) {
        return;
    }
    warn!("{issue}");
    table.inconsistencies.push(issue);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use crate::types::{FieldKind, OptionType};

    fn infer_fixture(config: &SchemaConfig) -> FieldTable {
        let mut archive = fixture_archive();
        let manifest = fixture_manifest(&mut archive);
        read_schema(&mut archive, &manifest, config).unwrap()
    }

    #[test]
    fn fixture_table_has_expected_fields() {
        let table = infer_fixture(&SchemaConfig::default());
        let names: Vec<&str> = table.names().collect();
        assert_eq!(
            names,
            vec![
                "full_name",
                "email",
                "visit_date",
                "rating",
                "country",
                "department",
                "feedback",
                "extras_parking",
                "extras_notes",
                "comment",
                "subscribe",
            ]
        );
    }

    #[test]
    fn primary_view_supplies_option_sets() {
        let table = infer_fixture(&SchemaConfig::default());
        assert_eq!(
            option_pairs(&table, "rating"),
            vec![("1", "Poor"), ("2", "Fine"), ("3", "Great")]
        );
        assert_eq!(
            find_field(&table, "rating").option_type(),
            Some(OptionType::Radio)
        );
        assert_eq!(
            option_pairs(&table, "feedback"),
            vec![("good", "Good"), ("bad", "Bad")]
        );
    }

    #[test]
    fn root_element_never_a_field() {
        let table = infer_fixture(&SchemaConfig::default());
        assert!(!table.contains("myFields"));
    }

    #[test]
    fn required_string_becomes_required() {
        let table = infer_fixture(&SchemaConfig::default());
        let comment = table.get("comment").unwrap();
        assert_eq!(comment.base_type, "string");
        assert!(comment.required);
        assert_eq!(comment.default, None);
    }

    #[test]
    fn defaults_come_from_template() {
        let table = infer_fixture(&SchemaConfig::default());
        assert_eq!(table.get("department").unwrap().default.as_deref(), Some("sales"));
        assert_eq!(table.get("subscribe").unwrap().default.as_deref(), Some("false"));
        assert_eq!(table.get("email").unwrap().default, None);
    }

    #[test]
    fn feedback_group_folded_with_other() {
        let table = infer_fixture(&SchemaConfig::default());
        let feedback = table.get("feedback").unwrap();
        assert_eq!(feedback.option_type(), Some(OptionType::Checkbox));
        let options = feedback.options().unwrap();
        assert_eq!(options.get("good").map(String::as_str), Some("Good"));
        assert_eq!(options.get("bad").map(String::as_str), Some("Bad"));
        assert_eq!(
            feedback.other().and_then(|o| o.label.as_deref()),
            Some("Something else:")
        );
        for member in ["feedback_good", "feedback_bad", "feedback_other"] {
            assert!(!table.contains(member), "{member} should be folded");
        }
    }

    #[test]
    fn disqualified_group_keeps_members() {
        let table = infer_fixture(&SchemaConfig::default());
        assert!(!table.contains("extras"));
        assert_eq!(table.get("extras_parking").unwrap().base_type, "boolean");
        assert_eq!(table.get("extras_notes").unwrap().base_type, "string");
    }

    #[test]
    fn grouped_checkboxes_as_selects() {
        let config = SchemaConfig {
            treat_grouped_checkboxes_as_selects: true,
        };
        let table = infer_fixture(&config);
        let feedback = table.get("feedback").unwrap();
        assert_eq!(feedback.option_type(), Some(OptionType::Multiselect));
        assert!(matches!(feedback.kind, FieldKind::CheckboxGroup { .. }));
    }

    #[test]
    fn inference_is_repeatable() {
        let mut archive = fixture_archive();
        let manifest = fixture_manifest(&mut archive);
        let config = SchemaConfig::default();
        let first = read_schema(&mut archive, &manifest, &config).unwrap();
        let second = read_schema(&mut archive, &manifest, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_view_member_is_schema_error() {
        let mut archive = fixture_archive_without("view1.xsl");
        let manifest = fixture_manifest(&mut archive);
        let err = read_schema(&mut archive, &manifest, &SchemaConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::Archive(ArchiveError::MemberMissing { ref member, .. }) if member == "view1.xsl"
        ));
    }

    #[test]
    fn malformed_schema_names_member() {
        let mut archive = fixture_archive().with_member("myschema.xsd", "<xsd:schema");
        let manifest = fixture_manifest(&mut archive);
        let err = read_schema(&mut archive, &manifest, &SchemaConfig::default()).unwrap_err();
        assert!(matches!(err, SchemaError::Malformed { ref member, .. } if member == "myschema.xsd"));
    }
}
