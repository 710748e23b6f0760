//! # InfoPath Reader
//!
//! Reads Microsoft InfoPath forms: the published `.xsn` container (a CAB
//! archive) or the folder InfoPath writes with "Save as Source Files".
//!
//! # Architecture: One Form, Three Documents
//!
//! A form describes the same fields in three independently authored
//! documents, tied together by the manifest:
//!
//! ```text
//! manifest.xsf  →  root element, views, submit target, member names
//! myschema.xsd  →  names, types, required-ness, groups
//! template.xml  →  default values
//! view1.xsl     →  option sets and hand-written labels
//! ```
//!
//! The interesting part of the crate is [`schema`], which reconciles those
//! documents into one flat [`types::FieldTable`]. The rest is extraction
//! ([`archive`], [`manifest`]) and delegation ([`render`] to an XSLT
//! processor, [`convert`] to pattern replacement).
//!
//! ```rust,no_run
//! use infopath_reader::config::SchemaConfig;
//! use infopath_reader::form::InfoPathForm;
//! use std::path::Path;
//!
//! let mut form = InfoPathForm::open(Path::new("feedback.xsn"))?;
//! let table = form.read_schema(&SchemaConfig::default())?;
//! for field in table.iter() {
//!     println!("{} {:?}", field.name, field.option_type());
//! }
//! # Ok::<(), infopath_reader::form::FormError>(())
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`form`] | [`form::InfoPathForm`] facade: open a form, then query it |
//! | [`archive`] | Member access over CAB files, source folders, and memory |
//! | [`manifest`] | `manifest.xsf` reader: root element, views, submit target |
//! | [`schema`] | Four-pass field-table inference |
//! | [`render`] | View rendering through an [`render::XsltProcessor`], plus HTML post-processing |
//! | [`convert`] | Rendered view → template with field placeholders |
//! | [`config`] | `infopath.toml` loading, validation, and merging |
//! | [`types`] | Field table and manifest types |
//! | [`naming`] | Prefix stripping and binding-path matching shared by every pass |
//! | [`xml`] | Tree helpers: parsing, label extraction, namespaces |
//! | [`html`] | Pattern helpers for rendered HTML |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Correlation by Name, Not by Type Hierarchy
//!
//! The three documents share nothing but field names. Each inference pass
//! reads one document and updates one mutable table, and a field's shape is
//! a tagged [`types::FieldKind`] that later passes may replace. There are no
//! field classes to dispatch on.
//!
//! ## Read-Only Trees
//!
//! Labels often have to be read "without" some markup, such as the
//! `xsl:if` inside an `<option>` or the `<input>` inside its label block.
//! Documents are parsed with `roxmltree` and text is collected while
//! skipping the excluded subtree, so no tree is ever cloned or edited.
//!
//! ## External XSLT
//!
//! Views are XSLT 1.0 with InfoPath extensions. Rendering delegates to
//! `xsltproc` behind a trait, so tests run against a mock processor and
//! nothing else in the crate depends on how the transform runs.

pub mod archive;
pub mod config;
pub mod convert;
pub mod form;
pub mod html;
pub mod manifest;
pub mod naming;
pub mod output;
pub mod render;
pub mod schema;
pub mod types;
pub mod xml;

#[cfg(test)]
pub(crate) mod test_helpers;
