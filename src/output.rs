//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every entity (view, field) is shown by its identity first: a positional
//! index and its name. Where it comes from and what it carries follow as
//! indented context lines.
//!
//! # Output Format
//!
//! ## Info
//!
//! ```text
//! Form fixtures/feedback-form
//!     Root element: myFields
//!     Namespace: http://schemas.microsoft.com/office/infopath/2003/myXSD/2024-01-15T10:00:00
//!     Schema: myschema.xsd
//!     Template: template.xml
//!     Submit: POST http://forms.example.org/feedback
//!
//! Views
//! 001 Feedback (default)
//!     Stylesheet: view1.xsl
//! 002 Summary
//!     Stylesheet: view2.xsl
//! ```
//!
//! ## Schema
//!
//! ```text
//! Fields
//! 001 full_name: string
//! 006 department: string = "sales" (select)
//!     sales: Sales
//!     it: IT
//! 007 feedback: string (checkbox)
//!     good: Good
//!     bad: Bad
//!     other: Something else:
//! 010 comment: string, required
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::manifest::Manifest;
use crate::types::{FieldDescriptor, FieldTable, OptionType};

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn option_type_name(option_type: OptionType) -> &'static str {
    match option_type {
        OptionType::Select => "select",
        OptionType::Multiselect => "multiselect",
        OptionType::Radio => "radio",
        OptionType::Checkbox => "checkbox",
    }
}

/// Field header: index, name, type, and the flags that are set.
///
/// ```text
/// 003 visit_date: date
/// 010 comment: string, required
/// 006 department: string = "sales" (select)
/// ```
fn field_header(index: usize, field: &FieldDescriptor) -> String {
    let mut line = format!("{} {}: {}", format_index(index), field.name, field.base_type);
    if field.required {
        line.push_str(", required");
    }
    if let Some(default) = &field.default {
        line.push_str(&format!(" = {:?}", default));
    }
    if let Some(option_type) = field.option_type() {
        line.push_str(&format!(" ({})", option_type_name(option_type)));
    }
    line
}

// ============================================================================
// Info
// ============================================================================

pub fn format_manifest(label: &str, manifest: &Manifest) -> Vec<String> {
    let mut lines = vec![format!("Form {}", label)];
    lines.push(format!("{}Root element: {}", indent(1), manifest.root_element));
    if let Some(namespace) = &manifest.namespace {
        lines.push(format!("{}Namespace: {}", indent(1), namespace));
    }
    lines.push(format!("{}Schema: {}", indent(1), manifest.schema_member));
    lines.push(format!("{}Template: {}", indent(1), manifest.template_member));
    match manifest.submit.as_ref().and_then(|s| s.action.as_deref()) {
        Some(action) => {
            let method = manifest
                .submit
                .as_ref()
                .and_then(|s| s.method.as_deref())
                .unwrap_or("GET");
            lines.push(format!("{}Submit: {} {}", indent(1), method, action));
        }
        None => lines.push(format!("{}Submit: none", indent(1))),
    }
    lines.push(String::new());
    lines.extend(format_views(manifest));
    lines
}

pub fn print_manifest(label: &str, manifest: &Manifest) {
    for line in format_manifest(label, manifest) {
        println!("{}", line);
    }
}

pub fn format_views(manifest: &Manifest) -> Vec<String> {
    let primary = &manifest.primary_view().name;
    let mut lines = vec!["Views".to_string()];
    for (i, view) in manifest.views().iter().enumerate() {
        let marker = if &view.name == primary { " (default)" } else { "" };
        lines.push(format!("{} {}{}", format_index(i + 1), view.name, marker));
        lines.push(format!("{}Stylesheet: {}", indent(1), view.stylesheet));
    }
    lines
}

pub fn print_views(manifest: &Manifest) {
    for line in format_views(manifest) {
        println!("{}", line);
    }
}

// ============================================================================
// Schema
// ============================================================================

pub fn format_fields(table: &FieldTable) -> Vec<String> {
    let mut lines = vec!["Fields".to_string()];
    for (i, field) in table.iter().enumerate() {
        lines.push(field_header(i + 1, field));
        if let Some(options) = field.options() {
            for (key, label) in options {
                lines.push(format!("{}{}: {}", indent(1), key, label));
            }
        }
        if let Some(other) = field.other() {
            let label = other.label.as_deref().unwrap_or("(no label)");
            lines.push(format!("{}other: {}", indent(1), label));
        }
    }

    if !table.inconsistencies().is_empty() {
        lines.push(String::new());
        lines.push("Inconsistencies".to_string());
        for issue in table.inconsistencies() {
            lines.push(format!("{}{}", indent(1), issue));
        }
    }
    lines
}

pub fn print_fields(table: &FieldTable) {
    for line in format_fields(table) {
        println!("{}", line);
    }
}
