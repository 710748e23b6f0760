//! Shared types produced by the manifest reader and the schema passes.
//!
//! A [`FieldTable`] is serialized to JSON by the `schema` command and is the
//! input of the template converter, so its serialized shape is the public
//! contract:
//!
//! ```json
//! {
//!   "feedback": {
//!     "type": "string",
//!     "required": false,
//!     "default": null,
//!     "size": null,
//!     "optionType": "checkbox",
//!     "options": { "good": "Good", "bad": "Bad" },
//!     "other": true,
//!     "otherLabel": "Something else:"
//!   }
//! }
//! ```

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Option value → label, in document order.
pub type OptionSet = IndexMap<String, String>;

/// How a field is presented when it offers a fixed set of choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Select,
    Multiselect,
    Radio,
    Checkbox,
}

/// The trailing free-text member of a checkbox group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OtherOption {
    pub label: Option<String>,
}

/// What the view passes learned about a field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldKind {
    /// Plain value, no option set.
    #[default]
    Scalar,
    /// Drop-down (`multiple = false`) or list box (`multiple = true`).
    Select { multiple: bool, options: OptionSet },
    Radio { options: OptionSet },
    /// Boolean schema members folded into one multi-valued field.
    ///
    /// `as_select` presents the group as a multiselect instead of checkboxes.
    CheckboxGroup {
        options: OptionSet,
        other: Option<OtherOption>,
        as_select: bool,
    },
}

/// One inferred form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    /// Base type with the namespace prefix removed (`string`, `boolean`, …).
    pub base_type: String,
    pub required: bool,
    pub default: Option<String>,
    /// Reserved; nothing sets it yet.
    pub size: Option<u32>,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    pub fn scalar(name: impl Into<String>, base_type: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            base_type: base_type.into(),
            required,
            default: None,
            size: None,
            kind: FieldKind::Scalar,
        }
    }

    pub fn option_type(&self) -> Option<OptionType> {
        match &self.kind {
            FieldKind::Scalar => None,
            FieldKind::Select { multiple: true, .. } => Some(OptionType::Multiselect),
            FieldKind::Select { multiple: false, .. } => Some(OptionType::Select),
            FieldKind::Radio { .. } => Some(OptionType::Radio),
            FieldKind::CheckboxGroup { as_select: true, .. } => Some(OptionType::Multiselect),
            FieldKind::CheckboxGroup { as_select: false, .. } => Some(OptionType::Checkbox),
        }
    }

    pub fn options(&self) -> Option<&OptionSet> {
        match &self.kind {
            FieldKind::Scalar => None,
            FieldKind::Select { options, .. }
            | FieldKind::Radio { options }
            | FieldKind::CheckboxGroup { options, .. } => Some(options),
        }
    }

    /// The `other` member of a checkbox group, if the group has one.
    pub fn other(&self) -> Option<&OtherOption> {
        match &self.kind {
            FieldKind::CheckboxGroup { other, .. } => other.as_ref(),
            _ => None,
        }
    }

    /// Schema names of the members folded into this field, in option order,
    /// with the `other` member last. Empty for anything but a checkbox group.
    pub fn member_names(&self) -> Vec<String> {
        let FieldKind::CheckboxGroup { options, other, .. } = &self.kind else {
            return Vec::new();
        };
        let mut names: Vec<String> = options
            .keys()
            .map(|key| format!("{}_{}", self.name, key))
            .collect();
        if other.is_some() {
            names.push(format!("{}_other", self.name));
        }
        names
    }
}

impl Serialize for FieldDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", &self.base_type)?;
        map.serialize_entry("required", &self.required)?;
        map.serialize_entry("default", &self.default)?;
        map.serialize_entry("size", &self.size)?;
        if let Some(option_type) = self.option_type() {
            map.serialize_entry("optionType", &option_type)?;
        }
        if let Some(options) = self.options() {
            map.serialize_entry("options", options)?;
        }
        if let FieldKind::CheckboxGroup { other, .. } = &self.kind {
            map.serialize_entry("other", &other.is_some())?;
            if let Some(label) = other.as_ref().and_then(|o| o.label.as_ref()) {
                map.serialize_entry("otherLabel", label)?;
            }
        }
        map.end()
    }
}

/// A non-fatal disagreement between the schema and the view.
///
/// The passes record these and carry on: a partial table is still useful.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaInconsistency {
    #[error("{control} control bound to undeclared field '{field}'")]
    UnknownBinding { control: &'static str, field: String },
    #[error("group '{group}' references undeclared field '{member}'")]
    UnknownGroupMember { group: String, member: String },
}

/// The inferred fields of a form, in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldTable {
    pub(crate) fields: IndexMap<String, FieldDescriptor>,
    #[serde(skip)]
    pub(crate) inconsistencies: Vec<SchemaInconsistency>,
}

impl FieldTable {
    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn inconsistencies(&self) -> &[SchemaInconsistency] {
        &self.inconsistencies
    }

    /// Resolve a schema field name to the table entry presenting it: the
    /// field itself, or the checkbox group it was folded into.
    pub fn resolve(&self, schema_name: &str) -> Option<&FieldDescriptor> {
        self.get(schema_name).or_else(|| {
            self.iter()
                .find(|f| f.member_names().iter().any(|m| m == schema_name))
        })
    }
}

/// A named view and the stylesheet member rendering it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct View {
    pub name: String,
    pub stylesheet: String,
}

/// Where the form posts its data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubmitInfo {
    pub action: Option<String>,
    pub method: Option<String>,
}
