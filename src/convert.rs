//! Rendered view → server-side template.
//!
//! Best effort: every bound control in the HTML is swapped for a placeholder
//! that a form library expands at request time. With the default pattern
//! `{{ form.{name} }}`:
//!
//! ```text
//! <select xd:binding="my:department">…</select>   →  {{ form.department }}
//! <input type="radio" xd:binding="my:rating" …>    →  {{ form.rating }}
//! <input type="radio" xd:binding="my:rating" …>    →  (removed)
//! ```
//!
//! A field is emitted once, at its first control. Radios and the members of
//! a folded checkbox group render several controls for one field; the rest
//! are dropped since the library renders the whole option set. Controls
//! whose field is not in the table are left untouched.

use crate::html::attribute;
use crate::naming::binding_field;
use crate::types::FieldTable;
use regex::{Captures, Regex};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

/// Bound controls in document order. Unbound spans and divs are skipped so
/// controls nested inside them are still found.
static RE_CONTROL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?is)",
        r"<select\b(?P<select>[^>]*)>.*?</select\s*>",
        r"|<span\b(?P<span>[^>]*\bxd:binding\s*=[^>]*)>.*?</span\s*>",
        r"|<div\b(?P<div>[^>]*\bxd:binding\s*=[^>]*)>.*?</div\s*>",
        r"|<input\b(?P<input>[^>]*?)/?>",
    ))
    .expect("valid control regex")
});

/// Substitute `{name}` in a placeholder pattern.
pub fn placeholder_for(pattern: &str, field: &str) -> String {
    pattern.replace("{name}", field)
}

/// Replace bound controls in `html` with `placeholder` (see module docs).
pub fn to_template(html: &str, table: &FieldTable, placeholder: &str) -> String {
    let mut emitted: HashSet<String> = HashSet::new();
    RE_CONTROL
        .replace_all(html, |caps: &Captures| {
            let Some(field) = control_field(caps) else {
                return caps[0].to_string();
            };
            let Some(descriptor) = table.resolve(&field) else {
                debug!(field = %field, "control bound to unknown field left as is");
                return caps[0].to_string();
            };
            if emitted.insert(descriptor.name.clone()) {
                placeholder_for(placeholder, &descriptor.name)
            } else {
                String::new()
            }
        })
        .into_owned()
}

/// The schema field a matched control is bound to.
fn control_field(caps: &Captures) -> Option<String> {
    let attrs = ["select", "span", "div", "input"]
        .iter()
        .find_map(|group| caps.name(group))?
        .as_str();
    if let Some(binding) = attribute(attrs, "xd:binding") {
        return binding_field(&binding).map(str::to_string);
    }
    // Text boxes already replaced by the renderer carry a plain name.
    if caps.name("input").is_some() {
        return attribute(attrs, "name").filter(|name| !name.is_empty());
    }
    None
}
