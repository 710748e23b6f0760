//! Centralized name handling for schema declarations and view bindings.
//!
//! The three documents of a form refer to the same fields by name, but each
//! spells the name differently:
//!
//! - the schema declares `name="comment"` and references `ref="my:comment"`
//! - the default data contains `<my:comment>` elements
//! - the view binds controls with `xd:binding="my:feedback/my:feedback_good"`
//!
//! Everything that correlates those documents goes through the helpers here,
//! so "strip the prefix" means the same thing in every pass.

/// Return the local part of a qualified name.
///
/// - `"my:comment"` → `"comment"`
/// - `"xsd:boolean"` → `"boolean"`
/// - `"comment"` → `"comment"`
pub fn local_name(qualified: &str) -> &str {
    match qualified.rfind(':') {
        Some(pos) => &qualified[pos + 1..],
        None => qualified,
    }
}

/// Split a binding path into its local step names.
///
/// `"my:feedback/my:feedback_good"` → `["feedback", "feedback_good"]`.
/// Leading `./`, empty steps and surrounding whitespace are ignored.
pub fn binding_steps(binding: &str) -> Vec<&str> {
    binding
        .split('/')
        .map(str::trim)
        .filter(|step| !step.is_empty() && *step != ".")
        .map(local_name)
        .collect()
}

/// The field a binding points at: the local name of its last step.
///
/// Returns `None` for an empty binding.
pub fn binding_field(binding: &str) -> Option<&str> {
    binding_steps(binding).last().copied()
}

/// Whether a binding addresses `field`, either directly (`my:field`) or
/// through its group (`my:group/my:field`).
pub fn binding_matches(binding: &str, group: Option<&str>, field: &str) -> bool {
    let steps = binding_steps(binding);
    match (group, steps.as_slice()) {
        (_, [only]) => *only == field,
        (Some(group), [.., parent, last]) => *parent == group && *last == field,
        _ => false,
    }
}

/// Check a field name against the XML element naming rule used by the
/// schema: a letter or underscore, then letters, digits, `_`, `-` or `.`.
pub fn is_valid_field_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
