//! Default-filter normalization.
//!
//! mem0's v2 filter expressions are boolean trees built from the combinators
//! `AND`, `OR` and `NOT` over leaf constraints. Every call this server makes
//! must be scoped to a user identity, so caller-supplied filters pass through
//! [`with_default_filters`] before reaching the wire. The check is shallow:
//! only the top-level keys decide whether a combinator is already present.

use serde_json::{json, Value};

/// Combinator keys recognized at the top level of a filter expression.
const COMBINATORS: [&str; 3] = ["AND", "OR", "NOT"];

/// Scope a filter expression to a user identity.
///
/// Behavior, in order:
/// - `None` becomes `{"AND": [{"user_id": user_id}]}`.
/// - An expression with no top-level `AND`/`OR`/`NOT` key becomes one operand
///   of a new `AND`, with the identity constraint prepended.
/// - An expression that already has a top-level combinator is returned
///   unchanged; the caller is assumed to have scoped identity themselves.
///
/// Pure and total: no error conditions, and applying it to its own output is
/// a no-op (the output always carries a top-level `AND`).
pub fn with_default_filters(user_id: &str, filters: Option<Value>) -> Value {
    let identity = json!({ "user_id": user_id });

    match filters {
        None => json!({ "AND": [identity] }),
        Some(value) => {
            if has_top_level_combinator(&value) {
                value
            } else {
                json!({ "AND": [identity, value] })
            }
        }
    }
}

/// The filter leaf that scopes a call to one project tag.
pub fn project_filter(project: &str) -> Value {
    json!({ "metadata": { "project": project } })
}

/// Shallow check for a top-level `AND`/`OR`/`NOT` key.
fn has_top_level_combinator(value: &Value) -> bool {
    value
        .as_object()
        .map(|map| COMBINATORS.iter().any(|key| map.contains_key(*key)))
        .unwrap_or(false)
}
