//! Pluralization and singularization of snake_case table names.
//!
//! Only the last `_`-separated word of an identifier is inflected, so
//! `team_member` becomes `team_members` and `sales_person` becomes
//! `sales_people`. Irregular nouns common in schemas are resolved from a table
//! before falling back to the `inflector` crate.

use inflector::Inflector;

static IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("leaf", "leaves"),
    ("life", "lives"),
    ("wife", "wives"),
    ("half", "halves"),
    ("hero", "heroes"),
    ("analysis", "analyses"),
    ("basis", "bases"),
    ("crisis", "crises"),
    ("criterion", "criteria"),
    ("medium", "media"),
    ("index", "indices"),
    ("appendix", "appendices"),
    ("matrix", "matrices"),
    ("vertex", "vertices"),
];

/// Words that read the same in both forms.
static INVARIANT: &[&str] = &["data", "metadata", "info", "information", "series", "species", "news"];

fn split_last_word(identifier: &str) -> (&str, &str) {
    match identifier.rfind('_') {
        Some(idx) if idx + 1 < identifier.len() => identifier.split_at(idx + 1),
        _ => ("", identifier),
    }
}

fn inflect_word(word: &str, plural: bool) -> String {
    let lower = word.to_lowercase();

    if INVARIANT.contains(&lower.as_str()) {
        return word.to_string();
    }

    for (singular_form, plural_form) in IRREGULAR_PLURALS {
        if lower == *singular_form || lower == *plural_form {
            return if plural { plural_form } else { singular_form }.to_string();
        }
    }

    if plural {
        word.to_plural()
    } else {
        word.to_singular()
    }
}

/// Pluralize the last word of a snake_case identifier.
///
/// ```ignore
/// assert_eq!(pluralize("team_member"), "team_members");
/// assert_eq!(pluralize("users"), "users");
/// ```
pub fn pluralize(identifier: &str) -> String {
    if identifier.is_empty() {
        return String::new();
    }
    let (prefix, word) = split_last_word(identifier);
    format!("{}{}", prefix, inflect_word(word, true))
}

/// Singularize the last word of a snake_case identifier.
///
/// ```ignore
/// assert_eq!(singularize("team_members"), "team_member");
/// assert_eq!(singularize("people"), "person");
/// ```
pub fn singularize(identifier: &str) -> String {
    if identifier.is_empty() {
        return String::new();
    }
    let (prefix, word) = split_last_word(identifier);
    format!("{}{}", prefix, inflect_word(word, false))
}
