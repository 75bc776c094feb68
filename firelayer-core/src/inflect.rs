//! Naming helpers used to derive collection names from model type names.
//!
//! A model called `AdminUser` is stored under `admin_users`, `Person` under `people`.

use heck::ToSnakeCase;

const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("tooth", "teeth"),
    ("foot", "feet"),
];

const UNCOUNTABLE: &[&str] = &["data", "information", "equipment", "series", "species", "news"];

const F_TO_VES: &[&str] = &["leaf", "wolf", "half", "knife", "life", "wife", "shelf", "calf"];

/// Returns the plural form of a lower-case English word.
pub fn pluralize(word: &str) -> String {
    if word.is_empty() || UNCOUNTABLE.contains(&word) {
        return word.to_string();
    }

    if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == word) {
        return plural.to_string();
    }

    if F_TO_VES.contains(&word) {
        let stem = word
            .strip_suffix("fe")
            .or_else(|| word.strip_suffix('f'))
            .unwrap_or(word);
        return format!("{stem}ves");
    }

    if word.ends_with("ch")
        || word.ends_with("sh")
        || word.ends_with('s')
        || word.ends_with('x')
        || word.ends_with('z')
    {
        return format!("{word}es");
    }

    if let Some(stem) = word.strip_suffix('y') {
        if !stem.ends_with(['a', 'e', 'i', 'o', 'u']) && !stem.is_empty() {
            return format!("{stem}ies");
        }
    }

    format!("{word}s")
}

/// Converts a type name into its storage collection name: snake case, with the
/// last word pluralized.
///
/// # Example
///
/// ```
/// use firelayer_core::inflect::tableize;
///
/// assert_eq!(tableize("AdminUser"), "admin_users");
/// ```
pub fn tableize(name: &str) -> String {
    let snake = name.to_snake_case();

    match snake.rsplit_once('_') {
        Some((head, last)) => format!("{head}_{}", pluralize(last)),
        None => pluralize(&snake),
    }
}

/// The default accessor name for a has-many relationship targeting `model_name`.
pub fn plural_accessor(model_name: &str) -> String {
    pluralize(&model_name.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tableizes_type_names() {
        assert_eq!(tableize("User"), "users");
        assert_eq!(tableize("AdminUser"), "admin_users");
        assert_eq!(tableize("I18n_Name"), "i18n_names");
        assert_eq!(tableize("Book"), "books");
        assert_eq!(tableize("Category"), "categories");
    }

    #[test]
    fn pluralizes_common_shapes() {
        assert_eq!(pluralize("box"), "boxes");
        assert_eq!(pluralize("church"), "churches");
        assert_eq!(pluralize("status"), "statuses");
        assert_eq!(pluralize("day"), "days");
        assert_eq!(pluralize("city"), "cities");
        assert_eq!(pluralize("knife"), "knives");
        assert_eq!(pluralize("person"), "people");
        assert_eq!(pluralize("data"), "data");
        assert_eq!(pluralize("tag"), "tags");
    }

    #[test]
    fn plural_accessor_lowercases_first() {
        assert_eq!(plural_accessor("Book"), "books");
        assert_eq!(plural_accessor("Tag"), "tags");
    }
}
