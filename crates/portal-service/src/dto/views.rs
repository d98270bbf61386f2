//! View models for the admin pages

use serde::Serialize;

use super::FormErrors;

/// A rendered admin change list
#[derive(Debug, Clone, Serialize)]
pub struct AdminTable {
    pub title: &'static str,
    pub columns: Vec<&'static str>,
    pub rows: Vec<AdminTableRow>,
    /// Set when rows link to a change page
    pub editable: bool,
    /// Set when the page offers an "add" link
    pub addable: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminTableRow {
    pub id: String,
    pub cells: Vec<String>,
}

/// One titled group of inputs on an admin form
#[derive(Debug, Clone, Serialize)]
pub struct FormSection {
    pub title: Option<&'static str>,
    pub fields: Vec<FormField>,
}

/// One input on an admin form
#[derive(Debug, Clone, Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub label: String,
    pub input_type: &'static str,
    pub value: String,
    pub checked: bool,
    pub errors: Vec<String>,
}

impl FormField {
    /// Build an input for `name`, taking its value from a serialized form
    #[must_use]
    pub fn new(name: &'static str, values: &serde_json::Value, errors: &FormErrors) -> Self {
        let input_type = match name {
            "password" => "password",
            "email" => "email",
            n if n.starts_with("is_") => "checkbox",
            _ => "text",
        };
        let raw = values.get(name);
        Self {
            name,
            label: label_for(name),
            input_type,
            value: raw
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_string(),
            checked: raw.and_then(serde_json::Value::as_bool).unwrap_or(false),
            errors: errors.get(name).to_vec(),
        }
    }
}

/// `first_name` -> `First name`
fn label_for(name: &str) -> String {
    let words = name.replace('_', " ");
    let mut chars = words.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_from_values() {
        let values = json!({"email": "a@b.com", "is_staff": true});
        let errors = FormErrors::single("email", "Enter a valid email address.");

        let email = FormField::new("email", &values, &errors);
        assert_eq!(email.input_type, "email");
        assert_eq!(email.value, "a@b.com");
        assert_eq!(email.errors, ["Enter a valid email address."]);

        let staff = FormField::new("is_staff", &values, &FormErrors::new());
        assert_eq!(staff.input_type, "checkbox");
        assert!(staff.checked);
        assert_eq!(staff.label, "Is staff");
    }
}
