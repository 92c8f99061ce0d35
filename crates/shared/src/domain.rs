use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A selectable choice belonging to a radio or checkbox field.
///
/// `value` is never edited directly; it is re-derived from `label` via
/// [`option_value_for_label`] whenever the label changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub id: String,
    pub value: String,
    pub label: String,
}

impl FieldOption {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            id: id.into(),
            value: option_value_for_label(&label),
            label,
        }
    }

    /// Re-derives `value` from the current label. Call after editing `label`.
    pub fn refresh_value(&mut self) {
        self.value = option_value_for_label(&self.label);
    }
}

/// Lowercases the label and collapses every whitespace run into a single
/// hyphen. Matches the historical stored `value` format exactly, including
/// hyphens produced by leading or trailing whitespace.
pub fn option_value_for_label(label: &str) -> String {
    let lower = label.to_lowercase();
    let mut value = String::with_capacity(lower.len());
    let mut in_whitespace = false;
    for ch in lower.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                value.push('-');
                in_whitespace = true;
            }
        } else {
            value.push(ch);
            in_whitespace = false;
        }
    }
    value
}

/// Discriminant of a [`FormField`] variant, used by the builder's
/// field-kind selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Radio,
    Checkbox,
}

impl FieldKind {
    pub const ALL: [FieldKind; 3] = [FieldKind::Text, FieldKind::Radio, FieldKind::Checkbox];

    pub fn label(self) -> &'static str {
        match self {
            FieldKind::Text => "Text Input",
            FieldKind::Radio => "Multiple Choice (Radio)",
            FieldKind::Checkbox => "Checkboxes",
        }
    }
}

/// One question unit within a form.
///
/// Serialized with a lowercase `"type"` tag (`text` / `radio` / `checkbox`)
/// and an optional `required` flag so blobs written by older sessions still
/// deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormField {
    Text {
        id: String,
        label: String,
        #[serde(default)]
        required: bool,
    },
    Radio {
        id: String,
        label: String,
        #[serde(default)]
        required: bool,
        options: Vec<FieldOption>,
    },
    Checkbox {
        id: String,
        label: String,
        #[serde(default)]
        required: bool,
        options: Vec<FieldOption>,
    },
}

impl FormField {
    pub fn id(&self) -> &str {
        match self {
            FormField::Text { id, .. }
            | FormField::Radio { id, .. }
            | FormField::Checkbox { id, .. } => id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            FormField::Text { label, .. }
            | FormField::Radio { label, .. }
            | FormField::Checkbox { label, .. } => label,
        }
    }

    pub fn label_mut(&mut self) -> &mut String {
        match self {
            FormField::Text { label, .. }
            | FormField::Radio { label, .. }
            | FormField::Checkbox { label, .. } => label,
        }
    }

    pub fn required(&self) -> bool {
        match self {
            FormField::Text { required, .. }
            | FormField::Radio { required, .. }
            | FormField::Checkbox { required, .. } => *required,
        }
    }

    pub fn required_mut(&mut self) -> &mut bool {
        match self {
            FormField::Text { required, .. }
            | FormField::Radio { required, .. }
            | FormField::Checkbox { required, .. } => required,
        }
    }

    /// Options of a choice field; `None` for text fields.
    pub fn options(&self) -> Option<&[FieldOption]> {
        match self {
            FormField::Text { .. } => None,
            FormField::Radio { options, .. } | FormField::Checkbox { options, .. } => {
                Some(options)
            }
        }
    }

    pub fn options_mut(&mut self) -> Option<&mut Vec<FieldOption>> {
        match self {
            FormField::Text { .. } => None,
            FormField::Radio { options, .. } | FormField::Checkbox { options, .. } => {
                Some(options)
            }
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FormField::Text { .. } => FieldKind::Text,
            FormField::Radio { .. } => FieldKind::Radio,
            FormField::Checkbox { .. } => FieldKind::Checkbox,
        }
    }
}

/// A named, ordered collection of fields designed by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Form {
    pub id: String,
    pub title: String,
    pub fields: Vec<FormField>,
}

impl Form {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            fields: Vec::new(),
        }
    }

    /// Title with the placeholder used anywhere a form is named to the user.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "Untitled Form"
        } else {
            &self.title
        }
    }
}

/// One submitted answer: a single string for text/radio fields, a list of
/// selected option values for checkbox groups. Untagged so the stored JSON
/// stays a plain string or string array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Single(String),
    Many(Vec<String>),
}

impl AnswerValue {
    /// Whether this answer counts as absent for presence validation.
    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::Single(value) => value.is_empty(),
            AnswerValue::Many(values) => values.is_empty(),
        }
    }
}

/// Answers keyed by field id.
pub type AnswerMap = BTreeMap<String, AnswerValue>;

/// One user's submitted answers to a specific form. Created once at
/// submission time and immutable thereafter. `form_id` is a foreign key
/// into the forms collection with no referential-integrity guarantee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormResponse {
    pub id: String,
    pub form_id: String,
    /// Unix timestamp in milliseconds.
    pub submitted_at: i64,
    pub responses: AnswerMap,
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
