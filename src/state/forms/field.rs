//! Form field value objects

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FormError;

/// Type-safe field values
///
/// Serialized untagged so panel data and rule match values read naturally
/// in JSON (`"static"`, `1`, `true`, `["eth1", "eth2"]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(i64),
    Text(String),
    List(Vec<String>),
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

impl FieldValue {
    /// Get the text value (returns empty string for non-text values)
    pub fn as_text(&self) -> &str {
        match self {
            FieldValue::Text(s) => s,
            _ => "",
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Only `Bool(true)` counts as checked.
    pub fn is_true(&self) -> bool {
        matches!(self, FieldValue::Bool(true))
    }

    pub fn as_list(&self) -> &[String] {
        match self {
            FieldValue::List(items) => items,
            _ => &[],
        }
    }

    /// Empty text and empty lists are blank; numbers and flags never are.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::List(items) => items.is_empty(),
            FieldValue::Bool(_) | FieldValue::Number(_) => false,
        }
    }

    /// The empty value of the same variant.
    pub fn cleared(&self) -> FieldValue {
        match self {
            FieldValue::Bool(_) => FieldValue::Bool(false),
            FieldValue::Number(_) => FieldValue::Number(0),
            FieldValue::Text(_) => FieldValue::Text(String::new()),
            FieldValue::List(_) => FieldValue::List(Vec::new()),
        }
    }

    /// Value after typing a character into the field
    pub fn pushed(&self, c: char) -> FieldValue {
        match self {
            FieldValue::Text(s) => {
                let mut s = s.clone();
                s.push(c);
                FieldValue::Text(s)
            }
            FieldValue::Number(n) => match c.to_digit(10) {
                Some(d) => FieldValue::Number(n.saturating_mul(10).saturating_add(d as i64)),
                None => self.clone(),
            },
            _ => self.clone(),
        }
    }

    /// Value after removing the last character
    pub fn popped(&self) -> FieldValue {
        match self {
            FieldValue::Text(s) => {
                let mut s = s.clone();
                s.pop();
                FieldValue::Text(s)
            }
            FieldValue::Number(n) => FieldValue::Number(n / 10),
            _ => self.clone(),
        }
    }

    /// Value with `item` added to or removed from a list
    pub fn toggled_item(&self, item: &str) -> FieldValue {
        let mut items = self.as_list().to_vec();
        if let Some(pos) = items.iter().position(|i| i == item) {
            items.remove(pos);
        } else {
            items.push(item.to_string());
        }
        FieldValue::List(items)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{}", if *b { "yes" } else { "no" }),
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Text(s) => write!(f, "{s}"),
            FieldValue::List(items) => write!(f, "{}", items.join(", ")),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(value as i64)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}

impl From<&[&str]> for FieldValue {
    fn from(value: &[&str]) -> Self {
        FieldValue::List(value.iter().map(|s| s.to_string()).collect())
    }
}

/// A constraint property a correlation rule can override
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Property {
    #[serde(rename = "allowBlank")]
    AllowBlank,
    #[serde(rename = "readOnly")]
    ReadOnly,
}

impl Property {
    pub fn as_str(&self) -> &'static str {
        match self {
            Property::AllowBlank => "allowBlank",
            Property::ReadOnly => "readOnly",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Property {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "allowBlank" => Ok(Property::AllowBlank),
            "readOnly" => Ok(Property::ReadOnly),
            other => Err(FormError::UnknownProperty(other.to_string())),
        }
    }
}

/// Required/editable state of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraints {
    pub allow_blank: bool,
    pub read_only: bool,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            allow_blank: true,
            read_only: false,
        }
    }
}

impl Constraints {
    pub fn get(&self, property: Property) -> bool {
        match property {
            Property::AllowBlank => self.allow_blank,
            Property::ReadOnly => self.read_only,
        }
    }

    /// Returns true if the property changed
    pub fn set(&mut self, property: Property, value: bool) -> bool {
        let slot = match property {
            Property::AllowBlank => &mut self.allow_blank,
            Property::ReadOnly => &mut self.read_only,
        };
        let changed = *slot != value;
        *slot = value;
        changed
    }

    pub fn is_required(&self) -> bool {
        !self.allow_blank
    }
}

/// One selectable entry of a select or multi-select field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: FieldValue,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// Option whose label is its value, e.g. a device name
    pub fn named(name: &str) -> Self {
        Self::new(name, name)
    }
}

/// How a field is edited and rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Password,
    Number,
    Checkbox,
    Select,
    MultiSelect,
}

/// Represents a single form field with its configuration and value
#[derive(Debug, Clone)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    /// Value restored by a reset
    pub default: FieldValue,
    pub value: FieldValue,
    /// Constraints as authored; never changes after construction
    pub baseline: Constraints,
    pub(crate) effective: Constraints,
    pub(crate) committed: FieldValue,
    pub options: Vec<SelectOption>,
    /// Help text shown under the field
    pub info: Option<String>,
    pub(crate) violation: Option<String>,
}

impl FormField {
    fn new(name: &str, label: &str, kind: FieldKind, default: FieldValue) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            value: default.clone(),
            committed: default.clone(),
            default,
            baseline: Constraints::default(),
            effective: Constraints::default(),
            options: Vec::new(),
            info: None,
            violation: None,
        }
    }

    /// Create a new text field
    pub fn text(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Text, FieldValue::default())
    }

    /// Create a new password field
    pub fn password(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Password, FieldValue::default())
    }

    /// Create a new number field
    pub fn number(name: &str, label: &str, default: i64) -> Self {
        Self::new(name, label, FieldKind::Number, FieldValue::Number(default))
    }

    /// Create a new checkbox
    pub fn checkbox(name: &str, label: &str, checked: bool) -> Self {
        Self::new(name, label, FieldKind::Checkbox, FieldValue::Bool(checked))
    }

    /// Create a new single-choice field
    pub fn select(
        name: &str,
        label: &str,
        options: Vec<SelectOption>,
        default: impl Into<FieldValue>,
    ) -> Self {
        let mut field = Self::new(name, label, FieldKind::Select, default.into());
        field.options = options;
        field
    }

    /// Create a new multiple-choice field
    pub fn multi_select(name: &str, label: &str, options: Vec<SelectOption>) -> Self {
        let mut field = Self::new(name, label, FieldKind::MultiSelect, FieldValue::List(Vec::new()));
        field.options = options;
        field
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.baseline.read_only = read_only;
        self.effective = self.baseline;
        self
    }

    pub fn allow_blank(mut self, allow_blank: bool) -> Self {
        self.baseline.allow_blank = allow_blank;
        self.effective = self.baseline;
        self
    }

    /// Shorthand for `allow_blank(false)`
    pub fn required(self) -> Self {
        self.allow_blank(false)
    }

    pub fn with_default(mut self, value: impl Into<FieldValue>) -> Self {
        let value = value.into();
        self.value = value.clone();
        self.committed = value.clone();
        self.default = value;
        self
    }

    pub fn with_info(mut self, info: &str) -> Self {
        self.info = Some(info.to_string());
        self
    }

    /// Currently applied constraints
    pub fn effective(&self) -> Constraints {
        self.effective
    }

    /// Differs from the last committed value
    pub fn is_dirty(&self) -> bool {
        self.value != self.committed
    }

    pub fn violation(&self) -> Option<&str> {
        self.violation.as_deref()
    }

    /// Label of the option matching the current value, if any
    pub fn selected_label(&self) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.value == self.value)
            .map(|o| o.label.as_str())
    }

    /// Get the display value for rendering
    pub fn display_value(&self) -> String {
        match self.kind {
            FieldKind::Password => "*".repeat(self.value.as_text().chars().count()),
            FieldKind::Select => self
                .selected_label()
                .map(str::to_string)
                .unwrap_or_else(|| self.value.to_string()),
            FieldKind::Checkbox => {
                if self.value.is_true() {
                    "[x]".to_string()
                } else {
                    "[ ]".to_string()
                }
            }
            _ => self.value.to_string(),
        }
    }
}
