//! Form template configuration and caller-supplied form data.

use super::TemplateConfig;
use crate::result::{TemplateError, TemplateResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Input widget type of a form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Single-line text input
    Input,
    /// `<select>` dropdown
    Select,
    /// Checkbox toggled by truthiness
    Checkbox,
    /// Radio group; the value picks the option
    Radio,
    /// Multi-line text input
    Textarea,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Input => "input",
            Self::Select => "select",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Textarea => "textarea",
        };
        f.write_str(name)
    }
}

/// One declared form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    /// Key into the form data
    pub name: String,
    /// CSS selector of the input
    pub selector: String,
    /// Widget type
    #[serde(rename = "type")]
    pub kind: FieldKind,
    /// Whether fill must receive a value
    #[serde(default)]
    pub required: bool,
    /// Regex the text value must match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<String>,
}

impl FormField {
    /// Optional field
    #[must_use]
    pub fn new(name: impl Into<String>, selector: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            selector: selector.into(),
            kind,
            required: false,
            validation: None,
        }
    }

    /// Mark the field as required
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Attach a validation pattern
    #[must_use]
    pub fn with_validation(mut self, pattern: impl Into<String>) -> Self {
        self.validation = Some(pattern.into());
        self
    }

    /// Compiled validation pattern, if any
    pub fn pattern(&self) -> TemplateResult<Option<Regex>> {
        self.validation
            .as_deref()
            .map(|p| {
                Regex::new(p).map_err(|e| {
                    TemplateError::configuration(format!(
                        "invalid validation pattern for field '{}': {e}",
                        self.name
                    ))
                })
            })
            .transpose()
    }
}

/// Form template configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormTemplateConfig {
    /// Shared template settings
    #[serde(flatten)]
    pub base: TemplateConfig,
    /// Fields in fill order
    pub fields: Vec<FormField>,
    /// Submit control
    pub submit_button: String,
    /// Reset control
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_button: Option<String>,
    /// Shown after a rejected submit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_container: Option<String>,
    /// Shown after an accepted submit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_container: Option<String>,
}

impl FormTemplateConfig {
    /// Form with no fields
    #[must_use]
    pub fn new(base: TemplateConfig, submit_button: impl Into<String>) -> Self {
        Self {
            base,
            fields: Vec::new(),
            submit_button: submit_button.into(),
            reset_button: None,
            error_container: None,
            success_container: None,
        }
    }

    /// Append a field
    #[must_use]
    pub fn with_field(mut self, field: FormField) -> Self {
        self.fields.push(field);
        self
    }

    /// Set the reset control
    #[must_use]
    pub fn with_reset_button(mut self, selector: impl Into<String>) -> Self {
        self.reset_button = Some(selector.into());
        self
    }

    /// Set the error container
    #[must_use]
    pub fn with_error_container(mut self, selector: impl Into<String>) -> Self {
        self.error_container = Some(selector.into());
        self
    }

    /// Set the success container
    #[must_use]
    pub fn with_success_container(mut self, selector: impl Into<String>) -> Self {
        self.success_container = Some(selector.into());
        self
    }

    /// Validate shared settings, field names and patterns
    pub fn validate(&self) -> TemplateResult<()> {
        self.base.validate()?;
        if self.submit_button.trim().is_empty() {
            return Err(TemplateError::configuration(format!(
                "form '{}' has an empty submit_button",
                self.base.template_name
            )));
        }
        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(TemplateError::configuration(format!(
                    "duplicate field '{}' in form '{}'",
                    field.name, self.base.template_name
                )));
            }
            if field.selector.trim().is_empty() {
                return Err(TemplateError::configuration(format!(
                    "field '{}' in form '{}' has an empty selector",
                    field.name, self.base.template_name
                )));
            }
            let _ = field.pattern()?;
        }
        Ok(())
    }
}

/// Full account-creation form
#[must_use]
pub fn signup_form_template() -> FormTemplateConfig {
    use FieldKind::{Input, Select};

    let base = TemplateConfig::new("signup-form")
        .with_selector("form", "form[action=\"/signup\"]")
        .with_selector("submitButton", "[data-qa=\"create-account\"]")
        .with_selector("successMessage", "[data-qa=\"account-created\"]")
        .with_selector("errorMessage", ".alert-danger, .error-message");

    let fields = [
        ("name", "[data-qa=\"signup-name\"]", Input, true),
        ("email", "[data-qa=\"signup-email\"]", Input, true),
        ("password", "[data-qa=\"password\"]", Input, true),
        ("confirmPassword", "[data-qa=\"confirm-password\"]", Input, false),
        ("firstName", "[data-qa=\"first_name\"]", Input, false),
        ("lastName", "[data-qa=\"last_name\"]", Input, false),
        ("company", "[data-qa=\"company\"]", Input, false),
        ("address", "[data-qa=\"address\"]", Input, false),
        ("country", "[data-qa=\"country\"]", Select, false),
        ("state", "[data-qa=\"state\"]", Input, false),
        ("city", "[data-qa=\"city\"]", Input, false),
        ("zipcode", "[data-qa=\"zipcode\"]", Input, false),
        ("mobile", "[data-qa=\"mobile_number\"]", Input, false),
    ];

    let mut config = FormTemplateConfig::new(base, "[data-qa=\"create-account\"]")
        .with_success_container("[data-qa=\"account-created\"]")
        .with_error_container(".alert-danger, .error-message");
    for (name, selector, kind, required) in fields {
        let field = FormField::new(name, selector, kind);
        config.fields.push(if required { field.required() } else { field });
    }
    config
}

/// Login form
#[must_use]
pub fn login_form_template() -> FormTemplateConfig {
    let base = TemplateConfig::new("login-form")
        .with_selector("form", "form[action=\"/login\"]")
        .with_selector("submitButton", "[data-qa=\"login-button\"]")
        .with_selector("successMessage", ".navbar-nav")
        .with_selector("errorMessage", ".login-form p");

    FormTemplateConfig::new(base, "[data-qa=\"login-button\"]")
        .with_field(FormField::new("email", "[data-qa=\"login-email\"]", FieldKind::Input).required())
        .with_field(
            FormField::new("password", "[data-qa=\"login-password\"]", FieldKind::Input).required(),
        )
        .with_success_container(".navbar-nav")
        .with_error_container(".login-form p")
}

/// Name + email step that precedes account creation
#[must_use]
pub fn initial_signup_form_template() -> FormTemplateConfig {
    let base = TemplateConfig::new("initial-signup-form")
        .with_selector("form", "form[action=\"/signup\"]")
        .with_selector("submitButton", "[data-qa=\"signup-button\"]")
        .with_selector("successMessage", "[data-qa=\"account-created\"]")
        .with_selector("errorMessage", ".signup-form p");

    FormTemplateConfig::new(base, "[data-qa=\"signup-button\"]")
        .with_field(FormField::new("name", "[data-qa=\"signup-name\"]", FieldKind::Input).required())
        .with_field(FormField::new("email", "[data-qa=\"signup-email\"]", FieldKind::Input).required())
        .with_success_container("[data-qa=\"account-created\"]")
        .with_error_container(".signup-form p")
}

/// One value of caller-supplied form data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Boolean, for checkboxes
    Flag(bool),
    /// Number, entered as its decimal text (zip codes, phone numbers)
    Number(serde_json::Number),
    /// Text, for everything else
    Text(String),
}

impl FieldValue {
    /// False for empty text; flags are always present
    #[must_use]
    pub fn is_present(&self) -> bool {
        match self {
            Self::Flag(_) | Self::Number(_) => true,
            Self::Text(text) => !text.is_empty(),
        }
    }

    /// Text form of the value
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            Self::Flag(flag) => flag.to_string(),
            Self::Number(number) => number.to_string(),
            Self::Text(text) => text.clone(),
        }
    }

    /// Checkbox interpretation: non-zero numbers and text other than "",
    /// "false", "0", "off", "no" are true
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Flag(flag) => *flag,
            Self::Number(number) => number.as_f64().is_some_and(|n| n.abs() > 0.0),
            Self::Text(text) => !matches!(
                text.trim().to_ascii_lowercase().as_str(),
                "" | "false" | "0" | "off" | "no"
            ),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(flag) => write!(f, "{flag}"),
            Self::Number(number) => write!(f, "{number}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

/// Form data keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData {
    values: BTreeMap<String, FieldValue>,
}

impl FormData {
    /// Empty data
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// Add or replace a value
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        let _ = self.values.insert(field.into(), value.into());
    }

    /// Value for `field`, if any
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Value for `field` unless missing or empty text
    #[must_use]
    pub fn present(&self, field: &str) -> Option<&FieldValue> {
        self.get(field).filter(|v| v.is_present())
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod field_value_tests {
        use super::*;

        #[test]
        fn test_presence() {
            assert!(!FieldValue::from("").is_present());
            assert!(FieldValue::from("x").is_present());
            assert!(FieldValue::from(false).is_present());
        }

        #[test]
        fn test_truthiness() {
            for falsy in ["", "false", "0", "off", "no", " FALSE "] {
                assert!(!FieldValue::from(falsy).is_truthy(), "{falsy:?}");
            }
            assert!(FieldValue::from("yes").is_truthy());
            assert!(FieldValue::from(true).is_truthy());
        }

        #[test]
        fn test_numbers_become_text() {
            let data: FormData =
                serde_json::from_str(r#"{"zipcode": 12345, "newsletter": true, "city": "Austin"}"#)
                    .unwrap();
            assert_eq!(data.get("zipcode"), Some(&FieldValue::from(12345_u64)));
            assert_eq!(data.get("zipcode").unwrap().as_text(), "12345");
            assert_eq!(data.get("newsletter"), Some(&FieldValue::Flag(true)));
            assert_eq!(data.get("city"), Some(&FieldValue::from("Austin")));

            let yaml: FormData = serde_yaml_ng::from_str("mobile: 5551234
surcharge: -2
").unwrap();
            assert_eq!(yaml.present("mobile").unwrap().to_string(), "5551234");
            assert_eq!(yaml.get("surcharge").unwrap().as_text(), "-2");
            assert!(FieldValue::from(1_i64).is_truthy());
            assert!(!FieldValue::from(0_i64).is_truthy());
        }

        #[test]
        fn test_form_data_present() {
            let data = FormData::new().with("email", "a@b.com").with("password", "");
            assert!(data.present("email").is_some());
            assert!(data.present("password").is_none());
            assert!(data.present("name").is_none());
            assert_eq!(data.len(), 2);
        }

        #[test]
        fn test_form_data_yaml_untagged() {
            let data: FormData =
                serde_yaml_ng::from_str("newsletter: true\nname: Ada\nzipcode: '0042'\n").unwrap();
            assert_eq!(data.get("newsletter"), Some(&FieldValue::Flag(true)));
            assert_eq!(data.get("zipcode"), Some(&FieldValue::from("0042")));
        }
    }

    mod config_tests {
        use super::*;

        #[test]
        fn test_builtins_validate() {
            signup_form_template().validate().unwrap();
            login_form_template().validate().unwrap();
            initial_signup_form_template().validate().unwrap();
        }

        #[test]
        fn test_signup_field_order() {
            let config = signup_form_template();
            let names: Vec<&str> = config.fields.iter().map(|f| f.name.as_str()).collect();
            assert_eq!(names.first(), Some(&"name"));
            assert_eq!(names.last(), Some(&"mobile"));
            assert_eq!(config.fields.iter().filter(|f| f.required).count(), 3);
        }

        #[test]
        fn test_duplicate_field_rejected() {
            let config = login_form_template()
                .with_field(FormField::new("email", "#other", FieldKind::Input));
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("duplicate field 'email'"));
        }

        #[test]
        fn test_bad_pattern_rejected() {
            let config = login_form_template()
                .with_field(FormField::new("code", "#code", FieldKind::Input).with_validation("(["));
            assert!(config.validate().unwrap_err().is_configuration());
        }

        #[test]
        fn test_unknown_field_type_rejected() {
            let yaml = r##"
template_name: t
submit_button: "#go"
fields:
  - name: when
    selector: "#when"
    type: datepicker
"##;
            assert!(serde_yaml_ng::from_str::<FormTemplateConfig>(yaml).is_err());
        }

        #[test]
        fn test_yaml_defaults() {
            let yaml = r##"
template_name: newsletter
submit_button: "#subscribe"
fields:
  - name: email
    selector: "#susbscribe_email"
    type: input
    required: true
    validation: "^[^@]+@[^@]+$"
"##;
            let config: FormTemplateConfig = serde_yaml_ng::from_str(yaml).unwrap();
            assert!(config.base.selectors.is_empty());
            assert!(config.reset_button.is_none());
            assert!(config.fields[0].pattern().unwrap().is_some());
            config.validate().unwrap();
        }
    }
}
