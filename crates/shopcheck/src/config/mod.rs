//! Template configuration.
//!
//! Plain serde data describing a UI pattern. Configs are validated once, on
//! registration, and are immutable afterwards (shared as `Arc`).

mod action;
mod form;
mod list;
mod modal;

pub use action::{expand_args, ActionSpec, ActionStep, ValidationSpec, ValidationStep};
pub use form::{
    initial_signup_form_template, login_form_template, signup_form_template, FieldKind,
    FieldValue, FormData, FormField, FormTemplateConfig,
};
pub use list::{products_list_template, ListTemplateConfig};
pub use modal::{alert_modal_template, confirmation_modal_template, ModalTemplateConfig};

use crate::result::{TemplateError, TemplateResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Template family
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    /// Data-entry forms
    Form,
    /// Item collections
    List,
    /// Transient overlays
    Modal,
}

impl TemplateKind {
    /// All kinds, in registry order
    pub const ALL: [Self; 3] = [Self::Form, Self::List, Self::Modal];

    /// Lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Form => "form",
            Self::List => "list",
            Self::Modal => "modal",
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateKind {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "form" => Ok(Self::Form),
            "list" => Ok(Self::List),
            "modal" => Ok(Self::Modal),
            other => Err(TemplateError::configuration(format!(
                "unknown template kind '{other}' (expected form, list or modal)"
            ))),
        }
    }
}

/// Settings shared by every template kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Template name, used in logs and screenshot names
    pub template_name: String,
    /// Named element selectors
    #[serde(default)]
    pub selectors: BTreeMap<String, String>,
    /// Named actions
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub actions: BTreeMap<String, ActionSpec>,
    /// Named validations
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub validations: BTreeMap<String, ValidationSpec>,
}

impl TemplateConfig {
    /// Create a config with a name and no selectors
    #[must_use]
    pub fn new(template_name: impl Into<String>) -> Self {
        Self {
            template_name: template_name.into(),
            ..Self::default()
        }
    }

    /// Add a named selector
    #[must_use]
    pub fn with_selector(mut self, name: impl Into<String>, selector: impl Into<String>) -> Self {
        let _ = self.selectors.insert(name.into(), selector.into());
        self
    }

    /// Add a named action
    #[must_use]
    pub fn with_action(mut self, name: impl Into<String>, steps: Vec<ActionStep>) -> Self {
        let _ = self.actions.insert(name.into(), ActionSpec::new(steps));
        self
    }

    /// Add a named validation
    #[must_use]
    pub fn with_validation(mut self, name: impl Into<String>, steps: Vec<ValidationStep>) -> Self {
        let _ = self
            .validations
            .insert(name.into(), ValidationSpec::new(steps));
        self
    }

    /// Check names and cross references.
    ///
    /// Every element an action or validation touches must be a key of
    /// `selectors`; placeholders must be well formed.
    pub fn validate(&self) -> TemplateResult<()> {
        if self.template_name.trim().is_empty() {
            return Err(TemplateError::configuration("template_name must not be empty"));
        }
        if let Some((name, _)) = self.selectors.iter().find(|(_, s)| s.trim().is_empty()) {
            return Err(TemplateError::configuration(format!(
                "selector '{name}' in template '{}' is empty",
                self.template_name
            )));
        }

        let actions = self
            .actions
            .iter()
            .flat_map(|(n, spec)| action::action_references(spec).map(move |r| ("action", n, r)));
        let validations = self.validations.iter().flat_map(|(n, spec)| {
            action::validation_references(spec).map(move |r| ("validation", n, r))
        });

        for (what, name, (element, templated)) in actions.chain(validations) {
            if let Some(element) = element {
                if !self.selectors.contains_key(element) {
                    return Err(TemplateError::configuration(format!(
                        "{what} '{name}' in template '{}' references unknown element '{element}'",
                        self.template_name
                    )));
                }
            }
            if let Some(text) = templated {
                // argument count is only known at run time
                if action::max_placeholder(text).is_some_and(|i| i > 64) {
                    return Err(TemplateError::configuration(format!(
                        "{what} '{name}' in template '{}' uses placeholder beyond {{64}}",
                        self.template_name
                    )));
                }
            }
        }
        Ok(())
    }
}

/// A registered config of any kind
#[derive(Debug, Clone, PartialEq)]
pub enum AnyTemplateConfig {
    /// Form config
    Form(Arc<FormTemplateConfig>),
    /// List config
    List(Arc<ListTemplateConfig>),
    /// Modal config
    Modal(Arc<ModalTemplateConfig>),
}

impl AnyTemplateConfig {
    /// Kind of the wrapped config
    #[must_use]
    pub const fn kind(&self) -> TemplateKind {
        match self {
            Self::Form(_) => TemplateKind::Form,
            Self::List(_) => TemplateKind::List,
            Self::Modal(_) => TemplateKind::Modal,
        }
    }

    /// Shared part of the wrapped config
    #[must_use]
    pub fn base(&self) -> &TemplateConfig {
        match self {
            Self::Form(c) => &c.base,
            Self::List(c) => &c.base,
            Self::Modal(c) => &c.base,
        }
    }

    /// Serialize the wrapped config as YAML
    pub fn to_yaml(&self) -> TemplateResult<String> {
        Ok(match self {
            Self::Form(c) => serde_yaml_ng::to_string(c.as_ref())?,
            Self::List(c) => serde_yaml_ng::to_string(c.as_ref())?,
            Self::Modal(c) => serde_yaml_ng::to_string(c.as_ref())?,
        })
    }

    /// Serialize the wrapped config as pretty JSON
    pub fn to_json(&self) -> TemplateResult<String> {
        Ok(match self {
            Self::Form(c) => serde_json::to_string_pretty(c.as_ref())?,
            Self::List(c) => serde_json::to_string_pretty(c.as_ref())?,
            Self::Modal(c) => serde_json::to_string_pretty(c.as_ref())?,
        })
    }
}
