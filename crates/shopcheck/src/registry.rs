//! Template registry.
//!
//! An explicit value mapping (kind, name) to an immutable config. Built once
//! at session setup, mutated only through `&mut`, then lent to
//! [`TemplateManager`](crate::TemplateManager)s for the test flow.
//!
//! Registries can be loaded from YAML documents of the form:
//!
//! ```yaml
//! forms:
//!   newsletter:
//!     template_name: newsletter-form
//!     submit_button: "#subscribe"
//!     fields:
//!       - { name: email, selector: "#susbscribe_email", type: input, required: true }
//! lists: {}
//! modals: {}
//! ```

use crate::config::{
    alert_modal_template, confirmation_modal_template, initial_signup_form_template,
    login_form_template, products_list_template, signup_form_template, AnyTemplateConfig,
    FormTemplateConfig, ListTemplateConfig, ModalTemplateConfig, TemplateKind,
};
use crate::result::{TemplateError, TemplateResult};
use crate::template::{FormTemplate, ListTemplate, ModalTemplate, TemplateContext};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Serialized registry contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryDocument {
    /// Form configs by registry name
    pub forms: BTreeMap<String, FormTemplateConfig>,
    /// List configs by registry name
    pub lists: BTreeMap<String, ListTemplateConfig>,
    /// Modal configs by registry name
    pub modals: BTreeMap<String, ModalTemplateConfig>,
}

impl RegistryDocument {
    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> TemplateResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Validate every config, naming the entry that fails
    pub fn validate(&self) -> TemplateResult<()> {
        fn tag(kind: TemplateKind, name: &str, err: TemplateError) -> TemplateError {
            match err {
                TemplateError::Configuration { message } => {
                    TemplateError::configuration(format!("{kind} '{name}': {message}"))
                }
                other => other,
            }
        }
        for (name, config) in &self.forms {
            config.validate().map_err(|e| tag(TemplateKind::Form, name, e))?;
        }
        for (name, config) in &self.lists {
            config.validate().map_err(|e| tag(TemplateKind::List, name, e))?;
        }
        for (name, config) in &self.modals {
            config.validate().map_err(|e| tag(TemplateKind::Modal, name, e))?;
        }
        Ok(())
    }

    /// Total number of configs
    #[must_use]
    pub fn len(&self) -> usize {
        self.forms.len() + self.lists.len() + self.modals.len()
    }

    /// True when the document holds no configs
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Registry of template configs by kind and name
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    forms: BTreeMap<String, Arc<FormTemplateConfig>>,
    lists: BTreeMap<String, Arc<ListTemplateConfig>>,
    modals: BTreeMap<String, Arc<ModalTemplateConfig>>,
}

impl TemplateRegistry {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the storefront's stock templates: forms `signup`,
    /// `login`, `initial-signup`; list `products`; modals `confirmation`,
    /// `alert`
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for (name, config) in [
            ("signup", signup_form_template()),
            ("login", login_form_template()),
            ("initial-signup", initial_signup_form_template()),
        ] {
            let _ = registry.forms.insert(name.to_string(), Arc::new(config));
        }
        let _ = registry
            .lists
            .insert("products".to_string(), Arc::new(products_list_template()));
        let _ = registry.modals.insert(
            "confirmation".to_string(),
            Arc::new(confirmation_modal_template()),
        );
        let _ = registry
            .modals
            .insert("alert".to_string(), Arc::new(alert_modal_template()));
        registry
    }

    /// Registry loaded from a YAML document
    pub fn from_yaml_str(yaml: &str) -> TemplateResult<Self> {
        let mut registry = Self::new();
        let _ = registry.merge_yaml(yaml)?;
        Ok(registry)
    }

    /// Registry loaded from a YAML file
    pub fn load_file(path: impl AsRef<Path>) -> TemplateResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }

    /// Merge a YAML document, replacing same-named entries.
    ///
    /// Every config is validated before any is inserted. Returns the number
    /// of configs merged.
    pub fn merge_yaml(&mut self, yaml: &str) -> TemplateResult<usize> {
        let document = RegistryDocument::from_yaml_str(yaml)?;
        self.merge(document)
    }

    /// Merge a YAML file
    pub fn merge_file(&mut self, path: impl AsRef<Path>) -> TemplateResult<usize> {
        let text = std::fs::read_to_string(path.as_ref())?;
        self.merge_yaml(&text)
    }

    /// Merge a parsed document (all-or-nothing)
    pub fn merge(&mut self, document: RegistryDocument) -> TemplateResult<usize> {
        document.validate()?;
        let merged = document.len();
        for (name, config) in document.forms {
            let _ = self.forms.insert(name, Arc::new(config));
        }
        for (name, config) in document.lists {
            let _ = self.lists.insert(name, Arc::new(config));
        }
        for (name, config) in document.modals {
            let _ = self.modals.insert(name, Arc::new(config));
        }
        info!(merged, total = self.len(), "merged template document");
        Ok(merged)
    }

    /// Snapshot of the registry contents
    #[must_use]
    pub fn to_document(&self) -> RegistryDocument {
        fn unwrap_all<T: Clone>(map: &BTreeMap<String, Arc<T>>) -> BTreeMap<String, T> {
            map.iter()
                .map(|(k, v)| (k.clone(), v.as_ref().clone()))
                .collect()
        }
        RegistryDocument {
            forms: unwrap_all(&self.forms),
            lists: unwrap_all(&self.lists),
            modals: unwrap_all(&self.modals),
        }
    }

    /// Registry contents as YAML
    pub fn to_yaml(&self) -> TemplateResult<String> {
        Ok(serde_yaml_ng::to_string(&self.to_document())?)
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register (or replace) a form config after validating it
    pub fn register_form_template(
        &mut self,
        name: impl Into<String>,
        config: FormTemplateConfig,
    ) -> TemplateResult<()> {
        config.validate()?;
        let name = name.into();
        debug!(kind = "form", %name, "registering template");
        let _ = self.forms.insert(name, Arc::new(config));
        Ok(())
    }

    /// Register (or replace) a list config after validating it
    pub fn register_list_template(
        &mut self,
        name: impl Into<String>,
        config: ListTemplateConfig,
    ) -> TemplateResult<()> {
        config.validate()?;
        let name = name.into();
        debug!(kind = "list", %name, "registering template");
        let _ = self.lists.insert(name, Arc::new(config));
        Ok(())
    }

    /// Register (or replace) a modal config after validating it
    pub fn register_modal_template(
        &mut self,
        name: impl Into<String>,
        config: ModalTemplateConfig,
    ) -> TemplateResult<()> {
        config.validate()?;
        let name = name.into();
        debug!(kind = "modal", %name, "registering template");
        let _ = self.modals.insert(name, Arc::new(config));
        Ok(())
    }

    /// Remove a config; true if it existed
    pub fn unregister_template(&mut self, kind: TemplateKind, name: &str) -> bool {
        let removed = match kind {
            TemplateKind::Form => self.forms.remove(name).is_some(),
            TemplateKind::List => self.lists.remove(name).is_some(),
            TemplateKind::Modal => self.modals.remove(name).is_some(),
        };
        debug!(%kind, name, removed, "unregistering template");
        removed
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Whether `name` is registered under `kind`
    #[must_use]
    pub fn has_template(&self, kind: TemplateKind, name: &str) -> bool {
        match kind {
            TemplateKind::Form => self.forms.contains_key(name),
            TemplateKind::List => self.lists.contains_key(name),
            TemplateKind::Modal => self.modals.contains_key(name),
        }
    }

    /// Registered names of `kind`, sorted
    #[must_use]
    pub fn available_templates(&self, kind: TemplateKind) -> Vec<&str> {
        match kind {
            TemplateKind::Form => self.forms.keys().map(String::as_str).collect(),
            TemplateKind::List => self.lists.keys().map(String::as_str).collect(),
            TemplateKind::Modal => self.modals.keys().map(String::as_str).collect(),
        }
    }

    /// Registered names of every kind
    #[must_use]
    pub fn all_available_templates(&self) -> BTreeMap<TemplateKind, Vec<&str>> {
        TemplateKind::ALL
            .into_iter()
            .map(|kind| (kind, self.available_templates(kind)))
            .collect()
    }

    /// Total number of registered configs
    #[must_use]
    pub fn len(&self) -> usize {
        self.forms.len() + self.lists.len() + self.modals.len()
    }

    /// True when nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn not_found(&self, kind: TemplateKind, name: &str) -> TemplateError {
        TemplateError::TemplateNotFound {
            kind,
            name: name.to_string(),
            available: self.available_templates(kind).join(", "),
        }
    }

    /// Config registered under (`kind`, `name`)
    pub fn template_config(&self, kind: TemplateKind, name: &str) -> TemplateResult<AnyTemplateConfig> {
        match kind {
            TemplateKind::Form => self.form_config(name).map(AnyTemplateConfig::Form),
            TemplateKind::List => self.list_config(name).map(AnyTemplateConfig::List),
            TemplateKind::Modal => self.modal_config(name).map(AnyTemplateConfig::Modal),
        }
    }

    /// Form config by name
    pub fn form_config(&self, name: &str) -> TemplateResult<Arc<FormTemplateConfig>> {
        self.forms
            .get(name)
            .cloned()
            .ok_or_else(|| self.not_found(TemplateKind::Form, name))
    }

    /// List config by name
    pub fn list_config(&self, name: &str) -> TemplateResult<Arc<ListTemplateConfig>> {
        self.lists
            .get(name)
            .cloned()
            .ok_or_else(|| self.not_found(TemplateKind::List, name))
    }

    /// Modal config by name
    pub fn modal_config(&self, name: &str) -> TemplateResult<Arc<ModalTemplateConfig>> {
        self.modals
            .get(name)
            .cloned()
            .ok_or_else(|| self.not_found(TemplateKind::Modal, name))
    }

    // =========================================================================
    // Instantiation
    // =========================================================================

    /// New form template bound to `ctx`
    pub fn create_form_template(&self, ctx: TemplateContext, name: &str) -> TemplateResult<FormTemplate> {
        FormTemplate::new(ctx, self.form_config(name)?)
    }

    /// New list template bound to `ctx`
    pub fn create_list_template(&self, ctx: TemplateContext, name: &str) -> TemplateResult<ListTemplate> {
        Ok(ListTemplate::new(ctx, self.list_config(name)?))
    }

    /// New modal template bound to `ctx`
    pub fn create_modal_template(
        &self,
        ctx: TemplateContext,
        name: &str,
    ) -> TemplateResult<ModalTemplate> {
        Ok(ModalTemplate::new(ctx, self.modal_config(name)?))
    }
}
