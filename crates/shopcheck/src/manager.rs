//! Per-flow cache of instantiated templates.
//!
//! A manager borrows a [`TemplateRegistry`] for the duration of a test flow,
//! so configs cannot change underneath templates it has handed out.

use crate::config::TemplateKind;
use crate::registry::TemplateRegistry;
use crate::result::TemplateResult;
use crate::template::{FormTemplate, ListTemplate, ModalTemplate, Template, TemplateContext};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// A cached template of any kind
#[derive(Debug, Clone)]
pub enum ActiveTemplate {
    /// Form template
    Form(Arc<FormTemplate>),
    /// List template
    List(Arc<ListTemplate>),
    /// Modal template
    Modal(Arc<ModalTemplate>),
}

impl ActiveTemplate {
    /// The template behind the handle
    #[must_use]
    pub fn as_template(&self) -> &dyn Template {
        match self {
            Self::Form(t) => t.as_ref(),
            Self::List(t) => t.as_ref(),
            Self::Modal(t) => t.as_ref(),
        }
    }

    /// Template family
    #[must_use]
    pub fn kind(&self) -> TemplateKind {
        self.as_template().kind()
    }
}

fn cache_key(kind: TemplateKind, name: &str) -> String {
    format!("{kind}-{name}")
}

/// Memoizes templates by `"{kind}-{name}"` for one page
#[derive(Debug)]
pub struct TemplateManager<'r> {
    registry: &'r TemplateRegistry,
    ctx: TemplateContext,
    active: HashMap<String, ActiveTemplate>,
}

impl<'r> TemplateManager<'r> {
    /// Empty manager over `registry`
    #[must_use]
    pub fn new(registry: &'r TemplateRegistry, ctx: TemplateContext) -> Self {
        Self {
            registry,
            ctx,
            active: HashMap::new(),
        }
    }

    /// Registry this manager resolves names against
    #[must_use]
    pub const fn registry(&self) -> &'r TemplateRegistry {
        self.registry
    }

    /// Context handed to new templates
    #[must_use]
    pub const fn context(&self) -> &TemplateContext {
        &self.ctx
    }

    /// Form template `name`, created on first use
    pub fn get_form_template(&mut self, name: &str) -> TemplateResult<Arc<FormTemplate>> {
        let key = cache_key(TemplateKind::Form, name);
        if let Some(ActiveTemplate::Form(template)) = self.active.get(&key) {
            return Ok(Arc::clone(template));
        }
        let template = Arc::new(self.registry.create_form_template(self.ctx.clone(), name)?);
        debug!(%key, "caching template");
        let _ = self.active.insert(key, ActiveTemplate::Form(Arc::clone(&template)));
        Ok(template)
    }

    /// List template `name`, created on first use
    pub fn get_list_template(&mut self, name: &str) -> TemplateResult<Arc<ListTemplate>> {
        let key = cache_key(TemplateKind::List, name);
        if let Some(ActiveTemplate::List(template)) = self.active.get(&key) {
            return Ok(Arc::clone(template));
        }
        let template = Arc::new(self.registry.create_list_template(self.ctx.clone(), name)?);
        debug!(%key, "caching template");
        let _ = self.active.insert(key, ActiveTemplate::List(Arc::clone(&template)));
        Ok(template)
    }

    /// Modal template `name`, created on first use
    pub fn get_modal_template(&mut self, name: &str) -> TemplateResult<Arc<ModalTemplate>> {
        let key = cache_key(TemplateKind::Modal, name);
        if let Some(ActiveTemplate::Modal(template)) = self.active.get(&key) {
            return Ok(Arc::clone(template));
        }
        let template = Arc::new(self.registry.create_modal_template(self.ctx.clone(), name)?);
        debug!(%key, "caching template");
        let _ = self.active.insert(key, ActiveTemplate::Modal(Arc::clone(&template)));
        Ok(template)
    }

    /// Cached template under `key`, if any
    #[must_use]
    pub fn active_template(&self, key: &str) -> Option<&ActiveTemplate> {
        self.active.get(key)
    }

    /// Drop every cached template
    pub fn clear_all_templates(&mut self) {
        debug!(count = self.active.len(), "clearing cached templates");
        self.active.clear();
    }

    /// Number of cached templates
    #[must_use]
    pub fn active_template_count(&self) -> usize {
        self.active.len()
    }

    /// Cache keys, sorted
    #[must_use]
    pub fn active_template_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.active.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}
