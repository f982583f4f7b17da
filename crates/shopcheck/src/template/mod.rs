//! Runtime templates bound to a page.
//!
//! A template pairs an immutable config with a [`TemplateContext`] (page,
//! settings, evidence). [`BaseTemplate`] owns the shared behaviour; the form,
//! list and modal templates compose it.

mod base;
mod form;
mod list;
mod modal;

pub use base::BaseTemplate;
pub use form::{FormState, FormTemplate, SubmitOutcome};
pub use list::{ListTemplate, LoadMoreOutcome};
pub use modal::{ModalButton, ModalState, ModalTemplate};

use crate::config::TemplateKind;
use crate::driver::PageDriver;
use crate::evidence::EvidenceLayout;
use crate::locator::Locator;
use crate::result::TemplateResult;
use crate::settings::TemplateSettings;
use std::fmt;
use std::sync::Arc;

/// Everything a template needs besides its config
#[derive(Debug, Clone)]
pub struct TemplateContext {
    /// Page the template drives
    pub page: Arc<dyn PageDriver>,
    /// Timeouts and evidence options
    pub settings: Arc<TemplateSettings>,
    /// Where screenshots go
    pub evidence: Arc<EvidenceLayout>,
}

impl TemplateContext {
    /// Context whose evidence root comes from `settings`
    #[must_use]
    pub fn new(page: Arc<dyn PageDriver>, settings: TemplateSettings) -> Self {
        let evidence = Arc::new(EvidenceLayout::new(settings.evidence_root.clone()));
        Self {
            page,
            settings: Arc::new(settings),
            evidence,
        }
    }
}

/// Behaviour common to every template kind
pub trait Template: Send + Sync + fmt::Debug {
    /// Shared template core
    fn base(&self) -> &BaseTemplate;

    /// Template family
    fn kind(&self) -> TemplateKind;

    /// Configured template name
    fn template_name(&self) -> &str {
        self.base().template_name()
    }

    /// Named element from the selector map
    fn element(&self, name: &str) -> TemplateResult<&Locator> {
        self.base().element(name)
    }
}
