//! Session fixture.
//!
//! Bundles the page, settings, evidence layout and registry a test session
//! needs. Registration happens through [`TemplateSession::registry_mut`]
//! before the flow starts; [`TemplateSession::manager`] then borrows the
//! registry immutably for the rest of the flow.

use crate::driver::PageDriver;
use crate::evidence::EvidenceLayout;
use crate::manager::TemplateManager;
use crate::registry::TemplateRegistry;
use crate::result::TemplateResult;
use crate::settings::TemplateSettings;
use crate::template::TemplateContext;
use std::sync::Arc;
use tracing::info;

/// Something with setup and teardown around a test session.
pub trait Fixture: Send + Sync {
    /// Prepare resources before the session.
    ///
    /// # Errors
    ///
    /// Returns an error if preparation fails.
    fn setup(&mut self) -> TemplateResult<()>;

    /// Release or tidy resources after the session.
    ///
    /// # Errors
    ///
    /// Returns an error if cleanup fails.
    fn teardown(&mut self) -> TemplateResult<()>;

    /// Name for logging
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Page + settings + evidence + registry for one test session
#[derive(Debug)]
pub struct TemplateSession {
    ctx: TemplateContext,
    registry: TemplateRegistry,
    set_up: bool,
}

impl TemplateSession {
    /// Session over `page` with the builtin templates registered
    #[must_use]
    pub fn new(page: Arc<dyn PageDriver>, settings: TemplateSettings) -> Self {
        Self::with_registry(page, settings, TemplateRegistry::with_builtins())
    }

    /// Session over `page` with a caller-supplied registry
    #[must_use]
    pub fn with_registry(
        page: Arc<dyn PageDriver>,
        settings: TemplateSettings,
        registry: TemplateRegistry,
    ) -> Self {
        Self {
            ctx: TemplateContext::new(page, settings),
            registry,
            set_up: false,
        }
    }

    /// Registry, for setup-time registration
    pub fn registry_mut(&mut self) -> &mut TemplateRegistry {
        &mut self.registry
    }

    /// Registry
    #[must_use]
    pub const fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Context shared by the session's templates
    #[must_use]
    pub const fn context(&self) -> &TemplateContext {
        &self.ctx
    }

    /// Evidence layout
    #[must_use]
    pub fn evidence(&self) -> &EvidenceLayout {
        &self.ctx.evidence
    }

    /// Whether `setup` has run without a matching `teardown`
    #[must_use]
    pub const fn is_set_up(&self) -> bool {
        self.set_up
    }

    /// Fresh manager borrowing this session's registry
    #[must_use]
    pub fn manager(&self) -> TemplateManager<'_> {
        TemplateManager::new(&self.registry, self.ctx.clone())
    }
}

impl Fixture for TemplateSession {
    fn setup(&mut self) -> TemplateResult<()> {
        self.ctx.evidence.ensure_dirs()?;
        self.set_up = true;
        info!(
            root = %self.ctx.evidence.root().display(),
            run_id = %self.ctx.evidence.run_id(),
            templates = self.registry.len(),
            "template session ready"
        );
        Ok(())
    }

    fn teardown(&mut self) -> TemplateResult<()> {
        let removed = self.ctx.evidence.clean_empty_video_dirs()?;
        self.set_up = false;
        info!(removed, "template session torn down");
        Ok(())
    }

    fn name(&self) -> &str {
        "template-session"
    }
}
