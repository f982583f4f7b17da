//! Modal template: open/close tracking and dialog controls.

use super::{BaseTemplate, Template, TemplateContext};
use crate::config::{ModalTemplateConfig, TemplateKind};
use crate::locator::{ElementState, Locator};
use crate::result::{TemplateError, TemplateResult};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info};

/// Last observed modal transition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModalState {
    /// Not shown, or not yet observed
    #[default]
    Closed,
    /// Shown
    Open,
    /// Confirm control clicked
    Confirmed,
    /// Cancel control clicked and dialog gone
    Cancelled,
    /// Close control clicked and dialog gone
    ClosedExplicitly,
    /// Overlay clicked and dialog gone
    ClosedByOverlay,
    /// Escape pressed and dialog gone
    ClosedByEscape,
}

impl ModalState {
    /// True while the dialog is shown
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

impl fmt::Display for ModalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::ClosedExplicitly => "closed explicitly",
            Self::ClosedByOverlay => "closed by overlay",
            Self::ClosedByEscape => "closed by escape",
        };
        f.write_str(name)
    }
}

/// Dialog control named in [`ModalTemplate::verify_buttons`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalButton {
    /// "close"
    Close,
    /// "confirm", "ok", "yes"
    Confirm,
    /// "cancel", "no"
    Cancel,
}

impl ModalButton {
    /// Map a user-facing button name, case-insensitively
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "close" => Some(Self::Close),
            "confirm" | "ok" | "yes" => Some(Self::Confirm),
            "cancel" | "no" => Some(Self::Cancel),
            _ => None,
        }
    }
}

/// Modal/dialog template
#[derive(Debug)]
pub struct ModalTemplate {
    base: BaseTemplate,
    config: Arc<ModalTemplateConfig>,
    modal: Locator,
    state: Mutex<ModalState>,
}

impl ModalTemplate {
    /// Bind a modal config to a page
    #[must_use]
    pub fn new(ctx: TemplateContext, config: Arc<ModalTemplateConfig>) -> Self {
        Self {
            base: BaseTemplate::new(ctx, config.base.clone()),
            modal: Locator::new(config.modal_selector.as_str()),
            config,
            state: Mutex::new(ModalState::Closed),
        }
    }

    /// Modal config
    #[must_use]
    pub fn config(&self) -> &ModalTemplateConfig {
        &self.config
    }

    /// Last observed transition
    #[must_use]
    pub fn state(&self) -> ModalState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: ModalState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    fn control(&self, selector: Option<&str>, what: &str) -> TemplateResult<Locator> {
        selector.map(Locator::new).ok_or_else(|| {
            TemplateError::configuration(format!(
                "{what} selector not configured for modal template '{}'",
                self.base.template_name()
            ))
        })
    }

    fn button_selector(&self, button: ModalButton) -> Option<&str> {
        match button {
            ModalButton::Close => self.config.close_button_selector.as_deref(),
            ModalButton::Confirm => self.config.confirm_button_selector.as_deref(),
            ModalButton::Cancel => self.config.cancel_button_selector.as_deref(),
        }
    }

    /// Wait for the dialog to become visible (modal timeout when `None`)
    pub async fn wait_for_modal(&self, timeout: Option<Duration>) -> TemplateResult<()> {
        let timeout = timeout.unwrap_or_else(|| self.base.settings().modal_timeout());
        self.base
            .wait_for_element_within(&self.modal, timeout)
            .await?;
        self.set_state(ModalState::Open);
        let _ = self.base.take_template_screenshot("modal-opened").await?;
        info!(template = %self.base.template_name(), "modal opened");
        Ok(())
    }

    /// Wait for the dialog to detach (modal timeout when `None`)
    pub async fn wait_for_modal_close(&self, timeout: Option<Duration>) -> TemplateResult<()> {
        self.await_close(timeout, ModalState::Closed).await
    }

    async fn await_close(&self, timeout: Option<Duration>, reason: ModalState) -> TemplateResult<()> {
        let timeout = timeout.unwrap_or_else(|| self.base.settings().modal_timeout());
        self.base
            .page()
            .wait_for(&self.modal, ElementState::Detached, timeout)
            .await?;
        self.set_state(reason);
        let _ = self.base.take_template_screenshot("modal-closed").await?;
        info!(template = %self.base.template_name(), state = %reason, "modal closed");
        Ok(())
    }

    /// Whether the dialog is currently visible
    pub async fn is_modal_visible(&self) -> TemplateResult<bool> {
        self.base.page().is_visible(&self.modal).await
    }

    /// Trimmed title text
    pub async fn modal_title(&self) -> TemplateResult<String> {
        let title = self.control(self.config.title_selector.as_deref(), "Title")?;
        let text = self.base.page().text_content(&title).await?;
        let text = text.as_deref().map(str::trim).unwrap_or_default().to_string();
        debug!(title = %text, "modal title");
        Ok(text)
    }

    /// Trimmed body text
    pub async fn modal_content(&self) -> TemplateResult<String> {
        let content = self.control(self.config.content_selector.as_deref(), "Content")?;
        let text = self.base.page().text_content(&content).await?;
        let text = text.as_deref().map(str::trim).unwrap_or_default().to_string();
        debug!(chars = text.chars().count(), "modal content");
        Ok(text)
    }

    async fn click_control(&self, control: &Locator, step: &str) -> TemplateResult<()> {
        let _ = self.base.take_template_screenshot(step).await?;
        self.base.wait_for_element(control).await?;
        self.base.page().click(control).await
    }

    /// Click the close control and wait for the dialog to go
    pub async fn close_modal(&self) -> TemplateResult<()> {
        let close = self.control(self.config.close_button_selector.as_deref(), "Close button")?;
        self.click_control(&close, "before-close").await?;
        self.await_close(None, ModalState::ClosedExplicitly).await
    }

    /// Click the confirm control; the dialog may stay open
    pub async fn confirm_modal(&self) -> TemplateResult<()> {
        let confirm =
            self.control(self.config.confirm_button_selector.as_deref(), "Confirm button")?;
        self.click_control(&confirm, "before-confirm").await?;
        self.set_state(ModalState::Confirmed);
        info!(template = %self.base.template_name(), "modal confirmed");
        Ok(())
    }

    /// Click the cancel control and wait for the dialog to go
    pub async fn cancel_modal(&self) -> TemplateResult<()> {
        let cancel =
            self.control(self.config.cancel_button_selector.as_deref(), "Cancel button")?;
        self.click_control(&cancel, "before-cancel").await?;
        self.await_close(None, ModalState::Cancelled).await
    }

    /// Click the overlay and wait for the dialog to go
    pub async fn close_by_overlay(&self) -> TemplateResult<()> {
        let overlay = self.control(self.config.overlay_selector.as_deref(), "Overlay")?;
        let _ = self
            .base
            .take_template_screenshot("before-overlay-close")
            .await?;
        self.base.page().click(&overlay).await?;
        self.await_close(None, ModalState::ClosedByOverlay).await
    }

    /// Press Escape and wait for the dialog to go
    pub async fn close_by_escape(&self) -> TemplateResult<()> {
        let _ = self
            .base
            .take_template_screenshot("before-escape-close")
            .await?;
        self.base.page().keyboard_press("Escape").await?;
        self.await_close(None, ModalState::ClosedByEscape).await
    }

    /// Title equals `expected`
    pub async fn verify_title(&self, expected: &str) -> TemplateResult<()> {
        let actual = self.modal_title().await?;
        if actual == expected {
            info!(title = expected, "modal title verified");
            Ok(())
        } else {
            Err(TemplateError::assertion(format!(
                "expected modal title '{expected}', got '{actual}'"
            )))
        }
    }

    /// Body contains `expected`
    pub async fn verify_content_contains(&self, expected: &str) -> TemplateResult<()> {
        let actual = self.modal_content().await?;
        if actual.contains(expected) {
            info!(text = expected, "modal content verified");
            Ok(())
        } else {
            Err(TemplateError::assertion(format!(
                "expected modal content to contain '{expected}', got '{actual}'"
            )))
        }
    }

    /// Each named button with a configured selector is visible.
    ///
    /// Unknown names and buttons without a selector are skipped. Returns the
    /// buttons that were checked.
    pub async fn verify_buttons(&self, names: &[&str]) -> TemplateResult<Vec<ModalButton>> {
        let mut checked = Vec::new();
        for name in names {
            let Some(button) = ModalButton::from_name(name) else {
                debug!(button = name, "unknown button name, skipped");
                continue;
            };
            let Some(selector) = self.button_selector(button) else {
                debug!(button = name, "button not configured, skipped");
                continue;
            };
            let locator = Locator::new(selector);
            self.base.expect(&locator).to_be_visible().await?;
            debug!(button = name, "button present");
            checked.push(button);
        }
        let _ = self.base.take_template_screenshot("buttons-verified").await?;
        Ok(checked)
    }
}

impl Template for ModalTemplate {
    fn base(&self) -> &BaseTemplate {
        &self.base
    }

    fn kind(&self) -> TemplateKind {
        TemplateKind::Modal
    }
}
