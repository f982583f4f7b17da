//! Modal template configuration.

use super::TemplateConfig;
use crate::result::{TemplateError, TemplateResult};
use serde::{Deserialize, Serialize};

/// Modal/dialog template configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalTemplateConfig {
    /// Shared template settings
    #[serde(flatten)]
    pub base: TemplateConfig,
    /// The dialog element
    pub modal_selector: String,
    /// Title element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_selector: Option<String>,
    /// Body element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_selector: Option<String>,
    /// Close (X) control
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_button_selector: Option<String>,
    /// Confirm / OK / Yes control
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm_button_selector: Option<String>,
    /// Cancel / No control
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_button_selector: Option<String>,
    /// Backdrop that dismisses the dialog when clicked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay_selector: Option<String>,
}

impl ModalTemplateConfig {
    /// Modal with only the dialog selector
    #[must_use]
    pub fn new(base: TemplateConfig, modal_selector: impl Into<String>) -> Self {
        Self {
            base,
            modal_selector: modal_selector.into(),
            title_selector: None,
            content_selector: None,
            close_button_selector: None,
            confirm_button_selector: None,
            cancel_button_selector: None,
            overlay_selector: None,
        }
    }

    /// Set the title element
    #[must_use]
    pub fn with_title(mut self, selector: impl Into<String>) -> Self {
        self.title_selector = Some(selector.into());
        self
    }

    /// Set the body element
    #[must_use]
    pub fn with_content(mut self, selector: impl Into<String>) -> Self {
        self.content_selector = Some(selector.into());
        self
    }

    /// Set the close control
    #[must_use]
    pub fn with_close_button(mut self, selector: impl Into<String>) -> Self {
        self.close_button_selector = Some(selector.into());
        self
    }

    /// Set the confirm control
    #[must_use]
    pub fn with_confirm_button(mut self, selector: impl Into<String>) -> Self {
        self.confirm_button_selector = Some(selector.into());
        self
    }

    /// Set the cancel control
    #[must_use]
    pub fn with_cancel_button(mut self, selector: impl Into<String>) -> Self {
        self.cancel_button_selector = Some(selector.into());
        self
    }

    /// Set the overlay
    #[must_use]
    pub fn with_overlay(mut self, selector: impl Into<String>) -> Self {
        self.overlay_selector = Some(selector.into());
        self
    }

    /// Validate shared settings and the dialog selector
    pub fn validate(&self) -> TemplateResult<()> {
        self.base.validate()?;
        if self.modal_selector.trim().is_empty() {
            return Err(TemplateError::configuration(format!(
                "modal '{}' has an empty modal_selector",
                self.base.template_name
            )));
        }
        Ok(())
    }
}

/// Confirm/cancel dialog
#[must_use]
pub fn confirmation_modal_template() -> ModalTemplateConfig {
    let modal = ".modal, .dialog, [role=\"dialog\"]";
    let title = ".modal-title, .dialog-title, h2, h3";
    let content = ".modal-body, .dialog-content, .modal-content p";
    let close = ".modal-close, .close, [aria-label=\"Close\"]";
    let confirm = ".btn-confirm, .btn-primary, .btn-yes, .confirm";
    let cancel = ".btn-cancel, .btn-secondary, .btn-no, .cancel";
    let overlay = ".modal-backdrop, .overlay, .modal-overlay";

    let base = TemplateConfig::new("confirmation-modal")
        .with_selector("modal", modal)
        .with_selector("title", title)
        .with_selector("content", content)
        .with_selector("closeButton", close)
        .with_selector("confirmButton", confirm)
        .with_selector("cancelButton", cancel)
        .with_selector("overlay", overlay);

    ModalTemplateConfig::new(base, modal)
        .with_title(title)
        .with_content(content)
        .with_close_button(close)
        .with_confirm_button(confirm)
        .with_cancel_button(cancel)
        .with_overlay(overlay)
}

/// Notification / toast
#[must_use]
pub fn alert_modal_template() -> ModalTemplateConfig {
    let modal = ".alert-modal, .notification, .toast";
    let title = ".alert-title, .notification-title";
    let content = ".alert-message, .notification-content";
    let close = ".alert-close, .notification-close";

    let base = TemplateConfig::new("alert-modal")
        .with_selector("modal", modal)
        .with_selector("title", title)
        .with_selector("content", content)
        .with_selector("closeButton", close);

    ModalTemplateConfig::new(base, modal)
        .with_title(title)
        .with_content(content)
        .with_close_button(close)
}
