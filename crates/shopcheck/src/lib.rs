//! shopcheck: configuration-driven UI templates for storefront E2E tests
//!
//! Forms, lists and modals are described once as plain data (selectors,
//! fields, containers, declarative actions) and driven through a
//! [`PageDriver`]. A [`TemplateRegistry`] holds the configs; a
//! [`TemplateManager`] hands out cached templates bound to one page.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   register    ┌──────────────────┐
//! │ TemplateConfig   │──────────────►│ TemplateRegistry │
//! │ (YAML / builtin) │               └────────┬─────────┘
//! └──────────────────┘                        │ borrow
//!                                    ┌────────▼─────────┐
//!                                    │ TemplateManager  │
//!                                    └────────┬─────────┘
//!                   ┌─────────────────────────┼─────────────────────────┐
//!          ┌────────▼───────┐        ┌────────▼───────┐        ┌────────▼───────┐
//!          │ FormTemplate   │        │ ListTemplate   │        │ ModalTemplate  │
//!          └────────┬───────┘        └────────┬───────┘        └────────┬───────┘
//!                   └───────────── BaseTemplate + PageDriver ───────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use shopcheck::{Fixture, FormData, SubmitOutcome, TemplateSession, TemplateSettings};
//!
//! let mut session = TemplateSession::new(page, TemplateSettings::from_env()?);
//! session.setup()?;
//! let mut templates = session.manager();
//! let login = templates.get_form_template("login")?;
//! login
//!     .fill_form(&FormData::new().with("email", "user@example.com").with("password", "secret"))
//!     .await?;
//! login.submit_form(SubmitOutcome::Success).await?;
//! ```

#![warn(missing_docs)]

mod assertion;
pub mod config;
mod driver;
pub mod evidence;
mod fixture;
mod locator;
pub mod logging;
mod manager;
mod registry;
mod result;
pub mod settings;
pub mod template;
pub mod test_data;

pub use assertion::{Assertion, AssertionResult, Expect};
pub use config::{
    AnyTemplateConfig, ActionSpec, ActionStep, FieldKind, FieldValue, FormData, FormField,
    FormTemplateConfig, ListTemplateConfig, ModalTemplateConfig, TemplateConfig, TemplateKind,
    ValidationSpec, ValidationStep,
};
pub use driver::{MockEffect, MockElement, MockPage, PageDriver, ScreenshotOptions};
pub use evidence::EvidenceLayout;
pub use fixture::{Fixture, TemplateSession};
pub use locator::{ElementState, Locator, LocatorSegment};
pub use manager::{ActiveTemplate, TemplateManager};
pub use registry::{RegistryDocument, TemplateRegistry};
pub use result::{TemplateError, TemplateResult};
pub use settings::{ScreenshotMode, TemplateSettings};
pub use template::{
    BaseTemplate, FormState, FormTemplate, ListTemplate, LoadMoreOutcome, ModalButton, ModalState,
    ModalTemplate, SubmitOutcome, Template, TemplateContext,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn session(page: &Arc<MockPage>, dir: &tempfile::TempDir) -> TemplateSession {
        let settings = TemplateSettings::new()
            .with_settle_ms(0, 0, 0)
            .with_screenshot_mode(ScreenshotMode::Off)
            .with_evidence_root(dir.path());
        let page: Arc<dyn PageDriver> = page.clone();
        TemplateSession::new(page, settings)
    }

    mod scenario_tests {
        use super::*;

        #[tokio::test]
        async fn test_login_missing_password() {
            let dir = tempfile::tempdir().unwrap();
            let page = Arc::new(
                MockPage::new()
                    .with_element("[data-qa=\"login-email\"]", MockElement::new())
                    .with_element("[data-qa=\"login-password\"]", MockElement::new()),
            );
            let session = session(&page, &dir);
            let mut templates = session.manager();
            let login = templates.get_form_template("login").unwrap();

            let err = login
                .fill_form(&FormData::new().with("email", "user@example.com"))
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                TemplateError::MissingRequiredField { ref field } if field == "password"
            ));
            assert_eq!(login.state(), FormState::Idle);
        }

        #[tokio::test]
        async fn test_login_fills_and_submits() {
            let dir = tempfile::tempdir().unwrap();
            let page = Arc::new(
                MockPage::new()
                    .with_element("[data-qa=\"login-email\"]", MockElement::new())
                    .with_element("[data-qa=\"login-password\"]", MockElement::new())
                    .with_element("[data-qa=\"login-button\"]", MockElement::new()),
            );
            page.on_click(
                "[data-qa=\"login-button\"]",
                MockEffect::Show(".navbar-nav".to_string()),
            );
            let mut session = session(&page, &dir);
            session.setup().unwrap();
            let mut templates = session.manager();
            let login = templates.get_form_template("login").unwrap();

            login
                .fill_form(
                    &FormData::new()
                        .with("email", "user@example.com")
                        .with("password", "secret"),
                )
                .await
                .unwrap();
            let state = login.submit_form(SubmitOutcome::Success).await.unwrap();
            assert_eq!(state, FormState::Succeeded);
            assert!(page.was_called("fill:[data-qa=\"login-password\"]=secret"));
        }
    }
}
