//! Form template: fill, submit, validate and reset data-entry forms.

use super::{BaseTemplate, Template, TemplateContext};
use crate::config::{FieldKind, FieldValue, FormData, FormField, FormTemplateConfig, TemplateKind};
use crate::locator::Locator;
use crate::result::{TemplateError, TemplateResult};
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result a submit is expected to produce
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Success container should appear
    #[default]
    Success,
    /// Error container should appear
    Error,
}

/// Lifecycle of one form interaction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormState {
    /// Nothing filled yet (or reset)
    #[default]
    Idle,
    /// Data entered
    Filled,
    /// Submitted; no container configured for the expected outcome
    Submitted,
    /// Success container observed
    Succeeded,
    /// Error container observed
    Failed,
}

impl fmt::Display for FormState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Filled => "filled",
            Self::Submitted => "submitted",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Form template
#[derive(Debug)]
pub struct FormTemplate {
    base: BaseTemplate,
    config: Arc<FormTemplateConfig>,
    patterns: HashMap<String, Regex>,
    state: Mutex<FormState>,
}

impl FormTemplate {
    /// Bind a form config to a page; validation patterns are compiled here
    pub fn new(ctx: TemplateContext, config: Arc<FormTemplateConfig>) -> TemplateResult<Self> {
        let mut patterns = HashMap::new();
        for field in &config.fields {
            if let Some(regex) = field.pattern()? {
                let _ = patterns.insert(field.name.clone(), regex);
            }
        }
        Ok(Self {
            base: BaseTemplate::new(ctx, config.base.clone()),
            config,
            patterns,
            state: Mutex::new(FormState::Idle),
        })
    }

    /// Form config
    #[must_use]
    pub fn config(&self) -> &FormTemplateConfig {
        &self.config
    }

    /// Declared fields in fill order
    #[must_use]
    pub fn fields(&self) -> &[FormField] {
        &self.config.fields
    }

    /// Declared field by name
    pub fn field(&self, name: &str) -> TemplateResult<&FormField> {
        self.config
            .fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| TemplateError::FieldNotConfigured {
                field: name.to_string(),
                template: self.base.template_name().to_string(),
            })
    }

    /// Last observed form state
    #[must_use]
    pub fn state(&self) -> FormState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: FormState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Fill every declared field that has a value, in declaration order.
    ///
    /// Fails with [`TemplateError::MissingRequiredField`] on the first required
    /// field whose value is missing or empty.
    pub async fn fill_form(&self, data: &FormData) -> TemplateResult<()> {
        let start = Instant::now();
        info!(template = %self.base.template_name(), "filling form");
        let _ = self.base.take_template_screenshot("before-fill").await?;

        for field in &self.config.fields {
            match data.present(&field.name) {
                Some(value) => self.fill_field(field, value).await?,
                None if field.required => {
                    return Err(TemplateError::MissingRequiredField {
                        field: field.name.clone(),
                    });
                }
                None => debug!(field = %field.name, "no value, skipped"),
            }
        }

        let _ = self.base.take_template_screenshot("after-fill").await?;
        self.set_state(FormState::Filled);
        info!(
            template = %self.base.template_name(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "form filled"
        );
        Ok(())
    }

    /// Fill one declared field according to its kind
    pub async fn fill_field(&self, field: &FormField, value: &FieldValue) -> TemplateResult<()> {
        if let Some(pattern) = self.patterns.get(&field.name) {
            let text = value.as_text();
            if !pattern.is_match(&text) {
                return Err(TemplateError::InvalidFieldValue {
                    field: field.name.clone(),
                    value: text,
                    pattern: pattern.as_str().to_string(),
                });
            }
        }

        let page = self.base.page();
        let locator = Locator::new(field.selector.as_str());
        self.base.wait_for_element(&locator).await?;

        match field.kind {
            FieldKind::Input | FieldKind::Textarea => {
                page.clear(&locator).await?;
                page.fill(&locator, &value.as_text()).await?;
            }
            FieldKind::Select => page.select_option(&locator, &value.as_text()).await?,
            FieldKind::Checkbox => {
                if value.is_truthy() {
                    page.check(&locator).await?;
                } else {
                    page.uncheck(&locator).await?;
                }
            }
            FieldKind::Radio => {
                let option = locator.with_attribute("value", &value.as_text());
                page.check(&option).await?;
            }
        }

        debug!(field = %field.name, kind = %field.kind, value = %value, "filled field");
        Ok(())
    }

    /// Fill a declared field looked up by name
    pub async fn fill_field_by_name(
        &self,
        name: &str,
        value: impl Into<FieldValue> + Send,
    ) -> TemplateResult<()> {
        let field = self.field(name)?;
        self.fill_field(field, &value.into()).await
    }

    /// Click submit, let the page settle and check the expected container.
    ///
    /// The container check only runs when the matching container is configured.
    pub async fn submit_form(&self, expected: SubmitOutcome) -> TemplateResult<FormState> {
        let start = Instant::now();
        info!(template = %self.base.template_name(), ?expected, "submitting form");
        let _ = self.base.take_template_screenshot("before-submit").await?;

        let submit = Locator::new(self.config.submit_button.as_str());
        self.base.wait_for_element(&submit).await?;
        self.base.page().click(&submit).await?;
        self.set_state(FormState::Submitted);

        self.base
            .page()
            .wait_for_timeout(self.base.settings().submit_settle())
            .await?;
        let _ = self.base.take_template_screenshot("after-submit").await?;

        let container = match expected {
            SubmitOutcome::Success => self
                .config
                .success_container
                .as_deref()
                .map(|s| (s, FormState::Succeeded)),
            SubmitOutcome::Error => self
                .config
                .error_container
                .as_deref()
                .map(|s| (s, FormState::Failed)),
        };
        if let Some((selector, state)) = container {
            let locator = Locator::new(selector);
            self.base.expect(&locator).to_be_visible().await?;
            self.set_state(state);
        }

        let state = self.state();
        info!(
            template = %self.base.template_name(),
            %state,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "form submitted"
        );
        Ok(state)
    }

    /// Check every field is visible and required fields carry an indicator.
    ///
    /// Returns the required fields that have neither a `required` attribute
    /// nor a `required` class on themselves or their parent.
    pub async fn validate_fields(&self) -> TemplateResult<Vec<String>> {
        info!(template = %self.base.template_name(), "validating form fields");
        let page = self.base.page();
        let mut unmarked = Vec::new();

        for field in &self.config.fields {
            let locator = Locator::new(field.selector.as_str());
            self.base.expect(&locator).to_be_visible().await?;
            if !field.required {
                continue;
            }
            let has_attribute = page.get_attribute(&locator, "required").await?.is_some();
            let has_class = page.has_class(&locator, "required", true).await?;
            if !has_attribute && !has_class {
                warn!(field = %field.name, "required field may not have proper validation indicators");
                unmarked.push(field.name.clone());
            }
        }

        let _ = self.base.take_template_screenshot("field-validation").await?;
        Ok(unmarked)
    }

    /// Reset the form.
    ///
    /// Uses the reset control when configured. Otherwise text inputs are
    /// cleared and checkboxes unchecked; selects and radios keep their value.
    pub async fn reset_form(&self) -> TemplateResult<()> {
        let page = self.base.page();
        if let Some(reset) = self.config.reset_button.as_deref() {
            let locator = Locator::new(reset);
            self.base.wait_for_element(&locator).await?;
            page.click(&locator).await?;
            info!(template = %self.base.template_name(), "form reset");
        } else {
            for field in &self.config.fields {
                let locator = Locator::new(field.selector.as_str());
                match field.kind {
                    FieldKind::Input | FieldKind::Textarea => page.clear(&locator).await?,
                    FieldKind::Checkbox => page.uncheck(&locator).await?,
                    FieldKind::Select | FieldKind::Radio => {
                        debug!(field = %field.name, kind = %field.kind, "left untouched by manual reset");
                    }
                }
            }
            info!(template = %self.base.template_name(), "manual form reset");
        }

        let _ = self.base.take_template_screenshot("after-reset").await?;
        self.set_state(FormState::Idle);
        Ok(())
    }
}

impl Template for FormTemplate {
    fn base(&self) -> &BaseTemplate {
        &self.base
    }

    fn kind(&self) -> TemplateKind {
        TemplateKind::Form
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{login_form_template, signup_form_template, TemplateConfig};
    use crate::driver::{MockEffect, MockElement, MockPage};
    use crate::settings::ScreenshotMode;
    use crate::template::test_support;
    use proptest::prelude::*;

    const LOGIN_EMAIL: &str = "[data-qa=\"login-email\"]";
    const LOGIN_PASSWORD: &str = "[data-qa=\"login-password\"]";
    const LOGIN_BUTTON: &str = "[data-qa=\"login-button\"]";

    fn login_page() -> Arc<MockPage> {
        let page = MockPage::new()
            .with_element(LOGIN_EMAIL, MockElement::new().with_attribute("required", ""))
            .with_element(LOGIN_PASSWORD, MockElement::new())
            .with_element(LOGIN_BUTTON, MockElement::new());
        Arc::new(page)
    }

    fn login_form(page: &Arc<MockPage>) -> (FormTemplate, tempfile::TempDir) {
        let (ctx, dir) = test_support::context(page, ScreenshotMode::Off);
        (
            FormTemplate::new(ctx, Arc::new(login_form_template())).unwrap(),
            dir,
        )
    }

    fn preferences_form() -> FormTemplateConfig {
        FormTemplateConfig::new(TemplateConfig::new("preferences"), "#save")
            .with_field(FormField::new("bio", "#bio", FieldKind::Textarea))
            .with_field(FormField::new("country", "#country", FieldKind::Select))
            .with_field(FormField::new("newsletter", "#newsletter", FieldKind::Checkbox))
            .with_field(FormField::new("title", "input[name=\"title\"]", FieldKind::Radio))
            .with_field(
                FormField::new("zipcode", "#zipcode", FieldKind::Input).with_validation(r"^\d{5}$"),
            )
    }

    fn preferences_page() -> Arc<MockPage> {
        let page = MockPage::new()
            .with_element("#bio", MockElement::new())
            .with_element("#country", MockElement::new())
            .with_element("#newsletter", MockElement::new())
            .with_element("input[name=\"title\"]", MockElement::new())
            .with_element("input[name=\"title\"][value=\"Mrs\"]", MockElement::new())
            .with_element("#zipcode", MockElement::new())
            .with_element("#save", MockElement::new());
        Arc::new(page)
    }

    mod fill_tests {
        use super::*;

        #[tokio::test]
        async fn test_fill_login() {
            let page = login_page();
            let (form, _dir) = login_form(&page);
            let data = FormData::new()
                .with("email", "user@example.com")
                .with("password", "secret");

            form.fill_form(&data).await.unwrap();

            assert_eq!(
                page.calls_matching("fill:"),
                vec![
                    format!("fill:{LOGIN_EMAIL}=user@example.com"),
                    format!("fill:{LOGIN_PASSWORD}=secret"),
                ]
            );
            assert_eq!(form.state(), FormState::Filled);
        }

        #[tokio::test]
        async fn test_missing_password() {
            let page = login_page();
            let (form, _dir) = login_form(&page);
            let data = FormData::new().with("email", "user@example.com");

            let err = form.fill_form(&data).await.unwrap_err();
            assert!(
                matches!(err, TemplateError::MissingRequiredField { ref field } if field == "password")
            );
            assert_eq!(form.state(), FormState::Idle);
        }

        #[tokio::test]
        async fn test_empty_required_counts_as_missing() {
            let page = login_page();
            let (form, _dir) = login_form(&page);
            let data = FormData::new().with("email", "").with("password", "x");
            let err = form.fill_form(&data).await.unwrap_err();
            assert!(err.to_string().contains("'email'"));
        }

        #[tokio::test]
        async fn test_absent_optional_fields_untouched() {
            let page = Arc::new(MockPage::new());
            for selector in [
                "[data-qa=\"signup-name\"]",
                "[data-qa=\"signup-email\"]",
                "[data-qa=\"password\"]",
                "[data-qa=\"city\"]",
            ] {
                page.insert(selector, MockElement::new());
            }
            let (ctx, _dir) = test_support::context(&page, ScreenshotMode::Off);
            let form = FormTemplate::new(ctx, Arc::new(signup_form_template())).unwrap();
            let data = FormData::new()
                .with("city", "Lisbon")
                .with("password", "pw")
                .with("name", "Ada")
                .with("email", "ada@example.com")
                .with("unrelated", "ignored");

            form.fill_form(&data).await.unwrap();

            let filled: Vec<String> = page.calls_matching("fill:");
            assert_eq!(filled.len(), 4);
            assert!(filled[0].ends_with("=Ada"));
            assert!(filled[3].ends_with("=Lisbon"));
        }

        #[tokio::test]
        async fn test_field_kinds() {
            let page = preferences_page();
            let (ctx, _dir) = test_support::context(&page, ScreenshotMode::Off);
            let form = FormTemplate::new(ctx, Arc::new(preferences_form())).unwrap();
            let data = FormData::new()
                .with("bio", "hello")
                .with("country", "Canada")
                .with("newsletter", true)
                .with("title", "Mrs")
                .with("zipcode", "12345");

            form.fill_form(&data).await.unwrap();

            assert_eq!(page.element_by_selector("#bio").unwrap().value, "hello");
            assert_eq!(page.element_by_selector("#country").unwrap().value, "Canada");
            assert!(page.element_by_selector("#newsletter").unwrap().checked);
            assert!(
                page.element_by_selector("input[name=\"title\"][value=\"Mrs\"]")
                    .unwrap()
                    .checked
            );
            assert!(!page.element_by_selector("input[name=\"title\"]").unwrap().checked);
        }

        #[tokio::test]
        async fn test_checkbox_text_falsy_unchecks() {
            let page = preferences_page();
            let (ctx, _dir) = test_support::context(&page, ScreenshotMode::Off);
            let form = FormTemplate::new(ctx, Arc::new(preferences_form())).unwrap();
            form.fill_field_by_name("newsletter", "off").await.unwrap();
            assert!(page.was_called("uncheck:#newsletter"));
        }

        #[tokio::test]
        async fn test_validation_pattern_rejects_before_page() {
            let page = preferences_page();
            let (ctx, _dir) = test_support::context(&page, ScreenshotMode::Off);
            let form = FormTemplate::new(ctx, Arc::new(preferences_form())).unwrap();
            let err = form.fill_field_by_name("zipcode", "12a").await.unwrap_err();
            assert!(matches!(err, TemplateError::InvalidFieldValue { .. }));
            assert!(page.history().is_empty());
        }

        #[tokio::test]
        async fn test_unknown_field_by_name() {
            let page = login_page();
            let (form, _dir) = login_form(&page);
            assert!(matches!(
                form.fill_field_by_name("phone", "1").await,
                Err(TemplateError::FieldNotConfigured { .. })
            ));
        }

        #[tokio::test]
        async fn test_fill_screenshots() {
            let page = login_page();
            let (ctx, _dir) = test_support::context(&page, ScreenshotMode::Minimal);
            let form = FormTemplate::new(ctx, Arc::new(login_form_template())).unwrap();
            let data = FormData::new().with("email", "a@b.c").with("password", "p");
            form.fill_form(&data).await.unwrap();
            assert_eq!(
                page.calls_matching("screenshot:"),
                vec![
                    "screenshot:login-form-before-fill",
                    "screenshot:login-form-after-fill"
                ]
            );
        }

        #[tokio::test]
        async fn test_fill_survives_unwritable_evidence() {
            let page = login_page();
            let dir = tempfile::tempdir().unwrap();
            let blocker = dir.path().join("Evidence");
            std::fs::write(&blocker, b"").unwrap();
            let ctx = test_support::context_at(&page, ScreenshotMode::Minimal, &blocker);
            let form = FormTemplate::new(ctx, Arc::new(login_form_template())).unwrap();
            let data = FormData::new().with("email", "a@b.c").with("password", "p");

            form.fill_form(&data).await.unwrap();

            assert_eq!(page.element_by_selector(LOGIN_EMAIL).unwrap().value, "a@b.c");
            assert_eq!(page.element_by_selector(LOGIN_PASSWORD).unwrap().value, "p");
            assert_eq!(form.state(), FormState::Filled);
        }

        #[tokio::test]
        async fn test_numeric_values_filled_as_text() {
            let page = preferences_page();
            let (ctx, _dir) = test_support::context(&page, ScreenshotMode::Off);
            let form = FormTemplate::new(ctx, Arc::new(preferences_form())).unwrap();
            let data: FormData = serde_yaml_ng::from_str("zipcode: 12345\n").unwrap();

            form.fill_form(&data).await.unwrap();

            assert_eq!(page.element_by_selector("#zipcode").unwrap().value, "12345");
        }
    }

    mod submit_tests {
        use super::*;

        #[tokio::test]
        async fn test_submit_success() {
            let page = login_page();
            page.on_click(LOGIN_BUTTON, MockEffect::Show(".navbar-nav".to_string()));
            let (form, _dir) = login_form(&page);

            let state = form.submit_form(SubmitOutcome::Success).await.unwrap();

            assert_eq!(state, FormState::Succeeded);
            assert!(page.was_called(&format!("click:{LOGIN_BUTTON}")));
            assert!(page.was_called("wait:0"));
        }

        #[tokio::test]
        async fn test_submit_expected_error_missing_container() {
            let page = login_page();
            let (form, _dir) = login_form(&page);
            let err = form.submit_form(SubmitOutcome::Error).await.unwrap_err();
            assert!(matches!(err, TemplateError::AssertionFailed { .. }));
            assert_eq!(form.state(), FormState::Submitted);
        }

        #[tokio::test]
        async fn test_submit_without_containers() {
            let page = preferences_page();
            let (ctx, _dir) = test_support::context(&page, ScreenshotMode::Off);
            let form = FormTemplate::new(ctx, Arc::new(preferences_form())).unwrap();
            let state = form.submit_form(SubmitOutcome::Success).await.unwrap();
            assert_eq!(state, FormState::Submitted);
        }
    }

    mod validate_tests {
        use super::*;

        #[tokio::test]
        async fn test_unmarked_required_field_is_reported_not_failed() {
            let page = login_page();
            let (form, _dir) = login_form(&page);
            let unmarked = form.validate_fields().await.unwrap();
            assert_eq!(unmarked, vec!["password".to_string()]);
        }

        #[tokio::test]
        async fn test_parent_class_counts() {
            let page = login_page();
            page.insert(LOGIN_PASSWORD, MockElement::new().with_parent_class("required"));
            let (form, _dir) = login_form(&page);
            assert!(form.validate_fields().await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_hidden_field_fails() {
            let page = login_page();
            page.insert(LOGIN_PASSWORD, MockElement::hidden());
            let (form, _dir) = login_form(&page);
            assert!(form.validate_fields().await.is_err());
        }
    }

    mod reset_tests {
        use super::*;

        #[tokio::test]
        async fn test_manual_reset_skips_select_and_radio() {
            let page = preferences_page();
            let (ctx, _dir) = test_support::context(&page, ScreenshotMode::Off);
            let form = FormTemplate::new(ctx, Arc::new(preferences_form())).unwrap();

            form.reset_form().await.unwrap();

            assert!(page.was_called("clear:#bio"));
            assert!(page.was_called("clear:#zipcode"));
            assert!(page.was_called("uncheck:#newsletter"));
            assert!(!page.was_called("select:"));
            assert!(!page.was_called("check:input"));
            assert_eq!(form.state(), FormState::Idle);
        }

        #[tokio::test]
        async fn test_reset_button() {
            let page = preferences_page();
            page.insert("#reset", MockElement::new());
            let (ctx, _dir) = test_support::context(&page, ScreenshotMode::Off);
            let config = preferences_form().with_reset_button("#reset");
            let form = FormTemplate::new(ctx, Arc::new(config)).unwrap();

            form.reset_form().await.unwrap();

            assert!(page.was_called("click:#reset"));
            assert!(!page.was_called("clear:"));
        }
    }

    mod property_tests {
        use super::*;

        fn required_form(required: &[bool]) -> (FormTemplateConfig, Arc<MockPage>) {
            let page = Arc::new(MockPage::new());
            let mut config = FormTemplateConfig::new(TemplateConfig::new("generated"), "#go");
            for (i, req) in required.iter().enumerate() {
                let selector = format!("#f{i}");
                page.insert(selector.clone(), MockElement::new());
                let field = FormField::new(format!("f{i}"), selector, FieldKind::Input);
                config.fields.push(if *req { field.required() } else { field });
            }
            (config, page)
        }

        proptest! {
            #[test]
            fn fill_fails_iff_required_value_missing(
                spec in proptest::collection::vec((any::<bool>(), proptest::option::of("[a-z]{0,3}")), 1..6)
            ) {
                let required: Vec<bool> = spec.iter().map(|(r, _)| *r).collect();
                let (config, page) = required_form(&required);
                let mut data = FormData::new();
                for (i, (_, value)) in spec.iter().enumerate() {
                    if let Some(v) = value {
                        data.insert(format!("f{i}"), v.as_str());
                    }
                }
                let first_missing = spec
                    .iter()
                    .position(|(req, v)| *req && v.as_deref().map_or(true, str::is_empty));

                let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
                let (ctx, _dir) = test_support::context(&page, ScreenshotMode::Off);
                let form = FormTemplate::new(ctx, Arc::new(config)).unwrap();
                let result = rt.block_on(form.fill_form(&data));

                match first_missing {
                    Some(i) => {
                        let expected = format!("f{i}");
                        let named_first_missing = matches!(
                            result,
                            Err(TemplateError::MissingRequiredField { ref field }) if *field == expected
                        );
                        prop_assert!(named_first_missing);
                    }
                    None => {
                        prop_assert!(result.is_ok());
                        let filled = spec
                            .iter()
                            .filter(|(_, v)| v.as_deref().is_some_and(|s| !s.is_empty()))
                            .count();
                        prop_assert_eq!(page.calls_matching("fill:").len(), filled);
                    }
                }
            }
        }
    }
}
