//! Shared template core: named elements, declarative actions, screenshots.

use super::TemplateContext;
use crate::assertion::{Assertion, Expect};
use crate::config::{expand_args, ActionStep, TemplateConfig, ValidationStep};
use crate::driver::{PageDriver, ScreenshotOptions};
use crate::locator::{ElementState, Locator};
use crate::result::{TemplateError, TemplateResult};
use crate::settings::TemplateSettings;
use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Template core every kind composes
#[derive(Debug)]
pub struct BaseTemplate {
    ctx: TemplateContext,
    config: TemplateConfig,
    elements: HashMap<String, Locator>,
}

impl BaseTemplate {
    /// Bind `config` to a page, creating one locator per named selector
    #[must_use]
    pub fn new(ctx: TemplateContext, config: TemplateConfig) -> Self {
        let mut template = Self {
            ctx,
            config,
            elements: HashMap::new(),
        };
        template.initialize_elements();
        template
    }

    fn initialize_elements(&mut self) {
        self.elements = self
            .config
            .selectors
            .iter()
            .map(|(name, selector)| (name.clone(), Locator::new(selector.as_str())))
            .collect();
    }

    /// Configured template name
    #[must_use]
    pub fn template_name(&self) -> &str {
        &self.config.template_name
    }

    /// Shared config
    #[must_use]
    pub const fn config(&self) -> &TemplateConfig {
        &self.config
    }

    /// Page, settings and evidence
    #[must_use]
    pub const fn context(&self) -> &TemplateContext {
        &self.ctx
    }

    /// Page driver
    #[must_use]
    pub fn page(&self) -> &dyn PageDriver {
        self.ctx.page.as_ref()
    }

    /// Timeouts and evidence options
    #[must_use]
    pub fn settings(&self) -> &TemplateSettings {
        &self.ctx.settings
    }

    /// Named element; the same locator is returned on every call
    pub fn element(&self, name: &str) -> TemplateResult<&Locator> {
        self.elements.get(name).ok_or_else(|| TemplateError::NotFound {
            what: "Element",
            name: name.to_string(),
            template: self.config.template_name.clone(),
        })
    }

    /// Names of all bound elements, sorted
    #[must_use]
    pub fn element_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.elements.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Run a named action with positional arguments
    pub async fn execute_action(&self, name: &str, args: &[&str]) -> TemplateResult<()> {
        let spec = self
            .config
            .actions
            .get(name)
            .ok_or_else(|| TemplateError::NotFound {
                what: "Action",
                name: name.to_string(),
                template: self.config.template_name.clone(),
            })?;
        info!(template = %self.template_name(), action = name, steps = spec.steps.len(), "executing action");
        self.step(name, async {
            for step in &spec.steps {
                self.run_step(step, args).await?;
            }
            Ok(())
        })
        .await
    }

    /// Run `action` as a named step with screenshot evidence.
    ///
    /// `All` mode brackets it with `{name}-before` / `{name}-after` shots; any
    /// mode but `Off` takes `{name}-FAILED` when it errors. The action's
    /// result is returned unchanged.
    pub async fn step<T>(
        &self,
        name: &str,
        action: impl Future<Output = TemplateResult<T>>,
    ) -> TemplateResult<T> {
        let mode = self.settings().screenshot_mode;
        if mode.captures_step_evidence() {
            let _ = self.capture(&format!("{name}-before")).await;
        }
        match action.await {
            Ok(value) => {
                if mode.captures_step_evidence() {
                    let _ = self.capture(&format!("{name}-after")).await;
                }
                Ok(value)
            }
            Err(e) => {
                warn!(template = %self.template_name(), step = name, error = %e, "step failed");
                if mode.captures_failures() {
                    let _ = self.capture(&format!("{name}-FAILED")).await;
                }
                Err(e)
            }
        }
    }

    /// Run a named validation with positional arguments
    pub async fn execute_validation(&self, name: &str, args: &[&str]) -> TemplateResult<()> {
        let spec = self
            .config
            .validations
            .get(name)
            .ok_or_else(|| TemplateError::NotFound {
                what: "Validation",
                name: name.to_string(),
                template: self.config.template_name.clone(),
            })?;
        info!(template = %self.template_name(), validation = name, "executing validation");
        for check in &spec.steps {
            self.run_check(check, args).await?;
        }
        Ok(())
    }

    async fn run_step(&self, step: &ActionStep, args: &[&str]) -> TemplateResult<()> {
        debug!(template = %self.template_name(), ?step, "action step");
        let page = self.page();
        match step {
            ActionStep::Click { element } => {
                let locator = self.element(element)?;
                self.wait_for_element(locator).await?;
                page.click(locator).await
            }
            ActionStep::Fill { element, value } => {
                let locator = self.element(element)?;
                let value = expand_args(value, args)?;
                self.wait_for_element(locator).await?;
                page.clear(locator).await?;
                page.fill(locator, &value).await
            }
            ActionStep::Clear { element } => page.clear(self.element(element)?).await,
            ActionStep::Check { element } => page.check(self.element(element)?).await,
            ActionStep::Uncheck { element } => page.uncheck(self.element(element)?).await,
            ActionStep::Select { element, value } => {
                let value = expand_args(value, args)?;
                page.select_option(self.element(element)?, &value).await
            }
            ActionStep::Press { element, key } => page.press(self.element(element)?, key).await,
            ActionStep::Key { key } => page.keyboard_press(key).await,
            ActionStep::WaitFor { element, state } => {
                page.wait_for(self.element(element)?, *state, self.settings().element_timeout())
                    .await
            }
            ActionStep::Settle { ms } => page.wait_for_timeout(Duration::from_millis(*ms)).await,
            ActionStep::Screenshot { step } => {
                let step = expand_args(step, args)?;
                self.take_template_screenshot(&step).await.map(|_| ())
            }
        }
    }

    async fn run_check(&self, check: &ValidationStep, args: &[&str]) -> TemplateResult<()> {
        let locator = self.element(check.element())?;
        let expect = self.expect(locator);
        match check {
            ValidationStep::Visible { .. } => expect.to_be_visible().await,
            ValidationStep::Hidden { .. } => expect.to_be_hidden().await,
            ValidationStep::TextEquals { text, .. } => {
                expect.to_have_text(&expand_args(text, args)?).await
            }
            ValidationStep::TextContains { text, .. } => {
                expect.to_contain_text(&expand_args(text, args)?).await
            }
            ValidationStep::AttributeEquals {
                attribute, value, ..
            } => {
                let expected = Some(expand_args(value, args)?);
                let actual = self.page().get_attribute(locator, attribute).await?;
                Assertion::equals(&expected, &actual).into_result()
            }
            ValidationStep::CountAtLeast { min, .. } => expect.to_have_count_at_least(*min).await,
        }
    }

    /// Expectation on `locator` using the assertion timeout
    #[must_use]
    pub fn expect<'a>(&'a self, locator: &'a Locator) -> Expect<'a> {
        Expect::new(self.page(), locator, self.settings().assertion_timeout())
    }

    /// Wait until `locator` is visible, using the element timeout
    pub async fn wait_for_element(&self, locator: &Locator) -> TemplateResult<()> {
        self.wait_for_element_within(locator, self.settings().element_timeout())
            .await
    }

    /// Wait until `locator` is visible
    pub async fn wait_for_element_within(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> TemplateResult<()> {
        self.page()
            .wait_for(locator, ElementState::Visible, timeout)
            .await
    }

    /// Capture `{template_name}-{step}` into the evidence screenshots directory.
    ///
    /// Falls back to a viewport capture when the full-page one fails. Capture
    /// and write failures are logged and yield `Ok(None)`, so evidence never
    /// fails the step it documents. Skipped entirely when the screenshot mode
    /// is off.
    pub async fn take_template_screenshot(&self, step: &str) -> TemplateResult<Option<PathBuf>> {
        if !self.settings().screenshot_mode.captures_steps() {
            return Ok(None);
        }
        Ok(self.capture(step).await)
    }

    async fn capture(&self, step: &str) -> Option<PathBuf> {
        let name = format!("{}-{step}", self.template_name());
        let start = Instant::now();

        let png = match self.page().screenshot(&ScreenshotOptions::full_page(&name)).await {
            Ok(png) => png,
            Err(e) => {
                warn!(screenshot = %name, error = %e, "full page screenshot failed, trying viewport");
                match self.page().screenshot(&ScreenshotOptions::viewport(&name)).await {
                    Ok(png) => png,
                    Err(e) => {
                        warn!(screenshot = %name, error = %e, "viewport screenshot failed");
                        return None;
                    }
                }
            }
        };

        match self.ctx.evidence.write_screenshot(&name, &png) {
            Ok(path) => {
                debug!(path = %path.display(), elapsed_ms = start.elapsed().as_millis() as u64, "template screenshot");
                Some(path)
            }
            Err(e) => {
                warn!(screenshot = %name, error = %e, "could not write screenshot");
                None
            }
        }
    }
}
