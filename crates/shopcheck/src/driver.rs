//! PageDriver - the page automation contract templates are written against
//!
//! Templates never talk to a browser directly. Every interaction goes through
//! [`PageDriver`], so a CDP/WebDriver backend and the in-memory [`MockPage`]
//! are interchangeable.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  FormTemplate / ListTemplate / ModalTemplate              │
//! ├──────────────────────────────────────────────────────────┤
//! │  PageDriver (async trait)                                 │
//! │  ┌────────────────────┐   ┌────────────────────────────┐ │
//! │  │  browser backend   │   │  MockPage (element model)  │ │
//! │  └────────────────────┘   └────────────────────────────┘ │
//! └──────────────────────────────────────────────────────────┘
//! ```

use crate::locator::{ElementState, Locator, LocatorSegment};
use crate::result::{TemplateError, TemplateResult};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// PNG signature, returned by [`MockPage`] when no screenshot is scripted
const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Screenshot request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotOptions {
    /// Capture name (used for evidence file naming)
    pub name: String,
    /// Capture the full scrollable page rather than the viewport
    pub full_page: bool,
}

impl ScreenshotOptions {
    /// Full-page capture with the given name
    #[must_use]
    pub fn full_page(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            full_page: true,
        }
    }

    /// Viewport-only capture with the given name
    #[must_use]
    pub fn viewport(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            full_page: false,
        }
    }
}

/// Abstract page automation capability.
///
/// Every method is a suspension point; implementations report expiry of a
/// wait as [`TemplateError::Timeout`].
#[async_trait]
pub trait PageDriver: Send + Sync + fmt::Debug {
    /// Wait until the located element reaches `state`
    async fn wait_for(
        &self,
        locator: &Locator,
        state: ElementState,
        timeout: Duration,
    ) -> TemplateResult<()>;

    /// Replace the element's value with `text`
    async fn fill(&self, locator: &Locator, text: &str) -> TemplateResult<()>;

    /// Clear the element's value
    async fn clear(&self, locator: &Locator) -> TemplateResult<()>;

    /// Check a checkbox or radio
    async fn check(&self, locator: &Locator) -> TemplateResult<()>;

    /// Uncheck a checkbox
    async fn uncheck(&self, locator: &Locator) -> TemplateResult<()>;

    /// Click the element
    async fn click(&self, locator: &Locator) -> TemplateResult<()>;

    /// Choose a `<select>` option by value
    async fn select_option(&self, locator: &Locator, value: &str) -> TemplateResult<()>;

    /// Press a key while the element has focus
    async fn press(&self, locator: &Locator, key: &str) -> TemplateResult<()>;

    /// Text content of the element (`None` when it has none)
    async fn text_content(&self, locator: &Locator) -> TemplateResult<Option<String>>;

    /// Attribute value (`None` when absent)
    async fn get_attribute(&self, locator: &Locator, name: &str)
        -> TemplateResult<Option<String>>;

    /// Whether the element, or optionally its parent, carries a CSS class
    async fn has_class(
        &self,
        locator: &Locator,
        class: &str,
        include_parent: bool,
    ) -> TemplateResult<bool>;

    /// Whether the element is currently visible (never waits)
    async fn is_visible(&self, locator: &Locator) -> TemplateResult<bool>;

    /// Number of elements currently matching
    async fn count(&self, locator: &Locator) -> TemplateResult<usize>;

    /// Send a key press to the page
    async fn keyboard_press(&self, key: &str) -> TemplateResult<()>;

    /// Capture a screenshot, returning PNG bytes
    async fn screenshot(&self, options: &ScreenshotOptions) -> TemplateResult<Vec<u8>>;

    /// Fixed pause for asynchronous page updates
    async fn wait_for_timeout(&self, duration: Duration) -> TemplateResult<()>;
}

// ============================================================================
// MockPage
// ============================================================================

/// Element in the [`MockPage`] model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockElement {
    /// Text content
    pub text: Option<String>,
    /// Whether the element is rendered
    pub visible: bool,
    /// Current input value
    pub value: String,
    /// Checked state for checkboxes and radios
    pub checked: bool,
    /// Attributes
    pub attributes: BTreeMap<String, String>,
    /// CSS classes
    pub classes: BTreeSet<String>,
    /// CSS classes of the parent element
    pub parent_classes: BTreeSet<String>,
    /// Child elements by selector
    pub children: BTreeMap<String, Vec<MockElement>>,
}

impl Default for MockElement {
    fn default() -> Self {
        Self::new()
    }
}

impl MockElement {
    /// A visible element with no content
    #[must_use]
    pub fn new() -> Self {
        Self {
            text: None,
            visible: true,
            value: String::new(),
            checked: false,
            attributes: BTreeMap::new(),
            classes: BTreeSet::new(),
            parent_classes: BTreeSet::new(),
            children: BTreeMap::new(),
        }
    }

    /// An attached but hidden element
    #[must_use]
    pub fn hidden() -> Self {
        Self {
            visible: false,
            ..Self::new()
        }
    }

    /// Set text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(name.into(), value.into());
        self
    }

    /// Add a CSS class
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        let _ = self.classes.insert(class.into());
        self
    }

    /// Add a CSS class to the parent
    #[must_use]
    pub fn with_parent_class(mut self, class: impl Into<String>) -> Self {
        let _ = self.parent_classes.insert(class.into());
        self
    }

    /// Add a child under `selector`
    #[must_use]
    pub fn with_child(mut self, selector: impl Into<String>, child: Self) -> Self {
        self.children.entry(selector.into()).or_default().push(child);
        self
    }

    /// Add several children under `selector`
    #[must_use]
    pub fn with_children(mut self, selector: impl Into<String>, children: Vec<Self>) -> Self {
        self.children
            .entry(selector.into())
            .or_default()
            .extend(children);
        self
    }
}

/// Scripted page reaction to a click or key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEffect {
    /// Make every match of a top-level selector visible, inserting one if absent
    Show(String),
    /// Remove a top-level selector from the page
    Detach(String),
    /// Append children to the first match of a top-level selector
    AppendChildren {
        /// Top-level parent selector
        parent: String,
        /// Child selector
        child: String,
        /// Elements to append
        elements: Vec<MockElement>,
    },
}

#[derive(Debug, Default)]
struct MockState {
    elements: BTreeMap<String, Vec<MockElement>>,
    click_effects: HashMap<String, Vec<MockEffect>>,
    key_effects: HashMap<String, Vec<MockEffect>>,
    history: Vec<String>,
    screenshot_data: Option<Vec<u8>>,
    fail_full_page: bool,
    fail_viewport: bool,
}

impl MockState {
    fn apply(&mut self, effect: &MockEffect) {
        match effect {
            MockEffect::Show(selector) => {
                let matches = self.elements.entry(selector.clone()).or_default();
                if matches.is_empty() {
                    matches.push(MockElement::new());
                }
                for element in matches {
                    element.visible = true;
                }
            }
            MockEffect::Detach(selector) => {
                let _ = self.elements.remove(selector);
            }
            MockEffect::AppendChildren {
                parent,
                child,
                elements,
            } => {
                if let Some(first) = self.elements.get_mut(parent).and_then(|m| m.first_mut()) {
                    first
                        .children
                        .entry(child.clone())
                        .or_default()
                        .extend(elements.iter().cloned());
                }
            }
        }
    }

    fn trigger_click(&mut self, locator: &Locator) {
        let effects = self
            .click_effects
            .get(&locator.to_string())
            .cloned()
            .unwrap_or_default();
        for effect in &effects {
            self.apply(effect);
        }
    }

    fn trigger_key(&mut self, key: &str) {
        let effects = self.key_effects.get(key).cloned().unwrap_or_default();
        for effect in &effects {
            self.apply(effect);
        }
    }
}

fn resolve<'a>(
    elements: &'a BTreeMap<String, Vec<MockElement>>,
    segments: &[LocatorSegment],
) -> Option<&'a MockElement> {
    let (first, rest) = segments.split_first()?;
    let element = elements
        .get(first.selector())?
        .get(first.nth().unwrap_or(0))?;
    if rest.is_empty() {
        Some(element)
    } else {
        resolve(&element.children, rest)
    }
}

fn resolve_mut<'a>(
    elements: &'a mut BTreeMap<String, Vec<MockElement>>,
    segments: &[LocatorSegment],
) -> Option<&'a mut MockElement> {
    let (first, rest) = segments.split_first()?;
    let element = elements
        .get_mut(first.selector())?
        .get_mut(first.nth().unwrap_or(0))?;
    if rest.is_empty() {
        Some(element)
    } else {
        resolve_mut(&mut element.children, rest)
    }
}

fn count_matches(elements: &BTreeMap<String, Vec<MockElement>>, segments: &[LocatorSegment]) -> usize {
    let Some((last, parents)) = segments.split_last() else {
        return 0;
    };
    let scope = if parents.is_empty() {
        Some(elements)
    } else {
        resolve(elements, parents).map(|parent| &parent.children)
    };
    let found = scope
        .and_then(|s| s.get(last.selector()))
        .map_or(0, Vec::len);
    match last.nth() {
        Some(n) => usize::from(n < found),
        None => found,
    }
}

/// In-memory page for exercising templates without a browser.
///
/// Elements are keyed by selector string; scoped locators walk
/// [`MockElement::children`]. Every driver call is recorded in
/// [`history`](Self::history) as `"<op>:<locator>[=<arg>]"`.
#[derive(Debug, Default)]
pub struct MockPage {
    state: Mutex<MockState>,
}

impl MockPage {
    /// Create an empty page
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert (replacing) a single element under a top-level selector
    #[must_use]
    pub fn with_element(self, selector: impl Into<String>, element: MockElement) -> Self {
        self.insert(selector, element);
        self
    }

    /// Insert (replacing) a single element under a top-level selector
    pub fn insert(&self, selector: impl Into<String>, element: MockElement) {
        let _ = self.lock().elements.insert(selector.into(), vec![element]);
    }

    /// Insert (replacing) several matches for a top-level selector
    pub fn insert_all(&self, selector: impl Into<String>, elements: Vec<MockElement>) {
        let _ = self.lock().elements.insert(selector.into(), elements);
    }

    /// Remove a top-level selector
    pub fn remove(&self, selector: &str) {
        let _ = self.lock().elements.remove(selector);
    }

    /// Script a reaction to clicks on `locator` (matched by its display form)
    pub fn on_click(&self, locator: impl Into<String>, effect: MockEffect) {
        self.lock()
            .click_effects
            .entry(locator.into())
            .or_default()
            .push(effect);
    }

    /// Script a reaction to a key press (page-level or on an element)
    pub fn on_key(&self, key: impl Into<String>, effect: MockEffect) {
        self.lock()
            .key_effects
            .entry(key.into())
            .or_default()
            .push(effect);
    }

    /// Bytes returned by `screenshot`
    pub fn set_screenshot(&self, data: Vec<u8>) {
        self.lock().screenshot_data = Some(data);
    }

    /// Make full-page and/or viewport captures fail
    pub fn fail_screenshots(&self, full_page: bool, viewport: bool) {
        let mut state = self.lock();
        state.fail_full_page = full_page;
        state.fail_viewport = viewport;
    }

    /// Snapshot of the element a locator resolves to
    #[must_use]
    pub fn element(&self, locator: &Locator) -> Option<MockElement> {
        resolve(&self.lock().elements, locator.segments()).cloned()
    }

    /// Snapshot of the first match of a top-level selector
    #[must_use]
    pub fn element_by_selector(&self, selector: &str) -> Option<MockElement> {
        self.element(&Locator::new(selector))
    }

    /// Recorded driver calls, oldest first
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.lock().history.clone()
    }

    /// Recorded calls starting with `prefix`
    #[must_use]
    pub fn calls_matching(&self, prefix: &str) -> Vec<String> {
        self.lock()
            .history
            .iter()
            .filter(|c| c.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Check if a call starting with `prefix` was recorded
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.lock().history.iter().any(|c| c.starts_with(prefix))
    }

    fn record(state: &mut MockState, entry: String) {
        state.history.push(entry);
    }

    fn with_actionable<T>(
        &self,
        locator: &Locator,
        entry: String,
        f: impl FnOnce(&mut MockElement) -> T,
    ) -> TemplateResult<T> {
        let mut state = self.lock();
        Self::record(&mut state, entry);
        let element = resolve_mut(&mut state.elements, locator.segments())
            .ok_or_else(|| TemplateError::page(format!("no element matches {locator}")))?;
        if !element.visible {
            return Err(TemplateError::page(format!("element {locator} is not visible")));
        }
        Ok(f(element))
    }

    fn with_attached<T>(
        &self,
        locator: &Locator,
        f: impl FnOnce(&MockElement) -> T,
    ) -> TemplateResult<T> {
        let state = self.lock();
        resolve(&state.elements, locator.segments())
            .map(f)
            .ok_or_else(|| TemplateError::page(format!("no element matches {locator}")))
    }
}

#[async_trait]
impl PageDriver for MockPage {
    async fn wait_for(
        &self,
        locator: &Locator,
        state: ElementState,
        timeout: Duration,
    ) -> TemplateResult<()> {
        let mut guard = self.lock();
        Self::record(&mut guard, format!("wait_for:{locator}={state}"));
        let element = resolve(&guard.elements, locator.segments());
        let reached = match state {
            ElementState::Visible => element.is_some_and(|e| e.visible),
            ElementState::Hidden => element.map_or(true, |e| !e.visible),
            ElementState::Attached => element.is_some(),
            ElementState::Detached => element.is_none(),
        };
        if reached {
            Ok(())
        } else {
            Err(TemplateError::Timeout {
                ms: timeout.as_millis() as u64,
                target: format!("{locator} to be {state}"),
            })
        }
    }

    async fn fill(&self, locator: &Locator, text: &str) -> TemplateResult<()> {
        self.with_actionable(locator, format!("fill:{locator}={text}"), |e| {
            e.value = text.to_string();
        })
    }

    async fn clear(&self, locator: &Locator) -> TemplateResult<()> {
        self.with_actionable(locator, format!("clear:{locator}"), |e| e.value.clear())
    }

    async fn check(&self, locator: &Locator) -> TemplateResult<()> {
        self.with_actionable(locator, format!("check:{locator}"), |e| e.checked = true)
    }

    async fn uncheck(&self, locator: &Locator) -> TemplateResult<()> {
        self.with_actionable(locator, format!("uncheck:{locator}"), |e| {
            e.checked = false;
        })
    }

    async fn click(&self, locator: &Locator) -> TemplateResult<()> {
        self.with_actionable(locator, format!("click:{locator}"), |_| ())?;
        self.lock().trigger_click(locator);
        Ok(())
    }

    async fn select_option(&self, locator: &Locator, value: &str) -> TemplateResult<()> {
        self.with_actionable(locator, format!("select:{locator}={value}"), |e| {
            e.value = value.to_string();
        })
    }

    async fn press(&self, locator: &Locator, key: &str) -> TemplateResult<()> {
        self.with_actionable(locator, format!("press:{locator}={key}"), |_| ())?;
        self.lock().trigger_key(key);
        Ok(())
    }

    async fn text_content(&self, locator: &Locator) -> TemplateResult<Option<String>> {
        self.with_attached(locator, |e| e.text.clone())
    }

    async fn get_attribute(
        &self,
        locator: &Locator,
        name: &str,
    ) -> TemplateResult<Option<String>> {
        self.with_attached(locator, |e| e.attributes.get(name).cloned())
    }

    async fn has_class(
        &self,
        locator: &Locator,
        class: &str,
        include_parent: bool,
    ) -> TemplateResult<bool> {
        self.with_attached(locator, |e| {
            e.classes.contains(class) || (include_parent && e.parent_classes.contains(class))
        })
    }

    async fn is_visible(&self, locator: &Locator) -> TemplateResult<bool> {
        let state = self.lock();
        Ok(resolve(&state.elements, locator.segments()).is_some_and(|e| e.visible))
    }

    async fn count(&self, locator: &Locator) -> TemplateResult<usize> {
        Ok(count_matches(&self.lock().elements, locator.segments()))
    }

    async fn keyboard_press(&self, key: &str) -> TemplateResult<()> {
        let mut state = self.lock();
        Self::record(&mut state, format!("key:{key}"));
        state.trigger_key(key);
        Ok(())
    }

    async fn screenshot(&self, options: &ScreenshotOptions) -> TemplateResult<Vec<u8>> {
        let mut state = self.lock();
        let (entry, failing) = if options.full_page {
            (format!("screenshot:{}", options.name), state.fail_full_page)
        } else {
            (format!("viewport:{}", options.name), state.fail_viewport)
        };
        Self::record(&mut state, entry);
        if failing {
            return Err(TemplateError::page(format!(
                "screenshot '{}' failed",
                options.name
            )));
        }
        Ok(state
            .screenshot_data
            .clone()
            .unwrap_or_else(|| PNG_MAGIC.to_vec()))
    }

    async fn wait_for_timeout(&self, duration: Duration) -> TemplateResult<()> {
        let mut state = self.lock();
        Self::record(&mut state, format!("wait:{}", duration.as_millis()));
        Ok(())
    }
}
