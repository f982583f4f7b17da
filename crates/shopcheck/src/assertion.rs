//! Assertions for template validation.
//!
//! Two layers: [`Assertion`] checks plain values and yields an
//! [`AssertionResult`]; [`Expect`] checks live page state through the
//! [`PageDriver`] and fails with [`TemplateError::AssertionFailed`].

use crate::driver::PageDriver;
use crate::locator::{ElementState, Locator};
use crate::result::{TemplateError, TemplateResult};
use std::fmt::Debug;
use std::time::Duration;

/// Result of an assertion
#[derive(Debug, Clone)]
pub struct AssertionResult {
    /// Whether the assertion passed
    pub passed: bool,
    /// Human-readable message
    pub message: String,
}

impl AssertionResult {
    /// Create a passing assertion result
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            passed: true,
            message: String::new(),
        }
    }

    /// Create a failing assertion result
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
        }
    }

    /// Convert into a `TemplateResult`, failing with the message
    pub fn into_result(self) -> TemplateResult<()> {
        if self.passed {
            Ok(())
        } else {
            Err(TemplateError::assertion(self.message))
        }
    }
}

/// Assertion helpers for plain values
#[derive(Debug)]
pub struct Assertion;

impl Assertion {
    /// Assert two values are equal
    #[must_use]
    pub fn equals<T: PartialEq + Debug>(expected: &T, actual: &T) -> AssertionResult {
        if expected == actual {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("expected {expected:?}, got {actual:?}"))
        }
    }

    /// Assert a string contains a substring
    #[must_use]
    pub fn contains(haystack: &str, needle: &str) -> AssertionResult {
        if haystack.contains(needle) {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("expected '{haystack}' to contain '{needle}'"))
        }
    }

    /// Assert a count is at least `min`
    #[must_use]
    pub fn at_least(actual: usize, min: usize) -> AssertionResult {
        if actual >= min {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("expected at least {min}, got {actual}"))
        }
    }
}

/// Page-state expectation on one locator
#[derive(Debug)]
pub struct Expect<'a> {
    page: &'a dyn PageDriver,
    locator: &'a Locator,
    timeout: Duration,
}

impl<'a> Expect<'a> {
    /// Expect something of `locator`, waiting at most `timeout`
    #[must_use]
    pub fn new(page: &'a dyn PageDriver, locator: &'a Locator, timeout: Duration) -> Self {
        Self {
            page,
            locator,
            timeout,
        }
    }

    async fn reach(&self, state: ElementState) -> TemplateResult<()> {
        match self.page.wait_for(self.locator, state, self.timeout).await {
            Err(TemplateError::Timeout { ms, .. }) => Err(TemplateError::assertion(format!(
                "expected {} to be {state} within {ms}ms",
                self.locator
            ))),
            other => other,
        }
    }

    /// Element becomes visible
    pub async fn to_be_visible(&self) -> TemplateResult<()> {
        self.reach(ElementState::Visible).await
    }

    /// Element becomes hidden or detached
    pub async fn to_be_hidden(&self) -> TemplateResult<()> {
        self.reach(ElementState::Hidden).await
    }

    /// Element's trimmed text equals `expected`
    pub async fn to_have_text(&self, expected: &str) -> TemplateResult<()> {
        let text = self.page.text_content(self.locator).await?.unwrap_or_default();
        Assertion::equals(&expected, &text.trim())
            .into_result()
            .map_err(|e| TemplateError::assertion(format!("text of {}: {e}", self.locator)))
    }

    /// Element's text contains `expected`
    pub async fn to_contain_text(&self, expected: &str) -> TemplateResult<()> {
        let text = self.page.text_content(self.locator).await?.unwrap_or_default();
        Assertion::contains(&text, expected).into_result()
    }

    /// At least `min` elements match
    pub async fn to_have_count_at_least(&self, min: usize) -> TemplateResult<()> {
        let count = self.page.count(self.locator).await?;
        Assertion::at_least(count, min).into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{MockElement, MockPage};

    mod assertion_tests {
        use super::*;

        #[test]
        fn test_equals() {
            assert!(Assertion::equals(&1, &1).passed);
            let failed = Assertion::equals(&"a", &"b");
            assert!(!failed.passed);
            assert!(failed.message.contains("expected"));
        }

        #[test]
        fn test_contains() {
            assert!(Assertion::contains("Delete account?", "Delete").passed);
            assert!(!Assertion::contains("Delete account?", "Keep").passed);
        }

        #[test]
        fn test_at_least() {
            assert!(Assertion::at_least(3, 1).passed);
            assert!(!Assertion::at_least(0, 1).passed);
        }

        #[test]
        fn test_into_result() {
            assert!(AssertionResult::pass().into_result().is_ok());
            let err = AssertionResult::fail("nope").into_result().unwrap_err();
            assert!(matches!(err, TemplateError::AssertionFailed { .. }));
        }
    }

    mod expect_tests {
        use super::*;

        #[tokio::test]
        async fn test_visible_timeout_becomes_assertion() {
            let page = MockPage::new().with_element("#x", MockElement::hidden());
            let locator = Locator::new("#x");
            let err = Expect::new(&page, &locator, Duration::from_millis(10))
                .to_be_visible()
                .await
                .unwrap_err();
            assert!(matches!(err, TemplateError::AssertionFailed { .. }));
            assert!(err.to_string().contains("#x"));
        }

        #[tokio::test]
        async fn test_text_checks() {
            let page =
                MockPage::new().with_element("h2", MockElement::new().with_text("  Login to your account "));
            let locator = Locator::new("h2");
            let expect = Expect::new(&page, &locator, Duration::from_millis(10));
            expect.to_have_text("Login to your account").await.unwrap();
            expect.to_contain_text("your account").await.unwrap();
            assert!(expect.to_have_text("Signup").await.is_err());
        }

        #[tokio::test]
        async fn test_count_at_least() {
            let page = MockPage::new();
            page.insert_all("li", vec![MockElement::new(), MockElement::new()]);
            let locator = Locator::new("li");
            let expect = Expect::new(&page, &locator, Duration::from_millis(10));
            expect.to_have_count_at_least(2).await.unwrap();
            assert!(expect.to_have_count_at_least(3).await.is_err());
        }
    }
}
