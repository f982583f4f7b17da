//! Declarative template actions and validations.
//!
//! Configs attach behaviour by name: an action is an ordered list of
//! [`ActionStep`]s, a validation an ordered list of [`ValidationStep`]s.
//! Element references are checked against the template's selector map when
//! the config is registered, so a typo fails at setup rather than mid-test.
//!
//! String arguments may contain positional placeholders (`{0}`, `{1}`, ...)
//! filled from the arguments passed to `execute_action`.

use crate::locator::ElementState;
use crate::result::{TemplateError, TemplateResult};
use serde::{Deserialize, Serialize};

/// One step of a named action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionStep {
    /// Click a named element
    Click {
        /// Element name from `selectors`
        element: String,
    },
    /// Clear then fill a named element
    Fill {
        /// Element name from `selectors`
        element: String,
        /// Value, may contain placeholders
        value: String,
    },
    /// Clear a named element
    Clear {
        /// Element name from `selectors`
        element: String,
    },
    /// Check a named checkbox
    Check {
        /// Element name from `selectors`
        element: String,
    },
    /// Uncheck a named checkbox
    Uncheck {
        /// Element name from `selectors`
        element: String,
    },
    /// Select an option of a named `<select>`
    Select {
        /// Element name from `selectors`
        element: String,
        /// Option value, may contain placeholders
        value: String,
    },
    /// Press a key on a named element
    Press {
        /// Element name from `selectors`
        element: String,
        /// Key name
        key: String,
    },
    /// Press a key on the page
    Key {
        /// Key name
        key: String,
    },
    /// Wait for a named element to reach a state
    WaitFor {
        /// Element name from `selectors`
        element: String,
        /// Target state
        state: ElementState,
    },
    /// Fixed settle wait
    Settle {
        /// Milliseconds
        ms: u64,
    },
    /// Template screenshot
    Screenshot {
        /// Step label, may contain placeholders
        step: String,
    },
}

impl ActionStep {
    /// Element name this step acts on, if any
    #[must_use]
    pub fn element(&self) -> Option<&str> {
        match self {
            Self::Click { element }
            | Self::Fill { element, .. }
            | Self::Clear { element }
            | Self::Check { element }
            | Self::Uncheck { element }
            | Self::Select { element, .. }
            | Self::Press { element, .. }
            | Self::WaitFor { element, .. } => Some(element),
            Self::Key { .. } | Self::Settle { .. } | Self::Screenshot { .. } => None,
        }
    }

    fn templated(&self) -> Option<&str> {
        match self {
            Self::Fill { value, .. } | Self::Select { value, .. } => Some(value),
            Self::Screenshot { step } => Some(step),
            _ => None,
        }
    }
}

/// One check of a named validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum ValidationStep {
    /// Element is visible
    Visible {
        /// Element name from `selectors`
        element: String,
    },
    /// Element is hidden or detached
    Hidden {
        /// Element name from `selectors`
        element: String,
    },
    /// Trimmed text equals
    TextEquals {
        /// Element name from `selectors`
        element: String,
        /// Expected text, may contain placeholders
        text: String,
    },
    /// Text contains
    TextContains {
        /// Element name from `selectors`
        element: String,
        /// Expected fragment, may contain placeholders
        text: String,
    },
    /// Attribute has a value
    AttributeEquals {
        /// Element name from `selectors`
        element: String,
        /// Attribute name
        attribute: String,
        /// Expected value, may contain placeholders
        value: String,
    },
    /// At least `min` matches
    CountAtLeast {
        /// Element name from `selectors`
        element: String,
        /// Minimum number of matches
        min: usize,
    },
}

impl ValidationStep {
    /// Element name this check inspects
    #[must_use]
    pub fn element(&self) -> &str {
        match self {
            Self::Visible { element }
            | Self::Hidden { element }
            | Self::TextEquals { element, .. }
            | Self::TextContains { element, .. }
            | Self::AttributeEquals { element, .. }
            | Self::CountAtLeast { element, .. } => element,
        }
    }

    fn templated(&self) -> Option<&str> {
        match self {
            Self::TextEquals { text, .. } | Self::TextContains { text, .. } => Some(text),
            Self::AttributeEquals { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// Named action: steps run in order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionSpec {
    /// Steps
    pub steps: Vec<ActionStep>,
}

impl ActionSpec {
    /// Build from steps
    #[must_use]
    pub fn new(steps: Vec<ActionStep>) -> Self {
        Self { steps }
    }
}

/// Named validation: checks run in order, first failure wins
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationSpec {
    /// Checks
    pub steps: Vec<ValidationStep>,
}

impl ValidationSpec {
    /// Build from checks
    #[must_use]
    pub fn new(steps: Vec<ValidationStep>) -> Self {
        Self { steps }
    }
}

/// Element names referenced by an action, plus its placeholder-bearing strings
pub(crate) fn action_references(spec: &ActionSpec) -> impl Iterator<Item = (Option<&str>, Option<&str>)> {
    spec.steps.iter().map(|s| (s.element(), s.templated()))
}

/// Element names referenced by a validation, plus its placeholder-bearing strings
pub(crate) fn validation_references(
    spec: &ValidationSpec,
) -> impl Iterator<Item = (Option<&str>, Option<&str>)> {
    spec.steps.iter().map(|s| (Some(s.element()), s.templated()))
}

/// Highest placeholder index in `template`, if any
pub(crate) fn max_placeholder(template: &str) -> Option<usize> {
    placeholders(template).max()
}

fn placeholders(template: &str) -> impl Iterator<Item = usize> + '_ {
    template.match_indices('{').filter_map(move |(start, _)| {
        let after = &template[start + 1..];
        let end = after.find('}')?;
        let digits = &after[..end];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    })
}

/// Substitute `{N}` placeholders with positional arguments
pub fn expand_args(template: &str, args: &[&str]) -> TemplateResult<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let index = after.find('}').and_then(|end| {
            let digits = &after[..end];
            (!digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
                .then(|| digits.parse::<usize>().ok().map(|i| (i, end)))
                .flatten()
        });
        match index {
            Some((i, end)) => {
                let arg = args.get(i).ok_or_else(|| {
                    TemplateError::configuration(format!(
                        "placeholder {{{i}}} in '{template}' but only {} argument(s) supplied",
                        args.len()
                    ))
                })?;
                out.push_str(arg);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    Ok(out)
}
