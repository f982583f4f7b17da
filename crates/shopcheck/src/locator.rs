//! Lazy element references.
//!
//! A [`Locator`] is only a description of how to find an element: a chain of
//! selector segments, each optionally narrowed to the n-th match. Nothing is
//! queried until the locator is handed to a [`PageDriver`](crate::PageDriver).

use serde::{Deserialize, Serialize};
use std::fmt;

/// State an element can be awaited in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementState {
    /// Attached and rendered
    Visible,
    /// Detached, or attached but not rendered
    Hidden,
    /// Present in the render tree
    Attached,
    /// Absent from the render tree
    Detached,
}

impl fmt::Display for ElementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Visible => "visible",
            Self::Hidden => "hidden",
            Self::Attached => "attached",
            Self::Detached => "detached",
        };
        f.write_str(name)
    }
}

/// One step of a locator chain
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocatorSegment {
    selector: String,
    nth: Option<usize>,
}

impl LocatorSegment {
    /// Selector string of this step
    #[must_use]
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Match index, if narrowed
    #[must_use]
    pub const fn nth(&self) -> Option<usize> {
        self.nth
    }
}

/// A lazy, possibly scoped reference to page elements
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    segments: Vec<LocatorSegment>,
}

impl Locator {
    /// Create a locator from a selector string
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            segments: vec![LocatorSegment {
                selector: selector.into(),
                nth: None,
            }],
        }
    }

    /// Scope a child selector inside this locator
    #[must_use]
    pub fn locator(&self, selector: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(LocatorSegment {
            selector: selector.into(),
            nth: None,
        });
        Self { segments }
    }

    /// Narrow the last step to its `index`-th match
    #[must_use]
    pub fn nth(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        if let Some(last) = segments.last_mut() {
            last.nth = Some(index);
        }
        Self { segments }
    }

    /// Variant of this locator matching `[attribute="value"]` on the last step
    #[must_use]
    pub fn with_attribute(&self, attribute: &str, value: &str) -> Self {
        let mut segments = self.segments.clone();
        if let Some(last) = segments.last_mut() {
            last.selector = format!("{}[{attribute}=\"{value}\"]", last.selector);
        }
        Self { segments }
    }

    /// Selector of the last step
    #[must_use]
    pub fn selector(&self) -> &str {
        self.segments
            .last()
            .map_or("", |segment| segment.selector.as_str())
    }

    /// All steps, outermost first
    #[must_use]
    pub fn segments(&self) -> &[LocatorSegment] {
        &self.segments
    }

    /// True when the locator is scoped inside another
    #[must_use]
    pub fn is_scoped(&self) -> bool {
        self.segments.len() > 1
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(" >> ")?;
            }
            f.write_str(&segment.selector)?;
            if let Some(n) = segment.nth {
                write!(f, " >> nth={n}")?;
            }
        }
        Ok(())
    }
}
