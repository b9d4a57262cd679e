//! Core types for element location and waiting

use std::fmt;

/// How a text selector compares against an element's visible text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMatch {
    /// Case-insensitive substring match on whitespace-normalised text.
    Contains,
    /// JavaScript regular expression tested against the normalised text.
    Regex,
}

/// Element selection strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Css(String),
    XPath(String),
    /// Deepest elements whose visible text matches.
    Text { text: String, matching: TextMatch },
}

impl Selector {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Selector::Css(_) => "css",
            Selector::XPath(_) => "xpath",
            Selector::Text { .. } => "text",
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Css(css) => write!(f, "css={css}"),
            Selector::XPath(xpath) => write!(f, "xpath={xpath}"),
            Selector::Text {
                text,
                matching: TextMatch::Regex,
            } => write!(f, "text=/{text}/"),
            Selector::Text { text, .. } => write!(f, "text={text}"),
        }
    }
}

/// Which of several matches a locator resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pick {
    #[default]
    First,
    Last,
    Nth(usize),
}

/// Lazily-resolved element reference.
///
/// A locator is resolved inside the page every time it is used, so it stays
/// valid across re-renders. Nested locators search only inside the element
/// their parent resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub selector: Selector,
    pub pick: Pick,
    pub parent: Option<Box<Locator>>,
}

impl Locator {
    pub fn new(selector: Selector) -> Self {
        Self {
            selector,
            pick: Pick::First,
            parent: None,
        }
    }

    pub fn css(css: impl Into<String>) -> Self {
        Self::new(Selector::Css(css.into()))
    }

    pub fn xpath(xpath: impl Into<String>) -> Self {
        Self::new(Selector::XPath(xpath.into()))
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(Selector::Text {
            text: text.into(),
            matching: TextMatch::Contains,
        })
    }

    pub fn text_regex(pattern: impl Into<String>) -> Self {
        Self::new(Selector::Text {
            text: pattern.into(),
            matching: TextMatch::Regex,
        })
    }

    /// Child locator scoped to the element this locator resolves to.
    pub fn locate(&self, child: Locator) -> Locator {
        let mut child = child;
        child.parent = Some(Box::new(match child.parent.take() {
            Some(inner) => inner.rebase(self),
            None => self.clone(),
        }));
        child
    }

    fn rebase(self, root: &Locator) -> Locator {
        root.locate(self)
    }

    pub fn first(mut self) -> Self {
        self.pick = Pick::First;
        self
    }

    pub fn last(mut self) -> Self {
        self.pick = Pick::Last;
        self
    }

    pub fn nth(mut self, index: usize) -> Self {
        self.pick = Pick::Nth(index);
        self
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = &self.parent {
            write!(f, "{parent} >> ")?;
        }
        write!(f, "{}", self.selector)?;
        match self.pick {
            Pick::First => Ok(()),
            Pick::Last => write!(f, " >> last"),
            Pick::Nth(index) => write!(f, " >> nth={index}"),
        }
    }
}

/// Element state awaited by `wait_for`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitState {
    /// Present in the DOM.
    #[default]
    Attached,
    /// Absent from the DOM.
    Detached,
    /// Present with a non-empty box and not hidden by style.
    Visible,
    /// Absent or not visible.
    Hidden,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_locators_render_outermost_first() {
        let row = Locator::xpath("//div[@class='row']").nth(2);
        let button = row.locate(Locator::css("button").last());
        assert_eq!(
            button.to_string(),
            "xpath=//div[@class='row'] >> nth=2 >> css=button >> last"
        );
    }

    #[test]
    fn locate_keeps_existing_scope_under_new_root() {
        let panel = Locator::css("#panel");
        let list = Locator::css("ul").locate(Locator::text("Barracks"));
        let scoped = panel.locate(list);
        assert_eq!(scoped.to_string(), "css=#panel >> css=ul >> text=Barracks");
    }

    #[test]
    fn text_selectors_show_their_matching_mode() {
        assert_eq!(Locator::text("Log in").to_string(), "text=Log in");
        assert_eq!(Locator::text_regex("^Select all").to_string(), "text=/^Select all/");
    }
}
