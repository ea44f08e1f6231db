// src/document.rs
// =============================================================================
// A queryable HTML document.
//
// We use the `scraper` crate (built on html5ever) which never fails to
// parse: broken markup is repaired the same way a browser would, and
// elements that aren't there simply don't match a selector.
//
// PageDocument is a thin layer on top of scraper::Html that gives the
// checks the few lookups they need:
// - first element matching a selector
// - all elements matching a selector, in document order
// - attribute reads and whitespace-trimmed text
// =============================================================================

use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

// Compiles a selector that is a constant in this crate.
// A failure here is a typo in our own source, not bad input.
pub fn static_selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid built-in selector {css:?}: {e:?}"))
}

pub static ANCHOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| static_selector("a[href]"));

pub struct PageDocument {
    html: Html,
}

impl PageDocument {
    pub fn parse(body: &str) -> Self {
        Self {
            html: Html::parse_document(body),
        }
    }

    pub fn first(&self, selector: &Selector) -> Option<ElementRef<'_>> {
        self.html.select(selector).next()
    }

    pub fn all<'a>(&'a self, selector: &'a Selector) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        self.html.select(selector)
    }

    // Value of `attr` on the first element matching `selector`, if both exist
    pub fn first_attr(&self, selector: &Selector, attr: &str) -> Option<&str> {
        self.first(selector).and_then(|el| el.value().attr(attr))
    }

    // Every href of every <a href> in document order
    pub fn anchor_hrefs(&self) -> Vec<&str> {
        self.all(&ANCHOR_SELECTOR)
            .filter_map(|el| el.value().attr("href"))
            .collect()
    }
}

// All descendant text of an element joined together and trimmed.
// Inner whitespace between nodes is kept: <h1>Hello <b>World</b></h1> gives
// "Hello World", where stripping each node first would give "HelloWorld".
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is LazyLock?
//    - A value computed the first time it's used, then shared forever
//    - Compiling a CSS selector isn't free, so we do it once per program
//      instead of once per page
//
// 2. Why the lifetime 'a on all()?
//    - The returned ElementRefs point into the parsed tree
//    - The compiler needs to know they can't outlive the PageDocument
//
// 3. scraper::Html is not Send
//    - It can't be held across an .await in a spawned task
//    - Callers parse, extract plain Strings, and drop the document before
//      doing more network I/O
// -----------------------------------------------------------------------------
