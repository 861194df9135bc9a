//! Page elements and the operations applied to them.

use serde::Serialize;

use crate::layout::Viewport;

/// Elements the controller manipulates, by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Header,
    Leftnav,
    Rightnav,
    Container,
    EmbeddedNav,
    Menu,
    Toc,
    Overlay,
    Sidebar,
    Footer,
}

impl Element {
    /// CSS selector, e.g. `#embedded_nav`.
    pub fn selector(self) -> &'static str {
        match self {
            Element::Header => "#header",
            Element::Leftnav => "#leftnav",
            Element::Rightnav => "#rightnav",
            Element::Container => "#container",
            Element::EmbeddedNav => "#embedded_nav",
            Element::Menu => "#menu",
            Element::Toc => "#toc",
            Element::Overlay => "#overlay",
            Element::Sidebar => "#sidebar",
            Element::Footer => "#footer",
        }
    }
}

/// What an operation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Target {
    Element(Element),
    /// The n-th link in the right navigation column
    NavLink(usize),
    /// The n-th `label.tree-toggler`
    TreeToggler(usize),
    /// The `ul.tree` belonging to the n-th toggler
    Tree(usize),
}

impl From<Element> for Target {
    fn from(element: Element) -> Self {
        Target::Element(element)
    }
}

/// A single DOM mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DomOp {
    /// Detach `node` and append it to `parent`
    Move { node: Element, parent: Element },
    SetStyle {
        target: Target,
        property: &'static str,
        value: String,
    },
    AddClass { target: Target, class: &'static str },
    RemoveClass { target: Target, class: &'static str },
    SetText { target: Target, text: String },
    /// Slide the target in or out
    Toggle { target: Target, duration_ms: u32 },
    ScrollTo { y: f64 },
    /// Apply `then` after `delay_ms`
    Delayed { delay_ms: u32, then: Box<DomOp> },
}

impl DomOp {
    pub fn style(target: impl Into<Target>, property: &'static str, value: impl Into<String>) -> Self {
        DomOp::SetStyle {
            target: target.into(),
            property,
            value: value.into(),
        }
    }

    /// A pixel-valued style.
    pub fn px(target: impl Into<Target>, property: &'static str, value: f64) -> Self {
        Self::style(target, property, format!("{}px", value))
    }

    pub fn display(element: Element, visible: bool) -> Self {
        Self::style(element, "display", if visible { "block" } else { "none" })
    }
}

/// Measurements read from the page before handling an event.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub viewport: Viewport,
    pub scroll: f64,
    /// Document offset of `#footer`
    pub footer_top: f64,
    /// Document offsets of the anchors the right column links to, in order
    pub anchor_tops: Vec<f64>,
}

/// The page, as seen by the controller.
pub trait Dom {
    fn snapshot(&self) -> Snapshot;

    /// Current text of the n-th tree toggler.
    fn toggler_text(&self, index: usize) -> String;

    fn apply(&mut self, ops: &[DomOp]);
}
