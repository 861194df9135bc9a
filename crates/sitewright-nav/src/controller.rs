//! Event handling for the navigation columns.

use crate::dom::{Dom, DomOp, Element, Snapshot, Target};
use crate::layout::{compute_layout, NavMetrics};
use crate::scroll::{ScrollTracker, ScrollUpdate};

/// Overlay stacking while the sidebar is open.
const OVERLAY_OPEN_Z: &str = "999";
const OVERLAY_CLOSED_Z: &str = "-1000";
/// Sidebar close animation length.
const CLOSE_DELAY_MS: u32 = 500;
const TREE_TOGGLE_MS: u32 = 300;
/// Space kept below the navigation columns.
const NAV_HEIGHT_MARGIN: f64 = 60.0;

/// Where the table of contents and the menu currently live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavState {
    /// Table of contents moved into the content column
    pub is_nav_embedded: bool,
    /// Menu moved into the slide-out sidebar
    pub is_collapsed: bool,
}

/// Page events the controller reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Load,
    Resize,
    Scroll,
    /// Click on the n-th tree toggler
    ToggleTree(usize),
    OpenMenu,
    CloseMenu,
}

/// Per-page navigation state; construct once when the page loads.
#[derive(Debug, Clone)]
pub struct LayoutController {
    metrics: NavMetrics,
    state: NavState,
    scroll: ScrollTracker,
}

impl LayoutController {
    pub fn new(metrics: NavMetrics, anchor_tops: &[f64]) -> Self {
        Self {
            metrics,
            state: NavState::default(),
            scroll: ScrollTracker::new(anchor_tops),
        }
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    /// Read the page, handle `event` and apply the resulting operations.
    pub fn dispatch<D: Dom>(&mut self, dom: &mut D, event: Event) {
        let ops = match event {
            Event::Load => self.load(&dom.snapshot()),
            Event::Resize => self.on_resize(&dom.snapshot()),
            Event::Scroll => self.on_scroll(&dom.snapshot()),
            Event::ToggleTree(index) => toggle_tree(index, &dom.toggler_text(index)),
            Event::OpenMenu => open_menu(),
            Event::CloseMenu => close_menu(),
        };
        if !ops.is_empty() {
            dom.apply(&ops);
        }
    }

    /// Initial layout, then reveal whichever columns are in use.
    pub fn load(&mut self, page: &Snapshot) -> Vec<DomOp> {
        let mut ops = self.update(page);
        if !self.state.is_collapsed {
            ops.push(DomOp::display(Element::Leftnav, true));
        }
        if !self.state.is_nav_embedded {
            ops.push(DomOp::display(Element::Rightnav, true));
        }
        ops
    }

    /// Lay out the columns for the current viewport.
    ///
    /// The table of contents and the menu are only moved when the layout
    /// mode actually changes.
    pub fn update(&mut self, page: &Snapshot) -> Vec<DomOp> {
        let m = &self.metrics;
        let layout = compute_layout(m, page.viewport.width);
        let mut ops = Vec::new();
        let before = self.state;

        let embed = layout.mode.is_nav_embedded();
        if embed != self.state.is_nav_embedded {
            if embed {
                ops.push(DomOp::Move {
                    node: Element::Toc,
                    parent: Element::EmbeddedNav,
                });
                ops.push(DomOp::style(Element::Toc, "width", "auto"));
                ops.push(DomOp::display(Element::Rightnav, false));
            } else {
                ops.push(DomOp::Move {
                    node: Element::Toc,
                    parent: Element::Rightnav,
                });
                ops.push(DomOp::px(Element::Toc, "width", m.toc_width));
                ops.push(DomOp::display(Element::Rightnav, true));
            }
            self.state.is_nav_embedded = embed;
        }

        let collapse = layout.mode.is_collapsed();
        if collapse != self.state.is_collapsed {
            if collapse {
                ops.push(DomOp::Move {
                    node: Element::Menu,
                    parent: Element::Sidebar,
                });
                ops.push(DomOp::display(Element::Header, true));
                ops.push(DomOp::display(Element::Leftnav, false));
                ops.push(DomOp::px(Element::Container, "margin-top", 65.0));
            } else {
                ops.push(DomOp::Move {
                    node: Element::Menu,
                    parent: Element::Leftnav,
                });
                ops.push(DomOp::display(Element::Header, false));
                ops.push(DomOp::display(Element::Leftnav, true));
                ops.push(DomOp::px(Element::Container, "margin-top", 0.0));
            }
            self.state.is_collapsed = collapse;
        }

        if self.state != before {
            tracing::debug!("{:?} layout at {}px", layout.mode, page.viewport.width);
        }

        ops.push(DomOp::px(Element::Leftnav, "left", layout.leftnav_left));
        ops.push(DomOp::px(Element::Rightnav, "left", layout.rightnav_left));
        ops.push(DomOp::px(Element::Container, "width", layout.content_width));
        ops.push(DomOp::px(Element::Container, "margin-left", layout.left));
        ops.extend(nav_heights(page));
        ops
    }

    /// Re-layout and scroll back to the section the reader was in.
    pub fn on_resize(&mut self, page: &Snapshot) -> Vec<DomOp> {
        let mut ops = self.update(page);
        let y = self.scroll.restore_position(&page.anchor_tops);
        ops.push(DomOp::ScrollTo { y });
        ops
    }

    /// Highlight the link of the section at the top of the viewport.
    pub fn on_scroll(&mut self, page: &Snapshot) -> Vec<DomOp> {
        let mut ops = Vec::new();
        match self.scroll.on_scroll(&page.anchor_tops, page.scroll) {
            ScrollUpdate::Ignored => return ops,
            ScrollUpdate::Unchanged(_) => {}
            ScrollUpdate::Changed { from, to } => {
                ops.push(DomOp::RemoveClass {
                    target: Target::NavLink(from),
                    class: "active",
                });
                ops.push(DomOp::AddClass {
                    target: Target::NavLink(to),
                    class: "active",
                });
            }
        }
        ops.extend(nav_heights(page));
        ops
    }
}

/// Keep both columns above the footer and inside the viewport.
fn nav_heights(page: &Snapshot) -> [DomOp; 2] {
    let height = (page.footer_top - page.scroll).min(page.viewport.height - 5.0) - NAV_HEIGHT_MARGIN;
    [
        DomOp::px(Element::Leftnav, "max-height", height),
        DomOp::px(Element::Rightnav, "max-height", height),
    ]
}

/// Flip a tree toggler between `+` and `-` and slide its subtree.
pub fn toggle_tree(index: usize, current_text: &str) -> Vec<DomOp> {
    let text = if current_text == "+" { "-" } else { "+" };
    vec![
        DomOp::SetText {
            target: Target::TreeToggler(index),
            text: text.to_string(),
        },
        DomOp::Toggle {
            target: Target::Tree(index),
            duration_ms: TREE_TOGGLE_MS,
        },
    ]
}

pub fn open_menu() -> Vec<DomOp> {
    vec![
        DomOp::style(Element::Overlay, "z-index", OVERLAY_OPEN_Z),
        DomOp::AddClass {
            target: Element::Sidebar.into(),
            class: "toggled",
        },
        DomOp::AddClass {
            target: Element::Overlay.into(),
            class: "toggled",
        },
    ]
}

pub fn close_menu() -> Vec<DomOp> {
    vec![
        DomOp::RemoveClass {
            target: Element::Sidebar.into(),
            class: "toggled",
        },
        DomOp::RemoveClass {
            target: Element::Overlay.into(),
            class: "toggled",
        },
        DomOp::Delayed {
            delay_ms: CLOSE_DELAY_MS,
            then: Box::new(DomOp::style(Element::Overlay, "z-index", OVERLAY_CLOSED_Z)),
        },
    ]
}
