//! Responsive navigation for generated documentation pages.
//!
//! A page has a left navigation column (the menu), a right column (the table
//! of contents) and the content container between them. As the viewport
//! narrows the table of contents is embedded into the content, and below a
//! threshold the menu collapses into a slide-out sidebar.
//!
//! Layout math is pure ([`compute_layout`]); [`LayoutController`] turns it
//! into [`DomOp`]s, which a thin browser shim applies through the [`Dom`]
//! trait.

pub mod controller;
pub mod dom;
pub mod layout;
pub mod scroll;

pub use controller::{close_menu, open_menu, toggle_tree, Event, LayoutController, NavState};
pub use dom::{Dom, DomOp, Element, Snapshot, Target};
pub use layout::{compute_layout, LayoutMode, LayoutState, NavMetrics, Viewport};
pub use scroll::{active_index, ScrollTracker, ScrollUpdate};
