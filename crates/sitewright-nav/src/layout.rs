//! Column geometry.

use serde::{Deserialize, Serialize};

/// Viewport width below which the menu collapses.
pub const DEFAULT_THRESHOLD: f64 = 780.0;
/// Minimum padding at the page edges.
pub const DEFAULT_MIN_PAD: f64 = 20.0;
/// Gap between a navigation column and the content.
pub const DEFAULT_NAV_MARGIN: f64 = 35.0;

/// Fixed constants plus widths measured from the page stylesheet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavMetrics {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_min_pad")]
    pub min_pad: f64,
    #[serde(default = "default_nav_margin")]
    pub nav_margin: f64,

    /// `max-width` of the content container
    pub max_width: f64,
    pub leftnav_width: f64,
    pub rightnav_width: f64,
    /// Table of contents width while it sits in the right column
    pub toc_width: f64,
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_min_pad() -> f64 {
    DEFAULT_MIN_PAD
}

fn default_nav_margin() -> f64 {
    DEFAULT_NAV_MARGIN
}

impl NavMetrics {
    /// Metrics with the default constants and the given measured widths.
    pub fn new(max_width: f64, leftnav_width: f64, rightnav_width: f64, toc_width: f64) -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            min_pad: DEFAULT_MIN_PAD,
            nav_margin: DEFAULT_NAV_MARGIN,
            max_width,
            leftnav_width,
            rightnav_width,
            toc_width,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    /// Menu in the sidebar, table of contents embedded
    Mobile,
    /// Both columns visible but no room for the right one
    Narrow,
    /// Three columns
    Wide,
}

impl LayoutMode {
    pub fn is_nav_embedded(self) -> bool {
        matches!(self, LayoutMode::Mobile | LayoutMode::Narrow)
    }

    pub fn is_collapsed(self) -> bool {
        self == LayoutMode::Mobile
    }
}

/// Computed positions for one viewport width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutState {
    pub mode: LayoutMode,
    /// Content width used for column placement
    pub width: f64,
    /// Content `margin-left`
    pub left: f64,
    pub leftnav_left: f64,
    pub rightnav_left: f64,
    /// Content container `width`
    pub content_width: f64,
}

/// Lay out the columns for a viewport `viewport_width` pixels wide.
pub fn compute_layout(m: &NavMetrics, viewport_width: f64) -> LayoutState {
    let vw = viewport_width;
    let mut width = m
        .max_width
        .min(vw - 2.0 * (m.min_pad + m.nav_margin) - m.leftnav_width - m.rightnav_width);
    let mut left = ((vw - width) / 2.0)
        .min(vw - width - m.nav_margin - m.rightnav_width - m.min_pad)
        .max(m.min_pad + m.leftnav_width + m.nav_margin);

    let mode = if vw < m.threshold {
        width = vw - 2.0 * m.min_pad;
        left = m.min_pad;
        LayoutMode::Mobile
    } else if width < m.max_width - m.nav_margin - m.rightnav_width {
        width = vw - 2.0 * m.min_pad - m.nav_margin - m.leftnav_width;
        LayoutMode::Narrow
    } else {
        LayoutMode::Wide
    };

    let leftnav_x = left - m.nav_margin - m.leftnav_width;
    let (leftnav_left, rightnav_left, content_width) = if leftnav_x <= m.min_pad {
        (
            m.min_pad,
            m.leftnav_width + m.min_pad + width + 2.0 * m.nav_margin,
            width,
        )
    } else {
        (leftnav_x, left + width + m.nav_margin, m.max_width)
    };

    LayoutState {
        mode,
        width,
        left,
        leftnav_left,
        rightnav_left,
        content_width,
    }
}
