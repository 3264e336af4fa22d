//! Reusable drawing widgets for overlays
//!
//! Widgets render onto any [`RenderSurface`](crate::surface::RenderSurface).
//!
//! # Available Widgets
//!
//! - [`HeaderBar`] - Colored label bar with an optional right-aligned index
//! - [`TextPanel`] - Block of text lines on a translucent background

pub mod colors;
mod header;
mod text_panel;

pub use colors::*;
pub use header::{HEADER_FIXED_PADDING, HeaderBar};
pub use text_panel::{PanelBounds, TextPanel};
