//! labelplay overlay library
//!
//! Annotation overlays for media elements: boxes, masks, attribute text and
//! classification lists drawn onto a pixel surface and hit-tested against the
//! pointer.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    registry                         │
//! │        PlayerRegistry, PlayerId, HostEvent          │
//! │       (live players + host message channel)         │
//! ├─────────────────────────────────────────────────────┤
//! │                    player                           │
//! │     readiness gate → index build → render passes    │
//! ├─────────────────────────────────────────────────────┤
//! │              engine          index                  │
//! │     draw order, hit-test    frame → bucket          │
//! ├─────────────────────────────────────────────────────┤
//! │                    overlays/                        │
//! │  Region, FrameMask, FrameAttributes, Classifications│
//! ├─────────────────────────────────────────────────────┤
//! │           widgets/          palette                 │
//! │     HeaderBar, TextPanel    per-key colors          │
//! ├─────────────────────────────────────────────────────┤
//! │              surface + renderer                     │
//! │            tiny-skia + cosmic-text                  │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod engine;
pub mod error;
pub mod index;
pub mod overlays;
pub mod palette;
pub mod player;
pub mod registry;
pub mod renderer;
pub mod surface;
pub mod utils;
pub mod widgets;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use engine::{ClientRect, Engine, FocusState};
pub use error::PlayerError;
pub use index::{OverlayIndex, PrepareSummary};
pub use overlays::{Overlay, OverlayKind, SelectData};
pub use palette::{ColorKey, Palette};
pub use player::{Player, PlayerEvent, surface_size};
pub use registry::{HostEvent, PlayerId, PlayerRegistry};
pub use renderer::{Renderer, colors};
pub use surface::{PixmapSurface, RenderSurface};

// Re-export tiny_skia Color for external use
pub use tiny_skia::Color;
