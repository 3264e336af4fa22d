//! Surface-independent core of the labelplay overlay engine
//!
//! - [`mask`]: binary array decoding for segmentation masks
//! - [`labels`]: raw label payload schema
//! - [`readiness`]: the monotonic readiness state machine and prepare gate
//! - [`playback`]: frame addressing and playback-rate derivation
//! - [`config`]: player option persistence

pub mod config;
pub mod labels;
pub mod mask;
pub mod playback;
pub mod readiness;

pub use config::{PlayerOptions, PlayerOptionsExt};
pub use labels::{FetchError, PayloadError, RawLabelPayload};
pub use mask::{MaskArray, MaskError, decode_mask};
pub use playback::{FrameRate, SENTINEL_FRAME, frame_for_index, frame_for_time};
pub use readiness::{ReadinessAction, ReadinessEvent, ReadinessState, prepare_gate};
