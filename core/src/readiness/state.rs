//! Monotonic readiness flags and the prepare gate

/// Completion signals reported by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReadinessEvent {
    /// The render surface is attached
    SurfaceMounted,
    /// Intrinsic media size is known
    SizeKnown { width: u32, height: u32 },
    /// Media can decode frames; duration is known for time-based media
    MediaDataReady { duration: Option<f64> },
    /// The label payload arrived (`available == false` on fetch failure)
    PayloadFetched { available: bool },
    /// The overlay index finished building
    OverlayPrepared,
}

/// Work the owner must perform after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessAction {
    /// Build the overlay index (already marked in progress)
    PrepareOverlay,
    /// Run one render pass
    Render,
}

/// Readiness flags for one player instance.
///
/// Every flag only moves from `false` to `true`; nothing is reset for the
/// lifetime of the instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadinessState {
    pub is_rendered: bool,
    pub is_size_prepared: bool,
    pub is_data_loaded: bool,
    pub payload_available: bool,
    pub overlay_can_be_prepared: bool,
    pub is_overlay_prepared: bool,
    pub is_preparing_overlay: bool,
}

/// The prepare gate: content size known and a payload available.
pub fn prepare_gate(state: &ReadinessState) -> bool {
    state.is_size_prepared && state.payload_available
}

impl ReadinessState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event and return the actions it unlocks.
    pub fn apply(&mut self, event: ReadinessEvent) -> Vec<ReadinessAction> {
        let mut actions = Vec::new();

        match event {
            ReadinessEvent::SurfaceMounted => {
                self.is_rendered = true;
                self.evaluate_gate(&mut actions);
            }
            ReadinessEvent::SizeKnown { width, height } => {
                tracing::debug!(width, height, "content size known");
                self.is_size_prepared = true;
                self.evaluate_gate(&mut actions);
            }
            ReadinessEvent::MediaDataReady { duration } => {
                tracing::debug!(?duration, "media data ready");
                self.is_data_loaded = true;
                actions.push(ReadinessAction::Render);
            }
            ReadinessEvent::PayloadFetched { available } => {
                self.payload_available |= available;
                self.evaluate_gate(&mut actions);
            }
            ReadinessEvent::OverlayPrepared => {
                self.is_overlay_prepared = true;
                self.is_preparing_overlay = false;
                actions.push(ReadinessAction::Render);
            }
        }

        actions
    }

    /// Shared gate check run from every transition that could open it.
    fn evaluate_gate(&mut self, actions: &mut Vec<ReadinessAction>) {
        if !prepare_gate(self) {
            return;
        }
        self.overlay_can_be_prepared = true;
        if self.begin_prepare() {
            actions.push(ReadinessAction::PrepareOverlay);
        }
    }

    /// Mark a prepare pass as started.
    ///
    /// Returns `false` (and changes nothing) if the index is already
    /// prepared or a pass is in progress.
    pub fn begin_prepare(&mut self) -> bool {
        if self.is_overlay_prepared || self.is_preparing_overlay {
            return false;
        }
        self.is_preparing_overlay = true;
        true
    }

    /// Frames may only be processed once the media can decode them
    pub fn frame_processing_enabled(&self) -> bool {
        self.is_data_loaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_prepares(actions: &[ReadinessAction]) -> usize {
        actions
            .iter()
            .filter(|a| **a == ReadinessAction::PrepareOverlay)
            .count()
    }

    fn all_orders() -> Vec<Vec<ReadinessEvent>> {
        let events = [
            ReadinessEvent::SurfaceMounted,
            ReadinessEvent::SizeKnown {
                width: 640,
                height: 480,
            },
            ReadinessEvent::PayloadFetched { available: true },
        ];
        let mut orders = Vec::new();
        for a in 0..3 {
            for b in 0..3 {
                for c in 0..3 {
                    if a != b && b != c && a != c {
                        orders.push(vec![events[a], events[b], events[c]]);
                    }
                }
            }
        }
        orders
    }

    #[test]
    fn test_prepare_exactly_once_in_any_order() {
        for order in all_orders() {
            let mut state = ReadinessState::new();
            let mut prepares = 0;
            for event in &order {
                prepares += count_prepares(&state.apply(*event));
            }
            assert_eq!(prepares, 1, "order {:?}", order);
            assert!(state.is_preparing_overlay);
        }
    }

    #[test]
    fn test_repeated_events_do_not_prepare_twice() {
        let mut state = ReadinessState::new();
        state.apply(ReadinessEvent::SizeKnown {
            width: 1,
            height: 1,
        });
        let first = state.apply(ReadinessEvent::PayloadFetched { available: true });
        let second = state.apply(ReadinessEvent::PayloadFetched { available: true });
        assert_eq!(count_prepares(&first), 1);
        assert_eq!(count_prepares(&second), 0);

        state.apply(ReadinessEvent::OverlayPrepared);
        let after = state.apply(ReadinessEvent::SizeKnown {
            width: 1,
            height: 1,
        });
        assert_eq!(count_prepares(&after), 0);
        assert!(state.is_overlay_prepared);
        assert!(!state.is_preparing_overlay);
    }

    #[test]
    fn test_failed_fetch_keeps_gate_closed() {
        let mut state = ReadinessState::new();
        state.apply(ReadinessEvent::SizeKnown {
            width: 1,
            height: 1,
        });
        let actions = state.apply(ReadinessEvent::PayloadFetched { available: false });
        assert!(actions.is_empty());
        assert!(!state.overlay_can_be_prepared);
    }

    #[test]
    fn test_begin_prepare_guards() {
        let mut state = ReadinessState::new();
        assert!(state.begin_prepare());
        assert!(!state.begin_prepare());
        state.apply(ReadinessEvent::OverlayPrepared);
        assert!(!state.begin_prepare());
    }

    #[test]
    fn test_data_ready_enables_frame_processing() {
        let mut state = ReadinessState::new();
        assert!(!state.frame_processing_enabled());
        let actions = state.apply(ReadinessEvent::MediaDataReady { duration: Some(2.0) });
        assert_eq!(actions, vec![ReadinessAction::Render]);
        assert!(state.frame_processing_enabled());
    }
}
