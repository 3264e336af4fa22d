//! Explicit registry of live players
//!
//! Players are addressed by generational [`PlayerId`]s. Host completions
//! (fetches, media callbacks) are sent over a channel tagged with the id
//! they were started for and applied in [`PlayerRegistry::pump`]. A message
//! whose player was destroyed in the meantime is dropped instead of
//! reaching a torn-down instance.

use labelplay_core::labels::{FetchError, RawLabelPayload};
use tokio::sync::mpsc::{self, Receiver, Sender};

use crate::player::{Player, PlayerEvent};
use crate::surface::RenderSurface;

const CHANNEL_CAPACITY: usize = 64;

/// Handle to a player slot; stale once the player is destroyed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayerId {
    slot: usize,
    generation: u32,
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}v{}", self.slot, self.generation)
    }
}

/// Completions delivered from the host environment
#[derive(Debug)]
pub enum HostEvent {
    SizeKnown { width: u32, height: u32 },
    MediaReady { duration: Option<f64> },
    PayloadFetched(Result<RawLabelPayload, FetchError>),
    MediaFailed { status: Option<u16> },
    /// Playback position reported by the host's frame callback
    TimeUpdate { seconds: f64 },
}

struct Slot<S: RenderSurface> {
    generation: u32,
    player: Option<Player<S>>,
}

/// Owns every live player plus the host message channel
pub struct PlayerRegistry<S: RenderSurface> {
    slots: Vec<Slot<S>>,
    focused: Option<PlayerId>,
    tx: Sender<(PlayerId, HostEvent)>,
    rx: Receiver<(PlayerId, HostEvent)>,
}

impl<S: RenderSurface> PlayerRegistry<S> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        Self {
            slots: Vec::new(),
            focused: None,
            tx,
            rx,
        }
    }

    /// Register a player, reusing a free slot if one exists
    pub fn create(&mut self, player: Player<S>) -> PlayerId {
        if let Some(slot) = self.slots.iter().position(|s| s.player.is_none()) {
            let entry = &mut self.slots[slot];
            entry.generation = entry.generation.wrapping_add(1);
            entry.player = Some(player);
            let id = PlayerId {
                slot,
                generation: entry.generation,
            };
            tracing::debug!(%id, "player created");
            return id;
        }

        self.slots.push(Slot {
            generation: 0,
            player: Some(player),
        });
        let id = PlayerId {
            slot: self.slots.len() - 1,
            generation: 0,
        };
        tracing::debug!(%id, "player created");
        id
    }

    /// Tear a player down. Later messages for `id` are discarded.
    pub fn destroy(&mut self, id: PlayerId) -> Option<Player<S>> {
        let entry = self.slots.get_mut(id.slot)?;
        if entry.generation != id.generation {
            return None;
        }
        let player = entry.player.take();
        if player.is_some() {
            tracing::debug!(%id, "player destroyed");
        }
        if self.focused == Some(id) {
            self.focused = None;
        }
        player
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player<S>> {
        let entry = self.slots.get(id.slot)?;
        if entry.generation != id.generation {
            return None;
        }
        entry.player.as_ref()
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut Player<S>> {
        let entry = self.slots.get_mut(id.slot)?;
        if entry.generation != id.generation {
            return None;
        }
        entry.player.as_mut()
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.player.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ids(&self) -> Vec<PlayerId> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.player.is_some())
            .map(|(slot, s)| PlayerId {
                slot,
                generation: s.generation,
            })
            .collect()
    }

    /// Sender for host tasks completing work on behalf of a player
    pub fn sender(&self) -> Sender<(PlayerId, HostEvent)> {
        self.tx.clone()
    }

    /// Apply every queued host message. Returns how many were delivered.
    pub fn pump(&mut self) -> usize {
        let mut delivered = 0;
        while let Ok((id, event)) = self.rx.try_recv() {
            if self.dispatch(id, event) {
                delivered += 1;
            }
        }
        delivered
    }

    /// Wait for the next host message and apply it along with any backlog
    pub async fn pump_wait(&mut self) -> usize {
        let Some((id, event)) = self.rx.recv().await else {
            return 0;
        };
        let first = usize::from(self.dispatch(id, event));
        first + self.pump()
    }

    /// Apply one host message. Returns `false` if the player is gone.
    pub fn dispatch(&mut self, id: PlayerId, event: HostEvent) -> bool {
        let Some(player) = self.get_mut(id) else {
            tracing::debug!(%id, ?event, "dropping message for destroyed player");
            return false;
        };
        match event {
            HostEvent::SizeKnown { width, height } => player.on_size_known(width, height),
            HostEvent::MediaReady { duration } => player.on_media_ready(duration),
            HostEvent::PayloadFetched(result) => player.on_payload_fetched(result),
            HostEvent::MediaFailed { status } => player.on_media_failed(status),
            HostEvent::TimeUpdate { seconds } => player.set_time(seconds),
        }
        true
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Keyboard / click routing
    // ─────────────────────────────────────────────────────────────────────────

    /// Route keyboard input to `id` (called when the host sees a click on it)
    pub fn focus_player(&mut self, id: PlayerId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.focused = Some(id);
        true
    }

    pub fn focused(&self) -> Option<PlayerId> {
        self.focused
    }

    /// Forward a key press to the focused player
    pub fn handle_key(&mut self, key: &str) -> bool {
        let Some(id) = self.focused else {
            return false;
        };
        self.get_mut(id).is_some_and(|player| player.handle_key(key))
    }

    /// Collect pending notifications from every player
    pub fn drain_events(&mut self) -> Vec<(PlayerId, PlayerEvent)> {
        let mut events = Vec::new();
        for (slot, entry) in self.slots.iter_mut().enumerate() {
            if let Some(player) = &mut entry.player {
                let id = PlayerId {
                    slot,
                    generation: entry.generation,
                };
                events.extend(player.take_events().into_iter().map(|e| (id, e)));
            }
        }
        events
    }
}

impl<S: RenderSurface> Default for PlayerRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingSurface;
    use labelplay_types::{MediaKind, PlayerOptions};

    fn player() -> Player<RecordingSurface> {
        Player::new(MediaKind::Image, PlayerOptions::default())
    }

    #[test]
    fn test_stale_id_after_reuse() {
        let mut registry = PlayerRegistry::new();
        let first = registry.create(player());
        assert!(registry.destroy(first).is_some());
        let second = registry.create(player());
        assert_ne!(first, second);
        assert!(registry.get(first).is_none());
        assert!(registry.get(second).is_some());
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_late_fetch_is_dropped() {
        let mut registry = PlayerRegistry::new();
        let id = registry.create(player());
        let tx = registry.sender();

        let fetch = tokio::spawn(async move {
            let payload = RawLabelPayload::default();
            tx.send((id, HostEvent::PayloadFetched(Ok(payload))))
                .await
                .unwrap();
        });

        registry.destroy(id);
        fetch.await.unwrap();
        assert_eq!(registry.pump(), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_messages_reach_live_player() {
        let mut registry = PlayerRegistry::new();
        let id = registry.create(player());
        let tx = registry.sender();
        tx.try_send((id, HostEvent::SizeKnown { width: 640, height: 480 }))
            .unwrap();
        tx.try_send((id, HostEvent::PayloadFetched(Ok(RawLabelPayload::default()))))
            .unwrap();
        assert_eq!(registry.pump(), 2);

        let player = registry.get(id).unwrap();
        assert!(player.readiness().is_size_prepared);
        assert!(player.readiness().overlay_can_be_prepared);
    }

    #[test]
    fn test_key_routed_to_focused_player() {
        let mut registry: PlayerRegistry<RecordingSurface> = PlayerRegistry::new();
        let a = registry.create(player());
        assert!(!registry.handle_key("r"));
        assert!(registry.focus_player(a));
        assert_eq!(registry.focused(), Some(a));
        registry.destroy(a);
        assert_eq!(registry.focused(), None);
        assert!(!registry.focus_player(a));
    }

    #[test]
    fn test_media_failure_event_drained() {
        let mut registry = PlayerRegistry::new();
        let id = registry.create(player());
        registry.dispatch(id, HostEvent::MediaFailed { status: Some(404) });
        let events = registry.drain_events();
        assert_eq!(
            events,
            vec![(id, PlayerEvent::MediaNotFound { status: Some(404) })]
        );
    }
}
