use labelplay_core::{PlayerOptions, PlayerOptionsExt};
use labelplay_overlay::{PixmapSurface, Player, PlayerId, PlayerRegistry};
use tokio::task::JoinHandle;

/// State owned by the REPL loop.
///
/// Players live in the registry; fetch tasks complete through its channel
/// and are applied when the loop pumps messages after each command.
pub struct ReplContext {
    pub registry: PlayerRegistry<PixmapSurface>,
    /// Options given to newly opened players
    pub options: PlayerOptions,
    /// Player the pointer/playback commands act on
    pub active: Option<PlayerId>,
    /// Outstanding label fetches
    pub pending: Vec<JoinHandle<()>>,
}

impl ReplContext {
    pub fn new() -> Self {
        Self::with_options(PlayerOptions::load())
    }

    pub fn with_options(options: PlayerOptions) -> Self {
        Self {
            registry: PlayerRegistry::new(),
            options,
            active: None,
            pending: Vec::new(),
        }
    }

    pub fn active_id(&self) -> Result<PlayerId, String> {
        self.active
            .filter(|id| self.registry.contains(*id))
            .ok_or_else(|| "error: no active player, use `open` first".to_string())
    }

    pub fn active_player(&self) -> Result<&Player<PixmapSurface>, String> {
        let id = self.active_id()?;
        self.registry
            .get(id)
            .ok_or_else(|| format!("error: player {id} is gone"))
    }

    pub fn active_player_mut(&mut self) -> Result<&mut Player<PixmapSurface>, String> {
        let id = self.active_id()?;
        self.registry
            .get_mut(id)
            .ok_or_else(|| format!("error: player {id} is gone"))
    }

    /// Drop finished fetch handles
    pub fn reap_pending(&mut self) {
        self.pending.retain(|handle| !handle.is_finished());
    }
}

impl Default for ReplContext {
    fn default() -> Self {
        Self::new()
    }
}
