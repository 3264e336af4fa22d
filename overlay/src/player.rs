//! One annotated media element
//!
//! A [`Player`] ties the readiness state machine to the overlay index, the
//! palette and the engine. The host reports completions (surface mounted,
//! size known, media ready, payload fetched) in any order; the player turns
//! them into at most one index build and the render passes that follow.

use labelplay_core::labels::{FetchError, RawLabelPayload};
use labelplay_core::{
    FrameRate, ReadinessAction, ReadinessEvent, ReadinessState, SENTINEL_FRAME, frame_for_index,
    frame_for_time,
};
use labelplay_types::{MediaKind, PlayerOptions};

use crate::engine::{ClientRect, Engine};
use crate::error::PlayerError;
use crate::index::OverlayIndex;
use crate::overlays::SelectData;
use crate::palette::Palette;
use crate::surface::RenderSurface;
use crate::widgets::colors;

/// Notifications for the host, drained with [`Player::take_events`]
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// A selectable overlay was clicked
    Select(SelectData),
    /// Focus moved to another overlay (or to none)
    FocusChanged(Option<SelectData>),
    /// The media itself could not be loaded
    MediaNotFound { status: Option<u16> },
    /// Building the overlay index failed; nothing will be drawn
    PrepareFailed { reason: String },
    /// A render pass completed
    Rendered { frame: i64, overlays: usize },
}

/// Internal buffer size for media of `media_w` x `media_h` at a fixed width
pub fn surface_size(surface_width: u32, media_w: u32, media_h: u32) -> (u32, u32) {
    if media_w == 0 {
        return (surface_width, 0);
    }
    let height = (surface_width as f64 * media_h as f64 / media_w as f64).round() as u32;
    (surface_width, height.max(1))
}

pub struct Player<S: RenderSurface> {
    media_kind: MediaKind,
    options: PlayerOptions,
    readiness: ReadinessState,
    index: OverlayIndex,
    engine: Engine,
    palette: Palette,
    frame_rate: FrameRate,

    surface: Option<S>,
    client_rect: Option<ClientRect>,
    payload: Option<RawLabelPayload>,
    frame_context: Option<i64>,
    media_size: Option<(u32, u32)>,
    duration: Option<f64>,
    current_frame: i64,
    not_found: Option<Option<u16>>,
    needs_setup: bool,

    events: Vec<PlayerEvent>,
}

impl<S: RenderSurface> Player<S> {
    pub fn new(media_kind: MediaKind, options: PlayerOptions) -> Self {
        let frame_rate = FrameRate::new(options.fps, options.default_fps);
        let palette = Palette::new(options.palette_seed);
        let current_frame = if media_kind.is_frameless() {
            SENTINEL_FRAME
        } else {
            1
        };
        Self {
            media_kind,
            options,
            readiness: ReadinessState::new(),
            index: OverlayIndex::new(),
            engine: Engine::new(),
            palette,
            frame_rate,
            surface: None,
            client_rect: None,
            payload: None,
            frame_context: None,
            media_size: None,
            duration: None,
            current_frame,
            not_found: None,
            needs_setup: true,
            events: Vec::new(),
        }
    }

    /// Bucket for flat object records that carry no frame number
    pub fn with_frame_context(mut self, frame: i64) -> Self {
        self.frame_context = Some(frame);
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn media_kind(&self) -> MediaKind {
        self.media_kind
    }

    pub fn options(&self) -> &PlayerOptions {
        &self.options
    }

    /// Live options; overlays pick up changes on the next draw
    pub fn options_mut(&mut self) -> &mut PlayerOptions {
        &mut self.options
    }

    pub fn readiness(&self) -> &ReadinessState {
        &self.readiness
    }

    pub fn index(&self) -> &OverlayIndex {
        &self.index
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    pub fn current_frame(&self) -> i64 {
        self.current_frame
    }

    /// Playback rate currently used to map time to frames
    pub fn frame_rate(&self) -> f64 {
        self.frame_rate.get()
    }

    pub fn is_media_not_found(&self) -> bool {
        self.not_found.is_some()
    }

    pub fn set_client_rect(&mut self, rect: ClientRect) {
        self.client_rect = Some(rect);
    }

    /// Drain pending host notifications
    pub fn take_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.events)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Readiness
    // ─────────────────────────────────────────────────────────────────────────

    /// Attach the render surface
    pub fn mount_surface(&mut self, mut surface: S) {
        if let Some((w, h)) = self.media_size {
            let (sw, sh) = surface_size(self.options.surface_width, w, h);
            surface.resize(sw, sh);
        }
        self.surface = Some(surface);
        self.needs_setup = true;
        self.apply(ReadinessEvent::SurfaceMounted);
        self.setup_overlays();
    }

    /// Intrinsic media size is known
    pub fn on_size_known(&mut self, width: u32, height: u32) {
        self.media_size = Some((width, height));
        let (sw, sh) = surface_size(self.options.surface_width, width, height);
        if let Some(surface) = &mut self.surface {
            if surface.width() != sw || surface.height() != sh {
                surface.resize(sw, sh);
                self.needs_setup = true;
            }
        }
        self.apply(ReadinessEvent::SizeKnown { width, height });
        self.setup_overlays();
    }

    /// Media can decode frames
    pub fn on_media_ready(&mut self, duration: Option<f64>) {
        self.duration = duration.filter(|d| d.is_finite() && *d > 0.0);
        self.resolve_frame_rate();
        self.apply(ReadinessEvent::MediaDataReady { duration });
    }

    /// The label payload fetch completed
    pub fn on_payload_fetched(&mut self, result: Result<RawLabelPayload, FetchError>) {
        match result {
            Ok(payload) => {
                if self.payload.is_none() {
                    self.payload = Some(payload);
                }
                self.apply(ReadinessEvent::PayloadFetched { available: true });
            }
            Err(err) => {
                tracing::warn!(error = %err, "label payload unavailable, drawing no overlays");
                self.apply(ReadinessEvent::PayloadFetched { available: false });
            }
        }
    }

    /// The media itself failed to load
    pub fn on_media_failed(&mut self, status: Option<u16>) {
        tracing::warn!(?status, "media not found");
        self.not_found = Some(status);
        self.events.push(PlayerEvent::MediaNotFound { status });
        self.render_if_mounted();
    }

    fn apply(&mut self, event: ReadinessEvent) {
        for action in self.readiness.apply(event) {
            match action {
                ReadinessAction::PrepareOverlay => self.prepare_overlay(),
                ReadinessAction::Render => self.render_if_mounted(),
            }
        }
    }

    fn prepare_overlay(&mut self) {
        match self
            .index
            .prepare(self.payload.as_ref(), self.frame_context)
        {
            Ok(Some(_)) => {}
            Ok(None) => return,
            Err(err) => {
                let cause = std::error::Error::source(&err).map(|e| e.to_string());
                tracing::error!(error = %err, ?cause, "overlay index build failed");
                self.events.push(PlayerEvent::PrepareFailed {
                    reason: err.to_string(),
                });
            }
        }
        self.resolve_frame_rate();
        self.setup_overlays();
        self.apply(ReadinessEvent::OverlayPrepared);
    }

    /// Lay out every overlay once the index and a sized surface both exist
    fn setup_overlays(&mut self) {
        if !self.needs_setup || !self.index.is_prepared() || self.media_size.is_none() {
            return;
        }
        let Some(surface) = &mut self.surface else {
            return;
        };
        if surface.width() == 0 || surface.height() == 0 {
            return;
        }
        self.index
            .setup_all(surface, &self.options, &mut self.palette);
        self.needs_setup = false;
    }

    fn resolve_frame_rate(&mut self) {
        if !self.media_kind.is_time_based() {
            return;
        }
        let buckets = self
            .index
            .is_prepared()
            .then(|| self.index.bucket_count());
        self.frame_rate.resolve(buckets, self.duration);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Playback
    // ─────────────────────────────────────────────────────────────────────────

    /// Playback position of time-based media, in seconds
    pub fn set_time(&mut self, seconds: f64) {
        self.resolve_frame_rate();
        self.current_frame = frame_for_time(seconds, self.frame_rate.get());
        self.render_if_mounted();
    }

    /// Current item of an image sequence or gallery (0-based)
    pub fn set_frame_index(&mut self, index: usize) {
        self.current_frame = match self.media_kind {
            MediaKind::Image => SENTINEL_FRAME,
            _ => frame_for_index(index),
        };
        self.render_if_mounted();
    }

    /// Jump straight to a frame number
    pub fn set_frame(&mut self, frame: i64) {
        self.current_frame = frame;
        self.render_if_mounted();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────────────────────────────

    fn render_if_mounted(&mut self) {
        if self.surface.is_some() {
            // Only fails when no surface is mounted
            let _ = self.render();
        }
    }

    /// Draw the current frame. Returns the number of overlays drawn.
    pub fn render(&mut self) -> Result<usize, PlayerError> {
        let Some(surface) = &mut self.surface else {
            return Err(PlayerError::NotRendered);
        };

        if let Some(status) = self.not_found {
            draw_not_found(surface, status);
            return Ok(0);
        }
        if !self.readiness.frame_processing_enabled() || !self.index.is_prepared() {
            return Ok(0);
        }

        let drawn = self.engine.process_frame(
            &mut self.index,
            self.current_frame,
            surface,
            &self.options,
            &mut self.palette,
        );
        self.events.push(PlayerEvent::Rendered {
            frame: self.current_frame,
            overlays: drawn,
        });
        Ok(drawn)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Pointer
    // ─────────────────────────────────────────────────────────────────────────

    fn to_surface(&self, x: f32, y: f32) -> Result<(f32, f32), PlayerError> {
        let surface = self.surface.as_ref().ok_or(PlayerError::NotRendered)?;
        Ok(match &self.client_rect {
            Some(rect) => rect.to_surface(x, y, surface.width(), surface.height()),
            None => (x, y),
        })
    }

    fn focus_changed(&mut self) {
        let data = self.engine.focused_data(&self.index);
        self.events.push(PlayerEvent::FocusChanged(data));
        self.render_if_mounted();
    }

    /// Pointer moved (client coordinates if a client rect is set)
    pub fn pointer_move(&mut self, x: f32, y: f32) -> Result<(), PlayerError> {
        let (x, y) = self.to_surface(x, y)?;
        if self
            .engine
            .pointer_move(&self.index, self.current_frame, x, y, &self.options)
        {
            self.focus_changed();
        }
        Ok(())
    }

    pub fn pointer_leave(&mut self) {
        if self.engine.pointer_leave(&self.options) {
            self.focus_changed();
        }
    }

    /// Click (client coordinates if a client rect is set)
    pub fn click(&mut self, x: f32, y: f32) -> Result<Option<SelectData>, PlayerError> {
        let (x, y) = self.to_surface(x, y)?;
        let (changed, selected) =
            self.engine
                .click(&self.index, self.current_frame, x, y, &self.options);
        if changed {
            self.focus_changed();
        }
        if let Some(data) = &selected {
            tracing::debug!(label = %data.label, index = ?data.index, "overlay selected");
            self.events.push(PlayerEvent::Select(data.clone()));
        }
        Ok(selected)
    }

    /// Cycle focus among overlapping overlays under the pointer
    pub fn rotate_focus(&mut self) -> bool {
        let changed = self
            .engine
            .rotate(&self.index, self.current_frame, &self.options);
        if changed {
            self.focus_changed();
        }
        changed
    }

    /// Keyboard input routed to this player
    pub fn handle_key(&mut self, key: &str) -> bool {
        if key == self.options.rotate_key {
            return self.rotate_focus();
        }
        false
    }
}

fn draw_not_found(surface: &mut dyn RenderSurface, status: Option<u16>) {
    let width = surface.width() as f32;
    let height = surface.height() as f32;
    surface.clear(colors::not_found_bg());

    let text = match status {
        Some(status) => format!("media not found ({status})"),
        None => "media not found".to_string(),
    };
    let font_size = (0.06 * height).clamp(10.0, 32.0);
    let (text_w, _) = surface.measure_text(&text, font_size);
    surface.draw_text(
        &text,
        (width - text_w) / 2.0,
        (height + font_size) / 2.0,
        font_size,
        colors::not_found_text(),
    );
}
