use std::path::{Path, PathBuf};

use labelplay_core::mask::{decode_mask, encode_u8_mask};
use labelplay_core::{FetchError, PlayerOptions, PlayerOptionsExt, RawLabelPayload};
use labelplay_overlay::{
    ClientRect, HostEvent, PixmapSurface, Player, PlayerEvent, RenderSurface, SelectData,
};
use labelplay_types::{InteractionMode, MediaKind};

use crate::context::ReplContext;

// ─────────────────────────────────────────────────────────────────────────────
// Players
// ─────────────────────────────────────────────────────────────────────────────

/// Create a player, mount a surface and report the media size
pub async fn open(
    ctx: &mut ReplContext,
    kind: MediaKind,
    width: u32,
    height: u32,
    frame: Option<i64>,
) -> Result<(), String> {
    let mut player = Player::new(kind, ctx.options.clone());
    if let Some(frame) = frame {
        player = player.with_frame_context(frame);
    }
    player.mount_surface(PixmapSurface::new(0, 0));

    let id = ctx.registry.create(player);
    ctx.registry.focus_player(id);
    ctx.active = Some(id);

    ctx.registry
        .sender()
        .send((id, HostEvent::SizeKnown { width, height }))
        .await
        .map_err(|e| e.to_string())?;
    println!("opened player {id} ({kind:?}, {width}x{height})");
    Ok(())
}

pub fn close(ctx: &mut ReplContext) -> Result<(), String> {
    let id = ctx.active_id()?;
    ctx.registry.destroy(id);
    ctx.active = ctx.registry.ids().last().copied();
    if let Some(next) = ctx.active {
        ctx.registry.focus_player(next);
    }
    println!("closed player {id}");
    Ok(())
}

pub fn list_players(ctx: &ReplContext) {
    let ids = ctx.registry.ids();
    if ids.is_empty() {
        println!("no players");
        return;
    }
    for (n, id) in ids.iter().enumerate() {
        let marker = if ctx.active == Some(*id) { "*" } else { " " };
        let kind = ctx
            .registry
            .get(*id)
            .map(|p| format!("{:?}", p.media_kind()))
            .unwrap_or_default();
        println!("{marker} [{n}] {id} {kind}");
    }
}

/// Make the `n`th listed player active and route keys to it
pub fn use_player(ctx: &mut ReplContext, n: usize) -> Result<(), String> {
    let id = *ctx
        .registry
        .ids()
        .get(n)
        .ok_or_else(|| format!("error: no player [{n}]"))?;
    ctx.registry.focus_player(id);
    ctx.active = Some(id);
    println!("active player {id}");
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Host signals
// ─────────────────────────────────────────────────────────────────────────────

/// Start reading a label file in the background.
///
/// The result is delivered through the registry channel, so a player closed
/// before the read finishes never sees it.
pub fn load_labels(ctx: &mut ReplContext, path: &str) -> Result<(), String> {
    let id = ctx.active_id()?;
    let tx = ctx.registry.sender();
    let path = PathBuf::from(path);

    let handle = tokio::spawn(async move {
        let result = fetch_payload(&path).await;
        if let Err(err) = &result {
            tracing::warn!(path = %path.display(), error = %err, "label fetch failed");
        }
        if tx.send((id, HostEvent::PayloadFetched(result))).await.is_err() {
            tracing::debug!(%id, "registry closed before fetch completed");
        }
    });
    ctx.pending.push(handle);
    println!("loading labels for {id}");
    Ok(())
}

async fn fetch_payload(path: &Path) -> Result<RawLabelPayload, FetchError> {
    let text = tokio::fs::read_to_string(path).await.map_err(|e| FetchError {
        status: (e.kind() == std::io::ErrorKind::NotFound).then_some(404),
        message: e.to_string(),
    })?;
    RawLabelPayload::from_json(&text).map_err(|e| FetchError {
        status: None,
        message: e.to_string(),
    })
}

/// Wait for every outstanding fetch, then apply the results
pub async fn wait(ctx: &mut ReplContext) -> Result<(), String> {
    for handle in std::mem::take(&mut ctx.pending) {
        handle.await.map_err(|e| e.to_string())?;
    }
    let delivered = ctx.registry.pump();
    println!("delivered {delivered} host messages");
    Ok(())
}

pub async fn media_ready(ctx: &mut ReplContext, duration: Option<f64>) -> Result<(), String> {
    send(ctx, HostEvent::MediaReady { duration }).await
}

pub async fn media_failed(ctx: &mut ReplContext, status: Option<u16>) -> Result<(), String> {
    send(ctx, HostEvent::MediaFailed { status }).await
}

pub async fn fail_labels(ctx: &mut ReplContext, status: Option<u16>) -> Result<(), String> {
    let err = FetchError {
        status,
        message: "fetch failed".to_string(),
    };
    send(ctx, HostEvent::PayloadFetched(Err(err))).await
}

pub async fn time(ctx: &mut ReplContext, seconds: f64) -> Result<(), String> {
    send(ctx, HostEvent::TimeUpdate { seconds }).await
}

async fn send(ctx: &mut ReplContext, event: HostEvent) -> Result<(), String> {
    let id = ctx.active_id()?;
    ctx.registry
        .sender()
        .send((id, event))
        .await
        .map_err(|e| e.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Playback
// ─────────────────────────────────────────────────────────────────────────────

pub fn frame(ctx: &mut ReplContext, frame: i64) -> Result<(), String> {
    ctx.active_player_mut()?.set_frame(frame);
    Ok(())
}

pub fn index(ctx: &mut ReplContext, index: usize) -> Result<(), String> {
    let player = ctx.active_player_mut()?;
    player.set_frame_index(index);
    println!("frame {}", player.current_frame());
    Ok(())
}

/// Render the current frame, optionally writing it to a PNG
pub fn render(ctx: &mut ReplContext, out: Option<&str>) -> Result<(), String> {
    let player = ctx.active_player_mut()?;
    let drawn = player.render().map_err(|e| e.to_string())?;
    println!("frame {}: {drawn} overlays", player.current_frame());

    if let Some(out) = out {
        let surface = player.surface().ok_or("error: surface not mounted")?;
        surface
            .save_png(Path::new(out))
            .map_err(|e| format!("error: {e}"))?;
        println!("wrote {out} ({}x{})", surface.width(), surface.height());
    }
    Ok(())
}

pub fn status(ctx: &ReplContext) -> Result<(), String> {
    let id = ctx.active_id()?;
    let player = ctx.active_player()?;
    let readiness = player.readiness();
    println!("player {id} ({:?})", player.media_kind());
    println!(
        "  rendered={} sized={} data={} payload={} prepared={}",
        readiness.is_rendered,
        readiness.is_size_prepared,
        readiness.is_data_loaded,
        readiness.payload_available,
        readiness.is_overlay_prepared
    );
    if let Some(surface) = player.surface() {
        println!("  surface {}x{}", surface.width(), surface.height());
    }
    println!(
        "  frame {} at {} fps, {} buckets, {} overlays",
        player.current_frame(),
        player.frame_rate(),
        player.index().bucket_count(),
        player.index().overlay_count()
    );
    if player.is_media_not_found() {
        println!("  media not found");
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Pointer / keyboard
// ─────────────────────────────────────────────────────────────────────────────

/// Place the element on the page; pointer coordinates are page coordinates
pub fn place(ctx: &mut ReplContext, left: f32, top: f32, width: f32, height: f32) -> Result<(), String> {
    ctx.active_player_mut()?
        .set_client_rect(ClientRect::new(left, top, width, height));
    Ok(())
}

pub fn hover(ctx: &mut ReplContext, x: f32, y: f32) -> Result<(), String> {
    ctx.active_player_mut()?
        .pointer_move(x, y)
        .map_err(|e| e.to_string())
}

pub fn leave(ctx: &mut ReplContext) -> Result<(), String> {
    ctx.active_player_mut()?.pointer_leave();
    Ok(())
}

pub fn click(ctx: &mut ReplContext, x: f32, y: f32) -> Result<(), String> {
    let id = ctx.active_id()?;
    ctx.registry.focus_player(id);
    let selected = ctx
        .active_player_mut()?
        .click(x, y)
        .map_err(|e| e.to_string())?;
    if selected.is_none() {
        println!("nothing selected");
    }
    Ok(())
}

pub fn key(ctx: &mut ReplContext, key: &str) {
    if !ctx.registry.handle_key(key) {
        println!("key '{key}' ignored");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Options
// ─────────────────────────────────────────────────────────────────────────────

/// Load options from a TOML file, or the user store when no path is given
pub fn load_options(ctx: &mut ReplContext, path: Option<&str>) -> Result<(), String> {
    let options = match path {
        Some(path) => PlayerOptions::load_from(Path::new(path)).map_err(|e| format!("error: {e}"))?,
        None => PlayerOptions::load(),
    };
    ctx.options = options.clone();
    if let Ok(player) = ctx.active_player_mut() {
        *player.options_mut() = options;
    }
    show_options(ctx)
}

pub fn save_options(ctx: &ReplContext) -> Result<(), String> {
    ctx.options.save().map_err(|e| format!("error: {e}"))?;
    println!("options saved");
    Ok(())
}

pub fn show_options(ctx: &ReplContext) -> Result<(), String> {
    let options = match ctx.active_player() {
        Ok(player) => player.options(),
        Err(_) => &ctx.options,
    };
    let text = serde_json::to_string_pretty(options).map_err(|e| e.to_string())?;
    println!("{text}");
    Ok(())
}

/// Change one option on the active player (and for players opened later)
pub fn set_option(ctx: &mut ReplContext, name: &str, value: &str) -> Result<(), String> {
    apply_option(&mut ctx.options, name, value)?;
    if let Ok(player) = ctx.active_player_mut() {
        apply_option(player.options_mut(), name, value)?;
    }
    Ok(())
}

pub fn apply_option(options: &mut PlayerOptions, name: &str, value: &str) -> Result<(), String> {
    let flag = || {
        value
            .parse::<bool>()
            .map_err(|_| format!("error: '{value}' is not true/false"))
    };
    match name {
        "interaction" => {
            options.interaction = match value {
                "hover" => InteractionMode::Hover,
                "click" => InteractionMode::Click,
                _ => return Err(format!("error: unknown interaction mode '{value}'")),
            }
        }
        "only_show_focused" => options.only_show_focused = flag()?,
        "show_attrs" => options.show_attrs = flag()?,
        "attrs_as_pairs" => options.attrs_as_pairs = flag()?,
        "show_confidence" => options.show_confidence = flag()?,
        "show_index" => options.show_index = flag()?,
        "focus_outside_fallback" => options.focus_outside_fallback = flag()?,
        "mask_alpha" => {
            options.mask_alpha = value
                .parse()
                .map_err(|_| format!("error: '{value}' is not 0-255"))?
        }
        "fps" => {
            options.fps = match value {
                "auto" => None,
                _ => Some(
                    value
                        .parse()
                        .map_err(|_| format!("error: '{value}' is not a number"))?,
                ),
            }
        }
        "active_labels" => {
            options.active_labels = match value {
                "all" => None,
                _ => Some(value.split(',').map(|s| s.trim().to_string()).collect()),
            }
        }
        "rotate_key" => options.rotate_key = value.to_string(),
        _ => return Err(format!("error: unknown option '{name}'")),
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Masks
// ─────────────────────────────────────────────────────────────────────────────

/// List named mask labels of the active player
pub fn legend(ctx: &ReplContext) -> Result<(), String> {
    let player = ctx.active_player()?;
    let named = player.index().mask_index().names();
    if named.is_empty() {
        println!("no named mask labels");
    }
    for (label, name) in named {
        println!("{label:>3} {name}");
    }
    Ok(())
}

pub fn encode_mask(shape: &str, values: &str) -> Result<(), String> {
    let shape = parse_list::<usize>(shape)?;
    let values = parse_list::<u8>(values)?;
    let expected: usize = shape.iter().product();
    if values.len() != expected {
        return Err(format!(
            "error: shape needs {expected} values, got {}",
            values.len()
        ));
    }
    let encoded = encode_u8_mask(&shape, &values).map_err(|e| e.to_string())?;
    println!("{encoded}");
    Ok(())
}

pub fn decode(data: &str) -> Result<(), String> {
    let array = decode_mask(data).map_err(|e| format!("error: {e}"))?;
    println!("shape {:?}", array.shape);
    println!("{:?}", array.data.to_i64_vec());
    Ok(())
}

fn parse_list<T: std::str::FromStr>(text: &str) -> Result<Vec<T>, String> {
    text.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| {
            s.trim()
                .parse()
                .map_err(|_| format!("error: invalid list entry '{}'", s.trim()))
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

/// Apply queued host messages and print player notifications
pub fn flush_events(ctx: &mut ReplContext) {
    ctx.reap_pending();
    ctx.registry.pump();
    for (id, event) in ctx.registry.drain_events() {
        if let Some(line) = describe_event(&event) {
            println!("[{id}] {line}");
        }
    }
}

pub fn describe_event(event: &PlayerEvent) -> Option<String> {
    match event {
        PlayerEvent::Select(data) => Some(format!("select {}", describe_selection(data))),
        PlayerEvent::FocusChanged(Some(data)) => {
            Some(format!("focus {}", describe_selection(data)))
        }
        PlayerEvent::FocusChanged(None) => Some("focus cleared".to_string()),
        PlayerEvent::MediaNotFound { status } => match status {
            Some(status) => Some(format!("media not found ({status})")),
            None => Some("media not found".to_string()),
        },
        PlayerEvent::PrepareFailed { reason } => Some(format!("prepare failed: {reason}")),
        PlayerEvent::Rendered { .. } => None,
    }
}

fn describe_selection(data: &SelectData) -> String {
    let mut text = data.label.clone();
    if let Some(index) = data.index {
        text.push_str(&format!(" #{index}"));
    }
    if let Some(frame) = data.frame_number {
        text.push_str(&format!(" @{frame}"));
    }
    if let Some(conf) = data.confidence {
        text.push_str(&format!(" ({conf:.2})"));
    }
    text
}

pub fn exit() {
    println!("quitting...");
}
