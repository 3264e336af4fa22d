use clap::{Parser, Subcommand, ValueEnum};
use labelplay::ReplContext;
use labelplay::commands;
use labelplay::logging;
use labelplay::readline;
use labelplay_types::MediaKind;
use std::io::Write;

#[tokio::main]
async fn main() -> Result<(), String> {
    logging::init();
    let mut ctx = ReplContext::new();

    loop {
        let Some(line) = readline()? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let result = respond(line, &mut ctx).await;
        commands::flush_events(&mut ctx);
        match result {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                writeln!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    Ok(())
}

#[derive(Parser)]
#[command(version, about = "labelplay")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Video,
    Image,
    Sequence,
    Gallery,
}

impl From<Kind> for MediaKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Video => MediaKind::Video,
            Kind::Image => MediaKind::Image,
            Kind::Sequence => MediaKind::ImageSequence,
            Kind::Gallery => MediaKind::Gallery,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Open a player for media of the given size
    Open {
        #[arg(value_enum)]
        kind: Kind,
        width: u32,
        height: u32,
        /// Frame number for flat object lists without one
        #[arg(short, long)]
        frame: Option<i64>,
    },
    Close,
    Players,
    Use {
        n: usize,
    },
    /// Read a label payload file in the background
    Labels {
        path: String,
    },
    FailLabels {
        #[arg(short, long)]
        status: Option<u16>,
    },
    /// Wait for background label reads
    Wait,
    Ready {
        #[arg(short, long)]
        duration: Option<f64>,
    },
    FailMedia {
        #[arg(short, long)]
        status: Option<u16>,
    },
    Time {
        seconds: f64,
    },
    Frame {
        frame: i64,
    },
    Index {
        index: usize,
    },
    Render {
        #[arg(short, long)]
        out: Option<String>,
    },
    Status,
    Place {
        left: f32,
        top: f32,
        width: f32,
        height: f32,
    },
    Hover {
        x: f32,
        y: f32,
    },
    Leave,
    Click {
        x: f32,
        y: f32,
    },
    Key {
        key: String,
    },
    Options,
    LoadOptions {
        #[arg(short, long)]
        path: Option<String>,
    },
    SaveOptions,
    Set {
        name: String,
        value: String,
    },
    Legend,
    EncodeMask {
        #[arg(short, long)]
        shape: String,
        #[arg(short, long)]
        values: String,
    },
    DecodeMask {
        data: String,
    },
    Exit,
}

async fn respond(line: &str, ctx: &mut ReplContext) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "labelplay".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    match &cli.command {
        Some(Commands::Open {
            kind,
            width,
            height,
            frame,
        }) => commands::open(ctx, (*kind).into(), *width, *height, *frame).await?,
        Some(Commands::Close) => commands::close(ctx)?,
        Some(Commands::Players) => commands::list_players(ctx),
        Some(Commands::Use { n }) => commands::use_player(ctx, *n)?,
        Some(Commands::Labels { path }) => commands::load_labels(ctx, path)?,
        Some(Commands::FailLabels { status }) => commands::fail_labels(ctx, *status).await?,
        Some(Commands::Wait) => commands::wait(ctx).await?,
        Some(Commands::Ready { duration }) => commands::media_ready(ctx, *duration).await?,
        Some(Commands::FailMedia { status }) => commands::media_failed(ctx, *status).await?,
        Some(Commands::Time { seconds }) => commands::time(ctx, *seconds).await?,
        Some(Commands::Frame { frame }) => commands::frame(ctx, *frame)?,
        Some(Commands::Index { index }) => commands::index(ctx, *index)?,
        Some(Commands::Render { out }) => commands::render(ctx, out.as_deref())?,
        Some(Commands::Status) => commands::status(ctx)?,
        Some(Commands::Place {
            left,
            top,
            width,
            height,
        }) => commands::place(ctx, *left, *top, *width, *height)?,
        Some(Commands::Hover { x, y }) => commands::hover(ctx, *x, *y)?,
        Some(Commands::Leave) => commands::leave(ctx)?,
        Some(Commands::Click { x, y }) => commands::click(ctx, *x, *y)?,
        Some(Commands::Key { key }) => commands::key(ctx, key),
        Some(Commands::Options) => commands::show_options(ctx)?,
        Some(Commands::LoadOptions { path }) => commands::load_options(ctx, path.as_deref())?,
        Some(Commands::SaveOptions) => commands::save_options(ctx)?,
        Some(Commands::Set { name, value }) => commands::set_option(ctx, name, value)?,
        Some(Commands::Legend) => commands::legend(ctx)?,
        Some(Commands::EncodeMask { shape, values }) => commands::encode_mask(shape, values)?,
        Some(Commands::DecodeMask { data }) => commands::decode(data)?,
        Some(Commands::Exit) => {
            commands::exit();
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}
