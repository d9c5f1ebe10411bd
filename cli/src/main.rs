mod connection;
mod report;

use std::time::Duration;

use canvas::engine::Action;
use canvas::input::{Button, ToolConfig};
use canvas::raster::Raster;
use canvas::session::ClientSession;
use clap::{Args, Parser, Subcommand};
use frames::{ClientMessage, DashStyle, Point, ServerMessage, Tool};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use connection::Connector;

/// Size of the headless participant's local board.
const BOARD_WIDTH: u32 = 1280;
const BOARD_HEIGHT: u32 = 800;
const BOARD_BACKGROUND: &str = canvas::consts::BACKGROUND_LIGHT;

/// How long one-shot commands wait for the server.
const REPLY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("websocket failed: {0}")]
    Ws(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("frame encode failed: {0}")]
    Codec(#[from] frames::CodecError),
    #[error("chat text is empty")]
    EmptyChat,
    #[error("coordinates must be finite numbers")]
    InvalidCoordinates,
    #[error("nothing to draw: start and end are the same point")]
    EmptyShape,
    #[error("connection closed while waiting for {0}")]
    Closed(&'static str),
    #[error("timed out waiting for {0}")]
    Timeout(&'static str),
}

#[derive(Parser, Debug)]
#[command(name = "whiteboard-cli", about = "Headless participant for the shared whiteboard")]
struct Cli {
    #[arg(long, env = "WHITEBOARD_URL", default_value = "ws://127.0.0.1:3001/ws")]
    url: String,

    #[arg(long, env = "WHITEBOARD_NAME", default_value = frames::model::DEFAULT_NAME)]
    name: String,

    /// Delay between reconnect attempts.
    #[arg(long, default_value_t = 1000)]
    backoff_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stay connected and print presence, chat, and drawing activity.
    Watch,
    /// Send one chat message and print the server's copy.
    Chat { text: String },
    /// Draw one stroke or shape.
    Draw(DrawArgs),
}

#[derive(Args, Debug)]
struct DrawArgs {
    #[arg(value_parser = parse_tool)]
    tool: Tool,
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    #[arg(long, default_value = "#000000")]
    color: String,
    #[arg(long, default_value_t = 2.0)]
    width: f64,
    #[arg(long, default_value_t = false)]
    dashed: bool,
}

fn parse_tool(raw: &str) -> Result<Tool, String> {
    Tool::from_name(raw).ok_or_else(|| format!("unknown tool `{raw}` (pencil, eraser, highlighter, line, arrow, rectangle, circle)"))
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let connector = Connector::new(cli.url, Duration::from_millis(cli.backoff_ms));
    let session = ClientSession::new(Raster::new(BOARD_WIDTH, BOARD_HEIGHT, BOARD_BACKGROUND), &cli.name);

    match cli.command {
        Command::Watch => run_watch(&connector, session).await,
        Command::Chat { text } => run_chat(&connector, session, &text).await,
        Command::Draw(args) => run_draw(&connector, session, &args).await,
    }
}

// =============================================================================
// WATCH
// =============================================================================

async fn run_watch(connector: &Connector, mut session: ClientSession<Raster>) -> Result<(), CliError> {
    loop {
        session.on_connecting();
        let mut client = connector.connect().await;

        let interrupted = tokio::select! {
            result = watch_connection(&mut client, &mut session) => {
                if let Err(e) = result {
                    warn!(error = %e, "connection lost");
                }
                false
            }
            _ = tokio::signal::ctrl_c() => true,
        };
        if interrupted {
            connection::close(&mut client).await;
            return Ok(());
        }

        session.on_disconnected();
        println!("disconnected; reconnecting");
        tokio::time::sleep(connector.backoff()).await;
    }
}

/// Pump one connection until it drops.
async fn watch_connection(client: &mut connection::Client, session: &mut ClientSession<Raster>) -> Result<(), CliError> {
    connection::send_all(client, session.on_connected()).await?;
    while let Some(message) = connection::recv(client).await? {
        if let Some(line) = report::describe(&message, &session.presence) {
            println!("{line}");
        }
        session.handle(message, frames::now_ms());
        session.engine.flush_remote();
        session.cursors.prune(frames::now_ms());
    }
    Ok(())
}

// =============================================================================
// ONE-SHOT COMMANDS
// =============================================================================

/// Connect, announce our name, and wait for the welcome.
async fn join(connector: &Connector, session: &mut ClientSession<Raster>) -> Result<connection::Client, CliError> {
    session.on_connecting();
    let mut client = connector.connect().await;
    connection::send_all(&mut client, session.on_connected()).await?;
    loop {
        let message = connection::recv_within(&mut client, REPLY_TIMEOUT, "welcome")
            .await?
            .ok_or(CliError::Closed("welcome"))?;
        let welcomed = matches!(message, ServerMessage::Welcome { .. });
        session.handle(message, frames::now_ms());
        if welcomed {
            return Ok(client);
        }
    }
}

async fn run_chat(connector: &Connector, mut session: ClientSession<Raster>, text: &str) -> Result<(), CliError> {
    if frames::model::sanitize_chat_text(text).is_none() {
        return Err(CliError::EmptyChat);
    }
    let mut client = join(connector, &mut session).await?;
    let message = session.send_chat(text).ok_or(CliError::EmptyChat)?;
    connection::send(&mut client, message).await?;

    // The server's canonical copy comes back to the sender too.
    loop {
        let reply = connection::recv_within(&mut client, REPLY_TIMEOUT, "chat echo")
            .await?
            .ok_or(CliError::Closed("chat echo"))?;
        if let ServerMessage::Chat(chat) = &reply {
            if session.presence.is_self(chat.participant_id) {
                info!(id = %chat.id, "chat delivered");
                if let Some(line) = report::describe(&reply, &session.presence) {
                    println!("{line}");
                }
                break;
            }
        }
        session.handle(reply, frames::now_ms());
    }
    connection::close(&mut client).await;
    Ok(())
}

async fn run_draw(connector: &Connector, mut session: ClientSession<Raster>, args: &DrawArgs) -> Result<(), CliError> {
    let from = Point::new(args.x0, args.y0);
    let to = Point::new(args.x1, args.y1);
    if !from.is_finite() || !to.is_finite() {
        return Err(CliError::InvalidCoordinates);
    }

    let mut client = join(connector, &mut session).await?;
    session.engine.set_tool(tool_config(args));
    let actions = draw_stroke(&mut session, from, to);
    if !actions.iter().any(|a| matches!(a, Action::Draw(_))) {
        return Err(CliError::EmptyShape);
    }
    let messages: Vec<ClientMessage> = session
        .outbound(&actions)
        .into_iter()
        .filter(|m| matches!(m, ClientMessage::Draw(_)))
        .collect();
    connection::send_all(&mut client, messages).await?;
    println!("drew {:?} ({}, {}) to ({}, {})", args.tool, args.x0, args.y0, args.x1, args.y1);
    connection::close(&mut client).await;
    Ok(())
}

fn tool_config(args: &DrawArgs) -> ToolConfig {
    ToolConfig {
        tool: args.tool,
        color: args.color.clone(),
        width: args.width,
        opacity: 1.0,
        dash: if args.dashed { DashStyle::Dashed } else { DashStyle::Solid },
    }
}

/// Drive the engine through a press, one move, and a release.
fn draw_stroke(session: &mut ClientSession<Raster>, from: Point, to: Point) -> Vec<Action> {
    let engine = &mut session.engine;
    let mut actions = engine.on_pointer_down(from, Button::Primary);
    actions.extend(engine.on_pointer_move(to, frames::now_ms()));
    actions.extend(engine.on_pointer_up(to));
    actions
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
