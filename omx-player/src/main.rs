//! Small CLI front end (§2 point 4, §6) for manually exercising the
//! playback graph controller against the in-memory fake framework. No real
//! component framework binding exists in this crate's scope, so the
//! operator plays both roles: issuing downstream commands (`load`,
//! `execute`, `skip`, ...) and, standing in for the missing framework,
//! acking the asynchronous events (`ack_trans`, `format_detected`, ...) the
//! fake doesn't generate on its own.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::thread;

use anyhow::{anyhow, Result};
use clap::Parser;
use omx_framework::FakeFramework;
use omx_model::{GraphKind, OmxErrorCode, OmxState, Playlist, PlaylistItem, PortCommand};
use omx_ops::{LocalFileStrategy, OmxError, StreamResolver, StreamingStrategy};
use omx_player::{describe, Player};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "omx-player",
    about = "Manual exerciser for the playback graph controller"
)]
struct Cli {
    /// Playlist URIs to queue and load before entering the command loop.
    uris: Vec<String>,

    /// Graph kind: "local" or "streaming:<service>". Defaults to the
    /// configured default.
    #[arg(long)]
    kind: Option<String>,
}

struct PassthroughResolver;

impl StreamResolver for PassthroughResolver {
    fn resolve(&self, item: &PlaylistItem) -> std::result::Result<String, OmxError> {
        Ok(item.uri.clone())
    }
}

fn parse_kind(s: &str) -> GraphKind {
    match s.split_once(':') {
        Some(("streaming", service)) => GraphKind::Streaming { service: service.to_string() },
        _ => GraphKind::LocalFile,
    }
}

fn parse_state(s: &str) -> Result<OmxState> {
    match s {
        "loaded" => Ok(OmxState::Loaded),
        "idle" => Ok(OmxState::Idle),
        "executing" => Ok(OmxState::Executing),
        "paused" => Ok(OmxState::Paused),
        other => Err(anyhow!("unknown component state '{other}'")),
    }
}

fn parse_port_command(s: &str) -> Result<PortCommand> {
    match s {
        "disable" => Ok(PortCommand::Disable),
        "enable" => Ok(PortCommand::Enable),
        other => Err(anyhow!("unknown port command '{other}'")),
    }
}

fn parse_error_code(s: &str) -> OmxErrorCode {
    match s {
        "insufficient_resources" => OmxErrorCode::InsufficientResources,
        "port_unresponsive_alloc" => OmxErrorCode::PortUnresponsiveDuringAllocation,
        "port_unresponsive_dealloc" => OmxErrorCode::PortUnresponsiveDuringDeallocation,
        "port_unresponsive_stop" => OmxErrorCode::PortUnresponsiveDuringStop,
        "stream_corrupt" => OmxErrorCode::StreamCorrupt,
        "format_not_detected" => OmxErrorCode::FormatNotDetected,
        "invalid" => OmxErrorCode::Invalid,
        other => OmxErrorCode::Other(other.to_string()),
    }
}

fn init_tracing() {
    let default_level = omx_config::get_config().log_min_level();
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(env_filter).try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let kind = cli
        .kind
        .as_deref()
        .map(parse_kind)
        .unwrap_or_else(|| omx_config::get_config().default_graph_kind());

    let framework = Arc::new(FakeFramework::new());
    let (player, _worker) = match kind.clone() {
        GraphKind::LocalFile => Player::spawn(framework.clone(), LocalFileStrategy, kind.clone()),
        GraphKind::Streaming { .. } => Player::spawn(
            framework.clone(),
            StreamingStrategy::new(Box::new(PassthroughResolver)),
            kind.clone(),
        ),
    };

    let notifications = player.notifications().clone();
    thread::spawn(move || {
        for n in notifications.iter() {
            println!("<- {}", describe(&n));
        }
    });

    if !cli.uris.is_empty() {
        let items = cli.uris.iter().map(|u| PlaylistItem::new(u.as_str())).collect();
        player.load(Playlist::new(items), kind.clone());
        println!("-> load ({} item(s), {kind})", cli.uris.len());
    }

    println!("omx-player ready. type 'help' for commands, 'quit' to exit.");
    run_repl(&player, &framework, &kind)
}

fn run_repl(player: &Player, framework: &Arc<FakeFramework>, kind: &GraphKind) -> Result<()> {
    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some(&cmd) = words.first() else { continue };

        match dispatch(cmd, &words[1..], player, framework, kind) {
            Ok(true) => break,
            Ok(false) => {}
            Err(e) => eprintln!("error: {e}"),
        }
    }
    Ok(())
}

/// Returns `Ok(true)` when the REPL should exit.
fn dispatch(
    cmd: &str,
    args: &[&str],
    player: &Player,
    framework: &Arc<FakeFramework>,
    kind: &GraphKind,
) -> Result<bool> {
    match cmd {
        "help" => {
            println!(
                "commands: load <uri...> | execute | pause | stop | unload | skip <n> |\n\
                 position <n> | volume <v> | volume_step <n> | mute | print_playlist |\n\
                 add_playlist <uri...> | timer |\n\
                 ack_trans <component> <state> | ack_port <component> <disable|enable> <port> |\n\
                 format_detected <component> <port> | port_settings <component> <port> <index> |\n\
                 eos <component> <port> | err <component> <code> <port> | quit"
            );
        }
        "load" => {
            let items = args.iter().map(|u| PlaylistItem::new(*u)).collect();
            player.load(Playlist::new(items), kind.clone());
        }
        "execute" => player.execute(),
        "pause" => player.pause(),
        "stop" => player.stop(),
        "unload" => player.unload(),
        "skip" => player.skip(parse_i64(args, 0)?),
        "position" => player.position(parse_i64(args, 0)?),
        "volume" => player.volume(parse_f64(args, 0)?),
        "volume_step" => player.volume_step(parse_i64(args, 0)? as i32),
        "mute" => player.mute(),
        "print_playlist" => player.print_playlist(),
        "add_playlist" => {
            let items = args.iter().map(|u| PlaylistItem::new(*u)).collect();
            player.add_playlist(items);
        }
        "timer" => player.timer_tick(),
        "ack_trans" => {
            let handle = resolve_handle(framework, arg(args, 0)?)?;
            let state = parse_state(arg(args, 1)?)?;
            framework.ack_transition(handle, state);
        }
        "ack_port" => {
            let handle = resolve_handle(framework, arg(args, 0)?)?;
            let command = parse_port_command(arg(args, 1)?)?;
            let port = parse_i64(args, 2)? as u32;
            framework.ack_port(handle, port, command);
        }
        "format_detected" => {
            let handle = resolve_handle(framework, arg(args, 0)?)?;
            let port = parse_i64(args, 1)? as u32;
            framework.inject(omx_framework::FrameworkEvent::FormatDetected { handle, port });
        }
        "port_settings" => {
            let handle = resolve_handle(framework, arg(args, 0)?)?;
            let port = parse_i64(args, 1)? as u32;
            let index = parse_i64(args, 2)? as u32;
            framework.inject(omx_framework::FrameworkEvent::PortSettingsChanged { handle, port, index });
        }
        "eos" => {
            let handle = resolve_handle(framework, arg(args, 0)?)?;
            let port = parse_i64(args, 1)? as u32;
            framework.inject(omx_framework::FrameworkEvent::Eos { handle, port });
        }
        "err" => {
            let handle = resolve_handle(framework, arg(args, 0)?)?;
            let error = parse_error_code(arg(args, 1)?);
            let port = parse_i64(args, 2)? as u32;
            framework.inject(omx_framework::FrameworkEvent::Error { handle, error, port });
        }
        "quit" | "exit" => return Ok(true),
        "" => {}
        other => eprintln!("unknown command '{other}', type 'help'"),
    }
    Ok(false)
}

fn arg<'a>(args: &[&'a str], i: usize) -> Result<&'a str> {
    args.get(i).copied().ok_or_else(|| anyhow!("missing argument {i}"))
}

fn parse_i64(args: &[&str], i: usize) -> Result<i64> {
    Ok(arg(args, i)?.parse()?)
}

fn parse_f64(args: &[&str], i: usize) -> Result<f64> {
    Ok(arg(args, i)?.parse()?)
}

fn resolve_handle(framework: &FakeFramework, name: &str) -> Result<omx_model::ComponentHandle> {
    framework
        .handle_for(name)
        .ok_or_else(|| anyhow!("no live component named '{name}'"))
}
