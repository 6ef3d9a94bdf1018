use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::audio::PlayerEvent;
use crate::controller::{ControllerClient, Progress, format_time};
use crate::session::{SessionEvent, SessionHost};

/// How long the loop waits for input before pumping the controller again.
const POLL: Duration = Duration::from_millis(50);

/// One line typed on stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Folder(PathBuf),
    Refresh,
    /// Resume, or jump to a 1-based track number.
    Play(Option<usize>),
    Pause,
    Stop,
    Next,
    Seek(Duration),
    List,
    Status,
    Hide,
    Show,
    Noisy,
    Quit,
}

/// What reaches the loop from outside.
#[derive(Debug)]
pub(super) enum Feed {
    Line(String),
    EndOfInput,
    /// SIGINT or SIGTERM.
    Interrupted,
}

pub fn parse_line(line: &str) -> Result<Option<Input>, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };

    let input = match word {
        "" => return Ok(None),
        "folder" | "f" if !rest.is_empty() => Input::Folder(PathBuf::from(rest)),
        "folder" | "f" => return Err("usage: folder <path>".to_string()),
        "refresh" | "r" => Input::Refresh,
        "play" | "p" if rest.is_empty() => Input::Play(None),
        "play" | "p" => match rest.parse::<usize>() {
            Ok(n) if n > 0 => Input::Play(Some(n - 1)),
            _ => return Err(format!("not a track number: {rest}")),
        },
        "pause" => Input::Pause,
        "stop" => Input::Stop,
        "next" | "n" => Input::Next,
        "seek" => match rest.parse::<u64>() {
            Ok(secs) => Input::Seek(Duration::from_secs(secs)),
            Err(_) => return Err(format!("not a number of seconds: {rest:?}")),
        },
        "list" | "ls" => Input::List,
        "status" | "s" => Input::Status,
        "hide" => Input::Hide,
        "show" => Input::Show,
        "noisy" => Input::Noisy,
        "quit" | "q" | "exit" => Input::Quit,
        other => return Err(format!("unknown command: {other}")),
    };
    Ok(Some(input))
}

/// Read commands until `quit`, an interrupt or end of input, keeping the
/// controller pumped.
pub fn run(client: &mut ControllerClient, host: &SessionHost) -> Result<()> {
    let (tx, rx) = mpsc::channel::<Feed>();
    forward_interrupts(tx.clone());
    thread::Builder::new()
        .name("folio-stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(Feed::Line(line)).is_err() {
                    return;
                }
            }
            // The interrupt handler holds a sender too, so say it explicitly.
            let _ = tx.send(Feed::EndOfInput);
        })
        .context("failed to spawn stdin reader")?;

    drive(&rx, client, host, &mut io::stdout())
}

/// Turn Ctrl-C and SIGTERM into a regular exit so the session gets its final flush.
fn forward_interrupts(tx: Sender<Feed>) {
    let installed = ctrlc::set_handler(move || {
        let _ = tx.send(Feed::Interrupted);
    });
    if let Err(e) = installed {
        warn!("failed to install interrupt handler: {e}");
    }
}

pub(super) fn drive(
    rx: &Receiver<Feed>,
    client: &mut ControllerClient,
    host: &SessionHost,
    out: &mut impl Write,
) -> Result<()> {
    let mut progress: Option<Progress> = None;
    loop {
        match rx.recv_timeout(POLL) {
            Ok(Feed::Line(line)) => match parse_line(&line) {
                Ok(Some(Input::Quit)) => break,
                Ok(Some(input)) => {
                    handle_input(input, client, host, progress, out)?;
                }
                Ok(None) => {}
                Err(msg) => writeln!(out, "{msg}")?,
            },
            Ok(Feed::Interrupted) => {
                info!("interrupted; shutting down");
                break;
            }
            Ok(Feed::EndOfInput) | Err(RecvTimeoutError::Disconnected) => {
                debug!("end of input");
                break;
            }
            Err(RecvTimeoutError::Timeout) => {}
        }

        for event in client.pump() {
            report_event(&event, client, out)?;
        }
        if let Some(sample) = client.sample_progress(Instant::now()) {
            progress = Some(sample);
        }
    }
    Ok(())
}

fn handle_input(
    input: Input,
    client: &mut ControllerClient,
    host: &SessionHost,
    progress: Option<Progress>,
    out: &mut impl Write,
) -> Result<()> {
    match input {
        Input::Folder(path) => client.select_folder(super::folder_id(path)),
        Input::Refresh => client.refresh(),
        Input::Play(None) => client.play(),
        Input::Play(Some(index)) => client.play_track_at(index),
        Input::Pause => client.pause(),
        Input::Stop => client.stop(),
        Input::Next => client.next(),
        Input::Seek(position) => client.seek_to(position),
        Input::List => {
            let now = client.now_playing().current_index;
            for (i, track) in client.catalog().iter().enumerate() {
                let marker = if Some(i) == now { '>' } else { ' ' };
                writeln!(out, "{marker} {:>3}  {}", i + 1, track.name)?;
            }
        }
        Input::Status => writeln!(out, "{}", status_line(client, progress))?,
        Input::Hide => client.on_hidden(),
        Input::Show => client.on_visible(),
        Input::Noisy => host.becoming_noisy(),
        Input::Quit => {}
    }
    Ok(())
}

fn report_event(event: &SessionEvent, client: &ControllerClient, out: &mut impl Write) -> Result<()> {
    match event {
        SessionEvent::CatalogLoaded(catalog) => {
            writeln!(out, "{} tracks in {}", catalog.len(), catalog.folder)?;
        }
        SessionEvent::CatalogEmpty(folder) => writeln!(out, "no tracks in {folder}")?,
        SessionEvent::Player(PlayerEvent::ItemTransition { index: Some(_) })
        | SessionEvent::Player(PlayerEvent::PlayingChanged(_)) => {
            writeln!(out, "{}", status_line(client, None))?;
        }
        SessionEvent::Player(_) => {}
    }
    Ok(())
}

pub(super) fn status_line(client: &ControllerClient, progress: Option<Progress>) -> String {
    let now = client.now_playing();
    let Some(title) = now.current_title.as_deref() else {
        return idle_line(client);
    };
    let state = if now.is_playing { "playing" } else { "paused" };
    let progress = progress.unwrap_or(Progress {
        position: now.position,
        duration: now.duration,
        is_playing: now.is_playing,
    });
    let total = progress.duration.map_or_else(|| "--:--".to_string(), format_time);
    format!(
        "[{state}] {title}  {} / {total}",
        format_time(progress.position)
    )
}

/// Status while nothing is playing: link state, folder and queued intents.
fn idle_line(client: &ControllerClient) -> String {
    let mut line = if client.is_connected() {
        "nothing loaded"
    } else if client.is_connecting() {
        "connecting"
    } else {
        "not connected"
    }
    .to_string();
    if let Some(folder) = client.folder() {
        line.push_str(&format!(" ({folder})"));
    }
    let pending = client.pending();
    if !pending.is_empty() {
        line.push_str("; queued:");
        if let Some(folder) = &pending.folder {
            line.push_str(&format!(" folder {folder}"));
        }
        if let Some(index) = pending.play_index {
            line.push_str(&format!(" track {}", index + 1));
        }
    }
    line
}
