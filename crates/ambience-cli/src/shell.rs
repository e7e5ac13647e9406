//! Interactive command shell.
//!
//! Translates typed commands into engine calls and renders engine events as
//! plain lines; every playback decision stays in `ambience-core`.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use crossbeam_channel::Receiver;

use ambience_core::events::PlayerEvent;
use ambience_core::library::{FolderNode, FolderTree, TrackFilter};
use ambience_core::player::Player;
use ambience_core::status::{PlaybackState, RepeatMode};

pub fn run(
    player: Player,
    events: Receiver<PlayerEvent>,
    filter: TrackFilter,
    root: Option<PathBuf>,
) -> Result<()> {
    spawn_event_printer(events);

    let mut tree = root.as_deref().and_then(|root| open_tree(root, &filter));

    println!("type 'help' for commands");
    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let trimmed = line.trim();
        let (cmd, arg) = match trimmed.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, Some(rest.trim())),
            None => (trimmed, None),
        };
        if cmd.is_empty() {
            continue;
        }

        match cmd {
            "open" => match arg {
                Some(dir) => tree = open_tree(Path::new(dir), &filter),
                None => println!("usage: open <dir>"),
            },
            "folders" => match tree.as_ref() {
                Some(tree) => show_folders(tree),
                None => println!("no library open; use: open <dir>"),
            },
            "use" => match (tree.as_ref(), arg.and_then(parse_index)) {
                (Some(tree), Some(index)) => use_folder(&player, tree, index),
                (None, _) => println!("no library open; use: open <dir>"),
                (_, None) => println!("usage: use <n>"),
            },
            "list" => show_tracks(&player),
            "play" => {
                let result = match arg {
                    Some(raw) => match parse_index(raw) {
                        Some(index) => player.play_from_index(index),
                        None => {
                            println!("usage: play [n]");
                            continue;
                        }
                    },
                    None => player.play(),
                };
                if let Err(err) = result {
                    println!("error: {err}");
                }
            }
            "pause" => player.pause(),
            "resume" => player.resume(),
            "stop" => player.stop(),
            "skip" => player.skip_to_next(),
            "shuffle" => player.shuffle(),
            "repeat" => match arg {
                Some(raw) => match parse_repeat(raw) {
                    Some(mode) => player.set_repeat(mode),
                    None => println!("usage: repeat [none|one|all]"),
                },
                None => println!("repeat: {}", repeat_label(player.cycle_repeat())),
            },
            "status" => show_status(&player),
            "help" => show_help(),
            "quit" | "exit" => break,
            other => println!("unknown command: {other} (try 'help')"),
        }
    }

    player.stop();
    Ok(())
}

fn spawn_event_printer(events: Receiver<PlayerEvent>) {
    std::thread::spawn(move || {
        for event in events.iter() {
            match event {
                PlayerEvent::StateChanged(state) => {
                    println!("[state] {}", state_label(state));
                }
                PlayerEvent::PlaylistChanged {
                    tracks,
                    current_index,
                } => match current_index {
                    Some(index) => {
                        println!("[playlist] {} tracks, at #{}", tracks.len(), index + 1)
                    }
                    None => println!("[playlist] {} tracks", tracks.len()),
                },
                PlayerEvent::TrackFailed { path, reason } => {
                    println!("[error] {}: {reason}", file_label(&path));
                }
            }
        }
    });
}

fn open_tree(root: &Path, filter: &TrackFilter) -> Option<FolderTree> {
    match FolderTree::scan(root, filter) {
        Ok(tree) => {
            println!("opened {}", tree.root().path().display());
            Some(tree)
        }
        Err(err) => {
            println!("error: {err}");
            None
        }
    }
}

fn use_folder(player: &Player, tree: &FolderTree, index: usize) {
    let mut rows = Vec::new();
    collect_folders(tree.root(), 0, &mut rows);
    let Some((_, node)) = rows.get(index) else {
        println!("no folder #{}", index + 1);
        return;
    };
    match player.load_folder(node.path()) {
        Ok(0) => println!("{} has no tracks", node.name()),
        Ok(count) => println!("loaded {count} tracks from {}", node.name()),
        Err(err) => println!("error: {err}"),
    }
}

fn show_folders(tree: &FolderTree) {
    let mut rows = Vec::new();
    collect_folders(tree.root(), 0, &mut rows);
    for (i, (depth, node)) in rows.iter().enumerate() {
        let marker = if node.is_leaf() { "*" } else { " " };
        println!("{:>3}) {}{marker} {}", i + 1, "  ".repeat(*depth), node.name());
    }
}

fn collect_folders<'a>(node: &'a FolderNode, depth: usize, out: &mut Vec<(usize, &'a FolderNode)>) {
    out.push((depth, node));
    for child in node.children() {
        collect_folders(child, depth + 1, out);
    }
}

fn show_tracks(player: &Player) {
    let tracks = player.tracks();
    if tracks.is_empty() {
        println!("playlist is empty");
        return;
    }
    let now_playing = player.status().now_playing;
    for (i, track) in tracks.iter().enumerate() {
        let marker = if now_playing.as_ref() == Some(track) {
            ">"
        } else {
            " "
        };
        println!("{:>3}) {marker} {}", i + 1, file_label(track));
    }
}

fn show_status(player: &Player) {
    let status = player.status();
    let track = status
        .now_playing
        .as_deref()
        .map(file_label)
        .unwrap_or_else(|| "-".to_string());
    println!(
        "state: {}  track: {track}  repeat: {}",
        state_label(status.state),
        repeat_label(status.repeat)
    );
}

fn show_help() {
    println!("open <dir>   scan a library root");
    println!("folders      list folders (* marks folders with tracks)");
    println!("use <n>      load folder n into the playlist");
    println!("list         show the playlist");
    println!("play [n]     play track n, or resume the cursor position");
    println!("pause        pause playback");
    println!("resume       resume paused playback");
    println!("stop         stop playback");
    println!("skip         jump to the next track");
    println!("shuffle      reshuffle the playlist");
    println!("repeat [m]   set repeat to none|one|all, or cycle it");
    println!("status       show the player status");
    println!("quit         exit");
}

/// Parse a 1-based list number into a 0-based index.
fn parse_index(raw: &str) -> Option<usize> {
    raw.parse::<usize>().ok().and_then(|n| n.checked_sub(1))
}

fn parse_repeat(raw: &str) -> Option<RepeatMode> {
    match raw {
        "none" => Some(RepeatMode::None),
        "one" => Some(RepeatMode::One),
        "all" => Some(RepeatMode::All),
        _ => None,
    }
}

fn repeat_label(mode: RepeatMode) -> &'static str {
    match mode {
        RepeatMode::None => "none",
        RepeatMode::One => "one",
        RepeatMode::All => "all",
    }
}

fn state_label(state: PlaybackState) -> &'static str {
    match state {
        PlaybackState::Stopped => "stopped",
        PlaybackState::Playing => "playing",
        PlaybackState::Paused => "paused",
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_index_is_one_based() {
        assert_eq!(parse_index("1"), Some(0));
        assert_eq!(parse_index("12"), Some(11));
        assert_eq!(parse_index("0"), None);
        assert_eq!(parse_index("x"), None);
    }

    #[test]
    fn parse_repeat_accepts_known_modes() {
        assert_eq!(parse_repeat("none"), Some(RepeatMode::None));
        assert_eq!(parse_repeat("one"), Some(RepeatMode::One));
        assert_eq!(parse_repeat("all"), Some(RepeatMode::All));
        assert_eq!(parse_repeat("loop"), None);
    }

    #[test]
    fn file_label_uses_the_file_name() {
        assert_eq!(file_label(Path::new("/music/forest/rain.mp3")), "rain.mp3");
        assert_eq!(file_label(Path::new("/")), "<unknown>");
    }
}
