use std::{
    io::{BufRead, Write},
    time::Instant,
};

use anyhow::{bail, Context, Result};
use huarongdao_core::{
    format_time, Command, Completion, Direction, Event, Level, LevelKey, MoveRejection, PieceId,
    SessionStatus,
};
use huarongdao_storage::{KeyValueStore, Storage};
use huarongdao_system_gesture::{Gestures, PointerInput};
use huarongdao_world::{self as world, query, Session};
use tracing::debug;

use crate::{config::Config, render};

const HELP: &str = "\
commands:
  <piece> [up|down|left|right]   move a piece; without a direction the piece slides wherever it can
  move <piece> [direction]       same as above
  press <x> <y> | motion <x> <y> | release | leave
                                 pointer input in board pixels
  pause | resume | toggle        stop or restart the clock
  reset                          restart the level
  show                           redraw the board
  help                           show this text
  quit                           leave the level";

#[derive(Clone, Debug, PartialEq)]
enum PlayInput {
    Move {
        piece: PieceId,
        direction: Option<Direction>,
    },
    Pointer(PointerInput),
    Pause,
    Resume,
    Toggle,
    Reset,
    Show,
    Help,
    Quit,
}

/// Parses a direction from its name or first letter.
fn parse_direction(text: &str) -> Option<Direction> {
    match text.to_ascii_lowercase().as_str() {
        "up" | "u" => Some(Direction::Up),
        "down" | "d" => Some(Direction::Down),
        "left" | "l" => Some(Direction::Left),
        "right" | "r" => Some(Direction::Right),
        _ => None,
    }
}

fn parse_coordinate(text: Option<&str>) -> Result<f32> {
    let text = text.context("expected a pixel coordinate")?;
    let value = text
        .parse::<f32>()
        .with_context(|| format!("'{text}' is not a number"))?;
    if !value.is_finite() {
        bail!("'{text}' is not a finite pixel coordinate");
    }
    Ok(value)
}

fn parse_input(line: &str) -> Result<PlayInput> {
    let mut words = line.split_whitespace();
    let Some(first) = words.next() else {
        bail!("empty command");
    };

    let input = match first.to_ascii_lowercase().as_str() {
        "quit" | "exit" => PlayInput::Quit,
        "help" | "?" => PlayInput::Help,
        "show" => PlayInput::Show,
        "pause" => PlayInput::Pause,
        "resume" => PlayInput::Resume,
        "toggle" => PlayInput::Toggle,
        "reset" => PlayInput::Reset,
        "press" => PlayInput::Pointer(PointerInput::Press {
            x: parse_coordinate(words.next())?,
            y: parse_coordinate(words.next())?,
        }),
        "motion" => PlayInput::Pointer(PointerInput::Motion {
            x: parse_coordinate(words.next())?,
            y: parse_coordinate(words.next())?,
        }),
        "release" => PlayInput::Pointer(PointerInput::Release),
        "leave" => PlayInput::Pointer(PointerInput::Leave),
        "move" => {
            let piece = words.next().context("expected a piece id after 'move'")?;
            move_input(piece, words.next())?
        }
        _ => move_input(first, words.next())?,
    };

    if words.next().is_some() {
        bail!("too many arguments; type 'help' for usage");
    }
    Ok(input)
}

fn move_input(piece: &str, direction: Option<&str>) -> Result<PlayInput> {
    let direction = match direction {
        Some(text) => Some(
            parse_direction(text).with_context(|| format!("unknown direction '{text}'"))?,
        ),
        None => None,
    };
    Ok(PlayInput::Move {
        piece: PieceId::from(piece),
        direction,
    })
}

fn rejection_text(reason: MoveRejection) -> &'static str {
    match reason {
        MoveRejection::NotPlaying => "no level is being played",
        MoveRejection::Paused => "the game is paused",
        MoveRejection::Solved => "the puzzle is already solved",
        MoveRejection::Busy => "another piece is still moving",
        MoveRejection::UnknownPiece => "there is no such piece",
        MoveRejection::Blocked => "the way is blocked",
    }
}

struct Table {
    session: Session,
    gestures: Gestures,
    last_tick: Instant,
}

impl Table {
    fn new(config: &Config) -> Self {
        let mut session = Session::new();
        let mut ignored = Vec::new();
        world::apply(
            &mut session,
            Command::ConfigureMotion {
                settle: config.move_settle(),
            },
            &mut ignored,
        );
        Self {
            session,
            gestures: Gestures::new(config.gestures()),
            last_tick: Instant::now(),
        }
    }

    /// Applies commands after advancing the clock. Terminal play has no
    /// animation, so any move left in flight is settled right away.
    fn submit(&mut self, commands: Vec<Command>) -> Vec<Event> {
        let mut events = Vec::new();
        let now = Instant::now();
        let dt = now.duration_since(self.last_tick);
        self.last_tick = now;
        world::apply(&mut self.session, Command::Tick { dt }, &mut events);

        for command in commands {
            world::apply(&mut self.session, command, &mut events);
            if query::is_busy(&self.session) {
                world::apply(&mut self.session, Command::SettleMove, &mut events);
            }
        }

        if let Some(board) = query::board(&self.session) {
            let mut ignored = Vec::new();
            self.gestures.handle(&events, None, board, &mut ignored);
        }
        events
    }

    fn pointer(&mut self, pointer: PointerInput) -> Vec<Event> {
        let mut commands = Vec::new();
        if let Some(board) = query::board(&self.session) {
            self.gestures.handle(&[], Some(pointer), board, &mut commands);
        }
        self.submit(commands)
    }

    fn draw<W: Write>(&self, out: &mut W) -> Result<()> {
        if let Some(board) = query::board(&self.session) {
            writeln!(out, "{}", render::board(board))?;
        }
        writeln!(out, "{}", render::status_line(&self.session))?;
        Ok(())
    }
}

/// Plays `level` interactively until the input ends or the player quits.
///
/// Completions are folded into `records` when a store is supplied.
pub(crate) fn run<R, W, B>(
    key: LevelKey,
    level: Level,
    config: &Config,
    mut records: Option<&mut Storage<B>>,
    input: &mut R,
    out: &mut W,
) -> Result<()>
where
    R: BufRead,
    W: Write,
    B: KeyValueStore,
{
    writeln!(out, "{}: {}", level.name(), level.description())?;
    let mut table = Table::new(config);
    let started = table.submit(vec![Command::StartLevel { key, level }]);
    if query::status(&table.session) == SessionStatus::Idle {
        let _ = report(&started, records.as_deref_mut(), out)?;
        return Ok(());
    }
    table.draw(out)?;
    writeln!(out, "type 'help' for commands")?;

    let mut line = String::new();
    loop {
        write!(out, "> ")?;
        out.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let parsed = match parse_input(trimmed) {
            Ok(parsed) => parsed,
            Err(error) => {
                writeln!(out, "{error:#}")?;
                continue;
            }
        };
        debug!(?parsed, "play input");

        let events = match parsed {
            PlayInput::Quit => break,
            PlayInput::Help => {
                writeln!(out, "{HELP}")?;
                continue;
            }
            PlayInput::Show => {
                table.draw(out)?;
                continue;
            }
            PlayInput::Pause => table.submit(vec![Command::Pause]),
            PlayInput::Resume => table.submit(vec![Command::Resume]),
            PlayInput::Toggle => table.submit(vec![Command::TogglePause]),
            PlayInput::Reset => table.submit(vec![Command::Reset]),
            PlayInput::Move { piece, direction } => {
                table.submit(vec![Command::RequestMove { piece, direction }])
            }
            PlayInput::Pointer(pointer) => table.pointer(pointer),
        };

        if report(&events, records.as_deref_mut(), out)? {
            table.draw(out)?;
        }
    }
    Ok(())
}

/// Prints what happened and records completions. Returns whether the board
/// changed.
fn report<W, B>(events: &[Event], mut records: Option<&mut Storage<B>>, out: &mut W) -> Result<bool>
where
    W: Write,
    B: KeyValueStore,
{
    let mut changed = false;
    for event in events {
        match event {
            Event::LevelStarted { .. } => changed = true,
            Event::LevelRejected { reason, .. } => {
                writeln!(out, "cannot start level: {reason}")?;
            }
            Event::StatusChanged {
                status: SessionStatus::Paused,
            } => writeln!(out, "paused")?,
            Event::PieceMoved {
                piece,
                direction,
                move_count,
                ..
            } => {
                writeln!(out, "{piece} {direction} (move {move_count})")?;
                changed = true;
            }
            Event::MoveRejected { piece, reason } => {
                writeln!(out, "{piece} cannot move: {}", rejection_text(*reason))?;
            }
            Event::PuzzleSolved { completion } => {
                writeln!(
                    out,
                    "Solved in {} moves, {}!",
                    completion.moves,
                    format_time(completion.elapsed_seconds)
                )?;
                if let Some(storage) = records.as_deref_mut() {
                    record(storage, completion, out)?;
                }
            }
            _ => {}
        }
    }
    Ok(changed)
}

fn record<W, B>(storage: &mut Storage<B>, completion: &Completion, out: &mut W) -> Result<()>
where
    W: Write,
    B: KeyValueStore,
{
    let improved = storage
        .record_completion(completion)
        .context("failed to save record")?;
    if improved {
        writeln!(out, "New best record!")?;
    }
    if let Some(best) = storage.record(&completion.key)? {
        writeln!(out, "best: {best}")?;
    }
    Ok(())
}
