#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative play session for the Huarongdao puzzle.

use std::time::Duration;

use huarongdao_core::{
    Board, CellCoord, Command, Completion, Direction, Event, Level, LevelKey, MoveRejection,
    PieceId, SessionStatus, VICTORY_CELL,
};
use huarongdao_system_movement::{apply_move, can_move, select_direction};
use huarongdao_system_validation::validate_layout;
use huarongdao_system_victory::is_solved;
use tracing::{debug, info};

/// Default time a requested move stays in flight before it is applied.
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(150);

const CLOCK_QUANTUM: Duration = Duration::from_secs(1);

/// Represents the authoritative state of one play session.
#[derive(Clone, Debug)]
pub struct Session {
    status: SessionStatus,
    current: Option<LoadedLevel>,
    move_count: u32,
    elapsed_seconds: u32,
    clock: Duration,
    settle: Duration,
    in_flight: Option<PendingMove>,
}

#[derive(Clone, Debug)]
struct LoadedLevel {
    key: LevelKey,
    level: Level,
    board: Board,
}

#[derive(Clone, Debug)]
struct PendingMove {
    piece: PieceId,
    direction: Direction,
    from: CellCoord,
    to: CellCoord,
    waited: Duration,
}

impl Session {
    /// Creates an idle session with no level loaded.
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: SessionStatus::Idle,
            current: None,
            move_count: 0,
            elapsed_seconds: 0,
            clock: Duration::ZERO,
            settle: DEFAULT_SETTLE,
            in_flight: None,
        }
    }

    fn load(&mut self, key: LevelKey, level: Level, out_events: &mut Vec<Event>) {
        let board = level.board().clone();
        let piece_count = board.len();
        info!(%key, name = level.name(), pieces = piece_count, "level started");

        self.current = Some(LoadedLevel { key: key.clone(), level, board });
        self.move_count = 0;
        self.elapsed_seconds = 0;
        self.clock = Duration::ZERO;
        self.in_flight = None;

        out_events.push(Event::LevelStarted { key, piece_count });
        self.set_status(SessionStatus::Playing, out_events);
    }

    fn set_status(&mut self, status: SessionStatus, out_events: &mut Vec<Event>) {
        self.status = status;
        out_events.push(Event::StatusChanged { status });
    }

    fn advance_clock(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if self.status != SessionStatus::Playing {
            return;
        }

        self.clock = self.clock.saturating_add(dt);
        while self.clock >= CLOCK_QUANTUM {
            self.clock -= CLOCK_QUANTUM;
            self.elapsed_seconds = self.elapsed_seconds.saturating_add(1);
            out_events.push(Event::ClockAdvanced {
                elapsed_seconds: self.elapsed_seconds,
            });
        }
    }

    fn request_move(
        &mut self,
        piece: PieceId,
        direction: Option<Direction>,
        out_events: &mut Vec<Event>,
    ) {
        let outcome = self.resolve_request(&piece, direction);
        let (direction, from) = match outcome {
            Ok(resolved) => resolved,
            Err(reason) => {
                debug!(%piece, ?reason, "move rejected");
                out_events.push(Event::MoveRejected { piece, reason });
                return;
            }
        };

        let to = from.step(direction);
        out_events.push(Event::MoveStarted {
            piece: piece.clone(),
            direction,
            from,
            to,
        });
        self.in_flight = Some(PendingMove {
            piece,
            direction,
            from,
            to,
            waited: Duration::ZERO,
        });

        if self.settle.is_zero() {
            self.settle_move(out_events);
        }
    }

    fn resolve_request(
        &self,
        piece: &PieceId,
        direction: Option<Direction>,
    ) -> Result<(Direction, CellCoord), MoveRejection> {
        match self.status {
            SessionStatus::Idle => return Err(MoveRejection::NotPlaying),
            SessionStatus::Paused => return Err(MoveRejection::Paused),
            SessionStatus::Solved => return Err(MoveRejection::Solved),
            SessionStatus::Playing => {}
        }
        if self.in_flight.is_some() {
            return Err(MoveRejection::Busy);
        }

        let board = self
            .current
            .as_ref()
            .map(|loaded| &loaded.board)
            .ok_or(MoveRejection::NotPlaying)?;
        let from = board
            .piece(piece)
            .map(|found| found.origin())
            .ok_or(MoveRejection::UnknownPiece)?;

        let direction = match direction {
            Some(direction) if can_move(board, piece, direction) => direction,
            Some(_) => return Err(MoveRejection::Blocked),
            None => select_direction(board, piece, None).ok_or(MoveRejection::Blocked)?,
        };
        Ok((direction, from))
    }

    fn progress_move(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let Some(pending) = self.in_flight.as_mut() else {
            return;
        };
        pending.waited = pending.waited.saturating_add(dt);
        if pending.waited >= self.settle {
            self.settle_move(out_events);
        }
    }

    fn settle_move(&mut self, out_events: &mut Vec<Event>) {
        let Some(pending) = self.in_flight.take() else {
            return;
        };
        let Some(loaded) = self.current.as_mut() else {
            return;
        };

        match apply_move(&loaded.board, &pending.piece, pending.direction) {
            Ok(next) => loaded.board = next,
            Err(error) => {
                debug!(%error, "in-flight move no longer applies");
                out_events.push(Event::MoveRejected {
                    piece: pending.piece,
                    reason: MoveRejection::Blocked,
                });
                return;
            }
        }

        self.move_count = self.move_count.saturating_add(1);
        out_events.push(Event::PieceMoved {
            piece: pending.piece,
            direction: pending.direction,
            from: pending.from,
            to: pending.to,
            move_count: self.move_count,
        });

        if is_solved(&loaded.board, VICTORY_CELL) {
            let completion = Completion {
                key: loaded.key.clone(),
                moves: self.move_count,
                elapsed_seconds: self.elapsed_seconds,
            };
            info!(
                key = %completion.key,
                moves = completion.moves,
                seconds = completion.elapsed_seconds,
                "puzzle solved"
            );
            self.set_status(SessionStatus::Solved, out_events);
            out_events.push(Event::PuzzleSolved { completion });
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the session, mutating state deterministically.
pub fn apply(session: &mut Session, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartLevel { key, level } => {
            if let Err(reason) = validate_layout(level.board()) {
                info!(%key, %reason, "level rejected");
                out_events.push(Event::LevelRejected { key, reason });
                return;
            }
            session.load(key, level, out_events);
        }
        Command::Reset => {
            if let Some(loaded) = session.current.take() {
                session.load(loaded.key, loaded.level, out_events);
            }
        }
        Command::Pause => {
            if session.status == SessionStatus::Playing {
                session.set_status(SessionStatus::Paused, out_events);
            }
        }
        Command::Resume => {
            if session.status == SessionStatus::Paused {
                session.set_status(SessionStatus::Playing, out_events);
            }
        }
        Command::TogglePause => match session.status {
            SessionStatus::Playing => session.set_status(SessionStatus::Paused, out_events),
            SessionStatus::Paused => session.set_status(SessionStatus::Playing, out_events),
            SessionStatus::Idle | SessionStatus::Solved => {}
        },
        Command::Tick { dt } => {
            session.advance_clock(dt, out_events);
            session.progress_move(dt, out_events);
        }
        Command::ConfigureMotion { settle } => {
            session.settle = settle;
        }
        Command::RequestMove { piece, direction } => {
            session.request_move(piece, direction, out_events);
        }
        Command::SettleMove => session.settle_move(out_events),
    }
}

/// Query functions that provide read-only access to the session state.
pub mod query {
    use std::time::Duration;

    use super::Session;
    use huarongdao_core::{Board, CellCoord, Direction, Level, LevelKey, PieceId, SessionStatus};

    /// Lifecycle state the session is in.
    #[must_use]
    pub fn status(session: &Session) -> SessionStatus {
        session.status
    }

    /// Board currently in play, if a level is loaded.
    #[must_use]
    pub fn board(session: &Session) -> Option<&Board> {
        session.current.as_ref().map(|loaded| &loaded.board)
    }

    /// Definition of the loaded level.
    #[must_use]
    pub fn level(session: &Session) -> Option<&Level> {
        session.current.as_ref().map(|loaded| &loaded.level)
    }

    /// Identity of the loaded level.
    #[must_use]
    pub fn level_key(session: &Session) -> Option<&LevelKey> {
        session.current.as_ref().map(|loaded| &loaded.key)
    }

    /// Number of moves made since the level started.
    #[must_use]
    pub fn move_count(session: &Session) -> u32 {
        session.move_count
    }

    /// Whole seconds played since the level started.
    #[must_use]
    pub fn elapsed_seconds(session: &Session) -> u32 {
        session.elapsed_seconds
    }

    /// Reports whether a move is in flight.
    #[must_use]
    pub fn is_busy(session: &Session) -> bool {
        session.in_flight.is_some()
    }

    /// Reports whether a move request would currently be considered.
    #[must_use]
    pub fn accepts_moves(session: &Session) -> bool {
        session.status == SessionStatus::Playing && session.in_flight.is_none()
    }

    /// Time a requested move occupies before it settles.
    #[must_use]
    pub fn settle_duration(session: &Session) -> Duration {
        session.settle
    }

    /// Captures the move currently in flight.
    #[must_use]
    pub fn pending_move(session: &Session) -> Option<PendingMoveView> {
        session.in_flight.as_ref().map(|pending| PendingMoveView {
            piece: pending.piece.clone(),
            direction: pending.direction,
            from: pending.from,
            to: pending.to,
            waited: pending.waited,
        })
    }

    /// Read-only description of an in-flight move.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct PendingMoveView {
        /// Identifier of the moving piece.
        pub piece: PieceId,
        /// Direction of travel.
        pub direction: Direction,
        /// Origin before the move.
        pub from: CellCoord,
        /// Origin once the move settles.
        pub to: CellCoord,
        /// Time already spent in flight.
        pub waited: Duration,
    }
}
