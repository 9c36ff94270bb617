#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative game state for Star Forge.
//!
//! [`GameController`] is the only owner of the board and the player. Taps,
//! undo requests, resets and fired timers enter through its methods; every
//! observable consequence leaves through the collaborators injected at
//! construction.

mod clock;
mod config;
mod grid;
mod history;
mod navigation;
mod player;
mod stages;

use std::fmt;

use star_forge_core::{
    AudioCue, AudioSink, CellCoord, CellKind, Clock, Generation, MoveRecord, PlayState,
    PresentationSink, ProgressionSink, StageClear, StageDefinition, StageError, StageNumber,
    StageRepository, TapOutcome, Timer, TimerAction, UndoOutcome, WELCOME_BANNER,
};
use tracing::{debug, trace};

pub use clock::ManualClock;
pub use config::{ConfigError, GameConfig};
pub use grid::GridModel;
pub use navigation::find_path;
pub use stages::{BuiltinStages, CatalogueError, StageCatalogue};

use history::MoveHistory;
use navigation::approach_stop;
use player::PlayerState;

/// External collaborators injected into the controller.
pub struct Collaborators {
    /// Source of stage definitions.
    pub stages: Box<dyn StageRepository>,
    /// Receives every grid mutation.
    pub presentation: Box<dyn PresentationSink>,
    /// Receives semantic sound cues.
    pub audio: Box<dyn AudioSink>,
    /// Owns rewards and decides which stage follows a clear.
    pub progression: Box<dyn ProgressionSink>,
    /// Schedules the deferred reset and advance transitions.
    pub clock: Box<dyn Clock>,
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

/// Orchestrates taps into state transitions for the loaded stage.
#[derive(Debug)]
pub struct GameController {
    config: GameConfig,
    collaborators: Collaborators,
    stage_number: StageNumber,
    stage: StageDefinition,
    grid: GridModel,
    player: PlayerState,
    history: MoveHistory,
    move_count: u32,
    collected_crystals: u32,
    placed_crystals: u32,
    state: PlayState,
    generation: Generation,
}

impl GameController {
    /// Creates a controller and loads `first_stage` from the repository.
    pub fn new(
        config: GameConfig,
        collaborators: Collaborators,
        first_stage: StageNumber,
    ) -> Result<Self, StageError> {
        let stage = collaborators.stages.stage(first_stage)?;
        let mut controller = Self {
            config,
            collaborators,
            stage_number: first_stage,
            grid: GridModel::from_stage(&stage),
            player: PlayerState::new(stage.start()),
            stage,
            history: MoveHistory::default(),
            move_count: 0,
            collected_crystals: 0,
            placed_crystals: 0,
            state: PlayState::Playing,
            generation: Generation::default(),
        };
        controller.rebuild();
        debug!(
            stage = %controller.stage_number,
            id = controller.stage.id(),
            "stage loaded"
        );
        Ok(controller)
    }

    /// Interprets a tap on `cell`.
    ///
    /// Carrying a crystal, a portal tap deposits it; empty-handed, a crystal
    /// tap collects it. Distant portals and crystals draw the player closer
    /// instead, and a tap on an empty cell walks there. Everything else is
    /// ignored, as is every tap once the stage left [`PlayState::Playing`].
    pub fn tap_cell(&mut self, cell: CellCoord) -> TapOutcome {
        if self.state != PlayState::Playing {
            trace!(%cell, state = ?self.state, "tap ignored outside play");
            return TapOutcome::Ignored;
        }

        let Ok(kind) = self.grid.get(cell) else {
            trace!(%cell, "tap ignored off the board");
            return TapOutcome::Ignored;
        };

        let carrying = self.player.is_carrying();
        match kind {
            CellKind::Portal if carrying => self.place_crystal(cell),
            CellKind::Crystal if !carrying => self.collect_crystal(cell),
            CellKind::Empty => self.move_player(cell),
            CellKind::Portal
            | CellKind::Crystal
            | CellKind::Wall
            | CellKind::Orb
            | CellKind::MovingWall
            | CellKind::Switch => {
                trace!(%cell, %kind, carrying, "tap ignored");
                TapOutcome::Ignored
            }
        }
    }

    /// Walks the player to the empty cell `cell` if a route exists.
    pub fn move_player(&mut self, cell: CellCoord) -> TapOutcome {
        if self.state != PlayState::Playing || self.grid.get(cell) != Ok(CellKind::Empty) {
            return TapOutcome::Ignored;
        }

        let from = self.player.position();
        match find_path(&self.grid, from, cell) {
            Some(route) if !route.is_empty() => self.relocate(from, cell),
            _ => {
                trace!(%from, to = %cell, "no route");
                TapOutcome::Ignored
            }
        }
    }

    /// Collects the crystal at `cell`, or walks toward it when it is not adjacent.
    pub fn collect_crystal(&mut self, cell: CellCoord) -> TapOutcome {
        if self.state != PlayState::Playing
            || self.player.is_carrying()
            || self.grid.get(cell) != Ok(CellKind::Crystal)
        {
            return TapOutcome::Ignored;
        }

        if !self.grid.is_adjacent(self.player.position(), cell) {
            return self.approach(cell);
        }

        self.player.pick_up();
        self.set_cell(cell, CellKind::Empty);
        self.collected_crystals += 1;
        self.history.push(MoveRecord::Collect { position: cell });
        self.move_count += 1;
        self.collaborators.audio.on_event(AudioCue::Collect);
        debug!(
            %cell,
            moves = self.move_count,
            limit = self.move_limit(),
            "crystal collected"
        );
        self.check_move_limit();
        TapOutcome::Collected { cell }
    }

    /// Deposits the carried crystal at the portal `cell`, or walks toward it
    /// when it is not adjacent.
    ///
    /// The clear check runs before the move-limit check, so delivering the
    /// last crystal on the final allowed move clears the stage.
    pub fn place_crystal(&mut self, cell: CellCoord) -> TapOutcome {
        if self.state != PlayState::Playing
            || !self.player.is_carrying()
            || self.grid.get(cell) != Ok(CellKind::Portal)
        {
            return TapOutcome::Ignored;
        }

        if !self.grid.is_adjacent(self.player.position(), cell) {
            return self.approach(cell);
        }

        self.player.put_down();
        self.placed_crystals += 1;
        self.history.push(MoveRecord::Place { position: cell });
        self.move_count += 1;
        self.collaborators.audio.on_event(AudioCue::Place);
        debug!(
            %cell,
            placed = self.placed_crystals,
            total = self.total_crystals(),
            moves = self.move_count,
            "crystal placed"
        );
        if !self.check_clear_condition() {
            self.check_move_limit();
        }
        TapOutcome::Placed { cell }
    }

    /// Reverts the most recent move.
    ///
    /// A move is reverted by putting the player straight back on its origin,
    /// with no route check. A collect restores the crystal and empties the
    /// player's hands. A place only hands the crystal back; the portal cell is
    /// never touched. Undo itself cannot be undone, and it never changes the
    /// play state.
    pub fn undo_move(&mut self) -> UndoOutcome {
        let Some(record) = self.history.pop() else {
            trace!("nothing to undo");
            return UndoOutcome::NoOp;
        };

        match record {
            MoveRecord::Move { from, .. } => {
                let current = self.player.position();
                self.set_cell(current, CellKind::Empty);
                self.set_cell(from, CellKind::Orb);
                self.player.move_to(from);
            }
            MoveRecord::Collect { position } => {
                self.set_cell(position, CellKind::Crystal);
                self.player.put_down();
                self.collected_crystals = self.collected_crystals.saturating_sub(1);
            }
            MoveRecord::Place { .. } => {
                self.player.pick_up();
                self.placed_crystals = self.placed_crystals.saturating_sub(1);
            }
        }

        self.move_count = self.move_count.saturating_sub(1);
        self.collaborators.audio.on_event(AudioCue::Undo);
        debug!(?record, moves = self.move_count, "move undone");
        UndoOutcome::Undone(record)
    }

    /// Rebuilds the current stage from its definition and resumes play.
    ///
    /// Any timer armed before the reset is invalidated.
    pub fn reset_stage(&mut self) {
        self.rebuild();
        self.collaborators.audio.on_event(AudioCue::Reset);
        debug!(stage = %self.stage_number, "stage reset");
    }

    /// Replaces the current stage with `number` from the repository.
    ///
    /// On error the current stage is left as it was.
    pub fn load_stage(&mut self, number: StageNumber) -> Result<(), StageError> {
        let stage = self.collaborators.stages.stage(number)?;
        self.stage_number = number;
        self.stage = stage;
        self.rebuild();
        debug!(stage = %number, id = self.stage.id(), "stage loaded");
        Ok(())
    }

    /// Performs a timer previously handed to the [`Clock`].
    ///
    /// Returns `Ok(false)` when the timer was armed before the latest reset or
    /// load and is therefore ignored, or when a clear has no stage left to
    /// advance to. The stage then stays cleared.
    pub fn fire_timer(&mut self, timer: Timer) -> Result<bool, StageError> {
        if timer.generation != self.generation {
            debug!(?timer, current = ?self.generation, "stale timer ignored");
            return Ok(false);
        }

        match timer.action {
            TimerAction::ResetStage => self.reset_stage(),
            TimerAction::AdvanceStage => {
                let Some(next) = self.collaborators.progression.next_stage() else {
                    debug!("no stage follows the cleared one");
                    return Ok(false);
                };
                match self.load_stage(next) {
                    Ok(()) => {}
                    Err(StageError::MissingStage { number }) => {
                        debug!(stage = %number, "campaign finished");
                        return Ok(false);
                    }
                    Err(error) => return Err(error),
                }
            }
        }
        Ok(true)
    }

    fn approach(&mut self, target: CellCoord) -> TapOutcome {
        let from = self.player.position();
        match approach_stop(&self.grid, from, target) {
            Some(stop) => self.relocate(from, stop),
            None => {
                trace!(%from, to = %target, "no free cell toward target");
                TapOutcome::Ignored
            }
        }
    }

    fn relocate(&mut self, from: CellCoord, to: CellCoord) -> TapOutcome {
        self.set_cell(from, CellKind::Empty);
        self.set_cell(to, CellKind::Orb);
        self.player.move_to(to);
        self.history.push(MoveRecord::Move { from, to });
        self.move_count += 1;
        self.collaborators.audio.on_event(AudioCue::Move);
        debug!(%from, %to, moves = self.move_count, limit = self.move_limit(), "player moved");
        self.check_move_limit();
        TapOutcome::Moved { from, to }
    }

    fn check_move_limit(&mut self) {
        if self.move_count < self.move_limit() {
            return;
        }

        self.state = PlayState::Failed;
        self.collaborators.audio.on_event(AudioCue::Fail);
        self.collaborators.clock.after(
            self.config.fail_reset_delay,
            Timer {
                action: TimerAction::ResetStage,
                generation: self.generation,
            },
        );
        debug!(moves = self.move_count, "move limit reached");
    }

    fn check_clear_condition(&mut self) -> bool {
        if self.placed_crystals < self.total_crystals() {
            return false;
        }

        self.state = PlayState::Cleared;
        self.collaborators.audio.on_event(AudioCue::Success);
        let report = StageClear {
            stage: self.stage_number,
            stage_id: self.stage.id().to_owned(),
            move_count: self.move_count,
            min_moves: self.stage.min_moves(),
        };
        self.collaborators.progression.on_stage_clear(&report);
        self.collaborators.clock.after(
            self.config.clear_advance_delay,
            Timer {
                action: TimerAction::AdvanceStage,
                generation: self.generation,
            },
        );
        debug!(moves = self.move_count, min = report.min_moves, "stage cleared");
        true
    }

    fn rebuild(&mut self) {
        self.generation = self.generation.next();
        self.grid
            .restore(&self.stage, self.collaborators.presentation.as_mut());
        self.player = PlayerState::new(self.stage.start());
        self.history.clear();
        self.move_count = 0;
        self.collected_crystals = 0;
        self.placed_crystals = 0;
        self.state = PlayState::Playing;
    }

    fn set_cell(&mut self, cell: CellCoord, kind: CellKind) {
        if let Err(error) = self
            .grid
            .set(cell, kind, self.collaborators.presentation.as_mut())
        {
            trace!(?error, "cell write ignored");
        }
    }

    fn move_limit(&self) -> u32 {
        self.stage.move_limit()
    }

    fn total_crystals(&self) -> u32 {
        u32::try_from(self.stage.crystals().len()).unwrap_or(u32::MAX)
    }
}

/// Query functions that provide read-only access to the controller state.
pub mod query {
    use star_forge_core::{CellCoord, CellKind, MoveRecord, OutOfBounds, PlayState, StageNumber};

    use super::{GameController, GridModel, StageDefinition};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(_controller: &GameController) -> &'static str {
        super::WELCOME_BANNER
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn play_state(controller: &GameController) -> PlayState {
        controller.state
    }

    /// Number of the loaded stage.
    #[must_use]
    pub fn stage_number(controller: &GameController) -> StageNumber {
        controller.stage_number
    }

    /// Definition of the loaded stage.
    #[must_use]
    pub fn stage(controller: &GameController) -> &StageDefinition {
        &controller.stage
    }

    /// Read-only view of the live board.
    #[must_use]
    pub fn grid(controller: &GameController) -> &GridModel {
        &controller.grid
    }

    /// Reads a single live cell.
    pub fn cell(controller: &GameController, cell: CellCoord) -> Result<CellKind, OutOfBounds> {
        controller.grid.get(cell)
    }

    /// Describes a cell as `A1 (empty)`, or `None` off the board.
    #[must_use]
    pub fn describe_cell(controller: &GameController, cell: CellCoord) -> Option<String> {
        controller
            .grid
            .get(cell)
            .ok()
            .map(|kind| format!("{} ({kind})", cell.label()))
    }

    /// Cell the player stands on.
    #[must_use]
    pub fn player_position(controller: &GameController) -> CellCoord {
        controller.player.position()
    }

    /// Reports whether the player holds a crystal.
    #[must_use]
    pub fn is_carrying(controller: &GameController) -> bool {
        controller.player.is_carrying()
    }

    /// Moves spent since the stage was (re)built.
    #[must_use]
    pub fn move_count(controller: &GameController) -> u32 {
        controller.move_count
    }

    /// Moves allowed before the stage fails.
    #[must_use]
    pub fn move_limit(controller: &GameController) -> u32 {
        controller.move_limit()
    }

    /// Crystal tallies for the loaded stage.
    #[must_use]
    pub fn crystals(controller: &GameController) -> CrystalTally {
        CrystalTally {
            total: controller.total_crystals(),
            collected: controller.collected_crystals,
            placed: controller.placed_crystals,
        }
    }

    /// Undo stack, oldest record first.
    #[must_use]
    pub fn history(controller: &GameController) -> &[MoveRecord] {
        controller.history.records()
    }

    /// Crystal counters of the loaded stage.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct CrystalTally {
        /// Crystals the stage started with.
        pub total: u32,
        /// Crystals picked up so far.
        pub collected: u32,
        /// Crystals deposited at the portal so far.
        pub placed: u32,
    }

    impl CrystalTally {
        /// Crystals still lying on the board.
        #[must_use]
        pub const fn remaining(&self) -> u32 {
            self.total.saturating_sub(self.collected)
        }
    }
}
