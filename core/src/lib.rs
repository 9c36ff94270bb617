#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Star Forge puzzle engine.
//!
//! This crate defines the vocabulary that connects adapters, the
//! authoritative game controller, and pure systems. Adapters feed taps into
//! the controller, the controller mutates its private grid and player state,
//! and every observable consequence leaves through one of the collaborator
//! traits declared here ([`PresentationSink`], [`AudioSink`],
//! [`ProgressionSink`], [`Clock`]). Stage data enters through
//! [`StageRepository`].

mod stage;

use std::{cell::RefCell, fmt, rc::Rc, time::Duration};

use serde::{Deserialize, Serialize};

pub use stage::{GimmickDescriptor, StageDefinition, StageError, StageParts, StepOffset};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Star Forge.";

/// Board edge lengths a stage may declare.
pub const SUPPORTED_SIZES: [u32; 3] = [3, 5, 7];

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell (the `x` axis).
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell (the `y` axis).
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Reports whether the two cells share an edge.
    #[must_use]
    pub fn is_adjacent(self, other: CellCoord) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// Human-facing label such as `A1`: column letter followed by the 1-based row.
    #[must_use]
    pub fn label(&self) -> String {
        let letter = u8::try_from(self.column)
            .ok()
            .and_then(|column| b'A'.checked_add(column))
            .filter(u8::is_ascii_uppercase)
            .map_or('?', char::from);
        format!("{letter}{}", self.row.saturating_add(1))
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Contents of a single board cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    /// Free floor the avatar may stand on.
    Empty,
    /// Impassable block; the only obstacle for pathfinding.
    Wall,
    /// The avatar.
    Orb,
    /// A collectible crystal.
    Crystal,
    /// Deposit target for carried crystals.
    Portal,
    /// Recognised stage element without behaviour in the engine.
    MovingWall,
    /// Recognised stage element without behaviour in the engine.
    Switch,
}

impl CellKind {
    /// Reports whether pathfinding must route around the cell.
    #[must_use]
    pub const fn is_obstacle(self) -> bool {
        match self {
            Self::Wall => true,
            Self::Empty
            | Self::Orb
            | Self::Crystal
            | Self::Portal
            | Self::MovingWall
            | Self::Switch => false,
        }
    }

    /// Single-character glyph used by stage files and board dumps.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Empty => '.',
            Self::Wall => '#',
            Self::Orb => 'O',
            Self::Crystal => 'C',
            Self::Portal => 'P',
            Self::MovingWall => 'M',
            Self::Switch => 'S',
        }
    }

    /// Parses a glyph produced by [`CellKind::glyph`].
    #[must_use]
    pub const fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '.' => Some(Self::Empty),
            '#' => Some(Self::Wall),
            'O' => Some(Self::Orb),
            'C' => Some(Self::Crystal),
            'P' => Some(Self::Portal),
            'M' => Some(Self::MovingWall),
            'S' => Some(Self::Switch),
            _ => None,
        }
    }

    /// Lower-case display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Wall => "wall",
            Self::Orb => "orb",
            Self::Crystal => "crystal",
            Self::Portal => "portal",
            Self::MovingWall => "moving wall",
            Self::Switch => "switch",
        }
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Grid read or write addressed a cell outside the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OutOfBounds {
    /// Column that was requested.
    pub column: u32,
    /// Row that was requested.
    pub row: u32,
}

/// Sequential stage number used to look stages up in a repository.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StageNumber(u32);

impl StageNumber {
    /// Creates a new stage number.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// The stage that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for StageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Level {}", self.0)
    }
}

/// Lifecycle of a loaded stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayState {
    /// Taps are accepted.
    Playing,
    /// Every crystal reached the portal. Terminal until reset or load.
    Cleared,
    /// The move budget ran out. Terminal until reset or load.
    Failed,
}

/// Entry in the undo stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveRecord {
    /// The avatar travelled between two cells.
    Move {
        /// Cell the avatar left.
        from: CellCoord,
        /// Cell the avatar arrived on.
        to: CellCoord,
    },
    /// A crystal was picked up.
    Collect {
        /// Cell the crystal was taken from.
        position: CellCoord,
    },
    /// A carried crystal was deposited.
    Place {
        /// Portal that received the crystal.
        position: CellCoord,
    },
}

/// Semantic sound cues emitted by the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioCue {
    /// The avatar moved.
    Move,
    /// A crystal was collected.
    Collect,
    /// A crystal was placed at the portal.
    Place,
    /// The stage was cleared.
    Success,
    /// The move budget ran out.
    Fail,
    /// The stage was reset.
    Reset,
    /// A hint was granted.
    Hint,
    /// The latest move was undone.
    Undo,
}

impl AudioCue {
    /// Stable event name used by audio adapters.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Move => "move",
            Self::Collect => "collect",
            Self::Place => "place",
            Self::Success => "success",
            Self::Fail => "fail",
            Self::Reset => "reset",
            Self::Hint => "hint",
            Self::Undo => "undo",
        }
    }
}

/// What a tap turned into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TapOutcome {
    /// The avatar moved, either to the tapped cell or toward a distant target.
    Moved {
        /// Cell the avatar left.
        from: CellCoord,
        /// Cell the avatar arrived on.
        to: CellCoord,
    },
    /// The tapped crystal was collected.
    Collected {
        /// Cell the crystal was taken from.
        cell: CellCoord,
    },
    /// The carried crystal was deposited at the tapped portal.
    Placed {
        /// Portal that received the crystal.
        cell: CellCoord,
    },
    /// The tap had no effect.
    Ignored,
}

/// Result of an undo request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UndoOutcome {
    /// The record was popped and its inverse applied.
    Undone(MoveRecord),
    /// Nothing was undone and no state changed.
    NoOp,
}

/// Monotonic stamp that ties a deferred timer to the stage session that armed it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(u64);

impl Generation {
    /// Creates a generation from its raw value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the raw value.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// The generation that supersedes this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Work the controller defers through the [`Clock`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerAction {
    /// Rebuild the current stage after a failure.
    ResetStage,
    /// Load the stage named by the progression collaborator after a clear.
    AdvanceStage,
}

/// Deferred action handed to the [`Clock`] and returned to the controller when due.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Timer {
    /// Action to perform when the timer fires.
    pub action: TimerAction,
    /// Session the timer belongs to; stale generations are ignored.
    pub generation: Generation,
}

/// Summary handed to the progression collaborator when a stage is cleared.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StageClear {
    /// Repository number of the cleared stage.
    pub stage: StageNumber,
    /// Identifier declared by the stage definition.
    pub stage_id: String,
    /// Moves spent on the clearing run.
    pub move_count: u32,
    /// Optimal move count declared by the stage.
    pub min_moves: u32,
}

/// Source of stage definitions.
pub trait StageRepository {
    /// Returns the definition registered under `number`.
    fn stage(&self, number: StageNumber) -> Result<StageDefinition, StageError>;
}

/// Receives every grid mutation.
pub trait PresentationSink {
    /// Called after the cell at `cell` changed to `kind`.
    fn on_cell_changed(&mut self, cell: CellCoord, kind: CellKind);
}

/// Fire-and-forget receiver of semantic sound cues.
pub trait AudioSink {
    /// Called once per cue; never awaited.
    fn on_event(&mut self, cue: AudioCue);
}

/// Owner of rewards and stage advancement.
pub trait ProgressionSink {
    /// Called once when a stage transitions to [`PlayState::Cleared`].
    fn on_stage_clear(&mut self, report: &StageClear);

    /// Stage the controller should load when the post-clear timer fires.
    fn next_stage(&self) -> Option<StageNumber>;
}

/// Schedules deferred work.
///
/// The clock never calls back into the controller itself; the host passes
/// the [`Timer`] to the controller once `delay` has elapsed.
pub trait Clock {
    /// Arms `timer` to fire after `delay`.
    fn after(&mut self, delay: Duration, timer: Timer);
}

/// Collaborator that discards everything it receives.
#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;

impl PresentationSink for Silent {
    fn on_cell_changed(&mut self, _cell: CellCoord, _kind: CellKind) {}
}

impl AudioSink for Silent {
    fn on_event(&mut self, _cue: AudioCue) {}
}

impl<T: StageRepository + ?Sized> StageRepository for Rc<RefCell<T>> {
    fn stage(&self, number: StageNumber) -> Result<StageDefinition, StageError> {
        self.borrow().stage(number)
    }
}

impl<T: PresentationSink + ?Sized> PresentationSink for Rc<RefCell<T>> {
    fn on_cell_changed(&mut self, cell: CellCoord, kind: CellKind) {
        self.borrow_mut().on_cell_changed(cell, kind);
    }
}

impl<T: AudioSink + ?Sized> AudioSink for Rc<RefCell<T>> {
    fn on_event(&mut self, cue: AudioCue) {
        self.borrow_mut().on_event(cue);
    }
}

impl<T: ProgressionSink + ?Sized> ProgressionSink for Rc<RefCell<T>> {
    fn on_stage_clear(&mut self, report: &StageClear) {
        self.borrow_mut().on_stage_clear(report);
    }

    fn next_stage(&self) -> Option<StageNumber> {
        self.borrow().next_stage()
    }
}

impl<T: Clock + ?Sized> Clock for Rc<RefCell<T>> {
    fn after(&mut self, delay: Duration, timer: Timer) {
        self.borrow_mut().after(delay, timer);
    }
}

#[cfg(test)]
mod tests {
    use super::{AudioCue, CellCoord, CellKind, MoveRecord, StageNumber};
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn adjacency_excludes_diagonals_and_self() {
        let centre = CellCoord::new(1, 1);
        assert!(centre.is_adjacent(CellCoord::new(1, 0)));
        assert!(centre.is_adjacent(CellCoord::new(2, 1)));
        assert!(!centre.is_adjacent(CellCoord::new(2, 2)));
        assert!(!centre.is_adjacent(centre));
    }

    #[test]
    fn labels_use_column_letter_and_one_based_row() {
        assert_eq!(CellCoord::new(0, 0).label(), "A1");
        assert_eq!(CellCoord::new(2, 1).label(), "C2");
        assert_eq!(CellCoord::new(6, 6).label(), "G7");
    }

    #[test]
    fn glyphs_round_trip_for_every_kind() {
        for kind in [
            CellKind::Empty,
            CellKind::Wall,
            CellKind::Orb,
            CellKind::Crystal,
            CellKind::Portal,
            CellKind::MovingWall,
            CellKind::Switch,
        ] {
            assert_eq!(CellKind::from_glyph(kind.glyph()), Some(kind));
        }
        assert_eq!(CellKind::from_glyph('x'), None);
    }

    #[test]
    fn only_walls_obstruct() {
        assert!(CellKind::Wall.is_obstacle());
        assert!(!CellKind::Crystal.is_obstacle());
        assert!(!CellKind::Portal.is_obstacle());
        assert!(!CellKind::MovingWall.is_obstacle());
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn move_record_round_trips_through_bincode() {
        assert_round_trip(&MoveRecord::Move {
            from: CellCoord::new(0, 0),
            to: CellCoord::new(0, 1),
        });
        assert_round_trip(&MoveRecord::Place {
            position: CellCoord::new(2, 2),
        });
    }

    #[test]
    fn stage_number_advances() {
        assert_eq!(StageNumber::new(3).next(), StageNumber::new(4));
        assert_eq!(StageNumber::new(u32::MAX).next(), StageNumber::new(u32::MAX));
    }

    #[test]
    fn audio_cue_names_are_stable() {
        assert_eq!(AudioCue::Success.name(), "success");
        assert_eq!(AudioCue::Undo.name(), "undo");
    }
}
