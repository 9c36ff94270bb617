//! Immutable stage descriptions and their validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CellCoord, CellKind, StageNumber, SUPPORTED_SIZES};

/// Reasons stage data is rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StageError {
    /// The board edge length is not one of [`SUPPORTED_SIZES`].
    #[error("unsupported board size {size}; expected one of 3, 5 or 7")]
    UnsupportedSize {
        /// Declared edge length.
        size: u32,
    },
    /// The matrix does not have `size` rows.
    #[error("expected {expected} rows, found {found}")]
    RowCount {
        /// Declared edge length.
        expected: u32,
        /// Rows present.
        found: usize,
    },
    /// A matrix row does not have `size` cells.
    #[error("row {row} has {found} cells, expected {expected}")]
    RowLength {
        /// Offending row.
        row: u32,
        /// Declared edge length.
        expected: u32,
        /// Cells present.
        found: usize,
    },
    /// A stage row contained a character that names no cell kind.
    #[error("unknown glyph {glyph:?} at {cell}")]
    UnknownGlyph {
        /// Position of the glyph.
        cell: CellCoord,
        /// The unrecognised character.
        glyph: char,
    },
    /// A listed position lies outside the board.
    #[error("{what} position {cell} lies outside the board")]
    OutOfBounds {
        /// Which list the position came from.
        what: &'static str,
        /// The offending position.
        cell: CellCoord,
    },
    /// The board has no orb to start from.
    #[error("stage has no orb")]
    MissingOrb,
    /// The board has no portal.
    #[error("stage has no portal")]
    MissingPortal,
    /// The same crystal position appears twice.
    #[error("crystal {cell} is listed more than once")]
    DuplicateCrystal {
        /// Repeated position.
        cell: CellCoord,
    },
    /// The stage lists no crystals, so it could never be cleared.
    #[error("stage lists no crystals")]
    NoCrystals,
    /// A stage with a zero move limit fails before the first tap.
    #[error("move limit must be positive")]
    ZeroMoveLimit,
    /// A listed position disagrees with the matrix.
    #[error("cell {cell} should be {expected} but the matrix holds {found}")]
    CellMismatch {
        /// Position named by a list.
        cell: CellCoord,
        /// Kind implied by the list.
        expected: CellKind,
        /// Kind found in the matrix.
        found: CellKind,
    },
    /// The matrix holds a token that none of the position lists mention.
    #[error("matrix holds an unlisted {kind} at {cell}")]
    UnlistedCell {
        /// Position of the token.
        cell: CellCoord,
        /// Kind of the token.
        kind: CellKind,
    },
    /// The repository holds no stage under the requested number.
    #[error("no stage registered for {number}")]
    MissingStage {
        /// Requested number.
        number: StageNumber,
    },
}

/// Relative step used by gimmick movement patterns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepOffset {
    /// Column delta.
    pub dx: i32,
    /// Row delta.
    pub dy: i32,
}

/// Stage modifier carried as data only; the engine never interprets it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GimmickDescriptor {
    /// Free-form kind tag such as `moving_wall`.
    pub kind: String,
    /// Anchor cell, when the gimmick has one.
    pub position: Option<CellCoord>,
    /// Initial heading, when the gimmick declares one.
    pub direction: Option<String>,
    /// Repeating movement pattern, when the gimmick declares one.
    pub move_pattern: Vec<StepOffset>,
}

/// Unvalidated ingredients of a [`StageDefinition`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageParts {
    /// Stage identifier such as `3x3_001`.
    pub id: String,
    /// Board edge length.
    pub size: u32,
    /// Number of moves after which the stage fails.
    pub move_limit: u32,
    /// Optimal move count reported on clear.
    pub min_moves: u32,
    /// Cell the orb starts on.
    pub start: CellCoord,
    /// Rows of the initial board, top to bottom.
    pub rows: Vec<Vec<CellKind>>,
    /// Crystal positions in collection order.
    pub crystals: Vec<CellCoord>,
    /// Portal position.
    pub portal: CellCoord,
    /// Wall positions.
    pub walls: Vec<CellCoord>,
    /// Inert gimmick metadata.
    pub gimmicks: Vec<GimmickDescriptor>,
}

/// Validated, immutable description of one puzzle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageDefinition {
    id: String,
    size: u32,
    move_limit: u32,
    min_moves: u32,
    start: CellCoord,
    cells: Vec<CellKind>,
    crystals: Vec<CellCoord>,
    portal: CellCoord,
    walls: Vec<CellCoord>,
    gimmicks: Vec<GimmickDescriptor>,
}

impl StageDefinition {
    /// Validates `parts` and freezes them into a stage.
    ///
    /// The matrix and the position lists must agree exactly: every listed
    /// crystal, wall, the portal and the start cell hold the matching kind,
    /// and no orb, crystal, portal or wall appears in the matrix unlisted.
    pub fn new(parts: StageParts) -> Result<Self, StageError> {
        let StageParts {
            id,
            size,
            move_limit,
            min_moves,
            start,
            rows,
            crystals,
            portal,
            walls,
            gimmicks,
        } = parts;

        if !SUPPORTED_SIZES.contains(&size) {
            return Err(StageError::UnsupportedSize { size });
        }
        if move_limit == 0 {
            return Err(StageError::ZeroMoveLimit);
        }

        let cells = flatten_rows(size, rows)?;

        check_in_bounds(size, "start", start)?;
        check_in_bounds(size, "portal", portal)?;
        for &crystal in &crystals {
            check_in_bounds(size, "crystal", crystal)?;
        }
        for &wall in &walls {
            check_in_bounds(size, "wall", wall)?;
        }

        if crystals.is_empty() {
            return Err(StageError::NoCrystals);
        }
        for (index, crystal) in crystals.iter().enumerate() {
            if crystals[..index].contains(crystal) {
                return Err(StageError::DuplicateCrystal { cell: *crystal });
            }
        }

        let stage = Self {
            id,
            size,
            move_limit,
            min_moves,
            start,
            cells,
            crystals,
            portal,
            walls,
            gimmicks,
        };
        stage.check_matrix()?;
        Ok(stage)
    }

    /// Builds a stage from glyph rows, deriving the position lists from the matrix.
    ///
    /// Crystals and walls are listed in row-major order. The first orb becomes
    /// the start cell and the first portal the deposit target; any further
    /// orb or portal is rejected as unlisted.
    pub fn from_rows<S>(
        id: impl Into<String>,
        move_limit: u32,
        min_moves: u32,
        rows: &[S],
        gimmicks: Vec<GimmickDescriptor>,
    ) -> Result<Self, StageError>
    where
        S: AsRef<str>,
    {
        let size = u32::try_from(rows.len()).unwrap_or(u32::MAX);
        let mut parsed = Vec::with_capacity(rows.len());
        let mut start = None;
        let mut portal = None;
        let mut crystals = Vec::new();
        let mut walls = Vec::new();

        for (row, line) in (0u32..).zip(rows) {
            let line: &str = line.as_ref();
            let mut parsed_row = Vec::new();
            for (column, glyph) in (0u32..).zip(line.chars()) {
                let cell = CellCoord::new(column, row);
                let kind =
                    CellKind::from_glyph(glyph).ok_or(StageError::UnknownGlyph { cell, glyph })?;
                match kind {
                    CellKind::Orb => {
                        let _ = start.get_or_insert(cell);
                    }
                    CellKind::Portal => {
                        let _ = portal.get_or_insert(cell);
                    }
                    CellKind::Crystal => crystals.push(cell),
                    CellKind::Wall => walls.push(cell),
                    CellKind::Empty | CellKind::MovingWall | CellKind::Switch => {}
                }
                parsed_row.push(kind);
            }
            parsed.push(parsed_row);
        }

        Self::new(StageParts {
            id: id.into(),
            size,
            move_limit,
            min_moves,
            start: start.ok_or(StageError::MissingOrb)?,
            rows: parsed,
            crystals,
            portal: portal.ok_or(StageError::MissingPortal)?,
            walls,
            gimmicks,
        })
    }

    /// Stage identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Board edge length.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Number of moves after which the stage fails.
    #[must_use]
    pub const fn move_limit(&self) -> u32 {
        self.move_limit
    }

    /// Optimal move count.
    #[must_use]
    pub const fn min_moves(&self) -> u32 {
        self.min_moves
    }

    /// Cell the orb starts on.
    #[must_use]
    pub const fn start(&self) -> CellCoord {
        self.start
    }

    /// Initial board in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[CellKind] {
        &self.cells
    }

    /// Initial kind of a single cell, if it lies on the board.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> Option<CellKind> {
        index(self.size, cell).and_then(|offset| self.cells.get(offset).copied())
    }

    /// Crystal positions in collection order.
    #[must_use]
    pub fn crystals(&self) -> &[CellCoord] {
        &self.crystals
    }

    /// Portal position.
    #[must_use]
    pub const fn portal(&self) -> CellCoord {
        self.portal
    }

    /// Wall positions.
    #[must_use]
    pub fn walls(&self) -> &[CellCoord] {
        &self.walls
    }

    /// Inert gimmick metadata.
    #[must_use]
    pub fn gimmicks(&self) -> &[GimmickDescriptor] {
        &self.gimmicks
    }

    fn check_matrix(&self) -> Result<(), StageError> {
        let expect = |cell: CellCoord, expected: CellKind| -> Result<(), StageError> {
            let found = self.cell(cell).unwrap_or(CellKind::Empty);
            if found == expected {
                Ok(())
            } else {
                Err(StageError::CellMismatch {
                    cell,
                    expected,
                    found,
                })
            }
        };

        expect(self.start, CellKind::Orb)?;
        expect(self.portal, CellKind::Portal)?;
        for &crystal in &self.crystals {
            expect(crystal, CellKind::Crystal)?;
        }
        for &wall in &self.walls {
            expect(wall, CellKind::Wall)?;
        }

        for row in 0..self.size {
            for column in 0..self.size {
                let cell = CellCoord::new(column, row);
                let kind = self.cell(cell).unwrap_or(CellKind::Empty);
                let listed = match kind {
                    CellKind::Orb => cell == self.start,
                    CellKind::Portal => cell == self.portal,
                    CellKind::Crystal => self.crystals.contains(&cell),
                    CellKind::Wall => self.walls.contains(&cell),
                    CellKind::Empty | CellKind::MovingWall | CellKind::Switch => true,
                };
                if !listed {
                    return Err(StageError::UnlistedCell { cell, kind });
                }
            }
        }

        Ok(())
    }
}

fn flatten_rows(size: u32, rows: Vec<Vec<CellKind>>) -> Result<Vec<CellKind>, StageError> {
    if u32::try_from(rows.len()).ok() != Some(size) {
        return Err(StageError::RowCount {
            expected: size,
            found: rows.len(),
        });
    }

    let mut cells = Vec::with_capacity(rows.len() * rows.len());
    for (row, cells_in_row) in (0u32..).zip(rows) {
        if u32::try_from(cells_in_row.len()).ok() != Some(size) {
            return Err(StageError::RowLength {
                row,
                expected: size,
                found: cells_in_row.len(),
            });
        }
        cells.extend(cells_in_row);
    }
    Ok(cells)
}

fn check_in_bounds(size: u32, what: &'static str, cell: CellCoord) -> Result<(), StageError> {
    if cell.column() < size && cell.row() < size {
        Ok(())
    } else {
        Err(StageError::OutOfBounds { what, cell })
    }
}

fn index(size: u32, cell: CellCoord) -> Option<usize> {
    if cell.column() >= size || cell.row() >= size {
        return None;
    }
    let width = usize::try_from(size).ok()?;
    let column = usize::try_from(cell.column()).ok()?;
    let row = usize::try_from(cell.row()).ok()?;
    row.checked_mul(width)?.checked_add(column)
}
