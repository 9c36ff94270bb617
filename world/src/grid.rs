//! Dense cell matrix owned by the game controller.

use std::fmt;

use star_forge_core::{CellCoord, CellKind, OutOfBounds, PresentationSink, StageDefinition};

/// Mutable square board of [`CellKind`] values stored in row-major order.
///
/// The matrix is an independent copy of the stage's initial layout, so
/// mutating it never touches the [`StageDefinition`] it was built from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridModel {
    size: u32,
    cells: Vec<CellKind>,
}

impl GridModel {
    /// Copies the initial layout of `stage`.
    #[must_use]
    pub(crate) fn from_stage(stage: &StageDefinition) -> Self {
        Self {
            size: stage.size(),
            cells: stage.cells().to_vec(),
        }
    }

    /// Overwrites every cell with the stage's initial layout and reports each one.
    pub(crate) fn restore(&mut self, stage: &StageDefinition, sink: &mut dyn PresentationSink) {
        self.size = stage.size();
        self.cells.clear();
        self.cells.extend_from_slice(stage.cells());
        for (offset, kind) in self.cells.iter().enumerate() {
            if let Some(cell) = self.coord(offset) {
                sink.on_cell_changed(cell, *kind);
            }
        }
    }

    /// Board edge length.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Reads a cell.
    pub fn get(&self, cell: CellCoord) -> Result<CellKind, OutOfBounds> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
            .ok_or(out_of_bounds(cell))
    }

    /// Writes a cell and reports the new kind to `sink`.
    pub(crate) fn set(
        &mut self,
        cell: CellCoord,
        kind: CellKind,
        sink: &mut dyn PresentationSink,
    ) -> Result<(), OutOfBounds> {
        let slot = self
            .index(cell)
            .and_then(|index| self.cells.get_mut(index))
            .ok_or(out_of_bounds(cell))?;
        *slot = kind;
        sink.on_cell_changed(cell, kind);
        Ok(())
    }

    /// Reports whether the two cells share an edge.
    #[must_use]
    pub fn is_adjacent(&self, a: CellCoord, b: CellCoord) -> bool {
        a.is_adjacent(b)
    }

    /// Reports whether the cell lies on the board.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.size && cell.row() < self.size
    }

    /// Cells in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[CellKind] {
        &self.cells
    }

    /// Number of cells holding `kind`.
    #[must_use]
    pub fn count(&self, kind: CellKind) -> usize {
        self.cells.iter().filter(|cell| **cell == kind).count()
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if self.contains(cell) {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.size).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    fn coord(&self, offset: usize) -> Option<CellCoord> {
        let width = usize::try_from(self.size).ok().filter(|width| *width > 0)?;
        let column = u32::try_from(offset % width).ok()?;
        let row = u32::try_from(offset / width).ok()?;
        Some(CellCoord::new(column, row))
    }
}

impl fmt::Display for GridModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = usize::try_from(self.size).unwrap_or(0).max(1);
        for (row, cells) in self.cells.chunks(width).enumerate() {
            if row > 0 {
                f.write_str("\n")?;
            }
            for cell in cells {
                write!(f, "{}", cell.glyph())?;
            }
        }
        Ok(())
    }
}

const fn out_of_bounds(cell: CellCoord) -> OutOfBounds {
    OutOfBounds {
        column: cell.column(),
        row: cell.row(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use star_forge_core::Silent;

    #[derive(Default)]
    struct Recorder {
        changes: Vec<(CellCoord, CellKind)>,
    }

    impl PresentationSink for Recorder {
        fn on_cell_changed(&mut self, cell: CellCoord, kind: CellKind) {
            self.changes.push((cell, kind));
        }
    }

    fn stage() -> StageDefinition {
        StageDefinition::from_rows("grid", 6, 5, &["O#.", ".CC", "..P"], Vec::new())
            .expect("valid stage")
    }

    #[test]
    fn get_reports_out_of_bounds() {
        let grid = GridModel::from_stage(&stage());
        assert_eq!(grid.get(CellCoord::new(1, 0)), Ok(CellKind::Wall));
        assert_eq!(
            grid.get(CellCoord::new(3, 1)),
            Err(OutOfBounds { column: 3, row: 1 })
        );
    }

    #[test]
    fn set_notifies_presentation() {
        let mut grid = GridModel::from_stage(&stage());
        let mut recorder = Recorder::default();

        grid.set(CellCoord::new(0, 1), CellKind::Orb, &mut recorder)
            .expect("in bounds");

        assert_eq!(grid.get(CellCoord::new(0, 1)), Ok(CellKind::Orb));
        assert_eq!(
            recorder.changes,
            vec![(CellCoord::new(0, 1), CellKind::Orb)]
        );
    }

    #[test]
    fn set_out_of_bounds_leaves_grid_untouched() {
        let mut grid = GridModel::from_stage(&stage());
        let before = grid.clone();
        let mut recorder = Recorder::default();

        let result = grid.set(CellCoord::new(0, 7), CellKind::Wall, &mut recorder);

        assert_eq!(result, Err(OutOfBounds { column: 0, row: 7 }));
        assert_eq!(grid, before);
        assert!(recorder.changes.is_empty());
    }

    #[test]
    fn restore_rebuilds_initial_layout() {
        let stage = stage();
        let mut grid = GridModel::from_stage(&stage);
        for offset in 0..3 {
            grid.set(CellCoord::new(offset, 2), CellKind::Wall, &mut Silent)
                .expect("in bounds");
        }

        let mut recorder = Recorder::default();
        grid.restore(&stage, &mut recorder);

        assert_eq!(grid.cells(), stage.cells());
        assert_eq!(recorder.changes.len(), 9);
        assert_eq!(recorder.changes[8], (CellCoord::new(2, 2), CellKind::Portal));
    }

    #[test]
    fn displays_rows_of_glyphs() {
        let grid = GridModel::from_stage(&stage());
        assert_eq!(grid.to_string(), "O#.\n.CC\n..P");
        assert_eq!(grid.count(CellKind::Crystal), 2);
    }
}
