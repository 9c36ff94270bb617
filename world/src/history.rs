//! Undo stack of applied moves.

use star_forge_core::MoveRecord;

/// Ordered record of every move applied since the stage was (re)built.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct MoveHistory {
    records: Vec<MoveRecord>,
}

impl MoveHistory {
    pub(crate) fn push(&mut self, record: MoveRecord) {
        self.records.push(record);
    }

    /// Removes and returns the most recent record.
    pub(crate) fn pop(&mut self) -> Option<MoveRecord> {
        self.records.pop()
    }

    pub(crate) fn clear(&mut self) {
        self.records.clear();
    }

    pub(crate) fn records(&self) -> &[MoveRecord] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use star_forge_core::CellCoord;

    #[test]
    fn pops_in_reverse_order() {
        let mut history = MoveHistory::default();
        let first = MoveRecord::Move {
            from: CellCoord::new(0, 0),
            to: CellCoord::new(0, 1),
        };
        let second = MoveRecord::Collect {
            position: CellCoord::new(1, 1),
        };
        history.push(first);
        history.push(second);

        assert_eq!(history.records(), &[first, second]);
        assert_eq!(history.pop(), Some(second));
        assert_eq!(history.pop(), Some(first));
        assert_eq!(history.pop(), None);
    }

    #[test]
    fn clear_empties_the_stack() {
        let mut history = MoveHistory::default();
        history.push(MoveRecord::Place {
            position: CellCoord::new(2, 2),
        });
        history.clear();
        assert!(history.records().is_empty());
    }
}
