//! Avatar position and carried crystal.

use star_forge_core::CellCoord;

/// Where the orb stands and whether it holds a crystal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PlayerState {
    position: CellCoord,
    carrying_crystal: bool,
}

impl PlayerState {
    /// Places an empty-handed player on `start`.
    pub(crate) const fn new(start: CellCoord) -> Self {
        Self {
            position: start,
            carrying_crystal: false,
        }
    }

    pub(crate) const fn position(&self) -> CellCoord {
        self.position
    }

    pub(crate) const fn is_carrying(&self) -> bool {
        self.carrying_crystal
    }

    /// Relocates the player without any path or adjacency check.
    pub(crate) fn move_to(&mut self, cell: CellCoord) {
        self.position = cell;
    }

    pub(crate) fn pick_up(&mut self) {
        self.carrying_crystal = true;
    }

    pub(crate) fn put_down(&mut self) {
        self.carrying_crystal = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty_handed_on_start_cell() {
        let player = PlayerState::new(CellCoord::new(2, 1));
        assert_eq!(player.position(), CellCoord::new(2, 1));
        assert!(!player.is_carrying());
    }

    #[test]
    fn carrying_toggles() {
        let mut player = PlayerState::new(CellCoord::new(0, 0));
        player.pick_up();
        assert!(player.is_carrying());
        player.move_to(CellCoord::new(0, 1));
        assert!(player.is_carrying());
        player.put_down();
        assert!(!player.is_carrying());
        assert_eq!(player.position(), CellCoord::new(0, 1));
    }
}
