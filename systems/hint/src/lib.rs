#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure hint system that sells the player a suggestion for their next step.

use star_forge_core::{AudioCue, AudioSink, CellCoord, CellKind, PlayState};
use star_forge_system_progression::Progression;
use star_forge_world::{find_path, query, GameController};
use thiserror::Error;
use tracing::debug;

/// Stardust charged for every granted hint.
pub const HINT_COST: u32 = 50;

/// Kind of suggestion offered to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Advice {
    /// The player holds a crystal and should deliver it.
    PlaceCrystal,
    /// Crystals remain on the board.
    CollectCrystal,
    /// Nothing is left to pick up.
    ShortestRoute,
}

impl Advice {
    /// Player-facing message.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::PlaceCrystal => "Place the crystal at the portal.",
            Self::CollectCrystal => "Collect a crystal.",
            Self::ShortestRoute => "Take the shortest route.",
        }
    }
}

/// Suggestion granted to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Hint {
    /// What the player should do next.
    pub advice: Advice,
    /// Cell worth highlighting, when the advice points at one.
    pub target: Option<CellCoord>,
}

/// Reasons a hint was refused. A refused hint charges nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum HintError {
    /// The balance does not cover [`HINT_COST`].
    #[error("a hint costs {cost} stardust but only {balance} is available")]
    InsufficientStardust {
        /// Price of a hint.
        cost: u32,
        /// Balance at the time of the request.
        balance: u32,
    },
    /// The stage already ended.
    #[error("hints are only available while playing")]
    NotPlaying,
}

/// Works out the advice for the controller's current state without charging for it.
#[must_use]
pub fn advise(controller: &GameController) -> Hint {
    let tally = query::crystals(controller);
    if query::is_carrying(controller) {
        Hint {
            advice: Advice::PlaceCrystal,
            target: Some(query::stage(controller).portal()),
        }
    } else if tally.collected < tally.total {
        Hint {
            advice: Advice::CollectCrystal,
            target: nearest_crystal(controller),
        }
    } else {
        Hint {
            advice: Advice::ShortestRoute,
            target: None,
        }
    }
}

/// Charges [`HINT_COST`] and returns the advice, announcing it with [`AudioCue::Hint`].
pub fn request_hint(
    controller: &GameController,
    progression: &mut Progression,
    audio: &mut dyn AudioSink,
) -> Result<Hint, HintError> {
    if query::play_state(controller) != PlayState::Playing {
        return Err(HintError::NotPlaying);
    }

    let balance = progression.stardust();
    if !progression.spend(HINT_COST) {
        debug!(balance, cost = HINT_COST, "hint refused");
        return Err(HintError::InsufficientStardust {
            cost: HINT_COST,
            balance,
        });
    }

    let hint = advise(controller);
    audio.on_event(AudioCue::Hint);
    debug!(advice = ?hint.advice, target = ?hint.target, balance = progression.stardust(), "hint granted");
    Ok(hint)
}

fn nearest_crystal(controller: &GameController) -> Option<CellCoord> {
    let grid = query::grid(controller);
    let start = query::player_position(controller);
    let mut best: Option<(usize, CellCoord)> = None;
    for &crystal in query::stage(controller).crystals() {
        if grid.get(crystal) != Ok(CellKind::Crystal) {
            continue;
        }
        let Some(route) = find_path(grid, start, crystal) else {
            continue;
        };
        if best.map_or(true, |(length, _)| route.len() < length) {
            best = Some((route.len(), crystal));
        }
    }
    best.map(|(_, crystal)| crystal)
}

#[cfg(test)]
mod tests {
    use super::Advice;

    #[test]
    fn messages_are_distinct() {
        assert_ne!(
            Advice::PlaceCrystal.message(),
            Advice::CollectCrystal.message()
        );
        assert_ne!(
            Advice::CollectCrystal.message(),
            Advice::ShortestRoute.message()
        );
    }
}
