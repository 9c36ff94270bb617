use std::{cell::RefCell, rc::Rc};

use star_forge_core::{AudioCue, AudioSink, CellCoord, Silent, StageNumber};
use star_forge_system_hint::{advise, request_hint, Advice, Hint, HintError, HINT_COST};
use star_forge_system_progression::Progression;
use star_forge_world::{BuiltinStages, Collaborators, GameConfig, GameController, ManualClock};

#[derive(Default)]
struct CueLog {
    cues: Vec<AudioCue>,
}

impl AudioSink for CueLog {
    fn on_event(&mut self, cue: AudioCue) {
        self.cues.push(cue);
    }
}

fn controller(progression: &Rc<RefCell<Progression>>) -> GameController {
    let collaborators = Collaborators {
        stages: Box::new(BuiltinStages),
        presentation: Box::new(Silent),
        audio: Box::new(Silent),
        progression: Box::new(Rc::clone(progression)),
        clock: Box::new(ManualClock::new()),
    };
    GameController::new(GameConfig::default(), collaborators, StageNumber::new(1))
        .expect("stage 1 loads")
}

fn tap_all(controller: &mut GameController, cells: &[(u32, u32)]) {
    for &(column, row) in cells {
        let _ = controller.tap_cell(CellCoord::new(column, row));
    }
}

#[test]
fn empty_handed_player_is_pointed_at_nearest_crystal() {
    let progression = Rc::new(RefCell::new(Progression::default()));
    let controller = controller(&progression);

    assert_eq!(
        advise(&controller),
        Hint {
            advice: Advice::CollectCrystal,
            target: Some(CellCoord::new(1, 1)),
        }
    );
}

#[test]
fn carrying_player_is_pointed_at_portal() {
    let progression = Rc::new(RefCell::new(Progression::default()));
    let mut controller = controller(&progression);
    tap_all(&mut controller, &[(2, 0), (2, 1)]);

    assert_eq!(
        advise(&controller),
        Hint {
            advice: Advice::PlaceCrystal,
            target: Some(CellCoord::new(2, 2)),
        }
    );
}

#[test]
fn nothing_left_to_collect_suggests_shortest_route() {
    let progression = Rc::new(RefCell::new(Progression::default()));
    let mut controller = controller(&progression);
    tap_all(
        &mut controller,
        &[(2, 0), (2, 1), (2, 1), (2, 2), (1, 1), (2, 2)],
    );

    assert_eq!(advise(&controller).advice, Advice::ShortestRoute);
    assert_eq!(advise(&controller).target, None);
}

#[test]
fn granted_hint_charges_and_plays_cue() {
    let progression = Rc::new(RefCell::new(Progression::new(StageNumber::new(1), 120)));
    let controller = controller(&progression);
    let mut audio = CueLog::default();

    let hint = request_hint(&controller, &mut progression.borrow_mut(), &mut audio)
        .expect("balance covers the cost");

    assert_eq!(hint.advice, Advice::CollectCrystal);
    assert_eq!(progression.borrow().stardust(), 120 - HINT_COST);
    assert_eq!(audio.cues, vec![AudioCue::Hint]);
}

#[test]
fn insufficient_stardust_charges_nothing() {
    let progression = Rc::new(RefCell::new(Progression::new(StageNumber::new(1), 40)));
    let controller = controller(&progression);
    let mut audio = CueLog::default();

    let error = request_hint(&controller, &mut progression.borrow_mut(), &mut audio)
        .expect_err("balance too low");

    assert_eq!(
        error,
        HintError::InsufficientStardust {
            cost: HINT_COST,
            balance: 40
        }
    );
    assert_eq!(progression.borrow().stardust(), 40);
    assert!(audio.cues.is_empty());
}

#[test]
fn cleared_stage_refuses_hints() {
    let progression = Rc::new(RefCell::new(Progression::default()));
    let mut controller = controller(&progression);
    tap_all(
        &mut controller,
        &[(2, 0), (2, 1), (2, 1), (2, 2), (1, 1), (2, 2)],
    );
    let balance = progression.borrow().stardust();
    assert_eq!(balance, 100);

    let error = request_hint(&controller, &mut progression.borrow_mut(), &mut Silent)
        .expect_err("stage is over");

    assert_eq!(error, HintError::NotPlaying);
    assert_eq!(progression.borrow().stardust(), balance);
}
