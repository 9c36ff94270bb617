#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays scripted Star Forge sessions.

mod script;

use std::{cell::RefCell, fs, path::PathBuf, rc::Rc};

use anyhow::{Context, Result};
use clap::Parser;
use star_forge_core::{
    AudioCue, AudioSink, CellCoord, CellKind, PresentationSink, StageNumber, StageRepository,
    Timer,
};
use star_forge_system_hint::request_hint;
use star_forge_system_progression::Progression;
use star_forge_world::{
    query, BuiltinStages, Collaborators, GameConfig, GameController, ManualClock, StageCatalogue,
};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use script::Action;

/// Star Forge - grid puzzle played from the command line
#[derive(Parser, Debug)]
#[command(name = "star-forge", version)]
struct Cli {
    /// Stage number to start on
    #[arg(long, default_value_t = 1)]
    stage: u32,

    /// TOML stage catalogue; the built-in stages are used when absent
    #[arg(long)]
    stages: Option<PathBuf>,

    /// TOML file with timing overrides
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stardust balance to start with
    #[arg(long, default_value_t = 0)]
    stardust: u32,

    /// Fire every pending timer once the script finished
    #[arg(long)]
    settle: bool,

    /// Actions to play: tap:C,R  undo  reset  hint  wait:MS  describe:C,R
    #[arg(value_name = "ACTION")]
    actions: Vec<Action>,
}

/// Entry point for the Star Forge command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_ref())?;
    let stages: Box<dyn StageRepository> = match &cli.stages {
        Some(path) => Box::new(
            StageCatalogue::from_path(path)
                .with_context(|| format!("failed to load stages from {}", path.display()))?,
        ),
        None => Box::new(BuiltinStages),
    };

    let first_stage = StageNumber::new(cli.stage);
    let progression = Rc::new(RefCell::new(Progression::new(first_stage, cli.stardust)));
    let clock = Rc::new(RefCell::new(ManualClock::new()));
    let collaborators = Collaborators {
        stages,
        presentation: Box::new(LoggedCells),
        audio: Box::new(LoggedCues),
        progression: Box::new(Rc::clone(&progression)),
        clock: Box::new(Rc::clone(&clock)),
    };
    let mut controller = GameController::new(config, collaborators, first_stage)
        .with_context(|| format!("failed to start {first_stage}"))?;

    println!("{}", query::welcome_banner(&controller));
    print_status(&controller, &progression.borrow());

    for action in &cli.actions {
        perform(*action, &mut controller, &progression, &clock)?;
    }

    if cli.settle {
        let timers = clock.borrow_mut().advance_to_end();
        fire_all(&mut controller, timers)?;
    }

    print_status(&controller, &progression.borrow());
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration {}", path.display()))?;
    GameConfig::from_toml_str(&contents)
        .with_context(|| format!("failed to parse configuration {}", path.display()))
}

fn perform(
    action: Action,
    controller: &mut GameController,
    progression: &Rc<RefCell<Progression>>,
    clock: &Rc<RefCell<ManualClock>>,
) -> Result<()> {
    debug!(?action, "performing scripted action");
    match action {
        Action::Tap(cell) => {
            let outcome = controller.tap_cell(cell);
            println!("tap {cell}: {outcome:?}");
        }
        Action::Undo => {
            let outcome = controller.undo_move();
            println!("undo: {outcome:?}");
        }
        Action::Reset => {
            controller.reset_stage();
            println!("reset");
        }
        Action::Hint => {
            match request_hint(controller, &mut progression.borrow_mut(), &mut LoggedCues) {
                Ok(hint) => match hint.target {
                    Some(target) => println!("hint: {} ({})", hint.advice.message(), target.label()),
                    None => println!("hint: {}", hint.advice.message()),
                },
                Err(error) => println!("hint refused: {error}"),
            }
        }
        Action::Wait(duration) => {
            let timers = clock.borrow_mut().advance(duration);
            fire_all(controller, timers)?;
        }
        Action::Describe(cell) => match query::describe_cell(controller, cell) {
            Some(description) => println!("{description}"),
            None => println!("{cell} is outside the board"),
        },
    }
    Ok(())
}

fn fire_all(controller: &mut GameController, timers: Vec<Timer>) -> Result<()> {
    for timer in timers {
        let applied = controller
            .fire_timer(timer)
            .with_context(|| format!("failed to apply {:?}", timer.action))?;
        if applied {
            println!("timer: {:?}", timer.action);
        }
    }
    Ok(())
}

fn print_status(controller: &GameController, progression: &Progression) {
    let tally = query::crystals(controller);
    println!(
        "{} ({}) {:?}: moves {}/{}, crystals placed {}/{}, stardust {}",
        query::stage_number(controller),
        query::stage(controller).id(),
        query::play_state(controller),
        query::move_count(controller),
        query::move_limit(controller),
        tally.placed,
        tally.total,
        progression.stardust(),
    );
    println!("{}", query::grid(controller));
}

struct LoggedCells;

impl PresentationSink for LoggedCells {
    fn on_cell_changed(&mut self, cell: CellCoord, kind: CellKind) {
        debug!(%cell, %kind, "cell changed");
    }
}

struct LoggedCues;

impl AudioSink for LoggedCues {
    fn on_event(&mut self, cue: AudioCue) {
        info!(cue = cue.name(), "audio cue");
    }
}
