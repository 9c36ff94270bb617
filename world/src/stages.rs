//! Stage repositories: the built-in campaign and TOML catalogues.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use star_forge_core::{
    CellCoord, GimmickDescriptor, StageDefinition, StageError, StageNumber, StageRepository,
    StepOffset,
};
use thiserror::Error;

/// Stages shipped with the game.
///
/// Levels 1 and 2 are hand-made; every other level number resolves to a
/// generated open 3×3 board.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinStages;

impl StageRepository for BuiltinStages {
    fn stage(&self, number: StageNumber) -> Result<StageDefinition, StageError> {
        match number.get() {
            1 => StageDefinition::from_rows("3x3_001", 6, 5, &["O#.", ".CC", "..P"], Vec::new()),
            2 => StageDefinition::from_rows(
                "3x3_002",
                8,
                7,
                &["O.C", ".#.", ".CP"],
                vec![GimmickDescriptor {
                    kind: "moving_wall".to_owned(),
                    position: Some(CellCoord::new(1, 1)),
                    direction: Some("right".to_owned()),
                    move_pattern: vec![StepOffset { dx: 1, dy: 0 }, StepOffset { dx: -1, dy: 0 }],
                }],
            ),
            level => StageDefinition::from_rows(
                format!("3x3_{level:03}"),
                8,
                6,
                &["O.C", "...", "C.P"],
                Vec::new(),
            ),
        }
    }
}

/// Stage repository backed by a TOML document.
///
/// ```toml
/// [[stage]]
/// number = 1
/// id = "3x3_001"
/// move_limit = 6
/// min_moves = 5
/// rows = ["O#.", ".CC", "..P"]
/// ```
#[derive(Clone, Debug, Default)]
pub struct StageCatalogue {
    stages: BTreeMap<StageNumber, StageDefinition>,
}

impl StageCatalogue {
    /// Reads and validates the catalogue stored at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogueError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| CatalogueError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates a catalogue document.
    pub fn from_toml_str(contents: &str) -> Result<Self, CatalogueError> {
        let document: CatalogueDocument = toml::from_str(contents)?;
        let mut stages = BTreeMap::new();
        for entry in document.stage {
            let number = StageNumber::new(entry.number);
            let stage = StageDefinition::from_rows(
                entry.id,
                entry.move_limit,
                entry.min_moves,
                &entry.rows,
                entry.gimmicks,
            )
            .map_err(|source| CatalogueError::Stage { number, source })?;
            if stages.insert(number, stage).is_some() {
                return Err(CatalogueError::DuplicateNumber { number });
            }
        }
        Ok(Self { stages })
    }

    /// Number of stages in the catalogue.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Reports whether the catalogue holds no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl StageRepository for StageCatalogue {
    fn stage(&self, number: StageNumber) -> Result<StageDefinition, StageError> {
        self.stages
            .get(&number)
            .cloned()
            .ok_or(StageError::MissingStage { number })
    }
}

/// Reasons a stage catalogue cannot be loaded.
#[derive(Debug, Error)]
pub enum CatalogueError {
    /// The catalogue file could not be read.
    #[error("failed to read stage catalogue at {}", path.display())]
    Io {
        /// Location that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The document is not valid TOML or does not match the catalogue layout.
    #[error("invalid stage catalogue: {0}")]
    Parse(#[from] toml::de::Error),
    /// A stage entry failed validation.
    #[error("stage {number} is invalid: {source}")]
    Stage {
        /// Number of the rejected entry.
        number: StageNumber,
        /// Validation failure.
        #[source]
        source: StageError,
    },
    /// Two entries share a stage number.
    #[error("{number} is defined more than once")]
    DuplicateNumber {
        /// Repeated number.
        number: StageNumber,
    },
}

#[derive(Debug, Deserialize)]
struct CatalogueDocument {
    #[serde(default)]
    stage: Vec<CatalogueEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogueEntry {
    number: u32,
    id: String,
    move_limit: u32,
    min_moves: u32,
    rows: Vec<String>,
    #[serde(default)]
    gimmicks: Vec<GimmickDescriptor>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use star_forge_core::CellKind;

    #[test]
    fn builtin_first_stage_matches_tutorial_layout() {
        let stage = BuiltinStages.stage(StageNumber::new(1)).expect("valid stage");
        assert_eq!(stage.id(), "3x3_001");
        assert_eq!(stage.move_limit(), 6);
        assert_eq!(stage.min_moves(), 5);
        assert_eq!(stage.start(), CellCoord::new(0, 0));
        assert_eq!(stage.walls(), &[CellCoord::new(1, 0)]);
        assert_eq!(
            stage.crystals(),
            &[CellCoord::new(1, 1), CellCoord::new(2, 1)]
        );
        assert_eq!(stage.portal(), CellCoord::new(2, 2));
    }

    #[test]
    fn builtin_second_stage_carries_inert_gimmick() {
        let stage = BuiltinStages.stage(StageNumber::new(2)).expect("valid stage");
        assert_eq!(stage.gimmicks().len(), 1);
        assert_eq!(stage.gimmicks()[0].kind, "moving_wall");
        assert_eq!(stage.cell(CellCoord::new(1, 1)), Some(CellKind::Wall));
    }

    #[test]
    fn builtin_generates_later_levels() {
        let stage = BuiltinStages.stage(StageNumber::new(12)).expect("valid stage");
        assert_eq!(stage.id(), "3x3_012");
        assert_eq!(
            stage.crystals(),
            &[CellCoord::new(2, 0), CellCoord::new(0, 2)]
        );
        assert_eq!(stage.min_moves(), 6);
    }

    #[test]
    fn catalogue_parses_and_serves_stages() {
        let catalogue = StageCatalogue::from_toml_str(
            r#"
            [[stage]]
            number = 4
            id = "5x5_001"
            move_limit = 12
            min_moves = 9
            rows = ["O....", ".###.", ".C.C.", ".....", "....P"]

            [[stage.gimmicks]]
            kind = "switch"
            position = { column = 0, row = 4 }
            "#,
        )
        .expect("valid catalogue");

        assert_eq!(catalogue.len(), 1);
        let stage = catalogue.stage(StageNumber::new(4)).expect("present");
        assert_eq!(stage.size(), 5);
        assert_eq!(stage.walls().len(), 3);
        assert_eq!(stage.gimmicks()[0].position, Some(CellCoord::new(0, 4)));
        assert_eq!(
            catalogue.stage(StageNumber::new(1)),
            Err(StageError::MissingStage {
                number: StageNumber::new(1)
            })
        );
    }

    #[test]
    fn catalogue_reports_invalid_entries() {
        let error = StageCatalogue::from_toml_str(
            r#"
            [[stage]]
            number = 1
            id = "broken"
            move_limit = 6
            min_moves = 5
            rows = ["O#.", "...", "..P"]
            "#,
        )
        .expect_err("stage has no crystals");

        assert!(matches!(
            error,
            CatalogueError::Stage {
                source: StageError::NoCrystals,
                ..
            }
        ));
    }

    #[test]
    fn catalogue_rejects_duplicate_numbers() {
        let entry = r#"
            [[stage]]
            number = 1
            id = "a"
            move_limit = 6
            min_moves = 5
            rows = ["O#.", ".CC", "..P"]
        "#;
        let error = StageCatalogue::from_toml_str(&format!("{entry}{entry}"))
            .expect_err("duplicate number");
        assert!(matches!(error, CatalogueError::DuplicateNumber { .. }));
    }
}
