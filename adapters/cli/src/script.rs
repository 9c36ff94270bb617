use std::{error::Error, fmt, str::FromStr, time::Duration};

use star_forge_core::CellCoord;

/// Delimiter between an action name and its argument.
const ARGUMENT_DELIMITER: char = ':';

/// Single step of a scripted session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    /// Tap the cell at `column,row`.
    Tap(CellCoord),
    /// Undo the latest move.
    Undo,
    /// Rebuild the current stage.
    Reset,
    /// Buy a hint.
    Hint,
    /// Let simulated time pass and fire due timers.
    Wait(Duration),
    /// Print the label and contents of a cell.
    Describe(CellCoord),
}

impl FromStr for Action {
    type Err = ScriptError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ScriptError::EmptyAction);
        }

        let (name, argument) = match trimmed.split_once(ARGUMENT_DELIMITER) {
            Some((name, argument)) => (name, Some(argument)),
            None => (trimmed, None),
        };

        match (name.to_ascii_lowercase().as_str(), argument) {
            ("tap", Some(cell)) => parse_cell(cell).map(Self::Tap),
            ("describe", Some(cell)) => parse_cell(cell).map(Self::Describe),
            ("wait", Some(millis)) => millis
                .trim()
                .parse::<u64>()
                .map(|millis| Self::Wait(Duration::from_millis(millis)))
                .map_err(|_| ScriptError::InvalidDuration(millis.to_owned())),
            ("undo", None) => Ok(Self::Undo),
            ("reset", None) => Ok(Self::Reset),
            ("hint", None) => Ok(Self::Hint),
            ("tap" | "describe" | "wait", None) => Err(ScriptError::MissingArgument(name.to_owned())),
            ("undo" | "reset" | "hint", Some(_)) => {
                Err(ScriptError::UnexpectedArgument(name.to_owned()))
            }
            _ => Err(ScriptError::UnknownAction(name.to_owned())),
        }
    }
}

/// Errors that can occur while parsing scripted actions.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ScriptError {
    /// The action was empty or contained only whitespace.
    EmptyAction,
    /// The action name is not recognised.
    UnknownAction(String),
    /// The action requires an argument that was not supplied.
    MissingArgument(String),
    /// The action takes no argument but one was supplied.
    UnexpectedArgument(String),
    /// The cell could not be parsed as `column,row`.
    InvalidCell(String),
    /// The wait duration is not a whole number of milliseconds.
    InvalidDuration(String),
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyAction => write!(f, "action was empty"),
            Self::UnknownAction(name) => write!(f, "action '{name}' is not supported"),
            Self::MissingArgument(name) => write!(f, "action '{name}' needs an argument"),
            Self::UnexpectedArgument(name) => write!(f, "action '{name}' takes no argument"),
            Self::InvalidCell(cell) => {
                write!(f, "could not parse cell '{cell}', expected column,row")
            }
            Self::InvalidDuration(millis) => {
                write!(f, "could not parse wait duration '{millis}' in milliseconds")
            }
        }
    }
}

impl Error for ScriptError {}

fn parse_cell(cell: &str) -> Result<CellCoord, ScriptError> {
    let (column, row) = cell
        .split_once(',')
        .ok_or_else(|| ScriptError::InvalidCell(cell.to_owned()))?;

    let column = column
        .trim()
        .parse::<u32>()
        .map_err(|_| ScriptError::InvalidCell(cell.to_owned()))?;
    let row = row
        .trim()
        .parse::<u32>()
        .map_err(|_| ScriptError::InvalidCell(cell.to_owned()))?;

    Ok(CellCoord::new(column, row))
}
