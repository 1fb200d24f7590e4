//! Command-line configuration for the binaries.

use std::path::PathBuf;

use thiserror::Error;

/// Default location of the solved database.
pub const DEFAULT_DB_PATH: &str = "data/legrec.bin";

/// Default seconds between progress lines.
pub const DEFAULT_LOG_INTERVAL_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgError {
    #[error("missing value for {0}")]
    MissingValue(&'static str),
    #[error("invalid value '{value}' for {flag}")]
    InvalidValue { flag: &'static str, value: String },
    #[error("unknown option '{0}'")]
    UnknownOption(String),
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("unexpected argument '{0}'")]
    UnexpectedArgument(String),
}

/// Settings for the `solver` binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveConfig {
    pub db_path: PathBuf,
    pub log_interval_secs: u64,
    /// Re-solve even if a database already exists
    pub force: bool,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            log_interval_secs: DEFAULT_LOG_INTERVAL_SECS,
            force: false,
        }
    }
}

impl SolveConfig {
    pub const USAGE: &'static str = "usage: solver [--db PATH] [--log-interval SECS] [--force]";

    /// Parse arguments (without the program name).
    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> Result<Self, ArgError> {
        let mut config = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    config.db_path = PathBuf::from(args.next().ok_or(ArgError::MissingValue("--db"))?);
                }
                "--log-interval" => {
                    let value = args.next().ok_or(ArgError::MissingValue("--log-interval"))?;
                    config.log_interval_secs = value.parse().map_err(|_| ArgError::InvalidValue {
                        flag: "--log-interval",
                        value,
                    })?;
                }
                "--force" => config.force = true,
                other if other.starts_with('-') => {
                    return Err(ArgError::UnknownOption(other.to_string()))
                }
                other => return Err(ArgError::UnexpectedArgument(other.to_string())),
            }
        }
        Ok(config)
    }
}

/// Settings for the `query` binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    /// 16 board symbols
    pub board: String,
    /// Side to move, `X` or `O`
    pub turn: String,
    /// Optional move to apply, e.g. `"a f"`
    pub mov: Option<String>,
    pub db_path: PathBuf,
    pub json: bool,
}

impl QueryConfig {
    pub const USAGE: &'static str =
        "usage: query <board> <X|O> [move] [--db PATH] [--json]\n  e.g. query XXXX-XXXOOO-OOOO X \"a e\"";

    /// Parse arguments (without the program name).
    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> Result<Self, ArgError> {
        let mut positional = Vec::new();
        let mut db_path = PathBuf::from(DEFAULT_DB_PATH);
        let mut json = false;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => db_path = PathBuf::from(args.next().ok_or(ArgError::MissingValue("--db"))?),
                "--json" => json = true,
                other if other.starts_with("--") => {
                    return Err(ArgError::UnknownOption(other.to_string()))
                }
                _ => positional.push(arg),
            }
        }

        let mut positional = positional.into_iter();
        let board = positional.next().ok_or(ArgError::MissingArgument("board"))?;
        let turn = positional.next().ok_or(ArgError::MissingArgument("side to move"))?;
        let mov = positional.next();
        if let Some(extra) = positional.next() {
            return Err(ArgError::UnexpectedArgument(extra));
        }

        Ok(Self {
            board,
            turn,
            mov,
            db_path,
            json,
        })
    }
}
