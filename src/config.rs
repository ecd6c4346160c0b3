use crate::errors::{SimError, SimResult};
use std::str::FromStr;

/// Which estimators to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    Terminal,
    Crossing,
    All,
}

impl Scenario {
    pub fn includes_terminal(self) -> bool {
        matches!(self, Self::Terminal | Self::All)
    }

    pub fn includes_crossing(self) -> bool {
        matches!(self, Self::Crossing | Self::All)
    }
}

impl FromStr for Scenario {
    type Err = SimError;

    fn from_str(s: &str) -> SimResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "terminal" => Ok(Self::Terminal),
            "crossing" => Ok(Self::Crossing),
            "all" => Ok(Self::All),
            other => Err(SimError::Config(format!("SCENARIO: unknown scenario `{other}`"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

impl FromStr for ReportFormat {
    type Err = SimError;

    fn from_str(s: &str) -> SimResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(SimError::Config(format!("REPORT_FORMAT: unknown format `{other}`"))),
        }
    }
}

/// Terminal-payoff scenario: call on start + sum of uniform moves.
#[derive(Debug, Clone)]
pub struct TerminalConfig {
    pub start: f64,
    pub steps: i64,
    pub simulations: i64,
    pub moves: String,
    pub strike: f64,
}

/// Threshold-crossing scenario: tick walk against a target.
#[derive(Debug, Clone)]
pub struct CrossingConfig {
    pub start: f64,
    pub target: f64,
    pub steps: i64,
    pub simulations: i64,
    pub moves: String,
}

/// Raw configuration. Counts stay signed here so the simulator can reject
/// negative values as parameter errors.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub scenario: Scenario,
    pub seed: Option<u64>,
    pub report_format: ReportFormat,
    pub terminal: TerminalConfig,
    pub crossing: CrossingConfig,
}

impl AppConfig {
    pub fn from_env() -> SimResult<Self> {
        dotenvy::dotenv().ok();

        let seed = match std::env::var("SEED") {
            Ok(s) if !s.trim().is_empty() => Some(parse_var::<u64>("SEED", &s)?),
            _ => None,
        };

        let terminal = TerminalConfig {
            start: parse_var("TERMINAL_START", &env_var_or("TERMINAL_START", "100"))?,
            steps: parse_var("TERMINAL_STEPS", &env_var_or("TERMINAL_STEPS", "10"))?,
            simulations: parse_var("TERMINAL_SIMULATIONS", &env_var_or("TERMINAL_SIMULATIONS", "100000"))?,
            moves: env_var_or("TERMINAL_MOVES", "uniform:-2,2"),
            strike: parse_var("TERMINAL_STRIKE", &env_var_or("TERMINAL_STRIKE", "105"))?,
        };

        let crossing = CrossingConfig {
            start: parse_var("CROSSING_START", &env_var_or("CROSSING_START", "120"))?,
            target: parse_var("CROSSING_TARGET", &env_var_or("CROSSING_TARGET", "130"))?,
            steps: parse_var("CROSSING_STEPS", &env_var_or("CROSSING_STEPS", "2160"))?,
            simulations: parse_var("CROSSING_SIMULATIONS", &env_var_or("CROSSING_SIMULATIONS", "10000"))?,
            moves: env_var_or("CROSSING_MOVES", "categorical:0.01@0.10,0@0.85,-0.01@0.05"),
        };

        Ok(Self {
            scenario: env_var_or("SCENARIO", "all").parse()?,
            seed,
            report_format: env_var_or("REPORT_FORMAT", "text").parse()?,
            terminal,
            crossing,
        })
    }
}

fn parse_var<T>(key: &str, raw: &str) -> SimResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| SimError::Config(format!("{key}: {e}")))
}

fn env_var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
