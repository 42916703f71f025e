use crate::render::{CellColor, DisplayMode};
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(name = "lifeterm", about = "Conway's Game of Life, sized to your terminal")]
pub(crate) struct Args {
    /// probability of a cell being alive at the start (0.0..=1.0)
    #[arg(short, long, default_value_t = 0.2)]
    pub(crate) probability: f64,

    /// seconds between generations
    #[arg(short, long, default_value_t = 0.07)]
    pub(crate) time: f64,

    /// cell color: white, black, cyan, red, green, yellow, blue, magenta
    #[arg(short, long, default_value = "white")]
    pub(crate) color: String,

    /// pack two rows per terminal line with half-block glyphs
    #[arg(short, long, default_value_t = true, action = ArgAction::Set)]
    pub(crate) double: bool,

    /// RNG seed (defaults to the clock)
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// append log lines to this file
    #[arg(long)]
    pub(crate) log: Option<PathBuf>,
}

#[derive(Debug, Error, PartialEq)]
pub(crate) enum ConfigError {
    #[error("probability must be between 0.0 and 1.0, got {0}")]
    Probability(f64),
    #[error("time must be a non-negative, representable number of seconds, got {0}")]
    Interval(f64),
}

/// Validated run configuration; fixed for the life of the process.
#[derive(Clone, Debug)]
pub(crate) struct Settings {
    pub(crate) probability: f64,
    pub(crate) interval: Duration,
    pub(crate) color: CellColor,
    /// Set when the requested color name was not recognised.
    pub(crate) color_fallback: Option<String>,
    pub(crate) mode: DisplayMode,
    pub(crate) seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            probability: 0.2,
            interval: Duration::from_millis(70),
            color: CellColor::White,
            color_fallback: None,
            mode: DisplayMode::HalfBlock,
            seed: 0,
        }
    }
}

impl Settings {
    pub(crate) fn from_args(args: &Args) -> Result<Self, ConfigError> {
        if !args.probability.is_finite() || !(0.0..=1.0).contains(&args.probability) {
            return Err(ConfigError::Probability(args.probability));
        }
        if !args.time.is_finite() || args.time < 0.0 {
            return Err(ConfigError::Interval(args.time));
        }

        let interval =
            Duration::try_from_secs_f64(args.time).map_err(|_| ConfigError::Interval(args.time))?;

        let (color, color_fallback) = match CellColor::from_name(&args.color) {
            Some(c) => (c, None),
            None => (CellColor::default(), Some(args.color.clone())),
        };

        let seed = args.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or(Duration::from_secs(0))
                .as_nanos() as u64
        });

        Ok(Self {
            probability: args.probability,
            interval,
            color,
            color_fallback,
            mode: if args.double {
                DisplayMode::HalfBlock
            } else {
                DisplayMode::Full
            },
            seed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("lifeterm").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_match_the_classic_toy() {
        let s = Settings::from_args(&parse(&["--seed", "1"])).unwrap();
        assert_eq!(s.probability, 0.2);
        assert_eq!(s.interval, Duration::from_secs_f64(0.07));
        assert_eq!(s.color, CellColor::White);
        assert_eq!(s.mode, DisplayMode::HalfBlock);
        assert_eq!(s.seed, 1);
        assert!(s.color_fallback.is_none());
    }

    #[test]
    fn short_flags_and_full_mode() {
        let s = Settings::from_args(&parse(&["-p", "0.5", "-t", "0", "-c", "magenta", "-d", "false"]))
            .unwrap();
        assert_eq!(s.probability, 0.5);
        assert_eq!(s.interval, Duration::ZERO);
        assert_eq!(s.color, CellColor::Magenta);
        assert_eq!(s.mode, DisplayMode::Full);
    }

    #[test]
    fn unknown_color_falls_back_to_white() {
        let s = Settings::from_args(&parse(&["--color", "chartreuse"])).unwrap();
        assert_eq!(s.color, CellColor::White);
        assert_eq!(s.color_fallback.as_deref(), Some("chartreuse"));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert_eq!(
            Settings::from_args(&parse(&["-p", "1.5"])).unwrap_err(),
            ConfigError::Probability(1.5)
        );
        assert_eq!(
            Settings::from_args(&parse(&["--time=-0.1"])).unwrap_err(),
            ConfigError::Interval(-0.1)
        );
        assert!(Settings::from_args(&parse(&["-p", "NaN"])).is_err());
    }

    #[test]
    fn huge_interval_is_an_error_not_a_panic() {
        assert_eq!(
            Settings::from_args(&parse(&["-t", "1e20"])).unwrap_err(),
            ConfigError::Interval(1e20)
        );
        let s = Settings::from_args(&parse(&["-t", "1e9"])).unwrap();
        assert_eq!(s.interval, Duration::from_secs(1_000_000_000));
    }

    #[test]
    fn double_requires_an_explicit_value() {
        let argv = ["lifeterm", "-d", "maybe"];
        assert!(Args::try_parse_from(argv).is_err());
    }
}
