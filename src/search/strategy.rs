//! AI strategy names.
//!
//! Strategies are written as `random` or
//! `minmax-<depth>[-<opponent_depth>][-sooner|-later]`.

use std::fmt;
use std::str::FromStr;

/// A malformed strategy string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StrategyError {
    #[error("unknown strategy: {0:?}")]
    Unknown(String),

    #[error("bad depth {part:?} in strategy {strategy:?}")]
    BadDepth { strategy: String, part: String },

    #[error("unexpected suffix {part:?} in strategy {strategy:?}")]
    BadSuffix { strategy: String, part: String },
}

/// How lookahead plies are weighted against the candidate move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Weighting {
    #[default]
    Flat,
    /// Ply `k` counts `1 / (k + 1)`.
    Sooner,
    /// Ply `k` counts `k + 1`.
    Later,
}

impl Weighting {
    pub fn weight(self, ply: usize) -> f64 {
        let k = ply as f64;
        match self {
            Weighting::Flat => 1.0,
            Weighting::Sooner => 1.0 / (k + 1.0),
            Weighting::Later => k + 1.0,
        }
    }
}

/// How an AI player picks its move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Uniform over all legal moves.
    Random,
    /// Greedy material lookahead.
    Minmax {
        depth: u32,
        /// Depth the simulated replies search with; `depth - 1` when unset.
        opponent_depth: Option<u32>,
        weighting: Weighting,
    },
}

impl Strategy {
    pub fn minmax(depth: u32) -> Self {
        Strategy::Minmax {
            depth,
            opponent_depth: None,
            weighting: Weighting::Flat,
        }
    }

    /// The strategy every side uses inside a lookahead of this one.
    pub fn reply(&self) -> Option<Strategy> {
        match *self {
            Strategy::Random => None,
            Strategy::Minmax {
                depth,
                opponent_depth,
                weighting,
            } => Some(Strategy::Minmax {
                depth: opponent_depth.unwrap_or(depth.saturating_sub(1)),
                opponent_depth: None,
                weighting,
            }),
        }
    }
}

impl FromStr for Strategy {
    type Err = StrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("random") {
            return Ok(Strategy::Random);
        }
        let mut parts = s.split('-');
        if parts.next() != Some("minmax") {
            return Err(StrategyError::Unknown(s.to_string()));
        }

        let depth_of = |part: &str| {
            part.parse::<u32>().map_err(|_| StrategyError::BadDepth {
                strategy: s.to_string(),
                part: part.to_string(),
            })
        };

        let depth = depth_of(parts.next().unwrap_or(""))?;
        let mut opponent_depth = None;
        let mut weighting = Weighting::Flat;
        for (i, part) in parts.enumerate() {
            match part {
                "sooner" if weighting == Weighting::Flat => weighting = Weighting::Sooner,
                "later" if weighting == Weighting::Flat => weighting = Weighting::Later,
                _ if i == 0 && part.bytes().all(|b| b.is_ascii_digit()) => {
                    opponent_depth = Some(depth_of(part)?);
                }
                _ => {
                    return Err(StrategyError::BadSuffix {
                        strategy: s.to_string(),
                        part: part.to_string(),
                    })
                }
            }
        }

        Ok(Strategy::Minmax {
            depth,
            opponent_depth,
            weighting,
        })
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Random => write!(f, "random"),
            Strategy::Minmax {
                depth,
                opponent_depth,
                weighting,
            } => {
                write!(f, "minmax-{}", depth)?;
                if let Some(o) = opponent_depth {
                    write!(f, "-{}", o)?;
                }
                match weighting {
                    Weighting::Flat => Ok(()),
                    Weighting::Sooner => write!(f, "-sooner"),
                    Weighting::Later => write!(f, "-later"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_strategy_names() {
        assert_eq!("random".parse(), Ok(Strategy::Random));
        assert_eq!("minmax-0".parse(), Ok(Strategy::minmax(0)));
        assert_eq!(
            "minmax-2-1-later".parse(),
            Ok(Strategy::Minmax {
                depth: 2,
                opponent_depth: Some(1),
                weighting: Weighting::Later
            })
        );
        assert_eq!(
            "minmax-3-sooner".parse(),
            Ok(Strategy::Minmax {
                depth: 3,
                opponent_depth: None,
                weighting: Weighting::Sooner
            })
        );
    }

    #[test]
    fn rejects_malformed_names() {
        assert!(matches!("greedy".parse::<Strategy>(), Err(StrategyError::Unknown(_))));
        assert!(matches!("minmax".parse::<Strategy>(), Err(StrategyError::BadDepth { .. })));
        assert!(matches!("minmax-x".parse::<Strategy>(), Err(StrategyError::BadDepth { .. })));
        assert!(matches!("minmax-1-sooner-2".parse::<Strategy>(), Err(StrategyError::BadSuffix { .. })));
        assert!(matches!("minmax-1-later-sooner".parse::<Strategy>(), Err(StrategyError::BadSuffix { .. })));
        assert!(matches!("minmax-1-2-3".parse::<Strategy>(), Err(StrategyError::BadSuffix { .. })));
    }

    #[test]
    fn display_round_trips() {
        for name in ["random", "minmax-0", "minmax-2-0", "minmax-1-later", "minmax-4-1-sooner"] {
            assert_eq!(name.parse::<Strategy>().unwrap().to_string(), name);
        }
    }

    #[test]
    fn replies_search_one_shallower() {
        assert_eq!(Strategy::minmax(2).reply(), Some(Strategy::minmax(1)));
        assert_eq!(Strategy::minmax(0).reply(), Some(Strategy::minmax(0)));
        let s: Strategy = "minmax-3-0-later".parse().unwrap();
        assert_eq!(
            s.reply(),
            Some(Strategy::Minmax {
                depth: 0,
                opponent_depth: None,
                weighting: Weighting::Later
            })
        );
        assert_eq!(Strategy::Random.reply(), None);
    }

    #[test]
    fn weights() {
        assert_eq!(Weighting::Flat.weight(3), 1.0);
        assert_eq!(Weighting::Sooner.weight(1), 0.5);
        assert_eq!(Weighting::Later.weight(2), 3.0);
    }
}
