//! Keyword-driven severity classifier.
//!
//! Assigns a priority tier and score to an incident description by
//! case-insensitive substring matching against two fixed marker lists.
//! The score accumulates across every matching marker in both lists, and
//! the tier is read off the final score. Pure and deterministic: the same
//! description always yields the same classification.
//!
//! The support corpus is bilingual, so each marker carries its English and
//! Spanish form.

use std::fmt;

use serde::Serialize;

/// Score contributed by each matching critical marker.
const CRITICAL_WEIGHT: f64 = 0.4;

/// Score contributed by each matching high marker.
const HIGH_WEIGHT: f64 = 0.25;

/// Markers indicating a service-down or data-loss situation.
const CRITICAL_MARKERS: &[&str] = &[
    "urgent",
    "urgente",
    "fire",
    "fuego",
    "crash",
    "caída",
    "outage",
    "server",
    "servidor",
    "critical error",
    "error crítico",
];

/// Markers indicating degraded but not down.
const HIGH_MARKERS: &[&str] = &[
    "failure",
    "fallo",
    "not working",
    "no funciona",
    "blocked",
    "bloqueado",
    "slow",
    "lento",
];

/// Priority tier derived from the keyword score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    Critical,
    High,
    Medium,
    Normal,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Normal => "NORMAL",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying one description.
#[derive(Debug, Clone, Copy)]
pub struct Classification {
    pub tier: Tier,
    pub score: f64,
}

/// Classify a description. Tier thresholds are evaluated high to low; a
/// description with no matching markers is NORMAL with a score of exactly 0.0.
pub fn classify(description: &str) -> Classification {
    let lowered = description.to_lowercase();

    let mut score = 0.0;
    for marker in CRITICAL_MARKERS {
        if lowered.contains(marker) {
            score += CRITICAL_WEIGHT;
        }
    }
    for marker in HIGH_MARKERS {
        if lowered.contains(marker) {
            score += HIGH_WEIGHT;
        }
    }

    if score >= CRITICAL_WEIGHT {
        Classification {
            tier: Tier::Critical,
            score,
        }
    } else if score >= HIGH_WEIGHT {
        Classification {
            tier: Tier::High,
            score,
        }
    } else if score > 0.0 {
        Classification {
            tier: Tier::Medium,
            score,
        }
    } else {
        Classification {
            tier: Tier::Normal,
            score: 0.0,
        }
    }
}
