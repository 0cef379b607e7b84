use serde::Serialize;

use crate::models::Lead;

pub const HIGH_THRESHOLD: i32 = 80;
pub const MEDIUM_THRESHOLD: i32 = 50;
pub const MAX_SCORE: i32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Green,
    Yellow,
    Red,
}

impl Tone {
    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Green => "green",
            Tone::Yellow => "yellow",
            Tone::Red => "red",
        }
    }
}

impl ScoreBand {
    pub fn label(self) -> &'static str {
        match self {
            ScoreBand::High => "High Potential",
            ScoreBand::Medium => "Medium Potential",
            ScoreBand::Low => "Low Potential",
        }
    }

    pub fn tone(self) -> Tone {
        match self {
            ScoreBand::High => Tone::Green,
            ScoreBand::Medium => Tone::Yellow,
            ScoreBand::Low => Tone::Red,
        }
    }
}

/// Lower bounds are inclusive: 80 is High, 50 is Medium.
pub fn classify(score: i32) -> ScoreBand {
    if score >= HIGH_THRESHOLD {
        ScoreBand::High
    } else if score >= MEDIUM_THRESHOLD {
        ScoreBand::Medium
    } else {
        ScoreBand::Low
    }
}

/// Score used for banding and ordering. Missing or out-of-range values
/// count as 0, which lands them in the Low band and at the bottom of a
/// descending sort.
pub fn effective_score(raw: Option<i32>) -> i32 {
    match raw {
        Some(score) if (0..=MAX_SCORE).contains(&score) => score,
        _ => 0,
    }
}

pub fn is_dirty(raw: Option<i32>) -> bool {
    !matches!(raw, Some(score) if (0..=MAX_SCORE).contains(&score))
}

pub fn classify_lead(lead: &Lead) -> ScoreBand {
    classify(effective_score(lead.score))
}

/// Emits one warning per lead whose score had to be normalised.
pub fn warn_dirty_scores(leads: &[Lead]) -> usize {
    let mut dirty = 0usize;
    for lead in leads.iter().filter(|lead| is_dirty(lead.score)) {
        dirty += 1;
        tracing::warn!(
            lead_id = %lead.id,
            raw_score = ?lead.score,
            "score missing or outside 0..=100, treating as 0"
        );
    }
    dirty
}
