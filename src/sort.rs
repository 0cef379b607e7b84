use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::Lead;
use crate::score::effective_score;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "desc")]
    #[value(name = "desc")]
    Descending,
    #[serde(rename = "asc")]
    #[value(name = "asc")]
    Ascending,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Descending => "desc",
            SortOrder::Ascending => "asc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "desc" => Ok(SortOrder::Descending),
            "asc" => Ok(SortOrder::Ascending),
            other => anyhow::bail!("unknown sort order `{other}`, expected asc or desc"),
        }
    }
}

/// Equal scores compare as `Equal`; callers rely on a stable sort to keep
/// input order among ties.
pub fn compare(a: &Lead, b: &Lead, order: SortOrder) -> Ordering {
    let left = effective_score(a.score);
    let right = effective_score(b.score);
    match order {
        SortOrder::Descending => right.cmp(&left),
        SortOrder::Ascending => left.cmp(&right),
    }
}
