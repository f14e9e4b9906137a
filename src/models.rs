use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// How input organization names are compared against the reference chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Best fuzzy score against every reference entry, annotated as
    /// `"MATCH (97%)"` / `"REVIEW (42%)"`.
    Fuzzy,
    /// Case-insensitive equality against reference entries sharing the same
    /// code, annotated as a bare `"MATCH"` / `"REVIEW"`.
    ExactByCode,
}

impl FromStr for MatchStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fuzzy" => Ok(MatchStrategy::Fuzzy),
            "exact" | "exact_by_code" => Ok(MatchStrategy::ExactByCode),
            other => Err(format!("unknown match strategy: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    Match,
    Review,
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStatus::Match => write!(f, "MATCH"),
            MatchStatus::Review => write!(f, "REVIEW"),
        }
    }
}

/// What to do with cells that are not already text when a stage needs text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextPolicy {
    /// Render the cell to its string form; empty cells become "".
    Coerce,
    /// Fail with `AppError::InvalidInput`.
    Strict,
}

impl FromStr for TextPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "coerce" => Ok(TextPolicy::Coerce),
            "strict" => Ok(TextPolicy::Strict),
            other => Err(format!("unknown text policy: {}", other)),
        }
    }
}

/// Coarse pipeline milestones surfaced to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStage {
    LoadInput,
    NormalizeSchema,
    LoadReference,
    FilterSentinels,
    Match,
    Resolve,
    Done,
}

impl ProgressStage {
    pub fn label(&self) -> &'static str {
        match self {
            ProgressStage::LoadInput => "loading input",
            ProgressStage::NormalizeSchema => "normalizing schema",
            ProgressStage::LoadReference => "loading reference chart",
            ProgressStage::FilterSentinels => "filtering sentinel rows",
            ProgressStage::Match => "matching public bodies",
            ProgressStage::Resolve => "resolving recommendations",
            ProgressStage::Done => "done",
        }
    }
}

/// Counts reported after a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub rows_in: usize,
    pub rows_out: usize,
    pub rows_dropped: usize,
    pub matched: usize,
    pub review: usize,
}
