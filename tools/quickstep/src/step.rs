//! Atomic quicksort events recorded in a trace.
//!
//! Index fields refer to the algorithm's own index space at the moment the
//! event was recorded. The replay engine tracks visual marker positions on
//! its own and only uses index fields where a marker is (re)placed.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Step {
    PivotChosen {
        index: usize,
        value: i64,
    },
    ScannersInitialized {
        high_index: usize,
        high_value: i64,
        low_index: usize,
        low_value: i64,
    },
    HighExceedsPivot {
        high_index: usize,
        high_value: i64,
        pivot_index: usize,
        pivot_value: i64,
    },
    HighAtMostPivot {
        high_index: usize,
        high_value: i64,
        pivot_index: usize,
        pivot_value: i64,
    },
    SwapHighLow {
        high_index: usize,
        high_value: i64,
        low_index: usize,
        low_value: i64,
    },
    SwapPivotLow {
        pivot_index: usize,
        pivot_value: i64,
        low_index: usize,
        low_value: i64,
    },
    DecrementHigh,
    DecrementLow,
}

impl Step {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PivotChosen { .. } => "pivot_chosen",
            Self::ScannersInitialized { .. } => "scanners_initialized",
            Self::HighExceedsPivot { .. } => "high_exceeds_pivot",
            Self::HighAtMostPivot { .. } => "high_at_most_pivot",
            Self::SwapHighLow { .. } => "swap_high_low",
            Self::SwapPivotLow { .. } => "swap_pivot_low",
            Self::DecrementHigh => "decrement_high",
            Self::DecrementLow => "decrement_low",
        }
    }

    /// Log line shown to the user when the step is replayed.
    pub fn describe(&self) -> String {
        match *self {
            Self::PivotChosen { value, .. } => format!("Pivot: {value}"),
            Self::ScannersInitialized {
                high_value,
                low_value,
                ..
            } => format!("High: {high_value} Low: {low_value}"),
            Self::HighExceedsPivot {
                high_value,
                pivot_value,
                ..
            } => format!("High > pivot: {high_value} > {pivot_value}"),
            Self::HighAtMostPivot {
                high_value,
                pivot_value,
                ..
            } => format!("High {high_value} <= {pivot_value}"),
            Self::SwapHighLow {
                high_value,
                low_value,
                ..
            } => format!("Swapping high <-> low: {high_value} <-> {low_value}"),
            Self::SwapPivotLow {
                pivot_value,
                low_value,
                ..
            } => format!("Swapping pivot <-> low: {pivot_value} <-> {low_value}"),
            Self::DecrementHigh => "Decrease high marker".to_string(),
            Self::DecrementLow => "Decrease low marker".to_string(),
        }
    }
}
