//! Replay state machine: consumes a trace one step at a time and derives
//! marker positions from the steps played so far.

use crate::errors::QuickstepError;
use crate::render::RenderInstruction;
use crate::step::Step;
use crate::types::{CollectionId, MarkerKind};
use std::collections::VecDeque;

pub const MIN_ELEMENTS: usize = 2;
pub const MAX_ELEMENTS: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementBounds {
    pub min: usize,
    pub max: usize,
}

impl Default for ElementBounds {
    fn default() -> Self {
        Self {
            min: MIN_ELEMENTS,
            max: MAX_ELEMENTS,
        }
    }
}

impl ElementBounds {
    pub fn check(&self, count: usize) -> Result<(), QuickstepError> {
        if count < self.min || count > self.max {
            return Err(QuickstepError::InvalidElementCount {
                count,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Visual marker positions plus the run-phase flags that decide between
/// inserting a marker and relocating it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerState {
    pub pivot: usize,
    pub low: usize,
    pub high: usize,
    /// Starts at 1 after a reset; incremented by every chosen pivot.
    pub iteration: u32,
    pub markers_placed: bool,
}

impl MarkerState {
    pub fn initial(element_count: usize) -> Self {
        let last = element_count.saturating_sub(1);
        Self {
            pivot: 0,
            low: last,
            high: last,
            iteration: 1,
            markers_placed: false,
        }
    }

    pub fn is_first_pivot(&self) -> bool {
        self.iteration == 1
    }

    pub fn position(&self, kind: MarkerKind) -> usize {
        match kind {
            MarkerKind::Pivot => self.pivot,
            MarkerKind::Low => self.low,
            MarkerKind::High => self.high,
        }
    }

    fn set_position(&mut self, kind: MarkerKind, position: usize) {
        match kind {
            MarkerKind::Pivot => self.pivot = position,
            MarkerKind::Low => self.low = position,
            MarkerKind::High => self.high = position,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Step {
        step: Step,
        instructions: Vec<RenderInstruction>,
    },
    SortComplete,
}

impl Advance {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::SortComplete)
    }
}

#[derive(Debug, Clone)]
pub struct ReplayEngine {
    trace: VecDeque<Step>,
    markers: MarkerState,
    element_count: usize,
    bounds: ElementBounds,
    applied: usize,
}

impl ReplayEngine {
    pub fn new(element_count: usize, bounds: ElementBounds) -> Result<Self, QuickstepError> {
        bounds.check(element_count)?;
        Ok(Self {
            trace: VecDeque::new(),
            markers: MarkerState::initial(element_count),
            element_count,
            bounds,
            applied: 0,
        })
    }

    /// Clears the cursor and puts every marker back to its starting slot.
    /// An out-of-bounds count is rejected and leaves the engine untouched.
    pub fn reset(&mut self, element_count: usize) -> Result<(), QuickstepError> {
        self.bounds.check(element_count)?;
        self.trace.clear();
        self.markers = MarkerState::initial(element_count);
        self.element_count = element_count;
        self.applied = 0;
        Ok(())
    }

    pub fn load(&mut self, trace: Vec<Step>) {
        self.trace = trace.into();
        self.applied = 0;
    }

    pub fn markers(&self) -> MarkerState {
        self.markers
    }

    pub fn element_count(&self) -> usize {
        self.element_count
    }

    pub fn bounds(&self) -> ElementBounds {
        self.bounds
    }

    pub fn remaining(&self) -> usize {
        self.trace.len()
    }

    pub fn applied_steps(&self) -> usize {
        self.applied
    }

    pub fn is_exhausted(&self) -> bool {
        self.trace.is_empty()
    }

    pub fn advance(&mut self) -> Advance {
        let Some(step) = self.trace.pop_front() else {
            return Advance::SortComplete;
        };
        let instructions = self.transition(&step);
        self.applied += 1;
        Advance::Step { step, instructions }
    }

    fn transition(&mut self, step: &Step) -> Vec<RenderInstruction> {
        let mut out = Vec::new();
        match *step {
            Step::PivotChosen { index, .. } => {
                if self.markers.is_first_pivot() {
                    out.push(RenderInstruction::InsertMarker {
                        kind: MarkerKind::Pivot,
                        position: index,
                    });
                } else {
                    out.push(RenderInstruction::RelocateMarker {
                        kind: MarkerKind::Pivot,
                        from: self.markers.pivot,
                        to: index,
                    });
                }
                self.markers.pivot = index;
                self.markers.iteration = self.markers.iteration.saturating_add(1);
            }
            Step::ScannersInitialized {
                high_index,
                low_index,
                ..
            } => {
                if self.markers.markers_placed {
                    out.push(RenderInstruction::RelocateMarker {
                        kind: MarkerKind::High,
                        from: self.markers.high,
                        to: high_index,
                    });
                    out.push(RenderInstruction::RelocateMarker {
                        kind: MarkerKind::Low,
                        from: self.markers.low,
                        to: low_index,
                    });
                } else {
                    out.push(RenderInstruction::InsertMarker {
                        kind: MarkerKind::High,
                        position: high_index,
                    });
                    out.push(RenderInstruction::InsertMarker {
                        kind: MarkerKind::Low,
                        position: low_index,
                    });
                    self.markers.markers_placed = true;
                }
                self.markers.high = high_index;
                self.markers.low = low_index;
            }
            Step::HighExceedsPivot { .. } | Step::HighAtMostPivot { .. } => {}
            Step::SwapHighLow { .. } => {
                out.push(RenderInstruction::ExchangeSlots {
                    collection: CollectionId::Bars,
                    a: self.markers.high,
                    b: self.markers.low,
                });
            }
            Step::SwapPivotLow { .. } => {
                out.push(RenderInstruction::ExchangeSlots {
                    collection: CollectionId::Bars,
                    a: self.markers.pivot,
                    b: self.markers.low,
                });
            }
            Step::DecrementHigh => return self.decrement(MarkerKind::High, step),
            Step::DecrementLow => return self.decrement(MarkerKind::Low, step),
        }
        out.push(RenderInstruction::log(step.describe()));
        out
    }

    fn decrement(&mut self, kind: MarkerKind, step: &Step) -> Vec<RenderInstruction> {
        let from = self.markers.position(kind);
        if from == 0 {
            return vec![
                RenderInstruction::NotifyUnderflow { kind },
                RenderInstruction::log(format!("{} underflow", capitalized(kind))),
            ];
        }
        self.markers.set_position(kind, from - 1);
        vec![
            RenderInstruction::RelocateMarker {
                kind,
                from,
                to: from - 1,
            },
            RenderInstruction::log(step.describe()),
        ]
    }
}

fn capitalized(kind: MarkerKind) -> &'static str {
    match kind {
        MarkerKind::Pivot => "Pivot",
        MarkerKind::Low => "Low",
        MarkerKind::High => "High",
    }
}
