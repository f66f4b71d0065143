use crate::types::{CollectionId, MarkerKind};
use serde::{Deserialize, Serialize};

/// One change the presentation layer has to apply after a replayed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RenderInstruction {
    InsertMarker {
        kind: MarkerKind,
        position: usize,
    },
    RelocateMarker {
        kind: MarkerKind,
        from: usize,
        to: usize,
    },
    ExchangeSlots {
        collection: CollectionId,
        a: usize,
        b: usize,
    },
    LogMessage {
        text: String,
    },
    NotifySortComplete,
    NotifyUnderflow {
        kind: MarkerKind,
    },
}

impl RenderInstruction {
    pub fn log(text: impl Into<String>) -> Self {
        Self::LogMessage { text: text.into() }
    }
}

/// Presentation boundary consumed by the replay engine and playback controller.
pub trait Presenter {
    fn insert_marker(&mut self, kind: MarkerKind, position: usize);
    fn exchange_slots(&mut self, collection: CollectionId, a: usize, b: usize);
    fn log_message(&mut self, text: &str);
    fn notify_sort_complete(&mut self);
    fn notify_underflow(&mut self, kind: MarkerKind);

    /// Called when a run is stopped or reset; presenters without marker
    /// widgets can ignore it.
    fn remove_markers(&mut self) {}

    /// Marker lanes are ordinary collections, so a move is a lane exchange.
    fn relocate_marker(&mut self, kind: MarkerKind, from: usize, to: usize) {
        self.exchange_slots(kind.lane(), from, to);
    }

    fn apply(&mut self, instruction: &RenderInstruction) {
        match instruction {
            RenderInstruction::InsertMarker { kind, position } => {
                self.insert_marker(*kind, *position)
            }
            RenderInstruction::RelocateMarker { kind, from, to } => {
                self.relocate_marker(*kind, *from, *to)
            }
            RenderInstruction::ExchangeSlots { collection, a, b } => {
                self.exchange_slots(*collection, *a, *b)
            }
            RenderInstruction::LogMessage { text } => self.log_message(text),
            RenderInstruction::NotifySortComplete => self.notify_sort_complete(),
            RenderInstruction::NotifyUnderflow { kind } => self.notify_underflow(*kind),
        }
    }

    fn apply_all(&mut self, instructions: &[RenderInstruction]) {
        for instruction in instructions {
            self.apply(instruction);
        }
    }
}

/// Presenter that only records what it was asked to do.
#[derive(Debug, Default, Clone)]
pub struct RecordingPresenter {
    pub applied: Vec<RenderInstruction>,
}

impl Presenter for RecordingPresenter {
    fn insert_marker(&mut self, kind: MarkerKind, position: usize) {
        self.applied
            .push(RenderInstruction::InsertMarker { kind, position });
    }

    fn relocate_marker(&mut self, kind: MarkerKind, from: usize, to: usize) {
        self.applied
            .push(RenderInstruction::RelocateMarker { kind, from, to });
    }

    fn exchange_slots(&mut self, collection: CollectionId, a: usize, b: usize) {
        self.applied
            .push(RenderInstruction::ExchangeSlots { collection, a, b });
    }

    fn log_message(&mut self, text: &str) {
        self.applied.push(RenderInstruction::log(text));
    }

    fn notify_sort_complete(&mut self) {
        self.applied.push(RenderInstruction::NotifySortComplete);
    }

    fn notify_underflow(&mut self, kind: MarkerKind) {
        self.applied.push(RenderInstruction::NotifyUnderflow { kind });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_dispatches_every_instruction_to_its_method() {
        let batch = vec![
            RenderInstruction::InsertMarker {
                kind: MarkerKind::Pivot,
                position: 0,
            },
            RenderInstruction::RelocateMarker {
                kind: MarkerKind::High,
                from: 4,
                to: 3,
            },
            RenderInstruction::ExchangeSlots {
                collection: CollectionId::Bars,
                a: 0,
                b: 4,
            },
            RenderInstruction::log("Pivot: 5"),
            RenderInstruction::NotifyUnderflow {
                kind: MarkerKind::Low,
            },
            RenderInstruction::NotifySortComplete,
        ];
        let mut presenter = RecordingPresenter::default();
        presenter.apply_all(&batch);
        assert_eq!(presenter.applied, batch);
    }

    #[test]
    fn default_relocation_exchanges_cells_in_the_marker_lane() {
        #[derive(Default)]
        struct LaneOnly {
            exchanges: Vec<(CollectionId, usize, usize)>,
        }
        impl Presenter for LaneOnly {
            fn insert_marker(&mut self, _: MarkerKind, _: usize) {}
            fn exchange_slots(&mut self, collection: CollectionId, a: usize, b: usize) {
                self.exchanges.push((collection, a, b));
            }
            fn log_message(&mut self, _: &str) {}
            fn notify_sort_complete(&mut self) {}
            fn notify_underflow(&mut self, _: MarkerKind) {}
        }

        let mut presenter = LaneOnly::default();
        presenter.relocate_marker(MarkerKind::Low, 5, 4);
        assert_eq!(presenter.exchanges, vec![(CollectionId::LowLane, 5, 4)]);
    }
}
