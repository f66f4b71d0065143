//! In-memory presentation model: the bars being sorted and the three marker
//! lanes drawn under them.

use crate::render::Presenter;
use crate::types::{CollectionId, MarkerKind};
use rand::seq::SliceRandom;
use rand::Rng;

pub const SORT_COMPLETE_NOTICE: &str = "All elements are sorted";

pub trait Positioned {
    fn position(&self) -> usize;
    fn set_position(&mut self, position: usize);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element {
    pub value: i64,
    pub position: usize,
}

impl Positioned for Element {
    fn position(&self) -> usize {
        self.position
    }

    fn set_position(&mut self, position: usize) {
        self.position = position;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneCell {
    pub position: usize,
    pub occupied: bool,
}

impl Positioned for LaneCell {
    fn position(&self) -> usize {
        self.position
    }

    fn set_position(&mut self, position: usize) {
        self.position = position;
    }
}

/// Swaps the position fields of the entities in slots `a` and `b`, then
/// re-sorts so that slot order matches position order again.
pub fn exchange_by_position<T: Positioned>(items: &mut [T], a: usize, b: usize) -> bool {
    if a == b || a >= items.len() || b >= items.len() {
        return false;
    }
    let pa = items[a].position();
    let pb = items[b].position();
    items[a].set_position(pb);
    items[b].set_position(pa);
    items.sort_by_key(|item| item.position());
    true
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    elements: Vec<Element>,
    pivot_lane: Vec<LaneCell>,
    low_lane: Vec<LaneCell>,
    high_lane: Vec<LaneCell>,
    log: Vec<String>,
    underflows: Vec<MarkerKind>,
    sort_complete: bool,
}

impl Board {
    /// Values `1..=count`, each starting at slot `value - 1`.
    pub fn fresh(count: usize) -> Self {
        Self {
            elements: (0..count)
                .map(|position| Element {
                    value: position as i64 + 1,
                    position,
                })
                .collect(),
            pivot_lane: empty_lane(count),
            low_lane: empty_lane(count),
            high_lane: empty_lane(count),
            log: Vec::new(),
            underflows: Vec::new(),
            sort_complete: false,
        }
    }

    /// Builds a board whose slots hold `values` in order.
    pub fn from_values(values: &[i64]) -> Self {
        let mut board = Self::fresh(values.len());
        for (element, value) in board.elements.iter_mut().zip(values) {
            element.value = *value;
        }
        board
    }

    /// Replaces every element, keeping the log.
    pub fn recreate(&mut self, count: usize) {
        let log = std::mem::take(&mut self.log);
        *self = Self::fresh(count);
        self.log = log;
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut positions = (0..self.elements.len()).collect::<Vec<_>>();
        positions.shuffle(rng);
        for (element, position) in self.elements.iter_mut().zip(positions) {
            element.position = position;
        }
        self.elements.sort_by_key(|element| element.position);
        self.sort_complete = false;
        self.log.clear();
        self.log
            .push(format!("Shuffled {} elements", self.elements.len()));
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Values read in slot order.
    pub fn values(&self) -> Vec<i64> {
        self.elements.iter().map(|element| element.value).collect()
    }

    pub fn is_sorted(&self) -> bool {
        self.elements.windows(2).all(|w| w[0].value < w[1].value)
    }

    pub fn marker_position(&self, kind: MarkerKind) -> Option<usize> {
        self.lane(kind)
            .iter()
            .find(|cell| cell.occupied)
            .map(|cell| cell.position)
    }

    pub fn log_lines(&self) -> &[String] {
        &self.log
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    pub fn underflows(&self) -> &[MarkerKind] {
        &self.underflows
    }

    pub fn sort_complete(&self) -> bool {
        self.sort_complete
    }

    fn lane(&self, kind: MarkerKind) -> &[LaneCell] {
        match kind {
            MarkerKind::Pivot => &self.pivot_lane,
            MarkerKind::Low => &self.low_lane,
            MarkerKind::High => &self.high_lane,
        }
    }

    fn lane_mut(&mut self, kind: MarkerKind) -> &mut Vec<LaneCell> {
        match kind {
            MarkerKind::Pivot => &mut self.pivot_lane,
            MarkerKind::Low => &mut self.low_lane,
            MarkerKind::High => &mut self.high_lane,
        }
    }
}

fn empty_lane(count: usize) -> Vec<LaneCell> {
    (0..count)
        .map(|position| LaneCell {
            position,
            occupied: false,
        })
        .collect()
}

impl Presenter for Board {
    fn insert_marker(&mut self, kind: MarkerKind, position: usize) {
        let lane = self.lane_mut(kind);
        for cell in lane.iter_mut() {
            cell.occupied = false;
        }
        if let Some(cell) = lane.get_mut(position) {
            cell.occupied = true;
        }
    }

    fn exchange_slots(&mut self, collection: CollectionId, a: usize, b: usize) {
        match collection {
            CollectionId::Bars => exchange_by_position(&mut self.elements, a, b),
            CollectionId::PivotLane => exchange_by_position(&mut self.pivot_lane, a, b),
            CollectionId::LowLane => exchange_by_position(&mut self.low_lane, a, b),
            CollectionId::HighLane => exchange_by_position(&mut self.high_lane, a, b),
        };
    }

    fn log_message(&mut self, text: &str) {
        self.log.push(text.to_string());
    }

    fn notify_sort_complete(&mut self) {
        if !self.sort_complete {
            self.log.push(SORT_COMPLETE_NOTICE.to_string());
        }
        self.sort_complete = true;
    }

    fn notify_underflow(&mut self, kind: MarkerKind) {
        self.underflows.push(kind);
    }

    fn remove_markers(&mut self) {
        for kind in MarkerKind::ALL {
            for cell in self.lane_mut(kind).iter_mut() {
                cell.occupied = false;
            }
        }
    }
}
