use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Pivot,
    Low,
    High,
}

impl MarkerKind {
    pub const ALL: [MarkerKind; 3] = [MarkerKind::Pivot, MarkerKind::Low, MarkerKind::High];

    pub fn lane(self) -> CollectionId {
        match self {
            Self::Pivot => CollectionId::PivotLane,
            Self::Low => CollectionId::LowLane,
            Self::High => CollectionId::HighLane,
        }
    }
}

/// A visual row whose members are reordered by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionId {
    Bars,
    PivotLane,
    LowLane,
    HighLane,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackMode {
    Manual,
    Automatic,
}

impl PlaybackMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Automatic => "automatic",
        }
    }
}
