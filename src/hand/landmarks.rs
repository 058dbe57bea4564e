//! Hand landmark data model.
//!
//! Models the 21 keypoints a hand-tracking model reports per detected
//! hand.  Coordinates are normalized to the camera frame: x and y in
//! [0, 1] with the origin at the top-left and y growing downward.

// ── Landmark definitions ───────────────────────────────────

/// The 21 hand landmarks, in detector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandLandmark {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

/// Total number of landmarks per hand.
pub const LANDMARK_COUNT: usize = 21;

impl HandLandmark {
    /// Convert landmark enum to array index (0-20).
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// String representation for IPC.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wrist => "wrist",
            Self::ThumbCmc => "thumb-cmc",
            Self::ThumbMcp => "thumb-mcp",
            Self::ThumbIp => "thumb-ip",
            Self::ThumbTip => "thumb-tip",
            Self::IndexMcp => "index-mcp",
            Self::IndexPip => "index-pip",
            Self::IndexDip => "index-dip",
            Self::IndexTip => "index-tip",
            Self::MiddleMcp => "middle-mcp",
            Self::MiddlePip => "middle-pip",
            Self::MiddleDip => "middle-dip",
            Self::MiddleTip => "middle-tip",
            Self::RingMcp => "ring-mcp",
            Self::RingPip => "ring-pip",
            Self::RingDip => "ring-dip",
            Self::RingTip => "ring-tip",
            Self::PinkyMcp => "pinky-mcp",
            Self::PinkyPip => "pinky-pip",
            Self::PinkyDip => "pinky-dip",
            Self::PinkyTip => "pinky-tip",
        }
    }

    /// Stable anchor for whole-hand translation (base of the middle finger).
    pub fn palm_center() -> HandLandmark {
        Self::MiddleMcp
    }

    /// Fingertip landmarks, thumb first.
    pub fn fingertips() -> [HandLandmark; 5] {
        [
            Self::ThumbTip,
            Self::IndexTip,
            Self::MiddleTip,
            Self::RingTip,
            Self::PinkyTip,
        ]
    }
}

// ── Landmark point ─────────────────────────────────────────

/// A single normalized keypoint.  `z` is carried through but unused.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

}

/// One detected hand: exactly 21 landmarks indexed by `HandLandmark`.
pub type HandLandmarks = [Landmark; LANDMARK_COUNT];

/// Borrow a detector frame as a full hand, if it has exactly 21 points.
pub fn as_hand(points: &[Landmark]) -> Option<&HandLandmarks> {
    points.try_into().ok()
}

/// Look up a named landmark.
pub fn landmark(hand: &HandLandmarks, which: HandLandmark) -> Landmark {
    hand[which.index()]
}

// ── Test helpers ───────────────────────────────────────────

/// Build a hand with every landmark at the same point.
#[cfg(test)]
pub(crate) fn make_hand(x: f32, y: f32) -> HandLandmarks {
    [Landmark::new(x, y, 0.0); LANDMARK_COUNT]
}

#[cfg(test)]
pub(crate) fn set_landmark(hand: &mut HandLandmarks, which: HandLandmark, x: f32, y: f32) {
    hand[which.index()] = Landmark::new(x, y, 0.0);
}

// ── Tests ──────────────────────────────────────────────────
