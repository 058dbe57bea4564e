//! Gesture classification from finger states.
//!
//! Maps one frame's finger-extension vector to exactly one gesture using
//! priority-ordered rules; the first matching rule wins.  Stateless: all
//! cross-frame memory lives in the action mapper.

use tracing::debug;

use crate::hand::fingers::{extract_finger_state, FingerState};
use crate::hand::landmarks::{as_hand, landmark, HandLandmark, HandLandmarks, Landmark};

// ── Gesture types ──────────────────────────────────────────

/// Recognized gesture types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GestureType {
    /// No control action this frame.
    #[default]
    None,
    /// Pinky up, index down: move the cursor.
    Pointing,
    /// Index up alone (pinky down): hold the left button.
    LeftClick,
    /// Middle up alone (pinky down): hold the right button.
    RightClick,
    /// Pinky and index up: move the cursor with the left button held.
    Dragging,
    /// Thumb out, other fingers folded: virtual scroll joystick.
    ScrollMode,
    /// Open palm: virtual volume joystick.
    VolumeMode,
    /// Reserved, not produced by the classifier.
    ZoomIn,
    /// Reserved, not produced by the classifier.
    ZoomOut,
}

impl GestureType {
    /// String representation for IPC.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Pointing => "pointing",
            Self::LeftClick => "left-click",
            Self::RightClick => "right-click",
            Self::Dragging => "dragging",
            Self::ScrollMode => "scroll-mode",
            Self::VolumeMode => "volume-mode",
            Self::ZoomIn => "zoom-in",
            Self::ZoomOut => "zoom-out",
        }
    }

    /// Parse a gesture from its string representation.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Self::None),
            "pointing" => Some(Self::Pointing),
            "left-click" => Some(Self::LeftClick),
            "right-click" => Some(Self::RightClick),
            "dragging" => Some(Self::Dragging),
            "scroll-mode" => Some(Self::ScrollMode),
            "volume-mode" => Some(Self::VolumeMode),
            "zoom-in" => Some(Self::ZoomIn),
            "zoom-out" => Some(Self::ZoomOut),
            _ => None,
        }
    }

    /// Gestures that drive the cursor.
    pub fn is_pointer(&self) -> bool {
        matches!(self, Self::Pointing | Self::Dragging)
    }

    /// Gestures that use the virtual joystick.
    pub fn is_joystick(&self) -> bool {
        matches!(self, Self::ScrollMode | Self::VolumeMode)
    }
}

// ── Classification ─────────────────────────────────────────

/// One frame's result: the gesture plus its positional anchor, if any.
///
/// `info` is present only for pointer and joystick gestures.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Classification {
    pub gesture: GestureType,
    pub info: Option<Landmark>,
}

impl Classification {
    pub fn none() -> Self {
        Self::default()
    }

    fn with_anchor(gesture: GestureType, anchor: Landmark) -> Self {
        Self {
            gesture,
            info: Some(anchor),
        }
    }

    fn bare(gesture: GestureType) -> Self {
        Self {
            gesture,
            info: None,
        }
    }
}

/// Apply the gesture rules to an already-extracted finger state.
pub fn classify(fingers: &FingerState, hand: &HandLandmarks) -> Classification {
    let FingerState {
        thumb,
        index,
        middle,
        ring,
        pinky,
    } = *fingers;
    let palm_center = landmark(hand, HandLandmark::palm_center());

    // Scroll: thumb out, everything else folded
    if thumb && !index && !middle && !ring && !pinky {
        return Classification::with_anchor(GestureType::ScrollMode, palm_center);
    }

    // Volume: open palm
    if thumb && index && middle && ring && pinky {
        return Classification::with_anchor(GestureType::VolumeMode, palm_center);
    }

    // Pointer: pinky up, never the open-palm combination
    if pinky && !(index && middle && thumb) {
        let anchor = landmark(hand, HandLandmark::IndexMcp);
        let gesture = if index {
            GestureType::Dragging
        } else {
            GestureType::Pointing
        };
        return Classification::with_anchor(gesture, anchor);
    }

    // Clicks happen in place with the pinky folded
    if !pinky {
        if index && !middle && !ring {
            return Classification::bare(GestureType::LeftClick);
        }
        if !index && middle && !ring {
            return Classification::bare(GestureType::RightClick);
        }
    }

    Classification::none()
}

/// Classify a raw detector frame.
///
/// `None` (no hand) or a point set that is not exactly 21 landmarks maps
/// straight to `(None, None)` without evaluating any rule.
pub fn recognize(frame: Option<&[Landmark]>) -> (Classification, Option<FingerState>) {
    let points = match frame {
        Some(points) => points,
        None => return (Classification::none(), None),
    };

    let hand = match as_hand(points) {
        Some(hand) => hand,
        None => {
            debug!(
                "Gesture: expected {} landmarks, got {}",
                crate::hand::landmarks::LANDMARK_COUNT,
                points.len(),
            );
            return (Classification::none(), None);
        }
    };

    let fingers = extract_finger_state(hand);
    (classify(&fingers, hand), Some(fingers))
}

// ── Tests ──────────────────────────────────────────────────
