//! Finger extension state from a single frame of landmarks.
//!
//! Pure geometry, no memory between frames.  Calibrated for an upright
//! hand with the palm facing the camera.

use super::landmarks::{landmark, HandLandmark, HandLandmarks};

/// Extended (true) or retracted (false) per finger, thumb first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FingerState {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl FingerState {
    pub fn from_array(fingers: [bool; 5]) -> Self {
        let [thumb, index, middle, ring, pinky] = fingers;
        Self {
            thumb,
            index,
            middle,
            ring,
            pinky,
        }
    }

    pub fn as_array(&self) -> [bool; 5] {
        [self.thumb, self.index, self.middle, self.ring, self.pinky]
    }

    /// Number of extended fingers.
    pub fn extended_count(&self) -> usize {
        self.as_array().iter().filter(|f| **f).count()
    }

    /// Compact form for logs, e.g. `10001`.
    pub fn as_bits(&self) -> String {
        self.as_array()
            .iter()
            .map(|f| if *f { '1' } else { '0' })
            .collect()
    }
}

/// Joint each non-thumb fingertip is compared against.
const PIP_JOINTS: [HandLandmark; 4] = [
    HandLandmark::IndexPip,
    HandLandmark::MiddlePip,
    HandLandmark::RingPip,
    HandLandmark::PinkyPip,
];

/// Derive the finger-extension vector for one hand.
///
/// Thumb: extended when its tip lies horizontally farther from the palm
/// base (middle-finger MCP) than its IP joint does.  Other fingers:
/// extended when the tip sits above (smaller y than) the PIP joint.
pub fn extract_finger_state(hand: &HandLandmarks) -> FingerState {
    let palm_base = landmark(hand, HandLandmark::palm_center());
    let thumb_tip = landmark(hand, HandLandmark::ThumbTip);
    let thumb_ip = landmark(hand, HandLandmark::ThumbIp);
    let thumb = (thumb_tip.x - palm_base.x).abs() > (thumb_ip.x - palm_base.x).abs();

    let tips = HandLandmark::fingertips();
    let mut fingers = [thumb, false, false, false, false];
    for (slot, (tip, pip)) in tips[1..].iter().zip(PIP_JOINTS.iter()).enumerate() {
        fingers[slot + 1] = landmark(hand, *tip).y < landmark(hand, *pip).y;
    }

    FingerState::from_array(fingers)
}

// ── Test helpers ───────────────────────────────────────────

/// Build an upright, palm-facing hand with the given fingers extended.
///
/// Palm base sits at (0.5, 0.6).  The thumb IP joint is 0.05 to the left
/// of it; an extended thumb tip reaches 0.12 left, a folded one rests at
/// 0.02.  Extended fingertips sit 0.15 above their PIP joints, folded
/// ones 0.05 below.
#[cfg(test)]
pub(crate) fn make_posed_hand(fingers: [bool; 5]) -> HandLandmarks {
    use super::landmarks::{make_hand, set_landmark};

    let mut hand = make_hand(0.5, 0.6);
    set_landmark(&mut hand, HandLandmark::MiddleMcp, 0.5, 0.6);
    set_landmark(&mut hand, HandLandmark::IndexMcp, 0.45, 0.6);
    set_landmark(&mut hand, HandLandmark::ThumbIp, 0.45, 0.62);
    let thumb_x = if fingers[0] { 0.38 } else { 0.48 };
    set_landmark(&mut hand, HandLandmark::ThumbTip, thumb_x, 0.6);

    let columns = [0.45, 0.5, 0.55, 0.6];
    for (i, (tip, pip)) in HandLandmark::fingertips()[1..]
        .iter()
        .zip(PIP_JOINTS.iter())
        .enumerate()
    {
        let x = columns[i];
        set_landmark(&mut hand, *pip, x, 0.5);
        let tip_y = if fingers[i + 1] { 0.35 } else { 0.55 };
        set_landmark(&mut hand, *tip, x, tip_y);
    }
    hand
}

// ── Tests ──────────────────────────────────────────────────
