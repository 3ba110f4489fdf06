use std::{fmt, str::FromStr, time::Duration};

#[derive(Clone, Debug)]
pub struct Frame {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Person cutout produced by the sensor's background removal stream.
///
/// Pixels are BGRA with straight alpha; alpha 0 marks removed background.
#[derive(Clone, Debug)]
pub struct ForegroundFrame {
    pub bgra: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub timestamp: Duration,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackingId(pub u32);

impl fmt::Display for TrackingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackingState {
    NotTracked,
    PositionOnly,
    Tracked,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JointKind {
    Head,
    ShoulderCenter,
    HandLeft,
    HandRight,
    HipCenter,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub fn joint(&self) -> JointKind {
        match self {
            Hand::Left => JointKind::HandLeft,
            Hand::Right => JointKind::HandRight,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Joint {
    pub kind: JointKind,
    pub position: Vector3,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Skeleton {
    pub tracking_id: TrackingId,
    pub tracking_state: TrackingState,
    pub position: Vector3,
    pub joints: Vec<Joint>,
}

impl Skeleton {
    pub fn is_tracked(&self) -> bool {
        self.tracking_state == TrackingState::Tracked
    }

    pub fn joint(&self, kind: JointKind) -> Option<Vector3> {
        self.joints
            .iter()
            .find(|joint| joint.kind == kind)
            .map(|joint| joint.position)
    }
}

/// One hand position of one skeleton, as fed to the gesture detectors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JointSample {
    pub skeleton: TrackingId,
    pub hand: Hand,
    pub position: Vector3,
    pub timestamp: Duration,
}

/// Everything the sensor delivers for one "all frames ready" callback.
#[derive(Clone, Debug)]
pub struct SensorFrame {
    pub timestamp: Duration,
    pub skeletons: Vec<Option<Skeleton>>,
    pub foreground: Option<ForegroundFrame>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SwipeGesture {
    SwipeToLeft,
    SwipeToRight,
}

impl SwipeGesture {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwipeGesture::SwipeToLeft => "SwipeToLeft",
            SwipeGesture::SwipeToRight => "SwipeToRight",
        }
    }
}

impl fmt::Display for SwipeGesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown gesture name {0:?}")]
pub struct UnknownGesture(pub String);

impl FromStr for SwipeGesture {
    type Err = UnknownGesture;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SwipeToLeft" => Ok(SwipeGesture::SwipeToLeft),
            "SwipeToRight" => Ok(SwipeGesture::SwipeToRight),
            other => Err(UnknownGesture(other.to_string())),
        }
    }
}
