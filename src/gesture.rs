use std::{collections::VecDeque, time::Duration};

use crate::types::{Hand, JointSample, SwipeGesture, Vector3};

const DEFAULT_MIN_LENGTH: f32 = 0.4;
const DEFAULT_MAX_HEIGHT: f32 = 0.2;
const DEFAULT_WINDOW: Duration = Duration::from_millis(1_500);

/// Thresholds for swipe detection, in sensor-normalized units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwipeConfig {
    /// Horizontal travel the hand must exceed.
    pub min_length: f32,
    /// Vertical spread the trajectory must stay below.
    pub max_height: f32,
    /// Samples older than this, relative to the newest one, are dropped.
    pub window: Duration,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
            max_height: DEFAULT_MAX_HEIGHT,
            window: DEFAULT_WINDOW,
        }
    }
}

pub trait GestureListener {
    fn on_gesture(&mut self, gesture: SwipeGesture);
}

impl<F> GestureListener for F
where
    F: FnMut(SwipeGesture),
{
    fn on_gesture(&mut self, gesture: SwipeGesture) {
        self(gesture)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectorState {
    Idle,
    Fired,
}

#[derive(Clone, Copy, Debug)]
struct SwipeSample {
    time: Duration,
    x: f32,
    y: f32,
}

/// Detects a horizontal swipe from the trajectory of a single joint.
pub struct SwipeGestureDetector {
    config: SwipeConfig,
    history: VecDeque<SwipeSample>,
    state: DetectorState,
}

impl SwipeGestureDetector {
    pub fn new(config: SwipeConfig) -> Self {
        Self {
            config,
            history: VecDeque::new(),
            state: DetectorState::Idle,
        }
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.state = DetectorState::Idle;
    }

    /// Ingests one sample and returns the swipe it completed, if any.
    ///
    /// Non-finite positions are ignored and leave the detector untouched. A
    /// timestamp older than the newest retained sample means the sensor clock
    /// restarted: the history is dropped and the sample starts a new one.
    pub fn add(&mut self, position: Vector3, timestamp: Duration) -> Option<SwipeGesture> {
        if !position.is_finite() {
            return None;
        }
        if self.history.back().is_some_and(|newest| timestamp < newest.time) {
            log::debug!("sensor clock went back to {timestamp:?}, dropping swipe history");
            self.history.clear();
        }

        self.state = DetectorState::Idle;
        self.history.push_back(SwipeSample {
            time: timestamp,
            x: position.x,
            y: position.y,
        });

        while let Some(front) = self.history.front() {
            if timestamp.saturating_sub(front.time) > self.config.window {
                self.history.pop_front();
            } else {
                break;
            }
        }

        let gesture = self.detect()?;
        self.history.clear();
        self.state = DetectorState::Fired;
        Some(gesture)
    }

    /// Same as [`add`](Self::add), additionally handing a detected swipe to `listener`.
    pub fn add_with<L>(
        &mut self,
        position: Vector3,
        timestamp: Duration,
        listener: &mut L,
    ) -> Option<SwipeGesture>
    where
        L: GestureListener + ?Sized,
    {
        let gesture = self.add(position, timestamp)?;
        listener.on_gesture(gesture);
        Some(gesture)
    }

    fn detect(&self) -> Option<SwipeGesture> {
        let oldest = self.history.front()?;
        let newest = self.history.back()?;

        let (min_y, max_y) = self
            .history
            .iter()
            .fold((f32::MAX, f32::MIN), |acc, s| (acc.0.min(s.y), acc.1.max(s.y)));
        if max_y - min_y >= self.config.max_height {
            return None;
        }

        let dx = newest.x - oldest.x;
        if dx > self.config.min_length {
            Some(SwipeGesture::SwipeToRight)
        } else if dx < -self.config.min_length {
            Some(SwipeGesture::SwipeToLeft)
        } else {
            None
        }
    }
}

/// One swipe detector per hand so interleaved samples keep separate trajectories.
///
/// A swipe by either hand clears both, so a two-handed motion counts once.
pub struct HandGestures {
    left: SwipeGestureDetector,
    right: SwipeGestureDetector,
}

impl HandGestures {
    pub fn new(config: SwipeConfig) -> Self {
        Self {
            left: SwipeGestureDetector::new(config),
            right: SwipeGestureDetector::new(config),
        }
    }

    pub fn detector(&self, hand: Hand) -> &SwipeGestureDetector {
        match hand {
            Hand::Left => &self.left,
            Hand::Right => &self.right,
        }
    }

    fn detector_mut(&mut self, hand: Hand) -> &mut SwipeGestureDetector {
        match hand {
            Hand::Left => &mut self.left,
            Hand::Right => &mut self.right,
        }
    }

    pub fn add_sample<L>(&mut self, sample: &JointSample, listener: &mut L) -> Option<SwipeGesture>
    where
        L: GestureListener + ?Sized,
    {
        let gesture = self
            .detector_mut(sample.hand)
            .add_with(sample.position, sample.timestamp, listener)?;
        let other = match sample.hand {
            Hand::Left => Hand::Right,
            Hand::Right => Hand::Left,
        };
        self.detector_mut(other).reset();
        log::debug!(
            "{} detected on {:?} hand of skeleton {}",
            gesture,
            sample.hand,
            sample.skeleton
        );
        Some(gesture)
    }

    pub fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }
}
