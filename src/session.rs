use crate::{
    backgrounds::{BackgroundCarousel, BackgroundError},
    gesture::{GestureListener, HandGestures, SwipeConfig},
    pipeline::compositor::{CompositeError, ForegroundBuffer, composite},
    skeleton::{choose_skeleton, find_tracked, hand_samples},
    types::{Frame, SensorFrame, SwipeGesture, TrackingId},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    Gesture(SwipeGesture),
    BackgroundChanged { index: usize },
    TrackedPlayerChanged(TrackingId),
    ForegroundUpdated { width: u32, height: u32 },
}

/// State of one interactive run: who is tracked, which background is shown,
/// and the latest person cutout.
pub struct Session {
    tracked: Option<TrackingId>,
    gestures: HandGestures,
    carousel: BackgroundCarousel,
    foreground: ForegroundBuffer,
    status: String,
    events: Vec<SessionEvent>,
}

impl Session {
    pub fn new(swipe: SwipeConfig, carousel: BackgroundCarousel) -> Self {
        Self {
            tracked: None,
            gestures: HandGestures::new(swipe),
            carousel,
            foreground: ForegroundBuffer::new(),
            status: String::new(),
            events: Vec::new(),
        }
    }

    pub fn tracked(&self) -> Option<TrackingId> {
        self.tracked
    }

    pub fn background_index(&self) -> usize {
        self.carousel.position()
    }

    pub fn carousel(&self) -> &BackgroundCarousel {
        &self.carousel
    }

    /// Last recognized gesture name, shown in the status bar.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Handles one sensor callback to completion.
    ///
    /// Hands of the skeleton tracked so far are fed to the swipe detectors
    /// before the tracked skeleton is re-chosen for this frame.
    pub fn process_frame(&mut self, frame: SensorFrame) -> Vec<SessionEvent> {
        if let Some(cutout) = &frame.foreground {
            match self.foreground.write(cutout) {
                Ok(_) => self.events.push(SessionEvent::ForegroundUpdated {
                    width: cutout.width,
                    height: cutout.height,
                }),
                Err(err) => log::warn!("skipping foreground frame: {err}"),
            }
        }

        let samples = self
            .tracked
            .and_then(|id| find_tracked(&frame.skeletons, id))
            .map(|skeleton| hand_samples(skeleton, frame.timestamp))
            .unwrap_or_default();

        let mut fired = Vec::new();
        for sample in &samples {
            self.gestures
                .add_sample(sample, &mut |gesture: SwipeGesture| fired.push(gesture));
        }
        for gesture in fired {
            self.on_gesture(gesture);
        }

        if let Some(id) = choose_skeleton(&frame.skeletons, self.tracked) {
            log::info!("tracking skeleton {id}");
            self.tracked = Some(id);
            self.gestures.reset();
            self.events.push(SessionEvent::TrackedPlayerChanged(id));
        }

        std::mem::take(&mut self.events)
    }

    /// Selects a background from its on-screen button label.
    pub fn press_button(&mut self, label: &str) -> Result<SessionEvent, BackgroundError> {
        let index = self.carousel.press(label)?;
        log::info!("button {label} selected background {index}");
        Ok(SessionEvent::BackgroundChanged { index })
    }

    pub fn render(&self) -> Result<Frame, CompositeError> {
        composite(self.carousel.current(), &self.foreground)
    }
}

impl GestureListener for Session {
    fn on_gesture(&mut self, gesture: SwipeGesture) {
        log::info!("{gesture}");
        self.status = gesture.to_string();
        let index = self.carousel.apply(gesture);
        self.events.push(SessionEvent::Gesture(gesture));
        self.events.push(SessionEvent::BackgroundChanged { index });
    }
}
