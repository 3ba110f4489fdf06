pub mod compositor;
pub mod sensor;
pub mod simulated;
pub mod sink;

use anyhow::{Context, Result};
use crossbeam_channel::Receiver;

use crate::{
    session::{Session, SessionEvent},
    types::SensorFrame,
};

// Re-exports for convenience
pub use sensor::{SensorSource, SensorStream, start_sensor_stream};
pub use simulated::{ScriptedSensor, demo_script};
pub use sink::{FrameSink, PngSink};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub frames: u64,
    pub gestures: u64,
    pub background_changes: u64,
}

/// Consumes sensor frames until the producer hangs up.
///
/// Tracked-player changes are sent back to the sensor, and the composited
/// scene is presented whenever the background changes.
pub fn run_session_loop<S: FrameSink>(
    session: &mut Session,
    frame_rx: Receiver<SensorFrame>,
    stream: &SensorStream,
    sink: &mut S,
) -> Result<LoopStats> {
    let mut stats = LoopStats::default();

    while let Ok(frame) = frame_rx.recv() {
        stats.frames += 1;

        for event in session.process_frame(frame) {
            match event {
                SessionEvent::TrackedPlayerChanged(id) => stream.set_tracked_player(id),
                SessionEvent::Gesture(_) => stats.gestures += 1,
                SessionEvent::BackgroundChanged { index } => {
                    stats.background_changes += 1;
                    let scene = session
                        .render()
                        .with_context(|| format!("failed to composite background {index}"))?;
                    sink.present(&scene)?;
                }
                SessionEvent::ForegroundUpdated { .. } => {}
            }
        }
    }

    Ok(stats)
}
