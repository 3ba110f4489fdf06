use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use anyhow::Result;
use crossbeam_channel::{Receiver, SendTimeoutError, Sender, unbounded};

use crate::types::{SensorFrame, TrackingId};

// How often a producer blocked on a busy consumer re-checks the stop flag.
const SEND_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A depth sensor delivering skeletons and background-removed cutouts.
pub trait SensorSource: Send + 'static {
    fn name(&self) -> &str;

    /// Blocks until the next frame is ready; `Ok(None)` once the source is exhausted.
    fn next_frame(&mut self) -> Result<Option<SensorFrame>>;

    /// Tells the background removal stream which player to cut out.
    fn set_tracked_player(&mut self, id: TrackingId);
}

#[derive(Debug)]
pub struct SensorStream {
    stop: Arc<AtomicBool>,
    tracked_tx: Sender<TrackingId>,
    handle: Option<thread::JoinHandle<()>>,
}

impl SensorStream {
    pub fn set_tracked_player(&self, id: TrackingId) {
        let _ = self.tracked_tx.send(id);
    }

    pub fn stop(mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SensorStream {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Pulls frames from `source` on a dedicated thread.
///
/// Frames are handed over through `frame_tx`; with a bounded(1) channel at
/// most one frame waits while the consumer is busy, and none is dropped.
pub fn start_sensor_stream<S: SensorSource>(
    mut source: S,
    frame_tx: Sender<SensorFrame>,
) -> SensorStream {
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = stop.clone();
    let (tracked_tx, tracked_rx) = unbounded();

    let handle = thread::spawn(move || {
        log::info!("sensor {} started", source.name());

        while !stop_flag.load(Ordering::Relaxed) {
            apply_tracked_player(&mut source, &tracked_rx);

            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    log::info!("sensor {} has no more frames", source.name());
                    break;
                }
                Err(err) => {
                    log::warn!("sensor frame read failed: {err:?}");
                    continue;
                }
            };

            if !forward_frame(frame, &frame_tx, &stop_flag) {
                break;
            }
        }
    });

    SensorStream {
        stop,
        tracked_tx,
        handle: Some(handle),
    }
}

fn apply_tracked_player<S: SensorSource>(source: &mut S, tracked_rx: &Receiver<TrackingId>) {
    // Only the latest selection matters.
    if let Some(id) = tracked_rx.try_iter().last() {
        log::debug!("background removal now follows skeleton {id}");
        source.set_tracked_player(id);
    }
}

fn forward_frame(frame: SensorFrame, frame_tx: &Sender<SensorFrame>, stop: &AtomicBool) -> bool {
    let mut pending = frame;
    loop {
        match frame_tx.send_timeout(pending, SEND_POLL_INTERVAL) {
            Ok(()) => return true,
            Err(SendTimeoutError::Timeout(frame)) => {
                if stop.load(Ordering::Relaxed) {
                    return false;
                }
                pending = frame;
            }
            Err(SendTimeoutError::Disconnected(_)) => return false,
        }
    }
}
