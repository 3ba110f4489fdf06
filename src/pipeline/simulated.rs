use std::{thread, time::Duration};

use anyhow::Result;

use super::sensor::SensorSource;
use crate::types::{
    ForegroundFrame, Joint, JointKind, SensorFrame, Skeleton, TrackingId, TrackingState, Vector3,
};

const FRAME_PERIOD_MS: u64 = 33;
const REST_HAND_X: f32 = 0.15;
const HAND_HEIGHT: f32 = 0.05;

/// One step of the scripted performance of the nearest player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Motion {
    /// Hand stays where it is.
    Rest { frames: u32 },
    /// Right hand travels linearly to `to_x`.
    Swipe { to_x: f32, frames: u32 },
    /// The performer steps out of view.
    Leave,
}

/// Replays a scripted scene: a performer close to the sensor and a bystander
/// further back. Stands in for the hardware when none is attached.
pub struct ScriptedSensor {
    script: Vec<Motion>,
    step: usize,
    step_frame: u32,
    frame_index: u64,
    hand_x: f32,
    swipe_from: f32,
    performer_present: bool,
    tracked: Option<TrackingId>,
    cutout_size: (u32, u32),
    pace: Duration,
}

pub const PERFORMER: TrackingId = TrackingId(1);
pub const BYSTANDER: TrackingId = TrackingId(2);

impl ScriptedSensor {
    /// `pace` is slept between frames; zero replays as fast as possible.
    pub fn new(script: Vec<Motion>, cutout_size: (u32, u32), pace: Duration) -> Self {
        Self {
            script,
            step: 0,
            step_frame: 0,
            frame_index: 0,
            hand_x: REST_HAND_X,
            swipe_from: REST_HAND_X,
            performer_present: true,
            tracked: None,
            cutout_size,
            pace,
        }
    }

    /// Advances the script by one frame; `false` when it is finished.
    fn advance(&mut self) -> bool {
        loop {
            let Some(&motion) = self.script.get(self.step) else {
                return false;
            };
            match motion {
                Motion::Leave => {
                    self.performer_present = false;
                    self.next_step();
                }
                Motion::Rest { frames } | Motion::Swipe { frames, .. }
                    if self.step_frame >= frames =>
                {
                    self.next_step();
                }
                Motion::Rest { .. } => {
                    self.step_frame += 1;
                    return true;
                }
                Motion::Swipe { to_x, frames } => {
                    if self.step_frame == 0 {
                        self.swipe_from = self.hand_x;
                    }
                    self.step_frame += 1;
                    let progress = self.step_frame as f32 / frames as f32;
                    self.hand_x = self.swipe_from + (to_x - self.swipe_from) * progress;
                    return true;
                }
            }
        }
    }

    fn next_step(&mut self) {
        self.step += 1;
        self.step_frame = 0;
    }

    fn performer(&self) -> Skeleton {
        person(PERFORMER, 0.0, 1.8, self.hand_x)
    }

    fn bystander(&self) -> Skeleton {
        person(BYSTANDER, -0.6, 2.9, -0.45)
    }

    fn cutout(&self, skeletons: &[Option<Skeleton>], timestamp: Duration) -> ForegroundFrame {
        let (width, height) = self.cutout_size;
        let mut bgra = vec![0u8; width as usize * height as usize * 4];

        let player = self
            .tracked
            .and_then(|id| skeletons.iter().flatten().find(|s| s.tracking_id == id));
        if let Some(player) = player {
            paint_silhouette(&mut bgra, width, height, player);
        }

        ForegroundFrame {
            bgra,
            width,
            height,
            timestamp,
        }
    }
}

fn frame_timestamp(index: u64) -> Duration {
    Duration::from_millis(FRAME_PERIOD_MS.saturating_mul(index))
}

impl SensorSource for ScriptedSensor {
    fn name(&self) -> &str {
        "scripted"
    }

    fn next_frame(&mut self) -> Result<Option<SensorFrame>> {
        if !self.advance() {
            return Ok(None);
        }
        if !self.pace.is_zero() {
            thread::sleep(self.pace);
        }

        let timestamp = frame_timestamp(self.frame_index);
        self.frame_index += 1;

        // Fixed-size slot array like the sensor's skeleton buffer.
        let mut skeletons = vec![None; 6];
        if self.performer_present {
            skeletons[0] = Some(self.performer());
        }
        skeletons[3] = Some(self.bystander());

        let foreground = self.cutout(&skeletons, timestamp);
        Ok(Some(SensorFrame {
            timestamp,
            skeletons,
            foreground: Some(foreground),
        }))
    }

    fn set_tracked_player(&mut self, id: TrackingId) {
        self.tracked = Some(id);
    }
}

/// A short demo: swipe right twice, swipe left once, then walk away.
pub fn demo_script() -> Vec<Motion> {
    vec![
        Motion::Rest { frames: 30 },
        Motion::Swipe {
            to_x: 0.7,
            frames: 12,
        },
        Motion::Rest { frames: 20 },
        // too slow to count as a swipe
        Motion::Swipe {
            to_x: 0.15,
            frames: 80,
        },
        Motion::Rest { frames: 50 },
        Motion::Swipe {
            to_x: 0.7,
            frames: 12,
        },
        Motion::Rest { frames: 20 },
        Motion::Swipe {
            to_x: 0.0,
            frames: 12,
        },
        Motion::Rest { frames: 20 },
        Motion::Leave,
        Motion::Rest { frames: 30 },
    ]
}

fn person(id: TrackingId, x: f32, z: f32, right_hand_x: f32) -> Skeleton {
    let joint = |kind, jx, jy| Joint {
        kind,
        position: Vector3::new(jx, jy, z),
    };
    Skeleton {
        tracking_id: id,
        tracking_state: TrackingState::Tracked,
        position: Vector3::new(x, 0.0, z),
        joints: vec![
            joint(JointKind::Head, x, 0.55),
            joint(JointKind::ShoulderCenter, x, 0.35),
            joint(JointKind::HipCenter, x, 0.0),
            joint(JointKind::HandLeft, x - 0.25, HAND_HEIGHT),
            joint(JointKind::HandRight, x + right_hand_x, HAND_HEIGHT),
        ],
    }
}

// Opaque ellipse around the body centre, scaled down with distance.
fn paint_silhouette(bgra: &mut [u8], width: u32, height: u32, player: &Skeleton) {
    let scale = 1.0 / player.position.z.max(0.5);
    let cx = (0.5 + player.position.x * 0.5) * width as f32;
    let cy = height as f32 * 0.55;
    let rx = width as f32 * 0.2 * scale;
    let ry = height as f32 * 0.8 * scale;
    if rx <= 0.0 || ry <= 0.0 {
        return;
    }

    for (i, px) in bgra.chunks_exact_mut(4).enumerate() {
        let x = (i as u32 % width) as f32 + 0.5;
        let y = (i as u32 / width) as f32 + 0.5;
        let dx = (x - cx) / rx;
        let dy = (y - cy) / ry;
        if dx * dx + dy * dy <= 1.0 {
            px.copy_from_slice(&[96, 128, 200, 255]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(sensor: &mut ScriptedSensor) -> Vec<SensorFrame> {
        std::iter::from_fn(|| sensor.next_frame().unwrap()).collect()
    }

    #[test]
    fn script_length_matches_frame_count() {
        let script = vec![
            Motion::Rest { frames: 3 },
            Motion::Swipe {
                to_x: 0.5,
                frames: 4,
            },
            Motion::Leave,
            Motion::Rest { frames: 2 },
        ];
        let mut sensor = ScriptedSensor::new(script, (8, 6), Duration::ZERO);

        let frames = drain(&mut sensor);

        assert_eq!(frames.len(), 9);
        assert_eq!(frames[1].timestamp, Duration::from_millis(FRAME_PERIOD_MS));
        let ids = |frame: &SensorFrame| -> Vec<TrackingId> {
            frame.skeletons.iter().flatten().map(|s| s.tracking_id).collect()
        };
        assert_eq!(ids(&frames[6]), vec![PERFORMER, BYSTANDER]);
        assert_eq!(ids(&frames[7]), vec![BYSTANDER]);
    }

    #[test]
    fn timestamps_keep_growing_past_u32_frames() {
        let index = u64::from(u32::MAX) + 1;

        assert_eq!(frame_timestamp(index), Duration::from_millis(33 << 32));
        assert!(frame_timestamp(index) > frame_timestamp(index - 1));
    }

    #[test]
    fn swipe_moves_the_right_hand_to_its_target() {
        let script = vec![Motion::Swipe {
            to_x: 0.55,
            frames: 4,
        }];
        let mut sensor = ScriptedSensor::new(script, (4, 4), Duration::ZERO);

        let frames = drain(&mut sensor);
        let hand = frames[3].skeletons[0]
            .as_ref()
            .and_then(|s| s.joint(JointKind::HandRight))
            .unwrap();

        assert!((hand.x - 0.55).abs() < 1e-5);
        assert_eq!(hand.y, HAND_HEIGHT);
    }

    #[test]
    fn cutout_follows_the_tracked_player() {
        let script = vec![Motion::Rest { frames: 2 }];
        let mut sensor = ScriptedSensor::new(script, (16, 12), Duration::ZERO);

        let untracked = sensor.next_frame().unwrap().unwrap();
        let untracked = untracked.foreground.unwrap();
        assert!(untracked.bgra.chunks_exact(4).all(|px| px[3] == 0));

        sensor.set_tracked_player(PERFORMER);
        let tracked = sensor.next_frame().unwrap().unwrap().foreground.unwrap();
        assert_eq!((tracked.width, tracked.height), (16, 12));
        assert!(tracked.bgra.chunks_exact(4).any(|px| px[3] == 255));
    }
}
