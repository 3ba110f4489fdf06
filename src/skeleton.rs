use std::time::Duration;

use crate::types::{Hand, JointSample, Skeleton, TrackingId};

/// Picks the skeleton to interact with.
///
/// Returns `None` while `current` is still visible and tracked, or when no
/// tracked skeleton is present at all. Otherwise returns the tracked skeleton
/// nearest to the sensor; on equal depth the first one in the frame wins.
/// Skeletons without a finite depth are never chosen.
pub fn choose_skeleton(
    skeletons: &[Option<Skeleton>],
    current: Option<TrackingId>,
) -> Option<TrackingId> {
    let mut nearest: Option<(f32, TrackingId)> = None;

    for skeleton in tracked(skeletons) {
        if Some(skeleton.tracking_id) == current {
            return None;
        }

        let depth = skeleton.position.z;
        if !depth.is_finite() {
            continue;
        }
        if nearest.is_none_or(|(best, _)| depth < best) {
            nearest = Some((depth, skeleton.tracking_id));
        }
    }

    nearest.map(|(_, id)| id)
}

pub fn find_tracked(skeletons: &[Option<Skeleton>], id: TrackingId) -> Option<&Skeleton> {
    tracked(skeletons).find(|skeleton| skeleton.tracking_id == id)
}

/// Hand positions of one skeleton, left first.
pub fn hand_samples(skeleton: &Skeleton, timestamp: Duration) -> Vec<JointSample> {
    [Hand::Left, Hand::Right]
        .into_iter()
        .filter_map(|hand| {
            skeleton.joint(hand.joint()).map(|position| JointSample {
                skeleton: skeleton.tracking_id,
                hand,
                position,
                timestamp,
            })
        })
        .collect()
}

fn tracked(skeletons: &[Option<Skeleton>]) -> impl Iterator<Item = &Skeleton> {
    skeletons
        .iter()
        .flatten()
        .filter(|skeleton| skeleton.is_tracked())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Joint, JointKind, TrackingState, Vector3};

    fn body(id: u32, z: f32, state: TrackingState) -> Option<Skeleton> {
        Some(Skeleton {
            tracking_id: TrackingId(id),
            tracking_state: state,
            position: Vector3::new(0.0, 0.0, z),
            joints: Vec::new(),
        })
    }

    #[test]
    fn picks_nearest_tracked_skeleton() {
        let frame = vec![
            None,
            body(1, 2.5, TrackingState::Tracked),
            body(2, 1.5, TrackingState::PositionOnly),
            body(3, 1.8, TrackingState::Tracked),
            None,
        ];

        assert_eq!(choose_skeleton(&frame, None), Some(TrackingId(3)));
    }

    #[test]
    fn keeps_current_while_visible() {
        let frame = vec![
            body(1, 1.0, TrackingState::Tracked),
            body(7, 3.0, TrackingState::Tracked),
        ];

        assert_eq!(choose_skeleton(&frame, Some(TrackingId(7))), None);
    }

    #[test]
    fn replaces_current_when_it_stops_being_tracked() {
        let frame = vec![
            body(7, 1.0, TrackingState::PositionOnly),
            body(4, 2.0, TrackingState::Tracked),
        ];

        assert_eq!(
            choose_skeleton(&frame, Some(TrackingId(7))),
            Some(TrackingId(4))
        );
    }

    #[test]
    fn equal_depth_goes_to_first_in_frame() {
        let frame = vec![
            body(9, 2.0, TrackingState::Tracked),
            body(5, 2.0, TrackingState::Tracked),
        ];

        assert_eq!(choose_skeleton(&frame, None), Some(TrackingId(9)));
    }

    #[test]
    fn skeleton_without_finite_depth_is_never_chosen() {
        let frame = vec![
            body(5, f32::NAN, TrackingState::Tracked),
            body(6, 1.0, TrackingState::Tracked),
        ];

        assert_eq!(choose_skeleton(&frame, None), Some(TrackingId(6)));
        assert_eq!(choose_skeleton(&frame[..1], None), None);
    }

    #[test]
    fn empty_frame_changes_nothing() {
        let frame = vec![None, body(2, 1.0, TrackingState::NotTracked)];

        assert_eq!(choose_skeleton(&frame, Some(TrackingId(1))), None);
        assert!(find_tracked(&frame, TrackingId(2)).is_none());
    }

    #[test]
    fn hand_samples_cover_present_hands() {
        let skeleton = Skeleton {
            tracking_id: TrackingId(2),
            tracking_state: TrackingState::Tracked,
            position: Vector3::new(0.0, 0.0, 2.0),
            joints: vec![
                Joint {
                    kind: JointKind::Head,
                    position: Vector3::new(0.0, 0.6, 2.0),
                },
                Joint {
                    kind: JointKind::HandRight,
                    position: Vector3::new(0.3, 0.1, 1.9),
                },
            ],
        };

        let samples = hand_samples(&skeleton, Duration::from_millis(40));
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].hand, Hand::Right);
        assert_eq!(samples[0].skeleton, TrackingId(2));
        assert_eq!(samples[0].timestamp, Duration::from_millis(40));
    }
}
