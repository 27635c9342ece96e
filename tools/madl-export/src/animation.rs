//! Animation encoding (pose tracks -> sparse delta sequences)
//!
//! Each frame stores, per bone, the change since the previous sample; the first
//! frame is measured against the rest pose (the zero transform, since samples
//! are pose-space). Only changed channels are written, as f16.

use madl_common::{AnimationFrame, AnimationSequence, CHANNEL_COUNT, encode_bone_delta};
use rayon::prelude::*;

use crate::error::ExportError;
use crate::scene::{Armature, BoneSample, PoseTrack};

/// Per-channel difference `current - previous`, in channel order
fn channel_delta(current: &BoneSample, previous: &BoneSample) -> [f32; CHANNEL_COUNT] {
    let mut delta = [0.0; CHANNEL_COUNT];
    for axis in 0..3 {
        delta[axis] = current.location[axis] - previous.location[axis];
        delta[axis + 3] = current.rotation[axis] - previous.rotation[axis];
    }
    delta
}

/// Encode one track into a sequence
pub fn encode_track(
    index: u32,
    track: &PoseTrack,
    bone_count: usize,
    fps: u8,
) -> Result<AnimationSequence, ExportError> {
    let fps = track.fps.unwrap_or(fps);
    if fps == 0 {
        return Err(ExportError::malformed_track(&track.name, "frame rate is 0"));
    }
    if track.frames.is_empty() {
        return Err(ExportError::malformed_track(&track.name, "no frames"));
    }
    if bone_count > u8::MAX as usize + 1 {
        return Err(ExportError::malformed_track(
            &track.name,
            format!("{} bones cannot be addressed", bone_count),
        ));
    }

    let rest = vec![BoneSample::default(); bone_count];
    let mut previous: &[BoneSample] = &rest;
    let mut frames = Vec::with_capacity(track.frames.len());

    for (offset, pose) in track.frames.iter().enumerate() {
        let number = track.first_frame as usize + offset;
        let frame = u16::try_from(number).map_err(|_| {
            ExportError::malformed_track(
                &track.name,
                format!("frame {} does not fit in 16 bits", number),
            )
        })?;
        if pose.len() != bone_count {
            return Err(ExportError::malformed_track(
                &track.name,
                format!(
                    "frame {} has {} bone samples, skeleton has {} bones",
                    number,
                    pose.len(),
                    bone_count
                ),
            ));
        }

        let deltas = pose
            .iter()
            .zip(previous)
            .enumerate()
            .filter_map(|(bone, (current, prior))| {
                encode_bone_delta(bone as u8, channel_delta(current, prior))
            })
            .collect();
        frames.push(AnimationFrame { frame, deltas });
        previous = pose.as_slice();
    }

    let sequence = AnimationSequence {
        index,
        name: track.name.clone(),
        fps,
        frames,
    };
    tracing::debug!(
        "Sequence {} '{}': {} frames at {} fps, {} bytes",
        sequence.index,
        sequence.name,
        sequence.frames.len(),
        sequence.fps,
        sequence.encoded_len()
    );
    Ok(sequence)
}

/// Encode every track, numbering sequences from 1
pub fn encode_animations(
    tracks: &[PoseTrack],
    armature: &Armature,
    fps: u8,
) -> Result<Vec<AnimationSequence>, ExportError> {
    let sequences = tracks
        .par_iter()
        .enumerate()
        .map(|(i, track)| encode_track(i as u32 + 1, track, armature.bones.len(), fps))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!(
        "Animation: {} sequences, {} frames",
        sequences.len(),
        sequences.iter().map(|s| s.frames.len()).sum::<usize>()
    );
    Ok(sequences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use madl_common::{CHANNEL_POS_Y, CHANNEL_ROT_X, decode_bone_delta, f16_to_f32};

    fn sample(location: [f32; 3], rotation: [f32; 3]) -> BoneSample {
        BoneSample { location, rotation }
    }

    fn track(frames: Vec<Vec<BoneSample>>) -> PoseTrack {
        PoseTrack {
            name: "wave".into(),
            first_frame: 0,
            fps: None,
            frames,
        }
    }

    #[test]
    fn test_rest_frame_has_no_entries() {
        let rest = BoneSample::default();
        let raised = sample([0.0; 3], [0.1, 0.0, 0.0]);
        let frames = vec![vec![rest, rest], vec![rest, raised]];
        let seq = encode_track(1, &track(frames), 2, 30).unwrap();

        assert_eq!(seq.frames.len(), 2);
        assert_eq!(seq.frames[0].frame, 0);
        assert!(seq.frames[0].deltas.is_empty());

        let entries = &seq.frames[1].deltas;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].bone, 1);
        assert_eq!(entries[0].mask, CHANNEL_ROT_X);
        assert!((f16_to_f32(entries[0].values[0]) - 0.1).abs() < 1e-3);
    }

    #[test]
    fn test_first_frame_is_relative_to_rest() {
        let posed = sample([0.0, 2.0, 0.0], [0.0; 3]);
        let seq = encode_track(1, &track(vec![vec![posed], vec![posed]]), 1, 30).unwrap();

        assert_eq!(seq.frames[0].deltas.len(), 1);
        assert_eq!(seq.frames[0].deltas[0].mask, CHANNEL_POS_Y);
        // Holding a pose produces no entries
        assert!(seq.frames[1].deltas.is_empty());
    }

    #[test]
    fn test_deltas_accumulate_to_pose() {
        let poses = [
            sample([0.5, 0.0, 0.0], [0.0, 0.25, 0.0]),
            sample([1.0, 0.0, -0.5], [0.0, 0.25, 0.5]),
            sample([1.0, 0.5, -0.5], [0.0, 0.0, 0.5]),
        ];
        let frames = poses.iter().map(|&p| vec![p]).collect();
        let seq = encode_track(1, &track(frames), 1, 30).unwrap();

        let mut accumulated = [0.0f32; CHANNEL_COUNT];
        for frame in &seq.frames {
            for delta in &frame.deltas {
                for (acc, d) in accumulated.iter_mut().zip(decode_bone_delta(delta)) {
                    *acc += d;
                }
            }
        }
        assert_eq!(accumulated, [1.0, 0.5, -0.5, 0.0, 0.0, 0.5]);
    }

    #[test]
    fn test_frame_numbers_start_at_first_frame() {
        let mut t = track(vec![vec![BoneSample::default()]; 3]);
        t.first_frame = 10;
        let seq = encode_track(1, &t, 1, 30).unwrap();
        let numbers: Vec<u16> = seq.frames.iter().map(|f| f.frame).collect();
        assert_eq!(numbers, vec![10, 11, 12]);
    }

    #[test]
    fn test_track_fps_override() {
        let mut t = track(vec![vec![BoneSample::default()]]);
        assert_eq!(encode_track(1, &t, 1, 30).unwrap().fps, 30);
        t.fps = Some(24);
        assert_eq!(encode_track(1, &t, 1, 30).unwrap().fps, 24);
    }

    #[test]
    fn test_malformed_tracks() {
        let empty = track(vec![]);
        assert!(matches!(
            encode_track(1, &empty, 1, 30),
            Err(ExportError::MalformedTrack { .. })
        ));

        let short = track(vec![vec![BoneSample::default()]]);
        let err = encode_track(1, &short, 2, 30).unwrap_err();
        assert!(err.to_string().contains("wave"));

        let mut late = track(vec![vec![BoneSample::default()]; 2]);
        late.first_frame = u16::MAX as u32;
        assert!(encode_track(1, &late, 1, 30).is_err());

        let still = track(vec![vec![BoneSample::default()]]);
        assert!(encode_track(1, &still, 1, 0).is_err());
    }

    #[test]
    fn test_sequences_numbered_in_order() {
        let armature = Armature {
            name: "rig".into(),
            bones: vec![],
        };
        let mut a = track(vec![vec![]]);
        a.name = "idle".into();
        let mut b = track(vec![vec![], vec![]]);
        b.name = "walk".into();

        let sequences = encode_animations(&[a, b], &armature, 30).unwrap();
        assert_eq!(sequences.len(), 2);
        assert_eq!((sequences[0].index, sequences[0].name.as_str()), (1, "idle"));
        assert_eq!((sequences[1].index, sequences[1].name.as_str()), (2, "walk"));
        assert_eq!(sequences[1].header().frame_count, 2);
    }
}
