//! Node animation sampling and the per-character mixer
//!
//! Every clip of a model plays at once and loops independently, the same
//! way each imported clip gets its own action on load.

use vitrine_asset::{ChannelProperty, ImportedChannel, ImportedClip, Interpolation};
use vitrine_core::{Transform, Vec3};

/// Sample a channel at `time`.
///
/// Returns 3 floats for translation/scale, 4 (xyzw) for rotation. Times
/// outside the keyframe range clamp to the first/last key.
pub fn sample_channel(channel: &ImportedChannel, time: f32) -> Vec<f32> {
    let keyframes = &channel.keyframes;
    let is_rotation = channel.property == ChannelProperty::Rotation;

    let (first, last) = match (keyframes.first(), keyframes.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            return if is_rotation {
                vec![0.0, 0.0, 0.0, 1.0]
            } else {
                vec![0.0; 3]
            };
        }
    };

    if time <= first.time {
        return first.value.clone();
    }
    if time >= last.time {
        return last.value.clone();
    }

    // First keyframe strictly after `time`; never 0 or len here
    let idx = keyframes.partition_point(|kf| kf.time <= time);
    let prev = &keyframes[idx - 1];
    let next = &keyframes[idx];

    let span = next.time - prev.time;
    if span <= 0.0 {
        return prev.value.clone();
    }
    let t = (time - prev.time) / span;

    match channel.interpolation {
        Interpolation::Step => prev.value.clone(),
        Interpolation::Linear => {
            if is_rotation {
                quat_slerp(&prev.value, &next.value, t)
            } else {
                lerp_vec(&prev.value, &next.value, t)
            }
        }
        Interpolation::CubicSpline => {
            let zero = [0.0; 4];
            let out_tangent = prev.out_tangent.as_deref().unwrap_or(&zero[..]);
            let in_tangent = next.in_tangent.as_deref().unwrap_or(&zero[..]);
            let components = if is_rotation { 4 } else { 3 };
            let v = cubic_hermite(&prev.value, out_tangent, &next.value, in_tangent, span, t, components);
            if is_rotation {
                normalize_quat(v)
            } else {
                v
            }
        }
    }
}

/// Hermite spline between `p0` and `p1` with tangents `m0`, `m1` given per
/// unit time; `span` is the keyframe interval and `t` runs 0 to 1 across it
pub fn cubic_hermite(p0: &[f32], m0: &[f32], p1: &[f32], m1: &[f32], span: f32, t: f32, components: usize) -> Vec<f32> {
    let t2 = t * t;
    let t3 = t2 * t;
    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;

    let at = |v: &[f32], i: usize| v.get(i).copied().unwrap_or(0.0);
    (0..components)
        .map(|i| h00 * at(p0, i) + h10 * span * at(m0, i) + h01 * at(p1, i) + h11 * span * at(m1, i))
        .collect()
}

fn normalize_quat(q: Vec<f32>) -> Vec<f32> {
    let len = q.iter().map(|v| v * v).sum::<f32>().sqrt();
    if len > 1e-8 {
        q.into_iter().map(|v| v / len).collect()
    } else {
        vec![0.0, 0.0, 0.0, 1.0]
    }
}

fn lerp_vec(a: &[f32], b: &[f32], t: f32) -> Vec<f32> {
    (0..3)
        .map(|i| {
            let av = a.get(i).copied().unwrap_or(0.0);
            let bv = b.get(i).copied().unwrap_or(0.0);
            av + (bv - av) * t
        })
        .collect()
}

/// Quaternion slerp (xyzw) along the shortest arc; result is normalized
pub fn quat_slerp(a: &[f32], b: &[f32], t: f32) -> Vec<f32> {
    if a.len() < 4 || b.len() < 4 {
        return vec![0.0, 0.0, 0.0, 1.0];
    }

    let mut b = [b[0], b[1], b[2], b[3]];
    let mut dot = a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3];
    if dot < 0.0 {
        for v in &mut b {
            *v = -*v;
        }
        dot = -dot;
    }

    let (scale_a, scale_b) = if dot > 0.9995 {
        (1.0 - t, t)
    } else {
        let theta = dot.acos();
        let sin_theta = theta.sin();
        (
            ((1.0 - t) * theta).sin() / sin_theta,
            (t * theta).sin() / sin_theta,
        )
    };

    let r: Vec<f32> = (0..4).map(|i| scale_a * a[i] + scale_b * b[i]).collect();
    let len = r.iter().map(|v| v * v).sum::<f32>().sqrt();
    if len > 1e-8 {
        r.into_iter().map(|v| v / len).collect()
    } else {
        vec![0.0, 0.0, 0.0, 1.0]
    }
}

/// Looping playback of one clip
#[derive(Debug, Clone)]
pub struct ClipAction {
    pub clip: ImportedClip,
    pub time: f32,
}

impl ClipAction {
    fn advance(&mut self, dt: f32) {
        self.time += dt;
        if self.clip.duration > 0.0 {
            self.time %= self.clip.duration;
        } else {
            self.time = 0.0;
        }
    }
}

/// Plays every clip of a model and produces the animated node pose
#[derive(Debug, Clone, Default)]
pub struct AnimationMixer {
    actions: Vec<ClipAction>,
}

impl AnimationMixer {
    pub fn new(clips: &[ImportedClip]) -> Self {
        Self {
            actions: clips
                .iter()
                .map(|clip| ClipAction {
                    clip: clip.clone(),
                    time: 0.0,
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn actions(&self) -> &[ClipAction] {
        &self.actions
    }

    /// Advance every action by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        for action in &mut self.actions {
            action.advance(dt);
        }
    }

    /// Write sampled channel values over `pose` (one transform per node)
    pub fn apply(&self, pose: &mut [Transform]) {
        for action in &self.actions {
            for channel in &action.clip.channels {
                let Some(node) = pose.get_mut(channel.node_index) else {
                    continue;
                };
                let v = sample_channel(channel, action.time);
                match (channel.property, v.as_slice()) {
                    (ChannelProperty::Translation, &[x, y, z, ..]) => {
                        node.position = Vec3::new(x, y, z);
                    }
                    (ChannelProperty::Rotation, &[x, y, z, w, ..]) => {
                        node.rotation = [x, y, z, w];
                    }
                    (ChannelProperty::Scale, &[x, y, z, ..]) => {
                        node.scale = Vec3::new(x, y, z);
                    }
                    _ => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_asset::ImportedKeyframe;

    fn kf(time: f32, value: &[f32]) -> ImportedKeyframe {
        ImportedKeyframe::new(time, value.to_vec())
    }

    fn spline_key(time: f32, value: &[f32], tangent: &[f32]) -> ImportedKeyframe {
        ImportedKeyframe {
            in_tangent: Some(tangent.to_vec()),
            out_tangent: Some(tangent.to_vec()),
            ..kf(time, value)
        }
    }

    fn bob_clip() -> ImportedClip {
        ImportedClip {
            name: "bob".into(),
            duration: 2.0,
            channels: vec![ImportedChannel {
                node_index: 0,
                property: ChannelProperty::Translation,
                interpolation: Interpolation::Linear,
                keyframes: vec![kf(0.0, &[0.0, 0.0, 0.0]), kf(2.0, &[0.0, 2.0, 0.0])],
            }],
        }
    }

    #[test]
    fn linear_translation_interpolates() {
        let clip = bob_clip();
        let v = sample_channel(&clip.channels[0], 0.5);
        assert!((v[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn sampling_clamps_outside_range() {
        let clip = bob_clip();
        assert_eq!(sample_channel(&clip.channels[0], -1.0), vec![0.0, 0.0, 0.0]);
        assert_eq!(sample_channel(&clip.channels[0], 5.0), vec![0.0, 2.0, 0.0]);
    }

    #[test]
    fn step_holds_previous_key() {
        let mut clip = bob_clip();
        clip.channels[0].interpolation = Interpolation::Step;
        let v = sample_channel(&clip.channels[0], 1.9);
        assert_eq!(v[1], 0.0);
    }

    #[test]
    fn cubic_spline_follows_hermite_curve() {
        let mut channel = bob_clip().channels.remove(0);
        channel.interpolation = Interpolation::CubicSpline;
        channel.keyframes = vec![
            spline_key(0.0, &[0.0, 1.0, 0.0], &[0.0; 3]),
            spline_key(1.0, &[0.0, 2.0, 0.0], &[0.0; 3]),
        ];

        // Flat tangents ease in and out instead of moving linearly
        let quarter = sample_channel(&channel, 0.25);
        assert!((quarter[1] - 1.15625).abs() < 1e-5, "{quarter:?}");
        let mid = sample_channel(&channel, 0.5);
        assert!((mid[1] - 1.5).abs() < 1e-5);
        assert_eq!(sample_channel(&channel, 1.0), vec![0.0, 2.0, 0.0]);
    }

    #[test]
    fn cubic_tangents_scale_with_interval() {
        let mut channel = bob_clip().channels.remove(0);
        channel.interpolation = Interpolation::CubicSpline;
        // Slope of one unit per second over a two second span: a straight line
        channel.keyframes = vec![
            spline_key(0.0, &[0.0, 0.0, 0.0], &[0.0, 1.0, 0.0]),
            spline_key(2.0, &[0.0, 2.0, 0.0], &[0.0, 1.0, 0.0]),
        ];
        let v = sample_channel(&channel, 0.5);
        assert!((v[1] - 0.5).abs() < 1e-5, "{v:?}");
    }

    #[test]
    fn cubic_rotation_is_normalized() {
        let half = std::f32::consts::FRAC_1_SQRT_2;
        let channel = ImportedChannel {
            node_index: 0,
            property: ChannelProperty::Rotation,
            interpolation: Interpolation::CubicSpline,
            keyframes: vec![
                spline_key(0.0, &[0.0, 0.0, 0.0, 1.0], &[0.0; 4]),
                spline_key(1.0, &[0.0, half, 0.0, half], &[0.0; 4]),
            ],
        };
        let q = sample_channel(&channel, 0.5);
        let len = q.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert_eq!(q.len(), 4);
        assert!((len - 1.0).abs() < 1e-5);
    }

    #[test]
    fn slerp_takes_shortest_path() {
        let half = std::f32::consts::FRAC_1_SQRT_2;
        let a = [0.0, 0.0, 0.0, 1.0];
        // Same 90 degree yaw as [0, half, 0, half], expressed with negated sign
        let b = [0.0, -half, 0.0, -half];
        let mid = quat_slerp(&a, &b, 0.5);
        // 45 degrees about +Y: positive y and w
        assert!(mid[1] > 0.0 && mid[3] > 0.0);
        assert!((mid[1] - (std::f32::consts::PI / 8.0).sin()).abs() < 1e-4);
    }

    #[test]
    fn mixer_loops_and_applies_pose() {
        let mut mixer = AnimationMixer::new(&[bob_clip()]);
        let mut pose = vec![Transform::IDENTITY];

        mixer.update(2.5);
        assert!((mixer.actions()[0].time - 0.5).abs() < 1e-6);

        mixer.apply(&mut pose);
        assert!((pose[0].position.y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn channels_for_missing_nodes_are_skipped() {
        let mut clip = bob_clip();
        clip.channels[0].node_index = 7;
        let mixer = AnimationMixer::new(&[clip]);
        let mut pose = vec![Transform::IDENTITY];
        mixer.apply(&mut pose);
        assert_eq!(pose[0], Transform::IDENTITY);
    }
}
