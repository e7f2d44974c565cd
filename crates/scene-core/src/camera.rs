//! Beat-driven camera choreography.
//!
//! The rig cycles through a fixed ring of viewpoints. Strong beats may cut to
//! the next viewpoint (with an eased glide and a burst of shake) or whip-pan
//! around the vertical axis; the radial distance breathes with the beat.

use crate::clock::DecayClock;
use crate::constants::*;
use glam::{Mat4, Quat, Vec3};
use rand::Rng;

/// Simple right-handed camera description with perspective projection.
#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: CAMERA_TARGETS[0],
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: 16.0 / 9.0,
            fovy_radians: CAMERA_FOV_DEG.to_radians(),
            znear: CAMERA_ZNEAR,
            zfar: CAMERA_ZFAR,
        }
    }
}

impl Camera {
    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }
    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }
    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
    /// Keep the projection in step with the drawable size. Zero-sized
    /// drawables (minimised tabs) leave the aspect unchanged.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub eye: Vec3,
    pub look_at: Vec3,
}

#[derive(Clone, Debug)]
pub struct CameraRig {
    pub targets: [Vec3; 5],
    pub target_index: usize,
    pub transition_elapsed: f32,
    pub transition_duration: f32,
    pub shake: f32,
    pub zoom: f32,
    pub base_zoom: f32,
    pub position: Vec3,
    clock: DecayClock,
}

impl CameraRig {
    pub fn new(base_zoom: f32, clock: DecayClock) -> Self {
        let start = CAMERA_TARGETS[0];
        Self {
            targets: CAMERA_TARGETS,
            // Settled glides rest on `targets[next_index()]`, so the first cut
            // leaves from the viewpoint the eye already occupies.
            target_index: CAMERA_TARGETS.len() - 1,
            transition_elapsed: CAMERA_TRANSITION_SECS,
            transition_duration: CAMERA_TRANSITION_SECS,
            shake: 0.0,
            zoom: start.length(),
            base_zoom,
            position: start,
            clock,
        }
    }

    #[inline]
    fn next_index(&self) -> usize {
        (self.target_index + 1) % self.targets.len()
    }

    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        elapsed_sec: f32,
        dt_sec: f32,
        beat: f32,
        rng: &mut R,
    ) -> CameraPose {
        if beat > CAMERA_CUT_BEAT && rng.gen::<f32>() > CAMERA_CUT_CHANCE {
            self.target_index = self.next_index();
            self.transition_elapsed = 0.0;
            self.shake = CAMERA_SHAKE_MAX;
            log::debug!("camera cut -> viewpoint {}", self.target_index);
        }

        if self.transition_elapsed < self.transition_duration {
            self.transition_elapsed =
                (self.transition_elapsed + dt_sec).min(self.transition_duration);
            let progress = if self.transition_duration > 0.0 {
                self.transition_elapsed / self.transition_duration
            } else {
                1.0
            };
            let eased = ease_out_cubic(progress);
            let from = self.targets[self.target_index];
            let to = self.targets[self.next_index()];
            self.position = from.lerp(to, eased);
        }

        if self.shake > 0.0 {
            let s = self.shake;
            self.position += Vec3::new(
                (rng.gen::<f32>() - 0.5) * s,
                (rng.gen::<f32>() - 0.5) * s,
                (rng.gen::<f32>() - 0.5) * s,
            );
            self.shake *= self.clock.factor(CAMERA_SHAKE_DECAY, dt_sec);
            if self.shake < CAMERA_SHAKE_FLOOR {
                self.shake = 0.0;
            }
        }

        let zoom_target = self.base_zoom - CAMERA_ZOOM_BEAT_PULL * beat;
        let k = (dt_sec * CAMERA_ZOOM_RATE).clamp(0.0, 1.0);
        self.zoom += (zoom_target - self.zoom) * k;
        if let Some(dir) = self.position.try_normalize() {
            self.position = dir * self.zoom;
        }

        if beat > CAMERA_WHIP_BEAT && rng.gen::<f32>() > CAMERA_WHIP_CHANCE {
            let angle = (rng.gen::<f32>() * 2.0 - 1.0) * std::f32::consts::FRAC_PI_4;
            self.position = Quat::from_rotation_y(angle) * self.position;
        }

        CameraPose {
            eye: self.position,
            look_at: look_at_point(elapsed_sec),
        }
    }
}

#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let inv = 1.0 - t.clamp(0.0, 1.0);
    1.0 - inv * inv * inv
}

/// Slow Lissajous drift around the origin.
#[inline]
pub fn look_at_point(elapsed_sec: f32) -> Vec3 {
    Vec3::new(
        0.3 * (0.5 * elapsed_sec).sin(),
        0.2 * (0.3 * elapsed_sec).cos(),
        0.2 * (0.7 * elapsed_sec).sin(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn ease_out_cubic_endpoints_and_shape() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-6);
        assert_eq!(ease_out_cubic(2.0), 1.0);
    }

    #[test]
    fn quiet_beat_never_cuts_or_shakes() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut rig = CameraRig::new(CAMERA_BASE_ZOOM, DecayClock::PerFrame);
        let start = rig.target_index;
        for i in 0..600 {
            rig.advance(i as f32 / 60.0, 1.0 / 60.0, 0.5, &mut rng);
        }
        assert_eq!(rig.target_index, start);
        assert_eq!(rig.shake, 0.0);
    }

    #[test]
    fn cut_starts_transition_with_shake() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut rig = CameraRig::new(CAMERA_BASE_ZOOM, DecayClock::PerFrame);
        let start = rig.target_index;
        // A full beat passes the cut gate ~30% of frames.
        let mut cut = false;
        for i in 0..200 {
            rig.advance(i as f32 / 60.0, 1.0 / 60.0, 1.0, &mut rng);
            if rig.target_index != start {
                cut = true;
                break;
            }
        }
        assert!(cut);
        assert!(rig.shake > 0.0 && rig.shake <= CAMERA_SHAKE_MAX);
        assert!(rig.transition_elapsed <= rig.transition_duration);
    }

    #[test]
    fn settled_rig_rests_where_the_next_glide_starts() {
        let rig = CameraRig::new(CAMERA_BASE_ZOOM, DecayClock::PerFrame);
        assert_eq!(rig.position, rig.targets[rig.next_index()]);
        assert_eq!(rig.position, CAMERA_TARGETS[0]);
    }

    #[test]
    fn first_cut_glides_from_current_viewpoint() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut rig = CameraRig::new(CAMERA_BASE_ZOOM, DecayClock::PerFrame);
        let start = rig.target_index;
        // Above the cut gate, below the whip gate: only cuts can move the eye
        // sideways.
        let beat = 0.85;
        let dt = 1.0 / 60.0;
        let mut before = rig.position;
        for i in 0..300 {
            let pose = rig.advance(i as f32 * dt, dt, beat, &mut rng);
            if rig.target_index != start {
                assert_eq!(rig.target_index, 0);
                // Glide progress is tiny after one frame; the rest is shake
                // and the zoom pull.
                let jump = pose.eye - before;
                assert!(jump.length() < 1.0, "first cut jumped by {jump}");
                return;
            }
            before = pose.eye;
        }
        panic!("no cut within 300 frames");
    }

    #[test]
    fn transition_elapsed_is_clamped() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut rig = CameraRig::new(CAMERA_BASE_ZOOM, DecayClock::PerFrame);
        rig.transition_elapsed = 0.0;
        rig.advance(0.0, 10.0, 0.0, &mut rng);
        assert_eq!(rig.transition_elapsed, rig.transition_duration);
    }

    #[test]
    fn eye_distance_follows_zoom() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut rig = CameraRig::new(CAMERA_BASE_ZOOM, DecayClock::PerFrame);
        let pose = rig.advance(0.0, 0.1, 0.0, &mut rng);
        assert!((pose.eye.length() - rig.zoom).abs() < 1e-4);
    }

    #[test]
    fn viewport_updates_aspect() {
        let mut cam = Camera::default();
        cam.set_viewport(800, 400);
        assert_eq!(cam.aspect, 2.0);
        cam.set_viewport(0, 400);
        assert_eq!(cam.aspect, 2.0);
    }
}
