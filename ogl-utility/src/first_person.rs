//! “FPS-style” camera: yaw and pitch from cursor moves, strafing from keys.

use cgmath::{
  Deg, InnerSpace as _, Matrix4, Quaternion, Rad, Rotation as _, Rotation3 as _, Vector3,
};

/// Direction to strafe to, relative to where the camera looks.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Strafe {
  /// Move along the line of sight.
  Forward,
  /// Move away along the line of sight.
  Backward,
  /// Move to the left.
  Left,
  /// Move to the right.
  Right,
  /// Move up.
  Up,
  /// Move down.
  Down,
}

/// Sensitivities of the first-person camera.
///
/// If you increase the values, you get a faster movement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FirstPersonSettings {
  /// Radians of yaw per pixel of horizontal cursor move.
  pub yaw_sensitivity: f32,
  /// Radians of pitch per pixel of vertical cursor move.
  pub pitch_sensitivity: f32,
  /// World units per strafe step.
  pub strafe_step: f32,
  /// Radians of field of view per scroll step.
  pub fovy_step: f32,
}

impl Default for FirstPersonSettings {
  fn default() -> Self {
    FirstPersonSettings {
      yaw_sensitivity: 0.001,
      pitch_sensitivity: 0.001,
      strafe_step: 0.1,
      fovy_step: 0.1,
    }
  }
}

/// First-person camera.
#[derive(Clone, Debug, PartialEq)]
pub struct FirstPersonCamera {
  /// Tuning.
  pub settings: FirstPersonSettings,
  eye: Vector3<f32>,
  yaw: f32,
  pitch: f32,
  fovy: f32,
}

impl FirstPersonCamera {
  /// Camera at `eye`, looking down the -z axis.
  pub fn new(eye: Vector3<f32>, fovy: Rad<f32>) -> Self {
    FirstPersonCamera {
      settings: FirstPersonSettings::default(),
      eye,
      yaw: 0.,
      pitch: 0.,
      fovy: clamp_fovy(fovy.0),
    }
  }

  /// Position of the camera.
  pub fn eye(&self) -> Vector3<f32> {
    self.eye
  }

  /// Vertical field of view.
  pub fn fovy(&self) -> Rad<f32> {
    Rad(self.fovy)
  }

  /// Pitch angle, in `[-π/2, π/2]`.
  pub fn pitch(&self) -> Rad<f32> {
    Rad(self.pitch)
  }

  /// Yaw angle.
  pub fn yaw(&self) -> Rad<f32> {
    Rad(self.yaw)
  }

  /// Orientation of the camera (world to view rotation).
  pub fn orientation(&self) -> Quaternion<f32> {
    let qy = Quaternion::from_angle_y(Rad(self.yaw));
    let qx = Quaternion::from_angle_x(Rad(self.pitch));
    (qx * qy).normalize()
  }

  /// World to view transform.
  pub fn view_matrix(&self) -> Matrix4<f32> {
    Matrix4::from(self.orientation()) * Matrix4::from_translation(-self.eye)
  }

  /// Turn by a cursor move, in pixels.
  pub fn look(&mut self, dx: f32, dy: f32) {
    self.yaw += self.settings.yaw_sensitivity * dx;
    self.pitch = clamp_pitch(self.pitch + self.settings.pitch_sensitivity * dy);
  }

  /// Move one step in a direction relative to the current orientation.
  pub fn strafe(&mut self, direction: Strafe) {
    let step = self.settings.strafe_step;
    let v = match direction {
      Strafe::Forward => Vector3::new(0., 0., step),
      Strafe::Backward => Vector3::new(0., 0., -step),
      Strafe::Left => Vector3::new(step, 0., 0.),
      Strafe::Right => Vector3::new(-step, 0., 0.),
      Strafe::Up => Vector3::new(0., step, 0.),
      Strafe::Down => Vector3::new(0., -step, 0.),
    };

    self.eye -= self.orientation().invert().rotate_vector(v);
  }

  /// Widen or narrow the field of view by scroll steps.
  pub fn zoom(&mut self, steps: f32) {
    self.fovy = clamp_fovy(self.fovy + steps * self.settings.fovy_step);

    let Deg(deg) = Rad(self.fovy).into();
    log::info!("new fovy is {}°", deg);
  }
}

// Prevents flipping the projection.
fn clamp_fovy(fovy: f32) -> f32 {
  fovy.min(std::f32::consts::PI - 0.0001).max(0.0001)
}

// Stops the camera at full verticals.
fn clamp_pitch(theta: f32) -> f32 {
  theta
    .max(-std::f32::consts::FRAC_PI_2)
    .min(std::f32::consts::FRAC_PI_2)
}

#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_relative_eq;
  use cgmath::Vector4;
  use std::f32::consts::{FRAC_PI_2, PI};

  #[test]
  fn forward_moves_down_the_line_of_sight() {
    let mut cam = FirstPersonCamera::new(Vector3::new(0., 0., 3.), Rad(FRAC_PI_2));
    cam.strafe(Strafe::Forward);

    assert_relative_eq!(cam.eye().z, 2.9, epsilon = 1e-6);
    assert_relative_eq!(cam.eye().x, 0.);
  }

  #[test]
  fn strafing_follows_yaw() {
    let mut cam = FirstPersonCamera::new(Vector3::new(0., 0., 0.), Rad(FRAC_PI_2));
    // a quarter turn
    cam.look(FRAC_PI_2 / cam.settings.yaw_sensitivity, 0.);
    cam.strafe(Strafe::Forward);

    assert_relative_eq!(cam.eye().x, 0.1, epsilon = 1e-5);
    assert_relative_eq!(cam.eye().z, 0., epsilon = 1e-5);
  }

  #[test]
  fn pitch_stops_at_verticals() {
    let mut cam = FirstPersonCamera::new(Vector3::new(0., 0., 0.), Rad(FRAC_PI_2));
    cam.look(0., 1e6);
    assert_relative_eq!(cam.pitch().0, FRAC_PI_2);

    cam.look(0., -1e7);
    assert_relative_eq!(cam.pitch().0, -FRAC_PI_2);
  }

  #[test]
  fn fovy_stays_in_open_range() {
    let mut cam = FirstPersonCamera::new(Vector3::new(0., 0., 0.), Rad(FRAC_PI_2));
    cam.zoom(1000.);
    assert!(cam.fovy().0 < PI && cam.fovy().0 > 3.);

    cam.zoom(-1000.);
    assert!(cam.fovy().0 > 0. && cam.fovy().0 < 0.01);
  }

  #[test]
  fn view_matrix_moves_eye_to_origin() {
    let mut cam = FirstPersonCamera::new(Vector3::new(1., 2., 3.), Rad(FRAC_PI_2));
    cam.look(300., -200.);
    let eye = cam.eye();
    let p = cam.view_matrix() * Vector4::new(eye.x, eye.y, eye.z, 1.);

    assert_relative_eq!(p.x, 0., epsilon = 1e-5);
    assert_relative_eq!(p.y, 0., epsilon = 1e-5);
    assert_relative_eq!(p.z, 0., epsilon = 1e-5);
  }
}
