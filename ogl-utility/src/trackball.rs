//! Model rotation by dragging, with optional auto-spin.
//!
//! The drag vector is turned into a rotation whose axis is perpendicular to the drag on screen.
//! While dragging, that rotation is applied on top of the accumulated model rotation; on release
//! it is folded into it. With auto-spin enabled, the model keeps turning after the release at the
//! angular speed of the last drag.

use std::f32::consts::PI;

use cgmath::{InnerSpace as _, Matrix3, Matrix4, Point2, Rad, SquareMatrix as _, Vector2, Vector3};

#[derive(Clone, Copy, Debug, PartialEq)]
struct Drag {
  start: Point2<f32>,
  start_time: f32,
  axis: Vector3<f32>,
  angle: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Spin {
  axis: Vector3<f32>,
  // radians per second
  speed: f32,
  start_time: f32,
}

/// Drag rotation of a model.
#[derive(Clone, Debug, PartialEq)]
pub struct DragRotation {
  model: Matrix4<f32>,
  drag: Option<Drag>,
  spin: Option<Spin>,
  auto_spin: bool,
}

impl Default for DragRotation {
  fn default() -> Self {
    DragRotation::new(Matrix4::identity())
  }
}

impl DragRotation {
  /// Start from an initial model rotation.
  pub fn new(model: Matrix4<f32>) -> Self {
    DragRotation {
      model,
      drag: None,
      spin: None,
      auto_spin: false,
    }
  }

  /// Keep spinning after a release.
  pub fn set_auto_spin(&mut self, auto_spin: bool) {
    self.auto_spin = auto_spin;
    if !auto_spin {
      self.spin = None;
    }
  }

  /// Whether auto-spin is enabled.
  pub fn auto_spin(&self) -> bool {
    self.auto_spin
  }

  /// Whether a drag is in progress.
  pub fn is_dragging(&self) -> bool {
    self.drag.is_some()
  }

  /// Whether the model is spinning on its own.
  pub fn is_spinning(&self) -> bool {
    self.spin.is_some()
  }

  /// Start dragging at `cursor` (window coordinates, origin bottom-left).
  ///
  /// A running spin stops where it is.
  pub fn press(&mut self, cursor: Point2<f32>, time: f32) {
    self.freeze_spin(time);
    self.drag = Some(Drag {
      start: cursor,
      start_time: time,
      axis: Vector3::unit_z(),
      angle: 0.,
    });
  }

  /// Update the drag rotation.
  ///
  /// `view` orients the rotation axis: the axis is perpendicular to the drag on screen, brought
  /// back to world space by the inverse view rotation.
  pub fn drag_to(&mut self, cursor: Point2<f32>, view: &Matrix4<f32>, viewport_height: f32) {
    let drag = match self.drag.as_mut() {
      Some(drag) => drag,
      None => return,
    };

    let delta = Vector2::new(cursor.x - drag.start.x, cursor.y - drag.start.y);
    let length = delta.magnitude();
    if length == 0. || viewport_height <= 0. {
      drag.angle = 0.;
      return;
    }

    let rotation = Matrix3::from_cols(view.x.truncate(), view.y.truncate(), view.z.truncate());
    let inv_rotation = rotation.invert().unwrap_or_else(Matrix3::identity);
    let axis = inv_rotation * Vector3::new(-delta.y, delta.x, 0.);

    if axis.magnitude2() > 0. {
      drag.axis = axis.normalize();
      drag.angle = length / viewport_height / 2. * PI;
    }
  }

  /// End the drag, folding its rotation into the model rotation.
  pub fn release(&mut self, time: f32) {
    let drag = match self.drag.take() {
      Some(drag) => drag,
      None => return,
    };

    self.model = rotation(drag.axis, drag.angle) * self.model;

    let duration = time - drag.start_time;
    if self.auto_spin && drag.angle > 0. && duration > 0. {
      let speed = drag.angle / duration;
      log::debug!("auto-spin at {} rad/s", speed);
      self.spin = Some(Spin {
        axis: drag.axis,
        speed,
        start_time: time,
      });
    }
  }

  /// Current model rotation.
  pub fn model_matrix(&self, time: f32) -> Matrix4<f32> {
    let mut model = self.model;

    if let Some(spin) = self.spin {
      model = rotation(spin.axis, spin.speed * (time - spin.start_time)) * model;
    }

    if let Some(drag) = self.drag {
      model = rotation(drag.axis, drag.angle) * model;
    }

    model
  }

  /// Reset to the identity rotation.
  pub fn reset(&mut self) {
    *self = DragRotation {
      auto_spin: self.auto_spin,
      ..DragRotation::default()
    };
  }

  fn freeze_spin(&mut self, time: f32) {
    if let Some(spin) = self.spin.take() {
      self.model = rotation(spin.axis, spin.speed * (time - spin.start_time)) * self.model;
    }
  }
}

fn rotation(axis: Vector3<f32>, angle: f32) -> Matrix4<f32> {
  Matrix4::from_axis_angle(axis, Rad(angle))
}

#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_relative_eq;
  use cgmath::Vector4;

  fn apply(m: Matrix4<f32>, v: Vector3<f32>) -> Vector3<f32> {
    (m * Vector4::new(v.x, v.y, v.z, 0.)).truncate()
  }

  #[test]
  fn horizontal_drag_turns_about_up_axis() {
    let mut rot = DragRotation::default();
    let view = Matrix4::identity();

    rot.press(Point2::new(100., 100.), 0.);
    // a drag of the viewport height is a quarter turn
    rot.drag_to(Point2::new(700., 100.), &view, 600.);
    let x = apply(rot.model_matrix(0.), Vector3::unit_x());

    assert_relative_eq!(x.x, 0., epsilon = 1e-5);
    assert_relative_eq!(x.z, -1., epsilon = 1e-5);
  }

  #[test]
  fn release_folds_drag() {
    let mut rot = DragRotation::default();
    let view = Matrix4::identity();

    rot.press(Point2::new(0., 0.), 0.);
    rot.drag_to(Point2::new(0., 300.), &view, 600.);
    let dragged = rot.model_matrix(0.);
    rot.release(1.);

    assert!(!rot.is_dragging());
    assert!(!rot.is_spinning());
    assert_eq!(rot.model_matrix(5.), dragged);
  }

  #[test]
  fn axis_follows_view_orientation() {
    let mut rot = DragRotation::default();
    // camera rolled by a quarter turn about its line of sight
    let view = Matrix4::from_angle_z(Rad(PI * 0.5));

    rot.press(Point2::new(0., 0.), 0.);
    rot.drag_to(Point2::new(10., 0.), &view, 600.);
    let axis = rot.drag.unwrap().axis;

    assert_relative_eq!(axis.x, 1., epsilon = 1e-5);
    assert_relative_eq!(axis.y, 0., epsilon = 1e-5);
  }

  #[test]
  fn auto_spin_keeps_turning() {
    let mut rot = DragRotation::default();
    rot.set_auto_spin(true);
    let view = Matrix4::identity();

    rot.press(Point2::new(0., 0.), 0.);
    rot.drag_to(Point2::new(300., 0.), &view, 600.);
    rot.release(0.5);
    assert!(rot.is_spinning());

    // π/4 in half a second, so one more second adds π/2
    let x = apply(rot.model_matrix(1.5), Vector3::unit_x());
    let expected = apply(rotation(Vector3::unit_y(), PI * 0.75), Vector3::unit_x());
    assert_relative_eq!(x.x, expected.x, epsilon = 1e-4);
    assert_relative_eq!(x.z, expected.z, epsilon = 1e-4);

    rot.press(Point2::new(0., 0.), 1.5);
    assert!(!rot.is_spinning());
    let frozen = apply(rot.model_matrix(10.), Vector3::unit_x());
    assert_relative_eq!(frozen.x, expected.x, epsilon = 1e-4);
  }
}
