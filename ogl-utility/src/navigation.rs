//! Mouse navigation: pan, orbit and zoom.
//!
//! The controller tracks the drag in progress and turns cursor moves into a new view matrix.
//! It never owns the camera: every operation receives the current [`Camera`] and returns the
//! view matrix the host should store back. Depth values are window-space depths as read from
//! the depth buffer (see [`Camera::depth_or_fallback`] for the background case).
//!
//! Cursor positions are in window coordinates with the origin at the bottom-left corner; flip
//! the ordinate reported by the windowing system with
//! [`Viewport::flip_y`](crate::Viewport::flip_y).

use std::f32::consts::PI;

use cgmath::{
  InnerSpace as _, Matrix4, Point2, Point3, Rad, SquareMatrix as _, Vector2, Vector3,
};

use crate::camera::Camera;

/// What a rotation drag does.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum OrbitMode {
  /// No rotation drag.
  Off,
  /// Free rotation about an axis perpendicular to the drag, through the pivot.
  Orbit,
  /// Turntable rotation: vertical drags tilt about the view x axis, horizontal drags spin about
  /// the world up axis.
  Rotate,
}

/// Tuning of the navigation controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NavigationSettings {
  /// World units travelled per scroll step.
  pub zoom_step: f32,
  /// Smallest drag component, in pixels, that turns the turntable.
  pub rotate_threshold: f32,
}

impl Default for NavigationSettings {
  fn default() -> Self {
    NavigationSettings {
      zoom_step: 1.,
      rotate_threshold: 0.5,
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct OrbitDrag {
  mode: OrbitMode,
  last: Vector3<f32>,
  pivot: Point3<f32>,
}

/// Pan / orbit / zoom controller.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NavigationController {
  settings: NavigationSettings,
  pan: Option<Vector3<f32>>,
  orbit: Option<OrbitDrag>,
}

impl NavigationController {
  /// Controller with the given settings.
  pub fn new(settings: NavigationSettings) -> Self {
    NavigationController {
      settings,
      pan: None,
      orbit: None,
    }
  }

  /// Current settings.
  pub fn settings(&self) -> &NavigationSettings {
    &self.settings
  }

  /// Whether a pan drag is in progress.
  pub fn is_panning(&self) -> bool {
    self.pan.is_some()
  }

  /// Mode of the rotation drag in progress.
  pub fn orbit_mode(&self) -> OrbitMode {
    self.orbit.map_or(OrbitMode::Off, |orbit| orbit.mode)
  }

  /// Start panning: the point under the cursor, at `depth`, sticks to the cursor.
  pub fn start_pan(&mut self, cursor: Point2<f32>, depth: f32) {
    log::debug!("start pan at {:?}, depth {}", cursor, depth);
    self.pan = Some(Vector3::new(cursor.x, cursor.y, depth));
  }

  /// Stop panning.
  pub fn end_pan(&mut self) {
    self.pan = None;
  }

  /// Start a rotation drag around `pivot` (world space).
  ///
  /// Asking for [`OrbitMode::Off`] starts a plain orbit.
  pub fn start_orbit(
    &mut self,
    cursor: Point2<f32>,
    depth: f32,
    pivot: Point3<f32>,
    mode: OrbitMode,
  ) {
    let mode = match mode {
      OrbitMode::Off => OrbitMode::Orbit,
      mode => mode,
    };

    log::debug!("start {:?} around {:?}", mode, pivot);
    self.orbit = Some(OrbitDrag {
      mode,
      last: Vector3::new(cursor.x, cursor.y, depth),
      pivot,
    });
  }

  /// Stop the rotation drag.
  pub fn end_orbit(&mut self) {
    self.orbit = None;
  }

  /// Follow the cursor with the drag in progress.
  ///
  /// Returns the new view matrix, or `None` when nothing is being dragged or the cursor did not
  /// move. Panning takes precedence over orbiting.
  pub fn move_cursor_to(&mut self, camera: &Camera, cursor: Point2<f32>) -> Option<Matrix4<f32>> {
    if let Some(from) = self.pan {
      let to = Vector3::new(cursor.x, cursor.y, from.z);
      if to == from {
        return None;
      }

      self.pan = Some(to);
      return Some(pan(camera, from, to));
    }

    let orbit = self.orbit.as_mut()?;
    let drag = Vector2::new(cursor.x - orbit.last.x, cursor.y - orbit.last.y);
    if drag.x == 0. && drag.y == 0. {
      return None;
    }

    orbit.last.x = cursor.x;
    orbit.last.y = cursor.y;

    let view = match orbit.mode {
      OrbitMode::Rotate => turntable(camera, orbit.pivot, drag, self.settings.rotate_threshold),
      OrbitMode::Orbit | OrbitMode::Off => free_orbit(camera, orbit.pivot, drag),
    };

    Some(view)
  }

  /// Move the camera by `delta` world units along the ray from the eye through the cursor.
  ///
  /// Positive values move toward the scene.
  pub fn move_on_line_of_sight(
    &self,
    camera: &Camera,
    cursor: Point2<f32>,
    delta: f32,
  ) -> Matrix4<f32> {
    let far = camera.unproject(Vector3::new(cursor.x, cursor.y, 1.));
    let ray = far - camera.eye();

    if ray.magnitude2() == 0. {
      return camera.view;
    }

    let inv_view = Matrix4::from_translation(ray.normalize() * delta) * camera.inverse_view();
    inv_view.invert().unwrap_or(camera.view)
  }

  /// Zoom by a number of scroll steps.
  pub fn scroll(&self, camera: &Camera, cursor: Point2<f32>, steps: f32) -> Matrix4<f32> {
    self.move_on_line_of_sight(camera, cursor, steps * self.settings.zoom_step)
  }
}

// Translate the camera so that the world point under `from` ends up under `to`.
fn pan(camera: &Camera, from: Vector3<f32>, to: Vector3<f32>) -> Matrix4<f32> {
  let delta = camera.unproject(to) - camera.unproject(from);
  let inv_view = Matrix4::from_translation(-delta) * camera.inverse_view();

  inv_view.invert().unwrap_or(camera.view)
}

fn free_orbit(camera: &Camera, pivot: Point3<f32>, drag: Vector2<f32>) -> Matrix4<f32> {
  let vp = camera.viewport;
  let pivot_view = (camera.view * pivot.to_homogeneous()).truncate();

  let axis = Vector3::new(-drag.y, drag.x, 0.).normalize();
  let angle = Vector2::new(drag.x / vp.width, drag.y / vp.height).magnitude() * PI;

  around(pivot_view, axis, angle) * camera.view
}

fn turntable(
  camera: &Camera,
  pivot: Point3<f32>,
  drag: Vector2<f32>,
  threshold: f32,
) -> Matrix4<f32> {
  let vp = camera.viewport;
  let pivot_view = (camera.view * pivot.to_homogeneous()).truncate();
  let pivot_world = Vector3::new(pivot.x, pivot.y, pivot.z);

  let tilt = if drag.y.abs() > threshold {
    around(pivot_view, -Vector3::unit_x(), drag.y / vp.height * PI)
  } else {
    Matrix4::identity()
  };

  let spin = if drag.x.abs() > threshold {
    around(pivot_world, Vector3::unit_z(), drag.x / vp.width * PI)
  } else {
    Matrix4::identity()
  };

  tilt * camera.view * spin
}

// Rotation about `axis` going through `center`.
fn around(center: Vector3<f32>, axis: Vector3<f32>, angle: f32) -> Matrix4<f32> {
  Matrix4::from_translation(center)
    * Matrix4::from_axis_angle(axis, Rad(angle))
    * Matrix4::from_translation(-center)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{camera::Projection, viewport::Viewport};
  use approx::assert_relative_eq;
  use cgmath::{Deg, EuclideanSpace, InnerSpace, MetricSpace as _};

  fn camera() -> Camera {
    Camera::look_at(
      Point3::new(0., -6., 0.),
      Point3::origin(),
      Vector3::unit_z(),
      Projection::Perspective {
        fovy: Deg(60.).into(),
        near: 0.1,
        far: 100.,
      },
      Viewport::new(800, 600),
    )
  }

  fn with_view(camera: &Camera, view: Matrix4<f32>) -> Camera {
    Camera { view, ..*camera }
  }

  fn view_space(camera: &Camera, p: Point3<f32>) -> Vector3<f32> {
    (camera.view * p.to_homogeneous()).truncate()
  }

  #[test]
  fn idle_controller_does_nothing() {
    let mut nav = NavigationController::default();
    assert_eq!(nav.orbit_mode(), OrbitMode::Off);
    assert!(nav.move_cursor_to(&camera(), Point2::new(10., 10.)).is_none());
  }

  #[test]
  fn pan_keeps_grabbed_point_under_cursor() {
    let cam = camera();
    let grabbed = Point3::new(0.5, 0., 0.25);
    let start = cam.project(grabbed);

    let mut nav = NavigationController::default();
    nav.start_pan(Point2::new(start.x, start.y), start.z);
    assert!(nav.is_panning());

    let target = Point2::new(start.x + 120., start.y - 45.);
    let view = nav.move_cursor_to(&cam, target).unwrap();
    let moved = with_view(&cam, view).project(grabbed);

    assert_relative_eq!(moved.x, target.x, epsilon = 1e-2);
    assert_relative_eq!(moved.y, target.y, epsilon = 1e-2);
    assert_relative_eq!(moved.z, start.z, epsilon = 1e-4);

    nav.end_pan();
    assert!(nav.move_cursor_to(&cam, Point2::new(0., 0.)).is_none());
  }

  #[test]
  fn pan_without_movement_is_ignored() {
    let cam = camera();
    let mut nav = NavigationController::default();
    nav.start_pan(Point2::new(400., 300.), 0.9);

    assert!(nav.move_cursor_to(&cam, Point2::new(400., 300.)).is_none());
  }

  #[test]
  fn off_mode_starts_an_orbit() {
    let mut nav = NavigationController::default();
    nav.start_orbit(Point2::new(0., 0.), 0.5, Point3::origin(), OrbitMode::Off);
    assert_eq!(nav.orbit_mode(), OrbitMode::Orbit);

    nav.end_orbit();
    assert_eq!(nav.orbit_mode(), OrbitMode::Off);
  }

  #[test]
  fn orbit_keeps_pivot_and_distance() {
    let cam = camera();
    let pivot = Point3::new(0.3, 0.2, -0.1);

    let mut nav = NavigationController::default();
    nav.start_orbit(Point2::new(400., 300.), 0.5, pivot, OrbitMode::Orbit);
    let view = nav.move_cursor_to(&cam, Point2::new(480., 340.)).unwrap();
    let orbited = with_view(&cam, view);

    let before = view_space(&cam, pivot);
    let after = view_space(&orbited, pivot);
    assert_relative_eq!(after.x, before.x, epsilon = 1e-4);
    assert_relative_eq!(after.y, before.y, epsilon = 1e-4);
    assert_relative_eq!(after.z, before.z, epsilon = 1e-4);

    assert_relative_eq!(
      orbited.eye().distance(pivot),
      cam.eye().distance(pivot),
      epsilon = 1e-4
    );
    assert!(orbited.eye().distance(cam.eye()) > 1e-2);
  }

  #[test]
  fn orbit_angle_follows_drag_length() {
    let cam = camera();
    let mut nav = NavigationController::default();
    nav.start_orbit(Point2::new(400., 300.), 0.5, Point3::origin(), OrbitMode::Orbit);

    // half the viewport width is a quarter turn
    let view = nav.move_cursor_to(&cam, Point2::new(800., 300.)).unwrap();
    let eye = with_view(&cam, view).eye();
    let angle = Vector3::new(0., -1., 0.).angle(eye.to_vec().normalize());

    assert_relative_eq!(angle.0, PI * 0.5, epsilon = 1e-4);
  }

  #[test]
  fn turntable_keeps_pivot_in_view() {
    let cam = camera();
    let pivot = Point3::new(0.2, 0.4, 0.1);

    let mut nav = NavigationController::default();
    nav.start_orbit(Point2::new(400., 300.), 0.5, pivot, OrbitMode::Rotate);
    assert_eq!(nav.orbit_mode(), OrbitMode::Rotate);

    let view = nav.move_cursor_to(&cam, Point2::new(460., 250.)).unwrap();
    let before = view_space(&cam, pivot);
    let after = view_space(&with_view(&cam, view), pivot);

    assert_relative_eq!(after.x, before.x, epsilon = 1e-4);
    assert_relative_eq!(after.y, before.y, epsilon = 1e-4);
    assert_relative_eq!(after.z, before.z, epsilon = 1e-4);
  }

  #[test]
  fn turntable_horizontal_drag_keeps_height() {
    let cam = camera();
    let mut nav = NavigationController::default();
    nav.start_orbit(Point2::new(400., 300.), 0.5, Point3::origin(), OrbitMode::Rotate);

    let view = nav.move_cursor_to(&cam, Point2::new(520., 300.)).unwrap();
    let eye = with_view(&cam, view).eye();

    assert_relative_eq!(eye.z, 0., epsilon = 1e-4);
    assert_relative_eq!(eye.distance(Point3::origin()), 6., epsilon = 1e-4);
  }

  #[test]
  fn turntable_ignores_sub_pixel_components() {
    let cam = camera();
    let mut nav = NavigationController::default();
    nav.start_orbit(Point2::new(400., 300.), 0.5, Point3::origin(), OrbitMode::Rotate);

    // the horizontal part is below the threshold: tilt only
    let view = nav.move_cursor_to(&cam, Point2::new(400.3, 340.)).unwrap();
    let eye = with_view(&cam, view).eye();
    assert_relative_eq!(eye.x, 0., epsilon = 1e-4);
    assert!(eye.z.abs() > 1.);
    assert_relative_eq!(eye.distance(Point3::origin()), 6., epsilon = 1e-4);

    // both parts are below the threshold
    let view = nav.move_cursor_to(&cam, Point2::new(400.6, 340.2)).unwrap();
    assert_eq!(view, cam.view);
  }

  #[test]
  fn pan_takes_precedence_over_orbit() {
    let cam = camera();
    let mut nav = NavigationController::default();
    nav.start_orbit(Point2::new(400., 300.), 0.5, Point3::origin(), OrbitMode::Orbit);
    nav.start_pan(Point2::new(400., 300.), 0.5);

    let view = nav.move_cursor_to(&cam, Point2::new(420., 300.)).unwrap();
    let panned = with_view(&cam, view);

    // same orientation, shifted eye
    for c in 0..3 {
      for r in 0..3 {
        assert_relative_eq!(view[c][r], cam.view[c][r], epsilon = 1e-5);
      }
    }
    assert!(panned.eye().x < -1e-3);
    assert_relative_eq!(panned.eye().y, -6., epsilon = 1e-4);
    assert_relative_eq!(panned.eye().z, 0., epsilon = 1e-4);
  }

  #[test]
  fn zoom_moves_along_line_of_sight() {
    let cam = camera();
    let nav = NavigationController::default();

    let view = nav.move_on_line_of_sight(&cam, Point2::new(400., 300.), 2.);
    let eye = with_view(&cam, view).eye();
    assert_relative_eq!(eye.y, -4., epsilon = 1e-4);
    assert_relative_eq!(eye.x, 0., epsilon = 1e-4);

    let view = nav.scroll(&cam, Point2::new(400., 300.), -1.);
    let eye = with_view(&cam, view).eye();
    assert_relative_eq!(eye.y, -7., epsilon = 1e-4);
  }
}
