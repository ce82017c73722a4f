//! Camera: view matrix, projection and viewport.
//!
//! The camera knows everything needed to go back and forth between world space and window
//! space, which is what the navigation controllers build upon.

use cgmath::{
  ortho, perspective, EuclideanSpace as _, Matrix4, Point3, Rad, SquareMatrix as _, Vector3,
  Vector4,
};

use crate::viewport::Viewport;

/// Projection of a camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Projection {
  /// Perspective projection.
  Perspective {
    /// Vertical field of view.
    fovy: Rad<f32>,
    /// Near plane distance.
    near: f32,
    /// Far plane distance.
    far: f32,
  },
  /// Orthographic projection.
  Orthographic {
    /// Visible height of the view volume; its width follows the aspect ratio.
    height: f32,
    /// Near plane distance.
    near: f32,
    /// Far plane distance.
    far: f32,
  },
}

impl Projection {
  /// Projection matrix for a given aspect ratio.
  pub fn matrix(&self, aspect: f32) -> Matrix4<f32> {
    match *self {
      Projection::Perspective { fovy, near, far } => perspective(fovy, aspect, near, far),
      Projection::Orthographic { height, near, far } => {
        let half_h = height * 0.5;
        let half_w = half_h * aspect;
        ortho(-half_w, half_w, -half_h, half_h, near, far)
      }
    }
  }

  /// Near and far plane distances.
  pub fn depth_range(&self) -> (f32, f32) {
    match *self {
      Projection::Perspective { near, far, .. } | Projection::Orthographic { near, far, .. } => {
        (near, far)
      }
    }
  }
}

impl Default for Projection {
  fn default() -> Self {
    Projection::Perspective {
      fovy: Rad(std::f32::consts::FRAC_PI_2 * 0.5),
      near: 0.1,
      far: 100.,
    }
  }
}

/// A camera looking at the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
  /// World to view transform.
  pub view: Matrix4<f32>,
  /// Projection; its aspect ratio comes from the viewport.
  pub projection: Projection,
  /// Viewport the camera renders to.
  pub viewport: Viewport,
}

impl Camera {
  /// Create a camera from its raw parts.
  pub fn new(view: Matrix4<f32>, projection: Projection, viewport: Viewport) -> Self {
    Camera {
      view,
      projection,
      viewport,
    }
  }

  /// Camera placed at `eye`, looking at `target`.
  pub fn look_at(
    eye: Point3<f32>,
    target: Point3<f32>,
    up: Vector3<f32>,
    projection: Projection,
    viewport: Viewport,
  ) -> Self {
    Camera::new(Matrix4::look_at_rh(eye, target, up), projection, viewport)
  }

  /// Change the viewport, which also changes the projection aspect ratio.
  pub fn set_viewport(&mut self, viewport: Viewport) {
    self.viewport = viewport;
  }

  /// Projection matrix for the current viewport.
  pub fn projection_matrix(&self) -> Matrix4<f32> {
    self.projection.matrix(self.viewport.aspect())
  }

  /// Projection × view.
  pub fn view_projection(&self) -> Matrix4<f32> {
    self.projection_matrix() * self.view
  }

  /// View to world transform.
  ///
  /// A singular view matrix (which a rigid camera never has) yields the identity.
  pub fn inverse_view(&self) -> Matrix4<f32> {
    self.view.invert().unwrap_or_else(Matrix4::identity)
  }

  /// Position of the camera in world space.
  pub fn eye(&self) -> Point3<f32> {
    Point3::from_vec(self.inverse_view().w.truncate())
  }

  /// Map a window position (x, y in pixels, z the depth buffer value) to world space.
  pub fn unproject(&self, window: Vector3<f32>) -> Point3<f32> {
    let inv_proj = self
      .projection_matrix()
      .invert()
      .unwrap_or_else(Matrix4::identity);
    let inv = self.inverse_view() * inv_proj * self.viewport.inverse_window_matrix();

    from_homogeneous(inv * window.extend(1.))
  }

  /// Map a world position to window space (x, y in pixels, z the depth buffer value).
  pub fn project(&self, world: Point3<f32>) -> Vector3<f32> {
    let clip = self.view_projection() * world.to_homogeneous();
    let ndc = from_homogeneous(clip);

    (self.viewport.window_matrix() * ndc.to_homogeneous()).truncate()
  }

  /// Depth to navigate with when the cursor hovers the background.
  ///
  /// A sampled depth of 1 means nothing was drawn under the cursor. In that case the depth of
  /// `fallback` projected by this camera is used, if it lies between the clip planes.
  pub fn depth_or_fallback(&self, depth: f32, fallback: Point3<f32>) -> f32 {
    if depth < 1. {
      return depth;
    }

    let clip = self.view_projection() * fallback.to_homogeneous();
    if clip.w == 0. {
      return depth;
    }

    let ndc_z = clip.z / clip.w;
    if ndc_z > -1. && ndc_z < 1. {
      ndc_z * 0.5 + 0.5
    } else {
      depth
    }
  }
}

fn from_homogeneous(v: Vector4<f32>) -> Point3<f32> {
  if v.w != 0. {
    Point3::new(v.x / v.w, v.y / v.w, v.z / v.w)
  } else {
    Point3::new(v.x, v.y, v.z)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_relative_eq;
  use cgmath::{Deg, EuclideanSpace, InnerSpace as _, MetricSpace as _};

  fn camera() -> Camera {
    Camera::look_at(
      Point3::new(0., -5., 3.),
      Point3::origin(),
      Vector3::unit_z(),
      Projection::Perspective {
        fovy: Deg(60.).into(),
        near: 0.5,
        far: 50.,
      },
      Viewport::new(800, 600),
    )
  }

  #[test]
  fn eye_is_recovered_from_view() {
    let eye = camera().eye();

    assert_relative_eq!(eye.x, 0., epsilon = 1e-5);
    assert_relative_eq!(eye.y, -5., epsilon = 1e-5);
    assert_relative_eq!(eye.z, 3., epsilon = 1e-5);
  }

  #[test]
  fn target_projects_to_viewport_center() {
    let p = camera().project(Point3::origin());

    assert_relative_eq!(p.x, 400., epsilon = 1e-3);
    assert_relative_eq!(p.y, 300., epsilon = 1e-3);
    assert!(p.z > 0. && p.z < 1.);
  }

  #[test]
  fn unproject_inverts_project() {
    let cam = camera();
    let world = Point3::new(0.7, -0.3, 0.4);
    let back = cam.unproject(cam.project(world));

    assert_relative_eq!(back.distance(world), 0., epsilon = 1e-3);
  }

  #[test]
  fn unproject_inverts_project_orthographic() {
    let mut cam = camera();
    cam.projection = Projection::Orthographic {
      height: 4.,
      near: 0.5,
      far: 50.,
    };
    let world = Point3::new(-1.2, 0.5, 0.25);
    let back = cam.unproject(cam.project(world));

    assert_relative_eq!(back.distance(world), 0., epsilon = 1e-4);
  }

  #[test]
  fn near_and_far_planes_map_to_depth_range() {
    let cam = camera();
    let eye = cam.eye();
    let dir = (Point3::origin() - eye).normalize();

    assert_relative_eq!(cam.project(eye + dir * 0.5).z, 0., epsilon = 1e-4);
    assert_relative_eq!(cam.project(eye + dir * 50.).z, 1., epsilon = 1e-4);
  }

  #[test]
  fn background_depth_falls_back_to_projected_point() {
    let cam = camera();
    let expected = cam.project(Point3::origin()).z;

    assert_relative_eq!(cam.depth_or_fallback(0.3, Point3::origin()), 0.3);
    assert_relative_eq!(
      cam.depth_or_fallback(1., Point3::origin()),
      expected,
      epsilon = 1e-5
    );
    // behind the camera: keep the background depth
    assert_relative_eq!(cam.depth_or_fallback(1., Point3::new(0., -20., 12.)), 1.);
  }

  #[test]
  fn viewport_drives_aspect() {
    let mut cam = camera();
    let before = cam.projection_matrix();
    cam.set_viewport(Viewport::new(600, 600));
    let after = cam.projection_matrix();

    assert_relative_eq!(after[1][1], before[1][1]);
    assert_relative_eq!(after[0][0], before[0][0] * 4. / 3., epsilon = 1e-5);
  }
}
