//! Shadow mapping helpers.

use cgmath::{ortho, InnerSpace as _, Matrix4, Point3, Vector3};

/// Side of the square shadow map, in texels.
pub const DEFAULT_SHADOW_MAP_SIZE: u32 = 2048;

/// A light infinitely far away, shining along `direction`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
  /// Direction the light travels in (from the light towards the scene).
  pub direction: Vector3<f32>,
}

impl DirectionalLight {
  /// Light travelling along `direction`; the vector doesn’t need to be normalized.
  pub fn new(direction: Vector3<f32>) -> Self {
    DirectionalLight { direction }
  }

  /// Unit vector pointing from the scene towards the light, as shaders expect it.
  pub fn to_light(&self) -> Vector3<f32> {
    -self.direction.normalize()
  }
}

/// View-projection of a directional light covering the sphere at `center` of radius `radius`.
///
/// The light looks at `center` from outside the sphere; the orthographic volume is the box
/// bounding the sphere, so every point of the sphere lands in clip space.
pub fn light_view_projection(
  light: &DirectionalLight,
  center: Point3<f32>,
  radius: f32,
) -> Matrix4<f32> {
  let radius = radius.max(f32::EPSILON);
  let dir = light.direction.normalize();
  let eye = center - dir * (2. * radius);

  // any up vector works as long as it isn’t parallel to the light
  let up = if dir.z.abs() > 0.99 {
    Vector3::unit_y()
  } else {
    Vector3::unit_z()
  };

  let view = Matrix4::look_at_rh(eye, center, up);
  let projection = ortho(-radius, radius, -radius, radius, radius, 3. * radius);

  projection * view
}

/// Map clip space ([-1, 1]) to texture space ([0, 1]) on every axis.
pub fn shadow_bias_matrix() -> Matrix4<f32> {
  Matrix4::from_translation(Vector3::new(0.5, 0.5, 0.5)) * Matrix4::from_scale(0.5)
}

#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_relative_eq;
  use cgmath::{EuclideanSpace, Vector4};

  fn clip(m: &Matrix4<f32>, p: Point3<f32>) -> Vector4<f32> {
    let h = m * p.to_homogeneous();
    h / h.w
  }

  #[test]
  fn center_lands_in_the_middle_of_the_map() {
    let light = DirectionalLight::new(Vector3::new(-1., -1., -2.));
    let center = Point3::new(1., 2., 0.5);
    let c = clip(&light_view_projection(&light, center, 3.), center);

    assert_relative_eq!(c.x, 0., epsilon = 1e-5);
    assert_relative_eq!(c.y, 0., epsilon = 1e-5);
    assert_relative_eq!(c.z, 0., epsilon = 1e-5);
  }

  #[test]
  fn bounding_sphere_fits_in_clip_space() {
    let light = DirectionalLight::new(Vector3::new(0.3, -0.2, -1.));
    let center = Point3::new(0., 0., 0.);
    let radius = 2.;
    let m = light_view_projection(&light, center, radius);

    let axes = [
      Vector3::unit_x(),
      Vector3::unit_y(),
      Vector3::unit_z(),
      light.direction.normalize(),
    ];

    for axis in axes {
      for sign in [-1., 1.] {
        let c = clip(&m, center + axis * (sign * radius));
        for v in [c.x, c.y, c.z] {
          assert!(v.abs() <= 1. + 1e-5, "{:?} out of the light volume", c);
        }
      }
    }
  }

  #[test]
  fn vertical_light_has_a_valid_frame() {
    let light = DirectionalLight::new(Vector3::new(0., 0., -1.));
    let m = light_view_projection(&light, Point3::origin(), 1.);
    let c = clip(&m, Point3::new(0., 0., 1.));

    assert!(c.x.is_finite() && c.y.is_finite());
    assert_relative_eq!(c.z, -1., epsilon = 1e-5);
  }

  #[test]
  fn bias_maps_clip_to_texture_space() {
    let bias = shadow_bias_matrix();
    let lo = bias * Vector4::new(-1., -1., -1., 1.);
    let hi = bias * Vector4::new(1., 1., 1., 1.);

    assert_relative_eq!(lo.x, 0.);
    assert_relative_eq!(lo.z, 0.);
    assert_relative_eq!(hi.y, 1.);
    assert_relative_eq!(hi.w, 1.);
  }

  #[test]
  fn to_light_is_opposite_to_direction() {
    let light = DirectionalLight::new(Vector3::new(0., 0., -4.));

    assert_eq!(light.to_light(), Vector3::new(0., 0., 1.));
  }
}
