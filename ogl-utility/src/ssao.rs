//! Screen-space ambient occlusion sampling data.
//!
//! The kernel and the noise are uploaded as small textures. The kernel holds hemisphere
//! directions around the surface normal (z axis of the tangent space); the noise tiles the
//! screen with rotations of the tangent frame so that neighbouring fragments sample with
//! different orientations.

use std::f32::consts::PI;

use cgmath::{InnerSpace as _, Vector2, Vector3};
use rand::Rng;

/// Tuning of the SSAO pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SsaoSettings {
  /// Number of samples in the kernel.
  pub kernel_size: usize,
  /// Side of the square noise tile, in texels.
  pub noise_size: usize,
  /// Sampling radius, in view-space units.
  pub radius: f32,
}

impl Default for SsaoSettings {
  fn default() -> Self {
    SsaoSettings {
      kernel_size: 64,
      noise_size: 4,
      radius: 0.5,
    }
  }
}

/// Generate `size` kernel samples.
///
/// `xyz` is a direction biased towards the normal; `w` is the length the sample is scaled
/// to, growing quadratically from 0.1 to 1 so that most samples stay close to the fragment.
pub fn kernel(size: usize, rng: &mut impl Rng) -> Vec<[f32; 4]> {
  (0..size)
    .map(|i| {
      let mut v = loop {
        let v = Vector3::new(
          rng.gen_range(-1.0..=1.0),
          rng.gen_range(-1.0..=1.0),
          rng.gen_range(0.0..=1.0f32),
        );

        if v.magnitude2() > 1e-6 {
          break v.normalize();
        }
      };

      let len_xy = Vector2::new(v.x, v.y).magnitude();
      v.z = v.z * (1. + len_xy) - len_xy;

      let t = i as f32 / size as f32;
      [v.x, v.y, v.z, lerp(0.1, 1., t * t)]
    })
    .collect()
}

/// Generate the `size × size` noise tile.
///
/// Each texel is a unit rotation vector in the xy plane. The first half of the tile takes the
/// even angle steps, the second half the odd ones.
pub fn noise(size: usize) -> Vec<[f32; 3]> {
  let count = size * size;

  (0..count)
    .step_by(2)
    .chain((1..count).step_by(2))
    .map(|step| {
      let angle = 2. * PI * step as f32 / count as f32;
      [angle.cos(), angle.sin(), 0.]
    })
    .collect()
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
  a + (b - a) * t
}

#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_relative_eq;
  use rand::{rngs::StdRng, SeedableRng};

  #[test]
  fn kernel_is_deterministic_for_a_seed() {
    let a = kernel(16, &mut StdRng::seed_from_u64(7));
    let b = kernel(16, &mut StdRng::seed_from_u64(7));

    assert_eq!(a, b);
  }

  #[test]
  fn kernel_samples_are_bounded() {
    let samples = kernel(64, &mut StdRng::seed_from_u64(42));

    assert_eq!(samples.len(), 64);
    for [x, y, z, _] in samples {
      assert!(Vector3::new(x, y, z).magnitude() <= 2f32.sqrt() + 1e-5);
      assert!(z <= 1.);
      assert!(z >= -1. - 1e-5);
    }
  }

  #[test]
  fn kernel_scale_grows_towards_one() {
    let samples = kernel(32, &mut StdRng::seed_from_u64(1));

    assert_relative_eq!(samples[0][3], 0.1);
    assert!(samples.windows(2).all(|w| w[0][3] < w[1][3]));
    assert!(samples[31][3] < 1.);
  }

  #[test]
  fn noise_covers_every_texel_with_unit_vectors() {
    let texels = noise(4);

    assert_eq!(texels.len(), 16);
    for [x, y, z] in &texels {
      assert_relative_eq!(Vector2::new(*x, *y).magnitude(), 1., epsilon = 1e-5);
      assert_eq!(*z, 0.);
    }
  }

  #[test]
  fn noise_alternates_angles() {
    let texels = noise(4);
    let step = 2. * PI / 16.;

    // even steps first, odd steps in the second half
    assert_relative_eq!(texels[1][1].atan2(texels[1][0]), 2. * step, epsilon = 1e-5);
    assert_relative_eq!(texels[8][1].atan2(texels[8][0]), step, epsilon = 1e-5);
  }
}
