//! Colors.

/// Fully saturated color of a hue in `[0, 1]` (0 red, 1/3 green, 2/3 blue).
///
/// Same formula as the `hue_to_rgb` GLSL chunk, so that CPU-side colors match the shaded ones.
pub fn hue_to_rgb(hue: f32) -> [f32; 3] {
  let r = (hue * 6. - 3.).abs() - 1.;
  let g = 2. - (hue * 6. - 2.).abs();
  let b = 2. - (hue * 6. - 4.).abs();

  [saturate(r), saturate(g), saturate(b)]
}

fn saturate(x: f32) -> f32 {
  x.max(0.).min(1.)
}

#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_relative_eq;

  fn assert_rgb(hue: f32, expected: [f32; 3]) {
    let rgb = hue_to_rgb(hue);
    for c in 0..3 {
      assert_relative_eq!(rgb[c], expected[c], epsilon = 1e-5);
    }
  }

  #[test]
  fn primaries() {
    assert_rgb(0., [1., 0., 0.]);
    assert_rgb(1. / 3., [0., 1., 0.]);
    assert_rgb(2. / 3., [0., 0., 1.]);
    assert_rgb(1., [1., 0., 0.]);
  }

  #[test]
  fn secondaries() {
    assert_rgb(1. / 6., [1., 1., 0.]);
    assert_rgb(0.5, [0., 1., 1.]);
  }
}
