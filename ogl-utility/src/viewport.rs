//! Viewport rectangle and window-space transforms.

use cgmath::{Matrix4, Vector3};

/// A viewport rectangle, in window pixels.
///
/// The origin is the bottom-left corner of the window, as in `glViewport`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
  /// Left edge.
  pub x: f32,
  /// Bottom edge.
  pub y: f32,
  /// Width of the rectangle.
  pub width: f32,
  /// Height of the rectangle.
  pub height: f32,
}

impl Viewport {
  /// Viewport covering a whole framebuffer.
  pub fn new(width: u32, height: u32) -> Self {
    Viewport {
      x: 0.,
      y: 0.,
      width: width as f32,
      height: height as f32,
    }
  }

  /// Width / height ratio. A degenerate (zero height) viewport has a ratio of 1.
  pub fn aspect(&self) -> f32 {
    if self.height > 0. {
      self.width / self.height
    } else {
      1.
    }
  }

  /// Matrix mapping normalized device coordinates to window coordinates.
  ///
  /// x and y land in pixels inside the rectangle, z lands in the `[0, 1]` depth range.
  pub fn window_matrix(&self) -> Matrix4<f32> {
    Matrix4::from_translation(Vector3::new(self.x, self.y, 0.))
      * Matrix4::from_nonuniform_scale(self.width * 0.5, self.height * 0.5, 0.5)
      * Matrix4::from_translation(Vector3::new(1., 1., 1.))
  }

  /// Inverse of [`Viewport::window_matrix`].
  pub fn inverse_window_matrix(&self) -> Matrix4<f32> {
    let w = if self.width != 0. { self.width } else { 1. };
    let h = if self.height != 0. { self.height } else { 1. };

    Matrix4::from_translation(Vector3::new(-1., -1., -1.))
      * Matrix4::from_nonuniform_scale(2. / w, 2. / h, 2.)
      * Matrix4::from_translation(Vector3::new(-self.x, -self.y, 0.))
  }

  /// Convert a cursor ordinate measured from the top of the window (as windowing systems report
  /// it) to one measured from the bottom.
  pub fn flip_y(&self, cursor_y: f32) -> f32 {
    self.y + self.height - cursor_y
  }

  /// Whether a window position lies inside the rectangle.
  pub fn contains(&self, x: f32, y: f32) -> bool {
    x >= self.x && y >= self.y && x < self.x + self.width && y < self.y + self.height
  }
}
