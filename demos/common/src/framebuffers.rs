//! Offscreen framebuffers following the window size.
//!
//! luminance framebuffers have a fixed size; resizing one means asking for a new one. The
//! wrappers below remember their size and recreate the framebuffer on [`InputAction::Resized`]
//! only when the size actually changes.
//!
//! [`InputAction::Resized`]: crate::InputAction::Resized

use luminance_front::{
  context::GraphicsContext,
  framebuffer::Framebuffer,
  pixel::{Depth32F, NormRGBA8UI, R32F, RGBA32F},
  texture::{Dim2, MagFilter, MinFilter, Sampler},
  Backend,
};

use crate::{DemoError, GpuResultExt as _};

/// Sampler fetching texels as they are.
pub fn nearest_sampler() -> Sampler {
  Sampler {
    min_filter: MinFilter::Nearest,
    mag_filter: MagFilter::Nearest,
    ..Sampler::default()
  }
}

macro_rules! resizable_framebuffer {
  ($(#[$meta:meta])* $name:ident, $color:ty, $depth:ty) => {
    $(#[$meta])*
    pub struct $name {
      framebuffer: Framebuffer<Dim2, $color, $depth>,
      size: [u32; 2],
    }

    impl $name {
      /// Allocate the framebuffer.
      pub fn new(
        context: &mut impl GraphicsContext<Backend = Backend>,
        size: [u32; 2],
      ) -> Result<Self, DemoError> {
        let size = [size[0].max(1), size[1].max(1)];
        let framebuffer = context
          .new_framebuffer::<Dim2, $color, $depth>(size, 0, nearest_sampler())
          .gpu(stringify!($name))?;

        Ok($name { framebuffer, size })
      }

      /// Current size.
      pub fn size(&self) -> [u32; 2] {
        self.size
      }

      /// Recreate the framebuffer if `size` differs from the current one.
      ///
      /// A null size (minimized window) keeps the current framebuffer.
      pub fn resize(
        &mut self,
        context: &mut impl GraphicsContext<Backend = Backend>,
        size: [u32; 2],
      ) -> Result<(), DemoError> {
        if size == self.size || size[0] == 0 || size[1] == 0 {
          return Ok(());
        }

        log::debug!("resizing {} to {}×{}", stringify!($name), size[0], size[1]);
        *self = Self::new(context, size)?;
        Ok(())
      }

      /// The wrapped framebuffer.
      pub fn framebuffer(&self) -> &Framebuffer<Dim2, $color, $depth> {
        &self.framebuffer
      }

      /// The wrapped framebuffer, to bind its textures.
      pub fn framebuffer_mut(&mut self) -> &mut Framebuffer<Dim2, $color, $depth> {
        &mut self.framebuffer
      }
    }
  };
}

resizable_framebuffer!(
  /// Shaded color plus view-space normal and window depth (`RGBA32F`, depth in `w`).
  GBuffer,
  (NormRGBA8UI, RGBA32F),
  Depth32F
);

resizable_framebuffer!(
  /// Ambient occlusion factor.
  OcclusionBuffer,
  R32F,
  ()
);

impl GBuffer {
  /// Read the normal/depth target back.
  ///
  /// This stalls the pipeline; do it on user input, not every frame.
  pub fn read_normal_depth(&mut self) -> Result<NormalDepthTexels, DemoError> {
    let size = self.size;
    let (_, normal_depth) = self.framebuffer.color_slot();
    let texels = normal_depth.get_raw_texels().gpu("normal/depth readback")?;

    Ok(NormalDepthTexels { size, texels })
  }
}

/// CPU copy of a [`GBuffer`] normal/depth target.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalDepthTexels {
  size: [u32; 2],
  texels: Vec<f32>,
}

impl NormalDepthTexels {
  /// Wrap raw RGBA texels, bottom row first.
  pub fn new(size: [u32; 2], texels: Vec<f32>) -> Self {
    NormalDepthTexels { size, texels }
  }

  /// Window depth under a cursor given in window coordinates with a bottom-left origin.
  ///
  /// Positions outside the buffer read as the background (1).
  pub fn depth_at(&self, x: f32, y: f32) -> f32 {
    let [w, h] = self.size;

    if x < 0. || y < 0. || x >= w as f32 || y >= h as f32 {
      return 1.;
    }

    let index = (y as usize * w as usize + x as usize) * 4 + 3;
    self.texels.get(index).copied().unwrap_or(1.)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn texels() -> NormalDepthTexels {
    // 2×2, depth = (index + 1) / 8
    let texels = (0..4)
      .flat_map(|i| [0., 0., 1., (i + 1) as f32 / 8.])
      .collect();

    NormalDepthTexels::new([2, 2], texels)
  }

  #[test]
  fn depth_is_read_from_the_alpha_channel() {
    let t = texels();

    assert_eq!(t.depth_at(0.5, 0.5), 0.125);
    assert_eq!(t.depth_at(1.5, 0.2), 0.25);
    assert_eq!(t.depth_at(0.2, 1.9), 0.375);
    assert_eq!(t.depth_at(1., 1.), 0.5);
  }

  #[test]
  fn outside_reads_background() {
    let t = texels();

    assert_eq!(t.depth_at(-0.5, 0.), 1.);
    assert_eq!(t.depth_at(2., 0.), 1.);
    assert_eq!(t.depth_at(0., 7.), 1.);
  }

  #[test]
  fn truncated_readback_reads_background() {
    let t = NormalDepthTexels::new([2, 2], vec![0.; 4]);

    assert_eq!(t.depth_at(1.5, 1.5), 1.);
  }
}
