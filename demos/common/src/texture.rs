//! Display an image loaded from the disk.
//!
//! The image is uploaded as an RGB texture and drawn on an attributeless quad covering the window.
//! By default the image keeps its aspect ratio and is letterboxed; it can be stretched to the
//! window instead.
//!
//! Press the <main action> to switch between fitting and stretching the image.

use luminance::UniformInterface;
use luminance_front::{
  context::GraphicsContext,
  framebuffer::Framebuffer,
  pipeline::{PipelineError, PipelineState, TextureBinding},
  pixel::NormUnsigned,
  render_state::RenderState,
  shader::{types::Vec2, Program, Uniform},
  tess::Tess,
  texture::Dim2,
  Backend,
};

use crate::{
  program::build_simple_program,
  shaders,
  shared::{fullscreen_quad, load_texture, RGBTexture},
  DemoError, Example, Features, InputAction, LoopFeedback, PlatformServices,
};

const IMAGE: &str = "source.jpg";

#[derive(UniformInterface)]
struct TextureInterface {
  #[uniform(unbound, name = "u_texture")]
  texture: Uniform<TextureBinding<Dim2, NormUnsigned>>,
  #[uniform(unbound, name = "u_scale")]
  scale: Uniform<Vec2<f32>>,
}

/// Fraction of the window covered by an image on each axis when it keeps its aspect ratio.
///
/// One of the two components is always 1: the image touches two opposite borders of the window.
pub fn fit_scale(image: [u32; 2], window: [u32; 2]) -> [f32; 2] {
  let aspect = |[w, h]: [u32; 2]| w.max(1) as f32 / h.max(1) as f32;
  let (image_aspect, window_aspect) = (aspect(image), aspect(window));

  if image_aspect > window_aspect {
    [1., window_aspect / image_aspect]
  } else {
    [image_aspect / window_aspect, 1.]
  }
}

pub struct LocalExample {
  image: RGBTexture,
  program: Program<(), (), TextureInterface>,
  quad: Tess<()>,
  window: [u32; 2],
  stretch: bool,
}

impl Example for LocalExample {
  fn features() -> Features {
    Features::none().texture(IMAGE)
  }

  fn bootstrap(
    platform: &mut impl PlatformServices,
    context: &mut impl GraphicsContext<Backend = Backend>,
  ) -> Result<Self, DemoError> {
    let image = load_texture(context, platform, IMAGE)?;
    log::info!("{}: {}×{}", IMAGE, image.size()[0], image.size()[1]);

    let library = shaders::library();
    let program = build_simple_program(context, &library, "fullscreen-vs", "texture-fs")?;

    Ok(LocalExample {
      image,
      program,
      quad: fullscreen_quad(context)?,
      window: [800, 600],
      stretch: false,
    })
  }

  fn render_frame(
    mut self,
    _: f32,
    back_buffer: Framebuffer<Dim2, (), ()>,
    actions: impl Iterator<Item = InputAction>,
    context: &mut impl GraphicsContext<Backend = Backend>,
  ) -> LoopFeedback<Self> {
    for action in actions {
      match action {
        InputAction::Quit => return LoopFeedback::Exit,

        InputAction::MainToggle => {
          self.stretch = !self.stretch;
          log::info!("stretch: {}", self.stretch);
        }

        InputAction::Resized { width, height } => self.window = [width, height],

        _ => (),
      }
    }

    let scale = if self.stretch {
      [1., 1.]
    } else {
      fit_scale(self.image.size(), self.window)
    };
    let scale = Vec2::new(scale[0], scale[1]);
    let image = &mut self.image;
    let program = &mut self.program;
    let quad = &self.quad;

    let render = context
      .new_pipeline_gate()
      .pipeline(
        &back_buffer,
        &PipelineState::default(),
        |pipeline, mut shd_gate| -> Result<(), PipelineError> {
          let image = pipeline.bind_texture(image)?;

          shd_gate.shade(program, |mut iface, uni, mut rdr_gate| {
            iface.set(&uni.texture, image.binding());
            iface.set(&uni.scale, scale);

            rdr_gate.render(&RenderState::default(), |mut tess_gate| {
              tess_gate.render(quad)
            })
          })
        },
      )
      .assume();

    if render.is_ok() {
      LoopFeedback::Continue(self)
    } else {
      LoopFeedback::Exit
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn wide_images_are_letterboxed() {
    assert_eq!(fit_scale([1600, 400], [800, 800]), [1., 0.25]);
  }

  #[test]
  fn tall_images_are_pillarboxed() {
    assert_eq!(fit_scale([300, 600], [800, 400]), [0.25, 1.]);
  }

  #[test]
  fn matching_aspects_fill_the_window() {
    assert_eq!(fit_scale([640, 480], [800, 600]), [1., 1.]);
    assert_eq!(fit_scale([0, 0], [0, 0]), [1., 1.]);
  }
}
