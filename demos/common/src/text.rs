//! Text rendering from a glyph atlas.
//!
//! The glyphs of a TrueType font are rasterized once into a single-channel atlas. Every frame, the
//! text is laid out as textured quads in window pixels and blended over the scene with the glyph
//! coverage as alpha. The first line shows the measured frame rate.
//!
//! Press the <main action> to switch between light and dark text.

use luminance::UniformInterface;
use luminance_front::{
  blending::{Blending, Equation, Factor},
  context::GraphicsContext,
  depth_stencil::Write,
  framebuffer::Framebuffer,
  pipeline::{PipelineError, PipelineState, TextureBinding},
  pixel::{NormR8UI, NormUnsigned},
  render_state::RenderState,
  shader::{
    types::{Mat44, Vec3},
    Program, Uniform,
  },
  tess::{Mode, Tess},
  texture::{Dim2, Sampler, TexelUpload, Texture},
  Backend,
};
use ogl_utility::{text::GlyphAtlas, timing::FrameCounter};

use crate::{
  program::build_simple_program,
  shaders,
  shared::{Semantics, TextVertex},
  DemoError, Example, Features, GpuResultExt as _, InputAction, LoopFeedback, PlatformServices,
};

const FONT: &str = "FreeSans.ttf";
const FONT_PX: f32 = 32.;
const ATLAS_SIZE: [u32; 2] = [512, 512];
const MARGIN: f32 = 16.;
const BODY: &str = "The quick brown fox jumps over the lazy dog.\n\
                    Sphinx of black quartz, judge my vow!\n\
                    0123456789 (){}[] +-*/=<> ?!.,;:'\"";

#[derive(UniformInterface)]
struct TextInterface {
  #[uniform(unbound, name = "u_projection")]
  projection: Uniform<Mat44<f32>>,
  #[uniform(unbound, name = "u_atlas")]
  atlas: Uniform<TextureBinding<Dim2, NormUnsigned>>,
  #[uniform(unbound, name = "u_color")]
  color: Uniform<Vec3<f32>>,
}

/// Text shown for a given frame rate.
fn fps_line(fps: Option<f32>) -> String {
  match fps {
    Some(fps) => format!("{:.0} fps", fps),
    None => "-- fps".to_owned(),
  }
}

/// Orthographic projection mapping window pixels (origin at the bottom-left corner) to clip space.
fn pixel_projection(width: u32, height: u32) -> cgmath::Matrix4<f32> {
  cgmath::ortho(0., width.max(1) as f32, 0., height.max(1) as f32, -1., 1.)
}

// every printable ASCII character
fn ascii() -> impl Iterator<Item = char> {
  ' '..='~'
}

pub struct LocalExample {
  program: Program<Semantics, (), TextInterface>,
  atlas: GlyphAtlas,
  atlas_texture: Texture<Dim2, NormR8UI>,
  text: Tess<TextVertex>,
  text_content: String,
  frames: FrameCounter,
  size: [u32; 2],
  dark: bool,
}

// lay `content` out from the top-left corner of a window `height` pixels high
fn upload_text(
  context: &mut impl GraphicsContext<Backend = Backend>,
  atlas: &GlyphAtlas,
  content: &str,
  height: u32,
) -> Result<Tess<TextVertex>, DemoError> {
  let origin = [MARGIN, height as f32 - MARGIN - atlas.line_height()];
  let vertices: Vec<TextVertex> = atlas
    .layout(content, origin)
    .iter()
    .map(TextVertex::from)
    .collect();

  context
    .new_tess()
    .set_vertices(&vertices[..])
    .set_mode(Mode::Triangle)
    .build()
    .gpu("text")
}

impl Example for LocalExample {
  fn features() -> Features {
    Features::none().font(FONT)
  }

  fn bootstrap(
    platform: &mut impl PlatformServices,
    context: &mut impl GraphicsContext<Backend = Backend>,
  ) -> Result<Self, DemoError> {
    let library = shaders::library();
    let program = build_simple_program(context, &library, "text-vs", "text-fs")?;

    let font = platform
      .fetch_font(FONT)
      .map_err(|e| DemoError::Fetch(Box::new(e)))?;
    let atlas = GlyphAtlas::build(font, FONT_PX, ascii(), ATLAS_SIZE)?;
    log::info!(
      "glyph atlas: {}×{}, line height {}",
      atlas.size()[0],
      atlas.size()[1],
      atlas.line_height()
    );

    // the atlas is stored top row first, which is what the laid out texture coordinates expect
    let atlas_texture = context
      .new_texture_raw(
        atlas.size(),
        Sampler::default(),
        TexelUpload::base_level(atlas.texels(), 0),
      )
      .gpu("glyph atlas")?;

    let size = [800, 600];
    let text_content = format!("{}\n{}", fps_line(None), BODY);
    let text = upload_text(context, &atlas, &text_content, size[1])?;

    Ok(LocalExample {
      program,
      atlas,
      atlas_texture,
      text,
      text_content,
      frames: FrameCounter::default(),
      size,
      dark: false,
    })
  }

  fn render_frame(
    mut self,
    time: f32,
    back_buffer: Framebuffer<Dim2, (), ()>,
    actions: impl Iterator<Item = InputAction>,
    context: &mut impl GraphicsContext<Backend = Backend>,
  ) -> LoopFeedback<Self> {
    let mut relayout = false;

    for action in actions {
      match action {
        InputAction::Quit => return LoopFeedback::Exit,

        InputAction::MainToggle => self.dark = !self.dark,

        InputAction::Resized { width, height } => {
          self.size = [width, height];
          relayout = true;
        }

        _ => (),
      }
    }

    self.frames.tick(time);
    let content = format!("{}\n{}", fps_line(self.frames.fps()), BODY);

    if relayout || content != self.text_content {
      match upload_text(context, &self.atlas, &content, self.size[1]) {
        Ok(text) => {
          self.text = text;
          self.text_content = content;
        }

        Err(e) => {
          log::error!("{}", e);
          return LoopFeedback::Exit;
        }
      }
    }

    let (clear, color) = if self.dark {
      ([0.9, 0.88, 0.82, 1.], Vec3::new(0.1, 0.1, 0.12))
    } else {
      ([0.1, 0.1, 0.12, 1.], Vec3::new(0.95, 0.95, 0.9))
    };
    let projection = Mat44::new(pixel_projection(self.size[0], self.size[1]));
    let render_state = &RenderState::default()
      .set_blending(Blending {
        equation: Equation::Additive,
        src: Factor::SrcAlpha,
        dst: Factor::SrcAlphaComplement,
      })
      .set_depth_write(Write::Off);
    let program = &mut self.program;
    let atlas = &mut self.atlas_texture;
    let text = &self.text;

    let render = context
      .new_pipeline_gate()
      .pipeline(
        &back_buffer,
        &PipelineState::default().set_clear_color(clear),
        |pipeline, mut shd_gate| -> Result<(), PipelineError> {
          let atlas = pipeline.bind_texture(atlas)?;

          shd_gate.shade(program, |mut iface, uni, mut rdr_gate| {
            iface.set(&uni.projection, projection);
            iface.set(&uni.atlas, atlas.binding());
            iface.set(&uni.color, color);

            rdr_gate.render(render_state, |mut tess_gate| tess_gate.render(text))
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
  use cgmath::{InnerSpace as _, Vector4};

  use super::*;

  #[test]
  fn fps_line_rounds() {
    assert_eq!(fps_line(Some(59.7)), "60 fps");
    assert_eq!(fps_line(None), "-- fps");
  }

  #[test]
  fn pixel_corners_map_to_clip_corners() {
    let m = pixel_projection(800, 600);
    let close = |a: Vector4<f32>, b: Vector4<f32>| (a - b).magnitude() < 1e-5;

    assert!(close(m * Vector4::new(0., 0., 0., 1.), Vector4::new(-1., -1., 0., 1.)));
    assert!(close(m * Vector4::new(800., 600., 0., 1.), Vector4::new(1., 1., 0., 1.)));
  }

  #[test]
  fn ascii_is_printable() {
    let chars: Vec<char> = ascii().collect();

    assert_eq!(chars.len(), 95);
    assert!(BODY.chars().filter(|&c| c != '\n').all(|c| chars.contains(&c)));
  }
}
