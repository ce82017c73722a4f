//! Hello world: a single triangle with a color per vertex.
//!
//! The colors are interpolated by the rasterizer across the face of the triangle.

use luminance_front::{
  context::GraphicsContext,
  framebuffer::Framebuffer,
  pipeline::PipelineState,
  render_state::RenderState,
  shader::Program,
  tess::{Mode, Tess},
  texture::Dim2,
  Backend,
};

use crate::{
  program::build_simple_program,
  shaders,
  shared::{ColorVertex, Semantics, VertexColor, VertexPosition2},
  DemoError, Example, GpuResultExt as _, InputAction, LoopFeedback, PlatformServices,
};

const VERTICES: [ColorVertex; 3] = [
  ColorVertex::new(
    VertexPosition2::new([-0.5, -0.5]),
    VertexColor::new([1., 0., 0.]),
  ),
  ColorVertex::new(
    VertexPosition2::new([0.5, -0.5]),
    VertexColor::new([0., 1., 0.]),
  ),
  ColorVertex::new(
    VertexPosition2::new([0., 0.5]),
    VertexColor::new([0., 0., 1.]),
  ),
];

pub struct LocalExample {
  program: Program<Semantics, (), ()>,
  triangle: Tess<ColorVertex>,
}

impl Example for LocalExample {
  fn bootstrap(
    _: &mut impl PlatformServices,
    context: &mut impl GraphicsContext<Backend = Backend>,
  ) -> Result<Self, DemoError> {
    let library = shaders::library();
    let program =
      build_simple_program(context, &library, "hello-triangle-vs", "hello-triangle-fs")?;

    let triangle = context
      .new_tess()
      .set_vertices(&VERTICES[..])
      .set_mode(Mode::Triangle)
      .build()
      .gpu("triangle")?;

    Ok(LocalExample { program, triangle })
  }

  fn render_frame(
    mut self,
    _: f32,
    back_buffer: Framebuffer<Dim2, (), ()>,
    actions: impl Iterator<Item = InputAction>,
    context: &mut impl GraphicsContext<Backend = Backend>,
  ) -> LoopFeedback<Self> {
    for action in actions {
      if action == InputAction::Quit {
        return LoopFeedback::Exit;
      }
    }

    let program = &mut self.program;
    let triangle = &self.triangle;

    let render = context
      .new_pipeline_gate()
      .pipeline(
        &back_buffer,
        &PipelineState::default().set_clear_color([0.1, 0.1, 0.1, 1.]),
        |_, mut shd_gate| {
          shd_gate.shade(program, |_, _, mut rdr_gate| {
            rdr_gate.render(&RenderState::default(), |mut tess_gate| {
              tess_gate.render(triangle)
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
