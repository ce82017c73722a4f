//! A spinning cube colored by its normals.
//!
//! First step into 3D: a generated mesh, a perspective camera and a depth test.

use cgmath::{Deg, Matrix4, Point3, Rad, Vector3};
use luminance_front::{
  context::GraphicsContext, framebuffer::Framebuffer, pipeline::PipelineState,
  render_state::RenderState, shader::types::Mat44, shader::Program, texture::Dim2, Backend,
};
use ogl_utility::{mesh, Camera, Projection, Viewport};

use crate::{
  program::build_simple_program,
  shaders,
  shared::{upload_mesh, MeshInterface, MeshTess, Semantics},
  DemoError, Example, InputAction, LoopFeedback, PlatformServices,
};

pub struct LocalExample {
  program: Program<Semantics, (), MeshInterface>,
  cube: MeshTess,
  camera: Camera,
}

impl Example for LocalExample {
  fn bootstrap(
    _: &mut impl PlatformServices,
    context: &mut impl GraphicsContext<Backend = Backend>,
  ) -> Result<Self, DemoError> {
    let library = shaders::library();
    let program = build_simple_program(context, &library, "mesh-vs", "normal-color-fs")?;
    let cube = upload_mesh(context, &mesh::hexahedron(1.))?;

    let camera = Camera::look_at(
      Point3::new(0., 1., 3.),
      Point3::new(0., 0., 0.),
      Vector3::unit_y(),
      Projection::Perspective {
        fovy: Deg(45.).into(),
        near: 0.1,
        far: 100.,
      },
      Viewport::new(800, 600),
    );

    Ok(LocalExample {
      program,
      cube,
      camera,
    })
  }

  fn render_frame(
    mut self,
    time: f32,
    back_buffer: Framebuffer<Dim2, (), ()>,
    actions: impl Iterator<Item = InputAction>,
    context: &mut impl GraphicsContext<Backend = Backend>,
  ) -> LoopFeedback<Self> {
    for action in actions {
      match action {
        InputAction::Quit => return LoopFeedback::Exit,
        InputAction::Resized { width, height } => {
          self.camera.set_viewport(Viewport::new(width, height));
        }
        _ => (),
      }
    }

    let model = Matrix4::from_angle_y(Rad(time)) * Matrix4::from_angle_x(Rad(time * 0.7));
    let projection = Mat44::new(self.camera.projection_matrix());
    let view = Mat44::new(self.camera.view);
    let program = &mut self.program;
    let cube = &self.cube;

    let render = context
      .new_pipeline_gate()
      .pipeline(
        &back_buffer,
        &PipelineState::default().set_clear_color([0.1, 0.1, 0.1, 1.]),
        |_, mut shd_gate| {
          shd_gate.shade(program, |mut iface, uni, mut rdr_gate| {
            iface.set(&uni.projection, projection);
            iface.set(&uni.view, view);
            iface.set(&uni.model, Mat44::new(model));

            rdr_gate.render(&RenderState::default(), |mut tess_gate| {
              tess_gate.render(cube)
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
