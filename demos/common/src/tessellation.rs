//! Hardware tessellation: an icosahedron refined into a sphere.
//!
//! Every triangle of the icosahedron is sent as a patch. The control stage picks a level per edge
//! from its distance to the eye, so that shared edges agree and no crack appears; the evaluation
//! stage pushes the generated vertices onto the unit sphere. Patch edges are darkened.
//!
//! Use the up and down actions to change the maximum tessellation level, forward and backward to
//! move the camera.

use cgmath::{Deg, EuclideanSpace as _, Matrix4, Point3, Rad, Vector3};
use luminance::UniformInterface;
use luminance_front::{
  context::GraphicsContext,
  framebuffer::Framebuffer,
  pipeline::PipelineState,
  render_state::RenderState,
  shader::{
    types::{Mat44, Vec3},
    Program, Uniform,
  },
  tess::Mode,
  texture::Dim2,
  Backend,
};
use ogl_utility::{mesh, shader_source::StageNames, Camera, Projection, Viewport};

use crate::{
  program::build_program,
  shaders,
  shared::{upload_mesh_as, view_direction, MeshTess, Semantics},
  DemoError, Example, InputAction, LoopFeedback, PlatformServices,
};

const MIN_DISTANCE: f32 = 1.5;
const MAX_DISTANCE: f32 = 12.;
const MAX_LEVEL: f32 = 64.;

#[derive(UniformInterface)]
struct TessellationInterface {
  #[uniform(unbound, name = "u_projection")]
  projection: Uniform<Mat44<f32>>,
  #[uniform(unbound, name = "u_view")]
  view: Uniform<Mat44<f32>>,
  #[uniform(unbound, name = "u_model")]
  model: Uniform<Mat44<f32>>,
  #[uniform(unbound, name = "u_max_level")]
  max_level: Uniform<f32>,
  #[uniform(unbound, name = "u_to_light")]
  to_light: Uniform<Vec3<f32>>,
  #[uniform(unbound, name = "u_color")]
  color: Uniform<Vec3<f32>>,
}

// maximum level after `steps` increments, kept in [1, MAX_LEVEL]
fn step_level(level: f32, steps: f32) -> f32 {
  (level + steps).max(1.).min(MAX_LEVEL)
}

// camera looking at the origin from `distance` away
fn camera_at(distance: f32, viewport: Viewport) -> Camera {
  Camera::look_at(
    Point3::new(0., 0., distance),
    Point3::origin(),
    Vector3::unit_y(),
    Projection::Perspective {
      fovy: Deg(45.).into(),
      near: 0.1,
      far: 50.,
    },
    viewport,
  )
}

pub struct LocalExample {
  program: Program<Semantics, (), TessellationInterface>,
  patches: MeshTess,
  camera: Camera,
  distance: f32,
  max_level: f32,
}

impl Example for LocalExample {
  fn bootstrap(
    _: &mut impl PlatformServices,
    context: &mut impl GraphicsContext<Backend = Backend>,
  ) -> Result<Self, DemoError> {
    let library = shaders::library();
    let stages = StageNames::new("tessellation-vs", "tessellation-fs")
      .tessellation("tessellation-tcs", "tessellation-tes");
    let program = build_program(context, &library, &stages)?;

    let patches = upload_mesh_as(context, &mesh::icosahedron(1.), Mode::Patch(3))?;
    let distance = 4.;

    Ok(LocalExample {
      program,
      patches,
      camera: camera_at(distance, Viewport::new(800, 600)),
      distance,
      max_level: 8.,
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

        InputAction::Up => {
          self.max_level = step_level(self.max_level, 1.);
          log::info!("maximum tessellation level: {}", self.max_level);
        }

        InputAction::Down => {
          self.max_level = step_level(self.max_level, -1.);
          log::info!("maximum tessellation level: {}", self.max_level);
        }

        InputAction::Forward => {
          self.distance = (self.distance - 0.25).max(MIN_DISTANCE);
          self.camera = camera_at(self.distance, self.camera.viewport);
        }

        InputAction::Backward => {
          self.distance = (self.distance + 0.25).min(MAX_DISTANCE);
          self.camera = camera_at(self.distance, self.camera.viewport);
        }

        InputAction::Resized { width, height } => {
          self.camera.set_viewport(Viewport::new(width, height));
        }

        _ => (),
      }
    }

    let model = Matrix4::from_angle_y(Rad(time * 0.3)) * Matrix4::from_angle_x(Rad(0.4));
    let projection = Mat44::new(self.camera.projection_matrix());
    let view = Mat44::new(self.camera.view);
    let to_light = view_direction(self.camera.view, Vector3::new(1., 1., 1.));
    let max_level = self.max_level;
    let program = &mut self.program;
    let patches = &self.patches;

    let render = context
      .new_pipeline_gate()
      .pipeline(
        &back_buffer,
        &PipelineState::default().set_clear_color([0.1, 0.1, 0.12, 1.]),
        |_, mut shd_gate| {
          shd_gate.shade(program, |mut iface, uni, mut rdr_gate| {
            iface.set(&uni.projection, projection);
            iface.set(&uni.view, view);
            iface.set(&uni.model, Mat44::new(model));
            iface.set(&uni.max_level, max_level);
            iface.set(&uni.to_light, to_light);
            iface.set(&uni.color, Vec3::new(0.9, 0.55, 0.25));

            rdr_gate.render(&RenderState::default(), |mut tess_gate| {
              tess_gate.render(patches)
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
  fn levels_stay_in_range() {
    assert_eq!(step_level(8., 1.), 9.);
    assert_eq!(step_level(1., -1.), 1.);
    assert_eq!(step_level(MAX_LEVEL, 1.), MAX_LEVEL);
  }

  #[test]
  fn camera_keeps_its_distance() {
    let camera = camera_at(6., Viewport::new(640, 480));

    assert!((camera.eye().to_vec().z - 6.).abs() < 1e-5);
    assert_eq!(camera.viewport, Viewport::new(640, 480));
  }
}
