//! Walk around a ring of solids with a first-person camera.
//!
//! Hold the primary button and move the cursor to look around. Use the direction actions to
//! strafe and scroll to change the field of view.

use std::f32::consts::PI;

use cgmath::{Deg, Matrix4, Rad, Vector3};
use luminance_front::{
  context::GraphicsContext,
  framebuffer::Framebuffer,
  pipeline::PipelineState,
  render_state::RenderState,
  shader::{
    types::{Mat44, Vec3},
    Program,
  },
  texture::Dim2,
  Backend,
};
use ogl_utility::{
  first_person::{FirstPersonCamera, Strafe},
  mesh::{self, PlatonicSolid},
  Camera, Projection, Viewport,
};

use crate::{
  program::build_simple_program,
  shaders,
  shared::{upload_mesh, view_direction, MeshTess, PhongInterface, Semantics},
  DemoError, Example, InputAction, LoopFeedback, PlatformServices,
};

const RING_RADIUS: f32 = 4.;
const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 100.;

/// Model matrices of `count` objects standing evenly on a circle around the origin.
pub fn ring_placements(count: usize, radius: f32) -> Vec<Matrix4<f32>> {
  (0..count)
    .map(|i| {
      let angle = 2. * PI * i as f32 / count as f32;
      let position = Vector3::new(radius * angle.cos(), 0.5, radius * angle.sin());

      Matrix4::from_translation(position) * Matrix4::from_scale(0.5)
    })
    .collect()
}

pub struct LocalExample {
  program: Program<Semantics, (), PhongInterface>,
  solids: Vec<(MeshTess, Matrix4<f32>)>,
  ground: MeshTess,
  camera: FirstPersonCamera,
  viewport: Viewport,
  looking: bool,
  last_cursor: Option<[f32; 2]>,
}

impl Example for LocalExample {
  fn bootstrap(
    _: &mut impl PlatformServices,
    context: &mut impl GraphicsContext<Backend = Backend>,
  ) -> Result<Self, DemoError> {
    let library = shaders::library();
    let program = build_simple_program(context, &library, "mesh-vs", "phong-fs")?;

    let placements = ring_placements(PlatonicSolid::ALL.len(), RING_RADIUS);
    let mut solids = Vec::with_capacity(placements.len());
    for (&solid, model) in PlatonicSolid::ALL.iter().zip(placements) {
      solids.push((upload_mesh(context, &mesh::platonic(solid, 1.))?, model));
    }

    let ground = upload_mesh(context, &mesh::quad(20.))?;
    let camera = FirstPersonCamera::new(Vector3::new(0., 1., 0.), Deg(70.).into());

    Ok(LocalExample {
      program,
      solids,
      ground,
      camera,
      viewport: Viewport::new(800, 600),
      looking: false,
      last_cursor: None,
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
        InputAction::Forward => self.camera.strafe(Strafe::Forward),
        InputAction::Backward => self.camera.strafe(Strafe::Backward),
        InputAction::Left => self.camera.strafe(Strafe::Left),
        InputAction::Right => self.camera.strafe(Strafe::Right),
        InputAction::Up => self.camera.strafe(Strafe::Up),
        InputAction::Down => self.camera.strafe(Strafe::Down),
        InputAction::PrimaryPressed => self.looking = true,
        InputAction::PrimaryReleased => self.looking = false,

        InputAction::CursorMoved { x, y } => {
          let [px, py] = self.last_cursor.unwrap_or([x, y]);
          self.last_cursor = Some([x, y]);

          if self.looking {
            self.camera.look(x - px, y - py);
          }
        }

        InputAction::VScroll { amount } => self.camera.zoom(amount),

        InputAction::Resized { width, height } => {
          self.viewport = Viewport::new(width, height);
        }

        _ => (),
      }
    }

    let camera = Camera::new(
      self.camera.view_matrix(),
      Projection::Perspective {
        fovy: self.camera.fovy(),
        near: Z_NEAR,
        far: Z_FAR,
      },
      self.viewport,
    );
    let projection = Mat44::new(camera.projection_matrix());
    let view = Mat44::new(camera.view);
    let to_light = view_direction(camera.view, Vector3::new(0.5, 1., 0.3));
    let ground_model = Matrix4::from_angle_x(Rad(-PI / 2.));
    let program = &mut self.program;

    // the ground with a flat color, then the solids with a hue per face
    let mut draws = vec![(&self.ground, ground_model, Vec3::new(0.35, 0.5, 0.3), 0.)];
    for (tess, model) in &self.solids {
      draws.push((tess, *model, Vec3::new(1., 1., 1.), 1.));
    }

    let render = context
      .new_pipeline_gate()
      .pipeline(
        &back_buffer,
        &PipelineState::default().set_clear_color([0.45, 0.6, 0.8, 1.]),
        |_, mut shd_gate| {
          shd_gate.shade(program, |mut iface, uni, mut rdr_gate| {
            iface.set(&uni.projection, projection);
            iface.set(&uni.view, view);
            iface.set(&uni.to_light, to_light);
            iface.set(&uni.shininess, 32.);

            draws.iter().try_for_each(|(tess, model, color, face_hue)| {
              iface.set(&uni.model, Mat44::new(*model));
              iface.set(&uni.color, *color);
              iface.set(&uni.face_hue, *face_hue);

              rdr_gate.render(&RenderState::default(), |mut tess_gate| {
                tess_gate.render(*tess)
              })
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
  use cgmath::{InnerSpace as _, Vector4};

  use super::*;

  #[test]
  fn ring_is_evenly_spaced() {
    let placements = ring_placements(5, 4.);
    let centers: Vec<_> = placements
      .iter()
      .map(|m| (*m * Vector4::new(0., 0., 0., 1.)).truncate())
      .collect();

    for c in &centers {
      let horizontal = Vector3::new(c.x, 0., c.z);
      assert!((horizontal.magnitude() - 4.).abs() < 1e-5);
    }

    let first = (centers[1] - centers[0]).magnitude();
    for pair in centers.windows(2) {
      assert!(((pair[1] - pair[0]).magnitude() - first).abs() < 1e-4);
    }
  }
}
