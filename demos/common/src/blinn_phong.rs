//! Blinn-Phong shading over the whole mesh gallery.
//!
//! The mesh turns slowly under a fixed light.
//!
//! Press the <main action> to show the next mesh.
//! Press the <auxiliary action> to switch between a uniform color and a hue per face.

use cgmath::{Deg, EuclideanSpace as _, Matrix4, Point3, Rad, Vector3};
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
  mesh::{self, PlatonicSolid},
  Camera, Mesh, Projection, Viewport,
};

use crate::{
  program::build_simple_program,
  shaders,
  shared::{upload_mesh, view_direction, MeshTess, PhongInterface, Semantics},
  DemoError, Example, InputAction, LoopFeedback, PlatformServices,
};

const LIGHT_DIRECTION: [f32; 3] = [1., 2., 1.5];
const ALBEDO: [f32; 3] = [0.8, 0.45, 0.2];

/// Every mesh generator, with a name and reasonable parameters.
pub fn gallery() -> Vec<(String, Mesh)> {
  let mut meshes: Vec<(String, Mesh)> = PlatonicSolid::ALL
    .iter()
    .map(|&solid| (solid.to_string(), mesh::platonic(solid, 1.)))
    .collect();

  let profile = [[0., -1.], [0.6, -0.9], [0.3, -0.2], [0.8, 0.4], [0.5, 0.9], [0., 1.]];

  meshes.extend(vec![
    ("torus".to_owned(), mesh::torus(48, 24, 0.7, 0.3)),
    ("trefoil knot".to_owned(), mesh::trefoil_knot(256, 24)),
    ("torus knot".to_owned(), mesh::torus_knot(24, 256, 3, 7)),
    ("sphere".to_owned(), mesh::sphere_slices(48, 24, 1.)),
    ("icosphere".to_owned(), mesh::icosphere(3, 1.)),
    ("cone".to_owned(), mesh::cone(48, 8, 1.5, 0.8)),
    ("tube".to_owned(), mesh::tube(48, 8, 1.5, 0.6)),
    (
      "surface of revolution".to_owned(),
      mesh::surface_of_revolution(&profile, 48),
    ),
  ]);

  meshes
}

// scale and center a mesh into the unit sphere
fn normalization(mesh: &Mesh) -> Matrix4<f32> {
  let (center, radius) = mesh.bounding_sphere();
  let scale = if radius > 0. { 1. / radius } else { 1. };

  Matrix4::from_scale(scale) * Matrix4::from_translation(-center.to_vec())
}

struct GalleryItem {
  name: String,
  tess: MeshTess,
  normalization: Matrix4<f32>,
}

pub struct LocalExample {
  program: Program<Semantics, (), PhongInterface>,
  items: Vec<GalleryItem>,
  current: usize,
  face_hue: bool,
  camera: Camera,
}

impl Example for LocalExample {
  fn bootstrap(
    _: &mut impl PlatformServices,
    context: &mut impl GraphicsContext<Backend = Backend>,
  ) -> Result<Self, DemoError> {
    let library = shaders::library();
    let program = build_simple_program(context, &library, "mesh-vs", "phong-fs")?;

    let mut items = Vec::new();
    for (name, mesh) in gallery() {
      log::debug!("{}: {} triangles", name, mesh.triangle_count());

      items.push(GalleryItem {
        normalization: normalization(&mesh),
        tess: upload_mesh(context, &mesh)?,
        name,
      });
    }

    log::info!("showing {}", items[0].name);

    let camera = Camera::look_at(
      Point3::new(0., 0.8, 3.2),
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
      items,
      current: 0,
      face_hue: false,
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

        InputAction::MainToggle => {
          self.current = (self.current + 1) % self.items.len();
          log::info!("showing {}", self.items[self.current].name);
        }

        InputAction::AuxiliaryToggle => {
          self.face_hue = !self.face_hue;
        }

        InputAction::Resized { width, height } => {
          self.camera.set_viewport(Viewport::new(width, height));
        }

        _ => (),
      }
    }

    let item = &self.items[self.current];
    let model = Matrix4::from_angle_y(Rad(time * 0.4)) * item.normalization;
    let projection = Mat44::new(self.camera.projection_matrix());
    let view = Mat44::new(self.camera.view);
    let to_light = view_direction(self.camera.view, LIGHT_DIRECTION.into());
    let face_hue = if self.face_hue { 1. } else { 0. };
    let tess = &item.tess;
    let program = &mut self.program;

    let render = context
      .new_pipeline_gate()
      .pipeline(
        &back_buffer,
        &PipelineState::default().set_clear_color([0.05, 0.05, 0.08, 1.]),
        |_, mut shd_gate| {
          shd_gate.shade(program, |mut iface, uni, mut rdr_gate| {
            iface.set(&uni.projection, projection);
            iface.set(&uni.view, view);
            iface.set(&uni.model, Mat44::new(model));
            iface.set(&uni.to_light, to_light);
            iface.set(&uni.color, Vec3::new(ALBEDO[0], ALBEDO[1], ALBEDO[2]));
            iface.set(&uni.face_hue, face_hue);
            iface.set(&uni.shininess, 48.);

            rdr_gate.render(&RenderState::default(), |mut tess_gate| {
              tess_gate.render(tess)
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
  fn gallery_meshes_are_valid_and_distinct() {
    let meshes = gallery();

    assert_eq!(meshes.len(), 13);

    for (name, mesh) in &meshes {
      assert!(mesh.validate().is_ok(), "{} is invalid", name);
      assert!(mesh.triangle_count() > 0, "{} is empty", name);
    }

    let mut names: Vec<_> = meshes.iter().map(|(name, _)| name.as_str()).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), meshes.len());
  }

  #[test]
  fn normalization_fits_the_unit_sphere() {
    let mesh = mesh::torus(32, 16, 2., 0.5);
    let m = normalization(&mesh);

    for v in &mesh.vertices {
      let p = m * Point3::from(v.position).to_homogeneous();
      let d = (p.x * p.x + p.y * p.y + p.z * p.z).sqrt();
      assert!(d <= 1. + 1e-4, "{} out of the unit sphere", d);
    }
  }
}
