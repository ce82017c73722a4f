//! Geometry instancing, with per-instance colors read from a uniform block.
//!
//! A single cube is uploaded along with a lattice of per-instance offsets, then drawn once for the
//! whole lattice. The color of every instance comes from a shader data block of 256 colors indexed
//! by the instance ID.
//!
//! Press the <main action> to pick new random colors.
//! Use the up and down actions to grow and shrink the lattice.

use std::f32::consts::PI;

use cgmath::{Deg, EuclideanSpace as _, Matrix4, Point3, Rad, Vector3};
use luminance::UniformInterface;
use luminance_front::{
  context::GraphicsContext,
  framebuffer::Framebuffer,
  pipeline::{PipelineError, PipelineState, ShaderDataBinding},
  render_state::RenderState,
  shader::{
    types::{Mat44, Vec3, Vec4},
    Program, ShaderData, Uniform,
  },
  tess::{Mode, Tess},
  texture::Dim2,
  Backend,
};
use ogl_utility::{color::hue_to_rgb, mesh, Camera, Projection, Viewport};
use rand::Rng;

use crate::{
  program::build_simple_program,
  shaders,
  shared::{view_direction, Instance, MeshVertex, Semantics, VertexInstanceOffset},
  DemoError, Example, GpuResultExt as _, InputAction, LoopFeedback, PlatformServices,
};

/// Number of colors in the `Colors` block.
pub const COLOR_COUNT: usize = 256;
const MAX_SIDE: usize = 12;
const SPACING: f32 = 0.6;

type InstancedTess = Tess<MeshVertex, u32, Instance>;

#[derive(UniformInterface)]
struct InstancingInterface {
  #[uniform(unbound, name = "u_projection")]
  projection: Uniform<Mat44<f32>>,
  #[uniform(unbound, name = "u_view")]
  view: Uniform<Mat44<f32>>,
  #[uniform(unbound, name = "u_model")]
  model: Uniform<Mat44<f32>>,
  #[uniform(unbound, name = "u_to_light")]
  to_light: Uniform<Vec3<f32>>,
  #[uniform(name = "Colors")]
  colors: Uniform<ShaderDataBinding<Vec4<f32>>>,
}

/// Offsets of a `side³` lattice centered on the origin, `spacing` apart.
pub fn lattice(side: usize, spacing: f32) -> Vec<[f32; 3]> {
  let half = (side.max(1) - 1) as f32 * 0.5;
  let coord = |i: usize| (i as f32 - half) * spacing;

  (0..side)
    .flat_map(|x| {
      (0..side).flat_map(move |y| (0..side).map(move |z| [coord(x), coord(y), coord(z)]))
    })
    .collect()
}

/// `count` opaque colors of random hues.
pub fn random_colors(count: usize, rng: &mut impl Rng) -> Vec<[f32; 4]> {
  (0..count)
    .map(|_| {
      let [r, g, b] = hue_to_rgb(rng.gen_range(0. ..1.));
      [r, g, b, 1.]
    })
    .collect()
}

fn color_uniform([r, g, b, a]: [f32; 4]) -> Vec4<f32> {
  Vec4::new(r, g, b, a)
}

fn upload_lattice(
  context: &mut impl GraphicsContext<Backend = Backend>,
  cube: &mesh::Mesh,
  side: usize,
) -> Result<InstancedTess, DemoError> {
  let vertices: Vec<MeshVertex> = cube.vertices.iter().map(MeshVertex::from).collect();
  let instances: Vec<Instance> = lattice(side, SPACING)
    .into_iter()
    .map(|offset| Instance::new(VertexInstanceOffset::new(offset)))
    .collect();

  context
    .new_tess()
    .set_vertices(&vertices[..])
    .set_indices(&cube.indices[..])
    .set_instances(&instances[..])
    .set_mode(Mode::Triangle)
    .build()
    .gpu("instanced cubes")
}

fn camera(side: usize, viewport: Viewport) -> Camera {
  // keep the whole lattice in view
  let distance = 2. + side as f32 * SPACING * 1.8;

  Camera::look_at(
    Point3::new(distance, -distance, distance * 0.8),
    Point3::origin(),
    Vector3::unit_z(),
    Projection::Perspective {
      fovy: Deg(45.).into(),
      near: 0.1,
      far: distance * 4.,
    },
    viewport,
  )
}

pub struct LocalExample {
  program: Program<Semantics, (), InstancingInterface>,
  cube: mesh::Mesh,
  cubes: InstancedTess,
  colors: ShaderData<Vec4<f32>>,
  side: usize,
  camera: Camera,
}

impl Example for LocalExample {
  fn bootstrap(
    _: &mut impl PlatformServices,
    context: &mut impl GraphicsContext<Backend = Backend>,
  ) -> Result<Self, DemoError> {
    let library = shaders::library();
    let program = build_simple_program(context, &library, "instancing-vs", "instancing-fs")?;

    let side = 6;
    let cube = mesh::hexahedron(1.);
    cube.validate()?;
    let cubes = upload_lattice(context, &cube, side)?;

    let colors = random_colors(COLOR_COUNT, &mut rand::thread_rng())
      .into_iter()
      .map(color_uniform);
    let colors = context.new_shader_data(colors).gpu("color block")?;

    Ok(LocalExample {
      program,
      cube,
      cubes,
      colors,
      side,
      camera: camera(side, Viewport::new(800, 600)),
    })
  }

  fn render_frame(
    mut self,
    time: f32,
    back_buffer: Framebuffer<Dim2, (), ()>,
    actions: impl Iterator<Item = InputAction>,
    context: &mut impl GraphicsContext<Backend = Backend>,
  ) -> LoopFeedback<Self> {
    let mut side = self.side;

    for action in actions {
      match action {
        InputAction::Quit => return LoopFeedback::Exit,

        InputAction::MainToggle => {
          let colors = random_colors(COLOR_COUNT, &mut rand::thread_rng());

          if let Err(e) = self.colors.replace(colors.into_iter().map(color_uniform)) {
            log::error!("cannot update colors: {}", e);
          }
        }

        InputAction::Up => side = (side + 1).min(MAX_SIDE),

        InputAction::Down => side = side.saturating_sub(1).max(1),

        InputAction::Resized { width, height } => {
          self.camera.set_viewport(Viewport::new(width, height));
        }

        _ => (),
      }
    }

    if side != self.side {
      match upload_lattice(context, &self.cube, side) {
        Ok(cubes) => {
          log::info!("{} instances", side * side * side);
          self.cubes = cubes;
          self.side = side;
          self.camera = camera(side, self.camera.viewport);
        }

        Err(e) => {
          log::error!("{}", e);
          return LoopFeedback::Exit;
        }
      }
    }

    let model = Matrix4::from_angle_z(Rad(time * 0.2)) * Matrix4::from_angle_x(Rad(PI / 8.));
    let projection = Mat44::new(self.camera.projection_matrix());
    let view = Mat44::new(self.camera.view);
    let to_light = view_direction(self.camera.view, Vector3::new(0.3, -0.5, 1.));
    let program = &mut self.program;
    let cubes = &self.cubes;
    let colors = &mut self.colors;

    let render = context
      .new_pipeline_gate()
      .pipeline(
        &back_buffer,
        &PipelineState::default().set_clear_color([0.12, 0.12, 0.14, 1.]),
        |pipeline, mut shd_gate| -> Result<(), PipelineError> {
          let colors = pipeline.bind_shader_data(colors)?;

          shd_gate.shade(program, |mut iface, uni, mut rdr_gate| {
            iface.set(&uni.projection, projection);
            iface.set(&uni.view, view);
            iface.set(&uni.model, Mat44::new(model));
            iface.set(&uni.to_light, to_light);
            iface.set(&uni.colors, colors.binding());

            rdr_gate.render(&RenderState::default(), |mut tess_gate| {
              tess_gate.render(cubes)
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
  use rand::{rngs::StdRng, SeedableRng as _};

  use super::*;

  #[test]
  fn lattice_is_centered() {
    let offsets = lattice(3, 2.);
    assert_eq!(offsets.len(), 27);

    let sum = offsets
      .iter()
      .fold([0.; 3], |s, o| [s[0] + o[0], s[1] + o[1], s[2] + o[2]]);
    assert_eq!(sum, [0., 0., 0.]);

    assert_eq!(offsets[0], [-2., -2., -2.]);
    assert_eq!(offsets[26], [2., 2., 2.]);
  }

  #[test]
  fn single_instance_sits_at_the_origin() {
    assert_eq!(lattice(1, 5.), vec![[0., 0., 0.]]);
    assert!(lattice(0, 1.).is_empty());
  }

  #[test]
  fn random_colors_are_opaque_and_saturated() {
    let mut rng = StdRng::seed_from_u64(7);
    let colors = random_colors(COLOR_COUNT, &mut rng);

    assert_eq!(colors.len(), COLOR_COUNT);
    for [r, g, b, a] in colors {
      assert_eq!(a, 1.);
      // fully saturated hues have a channel at 1 and one at 0
      let max = r.max(g).max(b);
      let min = r.min(g).min(b);
      assert!(max > 0.99 && min < 0.01, "{:?}", [r, g, b]);
    }
  }
}
