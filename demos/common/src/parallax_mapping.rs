//! Parallax mapping of a procedural brick wall.
//!
//! The wall is a single quad; the relief only lives in a height map. Normals are derived from the
//! height map in the fragment shader, then the texture coordinates are shifted along the view
//! direction, either by a single offset or by marching through depth layers (parallax occlusion
//! mapping).
//!
//! Press the <main action> to cycle through normal mapping, offset parallax and occlusion parallax.
//! Use the up and down actions to change the relief depth.

use cgmath::{Deg, EuclideanSpace as _, Matrix4, Point3, Rad, Vector3};
use luminance::UniformInterface;
use luminance_front::{
  context::GraphicsContext,
  framebuffer::Framebuffer,
  pipeline::{PipelineError, PipelineState, TextureBinding},
  pixel::{NormR8UI, NormUnsigned},
  render_state::RenderState,
  shader::{
    types::{Mat44, Vec3},
    Program, Uniform,
  },
  texture::{Dim2, Sampler, TexelUpload, Texture, Wrap},
  Backend,
};
use ogl_utility::{mesh, Camera, Projection, Viewport};

use crate::{
  program::build_simple_program,
  shaders,
  shared::{upload_mesh, vec3_uniform, MeshTess, Semantics},
  DemoError, Example, GpuResultExt as _, InputAction, LoopFeedback, PlatformServices,
};

const HEIGHT_MAP_SIZE: u32 = 512;
const BRICK_ROWS: f32 = 8.;
const BRICK_COLUMNS: f32 = 4.;
// bevel width, as a fraction of a brick
const BEVEL: f32 = 0.08;
const HEIGHT_SCALE_STEP: f32 = 0.01;
const MAX_HEIGHT_SCALE: f32 = 0.2;

/// How texture coordinates are displaced.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParallaxMode {
  /// Lighting follows the relief, texture coordinates stay put.
  NormalOnly,
  /// One offset along the view direction, proportional to the depth.
  Offset,
  /// March along the view ray through depth layers until it goes below the surface.
  Occlusion,
}

impl ParallaxMode {
  fn next(self) -> Self {
    match self {
      ParallaxMode::NormalOnly => ParallaxMode::Offset,
      ParallaxMode::Offset => ParallaxMode::Occlusion,
      ParallaxMode::Occlusion => ParallaxMode::NormalOnly,
    }
  }

  // value of the u_mode uniform
  fn uniform(self) -> f32 {
    match self {
      ParallaxMode::NormalOnly => 0.,
      ParallaxMode::Offset => 1.,
      ParallaxMode::Occlusion => 2.,
    }
  }
}

/// Height map of a brick wall, `size × size` texels, top row first.
///
/// Bricks are at full height (255); the mortar between them is at 0, with a linear bevel.
/// Every other row is shifted by half a brick.
pub fn brick_height_map(size: u32) -> Vec<u8> {
  let n = size.max(1);
  let mut texels = Vec::with_capacity((n * n) as usize);

  for y in 0..n {
    let v = (y as f32 + 0.5) / n as f32 * BRICK_ROWS;
    let row = v.floor();
    let fy = v.fract();
    let shift = if row as u32 % 2 == 1 { 0.5 } else { 0. };

    for x in 0..n {
      let u = (x as f32 + 0.5) / n as f32 * BRICK_COLUMNS + shift;
      let fx = u.fract();

      // bricks are twice as wide as tall: measure the distance to the mortar in row units
      let to_edge = (fx.min(1. - fx) * 2.).min(fy.min(1. - fy));
      let height = (to_edge / BEVEL).min(1.);

      texels.push((height * 255.).round() as u8);
    }
  }

  texels
}

#[derive(UniformInterface)]
struct ParallaxInterface {
  #[uniform(unbound, name = "u_projection")]
  projection: Uniform<Mat44<f32>>,
  #[uniform(unbound, name = "u_view")]
  view: Uniform<Mat44<f32>>,
  #[uniform(unbound, name = "u_model")]
  model: Uniform<Mat44<f32>>,
  #[uniform(unbound, name = "u_eye")]
  eye: Uniform<Vec3<f32>>,
  #[uniform(unbound, name = "u_to_light")]
  to_light: Uniform<Vec3<f32>>,
  #[uniform(unbound, name = "u_height_map")]
  height_map: Uniform<TextureBinding<Dim2, NormUnsigned>>,
  #[uniform(unbound, name = "u_height_scale")]
  height_scale: Uniform<f32>,
  #[uniform(unbound, name = "u_mode")]
  mode: Uniform<f32>,
}

pub struct LocalExample {
  program: Program<Semantics, (), ParallaxInterface>,
  wall: MeshTess,
  height_map: Texture<Dim2, NormR8UI>,
  camera: Camera,
  mode: ParallaxMode,
  height_scale: f32,
}

impl Example for LocalExample {
  fn bootstrap(
    _: &mut impl PlatformServices,
    context: &mut impl GraphicsContext<Backend = Backend>,
  ) -> Result<Self, DemoError> {
    let library = shaders::library();
    let program = build_simple_program(context, &library, "parallax-vs", "parallax-fs")?;
    let wall = upload_mesh(context, &mesh::quad(4.))?;

    let height_map = context
      .new_texture_raw(
        [HEIGHT_MAP_SIZE, HEIGHT_MAP_SIZE],
        Sampler {
          wrap_s: Wrap::Repeat,
          wrap_t: Wrap::Repeat,
          ..Sampler::default()
        },
        TexelUpload::base_level(&brick_height_map(HEIGHT_MAP_SIZE), 0),
      )
      .gpu("height map")?;

    let camera = Camera::look_at(
      Point3::new(0., -2.5, 3.),
      Point3::origin(),
      Vector3::unit_z(),
      Projection::Perspective {
        fovy: Deg(50.).into(),
        near: 0.1,
        far: 20.,
      },
      Viewport::new(800, 600),
    );

    Ok(LocalExample {
      program,
      wall,
      height_map,
      camera,
      mode: ParallaxMode::Occlusion,
      height_scale: 0.06,
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
          self.mode = self.mode.next();
          log::info!("parallax mode: {:?}", self.mode);
        }

        InputAction::Up => {
          self.height_scale = (self.height_scale + HEIGHT_SCALE_STEP).min(MAX_HEIGHT_SCALE);
          log::info!("height scale: {:.2}", self.height_scale);
        }

        InputAction::Down => {
          self.height_scale = (self.height_scale - HEIGHT_SCALE_STEP).max(0.);
          log::info!("height scale: {:.2}", self.height_scale);
        }

        InputAction::Resized { width, height } => {
          self.camera.set_viewport(Viewport::new(width, height));
        }

        _ => (),
      }
    }

    // a light grazing the wall makes the relief obvious
    let angle = time * 0.5;
    let to_light = Vec3::new(angle.cos(), angle.sin(), 0.6);
    let model = Matrix4::from_angle_z(Rad(time * 0.05));
    let eye = vec3_uniform(self.camera.eye().to_vec());
    let projection = Mat44::new(self.camera.projection_matrix());
    let view = Mat44::new(self.camera.view);
    let height_scale = self.height_scale;
    let mode = self.mode.uniform();
    let program = &mut self.program;
    let wall = &self.wall;
    let height_map = &mut self.height_map;

    let render = context
      .new_pipeline_gate()
      .pipeline(
        &back_buffer,
        &PipelineState::default().set_clear_color([0.05, 0.05, 0.05, 1.]),
        |pipeline, mut shd_gate| -> Result<(), PipelineError> {
          let height_map = pipeline.bind_texture(height_map)?;

          shd_gate.shade(program, |mut iface, uni, mut rdr_gate| {
            iface.set(&uni.projection, projection);
            iface.set(&uni.view, view);
            iface.set(&uni.model, Mat44::new(model));
            iface.set(&uni.eye, eye);
            iface.set(&uni.to_light, to_light);
            iface.set(&uni.height_map, height_map.binding());
            iface.set(&uni.height_scale, height_scale);
            iface.set(&uni.mode, mode);

            rdr_gate.render(&RenderState::default(), |mut tess_gate| {
              tess_gate.render(wall)
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
  fn height_map_covers_the_texture() {
    assert_eq!(brick_height_map(64).len(), 64 * 64);
    assert_eq!(brick_height_map(0).len(), 1);
  }

  #[test]
  fn bricks_stand_above_the_mortar() {
    let size = 256;
    let map = brick_height_map(size);
    let at = |x: u32, y: u32| map[(y * size + x) as usize];

    // first row, first brick: center at full height, left edge down the bevel
    assert_eq!(at(32, 16), 255);
    assert!(at(0, 16) < 64);
    // row boundary
    assert!(at(32, 0) < 64);
    // second row is shifted by half a brick: its mortar sits under the first row's brick centers
    assert!(at(32, 48) < 64);
    assert_eq!(at(0, 48), 255);
  }

  #[test]
  fn modes_cycle() {
    let mut mode = ParallaxMode::NormalOnly;
    let mut uniforms = Vec::new();

    for _ in 0..3 {
      uniforms.push(mode.uniform());
      mode = mode.next();
    }

    assert_eq!(mode, ParallaxMode::NormalOnly);
    assert_eq!(uniforms, vec![0., 1., 2.]);
  }
}
