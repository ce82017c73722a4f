//! Geometry shader expanding points into spinning quads.
//!
//! Only points are uploaded: a position, a size and a color per quad. The geometry stage emits a
//! rotated quad, as a strip of two triangles, around every point.
//!
//! Press the <main action> to pause and resume the animation.
//! Use the up and down actions to change the number of points.

use cgmath::{Deg, EuclideanSpace as _, Point3, Vector3};
use luminance::UniformInterface;
use luminance_front::{
  context::GraphicsContext,
  framebuffer::Framebuffer,
  pipeline::PipelineState,
  render_state::RenderState,
  shader::{types::Mat44, Program, Uniform},
  tess::{Mode, Tess},
  texture::Dim2,
  Backend,
};
use ogl_utility::{color::hue_to_rgb, shader_source::StageNames, Camera, Projection, Viewport};

use crate::{
  program::build_program,
  shaders,
  shared::{QuadPoint, Semantics, VertexColor, VertexPosition, VertexSize},
  DemoError, Example, GpuResultExt as _, InputAction, LoopFeedback, PlatformServices,
};

const MIN_SIDE: usize = 2;
const MAX_SIDE: usize = 64;
const EXTENT: f32 = 8.;

#[derive(UniformInterface)]
struct GeometryInterface {
  #[uniform(unbound, name = "u_projection")]
  projection: Uniform<Mat44<f32>>,
  #[uniform(unbound, name = "u_view")]
  view: Uniform<Mat44<f32>>,
  #[uniform(unbound, name = "u_time")]
  time: Uniform<f32>,
}

/// Centers of a `side × side` grid centered on the origin, and the size of its cells.
///
/// The grid spans `extent` on both axes whatever the number of cells.
pub fn grid_layout(side: usize, extent: f32) -> (Vec<[f32; 2]>, f32) {
  let side = side.max(1);
  let step = extent / side as f32;
  let origin = -extent * 0.5 + step * 0.5;

  let centers = (0..side * side)
    .map(|i| {
      let (x, y) = ((i % side) as f32, (i / side) as f32);
      [origin + x * step, origin + y * step]
    })
    .collect();

  (centers, step)
}

// one point per grid cell in the z = 0 plane, hue going around the color wheel along the grid
fn grid_points(side: usize, extent: f32) -> Vec<QuadPoint> {
  let (centers, step) = grid_layout(side, extent);
  let count = centers.len() as f32;

  centers
    .iter()
    .enumerate()
    .map(|(i, &[x, y])| {
      QuadPoint::new(
        VertexPosition::new([x, y, 0.]),
        VertexSize::new(step * 0.8),
        VertexColor::new(hue_to_rgb(i as f32 / count)),
      )
    })
    .collect()
}

fn upload_points(
  context: &mut impl GraphicsContext<Backend = Backend>,
  side: usize,
) -> Result<Tess<QuadPoint>, DemoError> {
  let points = grid_points(side, EXTENT);

  context
    .new_tess()
    .set_vertices(&points[..])
    .set_mode(Mode::Point)
    .build()
    .gpu("point grid")
}

pub struct LocalExample {
  program: Program<Semantics, (), GeometryInterface>,
  points: Tess<QuadPoint>,
  side: usize,
  camera: Camera,
  // animation time, only moving when not paused
  clock: f32,
  last_time: Option<f32>,
  paused: bool,
}

impl Example for LocalExample {
  fn bootstrap(
    _: &mut impl PlatformServices,
    context: &mut impl GraphicsContext<Backend = Backend>,
  ) -> Result<Self, DemoError> {
    let library = shaders::library();
    let stages = StageNames::new("geometry-vs", "geometry-fs").geometry("geometry-gs");
    let program = build_program(context, &library, &stages)?;
    let side = 16;
    let points = upload_points(context, side)?;

    let camera = Camera::look_at(
      Point3::new(0., -6., 9.),
      Point3::origin(),
      Vector3::unit_z(),
      Projection::Perspective {
        fovy: Deg(50.).into(),
        near: 0.1,
        far: 50.,
      },
      Viewport::new(800, 600),
    );

    Ok(LocalExample {
      program,
      points,
      side,
      camera,
      clock: 0.,
      last_time: None,
      paused: false,
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
          self.paused = !self.paused;
          log::info!("paused: {}", self.paused);
        }

        InputAction::Up => side = (side * 2).min(MAX_SIDE),

        InputAction::Down => side = (side / 2).max(MIN_SIDE),

        InputAction::Resized { width, height } => {
          self.camera.set_viewport(Viewport::new(width, height));
        }

        _ => (),
      }
    }

    if side != self.side {
      match upload_points(context, side) {
        Ok(points) => {
          log::info!("{} points", side * side);
          self.points = points;
          self.side = side;
        }

        Err(e) => {
          log::error!("{}", e);
          return LoopFeedback::Exit;
        }
      }
    }

    if let Some(last_time) = self.last_time {
      if !self.paused {
        self.clock += time - last_time;
      }
    }
    self.last_time = Some(time);

    let projection = Mat44::new(self.camera.projection_matrix());
    let view = Mat44::new(self.camera.view);
    let clock = self.clock;
    let program = &mut self.program;
    let points = &self.points;

    let render = context
      .new_pipeline_gate()
      .pipeline(
        &back_buffer,
        &PipelineState::default().set_clear_color([0.08, 0.08, 0.1, 1.]),
        |_, mut shd_gate| {
          shd_gate.shade(program, |mut iface, uni, mut rdr_gate| {
            iface.set(&uni.projection, projection);
            iface.set(&uni.view, view);
            iface.set(&uni.time, clock);

            rdr_gate.render(&RenderState::default(), |mut tess_gate| {
              tess_gate.render(points)
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
  fn grid_is_centered() {
    let (centers, step) = grid_layout(4, 8.);
    assert_eq!(centers.len(), 16);
    assert_eq!(step, 2.);

    let (sx, sy) = centers
      .iter()
      .fold((0., 0.), |(sx, sy), c| (sx + c[0], sy + c[1]));
    assert!(f32::abs(sx) < 1e-4 && f32::abs(sy) < 1e-4);

    // corners are half a cell away from the border
    assert_eq!(centers[0], [-3., -3.]);
    assert_eq!(centers[15], [3., 3.]);
  }

  #[test]
  fn cells_shrink_with_density() {
    assert!(grid_layout(8, 8.).1 < grid_layout(2, 8.).1);
    assert_eq!(grid_points(5, 8.).len(), 25);
    assert_eq!(grid_layout(0, 8.).0.len(), 1);
  }
}
