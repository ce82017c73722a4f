//! Mouse navigation: orbit, pan and zoom around the point under the cursor.
//!
//! The scene is rendered into an offscreen [`GBuffer`] whose second target holds the window depth,
//! then copied to the screen. When a drag starts, the depth under the cursor is read back so that
//! the world point under the cursor stays under it while panning, and is used as the pivot while
//! orbiting. Clicking the background falls back to the depth of the scene center. The world is
//! z-up.
//!
//! - Drag with the primary button to orbit.
//! - Drag with the secondary button to pan.
//! - Scroll to move along the line of sight.
//!
//! Press the <main action> to reset the view.
//! Press the <auxiliary action> to switch between free orbit and turntable rotation.

use cgmath::{Deg, EuclideanSpace as _, Matrix4, Point2, Point3, Rad, Vector3};
use luminance::UniformInterface;
use luminance_front::{
  context::GraphicsContext,
  framebuffer::Framebuffer,
  pipeline::{PipelineError, PipelineState, TextureBinding},
  pixel::NormUnsigned,
  render_state::RenderState,
  shader::{
    types::{Mat44, Vec3},
    Program, Uniform,
  },
  tess::Tess,
  texture::Dim2,
  Backend,
};
use ogl_utility::{
  mesh::{self, PlatonicSolid},
  Camera, NavigationController, NavigationSettings, OrbitMode, Projection, Viewport,
};

use crate::{
  framebuffers::GBuffer,
  program::build_simple_program,
  shaders,
  shared::{fullscreen_quad, upload_mesh, view_direction, MeshTess, PhongInterface, Semantics},
  DemoError, Example, InputAction, LoopFeedback, PlatformServices,
};

const HOME_EYE: [f32; 3] = [7., -9., 6.];

#[derive(UniformInterface)]
struct CopyInterface {
  #[uniform(unbound, name = "u_source")]
  source: Uniform<TextureBinding<Dim2, NormUnsigned>>,
}

/// Solids standing on a ground plate, with a hue per solid.
fn scene() -> Vec<(mesh::Mesh, Matrix4<f32>)> {
  let mut scene = vec![(mesh::quad(12.), Matrix4::from_scale(1.))];

  for (i, &solid) in PlatonicSolid::ALL.iter().enumerate() {
    let x = (i as f32 - 2.) * 2.2;
    let model = Matrix4::from_translation(Vector3::new(x, 0., 0.8)) * Matrix4::from_scale(0.8);
    scene.push((mesh::platonic(solid, 1.), model));
  }

  let torus = Matrix4::from_translation(Vector3::new(0., 3.5, 0.5))
    * Matrix4::from_angle_x(Rad(std::f32::consts::FRAC_PI_2));
  scene.push((mesh::torus(48, 24, 1.4, 0.4), torus));

  scene
}

fn home_camera(viewport: Viewport) -> Camera {
  Camera::look_at(
    Point3::from(HOME_EYE),
    Point3::origin(),
    Vector3::unit_z(),
    Projection::Perspective {
      fovy: Deg(50.).into(),
      near: 0.1,
      far: 100.,
    },
    viewport,
  )
}

pub struct LocalExample {
  scene_program: Program<Semantics, (), PhongInterface>,
  copy_program: Program<(), (), CopyInterface>,
  scene: Vec<(MeshTess, Matrix4<f32>)>,
  quad: Tess<()>,
  gbuffer: GBuffer,
  camera: Camera,
  controller: NavigationController,
  orbit_mode: OrbitMode,
  // window coordinates, bottom-left origin
  cursor: Point2<f32>,
}

impl LocalExample {
  // depth under the cursor, falling back to the scene center over the background
  fn depth_under_cursor(&mut self) -> f32 {
    let depth = match self.gbuffer.read_normal_depth() {
      Ok(texels) => texels.depth_at(self.cursor.x, self.cursor.y),
      Err(e) => {
        log::error!("{}", e);
        1.
      }
    };

    self.camera.depth_or_fallback(depth, Point3::origin())
  }
}

impl Example for LocalExample {
  fn bootstrap(
    _: &mut impl PlatformServices,
    context: &mut impl GraphicsContext<Backend = Backend>,
  ) -> Result<Self, DemoError> {
    let library = shaders::library();
    let scene_program = build_simple_program(context, &library, "mesh-vs", "gbuffer-fs")?;
    let copy_program = build_simple_program(context, &library, "fullscreen-vs", "copy-fs")?;

    let mut meshes = Vec::new();
    for (mesh, model) in scene() {
      meshes.push((upload_mesh(context, &mesh)?, model));
    }

    let viewport = Viewport::new(800, 600);
    let gbuffer = GBuffer::new(context, [800, 600])?;

    Ok(LocalExample {
      scene_program,
      copy_program,
      scene: meshes,
      quad: fullscreen_quad(context)?,
      gbuffer,
      camera: home_camera(viewport),
      controller: NavigationController::new(NavigationSettings::default()),
      orbit_mode: OrbitMode::Orbit,
      cursor: Point2::new(0., 0.),
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
          self.camera = home_camera(self.camera.viewport);
          self.controller.end_orbit();
          self.controller.end_pan();
        }

        InputAction::AuxiliaryToggle => {
          self.orbit_mode = match self.orbit_mode {
            OrbitMode::Rotate => OrbitMode::Orbit,
            _ => OrbitMode::Rotate,
          };
          log::info!("rotation mode: {:?}", self.orbit_mode);
        }

        InputAction::PrimaryPressed => {
          let depth = self.depth_under_cursor();
          let pivot = self
            .camera
            .unproject(Vector3::new(self.cursor.x, self.cursor.y, depth));

          self
            .controller
            .start_orbit(self.cursor, depth, pivot, self.orbit_mode);
        }

        InputAction::PrimaryReleased => self.controller.end_orbit(),

        InputAction::SecondaryPressed => {
          let depth = self.depth_under_cursor();
          self.controller.start_pan(self.cursor, depth);
        }

        InputAction::SecondaryReleased => self.controller.end_pan(),

        InputAction::CursorMoved { x, y } => {
          self.cursor = Point2::new(x, self.camera.viewport.flip_y(y));

          if let Some(view) = self.controller.move_cursor_to(&self.camera, self.cursor) {
            self.camera.view = view;
          }
        }

        InputAction::VScroll { amount } => {
          self.camera.view = self.controller.scroll(&self.camera, self.cursor, amount);
        }

        InputAction::Resized { width, height } => {
          self.camera.set_viewport(Viewport::new(width, height));

          if let Err(e) = self.gbuffer.resize(context, [width, height]) {
            log::error!("{}", e);
            return LoopFeedback::Exit;
          }
        }

        _ => (),
      }
    }

    let projection = Mat44::new(self.camera.projection_matrix());
    let view = Mat44::new(self.camera.view);
    let to_light = view_direction(self.camera.view, Vector3::new(0.4, -0.6, 1.));
    let scene_len = self.scene.len() as f32;
    let scene_program = &mut self.scene_program;
    let copy_program = &mut self.copy_program;
    let scene = &self.scene;
    let quad = &self.quad;
    let gbuffer = &mut self.gbuffer;
    let mut pipeline_gate = context.new_pipeline_gate();

    let render = pipeline_gate
      .pipeline(
        gbuffer.framebuffer(),
        &PipelineState::default().set_clear_color([0.2, 0.22, 0.25, 1.]),
        |_, mut shd_gate| {
          shd_gate.shade(scene_program, |mut iface, uni, mut rdr_gate| {
            iface.set(&uni.projection, projection);
            iface.set(&uni.view, view);
            iface.set(&uni.to_light, to_light);
            iface.set(&uni.color, Vec3::new(0.7, 0.7, 0.7));

            scene
              .iter()
              .enumerate()
              .try_for_each(|(i, (tess, model))| {
                // the ground keeps the flat color
                let hue = if i == 0 { 0. } else { 1. };

                iface.set(&uni.model, Mat44::new(*model));
                iface.set(&uni.face_hue, hue);
                iface.set(&uni.shininess, 16. + 48. * i as f32 / scene_len);

                rdr_gate.render(&RenderState::default(), |mut tess_gate| {
                  tess_gate.render(tess)
                })
              })
          })
        },
      )
      .assume();

    if render.is_err() {
      return LoopFeedback::Exit;
    }

    let render = pipeline_gate
      .pipeline(
        &back_buffer,
        &PipelineState::default(),
        |pipeline, mut shd_gate| -> Result<(), PipelineError> {
          let (color, _) = gbuffer.framebuffer_mut().color_slot();
          let color = pipeline.bind_texture(color)?;

          shd_gate.shade(copy_program, |mut iface, uni, mut rdr_gate| {
            iface.set(&uni.source, color.binding());

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
  fn home_view_looks_at_the_scene_center() {
    let camera = home_camera(Viewport::new(800, 600));
    let center = camera.project(Point3::origin());

    assert!((center.x - 400.).abs() < 1e-2);
    assert!((center.y - 300.).abs() < 1e-2);
    assert!(center.z > 0. && center.z < 1.);
  }

  #[test]
  fn scene_meshes_are_valid() {
    let scene = scene();

    assert_eq!(scene.len(), 7);
    for (mesh, _) in &scene {
      assert!(mesh.validate().is_ok());
    }
  }
}
