//! Rotate a torus knot by dragging it.
//!
//! Three circles around the model axes show its orientation. With auto-spin on, releasing the
//! drag while moving throws the model, which keeps turning at the speed of the drag.
//!
//! Press the <main action> to toggle auto-spin.
//! Press the <auxiliary action> to reset the rotation.

use cgmath::{Deg, Matrix4, Point2, Point3, Vector3};
use luminance_front::{
  context::GraphicsContext,
  framebuffer::Framebuffer,
  pipeline::{PipelineError, PipelineState},
  render_state::RenderState,
  shader::{
    types::{Mat44, Vec3},
    Program,
  },
  texture::Dim2,
  Backend,
};
use ogl_utility::{mesh, trackball::DragRotation, Camera, Projection, Viewport};

use crate::{
  program::build_simple_program,
  shaders,
  shared::{upload_mesh, view_direction, MeshInterface, MeshTess, PhongInterface, Semantics},
  DemoError, Example, InputAction, LoopFeedback, PlatformServices,
};

pub struct LocalExample {
  phong: Program<Semantics, (), PhongInterface>,
  lines: Program<Semantics, (), MeshInterface>,
  knot: MeshTess,
  circles: MeshTess,
  camera: Camera,
  rotation: DragRotation,
  // bottom-left origin
  cursor: Point2<f32>,
}

impl Example for LocalExample {
  fn bootstrap(
    _: &mut impl PlatformServices,
    context: &mut impl GraphicsContext<Backend = Backend>,
  ) -> Result<Self, DemoError> {
    let library = shaders::library();
    let phong = build_simple_program(context, &library, "mesh-vs", "phong-fs")?;
    let lines = build_simple_program(context, &library, "mesh-vs", "lines-fs")?;

    let knot = upload_mesh(context, &mesh::torus_knot(16, 192, 2, 3))?;
    let circles = upload_mesh(context, &mesh::axis_circles(96))?;

    let camera = Camera::look_at(
      Point3::new(0., 0., 3.5),
      Point3::new(0., 0., 0.),
      Vector3::unit_y(),
      Projection::Perspective {
        fovy: Deg(45.).into(),
        near: 0.1,
        far: 100.,
      },
      Viewport::new(800, 600),
    );

    let mut rotation = DragRotation::default();
    rotation.set_auto_spin(true);

    Ok(LocalExample {
      phong,
      lines,
      knot,
      circles,
      camera,
      rotation,
      cursor: Point2::new(0., 0.),
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
          let auto_spin = !self.rotation.auto_spin();
          self.rotation.set_auto_spin(auto_spin);
          log::info!("auto-spin: {}", auto_spin);
        }

        InputAction::AuxiliaryToggle => self.rotation.reset(),

        InputAction::PrimaryPressed => self.rotation.press(self.cursor, time),

        InputAction::PrimaryReleased => self.rotation.release(time),

        InputAction::CursorMoved { x, y } => {
          let viewport = self.camera.viewport;
          self.cursor = Point2::new(x, viewport.flip_y(y));

          if self.rotation.is_dragging() {
            self
              .rotation
              .drag_to(self.cursor, &self.camera.view, viewport.height);
          }
        }

        InputAction::Resized { width, height } => {
          self.camera.set_viewport(Viewport::new(width, height));
        }

        _ => (),
      }
    }

    let model = self.rotation.model_matrix(time);
    let gizmo = model * Matrix4::from_scale(1.25);
    let projection = Mat44::new(self.camera.projection_matrix());
    let view = Mat44::new(self.camera.view);
    let to_light = view_direction(self.camera.view, Vector3::new(-1., 1., 2.));
    let phong = &mut self.phong;
    let lines = &mut self.lines;
    let knot = &self.knot;
    let circles = &self.circles;

    let render = context
      .new_pipeline_gate()
      .pipeline(
        &back_buffer,
        &PipelineState::default().set_clear_color([0.08, 0.08, 0.1, 1.]),
        |_, mut shd_gate| {
          shd_gate.shade(
            phong,
            |mut iface, uni, mut rdr_gate| -> Result<(), PipelineError> {
              iface.set(&uni.projection, projection);
              iface.set(&uni.view, view);
              iface.set(&uni.model, Mat44::new(model));
              iface.set(&uni.to_light, to_light);
              iface.set(&uni.color, Vec3::new(0.3, 0.6, 0.85));
              iface.set(&uni.face_hue, 0.);
              iface.set(&uni.shininess, 64.);

              rdr_gate.render(&RenderState::default(), |mut tess_gate| {
                tess_gate.render(knot)
              })
            },
          )?;

          shd_gate.shade(lines, |mut iface, uni, mut rdr_gate| {
            iface.set(&uni.projection, projection);
            iface.set(&uni.view, view);
            iface.set(&uni.model, Mat44::new(gizmo));

            rdr_gate.render(&RenderState::default(), |mut tess_gate| {
              tess_gate.render(circles)
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
