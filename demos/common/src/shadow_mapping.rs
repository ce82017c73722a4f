//! Shadow mapping with a directional light turning around the scene.
//!
//! The scene is first rendered from the light into a depth-only framebuffer whose orthographic
//! volume fits the bounding sphere of the scene. The second pass projects every fragment into
//! that shadow map and compares depths.
//!
//! Press the <main action> to switch percentage-closer filtering on and off.

use cgmath::{
  Deg, EuclideanSpace as _, InnerSpace as _, Matrix4, Point3, Rad, SquareMatrix as _, Vector3,
};
use luminance::UniformInterface;
use luminance_front::{
  context::GraphicsContext,
  framebuffer::Framebuffer,
  pipeline::{PipelineError, PipelineState, TextureBinding},
  pixel::{Depth32F, Floating},
  render_state::RenderState,
  shader::{
    types::{Mat44, Vec3},
    Program, Uniform,
  },
  texture::Dim2,
  Backend,
};
use ogl_utility::{
  mesh::{self, Mesh},
  shadow::{light_view_projection, shadow_bias_matrix, DirectionalLight, DEFAULT_SHADOW_MAP_SIZE},
  Camera, Projection, Viewport,
};

use crate::{
  framebuffers::nearest_sampler,
  program::build_simple_program,
  shaders,
  shared::{upload_mesh, vec3_uniform, MeshTess, Semantics},
  DemoError, Example, GpuResultExt as _, InputAction, LoopFeedback, PlatformServices,
};

#[derive(UniformInterface)]
struct DepthInterface {
  #[uniform(unbound, name = "u_light_view_projection")]
  light_view_projection: Uniform<Mat44<f32>>,
  #[uniform(unbound, name = "u_model")]
  model: Uniform<Mat44<f32>>,
}

#[derive(UniformInterface)]
struct ShadowInterface {
  #[uniform(unbound, name = "u_projection")]
  projection: Uniform<Mat44<f32>>,
  #[uniform(unbound, name = "u_view")]
  view: Uniform<Mat44<f32>>,
  #[uniform(unbound, name = "u_model")]
  model: Uniform<Mat44<f32>>,
  #[uniform(unbound, name = "u_shadow_matrix")]
  shadow_matrix: Uniform<Mat44<f32>>,
  #[uniform(unbound, name = "u_shadow_map")]
  shadow_map: Uniform<TextureBinding<Dim2, Floating>>,
  // world space
  #[uniform(unbound, name = "u_to_light")]
  to_light: Uniform<Vec3<f32>>,
  #[uniform(unbound, name = "u_eye")]
  eye: Uniform<Vec3<f32>>,
  #[uniform(unbound, name = "u_color")]
  color: Uniform<Vec3<f32>>,
  #[uniform(unbound, name = "u_face_hue")]
  face_hue: Uniform<f32>,
  #[uniform(unbound, name = "u_pcf")]
  pcf: Uniform<f32>,
}

/// Scene objects: mesh, model matrix and whether it's colored per face.
fn scene() -> Vec<(Mesh, Matrix4<f32>, bool)> {
  let knot = Matrix4::from_translation(Vector3::new(0., 0., 2.)) * Matrix4::from_scale(0.9);
  let mut scene = vec![
    (mesh::quad(14.), Matrix4::identity(), false),
    (mesh::trefoil_knot(192, 16), knot, false),
  ];

  for (i, &(x, y)) in [(-4., -3.), (4., -3.), (-4., 3.), (4., 3.)].iter().enumerate() {
    let model = Matrix4::from_translation(Vector3::new(x, y, 1.))
      * Matrix4::from_angle_z(Rad(i as f32));
    scene.push((mesh::dodecahedron(1.), model, true));
  }

  scene
}

// bounding sphere of the whole scene, in world space
fn scene_bounds(scene: &[(Mesh, Matrix4<f32>, bool)]) -> (Point3<f32>, f32) {
  let points: Vec<Point3<f32>> = scene
    .iter()
    .flat_map(|(mesh, model, _)| {
      mesh.vertices.iter().map(move |v| {
        let p = Point3::from(v.position);
        Point3::from_homogeneous(*model * p.to_homogeneous())
      })
    })
    .collect();

  let center = Point3::centroid(&points);
  let radius = points
    .iter()
    .map(|p| (p - center).magnitude())
    .fold(0., f32::max);

  (center, radius)
}

// direction of the light at a given time: circling the scene, 45° above the horizon
fn light_at(time: f32) -> DirectionalLight {
  let angle = time * 0.3;
  DirectionalLight::new(Vector3::new(-angle.cos(), -angle.sin(), -1.))
}

pub struct LocalExample {
  depth_program: Program<Semantics, (), DepthInterface>,
  shadow_program: Program<Semantics, (), ShadowInterface>,
  scene: Vec<(MeshTess, Matrix4<f32>, bool)>,
  bounds: (Point3<f32>, f32),
  shadow_map: Framebuffer<Dim2, (), Depth32F>,
  camera: Camera,
  pcf: bool,
}

impl Example for LocalExample {
  fn bootstrap(
    _: &mut impl PlatformServices,
    context: &mut impl GraphicsContext<Backend = Backend>,
  ) -> Result<Self, DemoError> {
    let library = shaders::library();
    let depth_program = build_simple_program(context, &library, "shadow-depth-vs", "empty-fs")?;
    let shadow_program = build_simple_program(context, &library, "shadow-vs", "shadow-fs")?;

    let meshes = scene();
    let bounds = scene_bounds(&meshes);
    log::debug!("scene bounds: {:?}", bounds);

    let mut scene = Vec::with_capacity(meshes.len());
    for (mesh, model, face_hue) in &meshes {
      scene.push((upload_mesh(context, mesh)?, *model, *face_hue));
    }

    let size = DEFAULT_SHADOW_MAP_SIZE;
    let shadow_map = context
      .new_framebuffer::<Dim2, (), Depth32F>([size, size], 0, nearest_sampler())
      .gpu("shadow map")?;

    let camera = Camera::look_at(
      Point3::new(9., -11., 8.),
      Point3::origin(),
      Vector3::unit_z(),
      Projection::Perspective {
        fovy: Deg(45.).into(),
        near: 0.5,
        far: 60.,
      },
      Viewport::new(800, 600),
    );

    Ok(LocalExample {
      depth_program,
      shadow_program,
      scene,
      bounds,
      shadow_map,
      camera,
      pcf: true,
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
          self.pcf = !self.pcf;
          log::info!("percentage-closer filtering: {}", self.pcf);
        }

        InputAction::Resized { width, height } => {
          self.camera.set_viewport(Viewport::new(width, height));
        }

        _ => (),
      }
    }

    let light = light_at(time);
    let (center, radius) = self.bounds;
    let light_matrix = light_view_projection(&light, center, radius);
    let light_view_projection = Mat44::new(light_matrix);
    let shadow_matrix = Mat44::new(shadow_bias_matrix() * light_matrix);
    let to_light = vec3_uniform(light.to_light());
    let eye = vec3_uniform(self.camera.eye().to_vec());
    let projection = Mat44::new(self.camera.projection_matrix());
    let view = Mat44::new(self.camera.view);
    let pcf = if self.pcf { 1. } else { 0. };

    let depth_program = &mut self.depth_program;
    let shadow_program = &mut self.shadow_program;
    let scene = &self.scene;
    let shadow_map = &mut self.shadow_map;
    let mut pipeline_gate = context.new_pipeline_gate();

    // depth from the light
    let render = pipeline_gate
      .pipeline(
        shadow_map,
        &PipelineState::default(),
        |_, mut shd_gate| {
          shd_gate.shade(depth_program, |mut iface, uni, mut rdr_gate| {
            iface.set(&uni.light_view_projection, light_view_projection);

            scene.iter().try_for_each(|(tess, model, _)| {
              iface.set(&uni.model, Mat44::new(*model));

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

    // lit scene
    let render = pipeline_gate
      .pipeline(
        &back_buffer,
        &PipelineState::default().set_clear_color([0.5, 0.65, 0.8, 1.]),
        |pipeline, mut shd_gate| -> Result<(), PipelineError> {
          let depth = pipeline.bind_texture(shadow_map.depth_stencil_slot())?;

          shd_gate.shade(shadow_program, |mut iface, uni, mut rdr_gate| {
            iface.set(&uni.projection, projection);
            iface.set(&uni.view, view);
            iface.set(&uni.shadow_matrix, shadow_matrix);
            iface.set(&uni.shadow_map, depth.binding());
            iface.set(&uni.to_light, to_light);
            iface.set(&uni.eye, eye);
            iface.set(&uni.color, Vec3::new(0.8, 0.75, 0.65));
            iface.set(&uni.pcf, pcf);

            scene.iter().try_for_each(|(tess, model, face_hue)| {
              iface.set(&uni.model, Mat44::new(*model));
              iface.set(&uni.face_hue, if *face_hue { 1. } else { 0. });

              rdr_gate.render(&RenderState::default(), |mut tess_gate| {
                tess_gate.render(tess)
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
  use super::*;

  #[test]
  fn light_volume_holds_the_scene() {
    let meshes = scene();
    let (center, radius) = scene_bounds(&meshes);

    for time in [0., 1., 2.5, 4.] {
      let m = light_view_projection(&light_at(time), center, radius);

      for (mesh, model, _) in &meshes {
        for v in &mesh.vertices {
          let world = *model * Point3::from(v.position).to_homogeneous();
          let clip = m * world;
          let ndc = clip.truncate() / clip.w;

          assert!(ndc.x.abs() <= 1. + 1e-4 && ndc.y.abs() <= 1. + 1e-4);
          assert!(ndc.z.abs() <= 1. + 1e-4);
        }
      }
    }
  }

  #[test]
  fn light_stays_above_the_horizon() {
    for time in [0., 0.7, 3., 10.] {
      assert!(light_at(time).to_light().z > 0.5);
    }
  }
}
