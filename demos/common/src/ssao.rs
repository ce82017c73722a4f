//! Screen-space ambient occlusion.
//!
//! Three passes:
//!
//! 1. The scene is shaded into a [`GBuffer`], which also keeps view-space normals and depth.
//! 2. For every pixel, a hemisphere kernel oriented along the normal and randomly rotated by a
//!    tiled noise texture is projected back to the screen; the fraction of samples in front of the
//!    stored depth is the ambient visibility.
//! 3. The visibility is blurred over the noise tile and multiplies the shaded color.
//!
//! Press the <main action> to show the occlusion alone.
//! Press the <auxiliary action> to switch the occlusion on and off.

use cgmath::{Deg, EuclideanSpace as _, Matrix4, Point3, Rad, SquareMatrix as _, Vector3};
use luminance::UniformInterface;
use luminance_front::{
  context::GraphicsContext,
  framebuffer::Framebuffer,
  pipeline::{PipelineError, PipelineState, TextureBinding},
  pixel::{Floating, NormUnsigned, RGB32F, RGBA32F},
  render_state::RenderState,
  shader::{
    types::{Mat44, Vec2, Vec3},
    Program, Uniform,
  },
  tess::Tess,
  texture::{Dim2, Sampler, TexelUpload, Texture, Wrap},
  Backend,
};
use ogl_utility::{
  mesh,
  ssao::{self, SsaoSettings},
  Camera, Projection, Viewport,
};

use crate::{
  framebuffers::{nearest_sampler, GBuffer, OcclusionBuffer},
  program::build_simple_program,
  shaders,
  shared::{fullscreen_quad, upload_mesh, view_direction, MeshTess, PhongInterface, Semantics},
  DemoError, Example, GpuResultExt as _, InputAction, LoopFeedback, PlatformServices,
};

#[derive(UniformInterface)]
struct OcclusionInterface {
  #[uniform(unbound, name = "u_normal_depth")]
  normal_depth: Uniform<TextureBinding<Dim2, Floating>>,
  #[uniform(unbound, name = "u_kernel")]
  kernel: Uniform<TextureBinding<Dim2, Floating>>,
  #[uniform(unbound, name = "u_noise")]
  noise: Uniform<TextureBinding<Dim2, Floating>>,
  #[uniform(unbound, name = "u_projection")]
  projection: Uniform<Mat44<f32>>,
  #[uniform(unbound, name = "u_inverse_projection")]
  inverse_projection: Uniform<Mat44<f32>>,
  #[uniform(unbound, name = "u_viewport_size")]
  viewport_size: Uniform<Vec2<f32>>,
  #[uniform(unbound, name = "u_noise_size")]
  noise_size: Uniform<f32>,
  #[uniform(unbound, name = "u_radius")]
  radius: Uniform<f32>,
}

#[derive(UniformInterface)]
struct BlendInterface {
  #[uniform(unbound, name = "u_color")]
  color: Uniform<TextureBinding<Dim2, NormUnsigned>>,
  #[uniform(unbound, name = "u_occlusion")]
  occlusion: Uniform<TextureBinding<Dim2, Floating>>,
  #[uniform(unbound, name = "u_viewport_size")]
  viewport_size: Uniform<Vec2<f32>>,
  #[uniform(unbound, name = "u_occlusion_only")]
  occlusion_only: Uniform<f32>,
  #[uniform(unbound, name = "u_enabled")]
  enabled: Uniform<f32>,
}

/// Cubes of various heights packed on a plate, leaving creases to darken.
fn scene() -> Vec<(mesh::Mesh, Matrix4<f32>)> {
  let mut scene = vec![(mesh::quad(10.), Matrix4::identity())];

  for i in 0..5 {
    for j in 0..5 {
      let height = 0.3 + ((i * 7 + j * 3) % 5) as f32 * 0.25;
      let position = Vector3::new(i as f32 - 2., j as f32 - 2., height * 0.5);
      let model = Matrix4::from_translation(position)
        * Matrix4::from_nonuniform_scale(0.45, 0.45, height * 0.5);

      scene.push((mesh::hexahedron(3f32.sqrt()), model));
    }
  }

  let sphere = Matrix4::from_translation(Vector3::new(0., 0., 2.4));
  scene.push((mesh::icosphere(3, 0.9), sphere));

  scene
}

// flatten vectors into raw texels
fn texels<const N: usize>(vectors: &[[f32; N]]) -> Vec<f32> {
  vectors.iter().flat_map(|v| v.iter().copied()).collect()
}

pub struct LocalExample {
  scene_program: Program<Semantics, (), PhongInterface>,
  occlusion_program: Program<(), (), OcclusionInterface>,
  blend_program: Program<(), (), BlendInterface>,
  scene: Vec<(MeshTess, Matrix4<f32>)>,
  quad: Tess<()>,
  gbuffer: GBuffer,
  occlusion: OcclusionBuffer,
  kernel: Texture<Dim2, RGBA32F>,
  noise: Texture<Dim2, RGB32F>,
  settings: SsaoSettings,
  camera: Camera,
  occlusion_only: bool,
  enabled: bool,
}

impl Example for LocalExample {
  fn bootstrap(
    _: &mut impl PlatformServices,
    context: &mut impl GraphicsContext<Backend = Backend>,
  ) -> Result<Self, DemoError> {
    let library = shaders::library();
    let scene_program = build_simple_program(context, &library, "mesh-vs", "gbuffer-fs")?;
    let occlusion_program = build_simple_program(context, &library, "fullscreen-vs", "ssao-fs")?;
    let blend_program =
      build_simple_program(context, &library, "fullscreen-vs", "ssao-blend-fs")?;

    let mut meshes = Vec::new();
    for (mesh, model) in scene() {
      meshes.push((upload_mesh(context, &mesh)?, model));
    }

    let settings = SsaoSettings::default();
    let kernel = ssao::kernel(settings.kernel_size, &mut rand::thread_rng());
    let kernel = context
      .new_texture_raw(
        [settings.kernel_size as u32, 1],
        nearest_sampler(),
        TexelUpload::base_level(&texels(&kernel), 0),
      )
      .gpu("kernel texture")?;

    let noise_size = settings.noise_size as u32;
    let noise = context
      .new_texture_raw(
        [noise_size, noise_size],
        Sampler {
          wrap_r: Wrap::Repeat,
          wrap_s: Wrap::Repeat,
          wrap_t: Wrap::Repeat,
          ..nearest_sampler()
        },
        TexelUpload::base_level(&texels(&ssao::noise(settings.noise_size)), 0),
      )
      .gpu("noise texture")?;

    log::info!(
      "{} kernel samples, {}×{} noise, radius {}",
      settings.kernel_size,
      noise_size,
      noise_size,
      settings.radius
    );

    let camera = Camera::look_at(
      Point3::new(6., -6., 5.),
      Point3::origin(),
      Vector3::unit_z(),
      Projection::Perspective {
        fovy: Deg(45.).into(),
        near: 0.5,
        far: 50.,
      },
      Viewport::new(800, 600),
    );

    Ok(LocalExample {
      scene_program,
      occlusion_program,
      blend_program,
      scene: meshes,
      quad: fullscreen_quad(context)?,
      gbuffer: GBuffer::new(context, [800, 600])?,
      occlusion: OcclusionBuffer::new(context, [800, 600])?,
      kernel,
      noise,
      settings,
      camera,
      occlusion_only: false,
      enabled: true,
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
          self.occlusion_only = !self.occlusion_only;
          log::info!("occlusion only: {}", self.occlusion_only);
        }

        InputAction::AuxiliaryToggle => {
          self.enabled = !self.enabled;
          log::info!("ambient occlusion: {}", self.enabled);
        }

        InputAction::Resized { width, height } => {
          self.camera.set_viewport(Viewport::new(width, height));

          let resized = self
            .gbuffer
            .resize(context, [width, height])
            .and_then(|_| self.occlusion.resize(context, [width, height]));

          if let Err(e) = resized {
            log::error!("{}", e);
            return LoopFeedback::Exit;
          }
        }

        _ => (),
      }
    }

    let turn = Matrix4::from_angle_z(Rad(time * 0.1));
    let projection_matrix = self.camera.projection_matrix();
    let view_matrix = self.camera.view * turn;
    let projection = Mat44::new(projection_matrix);
    let inverse_projection = projection_matrix.invert().unwrap_or_else(Matrix4::identity);
    let inverse_projection = Mat44::new(inverse_projection);
    let view = Mat44::new(view_matrix);
    let to_light = view_direction(view_matrix, Vector3::new(0.3, -0.5, 1.));
    let [width, height] = self.gbuffer.size();
    let viewport_size = Vec2::new(width as f32, height as f32);
    let noise_size = self.settings.noise_size as f32;
    let radius = self.settings.radius;
    let occlusion_only = if self.occlusion_only { 1. } else { 0. };
    let enabled = if self.enabled { 1. } else { 0. };

    let scene_program = &mut self.scene_program;
    let occlusion_program = &mut self.occlusion_program;
    let blend_program = &mut self.blend_program;
    let scene = &self.scene;
    let quad = &self.quad;
    let gbuffer = &mut self.gbuffer;
    let occlusion = &mut self.occlusion;
    let kernel = &mut self.kernel;
    let noise = &mut self.noise;
    let mut pipeline_gate = context.new_pipeline_gate();

    // geometry
    let render = pipeline_gate
      .pipeline(
        gbuffer.framebuffer(),
        &PipelineState::default().set_clear_color([0.9, 0.9, 0.9, 1.]),
        |_, mut shd_gate| {
          shd_gate.shade(scene_program, |mut iface, uni, mut rdr_gate| {
            iface.set(&uni.projection, projection);
            iface.set(&uni.view, view);
            iface.set(&uni.to_light, to_light);
            iface.set(&uni.color, Vec3::new(0.85, 0.85, 0.8));
            iface.set(&uni.face_hue, 0.);
            iface.set(&uni.shininess, 8.);

            scene.iter().try_for_each(|(tess, model)| {
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

    // occlusion
    let render = pipeline_gate
      .pipeline(
        occlusion.framebuffer(),
        &PipelineState::default(),
        |pipeline, mut shd_gate| -> Result<(), PipelineError> {
          let (_, normal_depth) = gbuffer.framebuffer_mut().color_slot();
          let normal_depth = pipeline.bind_texture(normal_depth)?;
          let kernel = pipeline.bind_texture(kernel)?;
          let noise = pipeline.bind_texture(noise)?;

          shd_gate.shade(occlusion_program, |mut iface, uni, mut rdr_gate| {
            iface.set(&uni.normal_depth, normal_depth.binding());
            iface.set(&uni.kernel, kernel.binding());
            iface.set(&uni.noise, noise.binding());
            iface.set(&uni.projection, projection);
            iface.set(&uni.inverse_projection, inverse_projection);
            iface.set(&uni.viewport_size, viewport_size);
            iface.set(&uni.noise_size, noise_size);
            iface.set(&uni.radius, radius);

            rdr_gate.render(&RenderState::default(), |mut tess_gate| {
              tess_gate.render(quad)
            })
          })
        },
      )
      .assume();

    if render.is_err() {
      return LoopFeedback::Exit;
    }

    // blur and blend
    let render = pipeline_gate
      .pipeline(
        &back_buffer,
        &PipelineState::default(),
        |pipeline, mut shd_gate| -> Result<(), PipelineError> {
          let (color, _) = gbuffer.framebuffer_mut().color_slot();
          let color = pipeline.bind_texture(color)?;
          let visibility = pipeline.bind_texture(occlusion.framebuffer_mut().color_slot())?;

          shd_gate.shade(blend_program, |mut iface, uni, mut rdr_gate| {
            iface.set(&uni.color, color.binding());
            iface.set(&uni.occlusion, visibility.binding());
            iface.set(&uni.viewport_size, viewport_size);
            iface.set(&uni.occlusion_only, occlusion_only);
            iface.set(&uni.enabled, enabled);

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
  fn vectors_flatten_in_order() {
    assert_eq!(
      texels(&[[1., 2., 3.], [4., 5., 6.]]),
      vec![1., 2., 3., 4., 5., 6.]
    );
    assert!(texels::<4>(&[]).is_empty());
  }

  #[test]
  fn scene_stands_on_the_plate() {
    for (mesh, model) in scene() {
      assert!(mesh.validate().is_ok());

      for v in &mesh.vertices {
        let p = model * Point3::from(v.position).to_homogeneous();
        assert!(p.z > -1e-4, "vertex below the plate: {:?}", p);
      }
    }
  }
}
