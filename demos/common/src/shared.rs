//! Vertex formats and GPU upload helpers shared by the demos.

use cgmath::{Matrix4, Vector3};
use luminance::{Semantics, UniformInterface, Vertex};
use luminance_front::{
  context::GraphicsContext,
  pixel::NormRGB8UI,
  shader::{
    types::{Mat44, Vec3},
    Uniform,
  },
  tess::{Mode, Tess},
  texture::{Dim2, Sampler, TexelUpload, Texture},
  Backend,
};
use ogl_utility::{Mesh, PrimitiveKind};

use crate::{DemoError, GpuResultExt as _, PlatformServices};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Semantics)]
pub enum Semantics {
  // model-space position of mesh vertices
  #[sem(name = "a_position", repr = "[f32; 3]", wrapper = "VertexPosition")]
  Position,
  #[sem(name = "a_normal", repr = "[f32; 3]", wrapper = "VertexNormal")]
  Normal,
  // texture coordinates; w carries a per-face or per-part parameter
  #[sem(name = "a_uvw", repr = "[f32; 3]", wrapper = "VertexUvw")]
  Uvw,
  #[sem(name = "a_color", repr = "[f32; 3]", wrapper = "VertexColor")]
  Color,
  // positions of flat geometry (triangles, text)
  #[sem(name = "a_position2", repr = "[f32; 2]", wrapper = "VertexPosition2")]
  Position2,
  #[sem(name = "a_uv", repr = "[f32; 2]", wrapper = "VertexUv")]
  Uv,
  #[sem(name = "a_size", repr = "f32", wrapper = "VertexSize")]
  Size,
  // per-instance translation
  #[sem(name = "a_offset", repr = "[f32; 3]", wrapper = "VertexInstanceOffset")]
  InstanceOffset,
}

/// Flat colored vertex.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Vertex)]
#[vertex(sem = "Semantics")]
pub struct ColorVertex {
  pub position: VertexPosition2,
  pub color: VertexColor,
}

/// Vertex of the procedural meshes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Vertex)]
#[vertex(sem = "Semantics")]
pub struct MeshVertex {
  pub position: VertexPosition,
  pub normal: VertexNormal,
  pub uvw: VertexUvw,
}

impl From<&ogl_utility::MeshVertex> for MeshVertex {
  fn from(v: &ogl_utility::MeshVertex) -> Self {
    MeshVertex::new(
      VertexPosition::new(v.position),
      VertexNormal::new(v.normal),
      VertexUvw::new(v.uvw),
    )
  }
}

/// Vertex of text quads.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Vertex)]
#[vertex(sem = "Semantics")]
pub struct TextVertex {
  pub position: VertexPosition2,
  pub uv: VertexUv,
}

impl From<&ogl_utility::text::TextVertex> for TextVertex {
  fn from(v: &ogl_utility::text::TextVertex) -> Self {
    TextVertex::new(VertexPosition2::new(v.position), VertexUv::new(v.uv))
  }
}

/// A point standing for a quad, expanded by a geometry shader.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Vertex)]
#[vertex(sem = "Semantics")]
pub struct QuadPoint {
  pub position: VertexPosition,
  pub size: VertexSize,
  pub color: VertexColor,
}

// definition of a single instance
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Vertex)]
#[vertex(sem = "Semantics", instanced = "true")]
pub struct Instance {
  pub offset: VertexInstanceOffset,
}

/// Transforms of the `mesh-vs` chunk.
#[derive(Debug, UniformInterface)]
pub struct MeshInterface {
  #[uniform(unbound, name = "u_projection")]
  pub projection: Uniform<Mat44<f32>>,
  #[uniform(unbound, name = "u_view")]
  pub view: Uniform<Mat44<f32>>,
  #[uniform(unbound, name = "u_model")]
  pub model: Uniform<Mat44<f32>>,
}

/// `mesh-vs` followed by a lit fragment chunk (`phong-fs`, `gbuffer-fs`).
#[derive(Debug, UniformInterface)]
pub struct PhongInterface {
  #[uniform(unbound, name = "u_projection")]
  pub projection: Uniform<Mat44<f32>>,
  #[uniform(unbound, name = "u_view")]
  pub view: Uniform<Mat44<f32>>,
  #[uniform(unbound, name = "u_model")]
  pub model: Uniform<Mat44<f32>>,
  // view space
  #[uniform(unbound, name = "u_to_light")]
  pub to_light: Uniform<Vec3<f32>>,
  #[uniform(unbound, name = "u_color")]
  pub color: Uniform<Vec3<f32>>,
  #[uniform(unbound, name = "u_face_hue")]
  pub face_hue: Uniform<f32>,
  #[uniform(unbound, name = "u_shininess")]
  pub shininess: Uniform<f32>,
}

/// Express a world-space direction in the space of `view`.
pub fn view_direction(view: Matrix4<f32>, world: Vector3<f32>) -> Vec3<f32> {
  vec3_uniform((view * world.extend(0.)).truncate())
}

/// A vector as a shader uniform.
pub fn vec3_uniform(v: Vector3<f32>) -> Vec3<f32> {
  Vec3::new(v.x, v.y, v.z)
}

/// Indexed mesh on the GPU.
pub type MeshTess = Tess<MeshVertex, u32>;

/// Primitive mode a mesh is drawn with.
pub fn primitive_mode(primitive: PrimitiveKind) -> Mode {
  match primitive {
    PrimitiveKind::Triangles => Mode::Triangle,
    PrimitiveKind::Lines => Mode::Line,
  }
}

/// Upload a mesh; it is validated first so that a broken generator doesn’t reach the GPU.
pub fn upload_mesh(
  context: &mut impl GraphicsContext<Backend = Backend>,
  mesh: &Mesh,
) -> Result<MeshTess, DemoError> {
  upload_mesh_as(context, mesh, primitive_mode(mesh.primitive))
}

/// Upload a mesh, drawing it with `mode` (e.g. patches for tessellation).
pub fn upload_mesh_as(
  context: &mut impl GraphicsContext<Backend = Backend>,
  mesh: &Mesh,
  mode: Mode,
) -> Result<MeshTess, DemoError> {
  mesh.validate()?;

  let vertices: Vec<MeshVertex> = mesh.vertices.iter().map(MeshVertex::from).collect();

  context
    .new_tess()
    .set_vertices(&vertices[..])
    .set_indices(&mesh.indices[..])
    .set_mode(mode)
    .build()
    .gpu("mesh tessellation")
}

/// Attributeless quad covering the screen; the vertex shader spawns the corners.
pub fn fullscreen_quad(
  context: &mut impl GraphicsContext<Backend = Backend>,
) -> Result<Tess<()>, DemoError> {
  context
    .new_tess()
    .set_render_vertex_nb(4)
    .set_mode(Mode::TriangleStrip)
    .build()
    .gpu("fullscreen quad")
}

/// RGB texture.
pub type RGBTexture = Texture<Dim2, NormRGB8UI>;

/// Upload a texture fetched from the platform.
pub fn load_texture(
  context: &mut impl GraphicsContext<Backend = Backend>,
  platform: &mut impl PlatformServices,
  name: impl AsRef<str>,
) -> Result<RGBTexture, DemoError> {
  let img = platform
    .fetch_texture(name)
    .map_err(|e| DemoError::Fetch(Box::new(e)))?;
  let (width, height) = img.dimensions();
  let texels = img.as_raw();

  context
    .new_texture_raw(
      [width, height],
      Sampler::default(),
      TexelUpload::base_level(texels, 0),
    )
    .gpu("texture")
}

#[cfg(test)]
mod tests {
  use cgmath::{Deg, EuclideanSpace as _, Point3, SquareMatrix as _};

  use super::*;

  #[test]
  fn directions_ignore_translation() {
    let view = Matrix4::from_translation(Vector3::new(3., -2., 7.));

    assert_eq!(
      view_direction(view, Vector3::new(0., 1., 0.)),
      Vec3::new(0., 1., 0.)
    );
  }

  #[test]
  fn eye_positions_become_uniforms() {
    let eye = Point3::new(1.5, -6., 2.);

    assert_eq!(vec3_uniform(eye.to_vec()), Vec3::new(1.5, -6., 2.));
  }

  #[test]
  fn directions_follow_the_camera() {
    let view = Matrix4::look_at_rh(
      Point3::new(0., 0., 5.),
      Point3::new(0., 0., 0.),
      Vector3::unit_y(),
    );
    let v = view_direction(view, Vector3::new(0., 0., 1.));

    // the eye looks down -z: +z points back towards the viewer in view space too
    assert!((v[2] - 1.).abs() < 1e-6);

    let turned = Matrix4::from_angle_y(Deg(90.)) * Matrix4::identity();
    let v = view_direction(turned, Vector3::new(1., 0., 0.));

    assert!(v[0].abs() < 1e-6);
    assert!((v[2] + 1.).abs() < 1e-6);
  }

  #[test]
  fn primitives_map_to_modes() {
    assert_eq!(primitive_mode(PrimitiveKind::Triangles), Mode::Triangle);
    assert_eq!(primitive_mode(PrimitiveKind::Lines), Mode::Line);
  }
}
