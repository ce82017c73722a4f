//! OpenGL demos.
//!
//! This project provides a set of small graphics programs that can be run on any platform
//! providing an OpenGL 3.3 context. The demos are platform-agnostic on purpose: window creation,
//! event handling and asset loading live in the front-end crate, which runs a demo through the
//! [`Example`] trait.
//!
//! # Demo architecture
//!
//! Demos are simple modules exposed from this crate. They do not depend on any platform-specific
//! concepts, such as system events or system window capacities. Whenever a demo requires user
//! interaction, it receives [`InputAction`]s from the platform code running it.
//!
//! Everything that can be computed without a GPU (cameras, navigation, meshes, SSAO kernels, text
//! layout…) comes from the `ogl-utility` crate; this crate only moves that data to the GPU and
//! renders it.
//!
//! # Error handling
//!
//! Allocating GPU resources is done in [`Example::bootstrap`], which reports failures through
//! [`DemoError`]. Rendering errors end the render loop.

use std::{error::Error, fmt};

use luminance_front::{context::GraphicsContext, framebuffer::Framebuffer, texture::Dim2, Backend};
use ogl_utility::{mesh::MeshError, shader_source::ShaderSourceError, text::AtlasError};

pub mod blinn_phong;
pub mod first_person;
pub mod framebuffers;
pub mod geometry_shader;
pub mod hello_cube;
pub mod hello_triangle;
pub mod instancing;
pub mod navigation;
pub mod parallax_mapping;
pub mod program;
pub mod shaders;
pub mod shadow_mapping;
pub mod shared;
pub mod ssao;
pub mod tessellation;
pub mod text;
pub mod texture;
pub mod trackball;

/// Demo interface.
pub trait Example: Sized {
  /// Assets the demo needs.
  fn features() -> Features {
    Features::none()
  }

  /// Bootstrap the demo: compile its programs and allocate its GPU resources.
  fn bootstrap(
    platform: &mut impl PlatformServices,
    context: &mut impl GraphicsContext<Backend = Backend>,
  ) -> Result<Self, DemoError>;

  /// Render a frame of the demo.
  fn render_frame(
    self,
    time: f32,
    back_buffer: Framebuffer<Dim2, (), ()>,
    actions: impl Iterator<Item = InputAction>,
    context: &mut impl GraphicsContext<Backend = Backend>,
  ) -> LoopFeedback<Self>;
}

/// A type used to pass “inputs” to demos.
#[derive(Clone, Debug, PartialEq)]
pub enum InputAction {
  /// Quit the application.
  Quit,

  /// Main action. Typically used to switch an effect on and off or to cycle through it.
  MainToggle,

  /// Auxiliary action. Often used to showcase / toggle smaller parts of a bigger effect.
  AuxiliaryToggle,

  /// Forward direction.
  Forward,

  /// Backward direction.
  Backward,

  /// Left direction.
  Left,

  /// Right direction.
  Right,

  /// Up direction.
  Up,

  /// Down direction.
  Down,

  /// Primary (left) mouse button pressed.
  PrimaryPressed,

  /// Primary (left) mouse button released.
  PrimaryReleased,

  /// Secondary (right) mouse button pressed.
  SecondaryPressed,

  /// Secondary (right) mouse button released.
  SecondaryReleased,

  /// Cursor moved, in window pixels with the origin at the top-left corner.
  CursorMoved { x: f32, y: f32 },

  /// Vertical scroll.
  VScroll { amount: f32 },

  /// Framebuffer size changed.
  Resized { width: u32, height: u32 },
}

/// What to do after a frame.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum LoopFeedback<T> {
  /// Keep rendering with the new state.
  Continue(T),
  /// Stop the demo.
  Exit,
}

/// Assets a demo needs the platform to load before bootstrapping it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Features {
  textures: Vec<String>,
  fonts: Vec<String>,
}

impl Features {
  /// No asset at all.
  pub fn none() -> Self {
    Self::default()
  }

  /// Require a texture.
  pub fn texture(mut self, name: impl Into<String>) -> Self {
    self.textures.push(name.into());
    self
  }

  /// Require a font.
  pub fn font(mut self, name: impl Into<String>) -> Self {
    self.fonts.push(name.into());
    self
  }

  /// Required textures.
  pub fn textures(&self) -> &[String] {
    &self.textures
  }

  /// Required fonts.
  pub fn fonts(&self) -> &[String] {
    &self.fonts
  }
}

/// Services a platform provides to the demos.
pub trait PlatformServices {
  /// Error that might occur while fetching an asset.
  type FetchError: Error + 'static;

  /// Fetch a texture listed in [`Features`].
  fn fetch_texture(&mut self, name: impl AsRef<str>) -> Result<&image::RgbImage, Self::FetchError>;

  /// Fetch the raw bytes of a font listed in [`Features`].
  fn fetch_font(&mut self, name: impl AsRef<str>) -> Result<&[u8], Self::FetchError>;
}

/// Error that might occur while bootstrapping a demo.
#[derive(Debug)]
pub enum DemoError {
  /// A shader program couldn’t be assembled or compiled.
  Program(program::ProgramError),
  /// A GPU resource couldn’t be created.
  Gpu {
    /// Resource being created.
    what: &'static str,
    /// Backend error.
    source: Box<dyn Error>,
  },
  /// An asset couldn’t be fetched from the platform.
  Fetch(Box<dyn Error>),
  /// The glyph atlas couldn’t be built.
  Atlas(AtlasError),
  /// A generated mesh is inconsistent.
  Mesh(MeshError),
}

impl DemoError {
  /// Wrap a backend error.
  pub fn gpu(what: &'static str, source: impl Error + 'static) -> Self {
    DemoError::Gpu {
      what,
      source: Box::new(source),
    }
  }
}

impl fmt::Display for DemoError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      DemoError::Program(e) => write!(f, "cannot build program: {}", e),
      DemoError::Gpu { what, source } => write!(f, "cannot create {}: {}", what, source),
      DemoError::Fetch(e) => write!(f, "cannot fetch asset: {}", e),
      DemoError::Atlas(e) => write!(f, "cannot build glyph atlas: {}", e),
      DemoError::Mesh(e) => write!(f, "invalid mesh: {}", e),
    }
  }
}

impl Error for DemoError {}

impl From<program::ProgramError> for DemoError {
  fn from(e: program::ProgramError) -> Self {
    DemoError::Program(e)
  }
}

impl From<ShaderSourceError> for DemoError {
  fn from(e: ShaderSourceError) -> Self {
    DemoError::Program(program::ProgramError::Source(e))
  }
}

impl From<AtlasError> for DemoError {
  fn from(e: AtlasError) -> Self {
    DemoError::Atlas(e)
  }
}

impl From<MeshError> for DemoError {
  fn from(e: MeshError) -> Self {
    DemoError::Mesh(e)
  }
}

/// Attach the name of the resource being created to a backend error.
pub trait GpuResultExt<T> {
  /// Map the error to [`DemoError::Gpu`].
  fn gpu(self, what: &'static str) -> Result<T, DemoError>;
}

impl<T, E> GpuResultExt<T> for Result<T, E>
where
  E: Error + 'static,
{
  fn gpu(self, what: &'static str) -> Result<T, DemoError> {
    self.map_err(|e| DemoError::gpu(what, e))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn features_accumulate() {
    let features = Features::none()
      .texture("wall.png")
      .font("mono.ttf")
      .texture("floor.png");

    assert_eq!(features.textures(), ["wall.png", "floor.png"]);
    assert_eq!(features.fonts(), ["mono.ttf"]);
  }

  #[test]
  fn gpu_errors_name_the_resource() {
    let res: Result<(), _> = Err(fmt::Error);
    let err = res.gpu("cube tessellation").unwrap_err();

    assert_eq!(
      err.to_string(),
      "cannot create cube tessellation: an error occurred when formatting an argument"
    );
  }
}
