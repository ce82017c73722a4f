//! OpenGL 3.3 surface backed by a glutin window.

use glutin::{
  event_loop::EventLoop, window::WindowBuilder, Api, ContextBuilder, ContextError, CreationError,
  GlProfile, GlRequest, PossiblyCurrent, WindowedContext,
};
use luminance::{context::GraphicsContext, framebuffer::FramebufferError};
use luminance_front::{framebuffer::Framebuffer, texture::Dim2};
use luminance_gl::{gl33::StateQueryError, GL33};
use ogl_utility::window::WindowOpt;
use std::{fmt, os::raw::c_void};

/// Error that might occur when creating a glutin surface.
#[derive(Debug)]
pub enum GlutinError {
  /// The window or its context could not be created.
  CreationError(CreationError),
  /// The context could not be made current.
  ContextError(ContextError),
  /// Querying the initial OpenGL state failed.
  GraphicsStateError(StateQueryError),
}

impl fmt::Display for GlutinError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      GlutinError::CreationError(ref e) => write!(f, "glutin surface creation error: {}", e),
      GlutinError::ContextError(ref e) => write!(f, "glutin OpenGL context error: {}", e),
      GlutinError::GraphicsStateError(ref e) => {
        write!(f, "OpenGL graphics state initialization error: {}", e)
      }
    }
  }
}

impl std::error::Error for GlutinError {}

impl From<CreationError> for GlutinError {
  fn from(e: CreationError) -> Self {
    GlutinError::CreationError(e)
  }
}

impl From<ContextError> for GlutinError {
  fn from(e: ContextError) -> Self {
    GlutinError::ContextError(e)
  }
}

/// A window with a current OpenGL 3.3 core context.
pub struct GlutinSurface {
  pub ctx: WindowedContext<PossiblyCurrent>,
  gl: GL33,
}

unsafe impl GraphicsContext for GlutinSurface {
  type Backend = GL33;

  fn backend(&mut self) -> &mut Self::Backend {
    &mut self.gl
  }
}

impl GlutinSurface {
  /// Open the window described by `window_builder` and make its context current.
  ///
  /// Multisampling and vertical synchronization follow `opt`; its dimensions and cursor mode are
  /// up to the caller, as they live on the window itself.
  pub fn new(
    window_builder: WindowBuilder,
    opt: &WindowOpt,
  ) -> Result<(Self, EventLoop<()>), GlutinError> {
    let event_loop = EventLoop::new();
    let samples = opt.num_samples().unwrap_or(0) as u16;

    let windowed_ctx = ContextBuilder::new()
      .with_gl(GlRequest::Specific(Api::OpenGl, (3, 3)))
      .with_gl_profile(GlProfile::Core)
      .with_multisampling(samples)
      .with_double_buffer(Some(true))
      .with_vsync(opt.vsync())
      .build_windowed(window_builder, &event_loop)?;

    let ctx = unsafe { windowed_ctx.make_current().map_err(|(_, e)| e)? };

    gl::load_with(|s| ctx.get_proc_address(s) as *const c_void);

    ctx.window().set_visible(true);

    let gl = GL33::new().map_err(GlutinError::GraphicsStateError)?;

    Ok((GlutinSurface { ctx, gl }, event_loop))
  }

  /// Size of the drawable area, in physical pixels.
  pub fn size(&self) -> [u32; 2] {
    let size = self.ctx.window().inner_size();
    [size.width, size.height]
  }

  pub fn back_buffer(&mut self) -> Result<Framebuffer<Dim2, (), ()>, FramebufferError> {
    let size = self.size();
    Framebuffer::back_buffer(self, size)
  }

  pub fn swap_buffers(&mut self) {
    if let Err(e) = self.ctx.swap_buffers() {
      log::warn!("cannot swap buffers: {}", e);
    }
  }
}
