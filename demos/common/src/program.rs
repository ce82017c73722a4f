//! Shader program loading.
//!
//! Programs are built from chunks of the [`shaders`](crate::shaders) library: includes are
//! resolved first, then every stage is handed to luminance. Compilation warnings are logged,
//! errors are returned.

use std::{error::Error, fmt};

use luminance::{
  shader::{TessellationStages, UniformInterface},
  vertex::Semantics,
};
use luminance_front::{context::GraphicsContext, shader::Program, Backend};
use ogl_utility::shader_source::{ShaderLibrary, ShaderSourceError, ShaderStages, StageNames};

/// Error that might occur while building a program.
#[derive(Debug)]
pub enum ProgramError {
  /// The GLSL sources couldn’t be assembled.
  Source(ShaderSourceError),
  /// The backend rejected the program.
  Compile {
    /// Vertex chunk of the program, to tell programs apart.
    vertex: String,
    /// Backend error.
    reason: String,
  },
}

impl fmt::Display for ProgramError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      ProgramError::Source(e) => write!(f, "{}", e),
      ProgramError::Compile { vertex, reason } => {
        write!(f, "program ({}) failed to compile: {}", vertex, reason)
      }
    }
  }
}

impl Error for ProgramError {}

impl From<ShaderSourceError> for ProgramError {
  fn from(e: ShaderSourceError) -> Self {
    ProgramError::Source(e)
  }
}

/// Resolve the stages named by `names` and compile them into a program.
pub fn build_program<Sem, Out, Uni>(
  context: &mut impl GraphicsContext<Backend = Backend>,
  library: &ShaderLibrary,
  names: &StageNames,
) -> Result<Program<Sem, Out, Uni>, ProgramError>
where
  Sem: Semantics,
  Uni: UniformInterface<Backend>,
{
  let stages = library.stages(names)?;
  compile(context, names.vertex, &stages)
}

/// Shorthand for the common vertex + fragment case.
pub fn build_simple_program<Sem, Out, Uni>(
  context: &mut impl GraphicsContext<Backend = Backend>,
  library: &ShaderLibrary,
  vertex: &str,
  fragment: &str,
) -> Result<Program<Sem, Out, Uni>, ProgramError>
where
  Sem: Semantics,
  Uni: UniformInterface<Backend>,
{
  build_program(context, library, &StageNames::new(vertex, fragment))
}

fn compile<Sem, Out, Uni>(
  context: &mut impl GraphicsContext<Backend = Backend>,
  vertex_name: &str,
  stages: &ShaderStages,
) -> Result<Program<Sem, Out, Uni>, ProgramError>
where
  Sem: Semantics,
  Uni: UniformInterface<Backend>,
{
  let tessellation = stages
    .tessellation
    .as_ref()
    .map(|tess| TessellationStages {
      control: tess.control.as_str(),
      evaluation: tess.evaluation.as_str(),
    });

  let built = context
    .new_shader_program::<Sem, Out, Uni>()
    .from_strings(
      stages.vertex.as_str(),
      tessellation,
      stages.geometry.as_deref(),
      stages.fragment.as_str(),
    )
    .map_err(|e| ProgramError::Compile {
      vertex: vertex_name.to_owned(),
      reason: e.to_string(),
    })?;

  for warning in &built.warnings {
    log::warn!("{}: {}", vertex_name, warning);
  }

  Ok(built.ignore_warnings())
}
