//! GLSL source assembly.
//!
//! Shaders are stored as named chunks in a [`ShaderLibrary`]. A chunk can pull another one in
//! with a line of the form:
//!
//! ```glsl
//! #include "hue_to_rgb"
//! ```
//!
//! Resolving a chunk expands its includes recursively, once per chunk, and drops `#version`
//! lines: the graphics backend prepends its own version directive.

use std::{collections::HashMap, error::Error, fmt};

const INCLUDE_DIRECTIVE: &str = "#include";
const VERSION_DIRECTIVE: &str = "#version";

/// Error that might occur while assembling a shader source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderSourceError {
  /// A chunk was requested or included but doesn’t exist.
  MissingChunk {
    /// Name of the missing chunk.
    name: String,
    /// Chunk holding the include, if any.
    included_from: Option<String>,
  },
  /// Chunks include each other.
  IncludeCycle(Vec<String>),
  /// An `#include` line without a quoted chunk name.
  MalformedInclude {
    /// Chunk holding the directive.
    chunk: String,
    /// Line number (starting at 1).
    line: usize,
  },
}

impl fmt::Display for ShaderSourceError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      ShaderSourceError::MissingChunk {
        name,
        included_from: Some(from),
      } => write!(f, "shader chunk {} (included from {}) doesn’t exist", name, from),
      ShaderSourceError::MissingChunk { name, .. } => {
        write!(f, "shader chunk {} doesn’t exist", name)
      }
      ShaderSourceError::IncludeCycle(chain) => {
        write!(f, "include cycle: {}", chain.join(" -> "))
      }
      ShaderSourceError::MalformedInclude { chunk, line } => {
        write!(f, "malformed include directive in {}:{}", chunk, line)
      }
    }
  }
}

impl Error for ShaderSourceError {}

/// Named GLSL chunks.
#[derive(Clone, Debug, Default)]
pub struct ShaderLibrary {
  chunks: HashMap<String, String>,
}

impl ShaderLibrary {
  /// Empty library.
  pub fn new() -> Self {
    Self::default()
  }

  /// Add (or replace) a chunk.
  pub fn add(&mut self, name: impl Into<String>, source: impl Into<String>) -> &mut Self {
    self.chunks.insert(name.into(), source.into());
    self
  }

  /// Builder version of [`ShaderLibrary::add`].
  pub fn with(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
    self.add(name, source);
    self
  }

  /// Whether a chunk exists.
  pub fn contains(&self, name: &str) -> bool {
    self.chunks.contains_key(name)
  }

  /// Expand a chunk into a complete source.
  pub fn resolve(&self, name: &str) -> Result<String, ShaderSourceError> {
    let mut out = String::new();
    let mut stack = Vec::new();
    let mut included = Vec::new();

    self.expand(name, None, &mut stack, &mut included, &mut out)?;
    Ok(out)
  }

  /// Resolve every stage of a program.
  pub fn stages(&self, names: &StageNames) -> Result<ShaderStages, ShaderSourceError> {
    let tessellation = match names.tessellation {
      Some((control, evaluation)) => Some(TessellationSources {
        control: self.resolve(control)?,
        evaluation: self.resolve(evaluation)?,
      }),
      None => None,
    };

    let geometry = names.geometry.map(|name| self.resolve(name)).transpose()?;

    Ok(ShaderStages {
      vertex: self.resolve(names.vertex)?,
      tessellation,
      geometry,
      fragment: self.resolve(names.fragment)?,
    })
  }

  fn expand<'a>(
    &'a self,
    name: &'a str,
    from: Option<&str>,
    stack: &mut Vec<&'a str>,
    included: &mut Vec<&'a str>,
    out: &mut String,
  ) -> Result<(), ShaderSourceError> {
    if let Some(start) = stack.iter().position(|&n| n == name) {
      let mut chain: Vec<String> = stack[start..].iter().map(|n| n.to_string()).collect();
      chain.push(name.to_owned());
      return Err(ShaderSourceError::IncludeCycle(chain));
    }

    if included.contains(&name) {
      return Ok(());
    }

    let source = self
      .chunks
      .get(name)
      .ok_or_else(|| ShaderSourceError::MissingChunk {
        name: name.to_owned(),
        included_from: from.map(str::to_owned),
      })?;

    stack.push(name);

    for (i, line) in source.lines().enumerate() {
      let trimmed = line.trim_start();

      if trimmed.starts_with(VERSION_DIRECTIVE) {
        continue;
      }

      if let Some(rest) = trimmed.strip_prefix(INCLUDE_DIRECTIVE) {
        let target = parse_include(rest).ok_or_else(|| ShaderSourceError::MalformedInclude {
          chunk: name.to_owned(),
          line: i + 1,
        })?;

        self.expand(target, Some(name), stack, included, out)?;
        continue;
      }

      out.push_str(line);
      out.push('\n');
    }

    stack.pop();
    included.push(name);

    Ok(())
  }
}

fn parse_include(rest: &str) -> Option<&str> {
  let rest = rest.trim();
  let inner = rest.strip_prefix('"')?.strip_suffix('"')?;

  if inner.is_empty() || inner.contains('"') {
    None
  } else {
    Some(inner)
  }
}

/// Chunk names of a program’s stages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageNames<'a> {
  /// Vertex stage.
  pub vertex: &'a str,
  /// Tessellation control and evaluation stages.
  pub tessellation: Option<(&'a str, &'a str)>,
  /// Geometry stage.
  pub geometry: Option<&'a str>,
  /// Fragment stage.
  pub fragment: &'a str,
}

impl<'a> StageNames<'a> {
  /// Vertex and fragment stages only.
  pub fn new(vertex: &'a str, fragment: &'a str) -> Self {
    StageNames {
      vertex,
      tessellation: None,
      geometry: None,
      fragment,
    }
  }

  /// Add tessellation stages.
  pub fn tessellation(self, control: &'a str, evaluation: &'a str) -> Self {
    StageNames {
      tessellation: Some((control, evaluation)),
      ..self
    }
  }

  /// Add a geometry stage.
  pub fn geometry(self, geometry: &'a str) -> Self {
    StageNames {
      geometry: Some(geometry),
      ..self
    }
  }
}

/// Resolved tessellation stages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TessellationSources {
  /// Tessellation control stage.
  pub control: String,
  /// Tessellation evaluation stage.
  pub evaluation: String,
}

/// Resolved sources of every stage of a program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShaderStages {
  /// Vertex stage.
  pub vertex: String,
  /// Optional tessellation stages.
  pub tessellation: Option<TessellationSources>,
  /// Optional geometry stage.
  pub geometry: Option<String>,
  /// Fragment stage.
  pub fragment: String,
}
