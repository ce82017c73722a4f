//! GLSL sources of the demos.
//!
//! Every file under `shaders/` is registered as a chunk named after the file, without its
//! extension. Chunks pull each other in with `#include "name"`.

use ogl_utility::shader_source::ShaderLibrary;

macro_rules! chunks {
  ($($name:literal),* $(,)?) => {
    /// Names of every registered chunk.
    pub const CHUNKS: &[&str] = &[$($name),*];

    /// Library holding every shader chunk of the demos.
    pub fn library() -> ShaderLibrary {
      let mut library = ShaderLibrary::new();
      $( library.add($name, include_str!(concat!("shaders/", $name, ".glsl"))); )*
      library
    }
  };
}

chunks! {
  "blinn-phong",
  "copy-fs",
  "empty-fs",
  "fullscreen-vs",
  "gbuffer-fs",
  "geometry-fs",
  "geometry-gs",
  "geometry-vs",
  "hello-triangle-fs",
  "hello-triangle-vs",
  "hue",
  "instancing-fs",
  "instancing-vs",
  "lines-fs",
  "mesh-vs",
  "normal-color-fs",
  "parallax-fs",
  "parallax-vs",
  "phong-fs",
  "shadow-depth-vs",
  "shadow-fs",
  "shadow-vs",
  "ssao-blend-fs",
  "ssao-fs",
  "tessellation-fs",
  "tessellation-tcs",
  "tessellation-tes",
  "tessellation-vs",
  "text-fs",
  "text-vs",
  "texture-fs",
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_chunk_resolves() {
    let library = library();

    for name in CHUNKS {
      let source = library
        .resolve(name)
        .unwrap_or_else(|e| panic!("{}: {}", name, e));

      assert!(!source.contains("#include"), "{} still has includes", name);
    }
  }

  #[test]
  fn phong_pulls_its_helpers_once() {
    let source = library().resolve("phong-fs").unwrap();

    assert_eq!(source.matches("vec3 hue_to_rgb(").count(), 1);
    assert_eq!(source.matches("vec3 blinn_phong(").count(), 1);
  }
}
