//! Rendering helpers shared by the OpenGL demos.
//!
//! Nothing in this crate talks to a graphics context. It computes the values the demos feed to
//! the GPU:
//!
//! - [`viewport`] and [`camera`] map between window, clip and world space.
//! - [`navigation`], [`trackball`] and [`first_person`] turn cursor and key input into view or
//!   model matrices.
//! - [`mesh`] generates indexed meshes (platonic solids, spheres, tori, knots, …).
//! - [`ssao`] and [`shadow`] prepare the data of the screen-space ambient occlusion and shadow
//!   mapping demos.
//! - [`shader_source`] assembles GLSL sources out of named chunks.
//! - [`text`] packs rasterized glyphs into an atlas and lays strings out.
//! - [`timing`] averages frame durations.
//!
//! # Conventions
//!
//! Matrices are column-major and right-handed. Clip space follows OpenGL (depth in `[-1, 1]`),
//! window coordinates have their origin at the bottom-left corner and a depth in `[0, 1]`.

#![deny(missing_docs)]

pub mod camera;
pub mod color;
pub mod first_person;
pub mod mesh;
pub mod navigation;
pub mod shader_source;
pub mod shadow;
pub mod ssao;
pub mod text;
pub mod timing;
pub mod trackball;
pub mod viewport;
pub mod window;

pub use camera::{Camera, Projection};
pub use mesh::{Mesh, MeshError, MeshVertex, PrimitiveKind};
pub use navigation::{NavigationController, NavigationSettings, OrbitMode};
pub use viewport::Viewport;
