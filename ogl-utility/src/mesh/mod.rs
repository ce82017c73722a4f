//! Procedural, indexed meshes.
//!
//! Every generator returns a [`Mesh`] made of [`MeshVertex`] (position, normal and a 3D texture
//! coordinate) and `u32` indices. Triangle meshes are wound counter-clockwise when seen from
//! outside. The third texture coordinate (`w`) is free for the demos; the solids store a per-face
//! value in `[0, 1)` there, which the shaders turn into a hue.

use std::{error::Error, fmt};

use cgmath::{InnerSpace as _, MetricSpace as _, Point3, Vector3};

mod knot;
mod platonic;
mod shapes;

pub use knot::{torus_knot, trefoil_knot, TorusKnot, TrefoilKnot};
pub use platonic::{
  dodecahedron, hexahedron, icosahedron, octahedron, platonic, tetrahedron, PlatonicSolid,
};
pub use shapes::{
  axis_circles, cone, icosphere, quad, sphere_slices, surface_of_revolution, torus, tube,
};

/// A vertex of a generated mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshVertex {
  /// Position.
  pub position: [f32; 3],
  /// Unit normal.
  pub normal: [f32; 3],
  /// Texture coordinates; `w` is generator-specific.
  pub uvw: [f32; 3],
}

impl MeshVertex {
  /// Build a vertex.
  pub const fn new(position: [f32; 3], normal: [f32; 3], uvw: [f32; 3]) -> Self {
    MeshVertex {
      position,
      normal,
      uvw,
    }
  }
}

/// How indices are grouped into primitives.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PrimitiveKind {
  /// Three indices per triangle.
  Triangles,
  /// Two indices per line segment.
  Lines,
}

impl PrimitiveKind {
  /// Number of indices per primitive.
  pub fn arity(self) -> usize {
    match self {
      PrimitiveKind::Triangles => 3,
      PrimitiveKind::Lines => 2,
    }
  }
}

/// Possible errors found by [`Mesh::validate`].
#[derive(Debug, Clone, PartialEq)]
pub enum MeshError {
  /// An index points past the vertex buffer.
  IndexOutOfRange {
    /// Position of the faulty index.
    position: usize,
    /// Its value.
    index: u32,
    /// Number of vertices.
    vertex_count: usize,
  },
  /// The index count is not a multiple of the primitive arity.
  IncompletePrimitive {
    /// Number of indices.
    index_count: usize,
    /// Indices per primitive.
    arity: usize,
  },
  /// A normal is not unit length (or not a number).
  DenormalizedNormal {
    /// Faulty vertex.
    vertex: usize,
    /// Its normal length.
    length: f32,
  },
}

impl fmt::Display for MeshError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      MeshError::IndexOutOfRange {
        position,
        index,
        vertex_count,
      } => write!(
        f,
        "index {} at position {} is out of range ({} vertices)",
        index, position, vertex_count
      ),

      MeshError::IncompletePrimitive { index_count, arity } => write!(
        f,
        "{} indices cannot be split into primitives of {} indices",
        index_count, arity
      ),

      MeshError::DenormalizedNormal { vertex, length } => {
        write!(f, "normal of vertex {} has length {}", vertex, length)
      }
    }
  }
}

impl Error for MeshError {}

/// An indexed mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
  /// Vertices.
  pub vertices: Vec<MeshVertex>,
  /// Indices into `vertices`.
  pub indices: Vec<u32>,
  /// How `indices` are grouped.
  pub primitive: PrimitiveKind,
}

impl Mesh {
  /// Empty mesh.
  pub fn new(primitive: PrimitiveKind) -> Self {
    Mesh {
      vertices: Vec::new(),
      indices: Vec::new(),
      primitive,
    }
  }

  /// Empty mesh with room for `vertices` vertices and `indices` indices.
  pub fn with_capacity(primitive: PrimitiveKind, vertices: usize, indices: usize) -> Self {
    Mesh {
      vertices: Vec::with_capacity(vertices),
      indices: Vec::with_capacity(indices),
      primitive,
    }
  }

  /// Append a vertex and return its index.
  pub fn push_vertex(&mut self, position: [f32; 3], normal: [f32; 3], uvw: [f32; 3]) -> u32 {
    self.vertices.push(MeshVertex::new(position, normal, uvw));
    (self.vertices.len() - 1) as u32
  }

  /// Number of triangles (0 for line meshes).
  pub fn triangle_count(&self) -> usize {
    match self.primitive {
      PrimitiveKind::Triangles => self.indices.len() / 3,
      PrimitiveKind::Lines => 0,
    }
  }

  /// Center and radius of a sphere enclosing every vertex.
  ///
  /// The center is the middle of the axis-aligned bounding box. An empty mesh yields a null
  /// sphere at the origin.
  pub fn bounding_sphere(&self) -> (Point3<f32>, f32) {
    let mut vertices = self.vertices.iter().map(|v| Point3::from(v.position));
    let first = match vertices.next() {
      Some(p) => p,
      None => return (Point3::new(0., 0., 0.), 0.),
    };

    let (low, high) = vertices.fold((first, first), |(low, high), p| {
      (
        Point3::new(low.x.min(p.x), low.y.min(p.y), low.z.min(p.z)),
        Point3::new(high.x.max(p.x), high.y.max(p.y), high.z.max(p.z)),
      )
    });
    let center = Point3::new(
      (low.x + high.x) * 0.5,
      (low.y + high.y) * 0.5,
      (low.z + high.z) * 0.5,
    );
    let radius = self
      .vertices
      .iter()
      .map(|v| center.distance(Point3::from(v.position)))
      .fold(0., f32::max);

    (center, radius)
  }

  /// Check that indices form whole primitives referencing existing vertices and that normals
  /// are unit length.
  pub fn validate(&self) -> Result<(), MeshError> {
    let arity = self.primitive.arity();
    if self.indices.len() % arity != 0 {
      return Err(MeshError::IncompletePrimitive {
        index_count: self.indices.len(),
        arity,
      });
    }

    let vertex_count = self.vertices.len();
    if let Some((position, &index)) = self
      .indices
      .iter()
      .enumerate()
      .find(|&(_, &index)| index as usize >= vertex_count)
    {
      return Err(MeshError::IndexOutOfRange {
        position,
        index,
        vertex_count,
      });
    }

    for (vertex, v) in self.vertices.iter().enumerate() {
      let length = Vector3::from(v.normal).magnitude();
      // NaN fails the comparison too
      if !((length - 1.).abs() < 1e-3) {
        return Err(MeshError::DenormalizedNormal { vertex, length });
      }
    }

    Ok(())
  }
}

pub(crate) fn normalized(v: Vector3<f32>) -> [f32; 3] {
  if v.magnitude2() > 0. {
    v.normalize().into()
  } else {
    v.into()
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use approx::assert_relative_eq;
  use cgmath::InnerSpace;

  /// Every triangle is wound counter-clockwise around the average of its vertex normals.
  pub fn assert_outward_winding(mesh: &Mesh) {
    for (t, tri) in mesh.indices.chunks(3).enumerate() {
      let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| mesh.vertices[i as usize]);
      let pa = Vector3::from(a.position);
      let face = (Vector3::from(b.position) - pa).cross(Vector3::from(c.position) - pa);

      if face.magnitude2() < 1e-12 {
        continue;
      }

      let n = Vector3::from(a.normal) + Vector3::from(b.normal) + Vector3::from(c.normal);
      assert!(face.dot(n) > 0., "triangle {} is wound inward", t);
    }
  }

  #[test]
  fn validate_reports_errors() {
    let mut mesh = Mesh::new(PrimitiveKind::Triangles);
    mesh.push_vertex([0., 0., 0.], [0., 0., 1.], [0., 0., 0.]);
    mesh.push_vertex([1., 0., 0.], [0., 0., 1.], [0., 0., 0.]);
    mesh.indices = vec![0, 1];
    assert_eq!(
      mesh.validate(),
      Err(MeshError::IncompletePrimitive {
        index_count: 2,
        arity: 3
      })
    );

    mesh.indices = vec![0, 1, 2];
    assert_eq!(
      mesh.validate(),
      Err(MeshError::IndexOutOfRange {
        position: 2,
        index: 2,
        vertex_count: 2
      })
    );

    mesh.push_vertex([0., 1., 0.], [0., 0., 2.], [0., 0., 0.]);
    assert!(matches!(
      mesh.validate(),
      Err(MeshError::DenormalizedNormal { vertex: 2, .. })
    ));
  }

  #[test]
  fn bounding_sphere_of_quad() {
    let (center, radius) = quad(2.).bounding_sphere();

    assert_relative_eq!(center.x, 0.);
    assert_relative_eq!(center.y, 0.);
    assert_relative_eq!(radius, 2f32.sqrt(), epsilon = 1e-6);
  }

  #[test]
  fn empty_mesh_has_null_bounds() {
    let mesh = Mesh::new(PrimitiveKind::Lines);

    assert_eq!(mesh.bounding_sphere().1, 0.);
    assert_eq!(mesh.triangle_count(), 0);
    assert!(mesh.validate().is_ok());
  }
}
