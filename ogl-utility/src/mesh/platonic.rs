//! The five platonic solids, flat shaded.
//!
//! Each face has its own vertices so that normals are per face. Solids are centered on the
//! origin and scaled to a circumradius (center to vertex distance).

use std::fmt;

use cgmath::{InnerSpace as _, Vector3};

use super::{Mesh, PrimitiveKind};

/// A platonic solid.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PlatonicSolid {
  /// 4 triangular faces.
  Tetrahedron,
  /// 6 square faces (a cube).
  Hexahedron,
  /// 8 triangular faces.
  Octahedron,
  /// 12 pentagonal faces.
  Dodecahedron,
  /// 20 triangular faces.
  Icosahedron,
}

impl PlatonicSolid {
  /// All solids, by increasing face count.
  pub const ALL: [PlatonicSolid; 5] = [
    PlatonicSolid::Tetrahedron,
    PlatonicSolid::Hexahedron,
    PlatonicSolid::Octahedron,
    PlatonicSolid::Dodecahedron,
    PlatonicSolid::Icosahedron,
  ];

  /// Number of faces.
  pub fn faces(self) -> usize {
    match self {
      PlatonicSolid::Tetrahedron => 4,
      PlatonicSolid::Hexahedron => 6,
      PlatonicSolid::Octahedron => 8,
      PlatonicSolid::Dodecahedron => 12,
      PlatonicSolid::Icosahedron => 20,
    }
  }

  /// The solid following this one in [`PlatonicSolid::ALL`], wrapping around.
  pub fn next(self) -> Self {
    let i = PlatonicSolid::ALL
      .iter()
      .position(|&s| s == self)
      .unwrap_or(0);
    PlatonicSolid::ALL[(i + 1) % PlatonicSolid::ALL.len()]
  }
}

impl fmt::Display for PlatonicSolid {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    let name = match *self {
      PlatonicSolid::Tetrahedron => "tetrahedron",
      PlatonicSolid::Hexahedron => "hexahedron",
      PlatonicSolid::Octahedron => "octahedron",
      PlatonicSolid::Dodecahedron => "dodecahedron",
      PlatonicSolid::Icosahedron => "icosahedron",
    };

    f.write_str(name)
  }
}

/// Generate a platonic solid of the given circumradius.
pub fn platonic(solid: PlatonicSolid, radius: f32) -> Mesh {
  match solid {
    PlatonicSolid::Tetrahedron => tetrahedron(radius),
    PlatonicSolid::Hexahedron => hexahedron(radius),
    PlatonicSolid::Octahedron => octahedron(radius),
    PlatonicSolid::Dodecahedron => dodecahedron(radius),
    PlatonicSolid::Icosahedron => icosahedron(radius),
  }
}

fn scaled(v: [f32; 3], s: f32) -> [f32; 3] {
  [v[0] * s, v[1] * s, v[2] * s]
}

/// Tetrahedron. Edge length is `4/√6 · radius`.
pub fn tetrahedron(radius: f32) -> Mesh {
  let (s_8_9, s_2_9, s_2_3) = ((8f32 / 9.).sqrt(), (2f32 / 9.).sqrt(), (2f32 / 3.).sqrt());
  let v = [
    [0., 0., 1.],
    [s_8_9, 0., -1. / 3.],
    [-s_2_9, s_2_3, -1. / 3.],
    [-s_2_9, -s_2_3, -1. / 3.],
  ];
  let t = [[0., 0.], [0., 1.], [1., 1.], [1., 0.]];
  // each face with the vertex it leaves out; its normal points away from that vertex
  let faces = [([0, 1, 2], 3), ([0, 2, 3], 1), ([0, 3, 1], 2), ([1, 3, 2], 0)];

  let mut mesh = Mesh::with_capacity(PrimitiveKind::Triangles, 12, 12);
  for (fi, (face, opposite)) in faces.iter().enumerate() {
    let normal = scaled(v[*opposite], -1.);
    for &i in face {
      let idx = mesh.push_vertex(scaled(v[i], radius), normal, [t[i][0], t[i][1], fi as f32 / 4.]);
      mesh.indices.push(idx);
    }
  }

  mesh
}

/// Hexahedron (cube). Edge length is `2/√3 · radius`.
pub fn hexahedron(radius: f32) -> Mesh {
  let l = radius / 3f32.sqrt();
  let v = [
    [-1., -1., 1.],
    [1., -1., 1.],
    [1., 1., 1.],
    [-1., 1., 1.],
    [-1., -1., -1.],
    [1., -1., -1.],
    [1., 1., -1.],
    [-1., 1., -1.],
  ];
  let t = [[0., 1.], [1., 1.], [1., 0.], [0., 0.]];
  let faces: [([usize; 4], [f32; 3]); 6] = [
    ([0, 1, 2, 3], [0., 0., 1.]),
    ([1, 5, 6, 2], [1., 0., 0.]),
    ([5, 4, 7, 6], [0., 0., -1.]),
    ([4, 0, 3, 7], [-1., 0., 0.]),
    ([3, 2, 6, 7], [0., 1., 0.]),
    ([1, 0, 4, 5], [0., -1., 0.]),
  ];

  let mut mesh = Mesh::with_capacity(PrimitiveKind::Triangles, 24, 36);
  for (fi, (face, normal)) in faces.iter().enumerate() {
    let base = mesh.vertices.len() as u32;
    for (qi, &vi) in face.iter().enumerate() {
      mesh.push_vertex(scaled(v[vi], l), *normal, [t[qi][0], t[qi][1], fi as f32 / 6.]);
    }
    mesh.indices.extend([0, 1, 2, 0, 2, 3].iter().map(|i| base + i));
  }

  mesh
}

/// Octahedron. Edge length is `√2 · radius`.
pub fn octahedron(radius: f32) -> Mesh {
  let v = [
    [-1., 0., 0.],
    [0., -1., 0.],
    [0., 0., -1.],
    [1., 0., 0.],
    [0., 1., 0.],
    [0., 0., 1.],
  ];
  let t = [[0., 0.], [1., 0.], [0.5, 0.5], [1., 1.], [0., 1.], [0.5, 0.5]];
  let faces: [([usize; 3], [f32; 3]); 8] = [
    ([0, 2, 1], [-1., -1., -1.]),
    ([1, 2, 3], [1., -1., -1.]),
    ([3, 2, 4], [1., 1., -1.]),
    ([4, 2, 0], [-1., 1., -1.]),
    ([0, 1, 5], [-1., -1., 1.]),
    ([1, 3, 5], [1., -1., 1.]),
    ([3, 4, 5], [1., 1., 1.]),
    ([4, 0, 5], [-1., 1., 1.]),
  ];

  let mut mesh = Mesh::with_capacity(PrimitiveKind::Triangles, 24, 24);
  for (fi, (face, normal)) in faces.iter().enumerate() {
    let normal: [f32; 3] = Vector3::from(*normal).normalize().into();
    for &i in face {
      let idx = mesh.push_vertex(scaled(v[i], radius), normal, [t[i][0], t[i][1], fi as f32 / 8.]);
      mesh.indices.push(idx);
    }
  }

  mesh
}

/// Dodecahedron.
///
/// Each pentagon is a fan of five triangles around its center, so the mesh has 6 vertices per
/// face. The pentagon edge length is `4/(√3(1+√5)) · radius`.
pub fn dodecahedron(radius: f32) -> Mesh {
  let phi = (1. + 5f32.sqrt()) / 2.;
  let (a, b, c) = (1., 1. / phi, 1. / (phi * phi));
  // the table below has a circumradius of √3/φ
  let l = radius * phi / 3f32.sqrt();

  #[rustfmt::skip]
  let v: [[f32; 3]; 20] = [
    // (±1/φ, ±1/φ, ±1/φ)
    [-b, -b, -b], [b, -b, -b], [b, b, -b], [-b, b, -b],
    [-b, -b, b], [b, -b, b], [b, b, b], [-b, b, b],
    // (0, ±1, ±1/φ²)
    [0., -a, -c], [0., a, -c], [0., a, c], [0., -a, c],
    // (±1, ±1/φ², 0)
    [-a, -c, 0.], [a, -c, 0.], [a, c, 0.], [-a, c, 0.],
    // (±1/φ², 0, ±1)
    [-c, 0., -a], [c, 0., -a], [c, 0., a], [-c, 0., a],
  ];
  let t = [[0., 0.], [1., 0.], [1., 0.5], [0.5, 1.], [0., 0.5]];
  #[rustfmt::skip]
  let faces: [[usize; 5]; 12] = [
    [16, 17, 1, 8, 0], [17, 16, 3, 9, 2], [19, 18, 6, 10, 7], [18, 19, 4, 11, 5],
    [14, 13, 1, 17, 2], [13, 14, 6, 18, 5], [15, 12, 4, 19, 7], [12, 15, 3, 16, 0],
    [9, 10, 6, 14, 2], [10, 9, 3, 15, 7], [8, 11, 4, 12, 0], [11, 8, 1, 13, 5],
  ];

  let mut mesh = Mesh::with_capacity(PrimitiveKind::Triangles, 72, 180);
  for (fi, face) in faces.iter().enumerate() {
    let sum = face
      .iter()
      .fold(Vector3::new(0., 0., 0.), |acc, &i| acc + Vector3::from(v[i]));
    let center = sum / 5.;
    let normal: [f32; 3] = sum.normalize().into();
    let w = fi as f32 / 12.;

    let base = mesh.push_vertex((center * l).into(), normal, [0.5, 0.5, w]);
    for (pi, &i) in face.iter().enumerate() {
      mesh.push_vertex(scaled(v[i], l), normal, [t[pi][0], t[pi][1], w]);
    }

    for k in 0..5 {
      mesh
        .indices
        .extend([base, base + 1 + k, base + 1 + (k + 1) % 5]);
    }
  }

  mesh
}

/// Icosahedron. Edge length is `radius / sin(2π/5)`.
pub fn icosahedron(radius: f32) -> Mesh {
  use std::f32::consts::PI;

  // two poles and two rings of five vertices, the lower one shifted by 36°
  let ring_r = 2. / 5f32.sqrt();
  let ring_z = 1. / 5f32.sqrt();
  let mut v = [[0f32; 3]; 12];
  v[0] = [0., 0., 1.];
  for k in 0..5 {
    let upper = 2. * PI * k as f32 / 5.;
    let lower = upper + PI / 5.;
    v[1 + k] = [ring_r * upper.cos(), ring_r * upper.sin(), ring_z];
    v[6 + k] = [ring_r * lower.cos(), ring_r * lower.sin(), -ring_z];
  }
  v[11] = [0., 0., -1.];

  #[rustfmt::skip]
  let faces: [[usize; 3]; 20] = [
    [1, 2, 0], [2, 3, 0], [3, 4, 0], [4, 5, 0], [5, 1, 0],
    [7, 6, 11], [8, 7, 11], [9, 8, 11], [10, 9, 11], [6, 10, 11],
    [1, 6, 2], [2, 7, 3], [3, 8, 4], [4, 9, 5], [5, 10, 1],
    [7, 2, 6], [8, 3, 7], [9, 4, 8], [10, 5, 9], [6, 1, 10],
  ];
  let t = [0., 0., 1., 0., 1., 1., 0., 1.];

  let mut mesh = Mesh::with_capacity(PrimitiveKind::Triangles, 60, 60);
  for (fi, face) in faces.iter().enumerate() {
    let normal: [f32; 3] = face
      .iter()
      .fold(Vector3::new(0., 0., 0.), |acc, &i| acc + Vector3::from(v[i]))
      .normalize()
      .into();

    for (ti, &i) in face.iter().enumerate() {
      // caps and bands map their triangles onto opposite halves of the unit square
      let shift = if fi >= 10 || ti == 0 { 0 } else { 2 };
      let uvw = [t[ti * 2 + shift], t[ti * 2 + 1 + shift], fi as f32 / 20.];
      let idx = mesh.push_vertex(scaled(v[i], radius), normal, uvw);
      mesh.indices.push(idx);
    }
  }

  mesh
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::mesh::tests::assert_outward_winding;
  use approx::assert_relative_eq;
  use cgmath::{InnerSpace, MetricSpace};
  use std::f32::consts::PI;

  fn distance(mesh: &Mesh, a: u32, b: u32) -> f32 {
    let pa = cgmath::Point3::from(mesh.vertices[a as usize].position);
    let pb = cgmath::Point3::from(mesh.vertices[b as usize].position);
    pa.distance(pb)
  }

  // every triangle edge has the same length
  fn assert_regular_triangles(mesh: &Mesh, edge: f32) {
    for tri in mesh.indices.chunks(3) {
      assert_relative_eq!(distance(mesh, tri[0], tri[1]), edge, epsilon = 1e-4);
      assert_relative_eq!(distance(mesh, tri[1], tri[2]), edge, epsilon = 1e-4);
      assert_relative_eq!(distance(mesh, tri[2], tri[0]), edge, epsilon = 1e-4);
    }
  }

  fn assert_on_sphere(mesh: &Mesh, radius: f32) {
    for v in &mesh.vertices {
      assert_relative_eq!(Vector3::from(v.position).magnitude(), radius, epsilon = 1e-4);
    }
  }

  #[test]
  fn tetrahedron_layout() {
    let mesh = tetrahedron(2.);

    assert_eq!(mesh.vertices.len(), 12);
    assert_eq!(mesh.indices.len(), 12);
    assert_eq!(mesh.triangle_count(), 4);
    assert!(mesh.validate().is_ok());
    assert_on_sphere(&mesh, 2.);
    assert_regular_triangles(&mesh, 4. / 6f32.sqrt() * 2.);
    assert_outward_winding(&mesh);
  }

  #[test]
  fn hexahedron_layout() {
    let mesh = hexahedron(1.5);

    assert_eq!(mesh.vertices.len(), 24);
    assert_eq!(mesh.indices.len(), 36);
    assert!(mesh.validate().is_ok());
    assert_on_sphere(&mesh, 1.5);
    assert_outward_winding(&mesh);

    let edge = 2. / 3f32.sqrt() * 1.5;
    for quad in mesh.indices.chunks(6) {
      // first triangle holds two sides of the square face
      assert_relative_eq!(distance(&mesh, quad[0], quad[1]), edge, epsilon = 1e-4);
      assert_relative_eq!(distance(&mesh, quad[1], quad[2]), edge, epsilon = 1e-4);
      assert_relative_eq!(
        distance(&mesh, quad[0], quad[2]),
        edge * 2f32.sqrt(),
        epsilon = 1e-4
      );
    }
  }

  #[test]
  fn octahedron_layout() {
    let mesh = octahedron(1.);

    assert_eq!(mesh.vertices.len(), 24);
    assert_eq!(mesh.indices.len(), 24);
    assert!(mesh.validate().is_ok());
    assert_on_sphere(&mesh, 1.);
    assert_regular_triangles(&mesh, 2f32.sqrt());
    assert_outward_winding(&mesh);
  }

  #[test]
  fn dodecahedron_layout() {
    let mesh = dodecahedron(1.);

    assert_eq!(mesh.vertices.len(), 72);
    assert_eq!(mesh.indices.len(), 180);
    assert_eq!(mesh.indices.len() % 12, 0);
    assert!(mesh.validate().is_ok());
    assert_outward_winding(&mesh);

    let rim = 4. / (3f32.sqrt() * (1. + 5f32.sqrt()));
    // circumradius of a regular pentagon
    let spoke = rim / (2. * (PI / 5.).sin());
    for tri in mesh.indices.chunks(3) {
      assert_relative_eq!(distance(&mesh, tri[0], tri[1]), spoke, epsilon = 1e-4);
      assert_relative_eq!(distance(&mesh, tri[1], tri[2]), rim, epsilon = 1e-4);
      assert_relative_eq!(distance(&mesh, tri[2], tri[0]), spoke, epsilon = 1e-4);
      // rim vertices lie on the circumsphere
      let p = Vector3::from(mesh.vertices[tri[1] as usize].position);
      assert_relative_eq!(p.magnitude(), 1., epsilon = 1e-4);
    }
  }

  #[test]
  fn icosahedron_layout() {
    let mesh = icosahedron(1.);

    assert_eq!(mesh.vertices.len(), 60);
    assert_eq!(mesh.indices.len(), 60);
    assert!(mesh.validate().is_ok());
    assert_on_sphere(&mesh, 1.);
    assert_regular_triangles(&mesh, 1. / (2. * PI / 5.).sin());
    assert_outward_winding(&mesh);
  }

  #[test]
  fn face_hues_are_distinct() {
    for solid in PlatonicSolid::ALL.iter().copied() {
      let mesh = platonic(solid, 1.);
      let mut ws: Vec<f32> = mesh.vertices.iter().map(|v| v.uvw[2]).collect();
      ws.dedup();

      assert_eq!(ws.len(), solid.faces(), "{}", solid);
      assert!(ws.iter().all(|&w| (0. ..1.).contains(&w)));
    }
  }

  #[test]
  fn solids_cycle() {
    let mut solid = PlatonicSolid::Tetrahedron;
    for _ in 0..5 {
      solid = solid.next();
    }

    assert_eq!(solid, PlatonicSolid::Tetrahedron);
    assert_eq!(PlatonicSolid::Icosahedron.next(), PlatonicSolid::Tetrahedron);
  }
}
