//! Smooth shapes: quad, spheres, tube, cone, torus, surfaces of revolution and line gizmos.

use std::{collections::HashMap, f32::consts::PI};

use cgmath::{InnerSpace as _, Vector3};

use super::{normalized, Mesh, PrimitiveKind};

/// Square in the xy plane, facing +z, of side `size`.
pub fn quad(size: f32) -> Mesh {
  let h = size * 0.5;
  let corners = [[-h, -h], [h, -h], [h, h], [-h, h]];
  let uvs = [[0., 1.], [1., 1.], [1., 0.], [0., 0.]];

  let mut mesh = Mesh::with_capacity(PrimitiveKind::Triangles, 4, 6);
  for (c, uv) in corners.iter().zip(&uvs) {
    mesh.push_vertex([c[0], c[1], 0.], [0., 0., 1.], [uv[0], uv[1], 0.]);
  }
  mesh.indices.extend([0, 1, 2, 0, 2, 3]);

  mesh
}

// Texture coordinates of a point of the unit circle, stretched onto the unit square.
fn disc_uv(x: f32, y: f32) -> [f32; 2] {
  let s = 1. / x.abs().max(y.abs());
  [s * x * 0.5 + 0.5, s * y * 0.5 + 0.5]
}

/// UV sphere of `layers` rings of `circumference` vertices.
///
/// Each ring is split in two halves so that a texture wraps once around each hemisphere.
/// `circumference` is rounded down to an even number; at least 2 and 2 layers are used.
pub fn sphere_slices(circumference: u32, layers: u32, radius: f32) -> Mesh {
  let nc_2 = (circumference / 2).max(1);
  let nl = layers.max(2);
  let half = nc_2 + 1;
  let ring = half * 2;

  let mut mesh = Mesh::with_capacity(
    PrimitiveKind::Triangles,
    ((nl + 1) * ring) as usize,
    (nl * nc_2 * 12) as usize,
  );

  for layer in 0..=nl {
    let v = 1. - layer as f32 / nl as f32;
    let z = ((1. - 2. * layer as f32 / nl as f32) * PI / 2.).sin();
    let c = (1. - z * z).max(0.).sqrt();

    for hemisphere in 0..2 {
      for i in 0..=nc_2 {
        let u = i as f32 / nc_2 as f32;
        let a = PI * u + hemisphere as f32 * PI;
        let (x, y) = (a.cos() * c, a.sin() * c);

        mesh.push_vertex(
          [radius * x, radius * y, radius * z],
          normalized(Vector3::new(x, y, z)),
          [hemisphere as f32 * 0.5 + u * 0.5, v, v],
        );
      }
    }
  }

  // cap around the north pole (first ring)
  for hemisphere in 0..2 {
    let start = hemisphere * half;
    for i in start..start + nc_2 {
      mesh.indices.extend([ring + i, ring + i + 1, i]);
    }
  }

  for layer in 1..nl - 1 {
    for hemisphere in 0..2 {
      let rsi = layer * ring + hemisphere * half;
      let nrsi = rsi + ring;
      for i in 0..nc_2 {
        mesh.indices.extend([rsi + i, nrsi + i, nrsi + i + 1]);
        mesh.indices.extend([rsi + i, nrsi + i + 1, rsi + i + 1]);
      }
    }
  }

  // cap around the south pole (last ring)
  let si = (nl - 1) * ring;
  for hemisphere in 0..2 {
    let start = hemisphere * half;
    for i in start..start + nc_2 {
      mesh.indices.extend([si + i + 1, si + i, si + i + ring]);
    }
  }

  mesh
}

/// Sphere made by subdividing an icosahedron `subdivisions` times.
///
/// Vertices are shared between faces; the mesh has `10·4ⁿ + 2` vertices and `20·4ⁿ`
/// triangles.
pub fn icosphere(subdivisions: u32, radius: f32) -> Mesh {
  let ring_r = 2. / 5f32.sqrt();
  let ring_z = 1. / 5f32.sqrt();
  let mut points = Vec::with_capacity(12);
  points.push(Vector3::new(0., 0., 1.));
  for k in 0..5 {
    let a = 2. * PI * k as f32 / 5.;
    points.push(Vector3::new(ring_r * a.cos(), ring_r * a.sin(), ring_z));
  }
  for k in 0..5 {
    let a = 2. * PI * k as f32 / 5. + PI / 5.;
    points.push(Vector3::new(ring_r * a.cos(), ring_r * a.sin(), -ring_z));
  }
  points.push(Vector3::new(0., 0., -1.));

  #[rustfmt::skip]
  let mut faces: Vec<[u32; 3]> = vec![
    [1, 2, 0], [2, 3, 0], [3, 4, 0], [4, 5, 0], [5, 1, 0],
    [7, 6, 11], [8, 7, 11], [9, 8, 11], [10, 9, 11], [6, 10, 11],
    [1, 6, 2], [2, 7, 3], [3, 8, 4], [4, 9, 5], [5, 10, 1],
    [7, 2, 6], [8, 3, 7], [9, 4, 8], [10, 5, 9], [6, 1, 10],
  ];

  for _ in 0..subdivisions {
    let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
    let mut midpoint = |a: u32, b: u32, points: &mut Vec<Vector3<f32>>| {
      let key = (a.min(b), a.max(b));
      *midpoints.entry(key).or_insert_with(|| {
        let m = (points[a as usize] + points[b as usize]).normalize();
        points.push(m);
        (points.len() - 1) as u32
      })
    };

    faces = faces
      .iter()
      .flat_map(|&[a, b, c]| {
        let ab = midpoint(a, b, &mut points);
        let bc = midpoint(b, c, &mut points);
        let ca = midpoint(c, a, &mut points);
        [[a, ab, ca], [b, bc, ab], [c, ca, bc], [ab, bc, ca]]
      })
      .collect();
  }

  let mut mesh = Mesh::with_capacity(PrimitiveKind::Triangles, points.len(), faces.len() * 3);
  for p in &points {
    let u = 0.5 + p.y.atan2(p.x) / (2. * PI);
    let v = 0.5 + p.z.max(-1.).min(1.).asin() / PI;
    mesh.push_vertex((p * radius).into(), (*p).into(), [u, v, 0.]);
  }
  mesh.indices.extend(faces.iter().flatten());

  mesh
}

/// Open cylinder with flat caps, centered on the origin, along the z axis.
pub fn tube(circumference: u32, layers: u32, height: f32, radius: f32) -> Mesh {
  let nc = (circumference / 2).max(1) * 2;
  let nc_2 = nc / 2;
  let nl = layers.max(1);
  let h_2 = height * 0.5;
  let mut mesh = Mesh::new(PrimitiveKind::Triangles);

  // top cap: center, then the rim
  mesh.push_vertex([0., 0., h_2], [0., 0., 1.], [0.5, 0.5, 1.]);
  for i in 0..=nc {
    let a = 2. * PI * i as f32 / nc as f32;
    let (x, y) = (a.cos(), a.sin());
    let [u, v] = disc_uv(x, y);
    mesh.push_vertex([radius * x, radius * y, h_2], [0., 0., 1.], [u, v, 1.]);
    if i < nc {
      mesh.indices.extend([0, i + 1, i + 2]);
    }
  }

  // side
  let st = mesh.vertices.len() as u32;
  let ratio = 2. * height / (radius * 2. * PI);
  for layer in 0..=nl {
    let f = layer as f32 / nl as f32;
    let z = h_2 - height * f;
    for hemisphere in 0..2 {
      for i in 0..=nc_2 {
        let u = i as f32 / nc_2 as f32;
        let a = PI * u + hemisphere as f32 * PI;
        let (x, y) = (a.cos(), a.sin());
        mesh.push_vertex([radius * x, radius * y, z], [x, y, 0.], [u, (1. - f) * ratio, 1. - f]);
      }
    }
  }

  let half = nc_2 + 1;
  for layer in 0..nl {
    for hemisphere in 0..2 {
      let rsi = st + layer * 2 * half + hemisphere * half;
      let nrsi = rsi + 2 * half;
      for i in 0..nc_2 {
        mesh.indices.extend([rsi + i, nrsi + i, nrsi + i + 1]);
        mesh.indices.extend([rsi + i, nrsi + i + 1, rsi + i + 1]);
      }
    }
  }

  push_bottom_cap(&mut mesh, nc, radius, -h_2);

  mesh
}

// Disc facing -z: the rim, then the center.
fn push_bottom_cap(mesh: &mut Mesh, nc: u32, radius: f32, z: f32) {
  let st = mesh.vertices.len() as u32;
  for i in 0..=nc {
    let a = 2. * PI * i as f32 / nc as f32;
    let (x, y) = (a.cos(), a.sin());
    let [u, v] = disc_uv(x, y);
    mesh.push_vertex([radius * x, radius * y, z], [0., 0., -1.], [u, v, 0.]);
    if i < nc {
      mesh.indices.extend([st + nc + 1, st + i + 1, st + i]);
    }
  }
  mesh.push_vertex([0., 0., z], [0., 0., -1.], [0.5, 0.5, 0.]);
}

/// Cone along the z axis with its base at `-height/3` and its apex at `2·height/3`, so that its
/// centroid is the origin.
pub fn cone(circumference: u32, layers: u32, height: f32, radius: f32) -> Mesh {
  let nc = (circumference / 2).max(1) * 2;
  let nc_2 = nc / 2;
  let nl = layers.max(1);
  let mut mesh = Mesh::new(PrimitiveKind::Triangles);

  let ratio = 2. * height / (radius * 2. * PI);
  // a flat cone is a disc facing up
  let side_normal = |x: f32, y: f32| {
    if height.abs() > f32::EPSILON {
      normalized(Vector3::new(x, y, radius / height))
    } else {
      [0., 0., 1.]
    }
  };

  for layer in 0..=nl {
    let f = layer as f32 / nl as f32;
    let z = height * 2. / 3. - height * f;
    for hemisphere in 0..2 {
      for i in 0..=nc_2 {
        let u = i as f32 / nc_2 as f32;
        let a = PI * u + hemisphere as f32 * PI;
        let (x, y) = (a.cos(), a.sin());
        mesh.push_vertex(
          [f * radius * x, f * radius * y, z],
          side_normal(x, y),
          [u, (1. - f) * ratio * 1.5, 1. - f],
        );
      }
    }
  }

  let half = nc_2 + 1;
  for layer in 0..nl {
    for hemisphere in 0..2 {
      let rsi = layer * 2 * half + hemisphere * half;
      let nrsi = rsi + 2 * half;
      for i in 0..nc_2 {
        mesh.indices.extend([rsi + i, nrsi + i, nrsi + i + 1]);
        // the apex ring is a single point
        if layer > 0 {
          mesh.indices.extend([rsi + i, nrsi + i + 1, rsi + i + 1]);
        }
      }
    }
  }

  push_bottom_cap(&mut mesh, nc, radius, -height / 3.);

  mesh
}

/// Torus around the z axis.
///
/// `circumference` vertices around the tube, `layers` tube sections around the axis.
pub fn torus(circumference: u32, layers: u32, radius: f32, tube_radius: f32) -> Mesh {
  let nc = circumference.max(3);
  let nl = layers.max(3);
  let mut mesh = Mesh::with_capacity(
    PrimitiveKind::Triangles,
    ((nl + 1) * (nc + 1)) as usize,
    (nl * nc * 6) as usize,
  );

  for il in 0..=nl {
    let la = 2. * PI * il as f32 / nl as f32;
    let (lx, ly) = (la.cos(), la.sin());
    for ic in 0..=nc {
      let ca = 2. * PI * ic as f32 / nc as f32;
      let (tx, ty) = (ca.cos(), ca.sin());
      let ring = radius + tx * tube_radius;
      let p = [lx * ring, ly * ring, ty * tube_radius];
      let n = Vector3::new(lx * tx, ly * tx, ty);
      let f = il as f32 / nl as f32;

      mesh.push_vertex(p, normalized(n), [3. * f, ic as f32 / nc as f32, f]);

      if ic < nc && il < nl {
        let (l0, l1) = (il * (nc + 1), (il + 1) * (nc + 1));
        mesh.indices.extend([l0 + ic, l1 + ic, l0 + ic + 1]);
        mesh.indices.extend([l0 + ic + 1, l1 + ic, l1 + ic + 1]);
      }
    }
  }

  mesh
}

/// Revolve a profile around the z axis.
///
/// `profile` lists `(radius, z)` points from bottom to top; `slices` sections are generated
/// around the axis. Normals come from the profile tangent. Fewer than two profile points yield an
/// empty mesh.
pub fn surface_of_revolution(profile: &[[f32; 2]], slices: u32) -> Mesh {
  let mut mesh = Mesh::new(PrimitiveKind::Triangles);
  if profile.len() < 2 {
    return mesh;
  }

  let slices = slices.max(3);
  let last = profile.len() - 1;

  for (i, &[r, z]) in profile.iter().enumerate() {
    let prev = profile[i.saturating_sub(1)];
    let next = profile[(i + 1).min(last)];
    let (dr, dz) = (next[0] - prev[0], next[1] - prev[1]);

    for j in 0..=slices {
      let a = 2. * PI * j as f32 / slices as f32;
      let (c, s) = (a.cos(), a.sin());
      let mut n = Vector3::new(dz * c, dz * s, -dr);
      if n.magnitude2() == 0. {
        n = Vector3::new(c, s, 0.);
      }

      mesh.push_vertex(
        [r * c, r * s, z],
        normalized(n),
        [j as f32 / slices as f32, i as f32 / last as f32, 0.],
      );
    }
  }

  let row = slices + 1;
  for i in 0..last as u32 {
    for j in 0..slices {
      let a = i * row + j;
      let (b, c, d) = (a + 1, a + row, a + row + 1);
      mesh.indices.extend([a, b, d, a, d, c]);
    }
  }

  mesh
}

/// Three unit circles around the x, y and z axes, as line segments.
///
/// The circle around z has `w = 0`, around x `w = 1/3`, around y `w = 2/3`, meant to be turned
/// into a hue.
pub fn axis_circles(segments: u32) -> Mesh {
  let segments = segments.max(3);
  let mut mesh = Mesh::with_capacity(
    PrimitiveKind::Lines,
    (segments * 3) as usize,
    (segments * 6) as usize,
  );

  for axis in 0..3u32 {
    let base = mesh.vertices.len() as u32;
    let w = axis as f32 / 3.;

    for i in 0..segments {
      let a = 2. * PI * i as f32 / segments as f32;
      let (c, s) = (a.cos(), a.sin());
      let p = match axis {
        0 => [c, s, 0.],
        1 => [0., c, s],
        _ => [s, 0., c],
      };

      mesh.push_vertex(p, p, [i as f32 / segments as f32, 0., w]);
      mesh.indices.extend([base + i, base + (i + 1) % segments]);
    }
  }

  mesh
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::mesh::tests::assert_outward_winding;
  use approx::assert_relative_eq;
  use cgmath::InnerSpace;

  #[test]
  fn quad_layout() {
    let mesh = quad(1.);

    assert_eq!(mesh.vertices.len(), 4);
    assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
    assert_outward_winding(&mesh);
  }

  #[test]
  fn sphere_slices_layout() {
    let mesh = sphere_slices(32, 16, 1.);
    assert_eq!(mesh.vertices.len(), 578);
    assert_eq!(mesh.indices.len(), 2880);
    assert!(mesh.validate().is_ok());

    let mesh = sphere_slices(8, 4, 2.);
    assert_eq!(mesh.vertices.len(), 50);
    assert_eq!(mesh.indices.len(), 144);
    assert!(mesh.validate().is_ok());
    assert_outward_winding(&mesh);
    for v in &mesh.vertices {
      assert_relative_eq!(Vector3::from(v.position).magnitude(), 2., epsilon = 1e-5);
    }
  }

  #[test]
  fn icosphere_layout() {
    let mesh = icosphere(2, 3.);

    assert_eq!(mesh.vertices.len(), 162);
    assert_eq!(mesh.triangle_count(), 320);
    assert!(mesh.validate().is_ok());
    assert_outward_winding(&mesh);
    for v in &mesh.vertices {
      assert_relative_eq!(Vector3::from(v.position).magnitude(), 3., epsilon = 1e-5);
    }
  }

  #[test]
  fn tube_layout() {
    let mesh = tube(8, 3, 2., 0.5);

    assert_eq!(mesh.vertices.len(), 60);
    assert_eq!(mesh.indices.len(), 192);
    assert!(mesh.validate().is_ok());
    assert_outward_winding(&mesh);
  }

  #[test]
  fn cone_layout() {
    let mesh = cone(8, 2, 2., 0.5);

    assert_eq!(mesh.vertices.len(), 40);
    assert_eq!(mesh.indices.len(), 96);
    assert!(mesh.validate().is_ok());
    assert_outward_winding(&mesh);

    let (_, top) = mesh
      .vertices
      .iter()
      .map(|v| v.position[2])
      .fold((f32::MAX, f32::MIN), |(lo, hi), z| (lo.min(z), hi.max(z)));
    assert_relative_eq!(top, 4. / 3., epsilon = 1e-6);
  }

  #[test]
  fn flat_cone_is_a_disc() {
    let mesh = cone(8, 2, 0., 1.);

    assert!(mesh.validate().is_ok());
    for v in &mesh.vertices {
      assert_relative_eq!(v.position[2], 0.);
      assert_relative_eq!(v.normal[2].abs(), 1.);
    }
  }

  #[test]
  fn torus_layout() {
    let mesh = torus(8, 12, 0.7, 0.3);

    assert_eq!(mesh.vertices.len(), 117);
    assert_eq!(mesh.indices.len(), 576);
    assert!(mesh.validate().is_ok());
    assert_outward_winding(&mesh);
  }

  #[test]
  fn revolved_half_circle_is_a_sphere() {
    let profile: Vec<[f32; 2]> = (0..=16)
      .map(|i| {
        let a = -PI / 2. + PI * i as f32 / 16.;
        [a.cos().max(0.), a.sin()]
      })
      .collect();
    let mesh = surface_of_revolution(&profile, 24);

    assert_eq!(mesh.vertices.len(), 17 * 25);
    assert_eq!(mesh.triangle_count(), 16 * 24 * 2);
    assert!(mesh.validate().is_ok());
    assert_outward_winding(&mesh);

    for v in &mesh.vertices {
      let p = Vector3::from(v.position);
      if p.z.abs() < 0.99 {
        assert!(Vector3::from(v.normal).dot(p) > 0.99);
      }
    }
  }

  #[test]
  fn short_profile_is_empty() {
    assert!(surface_of_revolution(&[[1., 0.]], 12).vertices.is_empty());
  }

  #[test]
  fn axis_circles_are_closed_loops() {
    let mesh = axis_circles(360);

    assert_eq!(mesh.primitive, PrimitiveKind::Lines);
    assert_eq!(mesh.vertices.len(), 1080);
    assert_eq!(mesh.indices.len(), 2160);
    assert!(mesh.validate().is_ok());
    assert_eq!(mesh.indices[719], 0);
    assert_eq!(mesh.indices[720], 360);

    let mut ws: Vec<f32> = mesh.vertices.iter().map(|v| v.uvw[2]).collect();
    ws.dedup();
    assert_eq!(ws, vec![0., 1. / 3., 2. / 3.]);
  }
}
