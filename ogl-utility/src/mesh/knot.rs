//! Tubes swept along knots.

use std::f32::consts::PI;

use cgmath::{InnerSpace as _, Vector3};

use super::{normalized, Mesh, PrimitiveKind};

/// Trefoil knot parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrefoilKnot {
  /// Subdivisions around the tube.
  pub stacks: u32,
  /// Subdivisions along the knot.
  pub slices: u32,
  /// Mean radius of the knot in the xy plane.
  pub ra: f32,
  /// Radial amplitude of the windings.
  pub rb: f32,
  /// Height amplitude of the windings.
  pub rc: f32,
  /// Radius of the tube.
  pub rd: f32,
}

impl Default for TrefoilKnot {
  fn default() -> Self {
    TrefoilKnot {
      stacks: 32,
      slices: 256,
      ra: 0.6,
      rb: 0.2,
      rc: 0.4,
      rd: 0.175,
    }
  }
}

impl TrefoilKnot {
  /// Point of the tube surface at `s` along the knot and `t` around the tube, both in `[0, 1]`.
  fn sample(&self, s: f32, t: f32) -> Vector3<f32> {
    let u = (1. - s) * 4. * PI;
    let v = t * 2. * PI;
    let r = self.ra + self.rb * (1.5 * u).cos();
    let center = Vector3::new(r * u.cos(), r * u.sin(), self.rc * (1.5 * u).sin());

    let tangent = Vector3::new(
      -1.5 * self.rb * (1.5 * u).sin() * u.cos() - r * u.sin(),
      -1.5 * self.rb * (1.5 * u).sin() * u.sin() + r * u.cos(),
      1.5 * self.rc * (1.5 * u).cos(),
    )
    .normalize();
    let side = Vector3::new(tangent.y, -tangent.x, 0.).normalize();
    let up = tangent.cross(side);

    center + (side * v.cos() + up * v.sin()) * self.rd
  }

  /// Generate the mesh.
  pub fn mesh(&self) -> Mesh {
    const E: f32 = 0.01;

    let stacks = self.stacks.max(3);
    let slices = self.slices.max(3);
    let mut mesh = Mesh::with_capacity(
      PrimitiveKind::Triangles,
      ((slices + 1) * (stacks + 1)) as usize,
      (slices * stacks * 6) as usize,
    );

    for i in 0..=slices {
      let s = i as f32 / slices as f32;
      for j in 0..=stacks {
        let t = j as f32 / stacks as f32;
        let p = self.sample(s, t);
        let du = self.sample(s + E, t) - p;
        let dv = self.sample(s, t + E) - p;

        mesh.push_vertex(p.into(), normalized(du.cross(dv)), [s * 18., t, s]);
      }
    }

    let row = stacks + 1;
    for i in 0..slices {
      let n = i * row;
      for j in 0..stacks {
        mesh.indices.extend([n + j, n + j + row, n + j + 1]);
        mesh
          .indices
          .extend([n + j + row, n + j + 1 + row, n + j + 1]);
      }
    }

    mesh
  }
}

/// Trefoil knot with the default radii.
pub fn trefoil_knot(stacks: u32, slices: u32) -> Mesh {
  TrefoilKnot {
    stacks,
    slices,
    ..TrefoilKnot::default()
  }
  .mesh()
}

/// (p, q) torus knot parameters.
///
/// The knot winds `p` times around the torus tube and `q` times around its axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TorusKnot {
  /// Subdivisions around the tube.
  pub tess_v: u32,
  /// Subdivisions along the knot.
  pub tess_u: u32,
  /// Windings around the torus tube.
  pub p: u32,
  /// Windings around the torus axis.
  pub q: u32,
  /// Torus radius.
  pub ra: f32,
  /// Torus tube radius.
  pub rb: f32,
  /// Radius of the knot tube.
  pub rc: f32,
}

impl Default for TorusKnot {
  fn default() -> Self {
    TorusKnot {
      tess_v: 32,
      tess_u: 512,
      p: 7,
      q: 3,
      ra: 0.7,
      rb: 0.3,
      rc: 0.1,
    }
  }
}

impl TorusKnot {
  /// `p` and `q` divided by their greatest common divisor.
  ///
  /// Non-coprime windings would trace the same curve several times. A null `q` is raised to 1.
  pub fn reduced_windings(&self) -> (u32, u32) {
    let d = gcd(self.p, self.q);
    let (p, q) = if d > 1 {
      (self.p / d, self.q / d)
    } else {
      (self.p, self.q)
    };

    (p, q.max(1))
  }

  fn sample(phi: f32, p: f32, q: f32, r1: f32, r2: f32) -> Vector3<f32> {
    let r = r1 + r2 * (p * phi).cos();
    Vector3::new(r * (q * phi).cos(), r * (q * phi).sin(), -r2 * (p * phi).sin())
  }

  /// Generate the mesh.
  pub fn mesh(&self) -> Mesh {
    let (p, q) = self.reduced_windings();
    let (pf, qf) = (p as f32, q as f32);
    let tess_u = self.tess_u.max(3);
    let tess_v = self.tess_v.max(3);

    let mut mesh = Mesh::with_capacity(
      PrimitiveKind::Triangles,
      ((tess_u + 1) * (tess_v + 1)) as usize,
      (tess_u * tess_v * 6) as usize,
    );

    for u in 0..=tess_u {
      let phi0 = 2. * PI * u as f32 / tess_u as f32;
      let phi1 = 2. * PI * (u + 1) as f32 / tess_u as f32;
      let p0 = Self::sample(phi0, pf, qf, self.ra, self.rb);
      let p1 = Self::sample(phi1, pf, qf, self.ra, self.rb);
      let c = Self::sample(phi0, pf, qf, self.ra, 0.);

      // frame of the knot curve: binormal points away from the torus core
      let b = (p0 - c).normalize();
      let n = (p1 - p0).cross(b).normalize();

      for v in 0..=tess_v {
        let theta = 2. * PI * v as f32 / tess_v as f32;
        let offset = n * (theta.sin() * self.rc) + b * (theta.cos() * self.rc);
        let uvw = [
          3. * pf * qf * u as f32 / tess_u as f32,
          v as f32 / tess_v as f32,
          u as f32 / tess_u as f32,
        ];

        mesh.push_vertex((p0 + offset).into(), normalized(offset), uvw);
      }
    }

    let row = tess_v + 1;
    for strip in 0..tess_u {
      for v in 0..tess_v {
        let e = [
          strip * row + v,
          strip * row + v + 1,
          (strip + 1) * row + v + 1,
          (strip + 1) * row + v,
        ];
        mesh.indices.extend([e[0], e[1], e[2], e[0], e[2], e[3]]);
      }
    }

    mesh
  }
}

/// (p, q) torus knot with the default radii.
pub fn torus_knot(tess_v: u32, tess_u: u32, p: u32, q: u32) -> Mesh {
  TorusKnot {
    tess_v,
    tess_u,
    p,
    q,
    ..TorusKnot::default()
  }
  .mesh()
}

fn gcd(a: u32, b: u32) -> u32 {
  if b == 0 {
    a
  } else {
    gcd(b, a % b)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::mesh::tests::assert_outward_winding;
  use cgmath::InnerSpace;

  #[test]
  fn windings_are_reduced() {
    let knot = TorusKnot {
      p: 6,
      q: 4,
      ..TorusKnot::default()
    };
    assert_eq!(knot.reduced_windings(), (3, 2));

    let knot = TorusKnot {
      p: 7,
      q: 3,
      ..TorusKnot::default()
    };
    assert_eq!(knot.reduced_windings(), (7, 3));

    let knot = TorusKnot {
      p: 2,
      q: 0,
      ..TorusKnot::default()
    };
    assert_eq!(knot.reduced_windings(), (1, 1));
  }

  #[test]
  fn torus_knot_layout() {
    let mesh = torus_knot(8, 64, 3, 2);

    assert_eq!(mesh.vertices.len(), 65 * 9);
    assert_eq!(mesh.triangle_count(), 64 * 8 * 2);
    assert!(mesh.validate().is_ok());
    assert_outward_winding(&mesh);
  }

  #[test]
  fn trefoil_knot_layout() {
    let mesh = trefoil_knot(8, 64);

    assert_eq!(mesh.vertices.len(), 65 * 9);
    assert_eq!(mesh.triangle_count(), 64 * 8 * 2);
    assert!(mesh.validate().is_ok());
    assert_outward_winding(&mesh);
  }

  #[test]
  fn trefoil_knot_tube_radius() {
    let knot = TrefoilKnot::default();
    let center = knot.sample(0.3, 0.);
    let opposite = knot.sample(0.3, 0.5);

    approx::assert_relative_eq!((center - opposite).magnitude(), 2. * knot.rd, epsilon = 1e-4);
  }
}
