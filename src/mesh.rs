//! Subdivided icosahedron with per-vertex radial length.
//!
//! Connectivity is fixed at construction. Each shared vertex keeps its unit
//! direction and a mutable radius; its position is `direction * radius`.

use glam::Vec3;

/// Two vertices closer than this are merged while subdividing.
const MERGE_EPSILON: f32 = 1e-4;

#[rustfmt::skip]
const ICOSAHEDRON_FACES: [[usize; 3]; 20] = [
    [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
    [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
    [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
    [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
];

fn icosahedron_corners() -> [Vec3; 12] {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    [
        Vec3::new(-1.0, t, 0.0),
        Vec3::new(1.0, t, 0.0),
        Vec3::new(-1.0, -t, 0.0),
        Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t),
        Vec3::new(0.0, 1.0, t),
        Vec3::new(0.0, -1.0, -t),
        Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0),
        Vec3::new(t, 0.0, 1.0),
        Vec3::new(-t, 0.0, -1.0),
        Vec3::new(-t, 0.0, 1.0),
    ]
}

/// Sphere mesh built by subdividing each icosahedron face into
/// `(detail + 1)^2` triangles and projecting onto the sphere.
#[derive(Clone, Debug)]
pub struct IcoSphere {
    directions: Vec<Vec3>,
    radii: Vec<f32>,
    faces: Vec<[u32; 3]>,
    base_radius: f32,
}

impl IcoSphere {
    pub fn new(base_radius: f32, detail: u32) -> Self {
        let corners = icosahedron_corners();
        let cols = detail as usize + 1;

        let mut directions: Vec<Vec3> = Vec::new();
        let mut faces = Vec::with_capacity(20 * cols * cols);

        for [a, b, c] in ICOSAHEDRON_FACES {
            let (a, b, c) = (corners[a], corners[b], corners[c]);

            // grid[i][j]: row i runs from the a-c edge to the b-c edge.
            let mut grid: Vec<Vec<u32>> = Vec::with_capacity(cols + 1);
            for i in 0..=cols {
                let t = i as f32 / cols as f32;
                let aj = a.lerp(c, t);
                let bj = b.lerp(c, t);
                let rows = cols - i;
                let row = (0..=rows)
                    .map(|j| {
                        let p = if rows == 0 {
                            aj
                        } else {
                            aj.lerp(bj, j as f32 / rows as f32)
                        };
                        merge_vertex(&mut directions, p.normalize())
                    })
                    .collect();
                grid.push(row);
            }

            for i in 0..cols {
                for j in 0..2 * (cols - i) - 1 {
                    let k = j / 2;
                    if j % 2 == 0 {
                        faces.push([grid[i][k + 1], grid[i + 1][k], grid[i][k]]);
                    } else {
                        faces.push([grid[i][k + 1], grid[i + 1][k + 1], grid[i + 1][k]]);
                    }
                }
            }
        }

        let radii = vec![base_radius; directions.len()];
        Self {
            directions,
            radii,
            faces,
            base_radius,
        }
    }

    /// Number of shared vertices a sphere of the given subdivision level has.
    pub fn vertex_count_for(detail: u32) -> usize {
        10 * (detail as usize + 1).pow(2) + 2
    }

    pub fn vertex_count(&self) -> usize {
        self.directions.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    pub fn base_radius(&self) -> f32 {
        self.base_radius
    }

    pub fn radius(&self, vertex: usize) -> f32 {
        self.radii[vertex]
    }

    pub fn set_radius(&mut self, vertex: usize, radius: f32) {
        self.radii[vertex] = radius;
    }

    /// Unit vector from the center through `vertex`. Doubles as its normal.
    pub fn direction(&self, vertex: usize) -> Vec3 {
        self.directions[vertex]
    }

    pub fn position(&self, vertex: usize) -> Vec3 {
        self.directions[vertex] * self.radii[vertex]
    }

    /// Every undirected edge once, smaller index first, sorted.
    pub fn edges(&self) -> Vec<[u32; 2]> {
        let mut edges: Vec<[u32; 2]> = self
            .faces
            .iter()
            .flat_map(|&[a, b, c]| [[a, b], [b, c], [c, a]])
            .map(|[x, y]| [x.min(y), x.max(y)])
            .collect();
        edges.sort_unstable();
        edges.dedup();
        edges
    }

    /// Positions of the shared vertices, three floats each.
    pub fn write_vertex_positions(&self, out: &mut Vec<f32>) {
        out.clear();
        for i in 0..self.vertex_count() {
            out.extend_from_slice(&self.position(i).to_array());
        }
    }

    /// Positions of every face corner, as a flat triangle list.
    pub fn write_corner_positions(&self, out: &mut Vec<f32>) {
        out.clear();
        for face in &self.faces {
            for &v in face {
                out.extend_from_slice(&self.position(v as usize).to_array());
            }
        }
    }

    /// Normals of every face corner, matching [`Self::write_corner_positions`].
    pub fn write_corner_normals(&self, out: &mut Vec<f32>) {
        out.clear();
        for face in &self.faces {
            for &v in face {
                out.extend_from_slice(&self.directions[v as usize].to_array());
            }
        }
    }
}

fn merge_vertex(directions: &mut Vec<Vec3>, dir: Vec3) -> u32 {
    let existing = directions
        .iter()
        .position(|d| d.distance_squared(dir) < MERGE_EPSILON * MERGE_EPSILON);
    let index = existing.unwrap_or_else(|| {
        directions.push(dir);
        directions.len() - 1
    });
    index as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_two_counts() {
        let mesh = IcoSphere::new(10.0, 2);
        assert_eq!(mesh.vertex_count(), 92);
        assert_eq!(mesh.face_count(), 180);
        assert_eq!(mesh.edges().len(), 270);
    }

    #[test]
    fn counts_follow_euler_formula() {
        for detail in 0..=4 {
            let mesh = IcoSphere::new(1.0, detail);
            let n = (detail as usize + 1).pow(2);
            assert_eq!(mesh.face_count(), 20 * n);
            assert_eq!(mesh.vertex_count(), 10 * n + 2);
            assert_eq!(mesh.vertex_count(), IcoSphere::vertex_count_for(detail));
            assert_eq!(mesh.edges().len(), 30 * n);
        }
    }

    #[test]
    fn vertices_rest_on_base_radius() {
        let mesh = IcoSphere::new(10.0, 2);
        for i in 0..mesh.vertex_count() {
            assert!((mesh.position(i).length() - 10.0).abs() < 1e-4);
            assert!((mesh.direction(i).length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn faces_reference_valid_distinct_vertices() {
        let mesh = IcoSphere::new(10.0, 2);
        let n = mesh.vertex_count() as u32;
        for &[a, b, c] in mesh.faces() {
            assert!(a < n && b < n && c < n);
            assert!(a != b && b != c && a != c);
        }
    }

    #[test]
    fn set_radius_moves_vertex_along_its_direction() {
        let mut mesh = IcoSphere::new(10.0, 1);
        mesh.set_radius(3, 15.0);
        let p = mesh.position(3);
        assert!((p.length() - 15.0).abs() < 1e-4);
        assert!(p.normalize().abs_diff_eq(mesh.direction(3), 1e-5));
    }

    #[test]
    fn corner_buffers_cover_every_face() {
        let mesh = IcoSphere::new(10.0, 2);
        let mut positions = Vec::new();
        let mut normals = Vec::new();
        mesh.write_corner_positions(&mut positions);
        mesh.write_corner_normals(&mut normals);
        assert_eq!(positions.len(), 180 * 3 * 3);
        assert_eq!(normals.len(), positions.len());

        let mut shared = Vec::new();
        mesh.write_vertex_positions(&mut shared);
        assert_eq!(shared.len(), 92 * 3);
    }
}
