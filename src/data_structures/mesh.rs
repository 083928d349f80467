//! Procedural low-poly meshes.
//!
//! Every shape is emitted as a flat triangle list with one face normal per
//! triangle, which gives the faceted look without any textures. Triangles
//! are wound counter-clockwise seen from outside and normals point away
//! from the shape's centroid.

use std::{f32::consts::TAU, ops::Range};

use cgmath::{EuclideanSpace, InnerSpace, Point3, Vector3};
use rand::{Rng, SeedableRng, rngs::StdRng};
use wgpu::util::DeviceExt;

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex for MeshVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// CPU side triangle soup.
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    pub vertices: Vec<MeshVertex>,
}

impl Geometry {
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Adds a triangle, flipping it if needed so it faces away from `centre`.
    fn push_facing_out(&mut self, centre: Point3<f32>, tri: [Point3<f32>; 3]) {
        let [a, mut b, mut c] = tri;
        let mut normal = (b - a).cross(c - a);
        if normal.magnitude2() < 1e-12 {
            return;
        }
        let mid = Point3::new(
            (a.x + b.x + c.x) / 3.0,
            (a.y + b.y + c.y) / 3.0,
            (a.z + b.z + c.z) / 3.0,
        );
        if normal.dot(mid - centre) < 0.0 {
            std::mem::swap(&mut b, &mut c);
            normal = -normal;
        }
        let normal: [f32; 3] = normal.normalize().into();
        for p in [a, b, c] {
            self.vertices.push(MeshVertex {
                position: p.into(),
                normal,
            });
        }
    }

    fn from_faces(centre: Point3<f32>, points: &[Point3<f32>], faces: &[[usize; 3]]) -> Self {
        let mut geometry = Geometry::default();
        for face in faces {
            geometry.push_facing_out(centre, [points[face[0]], points[face[1]], points[face[2]]]);
        }
        geometry
    }

    /// Frustum along +Y centred on the origin. A zero radius collapses that
    /// end into a point and drops its cap.
    pub fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, segments: usize) -> Self {
        let segments = segments.max(3);
        let half = height / 2.0;
        let ring = |radius: f32, y: f32| -> Vec<Point3<f32>> {
            (0..segments)
                .map(|i| {
                    let theta = i as f32 / segments as f32 * TAU;
                    Point3::new(radius * theta.sin(), y, radius * theta.cos())
                })
                .collect()
        };
        let top = ring(radius_top, half);
        let bottom = ring(radius_bottom, -half);
        let centre = Point3::new(0.0, 0.0, 0.0);
        let top_centre = Point3::new(0.0, half, 0.0);
        let bottom_centre = Point3::new(0.0, -half, 0.0);

        let mut geometry = Geometry::default();
        for i in 0..segments {
            let j = (i + 1) % segments;
            if radius_top > 0.0 {
                geometry.push_facing_out(centre, [top[i], bottom[i], top[j]]);
            }
            if radius_bottom > 0.0 {
                geometry.push_facing_out(centre, [bottom[i], bottom[j], top[j]]);
            }
            if radius_top > 0.0 {
                geometry.push_facing_out(centre, [top_centre, top[i], top[j]]);
            }
            if radius_bottom > 0.0 {
                geometry.push_facing_out(centre, [bottom_centre, bottom[j], bottom[i]]);
            }
        }
        geometry
    }

    pub fn cone(radius: f32, height: f32, segments: usize) -> Self {
        Self::cylinder(0.0, radius, height, segments)
    }

    pub fn octahedron(radius: f32) -> Self {
        let r = radius;
        let points = [
            Point3::new(r, 0.0, 0.0),
            Point3::new(-r, 0.0, 0.0),
            Point3::new(0.0, r, 0.0),
            Point3::new(0.0, -r, 0.0),
            Point3::new(0.0, 0.0, r),
            Point3::new(0.0, 0.0, -r),
        ];
        let faces = [
            [0, 2, 4],
            [2, 1, 4],
            [1, 3, 4],
            [3, 0, 4],
            [2, 0, 5],
            [1, 2, 5],
            [3, 1, 5],
            [0, 3, 5],
        ];
        Self::from_faces(Point3::new(0.0, 0.0, 0.0), &points, &faces)
    }

    fn icosahedron_points(radius: f32) -> Vec<Point3<f32>> {
        let t = (1.0 + 5.0f32.sqrt()) / 2.0;
        [
            (-1.0, t, 0.0),
            (1.0, t, 0.0),
            (-1.0, -t, 0.0),
            (1.0, -t, 0.0),
            (0.0, -1.0, t),
            (0.0, 1.0, t),
            (0.0, -1.0, -t),
            (0.0, 1.0, -t),
            (t, 0.0, -1.0),
            (t, 0.0, 1.0),
            (-t, 0.0, -1.0),
            (-t, 0.0, 1.0),
        ]
        .into_iter()
        .map(|(x, y, z)| Point3::from_vec(Vector3::new(x, y, z).normalize() * radius))
        .collect()
    }

    const ICOSAHEDRON_FACES: [[usize; 3]; 20] = [
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];

    pub fn icosahedron(radius: f32) -> Self {
        let points = Self::icosahedron_points(radius);
        Self::from_faces(Point3::new(0.0, 0.0, 0.0), &points, &Self::ICOSAHEDRON_FACES)
    }

    /// Icosahedron with every vertex pushed in or out by up to `jitter`
    /// (relative to the radius).
    pub fn rock(radius: f32, jitter: f32, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let points: Vec<Point3<f32>> = Self::icosahedron_points(radius)
            .into_iter()
            .map(|p| {
                let scale = 1.0 + rng.gen_range(-jitter..=jitter);
                Point3::new(p.x * scale, p.y * scale, p.z * scale)
            })
            .collect();
        Self::from_faces(Point3::new(0.0, 0.0, 0.0), &points, &Self::ICOSAHEDRON_FACES)
    }

    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let (x, y, z) = (width / 2.0, height / 2.0, depth / 2.0);
        let points: Vec<Point3<f32>> = (0..8)
            .map(|i| {
                Point3::new(
                    if i & 1 == 0 { -x } else { x },
                    if i & 2 == 0 { -y } else { y },
                    if i & 4 == 0 { -z } else { z },
                )
            })
            .collect();
        let faces = [
            [0, 1, 3],
            [0, 3, 2],
            [4, 6, 7],
            [4, 7, 5],
            [0, 4, 5],
            [0, 5, 1],
            [2, 3, 7],
            [2, 7, 6],
            [0, 2, 6],
            [0, 6, 4],
            [1, 5, 7],
            [1, 7, 3],
        ];
        Self::from_faces(Point3::new(0.0, 0.0, 0.0), &points, &faces)
    }

    pub fn translated(mut self, offset: Vector3<f32>) -> Self {
        for vertex in &mut self.vertices {
            vertex.position = (Vector3::from(vertex.position) + offset).into();
        }
        self
    }
}

/// A [`Geometry`] uploaded to the GPU.
#[derive(Debug)]
pub struct Mesh {
    pub name: String,
    pub vertex_buffer: wgpu::Buffer,
    pub num_vertices: u32,
}

impl Mesh {
    pub fn upload(device: &wgpu::Device, name: &str, geometry: &Geometry) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Vertex Buffer", name)),
            contents: bytemuck::cast_slice(&geometry.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            name: name.to_string(),
            vertex_buffer,
            num_vertices: geometry.vertices.len() as u32,
        }
    }
}

pub trait DrawMesh<'a> {
    fn draw_mesh_instanced(
        &mut self,
        mesh: &'a Mesh,
        instances: Range<u32>,
        camera_bind_group: &'a wgpu::BindGroup,
        light_bind_group: &'a wgpu::BindGroup,
    );
}

impl<'a, 'b> DrawMesh<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh_instanced(
        &mut self,
        mesh: &'b Mesh,
        instances: Range<u32>,
        camera_bind_group: &'b wgpu::BindGroup,
        light_bind_group: &'b wgpu::BindGroup,
    ) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_bind_group(0, camera_bind_group, &[]);
        self.set_bind_group(1, light_bind_group, &[]);
        self.draw(0..mesh.num_vertices, instances);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_outward(geometry: &Geometry) {
        for tri in geometry.vertices.chunks(3) {
            let normal = Vector3::from(tri[0].normal);
            assert!((normal.magnitude() - 1.0).abs() < 1e-4);
            let mid = (Vector3::from(tri[0].position)
                + Vector3::from(tri[1].position)
                + Vector3::from(tri[2].position))
                / 3.0;
            assert!(normal.dot(mid) > 0.0);
            // Counter-clockwise seen from outside.
            let a = Vector3::from(tri[0].position);
            let winding = (Vector3::from(tri[1].position) - a).cross(Vector3::from(tri[2].position) - a);
            assert!(winding.dot(normal) > 0.0);
        }
    }

    #[test]
    fn cylinder_has_sides_and_caps() {
        let geometry = Geometry::cylinder(1.2, 1.2, 1.5, 8);
        assert_eq!(geometry.triangle_count(), 32);
        assert_outward(&geometry);
    }

    #[test]
    fn cone_drops_the_pointy_cap() {
        let geometry = Geometry::cone(0.7, 2.0, 8);
        assert_eq!(geometry.triangle_count(), 16);
        assert_outward(&geometry);
    }

    #[test]
    fn platonic_solids() {
        let octahedron = Geometry::octahedron(1.0);
        assert_eq!(octahedron.triangle_count(), 8);
        assert_outward(&octahedron);

        let icosahedron = Geometry::icosahedron(1.0);
        assert_eq!(icosahedron.triangle_count(), 20);
        assert_outward(&icosahedron);
    }

    #[test]
    fn rocks_stay_closed_and_outward() {
        let rock = Geometry::rock(1.0, 0.25, 11);
        assert_eq!(rock.triangle_count(), 20);
        assert_outward(&rock);
    }

    #[test]
    fn cuboid_faces() {
        let cuboid = Geometry::cuboid(2.0, 1.0, 3.0);
        assert_eq!(cuboid.triangle_count(), 12);
        assert_outward(&cuboid);
    }
}
