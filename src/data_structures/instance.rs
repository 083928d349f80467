//! Instance transformation data for GPU rendering.
//!
//! Per-instance data like position, rotation, scale and colour is stored as
//! GPU buffers and passed to shaders for efficient multi-draw instancing.

use std::ops::Mul;

use cgmath::One;

use crate::data_structures::mesh::Vertex;

/// Per-instance transformation and tint.
///
/// Used for GPU instancing: multiple copies of the same mesh can be rendered
/// with different transforms in a single draw call. Composing a parent with
/// a child (`parent * child`) multiplies the colours as well, so tinting a
/// container tints everything below it.
#[derive(Clone, Debug, PartialEq)]
pub struct Instance {
    pub position: cgmath::Vector3<f32>,
    pub rotation: cgmath::Quaternion<f32>,
    pub scale: cgmath::Vector3<f32>,
    pub colour: [f32; 4],
}

impl Instance {
    /// Create a new instance with identity transformation and a white tint.
    pub fn new() -> Self {
        Self {
            position: cgmath::Vector3::new(0.0, 0.0, 0.0),
            // `Quaternion::one()` is the identity quaternion (no rotation)
            rotation: cgmath::Quaternion::one(),
            scale: cgmath::Vector3::new(1.0, 1.0, 1.0),
            colour: [1.0; 4],
        }
    }

    pub fn with_position<P: Into<cgmath::Vector3<f32>>>(mut self, position: P) -> Self {
        self.position = position.into();
        self
    }

    pub fn with_rotation(mut self, rotation: cgmath::Quaternion<f32>) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale<S: Into<cgmath::Vector3<f32>>>(mut self, scale: S) -> Self {
        self.scale = scale.into();
        self
    }

    pub fn with_uniform_scale(self, scale: f32) -> Self {
        self.with_scale((scale, scale, scale))
    }

    pub fn with_rgb(mut self, rgb: [f32; 3]) -> Self {
        self.colour = [rgb[0], rgb[1], rgb[2], self.colour[3]];
        self
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.colour[3] = alpha;
        self
    }

    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
            * cgmath::Matrix4::from(self.rotation)
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    pub fn to_raw(&self) -> InstanceRaw {
        InstanceRaw {
            model: self.to_matrix().into(),
            normal: cgmath::Matrix3::from(self.rotation).into(),
            colour: self.colour,
        }
    }
}

impl<'a, 'b> Mul<&'b Instance> for &'a Instance {
    type Output = Instance;

    fn mul(self, rhs: &'b Instance) -> Self::Output {
        let new_rotation = self.rotation * rhs.rotation;

        let new_scale = cgmath::Vector3::new(
            self.scale.x * rhs.scale.x,
            self.scale.y * rhs.scale.y,
            self.scale.z * rhs.scale.z,
        );
        let scaled_rhs_pos = cgmath::Vector3::new(
            self.scale.x * rhs.position.x,
            self.scale.y * rhs.position.y,
            self.scale.z * rhs.position.z,
        );
        let new_position = self.position + (self.rotation * scaled_rhs_pos);

        Instance {
            position: new_position,
            rotation: new_rotation,
            scale: new_scale,
            colour: [
                self.colour[0] * rhs.colour[0],
                self.colour[1] * rhs.colour[1],
                self.colour[2] * rhs.colour[2],
                self.colour[3] * rhs.colour[3],
            ],
        }
    }
}

impl Mul<Instance> for Instance {
    type Output = Self;

    fn mul(self, rhs: Instance) -> Self::Output {
        &self * &rhs
    }
}

impl From<cgmath::Vector3<f32>> for Instance {
    fn from(position: cgmath::Vector3<f32>) -> Self {
        Instance {
            position,
            ..Default::default()
        }
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}

/**
 * The raw instance is the actual data stored on the GPU
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    model: [[f32; 4]; 4],
    normal: [[f32; 3]; 3],
    colour: [f32; 4],
}

/**
 * Stride layout: the model matrix as four vec4s, the rotation-only normal
 * matrix as three vec3s, then the RGBA tint.
 */
impl Vertex for InstanceRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            // We need to switch from using a step mode of Vertex to Instance
            // This means that our shaders will only change to use the next
            // instance when the shader starts processing a new instance
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                // A mat4 takes up 4 vertex slots as it is technically 4 vec4s. We need to define a slot
                // for each vec4. We don't have to do this in code, though.
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    // corresponds to the @location in the shader file.
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 8,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 16]>() as wgpu::BufferAddress,
                    shader_location: 9,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 19]>() as wgpu::BufferAddress,
                    shader_location: 10,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 22]>() as wgpu::BufferAddress,
                    shader_location: 11,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 25]>() as wgpu::BufferAddress,
                    shader_location: 12,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, InnerSpace, Rotation3, Vector3};

    #[test]
    fn children_follow_parent_rotation_and_scale() {
        let parent = Instance::new()
            .with_position((0.0, 0.0, -5.0))
            .with_rotation(cgmath::Quaternion::from_angle_y(Deg(90.0)))
            .with_uniform_scale(2.0);
        let child = Instance::new().with_position((0.0, 0.0, -1.0));
        let world = &parent * &child;
        assert!((world.position - Vector3::new(-2.0, 0.0, -5.0)).magnitude2() < 1e-8);
        assert_eq!(world.scale, Vector3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn tints_multiply() {
        let parent = Instance::new().with_rgb([0.5, 1.0, 1.0]);
        let child = Instance::new().with_rgb([1.0, 0.5, 1.0]).with_alpha(0.5);
        assert_eq!((parent * child).colour, [0.5, 0.5, 1.0, 0.5]);
    }
}
