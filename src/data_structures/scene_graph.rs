//! Scene graph and hierarchical scene organization.
//!
//! A node holds any number of instances. Each instance has a local
//! transform relative to the matching instance of its parent and a cached
//! world transform. Container nodes only group; mesh nodes own a mesh and
//! an instance buffer that mirrors their world transforms.

use std::ops::Range;

use log::warn;

use crate::{
    data_structures::{
        instance::{Instance, InstanceRaw},
        mesh::Mesh,
    },
    render::Instanced,
};

pub trait SceneNode {
    fn get_world_transforms(&self) -> Vec<Instance>;

    fn get_local_transform(&self, idx: usize) -> Option<Instance>;

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>>;

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>>;

    fn add_child(&mut self, child: Box<dyn SceneNode>);

    fn set_local_transform(&mut self, idx: usize, instance: Instance);

    fn set_local_transform_all(&mut self, mutation: &mut dyn FnMut(&mut Instance));

    fn instance_count(&self) -> usize;

    /// Replaces every local transform. Children are resized to match,
    /// new child instances copy the child's last local transform.
    fn replace_instances(&mut self, instances: Vec<Instance>);

    fn resize_instances(&mut self, amount: usize);

    /**
     * Multiple instances of a parent can be passed down to multiple instances of multiple children.
     * The argument `parents_world_transform` with a matching `range` size provides control over which instances are transformed.
     */
    fn update_world_transforms(&mut self, range: Range<usize>, parents_world_transform: &[Instance]);

    fn update_world_transform_all(&mut self) {
        let range = 0..self.instance_count();
        let identity: Vec<Instance> = range.clone().map(|_| Instance::default()).collect();
        self.update_world_transforms(range, &identity);
    }

    fn set_visible(&mut self, visible: bool);

    fn is_visible(&self) -> bool;

    fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device);

    /// Pushes this node's and its children's draws into the matching batch.
    fn collect_render<'a>(&'a self, opaque: &mut Vec<Instanced<'a>>, transparent: &mut Vec<Instanced<'a>>);
}

fn propagate(
    instances: &mut [(Instance, Instance)],
    children: &mut [Box<dyn SceneNode>],
    range: Range<usize>,
    parents_world_transform: &[Instance],
) {
    if parents_world_transform.len() > instances.len() {
        warn!(
            "You tried to transform with len {}, but there are only {} instances to transform.",
            parents_world_transform.len(),
            instances.len()
        );
        return;
    }
    let Some(slice) = instances.get_mut(range.clone()) else {
        warn!(
            "You tried to transform range {}..{}, which is out of bounds for parent len {}.",
            range.start,
            range.end,
            instances.len(),
        );
        return;
    };
    let world_transforms = slice
        .iter_mut()
        .zip(parents_world_transform.iter())
        .map(|((local, world), parent)| {
            *world = parent * &*local;
            world.clone()
        })
        .collect::<Vec<_>>();
    for child in children.iter_mut() {
        child.update_world_transforms(range.clone(), &world_transforms);
    }
}

fn resized(instances: &mut Vec<(Instance, Instance)>, amount: usize) {
    let template = instances.last().cloned().unwrap_or_default();
    instances.resize(amount, template);
}

pub struct ContainerNode {
    pub children: Vec<Box<dyn SceneNode>>,
    pub instances: Vec<(Instance, Instance)>,
    visible: bool,
}

impl ContainerNode {
    pub fn new(amount: usize) -> Self {
        let instances = (0..amount)
            .map(|_| (Instance::default(), Instance::default()))
            .collect();
        Self {
            instances,
            children: vec![],
            visible: true,
        }
    }
}

impl SceneNode for ContainerNode {
    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn set_local_transform(&mut self, idx: usize, instance: Instance) {
        if let Some((local, _)) = self.instances.get_mut(idx) {
            *local = instance;
        }
    }

    fn set_local_transform_all(&mut self, mutation: &mut dyn FnMut(&mut Instance)) {
        self.instances.iter_mut().for_each(|(local, _)| mutation(local));
    }

    fn get_world_transforms(&self) -> Vec<Instance> {
        self.instances.iter().map(|(_, world)| world).cloned().collect()
    }

    fn update_world_transforms(&mut self, range: Range<usize>, parents_world_transform: &[Instance]) {
        propagate(&mut self.instances, &mut self.children, range, parents_world_transform);
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn get_local_transform(&self, idx: usize) -> Option<Instance> {
        self.instances.get(idx).map(|(local, _)| local).cloned()
    }

    fn instance_count(&self) -> usize {
        self.instances.len()
    }

    fn replace_instances(&mut self, instances: Vec<Instance>) {
        let amount = instances.len();
        self.instances = instances.into_iter().map(|i| (i.clone(), i)).collect();
        for child in &mut self.children {
            child.resize_instances(amount);
        }
    }

    fn resize_instances(&mut self, amount: usize) {
        resized(&mut self.instances, amount);
        for child in &mut self.children {
            child.resize_instances(amount);
        }
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device) {
        self.children
            .iter_mut()
            .for_each(|child| child.write_to_buffers(queue, device));
    }

    fn collect_render<'a>(&'a self, opaque: &mut Vec<Instanced<'a>>, transparent: &mut Vec<Instanced<'a>>) {
        if !self.visible {
            return;
        }
        for child in &self.children {
            child.collect_render(opaque, transparent);
        }
    }
}

pub struct MeshNode {
    children: Vec<Box<dyn SceneNode>>,
    instance_buffer: wgpu::Buffer,
    capacity: usize,
    instances: Vec<(Instance, Instance)>,
    mesh: Mesh,
    transparent: bool,
    visible: bool,
}

impl MeshNode {
    pub fn new(device: &wgpu::Device, mesh: Mesh, amount: usize) -> Self {
        let instances = (0..amount)
            .map(|_| (Instance::default(), Instance::default()))
            .collect::<Vec<_>>();
        let capacity = amount.max(1);
        Self {
            children: vec![],
            instance_buffer: Self::mk_instance_buffer(device, &mesh.name, capacity),
            capacity,
            instances,
            mesh,
            transparent: false,
            visible: true,
        }
    }

    /// Draw this node with alpha blending instead of the opaque pipeline.
    pub fn transparent(mut self) -> Self {
        self.transparent = true;
        self
    }

    fn mk_instance_buffer(device: &wgpu::Device, name: &str, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{:?} Instance Buffer", name)),
            size: (capacity * std::mem::size_of::<InstanceRaw>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }
}

impl SceneNode for MeshNode {
    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn set_local_transform(&mut self, idx: usize, instance: Instance) {
        if let Some((local, _)) = self.instances.get_mut(idx) {
            *local = instance;
        }
    }

    fn set_local_transform_all(&mut self, mutation: &mut dyn FnMut(&mut Instance)) {
        self.instances.iter_mut().for_each(|(local, _)| mutation(local));
    }

    fn get_world_transforms(&self) -> Vec<Instance> {
        self.instances.iter().map(|(_, world)| world).cloned().collect()
    }

    fn update_world_transforms(&mut self, range: Range<usize>, parents_world_transform: &[Instance]) {
        propagate(&mut self.instances, &mut self.children, range, parents_world_transform);
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn get_local_transform(&self, idx: usize) -> Option<Instance> {
        self.instances.get(idx).map(|(local, _)| local).cloned()
    }

    fn instance_count(&self) -> usize {
        self.instances.len()
    }

    fn replace_instances(&mut self, instances: Vec<Instance>) {
        let amount = instances.len();
        self.instances = instances.into_iter().map(|i| (i.clone(), i)).collect();
        for child in &mut self.children {
            child.resize_instances(amount);
        }
    }

    fn resize_instances(&mut self, amount: usize) {
        resized(&mut self.instances, amount);
        for child in &mut self.children {
            child.resize_instances(amount);
        }
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device) {
        if self.instances.len() > self.capacity {
            self.capacity = self.instances.len().max(self.capacity * 2);
            self.instance_buffer = Self::mk_instance_buffer(device, &self.mesh.name, self.capacity);
        }
        if !self.instances.is_empty() {
            let raw_instances: Vec<InstanceRaw> = self
                .instances
                .iter()
                .map(|(_, world)| world.to_raw())
                .collect();
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&raw_instances));
        }
        self.children
            .iter_mut()
            .for_each(|child| child.write_to_buffers(queue, device));
    }

    fn collect_render<'a>(&'a self, opaque: &mut Vec<Instanced<'a>>, transparent: &mut Vec<Instanced<'a>>) {
        if !self.visible {
            return;
        }
        for child in &self.children {
            child.collect_render(opaque, transparent);
        }
        if self.instances.is_empty() {
            return;
        }
        let instanced = Instanced {
            instance: &self.instance_buffer,
            mesh: &self.mesh,
            amount: self.instances.len(),
        };
        if self.transparent {
            transparent.push(instanced);
        } else {
            opaque.push(instanced);
        }
    }
}
