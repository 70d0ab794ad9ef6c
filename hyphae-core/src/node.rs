use crate::types::NodeIndex;
use glam::Vec2;
use thiserror::Error;

/// Whether a node may still be selected as a growth parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeState {
    Growing,
    Exhausted,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub pos: Vec2,
    pub radius: f32,
    pub parent: Option<NodeIndex>,
    pub child_count: u32,
    pub state: NodeState,
    /// Outward direction this node's descendants extend toward.
    pub growth_dir: f32,
    /// Half-width of the cone within which children may deviate
    /// from `growth_dir`.
    pub cone: f32,
}

impl Node {
    pub fn new_source(pos: Vec2, radius: f32, growth_dir: f32, cone: f32) -> Self {
        Self {
            pos,
            radius,
            parent: None,
            child_count: 0,
            state: NodeState::Growing,
            growth_dir,
            cone,
        }
    }

    pub fn new_child(pos: Vec2, radius: f32, parent: NodeIndex, growth_dir: f32, cone: f32) -> Self {
        Self {
            pos,
            radius,
            parent: Some(parent),
            child_count: 0,
            state: NodeState::Growing,
            growth_dir,
            cone,
        }
    }
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The store is at its hard maximum; fatal to the growth loop.
    #[error("node store is full ({capacity} nodes)")]
    CapacityExceeded { capacity: usize },
    /// Invalid index; a contract violation, not expected in normal
    /// operation.
    #[error("node index {index} out of range (store has {len} nodes)")]
    OutOfRange { index: NodeIndex, len: usize },
}

/// Append-only arena of node records with a hard capacity.
///
/// A node's identity is its index. Indices are assigned monotonically
/// at allocation and never reused; nothing is ever removed. Allocation
/// past `capacity` fails fast with [`StoreError::CapacityExceeded`]
/// instead of reallocating, preserving the index stability the grid
/// and parent links rely on.
#[derive(Debug)]
pub struct NodeStore {
    nodes: Vec<Node>,
    capacity: usize,
}

impl NodeStore {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a node and returns its permanent index.
    pub fn allocate(&mut self, node: Node) -> Result<NodeIndex, StoreError> {
        if self.nodes.len() >= self.capacity {
            return Err(StoreError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        let index = self.nodes.len();
        self.nodes.push(node);
        Ok(index)
    }

    pub fn get(&self, index: NodeIndex) -> Result<&Node, StoreError> {
        self.nodes.get(index).ok_or(StoreError::OutOfRange {
            index,
            len: self.nodes.len(),
        })
    }

    pub fn get_mut(&mut self, index: NodeIndex) -> Result<&mut Node, StoreError> {
        let len = self.nodes.len();
        self.nodes
            .get_mut(index)
            .ok_or(StoreError::OutOfRange { index, len })
    }

    pub fn count(&self) -> usize {
        self.nodes.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.nodes.len() >= self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }
}
