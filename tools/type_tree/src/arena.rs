use tracing::debug;
use typedb_core::TypeNode;
use typedb_core::config::DedupPolicy;

/// Handle to a node stored in a [TypeArena].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

struct Slot {
    /// Always childless; the tree shape lives in `children`.
    node: TypeNode,
    children: Vec<NodeId>,
}

/// Append-only store for the forest under construction. Nodes are built in place and linked by
/// [NodeId]; [TypeArena::into_forest] turns the result into owned trees.
pub struct TypeArena {
    slots: Vec<Slot>,
    roots: Vec<NodeId>,
    policy: DedupPolicy,
}

impl TypeArena {
    pub fn new(policy: DedupPolicy) -> TypeArena {
        TypeArena {
            slots: Vec::new(),
            roots: Vec::new(),
            policy,
        }
    }

    /// Adds `node` as the last child of `parent`, or as a new root type if `parent` is `None`.
    /// Any children already on `node` are discarded.
    ///
    /// Returns `None` if the dedup policy rejected a root; nothing is stored in that case.
    pub fn add(&mut self, mut node: TypeNode, parent: Option<NodeId>) -> Option<NodeId> {
        node.children.clear();
        let id = NodeId(self.slots.len() as u32);
        match parent {
            None => {
                if self.policy == DedupPolicy::ByTypeName
                    && self
                        .roots
                        .iter()
                        .any(|&root| self.slots[root.index()].node.type_name == node.type_name)
                {
                    debug!("Discarding duplicate root type {:?}", node.type_name);
                    return None;
                }
                self.roots.push(id);
            }
            Some(parent) => {
                debug!(
                    "Adding {} as child of {}",
                    node.type_name,
                    self.slots[parent.index()].node.type_name
                );
                self.slots[parent.index()].children.push(id);
            }
        }
        self.slots.push(Slot {
            node,
            children: Vec::new(),
        });
        Some(id)
    }

    /// The node's own fields. Its children are reached through [TypeArena::children].
    pub fn node(&self, id: NodeId) -> &TypeNode {
        &self.slots[id.index()].node
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.slots[id.index()].children
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Total number of stored nodes.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Converts the arena into the forest of root types, in discovery order.
    pub fn into_forest(self) -> Vec<TypeNode> {
        // A child is always added after its parent, so building from the back finds every
        // child already assembled.
        let mut built: Vec<Option<TypeNode>> = Vec::with_capacity(self.slots.len());
        built.resize_with(self.slots.len(), || None);
        for (index, slot) in self.slots.into_iter().enumerate().rev() {
            let mut node = slot.node;
            node.children = slot
                .children
                .iter()
                .filter_map(|child| built[child.index()].take())
                .collect();
            built[index] = Some(node);
        }
        self.roots
            .iter()
            .filter_map(|root| built[root.index()].take())
            .collect()
    }
}
