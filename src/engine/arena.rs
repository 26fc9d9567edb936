//! Node arena - generational handle allocation.
//!
//! Manages the lifecycle of node slots:
//! - Free slot pool for O(1) reuse
//! - Generation counter per slot so stale handles never alias a new node
//! - Environment id baked into every handle so foreign handles are rejected

use std::fmt;

use super::node::LayoutNode;

// =============================================================================
// NodeId
// =============================================================================

/// Stable handle to a node.
///
/// A handle stays valid until the node is obliterated. After that every
/// lookup with it returns `None`, even once the slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    env: u32,
    index: u32,
    generation: u32,
}

impl NodeId {
    /// Id of the environment this handle belongs to.
    pub fn environment(self) -> u32 {
        self.env
    }

    pub fn index(self) -> usize {
        self.index as usize
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

// =============================================================================
// Arena
// =============================================================================

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<LayoutNode>,
}

/// Per-environment node storage.
#[derive(Debug)]
pub struct Arena {
    env: u32,
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl Arena {
    pub fn new(env: u32) -> Self {
        Self {
            env,
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    pub fn environment(&self) -> u32 {
        self.env
    }

    /// Store a node, reusing a freed slot when one is available.
    pub fn insert(&mut self, node: LayoutNode) -> NodeId {
        self.len += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId {
                env: self.env,
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            env: self.env,
            index,
            generation: 0,
        }
    }

    /// Take a node out. Its handle (and any copy of it) goes stale.
    pub fn remove(&mut self, id: NodeId) -> Option<LayoutNode> {
        if !self.contains(id) {
            return None;
        }
        let slot = &mut self.slots[id.index()];
        let node = slot.node.take();
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        node
    }

    pub fn get(&self, id: NodeId) -> Option<&LayoutNode> {
        if id.env != self.env {
            return None;
        }
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut LayoutNode> {
        if id.env != self.env {
            return None;
        }
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Handles of all live nodes, in slot order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.node.as_ref().map(|_| NodeId {
                env: self.env,
                index: index as u32,
                generation: slot.generation,
            })
        })
    }

    /// Dotted path of names from the root down to `id`.
    pub fn name_full(&self, id: NodeId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(cursor) = current {
            let Some(node) = self.get(cursor) else { break };
            if node.name.is_empty() {
                parts.push(cursor.to_string());
            } else {
                parts.push(node.name.clone());
            }
            current = node.parent;
        }
        parts.reverse();
        parts.join(".")
    }

    /// True if `ancestor` is `id` or lies on its parent chain.
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(cursor) = current {
            if cursor == ancestor {
                return true;
            }
            current = self.get(cursor).and_then(|node| node.parent);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::node::NodeKind;

    fn node(name: &str) -> LayoutNode {
        LayoutNode::new(name, NodeKind::Frame, None)
    }

    #[test]
    fn test_insert_and_get() {
        let mut arena = Arena::new(1);
        let a = arena.insert(node("a"));
        let b = arena.insert(node("b"));

        assert_ne!(a, b);
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(a).unwrap().name(), "a");
        assert_eq!(arena.get(b).unwrap().name(), "b");
    }

    #[test]
    fn test_removed_handle_goes_stale() {
        let mut arena = Arena::new(1);
        let a = arena.insert(node("a"));
        assert!(arena.remove(a).is_some());
        assert!(!arena.contains(a));
        assert!(arena.remove(a).is_none());

        // Slot is reused with a new generation
        let b = arena.insert(node("b"));
        assert_eq!(a.index(), b.index());
        assert_ne!(a.generation(), b.generation());
        assert!(arena.get(a).is_none());
        assert_eq!(arena.get(b).unwrap().name(), "b");
    }

    #[test]
    fn test_foreign_handle_rejected() {
        let mut first = Arena::new(1);
        let mut second = Arena::new(2);
        let a = first.insert(node("a"));
        second.insert(node("b"));

        assert!(second.get(a).is_none());
        assert_eq!(a.environment(), 1);
    }

    #[test]
    fn test_name_full_and_ancestry() {
        let mut arena = Arena::new(1);
        let root = arena.insert(node("Root"));
        let panel = arena.insert(LayoutNode::new("panel", NodeKind::Frame, Some(root)));
        let anon = arena.insert(LayoutNode::new("", NodeKind::Frame, Some(panel)));

        assert_eq!(arena.name_full(panel), "Root.panel");
        assert_eq!(arena.name_full(anon), format!("Root.panel.{anon}"));
        assert!(arena.is_ancestor_or_self(root, anon));
        assert!(arena.is_ancestor_or_self(anon, anon));
        assert!(!arena.is_ancestor_or_self(anon, root));
    }

    #[test]
    fn test_ids_lists_live_nodes() {
        let mut arena = Arena::new(3);
        let a = arena.insert(node("a"));
        let b = arena.insert(node("b"));
        arena.remove(a);

        let ids: Vec<_> = arena.ids().collect();
        assert_eq!(ids, vec![b]);
    }
}
