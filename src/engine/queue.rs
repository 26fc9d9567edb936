//! Invalidation queue.
//!
//! FIFO of dirty nodes awaiting resolution. Each node is queued at most once.
//! Removal is lazy: the live map forgets the node and its stale entry is
//! skipped when it reaches the front, so `remove` is O(1) and the deque is
//! compacted once stale entries outnumber live ones.

use std::collections::{HashMap, VecDeque};

use super::arena::NodeId;

#[derive(Debug, Default)]
pub struct InvalidationQueue {
    entries: VecDeque<(NodeId, u64)>,
    live: HashMap<NodeId, u64>,
    next_ticket: u64,
}

impl InvalidationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node. Returns false if it was already queued.
    pub fn enqueue(&mut self, node: NodeId) -> bool {
        if self.live.contains_key(&node) {
            return false;
        }
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.live.insert(node, ticket);
        self.entries.push_back((node, ticket));
        true
    }

    /// Pop the oldest live node.
    pub fn dequeue(&mut self) -> Option<NodeId> {
        while let Some((node, ticket)) = self.entries.pop_front() {
            if self.live.get(&node) == Some(&ticket) {
                self.live.remove(&node);
                return Some(node);
            }
        }
        None
    }

    /// Forget a node. Returns false if it was not queued.
    pub fn remove(&mut self, node: NodeId) -> bool {
        if self.live.remove(&node).is_none() {
            return false;
        }
        if self.entries.len() > 32 && self.entries.len() > self.live.len() * 2 {
            self.compact();
        }
        true
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.live.contains_key(&node)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.live.clear();
    }

    fn compact(&mut self) {
        let live = &self.live;
        self.entries
            .retain(|(node, ticket)| live.get(node) == Some(ticket));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::arena::Arena;
    use crate::engine::node::{LayoutNode, NodeKind};

    fn ids(count: usize) -> Vec<NodeId> {
        let mut arena = Arena::new(0);
        (0..count)
            .map(|i| arena.insert(LayoutNode::new(&format!("n{i}"), NodeKind::Frame, None)))
            .collect()
    }

    #[test]
    fn test_fifo_order() {
        let n = ids(3);
        let mut queue = InvalidationQueue::new();
        for &id in &n {
            assert!(queue.enqueue(id));
        }
        assert_eq!(queue.dequeue(), Some(n[0]));
        assert_eq!(queue.dequeue(), Some(n[1]));
        assert_eq!(queue.dequeue(), Some(n[2]));
        assert_eq!(queue.dequeue(), None);
    }

    #[test]
    fn test_enqueue_is_idempotent() {
        let n = ids(2);
        let mut queue = InvalidationQueue::new();
        assert!(queue.enqueue(n[0]));
        assert!(queue.enqueue(n[1]));
        assert!(!queue.enqueue(n[0]));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.dequeue(), Some(n[0]));
    }

    #[test]
    fn test_remove_skips_entry() {
        let n = ids(3);
        let mut queue = InvalidationQueue::new();
        for &id in &n {
            queue.enqueue(id);
        }
        assert!(queue.remove(n[1]));
        assert!(!queue.remove(n[1]));
        assert!(!queue.contains(n[1]));
        assert_eq!(queue.dequeue(), Some(n[0]));
        assert_eq!(queue.dequeue(), Some(n[2]));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_requeue_after_remove_goes_to_back() {
        let n = ids(2);
        let mut queue = InvalidationQueue::new();
        queue.enqueue(n[0]);
        queue.enqueue(n[1]);
        queue.remove(n[0]);
        queue.enqueue(n[0]);

        assert_eq!(queue.dequeue(), Some(n[1]));
        assert_eq!(queue.dequeue(), Some(n[0]));
        assert_eq!(queue.dequeue(), None);
    }

    #[test]
    fn test_compaction_keeps_live_entries() {
        let n = ids(100);
        let mut queue = InvalidationQueue::new();
        for &id in &n {
            queue.enqueue(id);
        }
        for &id in &n[..90] {
            queue.remove(id);
        }
        assert!(queue.entries.len() < 100);
        assert_eq!(queue.len(), 10);

        let drained: Vec<_> = std::iter::from_fn(|| queue.dequeue()).collect();
        assert_eq!(drained, n[90..].to_vec());
    }
}
