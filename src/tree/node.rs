use crate::moves::Move;

/// Handle to a node of a [`MoveTree`](super::MoveTree). Handles of removed nodes stay
/// invalid even when their slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    slot: u32,
    generation: u32,
}

/// One ply in the tree. Child 0 continues the main line, the others are variations.
#[derive(Debug, Clone)]
pub struct TreeNode {
    mv: Move,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    index: usize,
}

impl TreeNode {
    fn new(mv: Move, parent: Option<NodeId>, index: usize) -> Self {
        Self {
            mv,
            parent,
            children: Vec::new(),
            index,
        }
    }

    pub fn mv(&self) -> &Move {
        &self.mv
    }

    pub(crate) fn mv_mut(&mut self) -> &mut Move {
        &mut self.mv
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn next_main(&self) -> Option<NodeId> {
        self.children.first().copied()
    }

    pub fn next_variation(&self, index: usize) -> Option<NodeId> {
        self.children.get(index).copied()
    }

    /// Position of this node in its parent's child list.
    pub fn index_in_parent(&self) -> usize {
        self.index
    }

    pub fn index_of(&self, child: NodeId) -> Option<usize> {
        self.children.iter().position(|c| *c == child)
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<TreeNode>,
}

/// Slot storage for tree nodes. Children are owned through the parent's child list only;
/// the parent link is a plain handle used for navigation.
#[derive(Debug, Clone, Default)]
pub(crate) struct NodeArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl NodeArena {
    pub fn insert_root(&mut self, mv: Move) -> NodeId {
        self.insert(TreeNode::new(mv, None, 0))
    }

    fn insert(&mut self, node: TreeNode) -> NodeId {
        match self.free.pop() {
            Some(slot) => {
                let entry = &mut self.slots[slot as usize];
                entry.node = Some(node);
                NodeId {
                    slot,
                    generation: entry.generation,
                }
            }
            None => {
                let slot = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId {
                    slot,
                    generation: 0,
                }
            }
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.slots
            .get(id.slot as usize)
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.node.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        self.slots
            .get_mut(id.slot as usize)
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.node.as_mut())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// New first child of `parent`; the previous main continuation becomes a variation.
    pub fn add_main(&mut self, parent: NodeId, mv: Move) -> Option<NodeId> {
        self.get(parent)?;
        let id = self.insert(TreeNode::new(mv, Some(parent), 0));
        self.get_mut(parent)?.children.insert(0, id);
        self.reindex(parent);
        Some(id)
    }

    /// New last child of `parent`.
    pub fn add_variation(&mut self, parent: NodeId, mv: Move) -> Option<NodeId> {
        let index = self.get(parent)?.children.len();
        let id = self.insert(TreeNode::new(mv, Some(parent), index));
        self.get_mut(parent)?.children.push(id);
        Some(id)
    }

    /// Deletes child `index` of `parent` with its whole subtree.
    pub fn remove(&mut self, parent: NodeId, index: usize) -> bool {
        match self.detach(parent, index) {
            Some(child) => {
                self.free_subtree(child);
                true
            }
            None => false,
        }
    }

    /// Unlinks child `index` of `parent` without freeing it.
    pub fn detach(&mut self, parent: NodeId, index: usize) -> Option<NodeId> {
        let node = self.get_mut(parent)?;
        if index >= node.children.len() {
            return None;
        }
        let child = node.children.remove(index);
        self.reindex(parent);
        if let Some(detached) = self.get_mut(child) {
            detached.parent = None;
            detached.index = 0;
        }
        Some(child)
    }

    /// Links a detached node as the last child of `parent`.
    pub fn adopt(&mut self, parent: NodeId, child: NodeId) {
        let Some(index) = self.get(parent).map(|p| p.children.len()) else {
            return;
        };
        if let Some(node) = self.get_mut(child) {
            node.parent = Some(parent);
            node.index = index;
        } else {
            return;
        }
        if let Some(node) = self.get_mut(parent) {
            node.children.push(child);
        }
    }

    pub fn promote_variation_to_main(&mut self, parent: NodeId, index: usize) {
        let Some(node) = self.get_mut(parent) else {
            return;
        };
        if index == 0 || index >= node.children.len() {
            return;
        }
        let child = node.children.remove(index);
        node.children.insert(0, child);
        self.reindex(parent);
    }

    /// Frees `id` and all of its descendants. The parent's child list is not touched.
    pub fn free_subtree(&mut self, id: NodeId) {
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let Some(entry) = self.slots.get_mut(current.slot as usize) else {
                continue;
            };
            if entry.generation != current.generation {
                continue;
            }
            if let Some(node) = entry.node.take() {
                pending.extend(node.children);
                entry.generation = entry.generation.wrapping_add(1);
                self.free.push(current.slot);
            }
        }
    }

    fn reindex(&mut self, parent: NodeId) {
        let Some(children) = self.get(parent).map(|p| p.children.clone()) else {
            return;
        };
        for (index, child) in children.into_iter().enumerate() {
            if let Some(node) = self.get_mut(child) {
                node.index = index;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena_with_root() -> (NodeArena, NodeId) {
        let mut arena = NodeArena::default();
        let root = arena.insert_root(Move::new("", 0, 0));
        (arena, root)
    }

    fn tokens(arena: &NodeArena, parent: NodeId) -> Vec<String> {
        arena
            .get(parent)
            .unwrap()
            .children()
            .iter()
            .map(|c| arena.get(*c).unwrap().mv().token().to_string())
            .collect()
    }

    #[test]
    fn test_add_main_pushes_existing_child_to_variation() {
        let (mut arena, root) = arena_with_root();
        let a = arena.add_main(root, Move::new("e2e4", 0, 1)).unwrap();
        let b = arena.add_main(root, Move::new("d2d4", 0, 1)).unwrap();

        assert_eq!(tokens(&arena, root), ["d2d4", "e2e4"]);
        assert_eq!(arena.get(b).unwrap().index_in_parent(), 0);
        assert_eq!(arena.get(a).unwrap().index_in_parent(), 1);
        assert_eq!(arena.get(root).unwrap().next_main(), Some(b));
        assert_eq!(arena.get(root).unwrap().next_variation(1), Some(a));
        assert_eq!(arena.get(root).unwrap().next_variation(2), None);
    }

    #[test]
    fn test_add_variation_appends() {
        let (mut arena, root) = arena_with_root();
        arena.add_variation(root, Move::new("e2e4", 0, 1)).unwrap();
        let c = arena.add_variation(root, Move::new("c2c4", 0, 1)).unwrap();

        assert_eq!(tokens(&arena, root), ["e2e4", "c2c4"]);
        assert_eq!(arena.get(c).unwrap().index_in_parent(), 1);
        assert_eq!(arena.get(root).unwrap().index_of(c), Some(1));
        assert!(arena.get(root).unwrap().is_root());
        assert!(!arena.get(c).unwrap().is_root());
    }

    #[test]
    fn test_remove_frees_subtree_and_reindexes() {
        let (mut arena, root) = arena_with_root();
        let a = arena.add_variation(root, Move::new("e2e4", 0, 1)).unwrap();
        let a1 = arena.add_variation(a, Move::new("e7e5", 1, 2)).unwrap();
        let b = arena.add_variation(root, Move::new("d2d4", 0, 1)).unwrap();

        assert!(arena.remove(root, 0));
        assert!(!arena.contains(a));
        assert!(!arena.contains(a1));
        assert_eq!(arena.get(b).unwrap().index_in_parent(), 0);
        assert_eq!(arena.len(), 2);
        assert!(!arena.remove(root, 5));
    }

    #[test]
    fn test_stale_handle_after_slot_reuse() {
        let (mut arena, root) = arena_with_root();
        let a = arena.add_variation(root, Move::new("e2e4", 0, 1)).unwrap();
        arena.remove(root, 0);
        let b = arena.add_variation(root, Move::new("d2d4", 0, 1)).unwrap();

        assert!(arena.get(a).is_none());
        assert_eq!(arena.get(b).unwrap().mv().token(), "d2d4");
    }

    #[test]
    fn test_promote_variation_to_main() {
        let (mut arena, root) = arena_with_root();
        arena.add_variation(root, Move::new("e2e4", 0, 1)).unwrap();
        arena.add_variation(root, Move::new("d2d4", 0, 1)).unwrap();
        let c = arena.add_variation(root, Move::new("c2c4", 0, 1)).unwrap();

        arena.promote_variation_to_main(root, 2);
        assert_eq!(tokens(&arena, root), ["c2c4", "e2e4", "d2d4"]);
        assert_eq!(arena.get(c).unwrap().index_in_parent(), 0);

        arena.promote_variation_to_main(root, 0);
        arena.promote_variation_to_main(root, 9);
        assert_eq!(tokens(&arena, root), ["c2c4", "e2e4", "d2d4"]);
    }
}
