mod compact;
mod node;

pub use node::{NodeId, TreeNode};

use crate::error::TreeError;
use crate::moves::Move;
use node::NodeArena;

/// Item of the depth-first walk used to write portable movetext.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortableToken {
    Move { node: NodeId, force_number: bool },
    OpenVariation,
    CloseVariation,
}

/// A game as a tree of annotated moves: the main line plus nested variations.
///
/// The tokens along the main line (root, child 0, child 0, ...) are cached and kept in
/// sync by every structural change.
#[derive(Debug, Clone)]
pub struct MoveTree {
    arena: NodeArena,
    root: NodeId,
    main_line: Vec<String>,
    initial_half_move_number: u32,
    initial_mover_round: u32,
    total_movers: usize,
}

impl Default for MoveTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveTree {
    pub fn new() -> Self {
        let mut arena = NodeArena::default();
        let root = arena.insert_root(Move::new("", 0, 0));
        Self {
            arena,
            root,
            main_line: Vec::new(),
            initial_half_move_number: 1,
            initial_mover_round: 0,
            total_movers: 2,
        }
    }

    /// Sets where numbering starts: full move `move_number` with `mover_round` to move,
    /// out of `total_movers` movers per round.
    pub fn set_initial_condition(
        &mut self,
        move_number: u32,
        mover_round: usize,
        total_movers: usize,
    ) -> Result<(), TreeError> {
        if total_movers < 2 {
            return Err(TreeError::TooFewMovers(total_movers));
        }
        if mover_round >= total_movers {
            return Err(TreeError::MoverRoundOutOfRange {
                round: mover_round,
                total: total_movers,
            });
        }
        if move_number == 0 {
            return Err(TreeError::MoveNumberZero);
        }
        self.initial_half_move_number = u32::try_from(total_movers)
            .ok()
            .and_then(|total| total.checked_mul(move_number - 1))
            .and_then(|half| half.checked_add(mover_round as u32 + 1))
            .ok_or(TreeError::MoveNumberTooLarge(move_number))?;
        self.initial_mover_round = mover_round as u32;
        self.total_movers = total_movers;
        Ok(())
    }

    pub fn initial_half_move_number(&self) -> u32 {
        self.initial_half_move_number
    }

    pub fn initial_mover_round(&self) -> u32 {
        self.initial_mover_round
    }

    pub fn total_movers(&self) -> usize {
        self.total_movers
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.arena.get(id)
    }

    /// Whether `id` names a live node of this tree.
    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id)
    }

    pub fn move_at(&self, id: NodeId) -> Option<&Move> {
        self.arena.get(id).map(TreeNode::mv)
    }

    /// Mutable access for annotating a move in place.
    pub fn move_mut(&mut self, id: NodeId) -> Option<&mut Move> {
        if id == self.root {
            return None;
        }
        self.arena.get_mut(id).map(TreeNode::mv_mut)
    }

    /// Tokens of the main line, first move first.
    pub fn main_line(&self) -> &[String] {
        &self.main_line
    }

    pub fn main_line_nodes(&self) -> Vec<NodeId> {
        let mut nodes = Vec::with_capacity(self.main_line.len());
        let mut current = self.root;
        while let Some(next) = self.arena.get(current).and_then(TreeNode::next_main) {
            nodes.push(next);
            current = next;
        }
        nodes
    }

    /// Last node of the main line, or the root when no move was played.
    pub fn last_main_line_node(&self) -> NodeId {
        self.main_line_nodes().last().copied().unwrap_or(self.root)
    }

    /// Number of moves in the tree, variations included.
    pub fn len(&self) -> usize {
        self.arena.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Plies from the root; the root itself has depth 0.
    pub fn depth(&self, id: NodeId) -> Option<u32> {
        let mut node = self.arena.get(id)?;
        let mut depth = 0;
        while let Some(parent) = node.parent() {
            depth += 1;
            node = self.arena.get(parent)?;
        }
        Some(depth)
    }

    /// `(mover_round, half_move_number)` for a move played from `parent`.
    pub fn numbering_after(&self, parent: NodeId) -> Result<(u32, u32), TreeError> {
        let depth = self.depth(parent).ok_or(TreeError::UnknownNode)?;
        self.numbering_for_ply(depth + 1)
    }

    /// `(mover_round, half_move_number)` of the move `ply` plies from the root (the first
    /// move is ply 1).
    pub fn numbering_for_ply(&self, ply: u32) -> Result<(u32, u32), TreeError> {
        self.numbering_at_depth(ply, self.total_movers)
            .ok_or_else(|| TreeError::MoveNumberTooLarge(self.initial_move_number()))
    }

    fn initial_move_number(&self) -> u32 {
        let movers = self.total_movers.max(1) as u32;
        (self.initial_half_move_number - 1) / movers + 1
    }

    fn numbering_at_depth(&self, depth: u32, total_movers: usize) -> Option<(u32, u32)> {
        let offset = depth.saturating_sub(1);
        let movers = total_movers.max(1) as u64;
        let mover_round = (u64::from(self.initial_mover_round) + u64::from(offset)) % movers;
        let half_move_number = self.initial_half_move_number.checked_add(offset)?;
        Some((mover_round as u32, half_move_number))
    }

    pub fn append_main_line_move(&mut self, mv: Move) -> NodeId {
        let last = self.last_main_line_node();
        let token = mv.token().to_string();
        // `last` is a live leaf, so the insert always succeeds.
        let id = self.arena.add_main(last, mv).unwrap_or(last);
        self.main_line.push(token);
        id
    }

    pub fn undo_main_line_move(&mut self) {
        let last = self.last_main_line_node();
        let Some(parent) = self.arena.get(last).and_then(TreeNode::parent) else {
            return;
        };
        self.arena.remove(parent, 0);
        // A sibling variation may have moved up to child 0.
        self.sync_main_line();
    }

    /// Throws every move away and rebuilds a bare main line from `moves`. Handles to the
    /// old moves stay invalid.
    pub fn replace_main_line(&mut self, moves: impl IntoIterator<Item = Move>) {
        self.clear_children(self.root);
        self.main_line.clear();

        let mut current = self.root;
        for mv in moves {
            let token = mv.token().to_string();
            if let Some(id) = self.arena.add_variation(current, mv) {
                current = id;
                self.main_line.push(token);
            }
        }
    }

    fn clear_children(&mut self, id: NodeId) {
        while self.arena.remove(id, 0) {}
    }

    /// Adds `mv` as the last child of `at`. When `at` had no children it becomes the
    /// main continuation.
    pub fn add_variation(&mut self, mv: Move, at: NodeId) -> Result<NodeId, TreeError> {
        let id = self
            .arena
            .add_variation(at, mv)
            .ok_or(TreeError::UnknownNode)?;
        if self.arena.get(id).is_some_and(|n| n.index_in_parent() == 0) {
            self.sync_main_line();
        }
        Ok(id)
    }

    pub fn remove_variation(&mut self, node: NodeId) -> Result<(), TreeError> {
        let target = self.arena.get(node).ok_or(TreeError::UnknownNode)?;
        let Some(parent) = target.parent() else {
            return Ok(());
        };
        let index = target.index_in_parent();
        self.arena.remove(parent, index);
        self.sync_main_line();
        Ok(())
    }

    /// Keeps only the chain starting at `node`, which becomes the first move of the tree.
    pub fn make_first_move(&mut self, node: NodeId) -> Result<(), TreeError> {
        let target = self.arena.get(node).ok_or(TreeError::UnknownNode)?;
        let Some(parent) = target.parent() else {
            return Ok(());
        };
        let index = target.index_in_parent();
        let chain = self.arena.detach(parent, index).ok_or(TreeError::UnknownNode)?;

        self.clear_children(self.root);
        self.arena.adopt(self.root, chain);
        self.sync_main_line();
        Ok(())
    }

    pub fn promote_to_main_line(&mut self, node: NodeId) -> Result<(), TreeError> {
        let target = self.arena.get(node).ok_or(TreeError::UnknownNode)?;
        let Some(parent) = target.parent() else {
            return Ok(());
        };
        let index = target.index_in_parent();
        self.arena.promote_variation_to_main(parent, index);
        self.sync_main_line();
        Ok(())
    }

    /// Moves from the first ply down to and including `node`.
    pub fn path_from_root(&self, node: NodeId) -> Result<Vec<&Move>, TreeError> {
        let mut path = Vec::new();
        let mut current = self.arena.get(node).ok_or(TreeError::UnknownNode)?;
        while let Some(parent) = current.parent() {
            path.push(current.mv());
            current = self.arena.get(parent).ok_or(TreeError::UnknownNode)?;
        }
        path.reverse();
        Ok(path)
    }

    pub fn is_on_main_line(&self, node: NodeId) -> bool {
        let mut current = match self.arena.get(node) {
            Some(n) => n,
            None => return false,
        };
        while let Some(parent) = current.parent() {
            if current.index_in_parent() != 0 {
                return false;
            }
            match self.arena.get(parent) {
                Some(p) => current = p,
                None => return false,
            }
        }
        true
    }

    /// Recomputes the cached main line from the tree.
    pub fn sync_main_line(&mut self) {
        let tokens: Vec<String> = self
            .main_line_nodes()
            .into_iter()
            .filter_map(|id| self.arena.get(id).map(|n| n.mv().token().to_string()))
            .collect();
        self.main_line = tokens;
    }

    /// Appends `mv` below `parent` without touching the main line cache. Callers rebuilding
    /// a tree in bulk call [`MoveTree::sync_main_line`] once they are done.
    pub(crate) fn attach(&mut self, parent: NodeId, mv: Move) -> Option<NodeId> {
        self.arena.add_variation(parent, mv)
    }

    /// Depth-first walk in movetext order. Each node's main continuation comes first, then
    /// its sibling variations bracketed by open/close markers, then the continuation's own
    /// subtree. Numbering fields of every visited move are rewritten from its depth.
    pub fn to_portable_tokens(&mut self, total_movers: usize) -> Vec<PortableToken> {
        enum Step {
            Expand(NodeId, u32),
            Emit(NodeId, u32, bool),
            Open,
            Close,
        }

        let mut tokens = Vec::new();
        let mut stack = vec![Step::Expand(self.root, 0)];
        let mut force_next = true;

        while let Some(step) = stack.pop() {
            match step {
                Step::Expand(id, depth) => {
                    let Some(node) = self.arena.get(id) else {
                        continue;
                    };
                    let children = node.children().to_vec();
                    let Some((&main, variations)) = children.split_first() else {
                        continue;
                    };
                    // Pushed in reverse so they pop in output order.
                    stack.push(Step::Expand(main, depth + 1));
                    for &variation in variations.iter().rev() {
                        stack.push(Step::Close);
                        stack.push(Step::Expand(variation, depth + 1));
                        stack.push(Step::Emit(variation, depth + 1, true));
                        stack.push(Step::Open);
                    }
                    stack.push(Step::Emit(main, depth + 1, false));
                }
                Step::Emit(id, depth, force) => {
                    let numbering = self.numbering_at_depth(depth, total_movers);
                    if let (Some((mover_round, half_move_number)), Some(node)) =
                        (numbering, self.arena.get_mut(id))
                    {
                        let mv = node.mv_mut();
                        mv.mover_round = mover_round;
                        mv.half_move_number = half_move_number;
                    }
                    tokens.push(PortableToken::Move {
                        node: id,
                        force_number: force || force_next,
                    });
                    force_next = false;
                }
                Step::Open => tokens.push(PortableToken::OpenVariation),
                Step::Close => {
                    tokens.push(PortableToken::CloseVariation);
                    force_next = true;
                }
            }
        }
        tokens
    }
}
