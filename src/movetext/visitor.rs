use std::mem;

use crate::error::{MovetextError, Warnings};
use crate::moves::{Move, strip_shorthand};
use crate::oracle::OraclePosition;
use crate::tree::{MoveTree, NodeId, TreeNode};
use crate::types::NotationDialect;

/// A variation that has been opened and not yet closed.
struct OpenVariation {
    /// Oracle move stack when the variation opened, replayed when it closes.
    snapshot: String,
    /// Where the walk continues after the closing `)`.
    resume: NodeId,
    resume_depth: u32,
}

/// Builds a [`MoveTree`] from movetext events while keeping the oracle's position in step
/// with the node being extended.
pub(crate) struct ImportVisitor<'p, P: OraclePosition> {
    position: &'p mut P,
    dialect: NotationDialect,
    tree: MoveTree,
    current: NodeId,
    /// Plies from the root to `current`.
    depth: u32,
    variations: Vec<OpenVariation>,
    awaiting_first_move: bool,
    pending_before: Vec<String>,
    pending_number: Option<String>,
    outcome: Option<String>,
    warnings: &'p mut Warnings,
}

impl<'p, P: OraclePosition> ImportVisitor<'p, P> {
    pub fn new(
        position: &'p mut P,
        dialect: NotationDialect,
        tree: MoveTree,
        warnings: &'p mut Warnings,
    ) -> Self {
        let current = tree.root();
        Self {
            position,
            dialect,
            tree,
            current,
            depth: 0,
            variations: Vec::new(),
            awaiting_first_move: false,
            pending_before: Vec::new(),
            pending_number: None,
            outcome: None,
            warnings,
        }
    }

    /// No move has been played yet in the scope being read.
    fn at_scope_start(&self) -> bool {
        self.awaiting_first_move || self.current == self.tree.root()
    }

    pub fn move_number(&mut self, token: &str) {
        if let Some(previous) = self.pending_number.replace(token.to_string()) {
            self.warnings.push(&format!(
                "Move number '{token}' follows move number '{previous}'"
            ));
        }
    }

    pub fn comment(&mut self, text: String) {
        if text.trim().is_empty() {
            return;
        }
        if self.at_scope_start() {
            self.pending_before.push(text);
        } else if let Some(mv) = self.tree.move_mut(self.current) {
            mv.add_text_after(&text);
        }
    }

    /// A `$N` glyph or a standalone shorthand symbol such as `!?`.
    pub fn nag(&mut self, token: &str) {
        if self.at_scope_start() {
            self.warnings
                .push(&format!("Annotation '{token}' does not follow a move"));
            return;
        }
        let Some(mv) = self.tree.move_mut(self.current) else {
            return;
        };
        let added = match token.strip_prefix('$') {
            Some(index) => index
                .parse::<u32>()
                .ok()
                .is_some_and(|index| mv.add_symbol(index).is_ok()),
            None => mv.add_symbol_text(token).is_ok(),
        };
        if !added {
            self.warnings
                .push(&format!("Annotation '{token}' is out of range"));
        }
    }

    pub fn begin_variation(&mut self) -> Result<(), MovetextError> {
        if self.at_scope_start() {
            return Err(MovetextError::VariationWithoutMove);
        }
        if let Some(number) = self.pending_number.take() {
            return Err(MovetextError::DanglingMoveNumber(number));
        }
        let parent = self
            .tree
            .node(self.current)
            .and_then(TreeNode::parent)
            .ok_or(MovetextError::VariationWithoutMove)?;

        self.variations.push(OpenVariation {
            snapshot: self.position.move_stack(),
            resume: self.current,
            resume_depth: self.depth,
        });
        // The variation replaces the move just played.
        self.position.pop();
        self.current = parent;
        self.depth -= 1;
        self.awaiting_first_move = true;
        Ok(())
    }

    pub fn end_variation(&mut self) -> Result<(), MovetextError> {
        if self.awaiting_first_move {
            return Err(MovetextError::EmptyVariation);
        }
        if let Some(number) = self.pending_number.take() {
            return Err(MovetextError::DanglingMoveNumber(number));
        }
        let open = self
            .variations
            .pop()
            .ok_or(MovetextError::UnbalancedVariation)?;

        self.position.reset();
        for token in open.snapshot.split_whitespace() {
            if !self.position.push(token) {
                return Err(MovetextError::OracleDesync(token.to_string()));
            }
        }
        self.current = open.resume;
        self.depth = open.resume_depth;
        Ok(())
    }

    pub fn san(&mut self, text: &str) -> Result<(), MovetextError> {
        let (san, symbol) = strip_shorthand(text);
        if !self.position.push_san(san, self.dialect) {
            return Err(MovetextError::IllegalMove(text.to_string()));
        }
        let stack = self.position.move_stack();
        let token = stack
            .split_whitespace()
            .next_back()
            .ok_or_else(|| MovetextError::OracleDesync(san.to_string()))?;

        let (mover_round, half_move_number) = self.tree.numbering_for_ply(self.depth + 1)?;
        let mut mv = Move::new(token, mover_round, half_move_number);
        for comment in self.pending_before.drain(..) {
            mv.add_text_before(&comment);
        }
        if let Some(symbol) = symbol {
            mv.add_symbol_text(symbol)?;
        }

        self.current = self
            .tree
            .attach(self.current, mv)
            .ok_or(MovetextError::OracleDesync(token.to_string()))?;
        self.depth += 1;
        self.pending_number = None;
        self.awaiting_first_move = false;
        Ok(())
    }

    pub fn outcome(&mut self, result: &str) {
        self.outcome = Some(result.to_string());
    }

    /// Finishes the walk and hands back the tree and the game result, if one was read.
    pub fn end_game(mut self) -> Result<(MoveTree, Option<String>), MovetextError> {
        if !self.variations.is_empty() {
            return Err(MovetextError::UnbalancedVariation);
        }
        if let Some(number) = self.pending_number.take() {
            self.warnings
                .push(&format!("Move number '{number}' is not followed by a move"));
        }
        for comment in mem::take(&mut self.pending_before) {
            self.warnings
                .push(&format!("Comment '{comment}' is not attached to a move"));
        }
        self.tree.sync_main_line();
        Ok((self.tree, self.outcome))
    }
}
