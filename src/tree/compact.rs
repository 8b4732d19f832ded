//! Private round-trippable serialization of a whole tree: move records in depth-first
//! order separated by U+001E, with `(` and `)` records around each variation.

use super::{MoveTree, NodeId, TreeNode};
use crate::error::CompactError;
use crate::moves::{Move, NODE_SEPARATOR};

const OPEN: &str = "(";
const CLOSE: &str = ")";

impl MoveTree {
    pub fn to_compact_string(&self) -> String {
        enum Step {
            Expand(NodeId),
            Emit(NodeId),
            Marker(&'static str),
        }

        let mut records: Vec<String> = Vec::new();
        let mut stack = vec![Step::Expand(self.root)];
        while let Some(step) = stack.pop() {
            match step {
                Step::Expand(id) => {
                    let Some(children) = self.arena.get(id).map(TreeNode::children) else {
                        continue;
                    };
                    let Some((&main, variations)) = children.split_first() else {
                        continue;
                    };
                    stack.push(Step::Expand(main));
                    for &variation in variations.iter().rev() {
                        stack.push(Step::Marker(CLOSE));
                        stack.push(Step::Expand(variation));
                        stack.push(Step::Emit(variation));
                        stack.push(Step::Marker(OPEN));
                    }
                    stack.push(Step::Emit(main));
                }
                Step::Emit(id) => {
                    if let Some(node) = self.arena.get(id) {
                        records.push(node.mv().to_record_string());
                    }
                }
                Step::Marker(marker) => records.push(marker.to_string()),
            }
        }
        records.join(NODE_SEPARATOR.to_string().as_str())
    }

    /// Parses the output of [`MoveTree::to_compact_string`]. Numbering starts from the
    /// defaults; callers restore their own initial condition.
    pub fn from_compact_string(s: &str) -> Result<Self, CompactError> {
        let mut tree = MoveTree::new();
        if s.is_empty() {
            return Ok(tree);
        }

        let mut current = tree.root;
        // Nodes to return to when the innermost open variation closes.
        let mut resume: Vec<NodeId> = Vec::new();
        let mut variation_open = false;

        for record in s.split(NODE_SEPARATOR) {
            match record {
                OPEN => {
                    if variation_open || current == tree.root {
                        return Err(CompactError::VariationWithoutMove);
                    }
                    let parent = tree
                        .arena
                        .get(current)
                        .and_then(TreeNode::parent)
                        .ok_or(CompactError::VariationWithoutMove)?;
                    resume.push(current);
                    current = parent;
                    variation_open = true;
                }
                CLOSE => {
                    if variation_open {
                        return Err(CompactError::EmptyVariation);
                    }
                    current = resume.pop().ok_or(CompactError::UnbalancedVariation)?;
                }
                _ => {
                    let mv = Move::from_record_string(record)?;
                    current = tree
                        .attach(current, mv)
                        .ok_or(CompactError::UnbalancedVariation)?;
                    variation_open = false;
                }
            }
        }

        if !resume.is_empty() || variation_open {
            return Err(CompactError::UnbalancedVariation);
        }
        tree.sync_main_line();
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::PortableToken;

    fn annotated(token: &str) -> Move {
        Move::new(token, 0, 0)
    }

    fn sample_tree() -> MoveTree {
        let mut tree = MoveTree::new();
        let e4 = tree.append_main_line_move(annotated("e2e4"));
        let e5 = tree.append_main_line_move(annotated("e7e5"));
        tree.append_main_line_move(annotated("g1f3"));

        let c5 = tree.add_variation(annotated("c7c5"), e4).unwrap();
        let nf3 = tree.add_variation(annotated("g1f3"), c5).unwrap();
        tree.add_variation(annotated("b1c3"), c5).unwrap();
        tree.add_variation(annotated("d7d6"), nf3).unwrap();
        tree.add_variation(annotated("e7e6"), e4).unwrap();

        let m = tree.move_mut(e5).unwrap();
        m.add_symbol(1).unwrap();
        m.add_text_before("the classical reply");
        m.add_text_after("solid");
        m.add_text_after("and (popular)");
        tree.move_mut(c5).unwrap().add_symbol_text("!?").unwrap();
        tree
    }

    #[test]
    fn test_round_trip_reproduces_string_and_main_line() {
        let tree = sample_tree();
        let compact = tree.to_compact_string();
        let parsed = MoveTree::from_compact_string(&compact).unwrap();

        assert_eq!(parsed.to_compact_string(), compact);
        assert_eq!(parsed.main_line(), tree.main_line());
        assert_eq!(parsed.len(), tree.len());
    }

    #[test]
    fn test_round_trip_preserves_shape() {
        let mut tree = sample_tree();
        let mut parsed = MoveTree::from_compact_string(&tree.to_compact_string()).unwrap();

        let shape = |t: &mut MoveTree| -> Vec<String> {
            t.to_portable_tokens(2)
                .into_iter()
                .map(|token| match token {
                    PortableToken::Move { node, .. } => t.move_at(node).unwrap().token().to_string(),
                    PortableToken::OpenVariation => "(".to_string(),
                    PortableToken::CloseVariation => ")".to_string(),
                })
                .collect()
        };
        let expected = shape(&mut tree);
        assert_eq!(shape(&mut parsed), expected);
        assert_eq!(
            expected,
            [
                "e2e4", "e7e5", "(", "c7c5", "g1f3", "(", "b1c3", ")", "d7d6", ")", "(",
                "e7e6", ")", "g1f3"
            ]
        );
    }

    #[test]
    fn test_empty_tree_round_trip() {
        let tree = MoveTree::new();
        assert_eq!(tree.to_compact_string(), "");
        let parsed = MoveTree::from_compact_string("").unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_variation_as_first_record_fails() {
        let compact = ["(", "e2e4", ")"].join(NODE_SEPARATOR.to_string().as_str());
        assert_eq!(
            MoveTree::from_compact_string(&compact).unwrap_err(),
            CompactError::VariationWithoutMove
        );
    }

    #[test]
    fn test_nested_open_without_move_fails() {
        let compact = ["e2e4", "e7e5", "(", "(", "c7c5", ")", ")"]
            .join(NODE_SEPARATOR.to_string().as_str());
        assert_eq!(
            MoveTree::from_compact_string(&compact).unwrap_err(),
            CompactError::VariationWithoutMove
        );
    }

    #[test]
    fn test_unbalanced_brackets_fail() {
        let sep = NODE_SEPARATOR.to_string();
        let unclosed = ["e2e4", "e7e5", "(", "c7c5"].join(sep.as_str());
        assert_eq!(
            MoveTree::from_compact_string(&unclosed).unwrap_err(),
            CompactError::UnbalancedVariation
        );

        let extra_close = ["e2e4", ")"].join(sep.as_str());
        assert_eq!(
            MoveTree::from_compact_string(&extra_close).unwrap_err(),
            CompactError::UnbalancedVariation
        );
    }

    #[test]
    fn test_bad_record_fails() {
        let sep = NODE_SEPARATOR.to_string();
        let bad_record = ["e2e4", "\u{1F}x"].join(sep.as_str());
        assert_eq!(
            MoveTree::from_compact_string(&bad_record).unwrap_err(),
            CompactError::FieldCount(2)
        );
    }

    #[test]
    fn test_bare_tokens_are_accepted() {
        let compact = ["e2e4", "e7e5", "(", "c7c5", ")", "g1f3"]
            .join(NODE_SEPARATOR.to_string().as_str());
        let tree = MoveTree::from_compact_string(&compact).unwrap();
        assert_eq!(tree.main_line(), ["e2e4", "e7e5", "g1f3"]);
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_clone_is_deep() {
        let tree = sample_tree();
        let mut copy = tree.clone();
        copy.undo_main_line_move();

        assert_eq!(tree.main_line(), ["e2e4", "e7e5", "g1f3"]);
        assert_eq!(copy.main_line(), ["e2e4", "e7e5"]);
        assert_eq!(copy.initial_half_move_number(), tree.initial_half_move_number());
    }
}
