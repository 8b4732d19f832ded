use std::collections::HashMap;
use std::fmt::Write;

use crate::error::{MovetextError, Warnings};
use crate::moves::Move;
use crate::oracle::{OraclePosition, RulesOracle};
use crate::tree::{MoveTree, NodeId, PortableToken};
use crate::types::ImportOptions;

use super::open_position;

/// Writes the tree as portable movetext with the moves' own tokens, followed by `result`
/// when it is not empty.
pub fn export_movetext(tree: &mut MoveTree, total_movers: usize, result: &str) -> String {
    render(tree, total_movers, result, |_, mv| mv.token().to_string())
}

/// Like [`export_movetext`], with every move rendered in the options' notation by
/// replaying the tree through the oracle. Moves the oracle cannot render keep their raw
/// token and add a warning.
pub fn export_movetext_san<O: RulesOracle>(
    tree: &mut MoveTree,
    oracle: &O,
    options: &ImportOptions,
    result: &str,
) -> Result<String, MovetextError> {
    let mut warnings = Warnings::default();
    let rendered = render_with_oracle(tree, oracle, options, &mut warnings)?;
    let total_movers = options.total_movers;
    Ok(render(tree, total_movers, result, |node, mv| {
        rendered
            .get(&node)
            .cloned()
            .unwrap_or_else(|| mv.token().to_string())
    }))
}

fn render_with_oracle<O: RulesOracle>(
    tree: &MoveTree,
    oracle: &O,
    options: &ImportOptions,
    warnings: &mut Warnings,
) -> Result<HashMap<NodeId, String>, MovetextError> {
    enum Step {
        Enter(NodeId),
        Leave,
    }

    let (_, mut position) = open_position(oracle, options)?;
    let mut rendered = HashMap::with_capacity(tree.len());
    let mut stack: Vec<Step> = children_of(tree, tree.root())
        .into_iter()
        .rev()
        .map(Step::Enter)
        .collect();

    while let Some(step) = stack.pop() {
        match step {
            Step::Enter(id) => {
                let Some(mv) = tree.move_at(id) else {
                    continue;
                };
                match position.san_move(mv.token(), options.dialect) {
                    Some(text) => {
                        rendered.insert(id, text);
                    }
                    None => warnings.push(&format!("Cannot render move '{}'", mv.token())),
                }
                if !position.push(mv.token()) {
                    warnings.push(&format!(
                        "Move '{}' is illegal here, its continuation is left as is",
                        mv.token()
                    ));
                    continue;
                }
                stack.push(Step::Leave);
                stack.extend(children_of(tree, id).into_iter().rev().map(Step::Enter));
            }
            Step::Leave => position.pop(),
        }
    }
    Ok(rendered)
}

fn children_of(tree: &MoveTree, id: NodeId) -> Vec<NodeId> {
    tree.node(id)
        .map(|node| node.children().to_vec())
        .unwrap_or_default()
}

fn render<F>(tree: &mut MoveTree, total_movers: usize, result: &str, mut token_for: F) -> String
where
    F: FnMut(NodeId, &Move) -> String,
{
    let tokens = tree.to_portable_tokens(total_movers);
    let mut out = String::with_capacity(tokens.len() * 8);

    for token in tokens {
        match token {
            PortableToken::Move { node, force_number } => {
                let Some(mv) = tree.move_at(node) else {
                    continue;
                };
                let mut parts = mv.to_portable_parts(force_number, total_movers);
                parts.token = token_for(node, mv);
                if !out.is_empty() && !out.ends_with('(') {
                    out.push(' ');
                }
                let _ = write!(out, "{parts}");
            }
            PortableToken::OpenVariation => {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push('(');
            }
            PortableToken::CloseVariation => out.push(')'),
        }
    }

    if !result.is_empty() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(result);
    }
    out
}
