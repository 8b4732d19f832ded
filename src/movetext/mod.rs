//! Conversion between a [`MoveTree`] and portable movetext: `[Key "Value"]` header tags
//! followed by numbered moves, `{comments}`, `(variations)` and `$N` glyphs.

mod export;
mod filter;
mod headers;
mod visitor;

pub use export::{export_movetext, export_movetext_san};
pub use filter::check_brackets;
pub use headers::split_headers_and_body;

use std::fmt::Write;
use std::sync::LazyLock;

use crate::error::{FenError, MovetextError, Warnings};
use crate::moves::shorthand_glyph;
use crate::oracle::{OraclePosition, RulesOracle, Scratch};
use crate::tree::MoveTree;
use crate::types::{Game, ImportOptions};
use filter::{restore_comment, tokenize};
use visitor::ImportVisitor;

static MOVE_NUMBER_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^(?:\d*\.+|\d+)$").expect("valid move number regex")
});

static NAG_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^\$\d+$").expect("valid NAG regex"));

static GLUED_MOVE_NUMBER_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^(\d+\.+)(\S+)$").expect("valid glued move number regex")
});

const RESULT_TOKENS: [&str; 4] = ["*", "1-0", "0-1", "1/2-1/2"];

/// Reads movetext into a fresh tree, replaying every move through `oracle`.
///
/// Any failure rejects the whole text; no partial tree is returned. The oracle position
/// used for the replay is disposed on every path.
pub fn import_movetext<O: RulesOracle>(
    body: &str,
    options: &ImportOptions,
    oracle: &O,
) -> Result<MoveTree, MovetextError> {
    let mut warnings = Warnings::default();
    import(body, options, oracle, &mut warnings).map(|(tree, _)| tree)
}

/// Reads one game: header tags, then movetext. `Variant` and `FEN` tags refine `options`
/// where the caller left them open.
pub fn read_game<O: RulesOracle>(
    text: &str,
    options: &ImportOptions,
    oracle: &O,
) -> Result<Game, MovetextError> {
    let mut warnings = Warnings::default();
    let (headers, body) = split_headers_and_body(text, &mut warnings);
    let options = options.refined_by_headers(&headers);
    let (tree, outcome) = import(&body, &options, oracle, &mut warnings)?;

    let mut game = Game {
        headers,
        tree,
        result: outcome,
        warnings: warnings.take(),
    };
    if game.result.is_none() {
        game.result = game
            .header("Result")
            .filter(|r| !r.is_empty())
            .map(str::to_string);
    }
    Ok(game)
}

/// Writes a game as header tags, a blank line and the movetext. The result comes from
/// the game, then its `Result` tag, then `*`.
pub fn write_game(game: &mut Game, total_movers: usize) -> String {
    let mut out = String::new();
    for (key, value) in &game.headers {
        let _ = writeln!(out, "[{key} \"{}\"]", headers::escape(value));
    }
    if !out.is_empty() {
        out.push('\n');
    }

    let result = game
        .result
        .clone()
        .or_else(|| game.header("Result").map(str::to_string))
        .unwrap_or_else(|| "*".to_string());
    out.push_str(&export_movetext(&mut game.tree, total_movers, &result));
    out
}

fn import<O: RulesOracle>(
    body: &str,
    options: &ImportOptions,
    oracle: &O,
    warnings: &mut Warnings,
) -> Result<(MoveTree, Option<String>), MovetextError> {
    check_brackets(body)
        .and_then(|()| {
            let (fen, mut position) = open_position(oracle, options)?;
            let mut tree = MoveTree::new();
            tree.set_initial_condition(
                fullmove_number(&fen),
                position.turn(),
                options.total_movers,
            )?;
            let visitor = ImportVisitor::new(&mut *position, options.dialect, tree, warnings);
            walk(&tokenize(body), visitor)
        })
        .inspect_err(|e| tracing::debug!(target: "movetree", "movetext import failed: {e}"))
}

fn walk<P: OraclePosition>(
    tokens: &[String],
    mut visitor: ImportVisitor<'_, P>,
) -> Result<(MoveTree, Option<String>), MovetextError> {
    for (i, token) in tokens.iter().enumerate() {
        let token = token.as_str();
        match token {
            "(" => visitor.begin_variation()?,
            ")" => visitor.end_variation()?,
            _ if RESULT_TOKENS.contains(&token) => {
                if i + 1 != tokens.len() {
                    return Err(MovetextError::MisplacedResult(token.to_string()));
                }
                visitor.outcome(token);
            }
            _ => {
                if let Some(text) = restore_comment(token) {
                    visitor.comment(text);
                } else if MOVE_NUMBER_RE.is_match(token) {
                    visitor.move_number(token);
                } else if NAG_RE.is_match(token) || shorthand_glyph(token).is_some() {
                    visitor.nag(token);
                } else if let Some(caps) = GLUED_MOVE_NUMBER_RE.captures(token) {
                    visitor.move_number(&caps[1]);
                    visitor.san(&caps[2])?;
                } else {
                    visitor.san(token)?;
                }
            }
        }
    }
    visitor.end_game()
}

/// Resolves and validates the starting position, then builds the scratch board for it.
pub(crate) fn open_position<O: RulesOracle>(
    oracle: &O,
    options: &ImportOptions,
) -> Result<(String, Scratch<O::Position>), MovetextError> {
    let fen = match &options.initial_fen {
        Some(fen) => fen.clone(),
        None => oracle
            .starting_fen(&options.variant)
            .ok_or_else(|| MovetextError::UnknownVariant(options.variant.clone()))?,
    };
    oracle
        .validate_fen(&fen, &options.variant, options.chess960)
        .map_err(|e| fen_error(&fen, e))?;
    let position = oracle
        .new_position(&options.variant, &fen, options.chess960)
        .map_err(|e| fen_error(&fen, e))?;
    Ok((fen, Scratch::new(position)))
}

fn fen_error(fen: &str, error: FenError) -> MovetextError {
    match error {
        FenError::UnknownVariant(variant) => MovetextError::UnknownVariant(variant),
        FenError::Invalid(reason) => MovetextError::InvalidFen {
            fen: fen.to_string(),
            reason,
        },
    }
}

/// The full move counter of a FEN, 1 when it is missing or unusable.
fn fullmove_number(fen: &str) -> u32 {
    fen.split_whitespace()
        .nth(5)
        .and_then(|n| n.parse::<u32>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(1)
}
