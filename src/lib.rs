//! Branching move trees for chess-like games: compact move tokens, annotated moves, a
//! main line with nested variations, and conversion to and from portable movetext.

pub mod codec;
pub mod error;
pub mod moves;
pub mod movetext;
pub mod oracle;
pub mod tree;
pub mod types;

pub use codec::{MoveFields, parse_token};
pub use error::{CompactError, FenError, MovetextError, TreeError, Warnings};
pub use moves::{Glyph, Move, PortableParts};
pub use movetext::{
    export_movetext, export_movetext_san, import_movetext, read_game, split_headers_and_body,
    write_game,
};
pub use oracle::{OraclePosition, RulesOracle, Scratch, ShakmatyOracle, ShakmatyPosition};
pub use tree::{MoveTree, NodeId, PortableToken, TreeNode};
pub use types::{Game, ImportOptions, NotationDialect};
