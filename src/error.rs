use thiserror::Error;

/// Misuse of the tree or move API. Returned at the call site, never logged and skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("glyph index {0} is out of range (0..=139)")]
    GlyphOutOfRange(u32),
    #[error("unknown annotation symbol '{0}'")]
    UnknownSymbol(String),
    #[error("at least two movers are required, got {0}")]
    TooFewMovers(usize),
    #[error("mover round {round} is out of range for {total} movers")]
    MoverRoundOutOfRange { round: usize, total: usize },
    #[error("move numbers start at 1")]
    MoveNumberZero,
    #[error("node does not belong to this tree")]
    UnknownNode,
    #[error("move number {0} is too large to number the moves after it")]
    MoveNumberTooLarge(u32),
}

/// Syntax errors in the compact tree format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompactError {
    #[error("move record has {0} fields, expected 1 or 7")]
    FieldCount(usize),
    #[error("move record field '{field}' is not a number: '{value}'")]
    InvalidNumber { field: &'static str, value: String },
    #[error("a variation must start right after a move")]
    VariationWithoutMove,
    #[error("variation is empty")]
    EmptyVariation,
    #[error("unbalanced variation brackets")]
    UnbalancedVariation,
}

/// Rejection of a starting position by the rules oracle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("unsupported variant '{0}'")]
    UnknownVariant(String),
    #[error("{0}")]
    Invalid(String),
}

/// Reasons an import of portable movetext is rejected as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MovetextError {
    #[error("unbalanced brackets: unexpected '{found}' at byte {offset}")]
    UnexpectedBracket { found: char, offset: usize },
    #[error("unbalanced brackets: '{0}' is never closed")]
    UnclosedBracket(char),
    #[error("unsupported variant '{0}'")]
    UnknownVariant(String),
    #[error("Invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },
    #[error("Illegal move '{0}'")]
    IllegalMove(String),
    #[error("result '{0}' must be the last token")]
    MisplacedResult(String),
    #[error("a variation must start right after a move")]
    VariationWithoutMove,
    #[error("variation is empty")]
    EmptyVariation,
    #[error("move number '{0}' is not followed by a move")]
    DanglingMoveNumber(String),
    #[error("unbalanced variation brackets")]
    UnbalancedVariation,
    #[error("rules oracle rejected replay of '{0}'")]
    OracleDesync(String),
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Non-fatal diagnostics collected while reading movetext. Each one is also logged as a
/// `warn!` event on the `movetree` target.
#[derive(Debug, Clone, Default)]
pub struct Warnings {
    messages: Vec<String>,
}

impl Warnings {
    pub fn push(&mut self, msg: &str) {
        tracing::warn!(target: "movetree", "{msg}");
        self.messages.push(msg.to_string());
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drains the collected messages into one `"; "`-separated line.
    pub fn take(&mut self) -> Option<String> {
        if self.messages.is_empty() {
            return None;
        }
        Some(std::mem::take(&mut self.messages).join("; "))
    }
}
