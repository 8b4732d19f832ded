//! The rules oracle: legality, SAN resolution and position bookkeeping consumed by the
//! movetext reader. Move tokens crossing this boundary are space-separated strings.

mod standard;

pub use standard::{ShakmatyOracle, ShakmatyPosition};

use std::ops::{Deref, DerefMut};

use crate::error::FenError;
use crate::types::NotationDialect;

pub trait RulesOracle {
    type Position: OraclePosition;

    fn variants(&self) -> Vec<String>;

    fn starting_fen(&self, variant: &str) -> Option<String>;

    fn validate_fen(&self, fen: &str, variant: &str, chess960: bool) -> Result<(), FenError>;

    /// Builds a position the caller must [`dispose`](OraclePosition::dispose) exactly once.
    fn new_position(
        &self,
        variant: &str,
        fen: &str,
        chess960: bool,
    ) -> Result<Self::Position, FenError>;
}

/// A mutable board owned by one caller at a time.
pub trait OraclePosition {
    fn legal_moves(&self) -> String;

    fn push(&mut self, token: &str) -> bool;

    fn push_san(&mut self, text: &str, dialect: NotationDialect) -> bool;

    fn pop(&mut self);

    /// Back to the position the object was created or last `set_fen` with.
    fn reset(&mut self);

    fn set_fen(&mut self, fen: &str) -> Result<(), FenError>;

    fn fen(&self) -> String;

    fn move_stack(&self) -> String;

    /// Index of the mover to play, 0 for the first.
    fn turn(&self) -> usize;

    fn is_check(&self) -> bool;

    fn is_game_over(&self) -> bool;

    fn result(&self) -> String;

    /// Renders `token`, legal in the current position, in `dialect`.
    fn san_move(&self, token: &str, dialect: NotationDialect) -> Option<String>;

    fn dispose(&mut self);
}

/// Owns a position for the length of one operation and disposes it when dropped.
pub struct Scratch<P: OraclePosition> {
    position: P,
}

impl<P: OraclePosition> Scratch<P> {
    pub fn new(position: P) -> Self {
        Self { position }
    }
}

impl<P: OraclePosition> Deref for Scratch<P> {
    type Target = P;

    fn deref(&self) -> &P {
        &self.position
    }
}

impl<P: OraclePosition> DerefMut for Scratch<P> {
    fn deref_mut(&mut self) -> &mut P {
        &mut self.position
    }
}

impl<P: OraclePosition> Drop for Scratch<P> {
    fn drop(&mut self) {
        self.position.dispose();
    }
}

