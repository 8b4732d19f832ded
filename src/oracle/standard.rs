use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Move, Position};

use super::{OraclePosition, RulesOracle};
use crate::error::FenError;
use crate::types::{DEFAULT_VARIANT, NotationDialect};

/// Rules oracle for standard chess and Chess960 backed by `shakmaty`. Move tokens are UCI.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShakmatyOracle;

impl ShakmatyOracle {
    fn supports(variant: &str) -> bool {
        matches!(variant, DEFAULT_VARIANT | "standard")
    }
}

fn castling_mode(chess960: bool) -> CastlingMode {
    if chess960 {
        CastlingMode::Chess960
    } else {
        CastlingMode::Standard
    }
}

fn parse_position(fen: &str, mode: CastlingMode) -> Result<Chess, FenError> {
    let fen: Fen = fen
        .trim()
        .parse()
        .map_err(|e: shakmaty::fen::ParseFenError| FenError::Invalid(e.to_string()))?;
    fen.into_position::<Chess>(mode)
        .map_err(|e| FenError::Invalid(e.to_string()))
}

fn fen_of(pos: &Chess) -> String {
    Fen::from_position(pos, EnPassantMode::Legal).to_string()
}

impl RulesOracle for ShakmatyOracle {
    type Position = ShakmatyPosition;

    fn variants(&self) -> Vec<String> {
        vec![DEFAULT_VARIANT.to_string()]
    }

    fn starting_fen(&self, variant: &str) -> Option<String> {
        Self::supports(variant).then(|| fen_of(&Chess::default()))
    }

    fn validate_fen(&self, fen: &str, variant: &str, chess960: bool) -> Result<(), FenError> {
        if !Self::supports(variant) {
            return Err(FenError::UnknownVariant(variant.to_string()));
        }
        parse_position(fen, castling_mode(chess960)).map(|_| ())
    }

    fn new_position(
        &self,
        variant: &str,
        fen: &str,
        chess960: bool,
    ) -> Result<ShakmatyPosition, FenError> {
        if !Self::supports(variant) {
            return Err(FenError::UnknownVariant(variant.to_string()));
        }
        let mode = castling_mode(chess960);
        let start = parse_position(fen, mode)?;
        Ok(ShakmatyPosition {
            initial: start.clone(),
            current: start,
            history: Vec::new(),
            mode,
            disposed: false,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ShakmatyPosition {
    initial: Chess,
    current: Chess,
    /// Position before each played move, with the move's UCI token.
    history: Vec<(Chess, String)>,
    mode: CastlingMode,
    disposed: bool,
}

impl ShakmatyPosition {
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn play(&mut self, m: Move) {
        let token = m.to_uci(self.mode).to_string();
        let before = self.current.clone();
        self.current.play_unchecked(m);
        self.history.push((before, token));
    }

    fn resolve_san(&self, text: &str) -> Option<Move> {
        let san: SanPlus = text.parse().ok()?;
        san.san.to_move(&self.current).ok()
    }

    fn resolve_uci(&self, text: &str) -> Option<Move> {
        let uci: UciMove = text.parse().ok()?;
        uci.to_move(&self.current).ok()
    }
}

/// `Ng1-f3`, `e7xd8=Q+` -> `g1f3`, `e7d8q`.
fn long_algebraic_to_uci(text: &str) -> String {
    let body = text.trim_end_matches(['+', '#']);
    let body = body
        .strip_prefix(|c: char| matches!(c, 'K' | 'Q' | 'R' | 'B' | 'N' | 'P'))
        .unwrap_or(body);
    body.chars()
        .filter(|c| !matches!(c, '-' | 'x' | ':' | '='))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl OraclePosition for ShakmatyPosition {
    fn legal_moves(&self) -> String {
        self.current
            .legal_moves()
            .iter()
            .map(|m| m.to_uci(self.mode).to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn push(&mut self, token: &str) -> bool {
        match self.resolve_uci(token) {
            Some(m) => {
                self.play(m);
                true
            }
            None => false,
        }
    }

    fn push_san(&mut self, text: &str, dialect: NotationDialect) -> bool {
        let resolved = match dialect {
            NotationDialect::Default | NotationDialect::San => self
                .resolve_san(text)
                .or_else(|| self.resolve_uci(text)),
            NotationDialect::Lan => self
                .resolve_san(text)
                .or_else(|| self.resolve_uci(&long_algebraic_to_uci(text))),
            other => {
                tracing::debug!(target: "movetree", "notation {other:?} is not supported for chess");
                None
            }
        };
        match resolved {
            Some(m) => {
                self.play(m);
                true
            }
            None => false,
        }
    }

    fn pop(&mut self) {
        if let Some((before, _)) = self.history.pop() {
            self.current = before;
        }
    }

    fn reset(&mut self) {
        self.current = self.initial.clone();
        self.history.clear();
    }

    fn set_fen(&mut self, fen: &str) -> Result<(), FenError> {
        let pos = parse_position(fen, self.mode)?;
        self.initial = pos.clone();
        self.current = pos;
        self.history.clear();
        Ok(())
    }

    fn fen(&self) -> String {
        fen_of(&self.current)
    }

    fn move_stack(&self) -> String {
        self.history
            .iter()
            .map(|(_, token)| token.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn turn(&self) -> usize {
        match self.current.turn() {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    fn is_check(&self) -> bool {
        self.current.is_check()
    }

    fn is_game_over(&self) -> bool {
        self.current.is_game_over()
    }

    fn result(&self) -> String {
        let result = if self.current.is_checkmate() {
            match self.current.turn() {
                Color::White => "0-1",
                Color::Black => "1-0",
            }
        } else if self.current.is_stalemate() || self.current.is_insufficient_material() {
            "1/2-1/2"
        } else {
            "*"
        };
        result.to_string()
    }

    fn san_move(&self, token: &str, dialect: NotationDialect) -> Option<String> {
        if !matches!(dialect, NotationDialect::Default | NotationDialect::San) {
            return None;
        }
        let m = self.resolve_uci(token)?;
        Some(SanPlus::from_move(self.current.clone(), m).to_string())
    }

    fn dispose(&mut self) {
        if self.disposed {
            tracing::debug!(target: "movetree", "position disposed twice");
        }
        self.disposed = true;
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    fn start_position() -> ShakmatyPosition {
        ShakmatyOracle.new_position("chess", START, false).unwrap()
    }

    #[test]
    fn test_starting_fen() {
        assert_eq!(ShakmatyOracle.starting_fen("chess").as_deref(), Some(START));
        assert_eq!(ShakmatyOracle.starting_fen("shogi"), None);
        assert_eq!(ShakmatyOracle.variants(), ["chess"]);
    }

    #[test]
    fn test_validate_fen() {
        assert!(ShakmatyOracle.validate_fen(START, "chess", false).is_ok());
        assert!(matches!(
            ShakmatyOracle.validate_fen("not a fen", "chess", false),
            Err(FenError::Invalid(_))
        ));
        assert_eq!(
            ShakmatyOracle.validate_fen(START, "xiangqi", false),
            Err(FenError::UnknownVariant("xiangqi".to_string()))
        );
    }

    #[test]
    fn test_push_san_records_uci_tokens() {
        let mut pos = start_position();
        assert!(pos.push_san("e4", NotationDialect::Default));
        assert!(pos.push_san("e5", NotationDialect::San));
        assert!(pos.push_san("Nf3", NotationDialect::San));
        assert_eq!(pos.move_stack(), "e2e4 e7e5 g1f3");
        assert_eq!(pos.turn(), 1);
    }

    #[test]
    fn test_push_san_rejects_illegal_moves() {
        let mut pos = start_position();
        assert!(!pos.push_san("Ke2", NotationDialect::San));
        assert!(!pos.push_san("e5", NotationDialect::San));
        assert_eq!(pos.move_stack(), "");
    }

    #[test]
    fn test_push_san_accepts_uci_and_long_algebraic() {
        let mut pos = start_position();
        assert!(pos.push_san("e2e4", NotationDialect::San));
        assert!(pos.push_san("e7-e5", NotationDialect::Lan));
        assert!(pos.push_san("Ng1-f3", NotationDialect::Lan));
        assert_eq!(pos.move_stack(), "e2e4 e7e5 g1f3");
        assert!(!pos.push_san("Nc6", NotationDialect::Janggi));
    }

    #[test]
    fn test_pop_reset_and_set_fen() {
        let mut pos = start_position();
        pos.push("e2e4");
        pos.push("e7e5");
        pos.pop();
        assert_eq!(pos.move_stack(), "e2e4");

        pos.reset();
        assert_eq!(pos.move_stack(), "");
        assert_eq!(pos.fen(), START);

        let endgame = "4k3/8/8/8/8/8/8/4K2R w K - 0 1";
        pos.set_fen(endgame).unwrap();
        assert_eq!(pos.fen(), endgame);
        assert!(pos.push("e1g1"));
        assert!(pos.set_fen("garbage").is_err());
    }

    #[test]
    fn test_san_move() {
        let mut pos = start_position();
        assert_eq!(pos.san_move("g1f3", NotationDialect::San).as_deref(), Some("Nf3"));
        pos.push("e2e4");
        assert_eq!(pos.san_move("e7e5", NotationDialect::Default).as_deref(), Some("e5"));
        assert_eq!(pos.san_move("e7e4", NotationDialect::Default), None);
    }

    #[test]
    fn test_result_and_check() {
        let mut pos = start_position();
        for token in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            assert!(pos.push(token));
        }
        assert!(pos.is_check());
        assert!(pos.is_game_over());
        assert_eq!(pos.result(), "0-1");
        assert_eq!(start_position().result(), "*");
        assert_eq!(start_position().legal_moves().split(' ').count(), 20);
    }

    #[test]
    fn test_dispose() {
        let mut pos = start_position();
        pos.push("e2e4");
        pos.dispose();
        assert!(pos.is_disposed());
        assert_eq!(pos.move_stack(), "");
    }

    #[test]
    fn test_long_algebraic_to_uci() {
        assert_eq!(long_algebraic_to_uci("Ng1-f3"), "g1f3");
        assert_eq!(long_algebraic_to_uci("e7xd8=Q+"), "e7d8q");
        assert_eq!(long_algebraic_to_uci("e2e4"), "e2e4");
    }
}
