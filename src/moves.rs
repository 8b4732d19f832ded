use smallvec::SmallVec;
use std::fmt;

use crate::codec::{MoveFields, parse_token};
use crate::error::{CompactError, TreeError};

/// Separates the fields of one move record.
pub(crate) const FIELD_SEPARATOR: char = '\u{1F}';
/// Separates items of a list held in one record field (comments).
pub(crate) const LIST_SEPARATOR: char = '\u{1D}';
/// Separates node records in the compact tree format.
pub(crate) const NODE_SEPARATOR: char = '\u{1E}';

pub const MAX_GLYPH: u32 = 139;

/// Shorthand annotation symbols with their glyph index, longest first so suffix
/// stripping matches `!!` before `!`.
pub const SHORTHAND_SYMBOLS: [(&str, u8); 6] = [
    ("!!", 3),
    ("!?", 5),
    ("?!", 6),
    ("??", 4),
    ("!", 1),
    ("?", 2),
];

static GLYPH_SYMBOLS: [(u8, &str); 25] = [
    (1, "!"),
    (2, "?"),
    (3, "!!"),
    (4, "??"),
    (5, "!?"),
    (6, "?!"),
    (7, "□"),
    (8, "□"),
    (10, "="),
    (11, "="),
    (12, "="),
    (13, "∞"),
    (14, "⩲"),
    (15, "⩱"),
    (16, "±"),
    (17, "∓"),
    (18, "+−"),
    (19, "−+"),
    (22, "⨀"),
    (23, "⨀"),
    (32, "⟳"),
    (33, "⟳"),
    (36, "→"),
    (40, "↑"),
    (132, "⇆"),
];

/// Display symbol for a glyph, for glyphs that have a common one.
pub fn glyph_symbol(glyph: Glyph) -> Option<&'static str> {
    GLYPH_SYMBOLS
        .iter()
        .find(|(index, _)| *index == glyph.0)
        .map(|(_, symbol)| *symbol)
}

/// Glyph index for one of `! ? !! ?? !? ?!`.
pub fn shorthand_glyph(symbol: &str) -> Option<Glyph> {
    SHORTHAND_SYMBOLS
        .iter()
        .find(|(text, _)| *text == symbol)
        .map(|(_, index)| Glyph(*index))
}

/// Splits a trailing shorthand symbol off a move, `"Nf3!?"` -> `("Nf3", Some("!?"))`.
pub fn strip_shorthand(text: &str) -> (&str, Option<&'static str>) {
    for (symbol, _) in SHORTHAND_SYMBOLS {
        if let Some(stripped) = text.strip_suffix(symbol)
            && !stripped.is_empty()
        {
            return (stripped, Some(symbol));
        }
    }
    (text, None)
}

/// Numeric annotation glyph, written `$N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Glyph(u8);

impl Glyph {
    pub fn new(index: u32) -> Result<Self, TreeError> {
        if index > MAX_GLYPH {
            return Err(TreeError::GlyphOutOfRange(index));
        }
        Ok(Self(index as u8))
    }

    pub fn index(self) -> u8 {
        self.0
    }

    fn parse(text: &str) -> Option<Self> {
        let index: u32 = text.strip_prefix('$')?.parse().ok()?;
        Self::new(index).ok()
    }
}

impl fmt::Display for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

/// One ply: the raw token, what the codec made of it, and its annotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    token: String,
    fields: Option<MoveFields>,
    symbols: SmallVec<[Glyph; 2]>,
    comments_before: Vec<String>,
    comments_after: Vec<String>,
    pub half_move_number: u32,
    pub mover_round: u32,
    pub hide_subsequent: bool,
}

impl Move {
    pub fn new(token: impl Into<String>, mover_round: u32, half_move_number: u32) -> Self {
        let token = token.into();
        let fields = parse_token(&token);
        Self {
            token,
            fields,
            symbols: SmallVec::new(),
            comments_before: Vec::new(),
            comments_after: Vec::new(),
            half_move_number,
            mover_round,
            hide_subsequent: false,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn fields(&self) -> Option<&MoveFields> {
        self.fields.as_ref()
    }

    pub fn is_valid(&self) -> bool {
        self.fields.is_some()
    }

    pub fn symbols(&self) -> &[Glyph] {
        &self.symbols
    }

    pub fn comments_before(&self) -> &[String] {
        &self.comments_before
    }

    pub fn comments_after(&self) -> &[String] {
        &self.comments_after
    }

    pub fn add_symbol(&mut self, index: u32) -> Result<(), TreeError> {
        self.symbols.push(Glyph::new(index)?);
        Ok(())
    }

    pub fn add_symbol_text(&mut self, symbol: &str) -> Result<(), TreeError> {
        let glyph =
            shorthand_glyph(symbol).ok_or_else(|| TreeError::UnknownSymbol(symbol.to_string()))?;
        self.symbols.push(glyph);
        Ok(())
    }

    /// Appends a comment shown before the move. Blank text is ignored.
    pub fn add_text_before(&mut self, text: &str) {
        if let Some(text) = clean_comment(text) {
            self.comments_before.push(text);
        }
    }

    /// Appends a comment shown after the move. Blank text is ignored.
    pub fn add_text_after(&mut self, text: &str) {
        if let Some(text) = clean_comment(text) {
            self.comments_after.push(text);
        }
    }

    /// Serializes every field so that [`Move::from_record_string`] restores an equal move.
    pub fn to_record_string(&self) -> String {
        let symbols = self
            .symbols
            .iter()
            .map(Glyph::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        let list = LIST_SEPARATOR.to_string();
        let list = list.as_str();
        let fields = [
            self.token.clone(),
            symbols,
            self.comments_before.join(list),
            self.comments_after.join(list),
            self.mover_round.to_string(),
            self.half_move_number.to_string(),
            u8::from(self.hide_subsequent).to_string(),
        ];
        fields.join(FIELD_SEPARATOR.to_string().as_str())
    }

    pub fn from_record_string(record: &str) -> Result<Self, CompactError> {
        let fields: Vec<&str> = record.split(FIELD_SEPARATOR).collect();
        match fields.as_slice() {
            [token] => Ok(Self::new(*token, 0, 0)),
            [token, symbols, before, after, mover_round, half_move_number, hide] => {
                let mut mv = Self::new(
                    *token,
                    parse_number("mover_round", mover_round)?,
                    parse_number("half_move_number", half_move_number)?,
                );
                for symbol in symbols.split(' ').filter(|s| !s.is_empty()) {
                    let glyph = Glyph::parse(symbol).ok_or_else(|| CompactError::InvalidNumber {
                        field: "symbols",
                        value: symbol.to_string(),
                    })?;
                    mv.symbols.push(glyph);
                }
                mv.comments_before = split_list(before);
                mv.comments_after = split_list(after);
                mv.hide_subsequent = match *hide {
                    "0" => false,
                    "1" => true,
                    other => {
                        return Err(CompactError::InvalidNumber {
                            field: "hide_subsequent",
                            value: other.to_string(),
                        });
                    }
                };
                Ok(mv)
            }
            _ => Err(CompactError::FieldCount(fields.len())),
        }
    }

    /// Pieces of this move as they appear in portable movetext.
    pub fn to_portable_parts(&self, force_show_number: bool, total_movers: usize) -> PortableParts {
        let show_number =
            force_show_number || self.mover_round == 0 || !self.comments_before.is_empty();
        let number = show_number.then(|| {
            let movers = total_movers.max(1) as u32;
            let index = self.half_move_number.div_ceil(movers);
            if self.mover_round == 0 {
                format!("{index}.")
            } else {
                format!("{index}...")
            }
        });

        PortableParts {
            comments_before: self.comments_before.iter().map(|c| wrap_comment(c)).collect(),
            number,
            token: self.token.clone(),
            symbols: self.symbols.iter().map(Glyph::to_string).collect(),
            comments_after: self.comments_after.iter().map(|c| wrap_comment(c)).collect(),
        }
    }
}

/// A move split into the pieces written to movetext, in output order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortableParts {
    pub comments_before: Vec<String>,
    pub number: Option<String>,
    pub token: String,
    pub symbols: Vec<String>,
    pub comments_after: Vec<String>,
}

impl PortableParts {
    pub fn pieces(&self) -> impl Iterator<Item = &str> {
        self.comments_before
            .iter()
            .map(String::as_str)
            .chain(self.number.as_deref())
            .chain(std::iter::once(self.token.as_str()))
            .chain(self.symbols.iter().map(String::as_str))
            .chain(self.comments_after.iter().map(String::as_str))
    }
}

impl fmt::Display for PortableParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, piece) in self.pieces().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(piece)?;
        }
        Ok(())
    }
}

fn wrap_comment(text: &str) -> String {
    format!("{{{text}}}")
}

fn clean_comment(text: &str) -> Option<String> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(*c, FIELD_SEPARATOR | LIST_SEPARATOR | NODE_SEPARATOR | '}'))
        .collect();
    let trimmed = cleaned.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn split_list(field: &str) -> Vec<String> {
    if field.is_empty() {
        return Vec::new();
    }
    field.split(LIST_SEPARATOR).map(str::to_string).collect()
}

fn parse_number(field: &'static str, value: &str) -> Result<u32, CompactError> {
    value.parse().map_err(|_| CompactError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}
