use crate::tree::MoveTree;

/// Move notations a rules oracle may be asked to read or write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NotationDialect {
    #[default]
    Default,
    San,
    Lan,
    ShogiHosking,
    ShogiHodges,
    ShogiHodgesNumber,
    Janggi,
    XiangqiWxf,
    ThaiSan,
    ThaiLan,
}

pub const DEFAULT_VARIANT: &str = "chess";

/// How movetext is read: which game, from which position, in which notation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    pub variant: String,
    pub chess960: bool,
    /// Starting position; the oracle's default for `variant` when `None`.
    pub initial_fen: Option<String>,
    pub dialect: NotationDialect,
    pub total_movers: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            variant: DEFAULT_VARIANT.to_string(),
            chess960: false,
            initial_fen: None,
            dialect: NotationDialect::Default,
            total_movers: 2,
        }
    }
}

impl ImportOptions {
    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = variant.into();
        self
    }

    pub fn with_chess960(mut self, chess960: bool) -> Self {
        self.chess960 = chess960;
        self
    }

    pub fn with_initial_fen(mut self, fen: impl Into<String>) -> Self {
        self.initial_fen = Some(fen.into());
        self
    }

    pub fn with_dialect(mut self, dialect: NotationDialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_total_movers(mut self, total_movers: usize) -> Self {
        self.total_movers = total_movers;
        self
    }

    /// Fills in what the caller left open from `Variant` and `FEN` header tags.
    pub fn refined_by_headers(&self, headers: &[(String, String)]) -> Self {
        let mut options = self.clone();

        if options.initial_fen.is_none()
            && let Some(fen) = header_value(headers, "FEN").filter(|f| !f.is_empty())
        {
            options.initial_fen = Some(fen.to_string());
        }

        if let Some(variant) = header_value(headers, "Variant") {
            match variant.to_ascii_lowercase().as_str() {
                "" | "standard" | "chess" => {}
                "chess960" | "fischerandom" | "fischer random" => options.chess960 = true,
                other if options.variant == DEFAULT_VARIANT => options.variant = other.to_string(),
                _ => {}
            }
        }
        options
    }
}

fn header_value<'h>(headers: &'h [(String, String)], key: &str) -> Option<&'h str> {
    headers
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.trim())
}

/// A game read from portable movetext.
#[derive(Debug, Clone, Default)]
pub struct Game {
    pub headers: Vec<(String, String)>,
    pub tree: MoveTree,
    pub result: Option<String>,
    /// Non-fatal problems met while reading, `"; "`-separated.
    pub warnings: Option<String>,
}

impl Game {
    pub fn header(&self, key: &str) -> Option<&str> {
        header_value(&self.headers, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_options() {
        let options = ImportOptions::default();
        assert_eq!(options.variant, "chess");
        assert!(!options.chess960);
        assert_eq!(options.initial_fen, None);
        assert_eq!(options.total_movers, 2);
    }

    #[test]
    fn test_builder_methods() {
        let options = ImportOptions::default()
            .with_variant("crazyhouse")
            .with_chess960(true)
            .with_dialect(NotationDialect::Lan)
            .with_total_movers(3);
        assert_eq!(options.variant, "crazyhouse");
        assert!(options.chess960);
        assert_eq!(options.dialect, NotationDialect::Lan);
        assert_eq!(options.total_movers, 3);
    }

    #[test]
    fn test_refined_by_headers_reads_fen_and_variant() {
        let tags = headers(&[
            ("Variant", "Chess960"),
            ("FEN", "4k3/8/8/8/8/8/8/4K3 w - - 0 1"),
        ]);
        let options = ImportOptions::default().refined_by_headers(&tags);
        assert!(options.chess960);
        assert_eq!(
            options.initial_fen.as_deref(),
            Some("4k3/8/8/8/8/8/8/4K3 w - - 0 1")
        );
        assert_eq!(options.variant, "chess");
    }

    #[test]
    fn test_refined_by_headers_keeps_caller_choices() {
        let tags = headers(&[("Variant", "Atomic"), ("FEN", "8/8/8/8/8/8/8/8 w - - 0 1")]);
        let options = ImportOptions::default()
            .with_variant("crazyhouse")
            .with_initial_fen("start")
            .refined_by_headers(&tags);
        assert_eq!(options.variant, "crazyhouse");
        assert_eq!(options.initial_fen.as_deref(), Some("start"));

        let atomic = ImportOptions::default().refined_by_headers(&tags);
        assert_eq!(atomic.variant, "atomic");
    }

    #[test]
    fn test_game_header_lookup() {
        let game = Game {
            headers: headers(&[("Event", "Casual"), ("Result", "1-0")]),
            ..Game::default()
        };
        assert_eq!(game.header("Event"), Some("Casual"));
        assert_eq!(game.header("Site"), None);
    }
}
