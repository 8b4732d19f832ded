//! Classification of compact move tokens such as `e2e4`, `e7e8q`, `P@e4`,
//! `h2h1+` or `e2e4,e4e5` (move plus gating placement).

/// Fields of a parsed move token. The pass move has every field empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveFields {
    pub origin: String,
    pub destination: String,
    pub action: String,
    pub gating: String,
}

impl MoveFields {
    pub fn pass() -> Self {
        Self::default()
    }

    pub fn is_drop(&self) -> bool {
        self.origin.ends_with('@')
    }

    pub fn is_shogi_promotion(&self) -> bool {
        self.action == "+"
    }

    pub fn is_shogi_demotion(&self) -> bool {
        self.action == "-"
    }

    pub fn is_pawn_promotion(&self) -> bool {
        let mut chars = self.action.chars();
        matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_lowercase())
    }

    pub fn is_pass(&self) -> bool {
        self.origin == self.destination && self.gating.is_empty()
    }

    pub fn is_wall_gating_only(&self) -> bool {
        self.origin == self.destination && !self.gating.is_empty()
    }

    pub fn dropped_piece(&self) -> Option<char> {
        if self.is_drop() {
            self.origin.chars().next()
        } else {
            None
        }
    }
}

/// Parses a move token. `None` marks a token where no field could be trusted.
pub fn parse_token(token: &str) -> Option<MoveFields> {
    if token.is_empty() || token == "0000" {
        return Some(MoveFields::pass());
    }

    let (move_part, gating) = match token.split_once(',') {
        Some((move_part, gating_part)) => {
            let runs = split_runs(gating_part);
            let square = square_pairs(&runs)?;
            (move_part, square.1)
        }
        None => (token, String::new()),
    };

    if let Some((piece, destination)) = move_part.split_once('@') {
        if destination.is_empty() {
            return None;
        }
        return Some(MoveFields {
            origin: format!("{piece}@"),
            destination: destination.to_string(),
            action: String::new(),
            gating,
        });
    }

    let (squares, action) = match move_part.chars().last() {
        Some(c) if c == '+' || c == '-' || c.is_ascii_lowercase() => {
            let cut = move_part.len() - c.len_utf8();
            (&move_part[..cut], c.to_string())
        }
        _ => (move_part, String::new()),
    };

    let runs = split_runs(squares);
    let (origin, destination) = square_pairs(&runs)?;
    Some(MoveFields {
        origin,
        destination,
        action,
        gating,
    })
}

/// Splits `e10f9` into `["e", "10", "f", "9"]`. Any other character ends the current run
/// and becomes a run of its own so malformed tokens never pass as squares.
fn split_runs(s: &str) -> Vec<&str> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut prev: Option<RunKind> = None;
    for (i, c) in s.char_indices() {
        let kind = RunKind::of(c);
        if let Some(p) = prev
            && (p != kind || kind == RunKind::Other)
        {
            runs.push(&s[start..i]);
            start = i;
        }
        prev = Some(kind);
    }
    if start < s.len() {
        runs.push(&s[start..]);
    }
    runs
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum RunKind {
    Letter,
    Digit,
    Other,
}

impl RunKind {
    fn of(c: char) -> Self {
        if c.is_ascii_alphabetic() {
            Self::Letter
        } else if c.is_ascii_digit() {
            Self::Digit
        } else {
            Self::Other
        }
    }
}

/// Two file+rank pairs, in order.
fn square_pairs(runs: &[&str]) -> Option<(String, String)> {
    let [f1, r1, f2, r2] = runs else {
        return None;
    };
    let is_file = |s: &str| s.chars().all(|c| c.is_ascii_alphabetic());
    let is_rank = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !(is_file(f1) && is_rank(r1) && is_file(f2) && is_rank(r2)) {
        return None;
    }
    Some((format!("{f1}{r1}"), format!("{f2}{r2}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normal_move() {
        let fields = parse_token("e2e4").unwrap();
        assert_eq!(fields.origin, "e2");
        assert_eq!(fields.destination, "e4");
        assert_eq!(fields.action, "");
        assert_eq!(fields.gating, "");
        assert!(!fields.is_pass());
    }

    #[test]
    fn test_parse_drop() {
        let fields = parse_token("P@e4").unwrap();
        assert!(fields.is_drop());
        assert_eq!(fields.origin, "P@");
        assert_eq!(fields.destination, "e4");
        assert_eq!(fields.action, "");
        assert_eq!(fields.dropped_piece(), Some('P'));
    }

    #[test]
    fn test_parse_pawn_promotion() {
        let fields = parse_token("e7e8q").unwrap();
        assert_eq!(fields.action, "q");
        assert!(fields.is_pawn_promotion());
        assert!(!fields.is_shogi_promotion());
    }

    #[test]
    fn test_parse_shogi_promotion_and_demotion() {
        let promoted = parse_token("h2h1+").unwrap();
        assert!(promoted.is_shogi_promotion());
        assert_eq!(promoted.destination, "h1");

        let demoted = parse_token("c3c4-").unwrap();
        assert!(demoted.is_shogi_demotion());
        assert!(!demoted.is_pawn_promotion());
    }

    #[test]
    fn test_parse_pass() {
        assert_eq!(parse_token("0000"), Some(MoveFields::pass()));
        assert_eq!(parse_token(""), Some(MoveFields::pass()));
        assert!(parse_token("0000").unwrap().is_pass());
    }

    #[test]
    fn test_parse_invalid_tokens() {
        assert_eq!(parse_token("xyz123"), None);
        assert_eq!(parse_token("e4"), None);
        assert_eq!(parse_token("e2e4e5"), None);
        assert_eq!(parse_token("2e4e"), None);
        assert_eq!(parse_token("Q@"), None);
    }

    #[test]
    fn test_parse_large_board_squares() {
        let fields = parse_token("a10b10").unwrap();
        assert_eq!(fields.origin, "a10");
        assert_eq!(fields.destination, "b10");
    }

    #[test]
    fn test_parse_gating() {
        let fields = parse_token("e2e4,e4d5").unwrap();
        assert_eq!(fields.origin, "e2");
        assert_eq!(fields.destination, "e4");
        assert_eq!(fields.gating, "d5");
        assert!(!fields.is_wall_gating_only());

        let wall_only = parse_token("e2e2,e2f3").unwrap();
        assert!(wall_only.is_wall_gating_only());
        assert!(!wall_only.is_pass());
    }

    #[test]
    fn test_parse_malformed_gating_is_invalid() {
        assert_eq!(parse_token("e2e4,zz"), None);
    }
}
