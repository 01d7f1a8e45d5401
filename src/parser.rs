use pest::iterators::Pair;
use pest::Parser;

use crate::uci::{PieceKind, Square, UciMove};

#[derive(Parser)]
#[grammar = "../res/uci.pest"]
struct BestMoveGrammar;

/// What an engine meant by the line it sent in reply to `go`.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Outcome {
    /// A regular move, possibly carrying a promotion.
    Move(UciMove),
    /// The engine gave up (`bestmove a1a1`).
    Resigned,
    /// The engine has nothing to play (`bestmove NULL`, `bestmove (none)`).
    NoMove,
    /// Starts with `bestmove` but is not in any dialect we know.
    Malformed,
    /// Not a best-move response at all.
    Unexpected,
}

impl Outcome {
    /// True for outcomes that end the game.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Outcome::Resigned | Outcome::NoMove)
    }
}

/// Classifies one raw response line. Total and free of side effects.
pub fn classify(line: &str) -> Outcome {
    match BestMoveGrammar::parse(Rule::bestmove, line) {
        Ok(pairs) => pairs
            .flatten()
            .find_map(|pair| match pair.as_rule() {
                Rule::resign => Some(Outcome::Resigned),
                Rule::no_move => Some(Outcome::NoMove),
                Rule::best => Some(best_move(pair)),
                _ => None,
            })
            .unwrap_or(Outcome::Malformed),
        Err(_) if BestMoveGrammar::parse(Rule::bestmove_prefix, line).is_ok() => Outcome::Malformed,
        Err(_) => Outcome::Unexpected,
    }
}

fn best_move(pair: Pair<Rule>) -> Outcome {
    let mut squares = Vec::with_capacity(2);
    let mut promotion = None;

    for sp in pair.into_inner() {
        match sp.as_rule() {
            Rule::square => squares.push(sp.as_str().parse::<Square>()),
            Rule::promotion => promotion = sp.as_str().chars().next(),
            _ => {}
        }
    }

    let promotion = match promotion {
        None => None,
        Some(c) => match PieceKind::from_char(c) {
            Some(kind) => Some(kind),
            None => return Outcome::Malformed,
        },
    };

    match squares.as_slice() {
        [Ok(from), Ok(to)] => UciMove::new(*from, *to, promotion)
            .map(Outcome::Move)
            .unwrap_or(Outcome::Malformed),
        _ => Outcome::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn mv(s: &str) -> Outcome {
        Outcome::Move(s.parse().unwrap())
    }

    #[test]
    fn test_plain_move() {
        assert_eq!(classify("bestmove e2e4"), mv("e2e4"));
        assert_eq!(classify("bestmove g8f6\n"), mv("g8f6"));
        assert_eq!(classify("bestmove g8f6\r\n"), mv("g8f6"));
    }

    #[test]
    fn test_move_with_ponder() {
        assert_eq!(classify("bestmove e2e4 ponder e7e5"), mv("e2e4"));
    }

    #[test]
    fn test_promotion() {
        assert_eq!(classify("bestmove a7a8q"), mv("a7a8q"));
        assert_eq!(classify("bestmove b2b1n ponder a1b1"), mv("b2b1n"));
    }

    #[test]
    fn test_resign_sentinel() {
        assert_eq!(classify("bestmove a1a1"), Outcome::Resigned);
        assert_eq!(classify("bestmove a1a1 "), Outcome::Resigned);
        assert_eq!(classify("bestmove a1a1q"), Outcome::Resigned);
        assert_eq!(classify("bestmove a1a1\tponder x"), Outcome::Resigned);
    }

    #[test]
    fn test_no_move_sentinels() {
        assert_eq!(classify("bestmove NULL"), Outcome::NoMove);
        assert_eq!(classify("bestmove (none) "), Outcome::NoMove);
        assert_eq!(classify("bestmove (none)"), Outcome::NoMove);
        assert_eq!(classify("bestmove NULLmove"), Outcome::NoMove);
        assert_eq!(classify("bestmove (none)\r\n"), Outcome::NoMove);
    }

    #[test]
    fn test_malformed() {
        assert_eq!(classify("bestmove"), Outcome::Malformed);
        assert_eq!(classify("bestmove "), Outcome::Malformed);
        assert_eq!(classify("bestmove z9z9"), Outcome::Malformed);
        assert_eq!(classify("bestmove e2e2"), Outcome::Malformed);
        assert_eq!(classify("bestmove e7e8k"), Outcome::Malformed);
        assert_eq!(classify("bestmove e7e8x"), Outcome::Malformed);
        assert_eq!(classify("bestmove e2e4xyz"), Outcome::Malformed);
        assert_eq!(classify("bestmovee2e4"), Outcome::Malformed);
    }

    #[test]
    fn test_unexpected() {
        assert_eq!(classify("readyok"), Outcome::Unexpected);
        assert_eq!(classify("info depth 1 pv e2e4"), Outcome::Unexpected);
        assert_eq!(classify(" bestmove e2e4"), Outcome::Unexpected);
        assert_eq!(classify(""), Outcome::Unexpected);
    }

    #[test]
    fn test_terminal() {
        assert!(Outcome::Resigned.is_terminal());
        assert!(Outcome::NoMove.is_terminal());
        assert!(!mv("e2e4").is_terminal());
        assert!(!Outcome::Malformed.is_terminal());
    }

    proptest! {
        #[test]
        fn prop_classify_is_deterministic(line in "(bestmove )?[a-z1-9() A-Z]{0,12}") {
            prop_assert_eq!(classify(&line), classify(&line));
        }

        #[test]
        fn prop_every_square_pair_is_a_move(from in 0u8..64, to in 0u8..64) {
            prop_assume!(from != to);
            let from = Square::new(from % 8, from / 8).unwrap();
            let to = Square::new(to % 8, to / 8).unwrap();
            let line = format!("bestmove {}{}", from, to);
            prop_assert_eq!(classify(&line), Outcome::Move(UciMove::new(from, to, None).unwrap()));
        }
    }
}
