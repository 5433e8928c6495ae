//! Outcome of looking up a single element

use crate::error::{E2eError, E2eResult};

/// Result of a lookup that expects exactly one match.
///
/// The caller decides whether `NotFound` or `Ambiguous` is fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    NotFound,
    /// More than one match; holds the match count
    Ambiguous(usize),
    Found(T),
}

impl<T> Lookup<T> {
    pub fn from_matches(mut matches: Vec<T>) -> Self {
        match matches.len() {
            0 => Lookup::NotFound,
            1 => Lookup::Found(matches.remove(0)),
            n => Lookup::Ambiguous(n),
        }
    }

    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(item) => Some(item),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    /// Unwrap the single match, naming `what` in the error otherwise
    pub fn require(self, what: &str) -> E2eResult<T> {
        match self {
            Lookup::Found(item) => Ok(item),
            Lookup::NotFound => Err(E2eError::ElementNotFound(what.to_string())),
            Lookup::Ambiguous(count) => Err(E2eError::AmbiguousElement {
                what: what.to_string(),
                count,
            }),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Lookup::NotFound => Lookup::NotFound,
            Lookup::Ambiguous(n) => Lookup::Ambiguous(n),
            Lookup::Found(item) => Lookup::Found(f(item)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(vec![], Lookup::NotFound ; "none")]
    #[test_case(vec![7], Lookup::Found(7) ; "one")]
    #[test_case(vec![1, 2, 3], Lookup::Ambiguous(3) ; "three")]
    fn test_from_matches(matches: Vec<u32>, expected: Lookup<u32>) {
        assert_eq!(Lookup::from_matches(matches), expected);
    }

    #[test]
    fn test_require_messages() {
        let err = Lookup::<u32>::NotFound.require("button \"Log in\"").unwrap_err();
        assert_eq!(err.to_string(), "No button \"Log in\"");

        let err = Lookup::<u32>::Ambiguous(2).require("text \"More\"").unwrap_err();
        assert_eq!(err.to_string(), "More than one text \"More\" (2 matches)");

        assert_eq!(Lookup::Found(5).require("anything").unwrap(), 5);
    }

    #[test]
    fn test_map_keeps_outcome() {
        assert_eq!(Lookup::Found(2).map(|n| n * 10), Lookup::Found(20));
        assert_eq!(Lookup::<u32>::Ambiguous(4).map(|n| n + 1), Lookup::Ambiguous(4));
        assert_eq!(Lookup::Found(1).found(), Some(1));
        assert!(!Lookup::<u32>::NotFound.is_found());
    }
}
