use aho_corasick::{AhoCorasick, BuildError, MatchKind};

/// Replaces a fixed set of placeholders in a single pass.
///
/// Overlapping placeholders resolve to the leftmost and then longest one, so
/// `date` never replaces the tail of `start_date`.
#[derive(Debug, Clone)]
pub struct TokenMap {
    automaton: AhoCorasick,
    tokens: Vec<String>,
    replacements: Vec<String>,
}

impl TokenMap {
    pub fn new<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Result<Self, BuildError>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let (tokens, replacements): (Vec<String>, Vec<String>) = pairs
            .into_iter()
            .map(|(token, replacement)| (token.into(), replacement.into()))
            .unzip();

        let automaton = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(&tokens)?;

        Ok(Self {
            automaton,
            tokens,
            replacements,
        })
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    #[must_use]
    pub fn is_match(&self, haystack: &str) -> bool {
        self.automaton.is_match(haystack)
    }

    #[must_use]
    pub fn replace(&self, haystack: &str) -> String {
        self.automaton.replace_all(haystack, &self.replacements)
    }
}
