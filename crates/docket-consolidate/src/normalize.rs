//! Text normalization into comparable token sets.

use std::collections::BTreeSet;

use crate::rules::StopWords;

/// Tokens shorter than this many characters are discarded.
pub const MIN_TOKEN_LEN: usize = 3;

/// Normalize free text into a set of content-bearing tokens.
///
/// The text is lowercased and split on every character outside `[a-z0-9]`
/// (so non-ASCII letters act as separators). Tokens shorter than
/// `min_len` and stop words are dropped. Empty or whitespace-only input
/// yields an empty set.
#[must_use]
pub fn normalize(text: &str, stop_words: &StopWords, min_len: usize) -> BTreeSet<String> {
    let lowered = text.to_lowercase();
    lowered
        .split(|c: char| !(c.is_ascii_lowercase() || c.is_ascii_digit()))
        .filter(|token| !token.is_empty() && token.len() >= min_len)
        .filter(|token| !stop_words.contains(token))
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<String> {
        normalize(text, &StopWords::default(), MIN_TOKEN_LEN)
            .into_iter()
            .collect()
    }

    #[test]
    fn lowercases_and_splits_on_punctuation() {
        assert_eq!(
            tokens("Add Redis-backed CACHE, v2!"),
            vec!["add", "backed", "cache", "redis"]
        );
    }

    #[test]
    fn drops_short_tokens_and_stop_words() {
        assert_eq!(tokens("the api is on fire with this bug"), vec!["api", "bug", "fire"]);
    }

    #[test]
    fn deduplicates() {
        assert_eq!(tokens("cache cache CACHE"), vec!["cache"]);
    }

    #[test]
    fn digits_are_token_characters() {
        assert_eq!(tokens("upgrade to http2 and tls13"), vec!["http2", "tls13", "upgrade"]);
    }

    #[test]
    fn non_ascii_letters_are_separators() {
        assert_eq!(tokens("café résumé"), vec!["caf", "sum"]);
    }

    #[test]
    fn blank_input_is_empty() {
        assert!(tokens("").is_empty());
        assert!(tokens("   \n\t ").is_empty());
        assert!(tokens("a an to of").is_empty());
    }

    #[test]
    fn min_len_is_configurable() {
        let set = normalize("go is ok", &StopWords::empty(), 2);
        assert_eq!(
            set.into_iter().collect::<Vec<_>>(),
            vec!["go", "is", "ok"]
        );
    }

    #[test]
    fn separator_runs_never_yield_empty_tokens() {
        let set = normalize("a -- b,, c", &StopWords::empty(), 0);
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }
}
