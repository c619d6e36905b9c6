//! Tokenization, stopword filtering and word counting.
//!
//! Turns a raw corpus into a [`RankedWordList`]: lower-cased tokens, counted in
//! a single pass, ranked by count with ties kept in first-occurrence order.

use rustc_hash::{FxHashMap, FxHashSet};

/// Baseline English stopword list, one word per line.
pub const DEFAULT_STOPWORDS_TEXT: &str = include_str!("stopwords.txt");

/// Words that are common in scraped prose but carry no topic.
const EXTRA_STOPWORDS: &[&str] = &[
    "us", "one", "will", "said", "now", "well", "man", "may", "little", "say", "must", "way",
    "long", "yet", "mean", "put", "seem", "asked", "made", "half", "much", "certainly", "might",
    "came",
];

/// Upper bound accepted for `max_words`.
pub const MAX_WORDS_LIMIT: usize = 10_000;

// =============================================================================
// Stopwords
// =============================================================================

/// Case-insensitive set of words excluded from counting.
#[derive(Debug, Clone)]
pub struct Stopwords {
    words: FxHashSet<String>,
}

impl Default for Stopwords {
    fn default() -> Self {
        let mut stopwords = Self::from_list(DEFAULT_STOPWORDS_TEXT.lines());
        stopwords.extend(EXTRA_STOPWORDS.iter().copied());
        stopwords
    }
}

impl Stopwords {
    /// An empty set; nothing is filtered.
    pub fn empty() -> Self {
        Self {
            words: FxHashSet::default(),
        }
    }

    pub fn from_list<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut stopwords = Self::empty();
        stopwords.extend(words);
        stopwords
    }

    pub fn insert(&mut self, word: &str) {
        let word = word.trim();
        if !word.is_empty() {
            self.words.insert(word.to_lowercase());
        }
    }

    pub fn extend<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            self.insert(word.as_ref());
        }
    }

    pub fn remove(&mut self, word: &str) {
        self.words.remove(&word.to_lowercase());
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

// =============================================================================
// Tokenizer
// =============================================================================

#[derive(Debug, Clone)]
pub struct Tokenizer {
    /// Tokens with fewer characters are discarded.
    pub min_length: usize,
    /// Keep tokens made only of digits.
    pub include_numbers: bool,
    /// Length cap of the ranked list.
    pub max_words: usize,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self {
            min_length: 2,
            include_numbers: false,
            max_words: 200,
        }
    }
}

impl Tokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    pub fn with_include_numbers(mut self, include_numbers: bool) -> Self {
        self.include_numbers = include_numbers;
        self
    }

    pub fn with_max_words(mut self, max_words: usize) -> Self {
        self.max_words = max_words;
        self
    }

    /// Lazy stream of normalized tokens. Calling it again restarts from the
    /// beginning of the corpus.
    pub fn tokens<'a>(&self, corpus: &'a str) -> impl Iterator<Item = String> + 'a {
        corpus
            .split(|c: char| !(c.is_alphanumeric() || is_apostrophe(c)))
            .filter_map(normalize)
    }

    /// Single pass over the token stream, skipping stopwords, short tokens and
    /// (unless enabled) bare numbers.
    pub fn frequencies(&self, corpus: &str, stopwords: &Stopwords) -> FrequencyTable {
        let mut table = FrequencyTable::default();

        for token in self.tokens(corpus) {
            if token.chars().count() < self.min_length {
                continue;
            }
            if !self.include_numbers && token.chars().all(|c| c.is_numeric()) {
                continue;
            }
            if stopwords.contains(&token) {
                continue;
            }
            // "he's" is a stopword even though "he" is what survives stripping.
            if let Some(stem) = token.strip_suffix("'s") {
                if stopwords.contains(stem) || stem.chars().count() < self.min_length {
                    continue;
                }
                let stem = stem.to_string();
                table.add(stem);
            } else {
                table.add(token);
            }
        }

        table
    }

    pub fn count(&self, corpus: &str, stopwords: &Stopwords) -> RankedWordList {
        self.frequencies(corpus, stopwords).ranked(self.max_words)
    }
}

/// Counts `corpus` with the default policy and `max_words` cap.
pub fn count_words(corpus: &str, stopwords: &Stopwords, min_length: usize) -> RankedWordList {
    Tokenizer::default()
        .with_min_length(min_length)
        .count(corpus, stopwords)
}

fn is_apostrophe(c: char) -> bool {
    c == '\'' || c == '\u{2019}'
}

fn normalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim_matches(is_apostrophe);
    if trimmed.is_empty() {
        return None;
    }
    let token: String = trimmed
        .chars()
        .map(|c| if is_apostrophe(c) { '\'' } else { c })
        .flat_map(char::to_lowercase)
        .collect();
    Some(token)
}

// =============================================================================
// Frequency Table
// =============================================================================

/// Token counts in first-occurrence order.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    entries: Vec<(String, u32)>,
    index: FxHashMap<String, usize>,
}

impl FrequencyTable {
    fn add(&mut self, token: String) {
        match self.index.get(&token) {
            Some(&slot) => self.entries[slot].1 += 1,
            None => {
                self.index.insert(token.clone(), self.entries.len());
                self.entries.push((token, 1));
            }
        }
    }

    pub fn get(&self, token: &str) -> Option<u32> {
        self.index.get(token).map(|&slot| self.entries[slot].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of retained tokens.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| u64::from(*count)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(token, count)| (token.as_str(), *count))
    }

    /// Stable sort by descending count, truncated to `max_words`.
    pub fn ranked(&self, max_words: usize) -> RankedWordList {
        let mut words: Vec<RankedWord> = self
            .entries
            .iter()
            .map(|(text, count)| RankedWord {
                text: text.clone(),
                count: *count,
            })
            .collect();
        words.sort_by(|a, b| b.count.cmp(&a.count));
        words.truncate(max_words);
        RankedWordList { words }
    }
}

// =============================================================================
// Ranked Words
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedWord {
    pub text: String,
    pub count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankedWordList {
    words: Vec<RankedWord>,
}

impl RankedWordList {
    /// Builds a list from pre-counted words, applying the same ordering rule
    /// as counting does.
    pub fn from_counts<I, S>(counts: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let mut words: Vec<RankedWord> = counts
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(text, count)| RankedWord {
                text: text.into(),
                count,
            })
            .collect();
        words.sort_by(|a, b| b.count.cmp(&a.count));
        Self { words }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RankedWord> {
        self.words.iter()
    }

    pub fn as_slice(&self) -> &[RankedWord] {
        &self.words
    }

    /// `(text, count)` pairs in rank order.
    pub fn to_pairs(&self) -> Vec<(&str, u32)> {
        self.words
            .iter()
            .map(|w| (w.text.as_str(), w.count))
            .collect()
    }
}

impl<'a> IntoIterator for &'a RankedWordList {
    type Item = &'a RankedWord;
    type IntoIter = std::slice::Iter<'a, RankedWord>;

    fn into_iter(self) -> Self::IntoIter {
        self.words.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_ranks() {
        let ranked = count_words("cat cat dog dog dog bird", &Stopwords::default(), 2);
        assert_eq!(ranked.to_pairs(), vec![("dog", 3), ("cat", 2), ("bird", 1)]);
    }

    #[test]
    fn test_ties_keep_first_occurrence() {
        let ranked = count_words("zebra apple mango apple zebra mango", &Stopwords::empty(), 2);
        assert_eq!(
            ranked.to_pairs(),
            vec![("zebra", 2), ("apple", 2), ("mango", 2)]
        );
    }

    #[test]
    fn test_case_folding_and_punctuation() {
        let table = Tokenizer::default()
            .frequencies("Rust, RUST! rust? (Rust's) -- rust.", &Stopwords::empty());
        assert_eq!(table.get("rust"), Some(5));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_stopwords_are_case_insensitive() {
        let mut stopwords = Stopwords::empty();
        stopwords.insert("Ferris");
        assert!(stopwords.contains("ferris"));
        assert!(stopwords.contains("FERRIS"));

        let table = Tokenizer::default().frequencies("Ferris crab FERRIS crab", &stopwords);
        assert_eq!(table.get("ferris"), None);
        assert_eq!(table.get("crab"), Some(2));
    }

    #[test]
    fn test_default_stopwords_include_extras() {
        let stopwords = Stopwords::default();
        assert!(stopwords.contains("the"));
        assert!(stopwords.contains("don't"));
        assert!(stopwords.contains("certainly"));
        assert!(!stopwords.contains("ocean"));
    }

    #[test]
    fn test_only_stopwords_yields_empty_list() {
        let ranked = count_words("the a an of", &Stopwords::default(), 2);
        assert!(ranked.is_empty());

        let ranked = count_words("", &Stopwords::default(), 2);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_numbers_and_short_tokens() {
        let corpus = "2024 x y route66 99 z";
        let dropped = Tokenizer::default().frequencies(corpus, &Stopwords::empty());
        assert_eq!(dropped.iter().collect::<Vec<_>>(), vec![("route66", 1)]);

        let kept = Tokenizer::default()
            .with_include_numbers(true)
            .frequencies(corpus, &Stopwords::empty());
        assert_eq!(kept.get("2024"), Some(1));
        assert_eq!(kept.get("99"), Some(1));
    }

    #[test]
    fn test_contractions_are_stopwords() {
        let table = Tokenizer::default().frequencies("He's sure it's fine", &Stopwords::default());
        assert_eq!(table.get("he"), None);
        assert_eq!(table.get("it"), None);
        assert_eq!(table.get("sure"), Some(1));
    }

    #[test]
    fn test_total_matches_retained_tokens() {
        let corpus = "the quick brown fox jumps over the lazy dog and the quick cat";
        let stopwords = Stopwords::default();
        let tokenizer = Tokenizer::default();
        let table = tokenizer.frequencies(corpus, &stopwords);

        let retained = tokenizer
            .tokens(corpus)
            .filter(|t| t.len() >= 2 && !stopwords.contains(t))
            .count();
        assert_eq!(table.total(), retained as u64);
        assert!(table.iter().all(|(token, _)| !stopwords.contains(token)));
    }

    #[test]
    fn test_max_words_truncates() {
        let ranked = Tokenizer::default()
            .with_max_words(2)
            .count("alpha alpha alpha beta beta gamma", &Stopwords::empty());
        assert_eq!(ranked.to_pairs(), vec![("alpha", 3), ("beta", 2)]);
    }

    #[test]
    fn test_token_stream_restarts() {
        let tokenizer = Tokenizer::default();
        let first: Vec<_> = tokenizer.tokens("One two, three").collect();
        let second: Vec<_> = tokenizer.tokens("One two, three").collect();
        assert_eq!(first, vec!["one", "two", "three"]);
        assert_eq!(first, second);
    }
}
