use rand::rngs::{StdRng, ThreadRng};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

use crate::vocabulary::Vocabulary;

/// Number of words generated for a test unless configured otherwise.
pub const DEFAULT_STREAM_LENGTH: usize = 200;

/// Randomness seam for word stream generation
pub trait Shuffler {
    /// Permute `words` in place.
    fn shuffle(&mut self, words: &mut [String]);
}

/// Production shuffler backed by any `rand` generator
#[derive(Debug, Clone)]
pub struct RandomShuffler<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomShuffler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomShuffler<ThreadRng> {
    pub fn thread() -> Self {
        Self::new(rand::thread_rng())
    }
}

impl RandomShuffler<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Shuffler for RandomShuffler<R> {
    fn shuffle(&mut self, words: &mut [String]) {
        words.shuffle(&mut self.rng);
    }
}

/// Leaves the vocabulary order untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepOrder;

impl Shuffler for KeepOrder {
    fn shuffle(&mut self, _words: &mut [String]) {}
}

impl<S: Shuffler + ?Sized> Shuffler for Box<S> {
    fn shuffle(&mut self, words: &mut [String]) {
        (**self).shuffle(words)
    }
}

/// The immutable sequence of words presented during one test.
///
/// Clones share the same backing storage.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WordStream {
    words: Arc<[String]>,
}

impl WordStream {
    /// Word at `idx`, or the empty string once the stream is exhausted.
    pub fn word(&self, idx: usize) -> &str {
        self.words.get(idx).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for WordStream {
    fn from(words: Vec<String>) -> Self {
        Self {
            words: words.into(),
        }
    }
}

impl<'a> FromIterator<&'a str> for WordStream {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>()
            .into()
    }
}

/// Shuffle a copy of the vocabulary and cycle through it until `length`
/// words have been produced.
pub fn generate_word_stream<S: Shuffler + ?Sized>(
    vocabulary: &Vocabulary,
    length: usize,
    shuffler: &mut S,
) -> WordStream {
    let mut shuffled = vocabulary.words.clone();
    if shuffled.is_empty() {
        return WordStream::default();
    }
    shuffler.shuffle(&mut shuffled);

    (0..length)
        .map(|i| shuffled[i % shuffled.len()].clone())
        .collect::<Vec<_>>()
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab(words: &[&str]) -> Vocabulary {
        Vocabulary::from_words("test", words.iter().map(|w| w.to_string())).unwrap()
    }

    /// Reverses the slice so tests can observe that the shuffler was applied
    struct Reverse;

    impl Shuffler for Reverse {
        fn shuffle(&mut self, words: &mut [String]) {
            words.reverse();
        }
    }

    #[test]
    fn test_keep_order_cycles_with_wraparound() {
        let vocab = vocab(&["a", "b", "c"]);

        let stream = generate_word_stream(&vocab, 7, &mut KeepOrder);

        assert_eq!(
            stream.iter().collect::<Vec<_>>(),
            vec!["a", "b", "c", "a", "b", "c", "a"]
        );
    }

    #[test]
    fn test_shuffler_is_applied_before_cycling() {
        let vocab = vocab(&["a", "b", "c"]);

        let stream = generate_word_stream(&vocab, 4, &mut Reverse);

        assert_eq!(stream.iter().collect::<Vec<_>>(), vec!["c", "b", "a", "c"]);
        // the vocabulary itself is untouched
        assert_eq!(vocab.words, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_shorter_than_vocabulary() {
        let vocab = vocab(&["a", "b", "c"]);

        let stream = generate_word_stream(&vocab, 2, &mut KeepOrder);

        assert_eq!(stream.len(), 2);
        assert_eq!(stream.word(1), "b");
    }

    #[test]
    fn test_zero_length() {
        let vocab = vocab(&["a"]);

        let stream = generate_word_stream(&vocab, 0, &mut KeepOrder);

        assert!(stream.is_empty());
    }

    #[test]
    fn test_word_past_end_is_empty() {
        let stream: WordStream = ["one", "two"].into_iter().collect();

        assert_eq!(stream.word(0), "one");
        assert_eq!(stream.word(2), "");
        assert_eq!(stream.word(usize::MAX), "");
    }

    #[test]
    fn test_random_stream_uses_every_vocabulary_word() {
        let vocab = Vocabulary::builtin(crate::vocabulary::DEFAULT_VOCABULARY).unwrap();
        let mut shuffler = RandomShuffler::thread();

        let stream = generate_word_stream(&vocab, DEFAULT_STREAM_LENGTH, &mut shuffler);

        assert_eq!(stream.len(), DEFAULT_STREAM_LENGTH);
        assert!(stream.iter().all(|w| vocab.words.iter().any(|v| v == w)));
        // a full pass over the vocabulary is a permutation of it
        let mut first_pass: Vec<&str> = stream.iter().take(vocab.len()).collect();
        let mut expected: Vec<&str> = vocab.words.iter().map(String::as_str).collect();
        first_pass.sort_unstable();
        expected.sort_unstable();
        assert_eq!(first_pass, expected);
    }

    #[test]
    fn test_seeded_streams_repeat() {
        let vocab = Vocabulary::builtin(crate::vocabulary::DEFAULT_VOCABULARY).unwrap();

        let a = generate_word_stream(&vocab, 50, &mut RandomShuffler::seeded(7));
        let b = generate_word_stream(&vocab, 50, &mut RandomShuffler::seeded(7));

        assert_eq!(a, b);
    }

    #[test]
    fn test_clones_share_storage() {
        let stream: WordStream = ["x"].into_iter().collect();
        let copy = stream.clone();

        assert!(Arc::ptr_eq(&stream.words, &copy.words));
    }
}
