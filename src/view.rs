//! Read-only picture of a session for whoever renders it.

use crate::session::{Phase, SessionState, TestDuration, TypedChar};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordStatus {
    Past,
    Current,
    Upcoming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharMark {
    /// Not typed yet, or part of a word that is not in progress.
    Untyped,
    Correct,
    Incorrect,
    /// Typed beyond the end of the target word.
    Extra,
}

/// How the word in progress compares to its target so far
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    Untouched,
    Matching,
    Mismatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharView {
    pub ch: char,
    pub mark: CharMark,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordView {
    pub index: usize,
    pub status: WordStatus,
    pub chars: Vec<CharView>,
    /// Only set for the current word.
    pub highlight: Option<Highlight>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub words: Vec<WordView>,
    pub current_word_index: usize,
    /// Fraction of the countdown used up, in `0.0..=1.0`.
    pub progress: f64,
    pub wpm: u32,
    pub accuracy: u32,
    pub time_left_secs: u32,
    pub error_count: u64,
    pub duration: TestDuration,
    pub phase: Phase,
}

impl Snapshot {
    pub fn from_state(state: &SessionState) -> Self {
        let current = state.current_word_index();
        let mut words: Vec<WordView> = state
            .words()
            .iter()
            .enumerate()
            .map(|(index, word)| {
                if index == current {
                    current_word_view(index, word, state.typed_chars())
                } else {
                    let status = if index < current {
                        WordStatus::Past
                    } else {
                        WordStatus::Upcoming
                    };
                    WordView {
                        index,
                        status,
                        chars: untyped(word),
                        highlight: None,
                    }
                }
            })
            .collect();

        // Past the end of the stream the target is empty; show what is typed anyway.
        if current >= state.words().len() {
            words.push(current_word_view(current, "", state.typed_chars()));
        }

        let metrics = state.metrics();
        Self {
            words,
            current_word_index: current,
            progress: progress(state.duration(), state.time_left_secs()),
            wpm: metrics.wpm,
            accuracy: metrics.accuracy,
            time_left_secs: state.time_left_secs(),
            error_count: state.error_count(),
            duration: state.duration(),
            phase: state.phase(),
        }
    }

    pub fn current_word(&self) -> Option<&WordView> {
        self.words
            .iter()
            .find(|w| w.status == WordStatus::Current)
    }
}

fn untyped(word: &str) -> Vec<CharView> {
    word.chars()
        .map(|ch| CharView {
            ch,
            mark: CharMark::Untyped,
        })
        .collect()
}

fn current_word_view(index: usize, word: &str, typed: &[TypedChar]) -> WordView {
    let target_len = word.chars().count();

    let mut chars: Vec<CharView> = word
        .chars()
        .enumerate()
        .map(|(i, ch)| {
            let mark = match typed.get(i) {
                Some(t) if t.is_correct => CharMark::Correct,
                Some(_) => CharMark::Incorrect,
                None => CharMark::Untyped,
            };
            CharView { ch, mark }
        })
        .collect();

    chars.extend(typed.iter().skip(target_len).map(|t| CharView {
        ch: t.ch,
        mark: CharMark::Extra,
    }));

    let highlight = if typed.is_empty() {
        Highlight::Untouched
    } else if typed.len() == target_len && typed.iter().all(|t| t.is_correct) {
        Highlight::Matching
    } else {
        Highlight::Mismatch
    };

    WordView {
        index,
        status: WordStatus::Current,
        chars,
        highlight: Some(highlight),
    }
}

fn progress(duration: TestDuration, time_left_secs: u32) -> f64 {
    let total = duration.secs() as f64;
    ((total - time_left_secs as f64) / total).clamp(0.0, 1.0)
}
