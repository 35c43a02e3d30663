use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::metrics::{compute_metrics, Metrics};
use crate::word_source::WordStream;

/// The selectable countdown lengths.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    ValueEnum,
    strum_macros::Display,
    Serialize,
    Deserialize,
)]
#[serde(try_from = "u32", into = "u32")]
pub enum TestDuration {
    #[value(name = "15")]
    #[strum(to_string = "15s")]
    Fifteen,
    #[value(name = "30")]
    #[strum(to_string = "30s")]
    Thirty,
    #[default]
    #[value(name = "60")]
    #[strum(to_string = "60s")]
    Sixty,
}

impl TestDuration {
    pub const ALL: [TestDuration; 3] = [Self::Fifteen, Self::Thirty, Self::Sixty];

    pub fn secs(self) -> u32 {
        match self {
            Self::Fifteen => 15,
            Self::Thirty => 30,
            Self::Sixty => 60,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Fifteen => Self::Thirty,
            Self::Thirty => Self::Sixty,
            Self::Sixty => Self::Fifteen,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Fifteen => Self::Sixty,
            Self::Thirty => Self::Fifteen,
            Self::Sixty => Self::Thirty,
        }
    }
}

impl TryFrom<u32> for TestDuration {
    type Error = String;

    fn try_from(secs: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|d| d.secs() == secs)
            .ok_or_else(|| format!("unsupported test duration {secs}s, expected 15, 30 or 60"))
    }
}

impl From<TestDuration> for u32 {
    fn from(d: TestDuration) -> Self {
        d.secs()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the first keystroke.
    Idle,
    /// The countdown is running.
    Running,
    /// Time is up. Only a reset or a duration change leaves this phase.
    Finished,
}

/// One typed character of the word in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypedChar {
    pub ch: char,
    pub is_correct: bool,
}

/// Everything that can drive a session forward
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The full contents of the input field after a change.
    Input { value: String, at: Instant },
    /// Backspace pressed while the input field is empty.
    BackspaceOnEmpty,
    /// One second of the countdown has passed.
    Tick { at: Instant },
    SetDuration(TestDuration),
    Reset { words: WordStream },
}

/// State of one typing test.
///
/// The only way to change a session is [`SessionState::reduce`], which takes
/// the state by value and returns the next one.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    words: WordStream,
    current_word_index: usize,
    typed_chars: Vec<TypedChar>,
    raw_input: String,
    duration: TestDuration,
    default_duration: TestDuration,
    time_left_secs: u32,
    phase: Phase,
    correct_chars: u64,
    total_chars: u64,
    error_count: u64,
    started_at: Option<Instant>,
    metrics: Metrics,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(WordStream::default(), TestDuration::default())
    }
}

impl SessionState {
    /// A fresh idle session. `duration` is also what a reset returns to.
    pub fn new(words: WordStream, duration: TestDuration) -> Self {
        Self {
            words,
            current_word_index: 0,
            typed_chars: Vec::new(),
            raw_input: String::new(),
            duration,
            default_duration: duration,
            time_left_secs: duration.secs(),
            phase: Phase::Idle,
            correct_chars: 0,
            total_chars: 0,
            error_count: 0,
            started_at: None,
            metrics: Metrics::default(),
        }
    }

    pub fn reduce(mut self, event: SessionEvent) -> Self {
        match event {
            SessionEvent::Input { value, at } => self.on_input(value, at),
            SessionEvent::BackspaceOnEmpty => self.on_backspace_on_empty(),
            SessionEvent::Tick { at } => self.on_tick(at),
            SessionEvent::SetDuration(duration) => self.on_set_duration(duration),
            SessionEvent::Reset { words } => return Self::new(words, self.default_duration),
        }
        self
    }

    fn on_input(&mut self, value: String, at: Instant) {
        if self.phase == Phase::Finished {
            return;
        }

        if self.phase == Phase::Idle && !value.is_empty() {
            self.phase = Phase::Running;
            self.started_at = Some(at);
        }

        let words = self.words.clone();
        let target = words.word(self.current_word_index);

        if value.ends_with(' ') {
            self.finalize_word(value.trim(), target, at);
        } else {
            self.typed_chars = diff_word(&value, target);
            self.raw_input = value;
        }
    }

    fn finalize_word(&mut self, typed: &str, target: &str, at: Instant) {
        let (correct, scored) = score_word(typed, target);
        self.correct_chars += correct;
        self.total_chars += scored;
        if typed != target {
            self.error_count += 1;
        }

        self.current_word_index += 1;
        self.typed_chars.clear();
        self.raw_input.clear();

        self.refresh_metrics(at);
    }

    // Rewinds the display only. Counters keep whatever the word scored.
    fn on_backspace_on_empty(&mut self) {
        if self.phase == Phase::Finished
            || !self.raw_input.is_empty()
            || self.current_word_index == 0
        {
            return;
        }

        self.current_word_index -= 1;
        let words = self.words.clone();
        let previous = words.word(self.current_word_index);

        self.raw_input = format!("{previous} ");
        self.typed_chars = previous
            .chars()
            .map(|ch| TypedChar {
                ch,
                is_correct: true,
            })
            .collect();
    }

    fn on_tick(&mut self, at: Instant) {
        if self.phase != Phase::Running {
            return;
        }

        self.time_left_secs = self.time_left_secs.saturating_sub(1);
        self.refresh_metrics(at);

        if self.time_left_secs == 0 {
            self.phase = Phase::Finished;
        }
    }

    fn on_set_duration(&mut self, duration: TestDuration) {
        if self.is_active() {
            return;
        }

        self.duration = duration;
        self.time_left_secs = duration.secs();
        self.phase = Phase::Idle;
    }

    fn refresh_metrics(&mut self, now: Instant) {
        self.metrics = compute_metrics(
            self.metrics,
            self.correct_chars,
            self.total_chars,
            self.started_at,
            now,
        );
    }

    pub fn words(&self) -> &WordStream {
        &self.words
    }

    pub fn current_word_index(&self) -> usize {
        self.current_word_index
    }

    /// Target for the word in progress, empty past the end of the stream.
    pub fn current_word(&self) -> &str {
        self.words.word(self.current_word_index)
    }

    pub fn typed_chars(&self) -> &[TypedChar] {
        &self.typed_chars
    }

    pub fn raw_input(&self) -> &str {
        &self.raw_input
    }

    pub fn duration(&self) -> TestDuration {
        self.duration
    }

    pub fn default_duration(&self) -> TestDuration {
        self.default_duration
    }

    pub fn time_left_secs(&self) -> u32 {
        self.time_left_secs
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn correct_chars(&self) -> u64 {
        self.correct_chars
    }

    pub fn total_chars(&self) -> u64 {
        self.total_chars
    }

    pub fn error_count(&self) -> u64 {
        self.error_count
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics
    }
}

/// Position-by-position comparison of the input against the target word.
/// Characters past the end of the target are extras and never correct.
pub fn diff_word(input: &str, target: &str) -> Vec<TypedChar> {
    let mut expected = target.chars();
    input
        .chars()
        .map(|ch| TypedChar {
            ch,
            is_correct: expected.next() == Some(ch),
        })
        .collect()
}

/// Returns `(matching positions, positions scored)` for a finished word.
pub fn score_word(typed: &str, target: &str) -> (u64, u64) {
    let correct = typed
        .chars()
        .zip(target.chars())
        .filter(|(t, e)| t == e)
        .count();
    let scored = typed.chars().count().max(target.chars().count());
    (correct as u64, scored as u64)
}
