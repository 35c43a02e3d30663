use std::time::Instant;

/// Characters that make up one "word" for wpm purposes.
pub const CHARS_PER_WORD: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    pub wpm: u32,
    /// Percentage in `0..=100`.
    pub accuracy: u32,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            wpm: 0,
            accuracy: 100,
        }
    }
}

/// Recompute wpm and accuracy from the running counters.
///
/// Without a start time or any scored characters there is nothing to derive
/// from, so `last` is handed back unchanged.
pub fn compute_metrics(
    last: Metrics,
    correct_chars: u64,
    total_chars: u64,
    started_at: Option<Instant>,
    now: Instant,
) -> Metrics {
    let Some(started_at) = started_at else {
        return last;
    };
    if total_chars == 0 {
        return last;
    }

    let elapsed_ms = now.saturating_duration_since(started_at).as_millis() as f64;
    let elapsed_mins = elapsed_ms / 60_000.0;

    Metrics {
        wpm: wpm(correct_chars, elapsed_mins),
        accuracy: accuracy(correct_chars, total_chars),
    }
}

fn wpm(correct_chars: u64, elapsed_mins: f64) -> u32 {
    let wpm = (correct_chars as f64 / CHARS_PER_WORD) / elapsed_mins;
    if wpm.is_finite() {
        wpm.round() as u32
    } else {
        0
    }
}

fn accuracy(correct_chars: u64, total_chars: u64) -> u32 {
    let pct = (correct_chars as f64 / total_chars as f64) * 100.0;
    pct.round().clamp(0.0, 100.0) as u32
}
