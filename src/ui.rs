use std::ops::Range;

use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Gauge, Paragraph, Widget, Wrap},
};
use typesprint::{
    runtime::TickScheduler,
    session::{Phase, TestDuration},
    view::{CharMark, Highlight, Snapshot, WordStatus, WordView},
};
use unicode_width::UnicodeWidthStr;

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;
/// Lines of words shown around the one being typed.
const VISIBLE_LINES: usize = 3;

impl<T: TickScheduler> Widget for &App<T> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let snapshot = self.test.snapshot();

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // stats
                Constraint::Length(1), // padding
                Constraint::Length(1), // progress
                Constraint::Length(1), // padding
                Constraint::Min(1),    // words or results
                Constraint::Length(1), // duration selector
                Constraint::Length(1), // legend
            ])
            .split(area);

        let stats = Paragraph::new(Span::styled(stats_line(&snapshot), bold_style))
            .alignment(Alignment::Center);
        stats.render(chunks[0], buf);

        Gauge::default()
            .gauge_style(Style::default().fg(Color::Yellow).bg(Color::DarkGray))
            .ratio(snapshot.progress)
            .label(format!("{}s", snapshot.time_left_secs))
            .render(chunks[2], buf);

        if snapshot.phase == Phase::Finished {
            let done = Paragraph::new(vec![
                Line::from(Span::styled(
                    "Test complete!",
                    Style::default().patch(bold_style).fg(Color::Yellow),
                )),
                Line::from(Span::styled(
                    format!(
                        "{} wpm   {}% acc   {} errors   {} words",
                        snapshot.wpm,
                        snapshot.accuracy,
                        snapshot.error_count,
                        snapshot.current_word_index
                    ),
                    bold_style,
                )),
            ])
            .alignment(Alignment::Center);
            done.render(chunks[4], buf);
        } else {
            let width = chunks[4].width as usize;
            let lines = visible_lines(&snapshot, width)
                .into_iter()
                .map(|range| {
                    Line::from(
                        snapshot.words[range]
                            .iter()
                            .flat_map(|word| word_spans(word, snapshot.phase))
                            .collect_vec(),
                    )
                })
                .collect_vec();

            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .render(chunks[4], buf);
        }

        Paragraph::new(Line::from(duration_spans(
            snapshot.duration,
            snapshot.phase == Phase::Running,
        )))
        .alignment(Alignment::Center)
        .render(chunks[5], buf);

        let legend = match snapshot.phase {
            Phase::Finished => "(tab) try again / (←/→) duration / (esc)ape",
            _ => "(tab) reset / (←/→) duration / (esc)ape",
        };
        Paragraph::new(Span::styled(legend, italic_style)).render(chunks[6], buf);
    }
}

fn stats_line(snapshot: &Snapshot) -> String {
    format!(
        "{} wpm   {}% acc   {}s   {} errors",
        snapshot.wpm, snapshot.accuracy, snapshot.time_left_secs, snapshot.error_count
    )
}

fn word_width(word: &WordView) -> usize {
    word.chars.iter().map(|c| c.ch).collect::<String>().width()
}

/// Greedy wrap of the word stream into lines at most `width` columns wide,
/// as ranges of word indices.
pub fn wrap_words(words: &[WordView], width: usize) -> Vec<Range<usize>> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut used = 0;

    for (idx, word) in words.iter().enumerate() {
        // every word is followed by one space
        let needed = word_width(word) + 1;
        if used > 0 && used + needed > width {
            lines.push(start..idx);
            start = idx;
            used = 0;
        }
        used += needed;
    }
    if start < words.len() {
        lines.push(start..words.len());
    }
    lines
}

/// The line before the current word's line plus the lines that follow it.
pub fn visible_lines(snapshot: &Snapshot, width: usize) -> Vec<Range<usize>> {
    let lines = wrap_words(&snapshot.words, width.max(1));
    // position in `words`, which stops growing at the end of the stream
    let current_pos = snapshot
        .words
        .iter()
        .position(|w| w.status == WordStatus::Current)
        .unwrap_or(0);
    let current = lines
        .iter()
        .position(|r| r.contains(&current_pos))
        .unwrap_or(0);

    lines
        .into_iter()
        .skip(current.saturating_sub(1))
        .take(VISIBLE_LINES)
        .collect()
}

fn word_spans(word: &WordView, phase: Phase) -> Vec<Span<'static>> {
    let base = Style::default().add_modifier(Modifier::BOLD);
    let dim = base.add_modifier(Modifier::DIM);

    let word_style = match (word.status, word.highlight) {
        (WordStatus::Current, Some(Highlight::Untouched)) if phase != Phase::Finished => {
            base.add_modifier(Modifier::UNDERLINED)
        }
        (WordStatus::Current, Some(Highlight::Matching)) => base.bg(Color::Rgb(36, 70, 40)),
        (WordStatus::Current, Some(Highlight::Mismatch)) => base.bg(Color::Rgb(80, 34, 34)),
        (WordStatus::Past, _) => dim.fg(Color::DarkGray),
        _ => dim,
    };

    let mut spans = word
        .chars
        .iter()
        .map(|c| {
            let style = match c.mark {
                CharMark::Untyped => word_style,
                CharMark::Correct => word_style.fg(Color::White).remove_modifier(Modifier::DIM),
                CharMark::Incorrect => word_style.fg(Color::Red).remove_modifier(Modifier::DIM),
                CharMark::Extra => word_style.fg(Color::LightRed).remove_modifier(Modifier::DIM),
            };
            Span::styled(c.ch.to_string(), style)
        })
        .collect_vec();

    spans.push(Span::raw(" "));
    spans
}

fn duration_spans(selected: TestDuration, locked: bool) -> Vec<Span<'static>> {
    TestDuration::ALL
        .into_iter()
        .flat_map(|d| {
            let style = if d == selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else if locked {
                Style::default().add_modifier(Modifier::DIM)
            } else {
                Style::default()
            };
            [Span::styled(format!(" {d} "), style), Span::raw(" ")]
        })
        .collect_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use typesprint::session::{SessionEvent, SessionState};
    use typesprint::view::CharView;
    use typesprint::word_source::WordStream;

    fn word(index: usize, text: &str) -> WordView {
        WordView {
            index,
            status: WordStatus::Upcoming,
            chars: text
                .chars()
                .map(|ch| CharView {
                    ch,
                    mark: CharMark::Untyped,
                })
                .collect(),
            highlight: None,
        }
    }

    #[test]
    fn test_wrap_words() {
        let words = vec![word(0, "the"), word(1, "quick"), word(2, "fox"), word(3, "a")];

        // "the quick " is 10 columns
        assert_eq!(wrap_words(&words, 10), vec![0..2, 2..4]);
        assert_eq!(wrap_words(&words, 100), vec![0..4]);
    }

    #[test]
    fn test_wrap_words_wider_than_line() {
        let words = vec![word(0, "celebration"), word(1, "a")];

        assert_eq!(wrap_words(&words, 4), vec![0..1, 1..2]);
    }

    #[test]
    fn test_wrap_no_words() {
        assert!(wrap_words(&[], 10).is_empty());
    }

    #[test]
    fn test_visible_lines_follow_typing_past_end_of_stream() {
        let now = Instant::now();
        let stream: WordStream = std::iter::repeat("aaaa").take(12).collect();
        let mut state = SessionState::new(stream, TestDuration::Sixty);
        for value in std::iter::repeat("aaaa ").take(14).chain(["zz"]) {
            state = state.reduce(SessionEvent::Input {
                value: value.to_string(),
                at: now,
            });
        }

        let snapshot = Snapshot::from_state(&state);
        assert_eq!(snapshot.current_word_index, 14);
        assert_eq!(snapshot.words.len(), 13);

        // two words per line, the typed extra word sits alone on the last one
        let lines = visible_lines(&snapshot, 10);
        assert_eq!(lines, vec![10..12, 12..13]);
        assert_eq!(snapshot.words[12].status, WordStatus::Current);
    }

    #[test]
    fn test_visible_lines_start_one_line_back() {
        let stream: WordStream = std::iter::repeat("aaaa").take(12).collect();
        let state = (0..5).fold(SessionState::new(stream, TestDuration::Sixty), |state, _| {
            state.reduce(SessionEvent::Input {
                value: "aaaa ".to_string(),
                at: Instant::now(),
            })
        });

        let lines = visible_lines(&Snapshot::from_state(&state), 10);

        assert_eq!(lines, vec![2..4, 4..6, 6..8]);
    }

    #[test]
    fn test_duration_spans_mark_selection() {
        let spans = duration_spans(TestDuration::Thirty, false);
        let labels = spans
            .iter()
            .map(|s| s.content.to_string())
            .filter(|s| !s.trim().is_empty())
            .collect_vec();

        assert_eq!(labels, vec![" 15s ", " 30s ", " 60s "]);
        assert!(spans[2].style.add_modifier.contains(Modifier::REVERSED));
        assert!(!spans[0].style.add_modifier.contains(Modifier::REVERSED));
    }
}
