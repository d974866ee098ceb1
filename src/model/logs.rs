use std::collections::VecDeque;

use super::Generation;

/// The visible log buffer for the selected container.
///
/// Every write carries the generation of the tail that produced it. Writes from
/// any other generation are dropped, so a superseded tail that is still running
/// can never reach the pane.
pub struct LogPane {
    pub title: String,
    lines: VecDeque<String>,
    max_lines: usize,
    generation: Generation,
    pub scroll_offset: usize, // 0 = at bottom (following)
    pub auto_follow: bool,
}

impl LogPane {
    pub fn new(max_lines: usize) -> Self {
        Self {
            title: String::new(),
            lines: VecDeque::with_capacity(max_lines.min(5000)),
            max_lines: max_lines.max(1),
            generation: Generation::default(),
            scroll_offset: 0,
            auto_follow: true,
        }
    }

    /// Clear the buffer and accept writes only from `generation` from now on.
    pub fn reset(&mut self, generation: Generation, title: impl Into<String>) {
        self.generation = generation;
        self.title = title.into();
        self.lines.clear();
        self.scroll_offset = 0;
    }

    /// Append lines from a tail. Returns false when the write was stale.
    pub fn append<I>(&mut self, generation: Generation, lines: I) -> bool
    where
        I: IntoIterator<Item = String>,
    {
        if generation != self.generation {
            return false;
        }
        for line in lines {
            if self.lines.len() >= self.max_lines {
                self.lines.pop_front();
            }
            self.lines.push_back(line);
        }
        true
    }

    pub fn lines(&self) -> impl Iterator<Item = &String> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn scroll_up(&mut self, n: usize) {
        self.auto_follow = false;
        self.scroll_offset = (self.scroll_offset + n).min(self.lines.len());
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(n);
        if self.scroll_offset == 0 {
            self.auto_follow = true;
        }
    }

    pub fn follow(&mut self) {
        self.scroll_offset = 0;
        self.auto_follow = true;
    }
}
