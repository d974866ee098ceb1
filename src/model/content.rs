use serde_json::Value;

use super::Generation;

/// Tabs of the content window next to the container list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContentTab {
    #[default]
    Logs,
    Attributes,
    Environment,
    Statistics,
}

impl ContentTab {
    pub const ALL: [ContentTab; 4] = [
        ContentTab::Logs,
        ContentTab::Attributes,
        ContentTab::Environment,
        ContentTab::Statistics,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ContentTab::Logs => "Logs",
            ContentTab::Attributes => "Attributes",
            ContentTab::Environment => "Environment",
            ContentTab::Statistics => "Statistics",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// One-shot content for the attributes, environment and statistics tabs.
#[derive(Debug, Default)]
pub struct DetailPane {
    pub tab: ContentTab,
    generation: Generation,
    pub lines: Vec<String>,
    pub loading: bool,
}

impl DetailPane {
    /// Switch to `tab` for `generation`, dropping whatever was shown before.
    pub fn begin(&mut self, tab: ContentTab, generation: Generation) {
        self.tab = tab;
        self.generation = generation;
        self.lines.clear();
        self.loading = tab != ContentTab::Logs;
    }

    /// Fill the pane if the result still matches the visible tab and generation.
    pub fn fill(&mut self, tab: ContentTab, generation: Generation, lines: Vec<String>) -> bool {
        if tab != self.tab || generation != self.generation {
            return false;
        }
        self.lines = lines;
        self.loading = false;
        true
    }
}

/// Pretty-printed JSON, one display line per output line.
pub fn json_lines(value: &Value) -> Vec<String> {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|_| value.to_string())
        .lines()
        .map(str::to_string)
        .collect()
}

/// `KEY: value` lines from an inspect document's `Config.Env`.
pub fn environment_lines(inspect: &Value) -> Vec<String> {
    let Some(env) = inspect.pointer("/Config/Env").and_then(Value::as_array) else {
        return Vec::new();
    };
    env.iter()
        .filter_map(Value::as_str)
        .map(|entry| match entry.split_once('=') {
            Some((key, value)) => format!("{}: {}", key, value),
            None => format!("{}: ", entry),
        })
        .collect()
}
