use serde_json::Value;

use super::Generation;

/// One point sample of the selected container's resource usage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StatsReading {
    Sample { cpu_percent: f64, memory_mb: f64 },
    /// The sample was missing keys or could not be fetched.
    Unavailable,
}

impl StatsReading {
    pub fn cpu_label(&self) -> String {
        match self {
            StatsReading::Sample { cpu_percent, .. } => format!("{:.3}%", cpu_percent),
            StatsReading::Unavailable => "N/A".to_string(),
        }
    }

    pub fn memory_label(&self) -> String {
        match self {
            StatsReading::Sample { memory_mb, .. } => format!("{:.3} MB", memory_mb),
            StatsReading::Unavailable => "N/A".to_string(),
        }
    }
}

/// Turn a raw engine stats document into a reading.
///
/// The engine's counters are cumulative; dividing total container CPU time by
/// total system CPU time already normalizes the value, so no delta against the
/// previous sample is taken.
pub fn parse_stats(raw: &Value) -> StatsReading {
    let cpu_total = raw.pointer("/cpu_stats/cpu_usage/total_usage").and_then(Value::as_f64);
    let cpu_system = raw.pointer("/cpu_stats/system_cpu_usage").and_then(Value::as_f64);
    let memory = raw.pointer("/memory_stats/usage").and_then(Value::as_f64);

    match (cpu_total, cpu_system, memory) {
        (Some(total), Some(system), Some(memory)) if system > 0.0 => StatsReading::Sample {
            cpu_percent: (total / system) * 100.0,
            memory_mb: memory / (1024.0 * 1024.0),
        },
        _ => StatsReading::Unavailable,
    }
}

/// Latest reading for the selected container, shown next to the log pane title.
#[derive(Debug)]
pub struct StatsPanel {
    generation: Generation,
    pub reading: StatsReading,
}

impl Default for StatsPanel {
    fn default() -> Self {
        Self {
            generation: Generation::default(),
            reading: StatsReading::Unavailable,
        }
    }
}

impl StatsPanel {
    pub fn reset(&mut self, generation: Generation) {
        self.generation = generation;
        self.reading = StatsReading::Unavailable;
    }

    /// Store `reading` if it belongs to the current generation.
    pub fn update(&mut self, generation: Generation, reading: StatsReading) -> bool {
        if generation != self.generation {
            return false;
        }
        self.reading = reading;
        true
    }

    pub fn summary(&self, log_lines: usize) -> String {
        format!(
            "cpu: {} | ram: {} | logs: {}",
            self.reading.cpu_label(),
            self.reading.memory_label(),
            log_lines
        )
    }
}
