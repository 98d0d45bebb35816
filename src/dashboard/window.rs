use std::collections::VecDeque;

use crate::transform::format::trim_decimals;

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const SPARK_GAP: char = '·';

/// Fixed-capacity FIFO buffer feeding one chart line.
#[derive(Debug, Clone, PartialEq)]
pub struct SlidingWindow<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> SlidingWindow<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, item: T) {
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    /// Drops the current contents and keeps the newest `capacity` items of
    /// `items`.
    pub fn replace(&mut self, items: impl IntoIterator<Item = T>) {
        self.items.clear();
        for item in items {
            self.push(item);
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<T: Clone> SlidingWindow<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

/// Labels plus one value window per dataset. Every row shifts all windows
/// together, so index `i` of each dataset belongs to label `i`.
#[derive(Debug, Clone)]
pub struct ChartSeries {
    labels: SlidingWindow<String>,
    datasets: Vec<(String, SlidingWindow<Option<f64>>)>,
}

impl ChartSeries {
    pub fn new(capacity: usize, datasets: &[&str]) -> Self {
        Self {
            labels: SlidingWindow::with_capacity(capacity),
            datasets: datasets
                .iter()
                .map(|name| (name.to_string(), SlidingWindow::with_capacity(capacity)))
                .collect(),
        }
    }

    /// Appends one point per dataset; datasets missing from `values` get a gap.
    pub fn push_row(&mut self, label: impl Into<String>, values: &[(&str, Option<f64>)]) {
        self.labels.push(label.into());
        for (name, window) in &mut self.datasets {
            let value = values
                .iter()
                .find(|(candidate, _)| candidate == name)
                .and_then(|(_, value)| *value);
            window.push(value);
        }
    }

    /// Rebuilds the series from complete rows, keeping the newest ones.
    pub fn replace(&mut self, rows: Vec<(String, Vec<Option<f64>>)>) {
        self.clear();
        for (label, values) in rows {
            self.labels.push(label);
            for (index, (_, window)) in self.datasets.iter_mut().enumerate() {
                window.push(values.get(index).copied().flatten());
            }
        }
    }

    pub fn clear(&mut self) {
        self.labels.clear();
        for (_, window) in &mut self.datasets {
            window.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn capacity(&self) -> usize {
        self.labels.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> Vec<String> {
        self.labels.to_vec()
    }

    pub fn dataset(&self, name: &str) -> Option<Vec<Option<f64>>> {
        self.datasets
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, window)| window.to_vec())
    }

    pub fn latest(&self, name: &str) -> Option<f64> {
        self.datasets
            .iter()
            .find(|(candidate, _)| candidate == name)
            .and_then(|(_, window)| window.latest().copied().flatten())
    }

    /// Text form of the whole window: the label range, then one sparkline
    /// per dataset with its last, min and max reading. Empty when no row
    /// has been pushed.
    pub fn render_window(&self) -> String {
        let (Some(first), Some(last)) = (self.labels.iter().next(), self.labels.latest()) else {
            return String::new();
        };

        let mut lines = vec![format!("{first}..{last} ({} points)", self.len())];
        for (name, window) in &self.datasets {
            let values = window.to_vec();
            let present: Vec<f64> = values.iter().flatten().copied().collect();
            let Some(latest) = present.last() else {
                lines.push(format!("{name} no data"));
                continue;
            };
            let min = present.iter().copied().fold(f64::INFINITY, f64::min);
            let max = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            lines.push(format!(
                "{name} {} last={} min={} max={}",
                sparkline(&values),
                trim_decimals(*latest, 2),
                trim_decimals(min, 2),
                trim_decimals(max, 2)
            ));
        }
        lines.join("\n")
    }
}

/// One glyph per point scaled between the smallest and largest reading;
/// gaps render as a dot and a flat line sits mid-height.
fn sparkline(values: &[Option<f64>]) -> String {
    let (min, max) = values
        .iter()
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(low, high), value| {
            (low.min(*value), high.max(*value))
        });
    let span = max - min;
    let top = SPARK_LEVELS.len() - 1;

    values
        .iter()
        .map(|value| match value {
            None => SPARK_GAP,
            Some(_) if span <= f64::EPSILON => SPARK_LEVELS[top / 2],
            Some(value) => {
                let level = ((value - min) / span * top as f64).round() as usize;
                SPARK_LEVELS[level.min(top)]
            }
        })
        .collect()
}
