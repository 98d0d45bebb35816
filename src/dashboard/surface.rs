use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// Named text slots a panel renders into. Only registered slots accept
/// writes; anything else is dropped silently, so a panel can render fields
/// its layout does not show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderSurface {
    slots: BTreeMap<&'static str, String>,
}

impl RenderSurface {
    pub fn with_slots(slots: &[&'static str]) -> Self {
        Self {
            slots: slots.iter().map(|slot| (*slot, String::new())).collect(),
        }
    }

    pub fn set(&mut self, slot: &str, value: impl Into<String>) {
        if let Some(target) = self.slots.get_mut(slot) {
            *target = value.into();
        }
    }

    pub fn get(&self, slot: &str) -> Option<&str> {
        self.slots.get(slot).map(String::as_str)
    }

    /// `slot: value` lines in slot order, skipping empty slots.
    pub fn lines(&self) -> Vec<String> {
        self.slots
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(slot, value)| format!("{slot}: {value}"))
            .collect()
    }
}

/// The last rendered state of one panel, published to readers.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub panel: &'static str,
    pub rendered_at: Option<DateTime<Utc>>,
    pub surface: RenderSurface,
}

impl Frame {
    pub fn empty(panel: &'static str, slots: &[&'static str]) -> Self {
        Self {
            panel,
            rendered_at: None,
            surface: RenderSurface::with_slots(slots),
        }
    }

    pub fn to_text(&self) -> String {
        let header = match self.rendered_at {
            Some(at) => format!("[{}] {}", self.panel, at.format("%H:%M:%S")),
            None => format!("[{}] waiting for first poll", self.panel),
        };

        let mut lines = vec![header];
        lines.extend(self.surface.lines());
        lines.join("\n")
    }
}
