use std::collections::BTreeMap;

use chrono::{DateTime, Duration, DurationRound, Utc};

/// One hour of the status timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourBucket {
    pub hour: DateTime<Utc>,
    pub label: String,
    pub counts: BTreeMap<String, u32>,
}

impl HourBucket {
    pub fn count(&self, category: &str) -> u32 {
        self.counts.get(category).copied().unwrap_or(0)
    }
}

pub fn truncate_to_hour(at: DateTime<Utc>) -> DateTime<Utc> {
    at.duration_trunc(Duration::hours(1)).unwrap_or(at)
}

pub fn hour_label(at: DateTime<Utc>) -> String {
    truncate_to_hour(at).format("%H:00").to_string()
}

/// Counts events per category into `hours` buckets ending at the hour of
/// `reference`, oldest first. Every bucket starts with a zero for every
/// category; events outside the window or with an unlisted category are
/// dropped.
pub fn bucket_by_hour<'a>(
    events: impl IntoIterator<Item = (DateTime<Utc>, &'a str)>,
    categories: &[&str],
    reference: DateTime<Utc>,
    hours: u32,
) -> Vec<HourBucket> {
    let newest = truncate_to_hour(reference);
    let hours = hours.max(1);
    let zeroes: BTreeMap<String, u32> = categories
        .iter()
        .map(|category| (category.to_string(), 0))
        .collect();

    let mut buckets: Vec<HourBucket> = (0..hours)
        .rev()
        .map(|offset| {
            let hour = newest - Duration::hours(i64::from(offset));
            HourBucket {
                hour,
                label: hour_label(hour),
                counts: zeroes.clone(),
            }
        })
        .collect();

    let oldest = newest - Duration::hours(i64::from(hours - 1));
    for (at, category) in events {
        let hour = truncate_to_hour(at);
        if hour < oldest || hour > newest {
            continue;
        }
        let index = (hour - oldest).num_hours() as usize;
        if let Some(bucket) = buckets.get_mut(index)
            && let Some(count) = bucket.counts.get_mut(category)
        {
            *count += 1;
        }
    }

    buckets
}
