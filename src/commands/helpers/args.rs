use crate::console::DEFAULT_DATABASE;
use crate::panels::TIME_RANGES_HOURS;
use crate::transform::cluster::EventFilter;
use crate::transform::queries::QueryType;

const EVENT_SEVERITIES: [&str; 5] = ["all", "info", "warning", "error", "critical"];

/// Accepts `24` or `24h`.
pub(crate) fn parse_time_range(input: &str) -> Result<u32, String> {
    let normalized = input.trim().to_lowercase();
    let number = normalized.strip_suffix('h').unwrap_or(&normalized);
    let hours = number
        .parse::<u32>()
        .ok()
        .filter(|hours| TIME_RANGES_HOURS.contains(hours));

    hours.ok_or_else(|| {
        let allowed: Vec<String> = TIME_RANGES_HOURS.iter().map(u32::to_string).collect();
        format!("Usage: /range <hours>, one of {}", allowed.join(", "))
    })
}

pub(crate) fn parse_event_filter(input: &str) -> Result<EventFilter, String> {
    let normalized = input.trim().to_lowercase();
    if !normalized.is_empty() && !EVENT_SEVERITIES.contains(&normalized.as_str()) {
        return Err(format!(
            "Usage: /filter <{}>",
            EVENT_SEVERITIES.join("|")
        ));
    }
    Ok(EventFilter::parse(&normalized))
}

pub(crate) fn parse_alert_id(input: &str) -> Result<u64, String> {
    input
        .trim()
        .parse::<u64>()
        .map_err(|_| "Usage: /dismiss <alert id>".to_string())
}

/// `<database> <sql>`; when the first word already starts a statement the
/// default database is used.
pub(crate) fn parse_query_args(input: &str) -> Result<(String, String), String> {
    let trimmed = input.trim();
    let Some((first, rest)) = trimmed.split_once(char::is_whitespace) else {
        if trimmed.is_empty() {
            return Err("Usage: /query <database> <sql>".to_string());
        }
        return Ok((DEFAULT_DATABASE.to_string(), trimmed.to_string()));
    };

    let starts_statement = QueryType::PREFIXED
        .iter()
        .any(|kind| first.eq_ignore_ascii_case(kind.as_str()));
    if starts_statement {
        return Ok((DEFAULT_DATABASE.to_string(), trimmed.to_string()));
    }
    Ok((first.to_string(), rest.trim().to_string()))
}
