//! Change log rendering
//!
//! Every line is `<timestamp> | <summary>`, where the timestamp is RFC 3339
//! with millisecond precision. Text summaries look like:
//!
//! ```text
//! CREATED  pod default/web-0 phase=Pending ip= node=
//! UPDATED  pod default/web-0 phase:Pending->Running ip:->10.0.0.5 node:->node-a
//! DELETED  pod default/web-0
//! ```
//!
//! For the ip and node columns of an update the old value is left blank when
//! it equals the new one. The phase column is never blanked: it always shows
//! `old->new`, even when the phase did not change.
//!
//! The JSON format carries the same fields as one object per line.

use crate::classifier::significant_changes;
use crate::error::UnknownOutputFormat;
use crate::event::ChangeEvent;
use chrono::{DateTime, SecondsFormat, TimeZone};
use serde_json::json;
use std::fmt;
use std::str::FromStr;

/// Line format of the change log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `<timestamp> | <summary>`
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

impl FromStr for OutputFormat {
    type Err = UnknownOutputFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(UnknownOutputFormat(other.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Json => f.write_str("json"),
        }
    }
}

/// Renders change events and lifecycle notices into log lines.
///
/// Pure: produces strings, never writes them.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventFormatter {
    format: OutputFormat,
}

impl EventFormatter {
    /// Creates a formatter for the given output format.
    #[must_use]
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Output format in use.
    #[must_use]
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Renders one change event observed at `at`.
    pub fn event_line<Tz>(&self, event: &ChangeEvent, at: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let ts = timestamp(at);
        match self.format {
            OutputFormat::Text => format!("{ts} | {}", summary(event)),
            OutputFormat::Json => json_event(event, &ts).to_string(),
        }
    }

    /// Renders a free-form lifecycle notice observed at `at`.
    pub fn notice_line<Tz>(&self, message: &str, at: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let ts = timestamp(at);
        match self.format {
            OutputFormat::Text => format!("{ts} | {}", message.trim()),
            OutputFormat::Json => json!({ "ts": ts, "message": message.trim() }).to_string(),
        }
    }
}

/// Millisecond RFC 3339 timestamp, `Z` for UTC.
pub fn timestamp<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Single-line text summary of an event, without timestamp.
#[must_use]
pub fn summary(event: &ChangeEvent) -> String {
    let line = match event {
        ChangeEvent::Created(pod) => format!(
            "CREATED  pod {} phase={} ip={} node={}",
            pod.key, pod.phase, pod.address, pod.host
        ),
        ChangeEvent::Updated { prior, next } => format!(
            "UPDATED  pod {} phase:{}->{} ip:{}->{} node:{}->{}",
            next.key,
            prior.phase,
            next.phase,
            blank_if_equal(&prior.address, &next.address),
            next.address,
            blank_if_equal(&prior.host, &next.host),
            next.host
        ),
        ChangeEvent::Deleted(key) => format!("DELETED  pod {key}"),
    };
    line.trim().to_string()
}

fn blank_if_equal<'a>(old: &'a str, new: &str) -> &'a str {
    if old == new { "" } else { old }
}

fn json_event(event: &ChangeEvent, ts: &str) -> serde_json::Value {
    // `{"namespace": .., "name": ..}`, then the remaining fields on top
    let mut value = serde_json::to_value(event.key()).unwrap_or_else(|_| json!({}));

    let extra = match event {
        ChangeEvent::Created(pod) => json!({
            "phase": pod.phase,
            "ip": pod.address,
            "node": pod.host,
        }),
        ChangeEvent::Updated { prior, next } => {
            let changed: Vec<&str> = significant_changes(prior, next)
                .into_iter()
                .map(|f| f.as_str())
                .collect();
            json!({
                "phase": { "old": prior.phase, "new": next.phase },
                "ip": { "old": blank_if_equal(&prior.address, &next.address), "new": next.address },
                "node": { "old": blank_if_equal(&prior.host, &next.host), "new": next.host },
                "changed": changed,
            })
        }
        ChangeEvent::Deleted(_) => json!({}),
    };

    if let (Some(base), serde_json::Value::Object(fields)) = (value.as_object_mut(), extra) {
        base.insert("ts".to_string(), json!(ts));
        base.insert("event".to_string(), json!(event.verb()));
        base.extend(fields);
    }
    value
}
