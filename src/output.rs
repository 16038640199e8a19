//! Output formatting for CLI display.
//!
//! Provides the [`PrettyPrint`] trait for human-readable output
//! as an alternative to JSON serialization, and table rows for lists.

use serde_json::Value;
use tabled::Tabled;

use crate::resource::{Attribute, Resource};

/// Trait for human-readable key-value output.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

impl PrettyPrint for Resource {
    fn pretty_print(&self) -> String {
        let header = match self.id() {
            Some(id) => format!("{}: {}", self.kind(), id),
            None => self.kind().to_string(),
        };
        let divider = "─".repeat(header.chars().count().max(30));
        let width = self
            .attributes()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            + 1;

        let mut lines = vec![header, divider];
        for (name, attribute) in self.attributes() {
            if name == "id" {
                continue;
            }
            lines.push(format!("{:<width$} {}", format!("{name}:"), summarize(attribute)));
        }
        lines.join("\n")
    }
}

/// One-line rendering of an attribute.
pub fn summarize(attribute: &Attribute) -> String {
    match attribute {
        Attribute::Value(Value::String(s)) => s.clone(),
        Attribute::Value(Value::Null) => "-".to_string(),
        Attribute::Value(other) => other.to_string(),
        Attribute::Timestamp(Some(ts)) => ts.format("%Y-%m-%d %H:%M:%S %z").to_string(),
        Attribute::Timestamp(None) | Attribute::Resource(None) => "-".to_string(),
        Attribute::Resource(Some(r)) => match (r.title(), r.id()) {
            (Some(title), _) => format!("{} ({title})", r.kind()),
            (None, Some(id)) => format!("{} #{id}", r.kind()),
            (None, None) => r.kind().to_string(),
        },
        Attribute::Resources(items) => format!("{} item(s)", items.len()),
    }
}

/// Table row for a list of resources.
#[derive(Tabled)]
pub struct ResourceRow {
    pub id: String,
    pub kind: String,
    pub title: String,
}

impl From<&Resource> for ResourceRow {
    fn from(r: &Resource) -> Self {
        Self {
            id: r.id().unwrap_or_default(),
            kind: r.kind().to_string(),
            title: truncate(r.title().unwrap_or_default(), 60),
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceKind;
    use serde_json::json;

    fn topic() -> Resource {
        Resource::from_value(
            ResourceKind::Topic,
            &json!({
                "id": 7,
                "subject": "Login broken",
                "author": {"name": "Ann"},
                "created_at": "2013/05/15 15:56:42 +0000"
            }),
        )
        .unwrap()
    }

    #[test]
    fn test_pretty_print_format() {
        let output = topic().pretty_print();
        assert!(output.starts_with("Topic: 7"));
        assert!(output.contains("subject:"));
        assert!(output.contains("Login broken"));
        assert!(output.contains("Person (Ann)"));
        assert!(output.contains("2013-05-15 15:56:42 +0000"));
        assert!(output.contains("0 item(s)"));
    }

    #[test]
    fn test_row_from_resource() {
        let row = ResourceRow::from(&topic());
        assert_eq!(row.id, "7");
        assert_eq!(row.kind, "Topic");
        assert_eq!(row.title, "Login broken");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }
}
