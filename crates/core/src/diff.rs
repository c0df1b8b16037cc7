//! Field-level change detection for audit details.
//!
//! Each entity lists its comparisons explicitly as `(label, old, new)`
//! triples; only the fields whose values differ end up in the rendered
//! detail string.

use crate::status::{ProjectStatus, TaskStatus};
use crate::types::{Date, Timestamp};

/// Values that can appear in an audit detail.
pub trait AuditValue {
    fn audit_repr(&self) -> String;
}

impl AuditValue for String {
    fn audit_repr(&self) -> String {
        self.clone()
    }
}

impl AuditValue for i32 {
    fn audit_repr(&self) -> String {
        self.to_string()
    }
}

impl AuditValue for i64 {
    fn audit_repr(&self) -> String {
        self.to_string()
    }
}

impl AuditValue for f64 {
    fn audit_repr(&self) -> String {
        self.to_string()
    }
}

impl AuditValue for Date {
    fn audit_repr(&self) -> String {
        self.format("%Y-%m-%d").to_string()
    }
}

impl AuditValue for Timestamp {
    fn audit_repr(&self) -> String {
        self.to_rfc3339()
    }
}

impl AuditValue for ProjectStatus {
    fn audit_repr(&self) -> String {
        self.name().to_string()
    }
}

impl AuditValue for TaskStatus {
    fn audit_repr(&self) -> String {
        self.name().to_string()
    }
}

impl<T: AuditValue> AuditValue for Option<T> {
    fn audit_repr(&self) -> String {
        match self {
            Some(value) => value.audit_repr(),
            None => "none".to_string(),
        }
    }
}

/// One changed field, rendered with its new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub label: &'static str,
    pub new_value: String,
}

/// Ordered set of changed fields for one update.
#[derive(Debug, Default)]
pub struct ChangeSet {
    changes: Vec<FieldChange>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `label` if `old` and `new` differ.
    pub fn compare<T>(&mut self, label: &'static str, old: &T, new: &T) -> &mut Self
    where
        T: AuditValue + PartialEq,
    {
        if old != new {
            self.changes.push(FieldChange {
                label,
                new_value: new.audit_repr(),
            });
        }
        self
    }

    /// Record `label` without exposing the new value.
    pub fn compare_redacted<T: PartialEq>(&mut self, label: &'static str, old: &T, new: &T) -> &mut Self {
        if old != new {
            self.changes.push(FieldChange {
                label,
                new_value: "[changed]".to_string(),
            });
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.changes.iter().map(|c| c.label).collect()
    }

    /// `"Changed fields: Name: x, Budget: 10"`, or `"No fields changed"`.
    pub fn render(&self) -> String {
        if self.changes.is_empty() {
            return "No fields changed".to_string();
        }
        let parts: Vec<String> = self
            .changes
            .iter()
            .map(|c| format!("{}: {}", c.label, c.new_value))
            .collect();
        format!("Changed fields: {}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_differing_fields_are_recorded() {
        let mut changes = ChangeSet::new();
        changes
            .compare("Name", &"Apollo".to_string(), &"Artemis".to_string())
            .compare("Budget", &10.0, &10.0)
            .compare("Completion", &10, &40);

        assert_eq!(changes.labels(), vec!["Name", "Completion"]);
        assert_eq!(changes.render(), "Changed fields: Name: Artemis, Completion: 40");
    }

    #[test]
    fn empty_change_set_renders_placeholder() {
        let mut changes = ChangeSet::new();
        changes.compare("Priority", &Some("high".to_string()), &Some("high".to_string()));
        assert!(changes.is_empty());
        assert_eq!(changes.render(), "No fields changed");
    }

    #[test]
    fn optional_values_render_none() {
        let mut changes = ChangeSet::new();
        changes.compare::<Option<i64>>("Manager", &Some(3), &None);
        assert_eq!(changes.render(), "Changed fields: Manager: none");
    }

    #[test]
    fn redacted_fields_hide_the_value() {
        let mut changes = ChangeSet::new();
        changes.compare_redacted("Password", &"old-hash", &"new-hash");
        assert_eq!(changes.render(), "Changed fields: Password: [changed]");
    }

    #[test]
    fn dates_and_statuses_use_readable_forms() {
        let mut changes = ChangeSet::new();
        let old = Date::from_ymd_opt(2026, 1, 1).unwrap();
        let new = Date::from_ymd_opt(2026, 2, 15).unwrap();
        changes
            .compare("Expected end", &old, &new)
            .compare("Status", &TaskStatus::Pending, &TaskStatus::Completed);
        assert_eq!(
            changes.render(),
            "Changed fields: Expected end: 2026-02-15, Status: COMPLETED"
        );
    }
}
