//! Begin/complete logging around a unit of administrative work

use std::cell::Cell;
use std::time::Instant;

use super::logger::Logger;

/// Logs `{name}_BEGIN` on creation and `{name}_COMPLETE` on `complete()`.
///
/// A scope dropped without completing logs `{name}_INCOMPLETE` at WARN.
/// On the fatal path the process aborts before drop runs, so the FATAL line
/// is the last thing written for that scope.
pub struct ObservationScope<'a> {
    name: &'a str,
    started: Instant,
    completed: Cell<bool>,
}

impl<'a> ObservationScope<'a> {
    pub fn new(name: &'a str) -> Self {
        Logger::info(&format!("{}_BEGIN", name), &[]);
        Self {
            name,
            started: Instant::now(),
            completed: Cell::new(false),
        }
    }

    /// Mark the scope as completed, logging elapsed milliseconds
    pub fn complete(self) {
        self.complete_with_fields(&[]);
    }

    /// Mark the scope as completed with additional fields
    pub fn complete_with_fields(self, extra: &[(&str, &str)]) {
        self.completed.set(true);
        let elapsed = self.started.elapsed().as_millis().to_string();
        let mut fields: Vec<(&str, &str)> = vec![("elapsed_ms", elapsed.as_str())];
        fields.extend_from_slice(extra);
        Logger::info(&format!("{}_COMPLETE", self.name), &fields);
    }

    pub fn is_completed(&self) -> bool {
        self.completed.get()
    }
}

impl Drop for ObservationScope<'_> {
    fn drop(&mut self) {
        if !self.completed.get() {
            Logger::warn(
                &format!("{}_INCOMPLETE", self.name),
                &[("reason", "scope dropped without completion")],
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_marks_scope() {
        let scope = ObservationScope::new("TEST_SCOPE");
        assert!(!scope.is_completed());
        scope.complete_with_fields(&[("dictionary", "users.$name_1")]);
    }

    #[test]
    fn test_drop_without_complete_does_not_panic() {
        let scope = ObservationScope::new("TEST_DROPPED");
        drop(scope);
    }
}
