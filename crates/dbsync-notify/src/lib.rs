//! Notification collaborator (supplemented, SPEC_FULL.md §4.8): delivers a
//! finished run's report without owning mail transport.

mod notifier;
mod report;

pub use notifier::{NoopNotifier, Notifier, WebhookNotifier};
pub use report::{RunReport, TableReport};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_notifier_always_succeeds() {
        let mut report = RunReport::new();
        report.record_table(TableReport {
            table: "t".to_string(),
            before_schema: "CREATE TABLE `t` (...)".to_string(),
            after_schema: Some("CREATE TABLE `t` (...)".to_string()),
            statement: "ALTER TABLE `t` ...".to_string(),
            elapsed_ms: 5,
            error: None,
        });
        assert!(NoopNotifier.notify(&report).is_ok());
    }

    #[test]
    fn a_table_error_marks_the_run_as_failed() {
        let mut report = RunReport::new();
        report.record_table(TableReport {
            table: "t".to_string(),
            before_schema: String::new(),
            after_schema: None,
            statement: String::new(),
            elapsed_ms: 1,
            error: Some("boom".to_string()),
        });
        assert!(!report.succeeded);
    }
}
