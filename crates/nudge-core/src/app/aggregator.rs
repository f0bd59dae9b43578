//! TaskAggregator - orders a recipient's tasks and renders payloads.
//!
//! # Ordering
//! Dated tasks first, earliest due date first; undated tasks last. The sort
//! is stable, so ties and undated tasks keep their input order.
//!
//! # Rendering
//! - Reminder: one payload per task, body is the task content verbatim. A task
//!   with empty content yields `Err(SkipReason::EmptyContent)` in its slot.
//! - Digest: one payload, a count header followed by one bullet per task.

use std::cmp::Ordering;

use tracing::warn;

use crate::domain::{DeliveryHints, JobKind, NotificationPayload, SkipReason, Task, Urgency};

/// One composed notification, or the reason it could not be built.
pub type Draft = Result<NotificationPayload, SkipReason>;

pub const REMINDER_TITLE: &str = "🔔 Due tomorrow!";
pub const DIGEST_TITLE: &str = "📋 Today's to-dos";

pub const REMINDER_HINTS: DeliveryHints = DeliveryHints {
    urgency: Urgency::High,
    ttl_secs: 24 * 60 * 60,
};

pub const DIGEST_HINTS: DeliveryHints = DeliveryHints {
    urgency: Urgency::Normal,
    ttl_secs: 12 * 60 * 60,
};

#[derive(Debug, Clone)]
pub struct TaskAggregator {
    target_url: String,
}

impl TaskAggregator {
    pub fn new(target_url: impl Into<String>) -> Self {
        Self {
            target_url: target_url.into(),
        }
    }

    /// Drafts for one recipient. Empty input yields no draft.
    pub fn compose(&self, job: JobKind, tasks: &[Task]) -> Vec<Draft> {
        if tasks.is_empty() {
            return Vec::new();
        }
        let ordered = order_tasks(tasks);

        match job {
            JobKind::TomorrowReminder => ordered
                .into_iter()
                .map(|task| {
                    NotificationPayload::new(
                        REMINDER_TITLE,
                        task.content.clone(),
                        &self.target_url,
                    )
                    .map(|p| p.with_hints(REMINDER_HINTS))
                    .ok_or_else(|| {
                        warn!(owner_id = %task.owner_id, "task without content, no reminder");
                        SkipReason::EmptyContent
                    })
                })
                .collect(),
            JobKind::DailyDigest => {
                // the count header keeps the body non-empty
                let body = render_digest_body(&ordered);
                vec![
                    NotificationPayload::new(DIGEST_TITLE, body, &self.target_url)
                        .map(|p| p.with_hints(DIGEST_HINTS))
                        .ok_or(SkipReason::EmptyContent),
                ]
            }
        }
    }
}

/// Stable order: due date ascending, undated last.
pub fn order_tasks(tasks: &[Task]) -> Vec<&Task> {
    let mut ordered: Vec<&Task> = tasks.iter().collect();
    ordered.sort_by(|a, b| match (a.due_date, b.due_date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    ordered
}

pub fn render_digest_body(tasks: &[&Task]) -> String {
    let header = match tasks.len() {
        1 => "You have 1 task for today".to_string(),
        n => format!("You have {n} tasks for today"),
    };

    let mut lines = Vec::with_capacity(tasks.len() + 1);
    lines.push(header);
    lines.extend(tasks.iter().map(|t| format!("• {}", t.content)));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn task(content: &str, due: Option<&str>) -> Task {
        let t = Task::new("u1", content);
        match due {
            Some(d) => t.with_due_date(date(d)),
            None => t,
        }
    }

    fn contents(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.content.clone()).collect()
    }

    fn ready(drafts: Vec<Draft>) -> Vec<NotificationPayload> {
        drafts.into_iter().map(|d| d.unwrap()).collect()
    }

    #[rstest]
    #[case::earliest_first_undated_last(
        vec![("A", Some("2024-01-05")), ("B", None), ("C", Some("2024-01-03"))],
        vec!["C", "A", "B"]
    )]
    #[case::undated_keep_input_order(
        vec![("X", None), ("Y", None), ("Z", Some("2024-02-01")), ("W", None)],
        vec!["Z", "X", "Y", "W"]
    )]
    #[case::same_date_keeps_input_order(
        vec![("second", Some("2024-01-03")), ("first", Some("2024-01-03"))],
        vec!["second", "first"]
    )]
    fn ordering_law(#[case] input: Vec<(&str, Option<&str>)>, #[case] expected: Vec<&str>) {
        let tasks: Vec<Task> = input.into_iter().map(|(c, d)| task(c, d)).collect();
        assert_eq!(contents(&order_tasks(&tasks)), expected);
    }

    #[test]
    fn digest_renders_header_and_bullets_in_order() {
        let aggregator = TaskAggregator::new("/whattodo/");
        let tasks = vec![
            task("A", Some("2024-01-05")),
            task("B", None),
            task("C", Some("2024-01-03")),
        ];

        let payloads = ready(aggregator.compose(JobKind::DailyDigest, &tasks));
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].title(), DIGEST_TITLE);
        assert_eq!(payloads[0].body(), "You have 3 tasks for today\n• C\n• A\n• B");
        assert_eq!(payloads[0].target_url(), "/whattodo/");
        assert_eq!(payloads[0].hints(), DIGEST_HINTS);
    }

    #[test]
    fn digest_header_is_singular_for_one_task() {
        let t = task("only", None);
        assert_eq!(render_digest_body(&[&t]), "You have 1 task for today\n• only");
    }

    #[test]
    fn reminder_yields_one_payload_per_task_verbatim() {
        let aggregator = TaskAggregator::new("/whattodo/");
        let tasks = vec![
            task("<b>pay rent</b>", Some("2024-01-06")),
            task("call mom", Some("2024-01-06")),
        ];

        let payloads = ready(aggregator.compose(JobKind::TomorrowReminder, &tasks));
        let bodies: Vec<_> = payloads.iter().map(|p| p.body()).collect();
        assert_eq!(bodies, vec!["<b>pay rent</b>", "call mom"]);
        assert!(payloads.iter().all(|p| p.title() == REMINDER_TITLE));
        assert!(payloads.iter().all(|p| p.hints() == REMINDER_HINTS));
    }

    #[test]
    fn reminder_with_empty_content_is_a_skip_in_its_slot() {
        let aggregator = TaskAggregator::new("/");
        let tasks = vec![task("", None), task("real", None)];

        let drafts = aggregator.compose(JobKind::TomorrowReminder, &tasks);
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0], Err(SkipReason::EmptyContent));
        assert_eq!(drafts[1].as_ref().map(|p| p.body()), Ok("real"));
    }

    #[test]
    fn digest_lists_empty_content_as_a_bullet() {
        let aggregator = TaskAggregator::new("/");
        let tasks = vec![task("", None)];

        let payloads = ready(aggregator.compose(JobKind::DailyDigest, &tasks));
        assert_eq!(payloads[0].body(), "You have 1 task for today\n• ");
    }

    #[rstest]
    #[case(JobKind::TomorrowReminder)]
    #[case(JobKind::DailyDigest)]
    fn empty_input_produces_no_payload(#[case] job: JobKind) {
        let aggregator = TaskAggregator::new("/");
        assert!(aggregator.compose(job, &[]).is_empty());
    }

    #[test]
    fn compose_is_deterministic() {
        let aggregator = TaskAggregator::new("/");
        let tasks = vec![task("a", None), task("b", Some("2024-01-01")), task("c", None)];
        assert_eq!(
            aggregator.compose(JobKind::DailyDigest, &tasks),
            aggregator.compose(JobKind::DailyDigest, &tasks)
        );
    }
}
