//! Publishing of due posts.
//!
//! [`SchedulingOrchestrator::run_once`] is the whole unit of work; the
//! timer that calls it lives in the server. Publishing is at-least-once: if
//! the platform accepts a post but recording `Posted` fails, the post is
//! still Approved and will be published again on the next run.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tokio::sync::Mutex;

use super::messages;
use crate::domain::{Post, Trigger};
use crate::ports::{MessagingGateway, PostStore, PublishingGateway, WriteOutcome};

/// Orchestrator configuration.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Who is told about published posts. Posts carry no sender, so this
    /// is a single operator number.
    pub notify_recipient: Option<String>,
    /// Publish calls in flight at once within one run.
    pub concurrency: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            notify_recipient: None,
            concurrency: 1,
        }
    }
}

impl OrchestratorConfig {
    pub fn from_env() -> Self {
        Self {
            notify_recipient: std::env::var("NOTIFY_RECIPIENT")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            concurrency: std::env::var("PUBLISH_CONCURRENCY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1),
        }
    }
}

/// Summary of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Another run was still in progress; nothing was done.
    pub skipped: bool,
    pub due: usize,
    pub published: usize,
    pub failed: usize,
    pub conflicts: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PublishOutcome {
    Published,
    Failed,
    Conflict,
}

pub struct SchedulingOrchestrator {
    store: Arc<dyn PostStore>,
    publisher: Arc<dyn PublishingGateway>,
    messenger: Arc<dyn MessagingGateway>,
    config: OrchestratorConfig,
    running: Mutex<()>,
}

impl SchedulingOrchestrator {
    pub fn new(
        store: Arc<dyn PostStore>,
        publisher: Arc<dyn PublishingGateway>,
        messenger: Arc<dyn MessagingGateway>,
        config: OrchestratorConfig,
    ) -> Self {
        if config.notify_recipient.is_none() {
            tracing::warn!("NOTIFY_RECIPIENT not set; publish notifications are disabled");
        }
        Self {
            store,
            publisher,
            messenger,
            config,
            running: Mutex::new(()),
        }
    }

    /// Publish every post that is due now.
    pub async fn run_once(&self) -> RunReport {
        self.run_at(Utc::now()).await
    }

    /// Publish every post due at `now`. Overlapping calls return a skipped
    /// report instead of waiting, so a due post is never picked twice.
    pub async fn run_at(&self, now: DateTime<Utc>) -> RunReport {
        let Ok(_guard) = self.running.try_lock() else {
            tracing::warn!("Previous publish run still in progress; skipping");
            return RunReport {
                skipped: true,
                ..RunReport::default()
            };
        };

        let due = match self.store.find_due(now).await {
            Ok(due) => due,
            Err(err) => {
                tracing::error!(error = %err, "Failed to load due posts");
                return RunReport::default();
            }
        };

        let mut report = RunReport {
            due: due.len(),
            ..RunReport::default()
        };
        if due.is_empty() {
            tracing::debug!("No posts due for publishing");
            return report;
        }

        let outcomes: Vec<PublishOutcome> = stream::iter(due)
            .map(|post| self.publish_one(post, now))
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;

        for outcome in outcomes {
            match outcome {
                PublishOutcome::Published => report.published += 1,
                PublishOutcome::Failed => report.failed += 1,
                PublishOutcome::Conflict => report.conflicts += 1,
            }
        }

        tracing::info!(
            due = report.due,
            published = report.published,
            failed = report.failed,
            conflicts = report.conflicts,
            "Processed scheduled posts"
        );
        report
    }

    async fn publish_one(&self, post: Post, now: DateTime<Utc>) -> PublishOutcome {
        let next = match post.apply(Trigger::Publish, now) {
            Ok(next) => next,
            Err(err) => {
                tracing::warn!(post_id = %post.id, error = %err, "Post cannot be published");
                return PublishOutcome::Failed;
            }
        };

        let Some(text) = post.draft.as_deref() else {
            tracing::error!(post_id = %post.id, "Approved post has no draft to publish");
            return PublishOutcome::Failed;
        };

        if let Err(err) = self.publisher.publish(post.id, text).await {
            tracing::error!(post_id = %post.id, error = %err, "Publishing failed; will retry next run");
            return PublishOutcome::Failed;
        }

        match self.store.update_if(&next, &post.state).await {
            Ok(WriteOutcome::Applied) => {}
            Ok(WriteOutcome::Conflict) => {
                tracing::warn!(post_id = %post.id, "Post published but its status changed meanwhile");
                return PublishOutcome::Conflict;
            }
            Err(err) => {
                tracing::error!(
                    post_id = %post.id,
                    error = %err,
                    "Post published but not recorded; it may be published again"
                );
                return PublishOutcome::Failed;
            }
        }

        tracing::info!(post_id = %post.id, "Post published");
        self.notify(&next).await;
        PublishOutcome::Published
    }

    async fn notify(&self, post: &Post) {
        let Some(recipient) = self.config.notify_recipient.as_deref() else {
            return;
        };
        if let Err(err) = self
            .messenger
            .send(recipient, &messages::published(&post.topic))
            .await
        {
            tracing::error!(post_id = %post.id, error = %err, "Failed to send publish notification");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use chrono::TimeDelta;

    use super::*;
    use crate::domain::{PostStatus, PostType};
    use crate::services::testing::{MemoryStore, RecordingMessenger, RecordingPublisher};

    struct Harness {
        store: Arc<MemoryStore>,
        publisher: Arc<RecordingPublisher>,
        messenger: Arc<RecordingMessenger>,
        orchestrator: SchedulingOrchestrator,
    }

    fn harness(concurrency: usize) -> Harness {
        let store = Arc::new(MemoryStore::default());
        let publisher = Arc::new(RecordingPublisher::default());
        let messenger = Arc::new(RecordingMessenger::default());
        let orchestrator = SchedulingOrchestrator::new(
            store.clone(),
            publisher.clone(),
            messenger.clone(),
            OrchestratorConfig {
                notify_recipient: Some("operator".into()),
                concurrency,
            },
        );
        Harness {
            store,
            publisher,
            messenger,
            orchestrator,
        }
    }

    async fn approved(store: &MemoryStore, topic: &str, approved_at: DateTime<Utc>) -> Post {
        let post = Post::new_at(topic, PostType::Educational, approved_at)
            .unwrap()
            .apply(Trigger::DraftGenerated(format!("about {topic}")), approved_at)
            .unwrap()
            .apply(Trigger::Approve, approved_at)
            .unwrap();
        store.insert(post).await.unwrap()
    }

    #[tokio::test]
    async fn test_publishes_due_posts_only() {
        let h = harness(1);
        let now = Utc::now();
        let due = approved(&h.store, "due", now - TimeDelta::minutes(10)).await;
        let later = approved(&h.store, "later", now).await;

        let report = h.orchestrator.run_at(now).await;

        assert_eq!(report.due, 1);
        assert_eq!(report.published, 1);
        assert_eq!(h.publisher.published(), vec![due.id]);
        assert_eq!(h.store.get(due.id).status(), PostStatus::Posted);
        assert_eq!(h.store.get(later.id).status(), PostStatus::Approved);
        assert_eq!(
            h.messenger.sent(),
            vec![("operator".to_string(), messages::published("due"))]
        );
    }

    #[tokio::test]
    async fn test_second_run_does_not_publish_again() {
        let h = harness(1);
        let now = Utc::now();
        let post = approved(&h.store, "once", now - TimeDelta::minutes(10)).await;

        let first = h.orchestrator.run_at(now).await;
        let second = h.orchestrator.run_at(now).await;

        assert_eq!(first.published, 1);
        assert_eq!(second.due, 0);
        assert_eq!(h.publisher.published(), vec![post.id]);
        assert_eq!(h.store.updates.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_publish_is_retried_next_run() {
        let h = harness(1);
        let now = Utc::now();
        let flaky = approved(&h.store, "flaky", now - TimeDelta::minutes(20)).await;
        let fine = approved(&h.store, "fine", now - TimeDelta::minutes(10)).await;
        h.publisher.fail_for(flaky.id);

        let report = h.orchestrator.run_at(now).await;

        assert_eq!(report.failed, 1);
        assert_eq!(report.published, 1);
        assert_eq!(h.store.get(flaky.id).status(), PostStatus::Approved);
        assert_eq!(h.store.get(fine.id).status(), PostStatus::Posted);

        h.publisher.recover(flaky.id);
        let retry = h.orchestrator.run_at(now).await;

        assert_eq!(retry.published, 1);
        assert_eq!(h.store.get(flaky.id).status(), PostStatus::Posted);
    }

    #[tokio::test]
    async fn test_post_changed_during_publish_is_a_conflict() {
        let h = harness(1);
        let now = Utc::now();
        let post = approved(&h.store, "contested", now - TimeDelta::minutes(10)).await;

        // Someone else records the post as Posted while our publish call runs.
        let store = h.store.clone();
        let elsewhere = post.apply(Trigger::Publish, now).unwrap();
        h.publisher.during_next_call(move || store.force(elsewhere));
        let report = h.orchestrator.run_at(now).await;

        assert_eq!(report.due, 1);
        assert_eq!(report.conflicts, 1);
        assert_eq!(report.published, 0);
        assert_eq!(h.store.updates.load(Ordering::SeqCst), 0);
        assert!(h.messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn test_status_write_failure_leaves_post_approved() {
        let h = harness(1);
        let now = Utc::now();
        let post = approved(&h.store, "unrecorded", now - TimeDelta::minutes(10)).await;
        h.store.fail_updates.store(true, Ordering::SeqCst);

        let report = h.orchestrator.run_at(now).await;

        assert_eq!(report.failed, 1);
        assert_eq!(h.publisher.published(), vec![post.id]);
        assert_eq!(h.store.get(post.id).status(), PostStatus::Approved);
        assert!(h.messenger.sent().is_empty());
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_undo_publish() {
        let h = harness(1);
        let now = Utc::now();
        let post = approved(&h.store, "quiet", now - TimeDelta::minutes(10)).await;
        h.messenger.fail.store(true, Ordering::SeqCst);

        let report = h.orchestrator.run_at(now).await;

        assert_eq!(report.published, 1);
        assert_eq!(h.store.get(post.id).status(), PostStatus::Posted);
    }

    #[tokio::test]
    async fn test_concurrent_publishing_counts_each_post_once() {
        let h = harness(4);
        let now = Utc::now();
        for i in 0..6 {
            approved(&h.store, &format!("post {i}"), now - TimeDelta::minutes(10 + i)).await;
        }

        let report = h.orchestrator.run_at(now).await;

        assert_eq!(report.due, 6);
        assert_eq!(report.published, 6);
        assert_eq!(h.publisher.published().len(), 6);
        assert_eq!(h.store.updates.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_overlapping_run_is_skipped() {
        let h = harness(1);
        let _guard = h.orchestrator.running.lock().await;

        let report = h.orchestrator.run_at(Utc::now()).await;

        assert!(report.skipped);
        assert_eq!(report.due, 0);
    }
}
