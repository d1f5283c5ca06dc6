//! Operator alerts for error events.
//!
//! ERROR events from Postmate's own crates (failed publishes, store
//! failures, undeliverable replies) are forwarded to a console or webhook
//! channel. A failure that repeats on every publish run is only alerted
//! once per cooldown window.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{Event, Subscriber};
use tracing_subscriber::{Layer, layer::Context};

#[derive(Debug, Clone)]
pub struct AlertMessage {
    pub level: String,
    pub message: String,
    pub target: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub fields: Vec<(String, String)>,
}

impl AlertMessage {
    /// One-line rendering shared by every channel.
    pub fn summary(&self) -> String {
        let mut line = format!("[{}] {}: {}", self.level, self.target, self.message);
        for (key, value) in &self.fields {
            line.push_str(&format!(" {key}={value}"));
        }
        line
    }

    fn dedup_key(&self) -> (String, String) {
        (self.target.clone(), self.message.clone())
    }
}

#[derive(Debug, Clone)]
pub struct AlertConfig {
    /// Least severe level that alerts.
    pub min_level: tracing::Level,
    pub buffer_size: usize,
    /// Same target and message within this window alerts once.
    pub cooldown: Duration,
    /// Event targets that may alert.
    pub target_prefixes: Vec<String>,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            min_level: tracing::Level::ERROR,
            buffer_size: 100,
            cooldown: Duration::from_secs(15 * 60),
            target_prefixes: ["api_server", "postmate_core", "postmate_infra"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl AlertConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(minutes) = std::env::var("ALERT_COOLDOWN_MINUTES")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            config.cooldown = Duration::from_secs(minutes * 60);
        }
        config
    }

    fn accepts(&self, target: &str) -> bool {
        self.target_prefixes.iter().any(|p| target.starts_with(p.as_str()))
    }
}

#[async_trait::async_trait]
pub trait AlertSender: Send + Sync {
    async fn send(&self, alert: AlertMessage) -> Result<(), AlertError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("Failed to send alert: {0}")]
    SendError(String),
}

/// Writes alerts to stderr. Used when no webhook is configured.
pub struct ConsoleAlertSender;

#[async_trait::async_trait]
impl AlertSender for ConsoleAlertSender {
    async fn send(&self, alert: AlertMessage) -> Result<(), AlertError> {
        eprintln!("ALERT {} {}", alert.timestamp.to_rfc3339(), alert.summary());
        Ok(())
    }
}

/// Posts `{"text": ...}`, which Slack and Discord-compatible hooks accept.
pub struct WebhookAlertSender {
    url: String,
    client: reqwest::Client,
}

impl WebhookAlertSender {
    pub fn new(url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { url, client }
    }
}

#[async_trait::async_trait]
impl AlertSender for WebhookAlertSender {
    async fn send(&self, alert: AlertMessage) -> Result<(), AlertError> {
        let payload = serde_json::json!({
            "text": format!("Postmate alert at {}\n{}", alert.timestamp.to_rfc3339(), alert.summary())
        });

        self.client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AlertError::SendError(e.to_string()))?;

        Ok(())
    }
}

/// Drops alerts already sent within the cooldown.
struct Cooldown {
    window: Duration,
    last_sent: HashMap<(String, String), Instant>,
}

impl Cooldown {
    fn new(window: Duration) -> Self {
        Self {
            window,
            last_sent: HashMap::new(),
        }
    }

    fn admit(&mut self, alert: &AlertMessage, now: Instant) -> bool {
        self.last_sent
            .retain(|_, sent| now.duration_since(*sent) < self.window);
        let key = alert.dedup_key();
        if self.last_sent.contains_key(&key) {
            return false;
        }
        self.last_sent.insert(key, now);
        true
    }
}

/// Tracing layer feeding a background alert task.
pub struct AlertLayer {
    sender: mpsc::Sender<AlertMessage>,
    config: AlertConfig,
}

impl AlertLayer {
    /// Must be called inside a tokio runtime.
    pub fn new(alert_sender: Arc<dyn AlertSender>, config: &AlertConfig) -> Self {
        let (tx, mut rx) = mpsc::channel::<AlertMessage>(config.buffer_size);
        let mut cooldown = Cooldown::new(config.cooldown);

        tokio::spawn(async move {
            while let Some(alert) = rx.recv().await {
                if !cooldown.admit(&alert, Instant::now()) {
                    continue;
                }
                if let Err(e) = alert_sender.send(alert).await {
                    eprintln!("Failed to send alert: {}", e);
                }
            }
        });

        Self {
            sender: tx,
            config: config.clone(),
        }
    }

    pub fn console(config: &AlertConfig) -> Self {
        Self::new(Arc::new(ConsoleAlertSender), config)
    }

    pub fn webhook(url: String, config: &AlertConfig) -> Self {
        Self::new(Arc::new(WebhookAlertSender::new(url)), config)
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl FieldVisitor {
    fn put(&mut self, name: &str, value: String) {
        if name == "message" {
            self.message = value;
        } else {
            self.fields.push((name.to_string(), value));
        }
    }
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.put(field.name(), format!("{:?}", value));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.put(field.name(), value.to_string());
    }
}

impl<S> Layer<S> for AlertLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        // ERROR is the least verbose level, so "more severe" means smaller.
        if *metadata.level() > self.config.min_level || !self.config.accepts(metadata.target()) {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let alert = AlertMessage {
            level: metadata.level().to_string(),
            message: visitor.message,
            target: metadata.target().to_string(),
            timestamp: chrono::Utc::now(),
            fields: visitor.fields,
        };

        // Full buffer: drop rather than block the logging thread.
        let _ = self.sender.try_send(alert);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tracing_subscriber::layer::SubscriberExt;

    use super::*;

    #[derive(Default)]
    struct RecordingSender {
        alerts: Mutex<Vec<AlertMessage>>,
    }

    #[async_trait::async_trait]
    impl AlertSender for RecordingSender {
        async fn send(&self, alert: AlertMessage) -> Result<(), AlertError> {
            self.alerts.lock().unwrap().push(alert);
            Ok(())
        }
    }

    fn alert(message: &str) -> AlertMessage {
        AlertMessage {
            level: "ERROR".into(),
            message: message.into(),
            target: "postmate_core::services::publisher".into(),
            timestamp: chrono::Utc::now(),
            fields: vec![("post_id".into(), "42".into())],
        }
    }

    #[tokio::test]
    async fn test_only_errors_are_forwarded() {
        let sender = Arc::new(RecordingSender::default());
        let layer = AlertLayer::new(sender.clone(), &AlertConfig::default());
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("Session post no longer active");
            tracing::error!(post_id = "42", "Publishing failed; will retry next run");
            tracing::error!(target: "hyper::proto", "connection reset");
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        let alerts = sender.alerts.lock().unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].message, "Publishing failed; will retry next run");
        assert!(alerts[0].fields.contains(&("post_id".to_string(), "42".to_string())));
    }

    #[test]
    fn test_cooldown_suppresses_repeats() {
        let mut cooldown = Cooldown::new(Duration::from_secs(60));
        let start = Instant::now();

        assert!(cooldown.admit(&alert("Publishing failed"), start));
        assert!(!cooldown.admit(&alert("Publishing failed"), start + Duration::from_secs(30)));
        assert!(cooldown.admit(&alert("Failed to load due posts"), start + Duration::from_secs(30)));
        assert!(cooldown.admit(&alert("Publishing failed"), start + Duration::from_secs(61)));
    }

    #[test]
    fn test_summary_includes_fields() {
        assert_eq!(
            alert("Publishing failed").summary(),
            "[ERROR] postmate_core::services::publisher: Publishing failed post_id=42"
        );
    }
}
