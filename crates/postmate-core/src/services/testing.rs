//! In-process fakes for every port, used by the service tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Post, PostState, PostStatus, PostType};
use crate::error::{GatewayError, RepoError};
use crate::ports::{
    ContentGenerator, ConversationSessions, MessagingGateway, PostStore, PublishingGateway,
    WriteOutcome,
};

/// Runs once, inside the next gateway call, to simulate work that lands
/// while the call is in flight.
type Hook = Box<dyn FnOnce() + Send>;

fn run_hook(slot: &Mutex<Option<Hook>>) {
    let hook = slot.lock().unwrap().take();
    if let Some(hook) = hook {
        hook();
    }
}

#[derive(Default)]
pub struct MemoryStore {
    posts: Mutex<Vec<Post>>,
    pub updates: AtomicUsize,
    pub fail_updates: AtomicBool,
}

impl MemoryStore {
    pub fn all(&self) -> Vec<Post> {
        self.posts.lock().unwrap().clone()
    }

    pub fn get(&self, id: Uuid) -> Post {
        self.all().into_iter().find(|p| p.id == id).unwrap()
    }

    pub fn only(&self) -> Post {
        let posts = self.all();
        assert_eq!(posts.len(), 1, "expected exactly one post");
        posts.into_iter().next().unwrap()
    }

    /// Overwrite a stored post without any stage check.
    pub fn force(&self, post: Post) {
        let mut posts = self.posts.lock().unwrap();
        if let Some(slot) = posts.iter_mut().find(|p| p.id == post.id) {
            *slot = post;
        }
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        self.posts.lock().unwrap().push(post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.all().into_iter().find(|p| p.id == id))
    }

    async fn list(&self) -> Result<Vec<Post>, RepoError> {
        let mut posts = self.all();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn find_latest_with_status(
        &self,
        statuses: &[PostStatus],
    ) -> Result<Option<Post>, RepoError> {
        Ok(self
            .all()
            .into_iter()
            .filter(|p| statuses.contains(&p.status()))
            .max_by_key(|p| p.created_at))
    }

    async fn find_due(&self, now: DateTime<Utc>) -> Result<Vec<Post>, RepoError> {
        let mut due: Vec<Post> = self.all().into_iter().filter(|p| p.is_due(now)).collect();
        due.sort_by_key(|p| p.scheduled_at());
        Ok(due)
    }

    async fn update_if(
        &self,
        post: &Post,
        expected: &PostState,
    ) -> Result<WriteOutcome, RepoError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(RepoError::Query("update failed".into()));
        }
        let mut posts = self.posts.lock().unwrap();
        let Some(slot) = posts.iter_mut().find(|p| p.id == post.id) else {
            return Err(RepoError::NotFound);
        };
        if !slot.state.same_stage(expected) {
            return Ok(WriteOutcome::Conflict);
        }
        *slot = post.clone();
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(WriteOutcome::Applied)
    }
}

#[derive(Default)]
pub struct InMemorySessions {
    map: Mutex<HashMap<String, Uuid>>,
}

#[async_trait]
impl ConversationSessions for InMemorySessions {
    async fn bind(&self, sender: &str, post_id: Uuid) -> Result<(), RepoError> {
        self.map.lock().unwrap().insert(sender.to_string(), post_id);
        Ok(())
    }

    async fn active(&self, sender: &str) -> Result<Option<Uuid>, RepoError> {
        Ok(self.map.lock().unwrap().get(sender).copied())
    }

    async fn clear(&self, sender: &str) -> Result<(), RepoError> {
        self.map.lock().unwrap().remove(sender);
        Ok(())
    }
}

/// Returns queued drafts first, then `Draft #n about <topic>`.
#[derive(Default)]
pub struct ScriptedGenerator {
    queued: Mutex<VecDeque<Result<String, GatewayError>>>,
    during_call: Mutex<Option<Hook>>,
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
}

impl ScriptedGenerator {
    pub fn failing() -> Self {
        let generator = Self::default();
        generator.fail.store(true, Ordering::SeqCst);
        generator
    }

    pub fn push(&self, result: Result<String, GatewayError>) {
        self.queued.lock().unwrap().push_back(result);
    }

    pub fn during_next_call(&self, hook: impl FnOnce() + Send + 'static) {
        *self.during_call.lock().unwrap() = Some(Box::new(hook));
    }
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    async fn generate(&self, topic: &str, _post_type: PostType) -> Result<String, GatewayError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        run_hook(&self.during_call);
        if let Some(result) = self.queued.lock().unwrap().pop_front() {
            return result;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(GatewayError::Transport("generator unavailable".into()));
        }
        Ok(format!("Draft #{n} about {topic}"))
    }
}

#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<(String, String)>>,
    pub fail: AtomicBool,
}

impl RecordingMessenger {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_body(&self) -> String {
        self.sent().last().map(|(_, body)| body.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl MessagingGateway for RecordingMessenger {
    async fn send(&self, to: &str, body: &str) -> Result<(), GatewayError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(GatewayError::Rejected {
                status: 503,
                body: "unavailable".into(),
            });
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), body.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<Uuid>>,
    failing: Mutex<HashSet<Uuid>>,
    during_call: Mutex<Option<Hook>>,
}

impl RecordingPublisher {
    pub fn published(&self) -> Vec<Uuid> {
        self.published.lock().unwrap().clone()
    }

    pub fn fail_for(&self, id: Uuid) {
        self.failing.lock().unwrap().insert(id);
    }

    pub fn recover(&self, id: Uuid) {
        self.failing.lock().unwrap().remove(&id);
    }

    pub fn during_next_call(&self, hook: impl FnOnce() + Send + 'static) {
        *self.during_call.lock().unwrap() = Some(Box::new(hook));
    }
}

#[async_trait]
impl PublishingGateway for RecordingPublisher {
    async fn publish(&self, post_id: Uuid, _text: &str) -> Result<(), GatewayError> {
        run_hook(&self.during_call);
        if self.failing.lock().unwrap().contains(&post_id) {
            return Err(GatewayError::Rejected {
                status: 500,
                body: "publish failed".into(),
            });
        }
        self.published.lock().unwrap().push(post_id);
        Ok(())
    }
}
