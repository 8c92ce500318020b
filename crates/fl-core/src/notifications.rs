//! Transient user-facing notifications.
//!
//! A [`NotificationCenter`] is created once at process start and handed to every view
//! that reports outcomes. Each posted notification owns a single expiry timer; expiry,
//! dismissal, eviction and shutdown all funnel through one removal path guarded by the
//! state lock, so an entry is removed (and announced) exactly once.

use crate::types::{Notification, NotificationId, NotificationKind};
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

pub const DEFAULT_TTL: Duration = Duration::from_secs(5);
pub const DEFAULT_CAPACITY: usize = 50;
const EVENT_BUFFER: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalReason {
    Expired,
    Dismissed,
    Evicted,
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    Posted(Notification),
    Removed {
        id: NotificationId,
        reason: RemovalReason,
    },
}

#[derive(Clone)]
pub struct NotificationCenter {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<CenterState>,
    events: broadcast::Sender<NotificationEvent>,
    ttl: Duration,
    capacity: usize,
}

#[derive(Default)]
struct CenterState {
    active: VecDeque<Notification>,
    timers: HashMap<NotificationId, JoinHandle<()>>,
    closed: bool,
}

impl NotificationCenter {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(CenterState::default()),
                events,
                ttl,
                capacity: capacity.max(1),
            }),
        }
    }

    /// Append a notification and start its expiry timer. Must be called from within a
    /// tokio runtime.
    pub fn post(&self, kind: NotificationKind, message: impl Into<String>) -> NotificationId {
        let id = NotificationId::generate();
        let created_at = Utc::now();
        let ttl = chrono::Duration::from_std(self.inner.ttl).unwrap_or(chrono::Duration::MAX);
        let notification = Notification {
            id: id.clone(),
            kind,
            message: message.into(),
            created_at,
            expires_at: created_at.checked_add_signed(ttl).unwrap_or(created_at),
        };

        let mut state = self.inner.lock();
        if state.closed {
            tracing::debug!(%id, "notification center closed, dropping notification");
            return id;
        }
        while state.active.len() >= self.inner.capacity {
            let Some(oldest) = state.active.pop_front() else {
                break;
            };
            if let Some(timer) = state.timers.remove(&oldest.id) {
                timer.abort();
            }
            self.inner.emit(NotificationEvent::Removed {
                id: oldest.id,
                reason: RemovalReason::Evicted,
            });
        }
        state.active.push_back(notification.clone());
        let timer = spawn_expiry(Arc::downgrade(&self.inner), id.clone(), self.inner.ttl);
        state.timers.insert(id.clone(), timer);
        self.inner.emit(NotificationEvent::Posted(notification));
        id
    }

    pub fn success(&self, message: impl Into<String>) -> NotificationId {
        self.post(NotificationKind::Success, message)
    }

    pub fn error(&self, message: impl Into<String>) -> NotificationId {
        self.post(NotificationKind::Error, message)
    }

    pub fn info(&self, message: impl Into<String>) -> NotificationId {
        self.post(NotificationKind::Info, message)
    }

    /// Remove immediately. Returns false when the id is no longer active.
    pub fn dismiss(&self, id: &NotificationId) -> bool {
        self.inner.remove(id, RemovalReason::Dismissed)
    }

    /// Active notifications, oldest first.
    pub fn active(&self) -> Vec<Notification> {
        self.inner.lock().active.iter().cloned().collect()
    }

    pub fn is_active(&self, id: &NotificationId) -> bool {
        self.inner.lock().active.iter().any(|n| &n.id == id)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.inner.events.subscribe()
    }

    pub fn shutdown(&self) {
        let mut state = self.inner.lock();
        state.closed = true;
        for (_, timer) in state.timers.drain() {
            timer.abort();
        }
        let drained: Vec<Notification> = state.active.drain(..).collect();
        for notification in drained {
            self.inner.emit(NotificationEvent::Removed {
                id: notification.id,
                reason: RemovalReason::Shutdown,
            });
        }
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_CAPACITY)
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, CenterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: NotificationEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn remove(&self, id: &NotificationId, reason: RemovalReason) -> bool {
        let mut state = self.lock();
        let Some(position) = state.active.iter().position(|n| &n.id == id) else {
            return false;
        };
        state.active.remove(position);
        if let Some(timer) = state.timers.remove(id) {
            if reason != RemovalReason::Expired {
                timer.abort();
            }
        }
        self.emit(NotificationEvent::Removed {
            id: id.clone(),
            reason,
        });
        true
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        for (_, timer) in state.timers.drain() {
            timer.abort();
        }
    }
}

fn spawn_expiry(inner: Weak<Inner>, id: NotificationId, ttl: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(ttl).await;
        if let Some(inner) = inner.upgrade() {
            inner.remove(&id, RemovalReason::Expired);
        }
    })
}
