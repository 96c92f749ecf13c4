//! Notification presenter.
//!
//! Notices stack in call order in a single container and disappear on their
//! own after [`Notifier::DEFAULT_TTL`], unless dismissed first. A sink, when
//! set, presents each notice the moment it is raised.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::Instant;

/// Presentation severity of a notice.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Danger,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Danger => "danger",
        }
    }
}

impl core::fmt::Display for Severity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
    shown_at: Instant,
}

#[derive(Debug, Default)]
struct Container {
    next_id: u64,
    notices: Vec<Notice>,
}

type Sink = Arc<dyn Fn(&Notice) + Send + Sync>;

/// Shared handle to the notice container. Clones show into the same container.
#[derive(Clone)]
pub struct Notifier {
    container: Arc<Mutex<Container>>,
    ttl: Duration,
    sink: Option<Sink>,
}

impl core::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Notifier")
            .field("container", &self.container)
            .field("ttl", &self.ttl)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(4);

    pub fn new() -> Self {
        Self::with_ttl(Self::DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            container: Arc::new(Mutex::new(Container::default())),
            ttl,
            sink: None,
        }
    }

    /// Present every notice through `sink` as soon as it is shown.
    pub fn with_sink(mut self, sink: impl Fn(&Notice) + Send + Sync + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    fn lock(&self) -> MutexGuard<'_, Container> {
        self.container
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append a notice and schedule its dismissal. Returns the notice id.
    pub fn show(&self, message: impl Into<String>, severity: Severity) -> u64 {
        let message = message.into();
        match severity {
            Severity::Info | Severity::Success => {
                tracing::info!(%severity, %message, "notification")
            }
            Severity::Warning | Severity::Danger => {
                tracing::warn!(%severity, %message, "notification")
            }
        }

        let notice = {
            let mut container = self.lock();
            container.next_id += 1;
            let notice = Notice {
                id: container.next_id,
                message,
                severity,
                shown_at: Instant::now(),
            };
            container.notices.push(notice.clone());
            notice
        };
        let id = notice.id;
        if let Some(sink) = &self.sink {
            sink(&notice);
        }

        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            let notifier = self.clone();
            runtime.spawn(async move {
                tokio::time::sleep(notifier.ttl).await;
                notifier.dismiss(id);
            });
        }
        id
    }

    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.show(message, Severity::Info)
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.show(message, Severity::Success)
    }

    pub fn warning(&self, message: impl Into<String>) -> u64 {
        self.show(message, Severity::Warning)
    }

    pub fn danger(&self, message: impl Into<String>) -> u64 {
        self.show(message, Severity::Danger)
    }

    /// Remove a notice. Returns `false` if it was already gone.
    pub fn dismiss(&self, id: u64) -> bool {
        let mut container = self.lock();
        let before = container.notices.len();
        container.notices.retain(|n| n.id != id);
        container.notices.len() != before
    }

    /// Notices still on screen, oldest first.
    pub fn active(&self) -> Vec<Notice> {
        let ttl = self.ttl;
        let mut container = self.lock();
        container.notices.retain(|n| n.shown_at.elapsed() < ttl);
        container.notices.clone()
    }

    /// Take every visible notice off the container.
    pub fn drain(&self) -> Vec<Notice> {
        let notices = self.active();
        self.lock().notices.clear();
        notices
    }
}
