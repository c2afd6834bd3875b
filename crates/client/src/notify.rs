//! Process-wide, single-slot notification channel.
//!
//! Any component may `show` a message; exactly one renderer reads it. A new
//! message overwrites the previous one (no queue) and cancels its auto-hide
//! timer, so a superseded timer can never hide its successor.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Info,
    Warning,
}

impl core::fmt::Display for Severity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
            Self::Warning => "warning",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub visible: bool,
    pub raised_at: DateTime<Utc>,
    /// Increases with every `show`; identifies which message a timer belongs to.
    pub seq: u64,
}

impl Notification {
    fn blank() -> Self {
        Self {
            message: String::new(),
            severity: Severity::Info,
            visible: false,
            raised_at: Utc::now(),
            seq: 0,
        }
    }
}

#[derive(Debug)]
struct Slot {
    seq: u64,
    timer: Option<JoinHandle<()>>,
}

#[derive(Debug)]
pub struct Notifier {
    tx: Arc<watch::Sender<Notification>>,
    timeout: Duration,
    slot: Mutex<Slot>,
    renderer_attached: AtomicBool,
}

impl Notifier {
    pub fn new(timeout: Duration) -> Self {
        let (tx, _rx) = watch::channel(Notification::blank());
        Self {
            tx: Arc::new(tx),
            timeout,
            slot: Mutex::new(Slot { seq: 0, timer: None }),
            renderer_attached: AtomicBool::new(false),
        }
    }

    /// Overwrite the current notification and make it visible.
    ///
    /// The auto-hide timer only runs inside a tokio runtime; outside one the
    /// message stays until hidden or superseded.
    pub fn show(&self, message: impl Into<String>, severity: Severity) -> u64 {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.seq += 1;
        let seq = slot.seq;

        if let Some(previous) = slot.timer.take() {
            previous.abort();
        }

        let message = message.into();
        tracing::debug!(%severity, seq, message = %message, "notification");
        self.tx.send_replace(Notification {
            message,
            severity,
            visible: true,
            raised_at: Utc::now(),
            seq,
        });

        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            let tx = self.tx.clone();
            let timeout = self.timeout;
            slot.timer = Some(runtime.spawn(async move {
                tokio::time::sleep(timeout).await;
                tx.send_if_modified(|current| hide_if(current, seq));
            }));
        }

        seq
    }

    /// Mark the current notification invisible; its content is kept.
    pub fn hide(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(timer) = slot.timer.take() {
            timer.abort();
        }
        let seq = slot.seq;
        self.tx.send_if_modified(|current| hide_if(current, seq));
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.show(message, Severity::Success)
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.show(message, Severity::Error)
    }

    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.show(message, Severity::Info)
    }

    pub fn warning(&self, message: impl Into<String>) -> u64 {
        self.show(message, Severity::Warning)
    }

    pub fn current(&self) -> Notification {
        self.tx.borrow().clone()
    }

    /// Observe every change (tests, diagnostics).
    pub fn subscribe(&self) -> watch::Receiver<Notification> {
        self.tx.subscribe()
    }

    /// The receiver for the one renderer. Later calls get `None`.
    pub fn attach_renderer(&self) -> Option<watch::Receiver<Notification>> {
        if self.renderer_attached.swap(true, Ordering::SeqCst) {
            tracing::warn!("notification renderer already attached");
            return None;
        }
        Some(self.tx.subscribe())
    }
}

fn hide_if(current: &mut Notification, seq: u64) -> bool {
    if current.seq == seq && current.visible {
        current.visible = false;
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_millis(6000);

    #[tokio::test(start_paused = true)]
    async fn auto_hides_after_the_timeout() {
        let notifier = Notifier::new(TIMEOUT);
        notifier.success("Rule created successfully");
        assert!(notifier.current().visible);

        tokio::time::sleep(Duration::from_millis(5999)).await;
        assert!(notifier.current().visible);

        tokio::time::sleep(Duration::from_millis(2)).await;
        let current = notifier.current();
        assert!(!current.visible);
        assert_eq!(current.message, "Rule created successfully");
    }

    #[tokio::test(start_paused = true)]
    async fn a_superseded_timer_does_not_hide_the_successor() {
        let notifier = Notifier::new(TIMEOUT);
        notifier.info("first");
        tokio::time::sleep(Duration::from_millis(4000)).await;
        notifier.error("second");

        // Past the first message's deadline.
        tokio::time::sleep(Duration::from_millis(3000)).await;
        let current = notifier.current();
        assert!(current.visible);
        assert_eq!(current.message, "second");
        assert_eq!(current.severity, Severity::Error);

        tokio::time::sleep(Duration::from_millis(3100)).await;
        assert!(!notifier.current().visible);
    }

    #[tokio::test(start_paused = true)]
    async fn two_quick_shows_leave_only_the_second_visible() {
        let notifier = Notifier::new(TIMEOUT);
        let mut rx = notifier.subscribe();
        notifier.warning("one");
        notifier.success("two");

        rx.changed().await.unwrap();
        let seen = rx.borrow_and_update().clone();
        assert_eq!(seen.message, "two");
        assert!(seen.visible);
        assert_eq!(seen.seq, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn hide_keeps_content() {
        let notifier = Notifier::new(TIMEOUT);
        notifier.info("No record found");
        notifier.hide();
        let current = notifier.current();
        assert!(!current.visible);
        assert_eq!(current.message, "No record found");
    }

    #[test]
    fn only_one_renderer_may_attach() {
        let notifier = Notifier::new(TIMEOUT);
        assert!(notifier.attach_renderer().is_some());
        assert!(notifier.attach_renderer().is_none());
    }

    #[test]
    fn show_works_without_a_runtime() {
        let notifier = Notifier::new(TIMEOUT);
        notifier.error("Error fetching rules");
        assert!(notifier.current().visible);
    }
}
