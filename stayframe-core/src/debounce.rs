//! Resize coalescing.
//!
//! Window resizes arrive in bursts. [`ViewportTracker`] funnels them through a
//! [`Debouncer`] so a burst produces one layout recomputation, published on a
//! `watch` channel for whoever draws the canvas.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::layout::{compute_layout, ContentLayout};

/// Default quiet period before a resize is acted on.
pub const DEFAULT_RESIZE_DEBOUNCE: Duration = Duration::from_millis(150);

/// Cancel-and-reschedule timer.
///
/// Each [`schedule`](Self::schedule) aborts the pending task, if any, and
/// starts a new one that runs after the quiet period.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    /// Create a debouncer with the given quiet period.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Quiet period.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `task` once no further call has arrived for the quiet period.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn schedule<F>(&mut self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        }));
    }

    /// Drop the pending task. Returns whether one was still waiting.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    /// Whether a task is waiting to run.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Inputs to a layout computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Container width in screen pixels.
    pub container_width: f32,
    /// Container height in screen pixels.
    pub container_height: f32,
    /// Template width.
    pub source_width: f32,
    /// Template height.
    pub source_height: f32,
    /// User zoom multiplier.
    pub ui_scale: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            container_width: 0.0,
            container_height: 0.0,
            source_width: 0.0,
            source_height: 0.0,
            ui_scale: 1.0,
        }
    }
}

impl Viewport {
    /// Compute the layout for these inputs.
    #[must_use]
    pub fn layout(&self) -> ContentLayout {
        compute_layout(
            self.container_width,
            self.container_height,
            self.source_width,
            self.source_height,
            self.ui_scale,
        )
    }
}

#[derive(Debug)]
struct Published {
    tx: watch::Sender<ContentLayout>,
    recomputations: AtomicU64,
}

impl Published {
    fn publish(&self, viewport: &Viewport) {
        let layout = viewport.layout();
        self.recomputations.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(
            "Layout recomputed: {}x{} at scale {}",
            layout.display_width,
            layout.display_height,
            layout.content_scale
        );
        self.tx.send_replace(layout);
    }
}

/// Tracks the canvas container and republishes the layout.
///
/// Resizes and zoom changes are debounced; a template change recomputes
/// immediately.
#[derive(Debug)]
pub struct ViewportTracker {
    viewport: Viewport,
    debouncer: Debouncer,
    published: Arc<Published>,
}

impl Default for ViewportTracker {
    fn default() -> Self {
        Self::new(DEFAULT_RESIZE_DEBOUNCE)
    }
}

impl ViewportTracker {
    /// Create a tracker with the given debounce window.
    #[must_use]
    pub fn new(window: Duration) -> Self {
        let (tx, _rx) = watch::channel(ContentLayout::default());
        Self {
            viewport: Viewport::default(),
            debouncer: Debouncer::new(window),
            published: Arc::new(Published {
                tx,
                recomputations: AtomicU64::new(0),
            }),
        }
    }

    /// Latest requested inputs (may not be published yet).
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Latest published layout.
    #[must_use]
    pub fn current(&self) -> ContentLayout {
        *self.published.tx.borrow()
    }

    /// Subscribe to layout changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ContentLayout> {
        self.published.tx.subscribe()
    }

    /// Number of layouts computed so far.
    #[must_use]
    pub fn recomputations(&self) -> u64 {
        self.published.recomputations.load(Ordering::Relaxed)
    }

    /// Whether a debounced recomputation is waiting.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// The container was resized.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport.container_width = width;
        self.viewport.container_height = height;
        self.reschedule();
    }

    /// The user changed the zoom.
    pub fn set_ui_scale(&mut self, ui_scale: f32) {
        self.viewport.ui_scale = ui_scale;
        self.reschedule();
    }

    /// A different template (canvas size) became active.
    pub fn set_source(&mut self, width: f32, height: f32) {
        self.viewport.source_width = width;
        self.viewport.source_height = height;
        self.flush();
    }

    /// Publish the layout for the latest inputs now, dropping any pending
    /// recomputation.
    pub fn flush(&mut self) {
        self.debouncer.cancel();
        self.published.publish(&self.viewport);
    }

    fn reschedule(&mut self) {
        let viewport = self.viewport;
        let published = Arc::clone(&self.published);
        self.debouncer.schedule(move || published.publish(&viewport));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use tokio::time::sleep;

    const WINDOW: Duration = Duration::from_millis(150);

    #[tokio::test(start_paused = true)]
    async fn test_debouncer_runs_last_task_once() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(WINDOW);
        for _ in 0..5 {
            let hits = Arc::clone(&hits);
            debouncer.schedule(move || {
                hits.fetch_add(1, Ordering::SeqCst);
            });
            sleep(Duration::from_millis(100)).await;
        }
        assert!(debouncer.is_pending());
        sleep(Duration::from_millis(100)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_task() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(WINDOW);
        let counter = Arc::clone(&hits);
        debouncer.schedule(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(debouncer.cancel());
        sleep(WINDOW * 2).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(!debouncer.cancel());
    }

    #[tokio::test(start_paused = true)]
    async fn test_resize_burst_publishes_once() {
        let mut tracker = ViewportTracker::new(WINDOW);
        tracker.set_source(800.0, 800.0);
        let baseline = tracker.recomputations();
        let mut rx = tracker.subscribe();

        for width in [500.0, 650.0, 800.0, 1000.0] {
            tracker.resize(width, 1000.0);
            sleep(Duration::from_millis(40)).await;
        }
        assert_eq!(tracker.recomputations(), baseline);
        assert!(!tracker.current().is_renderable());

        rx.changed().await.unwrap();
        assert_eq!(tracker.recomputations(), baseline + 1);
        let layout = *rx.borrow_and_update();
        assert_eq!(layout, compute_layout(1000.0, 1000.0, 800.0, 800.0, 1.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zoom_is_debounced_and_template_change_is_not() {
        let mut tracker = ViewportTracker::new(WINDOW);
        tracker.resize(1000.0, 1000.0);
        tracker.set_source(800.0, 800.0);
        // Template change flushes the pending resize immediately.
        assert!(!tracker.is_pending());
        assert!(tracker.current().is_renderable());

        tracker.set_ui_scale(0.5);
        assert!(tracker.is_pending());
        sleep(WINDOW + Duration::from_millis(10)).await;
        assert_eq!(
            tracker.current(),
            compute_layout(1000.0, 1000.0, 800.0, 800.0, 0.5)
        );
    }
}
