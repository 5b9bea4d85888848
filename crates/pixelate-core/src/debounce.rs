//! Caller-owned debouncing for continuous inputs such as sliders.
//!
//! Each render is a full-image recomputation, so hosts that forward every
//! slider event should coalesce them first. The engine stays synchronous;
//! the host owns a [`Debouncer`], feeds it timestamps and renders when
//! [`Debouncer::poll`] fires.

use std::time::{Duration, Instant};

use crate::settings::Settings;

/// Delay applied to block size, brightness and contrast slider input.
pub const SLIDER_DEBOUNCE: Duration = Duration::from_millis(50);

/// A single cancellable deadline. Scheduling again pushes the deadline out.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(SLIDER_DEBOUNCE)
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm (or re-arm) the deadline at `now + delay`.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Drop any pending deadline.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns `true` exactly once when the pending deadline has passed.
    ///
    /// ```
    /// use std::time::{Duration, Instant};
    ///
    /// use pixelate_core::Debouncer;
    ///
    /// let start = Instant::now();
    /// let mut debouncer = Debouncer::new(Duration::from_millis(50));
    /// debouncer.schedule(start);
    /// assert!(!debouncer.poll(start + Duration::from_millis(10)));
    /// assert!(debouncer.poll(start + Duration::from_millis(50)));
    /// assert!(!debouncer.poll(start + Duration::from_millis(60)));
    /// ```
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Slider values waiting for input to settle. Fields that were never
/// queued stay `None` and leave the current settings alone.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SliderUpdate {
    pub block_size: Option<i64>,
    pub brightness: Option<f64>,
    pub contrast: Option<f64>,
}

impl SliderUpdate {
    pub fn is_empty(&self) -> bool {
        self.block_size.is_none() && self.brightness.is_none() && self.contrast.is_none()
    }

    /// Write the queued values into `settings` through the coercing setters.
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(size) = self.block_size {
            settings.set_block_size(size);
        }
        if let Some(brightness) = self.brightness {
            settings.set_brightness(brightness);
        }
        if let Some(contrast) = self.contrast {
            settings.set_contrast(contrast);
        }
    }
}

/// Debounced block size, brightness and contrast input.
///
/// Only the queued fields are held, so palette or grid changes made in the
/// meantime survive the flush. Setting a slider directly should call the
/// matching `discard_*` so a stale queued value does not land on top.
#[derive(Debug, Clone, Default)]
pub struct SliderQueue {
    debouncer: Debouncer,
    pending: SliderUpdate,
}

impl SliderQueue {
    pub fn new(delay: Duration) -> Self {
        Self {
            debouncer: Debouncer::new(delay),
            pending: SliderUpdate::default(),
        }
    }

    pub fn queue_block_size(&mut self, size: i64, now: Instant) {
        self.pending.block_size = Some(size);
        self.debouncer.schedule(now);
    }

    pub fn queue_brightness(&mut self, brightness: f64, now: Instant) {
        self.pending.brightness = Some(brightness);
        self.debouncer.schedule(now);
    }

    pub fn queue_contrast(&mut self, contrast: f64, now: Instant) {
        self.pending.contrast = Some(contrast);
        self.debouncer.schedule(now);
    }

    pub fn discard_block_size(&mut self) {
        self.pending.block_size = None;
        self.cancel_if_empty();
    }

    pub fn discard_brightness(&mut self) {
        self.pending.brightness = None;
        self.cancel_if_empty();
    }

    pub fn discard_contrast(&mut self) {
        self.pending.contrast = None;
        self.cancel_if_empty();
    }

    /// Drop everything queued.
    pub fn clear(&mut self) {
        self.pending = SliderUpdate::default();
        self.debouncer.cancel();
    }

    pub fn pending(&self) -> &SliderUpdate {
        &self.pending
    }

    /// Take the queued values once input has been quiet for the delay.
    pub fn poll(&mut self, now: Instant) -> Option<SliderUpdate> {
        if !self.debouncer.poll(now) {
            return None;
        }
        let update = std::mem::take(&mut self.pending);
        (!update.is_empty()).then_some(update)
    }

    fn cancel_if_empty(&mut self) {
        if self.pending.is_empty() {
            self.debouncer.cancel();
        }
    }
}
