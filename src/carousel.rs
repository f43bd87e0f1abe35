//! Carousel state machine.
//!
//! The project page shows its slides in an auto-advancing carousel with
//! prev/next buttons, a thumbnail strip, hover-to-pause and touch swipe. The
//! browser side is a small script (`static/carousel.js`); this module is the
//! same machine in Rust. Generation uses it to decide the initial markup
//! (which slide is emphasized, whether controls exist), and the tests use it
//! to pin the behavior down without a browser.
//!
//! ## State
//!
//! - `index`: the emphasized slide, always in `[0, slide_count)` after a
//!   render pass (see [`Carousel::reconcile`]).
//! - `paused`: set while the pointer hovers the carousel.
//! - `touch_start_x`: horizontal coordinate of an in-progress touch.
//!
//! ## Autoplay timer
//!
//! Time is passed in explicitly as milliseconds so the machine is
//! deterministic. The timer exists only while the carousel is visible, has
//! more than one slide and is not paused. Changing the slide count, the
//! interval or the paused flag tears the timer down; the next
//! [`Carousel::poll`] arms a fresh one starting at that moment. Hiding the
//! carousel always drops it.

/// Default autoplay interval in milliseconds.
pub const DEFAULT_INTERVAL_MS: u64 = 7500;

/// Minimum horizontal travel for a touch to count as a swipe.
pub const SWIPE_THRESHOLD: f64 = 40.0;

/// Navigation triggered by a completed swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    /// Leftward swipe, moved to the next slide.
    Next,
    /// Rightward swipe, moved to the previous slide.
    Prev,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CarouselState {
    pub index: usize,
    pub paused: bool,
    pub touch_start_x: Option<f64>,
}

/// An armed autoplay timer. Dropping it is cancelling it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Autoplay {
    armed_at: u64,
}

#[derive(Debug, Clone)]
pub struct Carousel {
    slide_count: usize,
    interval_ms: u64,
    swipe_threshold: f64,
    state: CarouselState,
    visible: bool,
    timer: Option<Autoplay>,
}

impl Carousel {
    pub fn new(slide_count: usize, interval_ms: u64) -> Self {
        Self {
            slide_count,
            interval_ms,
            swipe_threshold: SWIPE_THRESHOLD,
            state: CarouselState::default(),
            visible: false,
            timer: None,
        }
    }

    pub fn with_swipe_threshold(mut self, threshold: f64) -> Self {
        self.swipe_threshold = threshold;
        self
    }

    pub fn state(&self) -> &CarouselState {
        &self.state
    }

    pub fn index(&self) -> usize {
        self.state.index
    }

    pub fn slide_count(&self) -> usize {
        self.slide_count
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Move to the next slide, wrapping to the first.
    pub fn advance(&mut self) {
        if self.slide_count > 0 {
            self.state.index = (self.state.index + 1) % self.slide_count;
        }
    }

    /// Move to the previous slide, wrapping to the last.
    pub fn retreat(&mut self) {
        if self.slide_count > 0 {
            self.state.index = (self.state.index + self.slide_count - 1) % self.slide_count;
        }
    }

    /// Jump straight to `index` (thumbnail click). Out-of-range jumps are ignored.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index < self.slide_count {
            self.state.index = index;
            true
        } else {
            false
        }
    }

    /// Hover in / hover out.
    pub fn set_paused(&mut self, paused: bool) {
        if self.state.paused != paused {
            self.state.paused = paused;
            self.timer = None;
        }
    }

    // ------------------------------------------------------------------
    // Touch
    // ------------------------------------------------------------------

    pub fn touch_start(&mut self, x: f64) {
        self.state.touch_start_x = Some(x);
    }

    /// Finish a touch. Travel beyond the threshold navigates; anything
    /// shorter is a tap. The start coordinate is cleared either way.
    pub fn touch_end(&mut self, x: f64) -> Option<Swipe> {
        let start = self.state.touch_start_x.take()?;
        let dx = x - start;
        if dx.abs() <= self.swipe_threshold {
            return None;
        }
        if dx < 0.0 {
            self.advance();
            Some(Swipe::Next)
        } else {
            self.retreat();
            Some(Swipe::Prev)
        }
    }

    // ------------------------------------------------------------------
    // Inputs that re-arm the timer
    // ------------------------------------------------------------------

    /// Replace the slide count (e.g. after a re-fetch). The index is left
    /// alone until the next render pass.
    pub fn set_slide_count(&mut self, slide_count: usize) {
        if self.slide_count != slide_count {
            self.slide_count = slide_count;
            self.timer = None;
        }
    }

    pub fn set_interval(&mut self, interval_ms: u64) {
        if self.interval_ms != interval_ms {
            self.interval_ms = interval_ms;
            self.timer = None;
        }
    }

    /// Render-pass bounds check: an index past the end snaps back to 0.
    /// Returns true if a correction happened.
    pub fn reconcile(&mut self) -> bool {
        if self.state.index != 0 && self.state.index >= self.slide_count {
            self.state.index = 0;
            true
        } else {
            false
        }
    }

    // ------------------------------------------------------------------
    // Autoplay
    // ------------------------------------------------------------------

    fn autoplay_allowed(&self) -> bool {
        self.visible && self.slide_count > 1 && !self.state.paused && self.interval_ms > 0
    }

    /// The carousel became visible at `now_ms`.
    pub fn show(&mut self, now_ms: u64) {
        self.visible = true;
        self.poll(now_ms);
    }

    /// The carousel is no longer displayed; the timer is cancelled.
    pub fn hide(&mut self) {
        self.visible = false;
        self.timer = None;
    }

    pub fn timer_active(&self) -> bool {
        self.timer.is_some()
    }

    /// Drive the machine to `now_ms`. Arms the timer if it should run and
    /// isn't armed, tears it down if it shouldn't run, and advances once if
    /// the armed timer has expired. Returns true when the slide advanced.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        self.reconcile();
        if !self.autoplay_allowed() {
            self.timer = None;
            return false;
        }
        match self.timer {
            None => {
                self.timer = Some(Autoplay { armed_at: now_ms });
                false
            }
            Some(Autoplay { armed_at }) if now_ms.saturating_sub(armed_at) >= self.interval_ms => {
                self.advance();
                self.timer = Some(Autoplay {
                    armed_at: armed_at + self.interval_ms,
                });
                true
            }
            Some(_) => false,
        }
    }

    // ------------------------------------------------------------------
    // Rendering contract
    // ------------------------------------------------------------------

    /// Exactly one slide is emphasized: the current one.
    pub fn is_active(&self, index: usize) -> bool {
        index == self.state.index && index < self.slide_count
    }

    /// Prev/next buttons and the thumbnail strip only exist for 2+ slides.
    pub fn shows_controls(&self) -> bool {
        self.slide_count > 1
    }
}
