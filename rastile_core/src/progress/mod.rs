//! Progress reporting for long pipeline runs.
//!
//! A [`ProgressBar`] counts processed tiles. With the `cli` feature it also draws
//! a bar on stderr; otherwise it only keeps track of the position, so libraries
//! and tests can report progress without touching the terminal.
//!
//! ```rust
//! use rastile_core::progress::get_progress_bar;
//!
//! let progress = get_progress_bar("processing tiles", 100);
//! progress.inc(10);
//! assert_eq!(progress.position(), 10);
//! progress.finish();
//! assert_eq!(progress.position(), 100);
//! ```

mod format;
mod progress_bar;

pub use progress_bar::ProgressBar;

/// Creates a progress bar for `max_value` steps.
#[must_use]
pub fn get_progress_bar(message: &str, max_value: u64) -> ProgressBar {
	ProgressBar::new(message, max_value)
}
