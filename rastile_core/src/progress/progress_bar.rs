use super::format::{format_eta, format_rate, make_bar};
use parking_lot::Mutex;
use std::{
	sync::Arc,
	time::{Duration, Instant},
};

struct Inner {
	message: String,
	len: u64,
	pos: u64,
	start: Instant,
	last_draw: Option<Instant>,
	finished: bool,
}

impl Inner {
	fn line(&self, width: usize) -> String {
		let len = self.len.max(1);
		let pos = self.pos.min(len);
		let elapsed = self.start.elapsed().as_secs_f64();
		let per_sec = if elapsed > 0.0 { pos as f64 / elapsed } else { 0.0 };
		let eta = if per_sec > 0.0 {
			(len - pos) as f64 / per_sec
		} else {
			0.0
		};
		let percent = pos * 100 / len;
		let right = format!(
			"▏{pos}/{len} ({percent:>3}%) {:>7} {:>7}",
			format_rate(per_sec),
			format_eta(Duration::from_secs_f64(eta))
		);
		let taken = self.message.chars().count() + right.chars().count() + 1;
		let bar = make_bar(pos, len, width.saturating_sub(taken).max(10));
		format!("{}▕{bar}{right}", self.message)
	}

	fn redraw(&mut self) {
		let now = Instant::now();
		if !self.finished && self.last_draw.is_some_and(|t| now - t < Duration::from_millis(200)) {
			return;
		}
		self.last_draw = Some(now);
		draw(&format!("\r\x1b[2K{}", self.line(terminal_width())));
	}
}

#[cfg(feature = "cli")]
fn draw(text: &str) {
	use std::io::Write;
	let mut stderr = std::io::stderr();
	let _ = stderr.write_all(text.as_bytes());
	let _ = stderr.flush();
}

#[cfg(not(feature = "cli"))]
fn draw(_text: &str) {}

#[cfg(feature = "cli")]
fn terminal_width() -> usize {
	terminal_size::terminal_size().map_or(80, |(width, _)| usize::from(width.0).max(20))
}

#[cfg(not(feature = "cli"))]
fn terminal_width() -> usize {
	80
}

/// A cloneable, thread-safe progress counter with an optional terminal bar.
#[derive(Clone)]
pub struct ProgressBar {
	inner: Arc<Mutex<Inner>>,
}

impl ProgressBar {
	pub fn new(message: &str, max_value: u64) -> ProgressBar {
		let progress = ProgressBar {
			inner: Arc::new(Mutex::new(Inner {
				message: message.to_string(),
				len: max_value,
				pos: 0,
				start: Instant::now(),
				last_draw: None,
				finished: false,
			})),
		};
		progress.inner.lock().redraw();
		progress
	}

	pub fn set_position(&self, value: u64) {
		let mut inner = self.inner.lock();
		inner.pos = value.min(inner.len);
		inner.redraw();
	}

	pub fn set_max_value(&self, value: u64) {
		let mut inner = self.inner.lock();
		inner.len = value;
		inner.pos = inner.pos.min(value);
		inner.redraw();
	}

	pub fn inc(&self, value: u64) {
		let mut inner = self.inner.lock();
		inner.pos = inner.pos.saturating_add(value).min(inner.len);
		inner.redraw();
	}

	pub fn position(&self) -> u64 {
		self.inner.lock().pos
	}

	pub fn max_value(&self) -> u64 {
		self.inner.lock().len
	}

	/// Jumps to the end and terminates the bar line.
	pub fn finish(&self) {
		let mut inner = self.inner.lock();
		inner.pos = inner.len;
		inner.finished = true;
		inner.redraw();
		draw("\n");
	}

	/// Clears the bar line without completing it.
	pub fn abandon(&self) {
		let mut inner = self.inner.lock();
		inner.finished = true;
		drop(inner);
		draw("\r\x1b[2K");
	}
}

impl std::fmt::Debug for ProgressBar {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let inner = self.inner.lock();
		f.debug_struct("ProgressBar")
			.field("message", &inner.message)
			.field("pos", &inner.pos)
			.field("len", &inner.len)
			.finish()
	}
}
