//! Shared failure state of one pipeline run.
//!
//! Workers never report a closed queue as an error: the queue is only closed by
//! [`RunState::fail`] or by a panicking worker, so whoever closed it already left
//! the cause behind. The first recorded error wins, later ones are logged.

use anyhow::{Error, Result, anyhow};
use parking_lot::Mutex;
use rastile_core::{BoundedTileQueue, Pixel};
use std::{
	any::Any,
	thread::{self, Scope, ScopedJoinHandle},
};

pub(crate) struct RunState<'q, T: Pixel> {
	queue: &'q BoundedTileQueue<T>,
	error: Mutex<Option<Error>>,
}

impl<'q, T: Pixel> RunState<'q, T> {
	pub fn new(queue: &'q BoundedTileQueue<T>) -> Self {
		Self {
			queue,
			error: Mutex::new(None),
		}
	}

	pub fn queue(&self) -> &'q BoundedTileQueue<T> {
		self.queue
	}

	/// Records `err` as the cause of the run's failure (unless one is already set) and wakes every waiting worker.
	pub fn fail(&self, err: Error) {
		{
			let mut slot = self.error.lock();
			if slot.is_none() {
				log::warn!("aborting run: {err:#}");
				*slot = Some(err);
			} else {
				log::debug!("ignoring follow-up error: {err:#}");
			}
		}
		self.queue.close();
	}

	pub fn into_result(self) -> Result<()> {
		match self.error.into_inner() {
			Some(err) => Err(err),
			None => Ok(()),
		}
	}

	/// Runs `work` on a named scoped thread. Errors returned by `work` fail the run.
	///
	/// Returns `None` if the thread could not be started; the run is failed in that case.
	pub fn spawn<'scope, R, F>(&'scope self, scope: &'scope Scope<'scope, '_>, name: String, work: F) -> Option<Worker<'scope, R>>
	where
		F: FnOnce() -> Result<R> + Send + 'scope,
		R: Send + 'scope,
	{
		let queue = self.queue;
		let spawned = thread::Builder::new().name(name.clone()).spawn_scoped(scope, move || {
			let _guard = CloseOnPanic(queue);
			match work() {
				Ok(value) => Some(value),
				Err(err) => {
					self.fail(err);
					None
				}
			}
		});

		match spawned {
			Ok(handle) => {
				log::trace!("started {name}");
				Some(Worker { name, handle })
			}
			Err(err) => {
				self.fail(Error::from(err).context(format!("Failed to start thread {name}")));
				None
			}
		}
	}
}

pub(crate) struct Worker<'scope, R> {
	name: String,
	handle: ScopedJoinHandle<'scope, Option<R>>,
}

impl<R> Worker<'_, R> {
	/// Waits for the thread. A panic is turned into the run's error.
	pub fn join<T: Pixel>(self, state: &RunState<'_, T>) -> Option<R> {
		match self.handle.join() {
			Ok(value) => value,
			Err(payload) => {
				state.fail(anyhow!("{} panicked: {}", self.name, panic_message(payload.as_ref())));
				None
			}
		}
	}
}

/// Closes the queue while unwinding so the other workers do not wait forever.
struct CloseOnPanic<'q, T: Pixel>(&'q BoundedTileQueue<T>);

impl<T: Pixel> Drop for CloseOnPanic<'_, T> {
	fn drop(&mut self) {
		if thread::panicking() {
			self.0.close();
		}
	}
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
	if let Some(message) = payload.downcast_ref::<&str>() {
		message
	} else if let Some(message) = payload.downcast_ref::<String>() {
		message
	} else {
		"unknown panic payload"
	}
}
