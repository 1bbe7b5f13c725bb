//! Fixed-capacity circular buffer of tile blocks shared by producers and consumers.
//!
//! The queue owns `capacity` pre-allocated [`TileBlock`]s. A producer copies a
//! filled block into the slot at the write cursor, a consumer copies the slot at
//! the read cursor into its own scratch block. Both operations block: `push`
//! while the buffer is full, `pop_into` while it is empty.
//!
//! One slot always stays unused so that `write_pos == read_pos` unambiguously
//! means "empty": a queue of capacity `C` holds at most `C - 1` tiles.
//!
//! Independently of the buffer, the queue keeps a claim counter for runs in which
//! consumers do not know their share of the work up front. A consumer first
//! [claims](BoundedTileQueue::try_claim) a tile and only then dequeues it, so two
//! consumers never wait for the same logical tile. The counter has its own lock;
//! deciding whether work is left never waits on buffer traffic.
//!
//! [`close`](BoundedTileQueue::close) aborts a run: every blocked and every future
//! `push`/`pop_into` fails until the next [`reset`](BoundedTileQueue::reset).

use crate::{Pixel, TileBlock};
use anyhow::{Result, bail, ensure};
use parking_lot::{Condvar, Mutex};
use rastile_derive::context;

struct Buffer<T: Pixel> {
	slots: Vec<TileBlock<T>>,
	read_pos: usize,
	write_pos: usize,
	closed: bool,
}

impl<T: Pixel> Buffer<T> {
	fn len(&self) -> usize {
		let capacity = self.slots.len();
		(self.write_pos + capacity - self.read_pos) % capacity
	}

	fn is_full(&self) -> bool {
		(self.write_pos + 1) % self.slots.len() == self.read_pos
	}

	fn is_empty(&self) -> bool {
		self.write_pos == self.read_pos
	}
}

#[derive(Default)]
struct Claims {
	produced: usize,
	consumed: usize,
}

pub struct BoundedTileQueue<T: Pixel> {
	capacity: usize,
	template: TileBlock<T>,
	buffer: Mutex<Buffer<T>>,
	not_full: Condvar,
	not_empty: Condvar,
	claims: Mutex<Claims>,
}

impl<T: Pixel> BoundedTileQueue<T> {
	/// Creates a queue with `capacity` slots, each a copy of `template`.
	///
	/// The template determines the buffer size of every slot and should be allocated
	/// for the largest tile of the grid (see [`TileBlock::for_grid`]).
	#[context("Failed to create tile queue with capacity {capacity}")]
	pub fn new(capacity: usize, template: &TileBlock<T>) -> Result<Self> {
		ensure!(capacity >= 2, "capacity must be at least 2, one slot always stays free");
		Ok(Self {
			capacity,
			template: template.clone(),
			buffer: Mutex::new(Buffer {
				slots: vec![template.clone(); capacity],
				read_pos: 0,
				write_pos: 0,
				closed: false,
			}),
			not_full: Condvar::new(),
			not_empty: Condvar::new(),
			claims: Mutex::new(Claims::default()),
		})
	}

	/// Prepares the queue for a run that will produce exactly `produced_count` tiles.
	pub fn reset(&self, produced_count: usize) {
		let mut buffer = self.buffer.lock();
		buffer.read_pos = 0;
		buffer.write_pos = 0;
		buffer.closed = false;
		drop(buffer);

		let mut claims = self.claims.lock();
		claims.produced = produced_count;
		claims.consumed = 0;
		log::trace!("tile queue reset for {produced_count} tiles");
	}

	/// Copies `block` into the next free slot, waiting while the queue is full.
	///
	/// Fails only if the queue is closed before or while waiting.
	pub fn push(&self, block: &TileBlock<T>) -> Result<()> {
		let mut buffer = self.buffer.lock();
		while buffer.is_full() && !buffer.closed {
			self.not_full.wait(&mut buffer);
		}
		if buffer.closed {
			bail!("tile queue is closed, dropping {:?}", block.region());
		}

		let pos = buffer.write_pos;
		buffer.slots[pos].copy_from(block);
		buffer.write_pos = (pos + 1) % self.capacity;
		drop(buffer);

		// each push makes exactly one tile available
		self.not_empty.notify_one();
		Ok(())
	}

	/// Moves the oldest tile into `block`, waiting while the queue is empty.
	///
	/// Fails only if the queue is closed before or while waiting.
	pub fn pop_into(&self, block: &mut TileBlock<T>) -> Result<()> {
		let mut buffer = self.buffer.lock();
		while buffer.is_empty() && !buffer.closed {
			self.not_empty.wait(&mut buffer);
		}
		if buffer.closed {
			bail!("tile queue is closed");
		}

		let pos = buffer.read_pos;
		block.copy_from(&buffer.slots[pos]);
		buffer.read_pos = (pos + 1) % self.capacity;
		drop(buffer);

		self.not_full.notify_one();
		Ok(())
	}

	/// Like [`Self::pop_into`], but returns a freshly allocated block.
	pub fn pop(&self) -> Result<TileBlock<T>> {
		let mut block = self.template.clone();
		self.pop_into(&mut block)?;
		Ok(block)
	}

	/// Reserves the right to dequeue one more tile of the current run.
	///
	/// Returns `false` once every produced tile has been claimed.
	pub fn try_claim(&self) -> bool {
		let mut claims = self.claims.lock();
		if claims.consumed < claims.produced {
			claims.consumed += 1;
			true
		} else {
			false
		}
	}

	/// Aborts the run and wakes every waiting producer and consumer.
	pub fn close(&self) {
		let mut buffer = self.buffer.lock();
		if buffer.closed {
			return;
		}
		buffer.closed = true;
		drop(buffer);

		log::debug!("tile queue closed");
		self.not_full.notify_all();
		self.not_empty.notify_all();
	}

	pub fn is_closed(&self) -> bool {
		self.buffer.lock().closed
	}

	/// Number of slots.
	pub fn capacity(&self) -> usize {
		self.capacity
	}

	/// Maximum number of tiles the queue holds at once (`capacity - 1`).
	pub fn usable_capacity(&self) -> usize {
		self.capacity - 1
	}

	/// Number of tiles currently waiting to be dequeued.
	pub fn len(&self) -> usize {
		self.buffer.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.buffer.lock().is_empty()
	}

	pub fn is_full(&self) -> bool {
		self.buffer.lock().is_full()
	}

	pub fn produced_count(&self) -> usize {
		self.claims.lock().produced
	}

	pub fn consumed_count(&self) -> usize {
		self.claims.lock().consumed
	}
}
