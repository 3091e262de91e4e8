//! A lock-free single-producer/single-consumer ring buffer carrying audio
//! samples from the scheduler thread to the host audio callback thread.
//!
//! The producer never drops a sample: a full buffer is one of the model's
//! three suspension points, so `push` spins until the consumer drains
//! space rather than overwriting unread data.

use std::sync::atomic::{AtomicUsize, Ordering};

pub struct AudioRing {
    buffer: Box<[f32]>,
    capacity: usize,
    head: AtomicUsize,
    tail: AtomicUsize,
}

impl AudioRing {
    pub fn new(capacity: usize) -> Self {
        AudioRing {
            buffer: vec![0.0; capacity].into_boxed_slice(),
            capacity,
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
        }
    }

    fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        tail.wrapping_sub(head)
    }

    /// Push one sample, spinning if the buffer is momentarily full. Safe to
    /// call only from the single producer.
    pub fn push(&self, sample: f32) {
        while self.len() >= self.capacity {
            std::hint::spin_loop();
        }
        let tail = self.tail.load(Ordering::Relaxed);
        let index = tail % self.capacity;
        // SAFETY: single producer, index is exclusively owned until `tail`
        // is published below, and the consumer never reads past `head`..`tail`.
        unsafe {
            let ptr = self.buffer.as_ptr().add(index) as *mut f32;
            ptr.write(sample);
        }
        self.tail.store(tail.wrapping_add(1), Ordering::Release);
    }

    /// Pop one sample, or `None` ("no event", per the model's suspension
    /// points) if the buffer is empty. Safe to call only from the single
    /// consumer.
    pub fn pop(&self) -> Option<f32> {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);
        if head == tail {
            return None;
        }
        let index = head % self.capacity;
        let sample = self.buffer[index];
        self.head.store(head.wrapping_add(1), Ordering::Release);
        Some(sample)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
