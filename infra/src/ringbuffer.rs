// Copyright (c) 2025 vivo Mobile Communication Co., Ltd.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//       http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A bounded byte ringbuffer with an owned backing store.
//!
//! The buffer has no internal synchronization. Callers that share it between
//! a producer and a consumer put it behind their own lock.

use alloc::{boxed::Box, vec};

/// Bounded FIFO of bytes backed by a boxed slice
#[derive(Debug)]
pub struct RingBuffer {
    buf: Box<[u8]>,

    // start and end wrap at len*2, not at len.
    // This allows distinguishing "full" and "empty".
    // full is when start+len == end (modulo len*2)
    // empty is when start == end
    start: usize,
    end: usize,
}

impl RingBuffer {
    /// Create a new empty ring buffer holding up to `size` bytes.
    pub fn new(size: usize) -> Self {
        Self {
            buf: vec![0u8; size].into_boxed_slice(),
            start: 0,
            end: 0,
        }
    }

    /// Return length of the backing store.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Number of bytes currently stored.
    pub fn len(&self) -> usize {
        if self.end >= self.start {
            self.end - self.start
        } else {
            self.end + self.capacity() * 2 - self.start
        }
    }

    /// Number of bytes that can still be pushed.
    pub fn free(&self) -> usize {
        self.capacity() - self.len()
    }

    /// Check if buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if buffer is full.
    pub fn is_full(&self) -> bool {
        self.wrap(self.start + self.capacity()) == self.end
    }

    /// Drop all stored bytes.
    pub fn clear(&mut self) {
        self.start = 0;
        self.end = 0;
    }

    fn wrap(&self, mut n: usize) -> usize {
        let len = self.capacity();

        if n >= len * 2 {
            n -= len * 2
        }
        n
    }

    fn index(&self, n: usize) -> usize {
        let len = self.capacity();

        if n >= len {
            n - len
        } else {
            n
        }
    }

    /// Get up to two buffers where data can be pushed to.
    ///
    /// Write data starting at the beginning of the first buffer, then call
    /// `push_done` with however many bytes you've pushed.
    ///
    /// If the ringbuf is full, both buffers will be zero length.
    /// If there is only one area available, the second buffer will be zero length.
    pub fn push_slices(&mut self) -> [&mut [u8]; 2] {
        if self.is_full() {
            return [&mut [], &mut []];
        }
        let start = self.index(self.start);
        let end = self.index(self.end);

        let n0 = if start > end {
            start - end
        } else {
            self.capacity() - end
        };
        let n1 = if start <= end { start } else { 0 };

        let (head, tail) = self.buf.split_at_mut(end);
        [&mut tail[..n0], &mut head[..n1]]
    }

    /// Mark n bytes as written and advance the write index.
    pub fn push_done(&mut self, n: usize) {
        debug_assert!(n <= self.free());
        self.end = self.wrap(self.end + n);
    }

    /// Copy as much of `data` as fits. Returns the number of bytes pushed.
    pub fn push(&mut self, data: &[u8]) -> usize {
        let mut count = 0;
        for slice in self.push_slices() {
            let n = slice.len().min(data.len() - count);
            slice[..n].copy_from_slice(&data[count..count + n]);
            count += n;
        }
        self.push_done(count);
        count
    }

    /// Push one data byte.
    ///
    /// Returns true if pushed successfully.
    pub fn push_one(&mut self, val: u8) -> bool {
        self.push(&[val]) == 1
    }

    /// Get up to two slices where data can be popped from.
    ///
    /// Read data starting at the beginning of the first buffer, then call
    /// `pop_done` with however many bytes you've processed.
    ///
    /// If the ringbuf is empty, both buffers will be zero length.
    /// If there is only one area available, the second buffer will be zero length.
    pub fn pop_slices(&self) -> [&[u8]; 2] {
        if self.is_empty() {
            return [&[], &[]];
        }
        let start = self.index(self.start);
        let end = self.index(self.end);

        let n0 = if end > start {
            end - start
        } else {
            self.capacity() - start
        };
        let n1 = if end <= start { end } else { 0 };

        [&self.buf[start..start + n0], &self.buf[..n1]]
    }

    /// Mark n bytes as read and advance the read index.
    pub fn pop_done(&mut self, n: usize) {
        debug_assert!(n <= self.len());
        self.start = self.wrap(self.start + n);
    }

    /// Move up to `out.len()` bytes from the head of the buffer into `out`.
    /// Returns the number of bytes popped.
    pub fn pop(&mut self, out: &mut [u8]) -> usize {
        let mut count = 0;
        for slice in self.pop_slices() {
            let n = slice.len().min(out.len() - count);
            out[count..count + n].copy_from_slice(&slice[..n]);
            count += n;
        }
        self.pop_done(count);
        count
    }

    /// Pop one data byte.
    pub fn pop_one(&mut self) -> Option<u8> {
        let mut val = [0u8; 1];
        match self.pop(&mut val) {
            0 => None,
            _ => Some(val[0]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop() {
        let mut rb = RingBuffer::new(4);

        assert_eq!(rb.is_empty(), true);
        assert_eq!(rb.is_full(), false);

        assert_eq!(rb.push(&[1, 2, 3, 4]), 4);

        assert_eq!(rb.is_empty(), false);
        assert_eq!(rb.is_full(), true);

        // If it's full, we can push 0 bytes.
        assert_eq!(rb.push(&[5]), 0);

        let mut out = [0u8; 1];
        assert_eq!(rb.pop(&mut out), 1);
        assert_eq!(out, [1]);

        assert_eq!(rb.is_empty(), false);
        assert_eq!(rb.is_full(), false);
        assert_eq!(rb.len(), 3);

        let mut out = [0u8; 8];
        assert_eq!(rb.pop(&mut out), 3);
        assert_eq!(&out[..3], &[2, 3, 4]);

        assert_eq!(rb.is_empty(), true);
        assert_eq!(rb.pop(&mut out), 0);

        assert_eq!(rb.push(&[10]), 1);
        assert_eq!(rb.push(&[11, 12]), 2);
        assert_eq!(rb.is_full(), false);
        assert!(rb.push_one(13));
        assert_eq!(rb.is_full(), true);

        assert_eq!(rb.pop_one(), Some(10));
        assert_eq!(rb.pop_one(), Some(11));
        assert_eq!(rb.pop_one(), Some(12));
        assert_eq!(rb.pop_one(), Some(13));
        assert_eq!(rb.pop_one(), None);
    }

    #[test]
    fn zero_len() {
        let mut rb = RingBuffer::new(0);

        assert_eq!(rb.is_empty(), true);
        assert_eq!(rb.is_full(), true);

        assert_eq!(rb.push(&[1]), 0);
        let ps = rb.push_slices();
        assert_eq!(0, ps[0].len());
        assert_eq!(0, ps[1].len());

        let mut out = [0u8; 1];
        assert_eq!(rb.pop(&mut out), 0);
    }

    #[test]
    fn push_slices() {
        let mut rb = RingBuffer::new(4);

        /* push 3 -> [1 2 3 x] */
        let ps = rb.push_slices();
        assert_eq!(4, ps[0].len());
        assert_eq!(0, ps[1].len());
        ps[0][0] = 1;
        ps[0][1] = 2;
        ps[0][2] = 3;
        rb.push_done(3);

        /* pop 2 -> [x x 3 x] */
        let ps = rb.pop_slices();
        assert_eq!(ps[0], &[1, 2, 3]);
        rb.pop_done(2);

        /* push 3 -> [5 6 3 4] */
        let ps = rb.push_slices();
        assert_eq!(1, ps[0].len());
        assert_eq!(2, ps[1].len());
        ps[0][0] = 4;
        ps[1][0] = 5;
        ps[1][1] = 6;
        rb.push_done(3);

        /* buf is now full */
        let ps = rb.push_slices();
        assert_eq!(0, ps[0].len());
        assert_eq!(0, ps[1].len());

        /* data wraps around the end of the store */
        let ps = rb.pop_slices();
        assert_eq!(ps[0], &[3, 4]);
        assert_eq!(ps[1], &[5, 6]);

        /* pop 2 -> [5 6 x x] */
        rb.pop_done(2);

        /* should now have one push slice again */
        let ps = rb.push_slices();
        assert_eq!(2, ps[0].len());
        assert_eq!(0, ps[1].len());

        /* pop 2 -> [x x x x] */
        let mut out = [0u8; 2];
        assert_eq!(rb.pop(&mut out), 2);
        assert_eq!(out, [5, 6]);

        /* should now have two push slices */
        let ps = rb.push_slices();
        assert_eq!(2, ps[0].len());
        assert_eq!(2, ps[1].len());

        /* make sure we exercise all wrap around cases properly */
        for _ in 0..10 {
            let ps = rb.push_slices();
            assert_eq!(4, ps[0].len() + ps[1].len());
            rb.push_done(1);

            let ps = rb.push_slices();
            assert_eq!(3, ps[0].len() + ps[1].len());

            assert_eq!(rb.len(), 1);
            rb.pop_done(1);
        }
    }

    #[test]
    fn wrapping_push_keeps_order() {
        let mut rb = RingBuffer::new(5);
        let mut expected = 0u8;
        let mut next = 0u8;

        for round in 0..50 {
            let chunk: [u8; 3] = [next, next.wrapping_add(1), next.wrapping_add(2)];
            let pushed = rb.push(&chunk[..(round % 3) + 1]);
            next = next.wrapping_add(pushed as u8);

            let mut out = [0u8; 2];
            let popped = rb.pop(&mut out[..(round % 2) + 1]);
            for byte in &out[..popped] {
                assert_eq!(*byte, expected);
                expected = expected.wrapping_add(1);
            }
        }
        while let Some(byte) = rb.pop_one() {
            assert_eq!(byte, expected);
            expected = expected.wrapping_add(1);
        }
        assert_eq!(expected, next);
    }

    #[test]
    fn clear_resets_indices() {
        let mut rb = RingBuffer::new(4);
        rb.push(&[1, 2, 3]);
        rb.pop_done(2);
        rb.clear();

        assert!(rb.is_empty());
        assert_eq!(rb.free(), 4);
        let ps = rb.push_slices();
        assert_eq!(4, ps[0].len());
    }
}
