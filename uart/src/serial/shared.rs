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

//! State shared by the caller and the notifier of one port.

use super::{
    config::{ConfigMask, SerialConfig},
    error::SerialError,
    notifier::Notifier,
    ops::TransferMethod,
};
use blue_infra::ringbuffer::RingBuffer;
use delegate::delegate;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortState {
    Closed,
    Configured,
    Open,
}

/// Counters kept over the whole lifetime of a port.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PortStats {
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    /// Bytes a polling read fetched but could not store.
    pub rx_dropped: u64,
    pub rx_high_water: usize,
    pub notifier_faults: u64,
    /// Completed open/close cycles.
    pub sessions: u64,
}

#[derive(Debug)]
pub(crate) struct RxFifo {
    rb: RingBuffer,
}

impl RxFifo {
    pub fn new(size: usize) -> Self {
        Self {
            rb: RingBuffer::new(size),
        }
    }

    delegate! {
        to self.rb {
            pub fn len(&self) -> usize;
            pub fn free(&self) -> usize;
            pub fn is_empty(&self) -> bool;
            pub fn is_full(&self) -> bool;
            pub fn clear(&mut self);
            pub fn push(&mut self, data: &[u8]) -> usize;
            pub fn pop(&mut self, out: &mut [u8]) -> usize;
        }
    }
}

#[derive(Debug)]
pub(crate) struct PortInner {
    pub state: PortState,
    pub config: SerialConfig,
    pub configured: ConfigMask,
    pub method: Option<TransferMethod>,
    /// Bumped by every successful open.
    pub session: u64,
    /// Set while `close` tears the session down.
    pub closing: bool,
    pub fault: Option<SerialError>,
    pub rx: RxFifo,
    pub notifier: Option<Notifier>,
    pub stats: PortStats,
}

impl PortInner {
    pub fn is_open(&self) -> bool {
        self.state == PortState::Open && !self.closing
    }

    /// True while `session` is the open, not closing, session.
    pub fn is_live(&self, session: u64) -> bool {
        self.is_open() && self.session == session
    }

    pub fn store(&mut self, data: &[u8]) -> usize {
        let n = self.rx.push(data);
        self.stats.rx_bytes += n as u64;
        self.stats.rx_high_water = self.stats.rx_high_water.max(self.rx.len());
        n
    }
}

/// The appending session is no longer live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StaleSession;

#[derive(Debug)]
pub(crate) struct Shared {
    inner: Mutex<PortInner>,
    /// Signalled when the rx fifo gains data or the session ends.
    pub rx_ready: Condvar,
    /// Signalled when the rx fifo gains room or the session ends.
    pub rx_space: Condvar,
}

impl Shared {
    pub fn new(rx_fifo_size: usize) -> Self {
        Self {
            inner: Mutex::new(PortInner {
                state: PortState::Closed,
                config: SerialConfig::default(),
                configured: ConfigMask::empty(),
                method: None,
                session: 0,
                closing: false,
                fault: None,
                rx: RxFifo::new(rx_fifo_size),
                notifier: None,
                stats: PortStats::default(),
            }),
            rx_ready: Condvar::new(),
            rx_space: Condvar::new(),
        }
    }

    // Every critical section leaves PortInner consistent, so a panic in
    // another holder does not invalidate it.
    pub fn lock(&self) -> MutexGuard<'_, PortInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append received bytes for `session` and wake one reader.
    ///
    /// Returns how many bytes fit.
    pub fn append(&self, session: u64, data: &[u8]) -> Result<usize, StaleSession> {
        let mut inner = self.lock();
        if !inner.is_live(session) {
            return Err(StaleSession);
        }
        let n = inner.store(data);
        drop(inner);

        if n > 0 {
            self.rx_ready.notify_one();
        }
        Ok(n)
    }

    /// Record a notifier failure and release every reader.
    pub fn fail(&self, session: u64, error: SerialError) {
        let mut inner = self.lock();
        if !inner.is_live(session) {
            return;
        }
        inner.fault.get_or_insert(error);
        inner.stats.notifier_faults += 1;
        drop(inner);

        self.rx_ready.notify_all();
    }

    /// Block until the rx fifo has room. Returns the free space, or `None`
    /// once `session` is over.
    pub fn wait_for_space(&self, session: u64) -> Option<usize> {
        let inner = self.lock();
        let inner = self
            .rx_space
            .wait_while(inner, |inner| inner.is_live(session) && inner.rx.is_full())
            .unwrap_or_else(PoisonError::into_inner);

        inner.is_live(session).then(|| inner.rx.free())
    }

    /// Move buffered bytes into `buf` and pass the wakeups on.
    pub fn drain(&self, mut inner: MutexGuard<'_, PortInner>, buf: &mut [u8]) -> usize {
        let n = inner.rx.pop(buf);
        let more = !inner.rx.is_empty();
        drop(inner);

        if n > 0 {
            self.rx_space.notify_all();
        }
        // a notify_one from append may have woken only us
        if more {
            self.rx_ready.notify_one();
        }
        n
    }

    /// Wake every waiter so it re-checks the session.
    pub fn wake_all(&self) {
        self.rx_ready.notify_all();
        self.rx_space.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Arc, thread, time::Duration};

    fn open_shared(size: usize) -> (Shared, u64) {
        let shared = Shared::new(size);
        let mut inner = shared.lock();
        inner.state = PortState::Open;
        inner.session = 1;
        drop(inner);
        (shared, 1)
    }

    #[test]
    fn append_rejects_stale_session() {
        let (shared, session) = open_shared(8);
        assert_eq!(shared.append(session, b"ab"), Ok(2));
        assert_eq!(shared.append(session + 1, b"cd"), Err(StaleSession));

        shared.lock().closing = true;
        assert_eq!(shared.append(session, b"ef"), Err(StaleSession));
        assert_eq!(shared.lock().rx.len(), 2);
    }

    #[test]
    fn append_is_bounded_and_drain_keeps_order() {
        let (shared, session) = open_shared(4);
        assert_eq!(shared.append(session, b"abcdef"), Ok(4));

        let mut buf = [0u8; 3];
        let n = shared.drain(shared.lock(), &mut buf);
        assert_eq!(&buf[..n], b"abc");
        assert_eq!(shared.append(session, b"xy"), Ok(2));

        let mut buf = [0u8; 8];
        let n = shared.drain(shared.lock(), &mut buf);
        assert_eq!(&buf[..n], b"dxy");

        let stats = shared.lock().stats;
        assert_eq!(stats.rx_bytes, 6);
        assert_eq!(stats.rx_high_water, 4);
    }

    #[test]
    fn fault_is_kept_once() {
        let (shared, session) = open_shared(4);
        shared.fail(session, SerialError::Framing);
        shared.fail(session, SerialError::Overrun);

        let inner = shared.lock();
        assert_eq!(inner.fault, Some(SerialError::Framing));
        assert_eq!(inner.stats.notifier_faults, 2);
    }

    #[test]
    fn space_waiter_released_by_drain_and_by_close() {
        let (shared, session) = open_shared(2);
        let shared = Arc::new(shared);
        shared.append(session, b"ab").unwrap();

        let waiter = {
            let shared = Arc::clone(&shared);
            thread::spawn(move || shared.wait_for_space(session))
        };
        thread::sleep(Duration::from_millis(20));
        let mut buf = [0u8; 1];
        shared.drain(shared.lock(), &mut buf);
        assert_eq!(waiter.join().unwrap(), Some(1));

        shared.append(session, b"c").unwrap();
        let waiter = {
            let shared = Arc::clone(&shared);
            thread::spawn(move || shared.wait_for_space(session))
        };
        thread::sleep(Duration::from_millis(20));
        shared.lock().closing = true;
        shared.wake_all();
        assert_eq!(waiter.join().unwrap(), None);
    }
}
