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

//! Software UART for host bring-up and tests.
//!
//! Bytes handed to `inject` show up in the receive FIFO as if they arrived
//! on the line. With loopback enabled, transmitted bytes are fed back into
//! the receive FIFO, like a tx/rx jumper on a real board.

use super::{
    config::SerialConfig,
    error::SerialError,
    ops::{TransferMethod, UartOps},
};
use alloc::vec::Vec;
use blue_infra::ringbuffer::RingBuffer;
use core::time::Duration;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

const LOOPBACK_FIFO_SIZE: usize = 4096;

/// Backend operations where a fault can be injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultPoint {
    ApplyConfig,
    BeginTransfer,
    EndTransfer,
    Receive,
    Transmit,
}

const FAULT_POINTS: usize = 5;

/// How often each backend operation was called.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoopbackCounters {
    pub apply_config: u32,
    pub begin_transfer: u32,
    pub end_transfer: u32,
    pub poll_receive: u32,
    pub transmit: u32,
}

#[derive(Debug)]
struct LoopbackState {
    config: Option<SerialConfig>,
    method: Option<TransferMethod>,
    rx: RingBuffer,
    tx: Vec<u8>,
    loopback: bool,
    tx_chunk: usize,
    poll_latency: u32,
    empty_polls: u32,
    faults: [Option<SerialError>; FAULT_POINTS],
    counters: LoopbackCounters,
}

impl LoopbackState {
    fn take_fault(&mut self, point: FaultPoint) -> Result<(), SerialError> {
        match self.faults[point as usize].take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn rx_pending(&self) -> bool {
        !self.rx.is_empty() || self.faults[FaultPoint::Receive as usize].is_some()
    }
}

#[derive(Debug)]
pub struct LoopbackUart {
    state: Mutex<LoopbackState>,
    /// Receive interrupt / DMA completion line.
    event: Condvar,
}

impl LoopbackUart {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LoopbackState {
                config: None,
                method: None,
                rx: RingBuffer::new(LOOPBACK_FIFO_SIZE),
                tx: Vec::new(),
                loopback: false,
                tx_chunk: usize::MAX,
                poll_latency: 0,
                empty_polls: 0,
                faults: [None; FAULT_POINTS],
                counters: LoopbackCounters::default(),
            }),
            event: Condvar::new(),
        }
    }

    /// Feed transmitted bytes back into the receive FIFO.
    pub fn with_loopback(self, enable: bool) -> Self {
        self.lock().loopback = enable;
        self
    }

    /// Accept at most `chunk` bytes per `transmit`.
    pub fn with_tx_chunk(self, chunk: usize) -> Self {
        self.lock().tx_chunk = chunk;
        self
    }

    /// Let the first `polls` polling reads of a session see an empty FIFO.
    pub fn with_poll_latency(self, polls: u32) -> Self {
        self.lock().poll_latency = polls;
        self
    }

    fn lock(&self) -> MutexGuard<'_, LoopbackState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Put bytes on the receive line. Returns how many fit in the FIFO.
    pub fn inject(&self, data: &[u8]) -> usize {
        let n = self.lock().rx.push(data);
        self.event.notify_all();
        n
    }

    /// Make the next call at `point` fail with `error`.
    pub fn inject_fault(&self, point: FaultPoint, error: SerialError) {
        self.lock().faults[point as usize] = Some(error);
        self.event.notify_all();
    }

    pub fn transmitted(&self) -> Vec<u8> {
        self.lock().tx.clone()
    }

    pub fn applied_config(&self) -> Option<SerialConfig> {
        self.lock().config
    }

    pub fn active_method(&self) -> Option<TransferMethod> {
        self.lock().method
    }

    pub fn is_active(&self) -> bool {
        self.lock().method.is_some()
    }

    pub fn counters(&self) -> LoopbackCounters {
        self.lock().counters
    }

    /// Wait for the line event, then hand back the locked state.
    fn wait_event(&self, timeout: Duration) -> MutexGuard<'_, LoopbackState> {
        let state = self.lock();
        let (state, _) = self
            .event
            .wait_timeout_while(state, timeout, |s| s.method.is_some() && !s.rx_pending())
            .unwrap_or_else(PoisonError::into_inner);
        state
    }
}

impl Default for LoopbackUart {
    fn default() -> Self {
        Self::new()
    }
}

impl UartOps for LoopbackUart {
    fn apply_config(&self, config: &SerialConfig) -> Result<(), SerialError> {
        let mut state = self.lock();
        state.counters.apply_config += 1;
        state.take_fault(FaultPoint::ApplyConfig)?;
        state.config = Some(*config);
        Ok(())
    }

    fn begin_transfer(&self, method: TransferMethod) -> Result<(), SerialError> {
        let mut state = self.lock();
        state.counters.begin_transfer += 1;
        state.take_fault(FaultPoint::BeginTransfer)?;
        state.method = Some(method);
        state.empty_polls = 0;
        Ok(())
    }

    fn end_transfer(&self) -> Result<(), SerialError> {
        let mut state = self.lock();
        state.counters.end_transfer += 1;
        state.method = None;
        let result = state.take_fault(FaultPoint::EndTransfer);
        drop(state);

        self.event.notify_all();
        result
    }

    fn poll_receive(&self, buf: &mut [u8]) -> Result<usize, SerialError> {
        let mut state = self.lock();
        state.counters.poll_receive += 1;
        state.take_fault(FaultPoint::Receive)?;
        if state.method == Some(TransferMethod::Polling) && state.empty_polls < state.poll_latency
        {
            state.empty_polls += 1;
            return Ok(0);
        }
        Ok(state.rx.pop(buf))
    }

    fn transmit(&self, data: &[u8]) -> Result<usize, SerialError> {
        let mut state = self.lock();
        state.counters.transmit += 1;
        state.take_fault(FaultPoint::Transmit)?;
        if state.method.is_none() {
            return Err(SerialError::DeviceError);
        }

        let n = data.len().min(state.tx_chunk);
        state.tx.extend_from_slice(&data[..n]);
        if state.loopback {
            // the receive FIFO overruns like the hardware one would
            if state.rx.push(&data[..n]) < n {
                state.faults[FaultPoint::Receive as usize].get_or_insert(SerialError::Overrun);
            }
            drop(state);
            self.event.notify_all();
        }
        Ok(n)
    }

    fn wait_rx_interrupt(&self, timeout: Duration) -> Result<bool, SerialError> {
        let mut state = self.wait_event(timeout);
        state.take_fault(FaultPoint::Receive)?;
        Ok(!state.rx.is_empty())
    }

    fn wait_dma_complete(&self, buf: &mut [u8], timeout: Duration) -> Result<usize, SerialError> {
        let mut state = self.wait_event(timeout);
        state.take_fault(FaultPoint::Receive)?;
        Ok(state.rx.pop(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transmit_is_bounded_by_chunk() {
        let uart = LoopbackUart::new().with_tx_chunk(3);
        uart.begin_transfer(TransferMethod::Polling).unwrap();

        assert_eq!(uart.transmit(b"hello"), Ok(3));
        assert_eq!(uart.transmit(b"lo"), Ok(2));
        assert_eq!(uart.transmitted(), b"hello");
        assert_eq!(uart.counters().transmit, 2);
    }

    #[test]
    fn transmit_requires_active_transfer() {
        let uart = LoopbackUart::new();
        assert_eq!(uart.transmit(b"x"), Err(SerialError::DeviceError));
    }

    #[test]
    fn loopback_feeds_receiver() {
        let uart = LoopbackUart::new().with_loopback(true);
        uart.begin_transfer(TransferMethod::Interrupt).unwrap();
        uart.transmit(b"ping").unwrap();

        assert_eq!(uart.wait_rx_interrupt(Duration::from_millis(10)), Ok(true));
        let mut buf = [0u8; 8];
        let n = uart.poll_receive(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"ping");
    }

    #[test]
    fn poll_latency_hides_data() {
        let uart = LoopbackUart::new().with_poll_latency(2);
        uart.begin_transfer(TransferMethod::Polling).unwrap();
        uart.inject(b"z");

        let mut buf = [0u8; 1];
        assert_eq!(uart.poll_receive(&mut buf), Ok(0));
        assert_eq!(uart.poll_receive(&mut buf), Ok(0));
        assert_eq!(uart.poll_receive(&mut buf), Ok(1));
        assert_eq!(uart.counters().poll_receive, 3);
    }

    #[test]
    fn faults_fire_once() {
        let uart = LoopbackUart::new();
        uart.inject_fault(FaultPoint::BeginTransfer, SerialError::DeviceError);

        assert_eq!(
            uart.begin_transfer(TransferMethod::Dma),
            Err(SerialError::DeviceError)
        );
        assert!(!uart.is_active());
        assert_eq!(uart.begin_transfer(TransferMethod::Dma), Ok(()));
        assert_eq!(uart.active_method(), Some(TransferMethod::Dma));
    }

    #[test]
    fn receive_fault_wakes_interrupt_wait() {
        let uart = LoopbackUart::new();
        uart.begin_transfer(TransferMethod::Interrupt).unwrap();
        uart.inject_fault(FaultPoint::Receive, SerialError::Framing);

        assert_eq!(
            uart.wait_rx_interrupt(Duration::from_secs(5)),
            Err(SerialError::Framing)
        );
    }

    #[test]
    fn end_transfer_releases_waiter() {
        let uart = std::sync::Arc::new(LoopbackUart::new());
        uart.begin_transfer(TransferMethod::Interrupt).unwrap();

        let waiter = {
            let uart = uart.clone();
            std::thread::spawn(move || uart.wait_rx_interrupt(Duration::from_secs(5)))
        };
        std::thread::sleep(Duration::from_millis(20));
        uart.end_transfer().unwrap();
        assert_eq!(waiter.join().unwrap(), Ok(false));
    }
}
