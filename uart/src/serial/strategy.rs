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

//! Receive strategies, one per transfer method.
//!
//! Each strategy moves bytes from the backend into a caller supplied buffer.
//! The port appends them to its rx fifo; the strategy never sees the fifo.

use super::{
    error::SerialError,
    ops::{TransferMethod, UartOps},
};
use alloc::boxed::Box;
use core::time::Duration;

pub trait RxStrategy: Send {
    fn method(&self) -> TransferMethod;

    /// Fetch up to `buf.len()` received bytes, waiting at most `budget`.
    /// Returns 0 if nothing arrived.
    fn produce(
        &mut self,
        ops: &dyn UartOps,
        buf: &mut [u8],
        budget: Duration,
    ) -> Result<usize, SerialError>;
}

/// Reads the receive register once per call; the caller owns the retry loop.
#[derive(Debug, Default, Clone, Copy)]
pub struct PollingRx;

impl RxStrategy for PollingRx {
    fn method(&self) -> TransferMethod {
        TransferMethod::Polling
    }

    fn produce(
        &mut self,
        ops: &dyn UartOps,
        buf: &mut [u8],
        _budget: Duration,
    ) -> Result<usize, SerialError> {
        if buf.is_empty() {
            return Ok(0);
        }
        ops.poll_receive(buf)
    }
}

/// Waits for the receive interrupt, then drains the hardware FIFO the way an
/// rx interrupt handler would.
#[derive(Debug, Default)]
pub struct InterruptRx;

impl RxStrategy for InterruptRx {
    fn method(&self) -> TransferMethod {
        TransferMethod::Interrupt
    }

    fn produce(
        &mut self,
        ops: &dyn UartOps,
        buf: &mut [u8],
        budget: Duration,
    ) -> Result<usize, SerialError> {
        if buf.is_empty() || !ops.wait_rx_interrupt(budget)? {
            return Ok(0);
        }

        let mut count = 0;
        while count < buf.len() {
            let n = ops.poll_receive(&mut buf[count..])?;
            if n == 0 {
                break;
            }
            count += n;
        }
        Ok(count)
    }
}

/// Receives one completed DMA block per call.
#[derive(Debug, Default)]
pub struct DmaRx;

impl RxStrategy for DmaRx {
    fn method(&self) -> TransferMethod {
        TransferMethod::Dma
    }

    fn produce(
        &mut self,
        ops: &dyn UartOps,
        buf: &mut [u8],
        budget: Duration,
    ) -> Result<usize, SerialError> {
        if buf.is_empty() {
            return Ok(0);
        }
        let n = ops.wait_dma_complete(buf, budget)?;
        Ok(n.min(buf.len()))
    }
}

/// Strategy that needs a background notifier, or `None` for polling.
pub(crate) fn notifier_strategy(method: TransferMethod) -> Option<Box<dyn RxStrategy>> {
    match method {
        TransferMethod::Polling => None,
        TransferMethod::Interrupt => Some(Box::new(InterruptRx)),
        TransferMethod::Dma => Some(Box::new(DmaRx)),
    }
}
