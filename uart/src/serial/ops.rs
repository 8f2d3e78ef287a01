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

use super::{config::SerialConfig, error::SerialError};
use core::time::Duration;

/// How received bytes reach the port while it is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMethod {
    /// `read` polls the receive register itself.
    Polling,
    /// A notifier waits on the receive interrupt and drains the hardware FIFO.
    Interrupt,
    /// A notifier waits for DMA completions.
    Dma,
}

impl TransferMethod {
    pub(crate) const fn tag(self) -> &'static str {
        match self {
            Self::Polling => "poll",
            Self::Interrupt => "irq",
            Self::Dma => "dma",
        }
    }
}

/// Hardware backend of a UART port.
///
/// Register blocks are shared between the caller and the notifier, so every
/// method takes `&self` and implementations synchronize internally.
pub trait UartOps: Send + Sync {
    /// Program baud divider and line control.
    fn apply_config(&self, config: &SerialConfig) -> Result<(), SerialError>;

    /// Enable the receiver and transmitter for `method`.
    fn begin_transfer(&self, method: TransferMethod) -> Result<(), SerialError>;

    /// Disable the receiver and transmitter and mask their interrupts.
    fn end_transfer(&self) -> Result<(), SerialError>;

    /// Copy whatever the receive FIFO holds into `buf` without blocking.
    /// Returns 0 when it is empty.
    fn poll_receive(&self, buf: &mut [u8]) -> Result<usize, SerialError>;

    /// Queue bytes for transmission and return how many were accepted.
    fn transmit(&self, data: &[u8]) -> Result<usize, SerialError>;

    /// Block until the receive interrupt fires or `timeout` elapses.
    /// Returns `true` if the interrupt fired.
    fn wait_rx_interrupt(&self, _timeout: Duration) -> Result<bool, SerialError> {
        Err(SerialError::Unsupported)
    }

    /// Block until a DMA receive transfer into `buf` completes or `timeout`
    /// elapses. Returns the number of bytes transferred.
    fn wait_dma_complete(&self, _buf: &mut [u8], _timeout: Duration) -> Result<usize, SerialError> {
        Err(SerialError::Unsupported)
    }
}
