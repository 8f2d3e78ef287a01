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

use super::backoff::PollConfig;
use crate::kconfig::{
    SERIAL_NOTIFIER_SLICE_MS, SERIAL_NOTIFIER_STACK_SIZE, SERIAL_READ_TIMEOUT_MS,
    SERIAL_RX_FIFO_SIZE,
};
use core::time::Duration;

pub const SERIAL_RX_FIFO_MIN_SIZE: usize = 256;

/// Driver side tunables of a port. The line settings live in `SerialConfig`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortOptions {
    pub rx_fifo_size: usize,
    /// Interrupt and DMA reads only; polling reads are bounded by `poll`.
    /// `None` waits until data arrives or the port closes.
    pub read_timeout: Option<Duration>,
    pub poll: PollConfig,
    pub notifier_slice: Duration,
    pub notifier_stack_size: usize,
}

impl PortOptions {
    pub fn with_rx_fifo_size(mut self, size: usize) -> Self {
        self.rx_fifo_size = size.max(SERIAL_RX_FIFO_MIN_SIZE);
        self
    }

    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_notifier_slice(mut self, slice: Duration) -> Self {
        // a zero slice would spin the notifier
        self.notifier_slice = slice.max(Duration::from_millis(1));
        self
    }

    pub fn with_notifier_stack_size(mut self, size: usize) -> Self {
        self.notifier_stack_size = size;
        self
    }
}

impl Default for PortOptions {
    fn default() -> Self {
        Self {
            rx_fifo_size: SERIAL_RX_FIFO_SIZE.max(SERIAL_RX_FIFO_MIN_SIZE),
            read_timeout: match SERIAL_READ_TIMEOUT_MS {
                0 => None,
                ms => Some(Duration::from_millis(ms)),
            },
            poll: PollConfig::default(),
            notifier_slice: Duration::from_millis(SERIAL_NOTIFIER_SLICE_MS),
            notifier_stack_size: SERIAL_NOTIFIER_STACK_SIZE,
        }
    }
}
