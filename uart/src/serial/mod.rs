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

mod backoff;
pub mod config;
mod error;
pub mod loopback;
mod notifier;
mod options;
mod ops;
mod port;
mod shared;
mod strategy;

pub use backoff::{poll_with_backoff, Backoff, PollConfig, PollResult};
pub use config::{ConfigParam, DataBits, Parity, SerialConfig, StopBits};
pub use error::{ConfigError, IoError, SerialError, StateError};
pub use loopback::{FaultPoint, LoopbackCounters, LoopbackUart};
pub use options::{PortOptions, SERIAL_RX_FIFO_MIN_SIZE};
pub use ops::{TransferMethod, UartOps};
pub use port::UartPort;
pub use shared::{PortState, PortStats};
pub use strategy::{DmaRx, InterruptRx, PollingRx, RxStrategy};
