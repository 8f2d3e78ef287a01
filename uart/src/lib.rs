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

//! UART port driver core.
//!
//! A [`UartPort`](serial::UartPort) drives one peripheral through a
//! [`UartOps`](serial::UartOps) backend: line configuration, the
//! Closed/Configured/Open lifecycle and blocking reads fed by a polling loop,
//! an interrupt notifier or a DMA notifier.

extern crate alloc;

pub mod kconfig;
pub mod logger;
pub mod serial;

pub use serial::{
    IoError, LoopbackUart, PortOptions, PortState, SerialConfig, TransferMethod, UartOps, UartPort,
};
