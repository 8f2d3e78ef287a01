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

//! Build-time defaults of the serial driver.
//!
//! Every value can be overridden per port through `PortOptions`.

/// Receive fifo size in bytes.
pub const SERIAL_RX_FIFO_SIZE: usize = 1024;
/// Polling reads give up after this many empty polls.
pub const SERIAL_POLL_MAX_ATTEMPTS: u32 = 16;
/// First backoff sleep between polls, in microseconds.
pub const SERIAL_POLL_BACKOFF_MIN_US: u64 = 50;
/// Backoff sleep cap, in microseconds.
pub const SERIAL_POLL_BACKOFF_MAX_US: u64 = 5_000;
/// Longest single backend wait of the notifier, in milliseconds.
pub const SERIAL_NOTIFIER_SLICE_MS: u64 = 10;
/// Stack size of the notifier thread, in bytes.
pub const SERIAL_NOTIFIER_STACK_SIZE: usize = 64 * 1024;
/// Read timeout for notifier driven reads, in milliseconds. 0 waits forever.
pub const SERIAL_READ_TIMEOUT_MS: u64 = 0;
