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

//! Background receive context of an interrupt or DMA session.
//!
//! The notifier plays the part of the rx interrupt handler: it waits on the
//! backend, moves what arrived into the port's rx fifo and wakes a reader.
//! It lives exactly as long as one open session and is joined by `close`.

use super::{
    ops::{TransferMethod, UartOps},
    shared::Shared,
    strategy::RxStrategy,
};
use alloc::{boxed::Box, format, sync::Arc, vec};
use core::time::Duration;
use log::{debug, error, trace};
use std::{io, thread};

#[derive(Debug)]
pub(crate) struct Notifier {
    method: TransferMethod,
    handle: thread::JoinHandle<()>,
}

struct Worker {
    port_id: u32,
    session: u64,
    shared: Arc<Shared>,
    ops: Arc<dyn UartOps>,
    strategy: Box<dyn RxStrategy>,
    slice: Duration,
    chunk: usize,
}

impl Notifier {
    pub fn spawn(
        port_id: u32,
        session: u64,
        shared: Arc<Shared>,
        ops: Arc<dyn UartOps>,
        strategy: Box<dyn RxStrategy>,
        slice: Duration,
        chunk: usize,
        stack_size: usize,
    ) -> io::Result<Self> {
        let method = strategy.method();
        let worker = Worker {
            port_id,
            session,
            shared,
            ops,
            strategy,
            slice,
            chunk,
        };
        let handle = thread::Builder::new()
            .name(format!("uart{}-{}", port_id, method.tag()))
            .stack_size(stack_size)
            .spawn(move || worker.run())?;

        Ok(Self { method, handle })
    }

    pub fn method(&self) -> TransferMethod {
        self.method
    }

    /// Wait for the worker to leave its loop. The session must already be
    /// marked closing.
    pub fn join(self) {
        if self.handle.join().is_err() {
            error!("uart notifier ({:?}) panicked", self.method);
        }
    }
}

impl Worker {
    fn run(mut self) {
        debug!(
            "ttyS{}: notifier up, session {} via {:?}",
            self.port_id,
            self.session,
            self.strategy.method()
        );
        let mut scratch = vec![0u8; self.chunk];

        while let Some(room) = self.shared.wait_for_space(self.session) {
            let want = room.min(scratch.len());
            match self
                .strategy
                .produce(self.ops.as_ref(), &mut scratch[..want], self.slice)
            {
                Ok(0) => continue,
                Ok(n) => {
                    trace!("ttyS{}: notifier received {} bytes", self.port_id, n);
                    if !self.deliver(&scratch[..n]) {
                        break;
                    }
                }
                Err(e) => {
                    error!("ttyS{}: receive failed: {}", self.port_id, e);
                    self.shared.fail(self.session, e);
                    break;
                }
            }
        }

        debug!("ttyS{}: notifier down, session {}", self.port_id, self.session);
    }

    /// Append all of `data`, waiting for room as needed. Returns false once
    /// the session is over.
    fn deliver(&self, data: &[u8]) -> bool {
        let mut offset = 0;
        while offset < data.len() {
            if self.shared.wait_for_space(self.session).is_none() {
                return false;
            }
            match self.shared.append(self.session, &data[offset..]) {
                Ok(n) => offset += n,
                Err(_) => return false,
            }
        }
        true
    }
}
