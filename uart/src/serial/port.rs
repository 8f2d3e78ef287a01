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

use super::{
    backoff::{poll_with_backoff, PollResult},
    config::{ConfigMask, ConfigParam, SerialConfig},
    error::{ConfigError, IoError, StateError},
    notifier::Notifier,
    ops::{TransferMethod, UartOps},
    options::PortOptions,
    shared::{PortInner, PortState, PortStats, Shared},
    strategy::{notifier_strategy, PollingRx, RxStrategy},
};
use alloc::{format, string::String, sync::Arc, vec};
use log::{debug, info, warn};
use std::{
    sync::{MutexGuard, PoisonError},
    time::Instant,
};

/// A UART port: configuration, open/close lifecycle and blocking transfers
/// on top of a `UartOps` backend.
///
/// All methods take `&self`; the port can be shared between a reader thread
/// and a writer thread.
pub struct UartPort {
    id: u32,
    options: PortOptions,
    shared: Arc<Shared>,
    uart_ops: Arc<dyn UartOps>,
}

impl UartPort {
    pub fn new(id: u32, uart_ops: Arc<dyn UartOps>) -> Self {
        Self::with_options(id, uart_ops, PortOptions::default())
    }

    pub fn with_options(id: u32, uart_ops: Arc<dyn UartOps>, options: PortOptions) -> Self {
        // the fields are public, re-apply the floors
        let rx_fifo_size = options.rx_fifo_size;
        let notifier_slice = options.notifier_slice;
        let options = options
            .with_rx_fifo_size(rx_fifo_size)
            .with_notifier_slice(notifier_slice);

        Self {
            id,
            shared: Arc::new(Shared::new(options.rx_fifo_size)),
            options,
            uart_ops,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> String {
        format!("ttyS{}", self.id)
    }

    pub fn state(&self) -> PortState {
        self.shared.lock().state
    }

    pub fn config(&self) -> SerialConfig {
        self.shared.lock().config
    }

    pub fn transfer_method(&self) -> Option<TransferMethod> {
        self.shared.lock().method
    }

    /// Bytes received but not read yet.
    pub fn rx_pending(&self) -> usize {
        self.shared.lock().rx.len()
    }

    pub fn stats(&self) -> PortStats {
        self.shared.lock().stats
    }

    pub fn options(&self) -> &PortOptions {
        &self.options
    }

    /// Set one line parameter. The port becomes Configured once every
    /// parameter has been set since the port was created or last closed.
    pub fn configure(&self, param: ConfigParam, value: i64) -> Result<(), ConfigError> {
        let mut inner = self.shared.lock();
        if inner.state != PortState::Closed {
            return Err(StateError::ConfigureRequiresClosed.into());
        }

        inner.config.set(param, value)?;
        inner.configured |= param.mask();
        debug!("{}: {:?} = {}", self.name(), param, value);

        if inner.configured.is_all() {
            inner.state = PortState::Configured;
            info!("{}: configured {:?}", self.name(), inner.config);
        }
        Ok(())
    }

    /// `configure` with a raw parameter tag.
    pub fn configure_raw(&self, tag: u32, value: i64) -> Result<(), ConfigError> {
        self.configure(ConfigParam::try_from(tag)?, value)
    }

    /// Set every line parameter in one step.
    pub fn configure_all(&self, config: SerialConfig) -> Result<(), ConfigError> {
        let mut inner = self.shared.lock();
        if inner.state != PortState::Closed {
            return Err(StateError::ConfigureRequiresClosed.into());
        }
        config.validate()?;

        inner.config = config;
        inner.configured = ConfigMask::all();
        inner.state = PortState::Configured;
        info!("{}: configured {:?}", self.name(), config);
        Ok(())
    }

    /// Program the backend and start receiving with `method`.
    pub fn open(&self, method: TransferMethod) -> Result<(), IoError> {
        let mut inner = self.shared.lock();
        match inner.state {
            PortState::Open => return Err(StateError::AlreadyOpen.into()),
            PortState::Closed => return Err(StateError::OpenRequiresConfigured.into()),
            PortState::Configured => {}
        }

        self.uart_ops.apply_config(&inner.config)?;
        self.uart_ops.begin_transfer(method)?;

        inner.session += 1;
        inner.state = PortState::Open;
        inner.method = Some(method);
        inner.closing = false;
        inner.fault = None;
        inner.rx.clear();

        // The notifier blocks on the lock until this guard is dropped, so it
        // only ever sees the finished Open state.
        if let Some(strategy) = notifier_strategy(method) {
            match Notifier::spawn(
                self.id,
                inner.session,
                Arc::clone(&self.shared),
                Arc::clone(&self.uart_ops),
                strategy,
                self.options.notifier_slice,
                self.options.rx_fifo_size,
                self.options.notifier_stack_size,
            ) {
                Ok(notifier) => inner.notifier = Some(notifier),
                Err(e) => {
                    inner.state = PortState::Configured;
                    inner.method = None;
                    if let Err(stop) = self.uart_ops.end_transfer() {
                        warn!("{}: end_transfer after failed open: {}", self.name(), stop);
                    }
                    return Err(IoError::Spawn(e));
                }
            }
        }

        info!("{}: open via {:?}, session {}", self.name(), method, inner.session);
        Ok(())
    }

    /// Stop the notifier and the backend and return to Closed.
    ///
    /// Readers blocked in `read` are released with `IoError::Closed`. A
    /// backend error from stopping the transfer is returned after the port
    /// has reached Closed.
    pub fn close(&self) -> Result<(), IoError> {
        let notifier = {
            let mut inner = self.shared.lock();
            if !inner.is_open() {
                return Err(StateError::NotOpen.into());
            }
            inner.closing = true;
            inner.notifier.take()
        };
        self.shared.wake_all();

        if let Some(notifier) = notifier {
            debug!("{}: joining {:?} notifier", self.name(), notifier.method());
            notifier.join();
        }
        let stopped = self.uart_ops.end_transfer();

        let mut inner = self.shared.lock();
        inner.state = PortState::Closed;
        inner.method = None;
        inner.closing = false;
        inner.fault = None;
        inner.rx.clear();
        // the next session starts from a full parameter set again
        inner.configured = ConfigMask::empty();
        inner.stats.sessions += 1;
        info!("{}: closed, session {}", self.name(), inner.session);
        drop(inner);

        if let Err(e) = stopped {
            warn!("{}: end_transfer failed: {}", self.name(), e);
            return Err(e.into());
        }
        Ok(())
    }

    /// Read up to `buf.len()` received bytes.
    ///
    /// Returns the number of bytes read, which may be less than requested.
    /// `Ok(0)` means nothing arrived before the poll budget or the read
    /// timeout ran out.
    pub fn read(&self, buf: &mut [u8]) -> Result<usize, IoError> {
        let inner = self.shared.lock();
        if !inner.is_open() {
            return Err(StateError::NotOpen.into());
        }
        if buf.is_empty() {
            return Ok(0);
        }
        let session = inner.session;

        match inner.method {
            Some(TransferMethod::Polling) => {
                drop(inner);
                self.read_polled(session, buf)
            }
            _ => self.read_notified(inner, session, buf),
        }
    }

    fn read_notified(
        &self,
        mut inner: MutexGuard<'_, PortInner>,
        session: u64,
        buf: &mut [u8],
    ) -> Result<usize, IoError> {
        let deadline = self.options.read_timeout.map(|t| Instant::now() + t);

        loop {
            if !inner.is_live(session) {
                return Err(IoError::Closed);
            }
            if !inner.rx.is_empty() {
                return Ok(self.shared.drain(inner, buf));
            }
            if let Some(e) = inner.fault {
                return Err(IoError::Notifier(e));
            }

            inner = match deadline {
                None => self
                    .shared
                    .rx_ready
                    .wait(inner)
                    .unwrap_or_else(PoisonError::into_inner),
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Ok(0);
                    }
                    self.shared
                        .rx_ready
                        .wait_timeout(inner, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
            };
        }
    }

    fn read_polled(&self, session: u64, buf: &mut [u8]) -> Result<usize, IoError> {
        {
            let inner = self.shared.lock();
            if !inner.is_live(session) {
                return Err(IoError::Closed);
            }
            if !inner.rx.is_empty() {
                return Ok(self.shared.drain(inner, buf));
            }
        }

        let mut scratch = vec![0u8; self.options.rx_fifo_size];
        let mut strategy = PollingRx;
        let polled = poll_with_backoff(self.options.poll, |attempt| {
            let room = {
                let inner = self.shared.lock();
                if !inner.is_live(session) {
                    return Err(IoError::Closed);
                }
                inner.rx.free().min(scratch.len())
            };

            let n = strategy.produce(
                self.uart_ops.as_ref(),
                &mut scratch[..room],
                self.options.poll.min_backoff,
            )?;
            if n == 0 {
                return Ok(None);
            }

            let stored = self
                .shared
                .append(session, &scratch[..n])
                .map_err(|_| IoError::Closed)?;
            if stored < n {
                let mut inner = self.shared.lock();
                inner.stats.rx_dropped += (n - stored) as u64;
                warn!("{}: rx fifo full, dropped {} bytes", self.name(), n - stored);
            }
            debug!("{}: poll {} got {} bytes", self.name(), attempt, n);
            Ok(Some(()))
        })?;

        match polled {
            PollResult::Ready(()) => {
                let inner = self.shared.lock();
                if !inner.is_live(session) {
                    return Err(IoError::Closed);
                }
                Ok(self.shared.drain(inner, buf))
            }
            PollResult::Exhausted { attempts, waited } => {
                debug!(
                    "{}: no data after {} polls ({:?})",
                    self.name(),
                    attempts,
                    waited
                );
                Ok(0)
            }
        }
    }

    /// Hand `data` to the backend. Returns how many bytes it accepted.
    pub fn write(&self, data: &[u8]) -> Result<usize, IoError> {
        let mut inner = self.shared.lock();
        if !inner.is_open() {
            return Err(StateError::NotOpen.into());
        }
        if data.is_empty() {
            return Ok(0);
        }

        // The lock stays held so the line settings cannot change under a
        // transmit; transmit itself never waits on the receive side.
        let n = self.uart_ops.transmit(data)?.min(data.len());
        inner.stats.tx_bytes += n as u64;
        Ok(n)
    }

    /// Write all of `data`, backing off while the backend accepts nothing.
    pub fn write_all(&self, data: &[u8]) -> Result<(), IoError> {
        let mut sent = 0;
        while sent < data.len() {
            sent += self.write_some(&data[sent..])?;
        }
        Ok(())
    }

    /// Write at least one byte of a non-empty `data`.
    fn write_some(&self, data: &[u8]) -> Result<usize, IoError> {
        let polled = poll_with_backoff(self.options.poll, |_| -> Result<_, IoError> {
            match self.write(data)? {
                0 => Ok(None),
                n => Ok(Some(n)),
            }
        })?;

        match polled {
            PollResult::Ready(n) => Ok(n),
            PollResult::Exhausted { attempts, .. } => {
                warn!("{}: transmit stalled after {} attempts", self.name(), attempts);
                Err(IoError::TimedOut)
            }
        }
    }
}

impl Drop for UartPort {
    fn drop(&mut self) {
        if self.shared.lock().is_open() {
            if let Err(e) = self.close() {
                warn!("{}: close on drop: {}", self.name(), e);
            }
        }
    }
}

impl embedded_io::ErrorType for &UartPort {
    type Error = IoError;
}

impl embedded_io::Read for &UartPort {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        UartPort::read(self, buf)
    }
}

impl embedded_io::ReadReady for &UartPort {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        let inner = self.shared.lock();
        if !inner.is_open() {
            return Err(StateError::NotOpen.into());
        }
        Ok(!inner.rx.is_empty())
    }
}

impl embedded_io::Write for &UartPort {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        // embedded-io callers treat Ok(0) as a dead writer
        if buf.is_empty() {
            return UartPort::write(self, buf);
        }
        self.write_some(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
        UartPort::write_all(self, buf)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        // transmit hands bytes straight to the backend
        if !self.shared.lock().is_open() {
            return Err(StateError::NotOpen.into());
        }
        Ok(())
    }
}

impl embedded_io::ErrorType for UartPort {
    type Error = IoError;
}

impl embedded_io::Read for UartPort {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        embedded_io::Read::read(&mut &*self, buf)
    }
}

impl embedded_io::ReadReady for UartPort {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        embedded_io::ReadReady::read_ready(&mut &*self)
    }
}

impl embedded_io::Write for UartPort {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        embedded_io::Write::write(&mut &*self, buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
        UartPort::write_all(self, buf)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        embedded_io::Write::flush(&mut &*self)
    }
}
