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

use super::config::ConfigParam;
use embedded_io::ErrorKind;
use libc::{EAGAIN, EBADF, EBUSY, EINTR, EINVAL, EIO, ENOSYS, ETIMEDOUT};

/// An operation was invoked in a port state that forbids it.
#[derive(Debug, Clone, Copy, Eq, PartialEq, thiserror::Error)]
pub enum StateError {
    #[error("configure requires Closed")]
    ConfigureRequiresClosed,
    #[error("open requires Configured")]
    OpenRequiresConfigured,
    #[error("already open")]
    AlreadyOpen,
    #[error("not open")]
    NotOpen,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("invalid value {value} for {param:?}")]
    InvalidArgument { param: ConfigParam, value: i64 },
    #[error("unknown configuration parameter tag {0}")]
    UnknownParameter(u32),
}

/// Failures reported by the hardware backend.
#[derive(Debug, Clone, Copy, Eq, PartialEq, thiserror::Error)]
pub enum SerialError {
    #[error("Overrun")]
    Overrun,
    #[error("Break")]
    Break,
    #[error("Parity")]
    Parity,
    #[error("Framing")]
    Framing,
    #[error("Device error")]
    DeviceError,
    #[error("Transmit rejected")]
    TxRejected,
    #[error("Transfer method not supported")]
    Unsupported,
    #[error("Operation timed out")]
    TimedOut,
}

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error(transparent)]
    State(#[from] StateError),
    /// The port was closed while the caller was waiting.
    #[error("port closed")]
    Closed,
    #[error("transport: {0}")]
    Transport(#[from] SerialError),
    /// The background notifier hit a backend failure and stopped.
    #[error("notifier failed: {0}")]
    Notifier(SerialError),
    #[error("no progress before the retry budget ran out")]
    TimedOut,
    #[error("failed to start notifier: {0}")]
    Spawn(#[source] std::io::Error),
}

impl embedded_io::Error for SerialError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Break | Self::Overrun => ErrorKind::Other,
            Self::Framing | Self::Parity => ErrorKind::InvalidData,
            Self::DeviceError | Self::TxRejected => ErrorKind::Other,
            Self::Unsupported => ErrorKind::Unsupported,
            Self::TimedOut => ErrorKind::TimedOut,
        }
    }
}

impl embedded_io::Error for IoError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::State(_) => ErrorKind::NotConnected,
            Self::Closed => ErrorKind::ConnectionAborted,
            Self::Transport(e) | Self::Notifier(e) => embedded_io::Error::kind(e),
            Self::TimedOut => ErrorKind::TimedOut,
            Self::Spawn(_) => ErrorKind::OutOfMemory,
        }
    }
}

impl From<SerialError> for i32 {
    fn from(error: SerialError) -> Self {
        match error {
            SerialError::Overrun
            | SerialError::Break
            | SerialError::Parity
            | SerialError::Framing
            | SerialError::DeviceError
            | SerialError::TxRejected => -EIO, // Input/output error
            SerialError::Unsupported => -ENOSYS, // Function not implemented
            SerialError::TimedOut => -ETIMEDOUT, // Operation timed out
        }
    }
}

impl From<ConfigError> for i32 {
    fn from(error: ConfigError) -> Self {
        match error {
            ConfigError::State(_) => -EBUSY,
            ConfigError::InvalidArgument { .. } | ConfigError::UnknownParameter(_) => -EINVAL,
        }
    }
}

impl From<IoError> for i32 {
    fn from(error: IoError) -> Self {
        match error {
            IoError::State(_) => -EBADF,
            IoError::Closed => -EINTR,
            IoError::Transport(e) | IoError::Notifier(e) => e.into(),
            IoError::TimedOut => -ETIMEDOUT,
            IoError::Spawn(_) => -EAGAIN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_io::Error as _;

    #[test]
    fn state_error_messages() {
        assert_eq!(
            StateError::ConfigureRequiresClosed.to_string(),
            "configure requires Closed"
        );
        assert_eq!(
            StateError::OpenRequiresConfigured.to_string(),
            "open requires Configured"
        );
        assert_eq!(StateError::AlreadyOpen.to_string(), "already open");
        assert_eq!(StateError::NotOpen.to_string(), "not open");
    }

    #[test]
    fn state_and_transport_stay_distinct() {
        let state: IoError = StateError::NotOpen.into();
        let transport: IoError = SerialError::TxRejected.into();

        assert!(matches!(state, IoError::State(StateError::NotOpen)));
        assert!(matches!(transport, IoError::Transport(SerialError::TxRejected)));
        assert_ne!(state.kind(), transport.kind());
    }

    #[test]
    fn errno_mapping() {
        assert_eq!(i32::from(SerialError::Framing), -EIO);
        assert_eq!(i32::from(IoError::Notifier(SerialError::TimedOut)), -ETIMEDOUT);
        assert_eq!(i32::from(IoError::State(StateError::NotOpen)), -EBADF);
        assert_eq!(
            i32::from(ConfigError::InvalidArgument {
                param: ConfigParam::BaudRate,
                value: -1
            }),
            -EINVAL
        );
        assert_eq!(
            i32::from(ConfigError::State(StateError::ConfigureRequiresClosed)),
            -EBUSY
        );
    }
}
