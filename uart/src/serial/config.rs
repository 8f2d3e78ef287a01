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

//! Useful UART types

use super::error::ConfigError;
use bitflags::bitflags;

/// Data bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataBits {
    /// 5 bits
    Five,
    /// 6 bits
    Six,
    /// 7 bits
    Seven,
    /// 8 bits
    Eight,
    /// 9 bits
    Nine,
}

impl DataBits {
    pub const fn from_value(value: i64) -> Option<Self> {
        match value {
            5 => Some(Self::Five),
            6 => Some(Self::Six),
            7 => Some(Self::Seven),
            8 => Some(Self::Eight),
            9 => Some(Self::Nine),
            _ => None,
        }
    }

    pub const fn bits(self) -> u8 {
        match self {
            Self::Five => 5,
            Self::Six => 6,
            Self::Seven => 7,
            Self::Eight => 8,
            Self::Nine => 9,
        }
    }
}

/// Stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    /// 1 bit
    One,
    /// 2 bits
    Two,
}

impl StopBits {
    pub const fn from_value(value: i64) -> Option<Self> {
        match value {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            _ => None,
        }
    }
}

/// Parity
///
/// Encoded as 0 = none, 1 = odd, 2 = even when configured by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    /// Odd parity
    Odd,
    /// Even parity
    Even,
}

impl Parity {
    pub const fn from_value(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Odd),
            2 => Some(Self::Even),
            _ => None,
        }
    }
}

/// Tag of a single line parameter accepted by `UartPort::configure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigParam {
    BaudRate,
    DataBits,
    Parity,
    StopBits,
}

impl ConfigParam {
    pub(crate) const fn mask(self) -> ConfigMask {
        match self {
            Self::BaudRate => ConfigMask::BAUD_RATE,
            Self::DataBits => ConfigMask::DATA_BITS,
            Self::Parity => ConfigMask::PARITY,
            Self::StopBits => ConfigMask::STOP_BITS,
        }
    }
}

impl TryFrom<u32> for ConfigParam {
    type Error = ConfigError;

    fn try_from(tag: u32) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(Self::BaudRate),
            1 => Ok(Self::DataBits),
            2 => Ok(Self::Parity),
            3 => Ok(Self::StopBits),
            _ => Err(ConfigError::UnknownParameter(tag)),
        }
    }
}

bitflags! {
    /// Parameters that have been set at least once.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct ConfigMask: u8 {
        const BAUD_RATE = 1 << 0;
        const DATA_BITS = 1 << 1;
        const PARITY = 1 << 2;
        const STOP_BITS = 1 << 3;
    }
}

/// A struct holding the configuration for an UART device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialConfig {
    /// The baudrate the uart will run at.
    pub baudrate: u32,

    /// The amount of data bits the uart should be configured to.
    pub data_bits: DataBits,

    /// The amount of stop bits the uart should be configured to.
    pub stop_bits: StopBits,

    /// The parity that this uart should have
    pub parity: Parity,
}

impl SerialConfig {
    /// Create a new instance of Uart SerialConfig
    pub const fn new(
        baudrate: u32,
        data_bits: DataBits,
        parity: Parity,
        stop_bits: StopBits,
    ) -> SerialConfig {
        SerialConfig {
            baudrate,
            data_bits,
            stop_bits,
            parity,
        }
    }

    /// Update one field from a raw value. The config is untouched on error.
    pub fn set(&mut self, param: ConfigParam, value: i64) -> Result<(), ConfigError> {
        let invalid = ConfigError::InvalidArgument { param, value };
        match param {
            ConfigParam::BaudRate => {
                self.baudrate = u32::try_from(value)
                    .ok()
                    .filter(|baud| *baud > 0)
                    .ok_or(invalid)?;
            }
            ConfigParam::DataBits => self.data_bits = DataBits::from_value(value).ok_or(invalid)?,
            ConfigParam::Parity => self.parity = Parity::from_value(value).ok_or(invalid)?,
            ConfigParam::StopBits => self.stop_bits = StopBits::from_value(value).ok_or(invalid)?,
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.baudrate == 0 {
            return Err(ConfigError::InvalidArgument {
                param: ConfigParam::BaudRate,
                value: 0,
            });
        }
        Ok(())
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        _9600_8_N_1
    }
}

/// 9600 baud, 8 data bits, no parity, 1 stop bit
pub const _9600_8_N_1: SerialConfig = SerialConfig {
    baudrate: 9600,
    data_bits: DataBits::Eight,
    stop_bits: StopBits::One,
    parity: Parity::None,
};

/// 19200 baud, 8 data bits, no parity, 1 stop bit
pub const _19200_8_N_1: SerialConfig = SerialConfig {
    baudrate: 19200,
    data_bits: DataBits::Eight,
    stop_bits: StopBits::One,
    parity: Parity::None,
};

/// 38400 baud, 8 data bits, no parity, 1 stop bit
pub const _38400_8_N_1: SerialConfig = SerialConfig {
    baudrate: 38400,
    data_bits: DataBits::Eight,
    stop_bits: StopBits::One,
    parity: Parity::None,
};

/// 57600 baud, 8 data bits, no parity, 1 stop bit
pub const _57600_8_N_1: SerialConfig = SerialConfig {
    baudrate: 57600,
    data_bits: DataBits::Eight,
    stop_bits: StopBits::One,
    parity: Parity::None,
};

/// 115200 baud, 8 data bits, no parity, 1 stop bit
pub const _115200_8_N_1: SerialConfig = SerialConfig {
    baudrate: 115200,
    data_bits: DataBits::Eight,
    stop_bits: StopBits::One,
    parity: Parity::None,
};
