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

use log::{LevelFilter, Metadata, Record};
use std::{
    io::Write,
    sync::{Mutex, OnceLock, PoisonError},
    thread,
    time::Instant,
};

static LOGGER_MUTEX: Mutex<()> = Mutex::new(());
static START: OnceLock<Instant> = OnceLock::new();

struct Logger;

pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

///set max log level
pub fn set_max_level(level: LogLevel) {
    match level {
        LogLevel::Trace => log::set_max_level(LevelFilter::Trace),
        LogLevel::Debug => log::set_max_level(LevelFilter::Debug),
        LogLevel::Info => log::set_max_level(LevelFilter::Info),
        LogLevel::Warn => log::set_max_level(LevelFilter::Warn),
        LogLevel::Error => log::set_max_level(LevelFilter::Error),
    }
}

/// log init
///
/// Fails if another logger was installed first.
pub fn logger_init() -> Result<(), log::SetLoggerError> {
    static LOGGER: Logger = Logger {};
    START.get_or_init(Instant::now);
    log::set_logger(&LOGGER)?;
    if cfg!(debug_assertions) {
        log::set_max_level(LevelFilter::Trace);
    } else {
        log::set_max_level(LevelFilter::Warn);
    }
    Ok(())
}

fn uptime_millis() -> u128 {
    START.get_or_init(Instant::now).elapsed().as_millis()
}

///impl log for Logger
impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let timestamp = uptime_millis();
        let current = thread::current();
        let name = current.name().unwrap_or("-");
        let _guard = LOGGER_MUTEX.lock().unwrap_or_else(PoisonError::into_inner);
        // a closed stderr has nowhere to report to
        let _ = writeln!(
            std::io::stderr().lock(),
            "[T:{:09} TH:{}][{}] {} ",
            timestamp,
            name,
            record.level(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_once() {
        assert!(logger_init().is_ok());
        assert!(logger_init().is_err());

        set_max_level(LogLevel::Info);
        assert_eq!(log::max_level(), LevelFilter::Info);
        log::info!("logger up");
    }
}
