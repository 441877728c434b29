// Copyright (c) 2020 Huawei Technologies Co.,Ltd. All rights reserved.
//
// StratoVirt is licensed under Mulan PSL v2.
// You can use this software according to the terms and conditions of the Mulan
// PSL v2.
// You may obtain a copy of Mulan PSL v2 at:
//         http://license.coscl.org.cn/MulanPSL2
// THIS SOFTWARE IS PROVIDED ON AN "AS IS" BASIS, WITHOUT WARRANTIES OF ANY
// KIND, EITHER EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO
// NON-INFRINGEMENT, MERCHANTABILITY OR FIT FOR A PARTICULAR PURPOSE.
// See the Mulan PSL v2 for more details.

use std::fs::File;
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use std::sync::Mutex;
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result};
use log::{Level, LevelFilter, Log, Metadata, Record};
use nix::unistd::{getpid, gettid};

use crate::time::{get_format_time, gettime};

/// Environment variable selecting the log level.
pub const LOG_LEVEL_ENV: &str = "QEMU_ARCH_LOG_LEVEL";

// Max size of the log file is 10MB.
const LOG_ROTATE_SIZE_MAX: u64 = 10 * 1024 * 1024;
// Number of rotated log files kept besides the active one.
const LOG_ROTATE_COUNT_MAX: u32 = 4;

fn format_now() -> String {
    let (sec, nsec) = gettime().unwrap_or((0, 0));
    let t = get_format_time(sec);

    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:09}",
        t[0], t[1], t[2], t[3], t[4], t[5], nsec
    )
}

fn format_record(record: &Record) -> String {
    format!(
        "{}: [{}][{}][{}: {}]:{}: {}\n",
        format_now(),
        getpid().as_raw(),
        gettid().as_raw(),
        record.file().unwrap_or(""),
        record.line().unwrap_or(0),
        record.level(),
        record.args()
    )
}

/// Log sink, either stderr or a file rotated by size and by day.
struct LogSink {
    writer: Box<dyn Write + Send>,
    /// Empty when logging to stderr.
    path: String,
    written: u64,
    day: i32,
}

impl LogSink {
    fn stderr() -> Self {
        LogSink {
            writer: Box::new(std::io::stderr()),
            path: String::new(),
            written: 0,
            day: 0,
        }
    }

    fn file(path: &str) -> Result<Self> {
        let file = open_log_file(path)?;
        let metadata = file
            .metadata()
            .with_context(|| format!("Failed to get metadata of log file {}", path))?;
        let modified = metadata.modified()?.duration_since(UNIX_EPOCH)?.as_secs();

        Ok(LogSink {
            writer: Box::new(file),
            path: path.to_string(),
            written: metadata.len(),
            day: get_format_time(modified as i64)[2],
        })
    }

    fn write(&mut self, msg: &str) -> Result<()> {
        self.writer
            .write_all(msg.as_bytes())
            .with_context(|| "Failed to write log message")?;
        self.written += msg.len() as u64;
        self.rotate()
    }

    fn rotate(&mut self) -> Result<()> {
        if self.path.is_empty() {
            return Ok(());
        }

        let today = get_format_time(gettime()?.0)[2];
        if self.written < LOG_ROTATE_SIZE_MAX && self.day == today {
            return Ok(());
        }

        // Shift "log.N-1" to "log.N", dropping the oldest one.
        for idx in (1..LOG_ROTATE_COUNT_MAX).rev() {
            let from = format!("{}.{}", self.path, idx);
            if Path::new(&from).exists() {
                let to = format!("{}.{}", self.path, idx + 1);
                std::fs::rename(&from, &to)
                    .with_context(|| format!("Failed to rename log file {} to {}", from, to))?;
            }
        }
        let first = format!("{}.1", self.path);
        std::fs::rename(&self.path, &first)
            .with_context(|| format!("Failed to rename log file {} to {}", self.path, first))?;

        self.writer = Box::new(open_log_file(&self.path)?);
        self.written = 0;
        self.day = today;
        Ok(())
    }
}

struct ArchLogger {
    sink: Mutex<LogSink>,
    level: Level,
}

impl Log for ArchLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let msg = format_record(record);
        let mut sink = match self.sink.lock() {
            Ok(sink) => sink,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = sink.write(&msg) {
            eprintln!("Failed to log message: {:?}", e);
        }
    }

    fn flush(&self) {}
}

fn open_log_file(path: &str) -> Result<File> {
    std::fs::OpenOptions::new()
        .write(true)
        .append(true)
        .create(true)
        .mode(0o640)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path))
}

/// Parse a level name, falling back to `Info` for anything unknown.
pub fn parse_level(name: &str) -> Level {
    match name.to_lowercase().as_str() {
        "error" => Level::Error,
        "warn" => Level::Warn,
        "debug" => Level::Debug,
        "trace" => Level::Trace,
        _ => Level::Info,
    }
}

/// Install the global logger.
///
/// # Arguments
///
/// * `path` - Log file path, an empty string logs to stderr.
pub fn init_log(path: &str) -> Result<()> {
    let level = std::env::var(LOG_LEVEL_ENV)
        .map(|l| parse_level(&l))
        .unwrap_or(Level::Info);
    let sink = if path.is_empty() {
        LogSink::stderr()
    } else {
        LogSink::file(path)?
    };

    let logger = ArchLogger {
        sink: Mutex::new(sink),
        level,
    };
    log::set_boxed_logger(Box::new(logger))
        .map(|()| log::set_max_level(LevelFilter::Trace))
        .with_context(|| format!("Failed to init logger: {}", path))
}
