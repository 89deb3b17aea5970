use std::fmt;
use std::fs::File;
use std::io::{self, prelude::*};
use std::path::Path;
use std::time::Instant;

/// Append-style run log written to a file, with wall-clock offsets relative
/// to logger creation.
pub struct Logger {
    file: File,
    timer: Instant,
}

impl Logger {
    pub fn new<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Logger {
            file: File::create(path)?,
            timer: Instant::now(),
        })
    }

    pub fn info<M: fmt::Display>(&mut self, message: M) {
        self.log("info", message);
    }

    /// Starts a timing span; dropping the handle via `stop` records it.
    pub fn perf<'a, S: Into<String>>(&'a mut self, id: S) -> PerfHandle<'a> {
        PerfHandle {
            logger: self,
            id: id.into(),
            started: Instant::now(),
        }
    }

    fn log<M: fmt::Display>(&mut self, header: &str, message: M) {
        // A log line that cannot be written is not worth failing the run for.
        writeln!(
            self.file,
            "[{:>9.5}] {}: {}",
            self.timer.elapsed().as_secs_f32(),
            header,
            message
        )
        .ok();
    }
}

pub struct PerfHandle<'a> {
    logger: &'a mut Logger,
    id: String,
    started: Instant,
}

impl<'a> PerfHandle<'a> {
    pub fn stop(self) {
        let elapsed = self.started.elapsed().as_secs_f32();
        self.logger
            .log("perf", format!("\"{}\" took {:.5} secs", self.id, elapsed));
    }
}
