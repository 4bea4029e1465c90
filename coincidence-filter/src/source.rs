use listmode_common::{Channel, ModuleId, Timestamp};
use std::io::BufRead;
use tracing::warn;

/// One line of list-mode data: a module (channel group), a sub-channel
/// within it, and a timestamp in detector ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ListEvent {
    pub(crate) module: ModuleId,
    pub(crate) channel: Channel,
    pub(crate) timestamp: Timestamp,
}

/// Pull interface for approximately time-ordered event data.
///
/// Returning `None` is terminal: implementations are fused, and the
/// engine never asks again once ingestion has ended.
pub(crate) trait EventSource {
    fn next_event(&mut self) -> Option<ListEvent>;
}

/// Reads whitespace-separated `module channel timestamp` triples, one
/// per line. Any read failure (end of data, a malformed line, or a
/// module id at or above the configured module count) permanently ends
/// the stream.
pub(crate) struct LineSource<R> {
    reader: R,
    module_count: usize,
    line: String,
    finished: bool,
}

impl<R: BufRead> LineSource<R> {
    pub(crate) fn new(mut reader: R, skip_lines: usize, module_count: usize) -> Self {
        let mut line = String::new();
        let mut finished = false;
        for skipped in 0..skip_lines {
            line.clear();
            match reader.read_line(&mut line) {
                Ok(0) => {
                    warn!("input ended after skipping {skipped} of {skip_lines} leading lines");
                    finished = true;
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("read error while skipping leading lines: {e}");
                    finished = true;
                    break;
                }
            }
        }
        Self {
            reader,
            module_count,
            line,
            finished,
        }
    }
}

impl<R: BufRead> EventSource for LineSource<R> {
    fn next_event(&mut self) -> Option<ListEvent> {
        if self.finished {
            return None;
        }
        loop {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => {
                    self.finished = true;
                    return None;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("read error in input data: {e}");
                    self.finished = true;
                    return None;
                }
            }
            if self.line.trim().is_empty() {
                continue;
            }
            let Some(event) = parse_line(&self.line) else {
                warn!("malformed input line: {:?}", self.line.trim_end());
                self.finished = true;
                return None;
            };
            if event.module as usize >= self.module_count {
                warn!(
                    "module id {} too high, check input or increase the module count (currently {})",
                    event.module, self.module_count
                );
                self.finished = true;
                return None;
            }
            return Some(event);
        }
    }
}

fn parse_line(line: &str) -> Option<ListEvent> {
    let mut fields = line.split_whitespace();
    let module = fields.next()?.parse().ok()?;
    let channel = fields.next()?.parse().ok()?;
    let timestamp = fields.next()?.parse().ok()?;
    if fields.next().is_some() {
        return None;
    }
    Some(ListEvent {
        module,
        channel,
        timestamp,
    })
}
