use crate::{
    output::RowWriter,
    parameters::{Config, TimingWindows},
    source::EventSource,
    statistics::RunStatistics,
    window::{EventWindow, Slot},
};
use listmode_common::TimeDiff;
use std::io::{self, Write};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Filling,
    Scanning,
    Sliding,
    Draining,
    Done,
}

/// Streams events through a fixed-size window and emits one row per
/// trigger event that has at least one other module inside its timing
/// window. Memory use is bounded by the window capacity regardless of
/// stream length.
pub(crate) struct CoincidenceEngine<S, W> {
    config: Config,
    windows: TimingWindows,
    window: EventWindow,
    source: S,
    output: RowWriter<W>,
    stats: RunStatistics,
    phase: Phase,
    cursor: usize,
    /// Steps taken since ingestion ended; the run is over once this
    /// reaches the window capacity and every buffered event has been
    /// swept past the anchor position.
    drained: usize,
}

impl<S: EventSource, W: Write> CoincidenceEngine<S, W> {
    pub(crate) fn new(
        config: Config,
        windows: TimingWindows,
        source: S,
        output: RowWriter<W>,
    ) -> Self {
        let window = EventWindow::new(config.capacity);
        let stats = RunStatistics::new(config.module_count);
        Self {
            config,
            windows,
            window,
            source,
            output,
            stats,
            phase: Phase::Filling,
            cursor: 0,
            drained: 0,
        }
    }

    /// Runs the engine to completion and returns the final statistics.
    /// The only fatal failure is an output write error; source read
    /// failures of any kind end ingestion and drain the window.
    pub(crate) fn run(mut self) -> io::Result<RunStatistics> {
        loop {
            match self.phase {
                Phase::Filling => self.fill(),
                Phase::Scanning => self.scan()?,
                Phase::Sliding => self.slide(),
                Phase::Draining => self.drain(),
                Phase::Done => break,
            }
        }
        self.output.flush()?;
        Ok(self.stats)
    }

    /// The first half of the window is sentinel history, the second
    /// half comes from the source. A short read permanently truncates
    /// the window instead of failing, for compatibility with historic
    /// output on streams shorter than half the table.
    fn fill(&mut self) {
        for slot in self.window.half()..self.window.capacity() {
            match self.source.next_event() {
                Some(event) => {
                    self.stats.lines_read += 1;
                    self.stats.record_seen(event.module);
                    self.window.set(slot, Slot::Event(event));
                }
                None => {
                    debug!("input exhausted during fill, window truncated to {slot} slots");
                    self.window.truncate(slot);
                    break;
                }
            }
        }
        if self.window.capacity() > 1 {
            self.cursor = self.window.half();
            self.phase = Phase::Scanning;
        } else {
            self.phase = Phase::Done;
        }
    }

    fn scan(&mut self) -> io::Result<()> {
        let is_anchor = self
            .window
            .get(self.cursor)
            .event()
            .is_some_and(|event| event.module == self.config.trigger_module);
        if is_anchor {
            self.correlate()?;
        }
        if self.phase != Phase::Done {
            self.phase = if self.drained > 0 {
                Phase::Draining
            } else {
                Phase::Sliding
            };
        }
        Ok(())
    }

    /// The match scan, anchored at the cursor. Sweeps every other slot
    /// in forward order; a later qualifying event always replaces an
    /// earlier one for the same module, so the last match in scan
    /// order wins, not the closest in time.
    fn correlate(&mut self) -> io::Result<()> {
        let anchor = self.cursor;
        let Some(anchor_timestamp) = self.window.get(anchor).event().map(|e| e.timestamp) else {
            return Ok(());
        };

        let mut matches: Vec<Option<usize>> = vec![None; self.config.module_count];
        matches[self.config.trigger_module as usize] = Some(anchor);

        for offset in 1..self.window.capacity() {
            let index = self.window.wrap(anchor + offset);
            if index == anchor {
                continue;
            }
            let Some(candidate) = self.window.get(index).event() else {
                continue;
            };
            if candidate.module == self.config.trigger_module {
                continue;
            }
            let diff = candidate.timestamp.wrapping_sub(anchor_timestamp) as TimeDiff;
            if self.windows.contains(candidate.module, diff) {
                if let Some(entry) = matches.get_mut(candidate.module as usize) {
                    *entry = Some(index);
                }
            }
        }

        let matched = matches.iter().filter(|entry| entry.is_some()).count();
        if matched > 1 {
            self.output
                .write_row(&self.window, &matches, anchor_timestamp)?;
            self.stats.coincidences_found += 1;
            for (module, entry) in matches.iter().enumerate() {
                if entry.is_some() {
                    self.stats.record_matched(module);
                }
            }
            if self.config.max_output_rows != 0
                && self.stats.coincidences_found >= self.config.max_output_rows
            {
                debug!("row cap reached after {} coincidences", self.stats.coincidences_found);
                self.phase = Phase::Done;
            }
        }
        Ok(())
    }

    fn slide(&mut self) {
        match self.source.next_event() {
            Some(event) => {
                self.stats.lines_read += 1;
                self.stats.record_seen(event.module);
                self.window.insert_ahead_of(self.cursor, Slot::Event(event));
                self.advance();
                self.phase = Phase::Scanning;
            }
            None => {
                debug!("input exhausted, draining the window");
                self.drained = 1;
                self.advance();
                self.phase = Phase::Scanning;
            }
        }
    }

    fn drain(&mut self) {
        if self.drained >= self.window.capacity() {
            self.phase = Phase::Done;
            return;
        }
        self.drained += 1;
        self.window.insert_ahead_of(self.cursor, Slot::Blank);
        self.advance();
        self.phase = Phase::Scanning;
    }

    fn advance(&mut self) {
        self.cursor = self.window.wrap(self.cursor + 1);
    }
}
