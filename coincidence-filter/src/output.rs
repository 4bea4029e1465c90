use crate::{parameters::OutputMode, window::EventWindow};
use listmode_common::{TimeDiff, Timestamp};
use std::io::{self, Write};

/// Renders one coincidence per line: a field group per module in
/// increasing module order, tab-separated, newline-terminated.
/// Unmatched modules contribute one `0` per field the mode emits.
pub(crate) struct RowWriter<W> {
    writer: W,
    mode: OutputMode,
}

impl<W: Write> RowWriter<W> {
    pub(crate) fn new(writer: W, mode: OutputMode) -> Self {
        Self { writer, mode }
    }

    pub(crate) fn write_row(
        &mut self,
        window: &EventWindow,
        matches: &[Option<usize>],
        trigger_timestamp: Timestamp,
    ) -> io::Result<()> {
        let mut fields = Vec::with_capacity(matches.len() * 2);
        for entry in matches.iter().copied() {
            match entry.and_then(|index| window.get(index).event()) {
                Some(event) => match self.mode {
                    OutputMode::Raw => fields.push(event.channel.to_string()),
                    OutputMode::Timestamps => fields.push(event.timestamp.to_string()),
                    OutputMode::ChannelAndTime => {
                        fields.push(event.channel.to_string());
                        fields.push(event.timestamp.to_string());
                    }
                    OutputMode::ChannelAndTimediff => {
                        let diff = event.timestamp.wrapping_sub(trigger_timestamp) as TimeDiff;
                        fields.push(event.channel.to_string());
                        fields.push(diff.to_string());
                    }
                },
                None => {
                    fields.push("0".to_string());
                    if matches!(
                        self.mode,
                        OutputMode::ChannelAndTime | OutputMode::ChannelAndTimediff
                    ) {
                        fields.push("0".to_string());
                    }
                }
            }
        }
        writeln!(self.writer, "{}", fields.join("\t"))
    }

    pub(crate) fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        source::ListEvent,
        window::{EventWindow, Slot},
    };

    fn window_with_pair() -> EventWindow {
        let mut window = EventWindow::new(4);
        window.set(
            2,
            Slot::Event(ListEvent {
                module: 0,
                channel: 1,
                timestamp: 100,
            }),
        );
        window.set(
            3,
            Slot::Event(ListEvent {
                module: 1,
                channel: 2,
                timestamp: 102,
            }),
        );
        window
    }

    fn render(mode: OutputMode, matches: &[Option<usize>]) -> String {
        let window = window_with_pair();
        let mut out = Vec::new();
        RowWriter::new(&mut out, mode)
            .write_row(&window, matches, 100)
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn raw_mode_emits_channels() {
        assert_eq!(render(OutputMode::Raw, &[Some(2), Some(3)]), "1\t2\n");
    }

    #[test]
    fn timestamp_mode_emits_timestamps() {
        assert_eq!(
            render(OutputMode::Timestamps, &[Some(2), Some(3)]),
            "100\t102\n"
        );
    }

    #[test]
    fn combined_modes_emit_two_fields_per_module() {
        assert_eq!(
            render(OutputMode::ChannelAndTime, &[Some(2), Some(3)]),
            "1\t100\t2\t102\n"
        );
        assert_eq!(
            render(OutputMode::ChannelAndTimediff, &[Some(2), Some(3)]),
            "1\t0\t2\t2\n"
        );
    }

    #[test]
    fn unmatched_modules_render_zero_placeholders() {
        assert_eq!(render(OutputMode::Raw, &[Some(2), None]), "1\t0\n");
        assert_eq!(
            render(OutputMode::ChannelAndTimediff, &[Some(2), None]),
            "1\t0\t0\t0\n"
        );
    }

    #[test]
    fn timediff_can_be_negative() {
        let window = window_with_pair();
        let mut out = Vec::new();
        RowWriter::new(&mut out, OutputMode::ChannelAndTimediff)
            .write_row(&window, &[Some(2), Some(3)], 105)
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1\t-5\t2\t-3\n");
    }
}
