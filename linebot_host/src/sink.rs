//! Motor-command sinks.
//!
//! The runner emits every scheduled output through a sink handle it is
//! given, so tests can capture commands in memory while the binary writes
//! a log file or stdout. Models never see the sink.

use std::io::{self, Write};

use linebot_common::drive::MotorCommand;

use crate::trace::SimTime;

/// Destination for emitted values.
pub trait OutputSink<T> {
    fn emit(&mut self, time: SimTime, value: &T) -> io::Result<()>;
}

/// Plain-text sink, one line per emitted command:
///
/// ```text
/// 00:00:03:000 right_duty=0.50 right_polarity=0 left_duty=1.00 left_polarity=1
/// ```
///
/// Duty is printed with two decimals, polarity as the raw pin level.
#[derive(Debug)]
pub struct TextSink<W: Write> {
    writer: W,
    lines: u64,
}

impl<W: Write> TextSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, lines: 0 }
    }

    /// Lines written so far.
    #[inline]
    pub fn lines(&self) -> u64 {
        self.lines
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputSink<MotorCommand> for TextSink<W> {
    fn emit(&mut self, time: SimTime, command: &MotorCommand) -> io::Result<()> {
        writeln!(
            self.writer,
            "{time} right_duty={:.2} right_polarity={} left_duty={:.2} left_polarity={}",
            command.right.duty,
            u8::from(command.right.polarity),
            command.left.duty,
            u8::from(command.left.polarity),
        )?;
        self.lines += 1;
        Ok(())
    }
}
