//! Output sink writing report lines to stdout

use std::io::Write;

use statusbundle_framework::OutputSink;
use tracing::warn;

/// Sink that writes each line to stdout
#[derive(Clone, Copy, Debug, Default)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn emit_line(&self, line: &str) {
        // Lock once per line so concurrent writers never interleave within a line
        write_line(&mut std::io::stdout().lock(), line);
    }
}

fn write_line(writer: &mut impl Write, line: &str) {
    if let Err(e) = writeln!(writer, "{line}") {
        warn!("failed to write report line to stdout: {}", e);
    }
}
