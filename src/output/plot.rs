use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;

/// Debug dump of the raw and filtered series
///
/// Each tick produces two lines, `<tick> <value> raw` and
/// `<tick> <value> filtered`, the layout the desktop plotting scripts read.
pub struct PlotRecorder<W: Write> {
    writer: W,
    lines: usize,
}

impl PlotRecorder<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        log::info!("Writing plot data to {}", path.as_ref().display());
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> PlotRecorder<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, lines: 0 }
    }

    pub fn record(&mut self, tick: u64, raw: u16, filtered: i32) -> Result<()> {
        writeln!(self.writer, "{} {} raw", tick, raw)?;
        writeln!(self.writer, "{} {} filtered", tick, filtered)?;
        self.lines += 2;
        Ok(())
    }

    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Gnuplot script plotting a file written by [`PlotRecorder`].
pub fn gnuplot_script(data_file: &str) -> String {
    format!(
        "set title 'ECG Data'\n\
         set xlabel 'Tick'\n\
         set ylabel 'Value'\n\
         set grid\n\
         plot '{data}' using 1:(strcol(3) eq 'raw' ? $2 : 1/0) with lines title 'Raw', \\\n\
         \x20    '{data}' using 1:(strcol(3) eq 'filtered' ? $2 : 1/0) with lines title 'Filtered'\n",
        data = data_file
    )
}
