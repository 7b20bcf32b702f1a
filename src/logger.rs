//! Persisted logs (spec §6): append-only, line-oriented, column set fixed
//! at construction and never reordered. Generic over `io::Write` so tests
//! can log to an in-memory buffer instead of a file.

use std::io::{self, Write};

/// Chemical log: time, then one column per tracked species (spec §6).
pub struct ChemicalLogger<W: Write> {
    out: W,
    species: Vec<String>,
}

impl<W: Write> ChemicalLogger<W> {
    pub fn new(mut out: W, species: Vec<String>) -> io::Result<Self> {
        write!(out, "time")?;
        for name in &species {
            write!(out, ",{name}")?;
        }
        writeln!(out)?;
        Ok(ChemicalLogger { out, species })
    }

    pub fn log(&mut self, time: f64, counts: &[i64]) -> io::Result<()> {
        debug_assert_eq!(counts.len(), self.species.len());
        write!(self.out, "{time}")?;
        for c in counts {
            write!(self.out, ",{c}")?;
        }
        writeln!(self.out)
    }
}

/// Reaction log: time, then cumulative fire count per reaction (spec §6).
pub struct ReactionLogger<W: Write> {
    out: W,
    counts: Vec<u64>,
}

impl<W: Write> ReactionLogger<W> {
    pub fn new(mut out: W, n_reactions: usize) -> io::Result<Self> {
        write!(out, "time")?;
        for i in 0..n_reactions {
            write!(out, ",r{i}")?;
        }
        writeln!(out)?;
        Ok(ReactionLogger {
            out,
            counts: vec![0; n_reactions],
        })
    }

    /// Records one fire of `reaction` at `time` and writes the updated
    /// cumulative row.
    pub fn record(&mut self, time: f64, reaction: usize) -> io::Result<()> {
        self.counts[reaction] += 1;
        write!(self.out, "{time}")?;
        for c in &self.counts {
            write!(self.out, ",{c}")?;
        }
        writeln!(self.out)
    }
}

/// Double-strand log: per-position occupancy snapshots (spec §6).
pub struct DoubleStrandLogger<W: Write> {
    out: W,
}

impl<W: Write> DoubleStrandLogger<W> {
    pub fn new(mut out: W, length: u64) -> io::Result<Self> {
        write!(out, "time")?;
        for p in 0..length {
            write!(out, ",p{p}")?;
        }
        writeln!(out)?;
        Ok(DoubleStrandLogger { out })
    }

    pub fn log(&mut self, time: f64, occupancy: &[u32]) -> io::Result<()> {
        write!(self.out, "{time}")?;
        for h in occupancy {
            write!(self.out, ",{h}")?;
        }
        writeln!(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chemical_log_header_then_rows() {
        let mut buf = Vec::new();
        {
            let mut logger =
                ChemicalLogger::new(&mut buf, vec!["A".into(), "B".into()]).unwrap();
            logger.log(0.0, &[10, 0]).unwrap();
            logger.log(1.5, &[9, 1]).unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("time,A,B"));
        assert_eq!(lines.next(), Some("0,10,0"));
        assert_eq!(lines.next(), Some("1.5,9,1"));
    }

    #[test]
    fn reaction_log_tracks_cumulative_counts() {
        let mut buf = Vec::new();
        {
            let mut logger = ReactionLogger::new(&mut buf, 2).unwrap();
            logger.record(0.1, 0).unwrap();
            logger.record(0.3, 0).unwrap();
            logger.record(0.4, 1).unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("time,r0,r1"));
        assert_eq!(lines.next(), Some("0.1,1,0"));
        assert_eq!(lines.next(), Some("0.3,2,0"));
        assert_eq!(lines.next(), Some("0.4,2,1"));
    }
}
