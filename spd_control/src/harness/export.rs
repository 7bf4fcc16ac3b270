//! Trace and report export.

use std::io::{self, Write};

use serde::Serialize;

use super::closed_loop::Trace;

/// Write a trace as CSV.
///
/// Columns: n, t, w, x_true, x_meas, spdcnt, y, duty
pub fn write_trace_csv<W: Write>(writer: &mut W, trace: &Trace) -> io::Result<()> {
    writeln!(writer, "n,t,w,x_true,x_meas,spdcnt,y,duty")?;
    for s in &trace.samples {
        writeln!(
            writer,
            "{},{:.4},{:.3},{:.6},{:.6},{},{:.9},{:.2}",
            s.n, s.t, s.w, s.x_true, s.x_meas, s.spdcnt, s.y, s.duty,
        )?;
    }
    Ok(())
}

/// Write the controller outputs one per line, in golden-trace format.
pub fn write_outputs<W: Write>(writer: &mut W, trace: &Trace) -> io::Result<()> {
    for s in &trace.samples {
        writeln!(writer, "{:.9}", s.y)?;
    }
    Ok(())
}

/// Write any report or trace as pretty JSON.
pub fn write_json<W: Write, T: Serialize + ?Sized>(
    writer: &mut W,
    value: &T,
) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer).map_err(serde_json::Error::io)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::TraceSample;
    use crate::trace::parse_trace;

    fn sample_trace() -> Trace {
        Trace {
            samples: vec![
                TraceSample {
                    n: 0,
                    t: 0.0,
                    w: 100.0,
                    x_true: 0.0,
                    x_meas: 0.0,
                    spdcnt: 0,
                    y: 11.04,
                    duty: 92.0,
                },
                TraceSample {
                    n: 1,
                    t: 0.005,
                    w: 100.0,
                    x_true: 2.76,
                    x_meas: 0.940_594,
                    spdcnt: 1,
                    y: 10.5,
                    duty: 87.5,
                },
            ],
        }
    }

    #[test]
    fn csv_has_header_and_rows() {
        let mut buf = Vec::new();
        write_trace_csv(&mut buf, &sample_trace()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "n,t,w,x_true,x_meas,spdcnt,y,duty");
        assert!(lines[2].starts_with("1,0.0050,100.000,"));
        assert_eq!(lines[2].split(',').count(), 8);
    }

    #[test]
    fn outputs_reload_as_golden_trace() {
        let trace = sample_trace();
        let mut buf = Vec::new();
        write_outputs(&mut buf, &trace).unwrap();
        let values = parse_trace(buf.as_slice()).unwrap();
        assert_eq!(values, trace.outputs());
    }

    #[test]
    fn json_lists_samples() {
        let mut buf = Vec::new();
        write_json(&mut buf, &sample_trace()).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed["samples"].as_array().map(Vec::len), Some(2));
        assert_eq!(parsed["samples"][1]["spdcnt"], 1);
    }
}
