//! Interactive tuning input.

use std::io::{self, BufRead, Write};

use spd_common::control::PidTuning;
use tracing::debug;

/// Tuning read from the operator plus the requested speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TuningInput {
    pub tuning: PidTuning,
    pub target_rpm: f64,
}

/// Print `prompt` and read one number, re-prompting until a line parses.
///
/// # Errors
///
/// `UnexpectedEof` when input ends before a number is read; other I/O
/// errors are passed through.
pub fn ask_f64<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> io::Result<f64> {
    let mut line = String::new();
    loop {
        write!(output, "{prompt}")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("input closed at prompt {:?}", prompt.trim()),
            ));
        }

        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        match text.parse::<f64>() {
            Ok(value) => return Ok(value),
            Err(_) => {
                debug!(input = text, "not a number");
                writeln!(output, "  (enter a number)")?;
            }
        }
    }
}

/// Ask for Kp, Ki, Kd, N, b, c, Kb and the target speed, in that order.
pub fn prompt_tuning<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<TuningInput> {
    let kp = ask_f64(input, output, "Kp: ")?;
    let ki = ask_f64(input, output, "Ki: ")?;
    let kd = ask_f64(input, output, "Kd: ")?;
    let n = ask_f64(input, output, "N (D-filter, a=1/N): ")?;
    let b = ask_f64(input, output, "b (P setpoint weight): ")?;
    let c = ask_f64(input, output, "c (D setpoint weight): ")?;
    let kb = ask_f64(input, output, "Kb (anti-windup 1/s): ")?;
    let target_rpm = ask_f64(input, output, "Target RPM: ")?;

    Ok(TuningInput {
        tuning: PidTuning {
            kp,
            ki,
            kd,
            n,
            b,
            c,
            kb,
        },
        target_rpm,
    })
}
