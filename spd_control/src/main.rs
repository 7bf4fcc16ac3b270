//! # Speed-Loop Controller Tool
//!
//! Derives hardware coefficients, simulates the closed speed loop and
//! validates it against a second controller or a captured golden trace.
//!
//! Exit status: 0 when the requested check passes, 1 on a tolerance
//! failure, 2 on a fatal error.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use spd_common::prelude::{AccumulationMode, DiscreteCoeffs, LogLevel, rpm_to_rad_per_sec};
use spd_common::registers::{f32_to_word, load_sequence};
use spd_control::bus::{MemoryBus, load_controller, read_speed_count, read_target_velocity};
use spd_control::control::reference::ReferencePid;
use spd_control::harness::export::{write_json, write_outputs, write_trace_csv};
use spd_control::harness::{ClosedLoop, Trace, compare_golden};
use spd_control::prompt::prompt_tuning;
use spd_control::trace::load_trace;
use spd_control::{HarnessError, SimulationConfig, build_delta, derive_coeffs};
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Speed-loop controller: coefficients, simulation and validation
#[derive(Parser, Debug)]
#[command(name = "spd_control")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Δ-form PID speed loop: coefficient derivation and closed-loop validation")]
struct Cli {
    /// Scenario TOML (defaults to the reference bench scenario).
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Derive the nine coefficients and show their register words.
    Coeffs,

    /// Run the closed loop and print or export the trace.
    Simulate {
        /// Number of samples (overrides harness.steps).
        #[arg(long)]
        steps: Option<usize>,
        /// Accumulation order (overrides harness.accumulation).
        #[arg(long, value_enum)]
        accumulation: Option<Accumulation>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,
        /// Write to a file instead of stdout.
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Cross-check the Δ-form controller against the reference PID.
    Compare {
        #[arg(long)]
        steps: Option<usize>,
        #[arg(long, value_enum)]
        accumulation: Option<Accumulation>,
        /// Write the full report as JSON.
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },

    /// Compare the closed loop against a golden output trace.
    Golden {
        /// Trace file (overrides harness.golden_path).
        trace: Option<PathBuf>,
        /// Use the hardware's baked-in coefficients instead of deriving.
        #[arg(long)]
        hardware_coeffs: bool,
        /// Absolute tolerance (overrides harness.abs_tol).
        #[arg(long)]
        tol: Option<f32>,
        #[arg(long)]
        accumulation: Option<Accumulation>,
        /// Write the full report as JSON.
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },

    /// Prompt for tuning, load it onto a simulated register bus and
    /// monitor the speed count.
    Tune {
        /// Number of monitored samples.
        #[arg(long, default_value_t = 20)]
        monitor: usize,
    },

    /// Print the effective configuration as TOML.
    Config,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Accumulation {
    StepRounded,
    Fused,
}

impl From<Accumulation> for AccumulationMode {
    fn from(a: Accumulation) -> Self {
        match a {
            Accumulation::StepRounded => AccumulationMode::StepRounded,
            Accumulation::Fused => AccumulationMode::Fused,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Table,
    Csv,
    Json,
    /// One output value per line (golden-trace format).
    Values,
}

fn main() {
    let cli = Cli::parse();
    let config = load_scenario(&cli);
    let configured_level = config.as_ref().ok().map(|c| c.shared.log_level);
    setup_tracing(&cli, configured_level);

    let outcome = config.and_then(|config| run(&cli, config));
    match outcome {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            error!("FATAL: {e}");
            process::exit(2);
        }
    }
}

fn load_scenario(cli: &Cli) -> Result<SimulationConfig, HarnessError> {
    match &cli.config {
        Some(path) => Ok(SimulationConfig::load_validated(path)?),
        None => Ok(SimulationConfig::default()),
    }
}

/// Execute the subcommand; `Ok(false)` means a check failed.
fn run(cli: &Cli, mut config: SimulationConfig) -> Result<bool, HarnessError> {
    if let Some(path) = &cli.config {
        info!("Loaded scenario {:?}", path);
    }

    match &cli.command {
        Command::Coeffs => cmd_coeffs(&config),
        Command::Simulate {
            steps,
            accumulation,
            format,
            output,
        } => {
            apply_overrides(&mut config, *steps, *accumulation);
            cmd_simulate(&config, *format, output.as_deref())
        }
        Command::Compare {
            steps,
            accumulation,
            report,
        } => {
            apply_overrides(&mut config, *steps, *accumulation);
            cmd_compare(&config, report.as_deref())
        }
        Command::Golden {
            trace,
            hardware_coeffs,
            tol,
            accumulation,
            report,
        } => {
            apply_overrides(&mut config, None, *accumulation);
            if let Some(tol) = tol {
                config.harness.abs_tol = *tol;
            }
            let path = trace
                .clone()
                .or_else(|| config.harness.golden_path.clone())
                .ok_or(HarnessError::NoGoldenTrace)?;
            cmd_golden(&config, &path, *hardware_coeffs, report.as_deref())
        }
        Command::Tune { monitor } => cmd_tune(&config, *monitor),
        Command::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(true)
        }
    }
}

fn apply_overrides(
    config: &mut SimulationConfig,
    steps: Option<usize>,
    accumulation: Option<Accumulation>,
) {
    if let Some(steps) = steps {
        config.harness.steps = steps;
    }
    if let Some(a) = accumulation {
        config.harness.accumulation = a.into();
    }
}

fn cmd_coeffs(config: &SimulationConfig) -> Result<bool, HarnessError> {
    let ts = config.sample_period();
    let coeffs = derive_coeffs(&config.tuning, ts);
    let hw = DiscreteCoeffs::HARDWARE_REFERENCE;

    println!(
        "Ts = {:.3} ms, {:.6} rad/s and {:.6} RPM per count",
        ts * 1e3,
        config.encoder.rad_per_sec_per_count(),
        config.encoder.rpm_per_count()
    );
    println!("{:<5} {:>14} {:>12} {:>12}", "coeff", "value", "word", "hw word");
    let names = ["a0", "c1", "c2", "c3", "c4", "c5", "c6", "c7a", "c7b"];
    for ((name, value), hw_word) in names
        .iter()
        .zip(coeffs.as_array())
        .zip(hw.to_bits())
    {
        println!(
            "{:<5} {:>14.7e} {:>#12x} {:>#12x}",
            name,
            value,
            f32_to_word(value),
            hw_word
        );
    }

    println!();
    for write in load_sequence(&coeffs, config.output.ysat, config.harness.setpoint) {
        println!("  [0x{:02X}] <- 0x{:08X}", write.offset, write.word);
    }

    if !coeffs.is_finite() {
        warn!("derived coefficients are not finite");
        return Ok(false);
    }
    Ok(true)
}

fn cmd_simulate(
    config: &SimulationConfig,
    format: Format,
    output: Option<&Path>,
) -> Result<bool, HarnessError> {
    let coeffs = derive_coeffs(&config.tuning, config.sample_period());
    let mut controller = build_delta(config.harness.accumulation, coeffs, config.output.ysat);
    let mut lp = ClosedLoop::from_config(config);
    let trace = lp.run(&mut controller, config.harness.steps);

    match output {
        Some(path) => {
            let mut w = BufWriter::new(File::create(path)?);
            write_trace(&mut w, &trace, format)?;
            w.flush()?;
            info!("Trace written to {:?}", path);
        }
        None => {
            let stdout = io::stdout();
            write_trace(&mut stdout.lock(), &trace, format)?;
        }
    }
    Ok(true)
}

fn write_trace<W: Write>(w: &mut W, trace: &Trace, format: Format) -> Result<(), HarnessError> {
    match format {
        Format::Table => {
            writeln!(
                w,
                "{:>5} {:>8} {:>10} {:>10} {:>7} {:>12} {:>7}",
                "n", "t[s]", "x_true", "x_meas", "spdcnt", "y[V]", "duty%"
            )?;
            for s in &trace.samples {
                writeln!(
                    w,
                    "{:>5} {:>8.4} {:>10.4} {:>10.4} {:>7} {:>12.6} {:>7.2}",
                    s.n, s.t, s.x_true, s.x_meas, s.spdcnt, s.y, s.duty
                )?;
            }
        }
        Format::Csv => write_trace_csv(w, trace)?,
        Format::Json => write_json(w, trace)?,
        Format::Values => write_outputs(w, trace)?,
    }
    Ok(())
}

fn cmd_compare(config: &SimulationConfig, report_path: Option<&Path>) -> Result<bool, HarnessError> {
    let ts = config.sample_period();
    let coeffs = derive_coeffs(&config.tuning, ts);
    let mut primary = build_delta(config.harness.accumulation, coeffs, config.output.ysat);
    let mut oracle = ReferencePid::new(&config.tuning, ts as f32, config.output.ysat);

    let mut lp = ClosedLoop::from_config(config);
    let (_, report) = lp.cross_check(
        &mut primary,
        &mut oracle,
        config.harness.steps,
        config.harness.tolerance(),
    );

    println!(
        "{} vs {}: {} samples, {} outside tolerance (abs {:e}, rel {:e})",
        report.primary,
        report.oracle,
        report.samples.len(),
        report.mismatch_count,
        report.tolerance.abs,
        report.tolerance.rel
    );
    match report.max_err_index {
        Some(n) => println!(
            "worst sample n={}: abs_err={:.3e} rel_err={:.3e}",
            n, report.max_abs_err, report.rel_err_at_max
        ),
        None => println!("outputs identical"),
    }

    if let Some(path) = report_path {
        let mut w = BufWriter::new(File::create(path)?);
        write_json(&mut w, &report)?;
        w.flush()?;
    }

    println!("{}", if report.passed() { "PASS" } else { "FAIL" });
    Ok(report.passed())
}

fn cmd_golden(
    config: &SimulationConfig,
    trace_path: &Path,
    hardware_coeffs: bool,
    report_path: Option<&Path>,
) -> Result<bool, HarnessError> {
    let reference = load_trace(trace_path)?;
    info!(values = reference.len(), "Loaded golden trace {:?}", trace_path);

    let coeffs = if hardware_coeffs {
        DiscreteCoeffs::HARDWARE_REFERENCE
    } else {
        derive_coeffs(&config.tuning, config.sample_period())
    };
    let mut controller = build_delta(config.harness.accumulation, coeffs, config.output.ysat);
    let mut lp = ClosedLoop::from_config(config);
    let trace = lp.run(&mut controller, config.harness.steps);

    let report = compare_golden(
        &trace.outputs(),
        &reference,
        config.harness.abs_tol,
        config.harness.max_reported_mismatches,
    );

    println!(
        "compared {} (reference {}, simulated {}): pass={} fail={}",
        report.compared, report.reference_count, report.simulated_count, report.pass, report.fail
    );
    for m in &report.mismatches {
        println!(
            "  n={:<4} sim={:.9} ref={:.9} |err|={:.3e}",
            m.index, m.simulated, m.reference, m.abs_err
        );
    }
    if let Some(n) = report.max_err_index {
        println!("max |err| = {:.3e} at n={}", report.max_abs_err, n);
    }

    if let Some(path) = report_path {
        let mut w = BufWriter::new(File::create(path)?);
        write_json(&mut w, &report)?;
        w.flush()?;
    }

    println!("{}", if report.passed() { "PASS" } else { "FAIL" });
    Ok(report.passed())
}

fn cmd_tune(config: &SimulationConfig, monitor: usize) -> Result<bool, HarnessError> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let input = prompt_tuning(&mut stdin.lock(), &mut stdout.lock())?;
    input.tuning.validate()?;

    let coeffs = derive_coeffs(&input.tuning, config.sample_period());
    let w_target = rpm_to_rad_per_sec(input.target_rpm as f32);
    let ysat = config.output.ysat;

    println!();
    println!("--- coefficients (Δ-form + 2-tap AW) ---");
    let names = ["a0", "c1", "c2", "c3", "c4", "c5", "c6", "c7a", "c7b"];
    for (name, value) in names.iter().zip(coeffs.as_array()) {
        println!("{name:<4}= {value:e}");
    }
    println!(
        "W_target = {:.6} rad/s (from {:.3} RPM)",
        w_target, input.target_rpm
    );
    println!("YSAT = {:.3}  1/YSAT = {:.6}", ysat, 1.0 / ysat);

    let mut bus = MemoryBus::new();
    load_controller(&mut bus, &coeffs, ysat, w_target)?;
    let readback = read_target_velocity(&bus)?;
    println!("W_target readback: {readback:.6}");

    let mut controller = build_delta(config.harness.accumulation, coeffs, ysat);
    let mut lp = ClosedLoop::from_config(config);
    lp.set_setpoint(readback);
    let trace = lp.run(&mut controller, monitor);

    let rpm_per_count = config.encoder.rpm_per_count();
    for s in &trace.samples {
        bus.latch_speed_count(s.spdcnt);
        let spdcnt = read_speed_count(&bus)?;
        println!(
            "n={:<5} spdcnt={:<6} RPM={:.2}",
            s.n,
            spdcnt,
            f32::from(spdcnt) * rpm_per_count
        );
    }

    Ok(readback.to_bits() == w_target.to_bits())
}

fn setup_tracing(cli: &Cli, configured: Option<LogLevel>) {
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        configured.map(Level::from).unwrap_or(Level::INFO)
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    // Logs go to stderr so trace exports on stdout stay clean.
    if cli.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .compact()
            .init();
    }
}
