mod cli_exit;
mod cross_validation;
mod determinism;
mod encoder_conservation;
mod golden_trace;
mod saturation;
mod scenario_file;
