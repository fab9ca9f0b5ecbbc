use crate::address::Geometry;
use crate::cache::WritePolicy;
use clap::Parser;
use std::env;
use std::process;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Decoded trace files to replay, one `{op} {hex_address}` record per line.
    pub trace_files: Vec<String>,

    #[arg(long, default_value_t = env_or_default_u64("SIM_TRIALS", 10))]
    pub trials: u64,

    #[arg(long, default_value_t = env_or_default_u64("SIM_L1_SIZE", 32768))]
    pub l1_size: u64,

    #[arg(long, default_value_t = env_or_default_u64("SIM_L1_LINE_SIZE", 64))]
    pub l1_line_size: u64,

    #[arg(long, default_value_t = env_or_default_u64("SIM_L2_SIZE", 262144))]
    pub l2_size: u64,

    #[arg(long, default_value_t = env_or_default_u64("SIM_L2_LINE_SIZE", 64))]
    pub l2_line_size: u64,

    #[arg(long, default_value_t = env_or_default_u64("SIM_L2_ASSOCIATIVITY", 4))]
    pub l2_associativity: u64,

    #[arg(long, value_enum, default_value_t = WritePolicy::WriteBack)]
    pub l1_write_policy: WritePolicy,

    #[arg(long, value_enum, default_value_t = WritePolicy::WriteBack)]
    pub l2_write_policy: WritePolicy,
}

impl Config {
    /// Refuse to start on a configuration the simulator cannot honor: a geometry whose field
    /// widths do not partition a 32-bit address would silently corrupt every statistic.
    pub fn validate(&self) {
        if self.trace_files.is_empty() {
            eprintln!("at least one trace file must be provided");
            process::exit(1);
        } else if self.trials == 0 {
            eprintln!("'trials' must be a non-zero value");
            process::exit(1);
        }

        if let Err(error) = Geometry::build(self.l1_size, self.l1_line_size, 1) {
            eprintln!("invalid l1 geometry: {}", error);
            process::exit(1);
        }
        if let Err(error) = Geometry::build(self.l2_size, self.l2_line_size, self.l2_associativity)
        {
            eprintln!("invalid l2 geometry: {}", error);
            process::exit(1);
        }
    }

    pub fn display(&self) {
        println!("simulation configuration values: ");
        println!("{:#?}", self);
    }
}

fn env_or_default_u64(varname: &str, default: u64) -> u64 {
    match env::var(varname) {
        Ok(val) => val
            .parse()
            .unwrap_or_else(|_| panic!("expected unsigned int for env var: '{}'", varname)),
        _ => default,
    }
}
