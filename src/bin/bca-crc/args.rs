use std::path::PathBuf;

use bca_crc::{DEFAULT_BCA_ADDRESS, parse_number};
use clap::Parser;

/// Update the Bootloader Configuration Area CRC of an S-record image.
#[derive(Debug, Parser)]
#[command(name = "bca-crc", version, about)]
pub struct Args {
    /// Source S-record file
    pub source: PathBuf,

    /// Address of the Bootloader Configuration Area (decimal or 0x hex)
    #[arg(
        short = 'b',
        long = "bca-address",
        value_name = "ADDR",
        value_parser = parse_number,
        default_value_t = DEFAULT_BCA_ADDRESS
    )]
    pub bca_address: u32,

    /// Output file, `-` for stdout
    #[arg(short, long, value_name = "FILE", default_value = "-")]
    pub output: PathBuf,

    /// Print debug information on stderr
    #[arg(short, long)]
    pub debug: bool,

    /// Check the stored CRC instead of writing a patched image
    #[arg(long, conflicts_with = "output")]
    pub verify: bool,
}

impl Args {
    /// Default log filter, overridden by `RUST_LOG`.
    pub fn log_filter(&self) -> &'static str {
        if self.debug { "debug" } else { "warn" }
    }
}
