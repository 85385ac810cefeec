mod args;
mod io;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use args::Args;

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_filter()))
        .init();

    let image = io::load_image(&args.source)
        .with_context(|| format!("failed to read {}", args.source.display()))?;

    if args.verify {
        let verification = bca_crc::verify_crc(&image, args.bca_address)?;
        if verification.matches() {
            println!("CRC OK: {:#010X}", verification.computed);
            return Ok(ExitCode::SUCCESS);
        }
        println!(
            "CRC mismatch: stored {:#010X}, computed {:#010X}",
            verification.record.expected_crc, verification.computed
        );
        return Ok(ExitCode::FAILURE);
    }

    let outcome = bca_crc::update_crc(&image, args.bca_address)?;
    if outcome.was_current() {
        info!("stored CRC {:#010X} already up to date", outcome.crc);
    }

    io::write_image(&outcome.image, &args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!(
        "CRC {:#010X} written at {:#X}",
        outcome.crc, outcome.slot.address
    );

    Ok(ExitCode::SUCCESS)
}
