mod args;

use std::process::ExitCode;

use anyhow::{Context as _, Result};
use args::Args;
use clap::Parser as _;
use co2mini_reporter::acquisition::{self, AcquisitionError};
use co2mini_reporter::hid::Co2MiniDevice;
use co2mini_reporter::mqtt;
use tokio::time::Duration;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            match e.downcast_ref() {
                Some(AcquisitionError::TimedOut) => ExitCode::from(2),
                _ => ExitCode::from(1),
            }
        }
    }
}

async fn run(args: &Args) -> Result<()> {
    let mut device = Co2MiniDevice::open().context("failed to open CO2 sensor")?;

    let reading = acquisition::run(&mut device, Duration::from_secs(args.timeout_secs)).await?;
    drop(device);

    println!("temperature: {} °C", mqtt::temperature_payload(&reading));
    println!("co2: {} ppm", mqtt::co2_payload(&reading));

    if let Some(server) = &args.server {
        let credentials = args
            .user
            .as_deref()
            .map(|user| (user, args.password.as_deref().unwrap_or("")));

        // The reading is already acquired and printed; a failed publish is
        // reported but does not fail the run.
        if let Err(e) = mqtt::publish_reading(server, &args.topic, credentials, &reading).await {
            eprintln!("failed to publish reading: {e:#}");
        }
    }

    Ok(())
}
