use clap::Parser;
use e3dc_rs::export::{self, ExportRequest};
use e3dc_rs::model::{Credentials, DateRange, Resolution};
use e3dc_rs::{settings, Error};
use std::path::PathBuf;

/// Download historical records for a date range into a semicolon separated CSV file.
#[derive(Parser, Debug)]
#[command(name = "e3dc-export", version)]
struct Args {
    /// Serial number of the installation
    #[arg(long)]
    serial: String,
    /// First day, YYYY-MM-DD
    #[arg(long)]
    start: String,
    /// Last day (inclusive), YYYY-MM-DD
    #[arg(long)]
    end: String,
    /// CSV file to write; missing directories are created
    #[arg(long)]
    output: PathBuf,
    #[arg(long)]
    username: String,
    #[arg(long)]
    password: String,
    /// 15min, hour or day
    #[arg(long, default_value = "day")]
    resolution: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let args = Args::parse();
    let range = DateRange::parse(&args.start, &args.end)?;
    let resolution: Resolution = args.resolution.parse()?;
    let settings = settings::read_settings()?;

    let request = ExportRequest {
        credentials: Credentials {
            serial: args.serial,
            username: args.username,
            password: args.password,
        },
        range,
        resolution,
        output: args.output,
    };

    let summary = export::run(&settings.api(), &request).await?;
    println!("{}", summary);

    Ok(())
}
