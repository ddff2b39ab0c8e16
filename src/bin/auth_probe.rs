use clap::Parser;
use e3dc_rs::model::Credentials;
use e3dc_rs::probe::{self, ProbeOutcome};
use e3dc_rs::settings;

/// Check that a set of portal credentials can open a session and read live values.
#[derive(Parser, Debug)]
#[command(name = "e3dc-auth-probe", version)]
struct Args {
    /// Serial number of the installation
    #[arg(long)]
    serial: String,
    #[arg(long)]
    user: String,
    #[arg(long)]
    password: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();

    let args = Args::parse();
    println!(
        "Testing connection for {} with user '{}'...",
        args.serial, args.user
    );

    let credentials = Credentials {
        serial: args.serial,
        username: args.user,
        password: args.password,
    };

    let outcome = match settings::read_settings() {
        Ok(settings) => probe::run(&settings.api(), &credentials).await,
        Err(e) => ProbeOutcome::Failed(e.to_string()),
    };

    println!("{}", outcome);
    std::process::exit(outcome.exit_code());
}
