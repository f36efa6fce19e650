use clap::{Parser, ValueEnum};
use spdlog::prelude::*;

#[derive(Parser)]
#[command(name = "airlens", about = "802.11 trace density and throughput analysis driver")]
struct Args {
    /// Logging verbosity on stderr; responses always go to stdout.
    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Info,
    Debug,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter = match args.log_level {
        LogLevel::Off => LevelFilter::Off,
        LogLevel::Info => LevelFilter::MoreSevereEqual(Level::Info),
        LogLevel::Debug => LevelFilter::MoreSevereEqual(Level::Debug),
    };
    spdlog::default_logger().set_level_filter(filter);

    info!("[System] airlens analysis driver ready");

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    airlens::driver::run_loop(stdin.lock(), &mut stdout.lock())?;

    info!("[System] input closed, shutting down");
    Ok(())
}
