mod args;
mod scrub;

use clap::Parser;
use log::LevelFilter;
use snafu::ErrorCompat;

fn main() {
    let args = args::Args::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if args.verbose {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();

    if let Err(e) = scrub::run_session(&args) {
        eprintln!("An error occured: {}", e);
        for cause in ErrorCompat::iter_chain(&e).skip(1) {
            eprintln!("  caused by: {}", cause);
        }
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
