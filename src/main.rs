mod cli;

use clap::Parser;
use log::error;

use cli::Cli;
use swallow_lib::logger;

fn main() {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    if let Err(e) = cli.execute() {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
