use clap::Parser;

use gitcopy::cli::Cli;
use gitcopy::core::style;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = cli.run().await {
        eprintln!("{}", style::error(&format!("{:#}", err)));
        std::process::exit(1);
    }
}
