mod commands;
mod inventory;
mod terminal;

use commands::{CommandLine, Commands, check, info, locate};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose, commands.quiet);
    print::banner(commands.quiet);

    let result = match &commands.command {
        Commands::Info => {
            print::section("about the tool", commands.quiet);
            info::info(commands.quiet);
            Ok(())
        }
        Commands::Check { inventory } => {
            print::section("checking inventory", commands.quiet);
            check::check(inventory, commands.quiet)
        }
        Commands::Locate { ip } => {
            print::section("getting ready to trace", commands.quiet);
            locate::locate(*ip, &commands).await
        }
    };

    print::end_of_program();
    result
}
