mod archive;
mod convert;
mod run;
mod utils;

use crate::cli::{Cli, Commands, GlobalOptions};
use frametrace::FrameTraceResult;

/// The main function to run the command based on CLI input.
pub fn run(cli: Cli) -> FrameTraceResult<()> {
    let Cli { global, command } = cli;
    dispatch(&global, command)
}

/// Dispatch the command to the appropriate handler.
fn dispatch(global: &GlobalOptions, command: Commands) -> FrameTraceResult<()> {
    match command {
        Commands::Run(cmd) => run::run(global, cmd),
        Commands::Convert(cmd) => convert::run(global, cmd),
        Commands::Archive(cmd) => archive::run(cmd),
    }
}
