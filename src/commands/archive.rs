use frametrace::FrameTraceResult;

use crate::cli::ArchiveCommand;

/// The main function to run the archive command.
pub fn run(cmd: ArchiveCommand) -> FrameTraceResult<()> {
    let entries = frametrace::archive(&cmd.source, &cmd.output)?;
    println!("Archive saved to {} ({entries} files)", cmd.output.display());
    Ok(())
}
