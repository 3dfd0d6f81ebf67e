use frametrace::{BatchEvent, FrameTrace, FrameTraceResult, PipelineConfig};
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::{GlobalOptions, RunCommand};

use super::utils::build_tracer;

/// The main function to run the batch pipeline.
pub fn run(global: &GlobalOptions, cmd: RunCommand) -> FrameTraceResult<()> {
    let archive_path = (!cmd.no_archive).then(|| cmd.archive.clone());
    let config = PipelineConfig::new(&cmd.input, &cmd.output)
        .with_archive_path(archive_path)
        .with_threshold(cmd.threshold)
        .with_recursive(cmd.recursive)
        .with_mask_dir(cmd.export_masks.clone())
        .with_svg_options(cmd.trace_options.svg_options());
    let pipeline = FrameTrace::new(config).with_tracer(build_tracer(global, &cmd.trace_options));

    let pb = if cmd.progress {
        ProgressBar::new(0)
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} frames ({eta})",
            )
            .expect("Invalid progress bar template")
            .progress_chars("#>-"),
    );

    let summary = pipeline.run(&mut |event| match event {
        BatchEvent::Started { total } => pb.set_length(*total as u64),
        BatchEvent::Converted {
            source,
            destination,
            ..
        } => {
            pb.suspend(|| {
                println!("Converting {} -> {}", source.display(), destination.display())
            });
            pb.inc(1);
        }
    });
    pb.finish_and_clear();
    let summary = summary?;

    match &summary.archive {
        Some((path, _)) => println!("Archive saved to {}", path.display()),
        None => println!(
            "Converted {} frames into {}",
            summary.frames,
            cmd.output.display()
        ),
    }

    Ok(())
}
