use frametrace::{FrameTrace, FrameTraceResult, PipelineConfig};

use crate::cli::{ConvertCommand, GlobalOptions};

use super::utils::{build_tracer, derive_svg_path, derive_variant_path};

/// The main function to run the convert command.
pub fn run(global: &GlobalOptions, cmd: ConvertCommand) -> FrameTraceResult<()> {
    let output_path = cmd
        .output
        .clone()
        .unwrap_or_else(|| derive_svg_path(&cmd.input));
    let mask_path = match &cmd.export_mask {
        Some(Some(path)) => Some(path.clone()),
        Some(None) => Some(derive_variant_path(&cmd.input, "mask", "png")),
        None => None,
    };

    let config = PipelineConfig::default()
        .with_threshold(cmd.threshold)
        .with_svg_options(cmd.trace_options.svg_options());
    let pipeline = FrameTrace::new(config).with_tracer(build_tracer(global, &cmd.trace_options));

    println!(
        "Converting {} -> {}",
        cmd.input.display(),
        output_path.display()
    );
    let curves = pipeline.convert_file(&cmd.input, &output_path, mask_path.as_deref())?;
    println!("SVG saved to {} ({curves} paths)", output_path.display());
    if let Some(path) = &mask_path {
        println!("Mask PNG saved to {}", path.display());
    }

    Ok(())
}
