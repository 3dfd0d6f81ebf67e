use std::path::{Path, PathBuf};

use frametrace::{TracerBackend, TracerSettings};

use crate::cli::{GlobalOptions, TraceOptionsArgs};

/// Build the tracer selected by the global options, configured from the trace arguments.
pub fn build_tracer(global: &GlobalOptions, trace_args: &TraceOptionsArgs) -> TracerBackend {
    TracerSettings {
        kind: global.tracer.into(),
        native: trace_args.into(),
        potrace: trace_args.potrace_options(global.potrace_bin.clone()),
    }
    .build()
}

/// Derive a variant file path by appending a suffix before the extension.
pub fn derive_variant_path(input: &Path, suffix: &str, extension: &str) -> PathBuf {
    let mut derived = input.to_path_buf();
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| suffix.to_string());
    let filename = format!("{}-{}.{}", stem, suffix, extension);
    derived.set_file_name(filename);
    derived
}

/// Derive an SVG file path by changing the extension to "svg".
pub fn derive_svg_path(input: &Path) -> PathBuf {
    let mut path = input.to_path_buf();
    path.set_extension("svg");
    path
}
