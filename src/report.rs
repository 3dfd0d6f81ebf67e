use std::path::Path;

use frametrace::FrameTraceError;

pub fn report_error(err: &FrameTraceError) {
    eprintln!("{err}");
    if let Some(program) = unavailable_tracer(err) {
        eprintln!();
        eprintln!("Could not start `{}`.", program.display());
        eprintln!("  - Install potrace and make sure it is on PATH");
        eprintln!("  - Or point --potrace-bin / FRAMETRACE_POTRACE at the executable");
        eprintln!("  - Or use the built-in tracer with `--tracer native`");
    }
}

fn unavailable_tracer(err: &FrameTraceError) -> Option<&Path> {
    match err {
        FrameTraceError::TracerUnavailable { program, .. } => Some(program),
        FrameTraceError::Frame { source, .. } => unavailable_tracer(source),
        _ => None,
    }
}
