use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::bitmap::binarize;
use crate::config::PipelineConfig;
use crate::curve::Curve;
use crate::frame::Frame;
use crate::svg::{SvgOptions, emit_with};
use crate::vectorizer::Tracer;
use crate::{FrameTraceError, FrameTraceResult};

/// An input frame found in the input directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameEntry {
    /// Full path of the PNG file.
    pub source: PathBuf,
    /// Path relative to the input directory.
    pub relative: PathBuf,
}

/// Progress notifications emitted while a batch runs.
#[derive(Debug, Clone, Copy)]
pub enum BatchEvent<'a> {
    /// Frames have been enumerated; conversion is about to start.
    Started { total: usize },
    /// One frame has been written.
    Converted {
        index: usize,
        total: usize,
        source: &'a Path,
        destination: &'a Path,
        curves: usize,
    },
}

/// Whether the path has a `.png` extension, ignoring case.
pub fn is_png(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
}

/// List the PNG frames of `input_dir`, sorted by relative path.
pub fn list_frames(input_dir: &Path, recursive: bool) -> FrameTraceResult<Vec<FrameEntry>> {
    let mut walker = WalkDir::new(input_dir)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut frames = Vec::new();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_png(entry.path()) {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(input_dir)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| PathBuf::from(entry.file_name()));
        frames.push(FrameEntry {
            source: entry.into_path(),
            relative,
        });
    }
    frames.sort_by(|a, b| a.relative.cmp(&b.relative));
    Ok(frames)
}

/// Output location for a frame: same relative path, `.svg` extension.
pub fn svg_path_for(output_dir: &Path, relative: &Path) -> PathBuf {
    output_dir.join(relative).with_extension("svg")
}

/// Fail when two frames map to the same output file, e.g. `a.png` and `a.PNG`.
pub fn check_destinations(frames: &[FrameEntry], output_dir: &Path) -> FrameTraceResult<()> {
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::with_capacity(frames.len());
    for frame in frames {
        let destination = svg_path_for(output_dir, &frame.relative);
        if let Some(first) = claimed.get(&destination) {
            return Err(FrameTraceError::OutputCollision {
                first: first.to_path_buf(),
                second: frame.source.clone(),
                destination,
            });
        }
        claimed.insert(destination, &frame.source);
    }
    Ok(())
}

/// Binarize and trace one frame.
pub fn trace_frame<T>(frame: &Frame, threshold: u8, tracer: &T) -> FrameTraceResult<Vec<Curve>>
where
    T: Tracer + ?Sized,
{
    let bitmap = binarize(frame, threshold);
    debug!(
        path = %frame.path().display(),
        foreground = bitmap.foreground_count(),
        "binarized frame"
    );
    tracer.trace(&bitmap)
}

/// Binarize, trace and serialize one frame.
pub fn frame_to_svg<T>(
    frame: &Frame,
    threshold: u8,
    tracer: &T,
    svg: &SvgOptions,
) -> FrameTraceResult<(String, usize)>
where
    T: Tracer + ?Sized,
{
    let curves = trace_frame(frame, threshold, tracer)?;
    let document = emit_with(&curves, frame.width(), frame.height(), svg);
    Ok((document, curves.len()))
}

/// Convert the file at `source` and write the SVG to `destination`.
///
/// Returns the number of curves written.
pub fn convert_file<T>(
    source: &Path,
    destination: &Path,
    config: &PipelineConfig,
    mask_path: Option<&Path>,
    tracer: &T,
) -> FrameTraceResult<usize>
where
    T: Tracer + ?Sized,
{
    let frame = Frame::open(source)?;
    if let Some(mask_path) = mask_path {
        ensure_parent_dir(mask_path)?;
        binarize(&frame, config.threshold)
            .to_gray_image()
            .save(mask_path)?;
        debug!(mask = %mask_path.display(), "mask exported");
    }

    let (document, curves) = frame_to_svg(&frame, config.threshold, tracer, &config.svg)?;
    ensure_parent_dir(destination)?;
    fs::write(destination, document).map_err(|e| FrameTraceError::file_io(destination, e))?;
    Ok(curves)
}

fn ensure_parent_dir(path: &Path) -> FrameTraceResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| FrameTraceError::file_io(parent, e))?;
    }
    Ok(())
}

/// Convert every frame of `config.input_dir` into `config.output_dir`.
///
/// Frames are processed one at a time in sorted order; the first failure
/// aborts the run, leaving the SVGs written so far on disk. Frames that would
/// share an output file are rejected before anything is written.
/// Returns the number of frames converted.
pub fn run<T>(
    config: &PipelineConfig,
    tracer: &T,
    on_event: &mut dyn FnMut(&BatchEvent<'_>),
) -> FrameTraceResult<usize>
where
    T: Tracer + ?Sized,
{
    let frames = list_frames(&config.input_dir, config.recursive)?;
    let total = frames.len();
    info!(
        input = %config.input_dir.display(),
        frames = total,
        "starting batch"
    );

    check_destinations(&frames, &config.output_dir)?;

    fs::create_dir_all(&config.output_dir)
        .map_err(|e| FrameTraceError::file_io(&config.output_dir, e))?;
    on_event(&BatchEvent::Started { total });

    for (index, frame) in frames.iter().enumerate() {
        let destination = svg_path_for(&config.output_dir, &frame.relative);
        let mask_path = config
            .mask_dir
            .as_ref()
            .map(|dir| dir.join(&frame.relative).with_extension("png"));

        let curves = convert_file(
            &frame.source,
            &destination,
            config,
            mask_path.as_deref(),
            tracer,
        )
        .map_err(|e| e.in_frame(&frame.source))?;

        info!(
            source = %frame.source.display(),
            destination = %destination.display(),
            curves,
            "converted frame"
        );
        on_event(&BatchEvent::Converted {
            index,
            total,
            source: &frame.source,
            destination: &destination,
            curves,
        });
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::bitmap::Bitmap;
    use crate::curve::Point;
    use image::{GrayImage, Luma};
    use std::cell::RefCell;

    /// One square curve per frame, sized after the bitmap; records call order.
    #[derive(Default)]
    struct FakeTracer {
        calls: RefCell<Vec<(u32, u32)>>,
    }

    impl Tracer for FakeTracer {
        fn trace(&self, bitmap: &Bitmap) -> FrameTraceResult<Vec<Curve>> {
            self.calls.borrow_mut().push(bitmap.dimensions());
            let (w, h) = (bitmap.width() as f64, bitmap.height() as f64);
            Ok(Curve::polygon([
                Point::new(0.0, 0.0),
                Point::new(w, 0.0),
                Point::new(w, h),
            ])
            .into_iter()
            .collect())
        }
    }

    struct FailingTracer;

    impl Tracer for FailingTracer {
        fn trace(&self, _bitmap: &Bitmap) -> FrameTraceResult<Vec<Curve>> {
            Err(FrameTraceError::Trace("engine exploded".into()))
        }
    }

    fn write_png(path: &Path, w: u32, h: u32) {
        GrayImage::from_pixel(w, h, Luma([255])).save(path).unwrap();
    }

    mod is_png {
        use super::*;

        #[test]
        fn extension_case_is_ignored() {
            assert!(is_png(Path::new("a.png")));
            assert!(is_png(Path::new("b.PNG")));
            assert!(is_png(Path::new("c.Png")));
            assert!(!is_png(Path::new("c.txt")));
            assert!(!is_png(Path::new("png")));
            assert!(!is_png(Path::new("a.png.bak")));
        }
    }

    mod list_frames {
        use super::*;

        #[test]
        fn filters_and_sorts() {
            let dir = tempfile::tempdir().expect("failed to create temp dir");
            write_png(&dir.path().join("b.PNG"), 2, 2);
            write_png(&dir.path().join("a.png"), 2, 2);
            fs::write(dir.path().join("c.txt"), "not a frame").unwrap();

            let frames = list_frames(dir.path(), false).unwrap();
            let names: Vec<_> = frames.iter().map(|f| f.relative.clone()).collect();
            assert_eq!(names, vec![PathBuf::from("a.png"), PathBuf::from("b.PNG")]);
        }

        #[test]
        fn subdirectories_only_when_recursive() {
            let dir = tempfile::tempdir().expect("failed to create temp dir");
            fs::create_dir(dir.path().join("scene")).unwrap();
            write_png(&dir.path().join("scene").join("f1.png"), 2, 2);
            write_png(&dir.path().join("top.png"), 2, 2);

            assert_eq!(list_frames(dir.path(), false).unwrap().len(), 1);
            let frames = list_frames(dir.path(), true).unwrap();
            let names: Vec<_> = frames.iter().map(|f| f.relative.clone()).collect();
            assert_eq!(
                names,
                vec![PathBuf::from("scene").join("f1.png"), PathBuf::from("top.png")]
            );
        }

        #[test]
        fn missing_directory_is_io_error() {
            let dir = tempfile::tempdir().expect("failed to create temp dir");
            let err = list_frames(&dir.path().join("nope"), false).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Io);
        }
    }

    mod svg_path_for {
        use super::*;

        #[test]
        fn replaces_extension() {
            assert_eq!(
                svg_path_for(Path::new("out"), Path::new("frame001.png")),
                PathBuf::from("out").join("frame001.svg")
            );
            assert_eq!(
                svg_path_for(Path::new("out"), Path::new("shot.v2.PNG")),
                PathBuf::from("out").join("shot.v2.svg")
            );
        }
    }

    mod run {
        use super::*;

        #[test]
        fn converts_pngs_in_order() {
            let dir = tempfile::tempdir().expect("failed to create temp dir");
            let input = dir.path().join("frames");
            fs::create_dir(&input).unwrap();
            write_png(&input.join("b.PNG"), 3, 3);
            write_png(&input.join("a.png"), 2, 2);
            fs::write(input.join("c.txt"), "skip me").unwrap();
            let output = dir.path().join("out");
            let config = PipelineConfig::new(&input, &output);

            let tracer = FakeTracer::default();
            let mut seen = Vec::new();
            let count = run(&config, &tracer, &mut |event| {
                if let BatchEvent::Converted { source, destination, .. } = event {
                    seen.push((
                        source.file_name().unwrap().to_owned(),
                        destination.file_name().unwrap().to_owned(),
                    ));
                }
            })
            .unwrap();

            assert_eq!(count, 2);
            assert_eq!(*tracer.calls.borrow(), vec![(2, 2), (3, 3)]);
            assert_eq!(seen.len(), 2);
            assert_eq!(seen[0].0, "a.png");
            assert_eq!(seen[0].1, "a.svg");
            assert_eq!(seen[1].0, "b.PNG");
            assert_eq!(seen[1].1, "b.svg");

            let svg = fs::read_to_string(output.join("b.svg")).unwrap();
            assert!(svg.contains(r#"viewBox="0 0 3 3""#));
            assert!(svg.contains(r#"<path d="M 0 0 L 3 0 L 3 3" fill="black" stroke="none"/>"#));
            assert!(!output.join("c.svg").exists());
        }

        #[test]
        fn started_event_reports_total() {
            let dir = tempfile::tempdir().expect("failed to create temp dir");
            write_png(&dir.path().join("only.png"), 1, 1);
            let config = PipelineConfig::new(dir.path(), dir.path().join("out"));

            let mut total_seen = None;
            run(&config, &FakeTracer::default(), &mut |event| {
                if let BatchEvent::Started { total } = event {
                    total_seen = Some(*total);
                }
            })
            .unwrap();
            assert_eq!(total_seen, Some(1));
        }

        #[test]
        fn empty_input_creates_output_dir() {
            let dir = tempfile::tempdir().expect("failed to create temp dir");
            let input = dir.path().join("frames");
            fs::create_dir(&input).unwrap();
            let output = dir.path().join("nested").join("out");
            let config = PipelineConfig::new(&input, &output);

            let count = run(&config, &FakeTracer::default(), &mut |_| {}).unwrap();
            assert_eq!(count, 0);
            assert!(output.is_dir());
        }

        #[test]
        fn tracer_failure_names_the_frame() {
            let dir = tempfile::tempdir().expect("failed to create temp dir");
            write_png(&dir.path().join("a.png"), 2, 2);
            let config = PipelineConfig::new(dir.path(), dir.path().join("out"));

            let err = run(&config, &FailingTracer, &mut |_| {}).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Tracing);
            assert!(err.to_string().contains("a.png"));
            assert!(!dir.path().join("out").join("a.svg").exists());
        }

        #[test]
        fn case_variants_of_one_name_are_rejected() {
            let dir = tempfile::tempdir().expect("failed to create temp dir");
            let input = dir.path().join("frames");
            fs::create_dir(&input).unwrap();
            write_png(&input.join("a.png"), 2, 2);
            write_png(&input.join("a.PNG"), 2, 2);
            let output = dir.path().join("out");
            let config = PipelineConfig::new(&input, &output);

            let frames = list_frames(&input, false).unwrap();
            if frames.len() < 2 {
                // Case-insensitive file system: only one file exists.
                return;
            }
            let tracer = FakeTracer::default();
            let err = run(&config, &tracer, &mut |_| {}).unwrap_err();
            assert!(matches!(err, FrameTraceError::OutputCollision { .. }));
            assert_eq!(err.kind(), ErrorKind::Io);
            let message = err.to_string();
            assert!(message.contains("a.png") && message.contains("a.PNG"));
            assert!(tracer.calls.borrow().is_empty());
            assert!(!output.join("a.svg").exists());
        }

        #[test]
        fn same_stem_with_different_case_collides() {
            let frames = vec![
                FrameEntry {
                    source: PathBuf::from("in/a.PNG"),
                    relative: PathBuf::from("a.PNG"),
                },
                FrameEntry {
                    source: PathBuf::from("in/a.png"),
                    relative: PathBuf::from("a.png"),
                },
            ];
            let err = check_destinations(&frames, Path::new("out")).unwrap_err();
            match err {
                FrameTraceError::OutputCollision {
                    first,
                    second,
                    destination,
                } => {
                    assert_eq!(first, PathBuf::from("in/a.PNG"));
                    assert_eq!(second, PathBuf::from("in/a.png"));
                    assert_eq!(destination, PathBuf::from("out").join("a.svg"));
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn distinct_stems_do_not_collide() {
            let frames = vec![
                FrameEntry {
                    source: PathBuf::from("in/a.png"),
                    relative: PathBuf::from("a.png"),
                },
                FrameEntry {
                    source: PathBuf::from("in/sub/a.png"),
                    relative: PathBuf::from("sub").join("a.png"),
                },
            ];
            assert!(check_destinations(&frames, Path::new("out")).is_ok());
        }

        #[test]
        fn masks_are_exported() {
            let dir = tempfile::tempdir().expect("failed to create temp dir");
            let input = dir.path().join("frames");
            fs::create_dir(&input).unwrap();
            write_png(&input.join("a.png"), 4, 2);
            let masks = dir.path().join("masks");
            let config = PipelineConfig::new(&input, dir.path().join("out"))
                .with_mask_dir(Some(masks.clone()));

            run(&config, &FakeTracer::default(), &mut |_| {}).unwrap();
            let mask = image::open(masks.join("a.png")).unwrap().to_luma8();
            assert_eq!(mask.dimensions(), (4, 2));
            assert!(mask.pixels().all(|p| p.0[0] == 255));
        }

        #[test]
        fn recursive_mirrors_subdirectories() {
            let dir = tempfile::tempdir().expect("failed to create temp dir");
            let input = dir.path().join("frames");
            fs::create_dir_all(input.join("shot1")).unwrap();
            write_png(&input.join("shot1").join("f.png"), 2, 2);
            let output = dir.path().join("out");
            let config = PipelineConfig::new(&input, &output).with_recursive(true);

            assert_eq!(run(&config, &FakeTracer::default(), &mut |_| {}).unwrap(), 1);
            assert!(output.join("shot1").join("f.svg").is_file());
        }
    }
}
