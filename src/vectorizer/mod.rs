use crate::FrameTraceResult;
use crate::bitmap::Bitmap;
use crate::curve::Curve;

pub mod visioncortex;
#[cfg(feature = "vectorizer-potrace")]
pub mod potrace;

#[cfg(feature = "vectorizer-potrace")]
use self::potrace::{PotraceOptions, PotraceTracer};
use self::visioncortex::{TraceOptions, VisioncortexTracer};

/// A capability that turns a bitmap into outline curves.
///
/// Tracers outline the background ("ink") cells of the bitmap unless their
/// options ask for the foreground instead. Curves are returned in the order
/// the underlying engine produced them.
///
/// Holes are not subtracted: the outer boundary of a region and the boundary
/// of every hole inside it each come back as a separate curve, and the SVG
/// emitter fills each one on its own. A black ring therefore renders as a
/// solid disk.
pub trait Tracer {
    fn trace(&self, bitmap: &Bitmap) -> FrameTraceResult<Vec<Curve>>;
}

impl<T: Tracer + ?Sized> Tracer for &T {
    fn trace(&self, bitmap: &Bitmap) -> FrameTraceResult<Vec<Curve>> {
        (**self).trace(bitmap)
    }
}

impl<T: Tracer + ?Sized> Tracer for Box<T> {
    fn trace(&self, bitmap: &Bitmap) -> FrameTraceResult<Vec<Curve>> {
        (**self).trace(bitmap)
    }
}

/// Which tracing engine to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracerKind {
    /// In-process tracing with visioncortex.
    #[default]
    Native,
    /// The external `potrace` program.
    #[cfg(feature = "vectorizer-potrace")]
    Potrace,
}

/// Tracer selection plus the options of every backend.
#[derive(Debug, Clone, Default)]
pub struct TracerSettings {
    pub kind: TracerKind,
    pub native: TraceOptions,
    #[cfg(feature = "vectorizer-potrace")]
    pub potrace: PotraceOptions,
}

impl TracerSettings {
    pub fn with_kind(mut self, kind: TracerKind) -> Self {
        self.kind = kind;
        self
    }

    /// Instantiate the selected backend.
    pub fn build(&self) -> TracerBackend {
        match self.kind {
            TracerKind::Native => {
                TracerBackend::Native(VisioncortexTracer::new(self.native.clone()))
            }
            #[cfg(feature = "vectorizer-potrace")]
            TracerKind::Potrace => TracerBackend::Potrace(PotraceTracer::new(self.potrace.clone())),
        }
    }
}

/// One of the built-in tracers.
#[derive(Debug, Clone)]
pub enum TracerBackend {
    Native(VisioncortexTracer),
    #[cfg(feature = "vectorizer-potrace")]
    Potrace(PotraceTracer),
}

impl Default for TracerBackend {
    fn default() -> Self {
        TracerBackend::Native(VisioncortexTracer::default())
    }
}

impl Tracer for TracerBackend {
    fn trace(&self, bitmap: &Bitmap) -> FrameTraceResult<Vec<Curve>> {
        match self {
            TracerBackend::Native(tracer) => tracer.trace(bitmap),
            #[cfg(feature = "vectorizer-potrace")]
            TracerBackend::Potrace(tracer) => tracer.trace(bitmap),
        }
    }
}
