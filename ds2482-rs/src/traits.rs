/// A monotonic millisecond clock.
///
/// The driver timestamps the start of a sensor conversion and compares
/// against this clock when polled, so callers never block for the full
/// conversion time. Implementations only need millisecond granularity; the
/// counter may wrap, elapsed time is computed with wrapping arithmetic.
pub trait Monotonic {
    /// Milliseconds elapsed since some fixed epoch.
    fn now_ms(&mut self) -> u32;
}
