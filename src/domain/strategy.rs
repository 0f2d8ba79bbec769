//! Strategy capability: observe a candle prefix, optionally emit a signal.

use super::candle::Candle;
use super::signal::Signal;

/// A trading strategy driven one bar at a time by the engine.
///
/// `prefix` is a non-empty prefix of the series with the most recent bar
/// last. Implementations must be deterministic given the prefix and call
/// history, and any emitted signal must have `volume > 0`.
pub trait Strategy {
    fn name(&self) -> &str;

    fn on_tick(&mut self, prefix: &[Candle]) -> Option<Signal>;
}

impl<S: Strategy + ?Sized> Strategy for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn on_tick(&mut self, prefix: &[Candle]) -> Option<Signal> {
        (**self).on_tick(prefix)
    }
}
