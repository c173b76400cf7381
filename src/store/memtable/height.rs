use rand::{Rng, RngCore};

/// Source of the uniform samples that drive node height assignment.
///
/// Every [`RngCore`] is a height source, so any `rand` generator can be
/// handed to a map. Tests implement it directly to pin exact heights.
pub trait HeightSource {
    /// Returns a sample in `[0, 1)`.
    fn next_unit(&mut self) -> f64;
}

impl<R: RngCore> HeightSource for R {
    #[inline]
    fn next_unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

// Geometric(0.5) height truncated at `max_level`: the smallest level >= 1
// with t * 2^level > 1. A zero sample lands on `max_level`.
pub(crate) fn new_level<S>(source: &mut S, max_level: usize) -> usize
where
    S: HeightSource + ?Sized,
{
    let t = source.next_unit();
    debug_assert!((0.0..1.0).contains(&t), "height sample {t} outside [0, 1)");

    let mut level = 1;
    let mut scale = 2.0;
    while level < max_level && t * scale <= 1.0 {
        level += 1;
        scale *= 2.0;
    }
    level
}

/// Replays a fixed list of samples, then falls back to `0.99` (height 1).
#[cfg(test)]
pub(crate) struct Scripted {
    samples: std::collections::VecDeque<f64>,
}

#[cfg(test)]
impl Scripted {
    pub(crate) fn new(samples: &[f64]) -> Self {
        Self {
            samples: samples.iter().copied().collect(),
        }
    }

    // Sample that yields exactly `height` when uncapped.
    pub(crate) fn for_height(height: usize) -> f64 {
        0.75 / (1u64 << (height - 1)) as f64
    }

    pub(crate) fn heights(heights: &[usize]) -> Self {
        Self {
            samples: heights.iter().map(|&h| Self::for_height(h)).collect(),
        }
    }
}

#[cfg(test)]
impl HeightSource for Scripted {
    fn next_unit(&mut self) -> f64 {
        self.samples.pop_front().unwrap_or(0.99)
    }
}
