use crate::model::TimePoint;

/// Closed interval `[start, end]`.
///
/// Construction does not enforce `start <= end`: candidate spans built while
/// validating a resize may be inverted, and [`Span::is_ordered`] reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span<T> {
    pub start: T,
    pub end: T,
}

impl<T: TimePoint> Span<T> {
    pub fn new(start: T, end: T) -> Self {
        Self { start, end }
    }

    /// The single-point span `[t, t]`.
    pub fn point(t: T) -> Self {
        Self { start: t, end: t }
    }

    pub fn is_ordered(&self) -> bool {
        self.start <= self.end
    }

    /// Closed-interval intersection: touching endpoints overlap.
    pub fn overlaps(&self, other: &Span<T>) -> bool {
        self.start <= other.end && self.end >= other.start
    }

    pub fn contains(&self, t: T) -> bool {
        self.start <= t && t <= self.end
    }

    /// `end - start`, or `None` on overflow.
    pub fn length(&self) -> Option<T::Shift> {
        self.start.shift_to(self.end)
    }

    /// Both edges translated by `by`; `None` if either leaves the axis.
    pub fn shifted_by(&self, by: T::Shift) -> Option<Self> {
        Some(Self {
            start: self.start.shifted(by)?,
            end: self.end.shifted(by)?,
        })
    }
}
