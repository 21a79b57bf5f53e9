//! Count bounds shared by the repeated and map builders.

use protoweave_core::SchemaError;

/// Optional lower/upper bounds on an element count.
///
/// Either bound may be set first. Setting a bound that inverts the pair
/// returns the error for the caller to record; the bound is stored anyway so
/// the last write wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CountBounds {
    bound: &'static str,
    min: Option<u64>,
    max: Option<u64>,
}

impl CountBounds {
    pub(crate) fn new(bound: &'static str) -> Self {
        Self {
            bound,
            min: None,
            max: None,
        }
    }

    pub(crate) fn min(&self) -> Option<u64> {
        self.min
    }

    pub(crate) fn max(&self) -> Option<u64> {
        self.max
    }

    pub(crate) fn set_min(&mut self, n: u64) -> Option<SchemaError> {
        self.min = Some(n);
        self.check()
    }

    pub(crate) fn set_max(&mut self, n: u64) -> Option<SchemaError> {
        self.max = Some(n);
        self.check()
    }

    fn check(&self) -> Option<SchemaError> {
        match (self.min, self.max) {
            (Some(min), Some(max)) if min > max => Some(SchemaError::BoundsInverted {
                bound: self.bound,
                min,
                max,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inversion_detected_in_either_order() {
        let mut b = CountBounds::new("items");
        assert!(b.set_min(5).is_none());
        assert!(b.set_max(2).is_some());

        let mut b = CountBounds::new("items");
        assert!(b.set_max(2).is_none());
        assert!(b.set_min(5).is_some());
    }

    #[test]
    fn test_equal_bounds_allowed() {
        let mut b = CountBounds::new("pairs");
        assert!(b.set_min(3).is_none());
        assert!(b.set_max(3).is_none());
        assert_eq!((b.min(), b.max()), (Some(3), Some(3)));
    }
}
