//! Guarded index arithmetic shared by the data pointer and the
//! instruction pointer.
//!
//! A failed move leaves the index untouched; callers treat the failure as
//! fatal for the whole run.

/// A pointer move that would leave its valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum OutOfBounds {
    #[error("index {index} cannot advance past bound {bound}")]
    Overflow { index: usize, bound: usize },
    #[error("index cannot retreat below 0")]
    Underflow,
}

/// Advance `index` by one, failing if the result would reach `bound`.
pub fn guarded_increment(index: &mut usize, bound: usize) -> Result<(), OutOfBounds> {
    match index.checked_add(1) {
        Some(next) if next < bound => {
            *index = next;
            Ok(())
        }
        _ => Err(OutOfBounds::Overflow { index: *index, bound }),
    }
}

/// Retreat `index` by one, failing if it is already 0.
pub fn guarded_decrement(index: &mut usize) -> Result<(), OutOfBounds> {
    let Some(prev) = index.checked_sub(1) else {
        return Err(OutOfBounds::Underflow);
    };
    *index = prev;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increment_below_bound() {
        let mut i = 1;
        assert_eq!(guarded_increment(&mut i, 3), Ok(()));
        assert_eq!(i, 2);
    }

    #[test]
    fn increment_onto_bound_fails_and_keeps_index() {
        let mut i = 2;
        assert_eq!(
            guarded_increment(&mut i, 3),
            Err(OutOfBounds::Overflow { index: 2, bound: 3 })
        );
        assert_eq!(i, 2);
    }

    #[test]
    fn increment_with_zero_bound_fails() {
        let mut i = 0;
        assert!(guarded_increment(&mut i, 0).is_err());
    }

    #[test]
    fn decrement_at_zero_fails() {
        let mut i = 0;
        assert_eq!(guarded_decrement(&mut i), Err(OutOfBounds::Underflow));
        assert_eq!(i, 0);

        let mut j = 5;
        assert_eq!(guarded_decrement(&mut j), Ok(()));
        assert_eq!(j, 4);
    }
}
