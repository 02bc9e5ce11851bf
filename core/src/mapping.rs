use rand::Rng;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("surface index {index} out of range for {len} tiles")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Which grid position each surface currently shows.
///
/// Index is the surface identity, value is the row-major grid position. The
/// vector is always a permutation of `0..len`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TileMapping {
    positions: Vec<usize>,
    shuffled: bool,
}

impl TileMapping {
    pub fn new(len: usize) -> Self {
        let mut mapping = Self::default();
        mapping.reset(len);
        mapping
    }

    pub fn reset(&mut self, len: usize) {
        self.positions.clear();
        self.positions.extend(0..len);
        self.shuffled = false;
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.positions
    }

    pub fn position_of(&self, surface: usize) -> Option<usize> {
        self.positions.get(surface).copied()
    }

    pub fn has_been_shuffled(&self) -> bool {
        self.shuffled
    }

    pub fn is_identity(&self) -> bool {
        self.positions
            .iter()
            .enumerate()
            .all(|(surface, position)| surface == *position)
    }

    pub fn is_solved(&self) -> bool {
        self.shuffled && self.is_identity()
    }

    /// Fisher-Yates over the current arrangement.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.positions.is_empty() {
            return;
        }
        for i in (1..self.positions.len()).rev() {
            let j = rng.random_range(0..=i);
            self.positions.swap(i, j);
        }
        self.shuffled = true;
    }

    /// Returns `Ok(true)` when the two surfaces exchanged positions.
    pub fn swap(&mut self, a: usize, b: usize) -> Result<bool, MappingError> {
        let len = self.positions.len();
        for index in [a, b] {
            if index >= len {
                return Err(MappingError::IndexOutOfRange { index, len });
            }
        }
        if a == b {
            return Ok(false);
        }
        self.positions.swap(a, b);
        Ok(true)
    }
}

pub fn is_permutation(values: &[usize]) -> bool {
    let mut seen = vec![false; values.len()];
    for value in values {
        match seen.get_mut(*value) {
            Some(slot) if !*slot => *slot = true,
            _ => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn reset_builds_identity() {
        for len in [1usize, 4, 6, 15, 28] {
            let mapping = TileMapping::new(len);
            assert_eq!(mapping.as_slice(), (0..len).collect::<Vec<_>>().as_slice());
            assert!(!mapping.has_been_shuffled());
        }
    }

    #[test]
    fn fresh_mapping_is_not_solved() {
        let mapping = TileMapping::new(15);
        assert!(mapping.is_identity());
        assert!(!mapping.is_solved());
    }

    #[test]
    fn reset_clears_shuffled_gate() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut mapping = TileMapping::new(6);
        mapping.shuffle(&mut rng);
        mapping.reset(8);
        assert!(!mapping.has_been_shuffled());
        assert_eq!(mapping.len(), 8);
    }

    #[test]
    fn self_swap_is_noop() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut mapping = TileMapping::new(4);
        mapping.shuffle(&mut rng);
        let before = mapping.clone();
        let solved_before = mapping.is_solved();
        assert_eq!(mapping.swap(2, 2), Ok(false));
        assert_eq!(mapping, before);
        assert_eq!(mapping.is_solved(), solved_before);
    }

    #[test]
    fn out_of_range_swap_leaves_mapping() {
        let mut mapping = TileMapping::new(4);
        assert_eq!(
            mapping.swap(1, 4),
            Err(MappingError::IndexOutOfRange { index: 4, len: 4 })
        );
        assert!(mapping.is_identity());
    }

    #[test]
    fn empty_mapping_ignores_mutations() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut mapping = TileMapping::default();
        mapping.shuffle(&mut rng);
        assert!(mapping.is_empty());
        assert!(!mapping.has_been_shuffled());
        assert!(mapping.swap(0, 1).is_err());
    }

    #[test]
    fn shuffle_produces_permutation() {
        let mut rng = StdRng::seed_from_u64(0x5EED);
        let mut mapping = TileMapping::new(15);
        for _ in 0..200 {
            mapping.shuffle(&mut rng);
            assert!(is_permutation(mapping.as_slice()));
        }
        assert!(mapping.has_been_shuffled());
    }

    #[test]
    fn is_permutation_rejects_duplicates_and_gaps() {
        assert!(is_permutation(&[2, 0, 1]));
        assert!(!is_permutation(&[0, 0, 1]));
        assert!(!is_permutation(&[0, 1, 3]));
        assert!(is_permutation(&[]));
    }
}
