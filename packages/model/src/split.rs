//! Seeded train/test splitting.

use rand::SeedableRng as _;
use rand::rngs::StdRng;
use rand::seq::SliceRandom as _;

/// Row indices assigned to each side of a split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffles `0..n` with a seeded RNG and holds out `test_fraction` of it.
///
/// The test size is rounded up, and clamped so at least one row is left
/// for training when `n > 0`. The same `(n, test_fraction, seed)` always
/// produces the same split.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> Split {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let fraction = test_fraction.clamp(0.0, 1.0);
    let test_len = ((n as f64) * fraction).ceil() as usize;
    let test_len = test_len.min(n.saturating_sub(1));

    let train = indices.split_off(test_len);
    Split {
        train,
        test: indices,
    }
}

/// Copies the items at `indices`, in index order.
#[must_use]
pub fn select<T: Clone>(items: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&i| items[i].clone()).collect()
}
