/// Seed for every diagnostics sample. Fixed so repeated runs against the
/// same dataset snapshot produce bit-identical samples.
pub const DIAGNOSTIC_SEED: u64 = 42;

/// Module-local LCG so sampling stays reproducible across platforms and
/// releases; no external RNG is pulled in for this.
struct SampleRng {
    state: u64,
}

impl SampleRng {
    fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(1),
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }

    fn next_bounded(&mut self, bound: u64) -> u64 {
        self.next_u64() % bound
    }
}

/// Draw `k` distinct indices from `0..n` by partial Fisher-Yates. `k >= n`
/// degenerates to a permutation of the full range.
pub fn sample_indices(n: usize, k: usize, seed: u64) -> Vec<usize> {
    let k = k.min(n);
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = SampleRng::new(seed);
    for i in 0..k {
        let j = i + rng.next_bounded((n - i) as u64) as usize;
        indices.swap(i, j);
    }
    indices.truncate(k);
    indices
}

#[cfg(test)]
#[path = "../tests/src_inline/sample.rs"]
mod tests;
