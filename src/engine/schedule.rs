use super::state::{BoxSize, Key, PermutationState};
use tracing::debug;

/// Values captured during key scheduling: `snapshot[k]` is `S[k]` right
/// after the k-th swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot(Vec<usize>);

impl Snapshot {
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, k: usize) -> Option<usize> {
        self.0.get(k).copied()
    }
}

/// RC4 key-scheduling algorithm (KSA), runnable one iteration at a time.
///
/// Each call to [`KeyScheduler::step`] performs one keyed swap and returns the
/// value left at the swapped position, so a caller can replay and inspect the
/// schedule. [`KeyScheduler::finish`] runs the remaining iterations.
pub struct KeyScheduler<'k> {
    key: &'k Key,
    state: PermutationState,
    snapshot: Vec<usize>,
    k: usize,
    j: usize,
}

impl<'k> KeyScheduler<'k> {
    pub fn new(key: &'k Key, n: BoxSize) -> Self {
        Self {
            key,
            state: PermutationState::identity(n),
            snapshot: Vec::with_capacity(n.get()),
            k: 0,
            j: 0,
        }
    }

    /// Perform iteration `k`: `j = (j + S[k] + key[k mod len]) mod n`, swap
    /// `S[k]` and `S[j]`, record `S[k]`. Returns `None` once all `n`
    /// iterations have run.
    pub fn step(&mut self) -> Option<usize> {
        let n = self.state.s.len();
        let k = self.k;
        if k == n {
            return None;
        }

        self.j = (self.j + self.state.s[k] + usize::from(self.key.byte_at(k))) % n;
        self.state.s.swap(k, self.j);

        let value = self.state.s[k];
        self.snapshot.push(value);
        self.k += 1;
        Some(value)
    }

    /// Number of iterations already performed.
    pub fn iteration(&self) -> usize {
        self.k
    }

    pub fn is_finished(&self) -> bool {
        self.k == self.state.s.len()
    }

    /// Current S-box, mid-schedule.
    pub fn state(&self) -> &PermutationState {
        &self.state
    }

    pub fn finish(mut self) -> (PermutationState, Snapshot) {
        while self.step().is_some() {}
        debug_assert!(self.state.is_permutation());
        debug!(box_size = self.state.s.len(), "key schedule complete");
        (self.state, Snapshot(self.snapshot))
    }
}

/// Run the full key schedule for `key` over a box of size `n`.
///
/// The returned state has fresh generator pointers (`i = j = 0`).
pub fn schedule(key: &Key, n: BoxSize) -> (PermutationState, Snapshot) {
    KeyScheduler::new(key, n).finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(bytes: &[u8]) -> Key {
        Key::new(bytes).unwrap()
    }

    fn n(size: usize) -> BoxSize {
        BoxSize::new(size).unwrap()
    }

    #[test]
    fn test_schedule_small_box() {
        let (state, snapshot) = schedule(&key(&[1, 2, 3]), n(8));
        assert!(state.is_permutation());
        assert_eq!(snapshot.len(), 8);
        assert_eq!(state.as_slice(), &[2, 0, 1, 3, 7, 5, 6, 4]);
        assert_eq!(snapshot.as_slice(), &[1, 3, 1, 3, 7, 4, 6, 4]);
    }

    #[test]
    fn test_schedule_zero_key_box_four() {
        // S: [0,1,2,3] -> j=0 -> j=1 -> j=3 swap(2,3) -> j=1 swap(3,1)
        let (state, snapshot) = schedule(&key(&[0]), n(4));
        assert_eq!(state.as_slice(), &[0, 2, 3, 1]);
        assert_eq!(snapshot.as_slice(), &[0, 1, 3, 1]);
    }

    #[test]
    fn test_schedule_leaves_fresh_pointers() {
        let (state, _) = schedule(&key(b"Key"), BoxSize::default());
        assert_eq!((state.i(), state.j()), (0, 0));
    }

    #[test]
    fn test_step_replay_matches_snapshot() {
        let k = key(b"replay");
        let mut scheduler = KeyScheduler::new(&k, n(32));
        let mut observed = Vec::new();
        while !scheduler.is_finished() {
            let idx = scheduler.iteration();
            let value = scheduler.step().unwrap();
            assert_eq!(scheduler.state().get(idx), value);
            assert!(scheduler.state().is_permutation());
            observed.push(value);
        }
        assert_eq!(scheduler.step(), None);

        let (_, snapshot) = scheduler.finish();
        assert_eq!(snapshot.as_slice(), observed.as_slice());
        assert_eq!(snapshot, schedule(&k, n(32)).1);
    }

    #[test]
    fn test_box_of_one() {
        let (state, snapshot) = schedule(&key(&[7]), n(1));
        assert_eq!(state.as_slice(), &[0]);
        assert_eq!(snapshot.as_slice(), &[0]);
    }

    #[test]
    fn test_last_position_always_persists() {
        // Nothing swaps after the final iteration.
        for seed in 0u8..20 {
            let (state, snapshot) = schedule(&key(&[seed, seed ^ 0x5a, 3]), n(64));
            assert_eq!(state.get(63), snapshot.get(63).unwrap());
        }
    }
}
