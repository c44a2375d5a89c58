use super::state::PermutationState;

impl PermutationState {
    /// One step of the RC4 pseudo-random generation algorithm (PRGA).
    ///
    /// Advances `i` and `j`, swaps `S[i]` and `S[j]`, and returns
    /// `S[(S[i] + S[j]) mod n]`. The result is always in `0..n`.
    pub fn next_output(&mut self) -> usize {
        let n = self.s.len();
        self.i = (self.i + 1) % n;
        self.j = (self.j + self.s[self.i]) % n;
        self.s.swap(self.i, self.j);
        self.s[(self.s[self.i] + self.s[self.j]) % n]
    }
}

/// Unbounded keystream drawn from a scheduled [`PermutationState`].
///
/// The iterator never returns `None`; use `take` or `zip` to bound it. It can
/// only be restarted by scheduling the key again.
#[derive(Debug, Clone)]
pub struct Keystream {
    state: PermutationState,
}

impl Keystream {
    pub fn new(state: PermutationState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &PermutationState {
        &self.state
    }

    pub fn into_state(self) -> PermutationState {
        self.state
    }
}

impl Iterator for Keystream {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        Some(self.state.next_output())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::schedule::schedule;
    use crate::engine::state::{BoxSize, Key};

    #[test]
    fn test_manual_trace_box_four() {
        // After scheduling key [0] with n=4, S = [0, 2, 3, 1].
        // i=1 j=2 S=[0,3,2,1] -> S[1] = 3
        // i=2 j=0 S=[2,3,0,1] -> S[2] = 0
        // i=3 j=1 S=[2,1,0,3] -> S[0] = 2
        // i=0 j=3 S=[3,1,0,2] -> S[1] = 1
        let (state, _) = schedule(&Key::new(vec![0]).unwrap(), BoxSize::new(4).unwrap());
        let mut stream = Keystream::new(state);
        let drawn: Vec<usize> = stream.by_ref().take(4).collect();
        assert_eq!(drawn, vec![3, 0, 2, 1]);
        assert_eq!(stream.state().as_slice(), &[3, 1, 0, 2]);
        assert_eq!((stream.state().i(), stream.state().j()), (0, 3));
    }

    #[test]
    fn test_keystream_is_deterministic() {
        let key: Key = "Key".parse().unwrap();
        let (a, _) = schedule(&key, BoxSize::default());
        let (b, _) = schedule(&key, BoxSize::default());
        let first: Vec<usize> = Keystream::new(a).take(64).collect();
        let second: Vec<usize> = Keystream::new(b).take(64).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_keystream_keeps_permutation_and_range() {
        let key: Key = "invariant".parse().unwrap();
        let n = BoxSize::new(17).unwrap();
        let (state, _) = schedule(&key, n);
        let mut stream = Keystream::new(state);
        for _ in 0..500 {
            let value = stream.next().unwrap();
            assert!(value < 17);
        }
        assert!(stream.into_state().is_permutation());
    }

    #[test]
    fn test_box_of_one_emits_zero() {
        let (state, _) = schedule(&Key::new(vec![7]).unwrap(), BoxSize::new(1).unwrap());
        let drawn: Vec<usize> = Keystream::new(state).take(3).collect();
        assert_eq!(drawn, vec![0, 0, 0]);
    }
}
