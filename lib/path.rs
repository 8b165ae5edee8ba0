//! Path-integral evaluation: a depth-first sum over the computation paths
//! opened by Hadamard branchings.
//!
//! Every Hadamard splits the running basis state into a branch with the
//! target forced to 0 (weight 1/√2) and a branch with the target forced
//! to 1 (weight (−1)^b/√2 for prior target value b, encoding
//! ⟨0∣H∣s⟩ = 1/√2 and ⟨1∣H∣s⟩ = (−1)^s/√2); Toffolis and phase gates act
//! deterministically on the running frame without branching. A branch is
//! pruned as unreachable when its Hamming distance to the end state
//! exceeds the remaining budget of state-changing gates — each remaining
//! Hadamard or Toffoli moves the state by at most one bit, so such a path
//! cannot terminate on the end state. Time O(T·2^h) for h Hadamards,
//! space O(h + n): one stack frame per Hadamard on the current path.

use std::f64::consts::FRAC_1_SQRT_2;
use num_complex::Complex64 as C64;
use crate::circuit::{ Circuit, GateReader };
use crate::gate::{ flip_bit, get_bit, hamming, set_bit0, set_bit1, Gate };

const ZERO: C64 = C64 { re: 0.0, im: 0.0 };
const ONE: C64 = C64 { re: 1.0, im: 0.0 };

/// Compute ⟨y∣C∣x⟩ by path summation.
///
/// `changes` is the number of state-changing gates in the circuit (see
/// [`Circuit::non_phase_gates`]); passing a larger value only weakens
/// pruning, never the result.
pub fn amplitude(circ: &Circuit, x: usize, y: usize, changes: usize) -> C64 {
    walk(circ.reader(), circ.n(), x, ONE, y, changes as i64, true)
}

/// [`amplitude`] with reachability pruning disabled: exponential in the
/// full Hadamard count, kept for cross-checking the prune.
pub fn amplitude_unpruned(circ: &Circuit, x: usize, y: usize, changes: usize)
    -> C64
{
    walk(circ.reader(), circ.n(), x, ONE, y, changes as i64, false)
}

// one frame per Hadamard on the path; the copied reader re-enters the
// stream just past the branch point
fn walk(
    mut rd: GateReader<'_>,
    n: usize,
    mut state: usize,
    mut phase: C64,
    end: usize,
    mut changes_left: i64,
    prune: bool,
) -> C64 {
    while let Some((_, gate)) = rd.next_gate() {
        match *gate {
            Gate::H(t) => {
                changes_left -= 1;
                if prune
                    && i64::from(hamming(state, end)) > changes_left + 1
                {
                    return ZERO;
                }
                let sign = if get_bit(state, t, n) == 1 { -1.0 } else { 1.0 };
                let zero = walk(
                    rd, n, set_bit0(state, t, n), phase, end,
                    changes_left, prune);
                let one = walk(
                    rd, n, set_bit1(state, t, n), phase, end,
                    changes_left, prune);
                return (zero + one * sign) * FRAC_1_SQRT_2;
            },
            Gate::Toff(c1, c2, t) => {
                changes_left -= 1;
                if get_bit(state, c1, n) & get_bit(state, c2, n) == 1 {
                    state = flip_bit(state, t, n);
                }
            },
            _ => { phase *= gate.phase_on(state, n); },
        }
    }
    // ⟨end∣state⟩ vanishes unless the path landed on the end state
    if state == end { phase } else { ZERO }
}

#[cfg(test)]
mod test {
    use rand::{ rngs::StdRng, Rng, SeedableRng };
    use super::*;

    fn amp(n: usize, src: &str, x: usize, y: usize) -> C64 {
        let circ = Circuit::parse(n, src).unwrap();
        let changes = circ.non_phase_gates();
        amplitude(&circ, x, y, changes)
    }

    fn assert_close(a: C64, b: C64) {
        assert!((a - b).norm() < 1e-9, "{} !≈ {}", a, b);
    }

    #[test]
    fn empty_circuit_is_identity() {
        assert_close(amp(2, "", 2, 2), ONE);
        assert_close(amp(2, "", 2, 1), ZERO);
    }

    #[test]
    fn hadamard_pair_is_identity() {
        assert_close(amp(1, "0 h 0\n0 h 0", 0, 0), ONE);
        assert_close(amp(1, "0 h 0\n0 h 0", 1, 0), ZERO);
    }

    #[test]
    fn single_hadamard() {
        assert_close(amp(1, "0 h 0", 0, 1), C64 { re: FRAC_1_SQRT_2, im: 0.0 });
        assert_close(amp(1, "0 h 0", 1, 1), C64 { re: -FRAC_1_SQRT_2, im: 0.0 });
    }

    #[test]
    fn hadamard_pairs_on_two_qubits() {
        assert_close(amp(2, "0 h 0\n0 h 1\n0 h 0\n0 h 1", 0, 0), ONE);
    }

    #[test]
    fn toffoli_conditional_flip() {
        assert_close(amp(3, "0 t 0 1 2", 0b110, 0b111), ONE);
        assert_close(amp(3, "0 t 0 1 2", 0b010, 0b010), ONE);
        assert_close(amp(3, "0 t 0 1 2", 0b110, 0b110), ZERO);
    }

    #[test]
    fn phase_between_hadamards() {
        assert_close(
            amp(1, "0 h 0\n0 U 2 0\n0 h 0", 0, 0), C64 { re: 0.5, im: 0.5 });
        assert_close(
            amp(1, "0 h 0\n0 u 2 0\n0 h 0", 0, 0), C64 { re: 0.5, im: -0.5 });
    }

    #[test]
    fn slack_budget_does_not_change_the_sum() {
        let mut rng = StdRng::seed_from_u64(421);
        for _ in 0..10 {
            let circ = Circuit::random(10, 3, &mut rng);
            let x = rng.gen_range(0..8);
            let y = rng.gen_range(0..8);
            let tight = amplitude(&circ, x, y, circ.non_phase_gates());
            let slack = amplitude(&circ, x, y, circ.non_phase_gates() + 7);
            assert_close(tight, slack);
        }
    }

    #[test]
    fn pruning_leaves_the_sum_unchanged() {
        let mut rng = StdRng::seed_from_u64(777);
        for _ in 0..10 {
            let qft: bool = rng.gen();
            let circ = Circuit::layered(4, qft, 3, &mut rng);
            let x = rng.gen_range(0..8);
            let y = rng.gen_range(0..8);
            let changes = circ.non_phase_gates();
            let pruned = amplitude(&circ, x, y, changes);
            let full = amplitude_unpruned(&circ, x, y, changes);
            assert!((pruned - full).norm() < 1e-12);
        }
    }
}
