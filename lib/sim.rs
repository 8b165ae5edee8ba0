//! Simulator selection and the shared error surface.
//!
//! [`amplitude`] is a thin dispatcher over the three kernels: it supplies
//! the path-integral kernel its changes budget and owns the layer-table
//! construction when Savitch is chosen. Errors propagate immediately with
//! no partial results; floating-point drift is never an error.

use num_complex::Complex64 as C64;
use thiserror::Error;
use crate::circuit::{ Circuit, ParseError };
use crate::gate::Gate;
use crate::savitch::{ Layers, MAX_LAYERS };
use crate::{ path, vector };

/// Any error surfaced by parsing or simulation.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum SimError {
    /// Malformed gate record.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    /// Well-formed but unsupported gate (e.g. non-distinct Toffoli
    /// operands).
    #[error("unsupported gate '{0}'")]
    UnsupportedGate(Gate),
    /// Dense amplitude table for this many qubits exceeds the size
    /// budget.
    #[error("amplitude table for {0} qubits exceeds the size budget")]
    Oversize(usize),
    /// Layer decomposition exceeds [`MAX_LAYERS`].
    #[error("layer decomposition exceeds {MAX_LAYERS} layers")]
    LayerLimit,
    /// Re-seek failure or I/O failure on the gate stream.
    #[error("gate stream error: {0}")]
    Stream(String),
}

impl From<std::io::Error> for SimError {
    fn from(err: std::io::Error) -> Self { Self::Stream(err.to_string()) }
}

/// Which simulation strategy to run.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    /// Dense state-vector evolution: time T·2^n, space 2^n.
    Vector,
    /// Path-integral DFS over Hadamard branches: time O(T·2^h),
    /// space O(h + n).
    PathSum,
    /// Savitch-style layer bisection: time n·(2d)^(n+1), space
    /// O(n log d).
    Savitch,
}

/// Compute ⟨y∣C∣x⟩ with the chosen strategy.
pub fn amplitude(circ: &Circuit, method: Method, x: usize, y: usize)
    -> Result<C64, SimError>
{
    match method {
        Method::Vector => vector::amplitude(circ, x, y),
        Method::PathSum
            => Ok(path::amplitude(circ, x, y, circ.non_phase_gates())),
        Method::Savitch => {
            let layers = Layers::build(circ)?;
            Ok(layers.amplitude(x, y))
        },
    }
}

#[cfg(test)]
mod test {
    use itertools::Itertools;
    use rand::{ rngs::StdRng, Rng, SeedableRng };
    use crate::gate::Gate;
    use super::*;

    const ONE: C64 = C64 { re: 1.0, im: 0.0 };
    const ZERO: C64 = C64 { re: 0.0, im: 0.0 };

    fn all_methods(circ: &Circuit, x: usize, y: usize) -> [C64; 3] {
        [
            amplitude(circ, Method::Vector, x, y).unwrap(),
            amplitude(circ, Method::PathSum, x, y).unwrap(),
            amplitude(circ, Method::Savitch, x, y).unwrap(),
        ]
    }

    fn assert_close(a: C64, b: C64) {
        assert!((a - b).norm() < 1e-9, "{} !≈ {}", a, b);
    }

    #[test]
    fn identity_amplitudes() {
        let circ = Circuit::parse(2, "").unwrap();
        for (x, y) in (0..4_usize).cartesian_product(0..4_usize) {
            let expect = if x == y { ONE } else { ZERO };
            for amp in all_methods(&circ, x, y) {
                assert_close(amp, expect);
            }
        }
    }

    #[test]
    fn involutions() {
        // a double Hadamard, a double Toffoli, and U followed by u all
        // reduce to the identity
        let pairs = [
            "0 h 1\n0 h 1",
            "0 t 2 0 1\n0 t 2 0 1",
            "0 U 3 1\n0 u 3 1",
            "1 U 2 0 2\n1 u 2 0 2",
        ];
        for src in pairs {
            let circ = Circuit::parse(3, src).unwrap();
            for (x, y) in (0..8_usize).cartesian_product(0..8_usize) {
                let expect = if x == y { ONE } else { ZERO };
                for amp in all_methods(&circ, x, y) {
                    assert_close(amp, expect);
                }
            }
        }
    }

    #[test]
    fn kernels_agree_on_random_circuits() {
        let mut rng = StdRng::seed_from_u64(8128);
        for _ in 0..12 {
            let n = rng.gen_range(3..=4);
            let len = rng.gen_range(4..=14);
            let circ = Circuit::random(len, n, &mut rng);
            let x = rng.gen_range(0..1 << n);
            let y = rng.gen_range(0..1 << n);
            let [v, p, s] = all_methods(&circ, x, y);
            assert_close(v, p);
            assert_close(v, s);
        }
        // with phase gates in play
        for _ in 0..4 {
            let circ = Circuit::layered(3, true, 3, &mut rng);
            let x = rng.gen_range(0..8);
            let y = rng.gen_range(0..8);
            let [v, p, s] = all_methods(&circ, x, y);
            assert_close(v, p);
            assert_close(v, s);
        }
    }

    #[test]
    fn qft_is_uniform_from_zero() {
        // ⟨y∣QFT∣0⟩ = 1/√8 for every y
        let circ = Circuit::qft(3);
        let expect = C64 { re: 1.0 / 8.0_f64.sqrt(), im: 0.0 };
        for y in 0..8 {
            for amp in all_methods(&circ, 0, y) {
                assert_close(amp, expect);
            }
        }
    }

    #[test]
    fn amplitudes_square_sum_to_one() {
        let mut rng = StdRng::seed_from_u64(6174);
        let circ = Circuit::layered(5, false, 4, &mut rng);
        let total: f64 = (0..16)
            .map(|y| amplitude(&circ, Method::Vector, 3, y)
                .unwrap()
                .norm_sqr())
            .sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn palindromic_real_circuits_are_symmetric() {
        // an H + Toffoli circuit equal to its own reverse is real and
        // self-transpose, so ⟨y∣C∣x⟩ = ⟨x∣C∣y⟩
        let mut rng = StdRng::seed_from_u64(55);
        let half = Circuit::random(6, 3, &mut rng);
        let gates: Vec<Gate> = half.gates().iter().copied()
            .chain(half.gates().iter().rev().copied())
            .collect();
        let circ = Circuit::new(3, gates).unwrap();
        for (x, y) in (0..8_usize).cartesian_product(0..8_usize) {
            let fwd = amplitude(&circ, Method::Vector, x, y).unwrap();
            let rev = amplitude(&circ, Method::Vector, y, x).unwrap();
            assert_close(fwd, rev);
            assert!(fwd.im.abs() < 1e-9);
        }
    }

    #[test]
    fn real_circuits_transpose_into_their_inverse() {
        // H and Toffoli are real involutions, so reversing the gate list
        // of any H + Toffoli circuit gives C⁻¹ and
        // ⟨y∣C∣x⟩ = ⟨x∣C⁻¹∣y⟩
        let mut rng = StdRng::seed_from_u64(911);
        let circ = Circuit::random(9, 3, &mut rng);
        let rev: Vec<Gate> = circ.gates().iter().rev().copied().collect();
        let inv = Circuit::new(3, rev).unwrap();
        for (x, y) in (0..8_usize).cartesian_product(0..8_usize) {
            let fwd = amplitude(&circ, Method::Vector, x, y).unwrap();
            let bwd = amplitude(&inv, Method::Vector, y, x).unwrap();
            assert_close(fwd, bwd);
        }
    }

    #[test]
    fn draper_adder_adds() {
        // the adder maps ∣a⟩∣b⟩ to ∣a⟩∣a + b mod 4⟩ with unit amplitude
        let circ = Circuit::draper_adder(4);
        for (a, b) in (0..4_usize).cartesian_product(0..4_usize) {
            let x = (a << 2) | b;
            let y = (a << 2) | ((a + b) % 4);
            let amp = amplitude(&circ, Method::Vector, x, y).unwrap();
            assert_close(amp, ONE);
        }
    }

    #[test]
    fn errors_surface_through_the_dispatcher() {
        let circ = Circuit::parse(30, "0 h 29").unwrap();
        assert!(matches!(
            amplitude(&circ, Method::Vector, 0, 0),
            Err(SimError::Oversize(30)),
        ));
        let wide = Circuit::new(1, (0..4000).map(|_| Gate::H(0))).unwrap();
        assert!(matches!(
            amplitude(&wide, Method::Savitch, 0, 0),
            Err(SimError::LayerLimit),
        ));
    }
}
