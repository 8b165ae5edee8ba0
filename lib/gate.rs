//! Gates drawn from the restricted set Hadamard + Toffoli + diagonal phase
//! rotations, together with the qubit-indexed bit algebra shared by all
//! three simulator kernels.
//!
//! Basis states are unsigned integers in [0, 2^n). Qubit 0 is the *most*
//! significant bit of the n-bit state, so qubit q lives at bit position
//! n − q − 1 (i.e. 6 = 110 reads qubit 0 = 1, qubit 1 = 1, qubit 2 = 0).
//! Every gate record and every kernel uses this convention.

use std::{ f64::consts::TAU, fmt };
use num_complex::Complex64 as C64;
use rand::Rng;

/* Bit algebra ****************************************************************/

/// Bit position of qubit `q` in an `n`-qubit basis state.
pub fn bit_pos(q: usize, n: usize) -> usize { n - q - 1 }

/// Value (0 or 1) of qubit `q` in basis state `x`.
pub fn get_bit(x: usize, q: usize, n: usize) -> usize {
    (x >> bit_pos(q, n)) & 1
}

/// Clear qubit `q` in basis state `x`.
pub fn set_bit0(x: usize, q: usize, n: usize) -> usize {
    x & !(1 << bit_pos(q, n))
}

/// Set qubit `q` in basis state `x`.
pub fn set_bit1(x: usize, q: usize, n: usize) -> usize {
    x | (1 << bit_pos(q, n))
}

/// Toggle qubit `q` in basis state `x`.
pub fn flip_bit(x: usize, q: usize, n: usize) -> usize {
    x ^ (1 << bit_pos(q, n))
}

/// Hamming distance between two basis states: the minimum number of
/// single-bit changes separating them.
pub fn hamming(a: usize, b: usize) -> u32 { (a ^ b).count_ones() }

/// Reverse the low `len` bits of `x`.
pub fn reverse_bits(x: usize, len: usize) -> usize {
    (0..len).fold(0, |acc, k| acc | (((x >> k) & 1) << (len - k - 1)))
}

/// Render basis state `x` as an `n`-character binary string, qubit 0
/// leftmost.
pub fn bin_string(x: usize, n: usize) -> String {
    (0..n).map(|q| if get_bit(x, q, n) == 1 { '1' } else { '0' }).collect()
}

/// The complex factor e^(±2πi/2^k), negative for `inverse`.
pub fn phase_factor(k: u32, inverse: bool) -> C64 {
    let arg = TAU * (-f64::from(k)).exp2();
    C64::cis(if inverse { -arg } else { arg })
}

/* Gate ***********************************************************************/

/// A single gate from the restricted set.
///
/// Toffoli controls come first; controlled-phase operands are control then
/// target. Phase exponents `k ≥ 1` give the diagonal factor
/// e^(±2πi/2^k) on the target's ∣1⟩ component.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Gate {
    /// Hadamard on a target qubit.
    H(usize),
    /// Doubly controlled X on (c1, c2 → tgt).
    Toff(usize, usize, usize),
    /// diag(1, e^(+2πi/2^k)) on a target qubit.
    U(u32, usize),
    /// diag(1, e^(−2πi/2^k)) on a target qubit.
    Uinv(u32, usize),
    /// Controlled diag(1, e^(+2πi/2^k)) on (ctrl → tgt).
    CU(u32, usize, usize),
    /// Controlled diag(1, e^(−2πi/2^k)) on (ctrl → tgt).
    CUinv(u32, usize, usize),
}

/// Renders the gate-stream grammar record (`0 h 3`, `1 U 2 1 0`, ...).
impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::H(t) => write!(f, "0 h {}", t),
            Self::Toff(c1, c2, t) => write!(f, "0 t {} {} {}", c1, c2, t),
            Self::U(k, t) => write!(f, "0 U {} {}", k, t),
            Self::Uinv(k, t) => write!(f, "0 u {} {}", k, t),
            Self::CU(k, c, t) => write!(f, "1 U {} {} {}", k, c, t),
            Self::CUinv(k, c, t) => write!(f, "1 u {} {} {}", k, c, t),
        }
    }
}

impl Gate {
    /// Return `true` if `self` is `H`.
    pub fn is_h(&self) -> bool { matches!(self, Self::H(..)) }

    /// Return `true` if `self` is `Toff`.
    pub fn is_toff(&self) -> bool { matches!(self, Self::Toff(..)) }

    /// Return `true` if `self` is a diagonal phase gate.
    pub fn is_phase(&self) -> bool {
        matches!(self, Self::U(..) | Self::Uinv(..) | Self::CU(..) | Self::CUinv(..))
    }

    /// Return `true` if the gate splits a path-sum trajectory into two
    /// branches (Hadamard only).
    pub fn is_branching(&self) -> bool { self.is_h() }

    /// Return `true` if the gate can move a basis state, by Hamming
    /// distance at most 1 (Hadamard or Toffoli).
    pub fn changes_state(&self) -> bool {
        matches!(self, Self::H(..) | Self::Toff(..))
    }

    /// All qubit indices the gate references, controls included.
    pub fn qubits(&self) -> Vec<usize> {
        match *self {
            Self::H(t) | Self::U(_, t) | Self::Uinv(_, t) => vec![t],
            Self::CU(_, c, t) | Self::CUinv(_, c, t) => vec![c, t],
            Self::Toff(c1, c2, t) => vec![c1, c2, t],
        }
    }

    /// Complex factor contributed when a phase gate's trigger condition
    /// holds; `None` for non-phase gates.
    pub fn phase(&self) -> Option<C64> {
        match *self {
            Self::U(k, _) | Self::CU(k, _, _) => Some(phase_factor(k, false)),
            Self::Uinv(k, _) | Self::CUinv(k, _, _) => Some(phase_factor(k, true)),
            _ => None,
        }
    }

    /// Phase factor the gate contributes on basis state `x`: the gate's
    /// factor when its trigger condition holds (target 1, and control 1
    /// when controlled), otherwise 1. Non-phase gates contribute 1.
    pub fn phase_on(&self, x: usize, n: usize) -> C64 {
        match *self {
            Self::U(k, t) if get_bit(x, t, n) == 1
                => phase_factor(k, false),
            Self::Uinv(k, t) if get_bit(x, t, n) == 1
                => phase_factor(k, true),
            Self::CU(k, c, t) if get_bit(x, c, n) & get_bit(x, t, n) == 1
                => phase_factor(k, false),
            Self::CUinv(k, c, t) if get_bit(x, c, n) & get_bit(x, t, n) == 1
                => phase_factor(k, true),
            _ => C64 { re: 1.0, im: 0.0 },
        }
    }

    /// Sample a Toffoli with three pairwise distinct operands on an
    /// `n`-qubit register.
    ///
    /// *Panics if `n < 3`.*
    pub fn sample_toffoli<R>(n: usize, rng: &mut R) -> Self
    where R: Rng + ?Sized
    {
        if n < 3 { panic!("sample_toffoli: not enough qubits"); }
        let c1 = rng.gen_range(0..n);
        let mut c2 = rng.gen_range(0..n);
        while c2 == c1 { c2 = rng.gen_range(0..n); }
        let mut t = rng.gen_range(0..n);
        while t == c1 || t == c2 { t = rng.gen_range(0..n); }
        Self::Toff(c1, c2, t)
    }

    /// Sample a Toffoli with both controls in `[0, a)` and target in
    /// `[a, n)`.
    ///
    /// *Panics if `a < 2` or `n ≤ a`.*
    pub fn sample_controlled_toffoli<R>(a: usize, n: usize, rng: &mut R) -> Self
    where R: Rng + ?Sized
    {
        if a < 2 || n <= a {
            panic!("sample_controlled_toffoli: not enough qubits");
        }
        let c1 = rng.gen_range(0..a);
        let mut c2 = rng.gen_range(0..a);
        while c2 == c1 { c2 = rng.gen_range(0..a); }
        Self::Toff(c1, c2, rng.gen_range(a..n))
    }
}
