//! Layer-bisection evaluation after Aaronson and Chen (arXiv:1612.05903,
//! section 4), the Savitch-theorem-flavored tradeoff.
//!
//! The circuit is first cut greedily into layers in which every qubit is
//! touched at most once; ⟨y∣C∣x⟩ is then evaluated by recursively
//! bisecting the layer range and summing ⟨y∣C₂∣i⟩⟨i∣C₁∣x⟩ over the
//! intermediate basis state i at the cut. An intermediate is pruned when
//! its Hamming distance from either endpoint exceeds the gate count on
//! that side — a layer of w gates moves a basis state by at most w bits,
//! each single-qubit touch flipping at most one. Within a single layer
//! the amplitude factorizes into single-qubit terms against the end
//! state, because no qubit is revisited. Time n·(2d)^(n+1) for depth d,
//! space O(n log d).

use std::f64::consts::FRAC_1_SQRT_2;
use num_complex::Complex64 as C64;
use crate::circuit::Circuit;
use crate::gate::{ bit_pos, flip_bit, get_bit, hamming, set_bit0, Gate };
use crate::sim::SimError;

/// Cap on the layer count of a single decomposition.
pub const MAX_LAYERS: usize = 1000;

const ZERO: C64 = C64 { re: 0.0, im: 0.0 };
const ONE: C64 = C64 { re: 1.0, im: 0.0 };

/// Greedy layer decomposition of a circuit.
///
/// Layer `d` spans gate positions `marks[d]..marks[d + 1]` of the source
/// circuit, with `marks[0] = 0` and the final mark equal to the total
/// gate count; concatenating the layers in order reproduces the original
/// gate sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layers {
    n: usize,
    marks: Vec<usize>,
    groups: Vec<Vec<Gate>>,
}

impl Layers {
    /// Scan the circuit left to right, closing the open layer whenever a
    /// gate touches a qubit the layer has already touched (controls
    /// included).
    pub fn build(circ: &Circuit) -> Result<Self, SimError> {
        let n = circ.n();
        let mut touched: Vec<bool> = vec![false; n];
        let mut marks: Vec<usize> = vec![0];
        let mut groups: Vec<Vec<Gate>> = Vec::new();
        let mut open: Vec<Gate> = Vec::new();
        let mut rd = circ.reader();
        while let Some((pos, gate)) = rd.next_gate() {
            let qs = gate.qubits();
            if qs.iter().any(|q| touched[*q]) {
                if groups.len() + 1 == MAX_LAYERS {
                    return Err(SimError::LayerLimit);
                }
                groups.push(std::mem::take(&mut open));
                marks.push(pos);
                touched.iter_mut().for_each(|t| { *t = false; });
            }
            qs.into_iter().for_each(|q| { touched[q] = true; });
            open.push(*gate);
        }
        groups.push(open);
        marks.push(circ.len());
        Ok(Self { n, marks, groups })
    }

    /// Number of layers; at most the circuit depth.
    pub fn depth(&self) -> usize { self.groups.len() }

    /// Gates in layer `d`.
    pub fn group(&self, d: usize) -> &[Gate] { &self.groups[d] }

    /// Total gate count across layers `lo..=hi`.
    pub fn width(&self, lo: usize, hi: usize) -> usize {
        self.marks[hi + 1] - self.marks[lo]
    }

    /// Compute ⟨y∣C∣x⟩ over the whole decomposition.
    pub fn amplitude(&self, x: usize, y: usize) -> C64 {
        self.bisect(0, self.depth() - 1, x, y, true)
    }

    /// [`Layers::amplitude`] with intermediate-state pruning disabled,
    /// kept for cross-checking the prune.
    pub fn amplitude_unpruned(&self, x: usize, y: usize) -> C64 {
        self.bisect(0, self.depth() - 1, x, y, false)
    }

    // ⟨e∣ C[lo..=hi] ∣s⟩ by bisection over the layer range
    fn bisect(&self, lo: usize, hi: usize, s: usize, e: usize, prune: bool)
        -> C64
    {
        if lo == hi { return self.layer_amp(lo, s, e); }
        let mid = (lo + hi) / 2;
        let mut acc = ZERO;
        for i in 0..(1_usize << self.n) {
            if prune
                && !(hamming(s, i) as usize <= self.width(lo, mid)
                    && hamming(i, e) as usize <= self.width(mid + 1, hi))
            {
                continue;
            }
            let head = self.bisect(lo, mid, s, i, prune);
            // the tail factor is only worth computing for live terms
            if head != ZERO {
                acc += head * self.bisect(mid + 1, hi, i, e, prune);
            }
        }
        acc
    }

    // one layer exactly: no qubit is revisited, so the amplitude is a
    // product of single-qubit factors against the end state
    fn layer_amp(&self, d: usize, s: usize, e: usize) -> C64 {
        let n = self.n;
        let mut result = ONE;
        let mut state = s;
        for gate in self.groups[d].iter() {
            match *gate {
                Gate::H(t) => {
                    let end_bit = get_bit(e, t, n);
                    if get_bit(state, t, n) == 1 && end_bit == 1 {
                        result = -result;
                    }
                    // the target leaves the layer pinned to its end value
                    state = set_bit0(state, t, n) | (end_bit << bit_pos(t, n));
                    result *= FRAC_1_SQRT_2;
                },
                Gate::Toff(c1, c2, t) => {
                    if get_bit(state, c1, n) & get_bit(state, c2, n) == 1 {
                        state = flip_bit(state, t, n);
                    }
                },
                _ => { result *= gate.phase_on(state, n); },
            }
        }
        if state == e { result } else { ZERO }
    }
}

/// Decompose the circuit and compute ⟨y∣C∣x⟩.
pub fn amplitude(circ: &Circuit, x: usize, y: usize)
    -> Result<C64, SimError>
{
    Ok(Layers::build(circ)?.amplitude(x, y))
}
