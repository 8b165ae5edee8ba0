//! Single transition amplitudes ⟨y∣C∣x⟩ of *n*-qubit circuits over the
//! restricted gate set Hadamard + Toffoli + diagonal phase rotations
//! R<sub>k</sub> = diag(1, e<sup>±2πi/2^k</sup>), computed by three
//! strategies with complementary cost profiles:
//!
//! - [`vector`]: dense state-vector evolution — time T·2^n, space 2^n;
//! - [`path`]: a path-integral sum over Hadamard branchings — time
//!   O(T·2^h) for h Hadamards, space O(h + n);
//! - [`savitch`]: the layer-bisection recursion of Aaronson and Chen
//!   (arXiv:1612.05903) — time n·(2d)^(n+1) for depth d, space O(n log d).
//!
//! The three kernels are peers sharing only the gate model and bit algebra
//! of [`gate`]; all mutable state (amplitude tables, recursion frames,
//! layer tables) is owned by a single kernel call and released when it
//! returns. Circuits are parsed from a whitespace-insensitive record
//! grammar (see [`circuit::Circuit::parse`]) or generated directly (QFT,
//! Draper adder, HSP standard method, random Hadamard + Toffoli
//! benchmarks).
//!
//! # Example
//! ```
//! use pocket_sim::{ circuit::Circuit, sim::{ self, Method } };
//!
//! // ⟨1∣H∣0⟩ = 1/√2
//! let circ = Circuit::parse(1, "0 h 0").unwrap();
//! let amp = sim::amplitude(&circ, Method::PathSum, 0, 1).unwrap();
//! assert!((amp.re - 0.5_f64.sqrt()).abs() < 1e-9);
//! ```

pub mod gate;
pub mod circuit;
pub mod vector;
pub mod path;
pub mod savitch;
pub mod sim;
