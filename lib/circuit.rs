//! Parsed gate sequences: the whitespace-insensitive record grammar,
//! positional cursors over the parsed stream, and generators for the
//! standard benchmark circuits.
//!
//! A record is `control kind operands...`, one gate per group of tokens:
//!
//! ```text
//! 0 h 2          Hadamard on qubit 2
//! 0 t 0 1 2      Toffoli on (0, 1 → 2)
//! 0 U 3 1        diag(1, e^(+2πi/8)) on qubit 1
//! 1 u 2 0 3      controlled diag(1, e^(−2πi/4)) on (0 → 3)
//! ```
//!
//! The parsed sequence is held in memory and addressed by position, so the
//! recursive kernels re-enter the stream at previously captured cursors
//! instead of re-seeking a file.

use std::{ fmt, io };
use itertools::Itertools;
use rand::Rng;
use thiserror::Error;
use crate::gate::Gate;
use crate::sim::SimError;

/// Errors arising from a malformed gate record.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Gate kind tag other than `h`, `t`, `U`, or `u`.
    #[error("unknown gate kind '{0}'")]
    UnknownKind(String),
    /// Operand token that does not parse as an unsigned integer.
    #[error("malformed operand '{0}'")]
    MalformedToken(String),
    /// Operand qubit outside `[0, n)`.
    #[error("qubit {0} out of range for a {1}-qubit register")]
    QubitRange(usize, usize),
    /// Control flag other than `0` or `1`.
    #[error("invalid control flag '{0}'")]
    ControlFlag(String),
    /// Control flag `1` on a kind that admits no control.
    #[error("gate kind '{0}' admits no control flag")]
    SpuriousControl(char),
    /// Phase denominator exponent below 1.
    #[error("phase exponent must be at least 1")]
    PhaseExponent,
    /// Record truncated by end of input.
    #[error("unexpected end of input mid-record")]
    UnexpectedEnd,
}

fn number<'a, I>(toks: &mut I) -> Result<usize, ParseError>
where I: Iterator<Item = &'a str>
{
    let tok = toks.next().ok_or(ParseError::UnexpectedEnd)?;
    tok.parse::<usize>()
        .map_err(|_| ParseError::MalformedToken(tok.to_string()))
}

fn exponent<'a, I>(toks: &mut I) -> Result<u32, ParseError>
where I: Iterator<Item = &'a str>
{
    let tok = toks.next().ok_or(ParseError::UnexpectedEnd)?;
    let k = tok.parse::<u32>()
        .map_err(|_| ParseError::MalformedToken(tok.to_string()))?;
    if k < 1 { return Err(ParseError::PhaseExponent); }
    Ok(k)
}

/// A validated gate sequence for an `n`-qubit register.
///
/// This is the random-access view of a gate stream: gates are addressed by
/// position in `[0, len)`, and [`GateReader`] cursors re-enter the
/// sequence at any previously observed position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Circuit {
    n: usize,
    gates: Vec<Gate>,
}

/// Renders the gate-record grammar, one record per line; the output parses
/// back to an equal circuit.
impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.gates.is_empty() { return Ok(()); }
        writeln!(f, "{}", self.gates.iter().format("\n"))
    }
}

impl Circuit {
    /// Validate a gate sequence for an `n`-qubit register.
    ///
    /// All operands must lie in `[0, n)`, Toffoli operands must be
    /// pairwise distinct, controlled-phase operands non-equal, and phase
    /// exponents at least 1.
    pub fn new<I>(n: usize, gates: I) -> Result<Self, SimError>
    where I: IntoIterator<Item = Gate>
    {
        let gates: Vec<Gate> = gates.into_iter().collect();
        for gate in gates.iter() {
            if let Some(&q) = gate.qubits().iter().find(|q| **q >= n) {
                return Err(ParseError::QubitRange(q, n).into());
            }
            let well_formed = match *gate {
                Gate::Toff(c1, c2, t) => c1 != c2 && c1 != t && c2 != t,
                Gate::CU(k, c, t) | Gate::CUinv(k, c, t) => c != t && k >= 1,
                Gate::U(k, _) | Gate::Uinv(k, _) => k >= 1,
                Gate::H(_) => true,
            };
            if !well_formed { return Err(SimError::UnsupportedGate(*gate)); }
        }
        Ok(Self { n, gates })
    }

    /// Parse the textual gate-record grammar.
    ///
    /// Records are whitespace-separated token groups; any amount of
    /// whitespace (including blank trailing lines) is tolerated between
    /// tokens. The stream ends at end of input.
    pub fn parse(n: usize, src: &str) -> Result<Self, SimError> {
        let mut toks = src.split_whitespace();
        let mut gates: Vec<Gate> = Vec::new();
        while let Some(control) = toks.next() {
            let control = match control {
                "0" => false,
                "1" => true,
                other
                    => return Err(
                        ParseError::ControlFlag(other.to_string()).into()),
            };
            let kind = toks.next().ok_or(ParseError::UnexpectedEnd)?;
            let gate = match (kind, control) {
                ("h", false) => Gate::H(number(&mut toks)?),
                ("t", false) => {
                    let c1 = number(&mut toks)?;
                    let c2 = number(&mut toks)?;
                    Gate::Toff(c1, c2, number(&mut toks)?)
                },
                ("U", false) => {
                    let k = exponent(&mut toks)?;
                    Gate::U(k, number(&mut toks)?)
                },
                ("u", false) => {
                    let k = exponent(&mut toks)?;
                    Gate::Uinv(k, number(&mut toks)?)
                },
                ("U", true) => {
                    let k = exponent(&mut toks)?;
                    let c = number(&mut toks)?;
                    Gate::CU(k, c, number(&mut toks)?)
                },
                ("u", true) => {
                    let k = exponent(&mut toks)?;
                    let c = number(&mut toks)?;
                    Gate::CUinv(k, c, number(&mut toks)?)
                },
                ("h", true)
                    => return Err(ParseError::SpuriousControl('h').into()),
                ("t", true)
                    => return Err(ParseError::SpuriousControl('t').into()),
                _ => return Err(
                    ParseError::UnknownKind(kind.to_string()).into()),
            };
            gates.push(gate);
        }
        Self::new(n, gates)
    }

    /// Parse the gate-record grammar from an arbitrary byte source.
    pub fn from_reader<R>(n: usize, mut src: R) -> Result<Self, SimError>
    where R: io::Read
    {
        let mut buf = String::new();
        src.read_to_string(&mut buf)?;
        Self::parse(n, &buf)
    }

    /// Return the register size.
    pub fn n(&self) -> usize { self.n }

    /// Return the gate count.
    pub fn len(&self) -> usize { self.gates.len() }

    pub fn is_empty(&self) -> bool { self.gates.is_empty() }

    /// The gate sequence, in order.
    pub fn gates(&self) -> &[Gate] { &self.gates }

    /// Number of state-changing gates (Hadamards + Toffolis): the changes
    /// budget handed to the path-integral kernel.
    pub fn non_phase_gates(&self) -> usize {
        self.gates.iter().filter(|g| g.changes_state()).count()
    }

    /// A positional reader starting at the head of the stream.
    pub fn reader(&self) -> GateReader<'_> {
        GateReader { gates: &self.gates, pos: 0 }
    }
}

/* Generators *****************************************************************/

// Hadamard + controlled-rotation cascade on the first m qubits
fn push_qft(gates: &mut Vec<Gate>, m: usize) {
    for i in 0..m {
        gates.push(Gate::H(i));
        for j in 2..=(m - i) {
            gates.push(Gate::CU(j as u32, i + j - 1, i));
        }
    }
}

impl Circuit {
    /// One Hadamard per qubit.
    pub fn hadamard_layer(n: usize) -> Self {
        Self { n, gates: (0..n).map(Gate::H).collect() }
    }

    /// Quantum Fourier transform on `n` qubits: each qubit receives a
    /// Hadamard followed by controlled rotations of angle 2π/2^j
    /// conditioned on the qubits below it. Outputs are indexed in
    /// bit-reversed order (see [`reverse_bits`][crate::gate::reverse_bits]).
    pub fn qft(n: usize) -> Self {
        let mut gates: Vec<Gate> = Vec::new();
        push_qft(&mut gates, n);
        Self { n, gates }
    }

    /// Draper adder on an even number of qubits: QFT on the low register
    /// (qubits `n/2..n`), cross-register controlled phases, inverse
    /// cascade. The resulting permutation adds the high register into the
    /// low register modulo 2^(n/2).
    pub fn draper_adder(n: usize) -> Self {
        let h = n / 2;
        let mut gates: Vec<Gate> = Vec::new();
        for i in h..n {
            gates.push(Gate::H(i));
            for j in 2..=(n - i) {
                gates.push(Gate::CU(j as u32, i + j - 1, i));
            }
        }
        for i in 0..h {
            for j in 0..(h - i) {
                gates.push(Gate::CU((i + 1) as u32, h + j, j + i));
            }
        }
        for i in (h..n).rev() {
            for j in (2..=(n - i)).rev() {
                gates.push(Gate::CUinv(j as u32, i + j - 1, i));
            }
            gates.push(Gate::H(i));
        }
        Self { n, gates }
    }

    /// The "HSP standard method" circuit: an `a`-qubit control register
    /// put into uniform superposition, `n` random Toffolis computing a
    /// function of it into the remaining qubits, and a QFT on the control
    /// register.
    pub fn hsp_standard<R>(a: usize, n: usize, rng: &mut R) -> Self
    where R: Rng + ?Sized
    {
        let mut gates: Vec<Gate> = (0..a).map(Gate::H).collect();
        (0..n).for_each(|_| {
            gates.push(Gate::sample_controlled_toffoli(a, n, rng));
        });
        push_qft(&mut gates, a);
        Self { n, gates }
    }

    /// Two Hadamard layers (or two QFTs, when `qft` is set) surrounding
    /// `len` random Toffolis.
    pub fn layered<R>(len: usize, qft: bool, n: usize, rng: &mut R) -> Self
    where R: Rng + ?Sized
    {
        let mut gates: Vec<Gate> = Vec::new();
        if qft { push_qft(&mut gates, n); }
        else { gates.extend((0..n).map(Gate::H)); }
        (0..len).for_each(|_| { gates.push(Gate::sample_toffoli(n, rng)); });
        if qft { push_qft(&mut gates, n); }
        else { gates.extend((0..n).map(Gate::H)); }
        Self { n, gates }
    }

    /// `len` gates, each a fair coin flip between a Hadamard on a random
    /// target and a random Toffoli.
    pub fn random<R>(len: usize, n: usize, rng: &mut R) -> Self
    where R: Rng + ?Sized
    {
        let gates = (0..len)
            .map(|_| {
                if rng.gen::<bool>() { Gate::H(rng.gen_range(0..n)) }
                else { Gate::sample_toffoli(n, rng) }
            })
            .collect();
        Self { n, gates }
    }
}

/* Reader *********************************************************************/

/// Positional cursor over a parsed gate stream.
///
/// Copying a reader captures its position, so a recursive caller can
/// re-enter the stream exactly where an earlier frame left off; the
/// path-integral kernel branches this way at every Hadamard.
#[derive(Copy, Clone, Debug)]
pub struct GateReader<'a> {
    gates: &'a [Gate],
    pos: usize,
}

impl<'a> GateReader<'a> {
    /// Current cursor.
    pub fn pos(&self) -> usize { self.pos }

    /// Move back to the head of the stream.
    pub fn rewind(&mut self) { self.pos = 0; }

    /// Move to an absolute cursor previously observed on this stream.
    pub fn seek(&mut self, pos: usize) -> Result<(), SimError> {
        if pos > self.gates.len() {
            return Err(SimError::Stream(
                format!("seek to {} past the end of a {}-gate stream",
                    pos, self.gates.len())));
        }
        self.pos = pos;
        Ok(())
    }

    /// Next gate together with the cursor it starts at; `None` at end of
    /// stream.
    pub fn next_gate(&mut self) -> Option<(usize, &'a Gate)> {
        let at = self.pos;
        self.gates.get(at).map(|g| { self.pos += 1; (at, g) })
    }
}
