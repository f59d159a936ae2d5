//! Quantum state vectors used as puzzle targets.
//!
//! The amplitude simulator that computes states from circuits is an
//! external collaborator; this module only stores amplitude vectors,
//! validates them before they are embedded into a level, and compares
//! them for puzzle resolution.

use serde::{Deserialize, Serialize};

/// One complex amplitude.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Amplitude {
    pub re: f64,
    pub im: f64,
}

impl Amplitude {
    pub const ZERO: Amplitude = Amplitude { re: 0.0, im: 0.0 };
    pub const ONE: Amplitude = Amplitude { re: 1.0, im: 0.0 };

    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    pub fn norm_sqr(&self) -> f64 {
        self.re * self.re + self.im * self.im
    }
}

/// Fixed-size amplitude vector over `num_qubits` qubits.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StateVector {
    amplitudes: Vec<Amplitude>,
}

impl StateVector {
    /// Tolerance for the total-probability check and for puzzle
    /// comparison.
    pub const TOLERANCE: f64 = 0.1;

    pub fn new(amplitudes: Vec<Amplitude>) -> Self {
        Self { amplitudes }
    }

    /// The |0…0⟩ basis state over `num_qubits` qubits.
    pub fn basis(num_qubits: u8) -> Self {
        let size = 1usize << num_qubits;
        let mut amplitudes = vec![Amplitude::ZERO; size];
        amplitudes[0] = Amplitude::ONE;
        Self { amplitudes }
    }

    pub fn amplitudes(&self) -> &[Amplitude] {
        &self.amplitudes
    }

    pub fn size(&self) -> usize {
        self.amplitudes.len()
    }

    pub fn num_qubits(&self) -> u8 {
        if self.amplitudes.len() < 2 {
            return 0;
        }
        self.amplitudes.len().ilog2() as u8
    }

    /// A vector is embeddable iff its length is a power of two and the
    /// total squared magnitude is within [`Self::TOLERANCE`] of 1.
    pub fn is_valid(&self) -> bool {
        Self::check_amplitudes(&self.amplitudes)
    }

    pub fn check_amplitudes(amplitudes: &[Amplitude]) -> bool {
        if !amplitudes.len().is_power_of_two() {
            return false;
        }
        let total: f64 = amplitudes.iter().map(Amplitude::norm_sqr).sum();
        (total - 1.0).abs() <= Self::TOLERANCE
    }

    /// Amplitude-wise comparison within `tolerance`, used to decide
    /// whether a puzzle target has been reached. `other` may have more
    /// qubits than `self` (the robot may be bigger than the puzzle);
    /// the reverse fails.
    pub fn matches(&self, other: &StateVector, tolerance: f64) -> bool {
        if self.size() > other.size() {
            return false;
        }
        self.amplitudes.iter().zip(&other.amplitudes).all(|(a, b)| {
            (a.re - b.re).abs() <= tolerance && (a.im - b.im).abs() <= tolerance
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basis_is_valid() {
        for qubits in 1..=4 {
            let stv = StateVector::basis(qubits);
            assert!(stv.is_valid());
            assert_eq!(stv.num_qubits(), qubits);
            assert_eq!(stv.size(), 1 << qubits);
        }
    }

    #[test]
    fn test_rejects_non_power_of_two() {
        let stv = StateVector::new(vec![Amplitude::ONE, Amplitude::ZERO, Amplitude::ZERO]);
        assert!(!stv.is_valid());
    }

    #[test]
    fn test_rejects_unnormalized() {
        let stv = StateVector::new(vec![Amplitude::new(0.8, 0.0), Amplitude::new(0.8, 0.0)]);
        assert!(!stv.is_valid());
    }

    #[test]
    fn test_tolerance_band() {
        // Squared norm 1.08 is inside the 0.1 tolerance.
        let a = (1.08f64 / 2.0).sqrt();
        let stv = StateVector::new(vec![Amplitude::new(a, 0.0), Amplitude::new(a, 0.0)]);
        assert!(stv.is_valid());
    }

    #[test]
    fn test_matches() {
        let even = Amplitude::new(std::f64::consts::FRAC_1_SQRT_2, 0.0);
        let plus = StateVector::new(vec![even, even]);
        assert!(plus.matches(&plus.clone(), StateVector::TOLERANCE));
        assert!(!plus.matches(&StateVector::basis(1), StateVector::TOLERANCE));
        // A bigger robot state can match a smaller target prefix.
        let padded = StateVector::new(vec![even, even, Amplitude::ZERO, Amplitude::ZERO]);
        assert!(plus.matches(&padded, StateVector::TOLERANCE));
        assert!(!padded.matches(&plus, StateVector::TOLERANCE));
    }
}
