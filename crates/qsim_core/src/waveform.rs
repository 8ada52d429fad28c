//! Pulse shapes for QSIM
//!
//! Gantree: L0_Foundation → PulseShape
//!
//! Envelope of a played pulse, resolved from the configuration table.
//! Samples are complex: the real part drives I, the imaginary part drives Q.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pulse envelope
/// Gantree: PulseShape // Constant | Arbitrary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PulseShape {
    /// Flat envelope for the whole pulse length
    Constant {
        /// Complex amplitude (I + iQ)
        amplitude: Complex64,
    },
    /// Sample-by-sample envelope
    Arbitrary {
        /// Complex samples (I + iQ)
        samples: Vec<Complex64>,
    },
}

impl PulseShape {
    /// Constant envelope
    pub fn constant(amplitude: Complex64) -> Self {
        PulseShape::Constant { amplitude }
    }

    /// Arbitrary envelope
    pub fn arbitrary(samples: Vec<Complex64>) -> Self {
        PulseShape::Arbitrary { samples }
    }

    /// Check if envelope is flat
    pub fn is_constant(&self) -> bool {
        matches!(self, PulseShape::Constant { .. })
    }

    /// Envelope scaled by a real factor
    pub fn scaled(&self, factor: f64) -> Self {
        match self {
            PulseShape::Constant { amplitude } => PulseShape::Constant {
                amplitude: *amplitude * factor,
            },
            PulseShape::Arbitrary { samples } => PulseShape::Arbitrary {
                samples: samples.iter().map(|s| *s * factor).collect(),
            },
        }
    }

    /// Largest sample magnitude
    pub fn peak_amplitude(&self) -> f64 {
        match self {
            PulseShape::Constant { amplitude } => amplitude.norm(),
            PulseShape::Arbitrary { samples } => {
                samples.iter().map(|s| s.norm()).fold(0.0, f64::max)
            }
        }
    }

    /// Materialize `duration` samples.
    ///
    /// Arbitrary envelopes shorter than `duration` are padded with zeros and
    /// longer ones are truncated.
    pub fn samples(&self, duration: usize) -> Vec<Complex64> {
        match self {
            PulseShape::Constant { amplitude } => vec![*amplitude; duration],
            PulseShape::Arbitrary { samples } => samples
                .iter()
                .copied()
                .chain(std::iter::repeat(Complex64::new(0.0, 0.0)))
                .take(duration)
                .collect(),
        }
    }
}

impl fmt::Display for PulseShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PulseShape::Constant { amplitude } => {
                write!(f, "constant({:.4}{:+.4}j)", amplitude.re, amplitude.im)
            }
            PulseShape::Arbitrary { samples } => write!(f, "arbitrary[{}]", samples.len()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_scaled() {
        let shape = PulseShape::constant(Complex64::new(0.2, 0.1)).scaled(0.5);
        assert_eq!(shape, PulseShape::constant(Complex64::new(0.1, 0.05)));
    }

    #[test]
    fn test_peak_amplitude() {
        let shape = PulseShape::arbitrary(vec![
            Complex64::new(0.1, 0.0),
            Complex64::new(0.3, 0.4),
            Complex64::new(0.0, 0.2),
        ]);
        assert_relative_eq!(shape.peak_amplitude(), 0.5);
    }

    #[test]
    fn test_samples_padding() {
        let shape = PulseShape::arbitrary(vec![Complex64::new(1.0, 0.0); 2]);
        let samples = shape.samples(4);
        assert_eq!(samples.len(), 4);
        assert_eq!(samples[3], Complex64::new(0.0, 0.0));

        assert_eq!(shape.samples(1).len(), 1);
    }

    #[test]
    fn test_display() {
        let shape = PulseShape::arbitrary(vec![Complex64::new(0.0, 0.0); 16]);
        assert_eq!(shape.to_string(), "arbitrary[16]");
    }
}
