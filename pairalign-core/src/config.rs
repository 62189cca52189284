//! Aligner configuration
//!
//! Options are kept signed so out-of-range values coming from config files
//! are reported by `validate` rather than rejected by the deserializer.

use serde::{Deserialize, Serialize};

use crate::cluster::{ClusterParams, ClusterScoreMethod, DEFAULT_FIXED_SEPARATION};
use crate::error::{AlignError, AlignResult};
use crate::scoring::{GapModel, GapPenalty};
use crate::seed::SeedParams;
use crate::stitch::StitchParams;

/// Options of the seed-and-cluster aligner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NucmerParams {
    /// Minimum exact-match length
    #[serde(default = "default_length_of_mum")]
    pub length_of_mum: i64,

    /// Diagonal drift always tolerated between chained matches
    #[serde(default = "default_fixed_separation")]
    pub fixed_separation: i64,

    /// Largest gap between chained matches
    #[serde(default = "default_maximum_separation")]
    pub maximum_separation: i64,

    /// Clusters scoring below this are dropped
    #[serde(default = "default_minimum_score")]
    pub minimum_score: i64,

    /// Drift tolerated per unit of separation; negative disables separation checks
    #[serde(default = "default_separation_factor")]
    pub separation_factor: f64,

    /// Largest combined gap bridged inside one segment
    #[serde(default = "default_break_length")]
    pub break_length: i64,

    #[serde(default = "default_gap_open_cost")]
    pub gap_open_cost: i32,

    #[serde(default = "default_gap_extension_cost")]
    pub gap_extension_cost: i32,

    /// Largest side of a gap-fill interval
    #[serde(default = "default_maximum_alignment_length")]
    pub maximum_alignment_length: i64,

    /// Skip the reverse-complement search
    #[serde(default)]
    pub forward_only: bool,

    /// Only seed from matches unique in the reference
    #[serde(default = "default_unique_matches")]
    pub unique_matches: bool,

    #[serde(default)]
    pub score_method: ClusterScoreMethod,
}

fn default_length_of_mum() -> i64 {
    20
}
fn default_fixed_separation() -> i64 {
    DEFAULT_FIXED_SEPARATION as i64
}
fn default_maximum_separation() -> i64 {
    1000
}
fn default_minimum_score() -> i64 {
    200
}
fn default_separation_factor() -> f64 {
    0.05
}
fn default_break_length() -> i64 {
    200
}
fn default_gap_open_cost() -> i32 {
    -13
}
fn default_gap_extension_cost() -> i32 {
    -8
}
fn default_maximum_alignment_length() -> i64 {
    10_000
}
fn default_unique_matches() -> bool {
    true
}

impl Default for NucmerParams {
    fn default() -> Self {
        Self {
            length_of_mum: default_length_of_mum(),
            fixed_separation: default_fixed_separation(),
            maximum_separation: default_maximum_separation(),
            minimum_score: default_minimum_score(),
            separation_factor: default_separation_factor(),
            break_length: default_break_length(),
            gap_open_cost: default_gap_open_cost(),
            gap_extension_cost: default_gap_extension_cost(),
            maximum_alignment_length: default_maximum_alignment_length(),
            forward_only: false,
            unique_matches: default_unique_matches(),
            score_method: ClusterScoreMethod::default(),
        }
    }
}

impl NucmerParams {
    /// Reject out-of-range or contradictory options
    pub fn validate(&self) -> AlignResult<()> {
        let require = |ok: bool, message: String| {
            if ok {
                Ok(())
            } else {
                Err(AlignError::invalid_configuration(message))
            }
        };

        require(
            self.length_of_mum >= 1,
            format!("LengthOfMUM must be at least 1, got {}", self.length_of_mum),
        )?;
        require(
            self.minimum_score >= 0,
            format!("MinimumScore must not be negative, got {}", self.minimum_score),
        )?;
        require(
            self.maximum_separation >= 0,
            format!("MaximumSeparation must not be negative, got {}", self.maximum_separation),
        )?;
        require(
            self.fixed_separation >= 0,
            format!("FixedSeparation must not be negative, got {}", self.fixed_separation),
        )?;
        require(
            self.break_length >= 0,
            format!("BreakLength must not be negative, got {}", self.break_length),
        )?;
        require(
            self.maximum_alignment_length >= 1,
            format!(
                "MaximumAlignmentLength must be at least 1, got {}",
                self.maximum_alignment_length
            ),
        )?;
        require(
            self.separation_factor.is_finite(),
            format!("SeparationFactor must be finite, got {}", self.separation_factor),
        )?;

        let fixed_changed = self.fixed_separation != default_fixed_separation();
        let factor_changed = self.separation_factor >= 0.0
            && self.separation_factor != default_separation_factor();
        require(
            !(fixed_changed && factor_changed),
            format!(
                "FixedSeparation ({}) and SeparationFactor ({}) cannot both be set",
                self.fixed_separation, self.separation_factor
            ),
        )?;

        self.gap_penalty().validate()
    }

    pub fn gap_penalty(&self) -> GapPenalty {
        GapPenalty::new(self.gap_open_cost, self.gap_extension_cost)
    }

    pub fn seed_params(&self) -> SeedParams {
        SeedParams {
            min_length: self.length_of_mum.max(1) as usize,
            unique: self.unique_matches,
            forward_only: self.forward_only,
        }
    }

    pub fn cluster_params(&self) -> ClusterParams {
        ClusterParams {
            maximum_separation: self.maximum_separation.max(0) as usize,
            fixed_separation: self.fixed_separation.max(0) as usize,
            separation_factor: self.separation_factor,
            minimum_score: self.minimum_score,
            score_method: self.score_method,
        }
    }

    pub fn stitch_params(&self, gap_model: GapModel) -> StitchParams {
        StitchParams {
            break_length: self.break_length.max(0) as usize,
            maximum_alignment_length: self.maximum_alignment_length.max(1) as usize,
            gap_model,
        }
    }
}

/// Options of the direct dynamic-programming aligner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DpParams {
    #[serde(default = "default_dp_gap_open_cost")]
    pub gap_open_cost: i32,

    #[serde(default = "default_dp_gap_extension_cost")]
    pub gap_extension_cost: i32,
}

fn default_dp_gap_open_cost() -> i32 {
    -8
}
fn default_dp_gap_extension_cost() -> i32 {
    -1
}

impl Default for DpParams {
    fn default() -> Self {
        Self {
            gap_open_cost: default_dp_gap_open_cost(),
            gap_extension_cost: default_dp_gap_extension_cost(),
        }
    }
}

impl DpParams {
    pub fn validate(&self) -> AlignResult<()> {
        self.gap_penalty().validate()
    }

    pub fn gap_penalty(&self) -> GapPenalty {
        GapPenalty::new(self.gap_open_cost, self.gap_extension_cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expect_invalid(params: NucmerParams) {
        assert!(matches!(
            params.validate(),
            Err(AlignError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_defaults_are_valid() {
        let params = NucmerParams::default();
        params.validate().unwrap();
        assert_eq!(params.length_of_mum, 20);
        assert_eq!(params.gap_penalty(), GapPenalty::new(-13, -8));
        assert!(!params.forward_only);
        DpParams::default().validate().unwrap();
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        expect_invalid(NucmerParams { length_of_mum: 0, ..Default::default() });
        expect_invalid(NucmerParams { minimum_score: -1, ..Default::default() });
        expect_invalid(NucmerParams { maximum_separation: -5, ..Default::default() });
        expect_invalid(NucmerParams { break_length: -1, ..Default::default() });
        expect_invalid(NucmerParams { maximum_alignment_length: 0, ..Default::default() });
        expect_invalid(NucmerParams { gap_open_cost: 2, ..Default::default() });
        expect_invalid(NucmerParams { fixed_separation: -1, ..Default::default() });
        expect_invalid(NucmerParams { separation_factor: f64::NAN, ..Default::default() });
    }

    #[test]
    fn test_conflicting_separation_settings() {
        expect_invalid(NucmerParams {
            fixed_separation: 10,
            separation_factor: 0.2,
            ..Default::default()
        });

        // A disabled factor may accompany any fixed separation
        NucmerParams {
            fixed_separation: 0,
            separation_factor: -1.0,
            ..Default::default()
        }
        .validate()
        .unwrap();

        NucmerParams {
            fixed_separation: 10,
            ..Default::default()
        }
        .validate()
        .unwrap();
    }

    #[test]
    fn test_derived_params() {
        let params = NucmerParams {
            length_of_mum: 5,
            break_length: 2,
            maximum_separation: 0,
            forward_only: true,
            ..Default::default()
        };
        assert_eq!(params.seed_params().min_length, 5);
        assert!(params.seed_params().forward_only);
        assert_eq!(params.cluster_params().maximum_separation, 0);
        assert_eq!(params.stitch_params(GapModel::Linear).break_length, 2);
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let json = r#"{"length_of_mum": 3, "separation_factor": -1.0}"#;
        let params: NucmerParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.length_of_mum, 3);
        assert_eq!(params.minimum_score, 200);
        assert_eq!(params.score_method, ClusterScoreMethod::MatchLength);
        assert!(params.unique_matches);
    }
}
