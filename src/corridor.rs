//! Eco-corridor context and SNC payload shaping.
//!
//! Callers describe the corridor in camelCase (`corridorId`, `requiresOptOut`,
//! `waterM3`); the decision system expects snake_case objects. Everything here
//! is a field mapping, nothing is validated or submitted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse legal tier for a corridor.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CorridorTier {
    Tribal,
    Municipal,
    County,
    State,
    Federal,
    International,
    /// Internal doctrine profiles
    InternalDoctrine,
}

/// Trust / enforcement strength of the corridor.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum CorridorStrength {
    /// Binding FPIC plus community veto; actuation blocked on deny.
    HardVeto,
    /// Enforceable obligations, weaker FPIC.
    StrongGuard,
    /// Informative only; cannot by itself permit actuation.
    AdvisoryOnly,
}

/// Jurisdictional tier + semantic name + version.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CorridorId {
    pub tier: CorridorTier,
    /// e.g. "tribal.gric-epa-2024", "city.phx-smartinfra-2024"
    pub code: String,
    pub version: String,
}

impl fmt::Display for CorridorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.code, self.version)
    }
}

/// FPIC / Indigenous Data Sovereignty state as the decision system sees it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FpicIdsState {
    pub fpic_granted: bool,
    pub revocable: bool,
    pub last_decision_utc: String,
    pub community_veto_active: bool,
}

/// Neurorights / mental-privacy capsule attached to the corridor.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NeurorightsCapsuleHgo {
    pub inner_outer_enforced: bool,
    /// Neural data restricted to host-local safety use
    pub neural_data_safety_only: bool,
    pub requires_opt_out_channels: bool,
    /// Inner-domain signals never used for access control or scoring
    pub forbids_inner_for_access: bool,
}

/// Outer-domain environmental deltas for one operation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EcoImpactMetrics {
    pub delta_emissions_co2e: f64,
    pub delta_pm25: f64,
    pub delta_water_use_m3: f64,
    pub delta_heat_index_c: f64,
}

/// Fully bound corridor context passed into every SNC.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EcoCorridorContext {
    pub corridor_id: CorridorId,
    pub strength: CorridorStrength,
    pub fpic: FpicIdsState,
    pub neurorights: NeurorightsCapsuleHgo,
    pub eco: EcoImpactMetrics,
    /// Serialized as `null` when absent.
    pub jurisdiction_profile_id: Option<String>,
}

impl EcoCorridorContext {
    /// A hard-veto corridor refuses actuation without FPIC or under an active veto.
    pub fn actuation_blocked(&self) -> bool {
        match self.strength {
            CorridorStrength::HardVeto => {
                !self.fpic.fpic_granted || self.fpic.community_veto_active
            }
            CorridorStrength::StrongGuard | CorridorStrength::AdvisoryOnly => false,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SncPayload {
    pub plane: String,
    pub intent_label: String,
    pub eco_cost_nj: f64,
    pub risk_score: f64,
}

/// Caller-side neurorights flags.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NeurorightsSettings {
    pub inner_outer_enforced: bool,
    pub neural_data_safety_only: bool,
    pub requires_opt_out: bool,
    pub forbids_inner_for_access: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CorridorClientConfig {
    pub corridor_id: CorridorId,
    pub strength: CorridorStrength,
    pub neurorights: NeurorightsSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub juris_profile_id: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FpicState {
    pub fpic_granted: bool,
    pub revocable: bool,
    pub last_decision_utc: String,
    pub community_veto_active: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EcoDelta {
    pub co2e: f64,
    pub pm25: f64,
    pub water_m3: f64,
    pub heat_c: f64,
}

pub struct EcoCorridorClient {
    config: CorridorClientConfig,
}

impl EcoCorridorClient {
    pub fn new(config: CorridorClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CorridorClientConfig {
        &self.config
    }

    pub fn build_context(&self, eco_delta: &EcoDelta, fpic_state: &FpicState) -> EcoCorridorContext {
        let nr = &self.config.neurorights;
        EcoCorridorContext {
            corridor_id: self.config.corridor_id.clone(),
            strength: self.config.strength,
            fpic: FpicIdsState {
                fpic_granted: fpic_state.fpic_granted,
                revocable: fpic_state.revocable,
                last_decision_utc: fpic_state.last_decision_utc.clone(),
                community_veto_active: fpic_state.community_veto_active,
            },
            neurorights: NeurorightsCapsuleHgo {
                inner_outer_enforced: nr.inner_outer_enforced,
                neural_data_safety_only: nr.neural_data_safety_only,
                requires_opt_out_channels: nr.requires_opt_out,
                forbids_inner_for_access: nr.forbids_inner_for_access,
            },
            eco: EcoImpactMetrics {
                delta_emissions_co2e: eco_delta.co2e,
                delta_pm25: eco_delta.pm25,
                delta_water_use_m3: eco_delta.water_m3,
                delta_heat_index_c: eco_delta.heat_c,
            },
            jurisdiction_profile_id: self
                .config
                .juris_profile_id
                .clone()
                .filter(|id| !id.is_empty()),
        }
    }

    pub fn build_snc_payload(
        &self,
        plane: impl Into<String>,
        intent_label: impl Into<String>,
        eco_cost_nj: f64,
        risk_score: f64,
    ) -> SncPayload {
        SncPayload {
            plane: plane.into(),
            intent_label: intent_label.into(),
            eco_cost_nj,
            risk_score,
        }
    }
}
