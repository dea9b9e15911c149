use serde::{Deserialize, Deserializer, Serialize};

/// Snapshot returned by `/neighborhoods/{id}/metrics`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NeighborhoodMetrics {
    pub name: String,
    pub air: AirQuality,
    pub water: WaterQuality,
    pub climate: ClimateMetrics,
    pub karma: KarmaMetrics,
    pub safety: SafetyMetrics,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AirQuality {
    /// µg/m³
    pub pm25: f64,
    /// ppb
    pub no2: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WaterQuality {
    pub lead_ppb: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClimateMetrics {
    pub heat_index_c: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct KarmaMetrics {
    pub score: f64,
    #[serde(deserialize_with = "de_count")]
    pub veto_events: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SafetyMetrics {
    /// Incidents in the trailing 24h window
    #[serde(deserialize_with = "de_count")]
    pub bci_incidents: u64,
}

/// Counts arrive as JSON numbers; some feeds send them as `2.0`.
/// Whole, non-negative values are accepted either way.
fn de_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let n = serde_json::Number::deserialize(deserializer)?;
    if let Some(u) = n.as_u64() {
        return Ok(u);
    }
    match n.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Ok(f as u64),
        _ => Err(D::Error::custom(format!(
            "expected a non-negative whole count, got {n}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_endpoint_payload_and_ignores_extra_fields() {
        let body = r#"{
            "name": "West Phoenix",
            "air": { "pm25": 12.4, "no2": 18, "o3": 40 },
            "water": { "lead_ppb": 3.1 },
            "climate": { "heat_index_c": 41.5 },
            "karma": { "score": 0.82, "veto_events": 2 },
            "safety": { "bci_incidents": 0 },
            "generated_by": "sensor-mesh"
        }"#;

        let m: NeighborhoodMetrics = serde_json::from_str(body).unwrap();
        assert_eq!(m.name, "West Phoenix");
        assert_eq!(m.air.no2, 18.0);
        assert_eq!(m.karma.veto_events, 2);
    }

    #[test]
    fn whole_float_counts_are_accepted() {
        let body = r#"{
            "name": "x",
            "air": { "pm25": 1, "no2": 1 },
            "water": { "lead_ppb": 0 },
            "climate": { "heat_index_c": 30 },
            "karma": { "score": 1, "veto_events": 2.0 },
            "safety": { "bci_incidents": 0.0 }
        }"#;
        let m: NeighborhoodMetrics = serde_json::from_str(body).unwrap();
        assert_eq!(m.karma.veto_events, 2);
        assert_eq!(m.safety.bci_incidents, 0);
    }

    #[test]
    fn fractional_or_negative_counts_are_rejected() {
        for bad in ["2.5", "-1"] {
            let body = format!(
                r#"{{
                    "name": "x",
                    "air": {{ "pm25": 1, "no2": 1 }},
                    "water": {{ "lead_ppb": 0 }},
                    "climate": {{ "heat_index_c": 30 }},
                    "karma": {{ "score": 1, "veto_events": {bad} }},
                    "safety": {{ "bci_incidents": 0 }}
                }}"#
            );
            let err = serde_json::from_str::<NeighborhoodMetrics>(&body).unwrap_err();
            assert!(err.to_string().contains("whole count"), "{bad}: {err}");
        }
    }

    #[test]
    fn missing_section_is_rejected() {
        let body = r#"{ "name": "x", "air": { "pm25": 1, "no2": 1 } }"#;
        assert!(serde_json::from_str::<NeighborhoodMetrics>(body).is_err());
    }
}
