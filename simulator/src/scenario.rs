use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One seed aircraft for the synthetic feed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AircraftSpec {
    pub mode_s: String,
    pub lat: f64,
    pub lon: f64,
    pub heading_deg: f64,
    pub speed_kts: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub aircraft: Vec<AircraftSpec>,
}

impl ScenarioConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading scenario {}", path_ref.display()))?;
        let config: ScenarioConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing scenario {}", path_ref.display()))?;
        Ok(config)
    }

    /// Default traffic around Tbilisi.
    pub fn default_with_count(count: usize) -> Self {
        let seeds = [
            ("4B1634", 41.70, 44.78, 285.0, 430.0),
            ("4B1807", 41.62, 44.95, 96.0, 410.0),
            ("4BA2F1", 41.83, 44.61, 182.0, 385.0),
            ("40662A", 41.55, 44.70, 14.0, 455.0),
            ("4CA881", 41.76, 45.02, 247.0, 396.0),
            ("4B19E3", 41.91, 44.88, 131.0, 372.0),
            ("406B4D", 41.48, 44.52, 58.0, 441.0),
            ("4BB146", 41.67, 44.40, 322.0, 405.0),
        ];

        let aircraft = seeds
            .iter()
            .cycle()
            .take(count.max(1))
            .enumerate()
            .map(
                |(idx, &(mode_s, lat, lon, heading_deg, speed_kts))| AircraftSpec {
                    // Cycled entries get a suffixed code so identifiers stay
                    // unique past the seed list.
                    mode_s: if idx < seeds.len() {
                        mode_s.to_string()
                    } else {
                        format!("{mode_s}{:02X}", idx)
                    },
                    lat,
                    lon,
                    heading_deg,
                    speed_kts,
                },
            )
            .collect();

        Self { aircraft }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn default_scenario_has_unique_codes() {
        let scenario = ScenarioConfig::default_with_count(12);
        assert_eq!(scenario.aircraft.len(), 12);
        let mut codes: Vec<_> = scenario.aircraft.iter().map(|a| &a.mode_s).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 12);
    }

    #[test]
    fn scenario_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"aircraft:\n  - mode_s: AA1111\n    lat: 41.7\n    lon: 44.78\n    heading_deg: 90.0\n    speed_kts: 420.0\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let scenario = ScenarioConfig::load(&path).unwrap();
        assert_eq!(scenario.aircraft.len(), 1);
        assert_eq!(scenario.aircraft[0].mode_s, "AA1111");
    }
}
