//! Run request schema definitions.
//!
//! Every section carries the simulation service's own defaults so a partial
//! document (or none at all) still produces a complete configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    pub altitude_m: Option<f64>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "Default Site".to_string(),
            latitude: 31.9686,
            longitude: -99.9018,
            timezone: "America/Chicago".to_string(),
            altitude_m: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WeatherConfig {
    pub source: String,
    pub years: Vec<i32>,
    pub interval_min: u32,
    pub leap_day: bool,
    pub cache_dir: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            source: "nsrdb".to_string(),
            years: (2003..2023).collect(),
            interval_min: 30,
            leap_day: false,
            cache_dir: "./cache".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DcModel {
    #[default]
    Pvwatts,
    Singlediode,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PvConfig {
    pub surface_tilt_deg: f64,
    pub surface_azimuth_deg: f64,
    pub dc_nameplate_kw: f64,
    pub dc_model: DcModel,
    pub gamma_pdc_per_c: f64,
    pub mppt_eff: f64,
    pub dc_wiring_eff: f64,
}

impl Default for PvConfig {
    fn default() -> Self {
        Self {
            surface_tilt_deg: 20.0,
            surface_azimuth_deg: 180.0,
            dc_nameplate_kw: 1.0,
            dc_model: DcModel::Pvwatts,
            gamma_pdc_per_c: -0.003,
            mppt_eff: 0.99,
            dc_wiring_eff: 0.99,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BatteryConfig {
    pub energy_capacity_kwh: f64,
    pub soc_init: f64,
    pub soc_min: f64,
    pub soc_max: f64,
    /// Open-circuit voltage curve breakpoints (state of charge).
    pub ocv_soc: Vec<f64>,
    /// Open-circuit voltage curve values (volts), paired with `ocv_soc`.
    pub ocv_v: Vec<f64>,
    pub r_internal_ohm: f64,
    pub i_charge_max_a: f64,
    pub i_discharge_max_a: f64,
    pub charge_eff: f64,
    pub discharge_eff: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            energy_capacity_kwh: 10.0,
            soc_init: 0.5,
            soc_min: 0.05,
            soc_max: 0.95,
            ocv_soc: vec![0.0, 0.2, 0.5, 0.8, 1.0],
            ocv_v: vec![3.0, 3.4, 3.65, 3.9, 4.1],
            r_internal_ohm: 0.02,
            i_charge_max_a: 200.0,
            i_discharge_max_a: 200.0,
            charge_eff: 0.97,
            discharge_eff: 0.97,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GpuConfig {
    pub n_gpus: u32,
    pub p_idle_w: f64,
    pub p_max_w: f64,
    pub flops_peak_per_gpu: f64,
    pub power_exponent: f64,
}

impl Default for GpuConfig {
    fn default() -> Self {
        Self {
            n_gpus: 1,
            p_idle_w: 80.0,
            p_max_w: 700.0,
            flops_peak_per_gpu: 1e15,
            power_exponent: 3.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GovernorConfig {
    pub enabled: bool,
    pub reserve_soc: f64,
    pub safety_factor: f64,
    pub ramp_limit_w_per_step: f64,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reserve_soc: 0.07,
            safety_factor: 0.95,
            ramp_limit_w_per_step: 200.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    pub dt_min: u32,
    pub coupling_mode: String,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt_min: 30,
            coupling_mode: "mppt_bus".to_string(),
        }
    }
}

/// Complete simulation configuration sent with every run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct FullConfig {
    pub site: SiteConfig,
    pub weather: WeatherConfig,
    pub pv: PvConfig,
    pub battery: BatteryConfig,
    pub gpu: GpuConfig,
    pub governor: GovernorConfig,
    pub sim: SimConfig,
}

/// Default PV sizes swept when none are given (kWdc).
pub const DEFAULT_PV_KW_LIST: [f64; 7] = [0.0, 0.5, 1.0, 2.0, 3.0, 4.0, 5.0];

/// Default battery sizes swept when none are given (kWh).
pub const DEFAULT_BATT_KWH_LIST: [f64; 5] = [0.0, 2.0, 5.0, 10.0, 20.0];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunOptions {
    pub single_year: Option<i32>,
    pub use_all_years: bool,
    pub pv_kw_list: Vec<f64>,
    pub batt_kwh_list: Vec<f64>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            single_year: Some(2021),
            use_all_years: false,
            pv_kw_list: DEFAULT_PV_KW_LIST.to_vec(),
            batt_kwh_list: DEFAULT_BATT_KWH_LIST.to_vec(),
        }
    }
}

impl RunOptions {
    /// Number of simulations a sweep with these options performs.
    pub fn sweep_size(&self) -> usize {
        self.pv_kw_list.len() * self.batt_kwh_list.len()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Single,
    Sweep,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Single => "single",
            RunMode::Sweep => "sweep",
        }
    }
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request to start a simulation run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunRequest {
    pub mode: RunMode,
    pub config: FullConfig,
    #[serde(default, rename = "run_options")]
    pub options: RunOptions,
}

impl RunRequest {
    pub fn single(config: FullConfig, options: RunOptions) -> Self {
        Self {
            mode: RunMode::Single,
            config,
            options,
        }
    }

    pub fn sweep(config: FullConfig, options: RunOptions) -> Self {
        Self {
            mode: RunMode::Sweep,
            config,
            options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_document_fills_defaults() {
        let yaml = "site:\n  name: Austin\n  latitude: 30.27\npv:\n  dc_nameplate_kw: 4.5\n";
        let config: FullConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.site.name, "Austin");
        assert_eq!(config.site.latitude, 30.27);
        assert_eq!(config.site.longitude, -99.9018);
        assert_eq!(config.pv.dc_nameplate_kw, 4.5);
        assert_eq!(config.pv.surface_tilt_deg, 20.0);
        assert_eq!(config.battery, BatteryConfig::default());
        assert_eq!(config.weather.years.first(), Some(&2003));
        assert_eq!(config.weather.years.last(), Some(&2022));
    }

    #[test]
    fn request_uses_wire_field_names() {
        let request = RunRequest::sweep(FullConfig::default(), RunOptions::default());
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["mode"], "sweep");
        assert!(value.get("run_options").is_some());
        assert_eq!(value["config"]["pv"]["dc_model"], "pvwatts");
        assert_eq!(value["run_options"]["single_year"], 2021);
    }

    #[test]
    fn request_without_options_uses_defaults() {
        let json = r#"{"mode": "single", "config": {}}"#;
        let request: RunRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.mode, RunMode::Single);
        assert_eq!(request.options, RunOptions::default());
        assert_eq!(request.options.sweep_size(), 35);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let json = r#"{"mode": "batch", "config": {}}"#;
        assert!(serde_json::from_str::<RunRequest>(json).is_err());
    }
}
