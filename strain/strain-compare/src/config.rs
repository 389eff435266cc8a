//! Pipeline configuration.

use std::path::Path;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use strain_compile::CompileParams;
use strain_registration::{AlignParams, IcpParams, InitialAlignment};
use strain_volume::{ExtrudeParams, ProbeParams, DEFAULT_EXTRUDE_LENGTH, DEFAULT_PROBE_FIELD};

use crate::{StrainError, StrainResult};

/// Default output name for the receiver values.
pub const DEFAULT_RECEIVER_NAME: &str = "Drop Tower Strain";
/// Default output name for the donor values.
pub const DEFAULT_DONOR_NAME: &str = "Instron Strain";

/// Settings for [`compare_surfaces`](crate::compare_surfaces).
///
/// Every field has a default, so a JSON config only needs the keys it
/// changes:
///
/// ```
/// use strain_compare::PipelineConfig;
///
/// let config = PipelineConfig::from_json_str(
///     r#"{ "initial": { "kind": "parameters",
///                       "translation": [0.0, 0.0, 2.0],
///                       "rotation_degrees": [0.0, 0.0, 90.0] },
///          "extrude_length": 2.5 }"#,
/// )
/// .unwrap();
/// assert_eq!(config.extrude_length, 2.5);
/// assert_eq!(config.icp.max_iterations, 50);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Initial placement of the receiver before ICP.
    pub initial: InitialAlignment,
    /// ICP refinement settings.
    pub icp: IcpParams,
    /// Donor extrusion direction (default: +Z).
    pub extrude_direction: Vector3<f64>,
    /// Donor extrusion offset on each side (default: 5.0).
    pub extrude_length: f64,
    /// Name of the probed donor field (default: "Extracted Data").
    pub probe_field_name: String,
    /// Output name of the receiver values.
    pub receiver_name: String,
    /// Output name of the donor values.
    pub donor_name: String,
    /// Output name of the difference (default: "delta").
    pub delta_name: String,
    /// Receiver input field; `None` uses the receiver's only field.
    pub receiver_field: Option<String>,
    /// Donor input field; `None` uses the donor's only field.
    pub donor_field: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            initial: InitialAlignment::Identity,
            icp: IcpParams::default(),
            extrude_direction: Vector3::z(),
            extrude_length: DEFAULT_EXTRUDE_LENGTH,
            probe_field_name: DEFAULT_PROBE_FIELD.to_string(),
            receiver_name: DEFAULT_RECEIVER_NAME.to_string(),
            donor_name: DEFAULT_DONOR_NAME.to_string(),
            delta_name: "delta".to_string(),
            receiver_field: None,
            donor_field: None,
        }
    }
}

impl PipelineConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StrainError::ConfigParse`] for malformed JSON.
    pub fn from_json_str(json: &str) -> StrainResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`StrainError::ConfigFile`] if the file cannot be read and
    /// [`StrainError::ConfigParse`] if it is malformed.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> StrainResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| StrainError::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Serializes the configuration as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`StrainError::ConfigParse`] if serialization fails.
    pub fn to_json(&self) -> StrainResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Sets the initial alignment.
    #[must_use]
    pub const fn with_initial(mut self, initial: InitialAlignment) -> Self {
        self.initial = initial;
        self
    }

    /// Sets the ICP parameters.
    #[must_use]
    pub const fn with_icp(mut self, icp: IcpParams) -> Self {
        self.icp = icp;
        self
    }

    /// Sets the extrusion direction.
    #[must_use]
    pub const fn with_extrude_direction(mut self, direction: Vector3<f64>) -> Self {
        self.extrude_direction = direction;
        self
    }

    /// Sets the extrusion offset.
    #[must_use]
    pub const fn with_extrude_length(mut self, length: f64) -> Self {
        self.extrude_length = length;
        self
    }

    /// Sets the receiver and donor output names.
    #[must_use]
    pub fn with_names(mut self, receiver: impl Into<String>, donor: impl Into<String>) -> Self {
        self.receiver_name = receiver.into();
        self.donor_name = donor.into();
        self
    }

    /// Selects the receiver input field by name.
    #[must_use]
    pub fn with_receiver_field(mut self, name: impl Into<String>) -> Self {
        self.receiver_field = Some(name.into());
        self
    }

    /// Selects the donor input field by name.
    #[must_use]
    pub fn with_donor_field(mut self, name: impl Into<String>) -> Self {
        self.donor_field = Some(name.into());
        self
    }

    pub(crate) fn align_params(&self) -> AlignParams {
        AlignParams::new()
            .with_initial(self.initial)
            .with_icp(self.icp.clone())
    }

    pub(crate) fn extrude_params(&self) -> ExtrudeParams {
        let params = ExtrudeParams::new(self.extrude_direction).with_length(self.extrude_length);
        match &self.donor_field {
            Some(field) => params.with_field(field.clone()),
            None => params,
        }
    }

    pub(crate) fn probe_params(&self) -> ProbeParams {
        ProbeParams::new().with_output_name(self.probe_field_name.clone())
    }

    pub(crate) fn compile_params(&self) -> CompileParams {
        let params = CompileParams::new()
            .with_names(self.receiver_name.clone(), self.donor_name.clone())
            .with_delta_name(self.delta_name.clone())
            .with_donor_field(self.probe_field_name.clone());
        match &self.receiver_field {
            Some(field) => params.with_receiver_field(field.clone()),
            None => params,
        }
    }
}
