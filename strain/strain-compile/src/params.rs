//! Compile parameters.

use crate::{CompileError, CompileResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Output field names and input field selection for
/// [`compile_data`](crate::compile_data).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CompileParams {
    /// Name of the output receiver field (default: "receiver").
    pub receiver_name: String,
    /// Name of the output donor field (default: "donor").
    pub donor_name: String,
    /// Name of the output difference field (default: "delta").
    pub delta_name: String,
    /// Receiver input field; `None` uses the receiver's only field.
    pub receiver_field: Option<String>,
    /// Donor input field; `None` uses the donor's only field.
    pub donor_field: Option<String>,
}

impl Default for CompileParams {
    fn default() -> Self {
        Self {
            receiver_name: "receiver".to_string(),
            donor_name: "donor".to_string(),
            delta_name: "delta".to_string(),
            receiver_field: None,
            donor_field: None,
        }
    }
}

impl CompileParams {
    /// Creates parameters with default names.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output receiver and donor field names.
    #[must_use]
    pub fn with_names(mut self, receiver: impl Into<String>, donor: impl Into<String>) -> Self {
        self.receiver_name = receiver.into();
        self.donor_name = donor.into();
        self
    }

    /// Sets the output difference field name.
    #[must_use]
    pub fn with_delta_name(mut self, name: impl Into<String>) -> Self {
        self.delta_name = name.into();
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

    pub(crate) fn validate(&self) -> CompileResult<()> {
        let names = [&self.receiver_name, &self.donor_name, &self.delta_name];
        if names.iter().any(|n| n.is_empty()) {
            return Err(CompileError::InvalidParameter(
                "output field names must not be empty".to_string(),
            ));
        }
        if names[0] == names[1] || names[0] == names[2] || names[1] == names[2] {
            return Err(CompileError::InvalidParameter(format!(
                "output field names must be distinct: {:?}, {:?}, {:?}",
                names[0], names[1], names[2]
            )));
        }
        Ok(())
    }
}
