//! Registry-wide mapping options.

use serde::{Deserialize, Serialize};

/// What to write when a missing value meets a non-nullable destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullPolicy {
    /// Fail the mapping with a null value error.
    #[default]
    Reject,
    /// Write the destination type's default value.
    UseDefault,
}

/// What to do when the source side of a collection binding is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsentCollection {
    /// Reconcile the destination against an empty sequence.
    #[default]
    TreatAsEmpty,
    /// Leave the destination collection untouched.
    Skip,
}

/// Options shared by every mapper of a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapOptions {
    /// Nullable source into non-nullable destination.
    pub null_policy: NullPolicy,

    pub absent_source_collection: AbsentCollection,
}

impl MapOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_null_policy(mut self, policy: NullPolicy) -> Self {
        self.null_policy = policy;
        self
    }

    pub fn with_absent_source_collection(mut self, policy: AbsentCollection) -> Self {
        self.absent_source_collection = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_strict() {
        let options = MapOptions::new();
        assert_eq!(options.null_policy, NullPolicy::Reject);
        assert_eq!(options.absent_source_collection, AbsentCollection::TreatAsEmpty);
    }

    #[test]
    fn options_deserialize_with_missing_fields() {
        let options: MapOptions = serde_json::from_str(r#"{"null_policy":"use_default"}"#).unwrap();
        assert_eq!(
            options,
            MapOptions::new().with_null_policy(NullPolicy::UseDefault)
        );
    }
}
