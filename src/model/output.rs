//! Output metrics and their unit prices

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A measured trial output (e.g. grain yield) with its unit price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputDefinition {
    pub id: String,
    pub name: String,
    /// Unit of measure per hectare (e.g. "t/ha")
    #[serde(default)]
    pub unit: String,
    pub price_per_unit: f64,
}

impl OutputDefinition {
    pub fn new(id: &str, name: &str, unit: &str, price_per_unit: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            unit: unit.to_string(),
            price_per_unit,
        }
    }
}

/// Catalog of outputs, looked up by id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputCatalog {
    outputs: Vec<OutputDefinition>,
}

impl OutputCatalog {
    pub fn new(outputs: Vec<OutputDefinition>) -> Self {
        Self { outputs }
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OutputDefinition> {
        self.outputs.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut OutputDefinition> {
        self.outputs.iter_mut()
    }

    pub fn get(&self, id: &str) -> Option<&OutputDefinition> {
        self.outputs.iter().find(|o| o.id == id)
    }

    /// Price lookup table keyed by output id
    pub fn price_map(&self) -> HashMap<&str, f64> {
        self.outputs
            .iter()
            .map(|o| (o.id.as_str(), o.price_per_unit))
            .collect()
    }

    /// Catalog must be non-empty with unique ids
    pub fn validate(&self) -> EngineResult<()> {
        if self.outputs.is_empty() {
            return Err(EngineError::EmptyOutputCatalog);
        }
        for (i, output) in self.outputs.iter().enumerate() {
            if self.outputs[..i].iter().any(|o| o.id == output.id) {
                return Err(EngineError::DuplicateId {
                    kind: "output",
                    id: output.id.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_and_prices() {
        let catalog = OutputCatalog::new(vec![
            OutputDefinition::new("yield", "Grain yield", "t/ha", 320.0),
            OutputDefinition::new("protein", "Protein premium", "t/ha", 15.0),
        ]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("protein").map(|o| o.price_per_unit), Some(15.0));
        assert!(catalog.get("oil").is_none());
        assert_eq!(catalog.price_map()["yield"], 320.0);
    }

    #[test]
    fn test_validation() {
        assert_eq!(OutputCatalog::default().validate(), Err(EngineError::EmptyOutputCatalog));

        let dup = OutputCatalog::new(vec![
            OutputDefinition::new("yield", "Grain yield", "t/ha", 320.0),
            OutputDefinition::new("yield", "Yield again", "t/ha", 300.0),
        ]);
        assert!(matches!(dup.validate(), Err(EngineError::DuplicateId { kind: "output", .. })));
    }
}
