use crate::error::{Result, StoreError};
use crate::types::{Dataset, Variable};
use std::fs;
use std::path::Path;

impl Dataset {
    /// Load a dataset document from disk
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Opening dataset {}", path.display());
        let data = fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    /// Write the dataset document to disk
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        log::debug!("Saving dataset {}", path.display());
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    pub fn from_json_str(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn variable(&self, name: &str) -> Result<&Variable> {
        self.variables
            .get(name)
            .ok_or_else(|| StoreError::VariableNotFound(name.to_string()))
    }

    pub fn variable_mut(&mut self, name: &str) -> Result<&mut Variable> {
        self.variables
            .get_mut(name)
            .ok_or_else(|| StoreError::VariableNotFound(name.to_string()))
    }

    /// Resolve a variable's dimension names to lengths
    pub fn shape_of(&self, name: &str) -> Result<Vec<usize>> {
        let variable = self.variable(name)?;
        variable
            .dimensions
            .iter()
            .map(|dimension| {
                self.dimensions
                    .get(dimension)
                    .copied()
                    .ok_or_else(|| StoreError::DimensionNotFound {
                        variable: name.to_string(),
                        dimension: dimension.clone(),
                    })
            })
            .collect()
    }

    /// Names of the one-dimensional flag variables, in name order
    pub fn flag_variables(&self) -> Vec<&str> {
        self.variables
            .iter()
            .filter(|(_, variable)| variable.is_flag_variable() && variable.dimensions.len() == 1)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}
