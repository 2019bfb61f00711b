use crate::types::err::{self};

/// A named configuration value, together with bounds on the value.
#[derive(Clone, Debug)]
pub struct ConfigOption<T> {
    pub name: &'static str,
    pub min: T,
    pub max: T,
    pub value: T,
}

impl<T: PartialOrd> ConfigOption<T> {
    /// Sets the value of the option, if the value is within the bounds of the option.
    pub fn set(&mut self, value: T) -> Result<(), err::ConfigError> {
        if value < self.min || self.max < value {
            log::error!("{} is outside of the bounds of the option", self.name);
            return Err(err::ConfigError::OutOfBounds(self.name));
        }
        self.value = value;
        Ok(())
    }
}
