//! Name→factory table mapping a registered class name to the factory that
//! builds a bare instance of it.

use std::collections::HashMap;
use std::sync::Arc;

use eventgraph_types::Value;

use crate::error::RegistryError;
use crate::instance::ClassInstance;

/// A zero-argument factory producing a bare instance of some class.
pub type ClassFactory = Arc<dyn Fn() -> Box<dyn ClassInstance> + Send + Sync>;

/// Class name → instance factory table. Built once at
/// setup; read-only for the remainder of the memory image's lifetime
///.
#[derive(Default)]
pub struct ClassRegistry {
    factories: HashMap<String, ClassFactory>,
}

impl ClassRegistry {
    /// A registry with no classes registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under `name`. Rejects a second registration of the
    /// same name.
    pub fn register(&mut self, name: impl Into<String>, factory: ClassFactory) -> Result<(), RegistryError> {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(RegistryError::DuplicateClass(name));
        }
        self.factories.insert(name, factory);
        Ok(())
    }

    /// True if `name` has a registered factory.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Instantiate a bare value for `name`, bypassing the class's real
    /// constructor. Fatal if `name` has no factory.
    pub fn instantiate(&self, name: &str) -> Result<Value, RegistryError> {
        let factory = self.factories.get(name).ok_or_else(|| RegistryError::UnknownClass(name.to_string()))?;
        Ok(factory().into_value())
    }
}
