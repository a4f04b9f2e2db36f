// Strategy sandbox: resolves strategy source text to a callable
//
// Source text is a small TOML document naming one registered decision function:
//
//     strategy = "food_seeker"
//
// Any other keys are ignored.

use serde::Deserialize;
use std::collections::HashMap;

use crate::error::{GauntletError, Result};
use crate::strategy::{Cautious, FirstValid, FoodSeeker, RandomMove, Strategy};

/// Builds a fresh strategy instance from a seed
pub type StrategyFactory = Box<dyn Fn(u64) -> Box<dyn Strategy>>;

/// Turns strategy source into a live decision function
pub trait StrategySandbox {
    fn load(&self, source: &str, seed: u64) -> Result<Box<dyn Strategy>>;
}

#[derive(Debug, Deserialize)]
struct StrategyDescriptor {
    strategy: String,
}

/// Parses source text and returns the decision function name it binds
pub fn entry_point(source: &str) -> Result<String> {
    let descriptor: StrategyDescriptor = toml::from_str(source)
        .map_err(|e| GauntletError::StrategyLoad(format!("unparsable strategy source: {}", e)))?;
    let name = descriptor.strategy.trim();
    if name.is_empty() {
        return Err(GauntletError::StrategyLoad(
            "strategy name is empty".to_string(),
        ));
    }
    Ok(name.to_string())
}

/// Source text binding the named decision function
pub fn source_for(name: &str) -> String {
    format!("strategy = \"{}\"\n", name)
}

/// Name → factory table
pub struct StrategyRegistry {
    factories: HashMap<String, StrategyFactory>,
}

impl StrategyRegistry {
    /// An empty registry
    pub fn new() -> Self {
        StrategyRegistry {
            factories: HashMap::new(),
        }
    }

    /// A registry holding `first_valid`, `random`, `food_seeker` and `cautious`
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("first_valid", |_| Box::new(FirstValid));
        registry.register("random", |seed| Box::new(RandomMove::new(seed)));
        registry.register("food_seeker", |seed| Box::new(FoodSeeker::new(seed)));
        registry.register("cautious", |_| Box::new(Cautious));
        registry
    }

    /// Registers or replaces a decision function under `name`
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(u64) -> Box<dyn Strategy> + 'static,
    {
        self.factories.insert(name.to_string(), Box::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl StrategySandbox for StrategyRegistry {
    fn load(&self, source: &str, seed: u64) -> Result<Box<dyn Strategy>> {
        let name = entry_point(source)?;
        let factory = self.factories.get(&name).ok_or_else(|| {
            GauntletError::StrategyLoad(format!("no decision function named '{}'", name))
        })?;
        Ok(factory(seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_point_ignores_extra_keys() {
        let source = "# my snake\nstrategy = \"cautious\"\nauthor = \"someone\"\n";
        assert_eq!(entry_point(source).unwrap(), "cautious");
    }

    #[test]
    fn test_entry_point_rejects_garbage() {
        assert!(matches!(
            entry_point("def get_challenger_action(): pass"),
            Err(GauntletError::StrategyLoad(_))
        ));
        assert!(matches!(
            entry_point("author = \"x\""),
            Err(GauntletError::StrategyLoad(_))
        ));
        assert!(matches!(
            entry_point("strategy = \"  \""),
            Err(GauntletError::StrategyLoad(_))
        ));
    }

    #[test]
    fn test_registry_loads_builtins() {
        let registry = StrategyRegistry::with_builtins();
        assert_eq!(
            registry.names(),
            vec!["cautious", "first_valid", "food_seeker", "random"]
        );
        for name in ["cautious", "first_valid", "food_seeker", "random"] {
            assert!(registry.load(&source_for(name), 0).is_ok(), "{} should load", name);
        }
    }

    #[test]
    fn test_registry_rejects_unknown_name() {
        let registry = StrategyRegistry::with_builtins();
        let result = registry.load(&source_for("teleporter"), 0);
        assert!(matches!(result, Err(GauntletError::StrategyLoad(_))));
    }

    #[test]
    fn test_register_replaces_existing() {
        let mut registry = StrategyRegistry::new();
        assert!(!registry.contains("first_valid"));
        registry.register("first_valid", |_| Box::new(FirstValid));
        assert!(registry.contains("first_valid"));
    }
}
