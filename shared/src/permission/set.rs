//! PermissionSet - module → ordered action set

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use super::{Action, Module};

/// Grants held by a sub-admin.
///
/// Keys and values are registry enums, so a set built in code can only hold
/// valid (module, action) pairs. Stored data is parsed leniently: unknown
/// modules, unknown actions and actions outside a module's vocabulary are
/// dropped with a warning instead of failing the whole principal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet(BTreeMap<Module, BTreeSet<Action>>);

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every module with its full vocabulary
    pub fn full() -> Self {
        let mut set = Self::new();
        for module in Module::ALL {
            for &action in module.actions() {
                set.grant(module, action);
            }
        }
        set
    }

    /// Grant one action. Returns false (and grants nothing) when the action is
    /// outside the module's vocabulary.
    pub fn grant(&mut self, module: Module, action: Action) -> bool {
        if !module.allows(action) {
            return false;
        }
        self.0.entry(module).or_default().insert(action);
        true
    }

    /// Builder form of [`grant`](Self::grant); invalid actions are skipped
    pub fn with(mut self, module: Module, actions: &[Action]) -> Self {
        for &action in actions {
            self.grant(module, action);
        }
        self
    }

    pub fn contains(&self, module: Module, action: Action) -> bool {
        self.0
            .get(&module)
            .is_some_and(|actions| actions.contains(&action))
    }

    /// Whether at least one action is granted on `module`
    pub fn has_module(&self, module: Module) -> bool {
        self.0.get(&module).is_some_and(|a| !a.is_empty())
    }

    pub fn actions(&self, module: Module) -> impl Iterator<Item = Action> + '_ {
        self.0.get(&module).into_iter().flatten().copied()
    }

    /// Modules with at least one grant, in registry order
    pub fn modules(&self) -> impl Iterator<Item = Module> + '_ {
        self.0
            .iter()
            .filter(|(_, actions)| !actions.is_empty())
            .map(|(m, _)| *m)
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(BTreeSet::is_empty)
    }

    /// Parse a stored JSON permission object.
    ///
    /// Returns the valid part plus a list of the rejected `module:action`
    /// entries. Non-object input yields an empty set.
    pub fn from_value_lenient(value: &Value) -> (Self, Vec<String>) {
        let mut set = Self::new();
        let mut rejected = Vec::new();

        let Some(map) = value.as_object() else {
            if !value.is_null() {
                rejected.push(format!("<non-object permissions: {}>", value));
            }
            return (set, rejected);
        };

        for (module_name, actions) in map {
            let Ok(module) = module_name.parse::<Module>() else {
                rejected.push(module_name.clone());
                continue;
            };
            let Some(actions) = actions.as_array() else {
                rejected.push(format!("{}:<non-array>", module_name));
                continue;
            };
            for action in actions {
                let parsed = action.as_str().and_then(|s| s.parse::<Action>().ok());
                match parsed {
                    Some(a) if set.grant(module, a) => {}
                    _ => rejected.push(format!("{}:{}", module_name, action)),
                }
            }
        }

        (set, rejected)
    }

    /// Strict parse for admin-submitted payloads: any invalid entry is an error
    pub fn from_value_strict(value: &Value) -> Result<Self, Vec<String>> {
        let (set, rejected) = Self::from_value_lenient(value);
        if rejected.is_empty() {
            Ok(set)
        } else {
            Err(rejected)
        }
    }
}

impl Serialize for PermissionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (module, actions) in &self.0 {
            if actions.is_empty() {
                continue;
            }
            map.serialize_entry(module, actions)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PermissionSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let (set, rejected) = Self::from_value_lenient(&value);
        if !rejected.is_empty() {
            tracing::warn!(
                rejected = ?rejected,
                "Dropped unrecognized permission entries"
            );
        }
        Ok(set)
    }
}
