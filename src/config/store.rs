//! sectioned key/value settings store

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// key/value settings grouped in named sections
///
/// getters never fail: missing or mistyped values return `default`
pub trait ConfigStore {
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;
    fn set_bool(&mut self, section: &str, key: &str, value: bool);

    fn get_long(&self, section: &str, key: &str, default: i64) -> i64;
    fn set_long(&mut self, section: &str, key: &str, value: i64);

    fn get_value(&self, section: &str, key: &str, default: &str) -> String;
    fn set_value(&mut self, section: &str, key: &str, value: &str);

    fn has_section(&self, section: &str) -> bool;
    fn has_key(&self, section: &str, key: &str) -> bool;

    /// drop a section and all its keys, returning whether it existed
    fn remove_section(&mut self, section: &str) -> bool;

    /// names of all sections, sorted
    fn sections(&self) -> Vec<String>;
}

/// in-memory store; serializes as `{ "section": { "key": value } }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ini {
    sections: BTreeMap<String, BTreeMap<String, Value>>,
}

impl Ini {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    fn raw(&self, section: &str, key: &str) -> Option<&Value> {
        self.sections.get(section).and_then(|s| s.get(key))
    }

    fn set_raw(&mut self, section: &str, key: &str, value: Value) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl ConfigStore for Ini {
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        let parsed = match self.raw(section, key) {
            None => return default,
            Some(Value::Bool(b)) => Some(*b),
            Some(Value::Number(n)) => n.as_i64().map(|n| n != 0),
            Some(Value::String(s)) => parse_bool(s),
            Some(_) => None,
        };

        parsed.unwrap_or_else(|| {
            log::debug!("[{}] {}: expected a boolean, using default", section, key);
            default
        })
    }

    fn set_bool(&mut self, section: &str, key: &str, value: bool) {
        self.set_raw(section, key, Value::Bool(value));
    }

    fn get_long(&self, section: &str, key: &str, default: i64) -> i64 {
        let parsed = match self.raw(section, key) {
            None => return default,
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            Some(_) => None,
        };

        parsed.unwrap_or_else(|| {
            log::debug!("[{}] {}: expected an integer, using default", section, key);
            default
        })
    }

    fn set_long(&mut self, section: &str, key: &str, value: i64) {
        self.set_raw(section, key, Value::from(value));
    }

    fn get_value(&self, section: &str, key: &str, default: &str) -> String {
        match self.raw(section, key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(_) => {
                log::debug!("[{}] {}: expected text, using default", section, key);
                default.to_string()
            }
            None => default.to_string(),
        }
    }

    fn set_value(&mut self, section: &str, key: &str, value: &str) {
        self.set_raw(section, key, Value::String(value.to_string()));
    }

    fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    fn has_key(&self, section: &str, key: &str) -> bool {
        self.raw(section, key).is_some()
    }

    fn remove_section(&mut self, section: &str) -> bool {
        self.sections.remove(section).is_some()
    }

    fn sections(&self) -> Vec<String> {
        self.sections.keys().cloned().collect()
    }
}
