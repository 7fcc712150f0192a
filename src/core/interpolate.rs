use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([\w.-]+)\}").expect("placeholder pattern is valid"));

/// Nested placeholders (`${a}` -> `${b}` -> value) are resolved up to this depth.
const MAX_PASSES: usize = 8;

/// Layered property lookup: earlier layers shadow later ones.
#[derive(Debug, Clone, Default)]
pub struct PropertyScope {
    layers: Vec<BTreeMap<String, String>>,
}

impl PropertyScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new scope whose `layer` takes precedence over `self`.
    pub fn overlay(&self, layer: BTreeMap<String, String>) -> Self {
        let mut layers = Vec::with_capacity(self.layers.len() + 1);
        layers.push(layer);
        layers.extend(self.layers.iter().cloned());
        Self { layers }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.layers
            .iter()
            .find_map(|layer| layer.get(key))
            .map(String::as_str)
    }

    /// Replaces every known `${name}`; unknown placeholders are left as written.
    pub fn interpolate(&self, value: &str) -> String {
        let mut current = value.to_string();
        for _ in 0..MAX_PASSES {
            if !current.contains("${") {
                break;
            }
            let next = PLACEHOLDER
                .replace_all(&current, |caps: &Captures| match self.get(&caps[1]) {
                    Some(resolved) => resolved.to_string(),
                    None => caps[0].to_string(),
                })
                .into_owned();
            if next == current {
                break;
            }
            current = next;
        }
        current
    }
}

pub fn has_placeholder(value: &str) -> bool {
    PLACEHOLDER.is_match(value)
}
