//! Generator settings. Every field has a default, so an empty JSON object (or
//! no config file at all) is a valid configuration.
use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// one-role contract, `ObjectMapper<T>`: the implementing type maps itself into `T`
    pub one_way_contract: String,
    /// two-role contract, `ObjectMapperAdapter<A, B>`: maps `A → B` and `B → A`
    pub two_way_contract: String,
    /// tag marking a free-standing `(source, target)` mapping method
    pub method_tag: String,
    pub method_name: String,
    /// expression the one-way mapping reads from
    pub receiver: String,
    pub indent: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            one_way_contract: "ObjectMapper".into(),
            two_way_contract: "ObjectMapperAdapter".into(),
            method_tag: "ObjectMapperMethod".into(),
            method_name: "map_object".into(),
            receiver: "self".into(),
            indent: 4,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        crate::path_de::from_slice_with_path(&bytes)
    }

    /// `Some(path)` loads it, `None` yields the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
