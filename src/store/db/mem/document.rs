use std::collections::HashMap;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value as JsonValue;

use crate::{Result, store::data::*};

/// A record that can live in a `Collect`.
pub trait DbDocument: Serialize + DeserializeOwned + Clone + Send + Sync {
    fn id(&self) -> &str;

    /// Field view used to evaluate query filters and ordering.
    fn doc(&self) -> Result<HashMap<String, JsonValue>> {
        match serde_json::to_value(self)? {
            JsonValue::Object(map) => Ok(map.into_iter().collect()),
            _ => Ok(HashMap::new()),
        }
    }
}

macro_rules! impl_document {
    ($($ty:ty), +) => {
        $(
            impl DbDocument for $ty {
                fn id(&self) -> &str {
                    &self.id
                }
            }
        )+
    };
}

impl_document!(Workflow, Node, Edge, Execution, Step, File, Extension, Holiday, Route);
