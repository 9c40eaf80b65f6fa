//! Shared, mutable parameter objects.
//!
//! Query objects and option hashes are handed to a provider by reference. The
//! provider only notices a new *reference*; editing a field inside a handle it
//! already holds is invisible to change detection until the next explicit
//! reload. [`Params`] models that with an `Arc`: clones share the same map, and
//! [`Params::same_ref`] compares identity rather than content.

use std::{
    fmt,
    sync::{Arc, PoisonError, RwLock},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map as JsonMap, Value};

/// Reference-counted JSON object handle.
#[derive(Clone, Default)]
pub struct Params {
    inner: Arc<RwLock<JsonMap<String, Value>>>,
}

impl Params {
    pub fn new(map: JsonMap<String, Value>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(map)),
        }
    }

    /// Build a handle from a JSON value. Non-object values yield `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self::new(map)),
            _ => None,
        }
    }

    /// True when both handles point at the same underlying object.
    pub fn same_ref(&self, other: &Params) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> JsonMap<String, Value> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).get(key).cloned()
    }

    /// Mutate a field in place. Every clone of this handle observes the change.
    pub fn set(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value)
    }
}

impl From<JsonMap<String, Value>> for Params {
    fn from(map: JsonMap<String, Value>) -> Self {
        Self::new(map)
    }
}

impl fmt::Debug for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Params").field(&self.snapshot()).finish()
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.snapshot().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Params {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        JsonMap::<String, Value>::deserialize(deserializer).map(Params::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Params {
        Params::from_value(value).expect("object")
    }

    #[test]
    fn clones_share_identity_and_contents() {
        let query = params(json!({ "include": "ducks" }));
        let alias = query.clone();
        assert!(query.same_ref(&alias));

        alias.set("include", json!("chipmunks"));
        assert_eq!(query.get("include"), Some(json!("chipmunks")));
    }

    #[test]
    fn equal_contents_are_not_the_same_reference() {
        let a = params(json!({ "type": "ducks" }));
        let b = params(json!({ "type": "ducks" }));
        assert_eq!(a.snapshot(), b.snapshot());
        assert!(!a.same_ref(&b));
    }

    #[test]
    fn from_value_rejects_non_objects() {
        assert!(Params::from_value(json!([1, 2])).is_none());
        assert!(Params::from_value(json!("type")).is_none());
    }

    #[test]
    fn serializes_as_plain_object() {
        let query = params(json!({ "type": "chipmunks" }));
        assert_eq!(serde_json::to_value(&query).unwrap(), json!({ "type": "chipmunks" }));
        let back: Params = serde_json::from_value(json!({ "page": 2 })).unwrap();
        assert_eq!(back.get("page"), Some(json!(2)));
    }
}
