//! PropertyMap — the key-value store on nodes and relationships.

use std::collections::HashMap;
use super::Value;

/// A map of property names to values.
///
/// Iteration order is unspecified; every renderer that emits a map sorts
/// keys ascending so that output stays byte-reproducible.
pub type PropertyMap = HashMap<String, Value>;
