use serde_yaml::{Mapping, Value};

/// Ordered front matter mapping. Keys serialize in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter(Mapping);

impl FrontMatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a key. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(Value::String(key.into()), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().filter_map(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append every entry of `other`, in its order.
    pub fn merge(&mut self, other: FrontMatter) {
        for (key, value) in other.0 {
            self.0.insert(key, value);
        }
    }

    /// Drop top-level keys whose value is falsy. Numbers always survive.
    pub fn prune(&mut self) {
        let entries = std::mem::take(&mut self.0);
        self.0 = entries
            .into_iter()
            .filter(|(_, value)| !is_falsy(value))
            .collect();
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        if self.0.is_empty() {
            return Ok(String::new());
        }
        serde_yaml::to_string(&self.0)
    }

    pub fn as_mapping(&self) -> &Mapping {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Mapping(self.0)
    }
}

impl From<FrontMatter> for Value {
    fn from(front_matter: FrontMatter) -> Self {
        front_matter.into_value()
    }
}

impl FromIterator<(String, Value)> for FrontMatter {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut front_matter = FrontMatter::new();
        for (key, value) in iter {
            front_matter.insert(key, value);
        }
        front_matter
    }
}

/// Null, false, `""`, and empty sequences or mappings. Numeric zero is not falsy.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(_) => false,
        Value::String(text) => text.is_empty(),
        Value::Sequence(items) => items.is_empty(),
        Value::Mapping(entries) => entries.is_empty(),
        Value::Tagged(tagged) => is_falsy(&tagged.value),
    }
}

/// A document made of front matter and a body, as written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub front_matter: FrontMatter,
    pub body: String,
}

impl Document {
    pub fn new(front_matter: FrontMatter, body: impl Into<String>) -> Self {
        Self {
            front_matter,
            body: body.into(),
        }
    }

    /// `---`, the YAML block, `---`, a blank line, then the body.
    pub fn render(&self) -> Result<String, serde_yaml::Error> {
        let yaml = self.front_matter.to_yaml()?;
        Ok(format!("---\n{yaml}---\n\n{}", self.body))
    }
}
