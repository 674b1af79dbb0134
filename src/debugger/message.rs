use indexmap::IndexMap;
use serde::Deserialize;

/// Variable decoded from a `context_get` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Variable {
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

impl Variable {
    pub fn new(name: impl Into<String>, kind: Option<&str>, value: Option<&str>) -> Self {
        Self {
            name: name.into(),
            kind: kind.map(ToOwned::to_owned),
            value: value.map(ToOwned::to_owned),
        }
    }
}

/// Normalized engine record.
///
/// Produced by the message parser out of a single decoded engine response and
/// read (never modified) by the session controller. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    fields: IndexMap<String, String>,
    variables: Vec<Variable>,
}

impl Message {
    pub const STATUS: &'static str = "status";
    pub const FILENAME: &'static str = "filename";
    pub const LINENO: &'static str = "lineno";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn with_variables(mut self, variables: impl IntoIterator<Item = Variable>) -> Self {
        self.variables.extend(variables);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn status(&self) -> Option<&str> {
        self.get(Self::STATUS)
    }

    pub fn filename(&self) -> Option<&str> {
        self.get(Self::FILENAME)
    }

    pub fn lineno(&self) -> Option<&str> {
        self.get(Self::LINENO)
    }

    /// Variables carried by the record, empty for non `context_get` responses.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// All fields in the order the parser produced them.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Message {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            variables: vec![],
        }
    }
}
