use std::collections::BTreeMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VariableError {
    #[error("expected KEY=VALUE, got '{0}'")]
    MissingSeparator(String),
    #[error("invalid variable name '{0}': use letters, digits and '_', not starting with a digit")]
    InvalidKey(String),
}

/// Ordered key/value pairs pushed to Railway before a deploy.
///
/// Entries keep the order they were written in `railup.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvVarSet {
    entries: Vec<(String, String)>,
}

impl EnvVarSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Overlay decrypted secrets on top of the plain entries.
    pub fn merge_secrets(&mut self, secrets: &BTreeMap<String, String>) {
        for (key, value) in secrets {
            self.insert(key.as_str(), value.as_str());
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvVarSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (k, v) in iter {
            set.insert(k, v);
        }
        set
    }
}

/// Split `KEY=VALUE` and check the key.
pub fn parse_pair(pair: &str) -> Result<(String, String), VariableError> {
    let (key, value) = pair
        .split_once('=')
        .ok_or_else(|| VariableError::MissingSeparator(pair.to_string()))?;
    let key = key.trim();
    validate_key(key)?;
    Ok((key.to_string(), value.trim().to_string()))
}

pub fn validate_key(key: &str) -> Result<(), VariableError> {
    let mut chars = key.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(VariableError::InvalidKey(key.to_string()))
    }
}

impl Serialize for EnvVarSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for EnvVarSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SetVisitor;

        impl<'de> Visitor<'de> for SetVisitor {
            type Value = EnvVarSet;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a table of string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<EnvVarSet, A::Error> {
                let mut set = EnvVarSet::new();
                while let Some((key, value)) = access.next_entry::<String, String>()? {
                    set.insert(key, value);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(SetVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_document_order() {
        #[derive(Deserialize)]
        struct Doc {
            variables: EnvVarSet,
        }

        let doc: Doc = toml::from_str(
            "[variables]\nZETA = \"1\"\nALPHA = \"2\"\nMID = \"3\"\n",
        )
        .expect("valid toml");

        let keys: Vec<&str> = doc.variables.keys().collect();
        assert_eq!(keys, ["ZETA", "ALPHA", "MID"]);
    }

    #[test]
    fn rejects_non_string_values() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Doc {
            variables: EnvVarSet,
        }

        let err = toml::from_str::<Doc>("[variables]\nPORT = 3001\n").unwrap_err();
        assert!(err.to_string().contains("expected a string"));
    }

    #[test]
    fn secrets_replace_in_place_and_append_new_keys() {
        let mut set: EnvVarSet = [("NODE_ENV", "production"), ("PORT", "3001")]
            .into_iter()
            .collect();
        let secrets = BTreeMap::from([
            ("WEBHOOK_SECRET".to_string(), "s3cret".to_string()),
            ("PORT".to_string(), "8080".to_string()),
        ]);

        set.merge_secrets(&secrets);

        let pairs: Vec<(&str, &str)> = set.iter().collect();
        assert_eq!(
            pairs,
            [
                ("NODE_ENV", "production"),
                ("PORT", "8080"),
                ("WEBHOOK_SECRET", "s3cret"),
            ]
        );
    }

    #[test]
    fn parses_pairs() {
        assert_eq!(
            parse_pair("NODE_ENV=production").unwrap(),
            ("NODE_ENV".to_string(), "production".to_string())
        );
        assert_eq!(
            parse_pair("URL=postgres://u:p@h/db?a=b").unwrap().1,
            "postgres://u:p@h/db?a=b"
        );
        assert_eq!(
            parse_pair("NOPE"),
            Err(VariableError::MissingSeparator("NOPE".to_string()))
        );
        assert_eq!(
            parse_pair("1BAD=x"),
            Err(VariableError::InvalidKey("1BAD".to_string()))
        );
        assert!(parse_pair("=x").is_err());
    }
}
