//! Server-side function descriptors

use crate::types::{parse_value, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Module, function and positional arguments of a UDF call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UdfSpec {
    pub module: String,
    pub function: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl UdfSpec {
    pub fn new(module: impl Into<String>, function: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            module: module.into(),
            function: function.into(),
            args,
        }
    }

    /// Parse a flat `module function args...` list.
    ///
    /// Returns `None` when the list is shorter than two elements. The input is
    /// left untouched; remaining elements become the positional args in order.
    pub fn parse<S: AsRef<str>>(raw: &[S]) -> Option<Self> {
        match raw {
            [module, function, rest @ ..] => Some(Self {
                module: module.as_ref().to_string(),
                function: function.as_ref().to_string(),
                args: rest.iter().map(|a| parse_value(a.as_ref())).collect(),
            }),
            _ => None,
        }
    }
}

impl fmt::Display for UdfSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.function)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_module_function_args() {
        let raw = vec!["mymod", "myfunc", "1", "two"];
        let udf = UdfSpec::parse(&raw).unwrap();
        assert_eq!(udf.module, "mymod");
        assert_eq!(udf.function, "myfunc");
        assert_eq!(udf.args, vec![json!(1), json!("two")]);
        // caller's list is not consumed
        assert_eq!(raw.len(), 4);
    }

    #[test]
    fn test_parse_without_args() {
        let udf = UdfSpec::parse(&["mymod", "myfunc"]).unwrap();
        assert!(udf.args.is_empty());
        assert_eq!(udf.to_string(), "mymod.myfunc");
    }

    #[test]
    fn test_parse_too_short() {
        assert!(UdfSpec::parse::<&str>(&[]).is_none());
        assert!(UdfSpec::parse(&["mymod"]).is_none());
    }
}
