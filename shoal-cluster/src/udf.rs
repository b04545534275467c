//! UDF registry with built-in modules
//!
//! Two kinds of function exist: aggregations fold every matched record into
//! one value (used by `apply`), record functions mutate each matched record
//! in place (used by background jobs).
//!
//! Built-ins:
//!
//! | module      | function     | args             |
//! |-------------|--------------|------------------|
//! | `aggregate` | `count`      |                  |
//! | `aggregate` | `sum`        | bin              |
//! | `aggregate` | `min`/`max`  | bin              |
//! | `record`    | `set_bin`    | bin, value       |
//! | `record`    | `incr`       | bin, amount      |
//! | `record`    | `delete_bin` | bin              |

use parking_lot::RwLock;
use serde_json::Number;
use shoal::{Bins, Error, Record, Result, UdfSpec, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Result type UDF bodies return; the message becomes [`Error::Udf`]
pub type UdfResult<T> = std::result::Result<T, String>;

pub type AggregateFn = Arc<dyn Fn(&[Record], &[Value]) -> UdfResult<Value> + Send + Sync>;
pub type RecordFn = Arc<dyn Fn(&mut Bins, &[Value]) -> UdfResult<()> + Send + Sync>;

#[derive(Clone)]
enum UdfKind {
    Aggregate(AggregateFn),
    Record(RecordFn),
}

/// Registered functions keyed by (module, function)
pub struct UdfRegistry {
    functions: RwLock<HashMap<(String, String), UdfKind>>,
}

impl Default for UdfRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl UdfRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            functions: RwLock::new(HashMap::new()),
        }
    }

    /// Registry preloaded with the `aggregate` and `record` modules
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register_aggregate("aggregate", "count", |records, _| {
            Ok(Value::from(records.len() as u64))
        });
        registry.register_aggregate("aggregate", "sum", |records, args| {
            let bin = bin_arg(args)?;
            Ok(sum(records, bin))
        });
        registry.register_aggregate("aggregate", "min", |records, args| {
            let bin = bin_arg(args)?;
            Ok(extreme(records, bin, |a, b| a < b))
        });
        registry.register_aggregate("aggregate", "max", |records, args| {
            let bin = bin_arg(args)?;
            Ok(extreme(records, bin, |a, b| a > b))
        });
        registry.register_record_fn("record", "set_bin", |bins, args| {
            let bin = bin_arg(args)?;
            let value = args.get(1).cloned().ok_or("expected a value argument")?;
            bins.insert(bin.to_string(), value);
            Ok(())
        });
        registry.register_record_fn("record", "incr", |bins, args| {
            let bin = bin_arg(args)?;
            let amount = args
                .get(1)
                .and_then(Value::as_i64)
                .ok_or("expected an integer amount argument")?;
            let current = match bins.get(bin) {
                None => 0,
                Some(v) => v
                    .as_i64()
                    .ok_or_else(|| format!("bin '{}' is not an integer", bin))?,
            };
            let next = current
                .checked_add(amount)
                .ok_or_else(|| format!("bin '{}' overflowed", bin))?;
            bins.insert(bin.to_string(), Value::from(next));
            Ok(())
        });
        registry.register_record_fn("record", "delete_bin", |bins, args| {
            let bin = bin_arg(args)?;
            bins.remove(bin);
            Ok(())
        });
        registry
    }

    /// Register an aggregation, replacing any function with the same name
    pub fn register_aggregate<F>(&self, module: &str, function: &str, f: F)
    where
        F: Fn(&[Record], &[Value]) -> UdfResult<Value> + Send + Sync + 'static,
    {
        self.functions.write().insert(
            (module.to_string(), function.to_string()),
            UdfKind::Aggregate(Arc::new(f)),
        );
    }

    /// Register a record function, replacing any function with the same name
    pub fn register_record_fn<F>(&self, module: &str, function: &str, f: F)
    where
        F: Fn(&mut Bins, &[Value]) -> UdfResult<()> + Send + Sync + 'static,
    {
        self.functions.write().insert(
            (module.to_string(), function.to_string()),
            UdfKind::Record(Arc::new(f)),
        );
    }

    /// Look up an aggregation
    pub fn aggregate(&self, udf: &UdfSpec) -> Result<AggregateFn> {
        match self.lookup(udf)? {
            UdfKind::Aggregate(f) => Ok(f),
            UdfKind::Record(_) => Err(udf_error(udf, "not an aggregation function")),
        }
    }

    /// Look up a record function
    pub fn record_fn(&self, udf: &UdfSpec) -> Result<RecordFn> {
        match self.lookup(udf)? {
            UdfKind::Record(f) => Ok(f),
            UdfKind::Aggregate(_) => Err(udf_error(udf, "not a record function")),
        }
    }

    fn lookup(&self, udf: &UdfSpec) -> Result<UdfKind> {
        self.functions
            .read()
            .get(&(udf.module.clone(), udf.function.clone()))
            .cloned()
            .ok_or_else(|| Error::UdfNotFound {
                module: udf.module.clone(),
                function: udf.function.clone(),
            })
    }
}

/// Wrap a UDF body failure
pub fn udf_error(udf: &UdfSpec, reason: impl Into<String>) -> Error {
    Error::Udf {
        module: udf.module.clone(),
        function: udf.function.clone(),
        reason: reason.into(),
    }
}

fn bin_arg(args: &[Value]) -> UdfResult<&str> {
    args.first()
        .and_then(Value::as_str)
        .ok_or_else(|| "expected a bin name argument".to_string())
}

/// Integer sum unless a float is involved; non-numeric bins are skipped
fn sum(records: &[Record], bin: &str) -> Value {
    let values: Vec<&Value> = records
        .iter()
        .filter_map(|r| r.bins.get(bin))
        .filter(|v| v.is_number())
        .collect();

    if values.iter().all(|v| v.is_i64()) {
        let total = values
            .iter()
            .filter_map(|v| v.as_i64())
            .fold(0i64, i64::saturating_add);
        return Value::from(total);
    }
    let total: f64 = values.iter().filter_map(|v| v.as_f64()).sum();
    Number::from_f64(total).map_or(Value::Null, Value::Number)
}

fn extreme(records: &[Record], bin: &str, better: fn(f64, f64) -> bool) -> Value {
    let mut best: Option<(f64, &Value)> = None;
    for value in records.iter().filter_map(|r| r.bins.get(bin)) {
        let Some(n) = value.as_f64() else { continue };
        match best {
            Some((current, _)) if !better(n, current) => {}
            _ => best = Some((n, value)),
        }
    }
    best.map_or(Value::Null, |(_, v)| v.clone())
}
