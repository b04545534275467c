//! Command requests
//!
//! Raw argument bags from the command line are turned into validated request
//! structs here. Mutually exclusive options are rejected at this point so the
//! dispatcher and broadcaster never see them.

use crate::dispatch::DispatchMode;
use crate::error::{Error, Result};
use crate::info::{InfoMode, InfoRequest};
use crate::query::{apply_filter, select_bins, Filter, Query, UdfSpec};
use crate::types::parse_value;

/// Unvalidated `query` arguments
#[derive(Debug, Clone, Default)]
pub struct QueryArgs {
    pub namespace: String,
    pub set: Option<String>,
    pub bins: Option<Vec<String>>,
    /// `bin value`
    pub equal: Option<Vec<String>>,
    /// `bin start end`
    pub range: Option<Vec<String>>,
    /// `module function args...`
    pub udf: Option<Vec<String>>,
    pub background: bool,
}

/// Validated `query` command
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub namespace: String,
    pub set: Option<String>,
    pub bins: Vec<String>,
    pub filter: Option<Filter>,
    pub udf: Option<UdfSpec>,
    pub background: bool,
}

impl QueryRequest {
    pub fn from_args(args: QueryArgs) -> Result<Self> {
        if args.namespace.is_empty() {
            return Err(Error::Config("namespace is required".into()));
        }

        let filter = match (args.equal.as_deref(), args.range.as_deref()) {
            (Some(_), Some(_)) => {
                return Err(Error::Config(
                    "equal and range filters are mutually exclusive".into(),
                ))
            }
            (Some(equal), None) => Some(parse_equal(equal)?),
            (None, Some(range)) => Some(parse_range(range)?),
            (None, None) => None,
        };

        let udf = args.udf.as_deref().and_then(UdfSpec::parse);

        Ok(Self {
            namespace: args.namespace,
            set: args.set,
            bins: args.bins.unwrap_or_default(),
            filter,
            udf,
            background: args.background,
        })
    }

    /// Build the query this request describes. Pure: the same request always
    /// yields an identical query.
    pub fn build_query(&self) -> Query {
        let query = Query::new(self.namespace.clone(), self.set.clone());
        let query = select_bins(query, &self.bins);
        apply_filter(query, self.filter.as_ref())
    }

    pub fn mode(&self) -> DispatchMode {
        DispatchMode::select(self.udf.as_ref(), self.background)
    }
}

fn parse_equal(args: &[String]) -> Result<Filter> {
    match args {
        [bin, value] => Ok(Filter::equal(bin.clone(), parse_value(value))),
        _ => Err(Error::Config(format!(
            "equal filter takes <bin> <value>, got {} argument(s)",
            args.len()
        ))),
    }
}

fn parse_range(args: &[String]) -> Result<Filter> {
    match args {
        [bin, start, end] => Ok(Filter::range(
            bin.clone(),
            parse_bound("start", start)?,
            parse_bound("end", end)?,
        )),
        _ => Err(Error::Config(format!(
            "range filter takes <bin> <start> <end>, got {} argument(s)",
            args.len()
        ))),
    }
}

fn parse_bound(name: &str, raw: &str) -> Result<i64> {
    raw.parse::<i64>()
        .map_err(|_| Error::Config(format!("range {} '{}' is not an integer", name, raw)))
}

/// Unvalidated `info` arguments
#[derive(Debug, Clone, Default)]
pub struct InfoArgs {
    pub requests: Vec<String>,
    pub any: bool,
    pub all: bool,
}

impl InfoRequest {
    /// Neither flag selects [`InfoMode::All`]
    pub fn from_args(args: InfoArgs) -> Result<Self> {
        if args.requests.is_empty() {
            return Err(Error::Config("at least one info request is required".into()));
        }
        let mode = match (args.any, args.all) {
            (true, true) => {
                return Err(Error::Config("--any and --all are mutually exclusive".into()))
            }
            (true, false) => InfoMode::Any,
            _ => InfoMode::All,
        };
        Ok(InfoRequest::new(&args.requests, mode))
    }
}
