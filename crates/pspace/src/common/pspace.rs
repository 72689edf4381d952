//! Parameter sets: every combination of parameter values of a configuration
//! together with the datafile it produces.
use std::path::{Path, PathBuf};

use itertools::Itertools;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::common::compare::compare;
use crate::common::config::Config;
use crate::common::error::PspaceError;
use crate::common::expr::{Scope, Value};
use crate::common::utils::fs::{absolute_path, expand_user, relative_path};
use crate::pbs::qstat::QueueData;
use crate::{Map, Set};

/// Values of the declared parameters, in declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterValues(pub Vec<(String, f64)>);

impl ParameterValues {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|(pname, _)| pname == name)
            .map(|(_, value)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, value)| (name.as_str(), *value))
    }
}

impl Scope for ParameterValues {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).map(Value::Float)
    }
}

impl Serialize for ParameterValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSet {
    pub values: ParameterValues,
    /// Target accuracy.
    pub acc: f64,
    /// Datafile name as produced by the `DATAFILE` template.
    pub file: String,
    /// Datafile path relative to the current directory.
    pub relpath: PathBuf,
    pub abspath: PathBuf,
}

impl Scope for ParameterSet {
    fn lookup(&self, name: &str) -> Option<Value> {
        match name {
            "ACC" => Some(Value::Float(self.acc)),
            "FILE" => Some(Value::Str(self.file.clone())),
            "RELPATH" => Some(Value::Str(self.relpath.to_string_lossy().into_owned())),
            "ABSPATH" => Some(Value::Str(self.abspath.to_string_lossy().into_owned())),
            _ => self.values.lookup(name),
        }
    }
}

/// Parameter sets keyed by their (`~` expanded) datafile name.
pub type ParameterSets = Map<String, ParameterSet>;

/// Datafile name of a parameter combination. Values are rounded to the nearest integer.
pub fn name_datafile(conf: &Config, values: &ParameterValues) -> crate::Result<String> {
    let values: Vec<Value> = conf
        .datafile
        .evaluate(values)?
        .into_iter()
        .map(|value| match value.as_f64() {
            Some(number) if number.is_finite() => Value::Int(number.round_ties_even() as i64),
            _ => value,
        })
        .collect();
    Ok(format!("{}.h5", conf.datafile.template.render(&values)?))
}

pub fn cmd_file(conf: &Config, pset: &ParameterSet) -> crate::Result<String> {
    conf.cmd_file.fill(pset)
}

pub fn cmd_exec(conf: &Config, pset: &ParameterSet) -> crate::Result<String> {
    conf.cmd_exec.fill(pset)
}

pub fn cmd_acc(conf: &Config, pset: &ParameterSet) -> crate::Result<String> {
    conf.cmd_acc.fill(pset)
}

pub fn cmd_check(conf: &Config, pset: &ParameterSet) -> crate::Result<String> {
    conf.cmd_check.fill(pset)
}

/// Computes all parameter sets of `conf`. Relative paths are expressed with respect to `cwd`.
///
/// When several parameter space definitions produce the same datafile, the
/// parameter set that was computed first is kept if its accuracy compares
/// favourably with the newer one under `CMD_ACC_OP`.
pub fn compute_psets(conf: &Config, cwd: &Path) -> crate::Result<ParameterSets> {
    let mut psets = ParameterSets::new();

    for pspace in &conf.pspaces {
        let combinations: Vec<Vec<f64>> = if conf.pnames.is_empty() {
            vec![Vec::new()]
        } else {
            conf.pnames
                .iter()
                .map(|name| {
                    pspace
                        .values
                        .get(name)
                        .map(Vec::as_slice)
                        .unwrap_or_default()
                        .iter()
                        .copied()
                })
                .multi_cartesian_product()
                .collect()
        };

        for combination in combinations {
            let values = ParameterValues(conf.pnames.iter().cloned().zip(combination).collect());
            let file = name_datafile(conf, &values)?;
            let key = expand_user(&file).to_string_lossy().into_owned();
            let abspath = absolute_path(Path::new(&key), &conf.workdir);
            let pset = ParameterSet {
                values,
                acc: pspace.acc,
                file,
                relpath: relative_path(&abspath, cwd),
                abspath,
            };

            if let Some(existing) = psets.get(&key) {
                if compare(existing.acc, pset.acc, conf.acc_op) {
                    continue;
                }
            }
            psets.insert(key, pset);
        }
    }
    Ok(psets)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ParamFilter {
    Exact(f64),
    Interval(Option<f64>, Option<f64>),
}

impl ParamFilter {
    fn matches(&self, value: f64) -> bool {
        match *self {
            ParamFilter::Exact(expected) => value == expected,
            ParamFilter::Interval(low, high) => {
                low.is_none_or(|low| value >= low) && high.is_none_or(|high| value <= high)
            }
        }
    }
}

fn filter_error<T>(message: String) -> crate::Result<T> {
    Err(PspaceError::ParamFilterError(message))
}

fn parse_filter_value(value: &str) -> crate::Result<f64> {
    value
        .parse()
        .or_else(|_| filter_error(format!("bad value \"{value}\"")))
}

fn parse_param_option(option: &str, pnames: &[String]) -> crate::Result<Vec<(String, ParamFilter)>> {
    let mut filters: Vec<(String, ParamFilter)> = Vec::new();
    let mut seen = Set::new();

    for pair in option.trim().split(',').map(str::trim) {
        if pair.is_empty() {
            continue;
        }
        let parts: Vec<&str> = pair.split('=').collect();
        let [name, value] = parts.as_slice() else {
            return filter_error(format!("bad NAME=VALUE pair \"{pair}\""));
        };
        let (name, value) = (name.trim(), value.trim());

        if !seen.insert(name) {
            return filter_error(format!("double definition of parameter \"{name}\""));
        }
        if !pnames.is_empty() && !pnames.iter().any(|pname| pname == name) {
            return filter_error(format!("undeclared parameter \"{name}\""));
        }

        let filter = match value.split(':').collect::<Vec<_>>().as_slice() {
            [single] => ParamFilter::Exact(parse_filter_value(single)?),
            [low, high] => {
                let bound = |text: &str| -> crate::Result<Option<f64>> {
                    let text = text.trim();
                    if text.is_empty() {
                        Ok(None)
                    } else {
                        parse_filter_value(text).map(Some)
                    }
                };
                ParamFilter::Interval(bound(low)?, bound(high)?)
            }
            _ => return filter_error(format!("bad interval definition \"{value}\"")),
        };
        filters.push((name.to_string(), filter));
    }
    Ok(filters)
}

/// Keeps the parameter sets selected by a `--param` option like `J=1,L=10:20`.
pub fn filter_psets(psets: ParameterSets, option: &str, pnames: &[String]) -> crate::Result<ParameterSets> {
    let filters = parse_param_option(option, pnames)?;
    if filters.is_empty() {
        return Ok(psets);
    }
    Ok(psets
        .into_iter()
        .filter(|(_, pset)| {
            filters.iter().all(|(name, filter)| {
                pset.values
                    .get(name)
                    .is_some_and(|value| filter.matches(value))
            })
        })
        .collect())
}

/// Number of parameter sets that have a job in the queue.
pub fn count_running(psets: &ParameterSets, qdata: &QueueData) -> usize {
    let job_names: Set<&str> = qdata.values().map(|job| job.name.as_str()).collect();
    psets
        .keys()
        .filter(|key| job_names.contains(key.as_str()))
        .count()
}
