//! Task parameters.
//!
//! [`Parameters`] is a plain struct with a builder.  The same values are
//! reachable by name through the `put_*_param`/`get_*_param` methods of
//! a task.  Names are case insensitive and may carry a
//! `CONICOPT_IPAR_`, `CONICOPT_DPAR_` or `CONICOPT_SPAR_` prefix for
//! integer, double and string parameters respectively.

use super::errors::ParameterError;
use super::types::*;
use crate::solver::conic::ConicSettings;
use crate::solver::simplex::{PricingRule, SimplexSettings};
use derive_builder::Builder;
use lazy_static::lazy_static;
use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters of a task.  Times are in seconds, negative for no limit.
#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(build_fn(validate = "Self::validate"))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Parameters {
    /// 0 disables the log stream
    #[builder(default = "1")]
    pub log_level: i32,

    #[builder(default = "OptimizerType::Free")]
    pub optimizer: OptimizerType,

    #[builder(default = "true")]
    pub presolve: bool,

    /// geometric mean scaling before simplex solves
    #[builder(default = "true")]
    pub simplex_scaling: bool,

    #[builder(default = "SimplexPricing::Dantzig")]
    pub simplex_pricing: SimplexPricing,

    /// consecutive degenerate pivots before switching to Bland's rule
    #[builder(default = "50")]
    pub simplex_degen_switch: i32,

    #[builder(default = "50")]
    pub simplex_refactor_freq: i32,

    #[builder(default = "100_000")]
    pub simplex_max_iterations: i32,

    #[builder(default = "1e-9")]
    pub simplex_tol_primal: f64,

    #[builder(default = "1e-9")]
    pub simplex_tol_dual: f64,

    #[builder(default = "400")]
    pub intpnt_max_iterations: i32,

    /// run basis identification after interior point solves of LPs
    #[builder(default = "true")]
    pub intpnt_basis: bool,

    #[builder(default = "1e-8")]
    pub intpnt_tol_rel_gap: f64,

    #[builder(default = "1e-8")]
    pub intpnt_tol_pfeas: f64,

    #[builder(default = "1e-8")]
    pub intpnt_tol_dfeas: f64,

    #[builder(default = "1e-8")]
    pub intpnt_tol_infeas: f64,

    #[builder(default = "-1.0")]
    pub optimizer_max_time: f64,

    /// node limit, negative for none
    #[builder(default = "-1")]
    pub mio_max_nodes: i32,

    #[builder(default = "-1.0")]
    pub mio_max_time: f64,

    #[builder(default = "NodeSelection::BestBound")]
    pub mio_node_selection: NodeSelection,

    /// try to complete a supplied initial integer solution
    #[builder(default = "true")]
    pub mio_construct_sol: bool,

    /// seed of the branching tie breaks
    #[builder(default = "0")]
    pub mio_seed: i32,

    #[builder(default = "1e-5")]
    pub mio_tol_abs_relax_int: f64,

    #[builder(default = "1e-4")]
    pub mio_tol_rel_gap: f64,

    #[builder(default = "0.0")]
    pub mio_tol_abs_gap: f64,

    #[builder(default = "String::new()")]
    pub task_name: String,
}

impl Default for Parameters {
    fn default() -> Parameters {
        ParametersBuilder::default().build().unwrap()
    }
}

impl Parameters {
    /// Checks all fields
    pub fn validate(&self) -> Result<(), ParameterError> {
        for (name, v) in [
            ("log_level", self.log_level),
            ("simplex_degen_switch", self.simplex_degen_switch),
            ("simplex_refactor_freq", self.simplex_refactor_freq),
            ("simplex_max_iterations", self.simplex_max_iterations),
            ("intpnt_max_iterations", self.intpnt_max_iterations),
            ("mio_max_nodes", self.mio_max_nodes),
            ("mio_seed", self.mio_seed),
        ] {
            check_int(name, v)?;
        }
        for (name, v) in [
            ("simplex_tol_primal", self.simplex_tol_primal),
            ("simplex_tol_dual", self.simplex_tol_dual),
            ("intpnt_tol_rel_gap", self.intpnt_tol_rel_gap),
            ("intpnt_tol_pfeas", self.intpnt_tol_pfeas),
            ("intpnt_tol_dfeas", self.intpnt_tol_dfeas),
            ("intpnt_tol_infeas", self.intpnt_tol_infeas),
            ("mio_tol_abs_relax_int", self.mio_tol_abs_relax_int),
            ("mio_tol_rel_gap", self.mio_tol_rel_gap),
            ("mio_tol_abs_gap", self.mio_tol_abs_gap),
            ("optimizer_max_time", self.optimizer_max_time),
            ("mio_max_time", self.mio_max_time),
        ] {
            check_double(name, v)?;
        }
        Ok(())
    }

    /// Interior point settings for a solve with `time_limit` seconds left
    pub(crate) fn conic_settings(&self, time_limit: f64) -> ConicSettings<f64> {
        let tol_feas = f64::min(self.intpnt_tol_pfeas, self.intpnt_tol_dfeas);
        ConicSettings {
            max_iter: self.intpnt_max_iterations as u32,
            time_limit: if time_limit > 0.0 { time_limit } else { f64::INFINITY },
            verbose: self.log_level > 0,
            tol_gap_abs: self.intpnt_tol_rel_gap,
            tol_gap_rel: self.intpnt_tol_rel_gap,
            tol_feas,
            tol_infeas_abs: self.intpnt_tol_infeas,
            tol_infeas_rel: self.intpnt_tol_infeas,
            ..ConicSettings::default()
        }
    }

    pub(crate) fn simplex_settings(&self, time_limit: f64) -> SimplexSettings<f64> {
        SimplexSettings {
            pricing: match self.simplex_pricing {
                SimplexPricing::Dantzig => PricingRule::Dantzig,
                SimplexPricing::Bland => PricingRule::Bland,
            },
            degen_switch: self.simplex_degen_switch as usize,
            refactor_freq: self.simplex_refactor_freq as usize,
            max_iter: self.simplex_max_iterations as usize,
            time_limit: if time_limit > 0.0 { time_limit } else { f64::INFINITY },
            tol_primal: self.simplex_tol_primal,
            tol_dual: self.simplex_tol_dual,
            verbose: self.log_level > 0,
            ..SimplexSettings::default()
        }
    }
}

impl ParametersBuilder {
    // only the explicitly set fields need checking, defaults are legal
    fn validate(&self) -> Result<(), String> {
        macro_rules! check_set {
            ($checker:ident: $($f:ident),*) => {
                $( if let Some(v) = self.$f { $checker(stringify!($f), v).map_err(|e| e.to_string())?; } )*
            };
        }
        check_set!(check_int:
            log_level,
            simplex_degen_switch,
            simplex_refactor_freq,
            simplex_max_iterations,
            intpnt_max_iterations,
            mio_max_nodes,
            mio_seed
        );
        check_set!(check_double:
            simplex_tol_primal,
            simplex_tol_dual,
            intpnt_tol_rel_gap,
            intpnt_tol_pfeas,
            intpnt_tol_dfeas,
            intpnt_tol_infeas,
            mio_tol_abs_relax_int,
            mio_tol_rel_gap,
            mio_tol_abs_gap,
            optimizer_max_time,
            mio_max_time
        );
        Ok(())
    }
}

fn check_int(name: &str, v: i32) -> Result<(), ParameterError> {
    let ok = match name {
        "simplex_degen_switch" | "simplex_refactor_freq" => v >= 1,
        "mio_max_nodes" => v >= -1,
        _ => v >= 0,
    };
    check(ok, name, v)
}

fn check_double(name: &str, v: f64) -> Result<(), ParameterError> {
    let ok = match name {
        "mio_tol_rel_gap" | "mio_tol_abs_gap" => v >= 0.0,
        "optimizer_max_time" | "mio_max_time" => !v.is_nan(),
        _ => v > 0.0 && v < 1.0,
    };
    check(ok, name, v)
}

fn check<V: ToString>(ok: bool, name: &str, value: V) -> Result<(), ParameterError> {
    if ok {
        Ok(())
    } else {
        Err(ParameterError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
        })
    }
}

// ---------------------------------
// named access
// ---------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParamKind {
    Int,
    Double,
    Str,
}

type IntGet = fn(&Parameters) -> i32;
type IntSet = fn(&mut Parameters, i32) -> Option<()>;

enum Accessor {
    Int {
        get: IntGet,
        set: IntSet,
        // symbolic names of the values 0, 1, ...
        names: &'static [&'static str],
    },
    Double {
        get: fn(&Parameters) -> f64,
        set: fn(&mut Parameters, f64),
    },
    Str {
        get: fn(&Parameters) -> String,
        set: fn(&mut Parameters, String),
    },
}

impl Accessor {
    fn kind(&self) -> ParamKind {
        match self {
            Accessor::Int { .. } => ParamKind::Int,
            Accessor::Double { .. } => ParamKind::Double,
            Accessor::Str { .. } => ParamKind::Str,
        }
    }
}

const BOOL_NAMES: &[&str] = &["off", "on"];
const OPTIMIZER_NAMES: &[&str] = &["free", "intpnt", "conic", "primal_simplex", "mixed_int"];
const OPTIMIZERS: &[OptimizerType] = &[
    OptimizerType::Free,
    OptimizerType::Intpnt,
    OptimizerType::Conic,
    OptimizerType::PrimalSimplex,
    OptimizerType::MixedInt,
];
const PRICING_NAMES: &[&str] = &["dantzig", "bland"];
const PRICINGS: &[SimplexPricing] = &[SimplexPricing::Dantzig, SimplexPricing::Bland];
const NODE_SELECTION_NAMES: &[&str] = &["best_bound", "depth_first"];
const NODE_SELECTIONS: &[NodeSelection] = &[NodeSelection::BestBound, NodeSelection::DepthFirst];

fn ordinal<E: PartialEq>(all: &[E], v: &E) -> i32 {
    all.iter().position(|e| e == v).unwrap_or(0) as i32
}

fn from_ordinal<E: Copy>(all: &[E], v: i32) -> Option<E> {
    usize::try_from(v).ok().and_then(|i| all.get(i).copied())
}

fn bool_from(v: i32) -> Option<bool> {
    match v {
        0 => Some(false),
        1 => Some(true),
        _ => None,
    }
}

macro_rules! int_param {
    ($map:ident, $field:ident) => {
        $map.insert(
            stringify!($field),
            Accessor::Int {
                get: |p| p.$field,
                set: |p, v| {
                    p.$field = v;
                    Some(())
                },
                names: &[],
            },
        );
    };
}

macro_rules! bool_param {
    ($map:ident, $field:ident) => {
        $map.insert(
            stringify!($field),
            Accessor::Int {
                get: |p| p.$field as i32,
                set: |p, v| {
                    p.$field = bool_from(v)?;
                    Some(())
                },
                names: BOOL_NAMES,
            },
        );
    };
}

macro_rules! enum_param {
    ($map:ident, $field:ident, $all:expr, $names:expr) => {
        $map.insert(
            stringify!($field),
            Accessor::Int {
                get: |p| ordinal($all, &p.$field),
                set: |p, v| {
                    p.$field = from_ordinal($all, v)?;
                    Some(())
                },
                names: $names,
            },
        );
    };
}

macro_rules! double_param {
    ($map:ident, $field:ident) => {
        $map.insert(
            stringify!($field),
            Accessor::Double {
                get: |p| p.$field,
                set: |p, v| p.$field = v,
            },
        );
    };
}

lazy_static! {
    static ref REGISTRY: HashMap<&'static str, Accessor> = {
        let mut m = HashMap::new();
        int_param!(m, log_level);
        enum_param!(m, optimizer, OPTIMIZERS, OPTIMIZER_NAMES);
        bool_param!(m, presolve);
        bool_param!(m, simplex_scaling);
        enum_param!(m, simplex_pricing, PRICINGS, PRICING_NAMES);
        int_param!(m, simplex_degen_switch);
        int_param!(m, simplex_refactor_freq);
        int_param!(m, simplex_max_iterations);
        double_param!(m, simplex_tol_primal);
        double_param!(m, simplex_tol_dual);
        int_param!(m, intpnt_max_iterations);
        bool_param!(m, intpnt_basis);
        double_param!(m, intpnt_tol_rel_gap);
        double_param!(m, intpnt_tol_pfeas);
        double_param!(m, intpnt_tol_dfeas);
        double_param!(m, intpnt_tol_infeas);
        double_param!(m, optimizer_max_time);
        int_param!(m, mio_max_nodes);
        double_param!(m, mio_max_time);
        enum_param!(m, mio_node_selection, NODE_SELECTIONS, NODE_SELECTION_NAMES);
        bool_param!(m, mio_construct_sol);
        int_param!(m, mio_seed);
        double_param!(m, mio_tol_abs_relax_int);
        double_param!(m, mio_tol_rel_gap);
        double_param!(m, mio_tol_abs_gap);
        m.insert(
            "task_name",
            Accessor::Str {
                get: |p| p.task_name.clone(),
                set: |p, v| p.task_name = v,
            },
        );
        m
    };
}

// registry entry for `name`, checking a type prefix if present
fn lookup(name: &str) -> Result<&'static Accessor, ParameterError> {
    let lower = name.trim().to_ascii_lowercase();
    let (key, prefix_kind) = match lower.strip_prefix("conicopt_") {
        Some(rest) => {
            if let Some(k) = rest.strip_prefix("ipar_") {
                (k.to_string(), Some(ParamKind::Int))
            } else if let Some(k) = rest.strip_prefix("dpar_") {
                (k.to_string(), Some(ParamKind::Double))
            } else if let Some(k) = rest.strip_prefix("spar_") {
                (k.to_string(), Some(ParamKind::Str))
            } else {
                return Err(ParameterError::UnknownName(name.to_string()));
            }
        }
        None => (lower, None),
    };
    let accessor = REGISTRY
        .get(key.as_str())
        .ok_or_else(|| ParameterError::UnknownName(name.to_string()))?;
    match prefix_kind {
        Some(kind) if kind != accessor.kind() => Err(ParameterError::WrongType(name.to_string())),
        _ => Ok(accessor),
    }
}

fn invalid(name: &str, value: impl ToString) -> ParameterError {
    ParameterError::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
    }
}

// apply `f` to a copy and keep it only if the result validates
fn update(
    params: &mut Parameters,
    name: &str,
    value: impl ToString,
    f: impl FnOnce(&mut Parameters) -> Option<()>,
) -> Result<(), ParameterError> {
    let mut candidate = params.clone();
    f(&mut candidate).ok_or_else(|| invalid(name, value.to_string()))?;
    candidate
        .validate()
        .map_err(|_| invalid(name, value.to_string()))?;
    *params = candidate;
    Ok(())
}

impl Parameters {
    pub fn put_int_param(&mut self, name: &str, value: i32) -> Result<(), ParameterError> {
        match lookup(name)? {
            Accessor::Int { set, .. } => update(self, name, value, |p| set(p, value)),
            _ => Err(ParameterError::WrongType(name.to_string())),
        }
    }

    pub fn put_double_param(&mut self, name: &str, value: f64) -> Result<(), ParameterError> {
        match lookup(name)? {
            Accessor::Double { set, .. } => update(self, name, value, |p| {
                set(p, value);
                Some(())
            }),
            _ => Err(ParameterError::WrongType(name.to_string())),
        }
    }

    pub fn put_string_param(&mut self, name: &str, value: &str) -> Result<(), ParameterError> {
        match lookup(name)? {
            Accessor::Str { set, .. } => update(self, name, value, |p| {
                set(p, value.to_string());
                Some(())
            }),
            _ => Err(ParameterError::WrongType(name.to_string())),
        }
    }

    /// Set a parameter of any type from text.  Integer parameters also
    /// accept the symbolic names of their values, e.g. `"on"` or
    /// `"intpnt"`.
    pub fn put_param(&mut self, name: &str, text: &str) -> Result<(), ParameterError> {
        let text = text.trim();
        match lookup(name)? {
            Accessor::Int { set, names, .. } => {
                let lower = text.to_ascii_lowercase();
                let value = match names.iter().position(|s| *s == lower) {
                    Some(i) => i as i32,
                    None => match lower.as_str() {
                        "true" if names == &BOOL_NAMES => 1,
                        "false" if names == &BOOL_NAMES => 0,
                        _ => text.parse::<i32>().map_err(|_| invalid(name, text))?,
                    },
                };
                update(self, name, text, |p| set(p, value))
            }
            Accessor::Double { set, .. } => {
                let value = text.parse::<f64>().map_err(|_| invalid(name, text))?;
                update(self, name, text, |p| {
                    set(p, value);
                    Some(())
                })
            }
            Accessor::Str { set, .. } => update(self, name, text, |p| {
                set(p, text.to_string());
                Some(())
            }),
        }
    }

    pub fn get_int_param(&self, name: &str) -> Result<i32, ParameterError> {
        match lookup(name)? {
            Accessor::Int { get, .. } => Ok(get(self)),
            _ => Err(ParameterError::WrongType(name.to_string())),
        }
    }

    pub fn get_double_param(&self, name: &str) -> Result<f64, ParameterError> {
        match lookup(name)? {
            Accessor::Double { get, .. } => Ok(get(self)),
            _ => Err(ParameterError::WrongType(name.to_string())),
        }
    }

    pub fn get_string_param(&self, name: &str) -> Result<String, ParameterError> {
        match lookup(name)? {
            Accessor::Str { get, .. } => Ok(get(self)),
            _ => Err(ParameterError::WrongType(name.to_string())),
        }
    }

    /// Names of all parameters, sorted
    pub fn names() -> Vec<&'static str> {
        let mut names: Vec<_> = REGISTRY.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_parameters() {
        let p = Parameters::default();
        assert!(p.validate().is_ok());
        assert_eq!(p.log_level, 1);
        assert_eq!(p, ParametersBuilder::default().build().unwrap());
    }

    #[test]
    fn test_builder_defaults_and_validation() {
        let p = ParametersBuilder::default()
            .optimizer(OptimizerType::Intpnt)
            .mio_max_nodes(10)
            .build()
            .unwrap();
        assert_eq!(p.optimizer, OptimizerType::Intpnt);
        assert_eq!(p.mio_max_nodes, 10);
        assert_eq!(p.simplex_refactor_freq, 50);

        assert!(ParametersBuilder::default().simplex_refactor_freq(0).build().is_err());
        assert!(ParametersBuilder::default().intpnt_tol_rel_gap(-1.0).build().is_err());
    }

    #[test]
    fn test_named_access() {
        let mut p = Parameters::default();
        p.put_int_param("LOG_LEVEL", 0).unwrap();
        assert_eq!(p.log_level, 0);
        p.put_int_param("CONICOPT_IPAR_MIO_MAX_NODES", 7).unwrap();
        assert_eq!(p.get_int_param("mio_max_nodes").unwrap(), 7);
        p.put_double_param("conicopt_dpar_mio_tol_rel_gap", 1e-3).unwrap();
        assert_eq!(p.mio_tol_rel_gap, 1e-3);
        p.put_string_param("Task_Name", "lo1").unwrap();
        assert_eq!(p.get_string_param("task_name").unwrap(), "lo1");

        p.put_param("optimizer", "INTPNT").unwrap();
        assert_eq!(p.optimizer, OptimizerType::Intpnt);
        p.put_param("presolve", "off").unwrap();
        assert!(!p.presolve);
        p.put_param("intpnt_basis", "false").unwrap();
        assert!(!p.intpnt_basis);
        p.put_param("simplex_pricing", "1").unwrap();
        assert_eq!(p.simplex_pricing, SimplexPricing::Bland);
        p.put_param("optimizer_max_time", "2.5").unwrap();
        assert_eq!(p.optimizer_max_time, 2.5);
    }

    #[test]
    fn test_errors_leave_settings_untouched() {
        let mut p = Parameters::default();
        let before = p.clone();

        assert!(matches!(p.put_int_param("no_such_param", 1), Err(ParameterError::UnknownName(_))));
        assert!(matches!(p.put_double_param("log_level", 1.0), Err(ParameterError::WrongType(_))));
        assert!(matches!(p.put_int_param("conicopt_dpar_log_level", 1), Err(ParameterError::WrongType(_))));
        assert!(matches!(p.put_int_param("log_level", -3), Err(ParameterError::InvalidValue { .. })));
        assert!(matches!(p.put_int_param("presolve", 2), Err(ParameterError::InvalidValue { .. })));
        assert!(matches!(p.put_param("optimizer", "newton"), Err(ParameterError::InvalidValue { .. })));
        assert!(matches!(p.put_double_param("intpnt_tol_pfeas", 0.0), Err(ParameterError::InvalidValue { .. })));
        assert_eq!(p, before);
    }

    #[test]
    fn test_every_name_is_readable() {
        let p = Parameters::default();
        for name in Parameters::names() {
            let ok = p.get_int_param(name).is_ok()
                || p.get_double_param(name).is_ok()
                || p.get_string_param(name).is_ok();
            assert!(ok, "{}", name);
        }
    }
}
