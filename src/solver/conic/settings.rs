use crate::algebra::*;
use derive_builder::Builder;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Error type returned by settings validation
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum SettingsError {
    #[error("Bad value for field \"{0}\"")]
    BadFieldValue(&'static str),
}

/// Settings of the interior point engine.
///
/// Usually populated from the task parameters.  All tolerances are
/// applied to the equilibrated problem.
#[derive(Builder, Debug, Clone)]
#[builder(build_fn(validate = "Self::validate"))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConicSettings<T: FloatT> {
    ///maximum number of iterations
    #[builder(default = "200")]
    pub max_iter: u32,

    ///maximum run time (seconds)
    #[builder(default = "f64::INFINITY")]
    pub time_limit: f64,

    ///print the iteration log
    #[builder(default = "false")]
    pub verbose: bool,

    ///maximum interior point step length
    #[builder(default = "(0.99).as_T()")]
    pub max_step_fraction: T,

    ///absolute duality gap tolerance
    #[builder(default = "(1e-8).as_T()")]
    pub tol_gap_abs: T,

    ///relative duality gap tolerance
    #[builder(default = "(1e-8).as_T()")]
    pub tol_gap_rel: T,

    ///feasibility check tolerance (primal and dual)
    #[builder(default = "(1e-8).as_T()")]
    pub tol_feas: T,

    ///absolute infeasibility tolerance (primal and dual)
    #[builder(default = "(1e-8).as_T()")]
    pub tol_infeas_abs: T,

    ///relative infeasibility tolerance (primal and dual)
    #[builder(default = "(1e-8).as_T()")]
    pub tol_infeas_rel: T,

    ///κ/τ tolerance
    #[builder(default = "(1e-6).as_T()")]
    pub tol_ktratio: T,

    ///reduced absolute duality gap tolerance
    #[builder(default = "(5e-5).as_T()")]
    pub reduced_tol_gap_abs: T,

    ///reduced relative duality gap tolerance
    #[builder(default = "(5e-5).as_T()")]
    pub reduced_tol_gap_rel: T,

    ///reduced feasibility check tolerance (primal and dual)
    #[builder(default = "(1e-4).as_T()")]
    pub reduced_tol_feas: T,

    ///reduced absolute infeasibility tolerance (primal and dual).
    ///Smaller is less strict here.
    #[builder(default = "(5e-12).as_T()")]
    pub reduced_tol_infeas_abs: T,

    ///reduced relative infeasibility tolerance (primal and dual)
    #[builder(default = "(5e-5).as_T()")]
    pub reduced_tol_infeas_rel: T,

    ///reduced κ/τ tolerance
    #[builder(default = "(1e-4).as_T()")]
    pub reduced_tol_ktratio: T,

    ///enable data equilibration pre-scaling
    #[builder(default = "true")]
    pub equilibrate_enable: bool,

    /// maximum equilibration scaling iterations
    #[builder(default = "10")]
    pub equilibrate_max_iter: u32,

    ///minimum equilibration scaling allowed
    #[builder(default = "(1e-4).as_T()")]
    pub equilibrate_min_scaling: T,

    ///maximum equilibration scaling allowed
    #[builder(default = "(1e+4).as_T()")]
    pub equilibrate_max_scaling: T,

    ///line search backtracking
    #[builder(default = "(0.8).as_T()")]
    pub linesearch_backtrack_step: T,

    ///minimum step size allowed for nonsymmetric cones with PrimalDual scaling
    #[builder(default = "(1e-1).as_T()")]
    pub min_switch_step_length: T,

    ///minimum step size allowed for symmetric cones & nonsymmetric cones with Dual scaling
    #[builder(default = "(1e-4).as_T()")]
    pub min_terminate_step_length: T,

    ///enable KKT static regularization
    #[builder(default = "true")]
    pub static_regularization_enable: bool,

    ///KKT static regularization parameter
    #[builder(default = "(1e-8).as_T()")]
    pub static_regularization_constant: T,

    ///additional regularization parameter w.r.t. the maximum abs diagonal term
    #[builder(default = "T::epsilon()*T::epsilon()")]
    pub static_regularization_proportional: T,

    ///enable KKT dynamic regularization
    #[builder(default = "true")]
    pub dynamic_regularization_enable: bool,

    ///KKT dynamic regularization threshold
    #[builder(default = "(1e-13).as_T()")]
    pub dynamic_regularization_eps: T,

    ///KKT dynamic regularization shift
    #[builder(default = "(2e-7).as_T()")]
    pub dynamic_regularization_delta: T,

    ///KKT direct solve with iterative refinement
    #[builder(default = "true")]
    pub iterative_refinement_enable: bool,

    ///iterative refinement relative tolerance
    #[builder(default = "(1e-13).as_T()")]
    pub iterative_refinement_reltol: T,

    ///iterative refinement absolute tolerance
    #[builder(default = "(1e-12).as_T()")]
    pub iterative_refinement_abstol: T,

    ///iterative refinement maximum iterations
    #[builder(default = "10")]
    pub iterative_refinement_max_iter: u32,

    ///iterative refinement stalling tolerance
    #[builder(default = "(5.0).as_T()")]
    pub iterative_refinement_stop_ratio: T,
}

impl<T> Default for ConicSettings<T>
where
    T: FloatT,
{
    fn default() -> ConicSettings<T> {
        ConicSettingsBuilder::<T>::default().build().unwrap()
    }
}

impl<T> ConicSettings<T>
where
    T: FloatT,
{
    /// Checks that the settings are valid.  Tolerances must be positive
    /// and the step fraction must lie in (0,1].
    pub fn validate(&self) -> Result<(), SettingsError> {
        validate_step_fraction(self.max_step_fraction)?;
        validate_positive(self.tol_gap_abs, "tol_gap_abs")?;
        validate_positive(self.tol_gap_rel, "tol_gap_rel")?;
        validate_positive(self.tol_feas, "tol_feas")?;
        validate_positive(self.tol_infeas_abs, "tol_infeas_abs")?;
        validate_positive(self.tol_infeas_rel, "tol_infeas_rel")?;
        validate_positive(self.tol_ktratio, "tol_ktratio")?;
        if self.equilibrate_min_scaling > self.equilibrate_max_scaling {
            return Err(SettingsError::BadFieldValue("equilibrate_min_scaling"));
        }
        if !(self.time_limit > 0.0) {
            return Err(SettingsError::BadFieldValue("time_limit"));
        }
        Ok(())
    }
}

// pre build checker (for auto-validation when using the builder)

impl From<SettingsError> for ConicSettingsBuilderError {
    fn from(e: SettingsError) -> Self {
        ConicSettingsBuilderError::ValidationError(e.to_string())
    }
}

impl<T> ConicSettingsBuilder<T>
where
    T: FloatT,
{
    /// Checks the fields that have been set explicitly
    pub fn validate(&self) -> Result<(), SettingsError> {
        if let Some(α) = self.max_step_fraction {
            validate_step_fraction(α)?;
        }
        if let Some(tol) = self.tol_gap_abs {
            validate_positive(tol, "tol_gap_abs")?;
        }
        if let Some(tol) = self.tol_gap_rel {
            validate_positive(tol, "tol_gap_rel")?;
        }
        if let Some(tol) = self.tol_feas {
            validate_positive(tol, "tol_feas")?;
        }
        Ok(())
    }
}

fn validate_step_fraction<T: FloatT>(α: T) -> Result<(), SettingsError> {
    if α > T::zero() && α <= T::one() {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue("max_step_fraction"))
    }
}

fn validate_positive<T: FloatT>(v: T, name: &'static str) -> Result<(), SettingsError> {
    if v > T::zero() {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue(name))
    }
}

#[test]
fn test_settings_validate() {
    let settings = ConicSettings::<f64>::default();
    assert!(settings.validate().is_ok());

    let bad = ConicSettingsBuilder::<f64>::default()
        .max_step_fraction(1.5)
        .build();
    assert!(bad.is_err());

    let settings = ConicSettingsBuilder::<f64>::default()
        .max_iter(50)
        .tol_gap_rel(1e-6)
        .build()
        .unwrap();
    assert_eq!(settings.max_iter, 50);
    assert_eq!(settings.tol_feas, 1e-8);
}
