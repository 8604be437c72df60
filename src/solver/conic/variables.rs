use super::*;
use crate::algebra::*;
use crate::solver::conic::cones::{CompositeCone, Cone, PrimalOrDualCone, ScalingStrategy};

// ---------------
// Iterate of the homogeneous embedding
// ---------------

/// Primal and dual iterate `(x,s,z,τ,κ)` of the homogeneous embedding
pub struct ConicVariables<T> {
    /// scaled primal variables
    pub x: Vec<T>,
    /// slack variables
    pub s: Vec<T>,
    /// scaled dual variables
    pub z: Vec<T>,
    /// homogenization scalar τ
    pub τ: T,
    /// homogenization scalar κ
    pub κ: T,
}

impl<T: std::fmt::Debug> std::fmt::Debug for ConicVariables<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "x: {:?}\ns: {:?}\nz: {:?}\nτ: {:?}\nκ: {:?}\n",
            self.x, self.s, self.z, self.τ, self.κ
        )
    }
}

impl<T> ConicVariables<T>
where
    T: FloatT,
{
    pub fn new(n: usize, m: usize) -> Self {
        Self {
            x: vec![T::zero(); n],
            s: vec![T::zero(); m],
            z: vec![T::zero(); m],
            τ: T::one(),
            κ: T::one(),
        }
    }

    pub(crate) fn calc_mu(&self, residuals: &ConicResiduals<T>, cones: &CompositeCone<T>) -> T {
        let denom: T = (cones.degree() + 1).as_T();
        (residuals.dot_sz + self.τ * self.κ) / denom
    }

    pub(crate) fn affine_step_rhs(
        &mut self,
        residuals: &ConicResiduals<T>,
        variables: &Self,
        cones: &CompositeCone<T>,
    ) {
        self.x.copy_from(&residuals.rx);
        self.z.copy_from(&residuals.rz);
        cones.affine_ds(&mut self.s, &variables.s);
        self.τ = residuals.rτ;
        self.κ = variables.τ * variables.κ;
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn combined_step_rhs(
        &mut self,
        residuals: &ConicResiduals<T>,
        variables: &Self,
        cones: &mut CompositeCone<T>,
        step: &mut Self,
        σ: T,
        μ: T,
        m: T,
    ) {
        let dotσμ = σ * μ;

        self.x.axpby(T::one() - σ, &residuals.rx, T::zero());
        self.τ = (T::one() - σ) * residuals.rτ;
        self.κ = -dotσμ + m * step.τ * step.κ + variables.τ * variables.κ;

        // Symmetric cones: d.s = λ ◦ λ + W⁻¹Δs ∘ WΔz − σμe
        // Nonsymmetric cones: d.s = s + σμ*g(z)
        // The Mehrotra correction is scaled by m through step.z
        if m != T::one() {
            step.z.scale(m);
        }

        cones.combined_ds_shift(&mut self.z, &mut step.z, &mut step.s, dotσμ);

        // self.s still holds the affine ds here
        self.s.axpby(T::one(), &self.z, T::one());

        self.z.axpby(T::one() - σ, &residuals.rz, T::zero());
    }

    pub(crate) fn calc_step_length(
        &self,
        step: &Self,
        cones: &mut CompositeCone<T>,
        settings: &ConicSettings<T>,
        step_direction: StepDirection,
    ) -> T {
        let ατ = if step.τ < T::zero() {
            -self.τ / step.τ
        } else {
            T::max_value()
        };

        let ακ = if step.κ < T::zero() {
            -self.κ / step.κ
        } else {
            T::max_value()
        };

        let α = [ατ, ακ, T::one()].minimum();
        let (αz, αs) = cones.step_length(&step.z, &step.s, &self.z, &self.s, settings, α);

        let mut α = T::min(αz, αs);

        if step_direction == StepDirection::Combined {
            α *= settings.max_step_fraction;
        }

        α
    }

    pub(crate) fn add_step(&mut self, step: &Self, α: T) {
        self.x.axpby(α, &step.x, T::one());
        self.s.axpby(α, &step.s, T::one());
        self.z.axpby(α, &step.z, T::one());
        self.τ += α * step.τ;
        self.κ += α * step.κ;
    }

    pub(crate) fn symmetric_initialization(&mut self, cones: &mut CompositeCone<T>) {
        _shift_to_cone_interior(&mut self.s, cones, PrimalOrDualCone::PrimalCone);
        _shift_to_cone_interior(&mut self.z, cones, PrimalOrDualCone::DualCone);

        self.τ = T::one();
        self.κ = T::one();
    }

    pub(crate) fn unit_initialization(&mut self, cones: &CompositeCone<T>) {
        cones.unit_initialization(&mut self.z, &mut self.s);

        self.x.set(T::zero());
        self.τ = T::one();
        self.κ = T::one();
    }

    pub(crate) fn copy_from(&mut self, src: &Self) {
        self.x.copy_from(&src.x);
        self.s.copy_from(&src.s);
        self.z.copy_from(&src.z);
        self.τ = src.τ;
        self.κ = src.κ;
    }

    pub(crate) fn scale_cones(
        &self,
        cones: &mut CompositeCone<T>,
        μ: T,
        scaling_strategy: ScalingStrategy,
    ) -> bool {
        cones.update_scaling(&self.s, &self.z, μ, scaling_strategy)
    }

    pub(crate) fn barrier(&self, step: &Self, α: T, cones: &mut CompositeCone<T>) -> T {
        let central_coef: T = (cones.degree() + 1).as_T();

        let cur_τ = self.τ + α * step.τ;
        let cur_κ = self.κ + α * step.κ;

        let sz = <[T] as VectorMath>::dot_shifted(&self.z, &self.s, &step.z, &step.s, α);
        let μ = (sz + cur_τ * cur_κ) / central_coef;

        let mut barrier = central_coef * μ.logsafe() - cur_τ.logsafe() - cur_κ.logsafe();

        barrier += cones.compute_barrier(&self.z, &self.s, &step.z, &step.s, α);

        barrier
    }

    /// Undo the homogenization and the equilibration.  Certificates
    /// are normalized by κ instead of τ.
    pub(crate) fn unscale(&mut self, data: &ConicProblemData<T>, is_infeasible: bool) {
        let scaleinv = if is_infeasible {
            T::recip(self.κ)
        } else {
            T::recip(self.τ)
        };

        let d = &data.equilibration.d;
        let (e, einv) = (&data.equilibration.e, &data.equilibration.einv);
        let cinv = T::recip(data.equilibration.c);

        self.x.hadamard(d).scale(scaleinv);
        self.z.hadamard(e).scale(scaleinv * cinv);
        self.s.hadamard(einv).scale(scaleinv);

        self.τ *= scaleinv;
        self.κ *= scaleinv;
    }
}

fn _shift_to_cone_interior<T>(z: &mut [T], cones: &mut CompositeCone<T>, pd: PrimalOrDualCone)
where
    T: FloatT,
{
    let (min_margin, pos_margin) = cones.margins(z, pd);
    let target = T::max(
        T::one(),
        (pos_margin * (0.1).as_T()) / cones.degree().max(1).as_T(),
    );

    if min_margin <= T::zero() {
        // two stages, otherwise (1-α) = -α for large α
        // and z can become exactly zero
        cones.scaled_unit_shift(z, -min_margin, pd);
        cones.scaled_unit_shift(z, target, pd);
    } else if min_margin < target {
        cones.scaled_unit_shift(z, target - min_margin, pd);
    } else {
        // a zero shift still forces zero cone entries to zero
        cones.scaled_unit_shift(z, T::zero(), pd);
    }
}
