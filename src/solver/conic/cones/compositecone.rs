use super::*;
use std::collections::HashMap;
use std::ops::Range;

/// Cartesian product of the cones of a conic problem.  Every operation
/// is split over the index ranges of the member cones.
pub struct CompositeCone<T: FloatT = f64> {
    cones: Vec<SupportedCone<T>>,
    // number of cones with each tag
    pub(crate) type_counts: HashMap<&'static str, usize>,
    pub(crate) numel: usize,
    pub(crate) degree: usize,
    // rows of each cone within s and z
    pub(crate) rng_cones: Vec<Range<usize>>,
    // entries of each cone within the packed Hs data
    pub(crate) rng_blocks: Vec<Range<usize>>,
    symmetric: bool,
}

// consecutive ranges with the given lengths
fn consecutive(lengths: impl Iterator<Item = usize>) -> Vec<Range<usize>> {
    lengths
        .scan(0, |start, len| {
            let rng = *start..*start + len;
            *start += len;
            Some(rng)
        })
        .collect()
}

impl<T> CompositeCone<T>
where
    T: FloatT,
{
    pub fn new(types: &[SupportedConeT<T>]) -> Self {
        let cones: Vec<SupportedCone<T>> = types.iter().map(make_cone).collect();

        let mut type_counts = HashMap::new();
        for t in types {
            *type_counts.entry(t.as_tag()).or_insert(0) += 1;
        }

        let rng_cones = consecutive(cones.iter().map(|c| c.numel()));
        let rng_blocks = consecutive(cones.iter().map(|c| match c.Hs_is_diagonal() {
            true => c.numel(),
            false => triangular_number(c.numel()),
        }));

        Self {
            numel: cones.iter().map(|c| c.numel()).sum(),
            degree: cones.iter().map(|c| c.degree()).sum(),
            symmetric: cones.iter().all(|c| c.is_symmetric()),
            cones,
            type_counts,
            rng_cones,
            rng_blocks,
        }
    }

    pub fn len(&self) -> usize {
        self.cones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cones.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SupportedCone<T>> {
        self.cones.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, SupportedCone<T>> {
        self.cones.iter_mut()
    }

    pub(crate) fn get_type_count(&self, tag: &str) -> usize {
        self.type_counts.get(tag).copied().unwrap_or(0)
    }

    fn parts(&self) -> impl Iterator<Item = (&SupportedCone<T>, Range<usize>)> {
        self.cones.iter().zip(self.rng_cones.iter().cloned())
    }

    fn parts_mut(&mut self) -> impl Iterator<Item = (&mut SupportedCone<T>, Range<usize>)> {
        self.cones.iter_mut().zip(self.rng_cones.iter().cloned())
    }
}

impl<T> Cone<T> for CompositeCone<T>
where
    T: FloatT,
{
    fn degree(&self) -> usize {
        self.degree
    }

    fn numel(&self) -> usize {
        self.numel
    }

    fn is_symmetric(&self) -> bool {
        self.symmetric
    }

    fn allows_primal_dual_scaling(&self) -> bool {
        self.cones.iter().all(|c| c.allows_primal_dual_scaling())
    }

    fn rectify_equilibration(&self, δ: &mut [T], e: &[T]) -> bool {
        δ.set(T::one());
        self.parts().fold(false, |changed, (cone, r)| {
            cone.rectify_equilibration(&mut δ[r.clone()], &e[r]) || changed
        })
    }

    fn margins(&mut self, z: &mut [T], pd: PrimalOrDualCone) -> (T, T) {
        self.parts_mut()
            .fold((T::max_value(), T::zero()), |(α, β), (cone, r)| {
                let (αi, βi) = cone.margins(&mut z[r], pd);
                (T::min(α, αi), β + βi)
            })
    }

    fn scaled_unit_shift(&self, z: &mut [T], α: T, pd: PrimalOrDualCone) {
        for (cone, r) in self.parts() {
            cone.scaled_unit_shift(&mut z[r], α, pd);
        }
    }

    fn unit_initialization(&self, z: &mut [T], s: &mut [T]) {
        for (cone, r) in self.parts() {
            cone.unit_initialization(&mut z[r.clone()], &mut s[r]);
        }
    }

    fn set_identity_scaling(&mut self) {
        self.cones.iter_mut().for_each(|c| c.set_identity_scaling());
    }

    // stops at the first cone whose scaling cannot be formed
    fn update_scaling(&mut self, s: &[T], z: &[T], μ: T, strategy: ScalingStrategy) -> bool {
        self.parts_mut()
            .all(|(cone, r)| cone.update_scaling(&s[r.clone()], &z[r], μ, strategy))
    }

    fn Hs_is_diagonal(&self) -> bool {
        self.cones.iter().all(|c| c.Hs_is_diagonal())
    }

    fn get_Hs(&self, Hsblock: &mut [T]) {
        for (cone, r) in self.cones.iter().zip(&self.rng_blocks) {
            cone.get_Hs(&mut Hsblock[r.clone()]);
        }
    }

    fn mul_Hs(&mut self, y: &mut [T], x: &[T], work: &mut [T]) {
        for (cone, r) in self.parts_mut() {
            cone.mul_Hs(&mut y[r.clone()], &x[r.clone()], &mut work[r]);
        }
    }

    fn affine_ds(&self, ds: &mut [T], s: &[T]) {
        for (cone, r) in self.parts() {
            cone.affine_ds(&mut ds[r.clone()], &s[r]);
        }
    }

    fn combined_ds_shift(&mut self, shift: &mut [T], step_z: &mut [T], step_s: &mut [T], σμ: T) {
        for (cone, r) in self.parts_mut() {
            let (dz, ds) = (&mut step_z[r.clone()], &mut step_s[r.clone()]);
            cone.combined_ds_shift(&mut shift[r], dz, ds, σμ);
        }
    }

    fn Δs_from_Δz_offset(&mut self, out: &mut [T], ds: &[T], work: &mut [T], z: &[T]) {
        for (cone, r) in self.parts_mut() {
            let (outi, worki) = (&mut out[r.clone()], &mut work[r.clone()]);
            cone.Δs_from_Δz_offset(outi, &ds[r.clone()], worki, &z[r]);
        }
    }

    // Symmetric cones are bounded first.  Nonsymmetric barriers are
    // evaluated along the step, so those cones only see steps already
    // admissible for the rest and never a full step to the boundary.
    fn step_length(
        &mut self,
        dz: &[T],
        ds: &[T],
        z: &[T],
        s: &[T],
        settings: &ConicSettings<T>,
        αmax: T,
    ) -> (T, T) {
        let symmetric = self.symmetric;
        let mut α = αmax;
        for pass_symmetric in [true, false] {
            if !pass_symmetric && !symmetric {
                α = T::min(α, settings.max_step_fraction);
            }
            for (cone, r) in self.parts_mut() {
                if cone.is_symmetric() != pass_symmetric {
                    continue;
                }
                let (αz, αs) = cone.step_length(
                    &dz[r.clone()],
                    &ds[r.clone()],
                    &z[r.clone()],
                    &s[r],
                    settings,
                    α,
                );
                α = T::min(α, T::min(αz, αs));
            }
        }
        (α, α)
    }

    fn compute_barrier(&mut self, z: &[T], s: &[T], dz: &[T], ds: &[T], α: T) -> T {
        self.parts_mut().fold(T::zero(), |acc, (cone, r)| {
            acc + cone.compute_barrier(&z[r.clone()], &s[r.clone()], &dz[r.clone()], &ds[r], α)
        })
    }
}
