use super::*;

fn settings() -> ConicSettings<f64> {
    ConicSettings::default()
}

#[test]
fn test_nonnegative_step_length() {
    let mut K = NonnegativeCone::<f64>::new(2);
    let z = [1., 2.];
    let s = [1., 1.];
    let dz = [-2., 1.];
    let ds = [1., -4.];
    let (αz, αs) = K.step_length(&dz, &ds, &z, &s, &settings(), 1.);
    assert!((αz - 0.5).abs() < 1e-14);
    assert!((αs - 0.25).abs() < 1e-14);

    // no blocking direction
    let (αz, _) = K.step_length(&[1., 1.], &ds, &z, &s, &settings(), 0.9);
    assert_eq!(αz, 0.9);
}

#[test]
fn test_soc_step_length_and_margins() {
    let mut K = SecondOrderCone::<f64>::new(3);
    let z = [1., 0., 0.];
    let dz = [-2., 0., 0.];
    let (αz, αs) = K.step_length(&dz, &[0.; 3], &z, &z, &settings(), 1.);
    assert!((αz - 0.5).abs() < 1e-8);
    assert_eq!(αs, 1.);

    let mut v = [2., 1., 0.];
    let (α, β) = K.margins(&mut v, PrimalOrDualCone::PrimalCone);
    assert!((α - 1.).abs() < 1e-14);
    assert!((β - 1.).abs() < 1e-14);
}

#[test]
fn test_soc_Hs_matches_mul_Hs() {
    let mut K = SecondOrderCone::<f64>::new(3);
    let s = [3., 1., -0.5];
    let z = [2., -0.3, 0.8];
    assert!(K.update_scaling(&s, &z, 1., ScalingStrategy::PrimalDual));

    let mut packed = vec![0.; triangular_number(3)];
    K.get_Hs(&mut packed);

    // unpack the triu columns
    let mut H = [[0.; 3]; 3];
    let mut k = 0;
    for col in 0..3 {
        for row in 0..=col {
            H[row][col] = packed[k];
            H[col][row] = packed[k];
            k += 1;
        }
    }

    let x = [0.4, -1.2, 2.0];
    let mut y = [0.; 3];
    let mut work = [0.; 3];
    K.mul_Hs(&mut y, &x, &mut work);

    for i in 0..3 {
        let Hx: f64 = (0..3).map(|j| H[i][j] * x[j]).sum();
        assert!((Hx - y[i]).abs() < 1e-10);
    }
}

// symmetric cone identity: λ \ (λ∘λ) = λ = Wz
#[test]
fn test_soc_jordan_inverse() {
    let mut K = SecondOrderCone::<f64>::new(3);
    let s = [3., 1., -0.5];
    let z = [2., -0.3, 0.8];
    assert!(K.update_scaling(&s, &z, 1., ScalingStrategy::PrimalDual));

    let mut λλ = [0.; 3];
    K.affine_ds(&mut λλ, &s);
    let mut λ = [0.; 3];
    K.λ_inv_circ_op(&mut λ, &λλ);

    let mut Wz = [0.; 3];
    K.mul_W(MatrixShape::N, &mut Wz, &z, 1., 0.);
    assert!(λ.norm_inf_diff(&Wz) < 1e-12);

    // W⁻¹W = I
    let mut back = [0.; 3];
    K.mul_Winv(MatrixShape::N, &mut back, &Wz, 1., 0.);
    assert!(back.norm_inf_diff(&z) < 1e-12);
}

#[test]
fn test_psd_Hs_matches_mul_Hs() {
    let r2 = f64::sqrt(2.);
    let mut K = PSDTriangleCone::<f64>::new(2);
    let s = [2., 0.5 * r2, 1.];
    let z = [1., -0.2 * r2, 3.];
    assert!(K.update_scaling(&s, &z, 1., ScalingStrategy::PrimalDual));

    let mut packed = vec![0.; triangular_number(3)];
    K.get_Hs(&mut packed);
    let mut H = [[0.; 3]; 3];
    let mut k = 0;
    for col in 0..3 {
        for row in 0..=col {
            H[row][col] = packed[k];
            H[col][row] = packed[k];
            k += 1;
        }
    }

    let x = [0.7, -0.4, 1.1];
    let mut y = [0.; 3];
    let mut work = [0.; 3];
    K.mul_Hs(&mut y, &x, &mut work);
    for i in 0..3 {
        let Hx: f64 = (0..3).map(|j| H[i][j] * x[j]).sum();
        assert!((Hx - y[i]).abs() < 1e-10);
    }

    // the scaling maps z to λ and s to λ as well
    let mut Wz = [0.; 3];
    K.mul_W(MatrixShape::N, &mut Wz, &z, 1., 0.);
    let mut Winv_s = [0.; 3];
    K.mul_Winv(MatrixShape::T, &mut Winv_s, &s, 1., 0.);
    assert!(Wz.norm_inf_diff(&Winv_s) < 1e-10);
}

#[test]
fn test_exp_unit_initialization_is_interior() {
    let mut K = ExponentialCone::<f64>::new();
    let mut z = [0.; 3];
    let mut s = [0.; 3];
    K.unit_initialization(&mut z, &mut s);

    // y exp(x/y) < z with y > 0
    assert!(s[1] > 0.);
    assert!(s[1] * (s[0] / s[1]).exp() < s[2]);

    let barrier = K.compute_barrier(&z, &s, &[0.; 3], &[0.; 3], 0.);
    assert!(barrier.is_finite());
}

#[test]
fn test_pow_unit_initialization_is_interior() {
    let α = 0.3;
    let mut K = PowerCone::<f64>::new(α);
    let mut z = [0.; 3];
    let mut s = [0.; 3];
    K.unit_initialization(&mut z, &mut s);

    assert!(s[0] > 0. && s[1] > 0.);
    assert!(s[0].powf(α) * s[1].powf(1. - α) > s[2].abs());
    assert!(K
        .compute_barrier(&z, &s, &[0.; 3], &[0.; 3], 0.)
        .is_finite());
}

#[test]
fn test_psd_margins() {
    let mut K = PSDTriangleCone::<f64>::new(2);
    assert_eq!(K.numel(), 3);

    // identity
    let mut z = [1., 0., 1.];
    let (α, β) = K.margins(&mut z, PrimalOrDualCone::PrimalCone);
    assert!((α - 1.).abs() < 1e-12);
    assert!((β - 2.).abs() < 1e-12);

    // eigenvalues 3 and -1 (off diagonal scaled by √2)
    let mut z = [1., 2. * f64::sqrt(2.), 1.];
    let (α, β) = K.margins(&mut z, PrimalOrDualCone::PrimalCone);
    assert!((α + 1.).abs() < 1e-10);
    assert!((β - 3.).abs() < 1e-10);
}

#[test]
fn test_composite_ranges() {
    let types = vec![
        SupportedConeT::ZeroConeT(2),
        SupportedConeT::SecondOrderConeT(3),
        SupportedConeT::NonnegativeConeT(1),
        SupportedConeT::ExponentialConeT(),
    ];
    let K = CompositeCone::<f64>::new(&types);

    assert_eq!(K.len(), 4);
    assert_eq!(K.numel(), 9);
    assert!(!K.is_symmetric());
    assert_eq!(K.rng_cones, vec![0..2, 2..5, 5..6, 6..9]);
    // SOC and exp blocks are packed triangles
    assert_eq!(K.rng_blocks, vec![0..2, 2..8, 8..9, 9..15]);
    assert_eq!(K.get_type_count("SecondOrderCone"), 1);
    assert_eq!(K.get_type_count("PowerCone"), 0);
}
