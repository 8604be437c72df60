use super::*;
use crate::algebra::*;
use crate::solver::conic::cones::{CompositeCone, Cone};
use std::io::Write;
use std::time::Duration;

macro_rules! expformat {
    ($fmt:expr,$val:expr) => {
        if $val.is_finite() {
            _exp_str_reformat(format!($fmt, $val))
        } else {
            format!($fmt, $val)
        }
    };
}
pub(crate) use expformat;

const CONE_TAGS: [&str; 6] = [
    "ZeroCone",
    "NonnegativeCone",
    "SecondOrderCone",
    "ExponentialCone",
    "PowerCone",
    "PSDTriangleCone",
];

impl<T> ConicInfo<T>
where
    T: FloatT,
{
    pub(crate) fn print_configuration(
        &self,
        out: &mut dyn Write,
        settings: &ConicSettings<T>,
        data: &ConicProblemData<T>,
        cones: &CompositeCone<T>,
    ) -> std::io::Result<()> {
        if !settings.verbose {
            return Ok(());
        }

        writeln!(out, "\ninterior point problem:")?;
        writeln!(out, "  variables     = {}", data.n)?;
        writeln!(out, "  constraints   = {}", data.m)?;
        writeln!(out, "  nnz(P)        = {}", data.P.nnz())?;
        writeln!(out, "  nnz(A)        = {}", data.A.nnz())?;
        writeln!(out, "  cones (total) = {}", cones.len())?;

        for tag in CONE_TAGS {
            _print_conedims_by_type(out, cones, tag)?;
        }
        writeln!(out)?;

        _print_settings(out, settings)?;
        Ok(())
    }

    pub(crate) fn print_status_header(
        &self,
        out: &mut dyn Write,
        settings: &ConicSettings<T>,
    ) -> std::io::Result<()> {
        if !settings.verbose {
            return Ok(());
        }

        write!(out, "iter    ")?;
        write!(out, "pcost        ")?;
        write!(out, "dcost       ")?;
        write!(out, "gap       ")?;
        write!(out, "pres      ")?;
        write!(out, "dres      ")?;
        write!(out, "k/t       ")?;
        write!(out, " μ       ")?;
        write!(out, "step      ")?;
        writeln!(out)?;
        writeln!(
            out,
            "---------------------------------------------------------------------------------------------"
        )?;
        out.flush()
    }

    pub(crate) fn print_status(
        &self,
        out: &mut dyn Write,
        settings: &ConicSettings<T>,
    ) -> std::io::Result<()> {
        if !settings.verbose {
            return Ok(());
        }

        write!(out, "{:>3}  ", self.iterations)?;
        write!(out, "{}  ", expformat!("{:+8.4e}", self.cost_primal))?;
        write!(out, "{}  ", expformat!("{:+8.4e}", self.cost_dual))?;
        let gapprint = T::min(self.gap_abs, self.gap_rel);
        write!(out, "{}  ", expformat!("{:6.2e}", gapprint))?;
        write!(out, "{}  ", expformat!("{:6.2e}", self.res_primal))?;
        write!(out, "{}  ", expformat!("{:6.2e}", self.res_dual))?;
        write!(out, "{}  ", expformat!("{:6.2e}", self.ktratio))?;
        write!(out, "{}  ", expformat!("{:6.2e}", self.μ))?;

        if self.iterations > 0 {
            write!(out, "{}  ", expformat!("{:>.2e}", self.step_length))?;
        } else {
            write!(out, " ------   ")?;
        }

        writeln!(out)
    }

    pub(crate) fn print_footer(
        &self,
        out: &mut dyn Write,
        settings: &ConicSettings<T>,
    ) -> std::io::Result<()> {
        if !settings.verbose {
            return Ok(());
        }

        writeln!(
            out,
            "---------------------------------------------------------------------------------------------"
        )?;
        writeln!(out, "Terminated with status = {}", self.status)?;
        writeln!(
            out,
            "solve time = {:?}",
            Duration::from_secs_f64(self.solve_time)
        )
    }
}

fn _print_settings<T: FloatT>(
    out: &mut dyn Write,
    set: &ConicSettings<T>,
) -> std::io::Result<()> {
    writeln!(out, "settings:")?;
    writeln!(
        out,
        "  linear algebra: direct / qdldl, precision: {} bit",
        _get_precision_string::<T>()
    )?;

    let time_lim_str = if set.time_limit.is_infinite() {
        "Inf".to_string()
    } else {
        format!("{:?}", set.time_limit)
    };
    writeln!(
        out,
        "  max iter = {}, time limit = {},  max step = {:.3}",
        set.max_iter, time_lim_str, set.max_step_fraction
    )?;
    writeln!(
        out,
        "  tol_feas = {:.1e}, tol_gap_abs = {:.1e}, tol_gap_rel = {:.1e},",
        set.tol_feas, set.tol_gap_abs, set.tol_gap_rel
    )?;
    writeln!(
        out,
        "  static reg : {}, ϵ1 = {:.1e}, ϵ2 = {:.1e}",
        _bool_on_off(set.static_regularization_enable),
        set.static_regularization_constant,
        set.static_regularization_proportional,
    )?;
    writeln!(
        out,
        "  dynamic reg: {}, ϵ = {:.1e}, δ = {:.1e}",
        _bool_on_off(set.dynamic_regularization_enable),
        set.dynamic_regularization_eps,
        set.dynamic_regularization_delta
    )?;
    writeln!(
        out,
        "  iter refine: {}, reltol = {:.1e}, abstol = {:.1e},",
        _bool_on_off(set.iterative_refinement_enable),
        set.iterative_refinement_reltol,
        set.iterative_refinement_abstol
    )?;
    writeln!(
        out,
        "               max iter = {}, stop ratio = {:.1}",
        set.iterative_refinement_max_iter, set.iterative_refinement_stop_ratio
    )?;
    writeln!(
        out,
        "  equilibrate: {}, min_scale = {:.1e}, max_scale = {:.1e}",
        _bool_on_off(set.equilibrate_enable),
        set.equilibrate_min_scaling,
        set.equilibrate_max_scaling
    )?;
    writeln!(out, "               max iter = {}", set.equilibrate_max_iter)?;
    writeln!(out)
}

fn _bool_on_off(v: bool) -> &'static str {
    match v {
        true => "on",
        false => "off",
    }
}

fn _get_precision_string<T: FloatT>() -> String {
    (::std::mem::size_of::<T>() * 8).to_string()
}

fn _print_conedims_by_type<T: FloatT>(
    out: &mut dyn Write,
    cones: &CompositeCone<T>,
    tag: &'static str,
) -> std::io::Result<()> {
    let maxlistlen = 5;

    let count = cones.get_type_count(tag);
    if count == 0 {
        return Ok(());
    }

    // drop the trailing "Cone"
    let name = &tag[0..tag.len() - 4];
    let name = format!("{name:>11}");

    let nvars: Vec<usize> = cones
        .iter()
        .filter(|c| c.as_tag() == tag)
        .map(|c| c.numel())
        .collect();

    write!(out, "    : {name} = {count}, ")?;

    if count == 1 {
        write!(out, " numel = {}", nvars[0])?;
    } else if count <= maxlistlen {
        write!(out, " numel = (")?;
        for nvar in nvars.iter().take(nvars.len() - 1) {
            write!(out, "{nvar},")?;
        }
        write!(out, "{})", nvars[nvars.len() - 1])?;
    } else {
        write!(out, " numel = (")?;
        for nvar in nvars.iter().take(maxlistlen - 1) {
            write!(out, "{nvar},")?;
        }
        write!(out, "...,{})", nvars[nvars.len() - 1])?;
    }

    writeln!(out)
}

// LowerExp output with a signed exponent of at least two digits
pub(crate) fn _exp_str_reformat(mut thestr: String) -> String {
    let Some(eidx) = thestr.find('e') else {
        return thestr;
    };
    let has_sign = thestr[eidx + 1..].starts_with('-');

    let has_short_exp = if !has_sign {
        thestr.len() == eidx + 2
    } else {
        thestr.len() == eidx + 3
    };

    let chars = match (has_sign, has_short_exp) {
        (false, true) => "+0",
        (false, false) => "+",
        (true, true) => "0",
        (true, false) => "",
    };

    let shift = if has_sign { 2 } else { 1 };
    thestr.insert_str(eidx + shift, chars);
    thestr
}

#[test]
fn test_exp_str_reformat() {
    assert_eq!(_exp_str_reformat(format!("{:.2e}", 1.5)), "1.50e+00");
    assert_eq!(_exp_str_reformat(format!("{:.2e}", 1.5e-7)), "1.50e-07");
    assert_eq!(_exp_str_reformat(format!("{:.2e}", 1.5e100)), "1.50e+100");
}
