use super::*;

impl<'env> Task<'env> {
    /// Write a report of the problem and every defined solution to the
    /// print target
    pub fn solution_summary(&mut self) -> Result<(), OptimizeError> {
        let mut text = String::new();
        self.write_summary(&mut text)?;
        self.print_target().write_all(text.as_bytes())?;
        Ok(())
    }

    fn write_summary(&self, out: &mut String) -> Result<(), OptimizeError> {
        use std::fmt::Write as _;

        let name = &self.params.task_name;
        let _ = writeln!(out, "Problem{}", if name.is_empty() { String::new() } else { format!(" {}", name) });
        let _ = writeln!(
            out,
            "  variables: {}  constraints: {}  cones: {}  sense: {:?}",
            self.get_num_var(),
            self.get_num_con(),
            self.get_num_cone(),
            self.data.sense
        );
        if let Some(code) = self.termination {
            let _ = writeln!(out, "  termination: {}", code);
        }
        for w in &self.warnings {
            let _ = writeln!(out, "  warning: {}", w);
        }

        for (label, whichsol) in [
            ("Basic", SolutionType::Basic),
            ("Interior", SolutionType::Interior),
            ("Integer", SolutionType::Integer),
        ] {
            let Ok(sol) = self.get_solution(whichsol) else {
                continue;
            };
            let _ = writeln!(out, "{} solution", label);
            let _ = writeln!(out, "  problem status  : {:?}", sol.prosta);
            let _ = writeln!(out, "  solution status : {:?}", sol.solsta);
            let info = self.get_solution_info(whichsol)?;
            let _ = writeln!(
                out,
                "  primal  obj: {:<+22.14e} bound viol: {:.2e}  con viol: {:.2e}  cone viol: {:.2e}  int viol: {:.2e}",
                info.primal_obj, info.max_pbound_viol, info.max_pcon_viol, info.max_pcone_viol, info.max_pint_viol
            );
            if whichsol != SolutionType::Integer {
                let _ = writeln!(
                    out,
                    "  dual    obj: {:<+22.14e} viol: {:.2e}",
                    info.dual_obj, info.max_dual_viol
                );
            }
        }
        Ok(())
    }
}

#[test]
fn test_summary_lists_solutions() {
    use crate::env::Env;
    use crate::io::ConfigurablePrintTarget;

    let env = Env::new();
    let mut task = Task::new(&env);
    task.input_data_dense(
        &[1.0],
        0.0,
        &[vec![1.0]],
        &[BoundKey::Lower],
        &[2.0],
        &[f64::INFINITY],
        &[BoundKey::Free],
        &[0.0],
        &[0.0],
    )
    .unwrap();
    task.put_param("log_level", "0").unwrap();
    task.print_to_buffer();
    task.optimize().unwrap();
    task.solution_summary().unwrap();

    let text = task.get_print_buffer().unwrap();
    assert!(text.contains("Basic solution"));
    assert!(text.contains("Optimal"));
    assert!(!text.contains("Integer solution"));
}
