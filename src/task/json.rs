//! JSON task files.
//!
//! A task file holds the problem as entered and the parameters.  Results
//! are not stored; a task read back is solved again from scratch.

use super::*;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

// the problem as entered plus its parameters
#[derive(Serialize, Deserialize)]
struct JsonTask {
    version: String,
    data: TaskData,
    params: Parameters,
}

// serde_json writes non-finite values as null
fn sanitize_params(params: &mut Parameters) {
    for t in [&mut params.optimizer_max_time, &mut params.mio_max_time] {
        if *t == f64::INFINITY {
            *t = f64::MAX;
        }
    }
}

fn desanitize_params(params: &mut Parameters) {
    for t in [&mut params.optimizer_max_time, &mut params.mio_max_time] {
        if *t == f64::MAX {
            *t = f64::INFINITY;
        }
    }
}

fn malformed(what: impl Into<String>) -> OptimizeError {
    DataError::File(what.into()).into()
}

// lengths and indices that the builder methods guarantee
fn check_consistent(data: &TaskData) -> Result<(), OptimizeError> {
    let n = data.c.len();
    let m = data.conbk.len();
    for (name, len) in [
        ("acols", data.acols.len()),
        ("varbk", data.varbk.len()),
        ("blx", data.blx.len()),
        ("bux", data.bux.len()),
        ("vartype", data.vartype.len()),
        ("xx_init", data.xx_init.len()),
    ] {
        if len != n {
            return Err(malformed(format!("{} has {} entries, expected {}", name, len, n)));
        }
    }
    for (name, len) in [("blc", data.blc.len()), ("buc", data.buc.len())] {
        if len != m {
            return Err(malformed(format!("{} has {} entries, expected {}", name, len, m)));
        }
    }
    for (j, col) in data.acols.iter().enumerate() {
        if col.windows(2).any(|w| w[0].0 >= w[1].0) || col.iter().any(|&(i, _)| i >= m) {
            return Err(malformed(format!("column {} of A is malformed", j)));
        }
    }
    if data.qlow.iter().any(|&(i, j, _)| i >= n || j > i) {
        return Err(malformed("Q has an entry outside the lower triangle"));
    }
    for cone in &data.cones {
        if cone.members.iter().any(|&j| j >= n) {
            return Err(malformed("a cone refers to an unknown variable"));
        }
    }
    Ok(())
}

impl<'env> Task<'env> {
    /// Write the problem and parameters as JSON
    pub fn write_json(&self, writer: &mut impl Write) -> Result<(), OptimizeError> {
        let mut params = self.params.clone();
        sanitize_params(&mut params);
        let json = JsonTask {
            version: crate::VERSION.to_string(),
            data: self.data.clone(),
            params,
        };
        serde_json::to_writer(&mut *writer, &json)?;
        writer.flush()?;
        Ok(())
    }

    /// Read a task written by [`write_json`](Self::write_json)
    pub fn read_json(env: &'env Env, reader: &mut impl Read) -> Result<Self, OptimizeError> {
        let mut buffer = String::new();
        reader.read_to_string(&mut buffer)?;
        let mut json: JsonTask = serde_json::from_str(&buffer)?;

        if json.version != crate::VERSION {
            log::info!("reading a task file of version {}", json.version);
        }
        check_consistent(&json.data)?;
        // bounds and cones are checked as for a solve
        json.data.to_problem(env)?;
        desanitize_params(&mut json.params);
        json.params
            .validate()
            .map_err(|e| malformed(format!("parameters: {}", e)))?;

        Ok(Task::from_parts(env, json.data, json.params))
    }

    pub fn write_json_file(&self, path: impl AsRef<Path>) -> Result<(), OptimizeError> {
        let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
        self.write_json(&mut file)
    }

    pub fn read_json_file(env: &'env Env, path: impl AsRef<Path>) -> Result<Self, OptimizeError> {
        let mut file = std::fs::File::open(path)?;
        Self::read_json(env, &mut file)
    }
}

#[test]
fn test_json_io() {
    use std::io::{Seek, SeekFrom};

    let env = Env::new();
    let mut task = Task::new(&env);
    task.input_data_dense(
        &[1.0, 2.0],
        0.5,
        &[vec![1.0, 1.0]],
        &[BoundKey::Lower],
        &[1.0],
        &[f64::INFINITY],
        &[BoundKey::Lower, BoundKey::Range],
        &[0.0, 0.0],
        &[f64::INFINITY, 3.0],
    )
    .unwrap();
    task.put_param("simplex_max_iterations", "77").unwrap();
    task.put_param("log_level", "0").unwrap();

    let mut file = tempfile::tempfile().unwrap();
    task.write_json(&mut file).unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();
    let mut task2 = Task::read_json(&env, &mut file).unwrap();

    assert_eq!(task.data, task2.data);
    assert_eq!(task2.get_int_param("simplex_max_iterations").unwrap(), 77);

    task.optimize().unwrap();
    task2.optimize().unwrap();
    assert_eq!(
        task.get_primal_obj(SolutionType::Basic).unwrap(),
        task2.get_primal_obj(SolutionType::Basic).unwrap()
    );
}

#[test]
fn test_json_rejects_malformed() {
    let env = Env::new();
    let text = r#"{"version":"0","data":{"sense":"Minimize","c":[1.0],"cfix":0.0,"qlow":[],
        "acols":[],"varbk":[],"blx":[],"bux":[],"vartype":[],"conbk":[],"blc":[],"buc":[],
        "cones":[],"xx_init":[]},"params":{}}"#;
    let result = Task::read_json(&env, &mut text.as_bytes());
    assert!(matches!(result, Err(OptimizeError::Data(DataError::File(_)))));
    assert!(Task::read_json(&env, &mut "not json".as_bytes()).is_err());
}
