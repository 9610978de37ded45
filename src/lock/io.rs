//! File I/O for lock instances and solutions

use super::{LockInstance, LockSolution};
use crate::error::{LockError, LockResult};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Load and validate a lock instance from a JSON file
pub fn load_instance_from_file<P: AsRef<Path>>(path: P) -> LockResult<LockInstance> {
    let content = read_file(path.as_ref())?;
    LockInstance::from_json(&content)
}

/// Save a lock instance as JSON, creating parent directories as needed
pub fn save_instance_to_file<P: AsRef<Path>>(instance: &LockInstance, path: P) -> LockResult<()> {
    write_file(path.as_ref(), &instance.to_json()?)
}

/// Load a lock solution from a JSON file
pub fn load_solution_from_file<P: AsRef<Path>>(path: P) -> LockResult<LockSolution> {
    let content = read_file(path.as_ref())?;
    LockSolution::from_json(&content)
}

/// Save a lock solution as JSON, creating parent directories as needed
pub fn save_solution_to_file<P: AsRef<Path>>(solution: &LockSolution, path: P) -> LockResult<()> {
    write_file(path.as_ref(), &solution.to_json()?)
}

/// Path like `<dir>/<prefix>_<unix seconds>.json` for a freshly produced file
pub fn timestamped_path<P: AsRef<Path>>(dir: P, prefix: &str) -> PathBuf {
    let seconds = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    dir.as_ref().join(format!("{}_{}.json", prefix, seconds))
}

fn read_file(path: &Path) -> LockResult<String> {
    std::fs::read_to_string(path).map_err(|e| LockError::file(path, e))
}

fn write_file(path: &Path, content: &str) -> LockResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| LockError::file(parent, e))?;
        }
    }
    std::fs::write(path, content).map_err(|e| LockError::file(path, e))
}

/// Write a handful of sample instances (and known solutions) for experimenting
pub fn create_example_files<P: AsRef<Path>>(output_dir: P) -> LockResult<()> {
    let instances_dir = output_dir.as_ref().join("instances");
    let solutions_dir = output_dir.as_ref().join("solutions");

    // One OR clause over three dials
    let small = LockInstance {
        num_dials: 3,
        binary_pins: vec![1, 2, 3],
        negations: vec![],
        clauses: vec![[1, 2, 3]],
    };
    save_instance_to_file(&small, instances_dir.join("small.json"))?;
    save_solution_to_file(
        &LockSolution::from_truth_values(&[true, false, false]),
        solutions_dir.join("small.json"),
    )?;

    // Negation link plus a clause that depends on it
    let linked = LockInstance {
        num_dials: 4,
        binary_pins: vec![1, 2, 3, 4],
        negations: vec![[1, 2]],
        clauses: vec![[2, 3, 4]],
    };
    save_instance_to_file(&linked, instances_dir.join("linked.json"))?;
    save_solution_to_file(
        &LockSolution::from_truth_values(&[true, false, true, false]),
        solutions_dir.join("linked.json"),
    )?;

    // Odd cycle of negations: no assignment exists
    let triangle = LockInstance {
        num_dials: 3,
        binary_pins: vec![1, 2, 3],
        negations: vec![[1, 2], [2, 3], [1, 3]],
        clauses: vec![],
    };
    save_instance_to_file(&triangle, instances_dir.join("unsat_triangle.json"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_instance_file_round_trip() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nested/instance.json");

        let instance = LockInstance {
            num_dials: 5,
            binary_pins: vec![1, 2, 3, 4, 5],
            negations: vec![[1, 5]],
            clauses: vec![[1, 2, 3], [2, 3, 4]],
        };
        save_instance_to_file(&instance, &path).unwrap();

        let loaded = load_instance_from_file(&path).unwrap();
        assert_eq!(instance, loaded);
    }

    #[test]
    fn test_solution_file_round_trip() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("solution.json");

        let solution = LockSolution::from_truth_values(&[false, true, true]);
        save_solution_to_file(&solution, &path).unwrap();

        let loaded = load_solution_from_file(&path).unwrap();
        assert_eq!(solution, loaded);
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = tempdir().unwrap();
        let result = load_instance_from_file(temp_dir.path().join("absent.json"));
        assert!(matches!(result, Err(LockError::File { .. })));
    }

    #[test]
    fn test_malformed_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = load_instance_from_file(&path);
        assert!(matches!(result, Err(LockError::MalformedPersistedData(_))));
    }

    #[test]
    fn test_timestamped_path() {
        let path = timestamped_path("output/instances", "lock_instance");
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("lock_instance_"));
        assert!(name.ends_with(".json"));
        assert!(path.starts_with("output/instances"));
    }

    #[test]
    fn test_create_example_files() {
        let temp_dir = tempdir().unwrap();
        create_example_files(temp_dir.path()).unwrap();

        for name in ["small.json", "linked.json"] {
            let instance = load_instance_from_file(temp_dir.path().join("instances").join(name)).unwrap();
            let solution = load_solution_from_file(temp_dir.path().join("solutions").join(name)).unwrap();
            assert!(solution.validate(&instance).is_ok(), "{} sample should be valid", name);
        }

        let triangle = load_instance_from_file(temp_dir.path().join("instances/unsat_triangle.json")).unwrap();
        assert_eq!(triangle.negations.len(), 3);
    }
}
