//! Lock puzzle data model

pub mod builder;
pub mod instance;
pub mod io;
pub mod solution;

pub use builder::InstanceBuilder;
pub use instance::{
    LockInstance, CLAUSE_MIN_SUM, DIAL_FALSE, DIAL_TRUE, MAX_DIALS, NEGATION_SUM,
};
pub use io::{
    create_example_files, load_instance_from_file, load_solution_from_file,
    save_instance_to_file, save_solution_to_file, timestamped_path,
};
pub use solution::LockSolution;
