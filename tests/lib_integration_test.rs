//! Integration tests for the Threes solver public API

use assert_matches::assert_matches;
use threes_solver::{Result, ThreesSolverError, DESCRIPTION, NAME, VERSION};

#[test]
fn test_library_metadata() {
    assert!(!VERSION.is_empty());
    assert_eq!(NAME, "threes_solver");
    assert!(!DESCRIPTION.is_empty());
}

#[test]
fn test_error_types() {
    let perception_error = ThreesSolverError::Perception("test perception error".to_string());
    assert_matches!(perception_error, ThreesSolverError::Perception(_));

    let automation_error = ThreesSolverError::Automation("test automation error".to_string());
    assert_matches!(automation_error, ThreesSolverError::Automation(_));

    let memory_error = ThreesSolverError::Memory("test memory error".to_string());
    assert_matches!(memory_error, ThreesSolverError::Memory(_));

    let io_error: ThreesSolverError =
        std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
    assert_matches!(io_error, ThreesSolverError::Io(_));
}

#[test]
fn test_result_type_alias() {
    let success: Result<i32> = Ok(42);
    assert!(success.is_ok());
    assert_eq!(success.unwrap(), 42);

    let failure: Result<i32> = Err(ThreesSolverError::Memory("test".to_string()));
    assert!(failure.is_err());
}
