//! File actions module.
//!
//! This module provides functionality for:
//! - Executing a deletion plan through a trash or permanent removal method
//! - Interactive root selection and deletion confirmation
//!
//! # Deletion
//!
//! ```no_run
//! use dupesweep::actions::{execute_plan, RemovalMethod};
//! use dupesweep::plan::DeletionPlan;
//!
//! let plan = DeletionPlan::default();
//! let result = execute_plan(&plan, RemovalMethod::detect(false), None, None);
//! ```

pub mod delete;
pub mod prompt;

// Re-export commonly used types
pub use delete::{
    delete_to_trash, execute_plan, permanent_delete, BatchDeleteResult, DeleteError,
    DeleteProgressCallback, DeleteResult, FileSnapshot, RemovalMethod,
};
pub use prompt::{available_drives, confirm, select_root};
