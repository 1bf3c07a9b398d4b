//! Project domain module.
//!
//! Projects group conversations (by weak id reference) and own uploaded files.

mod model;

pub use model::{NewUploadedFile, Project, ProjectUpdate, UploadedFile};
