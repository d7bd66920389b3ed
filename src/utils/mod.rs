//! Input helpers shared by the services.
//!
//! - [`url_validator`] - Link target validation and normalization

pub mod url_validator;
