//! # Palisade Files
//!
//! Static file serving for Palisade applications.
//!
//! ```rust,no_run
//! use palisade_core::{HttpMethod, HttpRequest};
//! use palisade_files::StaticFileGetter;
//!
//! let getter = StaticFileGetter::new("public");
//! let req = HttpRequest::new(HttpMethod::GET, "/assets?path=css/site.css");
//! let response = getter.serve(&req);
//! println!("{} {:?}", response.status, response.headers.get("Content-Type"));
//! ```

pub mod error;
pub mod getter;

pub use error::{FileError, FileResult};
pub use getter::{PATH_PARAM, ServedFile, StaticFileGetter, content_type};
