use crate::error::{FileError, FileResult};
use palisade_core::{ActionContext, HttpRequest, HttpResponse};
use std::fs;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Request parameter naming the file under a directory base.
pub const PATH_PARAM: &str = "path";

/// A file read for a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServedFile {
    pub path: PathBuf,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl ServedFile {
    pub fn into_response(self) -> HttpResponse {
        let response = HttpResponse::ok().with_body(self.body);
        match self.content_type {
            Some(content_type) => response.content_type(content_type),
            None => response,
        }
    }
}

/// Serves one file, or files below one directory.
///
/// With a file base every request gets that file. With a directory base
/// the file is named by the `path` request parameter, relative to the
/// base.
#[derive(Debug, Clone)]
pub struct StaticFileGetter {
    base: PathBuf,
}

impl StaticFileGetter {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Whether routes may pass a trailing path to this getter.
    pub fn supports_partial_path(&self) -> bool {
        self.base.is_dir()
    }

    /// Serve into the response of `ctx`.
    pub fn handle(&self, ctx: &mut ActionContext) {
        let response = self.serve(ctx.req());
        ctx.resp_mut().merge(response);
    }

    /// Response for a request, with failures mapped to their status.
    pub fn serve(&self, req: &HttpRequest) -> HttpResponse {
        match self.read(req) {
            Ok(file) => {
                debug!(path = %file.path.display(), bytes = file.body.len(), "Serving static file");
                file.into_response()
            }
            Err(e) => {
                match &e {
                    FileError::Io(_) => warn!(error = %e, "Static file could not be read"),
                    _ => debug!(error = %e, "Static file not served"),
                }
                e.into_response()
            }
        }
    }

    /// Locate and read the file a request asks for.
    pub fn read(&self, req: &HttpRequest) -> FileResult<ServedFile> {
        if !self.base.exists() {
            return Err(FileError::NotFound(self.base.display().to_string()));
        }

        let (path, content_type) = if self.base.is_dir() {
            let relative = req.param_value(PATH_PARAM).unwrap_or_default();
            let relative = relative.trim_start_matches('/');
            if relative.trim().is_empty() {
                return Err(FileError::BadRequest("no file requested".to_string()));
            }
            (self.resolve(relative)?, content_type(Path::new(relative)))
        } else {
            (self.base.clone(), content_type(&self.base))
        };

        let body = read_file(&path)?;
        Ok(ServedFile {
            path,
            content_type,
            body,
        })
    }

    fn resolve(&self, relative: &str) -> FileResult<PathBuf> {
        let escapes = Path::new(relative).components().any(|c| {
            matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_))
        });
        if escapes {
            return Err(FileError::Forbidden(relative.to_string()));
        }

        let target = self.base.join(relative);
        if !target.is_file() {
            return Err(FileError::NotFound(relative.to_string()));
        }

        // Symlinks may still point outside the base.
        let root = self.base.canonicalize()?;
        if !target.canonicalize()?.starts_with(&root) {
            return Err(FileError::Forbidden(relative.to_string()));
        }

        Ok(target)
    }
}

/// Content type for a path, from its extension.
pub fn content_type(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?;
    mime_guess::from_ext(ext).first_raw().map(String::from)
}

fn read_file(path: &Path) -> FileResult<Vec<u8>> {
    let mut file = fs::File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::PermissionDenied => FileError::Forbidden(path.display().to_string()),
        io::ErrorKind::NotFound => FileError::NotFound(path.display().to_string()),
        _ => FileError::Io(e),
    })?;

    let mut body = Vec::new();
    file.read_to_end(&mut body)?;
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type() {
        assert_eq!(content_type(Path::new("a/site.css")).as_deref(), Some("text/css"));
        assert_eq!(content_type(Path::new("logo.png")).as_deref(), Some("image/png"));
        assert_eq!(content_type(Path::new("data.unknownext")), None);
        assert_eq!(content_type(Path::new("README")), None);
    }

    #[test]
    fn test_missing_base() {
        let getter = StaticFileGetter::new("/nonexistent/palisade/public");
        assert!(!getter.supports_partial_path());
        let response = getter.serve(&HttpRequest::new(palisade_core::HttpMethod::GET, "/"));
        assert_eq!(response.status, 404);
    }

    #[test]
    fn test_served_file_response() {
        let file = ServedFile {
            path: PathBuf::from("a.txt"),
            content_type: None,
            body: b"hi".to_vec(),
        };
        let response = file.into_response();
        assert_eq!(response.body, b"hi".to_vec());
        assert!(!response.headers.contains_key("Content-Type"));
    }
}
