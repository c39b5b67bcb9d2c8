//! Hard failures of the compositor. Content problems found while compiling a chain are
//! not errors, see `compositor::diagnostics::CompileWarning` for those.

use failure::Fail;

use crate::video::assets::texture::RenderTextureHandle;
use crate::video::assets::viewport::ViewportHandle;

#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "Local texture '{}' does not exist.", _0)]
    LocalTextureNotFound(String),
    #[fail(display = "Position {} is out of bounds.", _0)]
    OutOfBounds(usize),
    #[fail(display = "Compositor '{}' is not registered.", _0)]
    CompositorNotFound(String),
    #[fail(display = "Compositor '{}' has no technique supported by the backend.", _0)]
    NoSupportedTechnique(String),
    #[fail(display = "Backend: {}", _0)]
    Backend(String),
    #[fail(display = "{} is invalid.", _0)]
    RenderTextureHandleInvalid(RenderTextureHandle),
    #[fail(display = "{} is invalid.", _0)]
    ViewportNotExists(ViewportHandle),
    #[fail(display = "Malformed settings: {}", _0)]
    Settings(String),
}

pub type Result<T> = ::std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::Settings(format!("{}", err))
    }
}
