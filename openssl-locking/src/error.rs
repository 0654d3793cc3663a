//! Errors raised while bringing the library up.

use libc::c_ulong;
use std::error;
use std::ffi::CStr;
use std::fmt;

/// The result type of fallible operations in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// An error bringing up or configuring the library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A [`Library`](crate::Library) is already alive in this process.
    #[error("OpenSSL is already initialized")]
    AlreadyInitialized,
    /// OpenSSL refused to initialize.
    #[error("OpenSSL initialization failed: {0}")]
    Init(ErrorStack),
    /// The PRNG is still unseeded after polling the system's entropy sources.
    #[error("the OpenSSL PRNG could not be seeded")]
    Entropy,
}

/// A collection of [`OpensslError`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorStack(Vec<OpensslError>);

impl ErrorStack {
    /// Drains the calling thread's OpenSSL error queue.
    pub fn get() -> ErrorStack {
        let mut vec = vec![];
        while let Some(err) = OpensslError::get() {
            vec.push(err);
        }
        ErrorStack(vec)
    }

    /// Returns the errors in the stack, oldest first.
    pub fn errors(&self) -> &[OpensslError] {
        &self.0
    }
}

impl fmt::Display for ErrorStack {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        if self.0.is_empty() {
            return fmt.write_str("OpenSSL error");
        }

        let mut first = true;
        for err in &self.0 {
            if !first {
                fmt.write_str(", ")?;
            }
            write!(fmt, "{}", err)?;
            first = false;
        }
        Ok(())
    }
}

impl error::Error for ErrorStack {}

/// An error reported from OpenSSL.
#[derive(Clone, PartialEq, Eq)]
pub struct OpensslError(c_ulong);

impl OpensslError {
    /// Pops the oldest error off the calling thread's error queue.
    pub fn get() -> Option<OpensslError> {
        match unsafe { ffi::ERR_get_error() } {
            0 => None,
            code => Some(OpensslError(code)),
        }
    }

    /// Returns the raw OpenSSL error code.
    pub fn code(&self) -> c_ulong {
        self.0
    }

    /// Returns the name of the library that reported the error.
    pub fn library(&self) -> Option<&'static str> {
        unsafe { static_str(ffi::ERR_lib_error_string(self.0)) }
    }

    /// Returns the reason for the error.
    pub fn reason(&self) -> Option<&'static str> {
        unsafe { static_str(ffi::ERR_reason_error_string(self.0)) }
    }
}

impl fmt::Debug for OpensslError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("OpensslError")
            .field("code", &self.0)
            .field("library", &self.library())
            .field("reason", &self.reason())
            .finish()
    }
}

impl fmt::Display for OpensslError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "error:{:08X}", self.0)?;
        if let Some(library) = self.library() {
            write!(fmt, ":{}", library)?;
        }
        if let Some(reason) = self.reason() {
            write!(fmt, ":{}", reason)?;
        }
        Ok(())
    }
}

impl error::Error for OpensslError {}

unsafe fn static_str(s: *const libc::c_char) -> Option<&'static str> {
    if s.is_null() {
        None
    } else {
        CStr::from_ptr(s).to_str().ok()
    }
}
