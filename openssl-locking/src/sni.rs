//! Server name indication callback registration.
//!
//! OpenSSL only exposes `SSL_CTX_set_tlsext_servername_callback` as a C macro,
//! which leaves hosts that cannot expand macros without a way to register the
//! callback. The functions here are plain pass-throughs: nothing is validated
//! and status codes are returned exactly as the library produced them.

use ffi::{SSL, SSL_CTX};
use libc::{c_int, c_long, c_void};
use std::ffi::CStr;

use crate::registry::{OpenSsl, Registry};

pub use ffi::{
    SSL_TLSEXT_ERR_ALERT_FATAL, SSL_TLSEXT_ERR_ALERT_WARNING, SSL_TLSEXT_ERR_NOACK,
    SSL_TLSEXT_ERR_OK,
};

/// The server name callback signature: `(ssl, alert, arg) -> SSL_TLSEXT_ERR_*`.
pub type ServerNameCallback =
    unsafe extern "C" fn(ssl: *mut SSL, alert: *mut c_int, arg: *mut c_void) -> c_int;

/// Registers `callback` as the server name callback of `ctx`.
///
/// # Safety
///
/// `ctx` is handed to OpenSSL as is and must be a valid `SSL_CTX`.
pub unsafe fn set_servername_callback(
    ctx: *mut SSL_CTX,
    callback: Option<ServerNameCallback>,
) -> c_long {
    set_servername_callback_with(&OpenSsl, ctx, callback)
}

/// Registers `callback` as the server name callback of `ctx` with `registry`.
///
/// # Safety
///
/// `ctx` must be a context handle `registry` accepts.
pub unsafe fn set_servername_callback_with<R: Registry + ?Sized>(
    registry: &R,
    ctx: *mut SSL_CTX,
    callback: Option<ServerNameCallback>,
) -> c_long {
    registry.set_servername_callback(ctx, callback)
}

/// Sets the `arg` pointer passed to the server name callback of `ctx`.
///
/// # Safety
///
/// `ctx` must be a valid `SSL_CTX`, and `arg` must stay valid for as long as
/// the callback can run.
pub unsafe fn set_servername_arg(ctx: *mut SSL_CTX, arg: *mut c_void) -> c_long {
    ffi::SSL_CTX_ctrl(ctx, ffi::SSL_CTRL_SET_TLSEXT_SERVERNAME_ARG, 0, arg)
}

/// Returns the host name the client asked for, if it sent one.
///
/// # Safety
///
/// `ssl` must be a valid `SSL`, and the returned string must not outlive it.
pub unsafe fn servername<'a>(ssl: *const SSL) -> Option<&'a CStr> {
    let name = ffi::SSL_get_servername(ssl, ffi::TLSEXT_NAMETYPE_host_name);
    if name.is_null() {
        None
    } else {
        Some(CStr::from_ptr(name))
    }
}
