//! C bindings, declared in `include/openssl_locking.h`.
//!
//! These are thin wrappers over [`threading`](crate::threading) and
//! [`sni`](crate::sni) for hosts that link the `cdylib` or `staticlib`
//! artifact instead of depending on the crate.

use ffi::SSL_CTX;
use libc::{c_int, c_long};

use crate::sni::{self, ServerNameCallback};
use crate::threading;

/// Installs the OpenSSL locking callbacks unless a locking callback is
/// already registered.
#[no_mangle]
pub extern "C" fn openssl_locking_init() {
    threading::init();
}

/// Removes the locking callbacks and frees the lock table, if installed.
#[no_mangle]
pub extern "C" fn openssl_locking_deinit() {
    threading::teardown();
}

/// Returns 1 if the lock table is installed, 0 otherwise.
#[no_mangle]
pub extern "C" fn openssl_locking_is_installed() -> c_int {
    threading::is_installed() as c_int
}

/// `SSL_CTX_set_tlsext_servername_callback` as a function.
///
/// # Safety
///
/// `ctx` is passed to OpenSSL unchanged and must be a valid `SSL_CTX`.
#[no_mangle]
pub unsafe extern "C" fn openssl_locking_set_servername_callback(
    ctx: *mut SSL_CTX,
    callback: Option<ServerNameCallback>,
) -> c_long {
    sni::set_servername_callback(ctx, callback)
}
