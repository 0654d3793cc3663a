//! The pre-1.1.0 `CRYPTO_*` locking slots and library lifecycle calls.
//!
//! OpenSSL 1.1.0 turned these into macros that expand to nothing. When the
//! crate is built against such a release the same names are provided as Rust
//! functions with the macros' behavior, so callers never need to `cfg` on the
//! library version themselves.
#![allow(non_snake_case)]

use libc::{c_char, c_int, c_ulong};

pub const CRYPTO_LOCK: c_int = 1;
pub const CRYPTO_UNLOCK: c_int = 2;
pub const CRYPTO_READ: c_int = 4;
pub const CRYPTO_WRITE: c_int = 8;

/// The locking dispatcher signature: `(mode, n, file, line)`.
pub type LockingCallback =
    unsafe extern "C" fn(mode: c_int, n: c_int, file: *const c_char, line: c_int);

/// The thread-identity resolver signature.
pub type ThreadIdCallback = unsafe extern "C" fn() -> c_ulong;

#[cfg(not(ossl110))]
#[allow(clashing_extern_declarations)]
extern "C" {
    pub fn CRYPTO_num_locks() -> c_int;
    pub fn CRYPTO_get_locking_callback() -> Option<LockingCallback>;
    pub fn CRYPTO_set_locking_callback(func: Option<LockingCallback>);
    pub fn CRYPTO_set_id_callback(func: Option<ThreadIdCallback>);

    pub fn SSL_library_init() -> c_int;
    pub fn SSL_load_error_strings();
    pub fn EVP_cleanup();
    pub fn CRYPTO_cleanup_all_ex_data();
    pub fn ERR_free_strings();
}

#[cfg(ossl110)]
pub unsafe fn CRYPTO_num_locks() -> c_int {
    1
}

#[cfg(ossl110)]
pub unsafe fn CRYPTO_get_locking_callback() -> Option<LockingCallback> {
    None
}

#[cfg(ossl110)]
pub unsafe fn CRYPTO_set_locking_callback(_func: Option<LockingCallback>) {}

#[cfg(ossl110)]
pub unsafe fn CRYPTO_set_id_callback(_func: Option<ThreadIdCallback>) {}

#[allow(clashing_extern_declarations)]
extern "C" {
    pub fn RAND_poll() -> c_int;
    pub fn RAND_status() -> c_int;
}
