//! The callback slots a cryptographic library exposes for registration.
//!
//! OpenSSL keeps exactly one global locking callback and one global thread id
//! callback. [`Registry`] names those slots, plus the per-context server name
//! callback, so that the locking shim can be driven against the linked library
//! ([`OpenSsl`]) or against any other implementation of the same contract.

use libc::c_long;
use std::mem;

use crate::legacy::{self, LockingCallback, ThreadIdCallback};
use crate::sni::ServerNameCallback;

/// A library's callback registration entry points.
pub trait Registry {
    /// The number of distinct locks the library will ask for.
    fn num_locks(&self) -> usize;

    /// The currently registered locking callback, if any.
    fn locking_callback(&self) -> Option<LockingCallback>;

    /// Replaces the global locking callback.
    fn set_locking_callback(&self, callback: Option<LockingCallback>);

    /// Replaces the global thread id callback.
    fn set_id_callback(&self, callback: Option<ThreadIdCallback>);

    /// Registers `callback` as the server name callback of `ctx`, returning
    /// the library's status code.
    ///
    /// # Safety
    ///
    /// `ctx` must be whatever the library accepts for a context handle.
    unsafe fn set_servername_callback(
        &self,
        ctx: *mut ffi::SSL_CTX,
        callback: Option<ServerNameCallback>,
    ) -> c_long;
}

/// The OpenSSL library this crate is linked against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenSsl;

impl Registry for OpenSsl {
    fn num_locks(&self) -> usize {
        let n = unsafe { legacy::CRYPTO_num_locks() };
        n.max(0) as usize
    }

    fn locking_callback(&self) -> Option<LockingCallback> {
        unsafe { legacy::CRYPTO_get_locking_callback() }
    }

    fn set_locking_callback(&self, callback: Option<LockingCallback>) {
        unsafe { legacy::CRYPTO_set_locking_callback(callback) }
    }

    fn set_id_callback(&self, callback: Option<ThreadIdCallback>) {
        unsafe { legacy::CRYPTO_set_id_callback(callback) }
    }

    // SSL_CTX_set_tlsext_servername_callback is a macro over callback_ctrl
    #[allow(clippy::missing_transmute_annotations)]
    unsafe fn set_servername_callback(
        &self,
        ctx: *mut ffi::SSL_CTX,
        callback: Option<ServerNameCallback>,
    ) -> c_long {
        ffi::SSL_CTX_callback_ctrl(
            ctx,
            ffi::SSL_CTRL_SET_TLSEXT_SERVERNAME_CB,
            mem::transmute(callback),
        )
    }
}
