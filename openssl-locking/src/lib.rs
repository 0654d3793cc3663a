//! Thread-locking callbacks and server name callback registration for
//! OpenSSL.
//!
//! OpenSSL releases before 1.1.0 are only safe to use from several threads if
//! the application registers a locking callback and a thread id callback. The
//! [`threading`] module provides both, backed by a process-wide lock table,
//! with idempotent setup and teardown. The [`sni`] module exposes the
//! server name callback registration that OpenSSL only ships as a macro.
//!
//! Everything is also exported with C linkage from [`capi`].
//!
//! # Building
//!
//! OpenSSL is located by `openssl-sys`; see its documentation for the
//! `OPENSSL_DIR` family of environment variables. The `vendored` feature
//! builds and statically links a copy of OpenSSL instead.
#![doc(html_root_url = "https://docs.rs/openssl-locking/0.1")]

pub use crate::error::{Error, ErrorStack, OpensslError, Result};
pub use crate::legacy::{
    LockingCallback, ThreadIdCallback, CRYPTO_LOCK, CRYPTO_READ, CRYPTO_UNLOCK, CRYPTO_WRITE,
};
pub use crate::library::Library;
pub use crate::registry::{OpenSsl, Registry};
pub use crate::sni::ServerNameCallback;
pub use crate::threading::ThreadSafety;

mod legacy;
mod lock_table;

pub mod capi;
pub mod error;
pub mod library;
pub mod registry;
pub mod sni;
pub mod thread_id;
pub mod threading;
