//! Runs against the OpenSSL the crate is linked with.

use libc::{c_int, c_void};
use openssl_locking::sni::{self, SSL_TLSEXT_ERR_OK};
use openssl_locking::threading::{self, ThreadSafety};
use openssl_locking::{Error, Library, OpenSsl, Registry};
use serial_test::serial;
use std::ptr;

mod common;

unsafe extern "C" fn accept(ssl: *mut ffi::SSL, _: *mut c_int, arg: *mut c_void) -> c_int {
    let _ = (sni::servername(ssl), arg);
    SSL_TLSEXT_ERR_OK
}

#[cfg(ossl110)]
unsafe fn method() -> *const ffi::SSL_METHOD {
    ffi::TLS_method()
}

#[cfg(not(ossl110))]
unsafe fn method() -> *const ffi::SSL_METHOD {
    ffi::SSLv23_method()
}

#[test]
#[serial]
fn init_and_teardown_are_idempotent() {
    common::init_logging();

    threading::init();
    let first = threading::lock_count();
    threading::init();
    assert_eq!(threading::lock_count(), first);

    if cfg!(ossl110) {
        // the 1.1.0 headers report a single lock and no registered callback
        assert_eq!(OpenSsl.num_locks(), 1);
        assert!(OpenSsl.locking_callback().is_none());
        assert_eq!(first, Some(1));
    } else if first.is_some() {
        assert!(OpenSsl.locking_callback().is_some());
        assert_eq!(first, Some(OpenSsl.num_locks()));
    }

    threading::teardown();
    threading::teardown();
    assert!(!threading::is_installed());
}

#[test]
#[serial]
fn library_is_a_singleton() {
    common::init_logging();

    let library = Library::init().unwrap();
    assert!(library.threading().is_ready());

    match Library::init() {
        Err(Error::AlreadyInitialized) => {}
        other => panic!("expected AlreadyInitialized, got {:?}", other),
    }

    library.shutdown();

    let again = Library::init().unwrap();
    drop(again);
}

#[test]
#[serial]
fn library_leaves_foreign_handle_in_charge() {
    common::init_logging();

    let handle = ThreadSafety::install(&OpenSsl);
    let owned = handle.owns_lock_table();

    let library = Library::init().unwrap();
    assert!(!library.threading().owns_lock_table());
    drop(library);

    // the library did not install the table, so it did not remove it either
    assert_eq!(threading::is_installed(), owned);
    handle.uninstall();
}

#[test]
#[serial]
fn servername_callback_registers_on_real_context() {
    common::init_logging();
    let _library = Library::init().unwrap();

    unsafe {
        let ctx = ffi::SSL_CTX_new(method());
        assert!(!ctx.is_null());

        assert_eq!(sni::set_servername_callback(ctx, Some(accept)), 1);
        assert_eq!(sni::set_servername_arg(ctx, ptr::null_mut()), 1);
        assert_eq!(sni::set_servername_callback(ctx, None), 1);

        ffi::SSL_CTX_free(ctx);
    }
}

#[test]
#[serial]
fn servername_is_absent_before_handshake() {
    common::init_logging();
    let _library = Library::init().unwrap();

    unsafe {
        let ctx = ffi::SSL_CTX_new(method());
        assert!(!ctx.is_null());
        let ssl = ffi::SSL_new(ctx);
        assert!(!ssl.is_null());

        assert!(sni::servername(ssl).is_none());

        ffi::SSL_free(ssl);
        ffi::SSL_CTX_free(ctx);
    }
}
