//! The calling thread's identity, as OpenSSL's id callback reports it.
//!
//! The value is only ever compared for equality by the library. It is stable
//! for the lifetime of a thread and distinct between threads alive at the same
//! time; identifiers of exited threads may be reused.

use libc::c_ulong;

/// Returns the identifier of the calling thread.
#[cfg(any(target_os = "macos", target_os = "ios"))]
pub fn current() -> c_ulong {
    unsafe { libc::pthread_mach_thread_np(libc::pthread_self()) as c_ulong }
}

/// Returns the identifier of the calling thread.
#[cfg(all(unix, not(any(target_os = "macos", target_os = "ios"))))]
pub fn current() -> c_ulong {
    unsafe { libc::pthread_self() as c_ulong }
}

/// Returns the identifier of the calling thread.
#[cfg(windows)]
pub fn current() -> c_ulong {
    #[link(name = "kernel32")]
    extern "system" {
        fn GetCurrentThreadId() -> u32;
    }

    unsafe { GetCurrentThreadId() as c_ulong }
}
