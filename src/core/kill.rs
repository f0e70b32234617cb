//! # Forced termination: the platform-dependent escape hatch.
//!
//! Cooperative pause/stop flags are only checked between units of work, so
//! a worker blocked inside a long native call cannot be interrupted that
//! way. When a graceful stop has exhausted its timeout and the caller
//! opted into `force`, [`terminate`] injects a termination request into
//! the worker's own execution context.
//!
//! ## This is unsafe by nature
//!
//! - On unix it issues `pthread_cancel` with deferred cancellation
//!   semantics: the thread only dies at a cancellation point (sleeps,
//!   blocking I/O). A worker spinning in pure computation is unaffected,
//!   and the forced unwind does not honor Rust's unwind expectations;
//!   it can destabilize the process.
//! - On windows it issues `TerminateThread`, which stops the thread
//!   immediately without any cleanup; locks or buffers the worker held
//!   stay in whatever state they were in.
//! - On other platforms no hook exists and the request is refused.
//!
//! The outcome is best-effort in every case: an invalid or already-exited
//! target fails silently, and a failure only produces a warning; the
//! caller is never blocked. Correctness-sensitive tasks should poll their
//! [`StopToken`](crate::StopToken) instead of relying on this path.

use std::thread::JoinHandle;

/// Best-effort asynchronous termination of a worker thread.
///
/// Returns whether the termination request was accepted by the platform.
/// Acceptance is not proof the worker ended; the caller must treat the
/// worker's state as uncertain either way.
#[cfg(unix)]
pub(crate) fn terminate(handle: &JoinHandle<()>, name: &str) -> bool {
    use std::os::unix::thread::JoinHandleExt;

    let tid = handle.as_pthread_t();
    let rc = unsafe { libc::pthread_cancel(tid) };
    if rc != 0 {
        tracing::warn!(task = name, code = rc, "pthread_cancel failed");
        return false;
    }
    tracing::warn!(task = name, "cancellation request injected into worker");
    true
}

#[cfg(windows)]
pub(crate) fn terminate(handle: &JoinHandle<()>, name: &str) -> bool {
    use std::os::windows::io::AsRawHandle;
    use windows::Win32::Foundation::HANDLE;
    use windows::Win32::System::Threading::TerminateThread;

    let raw = HANDLE(handle.as_raw_handle());
    match unsafe { TerminateThread(raw, 1) } {
        Ok(()) => {
            tracing::warn!(task = name, "worker thread terminated");
            true
        }
        Err(e) => {
            tracing::warn!(task = name, error = %e, "TerminateThread failed");
            false
        }
    }
}

#[cfg(not(any(unix, windows)))]
pub(crate) fn terminate(_handle: &JoinHandle<()>, name: &str) -> bool {
    tracing::warn!(task = name, "forced termination is not supported on this platform");
    false
}
