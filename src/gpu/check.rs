//! Per-call GPU error polling.
//!
//! [`gpu_check!`](crate::gpu_check) wraps a wgpu call in a validation error
//! scope in debug builds and logs whatever the scope caught together with the
//! call site. Release builds run the call unchecked. Failures are never
//! propagated.

use tracing::error;

/// Runs `$call`, polling `$device` for validation errors afterwards in debug
/// builds.
#[macro_export]
macro_rules! gpu_check {
    ($device:expr, $call:expr) => {{
        if cfg!(debug_assertions) {
            $crate::gpu::check::push_scope($device);
        }
        let result = $call;
        if cfg!(debug_assertions) {
            $crate::gpu::check::pop_scope($device, stringify!($call), file!(), line!());
        }
        result
    }};
}

pub fn push_scope(device: &wgpu::Device) {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
}

/// Pops the innermost scope and logs its error, if any, with the call site.
pub fn pop_scope(device: &wgpu::Device, call: &str, file: &str, line: u32) -> Option<wgpu::Error> {
    let caught = pollster::block_on(device.pop_error_scope());
    if let Some(err) = caught.as_ref() {
        error!(call, file, line, error = %err, "gpu call failed");
    }
    caught
}

/// Runs `f` inside a validation scope regardless of build mode and returns
/// the caught error alongside the result.
///
/// Used where a failure has to change control flow, such as shader creation.
pub fn capture<T>(device: &wgpu::Device, f: impl FnOnce() -> T) -> (T, Option<wgpu::Error>) {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = f();
    let caught = pollster::block_on(device.pop_error_scope());
    (value, caught)
}
