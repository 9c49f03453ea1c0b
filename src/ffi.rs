//! C ABI boundary for the external launcher.
//!
//! The launcher loads `libwright.so` and calls exactly two entry points.
//! Neither assumes the caller keeps the passed buffers alive after the
//! call returns: both strings are copied before any work happens.

use std::ffi::CStr;
use std::os::raw::{c_char, c_int};
use std::process;

use crate::run;

/// The only interpretation strategy currently implemented.
pub const MODE_TREE_WALK: c_int = 1;

fn copy_c_str(ptr: *const c_char, what: &str) -> String {
    if ptr.is_null() {
        eprintln!("wright: run_file: {} buffer is null", what);
        process::exit(2);
    }

    // Safety: the caller guarantees `ptr` is a NUL-terminated buffer that
    // stays valid for the duration of this call.
    let c_str = unsafe { CStr::from_ptr(ptr) };
    match c_str.to_str() {
        Ok(s) => s.to_owned(),
        Err(_) => {
            eprintln!("wright: run_file: {} is not valid UTF-8", what);
            process::exit(2);
        }
    }
}

/// Run a whole program. `mode` selects the interpretation strategy
/// (tree-walk only, for now); `source` is the UTF-8 program text;
/// `path` is the absolute file path, used only in diagnostics.
///
/// Returns normally on success; on any failure the process terminates
/// with a nonzero status after writing a diagnostic to stderr.
///
/// # Safety
/// `source` and `path` must be NUL-terminated buffers valid for the
/// duration of the call.
#[no_mangle]
pub unsafe extern "C" fn run_file(mode: c_int, source: *const c_char, path: *const c_char) {
    let source = copy_c_str(source, "source");
    let path = copy_c_str(path, "path");

    if mode != MODE_TREE_WALK {
        eprintln!("wright: unsupported interpretation mode {}", mode);
        process::exit(2);
    }

    let code = run::interpret(&source, &path);
    if code != 0 {
        process::exit(code);
    }
}

/// Start the interactive prompt. Blocks the calling thread until the
/// session ends, then returns.
#[no_mangle]
pub extern "C" fn start_prompt() {
    let code = run::interactive();
    if code != 0 {
        process::exit(code);
    }
}
