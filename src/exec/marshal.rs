// src/exec/marshal.rs

//! Conversion of an [`Executable`] into the `argv` / `envp` arrays that
//! `execve` consumes.
//!
//! Each array owns its strings and keeps a derived, null-terminated list of
//! pointers into them. The pointers stay valid for as long as the array is
//! alive because a `CString`'s bytes live on the heap and do not move when
//! the owning `Vec` moves. Both arrays are built in the parent before
//! `fork`, so the child never allocates.

use std::ffi::{CStr, CString, c_char};
use std::path::Path;

use crate::exec::Executable;

/// Owned NUL-terminated strings plus a null-terminated pointer list into
/// them.
#[derive(Debug)]
pub struct CStringArray {
    items: Vec<CString>,
    ptrs: Vec<*const c_char>,
}

impl CStringArray {
    fn from_strings(items: Vec<CString>) -> Self {
        let ptrs = items
            .iter()
            .map(|s| s.as_ptr())
            .chain(std::iter::once(std::ptr::null()))
            .collect();
        Self { items, ptrs }
    }

    /// Number of strings, not counting the terminating null pointer.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn strings(&self) -> &[CString] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&CStr> {
        self.items.get(index).map(CString::as_c_str)
    }

    /// Pointer to the null-terminated `char *[]`, valid while `self` lives.
    pub fn as_ptr(&self) -> *const *const c_char {
        self.ptrs.as_ptr()
    }
}

/// `argv` and `envp` for one launch.
#[derive(Debug)]
pub struct Marshaled {
    pub argv: CStringArray,
    pub envp: CStringArray,
}

impl Marshaled {
    /// The program path, which is also `argv[0]`.
    pub fn program(&self) -> &CStr {
        self.argv.get(0).unwrap_or(c"")
    }
}

/// Build `argv = [path, arguments...]` and
/// `envp = ["key=value" for each entry in ascending key order]`.
///
/// Total for every descriptor: an empty path gives an empty program name,
/// and a string with an interior NUL byte is cut at that byte (which is all
/// a C `execve` would see of it).
pub fn marshal(executable: &Executable) -> Marshaled {
    let argv = std::iter::once(to_cstring(path_bytes(&executable.path)))
        .chain(executable.arguments.iter().map(|a| to_cstring(a.as_bytes())))
        .collect();

    let envp = executable
        .environment
        .iter()
        .map(|(key, value)| {
            let mut entry = Vec::with_capacity(key.len() + value.len() + 1);
            entry.extend_from_slice(key.as_bytes());
            entry.push(b'=');
            entry.extend_from_slice(value.as_bytes());
            to_cstring(&entry)
        })
        .collect();

    Marshaled {
        argv: CStringArray::from_strings(argv),
        envp: CStringArray::from_strings(envp),
    }
}

fn to_cstring(bytes: &[u8]) -> CString {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    // No NUL left in `bytes[..end]`, so this cannot fail.
    CString::new(&bytes[..end]).unwrap_or_default()
}

#[cfg(unix)]
fn path_bytes(path: &Path) -> &[u8] {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str().as_bytes()
}

#[cfg(not(unix))]
fn path_bytes(path: &Path) -> &[u8] {
    path.to_str().map(str::as_bytes).unwrap_or_default()
}
