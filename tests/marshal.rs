// tests/marshal.rs

use std::ffi::CStr;

use childpipe::Executable;
use childpipe::exec::marshal;

fn strings(array: &childpipe::exec::CStringArray) -> Vec<&[u8]> {
    array.strings().iter().map(|s| s.as_bytes()).collect()
}

#[test]
fn argv_starts_with_path_followed_by_arguments() {
    let exe = Executable::new("/usr/bin/printf").arg("%s-%s").arg("a").arg("b c");
    let marshaled = marshal(&exe);

    assert_eq!(marshaled.program(), c"/usr/bin/printf");
    assert_eq!(
        strings(&marshaled.argv),
        vec![&b"/usr/bin/printf"[..], b"%s-%s", b"a", b"b c"]
    );
    assert!(marshaled.envp.is_empty());
}

#[test]
fn envp_is_sorted_key_value_pairs() {
    let exe = Executable::new("/bin/true")
        .env("ZED", "last")
        .env("ALPHA", "a=b")
        .env("EMPTY", "")
        .env("ALPHA", "replaced");
    let marshaled = marshal(&exe);

    assert_eq!(
        strings(&marshaled.envp),
        vec![&b"ALPHA=replaced"[..], b"EMPTY=", b"ZED=last"]
    );
}

#[test]
fn pointer_arrays_are_null_terminated() {
    let exe = Executable::new("/bin/echo").arg("x").env("K", "V");
    let marshaled = marshal(&exe);

    // SAFETY: both arrays hold `len()` valid pointers followed by a null,
    // and `marshaled` outlives every dereference below.
    unsafe {
        let argv = marshaled.argv.as_ptr();
        assert_eq!(marshaled.argv.len(), 2);
        assert_eq!(CStr::from_ptr(*argv), c"/bin/echo");
        assert_eq!(CStr::from_ptr(*argv.add(1)), c"x");
        assert!((*argv.add(2)).is_null());

        let envp = marshaled.envp.as_ptr();
        assert_eq!(CStr::from_ptr(*envp), c"K=V");
        assert!((*envp.add(1)).is_null());
    }
}

#[test]
fn pointers_survive_moving_the_arrays() {
    let exe = Executable::new("/bin/echo").args(["one", "two"]);
    let marshaled = marshal(&exe);
    let moved = Box::new(marshaled);

    // SAFETY: see `pointer_arrays_are_null_terminated`.
    unsafe {
        let argv = moved.argv.as_ptr();
        assert_eq!(CStr::from_ptr(*argv.add(2)), c"two");
    }
}

#[test]
fn empty_path_gives_empty_program_name() {
    let marshaled = marshal(&Executable::default());

    assert_eq!(marshaled.program(), c"");
    assert_eq!(marshaled.argv.len(), 1);
    assert_eq!(marshaled.argv.get(0), Some(c""));
    assert_eq!(marshaled.argv.get(1), None);
}

#[test]
fn interior_nul_truncates_the_string() {
    let exe = Executable::new("/bin/echo")
        .arg("keep\0drop")
        .env("KEY", "val\0ue");
    let marshaled = marshal(&exe);

    assert_eq!(marshaled.argv.get(1), Some(c"keep"));
    assert_eq!(marshaled.envp.get(0), Some(c"KEY=val"));
}
