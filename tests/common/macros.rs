/// Panics if `$expr` is not an Err(err) with err.to_string() matching regexp `$err`.
#[allow(unused_macros)]
macro_rules! assert_err {
    ($expr:expr, $err:expr) => {
        match &($expr) {
            &Ok(_) => {
                panic!("assertion failed: not an error in `{}`", stringify!($expr));
            }
            &Err(ref value) => {
                let re = regex::Regex::new($err).unwrap();
                let desc = value.to_string();
                if !re.is_match(&desc) {
                    panic!(
                        "assertion failed: error message \"{}\" doesn't match \"{}\" in `{}`",
                        desc,
                        re,
                        stringify!($expr)
                    );
                }
            }
        }
    };
}
