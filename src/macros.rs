macro_rules! fail {
    ($err:expr) => (
        return Err(From::from($err))
    );
    ($fmt:expr, $($arg:tt)*) => (
        return Err(From::from(format!($fmt, $($arg)*)))
    );
}

macro_rules! ensure {
    ($expr:expr, $err:expr) => (
        if !($expr) {
            fail!($err);
        }
    );
    ($expr: expr, $fmt:expr, $($arg:tt)*) => (
        if !($expr) {
            fail!(format!($fmt, $($arg)*));
        }
    );
}

/// Panics if `$expr` is not an Err(err) with err.to_string() matching regexp `$err`.
#[cfg(test)]
macro_rules! assert_err {
    ($expr:expr, $err:expr) => {
        match &($expr) {
            &Ok(_) => {
                panic!("assertion failed: not an error in `{}`", stringify!($expr));
            }
            &Err(ref value) => {
                use regex::Regex;
                let re = Regex::new($err).unwrap();
                let desc = value.to_string();
                if !re.is_match(desc.as_ref()) {
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
