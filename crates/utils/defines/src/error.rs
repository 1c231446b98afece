use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Error(core::ffi::c_int);

impl Error {
    #[inline]
    pub fn as_isize(self) -> isize {
        self.0 as isize
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(errno::error_info(self.as_isize()))
    }
}

pub type KResult<T = isize> = core::result::Result<T, Error>;

pub mod errno {
    macro_rules! declare_errno {
        ($($name:tt, $errno:literal, $desc:literal,)*) => {
            $(#[doc = $desc]
            pub const $name: super::Error = super::Error($errno);)*
            pub fn error_info(errno: isize) -> &'static str {
                match errno {
                    $($errno => ::core::concat!(stringify!($name), ", ", $desc),)*
                    _ => "Unknown error",
                }
            }
        };
    }

    #[rustfmt::skip]
    declare_errno!(
        UNSUPPORTED, -1024, "Do not support",
        DETACHED,    -1022, "Thread was detached while being joined",

        EPERM,          -1,     "Operation not permitted.",
        ESRCH,          -3,     "No such process or thread.",
        ECHILD,         -10,    "No child process",
        EAGAIN,         -11,    "Try again.",
        ENOMEM,         -12,    "Out of memory",
        EBADF,          -9,     "Bad file number.",
        EEXIST,         -17,    "File exists.",
        EINVAL,         -22,    "Invalid argument.",
        EMFILE,         -24,    "Too many open files.",
        EDEADLK,        -35,    "Resource deadlock would occur.",
    );
}

#[cfg(test)]
mod tests {
    use super::errno;

    #[test]
    fn error_info_names_the_code() {
        assert_eq!(
            errno::error_info(errno::ESRCH.as_isize()),
            "ESRCH, No such process or thread."
        );
        assert_eq!(
            errno::error_info(errno::DETACHED.as_isize()),
            "DETACHED, Thread was detached while being joined"
        );
        assert_eq!(errno::error_info(12345), "Unknown error");
    }
}
