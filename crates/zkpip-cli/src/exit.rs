//! Process exit handling.
//!
//! Handlers return a mapped exit code. With `ZKPIP_HARD_EXIT=1` a failing
//! code terminates the process immediately; otherwise it is handed back to
//! `main`.

use std::process::ExitCode;

use zkpip_core::ExitCode as Codes;

/// Exit code for a handler error: I/O failures anywhere in the chain map to
/// `io_error`, everything else to the generic failure code.
pub fn code_for_error(err: &anyhow::Error) -> i32 {
    if err.chain().any(|cause| cause.downcast_ref::<std::io::Error>().is_some()) {
        Codes::IO_ERROR
    } else {
        Codes::FAILURE
    }
}

/// Finish the process with `code`.
pub fn finish(code: i32, hard_exit: bool) -> ExitCode {
    if hard_exit && code != Codes::SUCCESS {
        std::process::exit(code);
    }
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn io_errors_anywhere_in_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = Err::<(), _>(io).context("reading bundle").unwrap_err();
        assert_eq!(code_for_error(&err), 2);

        let err = anyhow::anyhow!("bad input");
        assert_eq!(code_for_error(&err), 1);
    }

    #[test]
    fn soft_exit_returns_code() {
        assert_eq!(finish(0, true), ExitCode::SUCCESS);
        assert_eq!(finish(3, false), ExitCode::from(3));
    }
}
