use super::args::*;

pub mod check;
pub mod grade;
pub mod init;
pub mod submit;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const CHECK_FAILED: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

pub fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Grade(args) => grade::run(args),
        Command::Check(args) => check::run(args),
        Command::Submit(args) => submit::run(args),
        Command::Init(args) => init::run(args),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(exit_codes::OK)
        }
    }
}
