use crate::settings::Mode;
use clap::Args;

/// Mutually exclusive flags selecting the service environment. Defaults to the sandbox.
#[derive(Debug, Clone, Copy, Default, Args)]
#[group(required = false, multiple = false)]
pub struct ModeArgs {
    /// Use the sandbox token and host.
    #[arg(short, long)]
    pub sandbox: bool,

    /// Use the production token and host.
    #[arg(short, long)]
    pub production: bool,
}

impl ModeArgs {
    pub fn mode(&self) -> Mode {
        if self.production {
            Mode::Production
        } else {
            Mode::Sandbox
        }
    }
}
