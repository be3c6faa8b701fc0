use structopt::StructOpt;

mod carrier;
mod config;
mod gateway;
mod gpio;
mod irsend;
mod playback;
mod rt;
mod vcdutils;

use config::{CliCommand, Opt};

fn main() -> anyhow::Result<()> {
    let opt = Opt::from_args();

    let loglevel = if opt.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(loglevel)
        .parse_default_env()
        .init();

    match opt.cmd {
        CliCommand::Serve {
            port,
            buttons,
            output,
        } => irsend::command_serve(port, buttons.as_deref(), &output),
        CliCommand::Send { cmd, output } => irsend::command_send(cmd, &output),
        CliCommand::Decode { path } => playback::command_decode(&path),
    }
}
