use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use structopt::StructOpt;

use irstrip_shared::ButtonTable;

#[derive(Debug, StructOpt)]
#[structopt(name = "irstrip", about = "Infrared remote for RGB LED strips")]
pub struct Opt {
    #[structopt(short, long)]
    pub debug: bool,
    #[structopt(subcommand)]
    pub cmd: CliCommand,
}

#[derive(Debug, StructOpt)]
pub enum CliCommand {
    /// Serve the control page and transmit commands as they arrive
    Serve {
        /// HTTP port
        #[structopt(long, default_value = "8080")]
        port: u16,
        /// Button legend, TOML. Defaults to the 24 key remote
        #[structopt(long, parse(from_os_str))]
        buttons: Option<PathBuf>,
        #[structopt(flatten)]
        output: OutputOpt,
    },
    /// Transmit a single command and exit
    Send {
        cmd: u8,
        #[structopt(flatten)]
        output: OutputOpt,
    },
    /// Decode the frames in a VCD dump
    Decode {
        #[structopt(parse(from_os_str))]
        path: PathBuf,
    },
}

#[derive(Debug, Clone, StructOpt)]
pub struct OutputOpt {
    /// Address of the emulated remote
    #[structopt(long, default_value = "61184")]
    pub address: u16,
    /// BCM number of the LED output pin
    #[structopt(long, default_value = "26")]
    pub led_pin: u8,
    /// Hardware PWM channel for the carrier
    #[structopt(long, default_value = "1", possible_values = &["0", "1"])]
    pub pwm_channel: u8,
    /// CPU the transmitting thread is pinned to
    #[structopt(long, default_value = "0")]
    pub cpu: usize,
    /// Niceness of the transmitting thread
    #[structopt(long, default_value = "-5", allow_hyphen_values = true)]
    pub nice: i32,
    /// Write the waveform to a VCD file instead of driving the pins
    #[structopt(long, parse(from_os_str))]
    pub dump: Option<PathBuf>,
}

pub fn parse_buttons(s: &str) -> Result<ButtonTable, toml::de::Error> {
    toml::from_str(s)
}

pub fn load_buttons(path: Option<&Path>) -> anyhow::Result<ButtonTable> {
    let path = match path {
        Some(path) => path,
        None => return Ok(ButtonTable::default()),
    };

    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let table = parse_buttons(&text)
        .with_context(|| format!("Invalid button table {}", path.display()))?;

    log::info!("Loaded {} buttons from {}", table.len(), path.display());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use irstrip_shared::Rgba;

    #[test]
    fn bundled_table_matches_default() {
        let table = parse_buttons(include_str!("../remotes/24key.toml")).unwrap();
        assert_eq!(table, ButtonTable::default());
    }

    #[test]
    fn minimal_table() {
        let table = parse_buttons(
            r#"
            [[button]]
            label = "ON"
            color = [204, 0, 0, 255]

            [[button]]
            color = [0, 0, 255, 128]
            "#,
        )
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0).unwrap().color, Rgba::RED);
        assert_eq!(table.get(1).unwrap().label, "");
    }

    #[test]
    fn rejects_bad_colour() {
        assert!(parse_buttons("[[button]]\ncolor = [1, 2]\n").is_err());
        assert!(parse_buttons("[[button]]\ncolor = [1, 2, 3, 300]\n").is_err());
    }

    #[test]
    fn no_file_means_default() {
        assert_eq!(load_buttons(None).unwrap(), ButtonTable::default());
    }

    #[test]
    fn cli_defaults() {
        let opt = Opt::from_iter(vec!["irstrip", "send", "7"]);
        match opt.cmd {
            CliCommand::Send { cmd, output } => {
                assert_eq!(cmd, 7);
                assert_eq!(output.address, 61184);
                assert_eq!(output.led_pin, 26);
                assert_eq!(output.pwm_channel, 1);
                assert_eq!(output.nice, -5);
                assert!(output.dump.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn cli_rejects_out_of_range_command() {
        assert!(Opt::from_iter_safe(vec!["irstrip", "send", "256"]).is_err());
    }
}
