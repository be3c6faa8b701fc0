use std::fs::File;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use rppal::gpio::Gpio;

use irstrip_shared::nec::{self, Address};
use irstrip_shared::queue;
use irstrip_shared::{IrLine, Transmitter};

use crate::carrier::Carrier;
use crate::config::{self, OutputOpt};
use crate::gateway::{self, Gateway};
use crate::gpio::GpioLine;
use crate::rt;
use crate::vcdutils::VcdLine;

/// The output line plus whatever has to stay alive while it is used
pub struct Emitter {
    pub line: Box<dyn IrLine>,
    pub carrier: Option<Carrier>,
}

impl Emitter {
    pub fn open(opt: &OutputOpt) -> anyhow::Result<Self> {
        if let Some(path) = &opt.dump {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            log::info!("Dry run, writing waveform to {}", path.display());

            return Ok(Emitter {
                line: Box::new(VcdLine::new(file)?),
                carrier: None,
            });
        }

        let gpio = Gpio::new().context("Failed to open GPIO")?;
        let line = GpioLine::open(&gpio, opt.led_pin)
            .with_context(|| format!("Failed to configure GPIO {}", opt.led_pin))?;
        let carrier = Carrier::start(opt.pwm_channel)?;

        Ok(Emitter {
            line: Box::new(line),
            carrier: Some(carrier),
        })
    }
}

pub fn command_send(cmd: u8, opt: &OutputOpt) -> anyhow::Result<()> {
    let addr = Address::from(opt.address);
    let Emitter { line, carrier: _carrier } = Emitter::open(opt)?;

    rt::tune_current_thread(opt.cpu, opt.nice);

    log::info!("Sending command {} to address {:#06x}", cmd, addr.as_u16());
    Transmitter::new(line)
        .transmit(&nec::encode(addr, cmd))
        .context("Transmission failed")?;

    Ok(())
}

pub fn command_serve(port: u16, buttons: Option<&Path>, opt: &OutputOpt) -> anyhow::Result<()> {
    let addr = Address::from(opt.address);
    let buttons = Arc::new(config::load_buttons(buttons)?);

    // Hardware first, nothing is served if the pins are not ours
    let Emitter { line, carrier: _carrier } = Emitter::open(opt)?;

    let (sender, receiver) = queue::channel();

    // Runtime threads are created here, before this thread gets pinned
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("irstrip-http")
        .build()
        .context("Failed to start HTTP runtime")?;

    let listen = SocketAddr::from(([0, 0, 0, 0], port));
    gateway::spawn(&runtime, listen, Arc::new(Gateway::new(sender, buttons)))?;
    log::info!("Serving at {}", listen);

    rt::tune_current_thread(opt.cpu, opt.nice);

    let mut transmitter = Transmitter::new(line);
    receiver
        .run(|cmd| transmitter.transmit(&nec::encode(addr, cmd)))
        .context("Transmission failed")?;

    anyhow::bail!("HTTP gateway stopped")
}
