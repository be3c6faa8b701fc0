//! Command queue between the request handlers and the transmitter.
//!
//! Any number of senders, one receiver. Submitting never blocks, and the
//! receiver handles one command at a time in arrival order, which is what
//! keeps two frames from ever being on the output at once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("command queue closed, command {0} dropped")]
pub struct QueueClosed(pub u8);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConsumerState {
    /// Waiting for the next command
    Idle,
    /// Encoding and sending the current command
    Transmitting,
}

pub fn channel() -> (CommandSender, CommandReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    let busy = Arc::new(AtomicBool::new(false));

    (
        CommandSender {
            tx,
            busy: busy.clone(),
        },
        CommandReceiver { rx, busy },
    )
}

#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: UnboundedSender<u8>,
    busy: Arc<AtomicBool>,
}

impl CommandSender {
    /// Queue `cmd` and return without waiting for it to be sent
    pub fn submit(&self, cmd: u8) -> Result<(), QueueClosed> {
        self.tx.send(cmd).map_err(|err| QueueClosed(err.0))
    }

    /// Watch the consumer without keeping the queue open
    pub fn status(&self) -> ConsumerStatus {
        ConsumerStatus(self.busy.clone())
    }
}

#[derive(Debug, Clone)]
pub struct ConsumerStatus(Arc<AtomicBool>);

impl ConsumerStatus {
    pub fn get(&self) -> ConsumerState {
        if self.0.load(Ordering::Acquire) {
            ConsumerState::Transmitting
        } else {
            ConsumerState::Idle
        }
    }
}

pub struct CommandReceiver {
    rx: UnboundedReceiver<u8>,
    busy: Arc<AtomicBool>,
}

impl CommandReceiver {
    /// Hand every command to `handler`, in order, until all senders are gone.
    ///
    /// Blocks the calling thread, so it must not run inside an async runtime.
    /// The first handler error stops the loop and is returned.
    pub fn run<F, E>(mut self, mut handler: F) -> Result<(), E>
    where
        F: FnMut(u8) -> Result<(), E>,
    {
        while let Some(cmd) = self.rx.blocking_recv() {
            self.busy.store(true, Ordering::Release);
            log::debug!("Transmitting command {}", cmd);

            let res = handler(cmd);

            self.busy.store(false, Ordering::Release);
            res?;
            log::debug!("Idle");
        }

        log::info!("All senders gone, consumer stopping");
        Ok(())
    }
}
