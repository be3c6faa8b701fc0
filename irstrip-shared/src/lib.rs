pub mod buttons;
pub mod nec;
pub mod pulse;
pub mod queue;
pub mod transmit;

pub use buttons::{ButtonDescriptor, ButtonTable, Rgba};
pub use nec::{Address, NecCommand};
pub use pulse::{Pulse, PulseFrame};
pub use queue::{CommandReceiver, CommandSender, ConsumerState, QueueClosed};
pub use transmit::{IrLine, Transmitter};
