use crate::Dispatcher;

mod help;
pub use help::Help;

mod b_example;
pub use b_example::ExampleButton;

mod s_example;
pub use s_example::ExampleSelect;

/// Embed colour used by the bot's own messages.
pub const EMBED_COLOR: u32 = 0x5865f2;

pub fn register(dispatcher: Dispatcher) -> Dispatcher {
    dispatcher
        .command(Help)
        .component(ExampleButton)
        .component(ExampleSelect)
}
