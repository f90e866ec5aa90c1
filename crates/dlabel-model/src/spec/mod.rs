mod command;
pub use command::CommandLabel;

mod label;
pub use label::LabelSpec;
