pub mod tui;

pub use tui::ReliefTui;
