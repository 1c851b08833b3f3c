pub mod db;
pub mod editor;
pub mod help_popup;
pub mod keybinds;
pub mod logging;
pub mod mode;
pub mod settings;
pub mod space_travel;
pub mod ui;
