pub mod plugin;
pub mod surface;
