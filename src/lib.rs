pub mod anim;
pub mod config;
pub mod grid;
pub mod hex;
