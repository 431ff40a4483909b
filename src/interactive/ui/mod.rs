pub mod app_state;
pub mod commands;
pub mod components;
pub mod events;
pub mod keymap;
pub mod renderer;

#[cfg(test)]
mod app_state_test;
