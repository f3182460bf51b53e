//! Utility modules for common functionality

pub mod signals;

pub use signals::setup_signal_handlers;

// vim: ts=4
