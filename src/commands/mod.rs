pub mod serve;

// Re-export command functions
pub use serve::cmd_serve;
