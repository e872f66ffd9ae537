//! Outbound HTTP collaborators.
//!
//! - `openai`: chat-completions text generator behind [`TextGenerator`]
//! - `lead_function`: forwards leads to the collect-lead function
//!
//! [`TextGenerator`]: keeptouch_core::plan::TextGenerator

pub mod lead_function;
pub mod openai;
