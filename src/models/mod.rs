pub mod enums;
mod conversation;
mod mood;

pub use conversation::*;
pub use mood::*;
