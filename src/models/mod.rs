pub mod outline;
pub mod presentation;
pub mod slide;
