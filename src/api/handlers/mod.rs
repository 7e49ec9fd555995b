pub mod health;
pub mod pages;

pub use health::*;
pub use pages::*;
