pub mod apple;
pub mod crypto;
pub mod logging;
