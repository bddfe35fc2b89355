pub mod contact;
pub mod error;
pub mod invoice;

pub use contact::*;
pub use error::*;
pub use invoice::*;
