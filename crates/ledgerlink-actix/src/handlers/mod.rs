pub mod auth;
pub mod contacts;
pub mod invoices;
pub mod pages;

pub use auth::*;
pub use contacts::*;
pub use invoices::*;
pub use pages::*;
