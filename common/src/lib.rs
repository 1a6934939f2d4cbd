//! Landed Common Types
//!
//! This crate contains the plain-data records shared by the rate provider and
//! the pricing engine: the settings singleton, product line items, exchange
//! rate quotes, and the currency rounding rules they all follow.

pub mod error;
pub mod monetary;
pub mod product;
pub mod rate;
pub mod settings;
pub mod time;

pub use error::*;
pub use monetary::*;
pub use product::*;
pub use rate::*;
pub use settings::*;
pub use time::*;
