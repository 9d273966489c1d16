//! MAC layer: identity, resource allocation, PLL/PPX timing recovery, and
//! the contact list.

pub mod allocation;
pub mod contact;
pub mod identity;
pub mod pll;
pub mod ppx;
pub mod resource;

pub use allocation::{Allocation, Direction, TxOpportunity};
pub use contact::{Contact, ContactList};
pub use identity::Identity;
pub use pll::Pll;
pub use ppx::Ppx;
pub use resource::Resource;
