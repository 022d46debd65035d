//! Auth-domain identifiers, the user snapshot, and token models.

pub mod id;
pub mod token;
pub mod user;

pub use id::*;
pub use token::{claims::*, pair::*, secret::*};
pub use user::*;
