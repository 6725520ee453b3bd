//! Object arena and transactional scope.
//!
//! Objects live in a [`Store`] and reference each other by stable
//! [`ObjectId`] handles, so cyclic relationship graphs carry no ownership
//! cycles. New and modified objects sit in a pending scope that becomes
//! durable only on commit.

mod object;
mod store;

pub use object::{Link, Object, ObjectId};
pub use store::Store;
