//! Ordered map with unique keys over an arena-backed red-black tree.
//!
//! Entries are addressed either through borrowing iterators or through
//! [`Cursor`] handles, which carry no borrow and are checked against the map
//! on every use.

mod arena;
mod check;
mod compare;
mod cursor;
mod error;
mod iter;
mod map;
mod tree;

pub use compare::{Compare, Natural, Reverse};
pub use cursor::Cursor;
pub use error::{CursorFault, Error, InvariantViolation, Result};
pub use iter::{IntoIter, Iter, IterMut, Keys, Values, ValuesMut};
pub use map::OrderedMap;
