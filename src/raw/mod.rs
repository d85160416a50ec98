mod node;
mod pool;
mod raw_omt;

pub(crate) use pool::{NodeIdx, NodePool, Slot};
pub(crate) use raw_omt::{RawOmt, Repr};
