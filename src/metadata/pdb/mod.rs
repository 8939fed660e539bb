//! Records of the managed (Windows) PDB format.

mod dbivariable;

pub use dbivariable::*;

use bitflags::bitflags;

bitflags! {
    /// Attributes of a local variable in a PDB
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct PdbLocalAttributes: u16 {
        /// The local is compiler generated and hidden from the debugger
        const DEBUGGER_HIDDEN = 0x0001;
    }
}
