//! Universe source port.

use crate::domain::error::ScreenerError;
use crate::domain::universe::UniverseEntry;

pub trait UniversePort {
    /// Candidate rows in source order, before any pre-screen.
    fn load_entries(&self) -> Result<Vec<UniverseEntry>, ScreenerError>;
}
