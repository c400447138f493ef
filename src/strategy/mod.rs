pub mod proportional;

use crate::error::DataError;
use crate::types::{OddsRecord, Recommendation};

pub trait Strategy: Send + Sync {
    fn recommend(&self, odds: &[OddsRecord]) -> Result<Recommendation, DataError>;
}
