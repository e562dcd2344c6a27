use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    pub event_id: i64,
    pub redeemed: bool,
    pub sold_at: NaiveDateTime,
}

impl Ticket {
    pub fn ensure_not_redeemed(&self) -> Result<()> {
        if self.redeemed {
            return Err(Error::conflict("Ticket has already been redeemed."));
        }
        Ok(())
    }
}
