use serde::{Deserialize, Serialize};

use crate::store::{DbCollectionIden, StoreIden};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Holiday {
    pub id: String,
    /// ISO date, `YYYY-MM-DD`
    pub date: String,
    pub name: String,
}

impl DbCollectionIden for Holiday {
    fn iden() -> StoreIden {
        StoreIden::Holidays
    }
}
