use serde::{Deserialize, Serialize};

use crate::store::{DbCollectionIden, StoreIden};

/// One hop of a file's routing history.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Route {
    pub id: String,
    pub file_id: String,
    pub from_user: String,
    pub to_user: String,
    pub action: String,
    pub timestamp: i64,
}

impl DbCollectionIden for Route {
    fn iden() -> StoreIden {
        StoreIden::Routes
    }
}
