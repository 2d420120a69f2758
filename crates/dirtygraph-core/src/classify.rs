//! Record classification
//!
//! Every related record falls into exactly one [`Classification`], decided by
//! its lifecycle flags and whether it carries field changes. Deletion wins
//! over everything else, so an edited-then-deleted record is only ever
//! reported as deleted.

use serde::{Deserialize, Serialize};

use crate::model::EntityRef;

/// Mutually exclusive change state of a record at evaluation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    New,
    Edited,
    Deleted,
    Unchanged,
}

/// Classify a record
///
/// Priority: deleted, then new, then has field changes, else unchanged.
///
/// # Example
///
/// ```
/// use dirtygraph_core::classify::{classify, Classification};
/// use dirtygraph_core::model::EntityRef;
///
/// let mut item = EntityRef::persisted("LineItem", "li-1").with_attribute("price", 10);
/// item.set_field("price", 12).unwrap();
/// assert_eq!(classify(&item), Classification::Edited);
///
/// item.mark_deleted();
/// assert_eq!(classify(&item), Classification::Deleted);
/// ```
pub fn classify(record: &EntityRef) -> Classification {
    if record.is_deleted() {
        Classification::Deleted
    } else if record.is_new_record() {
        Classification::New
    } else if record.has_field_changes() {
        Classification::Edited
    } else {
        Classification::Unchanged
    }
}

impl EntityRef {
    /// Shorthand for [`classify`]
    pub fn classification(&self) -> Classification {
        classify(self)
    }
}
