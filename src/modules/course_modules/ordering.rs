//! Ordering planner for the modules of one course.
//!
//! Every operation produces the final ordered list of module ids. From that
//! list [`plan_updates`] derives the rows to rewrite so that `order_index`
//! runs `0..n` without gaps and each module's prerequisite is the module
//! right before it.

use std::collections::HashSet;

use sqlx::FromRow;
use uuid::Uuid;

/// Where a module sits in its course.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ModulePosition {
    pub id: Uuid,
    pub order_index: i32,
    pub prerequisite_module_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderingError {
    WrongLength { expected: usize, received: usize },
    Duplicate(Uuid),
    Unknown(Uuid),
}

impl std::fmt::Display for OrderingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WrongLength { expected, received } => write!(
                f,
                "module_ids must list all {} modules of the course, got {}",
                expected, received
            ),
            Self::Duplicate(id) => write!(f, "Module {} is listed more than once", id),
            Self::Unknown(id) => write!(f, "Module {} does not belong to this course", id),
        }
    }
}

impl std::error::Error for OrderingError {}

fn clamp_index(index: i32, max: usize) -> usize {
    usize::try_from(index.max(0)).unwrap_or(0).min(max)
}

/// Inserts `new_id` at `index`, or at the end when no index is given.
/// Indexes past the end are clamped.
pub fn plan_insert(current: &[Uuid], new_id: Uuid, index: Option<i32>) -> Vec<Uuid> {
    let mut order: Vec<Uuid> = current.iter().copied().filter(|id| *id != new_id).collect();
    let at = index.map_or(order.len(), |i| clamp_index(i, order.len()));
    order.insert(at, new_id);
    order
}

/// Moves `id` to `index`, clamped to the last position. Returns `None` when
/// `id` is not in `current`.
pub fn plan_move(current: &[Uuid], id: Uuid, index: i32) -> Option<Vec<Uuid>> {
    let from = current.iter().position(|m| *m == id)?;
    let mut order = current.to_vec();
    order.remove(from);
    let at = clamp_index(index, order.len());
    order.insert(at, id);
    Some(order)
}

pub fn plan_remove(current: &[Uuid], id: Uuid) -> Vec<Uuid> {
    current.iter().copied().filter(|m| *m != id).collect()
}

/// Accepts `requested` only if it is a permutation of `current`.
pub fn plan_reorder(current: &[Uuid], requested: &[Uuid]) -> Result<Vec<Uuid>, OrderingError> {
    if requested.len() != current.len() {
        return Err(OrderingError::WrongLength {
            expected: current.len(),
            received: requested.len(),
        });
    }

    let known: HashSet<Uuid> = current.iter().copied().collect();
    let mut seen = HashSet::with_capacity(requested.len());
    for id in requested {
        if !known.contains(id) {
            return Err(OrderingError::Unknown(*id));
        }
        if !seen.insert(*id) {
            return Err(OrderingError::Duplicate(*id));
        }
    }

    Ok(requested.to_vec())
}

/// Rows whose stored position differs from the one `final_order` implies.
/// Ids in `final_order` without a row are skipped.
pub fn plan_updates(rows: &[ModulePosition], final_order: &[Uuid]) -> Vec<ModulePosition> {
    let mut updates = Vec::new();
    let mut previous: Option<Uuid> = None;

    for (index, id) in final_order.iter().enumerate() {
        let Some(row) = rows.iter().find(|r| r.id == *id) else {
            continue;
        };
        let desired = ModulePosition {
            id: *id,
            order_index: i32::try_from(index).unwrap_or(i32::MAX),
            prerequisite_module_id: previous,
        };
        if *row != desired {
            updates.push(desired);
        }
        previous = Some(*id);
    }

    updates
}
