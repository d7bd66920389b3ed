//! Position planning for an owner's link collection.
//!
//! Storage backends call into this module while holding the owner's
//! exclusive section, then persist the returned assignments in one step.
//! Nothing here touches storage.

use std::collections::HashSet;

use serde_json::json;
use uuid::Uuid;

use crate::error::AppError;

/// Why a requested ordering is not a permutation of the current collection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    #[error("link {0} appears more than once in the requested order")]
    Duplicate(Uuid),

    #[error("link {0} does not belong to this collection")]
    Foreign(Uuid),

    #[error("link {0} is missing from the requested order")]
    Missing(Uuid),
}

impl From<PositionError> for AppError {
    fn from(e: PositionError) -> Self {
        let link_id = match &e {
            PositionError::Duplicate(id) | PositionError::Foreign(id) | PositionError::Missing(id) => {
                *id
            }
        };
        AppError::bad_request(
            "Requested order is not a permutation of the current links",
            json!({
                "reason": "position_mismatch",
                "detail": e.to_string(),
                "link_id": link_id,
            }),
        )
    }
}

/// Checks that `requested` is exactly a permutation of `current`.
///
/// Duplicates and foreign ids are reported in the order they appear in
/// `requested`; missing ids in the order of `current`.
pub fn validate_permutation(current: &[Uuid], requested: &[Uuid]) -> Result<(), PositionError> {
    let known: HashSet<Uuid> = current.iter().copied().collect();
    let mut seen = HashSet::with_capacity(requested.len());

    for id in requested {
        if !known.contains(id) {
            return Err(PositionError::Foreign(*id));
        }
        if !seen.insert(*id) {
            return Err(PositionError::Duplicate(*id));
        }
    }

    if let Some(missing) = current.iter().find(|id| !seen.contains(*id)) {
        return Err(PositionError::Missing(*missing));
    }

    Ok(())
}

/// Plans a reorder: the link at index `i` of `requested` receives position `i`.
///
/// Returns `(link_id, new_position)` for every link in the collection.
pub fn plan_reorder(
    current: &[Uuid],
    requested: &[Uuid],
) -> Result<Vec<(Uuid, i32)>, PositionError> {
    validate_permutation(current, requested)?;

    Ok(requested
        .iter()
        .enumerate()
        .map(|(position, id)| (*id, position as i32))
        .collect())
}

/// Position a surviving link takes after the link at `removed` is deleted.
pub fn compacted_position(position: i32, removed: i32) -> i32 {
    if position > removed {
        position - 1
    } else {
        position
    }
}

/// True when `positions` is exactly `{0, 1, ..., n-1}`.
pub fn is_contiguous(positions: impl IntoIterator<Item = i32>) -> bool {
    let mut sorted: Vec<i32> = positions.into_iter().collect();
    sorted.sort_unstable();
    sorted
        .iter()
        .enumerate()
        .all(|(expected, actual)| *actual == expected as i32)
}
