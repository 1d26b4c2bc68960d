use std::future::Future;

use crate::errors::{RollcallError, RollcallResult};

/// Returns the existing record or creates it.
///
/// A create that loses a race against another writer surfaces as
/// [`RollcallError::Conflict`]; the winner's record is then looked up again.
pub async fn find_or_create<T, Find, FindFut, Create, CreateFut>(
    find: Find,
    create: Create,
) -> RollcallResult<T>
where
    Find: Fn() -> FindFut,
    FindFut: Future<Output = RollcallResult<Option<T>>>,
    Create: FnOnce() -> CreateFut,
    CreateFut: Future<Output = RollcallResult<T>>,
{
    if let Some(found) = find().await? {
        return Ok(found);
    }

    match create().await {
        Ok(created) => Ok(created),
        Err(err) if err.is_conflict() => find().await?.ok_or_else(|| {
            RollcallError::NotFound(format!("record vanished after conflicting create: {}", err))
        }),
        Err(err) => Err(err),
    }
}
