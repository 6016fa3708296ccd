use uuid::Uuid;

use stocksync_types::errors::ApplicationError;

use crate::uow::UnitOfWork;

/// Clears the owner's resume pointer, unless it already points to another
/// job.
pub(crate) async fn forget_if_last_job(
    uow: &Box<dyn UnitOfWork<'_> + '_>,
    owner_id: Uuid,
    job_id: Uuid,
) -> Result<(), ApplicationError> {
    let owners = uow.owners();
    if owners.last_job(owner_id).await? == Some(job_id) {
        owners.forget_last_job(owner_id).await?;
    }
    Ok(())
}
