use crate::collection::CollectionManager;
use crate::domain::{Client, ClientDraft, ClientStatus, EntityKind, Prospect, RecordId};
use crate::error::CollectionError;

/// Contact fields of `prospect` as an active client draft.
pub fn client_draft_from(prospect: &Prospect) -> ClientDraft {
    ClientDraft {
        name: prospect.name.clone(),
        email: prospect.email.clone(),
        phone: prospect.phone.clone(),
        company: prospect.company.clone(),
        status: ClientStatus::Active,
        notes: prospect.notes.clone(),
    }
}

/// Create a client from prospect `id`, then drop the prospect.
///
/// Either both changes land or neither does: if the prospect cannot be
/// removed, the new client is deleted again before the error is returned.
pub async fn convert_to_client(
    prospects: &CollectionManager<Prospect>,
    clients: &CollectionManager<Client>,
    id: &RecordId,
) -> Result<Client, CollectionError> {
    let prospect = prospects.get(id).ok_or_else(|| CollectionError::NotFound {
        kind: EntityKind::Prospect,
        id: id.clone(),
    })?;
    if prospects.is_busy() {
        return Err(CollectionError::Busy {
            kind: EntityKind::Prospect,
        });
    }

    let client = clients.save(&client_draft_from(&prospect), None).await?;

    if let Err(e) = prospects.remove(id).await {
        match clients.remove(&client.id).await {
            Ok(()) => tracing::warn!(
                prospect_id = %id,
                client_id = %client.id,
                error = %e,
                "prospect could not be removed, client rolled back"
            ),
            Err(rollback) => tracing::error!(
                prospect_id = %id,
                client_id = %client.id,
                error = %e,
                rollback_error = %rollback,
                "prospect could not be removed and client rollback failed"
            ),
        }
        return Err(e);
    }

    tracing::info!(prospect_id = %id, client_id = %client.id, "converted prospect to client");
    Ok(client)
}
