//! Application entity <-> model mapper

use lazy_core::entities::{Application, ApplicationStatus};
use lazy_core::error::DomainError;
use lazy_core::value_objects::Snowflake;

use crate::models::ApplicationModel;

impl TryFrom<ApplicationModel> for Application {
    type Error = DomainError;

    fn try_from(model: ApplicationModel) -> Result<Self, Self::Error> {
        let status = model
            .status
            .parse::<ApplicationStatus>()
            .map_err(DomainError::DatabaseError)?;

        Ok(Application {
            id: model.id,
            user_id: Snowflake::new(model.user_id),
            status,
            reason: model.reason,
            handled_by: model.handled_by.map(Snowflake::new),
            handled_at: model.handled_at,
            expires_at: model.expires_at,
            created_at: model.created_at,
        })
    }
}
