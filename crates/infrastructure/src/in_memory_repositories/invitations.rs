use super::*;

#[async_trait]
impl InvitationRepository for InMemoryInvitationRepository {
    async fn list_invitations(
        &self,
        status: Option<InvitationStatus>,
    ) -> AppResult<Vec<Invitation>> {
        let invitations = self.invitations.read().await;

        let mut values: Vec<Invitation> = invitations
            .values()
            .filter(|invitation| status.is_none_or(|status| invitation.status == status))
            .cloned()
            .collect();
        values.sort_by(|left, right| right.created_at.cmp(&left.created_at));

        Ok(values)
    }

    async fn create_invitation(&self, invitation: NewInvitation) -> AppResult<Invitation> {
        let mut invitations = self.invitations.write().await;

        if invitations.values().any(|existing| {
            existing.email == invitation.email && existing.status.is_unresolved()
        }) {
            return Err(AppError::Conflict(format!(
                "an open invitation already exists for '{}'",
                invitation.email
            )));
        }

        let now = Utc::now();
        let created = Invitation {
            id: InvitationId::new(),
            email: invitation.email,
            business_name: invitation.business_name,
            contact_name: invitation.contact_name,
            phone: invitation.phone,
            status: InvitationStatus::Pending,
            invitation_token: invitation.invitation_token,
            tracking_pixel_id: invitation.tracking_pixel_id,
            click_tracking_id: invitation.click_tracking_id,
            invited_by: invitation.invited_by,
            email_sent_at: None,
            created_at: now,
            updated_at: now,
            metadata: invitation.metadata,
        };
        invitations.insert(created.id, created.clone());

        Ok(created)
    }

    async fn find_by_tracking_pixel_id(
        &self,
        tracking_pixel_id: &str,
    ) -> AppResult<Option<Invitation>> {
        Ok(self
            .invitations
            .read()
            .await
            .values()
            .find(|invitation| invitation.tracking_pixel_id == tracking_pixel_id)
            .cloned())
    }

    async fn find_by_click_tracking_id(
        &self,
        click_tracking_id: &str,
    ) -> AppResult<Option<Invitation>> {
        Ok(self
            .invitations
            .read()
            .await
            .values()
            .find(|invitation| invitation.click_tracking_id == click_tracking_id)
            .cloned())
    }

    async fn mark_sent(
        &self,
        invitation_id: InvitationId,
        email_sent_at: Option<DateTime<Utc>>,
    ) -> AppResult<Option<Invitation>> {
        let mut invitations = self.invitations.write().await;

        let Some(invitation) = invitations
            .get_mut(&invitation_id)
            .filter(|invitation| invitation.status == InvitationStatus::Pending)
        else {
            return Ok(None);
        };

        invitation.status = InvitationStatus::Sent;
        invitation.email_sent_at = email_sent_at;
        invitation.updated_at = Utc::now();

        Ok(Some(invitation.clone()))
    }

    async fn advance_status(
        &self,
        invitation_id: InvitationId,
        target: InvitationStatus,
    ) -> AppResult<bool> {
        let sources = InvitationStatus::escalation_sources(target);
        let mut invitations = self.invitations.write().await;

        let Some(invitation) = invitations
            .get_mut(&invitation_id)
            .filter(|invitation| sources.contains(&invitation.status))
        else {
            return Ok(false);
        };

        invitation.status = target;
        invitation.updated_at = Utc::now();

        Ok(true)
    }

    async fn expire_unresolved_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let mut invitations = self.invitations.write().await;
        let now = Utc::now();
        let mut expired = 0;

        for invitation in invitations.values_mut().filter(|invitation| {
            invitation.status.is_unresolved() && invitation.created_at < cutoff
        }) {
            invitation.status = InvitationStatus::Expired;
            invitation.updated_at = now;
            expired += 1;
        }

        Ok(expired)
    }
}
