use super::*;

#[async_trait]
impl RetailerRepository for InMemoryRetailerRepository {
    async fn find_retailer(&self, retailer_id: RetailerId) -> AppResult<Option<RetailerAccount>> {
        Ok(self.retailers.read().await.get(&retailer_id).cloned())
    }

    async fn transition_status(
        &self,
        retailer_id: RetailerId,
        target: RetailerStatus,
    ) -> AppResult<Option<RetailerAccount>> {
        let mut retailers = self.retailers.write().await;

        let Some(account) = retailers
            .get_mut(&retailer_id)
            .filter(|account| account.status.can_transition_to(target))
        else {
            return Ok(None);
        };

        account.status = target;
        account.updated_at = Utc::now();

        Ok(Some(account.clone()))
    }
}

#[async_trait]
impl ActivationTokenRepository for InMemoryActivationTokenRepository {
    async fn issue_token(&self, token: NewActivationToken) -> AppResult<ActivationToken> {
        let mut tokens = self.tokens.write().await;

        for open in tokens.iter_mut().filter(|existing| {
            existing.retailer_id == token.retailer_id
                && existing.redeemed_at.is_none()
                && existing.superseded_at.is_none()
        }) {
            open.superseded_at = Some(token.issued_at);
        }

        let issued = ActivationToken {
            id: ActivationTokenId::new(),
            retailer_id: token.retailer_id,
            token_hash: token.token_hash,
            issued_at: token.issued_at,
            expires_at: token.expires_at,
            redeemed_at: None,
            superseded_at: None,
        };
        tokens.push(issued.clone());

        Ok(issued)
    }

    async fn find_by_hash(&self, token_hash: &str) -> AppResult<Option<ActivationToken>> {
        Ok(self
            .tokens
            .read()
            .await
            .iter()
            .find(|token| token.token_hash == token_hash)
            .cloned())
    }

    async fn redeem_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<ActivationToken>> {
        let mut tokens = self.tokens.write().await;

        let Some(token) = tokens
            .iter_mut()
            .find(|token| token.token_hash == token_hash && token.is_redeemable(now))
        else {
            return Ok(None);
        };

        token.redeemed_at = Some(now);

        Ok(Some(token.clone()))
    }

    async fn redeem_and_activate(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<ActivationRedemption> {
        let mut tokens = self.tokens.write().await;

        let Some(token) = tokens
            .iter_mut()
            .find(|token| token.token_hash == token_hash && token.is_redeemable(now))
        else {
            return Ok(ActivationRedemption::TokenUnavailable);
        };

        let mut retailers = self.retailers.retailers.write().await;
        let Some(account) = retailers.get_mut(&token.retailer_id) else {
            return Ok(ActivationRedemption::NotAwaitingActivation {
                retailer_id: token.retailer_id,
                status: None,
            });
        };
        if !account.status.can_transition_to(RetailerStatus::Active) {
            return Ok(ActivationRedemption::NotAwaitingActivation {
                retailer_id: token.retailer_id,
                status: Some(account.status),
            });
        }

        account.status = RetailerStatus::Active;
        account.updated_at = now;
        token.redeemed_at = Some(now);

        Ok(ActivationRedemption::Activated(account.clone()))
    }
}
