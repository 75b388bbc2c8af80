use std::sync::Arc;

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Result;
use crate::types::{merge_claims, Claim, Insurance, InsuranceWithClaim};

/// Policy and claim endpoints.
pub struct InsuranceService {
    client: Arc<ApiClient>,
}

impl InsuranceService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// `GET /myInsurance`.
    pub async fn my_insurances(&self) -> Result<Vec<Insurance>> {
        self.client.get_json("/myInsurance").await
    }

    /// `GET /myClaim`.
    pub async fn my_claims(&self) -> Result<Vec<Claim>> {
        self.client.get_json("/myClaim").await
    }

    /// Fetch policies and claims concurrently and join them.
    ///
    /// Fails if either request fails.
    pub async fn insurances_with_claims(&self) -> Result<Vec<InsuranceWithClaim>> {
        let (insurances, claims) = tokio::try_join!(self.my_insurances(), self.my_claims())?;
        debug!(
            policies = insurances.len(),
            claims = claims.len(),
            "Merging policies with claims"
        );
        Ok(merge_claims(insurances, &claims))
    }
}
