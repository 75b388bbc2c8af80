use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A policy held by the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insurance {
    pub insurance_id: String,
    #[serde(default)]
    pub name: String,
    pub insured_sum: f64,
}

/// A claim filed against a policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub insurance_id: String,
    pub claimed_amount: f64,
}

/// A policy joined with its claims.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceWithClaim {
    #[serde(flatten)]
    pub insurance: Insurance,
    pub claimed_amount: f64,
    pub remaining_sum: f64,
}

/// Join policies with claims, keeping policy order.
///
/// Claims against the same policy accumulate; a policy without claims has a
/// claimed amount of zero. Claims for unknown policies are ignored.
pub fn merge_claims(insurances: Vec<Insurance>, claims: &[Claim]) -> Vec<InsuranceWithClaim> {
    let mut claimed: HashMap<&str, f64> = HashMap::with_capacity(claims.len());
    for claim in claims {
        *claimed.entry(claim.insurance_id.as_str()).or_insert(0.0) += claim.claimed_amount;
    }

    insurances
        .into_iter()
        .map(|insurance| {
            let claimed_amount = claimed
                .get(insurance.insurance_id.as_str())
                .copied()
                .unwrap_or(0.0);
            InsuranceWithClaim {
                remaining_sum: insurance.insured_sum - claimed_amount,
                claimed_amount,
                insurance,
            }
        })
        .collect()
}
