//! Rules around the three-way income split.

use trio_domain::{AllocationPolicy, BudgetBucket};

use crate::CoreError;

pub struct AllocationService;

impl AllocationService {
    pub fn validate(proposed: AllocationPolicy) -> Result<AllocationPolicy, CoreError> {
        if !proposed.is_balanced() {
            return Err(CoreError::InvalidAllocation {
                needs: proposed.needs,
                wants: proposed.wants,
                dream: proposed.dream,
            });
        }
        Ok(proposed)
    }

    /// Replaces `current` with `proposed`, or leaves it untouched when the
    /// proposal does not add up to 100.
    pub fn set(current: &mut AllocationPolicy, proposed: AllocationPolicy) -> Result<(), CoreError> {
        *current = Self::validate(proposed)?;
        Ok(())
    }

    pub fn recommended_amount(policy: &AllocationPolicy, bucket: BudgetBucket, total_income: f64) -> f64 {
        policy.recommended_amount(bucket, total_income)
    }
}
