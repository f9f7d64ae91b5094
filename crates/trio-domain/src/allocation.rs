//! Three-way percentage split of monthly income and the metrics derived from it.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// The three spending buckets governed by the allocation policy.
pub enum BudgetBucket {
    Essentials,
    Discretionary,
    Savings,
}

impl BudgetBucket {
    pub const ALL: [BudgetBucket; 3] = [
        BudgetBucket::Essentials,
        BudgetBucket::Discretionary,
        BudgetBucket::Savings,
    ];

    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "essentials" | "needs" => Some(BudgetBucket::Essentials),
            "discretionary" | "wants" => Some(BudgetBucket::Discretionary),
            "savings" | "dream" => Some(BudgetBucket::Savings),
            _ => None,
        }
    }
}

impl fmt::Display for BudgetBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BudgetBucket::Essentials => "Essentials",
            BudgetBucket::Discretionary => "Discretionary",
            BudgetBucket::Savings => "Savings",
        };
        f.write_str(label)
    }
}

/// Percentages of income assigned to each bucket; valid policies sum to 100.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationPolicy {
    pub needs: u8,
    pub wants: u8,
    pub dream: u8,
}

impl Default for AllocationPolicy {
    fn default() -> Self {
        Self {
            needs: 50,
            wants: 30,
            dream: 20,
        }
    }
}

impl AllocationPolicy {
    pub const fn new(needs: u8, wants: u8, dream: u8) -> Self {
        Self {
            needs,
            wants,
            dream,
        }
    }

    /// Builds a policy from two slider positions on a 0..=100 scale.
    pub fn from_cut_points(needs_end: u8, wants_end: u8) -> Option<Self> {
        if needs_end > wants_end || wants_end > 100 {
            return None;
        }
        Some(Self::new(needs_end, wants_end - needs_end, 100 - wants_end))
    }

    pub fn total(&self) -> u16 {
        self.needs as u16 + self.wants as u16 + self.dream as u16
    }

    pub fn is_balanced(&self) -> bool {
        self.total() == 100
    }

    pub fn percent(&self, bucket: BudgetBucket) -> u8 {
        match bucket {
            BudgetBucket::Essentials => self.needs,
            BudgetBucket::Discretionary => self.wants,
            BudgetBucket::Savings => self.dream,
        }
    }

    /// `total_income * percent / 100` for the bucket.
    pub fn recommended_amount(&self, bucket: BudgetBucket, total_income: f64) -> f64 {
        total_income * f64::from(self.percent(bucket)) / 100.0
    }
}

impl fmt::Display for AllocationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.needs, self.wants, self.dream)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
/// Recommended amount, usage and what is left for a bucket.
pub struct BucketMetrics {
    pub bucket: BudgetBucket,
    pub percent: u8,
    pub recommended: f64,
    pub used: f64,
    /// May be negative when the bucket is overspent.
    pub remaining: f64,
    pub percent_used: f64,
}

impl BucketMetrics {
    pub fn from_parts(bucket: BudgetBucket, percent: u8, recommended: f64, used: f64) -> Self {
        Self {
            bucket,
            percent,
            recommended,
            used,
            remaining: recommended - used,
            percent_used: percent_used(recommended, used),
        }
    }

    pub fn is_overspent(&self) -> bool {
        self.remaining < 0.0
    }
}

/// Share of `recommended` consumed by `used`, within `[0, 100]`.
///
/// Zero when nothing is recommended.
pub fn percent_used(recommended: f64, used: f64) -> f64 {
    if recommended <= 0.0 || !recommended.is_finite() {
        return 0.0;
    }
    (used * 100.0 / recommended).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_fifty_thirty_twenty() {
        let policy = AllocationPolicy::default();
        assert_eq!((policy.needs, policy.wants, policy.dream), (50, 30, 20));
        assert!(policy.is_balanced());
    }

    #[test]
    fn recommended_amount_scales_income() {
        let policy = AllocationPolicy::default();
        assert_eq!(policy.recommended_amount(BudgetBucket::Essentials, 1000.0), 500.0);
        assert_eq!(policy.recommended_amount(BudgetBucket::Discretionary, 1000.0), 300.0);
        assert_eq!(policy.recommended_amount(BudgetBucket::Savings, 1000.0), 200.0);
    }

    #[test]
    fn cut_points_always_balance() {
        let policy = AllocationPolicy::from_cut_points(40, 80).unwrap();
        assert_eq!(policy, AllocationPolicy::new(40, 40, 20));
        assert!(policy.is_balanced());
        assert!(AllocationPolicy::from_cut_points(60, 50).is_none());
    }

    #[test]
    fn percent_used_guards_zero_recommendation() {
        assert_eq!(percent_used(0.0, 50.0), 0.0);
        assert_eq!(percent_used(500.0, 300.0), 60.0);
        assert_eq!(percent_used(100.0, 250.0), 100.0);
    }

    #[test]
    fn metrics_keep_negative_remaining() {
        let metrics = BucketMetrics::from_parts(BudgetBucket::Essentials, 50, 100.0, 130.0);
        assert_eq!(metrics.remaining, -30.0);
        assert!(metrics.is_overspent());
        assert_eq!(metrics.percent_used, 100.0);
    }

    #[test]
    fn serializes_with_document_field_names() {
        let value = serde_json::to_value(AllocationPolicy::default()).unwrap();
        assert_eq!(value, serde_json::json!({"needs": 50, "wants": 30, "dream": 20}));
    }
}
