use crate::{
    common::money::Money,
    domain::account::{Credits, Tier},
};

/// A purchasable credit bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plan {
    pub label: &'static str,
    pub credits: Credits,
    /// Price in USDT.
    pub price: Money,
    /// Minimum tier an approved purchase lifts the buyer to.
    pub promotes_to: Option<Tier>,
}

pub const PLANS: [Plan; 3] = [
    Plan {
        label: "60 Credits",
        credits: 60,
        price: Money::new(9_900),
        promotes_to: None,
    },
    Plan {
        label: "120 Credits",
        credits: 120,
        price: Money::new(19_900),
        promotes_to: Some(Tier::Basic),
    },
    Plan {
        label: "280 Credits",
        credits: 280,
        price: Money::new(39_900),
        promotes_to: Some(Tier::Pro),
    },
];

impl Plan {
    /// Catalogue entry whose label the given label starts with, so
    /// `120 Credits - 1.99 USDT` resolves but `1120 Credits` does not.
    pub fn find(label: &str) -> Option<&'static Plan> {
        let label = label.trim();
        PLANS.iter().find(|plan| {
            label
                .strip_prefix(plan.label)
                .is_some_and(|rest| !rest.starts_with(|c: char| c.is_ascii_alphanumeric()))
        })
    }
}

/// What approving a payment for a given plan label is worth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanGrant {
    pub credits: Credits,
    pub promotes_to: Option<Tier>,
    /// False when the label was not in the catalogue.
    pub catalogued: bool,
}

impl PlanGrant {
    /// Resolve a stored plan label.
    ///
    /// Unknown labels fall back to their leading integer with no promotion;
    /// a label without one grants nothing.
    pub fn resolve(label: &str) -> Self {
        if let Some(plan) = Plan::find(label) {
            return Self {
                credits: plan.credits,
                promotes_to: plan.promotes_to,
                catalogued: true,
            };
        }

        Self {
            credits: leading_credits(label).unwrap_or(0),
            promotes_to: None,
            catalogued: false,
        }
    }
}

fn leading_credits(label: &str) -> Option<Credits> {
    label.split_whitespace().next()?.parse().ok()
}
