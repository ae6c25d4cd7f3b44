//! Debt insight engine: a fixed, ordered list of heuristic rules over a debt
//! portfolio.
//!
//! Each rule is a pure `fn(&[DebtAccount]) -> Option<DebtInsight>`. Accounts
//! are normalized once, every rule runs, hits are stable-sorted by priority
//! (high, medium, low), so equal priorities keep rule order.

use cardwise_core::{DebtAccount, DebtInsight, DebtSummary, InsightPriority};
use log::debug;
use std::cmp::{Ordering, Reverse};

/// Balance-transfer model: 18 months at 0% recovers ~75% of a year's interest
const BALANCE_TRANSFER_FACTOR: f64 = 0.75;
const HIGH_APR_THRESHOLD: f64 = 15.0;
const EMERGENCY_APR_THRESHOLD: f64 = 25.0;
const UTILIZATION_THRESHOLD: f64 = 0.30;
const REFINANCE_APR_THRESHOLD: f64 = 5.5;
/// Savings from a one-point rate cut, per dollar of balance per year
const REFINANCE_RATE_CUT: f64 = 0.01;
const AVALANCHE_YEARS: f64 = 2.0;
const AVALANCHE_REALIZATION: f64 = 0.30;

type Rule = fn(&[DebtAccount]) -> Option<DebtInsight>;

/// Evaluated in this order after the no-debt short circuit
const RULES: &[Rule] = &[
    high_apr_balance_transfer,
    avalanche_strategy,
    utilization_warning,
    refinance_opportunity,
    emergency_high_apr,
];

/// Turns a debt portfolio into prioritized insights
pub struct DebtInsightEngine;

impl DebtInsightEngine {
    /// Evaluate every rule. Never fails; bad numbers count as 0.
    pub fn evaluate(accounts: &[DebtAccount]) -> Vec<DebtInsight> {
        let accounts: Vec<DebtAccount> = accounts.iter().map(DebtAccount::normalized).collect();

        if !accounts.iter().any(DebtAccount::has_balance) {
            debug!("no balances across {} accounts; debt-free insight only", accounts.len());
            return vec![no_debt()];
        }

        let mut insights: Vec<DebtInsight> = RULES
            .iter()
            .filter_map(|rule| rule(&accounts))
            .inspect(|i| debug!("debt rule hit: {} ({:?})", i.id, i.priority))
            .collect();

        // stable: equal priorities keep rule order
        insights.sort_by_key(|i| Reverse(i.priority.rank()));
        insights
    }

    /// Portfolio totals over normalized accounts
    pub fn summarize(accounts: &[DebtAccount]) -> DebtSummary {
        let accounts: Vec<DebtAccount> = accounts.iter().map(DebtAccount::normalized).collect();

        let total_balance: f64 = accounts.iter().map(|a| a.balance).sum();
        let total_minimum_payment: f64 = accounts.iter().map(|a| a.minimum_payment).sum();

        let revolving: Vec<&DebtAccount> = accounts
            .iter()
            .filter(|a| a.type_contains("credit") && a.known_limit().is_some())
            .collect();
        let credit_utilization = if revolving.is_empty() {
            None
        } else {
            let balance: f64 = revolving.iter().map(|a| a.balance).sum();
            let limit: f64 = revolving.iter().filter_map(|a| a.known_limit()).sum();
            Some(balance / limit)
        };

        DebtSummary {
            total_balance,
            total_minimum_payment,
            weighted_apr: weighted_apr(&accounts),
            credit_utilization,
            accounts_with_balance: accounts.iter().filter(|a| a.has_balance()).count(),
        }
    }

    /// Balance-bearing accounts in avalanche payoff order:
    /// highest APR first, then larger balance, then input order.
    pub fn avalanche_order(accounts: &[DebtAccount]) -> Vec<DebtAccount> {
        let mut order: Vec<DebtAccount> = accounts
            .iter()
            .map(DebtAccount::normalized)
            .filter(DebtAccount::has_balance)
            .collect();
        order.sort_by(avalanche_cmp);
        order
    }
}

fn avalanche_cmp(a: &DebtAccount, b: &DebtAccount) -> Ordering {
    b.apr
        .total_cmp(&a.apr)
        .then_with(|| b.balance.total_cmp(&a.balance))
}

/// Balance-weighted APR; 0 when there is no balance
fn weighted_apr(accounts: &[DebtAccount]) -> f64 {
    let total: f64 = accounts.iter().map(|a| a.balance).sum();
    if total <= 0.0 {
        return 0.0;
    }
    accounts.iter().map(|a| a.apr * a.balance).sum::<f64>() / total
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{} {}", n, one)
    } else {
        format!("{} {}", n, many)
    }
}

#[allow(clippy::too_many_arguments)]
fn insight(
    id: &str,
    category: &str,
    icon: &str,
    priority: InsightPriority,
    title: &str,
    description: String,
    potential_savings: Option<f64>,
    action_items: Vec<String>,
) -> DebtInsight {
    DebtInsight {
        id: id.to_string(),
        category: category.to_string(),
        title: title.to_string(),
        description,
        priority,
        potential_savings,
        action_items,
        icon: icon.to_string(),
    }
}

fn no_debt() -> DebtInsight {
    insight(
        "no_debt",
        "celebration",
        "🎉",
        InsightPriority::Low,
        "You're Debt Free",
        "No outstanding balances. Put the money that would have gone to interest to work.".to_string(),
        None,
        vec![
            "Build or top up an emergency fund covering 3-6 months of expenses".to_string(),
            "Keep paying cards in full each month to stay interest free".to_string(),
            "Increase retirement or investment contributions".to_string(),
        ],
    )
}

fn high_apr_balance_transfer(accounts: &[DebtAccount]) -> Option<DebtInsight> {
    let hits: Vec<&DebtAccount> = accounts
        .iter()
        .filter(|a| a.apr > HIGH_APR_THRESHOLD && a.has_balance())
        .collect();
    if hits.is_empty() {
        return None;
    }

    let balance: f64 = hits.iter().map(|a| a.balance).sum();
    let avg_apr = mean(hits.iter().map(|a| a.apr));
    let savings = balance * (avg_apr / 100.0) * BALANCE_TRANSFER_FACTOR;

    Some(insight(
        "balance_transfer",
        "optimization",
        "💳",
        InsightPriority::High,
        "Balance Transfer Opportunity",
        format!(
            "{} carrying ${:.2} at an average {:.1}% APR. An 18-month 0% APR balance transfer could save about ${:.2} in interest.",
            plural(hits.len(), "account is", "accounts are"),
            balance,
            avg_apr,
            savings
        ),
        Some(savings),
        vec![
            "Compare 0% APR balance transfer offers with 15-21 month promotional periods".to_string(),
            "Check the transfer fee (typically 3-5%) against the interest you would save".to_string(),
            "Schedule payments that clear the transferred balance before the promotion ends".to_string(),
        ],
    ))
}

fn avalanche_strategy(accounts: &[DebtAccount]) -> Option<DebtInsight> {
    let mut order: Vec<&DebtAccount> = accounts.iter().filter(|a| a.has_balance()).collect();
    if order.len() < 2 {
        return None;
    }
    order.sort_by(|a, b| avalanche_cmp(a, b));
    let target = order[0];
    let next = order[1];

    let total: f64 = order.iter().map(|a| a.balance).sum();
    let savings = weighted_apr(accounts) / 100.0 * total * AVALANCHE_YEARS * AVALANCHE_REALIZATION;

    Some(insight(
        "avalanche_strategy",
        "strategy",
        "📉",
        InsightPriority::Medium,
        "Use the Avalanche Method",
        format!(
            "Pay minimums on every account and send extra money to {} ({:.1}% APR) first. Paying off debt in APR order could save roughly ${:.2} over two years.",
            target.name, target.apr, savings
        ),
        Some(savings),
        vec![
            format!("Keep paying the minimum on all {} accounts", order.len()),
            format!("Put every extra dollar toward {}", target.name),
            format!("Once {} is paid off, roll its payment into {}", target.name, next.name),
        ],
    ))
}

fn utilization_warning(accounts: &[DebtAccount]) -> Option<DebtInsight> {
    let flagged: Vec<f64> = accounts
        .iter()
        .filter(|a| a.type_contains("credit"))
        .filter_map(DebtAccount::utilization)
        .filter(|u| *u > UTILIZATION_THRESHOLD)
        .collect();
    if flagged.is_empty() {
        return None;
    }

    let avg = mean(flagged.iter().copied());

    Some(insight(
        "utilization_warning",
        "credit_health",
        "⚠️",
        InsightPriority::Medium,
        "High Credit Utilization",
        format!(
            "{} above 30% utilization (average {:.0}%). High utilization can drag down your credit score.",
            plural(flagged.len(), "credit card is", "credit cards are"),
            avg * 100.0
        ),
        None,
        vec![
            "Pay flagged cards below 30% of their limit, ideally under 10%".to_string(),
            "Pay before the statement closing date so a lower balance gets reported".to_string(),
            "Ask your issuer for a credit limit increase".to_string(),
        ],
    ))
}

fn refinance_opportunity(accounts: &[DebtAccount]) -> Option<DebtInsight> {
    let hits: Vec<&DebtAccount> = accounts
        .iter()
        .filter(|a| (a.type_contains("mortgage") || a.type_contains("home")) && a.apr > REFINANCE_APR_THRESHOLD)
        .collect();
    if hits.is_empty() {
        return None;
    }

    let balance: f64 = hits.iter().map(|a| a.balance).sum();
    let avg_apr = mean(hits.iter().map(|a| a.apr));
    let savings = balance * REFINANCE_RATE_CUT;

    Some(insight(
        "refinance_opportunity",
        "refinance",
        "🏠",
        InsightPriority::Medium,
        "Refinancing Opportunity",
        format!(
            "{} totaling ${:.2} at an average {:.2}% APR. Refinancing about one point lower could save around ${:.2} per year.",
            plural(hits.len(), "home loan", "home loans"),
            balance,
            avg_apr,
            savings
        ),
        Some(savings),
        vec![
            "Get rate quotes from at least three lenders".to_string(),
            "Compare closing costs against the monthly savings to find your break-even point".to_string(),
            "Check whether your credit score qualifies for the best advertised rates".to_string(),
        ],
    ))
}

fn emergency_high_apr(accounts: &[DebtAccount]) -> Option<DebtInsight> {
    let hits: Vec<&DebtAccount> = accounts
        .iter()
        .filter(|a| a.apr > EMERGENCY_APR_THRESHOLD && a.has_balance())
        .collect();
    if hits.is_empty() {
        return None;
    }

    let balance: f64 = hits.iter().map(|a| a.balance).sum();

    Some(insight(
        "emergency_high_apr",
        "urgent",
        "🚨",
        InsightPriority::High,
        "Very High Interest Debt",
        format!(
            "${:.2} is sitting above 25% APR across {}. Interest compounds fast at these rates; treat it as an emergency.",
            balance,
            plural(hits.len(), "account", "accounts")
        ),
        None,
        vec![
            "Stop new charges on these accounts".to_string(),
            "Call the issuer and ask for a lower APR or a hardship program".to_string(),
            "Look into a fixed-rate consolidation loan at a lower rate".to_string(),
        ],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(insights: &[DebtInsight]) -> Vec<&str> {
        insights.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_empty_portfolio_is_debt_free() {
        let out = DebtInsightEngine::evaluate(&[]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "no_debt");
        assert_eq!(out[0].priority, InsightPriority::Low);
    }

    #[test]
    fn test_zero_balances_short_circuit_other_rules() {
        // would trip utilization / refinance if those rules ran
        let accounts = vec![
            DebtAccount::new("Visa", "credit card", 0.0, 29.9).with_credit_limit(1000.0),
            DebtAccount::new("House", "mortgage", 0.0, 7.0),
            DebtAccount::new("Junk", "loan", f64::NAN, 12.0),
        ];
        let out = DebtInsightEngine::evaluate(&accounts);
        assert_eq!(ids(&out), vec!["no_debt"]);
    }

    #[test]
    fn test_two_account_example() {
        let accounts = vec![
            DebtAccount::new("Card A", "Credit Card", 5000.0, 22.0),
            DebtAccount::new("Card B", "Credit Card", 3000.0, 10.0),
        ];
        let out = DebtInsightEngine::evaluate(&accounts);
        assert_eq!(ids(&out), vec!["balance_transfer", "avalanche_strategy"]);

        let bt = &out[0];
        assert_eq!(bt.priority, InsightPriority::High);
        // 5000 x 0.22 x 0.75
        assert!((bt.potential_savings.unwrap() - 825.0).abs() < 1e-9);
        assert!(bt.description.contains("$5000.00"));
        assert!(bt.description.contains("22.0%"));

        let av = &out[1];
        assert_eq!(av.priority, InsightPriority::Medium);
        assert!(av.description.contains("Card A"));
        // weighted apr = (22*5000 + 10*3000) / 8000 = 17.5; 0.175 x 8000 x 2 x 0.3
        assert!((av.potential_savings.unwrap() - 840.0).abs() < 1e-9);
    }

    #[test]
    fn test_avalanche_needs_two_balances() {
        let accounts = vec![
            DebtAccount::new("Only", "loan", 1000.0, 9.0),
            DebtAccount::new("Paid", "loan", 0.0, 30.0),
        ];
        let out = DebtInsightEngine::evaluate(&accounts);
        assert!(out.is_empty());
    }

    #[test]
    fn test_avalanche_tie_break_prefers_larger_balance() {
        let accounts = vec![
            DebtAccount::new("Small", "card", 500.0, 19.0),
            DebtAccount::new("Large", "card", 4000.0, 19.0),
            DebtAccount::new("Low", "card", 9000.0, 4.0),
        ];
        let out = DebtInsightEngine::evaluate(&accounts);
        let av = out.iter().find(|i| i.id == "avalanche_strategy").unwrap();
        assert!(av.description.contains("send extra money to Large"));
        assert_eq!(av.action_items[2], "Once Large is paid off, roll its payment into Small");

        let order: Vec<String> = DebtInsightEngine::avalanche_order(&accounts)
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(order, vec!["Large", "Small", "Low"]);
    }

    #[test]
    fn test_avalanche_full_tie_keeps_input_order() {
        let accounts = vec![
            DebtAccount::new("First", "card", 100.0, 12.0),
            DebtAccount::new("Second", "card", 100.0, 12.0),
        ];
        let order = DebtInsightEngine::avalanche_order(&accounts);
        assert_eq!(order[0].name, "First");
    }

    #[test]
    fn test_utilization_warning() {
        let accounts = vec![
            DebtAccount::new("Visa", "Credit Card", 800.0, 12.0).with_credit_limit(1000.0),
            DebtAccount::new("MC", "credit", 400.0, 12.0).with_credit_limit(1000.0),
            DebtAccount::new("Amex", "Credit Card", 100.0, 12.0).with_credit_limit(1000.0),
            // not a credit account: ignored even though 90% "utilized"
            DebtAccount::new("HELOC", "home equity", 900.0, 5.0).with_credit_limit(1000.0),
            // unknown limit: ignored
            DebtAccount::new("Store", "credit card", 900.0, 12.0),
        ];
        let out = DebtInsightEngine::evaluate(&accounts);
        let u = out.iter().find(|i| i.id == "utilization_warning").unwrap();
        assert!(u.description.starts_with("2 credit cards are"));
        // (0.8 + 0.4) / 2
        assert!(u.description.contains("average 60%"));
        assert_eq!(u.potential_savings, None);
    }

    #[test]
    fn test_exactly_thirty_percent_is_not_flagged() {
        let accounts = vec![DebtAccount::new("Visa", "credit card", 300.0, 10.0).with_credit_limit(1000.0)];
        let out = DebtInsightEngine::evaluate(&accounts);
        assert!(out.iter().all(|i| i.id != "utilization_warning"));
    }

    #[test]
    fn test_refinance_opportunity() {
        let accounts = vec![
            DebtAccount::new("Mortgage", "Mortgage", 300000.0, 6.5),
            DebtAccount::new("HELOC", "Home Equity Line", 20000.0, 8.5),
            DebtAccount::new("Cheap", "mortgage", 100000.0, 3.0),
        ];
        let out = DebtInsightEngine::evaluate(&accounts);
        let r = out.iter().find(|i| i.id == "refinance_opportunity").unwrap();
        assert!((r.potential_savings.unwrap() - 3200.0).abs() < 1e-9);
        assert!(r.description.contains("2 home loans"));
        assert!(r.description.contains("7.50%"));
    }

    #[test]
    fn test_emergency_co_occurs_with_balance_transfer() {
        let accounts = vec![DebtAccount::new("Store Card", "credit", 2000.0, 29.99)];
        let out = DebtInsightEngine::evaluate(&accounts);
        assert_eq!(ids(&out), vec!["balance_transfer", "emergency_high_apr"]);
        assert!(out.iter().all(|i| i.priority == InsightPriority::High));
    }

    #[test]
    fn test_output_sorted_by_priority_with_rule_order_ties() {
        let accounts = vec![
            DebtAccount::new("Visa", "Credit Card", 900.0, 27.0).with_credit_limit(1000.0),
            DebtAccount::new("House", "mortgage", 250000.0, 6.0),
        ];
        let out = DebtInsightEngine::evaluate(&accounts);
        assert_eq!(
            ids(&out),
            vec![
                "balance_transfer",
                "emergency_high_apr",
                "avalanche_strategy",
                "utilization_warning",
                "refinance_opportunity",
            ]
        );
        for w in out.windows(2) {
            assert!(w[0].priority.rank() >= w[1].priority.rank());
        }
    }

    #[test]
    fn test_negative_and_nan_inputs_are_clamped() {
        let accounts = vec![
            DebtAccount::new("Bad APR", "credit", 1000.0, f64::NAN),
            DebtAccount::new("Negative", "credit", -500.0, 30.0),
        ];
        // one balance-bearing account at 0% APR: nothing to say
        let out = DebtInsightEngine::evaluate(&accounts);
        assert!(out.is_empty());
    }

    #[test]
    fn test_evaluate_does_not_mutate_and_is_idempotent() {
        let accounts = vec![
            DebtAccount::new("A", "credit card", 5000.0, 22.0).with_credit_limit(6000.0),
            DebtAccount::new("B", "auto loan", 12000.0, 7.0),
        ];
        let before = accounts.clone();
        let first = DebtInsightEngine::evaluate(&accounts);
        let second = DebtInsightEngine::evaluate(&accounts);
        assert_eq!(first, second);
        assert_eq!(accounts, before);
    }

    #[test]
    fn test_summarize() {
        let accounts = vec![
            DebtAccount::new("Visa", "Credit Card", 1000.0, 20.0)
                .with_credit_limit(4000.0)
                .with_minimum_payment(35.0),
            DebtAccount::new("MC", "credit card", 1000.0, 10.0)
                .with_credit_limit(1000.0)
                .with_minimum_payment(25.0),
            DebtAccount::new("Car", "auto", 0.0, 5.0).with_minimum_payment(-10.0),
        ];
        let s = DebtInsightEngine::summarize(&accounts);
        assert_eq!(s.total_balance, 2000.0);
        assert_eq!(s.total_minimum_payment, 60.0);
        assert!((s.weighted_apr - 15.0).abs() < 1e-9);
        assert_eq!(s.credit_utilization, Some(0.4));
        assert_eq!(s.accounts_with_balance, 2);
    }

    #[test]
    fn test_summarize_empty() {
        let s = DebtInsightEngine::summarize(&[]);
        assert_eq!(s, DebtSummary::default());
    }
}
