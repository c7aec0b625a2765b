//! Proptest strategies for record drafts.

use proptest::prelude::*;
use vestry_core::{AccountDraft, CategoryDraft};
use vestry_model::{AccountKind, Amount, CategoryKind, TransactionKind};

/// Non-negative amounts up to 100,000.00 in minor units.
pub fn amount_strategy() -> impl Strategy<Value = Amount> {
    (0i64..=10_000_000).prop_map(Amount::from_minor)
}

/// Short human-looking record names.
pub fn name_strategy() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{2,12}( [a-z]{2,8})?"
}

/// Any account kind.
pub fn account_kind_strategy() -> impl Strategy<Value = AccountKind> {
    prop_oneof![
        Just(AccountKind::Checking),
        Just(AccountKind::Savings),
        Just(AccountKind::Credit),
        Just(AccountKind::Cash),
    ]
}

/// Any transaction kind.
pub fn transaction_kind_strategy() -> impl Strategy<Value = TransactionKind> {
    prop_oneof![
        Just(TransactionKind::Income),
        Just(TransactionKind::Expense),
        Just(TransactionKind::Transfer),
    ]
}

/// Any category kind.
pub fn category_kind_strategy() -> impl Strategy<Value = CategoryKind> {
    prop_oneof![Just(CategoryKind::Income), Just(CategoryKind::Expense)]
}

/// Account drafts with bounded opening balances.
pub fn account_draft_strategy() -> impl Strategy<Value = AccountDraft> {
    (name_strategy(), account_kind_strategy(), amount_strategy()).prop_map(
        |(name, kind, initial_balance)| AccountDraft {
            name,
            kind,
            initial_balance,
        },
    )
}

/// Category drafts with hex colors.
pub fn category_draft_strategy() -> impl Strategy<Value = CategoryDraft> {
    (name_strategy(), category_kind_strategy(), "#[0-9a-f]{6}").prop_map(
        |(name, kind, color)| CategoryDraft { name, kind, color },
    )
}
