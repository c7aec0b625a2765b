//! Balance effects and transaction shape validation.

use crate::error::{LedgerError, LedgerResult};
use std::collections::BTreeMap;
use vestry_model::{RecordId, Transaction, TransactionKind};

/// Checks a transaction's shape before any effect is computed.
///
/// # Errors
///
/// - [`LedgerError::NegativeAmount`] if the magnitude is negative
/// - [`LedgerError::MissingTransferTarget`] for a transfer without a
///   target account
/// - [`LedgerError::UnexpectedTransferTarget`] for a non-transfer
///   carrying a target account
pub fn validate(txn: &Transaction) -> LedgerResult<()> {
    if txn.amount.is_negative() {
        return Err(LedgerError::NegativeAmount(txn.amount));
    }
    match (txn.kind, txn.target_account_id) {
        (TransactionKind::Transfer, None) => Err(LedgerError::MissingTransferTarget),
        (TransactionKind::Income | TransactionKind::Expense, Some(_)) => {
            Err(LedgerError::UnexpectedTransferTarget)
        }
        _ => Ok(()),
    }
}

/// The signed minor-unit deltas a transaction applies per account.
///
/// Deltas that cancel to zero are dropped, so a self-transfer produces
/// an empty effect and an edit that changes nothing composes to the
/// empty effect.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BalanceEffect {
    deltas: BTreeMap<RecordId, i64>,
}

impl BalanceEffect {
    /// The empty effect.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Computes the effect of applying a transaction.
    ///
    /// Callers are expected to have run [`validate`] first; a transfer
    /// without a target degrades to the source debit alone.
    #[must_use]
    pub fn of(txn: &Transaction) -> Self {
        let magnitude = txn.amount.minor();
        let mut effect = Self::empty();
        match txn.kind {
            TransactionKind::Income => effect.add(txn.account_id, magnitude),
            TransactionKind::Expense => effect.add(txn.account_id, -magnitude),
            TransactionKind::Transfer => {
                effect.add(txn.account_id, -magnitude);
                if let Some(target) = txn.target_account_id {
                    effect.add(target, magnitude);
                }
            }
        }
        effect
    }

    /// Computes the effect of reverting a transaction.
    #[must_use]
    pub fn revert_of(txn: &Transaction) -> Self {
        Self::of(txn).inverted()
    }

    /// Computes the net effect of editing `old` into `new`:
    /// revert the old entry, then apply the new one.
    ///
    /// Old and new may reference entirely different accounts; the
    /// result carries deltas for every account either version touches.
    #[must_use]
    pub fn edit(old: &Transaction, new: &Transaction) -> Self {
        Self::revert_of(old).combined(Self::of(new))
    }

    /// Returns the exact negation of this effect.
    #[must_use]
    pub fn inverted(&self) -> Self {
        Self {
            deltas: self.deltas.iter().map(|(id, d)| (*id, -d)).collect(),
        }
    }

    /// Merges another effect into this one, summing per-account deltas.
    #[must_use]
    pub fn combined(mut self, other: Self) -> Self {
        for (id, delta) in other.deltas {
            self.add(id, delta);
        }
        self
    }

    /// The delta for one account (zero when untouched).
    #[must_use]
    pub fn delta_for(&self, account_id: RecordId) -> i64 {
        self.deltas.get(&account_id).copied().unwrap_or(0)
    }

    /// Iterates over `(account_id, delta)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (RecordId, i64)> + '_ {
        self.deltas.iter().map(|(id, d)| (*id, *d))
    }

    /// The accounts this effect touches.
    pub fn accounts(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.deltas.keys().copied()
    }

    /// Returns true if no account is touched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    /// Sum of all deltas. Zero for every transfer (conservation).
    #[must_use]
    pub fn total(&self) -> i64 {
        self.deltas.values().sum()
    }

    // Sums clamp at the i64 bounds instead of wrapping; callers that
    // apply deltas to balances still do so with checked arithmetic.
    fn add(&mut self, account_id: RecordId, delta: i64) {
        let entry = self.deltas.entry(account_id).or_insert(0);
        *entry = entry.saturating_add(delta);
        if *entry == 0 {
            self.deltas.remove(&account_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use vestry_model::Amount;

    fn txn(kind: TransactionKind, minor: i64, account: RecordId) -> Transaction {
        Transaction::new(account, kind, Amount::from_minor(minor), Utc::now())
    }

    #[test]
    fn income_credits_source() {
        let account = RecordId::new();
        let effect = BalanceEffect::of(&txn(TransactionKind::Income, 1000, account));
        assert_eq!(effect.delta_for(account), 1000);
        assert_eq!(effect.total(), 1000);
    }

    #[test]
    fn expense_debits_source() {
        let account = RecordId::new();
        let effect = BalanceEffect::of(&txn(TransactionKind::Expense, 1000, account));
        assert_eq!(effect.delta_for(account), -1000);
    }

    #[test]
    fn transfer_moves_between_accounts() {
        let source = RecordId::new();
        let target = RecordId::new();
        let transfer = txn(TransactionKind::Transfer, 30_000, source).with_target(target);

        let effect = BalanceEffect::of(&transfer);
        assert_eq!(effect.delta_for(source), -30_000);
        assert_eq!(effect.delta_for(target), 30_000);
        assert_eq!(effect.total(), 0);
    }

    #[test]
    fn self_transfer_nets_to_nothing() {
        let account = RecordId::new();
        let transfer = txn(TransactionKind::Transfer, 500, account).with_target(account);
        assert!(BalanceEffect::of(&transfer).is_empty());
    }

    #[test]
    fn revert_is_exact_negation() {
        let source = RecordId::new();
        let target = RecordId::new();
        let transfer = txn(TransactionKind::Transfer, 777, source).with_target(target);

        let applied = BalanceEffect::of(&transfer);
        let reverted = BalanceEffect::revert_of(&transfer);
        assert!(applied.combined(reverted).is_empty());
    }

    #[test]
    fn edit_touches_old_and_new_accounts() {
        let a = RecordId::new();
        let b = RecordId::new();
        let c = RecordId::new();
        let d = RecordId::new();

        let old = txn(TransactionKind::Transfer, 100, a).with_target(b);
        let new = txn(TransactionKind::Transfer, 250, c).with_target(d);

        let effect = BalanceEffect::edit(&old, &new);
        assert_eq!(effect.delta_for(a), 100);
        assert_eq!(effect.delta_for(b), -100);
        assert_eq!(effect.delta_for(c), -250);
        assert_eq!(effect.delta_for(d), 250);
        assert_eq!(effect.total(), 0);
    }

    #[test]
    fn edit_to_identical_entry_is_empty() {
        let account = RecordId::new();
        let entry = txn(TransactionKind::Expense, 4200, account);
        assert!(BalanceEffect::edit(&entry, &entry).is_empty());
    }

    #[test]
    fn edit_amount_only() {
        // Transfer A->B of 300.00 edited down to 100.00.
        let a = RecordId::new();
        let b = RecordId::new();
        let old = txn(TransactionKind::Transfer, 30_000, a).with_target(b);
        let mut new = old.clone();
        new.amount = Amount::from_minor(10_000);

        let effect = BalanceEffect::edit(&old, &new);
        assert_eq!(effect.delta_for(a), 20_000);
        assert_eq!(effect.delta_for(b), -20_000);
    }

    #[test]
    fn extreme_delta_sums_clamp_instead_of_wrapping() {
        let account = RecordId::new();
        let huge = txn(TransactionKind::Income, i64::MAX, account);

        let doubled = BalanceEffect::of(&huge).combined(BalanceEffect::of(&huge));
        assert_eq!(doubled.delta_for(account), i64::MAX);

        let negated = BalanceEffect::revert_of(&huge).combined(BalanceEffect::revert_of(&huge));
        assert_eq!(negated.delta_for(account), i64::MIN);
    }

    #[test]
    fn validate_rejects_bad_shapes() {
        let account = RecordId::new();

        let mut negative = txn(TransactionKind::Income, 100, account);
        negative.amount = Amount::from_minor(-100);
        assert_eq!(
            validate(&negative),
            Err(LedgerError::NegativeAmount(Amount::from_minor(-100)))
        );

        let transfer_without_target = txn(TransactionKind::Transfer, 100, account);
        assert_eq!(
            validate(&transfer_without_target),
            Err(LedgerError::MissingTransferTarget)
        );

        let expense_with_target =
            txn(TransactionKind::Expense, 100, account).with_target(RecordId::new());
        assert_eq!(
            validate(&expense_with_target),
            Err(LedgerError::UnexpectedTransferTarget)
        );

        let ok = txn(TransactionKind::Transfer, 100, account).with_target(RecordId::new());
        assert!(validate(&ok).is_ok());
    }
}
