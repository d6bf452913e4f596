//! Ledger capability and simulated backend.
//!
//! [`AssetLedger`] is the surface the marketplace needs from a fungible
//! asset: balance and allowance queries plus a spender-driven
//! `transfer_from`. [`SimulatedLedger`] implements it in memory for
//! development and tests, for any number of assets keyed by address.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::address::Address;
use crate::amount::Amount;
use crate::error::{LedgerError, Result};

/// Fungible asset operations used by the marketplace.
///
/// Implementations must be fail-closed: a `transfer_from` that cannot be
/// fully applied returns an error and leaves every balance and allowance
/// unchanged.
pub trait AssetLedger: Send + Sync {
    /// Balance of `holder` in `asset`.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn balance_of(&self, asset: &Address, holder: &Address) -> Result<Amount>;

    /// Amount `holder` has approved `spender` to move out of its `asset` balance.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn allowance(&self, asset: &Address, holder: &Address, spender: &Address) -> Result<Amount>;

    /// Moves `amount` of `asset` from `holder` to `recipient` on behalf of `spender`,
    /// consuming the same amount of allowance.
    ///
    /// # Errors
    ///
    /// Returns error if the allowance or the balance is insufficient.
    fn transfer_from(
        &self,
        asset: &Address,
        spender: &Address,
        holder: &Address,
        recipient: &Address,
        amount: Amount,
    ) -> Result<()>;
}

/// Per-asset balances and allowances.
#[derive(Debug, Default)]
struct SimulatedAsset {
    balances: HashMap<Address, Amount>,
    /// (holder, spender) -> approved amount
    allowances: HashMap<(Address, Address), Amount>,
}

impl SimulatedAsset {
    fn balance(&self, holder: &Address) -> Amount {
        self.balances.get(holder).copied().unwrap_or(Amount::ZERO)
    }

    fn allowance(&self, holder: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(&(holder.clone(), spender.clone()))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    /// Computes both new balances before writing either one.
    fn move_balance(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<()> {
        let have = self.balance(from);
        let debited = have
            .checked_sub(amount)
            .ok_or(LedgerError::insufficient_balance(have, amount))?;
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance(to)
            .checked_add(amount)
            .ok_or_else(|| LedgerError::invalid_amount("recipient balance overflow"))?;

        self.balances.insert(from.clone(), debited);
        self.balances.insert(to.clone(), credited);
        Ok(())
    }
}

/// In-memory multi-asset ledger.
///
/// Assets spring into existence on first use, the way an unfunded account
/// reads as zero on a real chain.
#[derive(Debug, Default)]
pub struct SimulatedLedger {
    assets: Mutex<HashMap<Address, SimulatedAsset>>,
}

impl SimulatedLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` of `asset` to `holder` out of thin air.
    ///
    /// # Errors
    ///
    /// Returns error if the balance would overflow.
    pub fn mint(&self, asset: &Address, holder: &Address, amount: Amount) -> Result<()> {
        let mut assets = self.assets.lock();
        let state = assets.entry(asset.clone()).or_default();
        let balance = state
            .balance(holder)
            .checked_add(amount)
            .ok_or_else(|| LedgerError::invalid_amount("balance overflow"))?;
        state.balances.insert(holder.clone(), balance);

        info!(asset = %asset, holder = %holder, amount = %amount, "mint completed");
        Ok(())
    }

    /// Set the allowance `holder` grants `spender`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Never fails for the simulated backend; the signature matches a real ledger.
    pub fn approve(
        &self,
        asset: &Address,
        holder: &Address,
        spender: &Address,
        amount: Amount,
    ) -> Result<()> {
        let mut assets = self.assets.lock();
        assets
            .entry(asset.clone())
            .or_default()
            .allowances
            .insert((holder.clone(), spender.clone()), amount);

        debug!(asset = %asset, holder = %holder, spender = %spender, amount = %amount, "approval set");
        Ok(())
    }

    /// Transfer directly from `from` to `to`, without touching allowances.
    ///
    /// # Errors
    ///
    /// Returns error if `from` does not hold `amount`.
    pub fn transfer(&self, asset: &Address, from: &Address, to: &Address, amount: Amount) -> Result<()> {
        let mut assets = self.assets.lock();
        assets
            .entry(asset.clone())
            .or_default()
            .move_balance(from, to, amount)?;

        debug!(asset = %asset, from = %from, to = %to, amount = %amount, "transfer completed");
        Ok(())
    }
}

impl AssetLedger for SimulatedLedger {
    fn balance_of(&self, asset: &Address, holder: &Address) -> Result<Amount> {
        let assets = self.assets.lock();
        Ok(assets.get(asset).map_or(Amount::ZERO, |a| a.balance(holder)))
    }

    fn allowance(&self, asset: &Address, holder: &Address, spender: &Address) -> Result<Amount> {
        let assets = self.assets.lock();
        Ok(assets
            .get(asset)
            .map_or(Amount::ZERO, |a| a.allowance(holder, spender)))
    }

    fn transfer_from(
        &self,
        asset: &Address,
        spender: &Address,
        holder: &Address,
        recipient: &Address,
        amount: Amount,
    ) -> Result<()> {
        let mut assets = self.assets.lock();
        let state = assets.entry(asset.clone()).or_default();

        let approved = state.allowance(holder, spender);
        let remaining = approved
            .checked_sub(amount)
            .ok_or(LedgerError::insufficient_allowance(approved, amount))?;

        state.move_balance(holder, recipient, amount)?;
        state
            .allowances
            .insert((holder.clone(), spender.clone()), remaining);

        debug!(
            asset = %asset,
            spender = %spender,
            holder = %holder,
            recipient = %recipient,
            amount = %amount,
            "transfer_from completed"
        );
        Ok(())
    }
}
