use anchor_lang::prelude::*;

use crate::errors::VaultError;
use crate::math::{mul_div, Rounding};

/// Side of a claim the caller fixes; the vault derives the other one
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClaimAmount {
    Assets(u64),
    Shares(u64),
}

impl ClaimAmount {
    pub fn is_zero(&self) -> bool {
        matches!(self, ClaimAmount::Assets(0) | ClaimAmount::Shares(0))
    }
}

/// One direction of a controller's request
///
/// Deposit direction: `pending`/`claimable` in assets, `claimable_out` in shares.
/// Redeem direction: `pending`/`claimable` in shares, `claimable_out` in assets.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Request {
    /// Requested, not yet fulfilled
    pub pending: u64,        // 8 bytes
    /// Fulfilled, awaiting claim
    pub claimable: u64,      // 8 bytes
    /// Counter-amount owed for `claimable`, fixed at fulfillment
    pub claimable_out: u64,  // 8 bytes
}

impl Request {
    fn add_pending(&mut self, amount: u64) -> Result<()> {
        self.pending = self
            .pending
            .checked_add(amount)
            .ok_or(VaultError::MathOverflow)?;
        Ok(())
    }

    fn fulfill(&mut self, amount: u64, amount_out: u64, strict: bool) -> Result<()> {
        self.pending = if strict {
            self.pending
                .checked_sub(amount)
                .ok_or(VaultError::InsufficientPending)?
        } else {
            self.pending.saturating_sub(amount)
        };
        self.claimable = self
            .claimable
            .checked_add(amount)
            .ok_or(VaultError::MathOverflow)?;
        self.claimable_out = self
            .claimable_out
            .checked_add(amount_out)
            .ok_or(VaultError::MathOverflow)?;
        Ok(())
    }

    fn consume(&mut self, amount: u64, amount_out: u64) -> Result<()> {
        require!(
            amount <= self.claimable && amount_out <= self.claimable_out,
            VaultError::InsufficientClaimable
        );
        self.claimable -= amount;
        self.claimable_out -= amount_out;
        Ok(())
    }

    /// Counter-amount for part of `claimable` at the fulfillment rate
    fn out_for(&self, amount: u64, rounding: Rounding) -> Result<u64> {
        if amount == self.claimable {
            return Ok(self.claimable_out);
        }
        mul_div(
            amount,
            self.claimable_out as u128,
            self.claimable as u128,
            rounding,
        )
    }

    /// Part of `claimable` covering `amount_out` at the fulfillment rate
    fn in_for(&self, amount_out: u64, rounding: Rounding) -> Result<u64> {
        if amount_out == self.claimable_out {
            return Ok(self.claimable);
        }
        mul_div(
            amount_out,
            self.claimable as u128,
            self.claimable_out as u128,
            rounding,
        )
    }
}

/// Per-controller request ledger
///
/// Pure bookkeeping: no CPIs, every transition checked.
#[account]
#[derive(Default)]
pub struct ControllerRequests {
    /// Vault this ledger belongs to
    pub vault: Pubkey,       // 32 bytes

    /// Identity allowed to claim (directly or through an operator)
    pub controller: Pubkey,  // 32 bytes

    pub deposit: Request,    // 24 bytes
    pub redeem: Request,     // 24 bytes

    /// Bump seed for PDA
    pub bump: u8,            // 1 byte
}

impl ControllerRequests {
    pub fn record_pending_deposit(&mut self, assets: u64) -> Result<()> {
        self.deposit.add_pending(assets)
    }

    pub fn record_pending_redeem(&mut self, shares: u64) -> Result<()> {
        self.redeem.add_pending(shares)
    }

    pub fn fulfill_deposit(&mut self, assets_fulfilled: u64, shares_minted: u64) -> Result<()> {
        self.deposit.fulfill(assets_fulfilled, shares_minted, true)
    }

    /// `strict = false` clamps the pending subtraction at zero
    ///
    /// Claimable shares must stay backed by shares in escrow, so instruction
    /// handlers only ever fulfil strictly.
    pub fn fulfill_redeem(
        &mut self,
        shares_fulfilled: u64,
        assets_withdrawn: u64,
        strict: bool,
    ) -> Result<()> {
        self.redeem.fulfill(shares_fulfilled, assets_withdrawn, strict)
    }

    pub fn consume_claimable_deposit(&mut self, assets: u64, shares: u64) -> Result<()> {
        self.deposit.consume(assets, shares)
    }

    pub fn consume_claimable_redeem(&mut self, assets: u64, shares: u64) -> Result<()> {
        self.redeem.consume(shares, assets)
    }

    /// Upper bound for `deposit(assets)`
    pub fn max_deposit(&self) -> u64 {
        self.deposit.claimable
    }

    /// Upper bound for `mint(shares)`
    pub fn max_mint(&self) -> u64 {
        self.deposit.claimable_out
    }

    /// Claim `assets` of the deposit bucket; returns shares to mint (rounded down)
    pub fn claim_deposit(&mut self, assets: u64) -> Result<u64> {
        require!(assets <= self.max_deposit(), VaultError::ExceedsMaxDeposit);
        let shares = self.deposit.out_for(assets, Rounding::Floor)?;
        self.consume_claimable_deposit(assets, shares)?;
        Ok(shares)
    }

    /// Claim `shares` of the deposit bucket; returns assets consumed (rounded up)
    pub fn claim_mint(&mut self, shares: u64) -> Result<u64> {
        require!(shares <= self.max_mint(), VaultError::ExceedsMaxMint);
        let assets = self.deposit.in_for(shares, Rounding::Ceil)?;
        self.consume_claimable_deposit(assets, shares)?;
        Ok(assets)
    }

    /// Claim `shares` of the redeem bucket; returns assets owed (rounded down)
    ///
    /// `max_redeem` is computed by the caller, who knows the idle balance.
    pub fn claim_redeem(&mut self, shares: u64, max_redeem: u64) -> Result<u64> {
        require!(shares <= max_redeem, VaultError::ExceedsMaxRedeem);
        let assets = self.redeem.out_for(shares, Rounding::Floor)?;
        self.consume_claimable_redeem(assets, shares)?;
        Ok(assets)
    }

    /// Claim `assets` of the redeem bucket; returns shares burned (rounded up)
    pub fn claim_withdraw(&mut self, assets: u64, max_withdraw: u64) -> Result<u64> {
        require!(assets <= max_withdraw, VaultError::ExceedsMaxWithdraw);
        let shares = self.redeem.in_for(assets, Rounding::Ceil)?;
        self.consume_claimable_redeem(assets, shares)?;
        Ok(shares)
    }
}
