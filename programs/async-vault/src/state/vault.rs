use anchor_lang::prelude::*;

use crate::errors::VaultError;
use crate::math::{deviation_bps, mul_div, Rounding};
use crate::state::{ClaimAmount, ControllerRequests};

/// Roles checked by privileged instructions
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Installs hooks, manages registries, updates configuration
    Admin,
    /// Settles or proposes total assets, fulfils requests
    Manager,
    /// Cancels settlement proposals
    Guardian,
    /// Pauses and unpauses the vault
    EmergencyAdmin,
    /// Triggers hook-chain execution
    Executor,
}

/// How the manager reports external valuation
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SettlementMode {
    /// `settle_total_assets` applies at once, bounded by the deviation guard
    #[default]
    Immediate,
    /// `propose_settlement` → cooldown → `execute_proposal`
    Proposal,
}

/// How deposit and redeem requests move from pending to claimable
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FulfillmentMode {
    /// Whitelisted depositors only; fulfilled inside the request
    #[default]
    Auto,
    /// Requests stay pending until the manager fulfils them
    Manager,
}

/// A settlement waiting out its cooldown
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SettlementProposal {
    pub total_external_assets: u64, // 8 bytes
    pub merkle_root: [u8; 32],      // 32 bytes
    /// Zero when no proposal is live
    pub execute_after: i64,         // 8 bytes
}

impl SettlementProposal {
    pub fn is_active(&self) -> bool {
        self.execute_after != 0
    }
}

/// Global vault state: roles, configuration and the virtual accounting figures
///
/// Security considerations:
/// - Roles stored in state (not instruction args)
/// - `virtual_total_assets` only moves on claims and settlement
/// - Bumps stored for efficient PDA signing
#[account]
#[derive(Default)]
pub struct VaultState {
    /// Admin: hooks, registries, configuration
    pub authority: Pubkey,                  // 32 bytes
    pub manager: Pubkey,                    // 32 bytes
    pub guardian: Pubkey,                   // 32 bytes
    pub emergency_admin: Pubkey,            // 32 bytes
    pub executor: Pubkey,                   // 32 bytes

    /// Mint of the underlying asset token
    pub asset_mint: Pubkey,                 // 32 bytes

    /// Mint of the vault share token
    pub share_mint: Pubkey,                 // 32 bytes

    /// Self-reported value of everything under management
    pub virtual_total_assets: u64,          // 8 bytes

    /// Assets held for deposit requests that have not been claimed yet
    pub total_pending_deposit_assets: u64,  // 8 bytes

    /// Shares outstanding, escrowed redeem shares included
    pub total_shares: u64,                  // 8 bytes

    /// Decimals of both the asset and the share mint
    pub decimals: u8,                       // 1 byte

    pub paused: bool,                       // 1 byte

    /// Zero disables the settlement deviation guard
    pub max_allowed_deviation_bps: u16,     // 2 bytes

    /// Root attesting the latest external holdings breakdown
    pub merkle_root: [u8; 32],              // 32 bytes

    pub settlement_mode: SettlementMode,    // 1 byte
    pub fulfillment_mode: FulfillmentMode,  // 1 byte

    /// Seconds between proposal and execution
    pub cooldown_period: i64,               // 8 bytes

    pub proposal: SettlementProposal,       // 48 bytes

    pub last_settlement_ts: i64,            // 8 bytes

    /// Bump seed for vault state PDA
    pub bump: u8,                           // 1 byte

    /// Bump seed for share mint PDA
    pub share_bump: u8,                     // 1 byte

    /// Bump seed for vault authority PDA
    pub authority_bump: u8,                 // 1 byte

    // Padding for future upgrades
    pub _reserved: [u8; 32],                // 32 bytes
}

impl VaultState {
    pub fn role_holder(&self, role: Role) -> Pubkey {
        match role {
            Role::Admin => self.authority,
            Role::Manager => self.manager,
            Role::Guardian => self.guardian,
            Role::EmergencyAdmin => self.emergency_admin,
            Role::Executor => self.executor,
        }
    }

    pub fn set_role_holder(&mut self, role: Role, holder: Pubkey) {
        match role {
            Role::Admin => self.authority = holder,
            Role::Manager => self.manager = holder,
            Role::Guardian => self.guardian = holder,
            Role::EmergencyAdmin => self.emergency_admin = holder,
            Role::Executor => self.executor = holder,
        }
    }

    /// Fails unless `who` currently holds `role`
    pub fn check_role(&self, role: Role, who: &Pubkey) -> Result<()> {
        require_keys_eq!(self.role_holder(role), *who, VaultError::Unauthorized);
        Ok(())
    }

    pub fn require_not_paused(&self) -> Result<()> {
        require!(!self.paused, VaultError::VaultPaused);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Share accounting
    // -------------------------------------------------------------------------

    /// shares = assets * (total_shares + 1) / (virtual_total_assets + 1)
    ///
    /// The +1 offset keeps an empty vault at 1:1 and blunts donation-style
    /// inflation of the share price.
    pub fn convert_to_shares_rounded(&self, assets: u64, rounding: Rounding) -> Result<u64> {
        mul_div(
            assets,
            self.total_shares as u128 + 1,
            self.virtual_total_assets as u128 + 1,
            rounding,
        )
    }

    /// assets = shares * (virtual_total_assets + 1) / (total_shares + 1)
    pub fn convert_to_assets_rounded(&self, shares: u64, rounding: Rounding) -> Result<u64> {
        mul_div(
            shares,
            self.virtual_total_assets as u128 + 1,
            self.total_shares as u128 + 1,
            rounding,
        )
    }

    /// Shares minted for `assets`, rounded down
    pub fn convert_to_shares(&self, assets: u64) -> Result<u64> {
        self.convert_to_shares_rounded(assets, Rounding::Floor)
    }

    /// Assets paid for `shares`, rounded down
    pub fn convert_to_assets(&self, shares: u64) -> Result<u64> {
        self.convert_to_assets_rounded(shares, Rounding::Floor)
    }

    /// Asset value of one whole share
    pub fn share_price(&self) -> Result<u64> {
        let one_share = 10u64
            .checked_pow(self.decimals as u32)
            .ok_or(error!(VaultError::MathOverflow))?;
        self.convert_to_assets(one_share)
    }

    /// Held balance not promised to unclaimed deposit requests
    ///
    /// Floors at zero while strategies hold part of the pending deposits.
    pub fn total_idle(&self, asset_balance: u64) -> u64 {
        asset_balance.saturating_sub(self.total_pending_deposit_assets)
    }

    /// Claimable redeem shares, capped by what idle assets can pay
    pub fn max_redeem(&self, requests: &ControllerRequests, asset_balance: u64) -> Result<u64> {
        let idle_shares = self.convert_to_shares(self.total_idle(asset_balance))?;
        Ok(requests.redeem.claimable.min(idle_shares))
    }

    /// Claimable redeem assets, capped by idle assets
    pub fn max_withdraw(&self, requests: &ControllerRequests, asset_balance: u64) -> u64 {
        requests
            .redeem
            .claimable_out
            .min(self.total_idle(asset_balance))
    }

    pub fn preview_deposit(&self, _assets: u64) -> Result<u64> {
        err!(VaultError::AsyncPreviewUnsupported)
    }

    pub fn preview_mint(&self, _shares: u64) -> Result<u64> {
        err!(VaultError::AsyncPreviewUnsupported)
    }

    pub fn preview_withdraw(&self, _assets: u64) -> Result<u64> {
        err!(VaultError::AsyncPreviewUnsupported)
    }

    pub fn preview_redeem(&self, _shares: u64) -> Result<u64> {
        err!(VaultError::AsyncPreviewUnsupported)
    }

    // -------------------------------------------------------------------------
    // Bookkeeping driven by the async protocol
    // -------------------------------------------------------------------------

    pub fn record_deposit_request(&mut self, assets: u64) -> Result<()> {
        self.total_pending_deposit_assets = self
            .total_pending_deposit_assets
            .checked_add(assets)
            .ok_or(VaultError::MathOverflow)?;
        Ok(())
    }

    /// Claimed deposit: assets join the virtual total, shares are minted
    pub fn record_deposit_claim(&mut self, assets: u64, shares: u64) -> Result<()> {
        self.total_pending_deposit_assets = self
            .total_pending_deposit_assets
            .checked_sub(assets)
            .ok_or(VaultError::MathOverflow)?;
        self.virtual_total_assets = self
            .virtual_total_assets
            .checked_add(assets)
            .ok_or(VaultError::MathOverflow)?;
        self.total_shares = self
            .total_shares
            .checked_add(shares)
            .ok_or(VaultError::MathOverflow)?;
        Ok(())
    }

    /// Claimed redemption: assets leave the virtual total, escrowed shares burn
    pub fn record_redeem_claim(&mut self, assets: u64, shares: u64) -> Result<()> {
        self.virtual_total_assets = self
            .virtual_total_assets
            .checked_sub(assets)
            .ok_or(VaultError::MathOverflow)?;
        self.total_shares = self
            .total_shares
            .checked_sub(shares)
            .ok_or(VaultError::MathOverflow)?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Request lifecycle, shared by the instruction handlers
    // -------------------------------------------------------------------------

    /// Record a deposit request; in auto mode fulfil it at the current rate
    ///
    /// Returns the shares fixed by an auto fulfilment.
    pub fn process_deposit_request(
        &mut self,
        requests: &mut ControllerRequests,
        assets: u64,
    ) -> Result<Option<u64>> {
        require!(assets > 0, VaultError::ZeroAmount);
        self.require_not_paused()?;

        self.record_deposit_request(assets)?;
        requests.record_pending_deposit(assets)?;

        if self.fulfillment_mode != FulfillmentMode::Auto {
            return Ok(None);
        }
        let shares = self.convert_to_shares(assets)?;
        requests.fulfill_deposit(assets, shares)?;
        Ok(Some(shares))
    }

    /// Record a redeem request for escrowed shares; in auto mode fulfil it
    ///
    /// Returns the assets fixed by an auto fulfilment.
    pub fn process_redeem_request(
        &self,
        requests: &mut ControllerRequests,
        shares: u64,
    ) -> Result<Option<u64>> {
        require!(shares > 0, VaultError::ZeroAmount);
        self.require_not_paused()?;

        requests.record_pending_redeem(shares)?;

        if self.fulfillment_mode != FulfillmentMode::Auto {
            return Ok(None);
        }
        let assets = self.convert_to_assets(shares)?;
        requests.fulfill_redeem(shares, assets, true)?;
        Ok(Some(assets))
    }

    /// Manager fulfilment of pending deposit assets; returns shares fixed
    pub fn process_deposit_fulfillment(
        &self,
        requests: &mut ControllerRequests,
        assets: u64,
    ) -> Result<u64> {
        self.require_not_paused()?;
        self.require_fulfillment_mode(FulfillmentMode::Manager)?;

        let shares = self.convert_to_shares(assets)?;
        requests.fulfill_deposit(assets, shares)?;
        Ok(shares)
    }

    /// Manager fulfilment of pending redeem shares; returns assets fixed
    ///
    /// Always strict: claimable shares never exceed what the controller put
    /// in escrow, so a claim cannot burn another controller's shares.
    pub fn process_redeem_fulfillment(
        &self,
        requests: &mut ControllerRequests,
        shares: u64,
    ) -> Result<u64> {
        self.require_not_paused()?;
        self.require_fulfillment_mode(FulfillmentMode::Manager)?;

        let assets = self.convert_to_assets(shares)?;
        requests.fulfill_redeem(shares, assets, true)?;
        Ok(assets)
    }

    /// `deposit` / `mint` bookkeeping; returns (assets, shares) to mint
    pub fn process_deposit_claim(
        &mut self,
        requests: &mut ControllerRequests,
        amount: ClaimAmount,
    ) -> Result<(u64, u64)> {
        require!(!amount.is_zero(), VaultError::ZeroAmount);
        self.require_not_paused()?;

        let (assets, shares) = match amount {
            ClaimAmount::Assets(assets) => (assets, requests.claim_deposit(assets)?),
            ClaimAmount::Shares(shares) => (requests.claim_mint(shares)?, shares),
        };
        self.record_deposit_claim(assets, shares)?;
        Ok((assets, shares))
    }

    /// `redeem` / `withdraw` bookkeeping against the custody balance;
    /// returns (assets to pay, escrowed shares to burn)
    pub fn process_redeem_claim(
        &mut self,
        requests: &mut ControllerRequests,
        amount: ClaimAmount,
        asset_balance: u64,
    ) -> Result<(u64, u64)> {
        require!(!amount.is_zero(), VaultError::ZeroAmount);
        self.require_not_paused()?;

        let (assets, shares) = match amount {
            ClaimAmount::Shares(shares) => {
                let max_redeem = self.max_redeem(requests, asset_balance)?;
                (requests.claim_redeem(shares, max_redeem)?, shares)
            }
            ClaimAmount::Assets(assets) => {
                let max_withdraw = self.max_withdraw(requests, asset_balance);
                (assets, requests.claim_withdraw(assets, max_withdraw)?)
            }
        };
        // The bucket rate can pay more per share than today's rate
        require!(
            assets <= self.total_idle(asset_balance),
            VaultError::InsufficientIdle
        );
        self.record_redeem_claim(assets, shares)?;
        Ok((assets, shares))
    }

    // -------------------------------------------------------------------------
    // Settlement
    // -------------------------------------------------------------------------

    pub fn require_settlement_mode(&self, mode: SettlementMode) -> Result<()> {
        require!(self.settlement_mode == mode, VaultError::WrongSettlementMode);
        Ok(())
    }

    pub fn require_fulfillment_mode(&self, mode: FulfillmentMode) -> Result<()> {
        require!(self.fulfillment_mode == mode, VaultError::WrongFulfillmentMode);
        Ok(())
    }

    /// Immediate settlement bounded by `max_allowed_deviation_bps`
    ///
    /// The bound is skipped while the vault reports zero assets, so the very
    /// first settlement can set any value.
    pub fn settle_total_assets(
        &mut self,
        new_total_assets: u64,
        new_merkle_root: [u8; 32],
        now: i64,
    ) -> Result<()> {
        if self.max_allowed_deviation_bps != 0 && self.virtual_total_assets > 0 {
            let deviation = deviation_bps(self.virtual_total_assets, new_total_assets)?;
            require!(
                deviation <= self.max_allowed_deviation_bps as u128,
                VaultError::DeviationExceeded
            );
        }

        self.virtual_total_assets = new_total_assets;
        self.merkle_root = new_merkle_root;
        self.last_settlement_ts = now;
        Ok(())
    }

    /// Store a proposal, replacing any unexecuted one; returns `execute_after`
    pub fn propose_settlement(
        &mut self,
        total_external_assets: u64,
        merkle_root: [u8; 32],
        now: i64,
    ) -> Result<i64> {
        let execute_after = now
            .checked_add(self.cooldown_period)
            .ok_or(VaultError::MathOverflow)?;
        // execute_after doubles as the "live" flag
        require!(execute_after > 0, VaultError::InvalidCooldown);

        self.proposal = SettlementProposal {
            total_external_assets,
            merkle_root,
            execute_after,
        };
        Ok(execute_after)
    }

    pub fn cancel_proposal(&mut self) -> Result<SettlementProposal> {
        require!(self.proposal.is_active(), VaultError::NoActiveProposal);
        let cancelled = self.proposal;
        self.proposal = SettlementProposal::default();
        Ok(cancelled)
    }

    pub fn execute_proposal(&mut self, now: i64) -> Result<SettlementProposal> {
        require!(self.proposal.is_active(), VaultError::NoActiveProposal);
        require!(
            now >= self.proposal.execute_after,
            VaultError::CooldownNotElapsed
        );

        let executed = self.proposal;
        self.virtual_total_assets = executed.total_external_assets;
        self.merkle_root = executed.merkle_root;
        self.last_settlement_ts = now;
        self.proposal = SettlementProposal::default();
        Ok(executed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_vault(virtual_total_assets: u64, total_shares: u64) -> VaultState {
        VaultState {
            virtual_total_assets,
            total_shares,
            decimals: 6,
            ..Default::default()
        }
    }

    #[test]
    fn test_first_deposit() {
        let vault = mock_vault(0, 0);
        assert_eq!(vault.convert_to_shares(1000).unwrap(), 1000);
    }

    #[test]
    fn test_subsequent_deposit_equal_ratio() {
        let vault = mock_vault(1000, 1000);
        assert_eq!(vault.convert_to_shares(500).unwrap(), 500);
    }

    #[test]
    fn test_subsequent_deposit_with_profit() {
        // 2000 assets backing 1000 shares
        let vault = mock_vault(2000, 1000);
        // 500 * 1001 / 2001 = 250.12...
        assert_eq!(vault.convert_to_shares(500).unwrap(), 250);
        assert_eq!(vault.convert_to_shares_rounded(500, Rounding::Ceil).unwrap(), 251);
    }

    #[test]
    fn test_convert_to_assets() {
        let vault = mock_vault(2000, 1000);
        // 500 * 2001 / 1001 = 999.5...
        assert_eq!(vault.convert_to_assets(500).unwrap(), 999);
        assert_eq!(vault.convert_to_assets_rounded(500, Rounding::Ceil).unwrap(), 1000);
    }

    #[test]
    fn test_share_price() {
        let vault = mock_vault(2_000_000, 1_000_000);
        // 1_000_000 * 2_000_001 / 1_000_001
        assert_eq!(vault.share_price().unwrap(), 1_999_999);
        assert_eq!(mock_vault(0, 0).share_price().unwrap(), 1_000_000);
    }

    #[test]
    fn test_conversion_overflow_fails() {
        let vault = mock_vault(0, u64::MAX);
        assert!(vault.convert_to_shares(u64::MAX).is_err());
    }

    #[test]
    fn test_total_idle_floors_at_zero() {
        let mut vault = mock_vault(0, 0);
        vault.total_pending_deposit_assets = 300;
        assert_eq!(vault.total_idle(1000), 700);
        assert_eq!(vault.total_idle(200), 0);
    }

    #[test]
    fn test_previews_unsupported() {
        let vault = mock_vault(1000, 1000);
        assert!(vault.preview_deposit(1).is_err());
        assert!(vault.preview_mint(1).is_err());
        assert!(vault.preview_withdraw(1).is_err());
        assert!(vault.preview_redeem(1).is_err());
    }

    #[test]
    fn test_role_holders() {
        let manager = Pubkey::new_unique();
        let mut vault = mock_vault(0, 0);
        vault.set_role_holder(Role::Manager, manager);

        assert_eq!(vault.role_holder(Role::Manager), manager);
        assert_eq!(vault.manager, manager);
        assert_ne!(vault.role_holder(Role::Guardian), manager);

        assert!(vault.check_role(Role::Manager, &manager).is_ok());
        assert!(vault.check_role(Role::Executor, &manager).is_err());
    }

    #[test]
    fn test_max_redeem_capped_by_idle() {
        let mut vault = mock_vault(1000, 1000);
        let mut requests = ControllerRequests::default();
        requests.record_pending_redeem(500).unwrap();
        requests.fulfill_redeem(500, 500, true).unwrap();

        // Plenty of idle: the claimable bucket is the limit
        assert_eq!(vault.max_redeem(&requests, 1000).unwrap(), 500);
        assert_eq!(vault.max_withdraw(&requests, 1000), 500);

        // 800 deployed to strategies, 100 of the rest promised to a deposit
        vault.total_pending_deposit_assets = 100;
        assert_eq!(vault.max_redeem(&requests, 300).unwrap(), 200);
        assert_eq!(vault.max_withdraw(&requests, 300), 200);
    }

    #[test]
    fn test_deviation_guard() {
        let mut vault = mock_vault(1000, 1000);
        vault.max_allowed_deviation_bps = 500;

        assert!(vault.settle_total_assets(1040, [1; 32], 10).is_ok());
        assert_eq!(vault.virtual_total_assets, 1040);
        assert_eq!(vault.merkle_root, [1; 32]);
        assert_eq!(vault.last_settlement_ts, 10);

        vault.virtual_total_assets = 1000;
        assert!(vault.settle_total_assets(1060, [2; 32], 11).is_err());
        assert_eq!(vault.virtual_total_assets, 1000);
    }

    #[test]
    fn test_deviation_guard_skipped_on_first_settlement() {
        let mut vault = mock_vault(0, 0);
        vault.max_allowed_deviation_bps = 1;
        assert!(vault.settle_total_assets(1_000_000, [0; 32], 1).is_ok());
        assert_eq!(vault.virtual_total_assets, 1_000_000);
    }

    #[test]
    fn test_proposal_lifecycle() {
        let mut vault = mock_vault(1000, 1000);
        vault.cooldown_period = 3600;

        let execute_after = vault.propose_settlement(1500, [7; 32], 100).unwrap();
        assert_eq!(execute_after, 3700);

        assert!(vault.execute_proposal(3699).is_err());
        let executed = vault.execute_proposal(3700).unwrap();
        assert_eq!(executed.total_external_assets, 1500);
        assert_eq!(vault.virtual_total_assets, 1500);
        assert_eq!(vault.merkle_root, [7; 32]);
        assert!(!vault.proposal.is_active());

        // Consumed proposal cannot run twice
        assert!(vault.execute_proposal(4000).is_err());
    }

    #[test]
    fn test_new_proposal_overwrites_previous() {
        let mut vault = mock_vault(1000, 1000);
        vault.cooldown_period = 10;

        vault.propose_settlement(1100, [1; 32], 0).unwrap();
        vault.propose_settlement(1200, [2; 32], 5).unwrap();

        assert_eq!(vault.proposal.total_external_assets, 1200);
        assert_eq!(vault.proposal.execute_after, 15);
    }
}
