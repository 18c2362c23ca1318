use anchor_lang::prelude::*;

use crate::state::{HookId, Role};

/// Event emitted when a new vault is initialized
#[event]
pub struct VaultInitialized {
    pub vault: Pubkey,
    pub authority: Pubkey,
    pub asset_mint: Pubkey,
    pub share_mint: Pubkey,
    pub timestamp: i64,
}

/// Event emitted when a role changes holder
#[event]
pub struct RoleUpdated {
    pub vault: Pubkey,
    pub role: Role,
    pub holder: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct WhitelistUpdated {
    pub vault: Pubkey,
    pub depositor: Pubkey,
    pub whitelisted: bool,
    pub timestamp: i64,
}

#[event]
pub struct OperatorSet {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub operator: Pubkey,
    pub approved: bool,
}

// -----------------------------------------------------------------------------
// Request / fulfil / claim
// -----------------------------------------------------------------------------

#[event]
pub struct DepositRequested {
    pub vault: Pubkey,
    pub controller: Pubkey,
    pub owner: Pubkey,
    pub assets: u64,
    pub timestamp: i64,
}

#[event]
pub struct RedeemRequested {
    pub vault: Pubkey,
    pub controller: Pubkey,
    pub owner: Pubkey,
    pub shares: u64,
    pub timestamp: i64,
}

#[event]
pub struct DepositFulfilled {
    pub vault: Pubkey,
    pub controller: Pubkey,
    pub assets: u64,
    pub shares: u64,
    pub timestamp: i64,
}

#[event]
pub struct RedeemFulfilled {
    pub vault: Pubkey,
    pub controller: Pubkey,
    pub shares: u64,
    pub assets: u64,
    pub timestamp: i64,
}

/// Event emitted when a deposit request is claimed (`deposit` or `mint`)
#[event]
pub struct DepositClaimed {
    pub vault: Pubkey,
    pub controller: Pubkey,
    pub receiver: Pubkey,
    pub assets: u64,
    pub shares: u64,
    pub total_assets: u64,
    pub total_shares: u64,
    pub timestamp: i64,
}

/// Event emitted when a redeem request is claimed (`redeem` or `withdraw`)
#[event]
pub struct RedeemClaimed {
    pub vault: Pubkey,
    pub controller: Pubkey,
    pub receiver: Pubkey,
    pub shares: u64,
    pub assets: u64,
    pub total_assets: u64,
    pub total_shares: u64,
    pub timestamp: i64,
}

// -----------------------------------------------------------------------------
// Settlement
// -----------------------------------------------------------------------------

#[event]
pub struct SettlementProposed {
    pub vault: Pubkey,
    pub total_external_assets: u64,
    pub merkle_root: [u8; 32],
    pub execute_after: i64,
}

#[event]
pub struct ProposalCancelled {
    pub vault: Pubkey,
    pub guardian: Pubkey,
    pub total_external_assets: u64,
    pub timestamp: i64,
}

/// Event emitted whenever virtual total assets are replaced by a settlement
#[event]
pub struct SettlementExecuted {
    pub vault: Pubkey,
    pub previous_total_assets: u64,
    pub total_assets: u64,
    pub merkle_root: [u8; 32],
    pub timestamp: i64,
}

#[event]
pub struct Paused {
    pub vault: Pubkey,
    pub emergency_admin: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct Unpaused {
    pub vault: Pubkey,
    pub emergency_admin: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct MaxDeviationUpdated {
    pub vault: Pubkey,
    pub old_bps: u16,
    pub new_bps: u16,
}

#[event]
pub struct CooldownUpdated {
    pub vault: Pubkey,
    pub old_period: i64,
    pub new_period: i64,
}

// -----------------------------------------------------------------------------
// Hooks
// -----------------------------------------------------------------------------

#[event]
pub struct HookInstalled {
    pub vault: Pubkey,
    pub hook_id: HookId,
    pub program: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct HookUninstalled {
    pub vault: Pubkey,
    pub hook_id: HookId,
    pub program: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct HookExecutionStarted {
    pub vault: Pubkey,
    pub hook_id: HookId,
    pub program: Pubkey,
    pub index: u32,
    pub timestamp: i64,
}

#[event]
pub struct HookExecutionCompleted {
    pub vault: Pubkey,
    pub hook_id: HookId,
    pub program: Pubkey,
    pub index: u32,
    /// Amount exposed to the next hook, for hooks that report one
    pub output_amount: Option<u64>,
    pub timestamp: i64,
}

/// Event emitted when an adapter call entry is added or toggled
#[event]
pub struct AdapterCallUpdated {
    pub vault: Pubkey,
    pub adapter: Pubkey,
    pub target: Pubkey,
    pub selector: [u8; 8],
    pub enabled: bool,
    pub timestamp: i64,
}
