//! Read-only queries; results come back through Anchor return data.
//!
//! None of these check the pause flag.

use anchor_lang::prelude::*;
use anchor_spl::token::TokenAccount;

use crate::{constants::*, errors::*, merkle, state::*};

#[derive(Accounts)]
pub struct VaultView<'info> {
    #[account(
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
    )]
    pub vault_state: Account<'info, VaultState>,
}

#[derive(Accounts)]
pub struct ControllerView<'info> {
    #[account(
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        seeds = [REQUESTS_SEED, vault_state.key().as_ref(), controller_requests.controller.as_ref()],
        bump = controller_requests.bump,
    )]
    pub controller_requests: Account<'info, ControllerRequests>,

    /// CHECK: PDA owning the vault token account, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    /// Source of the idle balance bounding redeem claims
    #[account(
        constraint = vault_token_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
        constraint = vault_token_account.owner == vault_authority.key() @ VaultError::InvalidOwner,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,
}

#[derive(Accounts)]
#[instruction(owner: Pubkey, operator: Pubkey)]
pub struct OperatorView<'info> {
    #[account(
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
    )]
    pub vault_state: Account<'info, VaultState>,

    /// Absent when the pair never had an approval
    #[account(
        seeds = [OPERATOR_SEED, vault_state.key().as_ref(), owner.as_ref(), operator.as_ref()],
        bump = operator_approval.bump,
    )]
    pub operator_approval: Option<Account<'info, OperatorApproval>>,
}

// -----------------------------------------------------------------------------
// Share accounting
// -----------------------------------------------------------------------------

pub fn convert_to_shares(ctx: Context<VaultView>, assets: u64) -> Result<u64> {
    ctx.accounts.vault_state.convert_to_shares(assets)
}

pub fn convert_to_assets(ctx: Context<VaultView>, shares: u64) -> Result<u64> {
    ctx.accounts.vault_state.convert_to_assets(shares)
}

pub fn share_price(ctx: Context<VaultView>) -> Result<u64> {
    ctx.accounts.vault_state.share_price()
}

/// Virtual total assets as of the last claim or settlement
pub fn total_assets(ctx: Context<VaultView>) -> Result<u64> {
    Ok(ctx.accounts.vault_state.virtual_total_assets)
}

pub fn preview_deposit(ctx: Context<VaultView>, assets: u64) -> Result<u64> {
    ctx.accounts.vault_state.preview_deposit(assets)
}

pub fn preview_mint(ctx: Context<VaultView>, shares: u64) -> Result<u64> {
    ctx.accounts.vault_state.preview_mint(shares)
}

pub fn preview_withdraw(ctx: Context<VaultView>, assets: u64) -> Result<u64> {
    ctx.accounts.vault_state.preview_withdraw(assets)
}

pub fn preview_redeem(ctx: Context<VaultView>, shares: u64) -> Result<u64> {
    ctx.accounts.vault_state.preview_redeem(shares)
}

// -----------------------------------------------------------------------------
// Per-controller limits and request state
// -----------------------------------------------------------------------------

pub fn max_deposit(ctx: Context<ControllerView>) -> Result<u64> {
    Ok(ctx.accounts.controller_requests.max_deposit())
}

pub fn max_mint(ctx: Context<ControllerView>) -> Result<u64> {
    Ok(ctx.accounts.controller_requests.max_mint())
}

pub fn max_redeem(ctx: Context<ControllerView>) -> Result<u64> {
    let balance = ctx.accounts.vault_token_account.amount;
    ctx.accounts
        .vault_state
        .max_redeem(&ctx.accounts.controller_requests, balance)
}

pub fn max_withdraw(ctx: Context<ControllerView>) -> Result<u64> {
    let balance = ctx.accounts.vault_token_account.amount;
    Ok(ctx
        .accounts
        .vault_state
        .max_withdraw(&ctx.accounts.controller_requests, balance))
}

/// Assets waiting for fulfilment
pub fn pending_deposit_request(ctx: Context<ControllerView>) -> Result<u64> {
    Ok(ctx.accounts.controller_requests.deposit.pending)
}

/// Assets fulfilled and awaiting `deposit`/`mint`
pub fn claimable_deposit_request(ctx: Context<ControllerView>) -> Result<u64> {
    Ok(ctx.accounts.controller_requests.deposit.claimable)
}

/// Shares waiting for fulfilment
pub fn pending_redeem_request(ctx: Context<ControllerView>) -> Result<u64> {
    Ok(ctx.accounts.controller_requests.redeem.pending)
}

/// Shares fulfilled and awaiting `redeem`/`withdraw`
pub fn claimable_redeem_request(ctx: Context<ControllerView>) -> Result<u64> {
    Ok(ctx.accounts.controller_requests.redeem.claimable)
}

pub fn is_operator(ctx: Context<OperatorView>, owner: Pubkey, operator: Pubkey) -> Result<bool> {
    Ok(ctx
        .accounts
        .operator_approval
        .as_ref()
        .is_some_and(|approval| approval.authorizes(&owner, &operator)))
}

// -----------------------------------------------------------------------------
// Merkle attestation
// -----------------------------------------------------------------------------

pub fn compute_merkle_root(
    _ctx: Context<VaultView>,
    strategies: Vec<Pubkey>,
    values: Vec<u64>,
) -> Result<[u8; 32]> {
    merkle::compute_merkle_root(&strategies, &values)
}

/// Checks a disclosed breakdown against `root`
pub fn validate_total_assets(
    _ctx: Context<VaultView>,
    strategies: Vec<Pubkey>,
    values: Vec<u64>,
    root: [u8; 32],
) -> Result<bool> {
    merkle::validate_total_assets(&strategies, &values, &root)
}
