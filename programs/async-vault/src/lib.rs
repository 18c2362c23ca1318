// Async Vault - request/claim share vault with hook-driven strategy execution
// Security: roles live in state, custody and hook executions signed by a PDA
// Architecture: virtual total assets move only on claims and settlement

use anchor_lang::prelude::*;

pub mod constants;
pub mod errors;
pub mod events;
pub mod hook_chain;
pub mod instructions;
pub mod math;
pub mod merkle;
pub mod state;

use hook_chain::HookInvocation;
use instructions::*;
use state::{ClaimAmount, HookId, Role, Selector};

declare_id!("ASjmmicEdymJW1UCDGhsEtGSsRQ6GCdZasfe4baTYZio");

#[program]
pub mod async_vault {
    use super::*;

    /// Initialize a new vault for a given asset token
    ///
    /// Security considerations:
    /// - Validates authority is signer, stored as admin
    /// - Creates share mint with the vault authority PDA as mint authority
    /// - Creates hook registry, adapter registry and whitelist PDAs
    /// - Settlement and fulfillment modes are fixed here
    pub fn initialize(ctx: Context<Initialize>, params: InitializeParams) -> Result<()> {
        instructions::initialize::handler(ctx, params)
    }

    // -------------------------------------------------------------------------
    // Administration
    // -------------------------------------------------------------------------

    /// Move a role to a new holder (admin only)
    pub fn set_role(ctx: Context<SetRole>, role: Role, holder: Pubkey) -> Result<()> {
        instructions::set_role::handler(ctx, role, holder)
    }

    /// Update the immediate-settlement deviation bound (admin only)
    pub fn set_max_deviation(ctx: Context<SetMaxDeviation>, max_allowed_deviation_bps: u16) -> Result<()> {
        instructions::set_max_deviation::handler(ctx, max_allowed_deviation_bps)
    }

    /// Update the proposal cooldown (admin only)
    pub fn set_cooldown(ctx: Context<SetCooldown>, cooldown_period: i64) -> Result<()> {
        instructions::set_cooldown::handler(ctx, cooldown_period)
    }

    /// Grant or revoke the whitelisted role (admin only)
    pub fn update_whitelist(
        ctx: Context<UpdateWhitelist>,
        depositor: Pubkey,
        whitelisted: bool,
    ) -> Result<()> {
        instructions::update_whitelist::handler(ctx, depositor, whitelisted)
    }

    /// Halt requests, fulfilments and claims (emergency admin only)
    pub fn pause(ctx: Context<SetPaused>) -> Result<()> {
        instructions::set_paused::handler(ctx, true)
    }

    pub fn unpause(ctx: Context<SetPaused>) -> Result<()> {
        instructions::set_paused::handler(ctx, false)
    }

    // -------------------------------------------------------------------------
    // Request / fulfil / claim
    // -------------------------------------------------------------------------

    /// Approve or revoke an operator for the signer
    pub fn set_operator(ctx: Context<SetOperator>, operator: Pubkey, approved: bool) -> Result<()> {
        instructions::set_operator::handler(ctx, operator, approved)
    }

    /// Lock assets in a deposit request for `controller`
    ///
    /// Security considerations:
    /// - Owner signs the asset transfer
    /// - Auto mode: owner must be whitelisted, request fulfilled at once
    /// - Virtual total assets unchanged until the claim
    pub fn request_deposit(ctx: Context<RequestDeposit>, assets: u64, controller: Pubkey) -> Result<()> {
        instructions::request_deposit::handler(ctx, assets, controller)
    }

    /// Escrow shares in a redeem request for `controller`
    ///
    /// Security considerations:
    /// - Owner, approved operator (via vault authority delegation) or SPL delegate
    /// - Auto mode: owner must be whitelisted, request fulfilled at once
    pub fn request_redeem(ctx: Context<RequestRedeem>, shares: u64, controller: Pubkey) -> Result<()> {
        instructions::request_redeem::handler(ctx, shares, controller)
    }

    /// Fulfil pending deposit assets at the current rate (manager mode)
    pub fn fulfill_deposit(ctx: Context<FulfillDeposit>, assets: u64) -> Result<()> {
        instructions::fulfill_deposit::handler(ctx, assets)
    }

    /// Fulfil pending redeem shares at the current rate (manager mode)
    ///
    /// Security considerations:
    /// - Never fulfils more than is pending, so claimable shares stay backed
    ///   by this controller's escrowed shares
    pub fn fulfill_redeem(ctx: Context<FulfillRedeem>, shares: u64) -> Result<()> {
        instructions::fulfill_redeem::handler(ctx, shares)
    }

    /// Claim shares for `assets` of a fulfilled deposit
    ///
    /// Security considerations:
    /// - Controller or approved operator only
    /// - Bounded by max_deposit (claimable assets)
    /// - Shares rounded down
    pub fn deposit(ctx: Context<ClaimDeposit>, assets: u64) -> Result<()> {
        instructions::claim_deposit::handler(ctx, ClaimAmount::Assets(assets))
    }

    /// Claim exactly `shares` of a fulfilled deposit (assets rounded up)
    pub fn mint(ctx: Context<ClaimDeposit>, shares: u64) -> Result<()> {
        instructions::claim_deposit::handler(ctx, ClaimAmount::Shares(shares))
    }

    /// Burn `shares` of a fulfilled redemption for assets
    ///
    /// Security considerations:
    /// - Controller or approved operator only
    /// - Bounded by claimable shares and idle assets
    /// - Assets rounded down
    pub fn redeem(ctx: Context<ClaimRedeem>, shares: u64) -> Result<()> {
        instructions::claim_redeem::handler(ctx, ClaimAmount::Shares(shares))
    }

    /// Withdraw exactly `assets` of a fulfilled redemption (shares rounded up)
    pub fn withdraw(ctx: Context<ClaimRedeem>, assets: u64) -> Result<()> {
        instructions::claim_redeem::handler(ctx, ClaimAmount::Assets(assets))
    }

    // -------------------------------------------------------------------------
    // Settlement
    // -------------------------------------------------------------------------

    /// Replace virtual total assets directly (immediate mode, manager only)
    ///
    /// Security considerations:
    /// - Bounded by max_allowed_deviation_bps unless current total is zero
    /// - Records the attested Merkle root
    pub fn settle_total_assets(
        ctx: Context<SettleTotalAssets>,
        new_total_assets: u64,
        new_merkle_root: [u8; 32],
    ) -> Result<()> {
        instructions::settle::handler(ctx, new_total_assets, new_merkle_root)
    }

    /// Stage a settlement behind the cooldown (proposal mode, manager only)
    pub fn propose_settlement(
        ctx: Context<ProposeSettlement>,
        total_external_assets: u64,
        merkle_root: [u8; 32],
    ) -> Result<()> {
        instructions::propose_settlement::handler(ctx, total_external_assets, merkle_root)
    }

    /// Drop the active proposal (guardian only)
    pub fn cancel_proposal(ctx: Context<CancelProposal>) -> Result<()> {
        instructions::cancel_proposal::handler(ctx)
    }

    /// Apply the active proposal once its cooldown has elapsed
    pub fn execute_proposal(ctx: Context<ExecuteProposal>) -> Result<()> {
        instructions::execute_proposal::handler(ctx)
    }

    // -------------------------------------------------------------------------
    // Hooks
    // -------------------------------------------------------------------------

    /// Register a hook program (admin only)
    pub fn install_hook(
        ctx: Context<InstallHook>,
        hook_id: HookId,
        program: Pubkey,
        has_output: bool,
    ) -> Result<()> {
        instructions::install_hook::handler(ctx, hook_id, program, has_output)
    }

    pub fn uninstall_hook(ctx: Context<UninstallHook>, hook_id: HookId) -> Result<()> {
        instructions::uninstall_hook::handler(ctx, hook_id)
    }

    /// Allow an (adapter, target, selector) call (admin only)
    pub fn add_adapter_call(
        ctx: Context<AddAdapterCall>,
        adapter: Pubkey,
        target: Pubkey,
        selector: Selector,
    ) -> Result<()> {
        instructions::add_adapter_call::handler(ctx, adapter, target, selector)
    }

    /// Enable or disable an allowed call (admin only)
    pub fn toggle_adapter_call(
        ctx: Context<ToggleAdapterCall>,
        adapter: Pubkey,
        target: Pubkey,
        selector: Selector,
        enabled: bool,
    ) -> Result<()> {
        instructions::toggle_adapter_call::handler(ctx, adapter, target, selector, enabled)
    }

    /// Run installed hooks as one atomic batch (executor only)
    ///
    /// Security considerations:
    /// - Every hook id resolved before any hook runs
    /// - Every execution checked against the adapter registry
    /// - Executions signed by the vault authority PDA; hooks themselves only
    ///   ever see the hook context PDA as signer
    /// - Virtual total assets must be unchanged afterwards
    /// - Serialized results capped at 1024 bytes of return data
    pub fn execute_hooks<'info>(
        ctx: Context<'_, '_, 'info, 'info, ExecuteHooks<'info>>,
        invocations: Vec<HookInvocation>,
    ) -> Result<Vec<Vec<u8>>> {
        instructions::execute_hooks::handler(ctx, invocations)
    }

    // -------------------------------------------------------------------------
    // Views
    // -------------------------------------------------------------------------

    pub fn convert_to_shares(ctx: Context<VaultView>, assets: u64) -> Result<u64> {
        instructions::views::convert_to_shares(ctx, assets)
    }

    pub fn convert_to_assets(ctx: Context<VaultView>, shares: u64) -> Result<u64> {
        instructions::views::convert_to_assets(ctx, shares)
    }

    pub fn share_price(ctx: Context<VaultView>) -> Result<u64> {
        instructions::views::share_price(ctx)
    }

    pub fn total_assets(ctx: Context<VaultView>) -> Result<u64> {
        instructions::views::total_assets(ctx)
    }

    pub fn max_deposit(ctx: Context<ControllerView>) -> Result<u64> {
        instructions::views::max_deposit(ctx)
    }

    pub fn max_mint(ctx: Context<ControllerView>) -> Result<u64> {
        instructions::views::max_mint(ctx)
    }

    pub fn max_redeem(ctx: Context<ControllerView>) -> Result<u64> {
        instructions::views::max_redeem(ctx)
    }

    pub fn max_withdraw(ctx: Context<ControllerView>) -> Result<u64> {
        instructions::views::max_withdraw(ctx)
    }

    pub fn pending_deposit_request(ctx: Context<ControllerView>) -> Result<u64> {
        instructions::views::pending_deposit_request(ctx)
    }

    pub fn claimable_deposit_request(ctx: Context<ControllerView>) -> Result<u64> {
        instructions::views::claimable_deposit_request(ctx)
    }

    pub fn pending_redeem_request(ctx: Context<ControllerView>) -> Result<u64> {
        instructions::views::pending_redeem_request(ctx)
    }

    pub fn claimable_redeem_request(ctx: Context<ControllerView>) -> Result<u64> {
        instructions::views::claimable_redeem_request(ctx)
    }

    pub fn is_operator(ctx: Context<OperatorView>, owner: Pubkey, operator: Pubkey) -> Result<bool> {
        instructions::views::is_operator(ctx, owner, operator)
    }

    pub fn compute_merkle_root(
        ctx: Context<VaultView>,
        strategies: Vec<Pubkey>,
        values: Vec<u64>,
    ) -> Result<[u8; 32]> {
        instructions::views::compute_merkle_root(ctx, strategies, values)
    }

    pub fn validate_total_assets(
        ctx: Context<VaultView>,
        strategies: Vec<Pubkey>,
        values: Vec<u64>,
        root: [u8; 32],
    ) -> Result<bool> {
        instructions::views::validate_total_assets(ctx, strategies, values, root)
    }

    /// Always fails: asynchronous vaults cannot quote synchronously
    pub fn preview_deposit(ctx: Context<VaultView>, assets: u64) -> Result<u64> {
        instructions::views::preview_deposit(ctx, assets)
    }

    pub fn preview_mint(ctx: Context<VaultView>, shares: u64) -> Result<u64> {
        instructions::views::preview_mint(ctx, shares)
    }

    pub fn preview_withdraw(ctx: Context<VaultView>, assets: u64) -> Result<u64> {
        instructions::views::preview_withdraw(ctx, assets)
    }

    pub fn preview_redeem(ctx: Context<VaultView>, shares: u64) -> Result<u64> {
        instructions::views::preview_redeem(ctx, shares)
    }
}
