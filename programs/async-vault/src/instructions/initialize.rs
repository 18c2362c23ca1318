use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token::{Mint, Token, TokenAccount},
};

use crate::{constants::*, errors::*, events::*, state::*};

/// Deployment configuration chosen by the admin at initialization
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct InitializeParams {
    pub manager: Pubkey,
    pub guardian: Pubkey,
    pub emergency_admin: Pubkey,
    pub executor: Pubkey,
    pub settlement_mode: SettlementMode,
    pub fulfillment_mode: FulfillmentMode,
    pub cooldown_period: i64,
    pub max_allowed_deviation_bps: u16,
}

/// Initialize a new vault for a given asset token
#[derive(Accounts)]
pub struct Initialize<'info> {
    /// Vault admin
    /// Security: Must be signer, stored in state
    #[account(mut)]
    pub authority: Signer<'info>,

    /// Vault state PDA
    /// Security: `init` fails if the vault already exists
    #[account(
        init,
        payer = authority,
        space = VAULT_STATE_SIZE,
        seeds = [VAULT_SEED, asset_mint.key().as_ref()],
        bump
    )]
    pub vault_state: Box<Account<'info, VaultState>>,

    /// Asset token mint (the underlying token users deposit)
    pub asset_mint: Box<Account<'info, Mint>>,

    /// Share token mint PDA (vault shares)
    /// Security: Mint authority is vault_authority PDA
    #[account(
        init,
        payer = authority,
        seeds = [SHARE_MINT_SEED, asset_mint.key().as_ref()],
        bump,
        mint::decimals = asset_mint.decimals,
        mint::authority = vault_authority,
    )]
    pub share_mint: Box<Account<'info, Mint>>,

    /// CHECK: PDA used as custody and mint authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, asset_mint.key().as_ref()],
        bump
    )]
    pub vault_authority: UncheckedAccount<'info>,

    /// Vault's token account for holding assets
    #[account(
        init,
        payer = authority,
        associated_token::mint = asset_mint,
        associated_token::authority = vault_authority,
    )]
    pub vault_token_account: Box<Account<'info, TokenAccount>>,

    /// Escrow for shares of pending and claimable redeem requests
    #[account(
        init,
        payer = authority,
        associated_token::mint = share_mint,
        associated_token::authority = vault_authority,
    )]
    pub share_escrow: Box<Account<'info, TokenAccount>>,

    #[account(
        init,
        payer = authority,
        space = HookRegistry::SPACE,
        seeds = [HOOK_REGISTRY_SEED, vault_state.key().as_ref()],
        bump
    )]
    pub hook_registry: Box<Account<'info, HookRegistry>>,

    #[account(
        init,
        payer = authority,
        space = AdapterRegistry::SPACE,
        seeds = [ADAPTER_REGISTRY_SEED, vault_state.key().as_ref()],
        bump
    )]
    pub adapter_registry: Box<Account<'info, AdapterRegistry>>,

    #[account(
        init,
        payer = authority,
        space = DepositorWhitelist::SPACE,
        seeds = [WHITELIST_SEED, vault_state.key().as_ref()],
        bump
    )]
    pub whitelist: Box<Account<'info, DepositorWhitelist>>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<Initialize>, params: InitializeParams) -> Result<()> {
    // CHECKS
    require!(params.cooldown_period >= 0, VaultError::InvalidCooldown);

    let vault_key = ctx.accounts.vault_state.key();
    let vault_state = &mut ctx.accounts.vault_state;

    // EFFECTS: Initialize vault state
    vault_state.authority = ctx.accounts.authority.key();
    vault_state.manager = params.manager;
    vault_state.guardian = params.guardian;
    vault_state.emergency_admin = params.emergency_admin;
    vault_state.executor = params.executor;
    vault_state.asset_mint = ctx.accounts.asset_mint.key();
    vault_state.share_mint = ctx.accounts.share_mint.key();
    vault_state.virtual_total_assets = 0;
    vault_state.total_pending_deposit_assets = 0;
    vault_state.total_shares = 0;
    vault_state.decimals = ctx.accounts.asset_mint.decimals;
    vault_state.paused = false;
    vault_state.max_allowed_deviation_bps = params.max_allowed_deviation_bps;
    vault_state.merkle_root = [0; 32];
    vault_state.settlement_mode = params.settlement_mode;
    vault_state.fulfillment_mode = params.fulfillment_mode;
    vault_state.cooldown_period = params.cooldown_period;
    vault_state.proposal = SettlementProposal::default();
    vault_state.last_settlement_ts = 0;
    vault_state.bump = ctx.bumps.vault_state;
    vault_state.share_bump = ctx.bumps.share_mint;
    vault_state.authority_bump = ctx.bumps.vault_authority;
    vault_state._reserved = [0; 32];

    let hook_registry = &mut ctx.accounts.hook_registry;
    hook_registry.vault = vault_key;
    hook_registry.hooks = Vec::new();
    hook_registry.bump = ctx.bumps.hook_registry;

    let adapter_registry = &mut ctx.accounts.adapter_registry;
    adapter_registry.vault = vault_key;
    adapter_registry.allowed_calls = Vec::new();
    adapter_registry.bump = ctx.bumps.adapter_registry;

    let whitelist = &mut ctx.accounts.whitelist;
    whitelist.vault = vault_key;
    whitelist.members = Vec::new();
    whitelist.bump = ctx.bumps.whitelist;

    // INTERACTIONS: Emit event
    emit!(VaultInitialized {
        vault: vault_key,
        authority: ctx.accounts.authority.key(),
        asset_mint: ctx.accounts.asset_mint.key(),
        share_mint: ctx.accounts.share_mint.key(),
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!(
        "Vault initialized: settlement {:?}, fulfillment {:?}",
        params.settlement_mode,
        params.fulfillment_mode
    );

    Ok(())
}
