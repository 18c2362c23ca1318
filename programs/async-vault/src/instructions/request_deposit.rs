use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::{constants::*, errors::*, events::*, state::*};

/// Open (or top up) a deposit request for `controller`
///
/// Security checklist:
/// ✅ 1. SIGNER VALIDATION: Owner must sign the asset transfer
/// ✅ 2. ACCOUNT OWNERSHIP: Ledger PDA derived from (vault, controller)
/// ✅ 6. MATH SAFETY: Checked pending/total updates
/// ✅ 7. TOKEN ACCOUNT VALIDATION: Validates mint and owner
/// ✅ 8. BUSINESS LOGIC: Bookkeeping before the token CPI
/// ✅ 10. EVENTS: DepositRequested (+ DepositFulfilled in auto mode)
#[derive(Accounts)]
#[instruction(assets: u64, controller: Pubkey)]
pub struct RequestDeposit<'info> {
    /// Asset owner; pays for the ledger on first request
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        init_if_needed,
        payer = owner,
        space = CONTROLLER_REQUESTS_SIZE,
        seeds = [REQUESTS_SEED, vault_state.key().as_ref(), controller.as_ref()],
        bump
    )]
    pub controller_requests: Account<'info, ControllerRequests>,

    #[account(
        seeds = [WHITELIST_SEED, vault_state.key().as_ref()],
        bump = whitelist.bump,
    )]
    pub whitelist: Account<'info, DepositorWhitelist>,

    /// Owner's asset token account (source)
    #[account(
        mut,
        constraint = owner_asset_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
        constraint = owner_asset_account.owner == owner.key() @ VaultError::InvalidOwner,
    )]
    pub owner_asset_account: Account<'info, TokenAccount>,

    /// CHECK: PDA used as custody authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    #[account(
        mut,
        constraint = vault_token_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
        constraint = vault_token_account.owner == vault_authority.key() @ VaultError::InvalidOwner,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<RequestDeposit>, assets: u64, controller: Pubkey) -> Result<()> {
    // CHECKS
    let vault_state = &mut ctx.accounts.vault_state;
    let auto_fulfill = vault_state.fulfillment_mode == FulfillmentMode::Auto;
    if auto_fulfill {
        require!(
            ctx.accounts.whitelist.is_whitelisted(&ctx.accounts.owner.key()),
            VaultError::NotWhitelisted
        );
    }

    let vault = vault_state.key();
    let requests = &mut ctx.accounts.controller_requests;
    if requests.vault == Pubkey::default() {
        requests.vault = vault;
        requests.controller = controller;
        requests.bump = ctx.bumps.controller_requests;
    }

    // EFFECTS
    // Rate fixed now; virtual total assets move only when the claim lands
    let fulfilled_shares = vault_state.process_deposit_request(requests, assets)?;

    // INTERACTIONS
    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.owner_asset_account.to_account_info(),
                to: ctx.accounts.vault_token_account.to_account_info(),
                authority: ctx.accounts.owner.to_account_info(),
            },
        ),
        assets,
    )?;

    let timestamp = Clock::get()?.unix_timestamp;
    emit!(DepositRequested {
        vault,
        controller,
        owner: ctx.accounts.owner.key(),
        assets,
        timestamp,
    });

    if let Some(shares) = fulfilled_shares {
        emit!(DepositFulfilled {
            vault,
            controller,
            assets,
            shares,
            timestamp,
        });
    }

    Ok(())
}
