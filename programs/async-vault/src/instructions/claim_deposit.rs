use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, MintTo, Token, TokenAccount};

use crate::{constants::*, errors::*, events::*, state::*};

/// Claim a fulfilled deposit request (`deposit` / `mint`)
///
/// Security checklist:
/// ✅ 1. SIGNER VALIDATION: Controller or approved operator must sign
/// ✅ 2. ACCOUNT OWNERSHIP: Ledger and approval PDAs validated with seeds
/// ✅ 6. MATH SAFETY: Pro-rata conversion on u128, checked totals
/// ✅ 8. BUSINESS LOGIC: Bucket consumed before minting
/// ✅ 10. EVENTS: Emits DepositClaimed event
#[derive(Accounts)]
pub struct ClaimDeposit<'info> {
    pub caller: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        mut,
        seeds = [REQUESTS_SEED, vault_state.key().as_ref(), controller_requests.controller.as_ref()],
        bump = controller_requests.bump,
    )]
    pub controller_requests: Account<'info, ControllerRequests>,

    /// Present when the caller claims as the controller's operator
    #[account(
        seeds = [
            OPERATOR_SEED,
            vault_state.key().as_ref(),
            controller_requests.controller.as_ref(),
            caller.key().as_ref(),
        ],
        bump = operator_approval.bump,
    )]
    pub operator_approval: Option<Account<'info, OperatorApproval>>,

    #[account(
        mut,
        address = vault_state.share_mint,
    )]
    pub share_mint: Account<'info, Mint>,

    /// CHECK: PDA used as mint authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    /// Receiver's share token account (destination)
    #[account(
        mut,
        constraint = receiver_share_account.mint == vault_state.share_mint @ VaultError::InvalidMint,
    )]
    pub receiver_share_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<ClaimDeposit>, amount: ClaimAmount) -> Result<()> {
    // CHECKS
    let vault_state = &mut ctx.accounts.vault_state;
    let requests = &mut ctx.accounts.controller_requests;
    require!(
        is_owner_or_operator(
            &requests.controller,
            &ctx.accounts.caller.key(),
            ctx.accounts.operator_approval.as_deref(),
        ),
        VaultError::NotControllerOrOperator
    );

    // EFFECTS
    let (assets, shares) = vault_state.process_deposit_claim(requests, amount)?;

    // INTERACTIONS
    let asset_mint_key = vault_state.asset_mint;
    let authority_bump = vault_state.authority_bump;
    let authority_seeds: &[&[u8]] = &[
        VAULT_AUTHORITY_SEED,
        asset_mint_key.as_ref(),
        &[authority_bump],
    ];
    let signer_seeds = &[authority_seeds];

    if shares > 0 {
        token::mint_to(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                MintTo {
                    mint: ctx.accounts.share_mint.to_account_info(),
                    to: ctx.accounts.receiver_share_account.to_account_info(),
                    authority: ctx.accounts.vault_authority.to_account_info(),
                },
                signer_seeds,
            ),
            shares,
        )?;
    }

    emit!(DepositClaimed {
        vault: vault_state.key(),
        controller: requests.controller,
        receiver: ctx.accounts.receiver_share_account.owner,
        assets,
        shares,
        total_assets: vault_state.virtual_total_assets,
        total_shares: vault_state.total_shares,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
