use anchor_lang::prelude::*;
use anchor_spl::token::{self, Burn, Mint, Token, TokenAccount, Transfer};

use crate::{constants::*, errors::*, events::*, state::*};

/// Claim a fulfilled redeem request (`redeem` / `withdraw`)
///
/// Payouts come from idle assets only: the vault balance minus assets still
/// earmarked for unclaimed deposits.
#[derive(Accounts)]
pub struct ClaimRedeem<'info> {
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

    /// CHECK: PDA used as custody authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    /// Escrowed shares of redeem requests
    #[account(
        mut,
        constraint = share_escrow.mint == vault_state.share_mint @ VaultError::InvalidMint,
        constraint = share_escrow.owner == vault_authority.key() @ VaultError::InvalidOwner,
    )]
    pub share_escrow: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = vault_token_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
        constraint = vault_token_account.owner == vault_authority.key() @ VaultError::InvalidOwner,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    /// Receiver's asset token account (destination)
    #[account(
        mut,
        constraint = receiver_asset_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
    )]
    pub receiver_asset_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<ClaimRedeem>, amount: ClaimAmount) -> Result<()> {
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
    let balance = ctx.accounts.vault_token_account.amount;
    let (assets, shares) = vault_state.process_redeem_claim(requests, amount, balance)?;

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
        token::burn(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                Burn {
                    mint: ctx.accounts.share_mint.to_account_info(),
                    from: ctx.accounts.share_escrow.to_account_info(),
                    authority: ctx.accounts.vault_authority.to_account_info(),
                },
                signer_seeds,
            ),
            shares,
        )?;
    }

    if assets > 0 {
        token::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.vault_token_account.to_account_info(),
                    to: ctx.accounts.receiver_asset_account.to_account_info(),
                    authority: ctx.accounts.vault_authority.to_account_info(),
                },
                signer_seeds,
            ),
            assets,
        )?;
    }

    emit!(RedeemClaimed {
        vault: vault_state.key(),
        controller: requests.controller,
        receiver: ctx.accounts.receiver_asset_account.owner,
        shares,
        assets,
        total_assets: vault_state.virtual_total_assets,
        total_shares: vault_state.total_shares,
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!("Redeem claimed: {} shares for {} assets", shares, assets);

    Ok(())
}
