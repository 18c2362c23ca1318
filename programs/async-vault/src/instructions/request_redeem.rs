use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::{constants::*, errors::*, events::*, state::*};

/// Escrow `owner`'s shares in a redeem request for `controller`
///
/// Three ways to authorize the share transfer:
/// - caller is the owner and signs
/// - caller is an approved operator: the vault authority moves the shares,
///   which needs an SPL delegation from the owner to the vault authority
/// - caller is the owner's SPL delegate and signs (allowance path)
#[derive(Accounts)]
#[instruction(shares: u64, controller: Pubkey)]
pub struct RequestRedeem<'info> {
    #[account(mut)]
    pub caller: Signer<'info>,

    /// CHECK: only compared against the share account owner and approval
    pub owner: UncheckedAccount<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        init_if_needed,
        payer = caller,
        space = CONTROLLER_REQUESTS_SIZE,
        seeds = [REQUESTS_SEED, vault_state.key().as_ref(), controller.as_ref()],
        bump
    )]
    pub controller_requests: Account<'info, ControllerRequests>,

    /// Present when the caller acts as the owner's operator
    #[account(
        seeds = [OPERATOR_SEED, vault_state.key().as_ref(), owner.key().as_ref(), caller.key().as_ref()],
        bump = operator_approval.bump,
    )]
    pub operator_approval: Option<Account<'info, OperatorApproval>>,

    #[account(
        seeds = [WHITELIST_SEED, vault_state.key().as_ref()],
        bump = whitelist.bump,
    )]
    pub whitelist: Account<'info, DepositorWhitelist>,

    #[account(
        mut,
        constraint = owner_share_account.mint == vault_state.share_mint @ VaultError::InvalidMint,
        constraint = owner_share_account.owner == owner.key() @ VaultError::InvalidOwner,
    )]
    pub owner_share_account: Account<'info, TokenAccount>,

    /// CHECK: PDA used as escrow authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    #[account(
        mut,
        constraint = share_escrow.mint == vault_state.share_mint @ VaultError::InvalidMint,
        constraint = share_escrow.owner == vault_authority.key() @ VaultError::InvalidOwner,
    )]
    pub share_escrow: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<RequestRedeem>, shares: u64, controller: Pubkey) -> Result<()> {
    // CHECKS
    let owner = ctx.accounts.owner.key();
    let caller = ctx.accounts.caller.key();
    let vault_state = &ctx.accounts.vault_state;
    let auto_fulfill = vault_state.fulfillment_mode == FulfillmentMode::Auto;
    if auto_fulfill {
        require!(
            ctx.accounts.whitelist.is_whitelisted(&owner),
            VaultError::NotWhitelisted
        );
    }

    let via_operator = owner != caller
        && ctx
            .accounts
            .operator_approval
            .as_ref()
            .is_some_and(|approval| approval.authorizes(&owner, &caller));

    let vault = vault_state.key();
    let requests = &mut ctx.accounts.controller_requests;
    if requests.vault == Pubkey::default() {
        requests.vault = vault;
        requests.controller = controller;
        requests.bump = ctx.bumps.controller_requests;
    }

    // EFFECTS
    let fulfilled_assets = vault_state.process_redeem_request(requests, shares)?;

    // INTERACTIONS
    let transfer_accounts = Transfer {
        from: ctx.accounts.owner_share_account.to_account_info(),
        to: ctx.accounts.share_escrow.to_account_info(),
        authority: if via_operator {
            ctx.accounts.vault_authority.to_account_info()
        } else {
            ctx.accounts.caller.to_account_info()
        },
    };

    if via_operator {
        let asset_mint_key = vault_state.asset_mint;
        let authority_bump = vault_state.authority_bump;
        let authority_seeds: &[&[u8]] = &[
            VAULT_AUTHORITY_SEED,
            asset_mint_key.as_ref(),
            &[authority_bump],
        ];
        let signer_seeds = &[authority_seeds];
        token::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                transfer_accounts,
                signer_seeds,
            ),
            shares,
        )?;
    } else {
        // Token program rejects a caller that is neither owner nor delegate
        token::transfer(
            CpiContext::new(ctx.accounts.token_program.to_account_info(), transfer_accounts),
            shares,
        )?;
    }

    let timestamp = Clock::get()?.unix_timestamp;
    emit!(RedeemRequested {
        vault,
        controller,
        owner,
        shares,
        timestamp,
    });

    if let Some(assets) = fulfilled_assets {
        emit!(RedeemFulfilled {
            vault,
            controller,
            shares,
            assets,
            timestamp,
        });
    }

    Ok(())
}
