use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Approve or revoke an operator acting for the signing owner
#[derive(Accounts)]
#[instruction(operator: Pubkey)]
pub struct SetOperator<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
    )]
    pub vault_state: Account<'info, VaultState>,

    /// One approval record per (owner, operator) pair
    #[account(
        init_if_needed,
        payer = owner,
        space = OPERATOR_APPROVAL_SIZE,
        seeds = [OPERATOR_SEED, vault_state.key().as_ref(), owner.key().as_ref(), operator.as_ref()],
        bump
    )]
    pub operator_approval: Account<'info, OperatorApproval>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<SetOperator>, operator: Pubkey, approved: bool) -> Result<()> {
    let owner = ctx.accounts.owner.key();
    require_keys_neq!(owner, operator, VaultError::SelfOperatorApproval);

    let approval = &mut ctx.accounts.operator_approval;
    approval.vault = ctx.accounts.vault_state.key();
    approval.owner = owner;
    approval.operator = operator;
    approval.approved = approved;
    approval.bump = ctx.bumps.operator_approval;

    emit!(OperatorSet {
        vault: approval.vault,
        owner,
        operator,
        approved,
    });

    Ok(())
}
