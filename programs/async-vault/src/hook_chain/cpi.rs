//! On-chain implementations of the hook-chain seams: hooks are external
//! programs called by CPI, executions are CPIs signed by the vault authority.
//!
//! Hooks never receive the vault authority's signature. Context and teardown
//! calls are signed by the hook context PDA, which owns nothing, and a hook
//! may only write accounts it owns itself. Funds move exclusively through
//! dispatched executions, each of which passed the adapter registry.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::{
    instruction::{AccountMeta, Instruction},
    program::{get_return_data, invoke, invoke_signed},
    system_instruction,
};
use sha2::{Digest, Sha256};

use super::{Dispatcher, Execution, Hook, HookResolver};
use crate::errors::VaultError;
use crate::state::HookRegistration;

/// Anchor discriminator of a hook program instruction
pub fn hook_instruction_discriminator(name: &str) -> [u8; 8] {
    let mut hasher = Sha256::new();
    hasher.update(b"global:");
    hasher.update(name.as_bytes());
    let hash = hasher.finalize();
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&hash[..8]);
    discriminator
}

fn find_account<'a, 'info>(
    accounts: &'a [AccountInfo<'info>],
    key: &Pubkey,
) -> Result<&'a AccountInfo<'info>> {
    accounts
        .iter()
        .find(|a| a.key == key)
        .ok_or(error!(VaultError::MissingHookAccount))
}

/// Return data set by `program` during the last CPI, if any
fn return_data_from(program: &Pubkey) -> Option<Vec<u8>> {
    match get_return_data() {
        Some((returned_by, data)) if returned_by == *program => Some(data),
        _ => None,
    }
}

/// Privileges a hook call grants
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookCallAccess {
    /// `build_executions`, `get_output_amount`: no signer, nothing writable
    ReadOnly,
    /// `initialize_hook_context`, `finalize_hook_context`: the hook context
    /// PDA signs, accounts owned by the hook program stay writable
    Context,
}

/// Meta for the hook context PDA, always first in a hook call
fn context_authority_meta(context_authority: &Pubkey, access: HookCallAccess) -> AccountMeta {
    AccountMeta::new_readonly(*context_authority, access == HookCallAccess::Context)
}

/// Meta for one remaining account forwarded to a hook
fn hook_account_meta(
    key: &Pubkey,
    owner: &Pubkey,
    is_writable: bool,
    hook_program: &Pubkey,
    access: HookCallAccess,
) -> AccountMeta {
    if access == HookCallAccess::Context && is_writable && owner == hook_program {
        AccountMeta::new(*key, false)
    } else {
        AccountMeta::new_readonly(*key, false)
    }
}

/// Installed hook program reached through CPI
///
/// Every call passes the hook context PDA first, followed by the remaining
/// accounts of the outer instruction.
pub struct CpiHook<'a, 'info> {
    pub registration: HookRegistration,
    pub program: &'a AccountInfo<'info>,
    pub context_authority: &'a AccountInfo<'info>,
    pub accounts: &'a [AccountInfo<'info>],
    /// Seeds of the hook context PDA, not of the vault authority
    pub context_signer_seeds: &'a [&'a [&'a [u8]]],
}

impl<'a, 'info> CpiHook<'a, 'info> {
    fn instruction(&self, name: &str, args: &[u8], access: HookCallAccess) -> Instruction {
        let mut metas = Vec::with_capacity(self.accounts.len() + 1);
        metas.push(context_authority_meta(self.context_authority.key, access));
        metas.extend(self.accounts.iter().map(|a| {
            hook_account_meta(a.key, a.owner, a.is_writable, self.program.key, access)
        }));

        let mut data = hook_instruction_discriminator(name).to_vec();
        data.extend_from_slice(args);

        Instruction {
            program_id: *self.program.key,
            accounts: metas,
            data,
        }
    }

    fn account_infos(&self) -> Vec<AccountInfo<'info>> {
        let mut infos = Vec::with_capacity(self.accounts.len() + 2);
        infos.push(self.context_authority.clone());
        infos.push(self.program.clone());
        infos.extend(self.accounts.iter().cloned());
        infos
    }

    fn call_read_only(&self, name: &str, args: &[u8]) -> Result<Option<Vec<u8>>> {
        invoke(
            &self.instruction(name, args, HookCallAccess::ReadOnly),
            &self.account_infos(),
        )?;
        Ok(return_data_from(self.program.key))
    }

    fn call_with_context(&self, name: &str) -> Result<()> {
        invoke_signed(
            &self.instruction(name, &[], HookCallAccess::Context),
            &self.account_infos(),
            self.context_signer_seeds,
        )?;
        Ok(())
    }
}

impl<'a, 'info> Hook for CpiHook<'a, 'info> {
    fn build_executions(
        &self,
        previous_hook: Option<Pubkey>,
        config_data: &[u8],
    ) -> Result<Vec<Execution>> {
        let mut args = Vec::new();
        previous_hook
            .serialize(&mut args)
            .and_then(|_| config_data.to_vec().serialize(&mut args))
            .map_err(|_| error!(anchor_lang::error::ErrorCode::InstructionDidNotSerialize))?;

        let data = self
            .call_read_only("build_executions", &args)?
            .ok_or(error!(VaultError::InvalidHookReturnData))?;
        Vec::<Execution>::try_from_slice(&data)
            .map_err(|_| error!(VaultError::InvalidHookReturnData))
    }

    fn initialize_hook_context(&mut self) -> Result<()> {
        self.call_with_context("initialize_hook_context")
    }

    fn finalize_hook_context(&mut self) -> Result<()> {
        self.call_with_context("finalize_hook_context")
    }

    fn output_amount(&self) -> Result<Option<u64>> {
        if !self.registration.has_output {
            return Ok(None);
        }
        let data = self
            .call_read_only("get_output_amount", &[])?
            .ok_or(error!(VaultError::InvalidHookReturnData))?;
        u64::try_from_slice(&data)
            .map(Some)
            .map_err(|_| error!(VaultError::InvalidHookReturnData))
    }
}

/// Builds `CpiHook`s on demand from the outer instruction's remaining accounts
pub struct CpiHookResolver<'a, 'info> {
    pub context_authority: &'a AccountInfo<'info>,
    pub accounts: &'a [AccountInfo<'info>],
    pub context_signer_seeds: &'a [&'a [&'a [u8]]],
    hooks: Vec<CpiHook<'a, 'info>>,
}

impl<'a, 'info> CpiHookResolver<'a, 'info> {
    pub fn new(
        context_authority: &'a AccountInfo<'info>,
        accounts: &'a [AccountInfo<'info>],
        context_signer_seeds: &'a [&'a [&'a [u8]]],
    ) -> Self {
        Self {
            context_authority,
            accounts,
            context_signer_seeds,
            hooks: Vec::new(),
        }
    }
}

impl<'a, 'info> HookResolver for CpiHookResolver<'a, 'info> {
    fn hook(&mut self, registration: &HookRegistration) -> Result<&mut dyn Hook> {
        let position = match self
            .hooks
            .iter()
            .position(|h| h.registration == *registration)
        {
            Some(position) => position,
            None => {
                let program = find_account(self.accounts, &registration.program)?;
                self.hooks.push(CpiHook {
                    registration: registration.clone(),
                    program,
                    context_authority: self.context_authority,
                    accounts: self.accounts,
                    context_signer_seeds: self.context_signer_seeds,
                });
                self.hooks.len() - 1
            }
        };
        Ok(&mut self.hooks[position])
    }
}

/// Dispatches executions as CPIs signed by the vault authority PDA
pub struct CpiDispatcher<'a, 'info> {
    pub vault_authority: &'a AccountInfo<'info>,
    pub system_program: &'a AccountInfo<'info>,
    pub accounts: &'a [AccountInfo<'info>],
    pub signer_seeds: &'a [&'a [&'a [u8]]],
}

impl<'a, 'info> Dispatcher for CpiDispatcher<'a, 'info> {
    fn dispatch(&mut self, execution: &Execution) -> Result<Vec<u8>> {
        let target = find_account(self.accounts, &execution.target)?;

        if execution.value > 0 {
            invoke_signed(
                &system_instruction::transfer(
                    self.vault_authority.key,
                    target.key,
                    execution.value,
                ),
                &[
                    self.vault_authority.clone(),
                    target.clone(),
                    self.system_program.clone(),
                ],
                self.signer_seeds,
            )?;
        }

        let metas = execution
            .accounts
            .iter()
            .map(|a| AccountMeta {
                pubkey: a.pubkey,
                is_signer: a.is_signer || a.pubkey == *self.vault_authority.key,
                is_writable: a.is_writable,
            })
            .collect();

        let ix = Instruction {
            program_id: execution.target,
            accounts: metas,
            data: execution.data.clone(),
        };

        let mut infos = Vec::with_capacity(self.accounts.len() + 1);
        infos.push(self.vault_authority.clone());
        infos.extend(self.accounts.iter().cloned());

        invoke_signed(&ix, &infos, self.signer_seeds)?;

        Ok(return_data_from(&execution.target).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_spl::token::ID as TOKEN_PROGRAM_ID;

    #[test]
    fn test_context_calls_never_carry_vault_authority_signature() {
        let hook_program = Pubkey::new_unique();
        let context_authority = Pubkey::new_unique();
        let vault_authority = Pubkey::new_unique();
        let custody = Pubkey::new_unique();
        let system_program = Pubkey::default();

        for access in [HookCallAccess::ReadOnly, HookCallAccess::Context] {
            let authority = hook_account_meta(
                &vault_authority,
                &system_program,
                true,
                &hook_program,
                access,
            );
            assert!(!authority.is_signer && !authority.is_writable);

            let custody =
                hook_account_meta(&custody, &TOKEN_PROGRAM_ID, true, &hook_program, access);
            assert!(!custody.is_signer && !custody.is_writable);
        }

        let context = context_authority_meta(&context_authority, HookCallAccess::Context);
        assert!(context.is_signer && !context.is_writable);
        let query = context_authority_meta(&context_authority, HookCallAccess::ReadOnly);
        assert!(!query.is_signer);
    }

    #[test]
    fn test_hook_writes_only_its_own_accounts_during_context() {
        let hook_program = Pubkey::new_unique();
        let scratch = Pubkey::new_unique();

        let meta = |is_writable, access| {
            hook_account_meta(&scratch, &hook_program, is_writable, &hook_program, access)
        };

        assert!(meta(true, HookCallAccess::Context).is_writable);
        assert!(!meta(true, HookCallAccess::ReadOnly).is_writable);
        // Never upgrades an account the outer instruction passed read-only
        assert!(!meta(false, HookCallAccess::Context).is_writable);
    }

    #[test]
    fn test_discriminator_matches_anchor_preimage() {
        let mut hasher = Sha256::new();
        hasher.update(b"global:build_executions");
        let hash = hasher.finalize();
        assert_eq!(
            hook_instruction_discriminator("build_executions").as_slice(),
            &hash[..8]
        );
    }
}
