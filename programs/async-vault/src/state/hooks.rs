use anchor_lang::prelude::*;

use crate::constants::MAX_HOOKS;
use crate::errors::VaultError;

/// Opaque fixed-size hook identifier
pub type HookId = [u8; 32];

/// Installed hook: identifier → hook program
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct HookRegistration {
    pub id: HookId,        // 32 bytes
    pub program: Pubkey,   // 32 bytes
    /// Hook answers `get_output_amount` for the next hook in a chain
    pub has_output: bool,  // 1 byte
}

/// Enumerable set of installed hooks, consulted read-only by the hook chain
#[account]
#[derive(Default)]
pub struct HookRegistry {
    /// Vault this registry belongs to
    pub vault: Pubkey,                   // 32 bytes

    pub hooks: Vec<HookRegistration>,    // 4 + (n * 65) bytes

    /// Bump seed for PDA
    pub bump: u8,                        // 1 byte
}

impl HookRegistry {
    /// 8 (discriminator) + 32 (vault) + 4 (vec len) + (16 * 65) + 1 (bump)
    pub const SPACE: usize = 8 + 32 + 4 + (MAX_HOOKS * 65) + 1;

    pub fn is_installed(&self, id: &HookId) -> bool {
        self.hooks.iter().any(|h| h.id == *id)
    }

    /// Registration installed under `id`
    pub fn resolve(&self, id: &HookId) -> Result<&HookRegistration> {
        self.hooks
            .iter()
            .find(|h| h.id == *id)
            .ok_or(error!(VaultError::HookNotInstalled))
    }

    pub fn install(&mut self, id: HookId, program: Pubkey, has_output: bool) -> Result<()> {
        require_keys_neq!(program, Pubkey::default(), VaultError::NullHookHandle);
        require!(!self.is_installed(&id), VaultError::HookAlreadyInstalled);
        require!(self.hooks.len() < MAX_HOOKS, VaultError::RegistryFull);

        self.hooks.push(HookRegistration {
            id,
            program,
            has_output,
        });
        Ok(())
    }

    /// Returns the program that was installed under `id`
    pub fn uninstall(&mut self, id: &HookId) -> Result<Pubkey> {
        let position = self
            .hooks
            .iter()
            .position(|h| h.id == *id)
            .ok_or(VaultError::HookNotInstalled)?;
        Ok(self.hooks.remove(position).program)
    }

    pub fn ids(&self) -> impl Iterator<Item = &HookId> {
        self.hooks.iter().map(|h| &h.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_resolve_uninstall() {
        let mut registry = HookRegistry::default();
        let program = Pubkey::new_unique();

        registry.install([1; 32], program, true).unwrap();
        assert_eq!(registry.resolve(&[1; 32]).unwrap().program, program);
        assert!(registry.resolve(&[1; 32]).unwrap().has_output);
        assert_eq!(registry.ids().count(), 1);

        assert_eq!(registry.uninstall(&[1; 32]).unwrap(), program);
        assert!(registry.resolve(&[1; 32]).is_err());
    }

    #[test]
    fn test_install_rejects_null_and_duplicate() {
        let mut registry = HookRegistry::default();

        assert!(registry.install([1; 32], Pubkey::default(), false).is_err());

        registry.install([1; 32], Pubkey::new_unique(), false).unwrap();
        assert!(registry.install([1; 32], Pubkey::new_unique(), false).is_err());
        assert_eq!(registry.hooks.len(), 1);
    }

    #[test]
    fn test_uninstall_unknown_fails() {
        let mut registry = HookRegistry::default();
        assert!(registry.uninstall(&[9; 32]).is_err());
    }

    #[test]
    fn test_same_program_under_two_ids() {
        let mut registry = HookRegistry::default();
        let program = Pubkey::new_unique();

        registry.install([1; 32], program, false).unwrap();
        registry.install([2; 32], program, false).unwrap();
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec![&[1; 32], &[2; 32]]);
    }

    #[test]
    fn test_registry_capacity() {
        let mut registry = HookRegistry::default();
        for i in 0..MAX_HOOKS {
            registry.install([i as u8; 32], Pubkey::new_unique(), false).unwrap();
        }
        assert!(registry.install([255; 32], Pubkey::new_unique(), false).is_err());
    }
}
