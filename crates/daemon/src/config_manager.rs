// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Config Manager: the single-writer owner of the running and staged
//! [`Config`], and the driver of the fixed apply-hook pipeline. One
//! `Arc`-held struct guards the mutable world the listener's
//! per-connection tasks all reach into, exposing a `running`/`staged`
//! config pair behind an ordered hook pipeline.

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use ward_adapters::{IpSetMember, PacketFilter, PacketFilterError};
use ward_core::{diff, Bond, Config, ConfigDiff, HookError, Interface, Vlan, ValidationReport, WardError};
use ward_storage::{BackupRecord, BackupStore, StorageError};

use crate::ApplyHookHandle;

#[derive(Debug, Error)]
pub enum ConfigManagerError {
    #[error("no configuration is currently staged")]
    NothingStaged,
    #[error("staged configuration failed validation: {0:?}")]
    ValidationFailed(ValidationReport),
    #[error("apply hook {hook} failed: {source}")]
    HookFailed { hook: &'static str, source: HookError },
    #[error("no such interface: {0}")]
    UnknownInterface(String),
    #[error("interface {0} already exists")]
    DuplicateInterface(String),
    #[error("no such vlan {vlan_id} on interface {interface}")]
    UnknownVlan { interface: String, vlan_id: u16 },
    #[error(transparent)]
    PacketFilter(#[from] PacketFilterError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("no backup found for the requested rollback target")]
    NoSuchBackup,
    #[error("no safe-apply window is currently open")]
    NoSafeApplyPending,
    #[error("safe mode is active, mutating operations are refused")]
    SafeModeActive,
}

impl From<ConfigManagerError> for WardError {
    fn from(err: ConfigManagerError) -> Self {
        match err {
            ConfigManagerError::PacketFilter(e) => e.into(),
            ConfigManagerError::Storage(e) => e.into(),
            ConfigManagerError::SafeModeActive => {
                WardError::AuthorizationDenied("safe mode is active".to_string())
            }
            other => WardError::KernelApplyFailed(other.to_string()),
        }
    }
}

/// Owns the running/staged config pair and the fixed apply-hook pipeline.
///
/// `stage_lock` serializes `Stage`/`Apply`/`Rollback` against each other
/// (single-writer); `running`/`staged` use their own locks so a
/// concurrent `GetConfig`/`GetStatus` read never blocks behind a stage or
/// apply in progress any longer than it takes to clone an `Arc`.
///
/// `packet_filter` is held separately from `apply_hooks`: ipset membership
/// (`AuthorizeIp`/`RevokeIp`) is dynamic runtime state, not part of the
/// declarative [`Config`] tree, so it bypasses staging and the hook
/// pipeline entirely and talks to the kernel directly — mirroring how the
/// DNS Egress Authorizer mutates dynamic ipsets out-of-band from `Apply`.
pub struct ConfigManager {
    running: RwLock<Arc<Config>>,
    staged: Mutex<Option<Config>>,
    apply_hooks: Vec<ApplyHookHandle>,
    stage_lock: Mutex<()>,
    backups: BackupStore,
    running_config_path: PathBuf,
    packet_filter: Arc<dyn PacketFilter>,
    safe_apply: Mutex<Option<(CancellationToken, Arc<Config>)>>,
    generation: AtomicU64,
    safe_mode: AtomicBool,
}

impl ConfigManager {
    pub fn new(
        running: Config,
        apply_hooks: Vec<ApplyHookHandle>,
        running_config_path: PathBuf,
        state_dir: PathBuf,
        packet_filter: Arc<dyn PacketFilter>,
    ) -> Self {
        Self {
            running: RwLock::new(Arc::new(running)),
            staged: Mutex::new(None),
            apply_hooks,
            stage_lock: Mutex::new(()),
            backups: BackupStore::new(state_dir),
            running_config_path,
            packet_filter,
            safe_apply: Mutex::new(None),
            generation: AtomicU64::new(0),
            safe_mode: AtomicBool::new(false),
        }
    }

    /// Monotonic count of successful `Apply`s, reported in `GetStatus`.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn in_safe_mode(&self) -> bool {
        self.safe_mode.load(Ordering::SeqCst)
    }

    /// `SafeModeEnter`: an emergency lockdown — every mutating operation
    /// that would otherwise run the apply-hook pipeline is refused until
    /// [`Self::exit_safe_mode`]. `GetStatus`/`Ping`/queries stay available.
    pub fn enter_safe_mode(&self) {
        self.safe_mode.store(true, Ordering::SeqCst);
        warn!("entering safe mode, mutating operations refused until exit");
    }

    pub fn exit_safe_mode(&self) {
        self.safe_mode.store(false, Ordering::SeqCst);
        info!("safe mode exited");
    }

    pub fn running(&self) -> Arc<Config> {
        self.running.read().clone()
    }

    pub fn staged(&self) -> Option<Config> {
        self.staged.lock().clone()
    }

    /// `Stage`: replace the staged document. Does not touch `running` and
    /// performs no hook work; only [`Self::apply`] does.
    pub fn stage(&self, candidate: Config) {
        let _guard = self.stage_lock.lock();
        *self.staged.lock() = Some(candidate);
    }

    pub fn discard(&self) {
        let _guard = self.stage_lock.lock();
        *self.staged.lock() = None;
    }

    /// `Validate`: structural/referential check of the staged document in
    /// isolation (no kernel I/O).
    pub fn validate(&self) -> Result<ValidationReport, ConfigManagerError> {
        let staged = self.staged.lock().clone().ok_or(ConfigManagerError::NothingStaged)?;
        Ok(ward_core::validate(&staged))
    }

    /// `DryRun`: the diff `Apply` would act on, without running any hook.
    pub fn dry_run(&self) -> Result<ConfigDiff, ConfigManagerError> {
        let staged = self.staged.lock().clone().ok_or(ConfigManagerError::NothingStaged)?;
        let running = self.running.read().clone();
        Ok(diff(&running, &staged))
    }

    /// `Apply`: validate, then run every hook in registration order against
    /// (running, staged). On the first hook failure, every hook that
    /// already succeeded is rolled back in reverse order against the
    /// still-current `running`, and the staged document is left in place
    /// so the operator can fix and retry.
    pub async fn apply(&self) -> Result<(), ConfigManagerError> {
        if self.in_safe_mode() {
            return Err(ConfigManagerError::SafeModeActive);
        }
        let _guard = self.stage_lock.lock();
        let staged = self.staged.lock().clone().ok_or(ConfigManagerError::NothingStaged)?;

        let report = ward_core::validate(&staged);
        if !report.is_valid() {
            return Err(ConfigManagerError::ValidationFailed(report));
        }

        let running = self.running.read().clone();
        let mut applied: Vec<&ApplyHookHandle> = Vec::with_capacity(self.apply_hooks.len());
        for hook in &self.apply_hooks {
            if let Err(source) = hook.apply(&running, &staged).await {
                warn!(hook = hook.name(), %source, "apply hook failed, rolling back");
                for rolled_back in applied.iter().rev() {
                    if let Err(e) = rolled_back.rollback(&running).await {
                        warn!(hook = rolled_back.name(), error = %e, "rollback hook also failed");
                    }
                }
                return Err(ConfigManagerError::HookFailed { hook: hook.name(), source });
            }
            applied.push(hook);
        }

        *self.running.write() = Arc::new(staged.clone());
        *self.staged.lock() = None;
        self.persist(&staged)?;
        self.generation.fetch_add(1, Ordering::SeqCst);
        info!("configuration applied");
        Ok(())
    }

    /// `Rollback`: restore a prior backed-up generation and drive it
    /// through the same apply pipeline. `generation` selects a backup id
    /// by position in the list (`None` = most recent); a real deployment
    /// would key this by `ConfigMeta::generation` once backups carry one.
    pub async fn rollback(&self, generation: Option<u64>) -> Result<(), ConfigManagerError> {
        let backups = self.backups.list()?;
        let target = match generation {
            Some(gen) => backups.get(gen as usize).ok_or(ConfigManagerError::NoSuchBackup)?,
            None => backups.first().ok_or(ConfigManagerError::NoSuchBackup)?,
        };
        let restored = self.backups.restore(&target.id)?;
        self.stage(restored);
        self.apply().await
    }

    /// `SafeApply`: apply now, but arm an automatic revert unless
    /// [`Self::safe_apply_confirm`] lands within `window`. Grounded on the
    /// same rollback-in-reverse mechanics `apply` already uses — a revert
    /// is just "stage the pre-apply snapshot and apply it".
    pub async fn safe_apply(self: &Arc<Self>, window: Duration) -> Result<(), ConfigManagerError> {
        let previous = self.running();
        self.apply().await?;

        let token = CancellationToken::new();
        *self.safe_apply.lock() = Some((token.clone(), previous));

        let this = Arc::clone(self);
        tokio::spawn(async move {
            tokio::select! {
                () = tokio::time::sleep(window) => {
                    warn!("safe-apply window expired unconfirmed, auto-reverting");
                    this.safe_apply_auto_revert().await;
                }
                () = token.cancelled() => {}
            }
        });
        Ok(())
    }

    /// `SafeApplyConfirm`: cancel the pending auto-revert, keeping the
    /// applied configuration.
    pub fn safe_apply_confirm(&self) -> Result<(), ConfigManagerError> {
        match self.safe_apply.lock().take() {
            Some((token, _previous)) => {
                token.cancel();
                Ok(())
            }
            None => Err(ConfigManagerError::NoSafeApplyPending),
        }
    }

    /// `SafeApplyCancel`: revert immediately instead of waiting out the
    /// window.
    pub async fn safe_apply_cancel(&self) -> Result<(), ConfigManagerError> {
        let pending = self.safe_apply.lock().take();
        match pending {
            Some((token, previous)) => {
                token.cancel();
                self.revert_to(&previous).await
            }
            None => Err(ConfigManagerError::NoSafeApplyPending),
        }
    }

    async fn safe_apply_auto_revert(&self) {
        let pending = self.safe_apply.lock().take();
        if let Some((_token, previous)) = pending {
            if let Err(e) = self.revert_to(&previous).await {
                warn!(error = %e, "safe-apply auto-revert failed");
            }
        }
    }

    async fn revert_to(&self, previous: &Arc<Config>) -> Result<(), ConfigManagerError> {
        self.stage((**previous).clone());
        self.apply().await
    }

    /// `AddInterface`.
    pub async fn add_interface(&self, interface: Interface) -> Result<(), ConfigManagerError> {
        let mut candidate = (*self.running()).clone();
        if candidate.interface(&interface.name).is_some() {
            return Err(ConfigManagerError::DuplicateInterface(interface.name));
        }
        candidate.interfaces.push(interface);
        self.stage(candidate);
        self.apply().await
    }

    /// `UpdateInterface`.
    pub async fn update_interface(
        &self,
        name: &str,
        interface: Interface,
    ) -> Result<(), ConfigManagerError> {
        let mut candidate = (*self.running()).clone();
        let slot = candidate
            .interfaces
            .iter_mut()
            .find(|i| i.name == name)
            .ok_or_else(|| ConfigManagerError::UnknownInterface(name.to_string()))?;
        *slot = interface;
        self.stage(candidate);
        self.apply().await
    }

    /// `RemoveInterface`.
    pub async fn remove_interface(&self, name: &str) -> Result<(), ConfigManagerError> {
        let mut candidate = (*self.running()).clone();
        let before = candidate.interfaces.len();
        candidate.interfaces.retain(|i| i.name != name);
        if candidate.interfaces.len() == before {
            return Err(ConfigManagerError::UnknownInterface(name.to_string()));
        }
        self.stage(candidate);
        self.apply().await
    }

    /// `AddVlan`.
    pub async fn add_vlan(&self, interface: &str, vlan: Vlan) -> Result<(), ConfigManagerError> {
        let mut candidate = (*self.running()).clone();
        let slot = candidate
            .interfaces
            .iter_mut()
            .find(|i| i.name == interface)
            .ok_or_else(|| ConfigManagerError::UnknownInterface(interface.to_string()))?;
        slot.vlans.push(vlan);
        self.stage(candidate);
        self.apply().await
    }

    /// `RemoveVlan`.
    pub async fn remove_vlan(&self, interface: &str, vlan_id: u16) -> Result<(), ConfigManagerError> {
        let mut candidate = (*self.running()).clone();
        let slot = candidate
            .interfaces
            .iter_mut()
            .find(|i| i.name == interface)
            .ok_or_else(|| ConfigManagerError::UnknownInterface(interface.to_string()))?;
        let before = slot.vlans.len();
        slot.vlans.retain(|v| v.id != vlan_id);
        if slot.vlans.len() == before {
            return Err(ConfigManagerError::UnknownVlan {
                interface: interface.to_string(),
                vlan_id,
            });
        }
        self.stage(candidate);
        self.apply().await
    }

    /// `SetBond`.
    pub async fn set_bond(&self, interface: &str, bond: Bond) -> Result<(), ConfigManagerError> {
        let mut candidate = (*self.running()).clone();
        let slot = candidate
            .interfaces
            .iter_mut()
            .find(|i| i.name == interface)
            .ok_or_else(|| ConfigManagerError::UnknownInterface(interface.to_string()))?;
        slot.bond = Some(bond);
        self.stage(candidate);
        self.apply().await
    }

    /// `RemoveBond`.
    pub async fn remove_bond(&self, interface: &str) -> Result<(), ConfigManagerError> {
        let mut candidate = (*self.running()).clone();
        let slot = candidate
            .interfaces
            .iter_mut()
            .find(|i| i.name == interface)
            .ok_or_else(|| ConfigManagerError::UnknownInterface(interface.to_string()))?;
        slot.bond = None;
        self.stage(candidate);
        self.apply().await
    }

    /// `AuthorizeIp`/`RevokeIp`/`ListIpSet`/`CheckIpSet`: dynamic ipset
    /// membership, mutated directly against the kernel without touching
    /// `running`/`staged` or running the apply-hook pipeline.
    pub async fn authorize_ip(
        &self,
        set: &str,
        ip: IpAddr,
        ttl: Duration,
    ) -> Result<(), ConfigManagerError> {
        Ok(self.packet_filter.authorize_ip(set, ip, ttl).await?)
    }

    pub async fn revoke_ip(&self, set: &str, ip: IpAddr) -> Result<(), ConfigManagerError> {
        Ok(self.packet_filter.revoke_ip(set, ip).await?)
    }

    pub async fn list_ipset(&self, set: &str) -> Result<Vec<IpSetMember>, ConfigManagerError> {
        Ok(self.packet_filter.list_ipset(set).await?)
    }

    pub async fn check_ipset(&self, set: &str, ip: IpAddr) -> Result<bool, ConfigManagerError> {
        Ok(self.packet_filter.check_ipset(set, ip).await?)
    }

    /// `BackupCreate`.
    pub fn backup_create(&self, comment: Option<String>) -> Result<BackupRecord, ConfigManagerError> {
        let running = self.running();
        Ok(self.backups.create(&running, comment, jiff::Timestamp::now())?)
    }

    /// `BackupList`.
    pub fn backup_list(&self) -> Result<Vec<ward_storage::BackupSummary>, ConfigManagerError> {
        Ok(self.backups.list()?)
    }

    /// `BackupRestore`: loads the named backup and stages it for review,
    /// distinct from `Rollback`'s immediate reapply — the operator may
    /// still want to inspect or edit before committing.
    pub fn backup_restore(&self, id: &str) -> Result<(), ConfigManagerError> {
        let restored = self.backups.restore(id)?;
        self.stage(restored);
        Ok(())
    }

    /// `BackupPin`.
    pub fn backup_pin(&self, id: &str, pinned: bool) -> Result<BackupRecord, ConfigManagerError> {
        Ok(self.backups.set_pinned(id, pinned)?)
    }

    /// `RegisterApplyHook`: only called during startup, before the listener
    /// accepts its first connection — the fixed order (Network Reconciler,
    /// then DNS Wall resync) is established once and never mutated again
    /// for the life of the process.
    pub fn register_apply_hook(&mut self, hook: ApplyHookHandle) {
        self.apply_hooks.push(hook);
    }

    fn persist(&self, config: &Config) -> Result<(), ConfigManagerError> {
        let body = hcl::to_string(config).map_err(|e| std::io::Error::other(e.to_string()))?;
        if let Some(parent) = self.running_config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.running_config_path, body)?;

        if let Err(e) = self.backups.create(config, None, jiff::Timestamp::now()) {
            warn!(error = %e, "failed to write config backup after apply");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_manager_tests.rs"]
mod tests;
