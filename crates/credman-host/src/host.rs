//! Version-aware host facade for picker output.
//!
//! `default_credman()` returns a process-wide `&dyn Credman` backed by a
//! zero-sized singleton chosen from `GetWasmVersion`. Base (v1) picker calls
//! are available on the trait directly; the entry-set calls of v2 hosts are
//! reached through `as_v2()`, which returns `None` when the host predates
//! them.

use crate::abi;

/// Borrowed request for `AddStringIdEntry`.
#[derive(Debug, Clone, Copy)]
pub struct StringIdEntryRequest<'a> {
    /// Identifier returned by the host when this row is selected.
    pub cred_id: &'a str,
    /// Optional icon bytes, passed through opaquely.
    pub icon: Option<&'a [u8]>,
    /// Primary text shown on the row.
    pub title: &'a str,
    /// Optional secondary text shown under `title`.
    pub subtitle: Option<&'a str>,
    /// Optional legal/disclaimer text.
    pub disclaimer: Option<&'a str>,
    /// Optional warning text highlighted by the host.
    pub warning: Option<&'a str>,
}

/// Borrowed request for `AddFieldForStringIdEntry`.
#[derive(Debug, Clone, Copy)]
pub struct FieldForStringIdEntryRequest<'a> {
    /// Entry identifier that previously appeared in `add_string_id_entry`.
    pub cred_id: &'a str,
    /// User-facing field label.
    pub field_display_name: &'a str,
    /// Optional field value.
    pub field_display_value: Option<&'a str>,
}

/// Borrowed request for `AddEntrySet`.
#[derive(Debug, Clone, Copy)]
pub struct EntrySetRequest<'a> {
    /// Stable set identifier used by subsequent set APIs.
    pub set_id: &'a str,
    /// Number of set slots expected by the host.
    pub set_length: i32,
}

/// Borrowed request for `AddEntryToSet`.
#[derive(Debug, Clone, Copy)]
pub struct EntryToSetRequest<'a> {
    /// Identifier returned by the host when this set option is selected.
    pub cred_id: &'a str,
    /// Optional icon bytes.
    pub icon: Option<&'a [u8]>,
    /// Primary row text.
    pub title: &'a str,
    /// Optional secondary row text.
    pub subtitle: Option<&'a str>,
    /// Optional disclaimer text.
    pub disclaimer: Option<&'a str>,
    /// Optional warning text.
    pub warning: Option<&'a str>,
    /// Optional opaque callback payload.
    pub metadata: Option<&'a str>,
    /// Target set identifier.
    pub set_id: &'a str,
    /// 0-based slot index within `set_id`.
    pub set_index: i32,
}

/// Borrowed request for `AddFieldToEntrySet`.
#[derive(Debug, Clone, Copy)]
pub struct FieldToEntrySetRequest<'a> {
    /// Entry identifier previously emitted for this set slot.
    pub cred_id: &'a str,
    /// User-facing field label.
    pub field_display_name: &'a str,
    /// Optional field value.
    pub field_display_value: Option<&'a str>,
    /// Target set identifier.
    pub set_id: &'a str,
    /// 0-based slot index for the entry.
    pub set_index: i32,
}

/// Base picker contract, available on every host version.
pub trait Credman: Sync {
    /// Host-reported version from `GetWasmVersion`.
    fn wasm_version(&self) -> u32;

    /// Adds a standalone credential entry.
    fn add_string_id_entry(&self, req: &StringIdEntryRequest<'_>) {
        abi::add_string_id_entry(
            req.cred_id,
            req.icon,
            req.title,
            req.subtitle,
            req.disclaimer,
            req.warning,
        );
    }

    /// Adds a field to a standalone credential entry.
    fn add_field_for_string_id_entry(&self, req: &FieldForStringIdEntryRequest<'_>) {
        abi::add_field_for_string_id_entry(
            req.cred_id,
            req.field_display_name,
            req.field_display_value,
        );
    }

    /// Returns `Some` when the entry-set APIs are supported (`credman_v2`).
    fn as_v2(&self) -> Option<&dyn CredmanV2> {
        None
    }
}

/// Version 2 host extension (`credman_v2`).
pub trait CredmanV2: Credman {
    /// Creates a set container.
    fn add_entry_set(&self, req: &EntrySetRequest<'_>) {
        abi::add_entry_set(req.set_id, req.set_length);
    }

    /// Adds a credential entry into a set slot.
    fn add_entry_to_set(&self, req: &EntryToSetRequest<'_>) {
        abi::add_entry_to_set(
            req.cred_id,
            req.icon,
            req.title,
            req.subtitle,
            req.disclaimer,
            req.warning,
            req.metadata,
            req.set_id,
            req.set_index,
        );
    }

    /// Adds a field to an entry inside a set slot.
    fn add_field_to_entry_set(&self, req: &FieldToEntrySetRequest<'_>) {
        abi::add_field_to_entry_set(
            req.cred_id,
            req.field_display_name,
            req.field_display_value,
            req.set_id,
            req.set_index,
        );
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HostCredmanV1;

#[derive(Debug, Clone, Copy, Default)]
pub struct HostCredmanV2;

static HOST_V1: HostCredmanV1 = HostCredmanV1;
static HOST_V2: HostCredmanV2 = HostCredmanV2;

/// Returns the process-wide host facade selected by `GetWasmVersion`.
pub fn default_credman() -> &'static dyn Credman {
    match abi::get_wasm_version() {
        0 | 1 => &HOST_V1,
        _ => &HOST_V2,
    }
}

impl Credman for HostCredmanV1 {
    fn wasm_version(&self) -> u32 {
        abi::get_wasm_version()
    }
}

impl Credman for HostCredmanV2 {
    fn wasm_version(&self) -> u32 {
        abi::get_wasm_version()
    }

    fn as_v2(&self) -> Option<&dyn CredmanV2> {
        Some(self)
    }
}

impl CredmanV2 for HostCredmanV2 {}
