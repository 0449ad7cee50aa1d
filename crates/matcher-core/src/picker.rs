use crate::catalog::{Catalog, Credential};
use credman_host::{
    Credman, CredmanV2, EntrySetRequest, EntryToSetRequest, FieldForStringIdEntryRequest,
    FieldToEntrySetRequest, StringIdEntryRequest,
};
use matcher_dcql::Combination;
use rustc_hash::FxHashSet;

/// Emits the combinations of one request to the host picker.
///
/// Hosts with the entry-set APIs get one entry set per combination; older
/// hosts get flat entries with duplicate suppression by document id, scoped
/// to the whole envelope through `used_document_ids`.
pub fn emit_combinations(
    host: &dyn Credman,
    catalog: &Catalog,
    protocol: &str,
    combinations: &[Combination<usize, usize>],
    used_document_ids: &mut FxHashSet<String>,
) {
    match host.as_v2() {
        Some(v2) => emit_entry_sets(v2, catalog, protocol, combinations),
        None => emit_flat_entries(host, catalog, protocol, combinations, used_document_ids),
    }
}

fn emit_entry_sets(
    v2: &dyn CredmanV2,
    catalog: &Catalog,
    protocol: &str,
    combinations: &[Combination<usize, usize>],
) {
    for combination in combinations {
        let set_id = format!("{} {}", combination.number, protocol);
        v2.add_entry_set(&EntrySetRequest {
            set_id: &set_id,
            set_length: combination.elements.len() as i32,
        });
        for (set_index, element) in combination.elements.iter().enumerate() {
            for matched in &element.matches {
                let credential = &catalog.credentials[matched.credential];
                let entry_id = entry_id(combination.number, protocol, credential);
                v2.add_entry_to_set(&EntryToSetRequest {
                    cred_id: &entry_id,
                    icon: icon_of(credential),
                    title: &credential.title,
                    subtitle: Some(credential.subtitle.as_str()),
                    disclaimer: None,
                    warning: None,
                    metadata: None,
                    set_id: &set_id,
                    set_index: set_index as i32,
                });
                for claim_index in &matched.claims {
                    let claim = &credential.claims[*claim_index];
                    v2.add_field_to_entry_set(&FieldToEntrySetRequest {
                        cred_id: &entry_id,
                        field_display_name: &claim.display_name,
                        field_display_value: Some(claim.value.as_str()),
                        set_id: &set_id,
                        set_index: set_index as i32,
                    });
                }
            }
        }
    }
}

fn emit_flat_entries(
    host: &dyn Credman,
    catalog: &Catalog,
    protocol: &str,
    combinations: &[Combination<usize, usize>],
    used_document_ids: &mut FxHashSet<String>,
) {
    for combination in combinations {
        // The flat picker cannot express alternatives or multi-credential
        // combinations; the first match of the first element stands for the
        // whole combination, remaining elements are dropped.
        let Some(matched) = combination
            .elements
            .first()
            .and_then(|element| element.matches.first())
        else {
            continue;
        };
        let credential = &catalog.credentials[matched.credential];
        if !used_document_ids.insert(credential.document_id.clone()) {
            continue;
        }
        let entry_id = entry_id(combination.number, protocol, credential);
        host.add_string_id_entry(&StringIdEntryRequest {
            cred_id: &entry_id,
            icon: icon_of(credential),
            title: &credential.title,
            subtitle: Some(credential.subtitle.as_str()),
            disclaimer: None,
            warning: None,
        });
        for claim_index in &matched.claims {
            let claim = &credential.claims[*claim_index];
            host.add_field_for_string_id_entry(&FieldForStringIdEntryRequest {
                cred_id: &entry_id,
                field_display_name: &claim.display_name,
                field_display_value: Some(claim.value.as_str()),
            });
        }
    }
}

fn entry_id(combination_number: usize, protocol: &str, credential: &Credential) -> String {
    format!(
        "{} {} {}",
        combination_number, protocol, credential.document_id
    )
}

fn icon_of(credential: &Credential) -> Option<&[u8]> {
    (!credential.bitmap.is_empty()).then_some(credential.bitmap.as_slice())
}
