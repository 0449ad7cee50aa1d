use crate::error::CatalogError;
use matcher_cbor::{Item, Map};
use matcher_dcql::{ClaimsQuery, CredentialStore};
use tracing::Level;

/// One disclosable attribute of a credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    /// Canonical name: `namespace.dataElement` for mdoc claims, the dotted
    /// claim path for VC claims.
    pub claim_name: String,
    /// Label shown in the picker.
    pub display_name: String,
    /// Rendered value shown in the picker.
    pub value: String,
    /// Canonicalized form used for DCQL value matching. May differ from
    /// `value`.
    pub match_value: String,
}

/// One catalog entry: a document with an mdoc and/or a VC projection.
///
/// Loaded once per invocation and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct Credential {
    pub title: String,
    pub subtitle: String,
    /// Opaque icon bytes, passed to the picker untouched.
    pub bitmap: Vec<u8>,
    /// Stable identifier within the catalog.
    pub document_id: String,
    /// Empty iff this credential has no mdoc projection.
    pub mdoc_doc_type: String,
    /// Empty iff this credential has no VC projection.
    pub vc_vct: String,
    /// Flat claim list in catalog order; both projections share it, their
    /// claims distinguishable by key shape.
    pub claims: Vec<Claim>,
}

impl Credential {
    /// Index of the claim with this canonical name.
    pub fn find_claim(&self, claim_name: &str) -> Option<usize> {
        self.claims
            .iter()
            .position(|claim| claim.claim_name == claim_name)
    }
}

/// The wallet's registered credential catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Wire protocols this wallet understands.
    pub protocols: Vec<String>,
    pub credentials: Vec<Credential>,
    /// Diagnostics level configured by the wallet, if any.
    pub log_level: Option<Level>,
}

impl Catalog {
    /// Decodes the catalog blob.
    ///
    /// Fail-soft: any decode error yields an empty catalog, which matches
    /// nothing and keeps the invocation alive.
    pub fn load(bytes: &[u8]) -> Catalog {
        match Self::parse(bytes) {
            Ok(catalog) => catalog,
            Err(error) => {
                tracing::warn!(%error, "catalog decode failed; continuing with empty catalog");
                Catalog::default()
            }
        }
    }

    fn parse(bytes: &[u8]) -> Result<Catalog, CatalogError> {
        let (item, _) = matcher_cbor::parse(bytes)?;
        let top = as_map(&item, "catalog")?;

        let mut protocols = Vec::new();
        for protocol in as_array(required(top, "catalog", "protocols")?, "protocols")? {
            protocols.push(as_tstr(protocol, "protocols")?.to_string());
        }

        let mut credentials = Vec::new();
        for entry in as_array(required(top, "catalog", "credentials")?, "credentials")? {
            credentials.push(parse_credential(as_map(entry, "credential")?)?);
        }

        let log_level = top
            .get("logLevel")
            .and_then(Item::as_tstr)
            .and_then(parse_log_level);

        Ok(Catalog {
            protocols,
            credentials,
            log_level,
        })
    }

    /// True when the wallet declared support for this wire protocol.
    pub fn supports_protocol(&self, protocol: &str) -> bool {
        self.protocols.iter().any(|entry| entry == protocol)
    }
}

fn parse_credential(cred: &Map) -> Result<Credential, CatalogError> {
    let mut out = Credential {
        title: as_tstr(required(cred, "credential", "title")?, "title")?.to_string(),
        subtitle: as_tstr(required(cred, "credential", "subtitle")?, "subtitle")?.to_string(),
        bitmap: as_bstr(required(cred, "credential", "bitmap")?, "bitmap")?.to_vec(),
        ..Credential::default()
    };

    if let Some(mdoc) = cred.get("mdoc") {
        let mdoc = as_map(mdoc, "mdoc")?;
        out.document_id = as_tstr(required(mdoc, "mdoc", "documentId")?, "documentId")?.to_string();
        out.mdoc_doc_type = as_tstr(required(mdoc, "mdoc", "docType")?, "docType")?.to_string();

        let namespaces = as_map(required(mdoc, "mdoc", "namespaces")?, "namespaces")?;
        for (namespace_key, elements) in namespaces.iter() {
            let namespace_name = as_tstr(namespace_key, "namespaces")?;
            let elements = as_map(elements, "namespaces")?;
            for (element_key, details) in elements.iter() {
                let element_name = as_tstr(element_key, "dataElements")?;
                let claim_name = format!("{namespace_name}.{element_name}");
                insert_claim(&mut out.claims, parse_claim_details(claim_name, details)?);
            }
        }
    }

    if let Some(sdjwt) = cred.get("sdjwt") {
        let sdjwt = as_map(sdjwt, "sdjwt")?;
        let document_id =
            as_tstr(required(sdjwt, "sdjwt", "documentId")?, "documentId")?.to_string();
        if !out.document_id.is_empty() && out.document_id != document_id {
            tracing::warn!(
                mdoc = out.document_id.as_str(),
                sdjwt = document_id.as_str(),
                "credential projections disagree on documentId"
            );
        }
        out.document_id = document_id;
        out.vc_vct = as_tstr(required(sdjwt, "sdjwt", "vct")?, "vct")?.to_string();

        let claims = as_map(required(sdjwt, "sdjwt", "claims")?, "claims")?;
        for (claim_key, details) in claims.iter() {
            let claim_name = as_tstr(claim_key, "claims")?.to_string();
            insert_claim(&mut out.claims, parse_claim_details(claim_name, details)?);
        }
    }

    if out.mdoc_doc_type.is_empty() && out.vc_vct.is_empty() {
        return Err(CatalogError::NoProjection);
    }
    Ok(out)
}

// Claim details are a [displayName, value, matchValue] array.
fn parse_claim_details(claim_name: String, details: &Item) -> Result<Claim, CatalogError> {
    let details = as_array(details, "claim details")?;
    let mut fields = details.iter();
    let display_name = as_tstr(next_detail(&mut fields)?, "displayName")?.to_string();
    let value = as_tstr(next_detail(&mut fields)?, "value")?.to_string();
    let match_value = as_tstr(next_detail(&mut fields)?, "matchValue")?.to_string();
    Ok(Claim {
        claim_name,
        display_name,
        value,
        match_value,
    })
}

fn next_detail<'a>(fields: &mut core::slice::Iter<'a, Item>) -> Result<&'a Item, CatalogError> {
    fields.next().ok_or(CatalogError::MissingEntry {
        context: "claim details",
        key: "displayName/value/matchValue",
    })
}

// A claim appearing in both projections under the same canonical name keeps
// the later definition.
fn insert_claim(claims: &mut Vec<Claim>, claim: Claim) {
    match claims
        .iter_mut()
        .find(|existing| existing.claim_name == claim.claim_name)
    {
        Some(existing) => *existing = claim,
        None => claims.push(claim),
    }
}

fn parse_log_level(text: &str) -> Option<Level> {
    match text {
        "error" => Some(Level::ERROR),
        "warn" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}

fn required<'a>(
    map: &'a Map,
    context: &'static str,
    key: &'static str,
) -> Result<&'a Item, CatalogError> {
    map.get(key)
        .ok_or(CatalogError::MissingEntry { context, key })
}

fn as_map<'a>(item: &'a Item, key: &'static str) -> Result<&'a Map, CatalogError> {
    item.as_map().ok_or(CatalogError::WrongType {
        context: "catalog",
        key,
    })
}

fn as_array<'a>(item: &'a Item, key: &'static str) -> Result<&'a [Item], CatalogError> {
    item.as_array().ok_or(CatalogError::WrongType {
        context: "catalog",
        key,
    })
}

fn as_tstr<'a>(item: &'a Item, key: &'static str) -> Result<&'a str, CatalogError> {
    item.as_tstr().ok_or(CatalogError::WrongType {
        context: "catalog",
        key,
    })
}

fn as_bstr<'a>(item: &'a Item, key: &'static str) -> Result<&'a [u8], CatalogError> {
    item.as_bstr().ok_or(CatalogError::WrongType {
        context: "catalog",
        key,
    })
}

impl CredentialStore for Catalog {
    type CredentialRef = usize;
    type ClaimRef = usize;

    fn list_credentials(&self) -> Vec<usize> {
        (0..self.credentials.len()).collect()
    }

    fn has_mdoc_doctype(&self, cred: &usize, doctype: &str) -> bool {
        let credential = &self.credentials[*cred];
        !credential.mdoc_doc_type.is_empty() && credential.mdoc_doc_type == doctype
    }

    fn has_vct(&self, cred: &usize, vct: &str) -> bool {
        let credential = &self.credentials[*cred];
        !credential.vc_vct.is_empty() && credential.vc_vct == vct
    }

    fn resolve_claim(&self, cred: &usize, claim: &ClaimsQuery) -> Option<usize> {
        let credential = &self.credentials[*cred];
        let index = credential.find_claim(&claim.joined_path())?;
        if !claim.values.is_empty()
            && !claim
                .values
                .iter()
                .any(|value| value.matches(&credential.claims[index].match_value))
        {
            return None;
        }
        Some(index)
    }
}
