use crate::catalog::Catalog;
use crate::error::RequestError;
use crate::picker;
use crate::request::{self, MdocRequest, ParsedRequest, RequestEnvelope};
use credman_host::{Credman, default_credman};
use matcher_dcql::{Combination, CombinationElement, CredentialMatch, execute};
use rustc_hash::FxHashSet;

/// Matches a request envelope against the catalog and drives the host
/// picker. The single entry point of an invocation; never fails, only emits
/// fewer entries.
pub fn match_request_envelope(request_json: &str, catalog: &Catalog) {
    match_request_envelope_with(request_json, catalog, default_credman());
}

/// As [`match_request_envelope`] with an explicit host, so tests can pin a
/// picker version.
pub fn match_request_envelope_with(request_json: &str, catalog: &Catalog, host: &dyn Credman) {
    matcher_tracing::set_level(catalog.log_level);

    let envelope: RequestEnvelope = match serde_json::from_str(request_json) {
        Ok(envelope) => envelope,
        Err(error) => {
            tracing::error!(%error, "request envelope is malformed");
            return;
        }
    };

    // One credential, one entry: a document requestable over several
    // protocols (and in several formats) must not show up once per protocol
    // on flat-picker hosts. First requested, first served.
    let mut used_document_ids = FxHashSet::default();

    for item in &envelope.requests {
        let parsed = match request::parse_request_item(item) {
            Ok(parsed) => parsed,
            Err(RequestError::UnsupportedProtocol { protocol }) => {
                tracing::debug!(protocol = protocol.as_str(), "skipping request for unsupported protocol");
                continue;
            }
            Err(error) => {
                tracing::warn!(%error, protocol = item.protocol.as_str(), "skipping malformed request");
                continue;
            }
        };

        if !catalog.supports_protocol(parsed.protocol()) {
            tracing::debug!(
                protocol = parsed.protocol(),
                "protocol not declared by the catalog"
            );
            continue;
        }

        let Some(combinations) = evaluate(&parsed, catalog) else {
            continue;
        };
        picker::emit_combinations(
            host,
            catalog,
            parsed.protocol(),
            &combinations,
            &mut used_document_ids,
        );
    }
}

fn evaluate(request: &ParsedRequest, catalog: &Catalog) -> Option<Vec<Combination<usize, usize>>> {
    match request {
        ParsedRequest::Mdoc(mdoc) => Some(mdoc_combinations(mdoc, catalog)),
        ParsedRequest::OpenId4Vp(vp) => {
            let response = execute(&vp.dcql_query, catalog)?;
            match response.combinations() {
                Ok(combinations) => Some(combinations),
                Err(error) => {
                    tracing::warn!(%error, "skipping request");
                    None
                }
            }
        }
    }
}

/// Evaluates an mdoc request: a credential matches when its doctype equals
/// the requested one and it holds at least one requested data element. Each
/// matching credential becomes its own single-element combination, claims in
/// request order.
fn mdoc_combinations(request: &MdocRequest, catalog: &Catalog) -> Vec<Combination<usize, usize>> {
    let mut out = Vec::new();
    for (credential_index, credential) in catalog.credentials.iter().enumerate() {
        if credential.mdoc_doc_type.is_empty() || credential.mdoc_doc_type != request.doc_type {
            continue;
        }
        let claims: Vec<usize> = request
            .data_elements
            .iter()
            .filter_map(|element| {
                credential.find_claim(&format!(
                    "{}.{}",
                    element.namespace_name, element.data_element_name
                ))
            })
            .collect();
        if claims.is_empty() {
            continue;
        }
        out.push(Combination {
            number: out.len(),
            elements: vec![CombinationElement {
                matches: vec![CredentialMatch {
                    credential: credential_index,
                    claims,
                }],
            }],
        });
    }
    out
}
