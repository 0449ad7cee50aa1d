use crate::error::RequestError;
use base64::Engine;
use matcher_cbor::Item;
use matcher_dcql::DcqlQuery;
use serde::Deserialize;
use serde_json::Value;

/// The OG "preview" protocol.
pub const PROTOCOL_PREVIEW: &str = "preview";
/// ISO 18013-7 Annex C.
pub const PROTOCOL_MDOC_API: &str = "org-iso-mdoc";
/// Earlier spelling of the Annex C protocol identifier.
pub const PROTOCOL_MDOC_API_LEGACY: &str = "org.iso.mdoc";
/// Austroads request forwarding, structurally identical to Annex C.
pub const PROTOCOL_ARF_V2: &str = "austroads-request-forwarding-v2";
/// OpenID4VP drafts.
pub const PROTOCOL_OPENID4VP: &str = "openid4vp";
/// OpenID4VP 1.0, unsigned requests.
pub const PROTOCOL_OPENID4VP_V1_UNSIGNED: &str = "openid4vp-v1-unsigned";
/// OpenID4VP 1.0, JWS-signed requests.
pub const PROTOCOL_OPENID4VP_V1_SIGNED: &str = "openid4vp-v1-signed";

/// Root request envelope handed over by the host.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestEnvelope {
    /// Request objects in verifier preference order. `providers` is the
    /// legacy name for the same list.
    #[serde(alias = "providers")]
    pub requests: Vec<EnvelopeItem>,
}

/// One request object of the envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct EnvelopeItem {
    pub protocol: String,
    #[serde(default)]
    data: Option<RequestData>,
    #[serde(default)]
    request: Option<RequestData>,
}

impl EnvelopeItem {
    /// Payload under the preferred `data` key or the legacy `request` key.
    pub fn payload(&self) -> Result<Value, RequestError> {
        let data = self
            .data
            .as_ref()
            .or(self.request.as_ref())
            .ok_or(RequestError::MissingPayload)?;
        data.to_value()
    }
}

/// Raw protocol payload: common deployments transport `data` as a string
/// containing JSON, but object-valued payloads are also accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RequestData {
    JsonString(String),
    JsonValue(Value),
}

impl RequestData {
    fn to_value(&self) -> Result<Value, RequestError> {
        match self {
            Self::JsonString(raw) => match serde_json::from_str(raw) {
                Ok(value) => Ok(value),
                Err(_) => Ok(Value::String(raw.clone())),
            },
            Self::JsonValue(value) => Ok(value.clone()),
        }
    }
}

/// One requested mdoc data element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MdocRequestDataElement {
    pub namespace_name: String,
    pub data_element_name: String,
    /// Carried through for completeness; not used for matching.
    pub intent_to_retain: bool,
}

/// Normalized mdoc request (preview, Annex C, ARFv2).
#[derive(Debug, Clone)]
pub struct MdocRequest {
    pub protocol: String,
    pub doc_type: String,
    pub data_elements: Vec<MdocRequestDataElement>,
}

/// Normalized OpenID4VP request.
#[derive(Debug, Clone)]
pub struct OpenId4VpRequest {
    pub protocol: String,
    pub dcql_query: DcqlQuery,
}

/// A request object normalized from its wire protocol.
#[derive(Debug, Clone)]
pub enum ParsedRequest {
    Mdoc(MdocRequest),
    OpenId4Vp(OpenId4VpRequest),
}

impl ParsedRequest {
    pub fn protocol(&self) -> &str {
        match self {
            Self::Mdoc(request) => &request.protocol,
            Self::OpenId4Vp(request) => &request.protocol,
        }
    }
}

/// Normalizes one envelope item.
pub fn parse_request_item(item: &EnvelopeItem) -> Result<ParsedRequest, RequestError> {
    match item.protocol.as_str() {
        PROTOCOL_PREVIEW => Ok(ParsedRequest::Mdoc(parse_preview(
            &item.protocol,
            &item.payload()?,
        )?)),
        PROTOCOL_MDOC_API | PROTOCOL_MDOC_API_LEGACY | PROTOCOL_ARF_V2 => Ok(ParsedRequest::Mdoc(
            parse_mdoc_api(&item.protocol, &item.payload()?)?,
        )),
        PROTOCOL_OPENID4VP | PROTOCOL_OPENID4VP_V1_UNSIGNED | PROTOCOL_OPENID4VP_V1_SIGNED => Ok(
            ParsedRequest::OpenId4Vp(parse_openid4vp(&item.protocol, &item.payload()?)?),
        ),
        _ => Err(RequestError::UnsupportedProtocol {
            protocol: item.protocol.clone(),
        }),
    }
}

#[derive(Debug, Deserialize)]
struct PreviewData {
    selector: PreviewSelector,
}

#[derive(Debug, Deserialize)]
struct PreviewSelector {
    doctype: String,
    #[serde(default)]
    fields: Vec<PreviewField>,
}

#[derive(Debug, Deserialize)]
struct PreviewField {
    namespace: String,
    name: String,
    #[serde(default, rename = "intentToRetain")]
    intent_to_retain: bool,
}

fn parse_preview(protocol: &str, data: &Value) -> Result<MdocRequest, RequestError> {
    let wire: PreviewData = serde_json::from_value(data.clone())?;
    let data_elements = wire
        .selector
        .fields
        .into_iter()
        .map(|field| MdocRequestDataElement {
            namespace_name: field.namespace,
            data_element_name: field.name,
            intent_to_retain: field.intent_to_retain,
        })
        .collect();
    Ok(MdocRequest {
        protocol: protocol.to_string(),
        doc_type: wire.selector.doctype,
        data_elements,
    })
}

#[derive(Debug, Deserialize)]
struct MdocApiData {
    #[serde(rename = "deviceRequest")]
    device_request: String,
}

fn parse_mdoc_api(protocol: &str, data: &Value) -> Result<MdocRequest, RequestError> {
    let wire: MdocApiData = serde_json::from_value(data.clone())?;
    let device_request = decode_base64url(&wire.device_request)?;
    let (device_request, _) = matcher_cbor::parse(&device_request)?;
    let doc_requests = required(&device_request, "docRequests")?;
    let doc_requests = doc_requests
        .as_array()
        .ok_or(RequestError::WrongType { key: "docRequests" })?;

    // Only the first DocRequest is considered.
    let doc_request = doc_requests.first().ok_or(RequestError::MissingEntry {
        key: "docRequests",
    })?;
    let items_request = required(doc_request, "itemsRequest")?;
    // ItemsRequestBytes: tag 24 around the embedded encoding.
    if items_request.tag() != Some(24) {
        return Err(RequestError::WrongType {
            key: "itemsRequest",
        });
    }
    let embedded = items_request.as_bstr().ok_or(RequestError::WrongType {
        key: "itemsRequest",
    })?;
    let (items_request, _) = matcher_cbor::parse(embedded)?;

    let doc_type = required(&items_request, "docType")?
        .as_tstr()
        .ok_or(RequestError::WrongType { key: "docType" })?
        .to_string();

    let mut data_elements = Vec::new();
    let namespaces = required(&items_request, "nameSpaces")?
        .as_map()
        .ok_or(RequestError::WrongType { key: "nameSpaces" })?;
    for (namespace_key, elements) in namespaces.iter() {
        let namespace_name = namespace_key
            .as_tstr()
            .ok_or(RequestError::WrongType { key: "nameSpaces" })?;
        let elements = elements
            .as_map()
            .ok_or(RequestError::WrongType { key: "nameSpaces" })?;
        for (element_key, intent) in elements.iter() {
            let data_element_name = element_key.as_tstr().ok_or(RequestError::WrongType {
                key: "dataElements",
            })?;
            let intent_to_retain = intent.as_bool().ok_or(RequestError::WrongType {
                key: "intentToRetain",
            })?;
            data_elements.push(MdocRequestDataElement {
                namespace_name: namespace_name.to_string(),
                data_element_name: data_element_name.to_string(),
                intent_to_retain,
            });
        }
    }

    Ok(MdocRequest {
        protocol: protocol.to_string(),
        doc_type,
        data_elements,
    })
}

fn required<'a>(item: &'a Item, key: &'static str) -> Result<&'a Item, RequestError> {
    item.as_map()
        .ok_or(RequestError::WrongType { key })?
        .get(key)
        .ok_or(RequestError::MissingEntry { key })
}

#[derive(Debug, Deserialize)]
struct OpenId4VpData {
    dcql_query: DcqlQuery,
}

fn parse_openid4vp(protocol: &str, data: &Value) -> Result<OpenId4VpRequest, RequestError> {
    let unwrapped;
    let data = if let Value::String(token) = data {
        unwrapped = unwrap_signed_request(token)?;
        &unwrapped
    } else if let Some(token) = data.get("request").and_then(Value::as_str) {
        unwrapped = unwrap_signed_request(token)?;
        &unwrapped
    } else {
        data
    };

    let wire: OpenId4VpData = serde_json::from_value(data.clone())?;
    Ok(OpenId4VpRequest {
        protocol: protocol.to_string(),
        dcql_query: wire.dcql_query,
    })
}

// The payload of a JWS compact serialization sits between the first and
// second dot. The signature is not verified here; the matcher only selects
// candidates, presentment re-validates the request.
fn unwrap_signed_request(token: &str) -> Result<Value, RequestError> {
    let first_dot = token.find('.').ok_or(RequestError::MalformedJws)?;
    let rest = &token[first_dot + 1..];
    let second_dot = rest.find('.').ok_or(RequestError::MalformedJws)?;
    let payload = decode_base64url(&rest[..second_dot])?;
    Ok(serde_json::from_slice(&payload)?)
}

/// Decodes base64url, inferring padding from the input length: `==` is
/// appended when length mod 4 is 2, `=` when it is 3, nothing otherwise. A
/// trailing `=` means the input is already padded and is decoded as-is.
pub fn decode_base64url(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let engine = base64::engine::general_purpose::URL_SAFE;
    if input.ends_with('=') {
        return engine.decode(input);
    }
    match input.len() % 4 {
        2 => engine.decode(format!("{input}==")),
        3 => engine.decode(format!("{input}=")),
        _ => engine.decode(input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matcher_cbor::Map;
    use serde_json::json;

    fn base64url_no_pad(bytes: &[u8]) -> String {
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
    }

    fn envelope_item(value: Value) -> EnvelopeItem {
        serde_json::from_value(value).expect("envelope item fixture must parse")
    }

    pub(crate) fn device_request_bytes(doc_type: &str) -> Vec<u8> {
        let mut elements = Map::new();
        elements.insert("family_name", true);
        elements.insert("given_name", false);
        let mut namespaces = Map::new();
        namespaces.insert("org.iso.18013.5.1", elements);
        let mut items_request = Map::new();
        items_request.insert("docType", doc_type);
        items_request.insert("nameSpaces", namespaces);

        let mut doc_request = Map::new();
        doc_request.insert(
            "itemsRequest",
            Item::Tag(24, Box::new(Item::Bstr(Item::Map(items_request).encode()))),
        );
        let mut device_request = Map::new();
        device_request.insert("version", "1.0");
        device_request.insert("docRequests", vec![Item::from(doc_request)]);
        Item::Map(device_request).encode()
    }

    #[test]
    fn base64url_padding_is_inferred_from_length() {
        // "Mg" -> "2", "TWFu" -> "Man", "TWE" -> "Ma"
        assert_eq!(decode_base64url("Mg").unwrap(), b"2");
        assert_eq!(decode_base64url("Mg==").unwrap(), b"2");
        assert_eq!(decode_base64url("TWE").unwrap(), b"Ma");
        assert_eq!(decode_base64url("TWE=").unwrap(), b"Ma");
        assert_eq!(decode_base64url("TWFu").unwrap(), b"Man");
        assert_eq!(decode_base64url("").unwrap(), b"");
        // length mod 4 == 1 can never be valid base64.
        assert!(decode_base64url("TWFuX").is_err());
    }

    #[test]
    fn preview_requests_normalize_to_mdoc() {
        let item = envelope_item(json!({
            "protocol": "preview",
            "data": {
                "selector": {
                    "doctype": "org.iso.18013.5.1.mDL",
                    "fields": [
                        {
                            "namespace": "org.iso.18013.5.1",
                            "name": "family_name",
                            "intentToRetain": true,
                        },
                    ],
                },
            },
        }));
        let ParsedRequest::Mdoc(request) = parse_request_item(&item).unwrap() else {
            panic!("preview must normalize to an mdoc request");
        };
        assert_eq!(request.doc_type, "org.iso.18013.5.1.mDL");
        assert_eq!(
            request.data_elements,
            vec![MdocRequestDataElement {
                namespace_name: "org.iso.18013.5.1".into(),
                data_element_name: "family_name".into(),
                intent_to_retain: true,
            }]
        );
    }

    #[test]
    fn mdoc_api_requests_unwrap_the_device_request() {
        let item = envelope_item(json!({
            "protocol": "org-iso-mdoc",
            "data": {
                "deviceRequest": base64url_no_pad(&device_request_bytes("org.iso.18013.5.1.mDL")),
                "encryptionInfo": "ignored",
            },
        }));
        let ParsedRequest::Mdoc(request) = parse_request_item(&item).unwrap() else {
            panic!("annex c must normalize to an mdoc request");
        };
        assert_eq!(request.protocol, "org-iso-mdoc");
        assert_eq!(request.doc_type, "org.iso.18013.5.1.mDL");
        assert_eq!(request.data_elements.len(), 2);
        assert!(request.data_elements[0].intent_to_retain);
        assert!(!request.data_elements[1].intent_to_retain);
    }

    #[test]
    fn mdoc_api_without_tagged_items_request_is_rejected() {
        let mut doc_request = Map::new();
        doc_request.insert("itemsRequest", vec![0x01u8, 0x02]);
        let mut device_request = Map::new();
        device_request.insert("docRequests", vec![Item::from(doc_request)]);
        let item = envelope_item(json!({
            "protocol": "org-iso-mdoc",
            "data": {
                "deviceRequest": base64url_no_pad(&Item::Map(device_request).encode()),
            },
        }));
        assert!(matches!(
            parse_request_item(&item),
            Err(RequestError::WrongType {
                key: "itemsRequest"
            })
        ));
    }

    #[test]
    fn openid4vp_requests_carry_the_dcql_query() {
        let item = envelope_item(json!({
            "protocol": "openid4vp",
            "data": {
                "response_type": "vp_token",
                "dcql_query": {
                    "credentials": [{
                        "id": "mdl",
                        "format": "mso_mdoc",
                        "meta": { "doctype_value": "org.iso.18013.5.1.mDL" },
                    }],
                },
            },
        }));
        let ParsedRequest::OpenId4Vp(request) = parse_request_item(&item).unwrap() else {
            panic!("openid4vp must normalize to a dcql request");
        };
        assert_eq!(request.dcql_query.credentials.len(), 1);
    }

    #[test]
    fn signed_openid4vp_requests_use_the_middle_jws_segment() {
        let payload = json!({
            "dcql_query": {
                "credentials": [{
                    "id": "mdl",
                    "format": "mso_mdoc",
                    "meta": { "doctype_value": "org.iso.18013.5.1.mDL" },
                }],
            },
        });
        let token = format!(
            "{}.{}.{}",
            base64url_no_pad(b"{\"alg\":\"ES256\"}"),
            base64url_no_pad(payload.to_string().as_bytes()),
            base64url_no_pad(b"sig"),
        );
        let item = envelope_item(json!({
            "protocol": "openid4vp-v1-signed",
            "data": { "request": token, "nonce": "n" },
        }));
        let ParsedRequest::OpenId4Vp(request) = parse_request_item(&item).unwrap() else {
            panic!("signed openid4vp must normalize to a dcql request");
        };
        assert_eq!(request.dcql_query.credentials.len(), 1);
    }

    #[test]
    fn signed_request_with_fewer_than_two_dots_is_rejected() {
        let item = envelope_item(json!({
            "protocol": "openid4vp-v1-signed",
            "data": { "request": "only-one.segment" },
        }));
        assert!(matches!(
            parse_request_item(&item),
            Err(RequestError::MalformedJws)
        ));
    }

    #[test]
    fn string_payloads_are_parsed_as_json() {
        let inner = json!({
            "selector": { "doctype": "org.iso.18013.5.1.mDL", "fields": [] },
        });
        let item = envelope_item(json!({
            "protocol": "preview",
            "data": inner.to_string(),
        }));
        let ParsedRequest::Mdoc(request) = parse_request_item(&item).unwrap() else {
            panic!("string payloads must be parsed as json");
        };
        assert_eq!(request.doc_type, "org.iso.18013.5.1.mDL");
    }

    #[test]
    fn unsupported_protocols_are_reported() {
        let item = envelope_item(json!({
            "protocol": "future-proto",
            "data": {},
        }));
        assert!(matches!(
            parse_request_item(&item),
            Err(RequestError::UnsupportedProtocol { .. })
        ));
    }

    #[test]
    fn envelope_accepts_legacy_providers_key() {
        let envelope: RequestEnvelope = serde_json::from_value(json!({
            "providers": [{ "protocol": "preview", "data": {} }],
        }))
        .unwrap();
        assert_eq!(envelope.requests.len(), 1);
        assert!(serde_json::from_str::<RequestEnvelope>("{}").is_err());
    }
}
