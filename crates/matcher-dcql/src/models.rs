use serde::Deserialize;

/// Core DCQL object from an OpenID4VP request.
///
/// Only the members the matcher evaluates are modeled; unknown members are
/// ignored so newer verifier fields never fail a parse.
#[derive(Debug, Clone, Deserialize)]
pub struct DcqlQuery {
    /// Requested credential queries.
    pub credentials: Vec<CredentialQuery>,
    /// Optional constraints on which credential query ids may be returned
    /// together.
    #[serde(default)]
    pub credential_sets: Option<Vec<CredentialSetQuery>>,
}

/// One credential request entry, keyed by `format`.
///
/// Unknown formats are retained at parse time and simply never match, so
/// deserialization stays forward-compatible.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "format")]
pub enum CredentialQuery {
    /// ISO mdoc credential query. `mso_mdoc_zk` requests match the same
    /// doctype constraint as plain `mso_mdoc`.
    #[serde(rename = "mso_mdoc", alias = "mso_mdoc_zk")]
    MsoMdoc {
        #[serde(flatten)]
        common: CredentialQueryCommon,
        meta: MdocMeta,
    },
    /// SD-JWT VC credential query.
    #[serde(rename = "dc+sd-jwt")]
    DcSdJwt {
        #[serde(flatten)]
        common: CredentialQueryCommon,
        meta: SdJwtMeta,
    },
    /// Unknown format value; never matches.
    #[serde(other)]
    Unknown,
}

impl CredentialQuery {
    pub fn common(&self) -> Option<&CredentialQueryCommon> {
        match self {
            Self::MsoMdoc { common, .. } | Self::DcSdJwt { common, .. } => Some(common),
            Self::Unknown => None,
        }
    }

    /// Credential query id; empty for unknown formats.
    pub fn id(&self) -> &str {
        self.common().map(|common| common.id.as_str()).unwrap_or("")
    }
}

/// `meta` members for `mso_mdoc` / `mso_mdoc_zk`.
#[derive(Debug, Clone, Deserialize)]
pub struct MdocMeta {
    #[serde(default)]
    pub doctype_value: String,
}

/// `meta` members for `dc+sd-jwt`.
#[derive(Debug, Clone, Deserialize)]
pub struct SdJwtMeta {
    #[serde(default)]
    pub vct_values: Vec<String>,
}

/// Format-agnostic credential query members.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialQueryCommon {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub claims: Vec<ClaimsQuery>,
    #[serde(default)]
    pub claim_sets: Vec<Vec<String>>,
}

impl CredentialQueryCommon {
    /// Looks up a requested claim by its id, as referenced from `claim_sets`.
    pub fn find_claim(&self, claim_id: &str) -> Option<&ClaimsQuery> {
        self.claims
            .iter()
            .find(|claim| claim.id.as_deref() == Some(claim_id))
    }
}

/// One requested claim constraint.
#[derive(Debug, Clone, Deserialize)]
pub struct ClaimsQuery {
    /// Claim id, referenced from `claim_sets`. May be absent.
    #[serde(default)]
    pub id: Option<String>,
    /// Claim path; the canonical claim name is the segments joined with ".".
    pub path: Vec<String>,
    /// Accepted values. Empty means existence suffices.
    #[serde(default)]
    pub values: Vec<ClaimValue>,
    /// mdoc-specific hint carried in the request model; not used for
    /// matching.
    #[serde(default)]
    pub intent_to_retain: bool,
}

impl ClaimsQuery {
    /// Canonical claim name: `namespace.dataElement` for mdoc claims, the
    /// dotted path for VC claims.
    pub fn joined_path(&self) -> String {
        self.path.join(".")
    }
}

/// Allowed value constraint primitives.
///
/// OpenID4VP restricts value matching to strings, integers and booleans.
/// Catalog match values are stored as strings, so comparison happens on the
/// string-canonical form: integers in decimal, booleans as "true"/"false".
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ClaimValue {
    String(String),
    Integer(i64),
    Boolean(bool),
}

impl ClaimValue {
    /// True when this requested value equals the catalog's match value.
    pub fn matches(&self, match_value: &str) -> bool {
        match self {
            Self::String(value) => value == match_value,
            Self::Integer(value) => itoa_eq(*value, match_value),
            Self::Boolean(value) => match_value == if *value { "true" } else { "false" },
        }
    }
}

fn itoa_eq(value: i64, text: &str) -> bool {
    let mut buffer = [0u8; 20];
    let mut len = 0;
    let mut remainder = value.unsigned_abs();
    loop {
        buffer[len] = b'0' + (remainder % 10) as u8;
        len += 1;
        remainder /= 10;
        if remainder == 0 {
            break;
        }
    }
    let digits = &mut buffer[..len];
    digits.reverse();
    let text = text.as_bytes();
    if value < 0 {
        text.first() == Some(&b'-') && &text[1..] == digits
    } else {
        text == digits
    }
}

/// Credential set constraint.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialSetQuery {
    /// Alternative credential-query-id combinations, most preferred first.
    pub options: Vec<Vec<String>>,
    /// Whether this set must be satisfied. Defaults to true when absent.
    #[serde(default = "default_required")]
    pub required: bool,
}

const fn default_required() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn format_tag_selects_the_variant() {
        let query: CredentialQuery = serde_json::from_value(json!({
            "id": "mdl",
            "format": "mso_mdoc",
            "meta": { "doctype_value": "org.iso.18013.5.1.mDL" },
        }))
        .unwrap();
        assert!(matches!(query, CredentialQuery::MsoMdoc { .. }));
        assert_eq!(query.id(), "mdl");

        let zk: CredentialQuery = serde_json::from_value(json!({
            "id": "mdl",
            "format": "mso_mdoc_zk",
            "meta": { "doctype_value": "org.iso.18013.5.1.mDL" },
        }))
        .unwrap();
        assert!(matches!(zk, CredentialQuery::MsoMdoc { .. }));

        let unknown: CredentialQuery = serde_json::from_value(json!({
            "format": "ldp_vc",
        }))
        .unwrap();
        assert!(matches!(unknown, CredentialQuery::Unknown));
        assert_eq!(unknown.id(), "");
    }

    #[test]
    fn required_defaults_to_true() {
        let set: CredentialSetQuery =
            serde_json::from_value(json!({ "options": [["a"]] })).unwrap();
        assert!(set.required);
        let set: CredentialSetQuery =
            serde_json::from_value(json!({ "options": [["a"]], "required": false })).unwrap();
        assert!(!set.required);
    }

    #[test]
    fn unknown_claim_query_fields_are_ignored() {
        let claim: ClaimsQuery = serde_json::from_value(json!({
            "path": ["org.iso.18013.5.1", "age_over_21"],
            "values": [true, 21, "x"],
            "intent_to_retain": true,
            "purpose": "age verification",
        }))
        .unwrap();
        assert_eq!(claim.joined_path(), "org.iso.18013.5.1.age_over_21");
        assert!(claim.intent_to_retain);
        assert_eq!(claim.values.len(), 3);
    }

    #[test]
    fn claim_values_match_on_string_canonical_form() {
        assert!(ClaimValue::Boolean(true).matches("true"));
        assert!(ClaimValue::Boolean(false).matches("false"));
        assert!(!ClaimValue::Boolean(true).matches("1"));
        assert!(ClaimValue::Integer(21).matches("21"));
        assert!(ClaimValue::Integer(-7).matches("-7"));
        assert!(ClaimValue::Integer(i64::MIN).matches("-9223372036854775808"));
        assert!(!ClaimValue::Integer(21).matches("021"));
        assert!(ClaimValue::String("DE".into()).matches("DE"));
        assert!(!ClaimValue::String("DE".into()).matches("de"));
    }
}
