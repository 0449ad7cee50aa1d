use matcher_dcql::{
    ClaimsQuery, Combination, CredentialStore, DcqlQuery, MAX_COMBINATIONS, execute,
};
use serde_json::json;

#[derive(Debug, Clone, Default)]
struct TestCredential {
    doctype: Option<&'static str>,
    vct: Option<&'static str>,
    /// (canonical claim name, match value)
    claims: Vec<(&'static str, &'static str)>,
}

#[derive(Debug, Clone, Default)]
struct TestStore {
    credentials: Vec<TestCredential>,
}

impl CredentialStore for TestStore {
    type CredentialRef = usize;
    type ClaimRef = usize;

    fn list_credentials(&self) -> Vec<usize> {
        (0..self.credentials.len()).collect()
    }

    fn has_mdoc_doctype(&self, cred: &usize, doctype: &str) -> bool {
        self.credentials[*cred].doctype == Some(doctype)
    }

    fn has_vct(&self, cred: &usize, vct: &str) -> bool {
        self.credentials[*cred].vct == Some(vct)
    }

    fn resolve_claim(&self, cred: &usize, claim: &ClaimsQuery) -> Option<usize> {
        let name = claim.joined_path();
        let (index, (_, match_value)) = self.credentials[*cred]
            .claims
            .iter()
            .enumerate()
            .find(|(_, (claim_name, _))| *claim_name == name)?;
        if !claim.values.is_empty() && !claim.values.iter().any(|value| value.matches(match_value))
        {
            return None;
        }
        Some(index)
    }
}

fn mdl_credential() -> TestCredential {
    TestCredential {
        doctype: Some("org.iso.18013.5.1.mDL"),
        claims: vec![
            ("org.iso.18013.5.1.family_name", "Doe"),
            ("org.iso.18013.5.1.age_over_21", "true"),
        ],
        ..TestCredential::default()
    }
}

fn pid_credential() -> TestCredential {
    TestCredential {
        vct: Some("urn:eudi:pid:1"),
        claims: vec![("address.country", "DE"), ("given_name", "Erika")],
        ..TestCredential::default()
    }
}

fn query(value: serde_json::Value) -> DcqlQuery {
    serde_json::from_value(value).expect("query fixture must parse")
}

fn credential_refs(combination: &Combination<usize, usize>) -> Vec<Vec<usize>> {
    combination
        .elements
        .iter()
        .map(|element| {
            element
                .matches
                .iter()
                .map(|matched| matched.credential)
                .collect()
        })
        .collect()
}

#[test]
fn doctype_filter_selects_mdoc_candidates() {
    let store = TestStore {
        credentials: vec![mdl_credential(), pid_credential()],
    };
    let query = query(json!({
        "credentials": [{
            "id": "mdl",
            "format": "mso_mdoc",
            "meta": { "doctype_value": "org.iso.18013.5.1.mDL" },
            "claims": [{ "path": ["org.iso.18013.5.1", "family_name"] }],
        }],
    }));
    let response = execute(&query, &store).expect("satisfiable");
    assert_eq!(response.credential_sets.len(), 1);
    assert!(!response.credential_sets[0].optional);
    let matches = &response.credential_sets[0].options[0].members[0].matches;
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].credential, 0);
    assert_eq!(matches[0].claims, vec![0]);
}

#[test]
fn vct_filter_selects_sdjwt_candidates() {
    let store = TestStore {
        credentials: vec![mdl_credential(), pid_credential()],
    };
    let query = query(json!({
        "credentials": [{
            "id": "pid",
            "format": "dc+sd-jwt",
            "meta": { "vct_values": ["urn:eudi:pid:2", "urn:eudi:pid:1"] },
            "claims": [{ "path": ["address", "country"] }],
        }],
    }));
    let response = execute(&query, &store).expect("satisfiable");
    let matches = &response.credential_sets[0].options[0].members[0].matches;
    assert_eq!(matches[0].credential, 1);
}

#[test]
fn value_matching_requires_match_value_membership() {
    let store = TestStore {
        credentials: vec![pid_credential()],
    };
    let matching = query(json!({
        "credentials": [{
            "id": "pid",
            "format": "dc+sd-jwt",
            "meta": { "vct_values": ["urn:eudi:pid:1"] },
            "claims": [{ "path": ["address", "country"], "values": ["FR", "DE"] }],
        }],
    }));
    assert!(execute(&matching, &store).is_some());

    let rejecting = query(json!({
        "credentials": [{
            "id": "pid",
            "format": "dc+sd-jwt",
            "meta": { "vct_values": ["urn:eudi:pid:1"] },
            "claims": [{ "path": ["address", "country"], "values": ["FR", "NL"] }],
        }],
    }));
    assert!(execute(&rejecting, &store).is_none());
}

#[test]
fn boolean_and_integer_values_match_their_canonical_strings() {
    let store = TestStore {
        credentials: vec![mdl_credential()],
    };
    let query = query(json!({
        "credentials": [{
            "id": "mdl",
            "format": "mso_mdoc",
            "meta": { "doctype_value": "org.iso.18013.5.1.mDL" },
            "claims": [{ "path": ["org.iso.18013.5.1", "age_over_21"], "values": [true] }],
        }],
    }));
    assert!(execute(&query, &store).is_some());
}

#[test]
fn first_satisfiable_claim_set_wins() {
    let store = TestStore {
        credentials: vec![pid_credential()],
    };
    // First set references a claim the credential lacks, second resolves.
    let query = query(json!({
        "credentials": [{
            "id": "pid",
            "format": "dc+sd-jwt",
            "meta": { "vct_values": ["urn:eudi:pid:1"] },
            "claims": [
                { "id": "a", "path": ["nationality"] },
                { "id": "b", "path": ["given_name"] },
                { "id": "c", "path": ["address", "country"] },
            ],
            "claim_sets": [["a", "b"], ["c", "b"], ["b"]],
        }],
    }));
    let response = execute(&query, &store).expect("second claim set resolves");
    let matched = &response.credential_sets[0].options[0].members[0].matches[0];
    // Claims come back in claim-set order: address.country then given_name.
    assert_eq!(matched.claims, vec![0, 1]);
}

#[test]
fn claim_set_referencing_unknown_id_is_skipped() {
    let store = TestStore {
        credentials: vec![pid_credential()],
    };
    let query = query(json!({
        "credentials": [{
            "id": "pid",
            "format": "dc+sd-jwt",
            "meta": { "vct_values": ["urn:eudi:pid:1"] },
            "claims": [{ "id": "b", "path": ["given_name"] }],
            "claim_sets": [["ghost"], ["b"]],
        }],
    }));
    let response = execute(&query, &store).expect("fallback set resolves");
    assert_eq!(
        response.credential_sets[0].options[0].members[0].matches[0].claims,
        vec![1]
    );
}

#[test]
fn no_claim_sets_requires_every_claim() {
    let store = TestStore {
        credentials: vec![pid_credential()],
    };
    let query = query(json!({
        "credentials": [{
            "id": "pid",
            "format": "dc+sd-jwt",
            "meta": { "vct_values": ["urn:eudi:pid:1"] },
            "claims": [
                { "path": ["given_name"] },
                { "path": ["nationality"] },
            ],
        }],
    }));
    assert!(execute(&query, &store).is_none());
}

#[test]
fn absent_credential_sets_require_all_queries_to_match() {
    let store = TestStore {
        credentials: vec![mdl_credential()],
    };
    let query = query(json!({
        "credentials": [
            {
                "id": "mdl",
                "format": "mso_mdoc",
                "meta": { "doctype_value": "org.iso.18013.5.1.mDL" },
            },
            {
                "id": "pid",
                "format": "dc+sd-jwt",
                "meta": { "vct_values": ["urn:eudi:pid:1"] },
            },
        ],
    }));
    assert!(execute(&query, &store).is_none());
}

#[test]
fn required_set_with_no_satisfied_option_is_unsatisfiable() {
    let store = TestStore {
        credentials: vec![mdl_credential()],
    };
    let query = query(json!({
        "credentials": [{
            "id": "pid",
            "format": "dc+sd-jwt",
            "meta": { "vct_values": ["urn:eudi:pid:1"] },
        }],
        "credential_sets": [{ "options": [["pid"]] }],
    }));
    assert!(execute(&query, &store).is_none());
}

#[test]
fn optional_set_with_no_satisfied_option_is_kept_empty() {
    let store = TestStore {
        credentials: vec![mdl_credential()],
    };
    let query = query(json!({
        "credentials": [
            {
                "id": "mdl",
                "format": "mso_mdoc",
                "meta": { "doctype_value": "org.iso.18013.5.1.mDL" },
            },
            {
                "id": "pid",
                "format": "dc+sd-jwt",
                "meta": { "vct_values": ["urn:eudi:pid:1"] },
            },
        ],
        "credential_sets": [
            { "options": [["mdl"]] },
            { "options": [["pid"]], "required": false },
        ],
    }));
    let response = execute(&query, &store).expect("required set satisfied");
    assert_eq!(response.credential_sets.len(), 2);
    assert!(!response.credential_sets[0].optional);
    assert!(response.credential_sets[1].optional);
    assert!(response.credential_sets[1].options.is_empty());

    // The empty optional set contributes exactly one (omitted) choice.
    let combinations = response.combinations().unwrap();
    assert_eq!(combinations.len(), 1);
    assert_eq!(credential_refs(&combinations[0]), vec![vec![0]]);
}

#[test]
fn fallback_option_is_used_when_preferred_option_is_unsatisfied() {
    // Queries A, B; one required set with options [[A,B],[A]]; only A is
    // satisfiable, so the second option carries the set.
    let store = TestStore {
        credentials: vec![mdl_credential()],
    };
    let query = query(json!({
        "credentials": [
            {
                "id": "A",
                "format": "mso_mdoc",
                "meta": { "doctype_value": "org.iso.18013.5.1.mDL" },
            },
            {
                "id": "B",
                "format": "dc+sd-jwt",
                "meta": { "vct_values": ["urn:eudi:pid:1"] },
            },
        ],
        "credential_sets": [{ "options": [["A", "B"], ["A"]] }],
    }));
    let response = execute(&query, &store).expect("second option satisfied");
    assert_eq!(response.credential_sets[0].options.len(), 1);
    let combinations = response.combinations().unwrap();
    assert_eq!(combinations.len(), 1);
    assert_eq!(credential_refs(&combinations[0]), vec![vec![0]]);
}

#[test]
fn single_member_options_consolidate_preserving_order() {
    let store = TestStore {
        credentials: vec![
            mdl_credential(),
            TestCredential {
                doctype: Some("org.iso.18013.5.1.mDL.v2"),
                claims: vec![("org.iso.18013.5.1.family_name", "Doe")],
                ..TestCredential::default()
            },
        ],
    };
    // Both options are single-member and satisfied, so they collapse into
    // one option whose member concatenates the matches in option order.
    let query = query(json!({
        "credentials": [
            {
                "id": "mdl1",
                "format": "mso_mdoc",
                "meta": { "doctype_value": "org.iso.18013.5.1.mDL" },
            },
            {
                "id": "mdl2",
                "format": "mso_mdoc",
                "meta": { "doctype_value": "org.iso.18013.5.1.mDL.v2" },
            },
        ],
        "credential_sets": [{ "options": [["mdl1"], ["mdl2"]] }],
    }));
    let response = execute(&query, &store).expect("both options satisfied");
    assert_eq!(response.credential_sets[0].options.len(), 2);

    let combinations = response.combinations().unwrap();
    assert_eq!(combinations.len(), 1);
    assert_eq!(credential_refs(&combinations[0]), vec![vec![0, 1]]);
}

#[test]
fn combination_count_is_the_product_of_arities() {
    // Three interchangeable doctypes give one consolidated required set; an
    // optional multi-member set adds (options + 1) choices.
    let store = TestStore {
        credentials: vec![mdl_credential(), pid_credential()],
    };
    let query = query(json!({
        "credentials": [
            {
                "id": "mdl",
                "format": "mso_mdoc",
                "meta": { "doctype_value": "org.iso.18013.5.1.mDL" },
            },
            {
                "id": "pid",
                "format": "dc+sd-jwt",
                "meta": { "vct_values": ["urn:eudi:pid:1"] },
            },
        ],
        "credential_sets": [
            { "options": [["mdl"]] },
            { "options": [["pid", "mdl"]], "required": false },
        ],
    }));
    let response = execute(&query, &store).expect("satisfiable");
    // Arities: required set 1, optional set 1 + 1 (omission) = 2.
    let combinations = response.combinations().unwrap();
    assert_eq!(combinations.len(), 2);

    // Set 0 varies slowest; first combination includes the optional set.
    assert_eq!(
        credential_refs(&combinations[0]),
        vec![vec![0], vec![1], vec![0]]
    );
    assert_eq!(credential_refs(&combinations[1]), vec![vec![0]]);
    assert_eq!(combinations[0].number, 0);
    assert_eq!(combinations[1].number, 1);
}

#[test]
fn combination_explosion_is_capped() {
    // 14 optional two-member sets: arity 3 each, 3^14 > 10^4.
    let store = TestStore {
        credentials: vec![mdl_credential(), pid_credential()],
    };
    let mut sets = Vec::new();
    for _ in 0..14 {
        sets.push(json!({
            "options": [["mdl", "pid"], ["mdl", "mdl"]],
            "required": false,
        }));
    }
    let query = query(json!({
        "credentials": [
            {
                "id": "mdl",
                "format": "mso_mdoc",
                "meta": { "doctype_value": "org.iso.18013.5.1.mDL" },
            },
            {
                "id": "pid",
                "format": "dc+sd-jwt",
                "meta": { "vct_values": ["urn:eudi:pid:1"] },
            },
        ],
        "credential_sets": sets,
    }));
    let response = execute(&query, &store).expect("satisfiable");
    let error = response.combinations().unwrap_err();
    assert!(error.count > MAX_COMBINATIONS);
}

#[test]
fn execution_is_deterministic() {
    let store = TestStore {
        credentials: vec![mdl_credential(), pid_credential(), mdl_credential()],
    };
    let fixture = json!({
        "credentials": [
            {
                "id": "mdl",
                "format": "mso_mdoc",
                "meta": { "doctype_value": "org.iso.18013.5.1.mDL" },
                "claims": [{ "path": ["org.iso.18013.5.1", "family_name"] }],
            },
            {
                "id": "pid",
                "format": "dc+sd-jwt",
                "meta": { "vct_values": ["urn:eudi:pid:1"] },
            },
        ],
        "credential_sets": [
            { "options": [["mdl", "pid"], ["mdl"]] },
            { "options": [["pid"]], "required": false },
        ],
    });

    let first = execute(&query(fixture.clone()), &store).expect("satisfiable");
    let second = execute(&query(fixture), &store).expect("satisfiable");
    let first: Vec<_> = first.combinations().unwrap().iter().map(credential_refs).collect();
    let second: Vec<_> = second.combinations().unwrap().iter().map(credential_refs).collect();
    assert_eq!(first, second);
}
