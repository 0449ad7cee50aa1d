use crate::models::{CredentialQuery, CredentialQueryCommon, DcqlQuery};
use crate::store::CredentialStore;
use std::collections::BTreeMap;
use thiserror::Error;

/// Upper bound on enumerated combinations, resisting pathological queries.
pub const MAX_COMBINATIONS: u128 = 10_000;

/// One credential satisfying a credential query, with the resolved claims in
/// the order the query declared them.
#[derive(Debug, Clone)]
pub struct CredentialMatch<C, K> {
    pub credential: C,
    pub claims: Vec<K>,
}

/// One member of a credential-set option: all matches for one credential
/// query id (interchangeable candidates the user chooses between).
#[derive(Debug, Clone)]
pub struct OptionMember<C, K> {
    pub matches: Vec<CredentialMatch<C, K>>,
}

/// One satisfied option of a credential set.
#[derive(Debug, Clone)]
pub struct SetOption<C, K> {
    pub members: Vec<OptionMember<C, K>>,
}

/// One credential set of the response, with its satisfied options in query
/// declaration order (lower index = more preferred).
#[derive(Debug, Clone)]
pub struct ResponseSet<C, K> {
    pub optional: bool,
    pub options: Vec<SetOption<C, K>>,
}

/// Result of evaluating a [`DcqlQuery`] against a catalog.
#[derive(Debug, Clone)]
pub struct DcqlResponse<C, K> {
    pub credential_sets: Vec<ResponseSet<C, K>>,
}

/// One slot of a concrete combination: the interchangeable matches for a
/// single presented credential.
#[derive(Debug, Clone)]
pub struct CombinationElement<C, K> {
    pub matches: Vec<CredentialMatch<C, K>>,
}

/// One concrete selection of credentials satisfying the whole query.
#[derive(Debug, Clone)]
pub struct Combination<C, K> {
    /// Sequential number in enumeration order, used in picker identifiers.
    pub number: usize,
    pub elements: Vec<CombinationElement<C, K>>,
}

/// The query is satisfiable but enumerating its combinations would exceed
/// [`MAX_COMBINATIONS`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("query produces {count} combinations, more than the {MAX_COMBINATIONS} supported")]
pub struct TooManyCombinations {
    pub count: u128,
}

/// Evaluates a DCQL query against the store.
///
/// Returns `None` when the query cannot be satisfied: a required credential
/// set has no satisfied option, or, in the absence of `credential_sets`, some
/// credential query has no match.
pub fn execute<S: CredentialStore>(
    query: &DcqlQuery,
    store: &S,
) -> Option<DcqlResponse<S::CredentialRef, S::ClaimRef>> {
    let candidates = store.list_credentials();

    let mut matches_in_order = Vec::with_capacity(query.credentials.len());
    for credential_query in &query.credentials {
        let matches = match_credential_query(credential_query, store, &candidates);
        matches_in_order.push((credential_query.id(), matches));
    }
    let matches_by_id: BTreeMap<&str, &Vec<CredentialMatch<S::CredentialRef, S::ClaimRef>>> =
        matches_in_order
            .iter()
            .map(|(id, matches)| (*id, matches))
            .collect();

    let mut credential_sets = Vec::new();
    let set_queries = query.credential_sets.as_deref().unwrap_or(&[]);
    if set_queries.is_empty() {
        // Without credential_sets the verifier requests presentations for
        // every credential query, so each becomes its own mandatory
        // single-option set.
        for (id, matches) in &matches_in_order {
            if matches.is_empty() {
                tracing::warn!(credential_query = *id, "no matches for credential query");
                return None;
            }
            credential_sets.push(ResponseSet {
                optional: false,
                options: vec![SetOption {
                    members: vec![OptionMember {
                        matches: matches.clone(),
                    }],
                }],
            });
        }
        return Some(DcqlResponse { credential_sets });
    }

    for set_query in set_queries {
        let mut options = Vec::new();
        for option in &set_query.options {
            let satisfied = option.iter().all(|id| {
                matches_by_id
                    .get(id.as_str())
                    .is_some_and(|matches| !matches.is_empty())
            });
            if !satisfied {
                continue;
            }
            let members = option
                .iter()
                .filter_map(|id| matches_by_id.get(id.as_str()))
                .map(|matches| OptionMember {
                    matches: (*matches).clone(),
                })
                .collect();
            options.push(SetOption { members });
        }
        if options.is_empty() && set_query.required {
            tracing::warn!("required credential set has no satisfied option");
            return None;
        }
        credential_sets.push(ResponseSet {
            optional: !set_query.required,
            options,
        });
    }
    Some(DcqlResponse { credential_sets })
}

fn match_credential_query<S: CredentialStore>(
    query: &CredentialQuery,
    store: &S,
    candidates: &[S::CredentialRef],
) -> Vec<CredentialMatch<S::CredentialRef, S::ClaimRef>> {
    let Some(common) = query.common() else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for credential in candidates {
        if !meta_matches(query, store, credential) {
            continue;
        }
        if let Some(claims) = resolve_claims(common, store, credential) {
            out.push(CredentialMatch {
                credential: credential.clone(),
                claims,
            });
        }
    }
    out
}

fn meta_matches<S: CredentialStore>(
    query: &CredentialQuery,
    store: &S,
    credential: &S::CredentialRef,
) -> bool {
    match query {
        CredentialQuery::MsoMdoc { meta, .. } => {
            store.has_mdoc_doctype(credential, &meta.doctype_value)
        }
        CredentialQuery::DcSdJwt { meta, .. } => meta
            .vct_values
            .iter()
            .any(|vct| store.has_vct(credential, vct)),
        CredentialQuery::Unknown => false,
    }
}

fn resolve_claims<S: CredentialStore>(
    common: &CredentialQueryCommon,
    store: &S,
    credential: &S::CredentialRef,
) -> Option<Vec<S::ClaimRef>> {
    if common.claim_sets.is_empty() {
        let mut resolved = Vec::with_capacity(common.claims.len());
        for claim in &common.claims {
            resolved.push(store.resolve_claim(credential, claim)?);
        }
        return Some(resolved);
    }

    // Claim sets are tried in order; the first fully resolvable one wins.
    'set: for claim_set in &common.claim_sets {
        let mut resolved = Vec::with_capacity(claim_set.len());
        for claim_id in claim_set {
            let Some(claim) = common.find_claim(claim_id) else {
                continue 'set;
            };
            let Some(claim_ref) = store.resolve_claim(credential, claim) else {
                continue 'set;
            };
            resolved.push(claim_ref);
        }
        return Some(resolved);
    }
    None
}

impl<C: Clone, K: Clone> ResponseSet<C, K> {
    /// Collapses all options with exactly one member into a single
    /// synthesized option whose member carries their concatenated matches;
    /// options with several members are preserved after it. Sets with fewer
    /// than two single-member options are returned unchanged.
    fn consolidate_single_member_options(&self) -> ResponseSet<C, K> {
        let mut single_member_matches = Vec::new();
        let mut multi_member_options = Vec::new();
        let mut single_member_count = 0usize;
        for option in &self.options {
            if option.members.len() == 1 {
                single_member_matches.extend(option.members[0].matches.iter().cloned());
                single_member_count += 1;
            } else {
                multi_member_options.push(option.clone());
            }
        }

        if single_member_count <= 1 {
            return self.clone();
        }
        let mut options = Vec::with_capacity(multi_member_options.len() + 1);
        options.push(SetOption {
            members: vec![OptionMember {
                matches: single_member_matches,
            }],
        });
        options.extend(multi_member_options);
        ResponseSet {
            optional: self.optional,
            options,
        }
    }
}

impl<C: Clone, K: Clone> DcqlResponse<C, K> {
    /// Enumerates every credential combination satisfying the response.
    ///
    /// Each consolidated credential set contributes an index ranging over
    /// its options, plus one past-the-end index for optional sets encoding
    /// omission. Combinations are the Cartesian product of these indices in
    /// lexicographic order, the first set varying slowest.
    pub fn combinations(&self) -> Result<Vec<Combination<C, K>>, TooManyCombinations> {
        let sets: Vec<ResponseSet<C, K>> = self
            .credential_sets
            .iter()
            .map(ResponseSet::consolidate_single_member_options)
            .collect();
        let arities: Vec<usize> = sets
            .iter()
            .map(|set| set.options.len() + usize::from(set.optional))
            .collect();

        let mut count: u128 = 1;
        for arity in &arities {
            count = count.saturating_mul(*arity as u128);
            if count > MAX_COMBINATIONS {
                return Err(TooManyCombinations { count });
            }
        }

        let mut out = Vec::with_capacity(count as usize);
        let mut indices = vec![0usize; arities.len()];
        loop {
            let mut elements = Vec::new();
            for (set, &choice) in sets.iter().zip(&indices) {
                // The past-the-end index of an optional set omits it.
                if choice == set.options.len() {
                    continue;
                }
                for member in &set.options[choice].members {
                    elements.push(CombinationElement {
                        matches: member.matches.clone(),
                    });
                }
            }
            out.push(Combination {
                number: out.len(),
                elements,
            });

            let mut position = arities.len();
            loop {
                if position == 0 {
                    return Ok(out);
                }
                position -= 1;
                indices[position] += 1;
                if indices[position] < arities[position] {
                    break;
                }
                indices[position] = 0;
            }
        }
    }
}
