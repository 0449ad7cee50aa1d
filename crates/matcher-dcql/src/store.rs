use crate::models::ClaimsQuery;

/// Wallet catalog abstraction consumed by the DCQL engine.
///
/// Credentials and claims are addressed through stable references (typically
/// indices into the caller's catalog vector), which keeps the engine
/// pure-functional over catalog data and the response free of borrows into
/// the store.
pub trait CredentialStore {
    type CredentialRef: Clone + Eq + core::hash::Hash;
    type ClaimRef: Clone;

    /// Enumerates credential references in stable catalog order.
    fn list_credentials(&self) -> Vec<Self::CredentialRef>;

    /// True if the credential has an mdoc projection with this doctype.
    fn has_mdoc_doctype(&self, cred: &Self::CredentialRef, doctype: &str) -> bool;

    /// True if the credential has a VC projection with this vct.
    fn has_vct(&self, cred: &Self::CredentialRef, vct: &str) -> bool;

    /// Resolves one requested claim against a credential.
    ///
    /// A claim resolves when the credential holds a claim under the query's
    /// canonical name ([`ClaimsQuery::joined_path`]) and, when the query
    /// constrains values, the stored match value is one of them.
    fn resolve_claim(
        &self,
        cred: &Self::CredentialRef,
        claim: &ClaimsQuery,
    ) -> Option<Self::ClaimRef>;
}
